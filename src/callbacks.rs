use crate::scope::CancellationToken;

/// Callbacks invoked on the elector thread as the tenure of this member begins and ends.
///
/// Every method defaults to a no-op, so implementors only override what they need.
pub trait LeaderCallbacks: Send + Sync {
    /// This member became leader.
    ///
    /// `scope` is valid at call time and is canceled exactly once when the tenure ends, either
    /// because leadership was lost, could not be verified, or the elector shut down. Work spawned
    /// from here should stop once `scope` is canceled.
    fn on_started_leading(&self, scope: CancellationToken) {
        let _ = scope;
    }

    /// This member is no longer leader.
    fn on_stopped_leading(&self) {}
}

/// Signals to the member lease renewal, whose internals live elsewhere.
pub trait LeaseCallbacks: Send + Sync {
    /// Leadership status became known again after being unknown.
    fn start_lease_renewal(&self) {}

    /// Leadership status became unknown.
    fn stop_lease_renewal(&self) {}
}

impl LeaderCallbacks for () {}

impl LeaseCallbacks for () {}
