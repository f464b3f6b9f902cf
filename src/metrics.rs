use crate::{Error, State};
use watch::{WatchReceiver, WatchSender};

/// A set of metrics describing the current leadership status.
#[derive(Clone, Debug)]
pub struct Metrics {
    /// The state of the elector.
    pub state: State,
    /// Number of tenures started since the elector was started.
    pub tenure: u64,
    /// Error of the latest leadership check, if it failed.
    pub last_error: Option<Error>,
}

impl Metrics {
    #[inline]
    pub(crate) fn new() -> Self {
        Metrics {
            state: State::Follower,
            tenure: 0,
            last_error: None,
        }
    }
}

pub(crate) struct MetricsReporter {
    metrics_tx: WatchSender<Metrics>,
}

impl MetricsReporter {
    #[inline]
    pub(crate) fn new(metrics_tx: WatchSender<Metrics>) -> Self {
        MetricsReporter { metrics_tx }
    }

    #[inline]
    pub(crate) fn report(&mut self, metrics: Metrics) {
        self.metrics_tx.send(metrics);
    }
}

/// The metrics watcher of the elector.
///
/// Metrics are published once per check, so they trail the store by up to one reelection period.
#[derive(Clone)]
pub struct MetricsWatcher {
    metrics_rx: WatchReceiver<Metrics>,
}

impl MetricsWatcher {
    #[inline]
    pub(crate) fn new(metrics_rx: WatchReceiver<Metrics>) -> Self {
        MetricsWatcher { metrics_rx }
    }

    /// A set of metrics describing the current leadership status.
    #[inline]
    pub fn metrics(&mut self) -> Metrics {
        self.metrics_rx.get()
    }

    /// The current state of the elector.
    #[inline]
    pub fn state(&mut self) -> State {
        self.metrics_rx.get().state
    }
}

#[inline]
pub(crate) fn metrics_channel() -> (MetricsReporter, MetricsWatcher) {
    let (tx, rx) = watch::channel(Metrics::new());
    (MetricsReporter::new(tx), MetricsWatcher::new(rx))
}
