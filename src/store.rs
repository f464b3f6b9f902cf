use crate::options::ConnectionConfig;
use crate::scope::CancellationToken;
use std::error::Error;
use std::time::Instant;

/// Leader id reported by the store while no member is recognized as leader.
pub const NO_LEADER: u64 = 0;

/// Status of a single store member.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StatusResponse {
    /// Id of the member that answered the query.
    pub member_id: u64,
    /// Id of the member recognized as leader, or [`NO_LEADER`].
    pub leader: u64,
}

impl StatusResponse {
    #[inline]
    pub fn has_leader(&self) -> bool {
        self.leader != NO_LEADER
    }

    #[inline]
    pub fn is_leader(&self) -> bool {
        self.has_leader() && self.member_id == self.leader
    }
}

/// Context of a single status query.
#[derive(Debug, Clone)]
pub struct QueryContext {
    /// Canceled when the query must be abandoned, either on shutdown or once it returns.
    pub token: CancellationToken,
    /// The query must not outlive this instant.
    pub deadline: Instant,
}

/// Administrative client of the coordination store.
///
/// The connection is released when the client is dropped.
pub trait MaintenanceClient {
    type Err: Error;

    /// Queries the status of the member serving `endpoint`.
    fn status(&mut self, ctx: &QueryContext, endpoint: &str) -> Result<StatusResponse, Self::Err>;
}

/// Creates short-lived maintenance clients.
pub trait ClientFactory {
    type Client: MaintenanceClient;
    type Err: Error;

    fn new_maintenance(&self, config: &ConnectionConfig) -> Result<Self::Client, Self::Err>;
}
