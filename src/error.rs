use crate::{ClientFactory, MaintenanceClient};
use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// Error related to leadership tracking.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The connection config or options are unusable; no store round-trip was attempted.
    InvalidConfig(String),
    /// The store answered, but currently recognizes no leader.
    NoLeader,
    /// Creating the store client or querying its status failed.
    Store(String),
    ThreadError(String),
    ChannelError(String),
    NotAllowed(String),
}

impl Error {
    /// Indicates whether the store reported that no leader is present.
    #[inline]
    pub fn is_no_leader(&self) -> bool {
        matches!(self, Error::NoLeader)
    }

    /// Indicates whether the error was raised by local configuration checks.
    #[inline]
    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::InvalidConfig(_))
    }
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NoLeader => f.write_str(
                "currently there is no etcd leader present, may be due to etcd quorum loss or election is being held",
            ),
            Error::InvalidConfig(s) => f.write_str(s),
            Error::Store(s) => f.write_str(s),
            Error::ThreadError(s) => f.write_str(s),
            Error::ChannelError(s) => f.write_str(s),
            Error::NotAllowed(s) => f.write_str(s),
        }
    }
}

#[inline]
pub(crate) fn to_store_error<F: ClientFactory>(context: &str, e: <F::Client as MaintenanceClient>::Err) -> Error {
    Error::Store(format!("{}: {}", context, e))
}

#[inline]
pub(crate) fn to_factory_error<F: ClientFactory>(e: F::Err) -> Error {
    Error::Store(format!("failed to create etcd maintenance client: {}", e))
}

