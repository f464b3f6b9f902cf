use crate::error::{Error, Result};
use std::time::Duration;

/// Default period between two leadership checks.
const DEFAULT_REELECTION_PERIOD: Duration = Duration::from_secs(5);
/// Default bound on a single status query against the store.
const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// The leader elector runtime configurations.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
    /// The period at which the leadership status is checked.
    ///
    /// Defaults to 5 seconds. This is the only pacing of the elector: failed checks are retried
    /// on the next period, there is no backoff.
    reelection_period: Duration,

    /// The timeout of each status query against the store.
    ///
    /// Defaults to 5 seconds.
    connection_timeout: Duration,
}

impl Options {
    /// Creates a new `Options` with default values.
    #[inline]
    pub const fn new() -> Self {
        Options {
            reelection_period: DEFAULT_REELECTION_PERIOD,
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
        }
    }

    /// The period at which the leadership status is checked.
    #[inline]
    pub const fn reelection_period(&self) -> Duration {
        self.reelection_period
    }

    /// The timeout of each status query against the store.
    #[inline]
    pub const fn connection_timeout(&self) -> Duration {
        self.connection_timeout
    }

    /// Creates a new `Options` builder.
    #[inline]
    pub const fn builder() -> OptionsBuilder {
        OptionsBuilder::new()
    }
}

impl Default for Options {
    #[inline]
    fn default() -> Self {
        Options::new()
    }
}

/// The builder of leader elector runtime configurations.
#[derive(Debug, Default)]
pub struct OptionsBuilder {
    reelection_period: Option<Duration>,
    connection_timeout: Option<Duration>,
}

impl OptionsBuilder {
    /// Creates a new `Options` builder.
    #[inline]
    pub const fn new() -> Self {
        OptionsBuilder {
            reelection_period: None,
            connection_timeout: None,
        }
    }

    /// The period at which the leadership status is checked.
    #[inline]
    pub const fn reelection_period(mut self, val: Duration) -> Self {
        self.reelection_period = Some(val);
        self
    }

    /// The timeout of each status query against the store.
    #[inline]
    pub const fn connection_timeout(mut self, val: Duration) -> Self {
        self.connection_timeout = Some(val);
        self
    }

    /// Builds a new `Options`.
    #[inline]
    pub fn build(self) -> Result<Options> {
        let reelection_period = self.reelection_period.unwrap_or(DEFAULT_REELECTION_PERIOD);
        if reelection_period.is_zero() {
            return Err(Error::InvalidConfig(String::from(
                "reelection period must be greater than zero",
            )));
        }

        let connection_timeout = self.connection_timeout.unwrap_or(DEFAULT_CONNECTION_TIMEOUT);
        if connection_timeout.is_zero() {
            return Err(Error::InvalidConfig(String::from(
                "connection timeout must be greater than zero",
            )));
        }

        Ok(Options {
            reelection_period,
            connection_timeout,
        })
    }
}

/// How to reach the coordination store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionConfig {
    /// Store endpoints. Only the first one is queried for the leadership status.
    pub endpoints: Vec<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ConnectionConfig {
    #[inline]
    pub fn new<I, S>(endpoints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ConnectionConfig {
            endpoints: endpoints.into_iter().map(Into::into).collect(),
            username: None,
            password: None,
        }
    }

    /// Sets the credentials used to authenticate against the store.
    #[inline]
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// The endpoint used for status queries.
    #[inline]
    pub fn first_endpoint(&self) -> Option<&str> {
        self.endpoints.first().map(String::as_str)
    }
}
