use crate::error::{to_factory_error, to_store_error, Error, Result};
use crate::options::ConnectionConfig;
use crate::scope::CancellationToken;
use crate::store::{ClientFactory, MaintenanceClient, QueryContext};
use std::time::{Duration, Instant};

/// Determines whether the local member is the leader recognized by the coordination store.
pub trait LeadershipChecker {
    /// Performs one leadership query bounded by `timeout`.
    ///
    /// # Returns
    /// - `Ok(true)` if the local member is the leader
    /// - `Ok(false)` if another member is the leader
    /// - `Err` if the status cannot be determined, including when no leader is present
    fn check(&self, ctx: &CancellationToken, config: &ConnectionConfig, timeout: Duration) -> Result<bool>;
}

impl<F> LeadershipChecker for F
where
    F: Fn(&CancellationToken, &ConnectionConfig, Duration) -> Result<bool>,
{
    #[inline]
    fn check(&self, ctx: &CancellationToken, config: &ConnectionConfig, timeout: Duration) -> Result<bool> {
        self(ctx, config, timeout)
    }
}

/// Checks the leadership status with a status query against the first configured endpoint.
pub struct StoreLeadershipChecker<F: ClientFactory> {
    factory: F,
}

impl<F: ClientFactory> StoreLeadershipChecker<F> {
    #[inline]
    pub fn new(factory: F) -> Self {
        StoreLeadershipChecker { factory }
    }
}

impl<F: ClientFactory> LeadershipChecker for StoreLeadershipChecker<F> {
    fn check(&self, ctx: &CancellationToken, config: &ConnectionConfig, timeout: Duration) -> Result<bool> {
        info!("[leader-elector] checking the leadership status...");

        let endpoint = match config.first_endpoint() {
            Some(endpoint) => endpoint,
            None => {
                return Err(Error::InvalidConfig(String::from(
                    "etcd endpoints are not passed correctly",
                )))
            }
        };

        let mut client = self.factory.new_maintenance(config).map_err(to_factory_error::<F>)?;

        let query_ctx = QueryContext {
            token: ctx.child_token(),
            deadline: Instant::now() + timeout,
        };
        let _guard = query_ctx.token.clone().drop_guard();

        let response = client.status(&query_ctx, endpoint).map_err(|e| {
            error!(
                "[leader-elector] failed to get status of etcd endpoint: {} with error: {}",
                endpoint, e
            );
            to_store_error::<F>(&format!("failed to get status of etcd endpoint {}", endpoint), e)
        })?;

        if !response.has_leader() {
            return Err(Error::NoLeader);
        }
        Ok(response.is_leader())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StatusResponse;
    use std::cell::RefCell;
    use std::fmt;
    use std::rc::Rc;

    #[derive(Debug)]
    struct FakeError(&'static str);

    impl fmt::Display for FakeError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.0)
        }
    }

    impl std::error::Error for FakeError {}

    #[derive(Default)]
    struct Journal {
        connects: usize,
        drops: usize,
        endpoints: Vec<String>,
        query_tokens: Vec<CancellationToken>,
    }

    struct FakeClient {
        response: std::result::Result<StatusResponse, &'static str>,
        journal: Rc<RefCell<Journal>>,
    }

    impl MaintenanceClient for FakeClient {
        type Err = FakeError;

        fn status(&mut self, ctx: &QueryContext, endpoint: &str) -> std::result::Result<StatusResponse, FakeError> {
            let mut journal = self.journal.borrow_mut();
            journal.endpoints.push(endpoint.to_string());
            journal.query_tokens.push(ctx.token.clone());
            assert!(!ctx.token.is_cancelled());
            assert!(ctx.deadline > Instant::now());
            self.response.map_err(FakeError)
        }
    }

    impl Drop for FakeClient {
        fn drop(&mut self) {
            self.journal.borrow_mut().drops += 1;
        }
    }

    struct FakeFactory {
        response: std::result::Result<StatusResponse, &'static str>,
        refuse: bool,
        journal: Rc<RefCell<Journal>>,
    }

    impl FakeFactory {
        fn new(response: std::result::Result<StatusResponse, &'static str>) -> Self {
            FakeFactory {
                response,
                refuse: false,
                journal: Rc::new(RefCell::new(Journal::default())),
            }
        }
    }

    impl ClientFactory for FakeFactory {
        type Client = FakeClient;
        type Err = FakeError;

        fn new_maintenance(&self, _config: &ConnectionConfig) -> std::result::Result<FakeClient, FakeError> {
            if self.refuse {
                return Err(FakeError("connection refused"));
            }
            self.journal.borrow_mut().connects += 1;
            Ok(FakeClient {
                response: self.response,
                journal: self.journal.clone(),
            })
        }
    }

    fn config() -> ConnectionConfig {
        ConnectionConfig::new(["http://etcd-0:2379", "http://etcd-1:2379"])
    }

    fn check(factory: FakeFactory) -> (Result<bool>, Rc<RefCell<Journal>>) {
        let journal = factory.journal.clone();
        let checker = StoreLeadershipChecker::new(factory);
        let result = checker.check(&CancellationToken::new(), &config(), Duration::from_secs(1));
        (result, journal)
    }

    #[test]
    fn test_local_member_is_leader() {
        let (result, journal) = check(FakeFactory::new(Ok(StatusResponse {
            member_id: 7,
            leader: 7,
        })));
        assert_eq!(result, Ok(true));

        let journal = journal.borrow();
        assert_eq!(journal.endpoints, vec![String::from("http://etcd-0:2379")]);
        assert_eq!(journal.connects, 1);
        assert_eq!(journal.drops, 1);
        assert!(journal.query_tokens.iter().all(CancellationToken::is_cancelled));
    }

    #[test]
    fn test_other_member_is_leader() {
        let (result, journal) = check(FakeFactory::new(Ok(StatusResponse {
            member_id: 7,
            leader: 9,
        })));
        assert_eq!(result, Ok(false));
        assert_eq!(journal.borrow().drops, 1);
    }

    #[test]
    fn test_no_leader() {
        let (result, journal) = check(FakeFactory::new(Ok(StatusResponse {
            member_id: 7,
            leader: 0,
        })));
        let err = result.unwrap_err();
        assert!(err.is_no_leader());
        assert!(!err.is_config_error());
        assert_eq!(journal.borrow().drops, 1);
    }

    /// A zero leader id means no leader, even when the answering member reports id zero.
    #[test]
    fn test_zero_member_id_is_no_leader() {
        let (result, _journal) = check(FakeFactory::new(Ok(StatusResponse {
            member_id: 0,
            leader: 0,
        })));
        assert_eq!(result, Err(Error::NoLeader));
    }

    #[test]
    fn test_status_failure() {
        let (result, journal) = check(FakeFactory::new(Err("deadline exceeded")));
        match result {
            Err(Error::Store(msg)) => {
                assert!(msg.contains("http://etcd-0:2379"));
                assert!(msg.contains("deadline exceeded"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
        let journal = journal.borrow();
        assert_eq!(journal.drops, 1);
        assert!(journal.query_tokens.iter().all(CancellationToken::is_cancelled));
    }

    #[test]
    fn test_client_creation_failure() {
        let mut factory = FakeFactory::new(Ok(StatusResponse { member_id: 1, leader: 1 }));
        factory.refuse = true;
        let (result, journal) = check(factory);
        match result {
            Err(Error::Store(msg)) => assert!(msg.contains("connection refused")),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(journal.borrow().endpoints.is_empty());
    }

    #[test]
    fn test_empty_endpoints() {
        let factory = FakeFactory::new(Ok(StatusResponse { member_id: 1, leader: 1 }));
        let journal = factory.journal.clone();
        let checker = StoreLeadershipChecker::new(factory);
        let err = checker
            .check(&CancellationToken::new(), &ConnectionConfig::default(), Duration::from_secs(1))
            .unwrap_err();
        assert!(err.is_config_error());
        assert_eq!(journal.borrow().connects, 0);
    }

    #[test]
    fn test_query_scope_is_released() {
        let root = CancellationToken::new();
        let factory = FakeFactory::new(Ok(StatusResponse { member_id: 2, leader: 3 }));
        let journal = factory.journal.clone();
        let checker = StoreLeadershipChecker::new(factory);
        assert_eq!(checker.check(&root, &config(), Duration::from_secs(1)), Ok(false));

        let token = journal.borrow().query_tokens[0].clone();
        assert!(token.is_cancelled());
        assert!(!root.is_cancelled());
    }

    #[test]
    fn test_closure_checker() {
        let checker = |_: &CancellationToken, config: &ConnectionConfig, _: Duration| -> Result<bool> {
            Ok(config.endpoints.len() == 2)
        };
        assert_eq!(
            checker.check(&CancellationToken::new(), &config(), Duration::from_secs(1)),
            Ok(true)
        );
    }
}
