use crate::callbacks::{LeaderCallbacks, LeaseCallbacks};
use crate::checker::LeadershipChecker;
use crate::error::{Error, Result};
use crate::metrics::{Metrics, MetricsReporter};
use crate::msg::Message;
use crate::options::{ConnectionConfig, Options};
use crate::scope::CancellationToken;
use crate::{ElectorType, Thread};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// The leadership state of this member.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum State {
    Follower,
    /// Never entered by the check loop itself, only through `Elector::mark_candidate`.
    Candidate,
    Leader,
    /// The leadership status could not be verified by the latest check.
    Unknown,
}

impl fmt::Display for State {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Follower => f.write_str("Follower"),
            State::Candidate => f.write_str("Candidate"),
            State::Leader => f.write_str("Leader"),
            State::Unknown => f.write_str("UnknownState"),
        }
    }
}

pub struct ElectorCore<T: ElectorType> {
    options: Options,
    connection_config: ConnectionConfig,
    checker: T::Checker,

    callbacks: Arc<dyn LeaderCallbacks>,
    lease_callbacks: Arc<dyn LeaseCallbacks>,

    state: State,
    /// Number of tenures started so far.
    tenure: u64,
    last_error: Option<Error>,

    /// Lifetime of the elector; canceled on shutdown.
    root: CancellationToken,
    /// Present iff `state == State::Leader`.
    leading_scope: Option<CancellationToken>,

    msg_rx: Receiver<Message>,
    metrics_reporter: MetricsReporter,
}

impl<T: ElectorType> ElectorCore<T> {
    #[allow(clippy::too_many_arguments)]
    #[inline]
    pub(crate) fn new(
        options: Options,
        connection_config: ConnectionConfig,
        checker: T::Checker,
        callbacks: Arc<dyn LeaderCallbacks>,
        lease_callbacks: Arc<dyn LeaseCallbacks>,
        root: CancellationToken,
        msg_rx: Receiver<Message>,
        metrics_reporter: MetricsReporter,
    ) -> Self {
        ElectorCore {
            options,
            connection_config,
            checker,
            callbacks,
            lease_callbacks,
            state: State::Follower,
            tenure: 0,
            last_error: None,
            root,
            leading_scope: None,
            msg_rx,
            metrics_reporter,
        }
    }

    #[inline]
    pub fn spawn(self) -> Result<T::Thread> {
        T::Thread::spawn(String::from("leader-elector"), move || self.run())
    }

    /// Runs the check loop on the current thread until shutdown.
    pub fn run(mut self) {
        info!("[leader-elector][{}] starting leader election...", self.state);
        self.report_metrics();

        let mut next_tick = Instant::now() + self.options.reelection_period();
        loop {
            match self.msg_rx.recv_deadline(next_tick) {
                Ok(msg) => match msg {
                    Message::MarkCandidate { tx } => {
                        let _ = tx.send(self.mark_candidate());
                    }
                    Message::UpdateOptions { options, tx } => {
                        info!("[leader-elector][{}] update options: {:?}", self.state, options);
                        self.options = options;
                        next_tick = Instant::now() + self.options.reelection_period();
                        let _ = tx.send(Ok(()));
                    }
                    Message::Shutdown => {
                        info!("[leader-elector][{}] received shutdown message", self.state);
                        break;
                    }
                },
                Err(e) => match e {
                    RecvTimeoutError::Timeout => {
                        if !self.tick() {
                            break;
                        }
                        next_tick = Instant::now() + self.options.reelection_period();
                    }
                    RecvTimeoutError::Disconnected => {
                        info!("[leader-elector][{}] the message channel is disconnected", self.state);
                        break;
                    }
                },
            }
        }

        self.shutdown();
    }

    /// Performs one leadership check and applies its outcome.
    ///
    /// Returns `false` if the elector was shut down while checking, in which case the outcome is
    /// discarded.
    fn tick(&mut self) -> bool {
        let outcome = self
            .checker
            .check(&self.root, &self.connection_config, self.options.connection_timeout());
        if self.root.is_cancelled() {
            info!(
                "[leader-elector][{}] shutdown during leadership check, discard its outcome",
                self.state
            );
            return false;
        }

        self.apply(outcome);
        self.report_metrics();
        true
    }

    /// Applies the outcome of one leadership check.
    pub(crate) fn apply(&mut self, outcome: Result<bool>) {
        let is_leader = match outcome {
            Ok(is_leader) => {
                self.last_error = None;
                is_leader
            }
            Err(e) => {
                error!("[leader-elector][{}] failed to elect the leader: {}", self.state, e);
                if self.state != State::Unknown {
                    self.lease_callbacks.stop_lease_renewal();
                }
                if self.state == State::Leader {
                    self.stop_leading();
                }
                self.state = State::Unknown;
                self.last_error = Some(e);
                info!("[leader-elector][{}] waiting for re-election...", self.state);
                return;
            }
        };

        match (self.state, is_leader) {
            (State::Follower | State::Unknown | State::Candidate, true) => {
                if self.state == State::Unknown {
                    self.lease_callbacks.start_lease_renewal();
                }
                let prev_state = self.state;
                self.state = State::Leader;
                info!("[leader-elector][{}] became leader, previous state: {}", self.state, prev_state);
                self.start_leading();
            }
            (State::Leader, true) => {
                debug!("[leader-elector][{}] no change in leadership status", self.state);
            }
            (State::Leader, false) => {
                self.state = State::Follower;
                info!("[leader-elector][{}] lost the election", self.state);
                self.stop_leading();
            }
            (State::Unknown, false) => {
                self.lease_callbacks.start_lease_renewal();
                self.state = State::Follower;
                info!(
                    "[leader-elector][{}] changed the state from {} to {}",
                    self.state,
                    State::Unknown,
                    self.state
                );
            }
            (State::Candidate, false) => {
                self.state = State::Follower;
                info!(
                    "[leader-elector][{}] another member is leader, changed the state from {} to {}",
                    self.state,
                    State::Candidate,
                    self.state
                );
            }
            (State::Follower, false) => {
                debug!("[leader-elector][{}] no change in leadership status", self.state);
            }
        }
    }

    #[inline]
    fn start_leading(&mut self) {
        debug_assert!(self.leading_scope.is_none());
        let scope = self.root.child_token();
        self.leading_scope = Some(scope.clone());
        self.tenure += 1;
        info!("[leader-elector][{}] started leading, tenure: {}", self.state, self.tenure);
        self.callbacks.on_started_leading(scope);
    }

    #[inline]
    fn stop_leading(&mut self) {
        if let Some(scope) = self.leading_scope.take() {
            scope.cancel();
            info!("[leader-elector][{}] stopped leading, tenure: {}", self.state, self.tenure);
            self.callbacks.on_stopped_leading();
        }
    }

    fn mark_candidate(&mut self) -> Result<()> {
        match self.state {
            State::Follower => {
                self.state = State::Candidate;
                info!("[leader-elector][{}] marked as candidate", self.state);
                self.report_metrics();
                Ok(())
            }
            State::Candidate => Ok(()),
            state => Err(Error::NotAllowed(format!("can't mark as candidate in {} state", state))),
        }
    }

    fn shutdown(&mut self) {
        info!("[leader-elector][{}] shutting down leader election...", self.state);
        if let Some(scope) = self.leading_scope.take() {
            scope.cancel();
        }
        self.root.cancel();
    }

    #[inline]
    fn report_metrics(&mut self) {
        self.metrics_reporter.report(Metrics {
            state: self.state,
            tenure: self.tenure,
            last_error: self.last_error.clone(),
        })
    }
}
