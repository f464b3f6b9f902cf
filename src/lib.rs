//! Leadership tracking driven by an external coordination store.
//!
//! The store (e.g. etcd) performs the actual election. An [`Elector`] periodically asks it which
//! member is the leader and maintains a small state machine from the answers, invoking
//! [`LeaderCallbacks`] as tenures begin and end and [`LeaseCallbacks`] as the leadership status
//! becomes unknown or known again.

#![forbid(unsafe_code)]

#[macro_use]
extern crate log;

mod callbacks;
mod checker;
mod core;
mod error;
mod metrics;
mod msg;
mod options;
mod scope;
mod store;
mod task;

pub use crate::callbacks::{LeaderCallbacks, LeaseCallbacks};
pub use crate::checker::{LeadershipChecker, StoreLeadershipChecker};
pub use crate::core::State;
pub use crate::error::{Error, Result};
pub use crate::metrics::{Metrics, MetricsWatcher};
pub use crate::options::{ConnectionConfig, Options, OptionsBuilder};
pub use crate::scope::{BlockingWait, CancellationToken, DropGuard};
pub use crate::store::{ClientFactory, MaintenanceClient, QueryContext, StatusResponse, NO_LEADER};
pub use crate::task::Thread;

use crate::core::ElectorCore;
use crate::metrics::metrics_channel;
use crate::msg::Message;
use crossbeam_channel::Sender;
use std::sync::Arc;

/// A trait defining the application specific types of an elector.
pub trait ElectorType: 'static + Sized {
    /// Thread interfaces used to run the elector loop.
    type Thread: Thread;
    /// Checker used to query the leadership status.
    type Checker: LeadershipChecker + Send + 'static;
}

/// The leader elector API.
///
/// Applications use this to spawn the elector thread and interact with it. The elector thread is
/// shut down when this handle is dropped.
pub struct Elector<T: ElectorType> {
    main_thread: Option<T::Thread>,
    msg_tx: Sender<Message>,
    root: CancellationToken,
    metrics_watcher: MetricsWatcher,
}

impl<T: ElectorType> Drop for Elector<T> {
    #[inline]
    fn drop(&mut self) {
        self.stop();
    }
}

impl<T: ElectorType> Elector<T> {
    /// Starts a new elector thread.
    ///
    /// The first leadership check happens one reelection period after start; until then the
    /// elector is a follower.
    #[inline]
    pub fn start(
        options: Options,
        connection_config: ConnectionConfig,
        checker: T::Checker,
        callbacks: Arc<dyn LeaderCallbacks>,
        lease_callbacks: Arc<dyn LeaseCallbacks>,
    ) -> Result<Self> {
        let (msg_tx, msg_rx) = crossbeam_channel::bounded(64);
        let (metrics_reporter, metrics_watcher) = metrics_channel();
        let root = CancellationToken::new();
        let elector_core = ElectorCore::<T>::new(
            options,
            connection_config,
            checker,
            callbacks,
            lease_callbacks,
            root.clone(),
            msg_rx,
            metrics_reporter,
        );
        let elector_thread = elector_core.spawn()?;
        Ok(Elector {
            main_thread: Some(elector_thread),
            msg_tx,
            root,
            metrics_watcher,
        })
    }

    /// Stops the elector thread and waits for it to exit.
    ///
    /// An active tenure is ended by canceling its scope; `on_stopped_leading` is not invoked and
    /// leader-only work is not waited for.
    #[inline]
    pub fn shutdown(mut self) {
        self.stop();
    }

    #[inline]
    fn stop(&mut self) {
        self.root.cancel();
        // ignore closed channel error
        let _ = self.msg_tx.send(Message::Shutdown);
        if let Some(thread) = self.main_thread.take() {
            thread.join();
        }
    }

    /// Gets a metrics watcher of this elector.
    #[inline]
    pub fn metrics_watcher(&self) -> MetricsWatcher {
        self.metrics_watcher.clone()
    }

    /// The state published after the latest leadership check.
    #[inline]
    pub fn current_state(&self) -> State {
        self.metrics_watcher.clone().state()
    }

    /// Marks this follower as candidate.
    ///
    /// Only allowed in `Follower` state. The next check moves the elector to `Leader` or back
    /// to `Follower`.
    #[inline]
    pub fn mark_candidate(&self) -> Result<()> {
        let (tx, rx) = crossbeam_channel::bounded(1);
        self.msg_tx
            .send(Message::MarkCandidate { tx })
            .map_err(|e| Error::ChannelError(format!("failed to send mark_candidate to message channel: {}", e)))?;
        rx.recv()
            .map_err(|e| {
                Error::ChannelError(format!(
                    "failed to receive mark_candidate result from channel: {}",
                    e
                ))
            })
            .and_then(|res| res)
    }

    /// Updates `Options` of this elector. The next check is scheduled one new period from now.
    #[inline]
    pub fn update_options(&self, options: Options) -> Result<()> {
        let (tx, rx) = crossbeam_channel::bounded(1);
        self.msg_tx
            .send(Message::UpdateOptions { options, tx })
            .map_err(|e| Error::ChannelError(format!("failed to send update options to message channel: {}", e)))?;
        rx.recv()
            .map_err(|e| {
                Error::ChannelError(format!(
                    "failed to receive update options result from channel: {}",
                    e
                ))
            })
            .and_then(|res| res)
    }
}
