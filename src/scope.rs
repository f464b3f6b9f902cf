//! Cancellation scopes.
//!
//! A [`CancellationToken`] is the handle given to leader-only work: it is created as a child of
//! the elector's root token when a tenure begins and canceled when that tenure ends. The elector
//! runs on plain threads, so [`BlockingWait`] lets blocking code park until a token is canceled.

use futures::task::{waker, ArcWake};
use std::future::Future;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::thread;
use std::time::{Duration, Instant};

pub use tokio_util::sync::{CancellationToken, DropGuard};

struct ThreadWaker(thread::Thread);

impl ArcWake for ThreadWaker {
    #[inline]
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.0.unpark();
    }
}

/// Blocking waits on a [`CancellationToken`].
pub trait BlockingWait {
    /// Blocks the current thread until the token is canceled.
    fn wait(&self);

    /// Blocks until the token is canceled or `deadline` is reached.
    ///
    /// Returns `true` if the token was canceled.
    fn wait_deadline(&self, deadline: Instant) -> bool;

    /// Blocks until the token is canceled or `timeout` elapses.
    ///
    /// Returns `true` if the token was canceled.
    #[inline]
    fn wait_timeout(&self, timeout: Duration) -> bool {
        self.wait_deadline(Instant::now() + timeout)
    }
}

impl BlockingWait for CancellationToken {
    #[inline]
    fn wait(&self) {
        futures::executor::block_on(self.cancelled());
    }

    fn wait_deadline(&self, deadline: Instant) -> bool {
        let cancelled = self.cancelled();
        futures::pin_mut!(cancelled);
        let waker = waker(Arc::new(ThreadWaker(thread::current())));
        let mut cx = Context::from_waker(&waker);

        loop {
            if let Poll::Ready(()) = cancelled.as_mut().poll(&mut cx) {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return self.is_cancelled();
            }
            thread::park_timeout(deadline - now);
        }
    }
}
