use crate::error::Result;

/// Thread interfaces used to run the elector loop.
pub trait Thread: Sized {
    fn spawn<F>(name: String, f: F) -> Result<Self>
    where
        F: FnOnce(),
        F: Send + 'static;

    fn join(self);
}
