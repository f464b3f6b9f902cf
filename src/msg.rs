use crate::error::Result;
use crate::Options;
use crossbeam_channel::Sender;

/// Message processed by the elector thread.
pub enum Message {
    MarkCandidate { tx: Sender<Result<()>> },
    UpdateOptions { options: Options, tx: Sender<Result<()>> },
    Shutdown,
}
