//! Error types for the few fallible boundaries of the input pipeline.
//!
//! The pipeline itself never fails: noise is absorbed by the decoder and the
//! debouncer, and a full queue drops the event and bumps a counter. The only
//! place a caller can hand us something invalid is when a raw integer is
//! turned into a [`Channel`](crate::Channel).

use thiserror::Error;

/// Rejected conversion from a raw integer to a [`Channel`](crate::Channel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// Wire id outside `1..=CHANNEL_COUNT`.
    #[error("channel id {0} is out of range")]
    UnknownId(u8),
    /// Array position outside `0..CHANNEL_COUNT`.
    #[error("channel index {0} is out of range")]
    IndexOutOfRange(usize),
}
