//! Library error type
//!
//! The animation core degrades silently on bad physics parameters (they are
//! clamped, not rejected), so errors only surface on registration misuse.

use thiserror::Error;

/// Errors surfaced by the Vitro runtime
#[derive(Debug, Error)]
pub enum Error {
    /// An operation referenced an animation id the scheduler no longer owns
    #[error("unknown animation id")]
    UnknownAnimation,

    /// The scheduler was shut down while consumers still held handles
    #[error("animation scheduler is no longer running")]
    SchedulerGone,

    /// An element id was registered twice without an intervening removal
    #[error("element {0} is already registered")]
    DuplicateElement(u64),
}
