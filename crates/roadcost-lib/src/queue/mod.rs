//! Minimum priority queues with decrease-key, behind one contract.
//!
//! Two interchangeable implementations back every search: an array binary
//! heap ([`BinaryQueue`], O(log n) worst case everywhere) and a Fibonacci
//! heap ([`FibonacciQueue`], amortized O(1) insert and decrease-key). Callers
//! pick one per search via [`QueueKind`]; the search loops themselves are
//! generic over [`DecreaseKeyQueue`], so the choice is made once at the call
//! boundary and never re-examined in a hot loop.

use std::fmt;
use std::str::FromStr;

pub mod binary;
pub mod fibonacci;

pub use binary::{BinaryHandle, BinaryQueue};
pub use fibonacci::{FibonacciHandle, FibonacciQueue};

/// Contract shared by both queue implementations.
///
/// Keys are `f64` costs; payloads are small copyable values (node ids in the
/// searches). A [`Self::Handle`] returned by [`Self::insert`] stays valid for
/// any number of `decrease_key` calls until its entry is removed, and must
/// never be used afterwards.
pub trait DecreaseKeyQueue<T> {
    /// Opaque ticket naming one live queue entry.
    type Handle: Copy + fmt::Debug;

    fn new() -> Self
    where
        Self: Sized;

    /// Add `item` under `key` and return a handle to the new entry.
    fn insert(&mut self, item: T, key: f64) -> Self::Handle;

    /// Remove and return the minimum-key entry, or `None` if the queue is
    /// empty. Callers that "know" the queue is non-empty still match on the
    /// option; an unexpected `None` is a logic error, never garbage.
    fn extract_min(&mut self) -> Option<(T, f64)>;

    /// Lower the key of the entry behind `handle` to `new_key`.
    ///
    /// Keys never increase: a call with `new_key >= current` leaves the
    /// queue, including its minimum, untouched.
    fn decrease_key(&mut self, handle: Self::Handle, new_key: f64);

    fn is_empty(&self) -> bool;

    fn len(&self) -> usize;
}

/// Selects the queue implementation for a search call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueueKind {
    /// Array binary heap.
    Binary,
    /// Fibonacci heap.
    #[default]
    Fibonacci,
}

impl fmt::Display for QueueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueKind::Binary => write!(f, "binary"),
            QueueKind::Fibonacci => write!(f, "fibonacci"),
        }
    }
}

impl FromStr for QueueKind {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "binary" => Ok(QueueKind::Binary),
            "fibonacci" => Ok(QueueKind::Fibonacci),
            other => Err(format!(
                "unknown queue kind '{other}', expected 'binary' or 'fibonacci'"
            )),
        }
    }
}
