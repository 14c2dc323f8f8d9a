//! Priority classes for the dispatch queue.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Admission priority of a task.
///
/// 数値が小さいほど先に取り出される（High = 1, Low = 2）。
/// Priority decides dequeue order only; it never preempts a running task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Priority {
    /// Mutating operations (`insert`).
    High = 1,
    /// Read-only operations (`query`) and anything unrecognized.
    Low = 2,
}

impl Priority {
    /// Classify a raw operation name.
    ///
    /// Unknown kinds fall back to [`Priority::Low`]; they still reach a worker
    /// and receive a structured error there.
    pub fn classify(operation: &str) -> Self {
        match operation {
            "insert" => Priority::High,
            _ => Priority::Low,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::High => f.write_str("high"),
            Priority::Low => f.write_str("low"),
        }
    }
}
