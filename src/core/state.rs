//! Prepared statement states
//!
//! Statement progression is a single linear cursor:
//!
//! ```text
//! Unbound --bind--> Bound --step--> Row --step--> ... --step--> Done
//!    ^                ^              |                            |
//!    |                +--reset(false)+----------------------------+
//!    +--------------------reset(true)-----------------------------+
//! ```
//!
//! `bind` is accepted from every state and always lands in `Bound`; from `Row`
//! or `Done` it resets the cursor first. The query text can only change while
//! the statement is `Unbound`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Cursor state of a prepared statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum State {
    /// No parameters bound; the query text may still be altered
    #[default]
    Unbound,
    /// Parameters set, ready to evaluate
    Bound,
    /// A row is available for reading
    Row,
    /// Evaluation exhausted until the next reset
    Done,
}

impl State {
    /// Convert the state to its string representation
    pub fn to_str(&self) -> &'static str {
        match self {
            State::Unbound => "unbound",
            State::Bound => "bound",
            State::Row => "row",
            State::Done => "done",
        }
    }

    /// Check whether column reads are allowed
    pub fn has_row(&self) -> bool {
        matches!(self, State::Row)
    }

    /// Check whether the engine cursor is mid-evaluation or exhausted
    pub fn is_running(&self) -> bool {
        matches!(self, State::Row | State::Done)
    }

    /// State reached after a reset
    pub fn after_reset(clear_bindings: bool) -> Self {
        if clear_bindings {
            State::Unbound
        } else {
            State::Bound
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}
