use super::cancel::CancelReason;

/// Terminal state of a poll. Exhaustion and cancellation are outcomes, not
/// errors: a failing read is the only thing that surfaces as `Err`.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome<T> {
    /// The predicate held on the read made at attempt `attempts`.
    Satisfied { value: T, attempts: u32 },
    /// Every attempt ran; `value` is the last (unsatisfying) read.
    Exhausted { value: T, attempts: u32 },
    /// Stopped early. `last` is the most recent completed read, if any.
    Cancelled {
        last: Option<T>,
        attempts: u32,
        reason: CancelReason,
    },
}

impl<T> PollOutcome<T> {
    pub fn attempts(&self) -> u32 {
        match self {
            PollOutcome::Satisfied { attempts, .. }
            | PollOutcome::Exhausted { attempts, .. }
            | PollOutcome::Cancelled { attempts, .. } => *attempts,
        }
    }

    pub fn is_satisfied(&self) -> bool {
        matches!(self, PollOutcome::Satisfied { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, PollOutcome::Cancelled { .. })
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            PollOutcome::Satisfied { value, .. } | PollOutcome::Exhausted { value, .. } => {
                Some(value)
            }
            PollOutcome::Cancelled { last, .. } => last.as_ref(),
        }
    }

    /// Last obtained read, whatever the terminal state.
    pub fn into_value(self) -> Option<T> {
        match self {
            PollOutcome::Satisfied { value, .. } | PollOutcome::Exhausted { value, .. } => {
                Some(value)
            }
            PollOutcome::Cancelled { last, .. } => last,
        }
    }
}

/// Default satisfaction predicate: the read produced a non-empty collection.
pub trait HasItems {
    fn has_items(&self) -> bool;
}

impl<T> HasItems for Vec<T> {
    fn has_items(&self) -> bool {
        !self.is_empty()
    }
}

impl<T> HasItems for [T] {
    fn has_items(&self) -> bool {
        !self.is_empty()
    }
}

impl HasItems for String {
    fn has_items(&self) -> bool {
        !self.is_empty()
    }
}

impl<T: HasItems> HasItems for Option<T> {
    fn has_items(&self) -> bool {
        self.as_ref().is_some_and(HasItems::has_items)
    }
}

impl HasItems for serde_json::Value {
    fn has_items(&self) -> bool {
        match self {
            serde_json::Value::Null => false,
            serde_json::Value::Array(a) => !a.is_empty(),
            serde_json::Value::Object(o) => !o.is_empty(),
            serde_json::Value::String(s) => !s.is_empty(),
            _ => true,
        }
    }
}
