#![forbid(unsafe_code)]

//! Monotonic id generation.
//!
//! Clones of an [`IdGenerator`] share one counter, so every consumer wired to
//! the same generator draws from the same sequence.

use std::cell::Cell;
use std::rc::Rc;

/// Yields `prefix-1`, `prefix-2`, …
#[derive(Debug, Clone)]
pub struct IdGenerator {
    prefix: Rc<str>,
    counter: Rc<Cell<u64>>,
}

impl IdGenerator {
    pub fn new(prefix: impl AsRef<str>) -> Self {
        Self {
            prefix: Rc::from(prefix.as_ref()),
            counter: Rc::new(Cell::new(0)),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Next id in the sequence.
    pub fn next_id(&self) -> String {
        let n = self.counter.get() + 1;
        self.counter.set(n);
        format!("{}-{n}", self.prefix)
    }

    /// Restart the sequence at 1.
    pub fn reset(&self) {
        self.counter.set(0);
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new("modalkit")
    }
}

/// Ids for one modal and its ARIA-labelled parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModalIds {
    pub modal_id: String,
    pub title_id: String,
    pub description_id: String,
}

impl ModalIds {
    pub fn new(base: impl Into<String>) -> Self {
        let modal_id = base.into();
        Self {
            title_id: format!("{modal_id}-title"),
            description_id: format!("{modal_id}-description"),
            modal_id,
        }
    }
}
