#![forbid(unsafe_code)]

//! Step cursor over an ordered, fixed-length step list.
//!
//! # Invariants
//!
//! 1. While `Active(i)` and the list is non-empty, `i < len`.
//! 2. `Finished` and `Closed` are terminal; nothing re-enters `Active`.
//! 3. Only `advance`, `retreat` and `close` move the cursor.

/// Where the tour stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TourStatus {
    /// Showing the step at this index.
    Active(usize),
    /// The user finished the last step.
    Finished,
    /// The user dismissed the tour early.
    Closed,
}

impl TourStatus {
    /// Current index, if active.
    #[must_use]
    pub const fn index(self) -> Option<usize> {
        match self {
            Self::Active(index) => Some(index),
            Self::Finished | Self::Closed => None,
        }
    }

    /// Whether the tour has ended.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Active(_))
    }
}

/// Outcome of a sequencer call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Transition {
    /// The cursor moved.
    Moved { from: usize, to: usize },
    /// Nothing changed (first-step retreat, or any call after the end).
    Unchanged,
    /// `advance` ran past the last step.
    Completed,
    /// `close` ended the tour.
    Closed,
}

impl Transition {
    /// Whether this transition ended the tour.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Closed)
    }
}

/// The step cursor.
#[derive(Debug, Clone)]
pub struct Sequencer {
    len: usize,
    status: TourStatus,
}

impl Sequencer {
    /// Start at index 0 of a list with `len` steps.
    ///
    /// An empty list starts active with no current step; the first
    /// `advance` completes it.
    #[must_use]
    pub const fn new(len: usize) -> Self {
        Self {
            len,
            status: TourStatus::Active(0),
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub const fn status(&self) -> TourStatus {
        self.status
    }

    /// Index of the current step, if active and the list is non-empty.
    #[must_use]
    pub const fn current(&self) -> Option<usize> {
        match self.status {
            TourStatus::Active(index) if index < self.len => Some(index),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Whether the current step is the last one.
    #[must_use]
    pub const fn is_last(&self) -> bool {
        match self.status {
            TourStatus::Active(index) => index + 1 >= self.len,
            _ => false,
        }
    }

    /// Move forward, or finish on the last step.
    pub fn advance(&mut self) -> Transition {
        match self.status {
            TourStatus::Active(index) if index + 1 < self.len => {
                self.status = TourStatus::Active(index + 1);
                Transition::Moved {
                    from: index,
                    to: index + 1,
                }
            }
            TourStatus::Active(_) => {
                self.status = TourStatus::Finished;
                Transition::Completed
            }
            TourStatus::Finished | TourStatus::Closed => Transition::Unchanged,
        }
    }

    /// Move back one step. No wraparound.
    pub fn retreat(&mut self) -> Transition {
        match self.status {
            TourStatus::Active(index) if index > 0 => {
                self.status = TourStatus::Active(index - 1);
                Transition::Moved {
                    from: index,
                    to: index - 1,
                }
            }
            _ => Transition::Unchanged,
        }
    }

    /// Dismiss the tour from any active step.
    pub fn close(&mut self) -> Transition {
        match self.status {
            TourStatus::Active(_) => {
                self.status = TourStatus::Closed;
                Transition::Closed
            }
            TourStatus::Finished | TourStatus::Closed => Transition::Unchanged,
        }
    }
}
