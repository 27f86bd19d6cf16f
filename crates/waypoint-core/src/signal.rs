#![forbid(unsafe_code)]

//! Page signals and listener bookkeeping.
//!
//! The tour engine re-resolves its target whenever the page tells it that
//! geometry may have moved. Pages deliver that news as [`PageSignal`]s to
//! listeners registered per [`SignalKind`].
//!
//! # Dispatch rules
//!
//! Mirrors DOM semantics for listeners attached to the window:
//!
//! | Signal | `Resize` | `Scroll { capture: false }` | `Scroll { capture: true }` |
//! |--------|----------|-----------------------------|----------------------------|
//! | `Resized` | fires | - | - |
//! | `Scrolled` from the window | - | fires | fires |
//! | `Scrolled` from a nested container | - | - | fires |
//!
//! Scroll events do not bubble, so only a capture-phase window listener
//! hears a nested container scroll.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::geometry::Viewport;

/// Which part of the page produced a scroll.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SignalOrigin {
    /// The top-level document scroller.
    Window,
    /// A nested scrollable element, by identifier.
    Element(String),
}

/// A page event that may have moved the current target.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PageSignal {
    /// The viewport changed size.
    Resized(Viewport),
    /// Something scrolled.
    Scrolled { origin: SignalOrigin },
}

/// The kind of signal a listener subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SignalKind {
    /// Viewport resize.
    Resize,
    /// Scroll, optionally in the capture phase.
    Scroll { capture: bool },
}

impl SignalKind {
    /// Whether a listener of this kind receives `signal`.
    pub fn accepts(self, signal: &PageSignal) -> bool {
        match (self, signal) {
            (Self::Resize, PageSignal::Resized(_)) => true,
            (Self::Scroll { capture }, PageSignal::Scrolled { origin }) => {
                capture || *origin == SignalOrigin::Window
            }
            _ => false,
        }
    }

    /// DOM event type name.
    pub const fn event_type(self) -> &'static str {
        match self {
            Self::Resize => "resize",
            Self::Scroll { .. } => "scroll",
        }
    }
}

/// Identifier handed out when a listener is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Wrap a raw id. Backends with their own numbering use this.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// A registered callback.
pub type Listener = Rc<dyn Fn(&PageSignal)>;

struct Entry {
    id: ListenerId,
    kind: SignalKind,
    listener: Listener,
}

/// Single-threaded listener storage with DOM-like dispatch.
///
/// All methods take `&self`; pages are shared behind `Rc` and listeners may
/// add or remove registrations while a dispatch is in progress.
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: Cell<u64>,
    entries: RefCell<Vec<Entry>>,
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.borrow();
        f.debug_struct("ListenerRegistry")
            .field("next_id", &self.next_id.get())
            .field(
                "entries",
                &entries.iter().map(|e| (e.id, e.kind)).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl ListenerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for `kind`.
    pub fn add(&self, kind: SignalKind, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.entries.borrow_mut().push(Entry { id, kind, listener });
        #[cfg(feature = "tracing")]
        tracing::trace!(%id, ?kind, "listener added");
        id
    }

    /// Remove a registration. Returns `false` if `id` was not registered.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|e| e.id != id);
        let removed = entries.len() != before;
        #[cfg(feature = "tracing")]
        tracing::trace!(%id, removed, "listener removed");
        removed
    }

    /// Whether `id` is currently registered.
    pub fn contains(&self, id: ListenerId) -> bool {
        self.entries.borrow().iter().any(|e| e.id == id)
    }

    /// Number of live registrations.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Number of live registrations of `kind`.
    pub fn count(&self, kind: SignalKind) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|e| e.kind == kind)
            .count()
    }

    /// Deliver `signal` to every accepting listener, in registration order.
    ///
    /// The matching set is snapshotted first; a listener removed by an
    /// earlier listener during the same dispatch is skipped. Returns the
    /// number of listeners invoked.
    pub fn dispatch(&self, signal: &PageSignal) -> usize {
        let snapshot: Vec<(ListenerId, Listener)> = self
            .entries
            .borrow()
            .iter()
            .filter(|e| e.kind.accepts(signal))
            .map(|e| (e.id, Rc::clone(&e.listener)))
            .collect();

        let mut invoked = 0;
        for (id, listener) in snapshot {
            if !self.contains(id) {
                continue;
            }
            listener(signal);
            invoked += 1;
        }
        invoked
    }
}
