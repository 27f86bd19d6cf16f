#![forbid(unsafe_code)]

//! The page the tour runs on.
//!
//! A [`Page`] answers geometry queries by element identifier and delivers
//! [`PageSignal`](waypoint_core::PageSignal)s to registered listeners. The
//! engine only reads from it; it never mutates host content beyond asking
//! for a scroll.

use std::rc::Rc;

use waypoint_core::{Listener, ListenerId, PageRect, SignalKind, Viewport};

/// How a requested scroll should animate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ScrollBehavior {
    /// Animate; the page fires scroll signals as it moves.
    #[default]
    Smooth,
    /// Jump immediately.
    Instant,
}

/// Where the target should land along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ScrollAlign {
    Start,
    #[default]
    Center,
    End,
    /// Minimal scroll that makes the element visible.
    Nearest,
}

/// Options for a scroll-into-view request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScrollIntoView {
    pub behavior: ScrollBehavior,
    /// Vertical alignment.
    pub block: ScrollAlign,
    /// Horizontal alignment.
    pub inline: ScrollAlign,
}

impl Default for ScrollIntoView {
    fn default() -> Self {
        Self {
            behavior: ScrollBehavior::Smooth,
            block: ScrollAlign::Center,
            inline: ScrollAlign::Center,
        }
    }
}

/// Host page collaborator.
///
/// All methods take `&self`: pages are shared behind `Rc` between the
/// engine and its listeners, and backends use interior mutability.
pub trait Page {
    /// Current viewport size.
    fn viewport(&self) -> Viewport;

    /// Bounding rectangle of the element with `target_id`, in viewport
    /// coordinates, or `None` if no such element is mounted.
    fn bounding_rect(&self, target_id: &str) -> Option<PageRect>;

    /// Ask the page to scroll `target_id` into view.
    ///
    /// Fire-and-forget. Implementations must not dispatch signals
    /// synchronously from inside this call.
    fn scroll_into_view(&self, target_id: &str, options: ScrollIntoView);

    /// Register a listener.
    fn add_listener(&self, kind: SignalKind, listener: Listener) -> ListenerId;

    /// Remove a listener. Unknown ids are ignored.
    fn remove_listener(&self, id: ListenerId);
}

impl<P: Page + ?Sized> Page for Rc<P> {
    fn viewport(&self) -> Viewport {
        (**self).viewport()
    }

    fn bounding_rect(&self, target_id: &str) -> Option<PageRect> {
        (**self).bounding_rect(target_id)
    }

    fn scroll_into_view(&self, target_id: &str, options: ScrollIntoView) {
        (**self).scroll_into_view(target_id, options);
    }

    fn add_listener(&self, kind: SignalKind, listener: Listener) -> ListenerId {
        (**self).add_listener(kind, listener)
    }

    fn remove_listener(&self, id: ListenerId) {
        (**self).remove_listener(id);
    }
}

/// RAII registration: removes the listener from the page on drop.
pub struct ListenerGuard<P: Page + ?Sized> {
    page: Rc<P>,
    id: ListenerId,
    kind: SignalKind,
}

impl<P: Page + ?Sized> ListenerGuard<P> {
    /// Register `listener` on `page` and guard the registration.
    pub fn attach(page: &Rc<P>, kind: SignalKind, listener: Listener) -> Self {
        let id = page.add_listener(kind, listener);
        tracing::debug!(%id, event = kind.event_type(), ?kind, "listener attached");
        Self {
            page: Rc::clone(page),
            id,
            kind,
        }
    }
}

impl<P: Page + ?Sized> std::fmt::Debug for ListenerGuard<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerGuard")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .finish()
    }
}

impl<P: Page + ?Sized> Drop for ListenerGuard<P> {
    fn drop(&mut self) {
        self.page.remove_listener(self.id);
        tracing::debug!(id = %self.id, event = self.kind.event_type(), "listener detached");
    }
}
