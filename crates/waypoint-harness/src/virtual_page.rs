#![forbid(unsafe_code)]

//! Deterministic in-memory page.
//!
//! Elements live in document coordinates, or in a scroll container's content
//! coordinates. Viewport geometry is derived from the window and container
//! scroll offsets on every query.
//!
//! Scroll-into-view requests queue up and only take effect on
//! [`VirtualPage::settle_scroll`]. That is also when scroll signals fire,
//! the same way a browser's smooth scroll reports back asynchronously.

use std::cell::RefCell;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use waypoint_core::{
    Listener, ListenerId, ListenerRegistry, PageRect, PageSignal, SignalKind, SignalOrigin,
    Viewport,
};
use waypoint_tour::{Page, ScrollAlign, ScrollBehavior, ScrollIntoView};

/// Intermediate positions a smooth window scroll passes through.
pub const SMOOTH_SCROLL_FRAMES: u32 = 4;

/// An element on the virtual page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualElement {
    pub id: String,
    /// Document coordinates, or content coordinates of `container`.
    pub rect: PageRect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
}

impl VirtualElement {
    pub fn new(id: impl Into<String>, rect: PageRect) -> Self {
        Self {
            id: id.into(),
            rect,
            container: None,
        }
    }

    #[must_use]
    pub fn inside(mut self, container: impl Into<String>) -> Self {
        self.container = Some(container.into());
        self
    }
}

/// A nested scrollable region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollContainer {
    pub id: String,
    /// Document coordinates of the container box.
    pub rect: PageRect,
    #[serde(default)]
    pub scroll_left: f64,
    #[serde(default)]
    pub scroll_top: f64,
}

impl ScrollContainer {
    pub fn new(id: impl Into<String>, rect: PageRect) -> Self {
        Self {
            id: id.into(),
            rect,
            scroll_left: 0.0,
            scroll_top: 0.0,
        }
    }
}

/// A queued scroll-into-view request.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollRequest {
    pub target_id: String,
    pub options: ScrollIntoView,
}

#[derive(Debug, Default)]
struct PageState {
    viewport: Viewport,
    scroll_x: f64,
    scroll_y: f64,
    containers: BTreeMap<String, ScrollContainer>,
    elements: BTreeMap<String, VirtualElement>,
    pending: Vec<ScrollRequest>,
    history: Vec<ScrollRequest>,
}

impl PageState {
    /// Element rectangle in document coordinates.
    fn document_rect(&self, element: &VirtualElement) -> PageRect {
        match element
            .container
            .as_deref()
            .and_then(|id| self.containers.get(id))
        {
            Some(c) => element
                .rect
                .offset(c.rect.x - c.scroll_left, c.rect.y - c.scroll_top),
            None => element.rect,
        }
    }

    fn window_max_scroll(&self) -> (f64, f64) {
        let (mut right, mut bottom) = (0.0_f64, 0.0_f64);
        for element in self.elements.values().filter(|e| e.container.is_none()) {
            right = right.max(element.rect.right());
            bottom = bottom.max(element.rect.bottom());
        }
        for container in self.containers.values() {
            right = right.max(container.rect.right());
            bottom = bottom.max(container.rect.bottom());
        }
        (
            (right - self.viewport.width).max(0.0),
            (bottom - self.viewport.height).max(0.0),
        )
    }

    fn container_max_scroll(&self, container: &ScrollContainer) -> (f64, f64) {
        let (mut right, mut bottom) = (0.0_f64, 0.0_f64);
        for element in self
            .elements
            .values()
            .filter(|e| e.container.as_deref() == Some(container.id.as_str()))
        {
            right = right.max(element.rect.right());
            bottom = bottom.max(element.rect.bottom());
        }
        (
            (right - container.rect.width).max(0.0),
            (bottom - container.rect.height).max(0.0),
        )
    }
}

/// New scroll offset placing `[start, start + size)` per `align` in a port
/// of `port` pixels currently scrolled to `current`. Unclamped.
pub fn aligned_offset(align: ScrollAlign, current: f64, start: f64, size: f64, port: f64) -> f64 {
    match align {
        ScrollAlign::Start => start,
        ScrollAlign::End => start + size - port,
        ScrollAlign::Center => start - (port - size) / 2.0,
        ScrollAlign::Nearest => {
            if start < current || size > port {
                start
            } else if start + size > current + port {
                start + size - port
            } else {
                current
            }
        }
    }
}

/// In-memory [`Page`] with deterministic scrolling.
#[derive(Debug, Default)]
pub struct VirtualPage {
    state: RefCell<PageState>,
    listeners: ListenerRegistry,
}

impl VirtualPage {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            state: RefCell::new(PageState {
                viewport,
                ..PageState::default()
            }),
            listeners: ListenerRegistry::new(),
        }
    }

    /// Mount an element. Replaces any element with the same id.
    ///
    /// DOM mutations are not observed: no signal fires.
    pub fn insert_element(&self, element: VirtualElement) {
        self.state
            .borrow_mut()
            .elements
            .insert(element.id.clone(), element);
    }

    /// Unmount an element. Returns whether it existed.
    pub fn remove_element(&self, id: &str) -> bool {
        self.state.borrow_mut().elements.remove(id).is_some()
    }

    pub fn insert_container(&self, container: ScrollContainer) {
        self.state
            .borrow_mut()
            .containers
            .insert(container.id.clone(), container);
    }

    /// Resize the viewport and signal.
    pub fn resize(&self, width: f64, height: f64) {
        let viewport = Viewport::new(width, height);
        self.state.borrow_mut().viewport = viewport;
        self.listeners.dispatch(&PageSignal::Resized(viewport));
    }

    /// Scroll the window, clamped to the document. Signals only if the
    /// position changed.
    pub fn scroll_window_to(&self, x: f64, y: f64) -> bool {
        let moved = {
            let mut state = self.state.borrow_mut();
            let (max_x, max_y) = state.window_max_scroll();
            let (x, y) = (x.clamp(0.0, max_x), y.clamp(0.0, max_y));
            let moved = x != state.scroll_x || y != state.scroll_y;
            state.scroll_x = x;
            state.scroll_y = y;
            moved
        };
        if moved {
            self.listeners.dispatch(&PageSignal::Scrolled {
                origin: SignalOrigin::Window,
            });
        }
        moved
    }

    /// Scroll a nested container, clamped to its content. Signals only if
    /// the position changed; only capture-phase listeners hear it.
    pub fn scroll_container_to(&self, id: &str, left: f64, top: f64) -> bool {
        let moved = {
            let mut state = self.state.borrow_mut();
            let Some(max) = state
                .containers
                .get(id)
                .map(|c| state.container_max_scroll(c))
            else {
                return false;
            };
            let Some(container) = state.containers.get_mut(id) else {
                return false;
            };
            let (left, top) = (left.clamp(0.0, max.0), top.clamp(0.0, max.1));
            let moved = left != container.scroll_left || top != container.scroll_top;
            container.scroll_left = left;
            container.scroll_top = top;
            moved
        };
        if moved {
            self.listeners.dispatch(&PageSignal::Scrolled {
                origin: SignalOrigin::Element(id.to_string()),
            });
        }
        moved
    }

    /// Apply every queued scroll-into-view request. Returns the number of
    /// scroll signals dispatched.
    pub fn settle_scroll(&self) -> usize {
        let pending = std::mem::take(&mut self.state.borrow_mut().pending);
        pending.iter().map(|request| self.apply_scroll(request)).sum()
    }

    fn apply_scroll(&self, request: &ScrollRequest) -> usize {
        let options = request.options;
        let (container_target, window_target) = {
            let state = self.state.borrow();
            let Some(element) = state.elements.get(&request.target_id) else {
                return 0;
            };

            let container_target = element
                .container
                .as_deref()
                .and_then(|id| state.containers.get(id))
                .map(|c| {
                    let (max_left, max_top) = state.container_max_scroll(c);
                    let left = aligned_offset(
                        options.inline,
                        c.scroll_left,
                        element.rect.x,
                        element.rect.width,
                        c.rect.width,
                    );
                    let top = aligned_offset(
                        options.block,
                        c.scroll_top,
                        element.rect.y,
                        element.rect.height,
                        c.rect.height,
                    );
                    (
                        c.id.clone(),
                        left.clamp(0.0, max_left),
                        top.clamp(0.0, max_top),
                    )
                });

            // Where the element will sit in the document once its container
            // has scrolled.
            let doc_rect = match (&container_target, element.container.as_deref()) {
                (Some((_, left, top)), Some(id)) => state
                    .containers
                    .get(id)
                    .map_or(element.rect, |c| {
                        element.rect.offset(c.rect.x - left, c.rect.y - top)
                    }),
                _ => state.document_rect(element),
            };

            let (max_x, max_y) = state.window_max_scroll();
            let viewport = state.viewport;
            let x = aligned_offset(
                options.inline,
                state.scroll_x,
                doc_rect.x,
                doc_rect.width,
                viewport.width,
            );
            let y = aligned_offset(
                options.block,
                state.scroll_y,
                doc_rect.y,
                doc_rect.height,
                viewport.height,
            );
            (container_target, (x.clamp(0.0, max_x), y.clamp(0.0, max_y)))
        };

        let mut signals = 0;
        if let Some((id, left, top)) = container_target {
            if self.scroll_container_to(&id, left, top) {
                signals += 1;
            }
        }

        let (x, y) = window_target;
        match options.behavior {
            ScrollBehavior::Instant => {
                if self.scroll_window_to(x, y) {
                    signals += 1;
                }
            }
            ScrollBehavior::Smooth => {
                let (from_x, from_y) = self.scroll_position();
                for frame in 1..=SMOOTH_SCROLL_FRAMES {
                    let t = f64::from(frame) / f64::from(SMOOTH_SCROLL_FRAMES);
                    let step_x = from_x + (x - from_x) * t;
                    let step_y = from_y + (y - from_y) * t;
                    if self.scroll_window_to(step_x, step_y) {
                        signals += 1;
                    }
                }
            }
        }
        tracing::trace!(target_id = %request.target_id, x, y, signals, "scroll settled");
        signals
    }

    /// Window scroll offset `(x, y)`.
    pub fn scroll_position(&self) -> (f64, f64) {
        let state = self.state.borrow();
        (state.scroll_x, state.scroll_y)
    }

    /// Container scroll offset `(left, top)`.
    pub fn container_scroll(&self, id: &str) -> Option<(f64, f64)> {
        self.state
            .borrow()
            .containers
            .get(id)
            .map(|c| (c.scroll_left, c.scroll_top))
    }

    /// Requests not yet settled.
    pub fn pending_scrolls(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// Every scroll-into-view request ever received.
    pub fn scroll_history(&self) -> Vec<ScrollRequest> {
        self.state.borrow().history.clone()
    }

    /// Live listener registrations.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn listener_count_of(&self, kind: SignalKind) -> usize {
        self.listeners.count(kind)
    }
}

impl Page for VirtualPage {
    fn viewport(&self) -> Viewport {
        self.state.borrow().viewport
    }

    fn bounding_rect(&self, target_id: &str) -> Option<PageRect> {
        let state = self.state.borrow();
        let element = state.elements.get(target_id)?;
        Some(
            state
                .document_rect(element)
                .offset(-state.scroll_x, -state.scroll_y),
        )
    }

    fn scroll_into_view(&self, target_id: &str, options: ScrollIntoView) {
        let request = ScrollRequest {
            target_id: target_id.to_string(),
            options,
        };
        let mut state = self.state.borrow_mut();
        state.history.push(request.clone());
        state.pending.push(request);
    }

    fn add_listener(&self, kind: SignalKind, listener: Listener) -> ListenerId {
        self.listeners.add(kind, listener)
    }

    fn remove_listener(&self, id: ListenerId) {
        self.listeners.remove(id);
    }
}
