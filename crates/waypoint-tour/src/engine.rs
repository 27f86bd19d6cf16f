#![forbid(unsafe_code)]

//! The mounted tour.
//!
//! # Lifecycle
//!
//! 1. [`TourEngine::mount`] attaches a resize listener and a capture-phase
//!    scroll listener to the page, then runs the first refresh.
//! 2. Every refresh resolves the current step's target, composes a frame
//!    when it resolves, and hands the result to the presenter.
//! 3. A terminal transition detaches both listeners and unmounts the
//!    presenter, then runs the host callback. Dropping the engine detaches
//!    too, without callbacks.
//!
//! # Invariants
//!
//! 1. Geometry always comes from the current index at the time of the
//!    refresh; a step change refreshes unconditionally.
//! 2. Listeners hold only weak references to engine state. A signal that
//!    arrives after unmount, or while a refresh is already running, is a
//!    no-op.
//! 3. Callbacks fire at most once, after all listeners are gone.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, trace, warn};
use waypoint_core::{Listener, PageSignal, SignalKind};

use crate::config::TourConfig;
use crate::locator::{TargetState, locate};
use crate::overlay::{CardAction, OverlayFrame, Presenter};
use crate::page::{ListenerGuard, Page};
use crate::sequencer::{Sequencer, TourStatus, Transition};
use crate::step::Step;

/// Host callbacks for the two terminal outcomes.
pub struct TourCallbacks {
    on_close: Box<dyn FnMut()>,
    on_complete: Box<dyn FnMut()>,
}

impl TourCallbacks {
    /// Create callbacks from two closures.
    pub fn new(on_close: impl FnMut() + 'static, on_complete: impl FnMut() + 'static) -> Self {
        Self {
            on_close: Box::new(on_close),
            on_complete: Box::new(on_complete),
        }
    }

    /// Callbacks that do nothing.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(|| {}, || {})
    }

    /// Replace the close callback.
    #[must_use]
    pub fn on_close(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_close = Box::new(f);
        self
    }

    /// Replace the completion callback.
    #[must_use]
    pub fn on_complete(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_complete = Box::new(f);
        self
    }
}

impl Default for TourCallbacks {
    fn default() -> Self {
        Self::noop()
    }
}

impl fmt::Debug for TourCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TourCallbacks").finish_non_exhaustive()
    }
}

/// Why a refresh ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshCause {
    Mount,
    StepChanged,
    Resized,
    Scrolled,
    /// Host called [`TourEngine::refresh`].
    Manual,
}

impl From<&PageSignal> for RefreshCause {
    fn from(signal: &PageSignal) -> Self {
        match signal {
            PageSignal::Resized(_) => Self::Resized,
            PageSignal::Scrolled { .. } => Self::Scrolled,
        }
    }
}

struct Mounted<P: ?Sized, R> {
    page: Rc<P>,
    presenter: R,
    steps: Vec<Step>,
    sequencer: Sequencer,
    target: TargetState,
    frame: Option<OverlayFrame>,
    config: TourConfig,
    refreshes: u64,
    scroll_requests: u64,
    detached: bool,
}

impl<P: Page + ?Sized, R: Presenter> Mounted<P, R> {
    /// Resolve, compose, present.
    fn refresh(&mut self, cause: RefreshCause) {
        if self.detached || !self.sequencer.is_active() {
            return;
        }
        self.refreshes += 1;

        let Some(index) = self.sequencer.current() else {
            self.target = TargetState::Unresolved;
            self.frame = None;
            self.presenter.present(None);
            return;
        };

        let step = &self.steps[index];
        let resolution = locate(&*self.page, &step.target_id, self.config.scroll);
        if resolution.scroll_requested {
            self.scroll_requests += 1;
        }

        self.target = resolution.target;
        self.frame = resolution.target.rect().map(|hole| {
            OverlayFrame::compose(
                step,
                index,
                self.steps.len(),
                hole,
                self.page.viewport(),
                &self.config,
            )
        });
        trace!(
            ?cause,
            step = index,
            target_id = %step.target_id,
            resolved = self.target.is_resolved(),
            scroll_requested = resolution.scroll_requested,
            "tour refresh"
        );
        self.presenter.present(self.frame.as_ref());
    }

    fn detach(&mut self) {
        if self.detached {
            return;
        }
        self.detached = true;
        self.target = TargetState::Unresolved;
        self.frame = None;
        self.presenter.unmount();
    }
}

fn signal_listener<P, R>(shared: &Rc<RefCell<Mounted<P, R>>>) -> Listener
where
    P: Page + ?Sized + 'static,
    R: Presenter + 'static,
{
    let weak: Weak<RefCell<Mounted<P, R>>> = Rc::downgrade(shared);
    Rc::new(move |signal: &PageSignal| {
        let Some(shared) = weak.upgrade() else {
            return;
        };
        let Ok(mut mounted) = shared.try_borrow_mut() else {
            trace!(?signal, "signal during refresh dropped");
            return;
        };
        mounted.refresh(RefreshCause::from(signal));
    })
}

/// A mounted guided tour.
pub struct TourEngine<P: Page + ?Sized + 'static, R: Presenter + 'static> {
    shared: Rc<RefCell<Mounted<P, R>>>,
    listeners: Vec<ListenerGuard<P>>,
    callbacks: TourCallbacks,
}

impl<P: Page + ?Sized + 'static, R: Presenter + 'static> TourEngine<P, R> {
    /// Mount a tour at step 0.
    pub fn mount(
        page: Rc<P>,
        presenter: R,
        steps: Vec<Step>,
        callbacks: TourCallbacks,
        config: TourConfig,
    ) -> Self {
        if steps.is_empty() {
            warn!("tour mounted with no steps; nothing will render");
        }
        debug!(steps = steps.len(), "tour mounted");

        let shared = Rc::new(RefCell::new(Mounted {
            page: Rc::clone(&page),
            presenter,
            sequencer: Sequencer::new(steps.len()),
            steps,
            target: TargetState::Unresolved,
            frame: None,
            config,
            refreshes: 0,
            scroll_requests: 0,
            detached: false,
        }));

        let listeners = [SignalKind::Resize, SignalKind::Scroll { capture: true }]
            .into_iter()
            .map(|kind| ListenerGuard::attach(&page, kind, signal_listener(&shared)))
            .collect();

        let engine = Self {
            shared,
            listeners,
            callbacks,
        };
        engine.refresh_with(RefreshCause::Mount);
        engine
    }

    /// Go to the next step, or complete on the last one.
    pub fn next(&mut self) -> Transition {
        self.drive(Sequencer::advance)
    }

    /// Go to the previous step. No-op on the first.
    pub fn back(&mut self) -> Transition {
        self.drive(Sequencer::retreat)
    }

    /// Dismiss the tour.
    pub fn close(&mut self) -> Transition {
        self.drive(Sequencer::close)
    }

    /// Route a card control.
    pub fn handle_action(&mut self, action: CardAction) -> Transition {
        match action {
            CardAction::Next => self.next(),
            CardAction::Back => self.back(),
            CardAction::Close => self.close(),
        }
    }

    /// Re-resolve the current target now.
    pub fn refresh(&self) {
        self.refresh_with(RefreshCause::Manual);
    }

    /// Detach from the page without firing callbacks.
    ///
    /// For hosts that tear the tour down for their own reasons.
    pub fn unmount(&mut self) {
        self.teardown();
    }

    fn refresh_with(&self, cause: RefreshCause) {
        match self.shared.try_borrow_mut() {
            Ok(mut mounted) => mounted.refresh(cause),
            Err(_) => trace!(?cause, "refresh already running; skipped"),
        }
    }

    fn drive(&mut self, op: fn(&mut Sequencer) -> Transition) -> Transition {
        let transition = {
            let Ok(mut mounted) = self.shared.try_borrow_mut() else {
                warn!("tour busy; navigation ignored");
                return Transition::Unchanged;
            };
            if mounted.detached {
                return Transition::Unchanged;
            }
            let transition = op(&mut mounted.sequencer);
            if let Transition::Moved { from, to } = transition {
                debug!(from, to, "tour step changed");
                mounted.refresh(RefreshCause::StepChanged);
            }
            transition
        };

        match transition {
            Transition::Completed => {
                self.teardown();
                debug!("tour completed");
                (self.callbacks.on_complete)();
            }
            Transition::Closed => {
                self.teardown();
                debug!("tour closed");
                (self.callbacks.on_close)();
            }
            Transition::Moved { .. } | Transition::Unchanged => {}
        }
        transition
    }

    fn teardown(&mut self) {
        let attached = self.listeners.len();
        self.listeners.clear();
        let Ok(mut mounted) = self.shared.try_borrow_mut() else {
            return;
        };
        if !mounted.detached {
            mounted.detach();
            debug!(detached_listeners = attached, "tour unmounted");
        }
    }

    /// Sequencer status.
    pub fn status(&self) -> TourStatus {
        self.shared.borrow().sequencer.status()
    }

    /// Current step index, if active with a non-empty list.
    pub fn current_index(&self) -> Option<usize> {
        self.shared.borrow().sequencer.current()
    }

    /// Current step.
    pub fn current_step(&self) -> Option<Step> {
        let mounted = self.shared.borrow();
        mounted
            .sequencer
            .current()
            .and_then(|index| mounted.steps.get(index).cloned())
    }

    pub fn step_count(&self) -> usize {
        self.shared.borrow().steps.len()
    }

    /// Last observed target geometry.
    pub fn target(&self) -> TargetState {
        self.shared.borrow().target
    }

    /// Last presented frame.
    pub fn frame(&self) -> Option<OverlayFrame> {
        self.shared.borrow().frame.clone()
    }

    /// Whether the engine is still attached to the page.
    pub fn is_mounted(&self) -> bool {
        !self.shared.borrow().detached
    }

    /// Number of listeners this engine holds on the page.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Refreshes run so far.
    pub fn refresh_count(&self) -> u64 {
        self.shared.borrow().refreshes
    }

    /// Scroll-into-view requests issued so far.
    pub fn scroll_request_count(&self) -> u64 {
        self.shared.borrow().scroll_requests
    }

    pub fn config(&self) -> TourConfig {
        self.shared.borrow().config.clone()
    }

    /// Inspect the presenter.
    pub fn with_presenter<T>(&self, f: impl FnOnce(&R) -> T) -> T {
        f(&self.shared.borrow().presenter)
    }
}

impl<P: Page + ?Sized + 'static, R: Presenter + 'static> fmt::Debug for TourEngine<P, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.shared.try_borrow() {
            Ok(mounted) => f
                .debug_struct("TourEngine")
                .field("status", &mounted.sequencer.status())
                .field("steps", &mounted.steps.len())
                .field("target", &mounted.target)
                .field("listeners", &self.listeners)
                .field("detached", &mounted.detached)
                .finish(),
            Err(_) => f.debug_struct("TourEngine").finish_non_exhaustive(),
        }
    }
}

impl<P: Page + ?Sized + 'static, R: Presenter + 'static> Drop for TourEngine<P, R> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    use waypoint_core::{ListenerId, ListenerRegistry, PageRect, SignalOrigin, Viewport};

    use super::*;
    use crate::page::ScrollIntoView;

    #[derive(Default)]
    struct TestPage {
        viewport: Cell<Viewport>,
        rects: RefCell<HashMap<String, PageRect>>,
        scrolls: RefCell<Vec<String>>,
        listeners: ListenerRegistry,
    }

    impl TestPage {
        fn new() -> Rc<Self> {
            let page = Self::default();
            page.viewport.set(Viewport::new(800.0, 600.0));
            Rc::new(page)
        }

        fn set(&self, id: &str, rect: PageRect) {
            self.rects.borrow_mut().insert(id.to_string(), rect);
        }

        fn resize(&self, w: f64, h: f64) {
            let viewport = Viewport::new(w, h);
            self.viewport.set(viewport);
            self.listeners.dispatch(&PageSignal::Resized(viewport));
        }

        fn scroll(&self, origin: SignalOrigin) {
            self.listeners.dispatch(&PageSignal::Scrolled { origin });
        }
    }

    impl Page for TestPage {
        fn viewport(&self) -> Viewport {
            self.viewport.get()
        }

        fn bounding_rect(&self, target_id: &str) -> Option<PageRect> {
            self.rects.borrow().get(target_id).copied()
        }

        fn scroll_into_view(&self, target_id: &str, _options: ScrollIntoView) {
            self.scrolls.borrow_mut().push(target_id.to_string());
        }

        fn add_listener(&self, kind: SignalKind, listener: Listener) -> ListenerId {
            self.listeners.add(kind, listener)
        }

        fn remove_listener(&self, id: ListenerId) {
            self.listeners.remove(id);
        }
    }

    #[derive(Default)]
    struct CountingPresenter {
        frames: usize,
        blanks: usize,
        unmounted: bool,
    }

    impl Presenter for CountingPresenter {
        fn present(&mut self, frame: Option<&OverlayFrame>) {
            match frame {
                Some(_) => self.frames += 1,
                None => self.blanks += 1,
            }
        }

        fn unmount(&mut self) {
            self.unmounted = true;
        }
    }

    fn steps() -> Vec<Step> {
        vec![
            Step::new("a", "First", "one"),
            Step::new("b", "Second", "two"),
            Step::new("c", "Third", "three"),
        ]
    }

    fn mount(page: &Rc<TestPage>) -> TourEngine<TestPage, CountingPresenter> {
        TourEngine::mount(
            Rc::clone(page),
            CountingPresenter::default(),
            steps(),
            TourCallbacks::noop(),
            TourConfig::default(),
        )
    }

    #[test]
    fn mount_attaches_two_listeners_and_renders() {
        let page = TestPage::new();
        page.set("a", PageRect::new(50.0, 100.0, 200.0, 50.0));
        let engine = mount(&page);

        assert_eq!(engine.listener_count(), 2);
        assert_eq!(page.listeners.count(SignalKind::Resize), 1);
        assert_eq!(page.listeners.count(SignalKind::Scroll { capture: true }), 1);
        assert_eq!(engine.current_index(), Some(0));
        assert!(engine.frame().is_some());
        assert_eq!(engine.with_presenter(|p| p.frames), 1);
    }

    #[test]
    fn unresolved_target_presents_nothing() {
        let page = TestPage::new();
        let engine = mount(&page);
        assert_eq!(engine.target(), TargetState::Unresolved);
        assert!(engine.frame().is_none());
        assert_eq!(engine.with_presenter(|p| (p.frames, p.blanks)), (0, 1));
    }

    #[test]
    fn target_appearing_later_is_picked_up_on_next_signal() {
        let page = TestPage::new();
        let engine = mount(&page);
        assert!(engine.frame().is_none());

        page.set("a", PageRect::new(10.0, 10.0, 10.0, 10.0));
        page.scroll(SignalOrigin::Window);
        assert!(engine.frame().is_some());
    }

    #[test]
    fn resize_and_nested_scroll_refresh() {
        let page = TestPage::new();
        page.set("a", PageRect::new(50.0, 100.0, 200.0, 50.0));
        let engine = mount(&page);
        let before = engine.refresh_count();

        page.resize(1024.0, 768.0);
        assert_eq!(engine.frame().map(|f| f.viewport), Some(Viewport::new(1024.0, 768.0)));

        page.scroll(SignalOrigin::Element("sidebar".into()));
        assert_eq!(engine.refresh_count(), before + 2);
    }

    #[test]
    fn step_change_never_shows_previous_geometry() {
        let page = TestPage::new();
        page.set("a", PageRect::new(50.0, 100.0, 200.0, 50.0));
        let mut engine = mount(&page);
        assert!(engine.frame().is_some());

        // "b" is not mounted: the stale "a" frame must not survive.
        assert_eq!(engine.next(), Transition::Moved { from: 0, to: 1 });
        assert_eq!(engine.target(), TargetState::Unresolved);
        assert!(engine.frame().is_none());
    }

    #[test]
    fn completion_detaches_before_callback() {
        let page = TestPage::new();
        let listeners_at_callback = Rc::new(Cell::new(usize::MAX));
        let seen = Rc::clone(&listeners_at_callback);
        let page_for_cb = Rc::clone(&page);
        let mut engine = TourEngine::mount(
            Rc::clone(&page),
            CountingPresenter::default(),
            vec![Step::new("a", "Only", "one")],
            TourCallbacks::noop().on_complete(move || seen.set(page_for_cb.listeners.len())),
            TourConfig::default(),
        );

        assert_eq!(engine.next(), Transition::Completed);
        assert_eq!(listeners_at_callback.get(), 0);
        assert!(!engine.is_mounted());
        assert!(engine.with_presenter(|p| p.unmounted));
        assert_eq!(engine.status(), TourStatus::Finished);
    }

    #[test]
    fn drop_detaches_without_callbacks() {
        let page = TestPage::new();
        let fired = Rc::new(Cell::new(false));
        let (a, b) = (Rc::clone(&fired), Rc::clone(&fired));
        let engine = TourEngine::mount(
            Rc::clone(&page),
            CountingPresenter::default(),
            steps(),
            TourCallbacks::new(move || a.set(true), move || b.set(true)),
            TourConfig::default(),
        );
        assert_eq!(page.listeners.len(), 2);
        drop(engine);
        assert!(page.listeners.is_empty());
        assert!(!fired.get());
    }

    #[test]
    fn offscreen_target_requests_scroll() {
        let page = TestPage::new();
        page.set("a", PageRect::new(50.0, 1200.0, 200.0, 50.0));
        let engine = mount(&page);
        assert_eq!(engine.scroll_request_count(), 1);
        assert_eq!(page.scrolls.borrow().as_slice(), ["a"]);
        // Geometry is the pre-scroll rectangle until the next signal.
        assert_eq!(
            engine.target().rect(),
            Some(PageRect::new(50.0, 1200.0, 200.0, 50.0))
        );
    }

    #[test]
    fn handle_action_routes_controls() {
        let page = TestPage::new();
        let mut engine = mount(&page);
        assert_eq!(
            engine.handle_action(CardAction::Next),
            Transition::Moved { from: 0, to: 1 }
        );
        assert_eq!(
            engine.handle_action(CardAction::Back),
            Transition::Moved { from: 1, to: 0 }
        );
        assert_eq!(engine.handle_action(CardAction::Close), Transition::Closed);
        assert_eq!(engine.handle_action(CardAction::Next), Transition::Unchanged);
    }

    /// Scrolls the page from inside `present`, as a presenter that moves
    /// focus or resizes content might.
    struct EchoPresenter {
        page: Rc<TestPage>,
        painted: Rc<RefCell<Vec<Option<String>>>>,
    }

    impl Presenter for EchoPresenter {
        fn present(&mut self, frame: Option<&OverlayFrame>) {
            self.painted
                .borrow_mut()
                .push(frame.map(|f| f.target_id.clone()));
            self.page.scroll(SignalOrigin::Element("card".into()));
        }
    }

    #[test]
    fn signal_raised_during_refresh_is_dropped() {
        let page = TestPage::new();
        page.set("a", PageRect::new(50.0, 100.0, 200.0, 50.0));
        page.set("b", PageRect::new(300.0, 200.0, 100.0, 40.0));
        let painted = Rc::new(RefCell::new(Vec::new()));
        let mut engine = TourEngine::mount(
            Rc::clone(&page),
            EchoPresenter {
                page: Rc::clone(&page),
                painted: Rc::clone(&painted),
            },
            steps(),
            TourCallbacks::noop(),
            TourConfig::default(),
        );
        assert_eq!(engine.refresh_count(), 1);

        assert_eq!(engine.next(), Transition::Moved { from: 0, to: 1 });
        assert_eq!(engine.refresh_count(), 2);

        page.resize(1024.0, 768.0);
        assert_eq!(engine.refresh_count(), 3);
        engine.refresh();
        assert_eq!(engine.refresh_count(), 4);

        assert_eq!(
            *painted.borrow(),
            vec![
                Some("a".to_string()),
                Some("b".to_string()),
                Some("b".to_string()),
                Some("b".to_string()),
            ]
        );
        assert_eq!(engine.frame().map(|f| f.target_id), Some("b".to_string()));
        assert_eq!(engine.current_index(), Some(1));
    }
}
