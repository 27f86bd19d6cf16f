//! End-to-end lifecycle tests for `TourEngine` over an in-memory page.
//!
//! Covers the console tour walkthrough, listener bookkeeping across
//! terminal transitions, and the debug events emitted along the way.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use waypoint_tour::{
    CardSide, Listener, ListenerId, ListenerRegistry, OverlayFrame, Page, PageRect, PageSignal,
    PrimaryAction, Presenter, ScrollIntoView, SignalKind, SignalOrigin, Step, TourCallbacks,
    TourConfig, TourEngine, TourStatus, Transition, Viewport,
};

// ── Fixtures ────────────────────────────────────────────────────────────

struct MemoryPage {
    viewport: Cell<Viewport>,
    rects: RefCell<HashMap<String, PageRect>>,
    scroll_requests: RefCell<Vec<(String, ScrollIntoView)>>,
    listeners: ListenerRegistry,
}

impl MemoryPage {
    fn new(width: f64, height: f64) -> Rc<Self> {
        Rc::new(Self {
            viewport: Cell::new(Viewport::new(width, height)),
            rects: RefCell::new(HashMap::new()),
            scroll_requests: RefCell::new(Vec::new()),
            listeners: ListenerRegistry::new(),
        })
    }

    fn place(&self, id: &str, rect: PageRect) {
        self.rects.borrow_mut().insert(id.to_string(), rect);
    }

    fn remove(&self, id: &str) {
        self.rects.borrow_mut().remove(id);
    }

    /// Shift every element by `dy`, as a window scroll would, and signal.
    fn scroll_by(&self, dy: f64) {
        for rect in self.rects.borrow_mut().values_mut() {
            *rect = rect.offset(0.0, -dy);
        }
        self.listeners.dispatch(&PageSignal::Scrolled {
            origin: SignalOrigin::Window,
        });
    }
}

impl Page for MemoryPage {
    fn viewport(&self) -> Viewport {
        self.viewport.get()
    }

    fn bounding_rect(&self, target_id: &str) -> Option<PageRect> {
        self.rects.borrow().get(target_id).copied()
    }

    fn scroll_into_view(&self, target_id: &str, options: ScrollIntoView) {
        self.scroll_requests
            .borrow_mut()
            .push((target_id.to_string(), options));
    }

    fn add_listener(&self, kind: SignalKind, listener: Listener) -> ListenerId {
        self.listeners.add(kind, listener)
    }

    fn remove_listener(&self, id: ListenerId) {
        self.listeners.remove(id);
    }
}

#[derive(Clone, Default)]
struct FrameLog(Rc<RefCell<Vec<Option<OverlayFrame>>>>);

impl FrameLog {
    fn last(&self) -> Option<Option<OverlayFrame>> {
        self.0.borrow().last().cloned()
    }

    fn len(&self) -> usize {
        self.0.borrow().len()
    }
}

impl Presenter for FrameLog {
    fn present(&mut self, frame: Option<&OverlayFrame>) {
        self.0.borrow_mut().push(frame.cloned());
    }
}

fn console_steps() -> Vec<Step> {
    vec![
        Step::new(
            "quick-start-section",
            "1. Quick Start",
            "Choose a pre-defined schema to get started instantly. Click \"Register\" to load the Procurement Standard schema.",
        ),
        Step::new(
            "validate-file-section",
            "2. Validate Data",
            "Upload your CSV or JSON file here. The system will check it against the selected schema.",
        ),
        Step::new(
            "mapping-section",
            "3. Fix Issues",
            "If your data has different column names (e.g., Portuguese headers), define a mapping here to automatically fix it.",
        ),
    ]
}

fn console_page() -> Rc<MemoryPage> {
    let page = MemoryPage::new(1280.0, 720.0);
    page.place("quick-start-section", PageRect::new(40.0, 80.0, 600.0, 120.0));
    page.place("validate-file-section", PageRect::new(40.0, 260.0, 600.0, 140.0));
    page.place("mapping-section", PageRect::new(40.0, 900.0, 600.0, 200.0));
    page
}

// ── Walkthrough ─────────────────────────────────────────────────────────

#[test]
fn console_walkthrough_completes_once() {
    let page = console_page();
    let log = FrameLog::default();
    let completed = Rc::new(Cell::new(0));
    let closed = Rc::new(Cell::new(0));
    let (c, d) = (Rc::clone(&completed), Rc::clone(&closed));

    let mut engine = TourEngine::mount(
        Rc::clone(&page),
        log.clone(),
        console_steps(),
        TourCallbacks::new(move || d.set(d.get() + 1), move || c.set(c.get() + 1)),
        TourConfig::default(),
    );

    let first = log.last().flatten().expect("first step renders");
    assert_eq!(first.target_id, "quick-start-section");
    assert_eq!(first.card.side, CardSide::Below);
    assert!(!first.card.back_visible);

    assert_eq!(engine.next(), Transition::Moved { from: 0, to: 1 });
    let second = log.last().flatten().expect("second step renders");
    assert!(second.card.back_visible);
    assert_eq!(second.card.primary, PrimaryAction::Next);

    // The third target is below the fold: a scroll is requested and the
    // pre-scroll geometry is reported until the page moves.
    assert_eq!(engine.next(), Transition::Moved { from: 1, to: 2 });
    assert_eq!(page.scroll_requests.borrow().len(), 1);
    assert_eq!(page.scroll_requests.borrow()[0].0, "mapping-section");
    assert_eq!(
        engine.target().rect(),
        Some(PageRect::new(40.0, 900.0, 600.0, 200.0))
    );

    page.scroll_by(640.0);
    let third = log.last().flatten().expect("third step renders");
    assert_eq!(third.hole, PageRect::new(40.0, 260.0, 600.0, 200.0));
    assert_eq!(third.card.primary, PrimaryAction::Finish);
    assert_eq!(third.card.progress.label(), "3 of 3");

    assert_eq!(engine.next(), Transition::Completed);
    assert_eq!(engine.status(), TourStatus::Finished);
    assert_eq!(completed.get(), 1);
    assert_eq!(closed.get(), 0);
    assert!(page.listeners.is_empty());

    // Further input is absorbed.
    assert_eq!(engine.next(), Transition::Unchanged);
    assert_eq!(engine.close(), Transition::Unchanged);
    assert_eq!(completed.get(), 1);
    assert_eq!(closed.get(), 0);
}

#[test]
fn close_from_middle_fires_on_close_only() {
    let page = console_page();
    let closed = Rc::new(Cell::new(false));
    let completed = Rc::new(Cell::new(false));
    let (a, b) = (Rc::clone(&closed), Rc::clone(&completed));
    let mut engine = TourEngine::mount(
        Rc::clone(&page),
        FrameLog::default(),
        console_steps(),
        TourCallbacks::new(move || a.set(true), move || b.set(true)),
        TourConfig::default(),
    );

    engine.next();
    assert_eq!(engine.close(), Transition::Closed);
    assert!(closed.get());
    assert!(!completed.get());
    assert_eq!(engine.status(), TourStatus::Closed);
    assert!(!engine.is_mounted());
}

#[test]
fn signals_after_unmount_are_ignored() {
    let page = console_page();
    let log = FrameLog::default();
    let mut engine = TourEngine::mount(
        Rc::clone(&page),
        log.clone(),
        console_steps(),
        TourCallbacks::noop(),
        TourConfig::default(),
    );
    engine.close();
    let presented = log.len();

    page.scroll_by(10.0);
    page.listeners.dispatch(&PageSignal::Resized(Viewport::new(640.0, 480.0)));
    assert_eq!(log.len(), presented);
    assert_eq!(log.last(), Some(None));
}

#[test]
fn target_removed_mid_tour_renders_nothing_until_it_returns() {
    let page = console_page();
    let log = FrameLog::default();
    let engine = TourEngine::mount(
        Rc::clone(&page),
        log.clone(),
        console_steps(),
        TourCallbacks::noop(),
        TourConfig::default(),
    );

    page.remove("quick-start-section");
    engine.refresh();
    assert_eq!(log.last(), Some(None));
    assert!(engine.is_mounted());

    page.place("quick-start-section", PageRect::new(40.0, 80.0, 600.0, 120.0));
    engine.refresh();
    assert!(log.last().flatten().is_some());
}

#[test]
fn empty_tour_renders_nothing_and_completes_on_next() {
    let page = console_page();
    let log = FrameLog::default();
    let done = Rc::new(Cell::new(false));
    let flag = Rc::clone(&done);
    let mut engine = TourEngine::mount(
        Rc::clone(&page),
        log.clone(),
        Vec::new(),
        TourCallbacks::noop().on_complete(move || flag.set(true)),
        TourConfig::default(),
    );
    assert_eq!(engine.current_step(), None);
    assert!(log.last().flatten().is_none());
    assert_eq!(engine.next(), Transition::Completed);
    assert!(done.get());
}

#[test]
fn remounting_does_not_leak_listeners() {
    let page = console_page();
    for _ in 0..5 {
        let engine = TourEngine::mount(
            Rc::clone(&page),
            FrameLog::default(),
            console_steps(),
            TourCallbacks::noop(),
            TourConfig::default(),
        );
        assert_eq!(page.listeners.len(), 2);
        drop(engine);
    }
    assert!(page.listeners.is_empty());
}

// ── Tracing capture ─────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    fields: HashMap<String, String>,
}

impl CapturedEvent {
    fn message(&self) -> &str {
        self.fields.get("message").map_or("", String::as_str)
    }
}

struct EventCapture(Arc<Mutex<Vec<CapturedEvent>>>);

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }
    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for EventCapture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        self.0.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            fields: visitor.0.into_iter().collect(),
        });
    }
}

fn with_captured_tracing(f: impl FnOnce()) -> Vec<CapturedEvent> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(EventCapture(Arc::clone(&events)));
    tracing::subscriber::with_default(subscriber, f);
    let captured = events.lock().unwrap().clone();
    captured
}

#[test]
fn lifecycle_emits_attach_and_detach_events() {
    let events = with_captured_tracing(|| {
        let page = console_page();
        let mut engine = TourEngine::mount(
            Rc::clone(&page),
            FrameLog::default(),
            console_steps(),
            TourCallbacks::noop(),
            TourConfig::default(),
        );
        engine.next();
        engine.close();
    });

    let count = |msg: &str| events.iter().filter(|e| e.message() == msg).count();
    assert_eq!(count("listener attached"), 2);
    assert_eq!(count("listener detached"), 2);
    assert_eq!(count("tour mounted"), 1);
    assert_eq!(count("tour unmounted"), 1);
    assert_eq!(count("tour closed"), 1);

    let step_change = events
        .iter()
        .find(|e| e.message() == "tour step changed")
        .expect("step change logged");
    assert_eq!(step_change.level, tracing::Level::DEBUG);
    assert_eq!(step_change.fields.get("to").map(String::as_str), Some("1"));
}

#[test]
fn empty_tour_warns() {
    let events = with_captured_tracing(|| {
        let page = console_page();
        let _engine = TourEngine::mount(
            page,
            FrameLog::default(),
            Vec::new(),
            TourCallbacks::noop(),
            TourConfig::default(),
        );
    });
    assert!(
        events
            .iter()
            .any(|e| e.level == tracing::Level::WARN && e.message().contains("no steps"))
    );
}
