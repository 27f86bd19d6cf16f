//! DOM styling driven by a real engine run on an in-memory page.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use waypoint_tour::{
    CardAction, Listener, ListenerId, ListenerRegistry, OverlayFrame, Page, PageRect, Presenter,
    ScrollIntoView, SignalKind, TourCallbacks, TourConfig, TourEngine, Viewport,
};
use waypoint_web::{DomLayout, Style, parse_action, parse_steps};

struct StaticPage {
    rects: HashMap<String, PageRect>,
    listeners: ListenerRegistry,
}

impl Page for StaticPage {
    fn viewport(&self) -> Viewport {
        Viewport::new(1024.0, 768.0)
    }

    fn bounding_rect(&self, target_id: &str) -> Option<PageRect> {
        self.rects.get(target_id).copied()
    }

    fn scroll_into_view(&self, _target_id: &str, _options: ScrollIntoView) {}

    fn add_listener(&self, kind: SignalKind, listener: Listener) -> ListenerId {
        self.listeners.add(kind, listener)
    }

    fn remove_listener(&self, id: ListenerId) {
        self.listeners.remove(id);
    }
}

#[derive(Clone, Default)]
struct Layouts(Rc<RefCell<Vec<Option<DomLayout>>>>);

impl Presenter for Layouts {
    fn present(&mut self, frame: Option<&OverlayFrame>) {
        self.0.borrow_mut().push(frame.map(DomLayout::from_frame));
    }
}

const STEPS: &str = r#"[
    { "targetId": "upload", "title": "Upload", "content": "Drop a file." },
    { "targetId": "rules", "title": "Rules", "content": "Pick a schema." }
]"#;

#[test]
fn button_clicks_walk_the_tour() {
    let page = Rc::new(StaticPage {
        rects: HashMap::from([
            ("upload".to_string(), PageRect::new(40.0, 100.0, 400.0, 120.0)),
            ("rules".to_string(), PageRect::new(600.0, 500.0, 380.0, 200.0)),
        ]),
        listeners: ListenerRegistry::new(),
    });
    let layouts = Layouts::default();
    let completed = Rc::new(RefCell::new(0));
    let done = Rc::clone(&completed);
    let mut engine = TourEngine::mount(
        Rc::clone(&page),
        layouts.clone(),
        parse_steps(STEPS).expect("steps"),
        TourCallbacks::noop().on_complete(move || *done.borrow_mut() += 1),
        TourConfig::default(),
    );

    // Clicks arrive as attribute values.
    for name in ["next", "next"] {
        let action = parse_action(name).expect("known action");
        engine.handle_action(action);
    }
    assert_eq!(*completed.borrow(), 1);
    assert_eq!(page.listeners.len(), 0);

    let log = layouts.0.borrow();
    let first = log[0].as_ref().expect("first step painted");
    assert_eq!(first.title, "Upload");
    assert_eq!(first.card.get("top"), Some("236px"));
    assert_eq!(first.back_label, None);

    // Rules sits low: 700 + 16 + 200 > 768, so the card flips above.
    let second = log[1].as_ref().expect("second step painted");
    assert_eq!(second.card.get("top"), Some("284px"));
    assert_eq!(second.card.get("left"), Some("600px"));
    assert_eq!(second.primary_label, "Finish");
    assert_eq!(second.back_label, Some("Back"));

    // Teardown clears last.
    assert!(log.last().is_some_and(Option::is_none));
}

#[test]
fn close_label_matches_card_action() {
    assert_eq!(parse_action("close"), Some(CardAction::Close));
    let frame = OverlayFrame::compose(
        &waypoint_tour::Step::new("a", "A", "a"),
        0,
        1,
        PageRect::new(10.0, 10.0, 10.0, 10.0),
        Viewport::new(800.0, 600.0),
        &TourConfig::default(),
    );
    assert_eq!(DomLayout::from_frame(&frame).close_label, "Close tutorial");
}

fn px(style: &Style, property: &str) -> f64 {
    style
        .get(property)
        .and_then(|v| v.strip_suffix("px"))
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(|| panic!("{property} missing in {style}"))
}

proptest! {
    #[test]
    fn shown_panes_have_positive_size(
        x in 0u32..800, y in 0u32..600, w in 0u32..800, h in 0u32..600,
    ) {
        let hole = PageRect::new(f64::from(x), f64::from(y), f64::from(w), f64::from(h));
        let frame = OverlayFrame::compose(
            &waypoint_tour::Step::new("t", "T", "t"),
            0,
            2,
            hole,
            Viewport::new(800.0, 600.0),
            &TourConfig::default(),
        );
        let layout = DomLayout::from_frame(&frame);
        for pane in layout.panes.iter().filter(|p| !p.is_hidden()) {
            prop_assert!(px(pane, "width") > 0.0, "{pane}");
            prop_assert!(px(pane, "height") > 0.0, "{pane}");
        }
        prop_assert_eq!(layout.dots.len(), 2);
    }
}
