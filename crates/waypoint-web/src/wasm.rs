#![forbid(unsafe_code)]

//! `wasm-bindgen` exports: a [`Page`] over the live document, a DOM
//! [`Presenter`] portalled into `document.body`, and the [`WebTour`] handle.
//!
//! Only compiled on `wasm32` targets.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use js_sys::Reflect;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, ScrollIntoViewOptions, ScrollLogicalPosition, Window};

use waypoint_tour::{
    CardAction, Listener, ListenerId, OverlayFrame, Page, PageRect, PageSignal, Presenter,
    ScrollAlign, ScrollBehavior, ScrollIntoView, SignalKind, SignalOrigin, TourCallbacks,
    TourConfig, TourEngine, Viewport,
};

use crate::layout::{ACTION_ATTR, DomLayout, action_name, hidden_root, parse_action};
use crate::steps::parse_steps;

fn console_error(msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(error) = Reflect::get(&console, &"error".into()) else {
        return;
    };
    let Ok(error_fn) = error.dyn_into::<js_sys::Function>() else {
        return;
    };
    let _ = error_fn.call1(&console, &JsValue::from_str(msg));
}

fn install_panic_hook() {
    use std::sync::Once;

    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!(
                    "panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                )
            } else {
                format!("panic: {info}")
            };
            console_error(&msg);
        }));
    });
}

fn js_error(msg: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&msg.to_string())
}

fn viewport_of(window: &Window, document: &Document) -> Viewport {
    let measure = |value: Result<JsValue, JsValue>| {
        value.ok().and_then(|v| v.as_f64()).filter(|v| *v > 0.0)
    };
    let fallback = document.document_element();
    let width = measure(window.inner_width())
        .or_else(|| fallback.as_ref().map(|el| f64::from(el.client_width())))
        .unwrap_or(0.0);
    let height = measure(window.inner_height())
        .or_else(|| fallback.as_ref().map(|el| f64::from(el.client_height())))
        .unwrap_or(0.0);
    Viewport::new(width, height)
}

fn origin_of(event: &Event) -> SignalOrigin {
    match event.target().as_ref().and_then(|t| t.dyn_ref::<Element>()) {
        Some(element) => SignalOrigin::Element(element.id()),
        // Document and window scrolls both target the document.
        None => SignalOrigin::Window,
    }
}

const fn logical_position(align: ScrollAlign) -> ScrollLogicalPosition {
    match align {
        ScrollAlign::Start => ScrollLogicalPosition::Start,
        ScrollAlign::Center => ScrollLogicalPosition::Center,
        ScrollAlign::End => ScrollLogicalPosition::End,
        ScrollAlign::Nearest => ScrollLogicalPosition::Nearest,
    }
}

struct Registration {
    kind: SignalKind,
    closure: Closure<dyn FnMut(Event)>,
}

/// [`Page`] over the browser window.
pub struct DomPage {
    window: Window,
    document: Document,
    next_id: Cell<u64>,
    registrations: RefCell<HashMap<ListenerId, Registration>>,
}

impl DomPage {
    fn new(window: Window, document: Document) -> Self {
        Self {
            window,
            document,
            next_id: Cell::new(0),
            registrations: RefCell::new(HashMap::new()),
        }
    }

    fn detach(&self, kind: SignalKind, closure: &Closure<dyn FnMut(Event)>) {
        let capture = matches!(kind, SignalKind::Scroll { capture: true });
        if let Err(err) = self.window.remove_event_listener_with_callback_and_bool(
            kind.event_type(),
            closure.as_ref().unchecked_ref(),
            capture,
        ) {
            tracing::warn!(?err, event = kind.event_type(), "removeEventListener failed");
        }
    }
}

impl Page for DomPage {
    fn viewport(&self) -> Viewport {
        viewport_of(&self.window, &self.document)
    }

    fn bounding_rect(&self, target_id: &str) -> Option<PageRect> {
        let rect = self
            .document
            .get_element_by_id(target_id)?
            .get_bounding_client_rect();
        Some(PageRect::new(rect.x(), rect.y(), rect.width(), rect.height()))
    }

    fn scroll_into_view(&self, target_id: &str, options: ScrollIntoView) {
        let Some(element) = self.document.get_element_by_id(target_id) else {
            return;
        };
        let opts = ScrollIntoViewOptions::new();
        opts.set_behavior(match options.behavior {
            ScrollBehavior::Smooth => web_sys::ScrollBehavior::Smooth,
            ScrollBehavior::Instant => web_sys::ScrollBehavior::Instant,
        });
        opts.set_block(logical_position(options.block));
        opts.set_inline(logical_position(options.inline));
        element.scroll_into_view_with_scroll_into_view_options(&opts);
    }

    fn add_listener(&self, kind: SignalKind, listener: Listener) -> ListenerId {
        let id = ListenerId::new(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);

        let window = self.window.clone();
        let document = self.document.clone();
        let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let signal = match kind {
                SignalKind::Resize => PageSignal::Resized(viewport_of(&window, &document)),
                SignalKind::Scroll { .. } => PageSignal::Scrolled {
                    origin: origin_of(&event),
                },
            };
            if kind.accepts(&signal) {
                listener(&signal);
            }
        });

        let capture = matches!(kind, SignalKind::Scroll { capture: true });
        if let Err(err) = self.window.add_event_listener_with_callback_and_bool(
            kind.event_type(),
            closure.as_ref().unchecked_ref(),
            capture,
        ) {
            tracing::warn!(?err, event = kind.event_type(), "addEventListener failed");
        }
        self.registrations
            .borrow_mut()
            .insert(id, Registration { kind, closure });
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        let removed = self.registrations.borrow_mut().remove(&id);
        if let Some(registration) = removed {
            self.detach(registration.kind, &registration.closure);
        }
    }
}

impl Drop for DomPage {
    fn drop(&mut self) {
        let registrations: Vec<Registration> = self
            .registrations
            .borrow_mut()
            .drain()
            .map(|(_, r)| r)
            .collect();
        for registration in &registrations {
            self.detach(registration.kind, &registration.closure);
        }
    }
}

struct Nodes {
    root: Element,
    panes: [Element; 4],
    outline: Element,
    card: Element,
    title: Element,
    body: Element,
    dots: Element,
    back: Element,
    primary: Element,
}

fn element(document: &Document, tag: &str, parent: &Element) -> Result<Element, JsValue> {
    let el = document.create_element(tag)?;
    parent.append_child(&el)?;
    Ok(el)
}

fn button(
    document: &Document,
    parent: &Element,
    action: CardAction,
) -> Result<Element, JsValue> {
    let el = element(document, "button", parent)?;
    el.set_attribute("type", "button")?;
    el.set_attribute(ACTION_ATTR, action_name(action))?;
    Ok(el)
}

impl Nodes {
    fn build(document: &Document, on_click: &js_sys::Function) -> Result<Self, JsValue> {
        let body = document
            .body()
            .ok_or_else(|| js_error("document has no body"))?;
        let root = document.create_element("div")?;
        root.set_attribute("aria-live", "polite")?;
        root.set_attribute("data-waypoint", "overlay")?;
        root.add_event_listener_with_callback("click", on_click)?;

        let panes = [
            element(document, "div", &root)?,
            element(document, "div", &root)?,
            element(document, "div", &root)?,
            element(document, "div", &root)?,
        ];
        let outline = element(document, "div", &root)?;

        let card = element(document, "div", &root)?;
        card.set_attribute("role", "dialog")?;
        let header = element(document, "div", &card)?;
        let title = element(document, "h3", &header)?;
        let close = button(document, &header, CardAction::Close)?;
        close.set_attribute("aria-label", waypoint_tour::CLOSE_LABEL)?;
        close.set_text_content(Some("\u{2715}"));
        let text = element(document, "p", &card)?;
        let footer = element(document, "div", &card)?;
        let dots = element(document, "div", &footer)?;
        let controls = element(document, "div", &footer)?;
        let back = button(document, &controls, CardAction::Back)?;
        let primary = button(document, &controls, CardAction::Next)?;

        body.append_child(&root)?;
        Ok(Self {
            root,
            panes,
            outline,
            card,
            title,
            body: text,
            dots,
            back,
            primary,
        })
    }

    fn apply(&self, document: &Document, layout: &DomLayout) -> Result<(), JsValue> {
        self.root.set_attribute("style", &layout.root.to_string())?;
        for (pane, style) in self.panes.iter().zip(&layout.panes) {
            pane.set_attribute("style", &style.to_string())?;
        }
        self.outline
            .set_attribute("style", &layout.outline.to_string())?;
        self.card.set_attribute("style", &layout.card.to_string())?;
        self.card
            .set_attribute("aria-label", &layout.progress_label)?;
        self.title.set_text_content(Some(&layout.title));
        self.body.set_text_content(Some(&layout.content));

        self.dots.set_inner_html("");
        for style in &layout.dots {
            let dot = element(document, "span", &self.dots)?;
            dot.set_attribute("style", &style.to_string())?;
        }

        match layout.back_label {
            Some(label) => {
                self.back.remove_attribute("hidden")?;
                self.back.set_text_content(Some(label));
            }
            None => self.back.set_attribute("hidden", "")?,
        }
        self.primary.set_text_content(Some(layout.primary_label));
        Ok(())
    }
}

/// [`Presenter`] that keeps one overlay subtree under `document.body`.
///
/// Nodes are created on the first frame and restyled in place afterwards,
/// so CSS transitions animate between steps.
pub struct DomPresenter {
    document: Document,
    on_click: js_sys::Function,
    nodes: Option<Nodes>,
}

impl DomPresenter {
    fn new(document: Document, on_click: js_sys::Function) -> Self {
        Self {
            document,
            on_click,
            nodes: None,
        }
    }

    fn paint(&mut self, frame: &OverlayFrame) -> Result<(), JsValue> {
        if self.nodes.is_none() {
            self.nodes = Some(Nodes::build(&self.document, &self.on_click)?);
        }
        match &self.nodes {
            Some(nodes) => nodes.apply(&self.document, &DomLayout::from_frame(frame)),
            None => Ok(()),
        }
    }
}

impl Presenter for DomPresenter {
    fn present(&mut self, frame: Option<&OverlayFrame>) {
        let result = match frame {
            Some(frame) => self.paint(frame),
            None => match &self.nodes {
                Some(nodes) => nodes
                    .root
                    .set_attribute("style", &hidden_root().to_string()),
                None => Ok(()),
            },
        };
        if let Err(err) = result {
            tracing::warn!(?err, "overlay paint failed");
        }
    }

    fn unmount(&mut self) {
        if let Some(nodes) = self.nodes.take() {
            if let Err(err) = nodes
                .root
                .remove_event_listener_with_callback("click", &self.on_click)
            {
                tracing::warn!(?err, event = "click", "removeEventListener failed");
            }
            nodes.root.remove();
        }
    }
}

type DomEngine = TourEngine<DomPage, DomPresenter>;
type EngineSlot = Rc<RefCell<Option<DomEngine>>>;

fn clicked_action(event: &Event) -> Option<CardAction> {
    let target = event.target()?;
    let element = target.dyn_ref::<Element>()?;
    let button = element.closest(&format!("[{ACTION_ATTR}]")).ok()??;
    parse_action(&button.get_attribute(ACTION_ATTR)?)
}

fn js_callback(function: js_sys::Function, name: &'static str) -> impl FnMut() + 'static {
    move || {
        if let Err(err) = function.call0(&JsValue::NULL) {
            tracing::warn!(?err, callback = name, "host callback threw");
        }
    }
}

/// A guided tour mounted on the current document.
///
/// ```js
/// const tour = new WebTour(JSON.stringify(steps), onClose, onComplete);
/// tour.next();
/// tour.free();
/// ```
#[wasm_bindgen]
pub struct WebTour {
    // Dropped before the click closure that points back into it.
    engine: EngineSlot,
    _click: Closure<dyn FnMut(Event)>,
}

impl WebTour {
    fn mount(
        steps_json: &str,
        config: TourConfig,
        on_close: js_sys::Function,
        on_complete: js_sys::Function,
    ) -> Result<Self, JsValue> {
        install_panic_hook();
        let steps = parse_steps(steps_json).map_err(js_error)?;
        let window = web_sys::window().ok_or_else(|| js_error("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| js_error("window has no document"))?;

        let slot: EngineSlot = Rc::new(RefCell::new(None));
        let weak = Rc::downgrade(&slot);
        let click = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            let Some(action) = clicked_action(&event) else {
                return;
            };
            let Some(slot) = weak.upgrade() else {
                return;
            };
            let Ok(mut engine) = slot.try_borrow_mut() else {
                tracing::warn!(?action, "card action ignored: tour busy");
                return;
            };
            if let Some(engine) = engine.as_mut() {
                engine.handle_action(action);
            }
        });

        let presenter = DomPresenter::new(
            document.clone(),
            click.as_ref().unchecked_ref::<js_sys::Function>().clone(),
        );
        let page = Rc::new(DomPage::new(window, document));
        let callbacks = TourCallbacks::new(
            js_callback(on_close, "onClose"),
            js_callback(on_complete, "onComplete"),
        );
        let engine = TourEngine::mount(page, presenter, steps, callbacks, config);
        *slot.borrow_mut() = Some(engine);

        Ok(Self {
            engine: slot,
            _click: click,
        })
    }

    fn with_engine<T>(&self, fallback: T, f: impl FnOnce(&mut DomEngine) -> T) -> T {
        match self.engine.try_borrow_mut() {
            Ok(mut slot) => slot.as_mut().map_or(fallback, f),
            Err(_) => {
                tracing::warn!("tour call ignored: re-entered from a tour callback");
                fallback
            }
        }
    }
}

#[wasm_bindgen]
impl WebTour {
    /// Mount a tour with the default look.
    #[wasm_bindgen(constructor)]
    pub fn new(
        steps_json: &str,
        on_close: js_sys::Function,
        on_complete: js_sys::Function,
    ) -> Result<WebTour, JsValue> {
        Self::mount(steps_json, TourConfig::default(), on_close, on_complete)
    }

    /// Mount a tour with a JSON config; missing fields keep their defaults.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(
        steps_json: &str,
        config_json: &str,
        on_close: js_sys::Function,
        on_complete: js_sys::Function,
    ) -> Result<WebTour, JsValue> {
        let config: TourConfig = serde_json::from_str(config_json).map_err(js_error)?;
        let problems = config.validate();
        if !problems.is_empty() {
            return Err(js_error(problems.join("; ")));
        }
        Self::mount(steps_json, config, on_close, on_complete)
    }

    pub fn next(&self) {
        self.with_engine((), |engine| {
            engine.next();
        });
    }

    pub fn back(&self) {
        self.with_engine((), |engine| {
            engine.back();
        });
    }

    pub fn close(&self) {
        self.with_engine((), |engine| {
            engine.close();
        });
    }

    /// Re-measure after the host changed the layout without a resize or
    /// scroll (e.g. a section expanded).
    pub fn refresh(&self) {
        self.with_engine((), |engine| engine.refresh());
    }

    /// Current step, or `undefined` once the tour has ended.
    #[wasm_bindgen(js_name = currentIndex)]
    pub fn current_index(&self) -> Option<u32> {
        self.with_engine(None, |engine| {
            engine
                .current_index()
                .and_then(|index| u32::try_from(index).ok())
        })
    }

    #[wasm_bindgen(js_name = isMounted)]
    pub fn is_mounted(&self) -> bool {
        self.with_engine(false, |engine| engine.is_mounted())
    }

    #[wasm_bindgen(js_name = stepCount)]
    pub fn step_count(&self) -> u32 {
        self.with_engine(0, |engine| {
            u32::try_from(engine.step_count()).unwrap_or(u32::MAX)
        })
    }
}
