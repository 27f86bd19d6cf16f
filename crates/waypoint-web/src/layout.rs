#![forbid(unsafe_code)]

//! Overlay frame to DOM styling.
//!
//! Pure functions, compiled on every target so the styling rules are tested
//! natively. The wasm presenter only copies these strings into `style`
//! attributes and text nodes.

use std::fmt;

use waypoint_tour::{BACK_LABEL, CLOSE_LABEL, CardAction, OverlayFrame, PageRect};

/// Attribute carrying a button's [`CardAction`] for delegated click handling.
pub const ACTION_ATTR: &str = "data-waypoint-action";

const OUTLINE_COLOR: &str = "#facc15";
const OUTLINE_GLOW: &str = "0 0 15px rgba(250, 204, 21, 0.6)";
const DOT_ACTIVE: &str = "#2563eb";
const DOT_IDLE: &str = "#e5e7eb";

/// Attribute value for `action`.
#[must_use]
pub const fn action_name(action: CardAction) -> &'static str {
    match action {
        CardAction::Next => "next",
        CardAction::Back => "back",
        CardAction::Close => "close",
    }
}

/// Inverse of [`action_name`].
#[must_use]
pub fn parse_action(name: &str) -> Option<CardAction> {
    match name {
        "next" => Some(CardAction::Next),
        "back" => Some(CardAction::Back),
        "close" => Some(CardAction::Close),
        _ => None,
    }
}

/// An ordered list of CSS declarations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style(Vec<(&'static str, String)>);

impl Style {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `property`, replacing an earlier value.
    #[must_use]
    pub fn set(mut self, property: &'static str, value: impl Into<String>) -> Self {
        let value = value.into();
        match self.0.iter_mut().find(|(p, _)| *p == property) {
            Some(slot) => slot.1 = value,
            None => self.0.push((property, value)),
        }
        self
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(p, _)| *p == property)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_hidden(&self) -> bool {
        self.get("display") == Some("none")
    }

    /// Place at `rect` in the containing block.
    #[must_use]
    fn at(self, rect: PageRect) -> Self {
        self.set("top", px(rect.top()))
            .set("left", px(rect.left()))
            .set("width", px(rect.width))
            .set("height", px(rect.height))
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (property, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{property}: {value};")?;
        }
        Ok(())
    }
}

fn px(value: f64) -> String {
    format!("{value}px")
}

/// Styles for the portal root while nothing is shown.
#[must_use]
pub fn hidden_root() -> Style {
    Style::new().set("display", "none")
}

/// Everything the DOM presenter writes for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DomLayout {
    pub root: Style,
    /// Top, bottom, left, right.
    pub panes: [Style; 4],
    pub outline: Style,
    pub card: Style,
    pub dots: Vec<Style>,
    pub title: String,
    pub content: String,
    pub progress_label: String,
    pub close_label: &'static str,
    /// `None` on the first step.
    pub back_label: Option<&'static str>,
    pub primary_label: &'static str,
}

impl DomLayout {
    #[must_use]
    pub fn from_frame(frame: &OverlayFrame) -> Self {
        let layers = frame.layers;
        let transition = format!("all {}ms ease-in-out", layers.transition_ms);
        let shade = format!("rgba(0, 0, 0, {})", layers.mask_opacity);

        let pane = |rect: PageRect| {
            let style = Style::new()
                .set("position", "absolute")
                .at(rect)
                .set("background", shade.clone())
                .set("transition", transition.clone());
            // Degenerate panes have zero or negative extent; never hand
            // those to CSS.
            if rect.is_empty() {
                style.set("display", "none")
            } else {
                style.set("display", "block")
            }
        };

        let mask = &frame.mask;
        let panes = [
            pane(mask.top),
            pane(mask.bottom),
            pane(mask.left),
            pane(mask.right),
        ];

        let outline = Style::new()
            .set("position", "absolute")
            .at(frame.outline)
            .set("border", format!("2px solid {OUTLINE_COLOR}"))
            .set("border-radius", "4px")
            .set("box-shadow", OUTLINE_GLOW)
            .set("pointer-events", "none")
            .set("transition", transition.clone());

        let card = &frame.card;
        let card_style = Style::new()
            .set("position", "fixed")
            .set("z-index", layers.card_z_index.to_string())
            .set("top", px(card.origin.top))
            .set("left", px(card.origin.left))
            .set("width", px(card.width))
            .set("background", "#fff")
            .set("border-radius", "12px")
            .set("padding", "24px")
            .set("display", "flex")
            .set("flex-direction", "column")
            .set("gap", "16px");

        let dots = card
            .progress
            .iter()
            .map(|current| {
                Style::new()
                    .set("display", "inline-block")
                    .set("height", "6px")
                    .set("width", if current { "24px" } else { "6px" })
                    .set("border-radius", "9999px")
                    .set("background", if current { DOT_ACTIVE } else { DOT_IDLE })
                    .set("transition", transition.clone())
            })
            .collect();

        let root = Style::new()
            .set("display", "block")
            .set("position", "fixed")
            .set("inset", "0")
            .set("z-index", layers.mask_z_index.to_string())
            .set("overflow", "hidden");

        Self {
            root,
            panes,
            outline,
            card: card_style,
            dots,
            title: card.title.clone(),
            content: card.content.clone(),
            progress_label: card.progress.label(),
            close_label: CLOSE_LABEL,
            back_label: card.back_visible.then_some(BACK_LABEL),
            primary_label: card.primary.label(),
        }
    }
}
