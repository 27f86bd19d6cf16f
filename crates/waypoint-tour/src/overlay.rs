#![forbid(unsafe_code)]

//! Overlay frames and the presenter seam.
//!
//! An [`OverlayFrame`] is everything a backend needs to paint one step:
//! mask panes, highlight outline, and the card with its controls. Frames
//! exist only for a resolved target; "render nothing" is `present(None)`.

use waypoint_core::{PageRect, Viewport};

use crate::config::TourConfig;
use crate::mask::{MaskPanes, outline};
use crate::placement::{CardOrigin, CardSide, place_card};
use crate::step::{Position, Step};

/// Accessible label of the card's close control.
pub const CLOSE_LABEL: &str = "Close tutorial";

/// Label of the card's back control.
pub const BACK_LABEL: &str = "Back";

/// A control on the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CardAction {
    Next,
    Back,
    Close,
}

/// The card's primary button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum PrimaryAction {
    Next,
    /// Shown on the last step.
    Finish,
}

impl PrimaryAction {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Next => "Next",
            Self::Finish => "Finish",
        }
    }
}

/// Step progress indicator: one dot per step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ProgressDots {
    pub count: usize,
    pub current: usize,
}

impl ProgressDots {
    /// One flag per step; `true` marks the current one.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.count).map(|index| index == self.current)
    }

    /// Human-readable progress, e.g. "2 of 3".
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} of {}", self.current + 1, self.count)
    }
}

/// Card contents and position.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct CardView {
    pub origin: CardOrigin,
    pub side: CardSide,
    /// Rendered width: the configured width capped by the viewport ratio.
    pub width: f64,
    pub title: String,
    pub content: String,
    /// The step's hint, passed through untouched.
    pub position_hint: Option<Position>,
    pub progress: ProgressDots,
    /// Whether the back control is offered (not on the first step).
    pub back_visible: bool,
    pub primary: PrimaryAction,
}

impl CardView {
    /// The card's bounds using the assumed height.
    #[must_use]
    pub fn bounds(&self, assumed_height: f64) -> PageRect {
        PageRect::new(self.origin.left, self.origin.top, self.width, assumed_height)
    }

    /// Controls available on this card, in tab order.
    #[must_use]
    pub fn actions(&self) -> Vec<CardAction> {
        let mut actions = vec![CardAction::Close];
        if self.back_visible {
            actions.push(CardAction::Back);
        }
        actions.push(CardAction::Next);
        actions
    }
}

/// Stacking and styling hints for presenters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Layers {
    pub mask_z_index: i32,
    pub card_z_index: i32,
    pub mask_opacity: f64,
    pub transition_ms: u64,
}

/// Everything needed to paint one step.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OverlayFrame {
    pub step_index: usize,
    pub step_count: usize,
    pub target_id: String,
    pub viewport: Viewport,
    /// The unmasked region: exactly the target's bounds.
    pub hole: PageRect,
    pub mask: MaskPanes,
    pub outline: PageRect,
    pub card: CardView,
    pub layers: Layers,
}

impl OverlayFrame {
    /// Compose the frame for `step` with its target resolved at `hole`.
    #[must_use]
    pub fn compose(
        step: &Step,
        step_index: usize,
        step_count: usize,
        hole: PageRect,
        viewport: Viewport,
        config: &TourConfig,
    ) -> Self {
        let placement = place_card(hole, viewport, &config.card_metrics());
        let width = config
            .card_width
            .min(viewport.width * config.card_max_width_ratio);
        let is_last = step_index + 1 >= step_count;

        Self {
            step_index,
            step_count,
            target_id: step.target_id.clone(),
            viewport,
            hole,
            mask: MaskPanes::solve(hole, viewport),
            outline: outline(hole, config.outline_inset),
            card: CardView {
                origin: placement.origin,
                side: placement.side,
                width,
                title: step.title.clone(),
                content: step.content.clone(),
                position_hint: step.position,
                progress: ProgressDots {
                    count: step_count,
                    current: step_index,
                },
                back_visible: step_index > 0,
                primary: if is_last {
                    PrimaryAction::Finish
                } else {
                    PrimaryAction::Next
                },
            },
            layers: Layers {
                mask_z_index: config.mask_z_index,
                card_z_index: config.card_z_index,
                mask_opacity: config.mask_opacity,
                transition_ms: config.transition_ms,
            },
        }
    }
}

/// Backend that paints overlay frames.
pub trait Presenter {
    /// Paint `frame`, or clear the overlay when `None`.
    fn present(&mut self, frame: Option<&OverlayFrame>);

    /// Tear down for good. Called once when the engine unmounts.
    fn unmount(&mut self) {
        self.present(None);
    }
}

impl<T: Presenter + ?Sized> Presenter for Box<T> {
    fn present(&mut self, frame: Option<&OverlayFrame>) {
        (**self).present(frame);
    }

    fn unmount(&mut self) {
        (**self).unmount();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compose(index: usize, count: usize, viewport: Viewport) -> OverlayFrame {
        let step = Step::new("validate-file-section", "2. Validate Data", "Upload here.")
            .position(Position::Left);
        OverlayFrame::compose(
            &step,
            index,
            count,
            PageRect::from_edges(100.0, 50.0, 250.0, 150.0),
            viewport,
            &TourConfig::default(),
        )
    }

    #[test]
    fn first_step_has_no_back_and_shows_next() {
        let frame = compose(0, 3, Viewport::new(800.0, 600.0));
        assert!(!frame.card.back_visible);
        assert_eq!(frame.card.primary, PrimaryAction::Next);
        assert_eq!(
            frame.card.actions(),
            vec![CardAction::Close, CardAction::Next]
        );
        assert_eq!(frame.card.progress.label(), "1 of 3");
    }

    #[test]
    fn last_step_shows_finish_and_back() {
        let frame = compose(2, 3, Viewport::new(800.0, 600.0));
        assert!(frame.card.back_visible);
        assert_eq!(frame.card.primary.label(), "Finish");
        let dots: Vec<bool> = frame.card.progress.iter().collect();
        assert_eq!(dots, vec![false, false, true]);
    }

    #[test]
    fn card_width_caps_at_ninety_percent_of_viewport() {
        assert_eq!(compose(0, 1, Viewport::new(800.0, 600.0)).card.width, 320.0);
        assert_eq!(compose(0, 1, Viewport::new(300.0, 600.0)).card.width, 270.0);
    }

    #[test]
    fn frame_carries_geometry_hint_and_layers() {
        let frame = compose(1, 3, Viewport::new(800.0, 600.0));
        assert_eq!(frame.hole, PageRect::new(50.0, 100.0, 200.0, 50.0));
        assert_eq!(frame.mask.top, PageRect::new(0.0, 0.0, 800.0, 100.0));
        assert_eq!(frame.outline, PageRect::new(46.0, 96.0, 208.0, 58.0));
        assert_eq!(frame.card.origin, CardOrigin { top: 166.0, left: 50.0 });
        assert_eq!(frame.card.position_hint, Some(Position::Left));
        assert_eq!(frame.layers.mask_z_index, 50);
        assert_eq!(frame.layers.card_z_index, 60);
        assert_eq!(frame.target_id, "validate-file-section");
    }
}
