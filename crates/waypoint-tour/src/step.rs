#![forbid(unsafe_code)]

//! Tour steps supplied by the host.

/// Directional hint for where a step's card should go.
///
/// Advisory only. The placement solver is free to ignore it, and the
/// default solver does; the hint is carried through to the overlay frame
/// for presenters that want it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Position {
    Top,
    Bottom,
    Left,
    Right,
}

/// One stop on the tour.
///
/// Immutable once handed to the engine. Serialized field names are
/// camelCase (`targetId`) to match what a JS host already passes around.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Step {
    /// Identifier of the page element to highlight.
    pub target_id: String,
    /// Card heading.
    pub title: String,
    /// Card body text.
    pub content: String,
    /// Optional placement hint.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub position: Option<Position>,
}

impl Step {
    /// Create a step without a position hint.
    #[must_use]
    pub fn new(
        target_id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            target_id: target_id.into(),
            title: title.into(),
            content: content.into(),
            position: None,
        }
    }

    /// Set the position hint.
    #[must_use]
    pub fn position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let step = Step::new("mapping-section", "3. Fix Issues", "Define a mapping.")
            .position(Position::Top);
        assert_eq!(step.target_id, "mapping-section");
        assert_eq!(step.title, "3. Fix Issues");
        assert_eq!(step.content, "Define a mapping.");
        assert_eq!(step.position, Some(Position::Top));
    }

    #[test]
    fn position_defaults_to_none() {
        assert_eq!(Step::new("a", "b", "c").position, None);
    }
}
