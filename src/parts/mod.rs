//! Request part construction.
//!
//! Every editing operation is described by a [`RetryPlan`]: the parts sent
//! first, and optionally the parts to send once if the model answers with
//! text instead of an image.

mod encoder;
mod prompts;

pub use encoder::{to_data_url, to_inline_part};
pub use prompts::{
    background_removal, decade_fallback_prompt, decade_transform, fusion, point_edit,
    styled_edit, suggestion_parts, EditKind, HotSpot,
};

use crate::types::Part;

/// Parts for a primary attempt and an optional fallback attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPlan {
    /// Parts for the first invocation.
    pub primary: Vec<Part>,
    /// Parts for the single retry after a refusal. `None` makes a refusal terminal.
    pub fallback: Option<Vec<Part>>,
}

impl RetryPlan {
    /// A plan without a fallback.
    pub fn single(primary: Vec<Part>) -> Self {
        Self {
            primary,
            fallback: None,
        }
    }

    /// A plan whose fallback replaces the instruction text of `primary`.
    pub fn with_fallback_text(primary: Vec<Part>, fallback_text: Option<String>) -> Self {
        let fallback = fallback_text.map(|text| substitute_instruction(&primary, text));
        Self { primary, fallback }
    }

    /// Whether a refusal can be retried.
    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

/// Returns a copy of `parts` with the last text part replaced by `text`.
///
/// Image parts and their order are untouched. When there is no text part the
/// new text is appended.
pub fn substitute_instruction(parts: &[Part], text: String) -> Vec<Part> {
    let mut substituted = parts.to_vec();
    match substituted.iter().rposition(|part| part.as_text().is_some()) {
        Some(index) => substituted[index] = Part::text(text),
        None => substituted.push(Part::text(text)),
    }
    substituted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitute_replaces_last_text_only() {
        let parts = vec![
            Part::inline("image/png", "AAAA"),
            Part::text("first"),
            Part::inline("image/png", "BBBB"),
            Part::text("instruction"),
        ];

        let substituted = substitute_instruction(&parts, "replacement".to_string());

        assert_eq!(substituted.len(), 4);
        assert_eq!(substituted[1].as_text(), Some("first"));
        assert_eq!(substituted[3].as_text(), Some("replacement"));
        assert_eq!(substituted[2], parts[2]);
    }

    #[test]
    fn test_substitute_appends_without_text() {
        let parts = vec![Part::inline("image/png", "AAAA")];
        let substituted = substitute_instruction(&parts, "x".to_string());
        assert_eq!(substituted.len(), 2);
        assert_eq!(substituted[1].as_text(), Some("x"));
    }

    #[test]
    fn test_plan_without_fallback_text() {
        let plan = RetryPlan::with_fallback_text(vec![Part::text("a")], None);
        assert!(!plan.has_fallback());
    }
}
