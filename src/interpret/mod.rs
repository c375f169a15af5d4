//! Interpretation of `generateContent` responses.
//!
//! A response is classified as an image, a textual refusal, or malformed.
//! Policy blocks are not a separate outcome: the finish reason, prompt
//! block reason and safety ratings travel as a [`SafetyDetail`] on the
//! refusal or malformed outcome.

use crate::error::{GenerationError, ImageError, SafetyDetail, SafetyRatingInfo};
use crate::parts::to_data_url;
use crate::types::{GenerateContentResponse, Part, SafetyRating};

/// Result of interpreting one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// The model returned an image.
    Success {
        /// `data:<mime>;base64,<payload>` of the first image part.
        data_url: String,
    },
    /// The model answered with text instead of an image.
    Refusal {
        /// The first text part.
        text: String,
        /// Finish and safety metadata.
        detail: SafetyDetail,
    },
    /// The response carried neither a usable image nor a text answer.
    Malformed {
        /// What was missing.
        reason: String,
        /// Finish and safety metadata.
        detail: SafetyDetail,
    },
}

impl GenerationOutcome {
    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationOutcome::Success { .. } => "success",
            GenerationOutcome::Refusal { .. } => "refusal",
            GenerationOutcome::Malformed { .. } => "malformed",
        }
    }

    /// Whether this outcome may be retried with a fallback prompt.
    pub fn is_refusal(&self) -> bool {
        matches!(self, GenerationOutcome::Refusal { .. })
    }

    /// Converts into the image data URL, or the terminal error.
    pub fn into_result(self) -> Result<String, ImageError> {
        match self {
            GenerationOutcome::Success { data_url } => Ok(data_url),
            GenerationOutcome::Refusal { text, detail } => {
                Err(GenerationError::Refusal { text, detail }.into())
            }
            GenerationOutcome::Malformed { reason, detail } => {
                Err(GenerationError::Malformed { reason, detail }.into())
            }
        }
    }
}

/// Classifies a response.
///
/// In order:
/// 1. no candidate, or a candidate without parts: malformed
/// 2. any inline image part: success (the first one wins)
/// 3. a leading text part: refusal
/// 4. anything else: malformed
pub fn interpret(response: &GenerateContentResponse) -> GenerationOutcome {
    let detail = safety_detail(response);
    if detail.is_safety_block() {
        tracing::warn!(detail = %detail, "Generation blocked by safety filters");
    }

    let Some(candidate) = response.first_candidate() else {
        return GenerationOutcome::Malformed {
            reason: "response contained no candidates".to_string(),
            detail,
        };
    };

    let parts = candidate
        .content
        .as_ref()
        .map(|content| content.parts.as_slice())
        .unwrap_or_default();

    if parts.is_empty() {
        return GenerationOutcome::Malformed {
            reason: "candidate contained no content".to_string(),
            detail,
        };
    }

    let image = parts
        .iter()
        .filter_map(Part::as_inline_data)
        .find(|blob| !blob.data.is_empty());
    if let Some(blob) = image {
        return GenerationOutcome::Success {
            data_url: to_data_url(&blob.mime_type, &blob.data),
        };
    }

    match parts.first().and_then(Part::as_text) {
        Some(text) => GenerationOutcome::Refusal {
            text: text.to_string(),
            detail,
        },
        None => GenerationOutcome::Malformed {
            reason: "response contained neither an image nor text".to_string(),
            detail,
        },
    }
}

/// Collects finish reason, prompt block reason and safety ratings.
pub fn safety_detail(response: &GenerateContentResponse) -> SafetyDetail {
    let candidate = response.first_candidate();
    let feedback = response.prompt_feedback.as_ref();

    let candidate_ratings = candidate.and_then(|c| c.safety_ratings.as_deref()).unwrap_or_default();
    let prompt_ratings = feedback.and_then(|f| f.safety_ratings.as_deref()).unwrap_or_default();

    SafetyDetail {
        finish_reason: candidate
            .and_then(|c| c.finish_reason.as_ref())
            .map(|reason| reason.as_str().to_string()),
        block_reason: feedback
            .and_then(|f| f.block_reason.as_ref())
            .map(|reason| reason.as_str().to_string()),
        safety_ratings: candidate_ratings
            .iter()
            .chain(prompt_ratings)
            .map(rating_info)
            .collect(),
    }
}

fn rating_info(rating: &SafetyRating) -> SafetyRatingInfo {
    SafetyRatingInfo {
        category: rating.category.as_str().to_string(),
        probability: rating.probability.as_str().to_string(),
        blocked: rating.blocked.unwrap_or(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{image_response, load_json_fixture, text_response, TINY_PNG_BASE64};
    use serde_json::json;

    fn parse(value: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_image_success() {
        let outcome = interpret(&parse(image_response("image/png", TINY_PNG_BASE64)));
        assert_eq!(
            outcome,
            GenerationOutcome::Success {
                data_url: format!("data:image/png;base64,{TINY_PNG_BASE64}")
            }
        );
    }

    #[test]
    fn test_image_after_text_still_wins() {
        let response: GenerateContentResponse = load_json_fixture("responses/image_success.json");
        assert!(matches!(interpret(&response), GenerationOutcome::Success { .. }));
    }

    #[test]
    fn test_first_of_several_images_wins() {
        let response = parse(json!({"candidates": [{"content": {"parts": [
            {"inlineData": {"mimeType": "image/jpeg", "data": "Zmlyc3Q="}},
            {"inlineData": {"mimeType": "image/png", "data": "c2Vjb25k"}}
        ]}}]}));
        assert_eq!(
            interpret(&response).into_result().unwrap(),
            "data:image/jpeg;base64,Zmlyc3Q="
        );
    }

    #[test]
    fn test_text_refusal() {
        let outcome = interpret(&parse(text_response("I can't do that.")));
        match outcome {
            GenerationOutcome::Refusal { text, detail } => {
                assert_eq!(text, "I can't do that.");
                assert_eq!(detail.finish_reason.as_deref(), Some("STOP"));
                assert!(!detail.is_safety_block());
            }
            other => panic!("expected refusal, got {other:?}"),
        }
    }

    #[test]
    fn test_refusal_fixture_keeps_first_text() {
        let response: GenerateContentResponse = load_json_fixture("responses/text_refusal.json");
        let outcome = interpret(&response);
        assert!(outcome.is_refusal());
        assert!(matches!(
            outcome,
            GenerationOutcome::Refusal { ref text, .. } if text.starts_with("I'm unable to apply")
        ));
    }

    #[test]
    fn test_no_candidates_is_malformed_with_block_reason() {
        let response: GenerateContentResponse = load_json_fixture("responses/prompt_blocked.json");
        match interpret(&response) {
            GenerationOutcome::Malformed { detail, .. } => {
                assert_eq!(detail.block_reason.as_deref(), Some("SAFETY"));
                assert!(detail.is_safety_block());
                assert_eq!(detail.safety_ratings.len(), 1);
            }
            other => panic!("expected malformed, got {other:?}"),
        }
    }

    #[test]
    fn test_candidate_without_content_is_malformed() {
        let response: GenerateContentResponse = load_json_fixture("responses/image_safety_block.json");
        match interpret(&response) {
            GenerationOutcome::Malformed { reason, detail } => {
                assert_eq!(reason, "candidate contained no content");
                assert_eq!(detail.finish_reason.as_deref(), Some("IMAGE_SAFETY"));
                assert!(detail.safety_ratings.iter().any(|r| r.blocked));
            }
            other => panic!("expected malformed, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_parts_is_malformed() {
        let response = parse(json!({"candidates": [{"content": {"parts": []}, "finishReason": "STOP"}]}));
        assert_eq!(interpret(&response).kind(), "malformed");
    }

    #[test]
    fn test_unknown_part_only_is_malformed() {
        let response = parse(json!({"candidates": [{"content": {"parts": [
            {"functionCall": {"name": "x", "args": {}}}
        ]}}]}));
        assert_eq!(interpret(&response).kind(), "malformed");
    }

    #[test]
    fn test_empty_object_is_malformed() {
        assert_eq!(interpret(&GenerateContentResponse::default()).kind(), "malformed");
    }

    #[test]
    fn test_refusal_into_result() {
        let error = interpret(&parse(text_response("nope"))).into_result().unwrap_err();
        assert!(error
            .to_string()
            .contains("The model responded with text instead of an image: nope"));
    }
}
