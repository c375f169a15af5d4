//! Safety-related types for the Gemini API.
//!
//! This module contains the safety ratings reported on responses.
//! Every enum has a catch-all variant so new values from the service never
//! break response decoding.

use serde::{Deserialize, Serialize};

/// Categories of harmful content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum HarmCategory {
    /// Harassment content.
    #[serde(rename = "HARM_CATEGORY_HARASSMENT")]
    Harassment,
    /// Hate speech content.
    #[serde(rename = "HARM_CATEGORY_HATE_SPEECH")]
    HateSpeech,
    /// Sexually explicit content.
    #[serde(rename = "HARM_CATEGORY_SEXUALLY_EXPLICIT")]
    SexuallyExplicit,
    /// Dangerous content.
    #[serde(rename = "HARM_CATEGORY_DANGEROUS_CONTENT")]
    DangerousContent,
    /// Civic integrity content.
    #[serde(rename = "HARM_CATEGORY_CIVIC_INTEGRITY")]
    CivicIntegrity,
    /// Unrecognized category.
    #[serde(rename = "HARM_CATEGORY_UNSPECIFIED", other)]
    Unspecified,
}

impl HarmCategory {
    /// Wire name of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            HarmCategory::Harassment => "HARM_CATEGORY_HARASSMENT",
            HarmCategory::HateSpeech => "HARM_CATEGORY_HATE_SPEECH",
            HarmCategory::SexuallyExplicit => "HARM_CATEGORY_SEXUALLY_EXPLICIT",
            HarmCategory::DangerousContent => "HARM_CATEGORY_DANGEROUS_CONTENT",
            HarmCategory::CivicIntegrity => "HARM_CATEGORY_CIVIC_INTEGRITY",
            HarmCategory::Unspecified => "HARM_CATEGORY_UNSPECIFIED",
        }
    }
}

/// Safety rating for a piece of content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SafetyRating {
    /// The harm category.
    pub category: HarmCategory,
    /// The probability of harm.
    pub probability: HarmProbability,
    /// Whether this rating caused the content to be blocked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked: Option<bool>,
}

/// Probability levels for harmful content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HarmProbability {
    /// Negligible probability.
    Negligible,
    /// Low probability.
    Low,
    /// Medium probability.
    Medium,
    /// High probability.
    High,
    /// Unrecognized probability.
    #[serde(rename = "HARM_PROBABILITY_UNSPECIFIED", other)]
    Unspecified,
}

impl HarmProbability {
    /// Wire name of the probability.
    pub fn as_str(&self) -> &'static str {
        match self {
            HarmProbability::Negligible => "NEGLIGIBLE",
            HarmProbability::Low => "LOW",
            HarmProbability::Medium => "MEDIUM",
            HarmProbability::High => "HIGH",
            HarmProbability::Unspecified => "HARM_PROBABILITY_UNSPECIFIED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_values_fall_back() {
        let rating: SafetyRating = serde_json::from_str(
            r#"{"category":"HARM_CATEGORY_NEW_THING","probability":"SOMETIMES","blocked":true}"#,
        )
        .unwrap();
        assert_eq!(rating.category, HarmCategory::Unspecified);
        assert_eq!(rating.probability, HarmProbability::Unspecified);
        assert_eq!(rating.blocked, Some(true));
    }
}
