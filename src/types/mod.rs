//! Wire types for the generation service.
//!
//! This module contains the request and response types for the
//! `generateContent` and `predict` surfaces.

pub mod content;
pub mod generation;
pub mod imagen;
pub mod safety;
pub mod suggestions;

pub use content::{Blob, Content, Part, Role};

pub use generation::{
    BlockReason, Candidate, FinishReason, GenerateContentRequest, GenerateContentResponse,
    GenerationConfig, Modality, PromptFeedback, UsageMetadata,
};

pub use imagen::{
    AspectRatio, PredictInstance, PredictParameters, PredictRequest, PredictResponse, Prediction,
};

pub use safety::{HarmCategory, HarmProbability, SafetyRating};

pub use suggestions::{suggestion_schema, Suggestion, SuggestionList};
