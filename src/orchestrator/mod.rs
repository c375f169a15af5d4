//! Drives one generation operation from parts to final image.
//!
//! The orchestrator sends the primary parts, interprets the response and,
//! when the model answers with text and the plan has a fallback, sends the
//! fallback parts exactly once. Invocation errors are never retried.

use serde_json::json;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::client::ImageService;
use crate::error::{classify, ClassifiedError};
use crate::interpret::{interpret, GenerationOutcome};
use crate::observability::Logger;
use crate::parts::RetryPlan;
use crate::types::Modality;

/// Where an operation currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    /// Sending the primary parts.
    Attempting,
    /// Sending the fallback parts after a refusal.
    FallbackAttempting,
    /// A final result is available.
    Done,
}

impl AttemptState {
    fn attempt_number(self) -> u32 {
        match self {
            AttemptState::Attempting => 1,
            AttemptState::FallbackAttempting | AttemptState::Done => 2,
        }
    }
}

impl fmt::Display for AttemptState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttemptState::Attempting => "attempting",
            AttemptState::FallbackAttempting => "fallback_attempting",
            AttemptState::Done => "done",
        };
        f.write_str(name)
    }
}

/// Runs [`RetryPlan`]s against an [`ImageService`].
#[derive(Clone)]
pub struct RetryOrchestrator {
    service: Arc<dyn ImageService>,
    logger: Arc<dyn Logger>,
}

impl RetryOrchestrator {
    /// Creates an orchestrator.
    pub fn new(service: Arc<dyn ImageService>, logger: Arc<dyn Logger>) -> Self {
        Self { service, logger }
    }

    /// Executes `plan` for the user-facing `action`.
    ///
    /// Returns the image as a `data:` URL.
    ///
    /// # Errors
    ///
    /// Returns the classified terminal error. At most two invocations are
    /// made, the second only after a refusal with a fallback available.
    pub async fn run(&self, action: &str, plan: RetryPlan) -> Result<String, ClassifiedError> {
        let operation_id = Uuid::new_v4();
        let RetryPlan { primary, fallback } = plan;

        let mut state = AttemptState::Attempting;
        let mut parts = primary;
        let mut fallback = fallback;

        loop {
            let attempt = state.attempt_number();
            self.logger.debug(
                "Invoking generation",
                json!({
                    "operation_id": operation_id.to_string(),
                    "action": action,
                    "attempt": attempt,
                    "state": state.to_string(),
                    "parts": parts.len(),
                }),
            );

            let response = match self.service.invoke(parts, Modality::image_and_text()).await {
                Ok(response) => response,
                Err(e) => {
                    let classified = classify(&e, action);
                    self.logger.error(
                        "Generation request failed",
                        json!({
                            "operation_id": operation_id.to_string(),
                            "action": action,
                            "attempt": attempt,
                            "category": classified.category.to_string(),
                            "error": classified.user_message,
                        }),
                    );
                    return Err(classified);
                }
            };

            let outcome = interpret(&response);
            self.logger.info(
                "Generation attempt finished",
                json!({
                    "operation_id": operation_id.to_string(),
                    "action": action,
                    "attempt": attempt,
                    "outcome": outcome.kind(),
                }),
            );

            let next = match (outcome.is_refusal(), state, fallback.take()) {
                (true, AttemptState::Attempting, Some(next)) => next,
                _ => {
                    state = AttemptState::Done;
                    return self.finish(action, operation_id, state, outcome);
                }
            };

            self.logger.warn(
                "Model refused; retrying with fallback prompt",
                json!({
                    "operation_id": operation_id.to_string(),
                    "action": action,
                }),
            );
            state = AttemptState::FallbackAttempting;
            parts = next;
        }
    }

    fn finish(
        &self,
        action: &str,
        operation_id: Uuid,
        state: AttemptState,
        outcome: GenerationOutcome,
    ) -> Result<String, ClassifiedError> {
        outcome.into_result().map_err(|e| {
            let classified = classify(&e, action);
            self.logger.error(
                "Generation failed",
                json!({
                    "operation_id": operation_id.to_string(),
                    "action": action,
                    "state": state.to_string(),
                    "category": classified.category.to_string(),
                }),
            );
            classified
        })
    }
}

impl fmt::Debug for RetryOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryOrchestrator").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorCategory, ImageResult, NetworkError};
    use crate::fixtures::{image_response, text_response, TINY_PNG_BASE64};
    use crate::observability::NoopLogger;
    use crate::types::{AspectRatio, GenerateContentResponse, Part};
    use async_trait::async_trait;
    use serde_json::Value;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays scripted responses and records the parts it was sent.
    #[derive(Default)]
    struct ScriptedService {
        replies: Mutex<VecDeque<ImageResult<GenerateContentResponse>>>,
        calls: Mutex<Vec<Vec<Part>>>,
    }

    impl ScriptedService {
        fn push_json(&self, value: Value) {
            let response = serde_json::from_value(value).unwrap();
            self.replies.lock().unwrap().push_back(Ok(response));
        }

        fn push_error(&self, error: crate::error::ImageError) {
            self.replies.lock().unwrap().push_back(Err(error));
        }

        fn calls(&self) -> Vec<Vec<Part>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ImageService for ScriptedService {
        async fn invoke(
            &self,
            parts: Vec<Part>,
            _modalities: Vec<Modality>,
        ) -> ImageResult<GenerateContentResponse> {
            self.calls.lock().unwrap().push(parts);
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| panic!("unexpected invocation"))
        }

        async fn invoke_structured(&self, _parts: Vec<Part>, _schema: Value) -> ImageResult<Value> {
            unreachable!()
        }

        async fn generate_images(&self, _prompt: &str, _ar: AspectRatio) -> ImageResult<String> {
            unreachable!()
        }
    }

    fn orchestrator(service: &Arc<ScriptedService>) -> RetryOrchestrator {
        RetryOrchestrator::new(service.clone(), Arc::new(NoopLogger))
    }

    fn plan_with_fallback() -> RetryPlan {
        RetryPlan::with_fallback_text(
            vec![Part::inline("image/png", "AAAA"), Part::text("primary")],
            Some("fallback".to_string()),
        )
    }

    #[tokio::test]
    async fn test_success_first_try() {
        let service = Arc::new(ScriptedService::default());
        service.push_json(image_response("image/png", TINY_PNG_BASE64));

        let url = orchestrator(&service).run("apply filter", plan_with_fallback()).await.unwrap();

        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(service.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_refusal_then_fallback_success() {
        let service = Arc::new(ScriptedService::default());
        service.push_json(text_response("I can't apply that."));
        service.push_json(image_response("image/png", TINY_PNG_BASE64));

        let url = orchestrator(&service).run("apply filter", plan_with_fallback()).await.unwrap();

        assert!(url.starts_with("data:image/png;base64,"));
        let calls = service.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1][1].as_text(), Some("fallback"));
    }

    #[tokio::test]
    async fn test_second_refusal_is_terminal() {
        let service = Arc::new(ScriptedService::default());
        service.push_json(text_response("no"));
        service.push_json(text_response("still no"));

        let error = orchestrator(&service)
            .run("apply style", plan_with_fallback())
            .await
            .unwrap_err();

        assert_eq!(error.category, ErrorCategory::ServiceRefusal);
        assert!(error.user_message.contains("responded with text instead of an image"));
        assert_eq!(service.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_refusal_without_fallback() {
        let service = Arc::new(ScriptedService::default());
        service.push_json(text_response("no"));

        let plan = RetryPlan::single(vec![Part::text("remove background")]);
        let error = orchestrator(&service).run("remove background", plan).await.unwrap_err();

        assert_eq!(error.category, ErrorCategory::ServiceRefusal);
        assert_eq!(service.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_malformed_is_not_retried() {
        let service = Arc::new(ScriptedService::default());
        service.push_json(json!({"candidates": []}));

        let error = orchestrator(&service)
            .run("apply filter", plan_with_fallback())
            .await
            .unwrap_err();

        assert_eq!(error.category, ErrorCategory::MalformedResponse);
        assert_eq!(service.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_transport_error_is_not_retried() {
        let service = Arc::new(ScriptedService::default());
        service.push_error(NetworkError::Timeout.into());

        let error = orchestrator(&service)
            .run("apply filter", plan_with_fallback())
            .await
            .unwrap_err();

        assert_eq!(error.category, ErrorCategory::NetworkFailure);
        assert_eq!(error.action, "apply filter");
        assert_eq!(service.calls().len(), 1);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(AttemptState::FallbackAttempting.to_string(), "fallback_attempting");
        assert_eq!(AttemptState::Attempting.attempt_number(), 1);
    }
}
