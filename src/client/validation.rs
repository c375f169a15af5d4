//! Validation of outgoing requests.

use crate::error::{ImageResult, RequestError, ValidationDetail};
use crate::types::{GenerateContentRequest, Part, PredictRequest};

/// Validate a generate content request.
pub fn validate_generate_request(request: &GenerateContentRequest) -> ImageResult<()> {
    let mut details = Vec::new();

    if request.contents.is_empty() {
        details.push(ValidationDetail {
            field: "contents".to_string(),
            description: "Contents array cannot be empty".to_string(),
        });
    }

    for (idx, content) in request.contents.iter().enumerate() {
        if content.parts.is_empty() {
            details.push(ValidationDetail {
                field: format!("contents[{}].parts", idx),
                description: "Content must have at least one part".to_string(),
            });
        }

        for (part_idx, part) in content.parts.iter().enumerate() {
            details.extend(part_details(part, &format!("contents[{}].parts[{}]", idx, part_idx)));
        }
    }

    finish("Invalid generate content request", details)
}

/// Validate a predict request.
pub fn validate_predict_request(request: &PredictRequest) -> ImageResult<()> {
    let mut details = Vec::new();

    if request.instances.is_empty() {
        details.push(ValidationDetail {
            field: "instances".to_string(),
            description: "At least one instance is required".to_string(),
        });
    }

    for (idx, instance) in request.instances.iter().enumerate() {
        if instance.prompt.trim().is_empty() {
            details.push(ValidationDetail {
                field: format!("instances[{}].prompt", idx),
                description: "Prompt cannot be empty".to_string(),
            });
        }
    }

    if request.parameters.sample_count == 0 {
        details.push(ValidationDetail {
            field: "parameters.sampleCount".to_string(),
            description: "sampleCount must be >= 1".to_string(),
        });
    }

    finish("Invalid predict request", details)
}

fn part_details(part: &Part, field_prefix: &str) -> Vec<ValidationDetail> {
    let mut details = Vec::new();

    match part {
        Part::Text { text } => {
            if text.trim().is_empty() {
                details.push(ValidationDetail {
                    field: format!("{}.text", field_prefix),
                    description: "Text cannot be empty".to_string(),
                });
            }
        }
        Part::InlineData { inline_data } => {
            if inline_data.mime_type.is_empty() {
                details.push(ValidationDetail {
                    field: format!("{}.inlineData.mimeType", field_prefix),
                    description: "MIME type is required".to_string(),
                });
            }
            if inline_data.data.is_empty() {
                details.push(ValidationDetail {
                    field: format!("{}.inlineData.data", field_prefix),
                    description: "Data cannot be empty".to_string(),
                });
            }
        }
        Part::Other(_) => {
            details.push(ValidationDetail {
                field: field_prefix.to_string(),
                description: "Only text and inline image parts can be sent".to_string(),
            });
        }
    }

    details
}

fn finish(message: &str, details: Vec<ValidationDetail>) -> ImageResult<()> {
    if details.is_empty() {
        return Ok(());
    }

    Err(RequestError::ValidationError {
        message: message.to_string(),
        details,
    }
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ImageError;
    use crate::types::{AspectRatio, Content};

    fn request(parts: Vec<Part>) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::user(parts)],
            generation_config: None,
        }
    }

    #[test]
    fn test_valid_request() {
        let parts = vec![Part::inline("image/png", "AAAA"), Part::text("do it")];
        assert!(validate_generate_request(&request(parts)).is_ok());
    }

    #[test]
    fn test_collects_all_details() {
        let parts = vec![Part::inline("", ""), Part::text("  "), Part::Other(serde_json::json!({}))];
        let error = validate_generate_request(&request(parts)).unwrap_err();

        match error {
            ImageError::Request(RequestError::ValidationError { details, .. }) => {
                let fields: Vec<_> = details.iter().map(|d| d.field.as_str()).collect();
                assert_eq!(
                    fields,
                    vec![
                        "contents[0].parts[0].inlineData.mimeType",
                        "contents[0].parts[0].inlineData.data",
                        "contents[0].parts[1].text",
                        "contents[0].parts[2]",
                    ]
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_parts() {
        assert!(validate_generate_request(&request(vec![])).is_err());
    }

    #[test]
    fn test_predict_prompt_required() {
        let request = PredictRequest::single_png("   ", AspectRatio::Square);
        assert!(validate_predict_request(&request).is_err());
        assert!(validate_predict_request(&PredictRequest::single_png("a cat", AspectRatio::Square)).is_ok());
    }
}
