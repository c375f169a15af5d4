//! End-to-end tests over real HTTP against a local mock server.

use integrations_gemini_image::config::UserSettings;
use integrations_gemini_image::error::ErrorCategory;
use integrations_gemini_image::fixtures::{image_response, load_json_fixture, png_input, TINY_PNG_BASE64};
use integrations_gemini_image::types::AspectRatio;
use integrations_gemini_image::ImageEditor;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn editor_for(server: &MockServer) -> ImageEditor {
    let settings = Arc::new(UserSettings::with_api_key("wiremock-key"));
    settings.set_base_url(Some(server.uri()));
    ImageEditor::with_settings(settings)
}

#[tokio::test]
async fn test_edit_over_http() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash-image-preview:generateContent"))
        .and(header("x-goog-api-key", "wiremock-key"))
        .and(header("content-type", "application/json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(image_response("image/png", TINY_PNG_BASE64)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let editor = editor_for(&server).await;

    // Act
    let url = editor.apply_style(png_input(8, 8), "watercolor").await.unwrap();

    // Assert
    assert_eq!(url, format!("data:image/png;base64,{TINY_PNG_BASE64}"));
}

#[tokio::test]
async fn test_generate_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/imagen-4.0-generate-001:predict"))
        .and(body_partial_json(json!({
            "instances": [{"prompt": "a red fox"}],
            "parameters": {"sampleCount": 1, "outputMimeType": "image/png", "aspectRatio": "16:9"}
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(load_json_fixture::<Value>("responses/predict_success.json")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let editor = editor_for(&server).await;

    let url = editor
        .generate_image("a red fox", AspectRatio::Widescreen)
        .await
        .unwrap();

    assert_eq!(url, format!("data:image/png;base64,{TINY_PNG_BASE64}"));
}

#[tokio::test]
async fn test_invalid_key_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(load_json_fixture::<Value>("responses/api_key_invalid.json")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let editor = editor_for(&server).await;

    let error = editor
        .apply_filter(png_input(8, 8), "vintage sepia")
        .await
        .unwrap_err();

    assert_eq!(error.category, ErrorCategory::InvalidCredential);
}

#[tokio::test]
async fn test_unreachable_server_is_network_failure() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let settings = Arc::new(UserSettings::with_api_key("key"));
    settings.set_base_url(Some(uri));
    let editor = ImageEditor::with_settings(settings);

    let error = editor
        .apply_filter(png_input(8, 8), "vintage sepia")
        .await
        .unwrap_err();

    assert_eq!(error.category, ErrorCategory::NetworkFailure);
}
