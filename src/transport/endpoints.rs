//! Endpoint path builders.

/// Base path for models endpoints.
pub const MODELS: &str = "/models";

/// Constructs a path for the generateContent endpoint.
///
/// # Example
///
/// ```
/// use integrations_gemini_image::transport::endpoints;
///
/// let path = endpoints::generate_content("gemini-2.5-flash-image-preview");
/// assert_eq!(path, "/models/gemini-2.5-flash-image-preview:generateContent");
/// ```
pub fn generate_content(model: &str) -> String {
    format!("{}/{}:generateContent", MODELS, model)
}

/// Constructs a path for the predict endpoint used by image generation models.
///
/// # Example
///
/// ```
/// use integrations_gemini_image::transport::endpoints;
///
/// let path = endpoints::predict("imagen-4.0-generate-001");
/// assert_eq!(path, "/models/imagen-4.0-generate-001:predict");
/// ```
pub fn predict(model: &str) -> String {
    format!("{}/{}:predict", MODELS, model)
}
