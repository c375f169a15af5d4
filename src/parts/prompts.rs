use once_cell::sync::Lazy;
use regex::Regex;

use super::{to_inline_part, RetryPlan};
use crate::asset::ImageAsset;
use crate::types::Part;

#[allow(clippy::expect_used)]
static DECADE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]{4}s)").expect("valid decade token regex"));

/// A pixel location on the image being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotSpot {
    /// Horizontal offset from the left edge.
    pub x: u32,
    /// Vertical offset from the top edge.
    pub y: u32,
}

/// Global edits that share the prefixed-instruction shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    /// A photographic filter.
    Filter,
    /// A tonal or colour adjustment.
    Adjustment,
    /// A surface texture overlay.
    Texture,
    /// An artistic style.
    Style,
}

impl EditKind {
    fn prefix(self) -> &'static str {
        match self {
            EditKind::Filter => "Apply this filter: ",
            EditKind::Adjustment => "Apply this adjustment: ",
            EditKind::Texture => "Apply this texture: ",
            EditKind::Style => "Apply this style: ",
        }
    }

    /// Action label used in error messages and logs.
    pub fn action(self) -> &'static str {
        match self {
            EditKind::Filter => "apply filter",
            EditKind::Adjustment => "apply adjustment",
            EditKind::Texture => "apply texture",
            EditKind::Style => "apply style",
        }
    }
}

/// A localized edit around `spot`. Refusals are terminal.
pub fn point_edit(asset: &ImageAsset, prompt: &str, spot: HotSpot) -> RetryPlan {
    let instruction = format!(
        "Edit this {}x{} image at pixel (x: {}, y: {}). Requested change: {}. \
         Keep the rest of the image unchanged and return only the edited image.",
        asset.width,
        asset.height,
        spot.x,
        spot.y,
        prompt.trim()
    );
    RetryPlan::single(vec![to_inline_part(asset), Part::text(instruction)])
}

/// A global edit. The fallback sends the user's prompt without the prefix.
pub fn styled_edit(kind: EditKind, asset: &ImageAsset, prompt: &str) -> RetryPlan {
    let prompt = prompt.trim();
    let primary = vec![
        to_inline_part(asset),
        Part::text(format!("{}{}", kind.prefix(), prompt)),
    ];
    RetryPlan::with_fallback_text(primary, Some(prompt.to_string()))
}

/// Background removal with a fixed instruction. Refusals are terminal.
pub fn background_removal(asset: &ImageAsset) -> RetryPlan {
    RetryPlan::single(vec![
        to_inline_part(asset),
        Part::text(
            "Remove the background from this image. Keep the main subject intact \
             and place it on a plain transparent background.",
        ),
    ])
}

/// Composes `sources` into `main`.
///
/// Parts are the main image, each source in index order, then one text part
/// naming the sources by their 1-based index. Refusals are terminal.
pub fn fusion(main: &ImageAsset, sources: &[ImageAsset], prompt: &str) -> RetryPlan {
    let mut parts = Vec::with_capacity(sources.len() + 2);
    parts.push(to_inline_part(main));
    parts.extend(sources.iter().map(to_inline_part));

    let legend: Vec<String> = (1..=sources.len())
        .map(|index| format!("Source image {index} is image {} above.", index + 1))
        .collect();

    let instruction = format!(
        "The first image is the main scene. {} {}",
        legend.join(" "),
        prompt.trim()
    );
    parts.push(Part::text(instruction.trim().to_string()));

    RetryPlan::single(parts)
}

/// Extracts a decade token such as `1970s` and builds the generic fallback.
pub fn decade_fallback_prompt(prompt: &str) -> Option<String> {
    let decade = DECADE_TOKEN.captures(prompt)?.get(1)?.as_str();
    Some(format!(
        "a photograph of the subject as if living in the {decade}, capturing \
         era-appropriate fashion, hairstyle, and atmosphere, as an \
         authentic-looking photograph."
    ))
}

/// A decade transformation. The fallback exists only when the prompt names a decade.
pub fn decade_transform(asset: &ImageAsset, prompt: &str) -> RetryPlan {
    let primary = vec![to_inline_part(asset), Part::text(prompt.trim())];
    RetryPlan::with_fallback_text(primary, decade_fallback_prompt(prompt))
}

/// Parts asking for `count` edit suggestions named in `language`.
pub fn suggestion_parts(asset: &ImageAsset, language: &str, count: usize) -> Vec<Part> {
    vec![
        to_inline_part(asset),
        Part::text(format!(
            "Suggest {count} creative edits for this photo. For each, give a short \
             name written in {language} and a detailed editing prompt in English."
        )),
    ]
}
