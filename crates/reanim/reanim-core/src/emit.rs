//! Part emitter: turns the current pose into ordered draw primitives.
//!
//! Tracks are visited in document declaration order, which is the draw order.
//! Anything that cannot be resolved this frame (no layer, out of range frame,
//! hidden, filtered, no image) is skipped in place; nothing is reordered.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::data::Vec2;
use crate::images::{ImageHandle, ImageResolver};
use crate::library::{CompiledDocument, StemBinding};
use crate::overlay::Compositor;
use crate::transform::Affine2;
use crate::visibility::VisibilityFilter;

/// RGBA color multiplier.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    /// Additive flash: color channels scaled by `1 + intensity`, alpha untouched.
    pub fn flash(intensity: f32) -> Self {
        let k = 1.0 + intensity.max(0.0);
        Self {
            r: k,
            g: k,
            b: k,
            a: 1.0,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// One textured quad for the rasterizer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DrawPart {
    pub track_index: usize,
    pub track: String,
    pub physical_frame: usize,
    pub image: ImageHandle,
    /// Screen-space corners: top-left, top-right, bottom-right, bottom-left.
    pub dest: [Vec2; 4],
    /// Full image bounds in the same corner order.
    pub src: [Vec2; 4],
    pub transform: Affine2,
    pub color: Color,
}

/// Per-entity inputs to emission.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmitParams<'a> {
    /// Screen-space origin (world position minus document center).
    pub origin: Vec2,
    pub filter: Option<&'a VisibilityFilter>,
    /// Track name → replacement image ref.
    pub image_overrides: Option<&'a HashMap<String, String>>,
    pub highlight: f32,
}

/// Translation borrowed from the stem track since its first frame.
fn stem_offset(doc: &CompiledDocument, comp: &Compositor<'_>, stem: &StemBinding) -> Vec2 {
    let Some(track) = doc.merged.get(&stem.stem) else {
        return Vec2::ZERO;
    };
    let (Some(first), Some(current)) = (
        track.frame(0),
        comp.physical_for(&stem.stem).and_then(|p| track.frame(p)),
    ) else {
        return Vec2::ZERO;
    };
    current.position() - first.position()
}

/// Emit draw parts for one entity.
pub fn emit_parts(
    doc: &CompiledDocument,
    comp: &Compositor<'_>,
    params: &EmitParams<'_>,
    images: &dyn ImageResolver,
) -> Vec<DrawPart> {
    let mut parts = Vec::new();
    let color = Color::flash(params.highlight);

    for (track_index, track) in doc.merged.tracks.iter().enumerate() {
        let Some(physical) = comp.physical_for(&track.name) else {
            continue;
        };
        let Some(frame) = track.frame(physical) else {
            continue;
        };
        let visible = match params.filter {
            Some(f) => f.is_visible(&track.name, frame.frame_num),
            None => !frame.is_hidden(),
        };
        if !visible {
            continue;
        }

        let image_ref = params
            .image_overrides
            .and_then(|o| o.get(&track.name))
            .map(String::as_str)
            .unwrap_or(frame.image.as_str());
        if image_ref.is_empty() {
            continue;
        }
        let Some(image) = images.resolve(image_ref) else {
            log::debug!(
                "reanim '{}': image '{}' for track '{}' not found; skipping part",
                doc.source,
                image_ref,
                track.name
            );
            continue;
        };

        let mut offset = params.origin;
        if let Some(stem) = doc.stem_for(&track.name) {
            offset = offset + stem_offset(doc, comp, stem);
        }
        let transform = Affine2::from_frame(frame, offset);
        let (w, h) = (image.width as f32, image.height as f32);

        parts.push(DrawPart {
            track_index,
            track: track.name.clone(),
            physical_frame: physical,
            image,
            dest: transform.quad(w, h),
            src: Affine2::IDENTITY.quad(w, h),
            transform,
            color,
        });
    }
    parts
}
