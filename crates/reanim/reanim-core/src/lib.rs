//! Reanim Core (engine-agnostic)
//!
//! Frame-stepped runtime for sparse, delta-encoded 2D skeletal animation.
//! A document is loaded once (`loader`), resolved into dense per-track frames
//! (`merge`) and split into named clips over its shared timeline (`segments`).
//! Entities then carry playback cursors (`state`), optionally layered
//! (`overlay`) and filtered (`visibility`), and are emitted as ordered,
//! transformed quads (`transform`, `emit`). Rasterization is the host's job.

pub mod config;
pub mod data;
pub mod emit;
pub mod engine;
pub mod error;
pub mod ids;
pub mod images;
pub mod inputs;
pub mod library;
pub mod loader;
pub mod merge;
pub mod outputs;
pub mod overlay;
pub mod segments;
pub mod state;
pub mod transform;
pub mod visibility;
pub mod world;

// Re-exports for consumers (adapters)
pub use config::Config;
pub use data::{Document, Frame, Track, Vec2, HIDDEN_FRAME};
pub use emit::{emit_parts, Color, DrawPart, EmitParams};
pub use engine::Engine;
pub use error::{ParseError, ReanimError, Result};
pub use ids::{DocId, EntityId};
pub use images::{ImageHandle, ImageResolver, ImageTable};
pub use inputs::{EntityCommand, Inputs, PlayRequest};
pub use library::{CompiledDocument, LoadOptions, StemBinding};
pub use loader::{load_reanim_file, parse_reanim_bytes, parse_reanim_json};
pub use merge::{build_merged_tracks, MergedFrame, MergedTrack, MergedTracks};
pub use outputs::{CoreEvent, Outputs};
pub use overlay::{Compositor, LayerRef, OverlayLayer};
pub use segments::{build_clip_table, ClipTable, SegmentRule, Visibility};
pub use state::{AnimState, PlaybackState};
pub use transform::Affine2;
pub use visibility::VisibilityFilter;
