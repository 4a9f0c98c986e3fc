//! Compiled document cache.
//!
//! Loading runs merge and segment mapping once; the result is immutable and
//! shared (`Arc`) by every entity that plays the document.

use std::sync::Arc;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::data::{Document, Vec2};
use crate::ids::{DocId, IdAllocator};
use crate::merge::{build_merged_tracks, MergedTracks};
use crate::segments::{build_clip_table, ClipTable, SegmentRule};

/// Attachment tracks whose translation follows a named stem track.
///
/// Each attached track is offset by `stem.pos[current] - stem.pos[0]`.
/// This is a single level of coupling, not a scene graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StemBinding {
    pub stem: String,
    pub attached: Vec<String>,
}

/// Per-document load settings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Overrides `Config::segment_rule`.
    pub segment_rule: Option<SegmentRule>,
    /// Overrides the document's `fps` and `Config::default_fps`.
    pub fps: Option<f32>,
    pub stems: Vec<StemBinding>,
}

/// Document plus everything derived from it at load time.
#[derive(Debug)]
pub struct CompiledDocument {
    pub source: String,
    pub document: Document,
    pub merged: MergedTracks,
    pub clips: ClipTable,
    pub fps: f32,
    pub stems: Vec<StemBinding>,
}

impl CompiledDocument {
    pub fn compile(source: impl Into<String>, document: Document, cfg: &Config, opts: LoadOptions) -> Self {
        let source = source.into();
        let rule = opts.segment_rule.unwrap_or_else(|| cfg.segment_rule.clone());
        let merged = build_merged_tracks(&document);
        let clips = build_clip_table(&merged, &document.clips, &rule);
        let fps = opts
            .fps
            .or(document.fps)
            .filter(|f| f.is_finite() && *f > 0.0)
            .unwrap_or_else(|| cfg.fallback_fps());

        for stem in &opts.stems {
            if merged.get(&stem.stem).is_none() {
                log::warn!("reanim '{source}': stem track '{}' does not exist", stem.stem);
            }
        }
        log::debug!(
            "compiled reanim '{source}': {} tracks, {} frames, {} clips at {fps} fps",
            merged.len(),
            merged.frame_count,
            clips.len()
        );

        Self {
            source,
            document,
            merged,
            clips,
            fps,
            stems: opts.stems,
        }
    }

    /// Stem binding that `track` is attached to, if any.
    pub fn stem_for(&self, track: &str) -> Option<&StemBinding> {
        self.stems
            .iter()
            .find(|s| s.attached.iter().any(|a| a == track))
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.document.center
    }

    #[inline]
    pub fn frame_count(&self) -> usize {
        self.merged.frame_count
    }
}

/// Read-only cache of compiled documents, keyed by source id.
#[derive(Default, Debug)]
pub struct DocumentLibrary {
    items: Vec<(DocId, Arc<CompiledDocument>)>,
    by_source: HashMap<String, DocId>,
}

impl DocumentLibrary {
    /// Compile and insert `document` unless `source` is already cached.
    pub fn insert(
        &mut self,
        ids: &mut IdAllocator,
        source: &str,
        document: Document,
        cfg: &Config,
        opts: LoadOptions,
    ) -> DocId {
        if let Some(id) = self.by_source.get(source) {
            log::debug!("reanim '{source}' already loaded as {id:?}");
            return *id;
        }
        let id = ids.alloc_doc();
        let compiled = CompiledDocument::compile(source, document, cfg, opts);
        self.items.push((id, Arc::new(compiled)));
        self.by_source.insert(source.to_string(), id);
        id
    }

    pub fn get(&self, id: DocId) -> Option<&Arc<CompiledDocument>> {
        self.items
            .iter()
            .find_map(|(d, doc)| if *d == id { Some(doc) } else { None })
    }

    pub fn find(&self, source: &str) -> Option<DocId> {
        self.by_source.get(source).copied()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
