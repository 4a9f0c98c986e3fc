//! Engine: data ownership and public API.
//!
//! Methods:
//! - new, load_document / load_json (compile + cache), spawn / despawn
//! - update (apply commands → tick every layer), render / render_all (pure reads)
//!
//! `update` must run before `render` within a frame; rendering never mutates.

use std::sync::Arc;

use crate::config::Config;
use crate::data::{Document, Vec2};
use crate::emit::{emit_parts, DrawPart, EmitParams};
use crate::error::Result;
use crate::ids::{DocId, EntityId, IdAllocator};
use crate::images::ImageResolver;
use crate::inputs::{EntityCommand, Inputs, PlayRequest};
use crate::library::{CompiledDocument, DocumentLibrary, LoadOptions};
use crate::loader::parse_reanim_json;
use crate::outputs::{CoreEvent, Outputs};
use crate::overlay::{Compositor, LayerRef, OverlayLayer};
use crate::state::{AnimState, PlaybackState, TickReport};
use crate::world::World;

#[derive(Debug)]
pub struct Engine {
    cfg: Config,
    ids: IdAllocator,
    library: DocumentLibrary,
    world: World,

    // Events raised by direct calls between updates.
    pending: Vec<CoreEvent>,
    // Per-tick outputs
    outputs: Outputs,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Engine {
    /// Create a new engine with the given config.
    pub fn new(mut cfg: Config) -> Self {
        cfg.normalize();
        Self {
            cfg,
            ids: IdAllocator::new(),
            library: DocumentLibrary::default(),
            world: World::default(),
            pending: Vec::new(),
            outputs: Outputs::default(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Compile and cache a document under `source`. Loading an already cached
    /// source returns its existing id and ignores the new data.
    pub fn load_document(&mut self, source: &str, document: Document, opts: LoadOptions) -> DocId {
        self.library
            .insert(&mut self.ids, source, document, &self.cfg, opts)
    }

    /// Parse then load. Structural errors surface here; nothing is cached on failure.
    pub fn load_json(&mut self, source: &str, json: &str, opts: LoadOptions) -> Result<DocId> {
        if let Some(id) = self.library.find(source) {
            return Ok(id);
        }
        let document = parse_reanim_json(json)?;
        Ok(self.load_document(source, document, opts))
    }

    pub fn document(&self, id: DocId) -> Option<&Arc<CompiledDocument>> {
        self.library.get(id)
    }

    pub fn find_document(&self, source: &str) -> Option<DocId> {
        self.library.find(source)
    }

    /// Create an idle entity playing `doc` at world `position`.
    pub fn spawn(&mut self, doc: DocId, position: Vec2) -> Option<EntityId> {
        if self.library.get(doc).is_none() {
            log::warn!("spawn: unknown document {doc:?}");
            return None;
        }
        let e = self.ids.alloc_entity();
        self.world.spawn(e, doc, position);
        Some(e)
    }

    /// Remove an entity and everything it owns.
    pub fn despawn(&mut self, entity: EntityId) -> bool {
        self.world.despawn(entity)
    }

    pub fn entities(&self) -> &[EntityId] {
        self.world.entities()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Primary playback cursor, `None` when idle or unknown.
    pub fn anim_state(&self, entity: EntityId) -> Option<&AnimState> {
        self.world.animators.get(entity)?.primary.as_ref()
    }

    pub fn overlays(&self, entity: EntityId) -> &[OverlayLayer] {
        self.world
            .animators
            .get(entity)
            .map(|a| a.overlays.as_slice())
            .unwrap_or(&[])
    }

    pub fn playback_state(&self, entity: EntityId) -> PlaybackState {
        PlaybackState::of(self.anim_state(entity))
    }

    /// Level-triggered finish flag of the primary layer.
    pub fn is_finished(&self, entity: EntityId) -> bool {
        self.anim_state(entity).is_some_and(|s| s.is_finished)
    }

    /// Apply one command immediately. Events are reported by the next `update`.
    pub fn apply(&mut self, cmd: EntityCommand) {
        let mut events = std::mem::take(&mut self.pending);
        self.apply_command(cmd, &mut events);
        self.pending = events;
    }

    /// Convenience for `apply(EntityCommand::Play { .. })`.
    pub fn play(&mut self, entity: EntityId, request: PlayRequest) {
        self.apply(EntityCommand::Play { entity, request });
    }

    /// Step the simulation by dt with given inputs.
    /// Commands are applied first, then every primary and overlay layer ticks.
    pub fn update(&mut self, dt: f32, inputs: Inputs) -> &Outputs {
        self.outputs.clear();
        let cap = self.cfg.max_events_per_tick;

        let mut events = std::mem::take(&mut self.pending);
        for cmd in inputs.commands {
            self.apply_command(cmd, &mut events);
        }
        for ev in events {
            self.outputs.push_event(ev, cap);
        }

        let max_steps = self.cfg.max_steps_per_tick;
        let entities = self.world.entities().to_vec();
        for entity in entities {
            let Some(animator) = self.world.animators.get_mut(entity) else {
                continue;
            };
            if let Some(state) = animator.primary.as_mut() {
                let report = state.tick(dt, max_steps);
                push_tick_events(&mut self.outputs, cap, entity, LayerRef::Primary, state, report);
            }
            for (i, layer) in animator.overlays.iter_mut().enumerate() {
                let report = layer.state.tick(dt, max_steps);
                push_tick_events(
                    &mut self.outputs,
                    cap,
                    entity,
                    LayerRef::Overlay(i),
                    &layer.state,
                    report,
                );
            }
        }
        if self.outputs.dropped_events > 0 {
            log::warn!(
                "update dropped {} events over the per-tick cap of {cap}",
                self.outputs.dropped_events
            );
        }
        &self.outputs
    }

    /// Draw parts for one entity in document track order.
    /// Unknown entities and idle entities yield nothing.
    pub fn render(&self, entity: EntityId, images: &dyn ImageResolver) -> Vec<DrawPart> {
        let Some(animator) = self.world.animators.get(entity) else {
            return Vec::new();
        };
        let Some(doc) = self.library.get(animator.doc) else {
            return Vec::new();
        };
        let comp = Compositor::new(animator.primary.as_ref(), &animator.overlays, &doc.clips);
        let world_pos = self
            .world
            .positions
            .get(entity)
            .copied()
            .unwrap_or(Vec2::ZERO);
        let params = EmitParams {
            origin: world_pos - doc.center(),
            filter: self.world.visibility.get(entity),
            image_overrides: self.world.image_overrides.get(entity),
            highlight: self.world.highlights.get(entity).copied().unwrap_or(0.0),
        };
        emit_parts(doc, &comp, &params, images)
    }

    /// Render every live entity, in ascending entity id order.
    pub fn render_all(&self, images: &dyn ImageResolver) -> Vec<(EntityId, Vec<DrawPart>)> {
        self.world
            .entities()
            .iter()
            .map(|&e| (e, self.render(e, images)))
            .collect()
    }

    fn apply_command(&mut self, cmd: EntityCommand, events: &mut Vec<CoreEvent>) {
        let entity = cmd.entity();
        if !self.world.contains(entity) {
            log::warn!("command for unknown entity {entity:?} ignored");
            events.push(CoreEvent::UnknownEntity { entity });
            return;
        }
        match cmd {
            EntityCommand::Play { entity, request } => {
                let Some(state) = self.start_state(entity, &request, events) else {
                    return;
                };
                if let Some(animator) = self.world.animators.get_mut(entity) {
                    animator.primary = Some(state);
                }
                events.push(CoreEvent::ClipStarted {
                    entity,
                    layer: LayerRef::Primary,
                    clip: request.clip,
                });
            }
            EntityCommand::PlayOverlay {
                entity,
                request,
                tracks,
            } => {
                let Some(state) = self.start_state(entity, &request, events) else {
                    return;
                };
                let Some(animator) = self.world.animators.get_mut(entity) else {
                    return;
                };
                let index = match animator.overlays.iter().position(|o| o.tracks == tracks) {
                    Some(i) => {
                        animator.overlays[i].state = state;
                        i
                    }
                    None => {
                        animator.overlays.push(OverlayLayer::new(state, tracks));
                        animator.overlays.len() - 1
                    }
                };
                events.push(CoreEvent::ClipStarted {
                    entity,
                    layer: LayerRef::Overlay(index),
                    clip: request.clip,
                });
            }
            EntityCommand::StopOverlay { entity, layer } => {
                if let Some(animator) = self.world.animators.get_mut(entity) {
                    if layer < animator.overlays.len() {
                        animator.overlays.remove(layer);
                    } else {
                        log::warn!(
                            "entity {entity:?} has no overlay {layer} ({} active)",
                            animator.overlays.len()
                        );
                    }
                }
            }
            EntityCommand::ClearOverlays { entity } => {
                if let Some(animator) = self.world.animators.get_mut(entity) {
                    animator.overlays.clear();
                }
            }
            EntityCommand::Pause { entity } => {
                if let Some(animator) = self.world.animators.get_mut(entity) {
                    animator.primary.iter_mut().for_each(AnimState::pause);
                    animator.overlays.iter_mut().for_each(|o| o.state.pause());
                }
            }
            EntityCommand::Resume { entity } => {
                if let Some(animator) = self.world.animators.get_mut(entity) {
                    animator.primary.iter_mut().for_each(AnimState::resume);
                    animator.overlays.iter_mut().for_each(|o| o.state.resume());
                }
            }
            EntityCommand::Seek { entity, frame } => {
                if let Some(state) = self
                    .world
                    .animators
                    .get_mut(entity)
                    .and_then(|a| a.primary.as_mut())
                {
                    state.seek(frame);
                }
            }
            EntityCommand::SetPosition { entity, position } => {
                self.world.positions.insert(entity, position);
            }
            EntityCommand::SetOverride {
                entity,
                track,
                visible,
            } => {
                let filter = self.world.visibility.entry(entity);
                match visible {
                    Some(v) => filter.set_override(track, v),
                    None => filter.clear_override(&track),
                }
            }
            EntityCommand::ClearOverrides { entity } => {
                if let Some(filter) = self.world.visibility.get_mut(entity) {
                    filter.clear_overrides();
                }
            }
            EntityCommand::SetAllowList { entity, tracks } => {
                self.world.visibility.entry(entity).set_allow_list(tracks);
            }
            EntityCommand::SetHighlight { entity, intensity } => {
                if intensity > 0.0 {
                    self.world.highlights.insert(entity, intensity);
                } else {
                    self.world.highlights.remove(entity);
                }
            }
            EntityCommand::SetImageOverride {
                entity,
                track,
                image,
            } => {
                let overrides = self.world.image_overrides.entry(entity);
                match image {
                    Some(img) if !img.is_empty() => {
                        overrides.insert(track, img);
                    }
                    _ => {
                        overrides.remove(&track);
                    }
                }
            }
            EntityCommand::Despawn { entity } => {
                self.world.despawn(entity);
            }
        }
    }

    /// Fresh cursor for `request` on the entity's document. Unknown clips
    /// still play (with zero frames) so callers polling `is_finished` see
    /// one-shots complete.
    fn start_state(
        &self,
        entity: EntityId,
        request: &PlayRequest,
        events: &mut Vec<CoreEvent>,
    ) -> Option<AnimState> {
        let animator = self.world.animators.get(entity)?;
        let doc = self.library.get(animator.doc)?;
        let frame_count = match doc.clips.frame_count(&request.clip) {
            Some(n) => n,
            None => {
                log::warn!(
                    "reanim '{}' has no clip '{}'; entity {entity:?} will draw nothing",
                    doc.source,
                    request.clip
                );
                events.push(CoreEvent::UnknownClip {
                    entity,
                    clip: request.clip.clone(),
                });
                0
            }
        };
        let fps = request
            .fps
            .filter(|f| f.is_finite() && *f > 0.0)
            .unwrap_or(doc.fps);
        Some(AnimState::new(
            request.clip.clone(),
            request.looping,
            frame_count,
            fps,
        ))
    }
}

fn push_tick_events(
    outputs: &mut Outputs,
    cap: usize,
    entity: EntityId,
    layer: LayerRef,
    state: &AnimState,
    report: TickReport,
) {
    if report.looped {
        outputs.push_event(
            CoreEvent::ClipLooped {
                entity,
                layer,
                clip: state.clip.clone(),
            },
            cap,
        );
    }
    if report.finished {
        outputs.push_event(
            CoreEvent::ClipFinished {
                entity,
                layer,
                clip: state.clip.clone(),
            },
            cap,
        );
    }
}
