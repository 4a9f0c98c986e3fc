use std::path::Path;

use serde::Deserialize;

use crate::data::{Document, Frame, Track, Vec2};
use crate::error::{ParseError, ReanimError, Result};

/// Public API: parse a reanim JSON document into the canonical `Document`
/// (data.rs), keeping the per-frame sparsity exactly as authored.
///
/// Notes:
/// - Frame keys are the authoring tool's short names (`x`, `y`, `sx`, `sy`,
///   `kx`, `ky`, `f`, `i`); long names (`scaleX`, `skewX`, `frameNum`, `imageRef`, ...)
///   are accepted as aliases. Unknown keys are ignored.
/// - An empty image ref (`"i": ""`) is the same as no image ref (inherit).
/// - Structural problems fail the whole document; there is no partial result.
pub fn parse_reanim_json(s: &str) -> std::result::Result<Document, ParseError> {
    let raw: RawDocument = serde_json::from_str(s)?;
    convert(raw)
}

/// Same as [`parse_reanim_json`] for an in-memory buffer.
pub fn parse_reanim_bytes(bytes: &[u8]) -> std::result::Result<Document, ParseError> {
    let raw: RawDocument = serde_json::from_slice(bytes)?;
    convert(raw)
}

/// Read and parse a reanim document from disk.
pub fn load_reanim_file(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| ReanimError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let doc = parse_reanim_bytes(&bytes)?;
    log::debug!(
        "loaded reanim '{}': {} tracks, {} frames",
        path.display(),
        doc.tracks.len(),
        doc.frame_count()
    );
    Ok(doc)
}

fn convert(raw: RawDocument) -> std::result::Result<Document, ParseError> {
    if let Some(fps) = raw.fps {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(ParseError::InvalidFps { fps });
        }
    }
    let raw_tracks = raw.tracks.ok_or(ParseError::MissingTracks)?;

    let mut tracks: Vec<Track> = Vec::with_capacity(raw_tracks.len());
    for (index, rt) in raw_tracks.into_iter().enumerate() {
        let name = match rt.name {
            Some(n) if !n.is_empty() => n,
            _ => return Err(ParseError::EmptyTrackName { index }),
        };
        if tracks.iter().any(|t| t.name == name) {
            return Err(ParseError::DuplicateTrack { index, name });
        }
        // an explicit empty array is legal, a missing one is not
        let Some(raw_frames) = rt.frames else {
            return Err(ParseError::MissingFrames { index, name });
        };
        let mut frames: Vec<Frame> = Vec::with_capacity(raw_frames.len());
        for (fi, value) in raw_frames.iter().enumerate() {
            frames.push(to_frame(&name, fi, value)?);
        }
        tracks.push(Track { name, frames });
    }

    let center = match raw.center {
        Some(c) => Vec2::new(c.x, c.y),
        None => Vec2::ZERO,
    };
    if !center.x.is_finite() || !center.y.is_finite() {
        return Err(ParseError::NonFinite {
            track: "<document>".into(),
            frame: 0,
            field: "center",
        });
    }

    Ok(Document {
        fps: raw.fps,
        center,
        clips: raw.clips.unwrap_or_default(),
        tracks,
    })
}

// Field keys accepted for each frame attribute, short name first.
const X_KEYS: &[&str] = &["x"];
const Y_KEYS: &[&str] = &["y"];
const SX_KEYS: &[&str] = &["sx", "scaleX"];
const SY_KEYS: &[&str] = &["sy", "scaleY"];
const KX_KEYS: &[&str] = &["kx", "skewX"];
const KY_KEYS: &[&str] = &["ky", "skewY"];
const F_KEYS: &[&str] = &["f", "frameNum"];
const I_KEYS: &[&str] = &["i", "imageRef", "image"];

fn to_frame(
    track: &str,
    frame: usize,
    value: &serde_json::Value,
) -> std::result::Result<Frame, ParseError> {
    let obj = value.as_object().ok_or_else(|| ParseError::FrameNotObject {
        track: track.to_string(),
        frame,
    })?;
    let lookup = |keys: &[&str]| keys.iter().find_map(|k| obj.get(*k));

    let number = |keys: &[&'static str]| -> std::result::Result<Option<f32>, ParseError> {
        let field = keys[0];
        match lookup(keys) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(v) => {
                let n = v.as_f64().ok_or_else(|| ParseError::FieldType {
                    track: track.to_string(),
                    frame,
                    field,
                    expected: "number",
                })? as f32;
                if !n.is_finite() {
                    return Err(ParseError::NonFinite {
                        track: track.to_string(),
                        frame,
                        field,
                    });
                }
                Ok(Some(n))
            }
        }
    };

    let frame_num = match lookup(F_KEYS) {
        None | Some(serde_json::Value::Null) => None,
        Some(v) => {
            let n = v
                .as_i64()
                .or_else(|| v.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                .and_then(|n| i32::try_from(n).ok())
                .ok_or_else(|| ParseError::FieldType {
                    track: track.to_string(),
                    frame,
                    field: F_KEYS[0],
                    expected: "integer",
                })?;
            Some(n)
        }
    };

    let image = match lookup(I_KEYS) {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) if s.is_empty() => None,
        Some(serde_json::Value::String(s)) => Some(s.clone()),
        Some(_) => {
            return Err(ParseError::FieldType {
                track: track.to_string(),
                frame,
                field: I_KEYS[0],
                expected: "string",
            })
        }
    };

    Ok(Frame {
        x: number(X_KEYS)?,
        y: number(Y_KEYS)?,
        scale_x: number(SX_KEYS)?,
        scale_y: number(SY_KEYS)?,
        skew_x: number(KX_KEYS)?,
        skew_y: number(KY_KEYS)?,
        frame_num,
        image,
    })
}

// ----- JSON schema (serde) -----

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    pub fps: Option<f32>,
    #[serde(default)]
    pub center: Option<RawVec2>,
    #[serde(default)]
    pub clips: Option<Vec<String>>,
    #[serde(default)]
    pub tracks: Option<Vec<RawTrack>>,
}

#[derive(Debug, Copy, Clone, Deserialize)]
struct RawVec2 {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
}

#[derive(Debug, Deserialize)]
struct RawTrack {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub frames: Option<Vec<serde_json::Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_sparsity_as_authored() {
        let doc = parse_reanim_json(
            r#"{
                "fps": 10,
                "tracks": [
                    { "name": "head", "frames": [ { "x": 1, "i": "IMAGE_HEAD" }, {}, { "kx": 12.5, "f": -1 } ] }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(doc.fps, Some(10.0));
        let head = &doc.tracks[0];
        assert_eq!(head.frames.len(), 3);
        assert_eq!(head.frames[0].x, Some(1.0));
        assert_eq!(head.frames[0].y, None);
        assert_eq!(head.frames[0].image.as_deref(), Some("IMAGE_HEAD"));
        assert!(head.frames[1].is_empty());
        assert_eq!(head.frames[2].skew_x, Some(12.5));
        assert_eq!(head.frames[2].frame_num, Some(-1));
    }

    #[test]
    fn accepts_long_aliases_and_empty_image() {
        let doc = parse_reanim_json(
            r#"{ "tracks": [ { "name": "arm", "frames": [ { "scaleX": 2, "skewY": 30, "frameNum": 0, "imageRef": "" } ] } ] }"#,
        )
        .unwrap();
        let f = &doc.tracks[0].frames[0];
        assert_eq!(f.scale_x, Some(2.0));
        assert_eq!(f.skew_y, Some(30.0));
        assert_eq!(f.frame_num, Some(0));
        assert_eq!(f.image, None);
    }

    #[test]
    fn names_the_offending_track_and_field() {
        let err = parse_reanim_json(
            r#"{ "tracks": [ { "name": "leg", "frames": [ {}, { "sx": "big" } ] } ] }"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ParseError::FieldType {
                track: "leg".into(),
                frame: 1,
                field: "sx",
                expected: "number",
            }
        );
        assert!(err.to_string().contains("'leg'"));
    }

    #[test]
    fn rejects_structural_problems() {
        assert_eq!(
            parse_reanim_json(r#"{ "fps": 12 }"#).unwrap_err(),
            ParseError::MissingTracks
        );
        assert_eq!(
            parse_reanim_json(r#"{ "tracks": [ { "frames": [] } ] }"#).unwrap_err(),
            ParseError::EmptyTrackName { index: 0 }
        );
        assert!(matches!(
            parse_reanim_json(r#"{ "tracks": [ { "name": "a", "frames": [] }, { "name": "a", "frames": [] } ] }"#),
            Err(ParseError::DuplicateTrack { index: 1, .. })
        ));
        assert!(matches!(
            parse_reanim_json(r#"{ "tracks": [ { "name": "a", "frames": [ 3 ] } ] }"#),
            Err(ParseError::FrameNotObject { frame: 0, .. })
        ));
        assert!(matches!(
            parse_reanim_json(r#"{ "fps": 0, "tracks": [] }"#),
            Err(ParseError::InvalidFps { .. })
        ));
        assert!(matches!(
            parse_reanim_json(r#"{ "tracks": [ { "name": "a", "frames": [ { "f": 0.5 } ] } ] }"#),
            Err(ParseError::FieldType { field: "f", .. })
        ));
        assert!(matches!(
            parse_reanim_json(r#"{ "tracks": [ { "name": "a", "frames": [ { "x": 1e300 } ] } ] }"#),
            Err(ParseError::NonFinite { field: "x", .. })
        ));
        assert!(matches!(
            parse_reanim_json("{ not json"),
            Err(ParseError::Syntax { .. })
        ));
    }

    #[test]
    fn track_without_frames_fails_but_empty_frames_load() {
        assert_eq!(
            parse_reanim_json(r#"{ "tracks": [ { "name": "head" } ] }"#).unwrap_err(),
            ParseError::MissingFrames {
                index: 0,
                name: "head".into()
            }
        );
        assert!(matches!(
            parse_reanim_json(r#"{ "tracks": [ { "name": "a", "frames": [] }, { "name": "b", "frames": null } ] }"#),
            Err(ParseError::MissingFrames { index: 1, .. })
        ));
        let doc = parse_reanim_json(r#"{ "tracks": [ { "name": "head", "frames": [] } ] }"#).unwrap();
        assert!(doc.tracks[0].frames.is_empty());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_reanim_file("/definitely/not/here.reanim.json").unwrap_err();
        assert_eq!(err.category(), "io");
    }
}
