//! Error types for document loading.
//!
//! Only load time can fail. Per-tick lookups (unknown clip, logical frame out
//! of range, missing image) are `Option`s and degrade to "draw nothing".

use thiserror::Error;

/// Structural problem found while loading a reanim document.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ParseError {
    /// The JSON itself is malformed or does not match the document shape.
    #[error("reanim json parse error at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    /// Document root has no `tracks` array.
    #[error("reanim document is missing its 'tracks' array")]
    MissingTracks,

    /// A track has no name (or an empty one).
    #[error("track #{index} has an empty name")]
    EmptyTrackName { index: usize },

    /// Two tracks share a name; names key every per-track lookup.
    #[error("track #{index} '{name}' duplicates an earlier track name")]
    DuplicateTrack { index: usize, name: String },

    /// A track has no `frames` array.
    #[error("track #{index} '{name}' is missing its 'frames' array")]
    MissingFrames { index: usize, name: String },

    /// A frame entry is not a JSON object.
    #[error("track '{track}' frame {frame} is not an object")]
    FrameNotObject { track: String, frame: usize },

    /// A numeric frame field is NaN or infinite.
    #[error("track '{track}' frame {frame} field '{field}' is not a finite number")]
    NonFinite {
        track: String,
        frame: usize,
        field: &'static str,
    },

    /// A frame field has the wrong JSON type.
    #[error("track '{track}' frame {frame} field '{field}' has the wrong type: expected {expected}")]
    FieldType {
        track: String,
        frame: usize,
        field: &'static str,
        expected: &'static str,
    },

    /// Document playback rate must be positive.
    #[error("document fps must be positive and finite, got {fps}")]
    InvalidFps { fps: f32 },
}

/// Top-level error for the crate.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ReanimError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("io error reading '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ReanimError {
    /// Category string for logging.
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Parse(ParseError::Syntax { .. }) => "syntax",
            Self::Parse(_) => "structure",
            Self::Io { .. } => "io",
        }
    }
}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        Self::Syntax {
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ReanimError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.into())
    }
}

pub type Result<T> = std::result::Result<T, ReanimError>;
