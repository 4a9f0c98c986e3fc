//! Shared reanim fixtures for tests and benches.
//!
//! Fixtures are listed in `fixtures/manifest.json` at the workspace root.
//! An entry is either a bare path or `{ "path": ..., "options": {...} }` where
//! `options` is a serialized `LoadOptions` for the document.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    reanims: HashMap<String, ReanimEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReanimEntry {
    Path(String),
    Detailed {
        path: String,
        #[serde(default)]
        options: Option<serde_json::Value>,
    },
}

impl ReanimEntry {
    fn as_path(&self) -> &str {
        match self {
            ReanimEntry::Path(path) => path,
            ReanimEntry::Detailed { path, .. } => path,
        }
    }

    fn options(&self) -> Option<&serde_json::Value> {
        match self {
            ReanimEntry::Path(_) => None,
            ReanimEntry::Detailed { options, .. } => options.as_ref(),
        }
    }
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

pub mod reanims {
    use super::*;

    pub fn keys() -> Vec<String> {
        let mut keys: Vec<String> = MANIFEST.reanims.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn json(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.reanims, "reanim", name)?;
        read_to_string(entry.as_path())
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let entry = lookup(&MANIFEST.reanims, "reanim", name)?;
        Ok(resolve_path(entry.as_path()))
    }

    /// Load options declared next to the fixture, deserialized into the
    /// caller's type. `Ok(None)` when the manifest declares none.
    pub fn options<T: DeserializeOwned>(name: &str) -> Result<Option<T>> {
        let entry = lookup(&MANIFEST.reanims, "reanim", name)?;
        match entry.options() {
            Some(v) => serde_json::from_value(v.clone())
                .with_context(|| format!("failed to parse options for reanim fixture {name}"))
                .map(Some),
            None => Ok(None),
        }
    }
}
