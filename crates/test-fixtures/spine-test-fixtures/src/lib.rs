//! Shared JSON fixtures for analyzer tests and benches.
//!
//! `fixtures/manifest.json` maps fixture names to paths relative to the
//! `fixtures/` directory at the workspace root.

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
    rigs: HashMap<String, String>,
    #[serde(default)]
    configs: HashMap<String, String>,
}

/// One named group of fixtures in the manifest.
struct Catalog {
    kind: &'static str,
    entries: &'static HashMap<String, String>,
}

impl Catalog {
    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    fn path(&self, name: &str) -> Result<PathBuf> {
        let rel = self
            .entries
            .get(name)
            .ok_or_else(|| anyhow!("unknown {} fixture '{name}'", self.kind))?;
        Ok(fixtures_root().join(rel))
    }

    fn text(&self, name: &str) -> Result<String> {
        let path = self.path(name)?;
        fs::read_to_string(&path)
            .with_context(|| format!("failed to read {} fixture at {}", self.kind, path.display()))
    }

    fn parse<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let text = self.text(name)?;
        serde_json::from_str(&text)
            .with_context(|| format!("failed to parse {} fixture '{name}'", self.kind))
    }
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

/// Rig definitions: setup pose, skins, constraints and keyed animations.
pub mod rigs {
    use super::*;

    fn catalog() -> Catalog {
        Catalog {
            kind: "rig",
            entries: &MANIFEST.rigs,
        }
    }

    /// Fixture names in sorted order.
    pub fn keys() -> Vec<String> {
        catalog().names()
    }

    pub fn json(name: &str) -> Result<String> {
        catalog().text(name)
    }

    /// Deserialize a rig into the caller's definition type.
    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        catalog().parse(name)
    }
}

/// Analyzer configuration documents (partial JSON, defaults fill the rest).
pub mod configs {
    use super::*;

    fn catalog() -> Catalog {
        Catalog {
            kind: "config",
            entries: &MANIFEST.configs,
        }
    }

    pub fn keys() -> Vec<String> {
        catalog().names()
    }

    pub fn json(name: &str) -> Result<String> {
        catalog().text(name)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        catalog().parse(name)
    }
}
