//! Per-asset import settings stored next to the mesh as TOML.
//!
//! For `models/paddle.obj` the loader looks for `models/paddle.toml`, then for
//! a folder-wide `models/obj.toml`, and falls back to defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::obj::ParseOptions;

const FOLDER_META: &str = "obj";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ObjMeta {
    pub flip_v: bool,
    pub reject_unknown_commands: bool,
}

impl ObjMeta {
    pub fn parse(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read import meta {}", path.display()))?;
        Self::from_toml(&data).with_context(|| format!("Invalid import meta {}", path.display()))
    }

    pub fn from_toml(data: &str) -> Result<Self> {
        Ok(toml::from_str(data)?)
    }

    /// Find and parse the meta file that applies to `asset_path`.
    pub fn resolve(asset_path: &Path) -> Result<Self> {
        match Self::locate(asset_path) {
            Some(meta_path) => {
                log::debug!("Using import meta {}", meta_path.display());
                Self::parse(&meta_path)
            }
            None => Ok(Self::default()),
        }
    }

    fn locate(asset_path: &Path) -> Option<PathBuf> {
        let own = asset_path.with_extension("toml");
        if own.is_file() {
            return Some(own);
        }

        let folder = asset_path
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join(FOLDER_META)
            .with_extension("toml");
        folder.is_file().then_some(folder)
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            reject_unknown_commands: self.reject_unknown_commands,
            flip_v: self.flip_v,
        }
    }
}
