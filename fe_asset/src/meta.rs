use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::ParserError;

/// Coordinate conventions applied while loading.
///
/// Both default to `true`: models authored right-handed with a bottom-left
/// texture origin are converted to the engine's left-handed, top-left space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Negate X of positions and normals and reverse the face winding.
    pub flip_handedness: bool,
    /// `v' = 1 - v`
    pub flip_texcoord_v: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            flip_handedness: true,
            flip_texcoord_v: true,
        }
    }
}

impl LoadOptions {
    pub fn parse(path: &Path) -> Result<Self, ParserError> {
        let data = std::fs::read(path).map_err(|source| ParserError::Io {
            path: path.to_owned(),
            source,
        })?;
        toml::from_slice(&data).map_err(|source| ParserError::Meta {
            path: path.to_owned(),
            source,
        })
    }

    /// Options from `model.toml` beside `model.obj`, else from a folder scoped
    /// `obj.toml`, else the defaults.
    pub fn for_model(model: &Path) -> Result<Self, ParserError> {
        match meta_file(model) {
            Some(path) => {
                log::debug!("Using load options from `{}`", path.display());
                Self::parse(&path)
            }
            None => Ok(Self::default()),
        }
    }
}

fn meta_file(model: &Path) -> Option<PathBuf> {
    let dir = model.parent().unwrap_or_else(|| Path::new(""));

    let sibling = model.with_extension("toml");
    if sibling.is_file() {
        return Some(sibling);
    }

    let folder = dir.join("obj.toml");
    folder.is_file().then(|| folder)
}
