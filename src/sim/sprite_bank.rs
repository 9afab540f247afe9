/// Portrait sprite bank backed by a TOML catalog file.
///
/// ## File format:
///   `[[portrait]]` tables with an `id` and optional native `size`, each
///   holding `[[portrait.animation]]` tables (`name`, `delay`), each holding
///   `[[portrait.animation.frame]]` tables (`width`, `height`, `art`).
///
/// Portrait order is file order. A repeated id replaces the earlier
/// definition in place, so order stays stable across overrides.

use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::domain::catalog::{AssetBank, CatalogSource, PortraitCatalog};
use crate::error::CatalogError;

const BUILTIN_CATALOG: &str = include_str!("../../assets/Graphics/Portraits.toml");

// ── Catalog schema ──

#[derive(Deserialize, Debug, Default)]
struct CatalogFile {
    #[serde(default)]
    portrait: Vec<PortraitDef>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PortraitDef {
    pub id: String,
    #[serde(default)]
    pub size: Option<u32>,
    #[serde(default, rename = "animation")]
    pub animations: Vec<AnimationDef>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AnimationDef {
    pub name: String,
    /// Seconds per frame.
    #[serde(default = "default_delay")]
    pub delay: f32,
    #[serde(default, rename = "frame")]
    pub frames: Vec<FrameDef>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct FrameDef {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub art: Vec<String>,
}

fn default_delay() -> f32 { 0.15 }

impl PortraitDef {
    pub fn animation(&self, name: &str) -> Option<&AnimationDef> {
        self.animations.iter().find(|a| a.name == name)
    }
}

// ── Bank ──

pub struct SpriteBank {
    source: CatalogSource,
    portraits: Vec<PortraitDef>,
}

impl SpriteBank {
    /// The catalog compiled into the binary.
    pub fn builtin() -> Self {
        match Self::parse(BUILTIN_CATALOG, Path::new("<built-in>")) {
            Ok(portraits) => SpriteBank { source: CatalogSource::Builtin, portraits },
            Err(e) => {
                warn!(target: "portraits", error = %e, "built-in catalog unreadable, starting empty");
                SpriteBank { source: CatalogSource::Builtin, portraits: Vec::new() }
            }
        }
    }

    pub fn open(source: &CatalogSource) -> Result<Self, CatalogError> {
        let mut bank = SpriteBank { source: CatalogSource::Builtin, portraits: Vec::new() };
        bank.reload(source)?;
        Ok(bank)
    }

    #[cfg(test)]
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self, CatalogError> {
        Ok(SpriteBank {
            source: CatalogSource::File(origin.to_path_buf()),
            portraits: Self::parse(text, origin)?,
        })
    }

    pub fn portrait(&self, id: &str) -> Option<&PortraitDef> {
        self.portraits.iter().find(|p| p.id == id)
    }

    pub fn animation(&self, portrait: &str, animation: &str) -> Option<&AnimationDef> {
        self.portrait(portrait)?.animation(animation)
    }

    fn parse(text: &str, origin: &Path) -> Result<Vec<PortraitDef>, CatalogError> {
        let file: CatalogFile = toml::from_str(text).map_err(|source| CatalogError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;

        let mut portraits: Vec<PortraitDef> = Vec::with_capacity(file.portrait.len());
        for def in file.portrait {
            match portraits.iter_mut().find(|p| p.id == def.id) {
                Some(existing) => *existing = def,
                None => portraits.push(def),
            }
        }
        Ok(portraits)
    }

    fn read(path: &Path) -> Result<Vec<PortraitDef>, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }
}

impl PortraitCatalog for SpriteBank {
    fn portraits(&self) -> Vec<&str> {
        self.portraits.iter().map(|p| p.id.as_str()).collect()
    }

    fn animations_of(&self, portrait: &str) -> Vec<&str> {
        self.portrait(portrait)
            .map(|p| p.animations.iter().map(|a| a.name.as_str()).collect())
            .unwrap_or_default()
    }

    fn first_frame_size(&self, portrait: &str, animation: &str) -> Option<(u32, u32)> {
        let frame = self.animation(portrait, animation)?.frames.first()?;
        Some((frame.width, frame.height))
    }

    fn has(&self, portrait: &str) -> bool {
        self.portrait(portrait).is_some()
    }

    fn has_animation(&self, portrait: &str, animation: &str) -> bool {
        self.animation(portrait, animation).is_some()
    }

    fn native_size(&self, portrait: &str) -> Option<u32> {
        self.portrait(portrait)?.size
    }
}

impl AssetBank for SpriteBank {
    fn reload(&mut self, source: &CatalogSource) -> Result<(), CatalogError> {
        let portraits = match source {
            CatalogSource::Builtin => Self::parse(BUILTIN_CATALOG, Path::new("<built-in>"))?,
            CatalogSource::File(path) => Self::read(path)?,
        };
        self.portraits = portraits;
        self.source = source.clone();
        info!(target: "portraits", source = %self.source, portraits = self.portraits.len(), "catalog loaded");
        Ok(())
    }

    fn source(&self) -> &CatalogSource {
        &self.source
    }

    fn catalog(&self) -> &dyn PortraitCatalog {
        self
    }
}
