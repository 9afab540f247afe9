/// Read-side view of the portrait sprite bank.
///
/// The scanner, the picker preview and the setup override only ever look
/// things up; loading and reloading belong to `AssetBank`.

use std::fmt;
use std::path::PathBuf;

use crate::error::CatalogError;

pub trait PortraitCatalog {
    /// Portrait ids in the bank's natural iteration order.
    fn portraits(&self) -> Vec<&str>;

    /// Animation names under `portrait`, in declaration order.
    fn animations_of(&self, portrait: &str) -> Vec<&str>;

    /// Pixel (width, height) of the first frame, or `None` when the
    /// animation does not exist or has no frames.
    fn first_frame_size(&self, portrait: &str, animation: &str) -> Option<(u32, u32)>;

    fn has(&self, portrait: &str) -> bool;

    fn has_animation(&self, portrait: &str, animation: &str) -> bool;

    /// Declared native size attribute of the portrait art, if any.
    fn native_size(&self, portrait: &str) -> Option<u32>;
}

/// Where a catalog's contents come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CatalogSource {
    /// The catalog compiled into the binary.
    Builtin,
    File(PathBuf),
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogSource::Builtin => write!(f, "<built-in>"),
            CatalogSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A catalog whose whole contents can be replaced from another source.
pub trait AssetBank: PortraitCatalog {
    /// Replace the contents with `source`. On error the old contents stay.
    fn reload(&mut self, source: &CatalogSource) -> Result<(), CatalogError>;

    fn source(&self) -> &CatalogSource;

    /// Lookup view of the current contents.
    fn catalog(&self) -> &dyn PortraitCatalog;
}
