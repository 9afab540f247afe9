/// `config.toml` loading.
///
/// The first `config.toml` found in the exe directory, the working
/// directory or `~/.local/share/slotportraits` wins. Every key is optional;
/// a missing or unparsable file means all defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use crate::domain::catalog::CatalogSource;
use crate::domain::eligibility::{EligibilityRules, DEFAULT_DELIMITER, DEFAULT_MAX_FRAME_SIZE, DEFAULT_PREFIX};
use crate::domain::picker::PreviewRules;
use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.toml";
const DATA_SUBDIR: &str = ".local/share/slotportraits";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub portraits: PortraitConfig,
    pub gamepad: GamepadConfig,
    /// Explicit save directory; `None` lets `sim::save::save_dir` decide.
    pub save_dir: Option<PathBuf>,
    pub log_file: PathBuf,
}

#[derive(Clone, Debug)]
pub struct PortraitConfig {
    pub rules: EligibilityRules,
    pub preview: PreviewRules,
    pub label: String,
    /// Catalog restored every time the file-select screen opens.
    pub catalog: CatalogSource,
    /// Content-pack catalog that can be swapped in from the title screen.
    pub override_catalog: Option<PathBuf>,
}

/// Button names, parsed by the gamepad layer.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GamepadConfig {
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
}

impl Default for GamepadConfig {
    fn default() -> Self {
        GamepadConfig {
            confirm: vec!["A".into(), "Start".into()],
            cancel: vec!["B".into(), "Select".into()],
        }
    }
}

// ── File schema ──

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct ConfigFile {
    portraits: PortraitsSection,
    gamepad: GamepadConfig,
    general: GeneralSection,
}

#[derive(Deserialize, Debug)]
#[serde(default)]
struct PortraitsSection {
    prefix: String,
    delimiter: char,
    max_frame_size: u32,
    preview_size: f32,
    default_native_size: u32,
    label: String,
    catalog: String,
    override_catalog: Option<String>,
}

impl Default for PortraitsSection {
    fn default() -> Self {
        let preview = PreviewRules::default();
        PortraitsSection {
            prefix: DEFAULT_PREFIX.into(),
            delimiter: DEFAULT_DELIMITER,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            preview_size: preview.target_size,
            default_native_size: preview.default_native_size,
            label: "Change Portrait".into(),
            catalog: "Graphics/Portraits.toml".into(),
            override_catalog: None,
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(default)]
struct GeneralSection {
    save_dir: Option<String>,
    log_file: String,
}

impl Default for GeneralSection {
    fn default() -> Self {
        GeneralSection { save_dir: None, log_file: "slotportraits.log".into() }
    }
}

impl AppConfig {
    /// Defaults stand in for a file that can't be read or parsed; the
    /// reason comes back alongside so it can be logged once tracing is up.
    pub fn load() -> (Self, Option<ConfigError>) {
        let dirs = candidate_dirs();
        Self::load_from(&dirs)
    }

    fn load_from(dirs: &[PathBuf]) -> (Self, Option<ConfigError>) {
        let (file, problem) = read_config(dirs);
        (Self::from_file(file, dirs), problem)
    }

    fn from_file(file: ConfigFile, dirs: &[PathBuf]) -> Self {
        let p = file.portraits;

        // Missing canonical file: fall back to the catalog built into the binary
        let catalog = match resolve_existing(&p.catalog, dirs) {
            Some(path) => CatalogSource::File(path),
            None => CatalogSource::Builtin,
        };
        let override_catalog = p
            .override_catalog
            .map(|o| resolve_existing(&o, dirs).unwrap_or_else(|| PathBuf::from(o)));

        AppConfig {
            portraits: PortraitConfig {
                rules: EligibilityRules {
                    prefix: p.prefix,
                    delimiter: p.delimiter,
                    max_frame_size: p.max_frame_size,
                },
                preview: PreviewRules {
                    target_size: p.preview_size,
                    default_native_size: p.default_native_size,
                },
                label: p.label,
                catalog,
                override_catalog,
            },
            gamepad: file.gamepad,
            save_dir: file.general.save_dir.map(PathBuf::from),
            log_file: PathBuf::from(file.general.log_file),
        }
    }
}

/// Absolute paths are taken as-is; relative ones are looked up in each
/// candidate directory in turn.
fn resolve_existing(raw: &str, dirs: &[PathBuf]) -> Option<PathBuf> {
    let path = PathBuf::from(raw);
    if path.is_absolute() {
        return path.is_file().then_some(path);
    }
    dirs.iter().map(|d| d.join(&path)).find(|p| p.is_file())
}

/// Exe dir, CWD, then the per-user data dir if it exists. No duplicates.
fn candidate_dirs() -> Vec<PathBuf> {
    let exe_dir = std::env::current_exe()
        .ok()
        .map(|exe| exe.canonicalize().unwrap_or(exe))
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    let cwd = std::env::current_dir().ok();
    let data_dir = std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(DATA_SUBDIR))
        .filter(|d| d.is_dir());

    let mut dirs: Vec<PathBuf> = Vec::new();
    for dir in [exe_dir, cwd, data_dir].into_iter().flatten() {
        if !dirs.contains(&dir) {
            dirs.push(dir);
        }
    }
    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }
    dirs
}

/// First readable `config.toml` wins. An unreadable one is skipped but
/// still reported.
fn read_config(dirs: &[PathBuf]) -> (ConfigFile, Option<ConfigError>) {
    let mut problem = None;
    for path in dirs.iter().map(|d| d.join(CONFIG_FILE)).filter(|p| p.exists()) {
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                return match parse_config(&text, &path) {
                    Ok(file) => (file, problem),
                    Err(e) => (ConfigFile::default(), Some(e)),
                };
            }
            Err(source) => {
                problem.get_or_insert(ConfigError::Read { path, source });
            }
        }
    }
    (ConfigFile::default(), problem)
}

fn parse_config(text: &str, path: &Path) -> Result<ConfigFile, ConfigError> {
    toml::from_str(text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_from(text: &str, dirs: &[PathBuf]) -> AppConfig {
        AppConfig::from_file(parse_config(text, Path::new(CONFIG_FILE)).unwrap_or_default(), dirs)
    }

    #[test]
    fn empty_file_gives_defaults() {
        let cfg = config_from("", &[]);
        assert_eq!(cfg.portraits.rules.prefix, "idle_");
        assert_eq!(cfg.portraits.rules.delimiter, '_');
        assert_eq!(cfg.portraits.rules.max_frame_size, 200);
        assert_eq!(cfg.portraits.preview.target_size, 200.0);
        assert_eq!(cfg.portraits.preview.default_native_size, 160);
        assert_eq!(cfg.portraits.label, "Change Portrait");
        assert_eq!(cfg.portraits.catalog, CatalogSource::Builtin);
        assert!(cfg.portraits.override_catalog.is_none());
        assert!(cfg.save_dir.is_none());
        assert_eq!(cfg.log_file, PathBuf::from("slotportraits.log"));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = config_from("[portraits]\nmax_frame_size = 320\nlabel = \"Portrait\"\n", &[]);
        assert_eq!(cfg.portraits.rules.max_frame_size, 320);
        assert_eq!(cfg.portraits.label, "Portrait");
        assert_eq!(cfg.portraits.rules.prefix, "idle_");
        assert_eq!(cfg.gamepad.confirm, GamepadConfig::default().confirm);
    }

    #[test]
    fn broken_file_falls_back_to_defaults_and_says_why() {
        let dir = std::env::temp_dir().join(format!("slotportraits_cfg_broken_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(CONFIG_FILE), "[portraits\nprefix = ").unwrap();

        let (cfg, problem) = AppConfig::load_from(&[dir.clone()]);
        assert_eq!(cfg.portraits.rules.prefix, "idle_");
        match problem {
            Some(ConfigError::Parse { path, .. }) => assert_eq!(path, dir.join(CONFIG_FILE)),
            other => panic!("expected a parse error, got {other:?}"),
        }

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_is_not_a_problem() {
        let dir = std::env::temp_dir().join(format!("slotportraits_cfg_none_{}", std::process::id()));
        let (cfg, problem) = AppConfig::load_from(&[dir]);
        assert!(problem.is_none());
        assert_eq!(cfg.portraits.label, "Change Portrait");
    }

    #[test]
    fn good_file_loads_without_problem() {
        let dir = std::env::temp_dir().join(format!("slotportraits_cfg_good_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(CONFIG_FILE), "[portraits]\nprefix = \"face_\"\n").unwrap();

        let (cfg, problem) = AppConfig::load_from(&[dir.clone()]);
        assert!(problem.is_none());
        assert_eq!(cfg.portraits.rules.prefix, "face_");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn catalog_is_found_in_search_dirs() {
        let dir = std::env::temp_dir().join(format!("slotportraits_cfg_{}", std::process::id()));
        std::fs::create_dir_all(dir.join("Graphics")).unwrap();
        std::fs::write(dir.join("Graphics/Portraits.toml"), "").unwrap();

        let cfg = config_from("[general]\nsave_dir = \"/tmp/saves\"\n", &[PathBuf::from("/nope"), dir.clone()]);
        assert_eq!(cfg.portraits.catalog, CatalogSource::File(dir.join("Graphics/Portraits.toml")));
        assert_eq!(cfg.save_dir, Some(PathBuf::from("/tmp/saves")));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn unresolved_override_is_kept_verbatim() {
        let cfg = config_from("[portraits]\noverride_catalog = \"mods/x/Portraits.toml\"\n", &[]);
        assert_eq!(cfg.portraits.override_catalog, Some(PathBuf::from("mods/x/Portraits.toml")));
    }

    #[test]
    fn gamepad_lists_replace_defaults_individually() {
        let cfg = config_from("[gamepad]\ncancel = [\"Y\"]\n", &[]);
        assert_eq!(cfg.gamepad.cancel, vec!["Y".to_string()]);
        assert_eq!(cfg.gamepad.confirm, GamepadConfig::default().confirm);
    }
}
