/// Save slots on disk: the host's slot record and the portrait side-state.
///
/// ## Files (slot N shown as N+1):
///   `save_{N+1}.dat`       host record, `name=` / `deaths=` lines
///   `portraits_{N+1}.dat`  portrait choice, `portrait=` / `animation=` lines
///
/// The portrait file is separate so the host format never has to know about
/// it. A slot "exists" when its host record is on disk; a record that does
/// not parse marks the slot corrupted.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::domain::picker::SelectionStore;
use crate::domain::portrait::SelectionState;
use crate::error::SaveError;

pub const SLOT_COUNT: usize = 3;

// ══════════════════════════════════════════════════════════════
// Public types
// ══════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotRecord {
    pub name: String,
    pub deaths: u32,
}

impl SlotRecord {
    pub fn new(name: impl Into<String>) -> Self {
        SlotRecord { name: name.into(), deaths: 0 }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlotStatus {
    Empty,
    Ready(SlotRecord),
    Corrupted,
}

pub struct SlotFiles {
    dir: PathBuf,
}

// ══════════════════════════════════════════════════════════════
// Paths
// ══════════════════════════════════════════════════════════════

/// Resolve where saves live: configured dir, then a writable exe dir,
/// then XDG data home, then CWD.
pub fn save_dir(configured: Option<&Path>) -> PathBuf {
    if let Some(dir) = configured {
        return dir.to_path_buf();
    }

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            // System installs are usually read-only
            let probe = parent.join(".write_test_slotportraits");
            if std::fs::write(&probe, "").is_ok() {
                let _ = std::fs::remove_file(&probe);
                return parent.to_path_buf();
            }
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/slotportraits");
        if std::fs::create_dir_all(&xdg).is_ok() {
            return xdg;
        }
    }

    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

impl SlotFiles {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        SlotFiles { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, slot: usize) -> PathBuf {
        self.dir.join(format!("save_{}.dat", slot + 1))
    }

    fn portrait_path(&self, slot: usize) -> PathBuf {
        self.dir.join(format!("portraits_{}.dat", slot + 1))
    }

    // ── Host record ──

    pub fn read_slot(&self, slot: usize) -> SlotStatus {
        match std::fs::read_to_string(self.record_path(slot)) {
            Ok(text) => match parse_record(&text) {
                Some(record) => SlotStatus::Ready(record),
                None => SlotStatus::Corrupted,
            },
            Err(e) if e.kind() == ErrorKind::NotFound => SlotStatus::Empty,
            Err(_) => SlotStatus::Corrupted,
        }
    }

    pub fn write_slot(&self, slot: usize, record: &SlotRecord) -> Result<(), SaveError> {
        write_file(&self.dir, &self.record_path(slot), &serialize_record(record))
    }

    /// Remove both files of a slot. Missing files are fine.
    pub fn delete_slot(&self, slot: usize) -> Result<(), SaveError> {
        for path in [self.record_path(slot), self.portrait_path(slot)] {
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(source) => return Err(SaveError::Io { path, source }),
            }
        }
        Ok(())
    }
}

impl SelectionStore for SlotFiles {
    fn load_selection(&mut self, slot: usize) -> Result<SelectionState, SaveError> {
        let path = self.portrait_path(slot);
        match std::fs::read_to_string(&path) {
            Ok(text) => parse_selection(&text).ok_or(SaveError::Corrupted { slot }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(SelectionState::default()),
            Err(source) => Err(SaveError::Io { path, source }),
        }
    }

    fn save_selection(&mut self, slot: usize, state: &SelectionState) -> Result<(), SaveError> {
        write_file(&self.dir, &self.portrait_path(slot), &serialize_selection(state))
    }
}

fn write_file(dir: &Path, path: &Path, content: &str) -> Result<(), SaveError> {
    std::fs::create_dir_all(dir).map_err(|source| SaveError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    std::fs::write(path, content).map_err(|source| SaveError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ══════════════════════════════════════════════════════════════
// Serialization
// ══════════════════════════════════════════════════════════════

fn serialize_record(record: &SlotRecord) -> String {
    let mut out = String::with_capacity(64);
    out.push_str(&format!("name={}\n", record.name));
    out.push_str(&format!("deaths={}\n", record.deaths));
    out
}

fn parse_record(content: &str) -> Option<SlotRecord> {
    let mut name = None;
    let mut deaths = 0;
    for line in content.lines() {
        if let Some(val) = line.strip_prefix("name=") {
            name = Some(val.trim().to_string());
        } else if let Some(val) = line.strip_prefix("deaths=") {
            deaths = val.trim().parse().ok()?;
        }
    }
    Some(SlotRecord { name: name?, deaths })
}

fn serialize_selection(state: &SelectionState) -> String {
    format!("portrait={}\nanimation={}\n", state.portrait, state.animation)
}

/// Missing keys fall back to the placeholder pair. Unknown keys are
/// skipped; a line that is not `key=value` makes the file unreadable.
fn parse_selection(content: &str) -> Option<SelectionState> {
    let mut state = SelectionState::default();
    for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let (key, val) = line.split_once('=')?;
        match key {
            "portrait" => state.portrait = val.trim().to_string(),
            "animation" => state.animation = val.trim().to_string(),
            _ => {}
        }
    }
    Some(state)
}
