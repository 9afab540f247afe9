/// In-memory stand-ins for the catalog, slot, store and canvas seams.

use crate::domain::catalog::PortraitCatalog;
use crate::domain::layout::ScreenPos;
use crate::domain::picker::{PortraitSlot, SelectionStore, TextCanvas, UiCue};
use crate::domain::portrait::SelectionState;
use crate::error::SaveError;

struct FakeAnimation {
    name: String,
    first_frame: Option<(u32, u32)>,
}

struct FakePortrait {
    id: String,
    size: Option<u32>,
    animations: Vec<FakeAnimation>,
}

#[derive(Default)]
pub struct FakeCatalog {
    portraits: Vec<FakePortrait>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        FakeCatalog::default()
    }

    /// Append a portrait with `(animation, width, height)` entries.
    pub fn with(mut self, id: &str, animations: &[(&str, u32, u32)]) -> Self {
        self.portraits.push(FakePortrait {
            id: id.to_string(),
            size: None,
            animations: animations
                .iter()
                .map(|(name, w, h)| FakeAnimation {
                    name: name.to_string(),
                    first_frame: Some((*w, *h)),
                })
                .collect(),
        });
        self
    }

    pub fn with_size(mut self, id: &str, size: u32) -> Self {
        if let Some(p) = self.portraits.iter_mut().find(|p| p.id == id) {
            p.size = Some(size);
        }
        self
    }

    pub fn strip_frames(&mut self, id: &str, animation: &str) {
        if let Some(a) = self.animation_mut(id, animation) {
            a.first_frame = None;
        }
    }

    fn portrait(&self, id: &str) -> Option<&FakePortrait> {
        self.portraits.iter().find(|p| p.id == id)
    }

    fn animation_mut(&mut self, id: &str, animation: &str) -> Option<&mut FakeAnimation> {
        self.portraits
            .iter_mut()
            .find(|p| p.id == id)?
            .animations
            .iter_mut()
            .find(|a| a.name == animation)
    }
}

impl PortraitCatalog for FakeCatalog {
    fn portraits(&self) -> Vec<&str> {
        self.portraits.iter().map(|p| p.id.as_str()).collect()
    }

    fn animations_of(&self, portrait: &str) -> Vec<&str> {
        self.portrait(portrait)
            .map(|p| p.animations.iter().map(|a| a.name.as_str()).collect())
            .unwrap_or_default()
    }

    fn first_frame_size(&self, portrait: &str, animation: &str) -> Option<(u32, u32)> {
        self.portrait(portrait)?
            .animations
            .iter()
            .find(|a| a.name == animation)?
            .first_frame
    }

    fn has(&self, portrait: &str) -> bool {
        self.portrait(portrait).is_some()
    }

    fn has_animation(&self, portrait: &str, animation: &str) -> bool {
        self.portrait(portrait)
            .map_or(false, |p| p.animations.iter().any(|a| a.name == animation))
    }

    fn native_size(&self, portrait: &str) -> Option<u32> {
        self.portrait(portrait)?.size
    }
}

/// A slot that records every side effect the picker asks for.
pub struct FakeSlot {
    pub id: usize,
    pub exists: bool,
    pub corrupted: bool,
    pub selection: SelectionState,
    pub shown: Vec<(String, String, f32)>,
    pub cues: Vec<UiCue>,
    pub wiggles: u32,
}

impl FakeSlot {
    pub fn new(id: usize, exists: bool) -> Self {
        FakeSlot {
            id,
            exists,
            corrupted: false,
            selection: SelectionState::default(),
            shown: Vec::new(),
            cues: Vec::new(),
            wiggles: 0,
        }
    }
}

impl PortraitSlot for FakeSlot {
    fn slot_id(&self) -> usize {
        self.id
    }
    fn exists(&self) -> bool {
        self.exists
    }
    fn corrupted(&self) -> bool {
        self.corrupted
    }
    fn selection(&self) -> &SelectionState {
        &self.selection
    }
    fn selection_mut(&mut self) -> &mut SelectionState {
        &mut self.selection
    }
    fn show_portrait(&mut self, portrait: &str, animation: &str, scale: f32) {
        self.shown.push((portrait.to_string(), animation.to_string(), scale));
    }
    fn play_cue(&mut self, cue: UiCue) {
        self.cues.push(cue);
    }
    fn wiggle_menu(&mut self) {
        self.wiggles += 1;
    }
}

#[derive(Default)]
pub struct FakeStore {
    pub stored: Vec<(usize, SelectionState)>,
    pub writes: Vec<(usize, SelectionState)>,
    pub loads: Vec<usize>,
    pub fail_writes: bool,
}

impl FakeStore {
    pub fn with_stored(slot: usize, state: SelectionState) -> Self {
        FakeStore {
            stored: vec![(slot, state)],
            ..FakeStore::default()
        }
    }
}

impl SelectionStore for FakeStore {
    fn load_selection(&mut self, slot: usize) -> Result<SelectionState, SaveError> {
        self.loads.push(slot);
        Ok(self
            .stored
            .iter()
            .rev()
            .find(|(s, _)| *s == slot)
            .map(|(_, st)| st.clone())
            .unwrap_or_default())
    }

    fn save_selection(&mut self, slot: usize, state: &SelectionState) -> Result<(), SaveError> {
        if self.fail_writes {
            return Err(SaveError::Corrupted { slot });
        }
        self.writes.push((slot, state.clone()));
        self.stored.push((slot, state.clone()));
        Ok(())
    }
}

/// Records `(text, position, highlighted)` for every draw call.
#[derive(Default)]
pub struct RecordingCanvas {
    pub calls: Vec<(String, ScreenPos, bool)>,
}

impl TextCanvas for RecordingCanvas {
    fn draw_text_outline(&mut self, text: &str, pos: ScreenPos, _justify_x: f32, _scale: f32, highlighted: bool) {
        self.calls.push((text.to_string(), pos, highlighted));
    }
}
