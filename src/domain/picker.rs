/// Portrait picker: a slot button cycled with Left/Right.
///
/// The picker keeps an index into the eligible list. Each step writes the
/// new pair into the slot's selection, swaps the on-screen portrait right
/// away, and saves it if the slot already has a save file. Slots that are
/// still being created keep the choice in memory only; the new-game hook
/// carries it over.

use tracing::warn;

use crate::error::SaveError;

use super::catalog::PortraitCatalog;
use super::layout::{measure_text, ButtonOwner, ScreenPos, SlotButton};
use super::portrait::{EligibleEntry, SelectionState};

// ── Collaborator seams ──

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn step(self) -> i8 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }
}

/// Audio cues the picker asks the host to play.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiCue {
    ToggleOn,
    ToggleOff,
}

/// The slot a picker decorates, as seen through the host.
pub trait PortraitSlot {
    fn slot_id(&self) -> usize;
    /// A save file for this slot is on disk.
    fn exists(&self) -> bool;
    fn corrupted(&self) -> bool;
    fn selection(&self) -> &SelectionState;
    fn selection_mut(&mut self) -> &mut SelectionState;
    /// Re-target the slot's portrait sprite and start `animation` on it.
    fn show_portrait(&mut self, portrait: &str, animation: &str, scale: f32);
    fn play_cue(&mut self, cue: UiCue);
    /// Kick the hosting menu's wiggle feedback.
    fn wiggle_menu(&mut self);
}

/// Durable storage for per-slot selections.
pub trait SelectionStore {
    fn load_selection(&mut self, slot: usize) -> Result<SelectionState, SaveError>;
    fn save_selection(&mut self, slot: usize, state: &SelectionState) -> Result<(), SaveError>;
}

/// Text drawing surface provided by the host renderer.
pub trait TextCanvas {
    /// Draw `text` with an outline. `justify_x` of 0.5 centres it on `pos.x`.
    fn draw_text_outline(&mut self, text: &str, pos: ScreenPos, justify_x: f32, scale: f32, highlighted: bool);
}

/// How the preview sprite is sized to fit the slot.
#[derive(Clone, Debug)]
pub struct PreviewRules {
    /// On-screen portrait size, in virtual pixels.
    pub target_size: f32,
    /// Native size assumed when the portrait declares none.
    pub default_native_size: u32,
}

impl Default for PreviewRules {
    fn default() -> Self {
        PreviewRules {
            target_size: 200.0,
            default_native_size: 160,
        }
    }
}

impl PreviewRules {
    pub fn scale_for(&self, catalog: &dyn PortraitCatalog, portrait: &str) -> f32 {
        let native = catalog
            .native_size(portrait)
            .filter(|&n| n > 0)
            .unwrap_or(self.default_native_size)
            .max(1);
        self.target_size / native as f32
    }
}

/// Everything `advance` touches besides the picker itself.
pub struct PickerContext<'a> {
    pub eligible: &'a [EligibleEntry],
    pub catalog: &'a dyn PortraitCatalog,
    pub preview: &'a PreviewRules,
    pub slot: &'a mut dyn PortraitSlot,
    pub store: &'a mut dyn SelectionStore,
}

// ── Picker ──

pub struct PortraitPicker {
    slot_id: usize,
    label: String,
    scale: f32,
    arrow_offset: ScreenPos,
    /// -1, 0 or +1; only drives which arrow stays still.
    last_direction: i8,
    current_index: usize,
}

impl PortraitPicker {
    pub const TAG: &'static str = "portrait";
    pub const SCALE: f32 = 0.5;
    const ARROW_GAP: f32 = 20.0;

    /// Build the picker for a slot whose current choice is `selection`.
    /// A choice missing from `eligible` starts the picker at index 0.
    pub fn new(slot_id: usize, label: &str, selection: &SelectionState, eligible: &[EligibleEntry]) -> Self {
        let scale = Self::SCALE;
        PortraitPicker {
            slot_id,
            label: label.to_string(),
            scale,
            arrow_offset: ScreenPos::new(Self::ARROW_GAP + measure_text(label, 1.0) / 2.0 * scale, 0.0),
            last_direction: 0,
            current_index: selection.index_in(eligible).unwrap_or(0),
        }
    }

    pub fn slot_id(&self) -> usize {
        self.slot_id
    }

    #[cfg(test)]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[cfg(test)]
    pub fn last_direction(&self) -> i8 {
        self.last_direction
    }

    #[cfg(test)]
    pub fn arrow_offset(&self) -> ScreenPos {
        self.arrow_offset
    }

    /// The entry this picker registers in the slot's button list.
    pub fn button(&self) -> SlotButton {
        SlotButton::new(self.label.clone(), self.scale, ButtonOwner::Extension(Self::TAG))
    }

    pub fn is_button(button: &SlotButton) -> bool {
        button.owner == ButtonOwner::Extension(Self::TAG)
    }

    /// Per-frame input step. `focused` is whether this picker is the
    /// highlighted sibling; `press` is this frame's Left/Right press.
    pub fn update(&mut self, focused: bool, press: Option<Direction>, ctx: &mut PickerContext<'_>) {
        if !focused {
            self.last_direction = 0;
            return;
        }
        if let Some(direction) = press {
            self.advance(direction, ctx);
        }
    }

    /// Move one entry left or right, wrapping at both ends.
    pub fn advance(&mut self, direction: Direction, ctx: &mut PickerContext<'_>) {
        let len = ctx.eligible.len();
        if len == 0 {
            return;
        }

        self.last_direction = direction.step();
        ctx.slot.play_cue(match direction {
            Direction::Right => UiCue::ToggleOn,
            Direction::Left => UiCue::ToggleOff,
        });

        let next = (self.current_index as i64 + direction.step() as i64).rem_euclid(len as i64);
        self.current_index = next as usize;

        let entry = &ctx.eligible[self.current_index];
        ctx.slot.selection_mut().assign(entry);

        let scale = ctx.preview.scale_for(ctx.catalog, &entry.portrait);
        ctx.slot.show_portrait(&entry.portrait, &entry.animation, scale);

        if ctx.slot.exists() {
            let slot_id = ctx.slot.slot_id();
            if let Err(e) = ctx.store.save_selection(slot_id, ctx.slot.selection()) {
                warn!(target: "portraits", slot = slot_id, error = %e, "could not save portrait choice");
            }
        }

        ctx.slot.wiggle_menu();
    }

    /// Draw the two arrows around the button label at `position`.
    pub fn draw(&self, canvas: &mut dyn TextCanvas, position: ScreenPos, focused: bool, wiggle: f32) {
        let shift = ScreenPos::new(if focused { wiggle } else { 0.0 }, 0.0);
        let left_shift = if self.last_direction <= 0 { shift } else { ScreenPos::ZERO };
        let right_shift = if self.last_direction >= 0 { shift } else { ScreenPos::ZERO };

        canvas.draw_text_outline("<", position + left_shift - self.arrow_offset, 0.5, self.scale, focused);
        canvas.draw_text_outline(">", position + right_shift + self.arrow_offset, 0.5, self.scale, focused);
    }
}
