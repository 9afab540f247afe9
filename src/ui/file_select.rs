/// The save-file select screen.
///
/// Three slots sit side by side. Confirming a slot opens it: its column of
/// buttons slides down under the portrait card and takes the input. The
/// screen knows nothing about portraits beyond the placeholder pair; the
/// picker comes in through `SlotHooks`.
///
/// ## Per-frame order
///   1. timers, eases, wiggler and sprite animation advance
///   2. the screen's own input handling (slot list or open slot)
///   3. `after_slot_update` for every slot
///   4. cues and wiggle requests queued by hooks are collected

use tracing::{debug, info, warn};

use crate::domain::layout::{ButtonOwner, ScreenPos, SlotButton, CANVAS_W, LINE_HEIGHT};
use crate::domain::picker::{Direction, PortraitSlot, PreviewRules, UiCue};
use crate::domain::portrait::{SelectionState, PLACEHOLDER_ANIMATION, PLACEHOLDER_PORTRAIT};
use crate::sim::event::ScreenEvent;
use crate::sim::save::{SlotFiles, SlotRecord, SlotStatus, SLOT_COUNT};
use crate::sim::shim::{RenderFrame, SlotHooks, UpdateFrame};
use crate::sim::sprite_bank::SpriteBank;

/// Seconds for a slot to open or close fully.
const TWEEN_TIME: f32 = 0.3;
/// Input lockout after opening/closing a slot.
const INPUT_DELAY: f32 = 0.1;
/// Fade between Begin and the game taking over.
const START_DELAY: f32 = 0.6;
/// Vertical position of every slot's origin.
const SLOT_Y: f32 = 420.0;

/// Names the Rename button cycles through.
pub const NAMES: &[&str] = &["Madeline", "Maddy", "Theo", "Granny", "Badeline"];

/// Menu presses for one frame (edge triggered).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MenuInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub confirm: bool,
    pub cancel: bool,
}

impl MenuInput {
    pub fn horizontal(&self) -> Option<Direction> {
        if self.left {
            Some(Direction::Left)
        } else if self.right {
            Some(Direction::Right)
        } else {
            None
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Portrait sprite
// ══════════════════════════════════════════════════════════════

/// The animated portrait on a slot card.
#[derive(Clone, Debug, PartialEq)]
pub struct PortraitSprite {
    portrait: String,
    animation: String,
    scale: f32,
    frame: usize,
    timer: f32,
}

impl PortraitSprite {
    pub fn new(portrait: &str, animation: &str, scale: f32) -> Self {
        PortraitSprite {
            portrait: portrait.to_string(),
            animation: animation.to_string(),
            scale,
            frame: 0,
            timer: 0.0,
        }
    }

    /// Switch identity and restart from the first frame.
    pub fn play(&mut self, portrait: &str, animation: &str, scale: f32) {
        *self = PortraitSprite::new(portrait, animation, scale);
    }

    pub fn tick(&mut self, dt: f32, bank: &SpriteBank) {
        let Some(anim) = bank.animation(&self.portrait, &self.animation) else {
            return;
        };
        if anim.frames.len() < 2 || anim.delay <= 0.0 {
            return;
        }
        self.timer += dt;
        while self.timer >= anim.delay {
            self.timer -= anim.delay;
            self.frame = (self.frame + 1) % anim.frames.len();
        }
    }

    /// Art lines of the frame on screen. `None` if the animation is gone.
    pub fn art<'a>(&self, bank: &'a SpriteBank) -> Option<&'a [String]> {
        let anim = bank.animation(&self.portrait, &self.animation)?;
        let frame = anim.frames.get(self.frame % anim.frames.len().max(1))?;
        Some(&frame.art)
    }

    pub fn portrait(&self) -> &str {
        &self.portrait
    }

    pub fn animation(&self) -> &str {
        &self.animation
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    #[cfg(test)]
    pub fn frame(&self) -> usize {
        self.frame
    }
}

// ══════════════════════════════════════════════════════════════
// Slot profile
// ══════════════════════════════════════════════════════════════

/// The part of a slot hooks are allowed to touch.
pub struct SlotProfile {
    id: usize,
    exists: bool,
    corrupted: bool,
    record: Option<SlotRecord>,
    /// Extension-owned side state. Wiped when a new game is created.
    mod_data: SelectionState,
    sprite: PortraitSprite,
    cues: Vec<UiCue>,
    wiggle: bool,
}

impl SlotProfile {
    fn new(id: usize, status: SlotStatus) -> Self {
        let (exists, corrupted, record) = match status {
            SlotStatus::Empty => (false, false, None),
            SlotStatus::Ready(record) => (true, false, Some(record)),
            SlotStatus::Corrupted => (true, true, None),
        };
        SlotProfile {
            id,
            exists,
            corrupted,
            record,
            mod_data: SelectionState::default(),
            sprite: PortraitSprite::new(PLACEHOLDER_PORTRAIT, PLACEHOLDER_ANIMATION, 1.0),
            cues: Vec::new(),
            wiggle: false,
        }
    }

    pub fn record(&self) -> Option<&SlotRecord> {
        self.record.as_ref()
    }

    pub fn sprite(&self) -> &PortraitSprite {
        &self.sprite
    }
}

impl PortraitSlot for SlotProfile {
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
        &self.mod_data
    }

    fn selection_mut(&mut self) -> &mut SelectionState {
        &mut self.mod_data
    }

    fn show_portrait(&mut self, portrait: &str, animation: &str, scale: f32) {
        self.sprite.play(portrait, animation, scale);
    }

    fn play_cue(&mut self, cue: UiCue) {
        self.cues.push(cue);
    }

    fn wiggle_menu(&mut self) {
        self.wiggle = true;
    }
}

// ══════════════════════════════════════════════════════════════
// Wiggler
// ══════════════════════════════════════════════════════════════

/// Decaying sine used for menu nudges.
#[derive(Clone, Debug)]
pub struct Wiggler {
    duration: f32,
    frequency: f32,
    elapsed: Option<f32>,
}

impl Wiggler {
    pub fn new(duration: f32, frequency: f32) -> Self {
        Wiggler { duration, frequency, elapsed: None }
    }

    pub fn start(&mut self) {
        self.elapsed = Some(0.0);
    }

    pub fn update(&mut self, dt: f32) {
        if let Some(t) = self.elapsed {
            let t = t + dt;
            self.elapsed = (t < self.duration).then_some(t);
        }
    }

    /// In [-1, 1]; 0 when idle.
    pub fn value(&self) -> f32 {
        match self.elapsed {
            Some(t) => {
                let p = t / self.duration;
                (p * self.frequency * std::f32::consts::TAU).sin() * (1.0 - p)
            }
            None => 0.0,
        }
    }
}

// ══════════════════════════════════════════════════════════════
// File slot / screen
// ══════════════════════════════════════════════════════════════

pub struct FileSlot {
    pub profile: SlotProfile,
    pub buttons: Vec<SlotButton>,
    pub button_index: usize,
    /// 0 = closed, 1 = open.
    pub selected_ease: f32,
    pub deleting: bool,
    /// Name given to the file when a new game is created here.
    pub pending_name: String,
    pub origin: ScreenPos,
}

impl FileSlot {
    pub fn name(&self) -> &str {
        self.profile
            .record
            .as_ref()
            .map_or(self.pending_name.as_str(), |r| r.name.as_str())
    }
}

fn slot_origin(id: usize) -> ScreenPos {
    let column = CANVAS_W / SLOT_COUNT as f32;
    ScreenPos::new(column * (id as f32 + 0.5), SLOT_Y)
}

/// The screen's own buttons, before extensions add theirs.
fn host_buttons(profile: &SlotProfile) -> Vec<SlotButton> {
    if profile.corrupted {
        return vec![SlotButton::new("Delete", 0.5, ButtonOwner::Delete)];
    }
    let mut buttons = vec![
        SlotButton::new("Begin", 1.0, ButtonOwner::Begin),
        SlotButton::new("Rename", 0.5, ButtonOwner::Rename),
    ];
    if profile.exists {
        buttons.push(SlotButton::new("Delete", 0.5, ButtonOwner::Delete));
    }
    buttons
}

pub struct FileSelectScreen {
    files: SlotFiles,
    preview: PreviewRules,
    slots: Vec<FileSlot>,
    slot_index: usize,
    slot_open: bool,
    /// This screen is the active one.
    selected: bool,
    /// The terminal has focus.
    focused: bool,
    input_delay: f32,
    starting: Option<(f32, bool)>,
    wiggler: Wiggler,
}

impl FileSelectScreen {
    pub fn new(files: SlotFiles, preview: PreviewRules) -> Self {
        FileSelectScreen {
            files,
            preview,
            slots: Vec::new(),
            slot_index: 0,
            slot_open: false,
            selected: false,
            focused: true,
            input_delay: 0.0,
            starting: None,
            wiggler: Wiggler::new(0.4, 4.0),
        }
    }

    // ── Lifecycle ──

    pub fn enter(&mut self, bank: &mut SpriteBank, hooks: &mut dyn SlotHooks) {
        hooks.on_screen_enter(bank);
        let slots: Vec<FileSlot> = (0..SLOT_COUNT).map(|id| self.setup_slot(id, bank, hooks)).collect();
        self.slots = slots;
        self.slot_index = 0;
        self.slot_open = false;
        self.selected = true;
        self.input_delay = INPUT_DELAY;
        self.starting = None;
        info!(dir = %self.files.dir().display(), "file select opened");
    }

    pub fn leave(&mut self, hooks: &mut dyn SlotHooks) {
        hooks.on_screen_leave();
        self.selected = false;
        self.slot_open = false;
        self.starting = None;
    }

    fn setup_slot(&self, id: usize, bank: &SpriteBank, hooks: &mut dyn SlotHooks) -> FileSlot {
        let mut profile = SlotProfile::new(id, self.files.read_slot(id));
        let portrait = hooks.override_portrait(&mut profile, bank, PLACEHOLDER_PORTRAIT);
        let animation = hooks.override_animation(&mut profile, bank, PLACEHOLDER_ANIMATION);
        let scale = self.preview.scale_for(bank, &portrait);
        profile.sprite.play(&portrait, &animation, scale);
        debug!(slot = id, portrait = %portrait, animation = %animation, "slot set up");

        FileSlot {
            profile,
            buttons: Vec::new(),
            button_index: 0,
            selected_ease: 0.0,
            deleting: false,
            pending_name: NAMES[0].to_string(),
            origin: slot_origin(id),
        }
    }

    // ── Frame update ──

    pub fn update(
        &mut self,
        dt: f32,
        input: &MenuInput,
        bank: &SpriteBank,
        hooks: &mut dyn SlotHooks,
    ) -> Vec<ScreenEvent> {
        let mut events = Vec::new();

        self.input_delay = (self.input_delay - dt).max(0.0);
        self.wiggler.update(dt);
        let step = dt / TWEEN_TIME;
        for (i, slot) in self.slots.iter_mut().enumerate() {
            let target = if self.slot_open && i == self.slot_index { 1.0 } else { 0.0 };
            slot.selected_ease = if slot.selected_ease < target {
                (slot.selected_ease + step).min(target)
            } else {
                (slot.selected_ease - step).max(target)
            };
            slot.profile.sprite.tick(dt, bank);
        }

        if let Some((timer, new_game)) = self.starting {
            let timer = timer - dt;
            if timer <= 0.0 {
                self.starting = None;
                events.push(ScreenEvent::GameStarted { slot: self.slot_index, new_game });
            } else {
                self.starting = Some((timer, new_game));
            }
        }

        if self.accepts_input() {
            if self.slot_open {
                self.update_open_slot(input, bank, hooks, &mut events);
            } else {
                self.update_slot_list(input, hooks, &mut events);
            }
        }

        self.update_extensions(input, bank, hooks);
        self.collect_feedback(&mut events);
        events
    }

    fn accepts_input(&self) -> bool {
        self.selected
            && self.focused
            && self.starting.is_none()
            && !self.tween_active()
            && self.input_delay <= 0.0
            && !self.slots.is_empty()
    }

    pub fn tween_active(&self) -> bool {
        self.slots.iter().enumerate().any(|(i, slot)| {
            let target = if self.slot_open && i == self.slot_index { 1.0 } else { 0.0 };
            slot.selected_ease != target
        })
    }

    fn update_slot_list(&mut self, input: &MenuInput, hooks: &mut dyn SlotHooks, events: &mut Vec<ScreenEvent>) {
        if (input.up || input.left) && self.slot_index > 0 {
            self.slot_index -= 1;
            events.push(ScreenEvent::SlotMoved);
        } else if (input.down || input.right) && self.slot_index + 1 < self.slots.len() {
            self.slot_index += 1;
            events.push(ScreenEvent::SlotMoved);
        } else if input.confirm {
            self.open_slot(hooks);
            events.push(ScreenEvent::SlotOpened { slot: self.slot_index });
        } else if input.cancel {
            events.push(ScreenEvent::Left);
        }
    }

    fn open_slot(&mut self, hooks: &mut dyn SlotHooks) {
        let slot = &mut self.slots[self.slot_index];
        slot.buttons = host_buttons(&slot.profile);
        if !slot.profile.corrupted {
            hooks.on_create_buttons(&slot.profile, &mut slot.buttons);
        }
        slot.button_index = 0;
        slot.deleting = false;
        self.slot_open = true;
        self.input_delay = INPUT_DELAY;
    }

    fn update_open_slot(
        &mut self,
        input: &MenuInput,
        bank: &SpriteBank,
        hooks: &mut dyn SlotHooks,
        events: &mut Vec<ScreenEvent>,
    ) {
        let index = self.slot_index;
        let slot = &mut self.slots[index];

        if slot.deleting {
            if input.confirm {
                self.delete_slot(bank, hooks, events);
            } else if input.cancel {
                slot.deleting = false;
                events.push(ScreenEvent::SlotClosed { slot: index });
            }
            return;
        }

        if input.up && slot.button_index > 0 {
            slot.button_index -= 1;
            events.push(ScreenEvent::ButtonMoved);
        } else if input.down && slot.button_index + 1 < slot.buttons.len() {
            slot.button_index += 1;
            events.push(ScreenEvent::ButtonMoved);
        } else if input.confirm {
            self.confirm_button(bank, hooks, events);
        } else if input.cancel {
            self.slot_open = false;
            self.input_delay = INPUT_DELAY;
            events.push(ScreenEvent::SlotClosed { slot: index });
        }
    }

    fn confirm_button(&mut self, bank: &SpriteBank, hooks: &mut dyn SlotHooks, events: &mut Vec<ScreenEvent>) {
        let index = self.slot_index;
        let slot = &mut self.slots[index];
        let Some(button) = slot.buttons.get(slot.button_index).cloned() else {
            return;
        };

        match button.owner {
            ButtonOwner::Begin => self.begin(hooks, events),
            ButtonOwner::Rename => self.rename(events),
            ButtonOwner::Delete => {
                slot.deleting = true;
                events.push(ScreenEvent::DeleteAsked { slot: index });
            }
            ButtonOwner::Extension(tag) => {
                if !hooks.on_button_confirmed(&mut slot.profile, bank, &button) {
                    debug!(slot = index, tag, "extension button not handled");
                }
            }
        }
    }

    fn begin(&mut self, hooks: &mut dyn SlotHooks, events: &mut Vec<ScreenEvent>) {
        let index = self.slot_index;
        let slot = &mut self.slots[index];
        let new_game = !slot.profile.exists;

        if new_game {
            hooks.before_new_game(&slot.profile);
            // A fresh file starts with no extension state
            let previous = std::mem::take(&mut slot.profile.mod_data);

            let record = SlotRecord::new(slot.pending_name.clone());
            if let Err(e) = self.files.write_slot(index, &record) {
                warn!(slot = index, error = %e, "could not create save file");
                slot.profile.mod_data = previous;
                hooks.on_new_game_failed(&mut slot.profile);
                events.push(ScreenEvent::SaveFailed { slot: index });
                return;
            }
            slot.profile.exists = true;
            slot.profile.record = Some(record);
            hooks.after_new_game(&mut slot.profile);
        }

        info!(slot = index, new_game, "starting game");
        self.starting = Some((START_DELAY, new_game));
        events.push(ScreenEvent::Begin { slot: index });
    }

    fn rename(&mut self, events: &mut Vec<ScreenEvent>) {
        let index = self.slot_index;
        let slot = &mut self.slots[index];
        let next = NAMES
            .iter()
            .position(|n| *n == slot.name())
            .map_or(0, |p| (p + 1) % NAMES.len());
        slot.pending_name = NAMES[next].to_string();

        if let Some(record) = slot.profile.record.as_mut() {
            record.name = slot.pending_name.clone();
            if let Err(e) = self.files.write_slot(index, record) {
                warn!(slot = index, error = %e, "could not save renamed file");
                events.push(ScreenEvent::SaveFailed { slot: index });
            }
        }
        events.push(ScreenEvent::Renamed { slot: index });
    }

    fn delete_slot(&mut self, bank: &SpriteBank, hooks: &mut dyn SlotHooks, events: &mut Vec<ScreenEvent>) {
        let index = self.slot_index;
        if let Err(e) = self.files.delete_slot(index) {
            warn!(slot = index, error = %e, "could not delete save file");
            events.push(ScreenEvent::SaveFailed { slot: index });
            return;
        }
        let fresh = self.setup_slot(index, bank, hooks);
        self.slots[index] = fresh;
        self.slot_open = false;
        self.input_delay = INPUT_DELAY;
        info!(slot = index, "save file deleted");
        events.push(ScreenEvent::SlotDeleted { slot: index });
    }

    /// Hand every slot to the hooks after the screen's own update.
    fn update_extensions(&mut self, input: &MenuInput, bank: &SpriteBank, hooks: &mut dyn SlotHooks) {
        let tween_active = self.tween_active();
        for (i, slot) in self.slots.iter_mut().enumerate() {
            let frame = UpdateFrame {
                buttons: &slot.buttons,
                button_index: slot.button_index,
                slot_selected: self.slot_open && i == self.slot_index,
                screen_selected: self.selected,
                screen_focused: self.focused,
                starting_game: self.starting.is_some(),
                tween_active,
                input_delay: self.input_delay,
                deleting: slot.deleting,
                press: input.horizontal(),
            };
            hooks.after_slot_update(&mut slot.profile, bank, &frame);
        }
    }

    fn collect_feedback(&mut self, events: &mut Vec<ScreenEvent>) {
        for slot in &mut self.slots {
            events.extend(slot.profile.cues.drain(..).map(ScreenEvent::Cue));
            if std::mem::take(&mut slot.profile.wiggle) {
                self.wiggler.start();
            }
        }
    }

    // ── Accessors ──

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn slots(&self) -> &[FileSlot] {
        &self.slots
    }

    pub fn slot_index(&self) -> usize {
        self.slot_index
    }

    pub fn slot_open(&self) -> bool {
        self.slot_open
    }

    pub fn is_starting(&self) -> bool {
        self.starting.is_some()
    }

    #[cfg(test)]
    pub fn wiggle(&self) -> f32 {
        self.wiggler.value()
    }

    /// What the render hooks get to see of `slot`.
    pub fn render_frame<'a>(&self, slot: &'a FileSlot) -> RenderFrame<'a> {
        RenderFrame {
            origin: slot.origin,
            selected_ease: slot.selected_ease,
            buttons: &slot.buttons,
            button_index: slot.button_index,
            deleting: slot.deleting,
            wiggle: self.wiggler.value(),
            line_height: LINE_HEIGHT,
        }
    }
}
