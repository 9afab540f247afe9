/// Portrait hooks on the file-select screen.
///
/// The screen calls into `SlotHooks` at fixed points of its slot lifecycle:
/// catalog load, screen enter/leave, slot setup, button creation, the
/// per-frame update and render passes, and the new-game transition.
/// `PortraitShim` is the implementation that adds the portrait picker.
///
/// The screen's private layout state (button list, focus index, timers)
/// is handed over explicitly in `UpdateFrame` / `RenderFrame`.

use tracing::{debug, info, warn};

use crate::domain::catalog::{AssetBank, CatalogSource, PortraitCatalog};
use crate::domain::layout::{button_column_origin, ScreenPos, SlotButton};
use crate::domain::picker::{
    Direction, PickerContext, PortraitPicker, PortraitSlot, PreviewRules, SelectionStore, TextCanvas,
};
use crate::domain::portrait::SelectionState;
use crate::sim::registry::EligibleRegistry;

/// Wiggler value to horizontal displacement, in virtual pixels.
pub const WIGGLE_DISPLACEMENT: f32 = 8.0;

/// Slot state the update pass exposes to hooks.
pub struct UpdateFrame<'a> {
    pub buttons: &'a [SlotButton],
    pub button_index: usize,
    /// This slot is the open one.
    pub slot_selected: bool,
    /// The file-select screen is the active screen.
    pub screen_selected: bool,
    pub screen_focused: bool,
    pub starting_game: bool,
    pub tween_active: bool,
    pub input_delay: f32,
    pub deleting: bool,
    /// Left/Right pressed this frame.
    pub press: Option<Direction>,
}

impl UpdateFrame<'_> {
    /// The slot is idle and listening for menu input.
    pub fn accepts_input(&self) -> bool {
        self.slot_selected
            && self.screen_selected
            && self.screen_focused
            && !self.starting_game
            && !self.tween_active
            && self.input_delay <= 0.0
            && !self.deleting
    }
}

/// Slot state the render pass exposes to hooks.
pub struct RenderFrame<'a> {
    pub origin: ScreenPos,
    /// 0 = closed, 1 = fully open.
    pub selected_ease: f32,
    pub buttons: &'a [SlotButton],
    pub button_index: usize,
    pub deleting: bool,
    /// Current value of the screen's shared wiggler.
    pub wiggle: f32,
    pub line_height: f32,
}

/// Extension points of the file-select screen. Every hook defaults to
/// leaving the host's behaviour untouched.
pub trait SlotHooks {
    /// The screen's portrait bank finished loading.
    fn on_catalog_loaded(&mut self, _catalog: &dyn PortraitCatalog) {}

    fn on_screen_enter(&mut self, _bank: &mut dyn AssetBank) {}

    fn on_screen_leave(&mut self) {}

    /// Pick the sprite identity for a slot being set up.
    fn override_portrait(
        &mut self,
        _slot: &mut dyn PortraitSlot,
        _catalog: &dyn PortraitCatalog,
        placeholder: &str,
    ) -> String {
        placeholder.to_string()
    }

    /// Pick the animation for a slot being set up; runs after `override_portrait`.
    fn override_animation(
        &mut self,
        _slot: &mut dyn PortraitSlot,
        _catalog: &dyn PortraitCatalog,
        placeholder: &str,
    ) -> String {
        placeholder.to_string()
    }

    fn on_create_buttons(&mut self, _slot: &dyn PortraitSlot, _buttons: &mut Vec<SlotButton>) {}

    fn after_slot_update(
        &mut self,
        _slot: &mut dyn PortraitSlot,
        _catalog: &dyn PortraitCatalog,
        _frame: &UpdateFrame<'_>,
    ) {
    }

    /// An extension-owned button was confirmed. Returns whether it was handled.
    fn on_button_confirmed(
        &mut self,
        _slot: &mut dyn PortraitSlot,
        _catalog: &dyn PortraitCatalog,
        _button: &SlotButton,
    ) -> bool {
        false
    }

    fn after_slot_render(&self, _slot: &dyn PortraitSlot, _frame: &RenderFrame<'_>, _canvas: &mut dyn TextCanvas) {}

    fn before_new_game(&mut self, _slot: &dyn PortraitSlot) {}

    fn after_new_game(&mut self, _slot: &mut dyn PortraitSlot) {}

    /// The save for a new game could not be created. `after_new_game`
    /// will not follow.
    fn on_new_game_failed(&mut self, _slot: &mut dyn PortraitSlot) {}
}

/// A screen with no extensions.
#[cfg(test)]
impl SlotHooks for () {}

// ══════════════════════════════════════════════════════════════
// Portrait shim
// ══════════════════════════════════════════════════════════════

pub struct PortraitShim<S: SelectionStore> {
    registry: EligibleRegistry,
    preview: PreviewRules,
    store: S,
    /// Catalog restored whenever the screen is entered.
    canonical: CatalogSource,
    label: String,
    /// Picker of the slot whose buttons were built last.
    picker: Option<PortraitPicker>,
    /// Selection held across the host's new-game reset.
    carried: Option<SelectionState>,
}

impl<S: SelectionStore> PortraitShim<S> {
    pub fn new(
        registry: EligibleRegistry,
        preview: PreviewRules,
        store: S,
        canonical: CatalogSource,
        label: impl Into<String>,
    ) -> Self {
        PortraitShim {
            registry,
            preview,
            store,
            canonical,
            label: label.into(),
            picker: None,
            carried: None,
        }
    }

    pub fn registry(&self) -> &EligibleRegistry {
        &self.registry
    }

    #[cfg(test)]
    pub fn picker(&self) -> Option<&PortraitPicker> {
        self.picker.as_ref()
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    fn persist(&mut self, slot: &dyn PortraitSlot) {
        if let Err(e) = self.store.save_selection(slot.slot_id(), slot.selection()) {
            warn!(target: "portraits", slot = slot.slot_id(), error = %e, "could not save portrait choice");
        }
    }
}

impl<S: SelectionStore> SlotHooks for PortraitShim<S> {
    fn on_catalog_loaded(&mut self, catalog: &dyn PortraitCatalog) {
        self.registry.rebuild(catalog);
    }

    fn on_screen_enter(&mut self, bank: &mut dyn AssetBank) {
        // A content pack may have left its own catalog active.
        if let Err(e) = bank.reload(&self.canonical) {
            warn!(target: "portraits", error = %e, "canonical catalog unavailable, using built-in");
            if let Err(e) = bank.reload(&CatalogSource::Builtin) {
                warn!(target: "portraits", error = %e, "built-in catalog failed to load");
            }
        }
        info!(target: "portraits", source = %bank.source(), "file select entered");
        self.registry.rebuild(bank.catalog());
    }

    fn on_screen_leave(&mut self) {
        self.picker = None;
        self.carried = None;
    }

    fn override_portrait(
        &mut self,
        slot: &mut dyn PortraitSlot,
        catalog: &dyn PortraitCatalog,
        placeholder: &str,
    ) -> String {
        if !slot.exists() || slot.corrupted() {
            return placeholder.to_string();
        }

        match self.store.load_selection(slot.slot_id()) {
            Ok(state) => *slot.selection_mut() = state,
            Err(e) => warn!(target: "portraits", slot = slot.slot_id(), error = %e, "could not load portrait choice"),
        }

        let stored = &slot.selection().portrait;
        if catalog.has(stored) {
            stored.clone()
        } else {
            debug!(target: "portraits", slot = slot.slot_id(), portrait = %stored, "stored portrait missing, keeping placeholder");
            placeholder.to_string()
        }
    }

    fn override_animation(
        &mut self,
        slot: &mut dyn PortraitSlot,
        catalog: &dyn PortraitCatalog,
        placeholder: &str,
    ) -> String {
        if !slot.exists() || slot.corrupted() {
            return placeholder.to_string();
        }

        let state = slot.selection();
        if catalog.has(&state.portrait) && catalog.has_animation(&state.portrait, &state.animation) {
            state.animation.clone()
        } else {
            debug!(target: "portraits", slot = slot.slot_id(), animation = %state.animation, "stored animation missing, keeping placeholder");
            placeholder.to_string()
        }
    }

    fn on_create_buttons(&mut self, slot: &dyn PortraitSlot, buttons: &mut Vec<SlotButton>) {
        let picker = PortraitPicker::new(slot.slot_id(), &self.label, slot.selection(), self.registry.entries());
        buttons.push(picker.button());
        self.picker = Some(picker);
    }

    fn after_slot_update(
        &mut self,
        slot: &mut dyn PortraitSlot,
        catalog: &dyn PortraitCatalog,
        frame: &UpdateFrame<'_>,
    ) {
        if !frame.accepts_input() {
            return;
        }
        let Some(picker) = self.picker.as_mut().filter(|p| p.slot_id() == slot.slot_id()) else {
            return;
        };

        let focused = frame
            .buttons
            .get(frame.button_index)
            .map_or(false, PortraitPicker::is_button);

        let mut ctx = PickerContext {
            eligible: self.registry.entries(),
            catalog,
            preview: &self.preview,
            slot,
            store: &mut self.store,
        };
        picker.update(focused, frame.press, &mut ctx);
    }

    fn on_button_confirmed(
        &mut self,
        slot: &mut dyn PortraitSlot,
        catalog: &dyn PortraitCatalog,
        button: &SlotButton,
    ) -> bool {
        if !PortraitPicker::is_button(button) {
            return false;
        }
        let Some(picker) = self.picker.as_mut().filter(|p| p.slot_id() == slot.slot_id()) else {
            return false;
        };

        let mut ctx = PickerContext {
            eligible: self.registry.entries(),
            catalog,
            preview: &self.preview,
            slot,
            store: &mut self.store,
        };
        picker.advance(Direction::Right, &mut ctx);
        true
    }

    fn after_slot_render(&self, slot: &dyn PortraitSlot, frame: &RenderFrame<'_>, canvas: &mut dyn TextCanvas) {
        if frame.selected_ease <= 0.0 {
            return;
        }
        let Some(picker) = self.picker.as_ref().filter(|p| p.slot_id() == slot.slot_id()) else {
            return;
        };

        let mut position = button_column_origin(frame.origin, frame.selected_ease);
        for (i, button) in frame.buttons.iter().enumerate() {
            if PortraitPicker::is_button(button) {
                let focused = frame.button_index == i && !frame.deleting;
                picker.draw(canvas, position, focused, frame.wiggle * WIGGLE_DISPLACEMENT);
                break;
            }
            position.y += button.row_height(frame.line_height);
        }
    }

    fn before_new_game(&mut self, slot: &dyn PortraitSlot) {
        self.carried = Some(slot.selection().clone());
    }

    fn after_new_game(&mut self, slot: &mut dyn PortraitSlot) {
        let Some(carried) = self.carried.take() else {
            return;
        };
        *slot.selection_mut() = carried;
        if slot.exists() {
            self.persist(slot);
        }
    }

    fn on_new_game_failed(&mut self, slot: &mut dyn PortraitSlot) {
        if let Some(carried) = self.carried.take() {
            *slot.selection_mut() = carried;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::eligibility::EligibilityRules;
    use crate::domain::layout::{ButtonOwner, LINE_HEIGHT};
    use crate::domain::portrait::{EligibleEntry, PLACEHOLDER_ANIMATION, PLACEHOLDER_PORTRAIT};
    use crate::sim::sprite_bank::SpriteBank;
    use crate::testutil::{FakeCatalog, FakeSlot, FakeStore, RecordingCanvas};

    fn catalog() -> FakeCatalog {
        FakeCatalog::new()
            .with("portrait_madeline", &[("idle_normal", 160, 160)])
            .with("theo", &[("idle_upset", 160, 160), ("talk_upset", 160, 160)])
            .with("granny", &[("idle_default", 160, 160)])
    }

    fn shim_with(store: FakeStore) -> PortraitShim<FakeStore> {
        let mut shim = PortraitShim::new(
            EligibleRegistry::new(EligibilityRules::default()),
            PreviewRules::default(),
            store,
            CatalogSource::Builtin,
            "Change Portrait",
        );
        shim.on_catalog_loaded(&catalog());
        shim
    }

    fn host_buttons() -> Vec<SlotButton> {
        vec![
            SlotButton::new("Begin", 1.0, ButtonOwner::Begin),
            SlotButton::new("Rename", 0.5, ButtonOwner::Rename),
        ]
    }

    fn idle_frame<'a>(buttons: &'a [SlotButton], index: usize, press: Option<Direction>) -> UpdateFrame<'a> {
        UpdateFrame {
            buttons,
            button_index: index,
            slot_selected: true,
            screen_selected: true,
            screen_focused: true,
            starting_game: false,
            tween_active: false,
            input_delay: 0.0,
            deleting: false,
            press,
        }
    }

    /// Set up slot, build its buttons, and return the button list.
    fn open_slot(shim: &mut PortraitShim<FakeStore>, slot: &mut FakeSlot) -> Vec<SlotButton> {
        let cat = catalog();
        shim.override_portrait(slot, &cat, PLACEHOLDER_PORTRAIT);
        shim.override_animation(slot, &cat, PLACEHOLDER_ANIMATION);
        let mut buttons = host_buttons();
        shim.on_create_buttons(slot, &mut buttons);
        buttons
    }

    // ── Setup substitution ──

    #[test]
    fn setup_substitutes_stored_pair_when_present() {
        let mut shim = shim_with(FakeStore::with_stored(0, SelectionState::new("theo", "idle_upset")));
        let mut slot = FakeSlot::new(0, true);
        let cat = catalog();
        assert_eq!(shim.override_portrait(&mut slot, &cat, PLACEHOLDER_PORTRAIT), "theo");
        assert_eq!(shim.override_animation(&mut slot, &cat, PLACEHOLDER_ANIMATION), "idle_upset");
        assert_eq!(slot.selection, SelectionState::new("theo", "idle_upset"));
    }

    #[test]
    fn setup_keeps_placeholder_for_missing_portrait() {
        let mut shim = shim_with(FakeStore::with_stored(0, SelectionState::new("uninstalled", "idle_normal")));
        let mut slot = FakeSlot::new(0, true);
        let cat = catalog();
        assert_eq!(shim.override_portrait(&mut slot, &cat, PLACEHOLDER_PORTRAIT), PLACEHOLDER_PORTRAIT);
        assert_eq!(shim.override_animation(&mut slot, &cat, PLACEHOLDER_ANIMATION), PLACEHOLDER_ANIMATION);
    }

    #[test]
    fn setup_keeps_placeholder_animation_when_variant_missing() {
        let mut shim = shim_with(FakeStore::with_stored(0, SelectionState::new("theo", "idle_gone")));
        let mut slot = FakeSlot::new(0, true);
        let cat = catalog();
        assert_eq!(shim.override_portrait(&mut slot, &cat, PLACEHOLDER_PORTRAIT), "theo");
        assert_eq!(shim.override_animation(&mut slot, &cat, PLACEHOLDER_ANIMATION), PLACEHOLDER_ANIMATION);
    }

    #[test]
    fn setup_ignores_new_and_corrupted_slots() {
        let stored = SelectionState::new("theo", "idle_upset");
        let cat = catalog();

        let mut shim = shim_with(FakeStore::with_stored(0, stored.clone()));
        let mut fresh = FakeSlot::new(0, false);
        assert_eq!(shim.override_portrait(&mut fresh, &cat, PLACEHOLDER_PORTRAIT), PLACEHOLDER_PORTRAIT);
        assert_eq!(shim.override_animation(&mut fresh, &cat, PLACEHOLDER_ANIMATION), PLACEHOLDER_ANIMATION);

        let mut broken = FakeSlot::new(0, true);
        broken.corrupted = true;
        assert_eq!(shim.override_portrait(&mut broken, &cat, PLACEHOLDER_PORTRAIT), PLACEHOLDER_PORTRAIT);
        assert!(shim.store().loads.is_empty());
    }

    // ── Button registration ──

    #[test]
    fn create_buttons_appends_picker_at_stored_index() {
        let mut shim = shim_with(FakeStore::with_stored(0, SelectionState::new("granny", "idle_default")));
        let mut slot = FakeSlot::new(0, true);
        let buttons = open_slot(&mut shim, &mut slot);
        assert_eq!(buttons.len(), 3);
        assert!(PortraitPicker::is_button(&buttons[2]));
        assert_eq!(shim.picker().map(|p| p.current_index()), Some(2));
    }

    #[test]
    fn create_buttons_with_stale_choice_starts_at_zero() {
        let mut shim = shim_with(FakeStore::with_stored(0, SelectionState::new("gone", "idle_gone")));
        let mut slot = FakeSlot::new(0, true);
        open_slot(&mut shim, &mut slot);
        assert_eq!(shim.picker().map(|p| p.current_index()), Some(0));
    }

    // ── Update forwarding ──

    #[test]
    fn update_forwards_press_when_picker_focused() {
        let mut shim = shim_with(FakeStore::default());
        let mut slot = FakeSlot::new(0, true);
        let buttons = open_slot(&mut shim, &mut slot);
        shim.after_slot_update(&mut slot, &catalog(), &idle_frame(&buttons, 2, Some(Direction::Right)));
        assert_eq!(shim.picker().map(|p| p.current_index()), Some(1));
        assert_eq!(slot.selection, SelectionState::new("theo", "idle_upset"));
        assert_eq!(shim.store().writes.len(), 1);
    }

    #[test]
    fn update_ignores_press_on_other_buttons() {
        let mut shim = shim_with(FakeStore::default());
        let mut slot = FakeSlot::new(0, true);
        let buttons = open_slot(&mut shim, &mut slot);
        shim.after_slot_update(&mut slot, &catalog(), &idle_frame(&buttons, 0, Some(Direction::Right)));
        assert_eq!(shim.picker().map(|p| p.current_index()), Some(0));
        assert!(shim.store().writes.is_empty());
    }

    #[test]
    fn update_is_blocked_by_every_gate() {
        for gate in 0..7 {
            let mut shim = shim_with(FakeStore::default());
            let mut slot = FakeSlot::new(0, true);
            let buttons = open_slot(&mut shim, &mut slot);
            let mut frame = idle_frame(&buttons, 2, Some(Direction::Right));
            match gate {
                0 => frame.slot_selected = false,
                1 => frame.screen_selected = false,
                2 => frame.screen_focused = false,
                3 => frame.starting_game = true,
                4 => frame.tween_active = true,
                5 => frame.input_delay = 0.05,
                _ => frame.deleting = true,
            }
            shim.after_slot_update(&mut slot, &catalog(), &frame);
            assert_eq!(shim.picker().map(|p| p.current_index()), Some(0));
        }
    }

    #[test]
    fn update_ignores_other_slots() {
        let mut shim = shim_with(FakeStore::default());
        let mut slot0 = FakeSlot::new(0, true);
        let buttons = open_slot(&mut shim, &mut slot0);
        let mut slot1 = FakeSlot::new(1, true);
        shim.after_slot_update(&mut slot1, &catalog(), &idle_frame(&buttons, 2, Some(Direction::Right)));
        assert_eq!(shim.picker().map(|p| p.current_index()), Some(0));
    }

    #[test]
    fn moving_focus_away_clears_direction() {
        let mut shim = shim_with(FakeStore::default());
        let mut slot = FakeSlot::new(0, false);
        let buttons = open_slot(&mut shim, &mut slot);
        shim.after_slot_update(&mut slot, &catalog(), &idle_frame(&buttons, 2, Some(Direction::Left)));
        assert_eq!(shim.picker().map(|p| p.last_direction()), Some(-1));
        shim.after_slot_update(&mut slot, &catalog(), &idle_frame(&buttons, 1, None));
        assert_eq!(shim.picker().map(|p| p.last_direction()), Some(0));
    }

    #[test]
    fn confirm_on_picker_cycles_forward() {
        let mut shim = shim_with(FakeStore::default());
        let mut slot = FakeSlot::new(0, false);
        let buttons = open_slot(&mut shim, &mut slot);
        assert!(shim.on_button_confirmed(&mut slot, &catalog(), &buttons[2]));
        assert_eq!(shim.picker().map(|p| p.current_index()), Some(1));
        assert!(!shim.on_button_confirmed(&mut slot, &catalog(), &buttons[0]));
    }

    #[test]
    fn empty_registry_makes_picker_inert() {
        let mut shim = shim_with(FakeStore::default());
        shim.on_catalog_loaded(&FakeCatalog::new());
        let mut slot = FakeSlot::new(0, true);
        let buttons = open_slot(&mut shim, &mut slot);
        shim.after_slot_update(&mut slot, &catalog(), &idle_frame(&buttons, 2, Some(Direction::Left)));
        assert_eq!(slot.selection, SelectionState::default());
        assert!(shim.store().writes.is_empty());
    }

    // ── Render ──

    #[test]
    fn render_draws_arrows_at_accumulated_row() {
        let mut shim = shim_with(FakeStore::default());
        let mut slot = FakeSlot::new(0, true);
        let buttons = open_slot(&mut shim, &mut slot);
        let frame = RenderFrame {
            origin: ScreenPos::new(960.0, 540.0),
            selected_ease: 1.0,
            buttons: &buttons,
            button_index: 2,
            deleting: false,
            wiggle: 0.5,
            line_height: LINE_HEIGHT,
        };
        let mut canvas = RecordingCanvas::default();
        shim.after_slot_render(&slot, &frame, &mut canvas);

        assert_eq!(canvas.calls.len(), 2);
        let expected_y = 540.0 - 150.0 + 350.0 + (64.0 + 15.0) + (32.0 + 15.0);
        let off = shim.picker().map(|p| p.arrow_offset().x).unwrap();
        assert!((canvas.calls[0].1.y - expected_y).abs() < 1e-3);
        // focused, no direction yet: both arrows take the wiggle
        assert!((canvas.calls[0].1.x - (960.0 + 4.0 - off)).abs() < 1e-3);
        assert!((canvas.calls[1].1.x - (960.0 + 4.0 + off)).abs() < 1e-3);
        assert!(canvas.calls[0].2);
    }

    #[test]
    fn render_unfocused_while_deleting_and_hidden_when_closed() {
        let mut shim = shim_with(FakeStore::default());
        let mut slot = FakeSlot::new(0, true);
        let buttons = open_slot(&mut shim, &mut slot);
        let mut frame = RenderFrame {
            origin: ScreenPos::ZERO,
            selected_ease: 1.0,
            buttons: &buttons,
            button_index: 2,
            deleting: true,
            wiggle: 1.0,
            line_height: LINE_HEIGHT,
        };
        let mut canvas = RecordingCanvas::default();
        shim.after_slot_render(&slot, &frame, &mut canvas);
        assert!(canvas.calls.iter().all(|c| !c.2));

        frame.selected_ease = 0.0;
        let mut canvas = RecordingCanvas::default();
        shim.after_slot_render(&slot, &frame, &mut canvas);
        assert!(canvas.calls.is_empty());
    }

    // ── New game / screen lifecycle ──

    #[test]
    fn new_game_keeps_choice_made_during_creation() {
        let mut shim = shim_with(FakeStore::default());
        let mut slot = FakeSlot::new(0, false);
        slot.selection = SelectionState::new("theo", "idle_upset");

        shim.before_new_game(&slot);
        // host wipes extension state for the fresh file
        slot.selection = SelectionState::default();
        slot.exists = true;
        shim.after_new_game(&mut slot);

        assert_eq!(slot.selection, SelectionState::new("theo", "idle_upset"));
        assert_eq!(shim.store().writes, vec![(0, SelectionState::new("theo", "idle_upset"))]);
    }

    #[test]
    fn failed_new_game_restores_choice_and_forgets_capture() {
        let mut shim = shim_with(FakeStore::default());
        let mut slot = FakeSlot::new(0, false);
        slot.selection = SelectionState::new("theo", "idle_upset");

        shim.before_new_game(&slot);
        slot.selection = SelectionState::default();
        shim.on_new_game_failed(&mut slot);
        assert_eq!(slot.selection, SelectionState::new("theo", "idle_upset"));
        assert!(shim.store().writes.is_empty());

        // nothing stale is carried into a later, unrelated new game
        let mut other = FakeSlot::new(1, true);
        shim.after_new_game(&mut other);
        assert_eq!(other.selection, SelectionState::default());
        assert!(shim.store().writes.is_empty());
    }

    #[test]
    fn after_new_game_without_capture_changes_nothing() {
        let mut shim = shim_with(FakeStore::default());
        let mut slot = FakeSlot::new(0, true);
        shim.after_new_game(&mut slot);
        assert_eq!(slot.selection, SelectionState::default());
        assert!(shim.store().writes.is_empty());
    }

    #[test]
    fn leaving_drops_the_picker() {
        let mut shim = shim_with(FakeStore::default());
        let mut slot = FakeSlot::new(0, true);
        open_slot(&mut shim, &mut slot);
        assert!(shim.picker().is_some());
        shim.on_screen_leave();
        assert!(shim.picker().is_none());
    }

    #[test]
    fn entering_restores_canonical_catalog_and_rescans() {
        let mut shim = shim_with(FakeStore::default());
        let mut bank = SpriteBank::from_toml_str(
            "[[portrait]]\nid = \"modded\"\n[[portrait.animation]]\nname = \"idle_x\"\n[[portrait.animation.frame]]\nwidth = 1\nheight = 1\n",
            std::path::Path::new("mods/Portraits.toml"),
        )
        .unwrap();
        shim.on_catalog_loaded(&bank);
        assert_eq!(shim.registry().entries(), &[EligibleEntry::new("modded", "idle_x")]);

        shim.on_screen_enter(&mut bank);
        assert_eq!(bank.source(), &CatalogSource::Builtin);
        assert!(!bank.has("modded"));
        assert!(shim
            .registry()
            .entries()
            .contains(&EligibleEntry::new("portrait_madeline", "idle_normal")));
    }

    #[test]
    fn entering_with_missing_canonical_file_falls_back_to_builtin() {
        let mut shim = PortraitShim::new(
            EligibleRegistry::new(EligibilityRules::default()),
            PreviewRules::default(),
            FakeStore::default(),
            CatalogSource::File("/no/such/Portraits.toml".into()),
            "Change Portrait",
        );
        let mut bank = SpriteBank::from_toml_str("", std::path::Path::new("empty.toml")).unwrap();
        shim.on_screen_enter(&mut bank);
        assert_eq!(bank.source(), &CatalogSource::Builtin);
        assert!(!shim.registry().entries().is_empty());
    }

    #[test]
    fn unit_hooks_leave_placeholders() {
        let mut hooks = ();
        let mut slot = FakeSlot::new(0, true);
        let cat = catalog();
        assert_eq!(hooks.override_portrait(&mut slot, &cat, "p"), "p");
        assert_eq!(hooks.override_animation(&mut slot, &cat, "a"), "a");
    }
}
