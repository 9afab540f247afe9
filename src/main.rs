/// Entry point and menu loop.

mod config;
mod domain;
mod error;
mod sim;
mod ui;

#[cfg(test)]
mod testutil;

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::AppConfig;
use domain::catalog::{AssetBank, CatalogSource};
use domain::picker::UiCue;
use sim::event::ScreenEvent;
use sim::registry::EligibleRegistry;
use sim::save::{save_dir, SlotFiles};
use sim::shim::{PortraitShim, SlotHooks};
use sim::sprite_bank::SpriteBank;
use ui::file_select::{FileSelectScreen, MenuInput};
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::{Renderer, Scene};
use ui::sound::{MenuSound, SoundEngine};

const FRAME_SLEEP: Duration = Duration::from_millis(16);
/// Frames longer than this (e.g. after a stall) are clamped.
const MAX_DT: f32 = 0.1;
/// Seconds a title-screen message stays up.
const MESSAGE_TIME: f32 = 3.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Title,
    FileSelect,
    Playing { slot: usize, new_game: bool },
}

struct App {
    config: AppConfig,
    bank: SpriteBank,
    shim: PortraitShim<SlotFiles>,
    screen: FileSelectScreen,
    phase: Phase,
    message: String,
    message_timer: f32,
}

fn main() -> Result<()> {
    let (config, config_problem) = AppConfig::load();
    init_tracing(&config.log_file);
    if let Some(e) = config_problem {
        warn!(error = %e, "config.toml ignored, using default settings");
    }

    let mut app = App::new(config);
    let mut renderer = Renderer::new();
    renderer.init().context("terminal init failed")?;

    let sound = SoundEngine::new();
    let result = menu_loop(&mut app, &mut renderer, sound.as_ref());
    let cleanup = renderer.cleanup().context("terminal cleanup failed");

    result?;
    cleanup?;
    println!();
    println!("See you next time!");
    Ok(())
}

/// The terminal belongs to the renderer, so logs go to a file.
fn init_tracing(log_file: &Path) {
    let file = match OpenOptions::new().create(true).append(true).open(log_file) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("logging disabled, cannot open {}: {e}", log_file.display());
            return;
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

impl App {
    fn new(config: AppConfig) -> Self {
        let portraits = &config.portraits;
        let bank = SpriteBank::open(&portraits.catalog).unwrap_or_else(|e| {
            warn!(error = %e, "canonical catalog unavailable, using built-in portraits");
            SpriteBank::builtin()
        });

        let dir = save_dir(config.save_dir.as_deref());
        info!(dir = %dir.display(), "save directory");

        let mut shim = PortraitShim::new(
            EligibleRegistry::new(portraits.rules.clone()),
            portraits.preview.clone(),
            SlotFiles::new(&dir),
            portraits.catalog.clone(),
            portraits.label.clone(),
        );
        shim.on_catalog_loaded(&bank);

        let screen = FileSelectScreen::new(SlotFiles::new(&dir), portraits.preview.clone());
        App {
            config,
            bank,
            shim,
            screen,
            phase: Phase::Title,
            message: String::new(),
            message_timer: 0.0,
        }
    }

    fn set_message(&mut self, msg: impl Into<String>) {
        self.message = msg.into();
        self.message_timer = MESSAGE_TIME;
    }

    fn open_file_select(&mut self) {
        self.screen.enter(&mut self.bank, &mut self.shim);
        self.phase = Phase::FileSelect;
    }

    /// F2 on the title: swap in the content-pack catalog.
    fn load_override_catalog(&mut self) {
        let Some(path) = self.config.portraits.override_catalog.clone() else {
            self.set_message("No override_catalog set in config.toml");
            return;
        };
        match self.bank.reload(&CatalogSource::File(path)) {
            Ok(()) => {
                self.shim.on_catalog_loaded(&self.bank);
                let count = self.shim.registry().entries().len();
                self.set_message(format!("Loaded {} ({count} selectable portraits)", self.bank.source()));
            }
            Err(e) => {
                warn!(error = %e, "override catalog failed to load");
                self.set_message(format!("Catalog load failed: {e}"));
            }
        }
    }

    fn scene(&self) -> Scene<'_> {
        match self.phase {
            Phase::Title => Scene::Title {
                message: &self.message,
                source: self.bank.source(),
                eligible: self.shim.registry().entries().len(),
            },
            Phase::FileSelect => Scene::FileSelect {
                screen: &self.screen,
                bank: &self.bank,
                hooks: &self.shim,
            },
            Phase::Playing { slot, new_game } => match self.screen.slots().get(slot) {
                Some(slot) => Scene::Playing { slot, bank: &self.bank, new_game },
                None => Scene::FileSelect {
                    screen: &self.screen,
                    bank: &self.bank,
                    hooks: &self.shim,
                },
            },
        }
    }
}

fn menu_loop(app: &mut App, renderer: &mut Renderer, sound: Option<&SoundEngine>) -> Result<()> {
    let mut kb = InputState::new();
    kb.honor_release = renderer.reports_key_release();
    let mut gp = GamepadState::new();
    gp.load_button_config(&app.config.gamepad);
    let mut last_frame = Instant::now();

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            break;
        }
        if let Some(focused) = kb.focus_change() {
            app.screen.set_focused(focused);
        }

        let dt = last_frame.elapsed().as_secs_f32().min(MAX_DT);
        last_frame = Instant::now();

        if app.message_timer > 0.0 {
            app.message_timer -= dt;
            if app.message_timer <= 0.0 {
                app.message.clear();
            }
        }

        let input = menu_input(&kb, &gp);
        match app.phase {
            Phase::Title => {
                if kb.any_pressed(KEYS_QUIT) {
                    break;
                }
                if kb.any_pressed(&[KeyCode::F(2)]) {
                    app.load_override_catalog();
                } else if input.confirm {
                    if let Some(sfx) = sound {
                        sfx.play(MenuSound::Confirm);
                    }
                    app.open_file_select();
                }
            }
            Phase::FileSelect => {
                let events = app.screen.update(dt, &input, &app.bank, &mut app.shim);
                process_sound_events(sound, &events);
                for event in &events {
                    match *event {
                        ScreenEvent::Left => {
                            app.screen.leave(&mut app.shim);
                            app.phase = Phase::Title;
                        }
                        ScreenEvent::GameStarted { slot, new_game } => {
                            app.screen.leave(&mut app.shim);
                            app.phase = Phase::Playing { slot, new_game };
                        }
                        _ => {}
                    }
                }
            }
            Phase::Playing { .. } => {
                if input.cancel {
                    if let Some(sfx) = sound {
                        sfx.play(MenuSound::Back);
                    }
                    app.open_file_select();
                }
            }
        }

        renderer.render(&app.scene()).context("render failed")?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[ScreenEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for event in events {
        let cue = match event {
            ScreenEvent::Cue(UiCue::ToggleOn) => MenuSound::ToggleOn,
            ScreenEvent::Cue(UiCue::ToggleOff) => MenuSound::ToggleOff,
            ScreenEvent::SlotMoved | ScreenEvent::ButtonMoved => MenuSound::Move,
            ScreenEvent::SlotOpened { .. } | ScreenEvent::Renamed { .. } | ScreenEvent::DeleteAsked { .. } => {
                MenuSound::Confirm
            }
            ScreenEvent::SlotClosed { .. } | ScreenEvent::Left => MenuSound::Back,
            ScreenEvent::SlotDeleted { .. } => MenuSound::Delete,
            ScreenEvent::Begin { .. } => MenuSound::Begin,
            _ => continue,
        };
        sfx.play(cue);
    }
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter, KeyCode::Char(' '), KeyCode::Char('z'), KeyCode::Char('Z')];
const KEYS_CANCEL: &[KeyCode] = &[KeyCode::Esc, KeyCode::Backspace, KeyCode::Char('x'), KeyCode::Char('X')];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q'), KeyCode::Esc];

fn menu_input(kb: &InputState, gp: &GamepadState) -> MenuInput {
    MenuInput {
        up: kb.any_pressed(KEYS_UP) || gp.up_pressed(),
        down: kb.any_pressed(KEYS_DOWN) || gp.down_pressed(),
        left: kb.any_pressed(KEYS_LEFT) || gp.left_pressed(),
        right: kb.any_pressed(KEYS_RIGHT) || gp.right_pressed(),
        confirm: kb.any_pressed(KEYS_CONFIRM) || gp.confirm_pressed(),
        cancel: kb.any_pressed(KEYS_CANCEL) || gp.cancel_pressed(),
    }
}
