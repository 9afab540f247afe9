/// Diff-based terminal renderer.
///
/// Each frame is composed into `next`, compared cell by cell with `shown`
/// (what the terminal already has), and only the changed cells are queued
/// and flushed in one write. The buffers then swap.
///
/// Screens lay themselves out on the 1920x1080 virtual canvas; `CellCanvas`
/// maps those coordinates onto whatever terminal size we have.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{
        DisableFocusChange, EnableFocusChange, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::catalog::CatalogSource;
use crate::domain::layout::{button_column_origin, button_position, ScreenPos, CANVAS_H, CANVAS_W, LINE_HEIGHT};
use crate::domain::picker::{PortraitSlot, TextCanvas};
use crate::sim::shim::SlotHooks;
use crate::sim::sprite_bank::SpriteBank;
use crate::ui::file_select::{FileSelectScreen, FileSlot};

// ── Cells ──

/// One terminal cell. `bg` is always an explicit colour; `Color::Reset`
/// is folded into `BASE_BG` on the way in.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Background for every otherwise empty cell. Some terminals paint the
    /// gaps between rows with the colour of the last Clear, so Clear uses
    /// this too.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Never produced by drawing, so a back buffer full of these repaints everything.
    const INVALID: Cell = Cell { ch: '\u{0}', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = if bg == Color::Reset { Self::BASE_BG } else { bg };
        Cell { ch, fg, bg }
    }
}

/// Row-major grid of cells. Writes outside the grid are dropped.
struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(width: usize, height: usize) -> Self {
        FrameBuffer { width, height, cells: vec![Cell::BLANK; width * height] }
    }

    fn resize(&mut self, width: usize, height: usize) {
        if (self.width, self.height) != (width, height) {
            *self = FrameBuffer::new(width, height);
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        let (x, y) = (usize::try_from(x).ok()?, usize::try_from(y).ok()?);
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    #[cfg(test)]
    fn get(&self, x: usize, y: usize) -> Cell {
        match self.index(x as i64, y as i64) {
            Some(i) => self.cells[i],
            None => Cell::BLANK,
        }
    }

    /// One char per column starting at (x, y); `x` may be negative.
    fn put_str(&mut self, x: i64, y: i64, s: &str, fg: Color, bg: Color) {
        for (ch, cx) in s.chars().zip(x..) {
            if let Some(i) = self.index(cx, y) {
                self.cells[i] = Cell::new(ch, fg, bg);
            }
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        let blank = " ".repeat(self.width);
        self.put_str(0, y as i64, &blank, Color::Black, bg);
    }
}

// ── Virtual canvas → terminal cells ──

const HI: Color = Color::Rgb { r: 80, g: 255, b: 80 };
const GOLD: Color = Color::Rgb { r: 255, g: 200, b: 50 };
const DIM: Color = Color::DarkGrey;
const OUTLINE_BG: Color = Color::Rgb { r: 50, g: 50, b: 80 };

/// Where `len` chars justified by `justify_x` around `pos` start, in cells.
fn virtual_to_cell(pos: ScreenPos, justify_x: f32, len: usize, term_w: usize, term_h: usize) -> (i64, i64) {
    let col = pos.x / CANVAS_W * term_w as f32 - len as f32 * justify_x;
    let row = pos.y / CANVAS_H * term_h as f32;
    (col.round() as i64, row.floor() as i64)
}

/// `TextCanvas` over a frame buffer. Text is one cell per char whatever
/// the scale; the outline becomes a background tint.
struct CellCanvas<'a> {
    buf: &'a mut FrameBuffer,
}

impl CellCanvas<'_> {
    fn at(&self, pos: ScreenPos, justify_x: f32, len: usize) -> (i64, i64) {
        virtual_to_cell(pos, justify_x, len, self.buf.width, self.buf.height)
    }

    fn text(&mut self, text: &str, pos: ScreenPos, justify_x: f32, fg: Color, bg: Color) {
        let (x, y) = self.at(pos, justify_x, text.chars().count());
        self.buf.put_str(x, y, text, fg, bg);
    }

    /// Art block centred on `pos.x`, top row at `pos.y`.
    fn art(&mut self, lines: &[String], pos: ScreenPos, fg: Color) {
        let (_, top) = self.at(pos, 0.0, 0);
        for (i, line) in lines.iter().enumerate() {
            let (x, _) = self.at(pos, 0.5, line.chars().count());
            self.buf.put_str(x, top + i as i64, line, fg, Color::Reset);
        }
    }
}

impl TextCanvas for CellCanvas<'_> {
    fn draw_text_outline(&mut self, text: &str, pos: ScreenPos, justify_x: f32, _scale: f32, highlighted: bool) {
        let fg = if highlighted { GOLD } else { Color::White };
        self.text(text, pos, justify_x, fg, OUTLINE_BG);
    }
}

// ── Renderer ──

/// What to draw this frame.
pub enum Scene<'a> {
    Title {
        message: &'a str,
        source: &'a CatalogSource,
        eligible: usize,
    },
    FileSelect {
        screen: &'a FileSelectScreen,
        bank: &'a SpriteBank,
        hooks: &'a dyn SlotHooks,
    },
    Playing {
        slot: &'a FileSlot,
        bank: &'a SpriteBank,
        new_game: bool,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum SceneKind {
    Title,
    FileSelect,
    Playing,
}

impl Scene<'_> {
    fn kind(&self) -> SceneKind {
        match self {
            Scene::Title { .. } => SceneKind::Title,
            Scene::FileSelect { .. } => SceneKind::FileSelect,
            Scene::Playing { .. } => SceneKind::Playing,
        }
    }
}

/// Top of the portrait art inside a slot card, relative to the slot origin.
const ART_TOP: f32 = -300.0;
/// Name and stats lines below the art.
const NAME_DY: f32 = -80.0;
const STATS_DY: f32 = -30.0;

pub struct Renderer {
    out: BufWriter<io::Stdout>,
    /// Frame being composed.
    next: FrameBuffer,
    /// What the terminal currently shows.
    shown: FrameBuffer,
    last_scene: Option<SceneKind>,
    /// Keyboard enhancement was pushed, so key Release events arrive.
    key_release: bool,
}

fn terminal_size() -> (usize, usize) {
    let (w, h) = terminal::size().unwrap_or((80, 24));
    (w as usize, h as usize)
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            out: BufWriter::with_capacity(16 * 1024, io::stdout()),
            next: FrameBuffer::new(0, 0),
            shown: FrameBuffer::new(0, 0),
            last_scene: None,
            key_release: false,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(self.out, terminal::EnterAlternateScreen, EnableFocusChange, cursor::Hide)?;
        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(self.out, PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES))?;
            self.key_release = true;
        }
        self.sync_size();
        self.invalidate()
    }

    pub fn reports_key_release(&self) -> bool {
        self.key_release
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.key_release {
            execute!(self.out, PopKeyboardEnhancementFlags)?;
        }
        execute!(self.out, ResetColor, DisableFocusChange, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    /// Returns whether the terminal size changed.
    fn sync_size(&mut self) -> bool {
        let (w, h) = terminal_size();
        if (w, h) == (self.next.width, self.next.height) {
            return false;
        }
        self.next.resize(w, h);
        self.shown.resize(w, h);
        true
    }

    /// Clear the screen and force every cell to be written next flush.
    fn invalidate(&mut self) -> io::Result<()> {
        self.shown.cells.fill(Cell::INVALID);
        queue!(self.out, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))
    }

    pub fn render(&mut self, scene: &Scene<'_>) -> io::Result<()> {
        let resized = self.sync_size();
        let kind = scene.kind();
        if resized || self.last_scene != Some(kind) {
            self.invalidate()?;
            self.last_scene = Some(kind);
        }

        self.next.clear();
        match scene {
            Scene::Title { message, source, eligible } => compose_title(&mut self.next, message, source, *eligible),
            Scene::FileSelect { screen, bank, hooks } => compose_file_select(&mut self.next, screen, bank, *hooks),
            Scene::Playing { slot, bank, new_game } => compose_playing(&mut self.next, slot, bank, *new_game),
        }

        self.flush_changes()?;
        std::mem::swap(&mut self.next, &mut self.shown);
        Ok(())
    }

    /// Write the cells of `next` that differ from `shown`. Cursor moves are
    /// only emitted when a run of changed cells breaks, colours only when
    /// they change.
    fn flush_changes(&mut self) -> io::Result<()> {
        let (mut fg, mut bg) = (Color::White, Cell::BASE_BG);
        queue!(self.out, SetForegroundColor(fg), SetBackgroundColor(bg))?;

        let width = self.next.width;
        let mut cursor_at: Option<usize> = None;
        for (i, (cell, old)) in self.next.cells.iter().zip(&self.shown.cells).enumerate() {
            if cell == old {
                continue;
            }
            if cursor_at != Some(i) || i % width == 0 {
                queue!(self.out, MoveTo((i % width) as u16, (i / width) as u16))?;
            }
            if cell.fg != fg {
                fg = cell.fg;
                queue!(self.out, SetForegroundColor(fg))?;
            }
            if cell.bg != bg {
                bg = cell.bg;
                queue!(self.out, SetBackgroundColor(bg))?;
            }
            queue!(self.out, Print(cell.ch))?;
            cursor_at = Some(i + 1);
        }

        self.out.flush()
    }
}

// ── Compose ──

fn compose_title(buf: &mut FrameBuffer, message: &str, source: &CatalogSource, eligible: usize) {
    let inner = "   S L O T   P O R T R A I T S   ";
    let bar = "═".repeat(inner.chars().count());
    let banner = [format!("╔{bar}╗"), format!("║{inner}║"), format!("╚{bar}╝")];
    for (line, row) in banner.iter().zip(2..) {
        buf.put_str(4, row, line, GOLD, Color::Reset);
    }

    let menu_base: i64 = 7;
    buf.put_str(8, menu_base, "ENTER   Select File", HI, Color::Reset);
    buf.put_str(8, menu_base + 1, "  F2    Load Mod Portraits", Color::Rgb { r: 100, g: 200, b: 255 }, Color::Reset);
    buf.put_str(8, menu_base + 2, "  Q     Quit", Color::White, Color::Reset);

    let info = format!("Portraits: {source}  ({eligible} selectable)");
    buf.put_str(8, menu_base + 4, &info, DIM, Color::Reset);

    let help = [
        "Controls",
        "  ←→↑↓ / WASD   Move          ENTER/Z  Confirm",
        "  ESC/X          Back          Ctrl+C   Quit",
        "  ←→ on \"Change Portrait\" cycles the slot's portrait",
    ];
    let help_base = menu_base + 6;
    for (i, line) in help.iter().enumerate() {
        let color = if i == 0 { GOLD } else { Color::White };
        buf.put_str(8, help_base + i as i64, line, color, Color::Reset);
    }

    // Message bar (catalog reloads, etc.)
    if !message.is_empty() {
        let msg_row = buf.height.saturating_sub(1);
        if msg_row as i64 > help_base + help.len() as i64 {
            let bar_bg = Color::Rgb { r: 200, g: 180, b: 50 };
            buf.fill_row(msg_row, bar_bg);
            buf.put_str(0, msg_row as i64, &format!(" ◈ {message} "), Color::Black, bar_bg);
        }
    }
}

fn compose_file_select(buf: &mut FrameBuffer, screen: &FileSelectScreen, bank: &SpriteBank, hooks: &dyn SlotHooks) {
    let mut canvas = CellCanvas { buf };
    canvas.text("SELECT A FILE", ScreenPos::new(CANVAS_W / 2.0, 40.0), 0.5, GOLD, Color::Reset);

    for (i, slot) in screen.slots().iter().enumerate() {
        let current = i == screen.slot_index();
        let faded = screen.slot_open() && !current;
        compose_slot_card(&mut canvas, slot, bank, current, faded);

        if slot.selected_ease > 0.0 {
            compose_slot_buttons(&mut canvas, slot);
        }
        hooks.after_slot_render(&slot.profile, &screen.render_frame(slot), &mut canvas);
    }

    let footer = if screen.is_starting() {
        "Starting..."
    } else if screen.slot_open() {
        "↑↓: Choose   ←→: Portrait   ENTER: Confirm   ESC: Close"
    } else {
        "←→: Choose File   ENTER: Open   ESC: Title"
    };
    let row = canvas.buf.height as i64 - 1;
    canvas.buf.put_str(2, row, footer, DIM, Color::Reset);
}

fn compose_slot_card(canvas: &mut CellCanvas<'_>, slot: &FileSlot, bank: &SpriteBank, current: bool, faded: bool) {
    let origin = slot.origin;
    let art_color = if faded { DIM } else { Color::White };
    let name_color = match (current, faded) {
        (_, true) => DIM,
        (true, false) => HI,
        (false, false) => Color::White,
    };

    match slot.profile.sprite().art(bank) {
        Some(lines) => canvas.art(lines, origin + ScreenPos::new(0.0, ART_TOP), art_color),
        None => {
            let empty = ["┌──────┐".to_string(), "│      │".to_string(), "└──────┘".to_string()];
            canvas.art(&empty, origin + ScreenPos::new(0.0, ART_TOP), DIM);
        }
    }

    let marker = if current && !faded { "▸ " } else { "" };
    let name = format!("{marker}{}", slot.name());
    canvas.text(&name, origin + ScreenPos::new(0.0, NAME_DY), 0.5, name_color, Color::Reset);

    let stats = if slot.profile.corrupted() {
        "Corrupted".to_string()
    } else {
        match slot.profile.record() {
            Some(record) => format!("Deaths: {}", record.deaths),
            None => "New File".to_string(),
        }
    };
    canvas.text(&stats, origin + ScreenPos::new(0.0, STATS_DY), 0.5, DIM, Color::Reset);
}

/// The labels of an open slot's button column. Extensions draw their own
/// decorations afterwards.
fn compose_slot_buttons(canvas: &mut CellCanvas<'_>, slot: &FileSlot) {
    let column = button_column_origin(slot.origin, slot.selected_ease);
    for (i, button) in slot.buttons.iter().enumerate() {
        let pos = button_position(column, &slot.buttons, i, LINE_HEIGHT);
        let focused = i == slot.button_index && !slot.deleting;
        canvas.draw_text_outline(&button.label, pos, 0.5, button.scale, focused);
    }

    if slot.deleting {
        let pos = ScreenPos::new(slot.origin.x, CANVAS_H - 160.0);
        canvas.text("Delete this file?", pos, 0.5, Color::Rgb { r: 255, g: 60, b: 60 }, Color::Reset);
        canvas.text("ENTER: Delete   ESC: Keep", pos + ScreenPos::new(0.0, 50.0), 0.5, Color::White, Color::Reset);
    }
}

fn compose_playing(buf: &mut FrameBuffer, slot: &FileSlot, bank: &SpriteBank, new_game: bool) {
    let mut canvas = CellCanvas { buf };
    let center = ScreenPos::new(CANVAS_W / 2.0, 300.0);
    let heading = if new_game { "A new journey begins" } else { "Welcome back" };
    canvas.text(heading, ScreenPos::new(center.x, 120.0), 0.5, GOLD, Color::Reset);

    if let Some(lines) = slot.profile.sprite().art(bank) {
        canvas.art(lines, center, Color::White);
    }
    let who = format!("{} (file {})", slot.name(), slot.profile.slot_id() + 1);
    canvas.text(&who, ScreenPos::new(center.x, 600.0), 0.5, HI, Color::Reset);
    let sprite = slot.profile.sprite();
    let detail = format!("{} / {}  (x{:.2})", sprite.portrait(), sprite.animation(), sprite.scale());
    canvas.text(&detail, ScreenPos::new(center.x, 660.0), 0.5, DIM, Color::Reset);
    canvas.text("ESC: Back to File Select", ScreenPos::new(center.x, 900.0), 0.5, DIM, Color::Reset);
}
