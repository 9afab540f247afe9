/// Screen-space layout shared by the file-select screen and the picker.
///
/// Coordinates are virtual pixels on a 1920x1080 canvas; the renderer maps
/// them onto terminal cells.

use std::ops::{Add, Sub};

pub const CANVAS_W: f32 = 1920.0;
pub const CANVAS_H: f32 = 1080.0;

/// Height of one line of text at scale 1.
pub const LINE_HEIGHT: f32 = 64.0;
/// Horizontal advance of one glyph at scale 1 (the font is monospaced).
pub const GLYPH_ADVANCE: f32 = 32.0;
/// Gap between two stacked slot buttons.
pub const BUTTON_MARGIN: f32 = 15.0;

/// Button column offset from the slot origin: starts above the slot while
/// it is closed and slides down as it opens.
pub const BUTTON_BASE_Y: f32 = -150.0;
pub const BUTTON_EASE_TRAVEL: f32 = 350.0;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScreenPos {
    pub x: f32,
    pub y: f32,
}

impl ScreenPos {
    pub const ZERO: ScreenPos = ScreenPos { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        ScreenPos { x, y }
    }
}

impl Add for ScreenPos {
    type Output = ScreenPos;
    fn add(self, o: ScreenPos) -> ScreenPos {
        ScreenPos::new(self.x + o.x, self.y + o.y)
    }
}

impl Sub for ScreenPos {
    type Output = ScreenPos;
    fn sub(self, o: ScreenPos) -> ScreenPos {
        ScreenPos::new(self.x - o.x, self.y - o.y)
    }
}

/// Rendered width of `text` at `scale`.
pub fn measure_text(text: &str, scale: f32) -> f32 {
    text.chars().count() as f32 * GLYPH_ADVANCE * scale
}

/// Who handles a button when it is confirmed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonOwner {
    Begin,
    Rename,
    Delete,
    /// A control registered by an extension; the tag identifies which.
    Extension(&'static str),
}

/// One entry in a slot's ordered list of selectable controls.
#[derive(Clone, Debug, PartialEq)]
pub struct SlotButton {
    pub label: String,
    pub scale: f32,
    pub owner: ButtonOwner,
}

impl SlotButton {
    pub fn new(label: impl Into<String>, scale: f32, owner: ButtonOwner) -> Self {
        SlotButton {
            label: label.into(),
            scale,
            owner,
        }
    }

    /// Vertical space this button takes in the column, margin included.
    pub fn row_height(&self, line_height: f32) -> f32 {
        line_height * self.scale + BUTTON_MARGIN
    }
}

/// Top of the button column for a slot whose open animation is at `ease`.
pub fn button_column_origin(slot_origin: ScreenPos, ease: f32) -> ScreenPos {
    slot_origin + ScreenPos::new(0.0, BUTTON_BASE_Y + BUTTON_EASE_TRAVEL * ease)
}

/// Position of `buttons[index]`, found by stacking every earlier sibling.
pub fn button_position(
    column_origin: ScreenPos,
    buttons: &[SlotButton],
    index: usize,
    line_height: f32,
) -> ScreenPos {
    let dy: f32 = buttons
        .iter()
        .take(index)
        .map(|b| b.row_height(line_height))
        .sum();
    column_origin + ScreenPos::new(0.0, dy)
}
