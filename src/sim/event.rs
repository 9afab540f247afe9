/// Events emitted by the file-select screen during an update.
/// The presentation layer consumes these for sound and phase changes.

use crate::domain::picker::UiCue;

#[derive(Clone, Debug, PartialEq)]
pub enum ScreenEvent {
    /// A cue requested by the portrait picker.
    Cue(UiCue),
    SlotMoved,
    ButtonMoved,
    SlotOpened { slot: usize },
    SlotClosed { slot: usize },
    Renamed { slot: usize },
    DeleteAsked { slot: usize },
    SlotDeleted { slot: usize },
    /// Begin confirmed; the game starts once the screen has faded.
    Begin { slot: usize },
    GameStarted { slot: usize, new_game: bool },
    /// Back out of the screen to the title.
    Left,
    /// A host save write failed; the screen stays usable.
    SaveFailed { slot: usize },
}
