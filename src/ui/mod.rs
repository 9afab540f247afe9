pub mod file_select;
pub mod gamepad;
pub mod input;
pub mod renderer;
pub mod sound;
