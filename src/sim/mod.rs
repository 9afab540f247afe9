pub mod event;
pub mod registry;
pub mod save;
pub mod shim;
pub mod sprite_bank;
