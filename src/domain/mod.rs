pub mod catalog;
pub mod eligibility;
pub mod layout;
pub mod picker;
pub mod portrait;
