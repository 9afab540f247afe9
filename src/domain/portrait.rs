/// Portrait identities: the pairs a slot can pick from and the pair a slot
/// has picked.

/// Sprite identity the host assigns to every slot before any override.
pub const PLACEHOLDER_PORTRAIT: &str = "portrait_madeline";
/// Animation the host plays on the placeholder portrait.
pub const PLACEHOLDER_ANIMATION: &str = "idle_normal";

/// One selectable (portrait, animation) choice produced by the scan.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EligibleEntry {
    pub portrait: String,
    pub animation: String,
}

impl EligibleEntry {
    pub fn new(portrait: impl Into<String>, animation: impl Into<String>) -> Self {
        EligibleEntry {
            portrait: portrait.into(),
            animation: animation.into(),
        }
    }
}

/// Per-slot portrait choice, persisted next to the slot's save file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectionState {
    pub portrait: String,
    pub animation: String,
}

impl Default for SelectionState {
    fn default() -> Self {
        SelectionState {
            portrait: PLACEHOLDER_PORTRAIT.to_string(),
            animation: PLACEHOLDER_ANIMATION.to_string(),
        }
    }
}

impl SelectionState {
    #[cfg(test)]
    pub fn new(portrait: impl Into<String>, animation: impl Into<String>) -> Self {
        SelectionState {
            portrait: portrait.into(),
            animation: animation.into(),
        }
    }

    pub fn matches(&self, entry: &EligibleEntry) -> bool {
        self.portrait == entry.portrait && self.animation == entry.animation
    }

    /// Overwrite both fields with the given entry.
    pub fn assign(&mut self, entry: &EligibleEntry) {
        self.portrait.clone_from(&entry.portrait);
        self.animation.clone_from(&entry.animation);
    }

    /// Position of this selection in `list`, if present.
    pub fn index_in(&self, list: &[EligibleEntry]) -> Option<usize> {
        list.iter().position(|e| self.matches(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_placeholder_pair() {
        let s = SelectionState::default();
        assert_eq!(s.portrait, PLACEHOLDER_PORTRAIT);
        assert_eq!(s.animation, PLACEHOLDER_ANIMATION);
    }

    #[test]
    fn index_in_uses_value_equality_on_both_fields() {
        let list = vec![
            EligibleEntry::new("madeline", "idle_normal"),
            EligibleEntry::new("theo", "idle_upset"),
        ];
        assert_eq!(SelectionState::new("theo", "idle_upset").index_in(&list), Some(1));
        // same portrait, different animation is not a match
        assert_eq!(SelectionState::new("theo", "idle_normal").index_in(&list), None);
    }

    #[test]
    fn assign_copies_entry() {
        let mut s = SelectionState::default();
        s.assign(&EligibleEntry::new("granny", "idle_default"));
        assert_eq!(s, SelectionState::new("granny", "idle_default"));
    }
}
