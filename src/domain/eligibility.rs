/// Portrait eligibility scan.
///
/// A (portrait, animation) pair can be picked when the animation is an idle
/// variant (`idle_<name>` with no further `_` in `<name>`) and its first frame
/// fits inside the slot's portrait box. Oversized art would spill over the
/// neighbouring slot, so it is left out.

use tracing::info;

use super::catalog::PortraitCatalog;
use super::portrait::EligibleEntry;

pub const DEFAULT_PREFIX: &str = "idle_";
pub const DEFAULT_DELIMITER: char = '_';
pub const DEFAULT_MAX_FRAME_SIZE: u32 = 200;

#[derive(Clone, Debug)]
pub struct EligibilityRules {
    pub prefix: String,
    pub delimiter: char,
    /// Inclusive bound on both first-frame dimensions.
    pub max_frame_size: u32,
}

impl Default for EligibilityRules {
    fn default() -> Self {
        EligibilityRules {
            prefix: DEFAULT_PREFIX.to_string(),
            delimiter: DEFAULT_DELIMITER,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

impl EligibilityRules {
    /// Naming half of the rule: prefix present, no delimiter after it.
    pub fn name_matches(&self, animation: &str) -> bool {
        match animation.strip_prefix(self.prefix.as_str()) {
            Some(rest) => !rest.contains(self.delimiter),
            None => false,
        }
    }

    pub fn size_fits(&self, (width, height): (u32, u32)) -> bool {
        width <= self.max_frame_size && height <= self.max_frame_size
    }
}

/// Walk the catalog in its natural order and collect every eligible pair.
/// The result is not sorted; an empty result is not an error.
pub fn scan<C: PortraitCatalog + ?Sized>(catalog: &C, rules: &EligibilityRules) -> Vec<EligibleEntry> {
    let mut found = Vec::new();
    for portrait in catalog.portraits() {
        for animation in catalog.animations_of(portrait) {
            if !rules.name_matches(animation) {
                continue;
            }
            // No first frame means nothing to measure (and nothing to show).
            let fits = catalog
                .first_frame_size(portrait, animation)
                .map_or(false, |size| rules.size_fits(size));
            if fits {
                found.push(EligibleEntry::new(portrait, animation));
            }
        }
    }

    info!(target: "portraits", count = found.len(), "found portraits to pick from");
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FakeCatalog;

    fn rules() -> EligibilityRules {
        EligibilityRules::default()
    }

    #[test]
    fn name_rule_requires_prefix_and_single_segment() {
        let r = rules();
        assert!(r.name_matches("idle_normal"));
        assert!(r.name_matches("idle_"));
        assert!(!r.name_matches("idle_normal_blink"));
        assert!(!r.name_matches("talk_normal"));
        assert!(!r.name_matches("idlenormal"));
        assert!(!r.name_matches("begin_idle_normal"));
    }

    #[test]
    fn size_rule_is_inclusive() {
        let r = rules();
        assert!(r.size_fits((200, 200)));
        assert!(r.size_fits((1, 199)));
        assert!(!r.size_fits((201, 10)));
        assert!(!r.size_fits((10, 201)));
    }

    #[test]
    fn scan_keeps_catalog_order() {
        let catalog = FakeCatalog::new()
            .with("madeline", &[("idle_normal", 160, 160), ("idle_sad", 160, 160)])
            .with("theo", &[("idle_upset", 180, 180)])
            .with("granny", &[("idle_default", 200, 200)]);
        let list = scan(&catalog, &rules());
        assert_eq!(
            list,
            vec![
                EligibleEntry::new("madeline", "idle_normal"),
                EligibleEntry::new("madeline", "idle_sad"),
                EligibleEntry::new("theo", "idle_upset"),
                EligibleEntry::new("granny", "idle_default"),
            ]
        );
    }

    #[test]
    fn scan_rejects_bad_names_and_oversized_art() {
        let catalog = FakeCatalog::new()
            .with("badeline", &[
                ("idle_normal", 160, 160),
                ("idle_normal_blink", 160, 160), // extra delimiter
                ("talk_angry", 160, 160),        // wrong prefix
                ("idle_huge", 320, 160),         // too wide
                ("idle_tall", 160, 201),         // too tall
            ]);
        let list = scan(&catalog, &rules());
        assert_eq!(list, vec![EligibleEntry::new("badeline", "idle_normal")]);
    }

    #[test]
    fn scan_skips_animation_without_frames() {
        let mut catalog = FakeCatalog::new().with("oshiro", &[("idle_normal", 100, 100)]);
        catalog.strip_frames("oshiro", "idle_normal");
        assert!(scan(&catalog, &rules()).is_empty());
    }

    #[test]
    fn scan_of_empty_catalog_is_empty() {
        assert!(scan(&FakeCatalog::new(), &rules()).is_empty());
    }

    #[test]
    fn scan_matches_rule_for_every_pair() {
        let sizes = [50, 199, 200, 201, 400];
        let names = ["idle_a", "idle_a_b", "idle_", "walk_a", "idle", "Idle_a"];
        let mut catalog = FakeCatalog::new();
        let mut expected = Vec::new();
        for (i, w) in sizes.iter().enumerate() {
            for h in sizes.iter() {
                let id = format!("p{}_{}", i, h);
                let anims: Vec<(&str, u32, u32)> = names.iter().map(|n| (*n, *w, *h)).collect();
                catalog = catalog.with(&id, &anims);
                for n in names.iter() {
                    let named = n.starts_with("idle_") && !n["idle_".len()..].contains('_');
                    if named && *w <= 200 && *h <= 200 {
                        expected.push(EligibleEntry::new(id.clone(), *n));
                    }
                }
            }
        }
        assert_eq!(scan(&catalog, &rules()), expected);
    }

    #[test]
    fn custom_prefix_and_bound() {
        let r = EligibilityRules {
            prefix: "pose-".into(),
            delimiter: '-',
            max_frame_size: 64,
        };
        let catalog = FakeCatalog::new().with("kevin", &[
            ("pose-smug", 64, 64),
            ("pose-smug-alt", 64, 64),
            ("idle_normal", 64, 64),
            ("pose-big", 65, 64),
        ]);
        assert_eq!(scan(&catalog, &r), vec![EligibleEntry::new("kevin", "pose-smug")]);
    }
}
