use crate::state::storage::{read_json, write_json};
use pandascore_api::Tier;
use std::path::PathBuf;

pub const TIER_FILE: &str = "tier_selection.json";

/// User-selected tier filter, a subset of {s, a, b}. Persisted on every change,
/// independently of predictions.
#[derive(Debug, Default, Clone)]
pub struct TierSelection {
    tiers: Vec<Tier>,
    path: Option<PathBuf>,
}

impl TierSelection {
    pub fn load(path: PathBuf) -> Self {
        let codes: Vec<String> = read_json(&path).unwrap_or_default();
        let mut selection = Self { tiers: Vec::new(), path: Some(path) };
        for tier in codes.iter().filter_map(|c| Tier::parse(c)) {
            selection.insert(tier);
        }
        selection
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    pub fn contains(&self, tier: Tier) -> bool {
        self.tiers.contains(&tier)
    }

    pub fn toggle(&mut self, tier: Tier) {
        if self.contains(tier) {
            self.tiers.retain(|t| *t != tier);
        } else {
            self.insert(tier);
        }
        self.save();
    }

    pub fn set_only(&mut self, tier: Tier) {
        self.tiers.clear();
        self.insert(tier);
        self.save();
    }

    pub fn clear(&mut self) {
        self.tiers.clear();
        self.save();
    }

    pub fn label(&self) -> String {
        if self.tiers.is_empty() {
            return "all".to_string();
        }
        self.tiers
            .iter()
            .map(|t| t.code().to_uppercase())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn insert(&mut self, tier: Tier) {
        if Tier::SELECTABLE.contains(&tier) && !self.tiers.contains(&tier) {
            self.tiers.push(tier);
            self.tiers.sort_unstable();
        }
    }

    fn save(&self) {
        if let Some(path) = &self.path {
            let codes: Vec<&str> = self.tiers.iter().map(Tier::code).collect();
            write_json(path, &codes);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::storage::scratch_dir;

    #[test]
    fn toggling_persists_and_reloads() {
        let path = scratch_dir("tiers-persist").join(TIER_FILE);
        let mut selection = TierSelection::load(path.clone());
        assert!(selection.is_empty());

        selection.toggle(Tier::A);
        selection.toggle(Tier::S);
        assert_eq!(selection.tiers(), &[Tier::S, Tier::A]);

        let reloaded = TierSelection::load(path.clone());
        assert_eq!(reloaded.tiers(), &[Tier::S, Tier::A]);

        selection.toggle(Tier::S);
        assert_eq!(TierSelection::load(path).tiers(), &[Tier::A]);
    }

    #[test]
    fn only_s_a_b_are_selectable() {
        let mut selection = TierSelection::default();
        selection.toggle(Tier::C);
        assert!(selection.is_empty());
        selection.set_only(Tier::B);
        assert_eq!(selection.tiers(), &[Tier::B]);
        assert_eq!(selection.label(), "B");
    }

    #[test]
    fn unknown_codes_in_file_are_dropped() {
        let path = scratch_dir("tiers-unknown").join(TIER_FILE);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"["s","zzz","d","b","s"]"#).unwrap();
        assert_eq!(TierSelection::load(path).tiers(), &[Tier::S, Tier::B]);
    }
}
