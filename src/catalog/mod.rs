//! Static game mode and map catalog.
//!
//! Mode keys and map names are upstream API identifiers; display names are
//! what the CLI shows. This is configuration data, not logic, so it lives in
//! one immutable table.

/// A game mode and its current map rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameMode {
    /// API mode key (e.g. "brawlBall").
    pub key: &'static str,

    /// Human-readable name (e.g. "Brawl Ball").
    pub display_name: &'static str,

    /// Maps playable in this mode.
    pub maps: &'static [&'static str],
}

impl GameMode {
    /// Map by 1-based menu index.
    pub fn map_at(&self, index: usize) -> Option<&'static str> {
        if index == 0 {
            return None;
        }
        self.maps.get(index - 1).copied()
    }

    /// Whether this mode contains the given map (exact name match).
    pub fn has_map(&self, map_name: &str) -> bool {
        self.maps.iter().any(|m| *m == map_name)
    }
}

/// All supported modes, in menu order.
pub static GAME_MODES: &[GameMode] = &[
    GameMode {
        key: "bounty",
        display_name: "Bounty",
        maps: &[
            "Canal Grande",
            "Dry Season",
            "Excel",
            "Hideout",
            "Layer Cake",
            "Shooting Star",
            "Snake Prairie",
        ],
    },
    GameMode {
        key: "brawlBall",
        display_name: "Brawl Ball",
        maps: &[
            "Back Pocket",
            "Backyard Bowl",
            "Beach Ball",
            "Center Stage",
            "Penalty Kick",
            "Pinball Dreams",
            "Razzle Dazzle",
            "Sneaky Fields",
            "Sunny Soccer",
            "Super Beach",
            "Triple Dribble",
            "Weak Foot",
        ],
    },
    GameMode {
        key: "gemGrab",
        display_name: "Gem Grab",
        maps: &[
            "Acute Angle",
            "Corkscrew",
            "Double Swoosh",
            "Gem Fort",
            "Hard Rock Mine",
            "Last Stop",
            "Minecart Madness",
            "Open Space",
            "Pineapple Plaza",
            "Rustic Arcade",
            "Sneaky Sneak",
            "Undermine",
        ],
    },
    GameMode {
        key: "duoShowdown",
        display_name: "Duo Showdown",
        maps: &[
            "Acid Lakes",
            "Cavern Churn",
            "Dark Passage",
            "Double Trouble",
            "Feast or Famine",
            "Flying Fantasies",
            "Island Invasion",
            "Rockwall Brawl",
            "Safety Center",
            "Skull Creek",
            "Stormy Plains",
            "Sunset Vista",
        ],
    },
    GameMode {
        key: "soloShowdown",
        display_name: "Solo Showdown",
        maps: &[
            "Acid Lakes",
            "Cavern Churn",
            "Dark Passage",
            "Double Trouble",
            "Feast or Famine",
            "Flying Fantasies",
            "Island Invasion",
            "Rockwall Brawl",
            "Safety Center",
            "Skull Creek",
            "Stormy Plains",
            "Sunset Vista",
        ],
    },
    GameMode {
        key: "hotZone",
        display_name: "Hot Zone",
        maps: &[
            "Dueling Beetles",
            "From Dusk till Dawn",
            "Open Business",
            "Parallel Plays",
            "Ring of Fire",
            "Rush",
        ],
    },
    GameMode {
        key: "knockout",
        display_name: "Knockout",
        maps: &[
            "Belle's Rock",
            "Between the Rivers",
            "Flaring Phoenix",
            "Four Levels",
            "Goldarm Gulch",
            "Gratitude",
            "Hard Lane",
            "Island Hopping",
            "New Horizons",
            "Out in the Open",
            "Sunset Spar",
            "Twilight Passage",
        ],
    },
    GameMode {
        key: "heist",
        display_name: "Heist",
        maps: &[
            "Bridge Too Far",
            "Electric Storm",
            "Hot Potato",
            "Kaboom Canyon",
            "Safe Zone",
            "Secret or Mystery",
        ],
    },
    GameMode {
        key: "trioShowdown",
        display_name: "Trio Showdown",
        maps: &[
            "Dark Passage",
            "Feast or Famine",
            "Ring-'o-Brawlin",
            "Starr Fish",
            "Thousand Jellies",
        ],
    },
];

/// Look up a mode by API key (case-sensitive) or display name
/// (case-insensitive).
pub fn mode_by_name(name: &str) -> Option<&'static GameMode> {
    GAME_MODES
        .iter()
        .find(|m| m.key == name || m.display_name.eq_ignore_ascii_case(name))
}

/// Mode by 1-based menu index.
pub fn mode_at(index: usize) -> Option<&'static GameMode> {
    if index == 0 {
        return None;
    }
    GAME_MODES.get(index - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_by_key() {
        let mode = mode_by_name("brawlBall").unwrap();
        assert_eq!(mode.display_name, "Brawl Ball");
        assert_eq!(mode.maps.len(), 12);
    }

    #[test]
    fn test_mode_by_display_name_case_insensitive() {
        assert!(mode_by_name("hot zone").is_some());
        assert!(mode_by_name("Gem Grab").is_some());
        assert!(mode_by_name("gem grab").is_some());
    }

    #[test]
    fn test_mode_by_name_unknown() {
        assert!(mode_by_name("payload").is_none());
    }

    #[test]
    fn test_mode_at_is_one_based() {
        assert!(mode_at(0).is_none());
        assert_eq!(mode_at(1).unwrap().key, "bounty");
        assert_eq!(mode_at(GAME_MODES.len()).unwrap().key, "trioShowdown");
        assert!(mode_at(GAME_MODES.len() + 1).is_none());
    }

    #[test]
    fn test_map_at_is_one_based() {
        let bounty = mode_by_name("bounty").unwrap();
        assert!(bounty.map_at(0).is_none());
        assert_eq!(bounty.map_at(1), Some("Canal Grande"));
        assert_eq!(bounty.map_at(7), Some("Snake Prairie"));
        assert!(bounty.map_at(8).is_none());
    }

    #[test]
    fn test_has_map() {
        let heist = mode_by_name("heist").unwrap();
        assert!(heist.has_map("Safe Zone"));
        assert!(!heist.has_map("Canal Grande"));
    }

    #[test]
    fn test_mode_keys_are_unique() {
        for (i, a) in GAME_MODES.iter().enumerate() {
            for b in &GAME_MODES[i + 1..] {
                assert_ne!(a.key, b.key);
            }
        }
    }
}
