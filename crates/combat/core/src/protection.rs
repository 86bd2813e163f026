//! Pre-combat protection rules.
//!
//! Every check is a pure predicate over map metadata and the characters
//! involved. Deny reasons are shown to players verbatim.
use thiserror::Error;

use crate::env::MapOracle;
use crate::instance::CombatInstance;
use crate::types::FactionId;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DenyReason {
    #[error("map does not exist")]
    MapNotFound,

    #[error(
        "cannot attack this party; all members are at or below the map's recommended level ({recommended})"
    )]
    PartyLevelProtected { recommended: u32 },

    #[error("this party is in combat and level-protected; cannot join")]
    InCombatPartyProtected,

    #[error(
        "a level-protected party is in this combat (all members at or below level {recommended}); cannot join"
    )]
    KillStealProtected { recommended: u32 },

    #[error("this map does not allow combat")]
    SafeMap,

    #[error("cannot attack characters of the same faction")]
    SameFaction,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProtectionVerdict {
    Allowed,
    Denied(DenyReason),
}

impl ProtectionVerdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, ProtectionVerdict::Allowed)
    }

    pub fn reason(&self) -> Option<String> {
        match self {
            ProtectionVerdict::Allowed => None,
            ProtectionVerdict::Denied(reason) => Some(reason.to_string()),
        }
    }

    fn deny_if(condition: bool, reason: DenyReason) -> Self {
        if condition {
            ProtectionVerdict::Denied(reason)
        } else {
            ProtectionVerdict::Allowed
        }
    }
}

/// Protection checks bound to a map oracle.
pub struct ProtectionChecker<'a, M: MapOracle + ?Sized> {
    maps: &'a M,
}

impl<'a, M: MapOracle + ?Sized> ProtectionChecker<'a, M> {
    pub fn new(maps: &'a M) -> Self {
        Self { maps }
    }

    /// May a party whose members have `target_levels` be attacked in PvP?
    ///
    /// Denied when every member is at or below the map's recommended level.
    pub fn check_pvp_level(&self, map_id: &str, target_levels: &[u32]) -> ProtectionVerdict {
        let Some(map) = self.maps.map(map_id) else {
            return ProtectionVerdict::Denied(DenyReason::MapNotFound);
        };
        let Some(recommended) = map.recommended_level else {
            return ProtectionVerdict::Allowed;
        };
        ProtectionVerdict::deny_if(
            target_levels.iter().all(|&level| level <= recommended),
            DenyReason::PartyLevelProtected { recommended },
        )
    }

    /// May an outsider join the fight a party with `party_levels` is in?
    pub fn check_join_in_progress(&self, map_id: &str, party_levels: &[u32]) -> ProtectionVerdict {
        let Some(recommended) = self.maps.map(map_id).and_then(|m| m.recommended_level) else {
            return ProtectionVerdict::Allowed;
        };
        ProtectionVerdict::deny_if(
            party_levels.iter().all(|&level| level <= recommended),
            DenyReason::InCombatPartyProtected,
        )
    }

    /// Blocks outside joiners while a low-level player party is fighting.
    pub fn check_kill_steal(&self, combat: &CombatInstance) -> ProtectionVerdict {
        let Some(recommended) = self
            .maps
            .map(combat.map_id())
            .and_then(|m| m.recommended_level)
        else {
            return ProtectionVerdict::Allowed;
        };

        let protected = combat.parties().iter().any(|party| {
            let mut players = party.alive().filter(|c| c.is_player()).peekable();
            players.peek().is_some() && players.all(|c| c.level <= recommended)
        });
        ProtectionVerdict::deny_if(protected, DenyReason::KillStealProtected { recommended })
    }

    pub fn check_map_allows_combat(&self, map_id: &str) -> ProtectionVerdict {
        match self.maps.map(map_id) {
            None => ProtectionVerdict::Denied(DenyReason::MapNotFound),
            Some(map) => ProtectionVerdict::deny_if(map.safe, DenyReason::SafeMap),
        }
    }

    pub fn check_faction(&self, attacker: &FactionId, target: &FactionId) -> ProtectionVerdict {
        ProtectionVerdict::deny_if(attacker == target, DenyReason::SameFaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{CombatCharacter, CombatStats};
    use crate::env::MapInfo;
    use crate::types::{CharacterKind, CombatId};

    struct Maps(Vec<MapInfo>);

    impl MapOracle for Maps {
        fn map(&self, id: &str) -> Option<MapInfo> {
            self.0.iter().find(|m| m.id == id).cloned()
        }

        fn maps(&self) -> Vec<MapInfo> {
            self.0.clone()
        }
    }

    fn map(id: &str, recommended_level: Option<u32>, safe: bool) -> MapInfo {
        MapInfo {
            id: id.into(),
            name: id.into(),
            recommended_level,
            safe,
            waypoints: Vec::new(),
        }
    }

    fn maps() -> Maps {
        Maps(vec![
            map("meadow", Some(10), false),
            map("wilds", None, false),
            map("town", None, true),
        ])
    }

    #[test]
    fn pvp_blocked_when_every_target_is_at_or_below_recommended() {
        let maps = maps();
        let checker = ProtectionChecker::new(&maps);

        let verdict = checker.check_pvp_level("meadow", &[8, 10]);
        assert_eq!(
            verdict.reason().as_deref(),
            Some(
                "cannot attack this party; all members are at or below the map's recommended level (10)"
            )
        );
        assert!(checker.check_pvp_level("meadow", &[8, 11]).is_allowed());
        assert!(checker.check_pvp_level("wilds", &[1]).is_allowed());
        assert_eq!(
            checker.check_pvp_level("nowhere", &[50]),
            ProtectionVerdict::Denied(DenyReason::MapNotFound)
        );
    }

    #[test]
    fn joining_protected_fight_is_blocked_but_unknown_map_is_not() {
        let maps = maps();
        let checker = ProtectionChecker::new(&maps);
        assert_eq!(
            checker.check_join_in_progress("meadow", &[3, 4]).reason().as_deref(),
            Some("this party is in combat and level-protected; cannot join")
        );
        assert!(checker.check_join_in_progress("meadow", &[3, 40]).is_allowed());
        assert!(checker.check_join_in_progress("nowhere", &[1]).is_allowed());
    }

    #[test]
    fn kill_steal_protection_looks_at_living_players_per_party() {
        let maps = maps();
        let checker = ProtectionChecker::new(&maps);
        let stats = CombatStats::default();
        let player = |id: &str, level| {
            CombatCharacter::new(id, CharacterKind::Player, id, "x", 100, 10, stats)
                .with_level(level)
        };
        let slime = CombatCharacter::new("s", CharacterKind::Enemy, "Slime", "x", 10, 0, stats);

        let mut combat = CombatInstance::with_seed(CombatId(1), "meadow", 0);
        combat.add_party("low".into(), vec![player("a", 5), player("b", 9)]).expect("join");
        combat.add_party("slimes".into(), vec![slime]).expect("join");
        assert_eq!(
            checker.check_kill_steal(&combat).reason().as_deref(),
            Some("a level-protected party is in this combat (all members at or below level 10); cannot join")
        );

        combat.add_character("low".into(), player("c", 30)).expect("join");
        assert!(checker.check_kill_steal(&combat).is_allowed());
    }

    #[test]
    fn safe_maps_and_same_faction_are_refused() {
        let maps = maps();
        let checker = ProtectionChecker::new(&maps);
        assert_eq!(
            checker.check_map_allows_combat("town").reason().as_deref(),
            Some("this map does not allow combat")
        );
        assert_eq!(
            checker.check_map_allows_combat("nowhere").reason().as_deref(),
            Some("map does not exist")
        );
        assert!(checker.check_map_allows_combat("wilds").is_allowed());
        assert_eq!(
            checker
                .check_faction(&"red".into(), &"red".into())
                .reason()
                .as_deref(),
            Some("cannot attack characters of the same faction")
        );
        assert!(checker.check_faction(&"red".into(), &"blue".into()).is_allowed());
    }
}
