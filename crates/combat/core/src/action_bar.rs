//! CTB action bar: continuous time-to-ready turn ordering.
//!
//! Every combatant fills a bar of [`ACTION_BAR_MAX`] points at a rate equal
//! to its speed. Selecting the next actor jumps the virtual clock straight to
//! the moment the first bar fills and advances every other bar by the same
//! amount of time, so turn order depends only on speeds and never on how
//! often the scheduler runs.
//!
//! All arithmetic is integral. Time-to-ready comparisons use cross
//! multiplication and advancement uses `floor(remaining* × speed / speed*)`,
//! which lands the chosen entry exactly on the threshold and never pushes
//! another entry past it.
use std::cmp::Ordering;

use crate::types::CharacterId;

/// Progress a bar must reach before its owner may act.
pub const ACTION_BAR_MAX: u64 = 10_000;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionBarEntry {
    pub character: CharacterId,
    pub speed: u64,
    pub progress: u64,
}

impl ActionBarEntry {
    /// Creates an empty bar; speed is clamped to at least 1.
    pub fn new(character: CharacterId, speed: i32) -> Self {
        Self {
            character,
            speed: u64::try_from(speed.max(1)).unwrap_or(1),
            progress: 0,
        }
    }

    pub fn remaining(&self) -> u64 {
        ACTION_BAR_MAX.saturating_sub(self.progress)
    }

    /// Virtual time until this bar fills; zero once it is full.
    pub fn time_to_ready(&self) -> f64 {
        self.remaining() as f64 / self.speed as f64
    }

    /// Orders by time-to-ready, breaking ties in favour of the faster entry.
    fn readiness(&self, other: &Self) -> Ordering {
        let lhs = u128::from(self.remaining()) * u128::from(other.speed);
        let rhs = u128::from(other.remaining()) * u128::from(self.speed);
        lhs.cmp(&rhs).then_with(|| other.speed.cmp(&self.speed))
    }

    fn advance(&mut self, remaining: u64, speed: u64) {
        let gained = u128::from(remaining) * u128::from(self.speed) / u128::from(speed);
        self.progress = self
            .progress
            .saturating_add(u64::try_from(gained).unwrap_or(u64::MAX));
    }

    fn reset(&mut self) {
        self.progress = self.progress.saturating_sub(ACTION_BAR_MAX);
    }
}

/// Action bars of one combat, kept in join order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionBar {
    entries: Vec<ActionBarEntry>,
}

impl ActionBar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a bar for a character. Returns `false` if one already exists.
    pub fn add(&mut self, character: CharacterId, speed: i32) -> bool {
        if self.entry(&character).is_some() {
            return false;
        }
        self.entries.push(ActionBarEntry::new(character, speed));
        true
    }

    pub fn entry(&self, character: &CharacterId) -> Option<&ActionBarEntry> {
        self.entries.iter().find(|e| &e.character == character)
    }

    pub fn entries(&self) -> &[ActionBarEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Jumps to the next moment a living character's bar fills.
    ///
    /// Every living entry advances by the same virtual time delta. Returns
    /// the character that is now ready, or `None` when nobody is alive.
    pub fn advance_to_next_ready<F>(&mut self, is_alive: F) -> Option<CharacterId>
    where
        F: Fn(&CharacterId) -> bool,
    {
        let next = self
            .entries
            .iter()
            .filter(|e| is_alive(&e.character))
            .min_by(|a, b| a.readiness(b))?;

        let (ready, remaining, speed) = (next.character.clone(), next.remaining(), next.speed);

        for entry in self.entries.iter_mut().filter(|e| is_alive(&e.character)) {
            entry.advance(remaining, speed);
        }

        Some(ready)
    }

    /// Rolls a bar back by one full turn, never below zero.
    pub fn reset(&mut self, character: &CharacterId) {
        if let Some(entry) = self.entries.iter_mut().find(|e| &e.character == character) {
            entry.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> CharacterId {
        CharacterId::from(s)
    }

    fn bar(speeds: &[(&str, i32)]) -> ActionBar {
        let mut bar = ActionBar::new();
        for (name, speed) in speeds {
            bar.add(id(name), *speed);
        }
        bar
    }

    /// Plays `turns` turns, resetting each actor after it acts.
    fn play(bar: &mut ActionBar, turns: usize) -> Vec<CharacterId> {
        (0..turns)
            .map(|_| {
                let ready = bar.advance_to_next_ready(|_| true).expect("someone alive");
                bar.reset(&ready);
                ready
            })
            .collect()
    }

    #[test]
    fn faster_players_act_before_slower_enemy() {
        let mut bar = bar(&[("slow", 100), ("fast", 150), ("enemy", 80)]);
        let order = play(&mut bar, 3);
        assert_eq!(order, vec![id("fast"), id("slow"), id("enemy")]);
    }

    #[test]
    fn higher_speed_is_never_later() {
        for (s1, s2) in [(1, 2), (50, 51), (99, 300), (7, 10_000)] {
            let mut bar = bar(&[("a", s1), ("b", s2)]);
            let first = bar.advance_to_next_ready(|_| true);
            assert_eq!(first, Some(id("b")), "speeds {s1} vs {s2}");
        }
    }

    #[test]
    fn equal_time_goes_to_higher_speed() {
        let mut bar = bar(&[("slow", 100), ("fast", 200)]);
        // Both bars are half a time unit from full.
        bar.entries[0].progress = ACTION_BAR_MAX - 50;
        bar.entries[1].progress = ACTION_BAR_MAX - 100;
        assert_eq!(bar.advance_to_next_ready(|_| true), Some(id("fast")));
    }

    #[test]
    fn turn_frequency_is_proportional_to_speed() {
        let mut bar = bar(&[("quick", 200), ("steady", 100)]);
        let order = play(&mut bar, 30);
        let quick = order.iter().filter(|c| **c == id("quick")).count();
        assert_eq!(quick, 20);
    }

    #[test]
    fn progress_after_reset_stays_in_range() {
        let mut bar = bar(&[("a", 37), ("b", 113), ("c", 251), ("d", 1)]);
        for _ in 0..200 {
            let ready = bar.advance_to_next_ready(|_| true).expect("alive");
            assert_eq!(bar.entry(&ready).map(|e| e.progress), Some(ACTION_BAR_MAX));
            bar.reset(&ready);
            assert!(bar.entry(&ready).map(|e| e.progress).unwrap_or(0) < ACTION_BAR_MAX);
            assert!(bar.entries().iter().all(|e| e.progress <= ACTION_BAR_MAX));
        }
    }

    #[test]
    fn reset_carries_over_excess_progress() {
        let mut bar = bar(&[("a", 10)]);
        bar.entries[0].progress = ACTION_BAR_MAX + 1_234;
        bar.reset(&id("a"));
        assert_eq!(bar.entry(&id("a")).map(|e| e.progress), Some(1_234));
        bar.reset(&id("a"));
        assert_eq!(bar.entry(&id("a")).map(|e| e.progress), Some(0));
    }

    #[test]
    fn dead_characters_are_skipped_and_frozen() {
        let mut bar = bar(&[("alive", 10), ("dead", 1_000)]);
        let ready = bar.advance_to_next_ready(|c| c.as_str() != "dead");
        assert_eq!(ready, Some(id("alive")));
        assert_eq!(bar.entry(&id("dead")).map(|e| e.progress), Some(0));
        assert_eq!(bar.advance_to_next_ready(|_| false), None);
    }

    #[test]
    fn non_positive_speed_is_clamped() {
        let entry = ActionBarEntry::new(id("x"), -5);
        assert_eq!(entry.speed, 1);
        assert_eq!(entry.time_to_ready(), ACTION_BAR_MAX as f64);
    }

    #[test]
    fn duplicate_entries_are_rejected() {
        let mut bar = bar(&[("a", 10)]);
        assert!(!bar.add(id("a"), 99));
        assert_eq!(bar.len(), 1);
    }
}
