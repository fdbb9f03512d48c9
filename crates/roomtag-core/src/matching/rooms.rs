use crate::config::MatchMode;
use crate::model::Room;
use std::collections::BTreeSet;

/// Candidate rooms for a view, in input order
///
/// Rules, applied in order:
/// 1. the room's level must be present and in `matching_levels`
/// 2. with a `target_phase`, the room's phase must be present and equal
/// 3. with a `target_level`, the room's level must equal it
#[must_use]
pub fn candidates<'r>(
    rooms: &'r [Room],
    matching_levels: &BTreeSet<String>,
    target_level: Option<&str>,
    target_phase: Option<&str>,
) -> Vec<&'r Room> {
    RoomFilter::new(matching_levels, MatchMode::LevelAndPhase).candidates(rooms, target_level, target_phase)
}

/// Room eligibility rules bound to one run's matching levels and mode
///
/// In [`MatchMode::LevelOnly`] the phase rule is skipped whatever the view's
/// phase.
#[derive(Debug, Clone, Copy)]
pub struct RoomFilter<'a> {
    matching_levels: &'a BTreeSet<String>,
    mode: MatchMode,
}

impl<'a> RoomFilter<'a> {
    /// Create filter
    #[inline]
    #[must_use]
    pub fn new(matching_levels: &'a BTreeSet<String>, mode: MatchMode) -> Self {
        Self {
            matching_levels,
            mode,
        }
    }

    /// Matching mode
    #[inline]
    #[must_use]
    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Rule 1 alone: the room sits on a level both documents share
    #[inline]
    #[must_use]
    pub fn on_matching_level(&self, room: &Room) -> bool {
        room.level()
            .is_some_and(|level| self.matching_levels.contains(level))
    }

    /// Check a room is eligible for a view with the given level and phase
    #[must_use]
    pub fn admits(&self, room: &Room, target_level: Option<&str>, target_phase: Option<&str>) -> bool {
        if !self.on_matching_level(room) {
            return false;
        }

        if self.mode.matches_phase() {
            if let Some(phase) = target_phase {
                if room.phase_name() != Some(phase) {
                    return false;
                }
            }
        }

        match target_level {
            Some(level) => room.level() == Some(level),
            None => true,
        }
    }

    /// Eligible rooms for a view, in input order
    #[must_use]
    pub fn candidates<'r>(
        &self,
        rooms: &'r [Room],
        target_level: Option<&str>,
        target_phase: Option<&str>,
    ) -> Vec<&'r Room> {
        rooms
            .iter()
            .filter(|room| self.admits(room, target_level, target_phase))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matching() -> BTreeSet<String> {
        ["Level 1", "Level 2"].iter().map(|s| (*s).to_string()).collect()
    }

    fn rooms() -> Vec<Room> {
        vec![
            Room::new(1).on_level("Level 1").in_phase("New"),
            Room::new(2).on_level("Level 1").in_phase("Existing"),
            Room::new(3).on_level("Level 2").in_phase("New"),
            Room::new(4).on_level("Roof").in_phase("New"),
            Room::new(5).in_phase("New"),
            Room::new(6).on_level("Level 1"),
            Room::new(7).on_level("").in_phase("New"),
        ]
    }

    fn ids(rooms: &[&Room]) -> Vec<i64> {
        rooms.iter().map(|r| r.id.value()).collect()
    }

    #[test]
    fn level_and_phase() {
        let m = matching();
        let all = rooms();
        assert_eq!(ids(&candidates(&all, &m, Some("Level 1"), Some("New"))), vec![1]);
        assert_eq!(ids(&candidates(&all, &m, Some("Level 1"), Some("Existing"))), vec![2]);
    }

    #[test]
    fn level_only_when_view_has_no_phase() {
        let m = matching();
        let all = rooms();
        assert_eq!(ids(&candidates(&all, &m, Some("Level 1"), None)), vec![1, 2, 6]);
    }

    #[test]
    fn no_target_level_admits_every_matching_level() {
        let m = matching();
        let all = rooms();
        assert_eq!(ids(&candidates(&all, &m, None, Some("New"))), vec![1, 3]);
        assert_eq!(ids(&candidates(&all, &m, None, None)), vec![1, 2, 3, 6]);
    }

    #[test]
    fn rooms_without_phase_never_match_a_phased_view() {
        let m = matching();
        let all = rooms();
        let found = candidates(&all, &m, Some("Level 1"), Some("New"));
        assert!(!ids(&found).contains(&6));
    }

    #[test]
    fn level_only_mode_ignores_phase() {
        let m = matching();
        let all = rooms();
        let filter = RoomFilter::new(&m, MatchMode::LevelOnly);
        assert_eq!(ids(&filter.candidates(&all, Some("Level 1"), Some("New"))), vec![1, 2, 6]);
    }

    #[test]
    fn unmatched_or_missing_level_is_never_candidate() {
        let m = matching();
        let filter = RoomFilter::new(&m, MatchMode::LevelOnly);
        let all = rooms();
        assert!(!filter.on_matching_level(&all[3]));
        assert!(!filter.on_matching_level(&all[4]));
        assert!(!filter.on_matching_level(&all[6]));
        assert!(!filter.admits(&all[3], Some("Roof"), None));
    }
}
