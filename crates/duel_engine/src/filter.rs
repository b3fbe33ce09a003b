//! Skeleton filter and player assignment.

use contracts::{PlayerAssignment, PlayerSlot, Skeleton};
use tracing::debug;

/// Skeletons bound to the two player slots for one frame
#[derive(Debug, Clone, Copy, Default)]
pub struct Assignment<'a> {
    /// Player one / player two
    pub players: [Option<&'a Skeleton>; 2],

    /// Tracked skeletons in the frame
    pub tracked: usize,
}

impl<'a> Assignment<'a> {
    pub fn player(&self, slot: PlayerSlot) -> Option<&'a Skeleton> {
        self.players[slot.index()]
    }

    /// Second player present
    pub fn game_mode(&self) -> bool {
        self.tracked > 1
    }

    pub fn player_ids(&self) -> [Option<u32>; 2] {
        self.players.map(|p| p.map(|s| s.tracking_id))
    }
}

/// Maps tracked skeletons onto player slots
#[derive(Debug, Clone)]
pub struct PlayerAssigner {
    mode: PlayerAssignment,
    /// Tracking ids bound in the previous frame (tracking id mode)
    bound: [Option<u32>; 2],
}

impl PlayerAssigner {
    pub fn new(mode: PlayerAssignment) -> Self {
        Self {
            mode,
            bound: [None, None],
        }
    }

    pub fn mode(&self) -> PlayerAssignment {
        self.mode
    }

    /// Assign the tracked skeletons of `skeletons` to player slots
    ///
    /// A single tracked skeleton is always player one.
    pub fn assign<'a>(&mut self, skeletons: &'a [Skeleton]) -> Assignment<'a> {
        let tracked: Vec<&Skeleton> = skeletons.iter().filter(|s| s.is_tracked()).collect();

        let players = match self.mode {
            PlayerAssignment::Positional => [tracked.first().copied(), tracked.get(1).copied()],
            PlayerAssignment::TrackingId => self.assign_sticky(&tracked),
        };

        Assignment {
            players,
            tracked: tracked.len(),
        }
    }

    fn assign_sticky<'a>(&mut self, tracked: &[&'a Skeleton]) -> [Option<&'a Skeleton>; 2] {
        let find = |id: Option<u32>| {
            id.and_then(|id| tracked.iter().copied().find(|s| s.tracking_id == id))
        };

        let mut players = [find(self.bound[0]), find(self.bound[1])];
        let kept = players.map(|p| p.map(|s| s.tracking_id));

        // fill vacated slots with unbound skeletons in array order
        let mut spare = tracked
            .iter()
            .copied()
            .filter(|s| !kept.contains(&Some(s.tracking_id)));
        for slot in players.iter_mut() {
            if slot.is_none() {
                *slot = spare.next();
            }
        }

        if players[0].is_none() {
            players.swap(0, 1);
        }

        let ids = players.map(|p| p.map(|s| s.tracking_id));
        if ids != self.bound {
            debug!(previous = ?self.bound, current = ?ids, "player binding changed");
            self.bound = ids;
        }
        players
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn array(ids: &[Option<u32>]) -> Vec<Skeleton> {
        ids.iter()
            .map(|id| id.map(Skeleton::tracked).unwrap_or_default())
            .collect()
    }

    #[test]
    fn positional_takes_first_two_in_array_order() {
        let skeletons = array(&[None, Some(7), None, Some(3), Some(9), None]);
        let mut assigner = PlayerAssigner::new(PlayerAssignment::Positional);

        let assignment = assigner.assign(&skeletons);
        assert_eq!(assignment.tracked, 3);
        assert!(assignment.game_mode());
        assert_eq!(assignment.player_ids(), [Some(7), Some(3)]);
    }

    #[test]
    fn single_tracked_skeleton_is_player_one() {
        let skeletons = array(&[None, None, Some(4)]);
        let mut assigner = PlayerAssigner::new(PlayerAssignment::Positional);

        let assignment = assigner.assign(&skeletons);
        assert!(!assignment.game_mode());
        assert_eq!(assignment.player_ids(), [Some(4), None]);
    }

    #[test]
    fn position_only_skeletons_are_ignored() {
        let mut skeletons = array(&[Some(1), Some(2)]);
        skeletons[0].tracking_state = contracts::SkeletonTrackingState::PositionOnly;
        let mut assigner = PlayerAssigner::new(PlayerAssignment::Positional);

        assert_eq!(assigner.assign(&skeletons).player_ids(), [Some(2), None]);
    }

    #[test]
    fn positional_swaps_when_array_reorders() {
        let mut assigner = PlayerAssigner::new(PlayerAssignment::Positional);
        assigner.assign(&array(&[Some(1), Some(2)]));
        let skeletons = array(&[Some(2), Some(1)]);
        let swapped = assigner.assign(&skeletons);
        assert_eq!(swapped.player_ids(), [Some(2), Some(1)]);
    }

    #[test]
    fn tracking_id_keeps_players_when_array_reorders() {
        let mut assigner = PlayerAssigner::new(PlayerAssignment::TrackingId);
        assigner.assign(&array(&[Some(1), Some(2)]));

        let skeletons = array(&[Some(2), None, Some(1)]);
        let reordered = assigner.assign(&skeletons);
        assert_eq!(reordered.player_ids(), [Some(1), Some(2)]);
    }

    #[test]
    fn tracking_id_refills_vacated_slot() {
        let mut assigner = PlayerAssigner::new(PlayerAssignment::TrackingId);
        assigner.assign(&array(&[Some(1), Some(2)]));

        let skeletons = array(&[Some(3), Some(2)]);
        let replaced = assigner.assign(&skeletons);
        assert_eq!(replaced.player_ids(), [Some(3), Some(2)]);

        let skeletons = array(&[None, Some(2)]);
        let alone = assigner.assign(&skeletons);
        assert_eq!(alone.player_ids(), [Some(2), None]);
    }
}
