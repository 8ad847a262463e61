//! Power-up state machines: bomb readiness and the monster agent.
//! Letter replace has no state of its own and lives in the engine.

use super::grid::{CellId, Grid};
use log::debug;
use rand::Rng;
use rand::seq::SliceRandom;
use std::time::Duration;

/// Bomb becomes ready every this many spawned rows.
pub const BOMB_ROW_INTERVAL: u32 = 4;
/// Maximum cells a bomb removes.
pub const BOMB_BLAST_CELLS: usize = 15;
pub const BOMB_FLASH: Duration = Duration::from_secs(1);
pub const REPLACE_FLASH: Duration = Duration::from_secs(2);
pub const HINT_DURATION: Duration = Duration::from_secs(3);

pub const MONSTER_MAX_CONSUMED: u32 = 20;
pub const MONSTER_STEP_INTERVAL: Duration = Duration::from_millis(500);
const MONSTER_FIRST_THRESHOLD: usize = 5;
const MONSTER_REPEAT_THRESHOLD: usize = 2;

#[derive(Debug, Clone, Default)]
pub struct BombState {
    pub ready: bool,
    /// Spawn count that last made the bomb ready.
    armed_at: u32,
    pub uses: u32,
    /// Cosmetic flag set by a blast, cleared by a timer.
    pub exploding: bool,
}

impl BombState {
    /// Arm on each new positive multiple of [`BOMB_ROW_INTERVAL`]. Stays ready until used.
    pub fn observe_rows_spawned(&mut self, rows_spawned: u32) {
        if rows_spawned > 0
            && rows_spawned % BOMB_ROW_INTERVAL == 0
            && !self.ready
            && rows_spawned > self.armed_at
        {
            self.ready = true;
            self.armed_at = rows_spawned;
            debug!("bomb ready at row {rows_spawned}");
        }
    }

    pub fn detonate(&mut self) {
        self.ready = false;
        self.uses += 1;
        self.exploding = true;
    }
}

/// Outcome of one monster step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonsterStep {
    Moved,
    Teleported,
    Finished,
}

#[derive(Debug, Clone)]
pub struct MonsterState {
    pub ready: bool,
    /// Set by the first activation; tightens the readiness threshold for good.
    pub used_before: bool,
    pub active: bool,
    pub occupant: Option<CellId>,
    pub consumed: u32,
    pending_removal: Option<CellId>,
    last_min_row: usize,
}

impl MonsterState {
    pub fn new(rows: usize) -> Self {
        Self {
            ready: false,
            used_before: false,
            active: false,
            occupant: None,
            consumed: 0,
            pending_removal: None,
            last_min_row: rows,
        }
    }

    pub fn threshold(&self) -> usize {
        if self.used_before {
            MONSTER_REPEAT_THRESHOLD
        } else {
            MONSTER_FIRST_THRESHOLD
        }
    }

    /// Track the lowest occupied row. Ready on crossing down to the threshold, unready above it.
    pub fn observe_min_row(&mut self, min_row: usize) {
        let threshold = self.threshold();
        if self.last_min_row > threshold && min_row <= threshold {
            if !self.ready {
                debug!("monster ready (lowest row {min_row})");
            }
            self.ready = true;
        } else if min_row > threshold {
            self.ready = false;
        }
        self.last_min_row = min_row;
    }

    pub fn begin(&mut self, start: CellId) {
        self.ready = false;
        self.used_before = true;
        self.active = true;
        self.occupant = Some(start);
        self.consumed = 0;
        self.pending_removal = None;
    }

    pub fn take_pending_removal(&mut self) -> Option<CellId> {
        self.pending_removal.take()
    }

    fn finish(&mut self, remove_occupant: bool) -> MonsterStep {
        let occupant = self.occupant.take();
        if remove_occupant {
            self.pending_removal = occupant;
        }
        self.active = false;
        MonsterStep::Finished
    }

    /// One autonomous step over `grid`. The cell left behind (or the final occupant) is
    /// queued for removal; the caller takes it with [`Self::take_pending_removal`].
    pub fn advance<R: Rng + ?Sized>(&mut self, grid: &Grid, rng: &mut R) -> MonsterStep {
        let Some(current) = self.occupant.and_then(|id| grid.get(id)) else {
            return self.finish(false);
        };
        if self.consumed >= MONSTER_MAX_CONSUMED {
            return self.finish(true);
        }
        let neighbours: Vec<CellId> = grid
            .neighbour_positions(current.row, current.col)
            .into_iter()
            .filter_map(|(row, col)| grid.at(row, col))
            .filter(|c| !c.selected)
            .map(|c| c.id)
            .collect();
        let (next, step) = if let Some(&next) = neighbours.choose(rng) {
            (next, MonsterStep::Moved)
        } else {
            let elsewhere: Vec<CellId> = grid
                .cells()
                .iter()
                .filter(|c| !c.selected && c.id != current.id)
                .map(|c| c.id)
                .collect();
            match elsewhere.choose(rng) {
                Some(&next) => (next, MonsterStep::Teleported),
                None => return self.finish(true),
            }
        };
        self.pending_removal = Some(current.id);
        self.occupant = Some(next);
        self.consumed += 1;
        step
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_bomb_arms_on_multiples_of_four() {
        let mut bomb = BombState::default();
        for rows in 1..4 {
            bomb.observe_rows_spawned(rows);
            assert!(!bomb.ready);
        }
        bomb.observe_rows_spawned(4);
        assert!(bomb.ready);
        bomb.detonate();
        assert!(!bomb.ready);
        assert_eq!(bomb.uses, 1);
        // Same counter value does not re-arm.
        bomb.observe_rows_spawned(4);
        assert!(!bomb.ready);
        bomb.observe_rows_spawned(8);
        assert!(bomb.ready);
    }

    #[test]
    fn test_bomb_stays_ready_until_used() {
        let mut bomb = BombState::default();
        bomb.observe_rows_spawned(4);
        bomb.observe_rows_spawned(5);
        assert!(bomb.ready);
    }

    #[test]
    fn test_monster_threshold_tightens_after_use() {
        let mut monster = MonsterState::new(15);
        monster.observe_min_row(7);
        assert!(!monster.ready);
        monster.observe_min_row(5);
        assert!(monster.ready);
        monster.observe_min_row(6);
        assert!(!monster.ready);
        monster.observe_min_row(4);
        assert!(monster.ready);

        monster.begin(CellId(0));
        monster.active = false;
        monster.observe_min_row(4);
        assert!(!monster.ready);
        monster.observe_min_row(2);
        assert!(monster.ready);
    }

    #[test]
    fn test_monster_run_ends_within_bound() {
        let mut grid = Grid::from_picture(15, 8, &["ABCDEFGH"; 15]);
        let mut rng = StdRng::seed_from_u64(3);
        let start = grid.at(14, 0).map(|c| c.id).unwrap();
        let mut monster = MonsterState::new(15);
        monster.begin(start);
        let mut removed = 0;
        for _ in 0..100 {
            if !monster.active {
                break;
            }
            monster.advance(&grid, &mut rng);
            if let Some(id) = monster.take_pending_removal() {
                removed += grid.remove(&std::collections::HashSet::from([id]));
            }
        }
        assert!(!monster.active);
        assert_eq!(removed, 21);
        assert_eq!(monster.occupant, None);
    }

    #[test]
    fn test_monster_teleports_when_boxed_in() {
        let mut grid = Grid::from_picture(3, 3, &["..A", "...", "B.."]);
        let mut rng = StdRng::seed_from_u64(9);
        let start = grid.at(2, 0).map(|c| c.id).unwrap();
        let mut monster = MonsterState::new(3);
        monster.begin(start);
        assert_eq!(monster.advance(&grid, &mut rng), MonsterStep::Teleported);
        assert_eq!(monster.take_pending_removal(), Some(start));
        grid.remove(&std::collections::HashSet::from([start]));
        assert_eq!(monster.advance(&grid, &mut rng), MonsterStep::Finished);
        assert!(!monster.active);
        assert!(monster.take_pending_removal().is_some());
    }
}
