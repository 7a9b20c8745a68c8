//! Free-path queries
//!
//! The AI only needs one question answered: can something travel in a
//! straight line from A to B without hitting a piece? Physics engines answer
//! it with a ray/sweep test; `SegmentClearance` answers it from the board.

use fxhash::FxHashMap;

use crate::models::geometry::{distance, point_to_segment_distance, quantize};
use crate::models::{Board, DiskId, Vec2};

/// Narrow ray-test capability.
pub trait ClearPath {
    fn has_clear_path(&self, from: Vec2, to: Vec2) -> bool;
}

/// Board-based sweep: the mover is treated as a ball sliding along the
/// segment; a piece blocks when its edge comes closer than the ball radius.
/// Whatever sits exactly at `from` is the mover itself and is ignored.
pub struct SegmentClearance<'a> {
    board: &'a Board,
}

impl<'a> SegmentClearance<'a> {
    pub fn new(board: &'a Board) -> Self {
        Self { board }
    }
}

const SELF_TOLERANCE: f32 = 1e-3;

impl ClearPath for SegmentClearance<'_> {
    fn has_clear_path(&self, from: Vec2, to: Vec2) -> bool {
        let ball_r = self.board.pitch.ball_radius;
        for disk in self.board.all_disks() {
            if distance(disk.position, from) < SELF_TOLERANCE {
                continue;
            }
            let clearance = self.board.radius_of(disk.id) + ball_r;
            if point_to_segment_distance(disk.position, from, to) < clearance {
                return false;
            }
        }
        let ball = self.board.ball.position;
        if distance(ball, from) >= SELF_TOLERANCE
            && point_to_segment_distance(ball, from, to) < 2.0 * ball_r
        {
            return false;
        }
        true
    }
}

/// Grid used to key cached queries.
const CACHE_STEP: f32 = 0.25;

type PathKey = (Option<DiskId>, (i32, i32), (i32, i32));

/// Per-turn memo of path queries, keyed by candidate and endpoints.
#[derive(Debug, Default)]
pub struct PathCache {
    entries: FxHashMap<PathKey, bool>,
    hits: u32,
    misses: u32,
}

impl PathCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }

    pub fn query(
        &mut self,
        paths: &dyn ClearPath,
        candidate: Option<DiskId>,
        from: Vec2,
        to: Vec2,
    ) -> bool {
        let key = (candidate, quantize(from, CACHE_STEP), quantize(to, CACHE_STEP));
        if let Some(&clear) = self.entries.get(&key) {
            self.hits += 1;
            return clear;
        }
        self.misses += 1;
        let clear = paths.has_clear_path(from, to);
        self.entries.insert(key, clear);
        clear
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    pub fn misses(&self) -> u32 {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{vec2, Controller, PitchConfig, TeamSide};
    use std::cell::RefCell;

    fn empty_board() -> Board {
        let mut board =
            Board::kickoff_layout(PitchConfig::default(), Controller::Human, Controller::Human);
        // Park everyone along the sidelines
        for side in [TeamSide::Home, TeamSide::Away] {
            let x = if side == TeamSide::Home { -39.0 } else { 39.0 };
            for (i, disk) in board.team_mut(side).disks.iter_mut().enumerate() {
                disk.position = vec2(x, -50.0 + i as f32 * 10.0);
            }
        }
        board
    }

    #[test]
    fn test_blocked_by_disk() {
        let mut board = empty_board();
        board.ball.position = vec2(0.0, -20.0);
        board.set_position(DiskId::new(TeamSide::Away, 0), vec2(0.5, 0.0)).unwrap();
        let paths = SegmentClearance::new(&board);
        assert!(!paths.has_clear_path(vec2(0.0, -20.0), vec2(0.0, 20.0)));
        assert!(paths.has_clear_path(vec2(-10.0, -20.0), vec2(-10.0, 20.0)));
    }

    #[test]
    fn test_mover_ignores_itself() {
        let mut board = empty_board();
        let id = DiskId::new(TeamSide::Home, 3);
        board.set_position(id, vec2(0.0, 0.0)).unwrap();
        board.ball.position = vec2(20.0, 20.0);
        let paths = SegmentClearance::new(&board);
        assert!(paths.has_clear_path(vec2(0.0, 0.0), vec2(0.0, 15.0)));
    }

    #[test]
    fn test_ball_blocks_disk_route() {
        let mut board = empty_board();
        board.ball.position = vec2(0.0, 5.0);
        let paths = SegmentClearance::new(&board);
        assert!(!paths.has_clear_path(vec2(0.0, 0.0), vec2(0.0, 10.0)));
    }

    struct Counting {
        calls: RefCell<u32>,
    }

    impl ClearPath for Counting {
        fn has_clear_path(&self, _from: Vec2, to: Vec2) -> bool {
            *self.calls.borrow_mut() += 1;
            to.x > 0.0
        }
    }

    #[test]
    fn test_cache_avoids_repeat_queries() {
        let oracle = Counting { calls: RefCell::new(0) };
        let mut cache = PathCache::new();
        let disk = Some(DiskId::new(TeamSide::Home, 1));
        assert!(cache.query(&oracle, disk, vec2(0.0, 0.0), vec2(1.0, 1.0)));
        assert!(cache.query(&oracle, disk, vec2(0.0, 0.0), vec2(1.0, 1.0)));
        assert!(!cache.query(&oracle, disk, vec2(0.0, 0.0), vec2(-1.0, 1.0)));
        assert_eq!(*oracle.calls.borrow(), 2);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 2);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!((cache.hits(), cache.misses()), (0, 0));
    }
}
