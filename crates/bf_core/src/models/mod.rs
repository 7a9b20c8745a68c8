pub mod board;
pub mod geometry;
pub mod match_state;
pub mod pitch;
pub mod team;

pub use board::{Ball, Board};
pub use geometry::{vec2, Vec2};
pub use match_state::{MatchClock, Score};
pub use pitch::PitchConfig;
pub use team::{Controller, Disk, DiskId, Team, TeamSide, FIELD_DISKS, KEEPER_SLOT, ROSTER_SIZE};
