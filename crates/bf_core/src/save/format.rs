use super::error::SaveError;
use super::SAVE_VERSION;
use crate::engine::rules::RuleSnapshot;
use crate::models::{Board, MatchClock, Score};

use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use rmp_serde::{from_slice, to_vec_named};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;

const CHECKSUM_LEN: usize = 32;

/// Everything needed to resume a match between turns.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MatchSave {
    /// Save format version
    pub version: u32,
    /// Save timestamp (unix milliseconds)
    pub timestamp: u64,
    pub rules: RuleSnapshot,
    pub clock: MatchClock,
    /// Duplicated from the rule snapshot so slot listings need no decoding
    pub score: Score,
    pub board: Board,
}

impl MatchSave {
    pub fn new(rules: RuleSnapshot, clock: MatchClock, board: Board) -> Self {
        Self {
            version: SAVE_VERSION,
            timestamp: current_timestamp(),
            score: rules.score,
            rules,
            clock,
            board,
        }
    }

    pub fn update_timestamp(&mut self) {
        self.timestamp = current_timestamp();
    }

    pub fn validate(&self) -> Result<(), SaveError> {
        self.rules.validate().map_err(SaveError::Corrupted)?;
        self.board
            .validate()
            .map_err(|e| SaveError::Corrupted(e.to_string()))?;
        if self.score != self.rules.score {
            return Err(SaveError::Corrupted("score does not match rule state".into()));
        }
        if self.clock.half != self.rules.half {
            return Err(SaveError::Corrupted(format!(
                "clock half {} does not match rule half {}",
                self.clock.half, self.rules.half
            )));
        }
        if !(self.clock.elapsed_secs.is_finite() && self.clock.elapsed_secs >= 0.0) {
            return Err(SaveError::Corrupted("clock time is not a valid duration".into()));
        }
        Ok(())
    }
}

/// Serialize and compress a match save
pub fn serialize_and_compress(save: &MatchSave) -> Result<Vec<u8>, SaveError> {
    save.validate()?;

    // 1. MessagePack with field names
    let msgpack = to_vec_named(save).map_err(SaveError::Serialization)?;

    // 2. LZ4, size prepended
    let compressed = compress_prepend_size(&msgpack);

    // 3. SHA-256 trailer
    let mut hasher = Sha256::new();
    hasher.update(&compressed);
    let checksum = hasher.finalize();

    let mut result = compressed;
    result.extend_from_slice(&checksum);
    Ok(result)
}

/// Decompress and deserialize a match save. Nothing is returned unless the
/// checksum, version and contents all check out.
pub fn decompress_and_deserialize(bytes: &[u8]) -> Result<MatchSave, SaveError> {
    if bytes.len() < 4 + CHECKSUM_LEN {
        return Err(SaveError::Corrupted(format!("only {} bytes", bytes.len())));
    }

    let (payload, checksum_bytes) = bytes.split_at(bytes.len() - CHECKSUM_LEN);

    let mut hasher = Sha256::new();
    hasher.update(payload);
    let calculated = hasher.finalize();
    if &calculated[..] != checksum_bytes {
        return Err(SaveError::ChecksumMismatch);
    }

    let msgpack = decompress_size_prepended(payload).map_err(|_| SaveError::Decompression)?;
    let save: MatchSave = from_slice(&msgpack).map_err(SaveError::Deserialization)?;

    if save.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch { found: save.version, expected: SAVE_VERSION });
    }
    save.validate()?;
    Ok(save)
}

pub fn current_timestamp() -> u64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::RulesConfig;
    use crate::engine::rules::RuleEngine;
    use crate::models::{Controller, PitchConfig};

    fn sample() -> MatchSave {
        let mut rules = RuleEngine::new(RulesConfig::default(), PitchConfig::default());
        rules.start_half(true);
        let mut clock = MatchClock::default();
        clock.start_half(true);
        clock.advance(42.0);
        let board = Board::kickoff_layout(PitchConfig::default(), Controller::Human, Controller::Human);
        MatchSave::new(rules.snapshot(), clock, board)
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let save = sample();
        let bytes = serialize_and_compress(&save).unwrap();
        let loaded = decompress_and_deserialize(&bytes).unwrap();
        assert_eq!(loaded, save);
    }

    #[test]
    fn test_checksum_validation() {
        let mut bytes = serialize_and_compress(&sample()).unwrap();
        bytes[5] ^= 0xFF;
        assert!(matches!(decompress_and_deserialize(&bytes), Err(SaveError::ChecksumMismatch)));
    }

    #[test]
    fn test_truncated_data() {
        assert!(matches!(decompress_and_deserialize(&[1, 2, 3]), Err(SaveError::Corrupted(_))));
    }

    #[test]
    fn test_future_version_rejected() {
        let mut save = sample();
        save.version = SAVE_VERSION + 1;
        let bytes = serialize_and_compress(&save).unwrap();
        let err = decompress_and_deserialize(&bytes).unwrap_err();
        assert!(matches!(err, SaveError::VersionMismatch { found, .. } if found == SAVE_VERSION + 1));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_inconsistent_snapshot_rejected() {
        let mut save = sample();
        save.rules.remaining_disk_touches = save.rules.remaining_global_touches + 1;
        assert!(matches!(serialize_and_compress(&save), Err(SaveError::Corrupted(_))));

        let mut save = sample();
        save.score.home = 3;
        assert!(serialize_and_compress(&save).is_err());
    }
}
