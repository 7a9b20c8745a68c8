use super::error::SaveError;
use super::format::{decompress_and_deserialize, serialize_and_compress, MatchSave};

use std::fs::{remove_file, rename, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Number of manual save slots.
pub const SLOT_COUNT: u8 = 3;

/// Slot-based saves under one directory.
#[derive(Debug, Clone)]
pub struct SaveManager {
    dir: PathBuf,
}

impl SaveManager {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save_slot(&self, slot: u8, save: &MatchSave) -> Result<(), SaveError> {
        Self::validate_slot(slot)?;
        save_to_path(&self.slot_path(slot), save)?;
        log::info!("Match saved to slot {}", slot);
        Ok(())
    }

    pub fn load_slot(&self, slot: u8) -> Result<MatchSave, SaveError> {
        Self::validate_slot(slot)?;
        let save = load_from_path(&self.slot_path(slot))?;
        log::info!("Match loaded from slot {}", slot);
        Ok(save)
    }

    pub fn auto_save(&self, save: &MatchSave) -> Result<(), SaveError> {
        save_to_path(&self.auto_save_path(), save)?;
        log::debug!("Auto-save completed");
        Ok(())
    }

    pub fn load_auto_save(&self) -> Result<MatchSave, SaveError> {
        load_from_path(&self.auto_save_path())
    }

    pub fn slot_exists(&self, slot: u8) -> bool {
        Self::validate_slot(slot).is_ok() && self.slot_path(slot).exists()
    }

    pub fn delete_slot(&self, slot: u8) -> Result<(), SaveError> {
        Self::validate_slot(slot)?;
        let path = self.slot_path(slot);
        if path.exists() {
            remove_file(&path)?;
            log::info!("Deleted save slot {}", slot);
        }
        Ok(())
    }

    pub fn slot_info(&self, slot: u8) -> Result<Option<SaveSlotInfo>, SaveError> {
        Self::validate_slot(slot)?;
        let path = self.slot_path(slot);
        if !path.exists() {
            return Ok(None);
        }
        let save = load_from_path(&path)?;
        Ok(Some(SaveSlotInfo {
            slot,
            timestamp: save.timestamp,
            version: save.version,
            half: save.clock.half,
            home_goals: save.score.home,
            away_goals: save.score.away,
        }))
    }

    /// Readable slots, most recent first.
    pub fn all_slot_info(&self) -> Vec<SaveSlotInfo> {
        let mut slots: Vec<SaveSlotInfo> = (0..SLOT_COUNT)
            .filter_map(|slot| self.slot_info(slot).ok().flatten())
            .collect();
        slots.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        slots
    }

    fn validate_slot(slot: u8) -> Result<(), SaveError> {
        if slot >= SLOT_COUNT {
            return Err(SaveError::InvalidSlot { slot });
        }
        Ok(())
    }

    fn slot_path(&self, slot: u8) -> PathBuf {
        self.dir.join(format!("match_slot_{}.dat", slot))
    }

    fn auto_save_path(&self) -> PathBuf {
        self.dir.join("match_auto.dat")
    }
}

/// Write a save through a temp file and rename it into place.
pub fn save_to_path(path: &Path, save: &MatchSave) -> Result<(), SaveError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let data = serialize_and_compress(save)?;
    let temp_path = path.with_extension("tmp");

    {
        let mut file = File::create(&temp_path)?;
        file.write_all(&data)?;
        file.flush()?;
        file.sync_all()?;
    }

    rename(&temp_path, path)?;

    log::debug!("Saved {} bytes to {:?}", data.len(), path);
    Ok(())
}

pub fn load_from_path(path: &Path) -> Result<MatchSave, SaveError> {
    if !path.exists() {
        return Err(SaveError::FileNotFound { path: path.display().to_string() });
    }

    let mut file = File::open(path)?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)?;

    let save = decompress_and_deserialize(&data)?;
    log::debug!("Loaded {} bytes from {:?}", data.len(), path);
    Ok(save)
}

#[derive(Debug, Clone)]
pub struct SaveSlotInfo {
    pub slot: u8,
    pub timestamp: u64,
    pub version: u32,
    pub half: u8,
    pub home_goals: u8,
    pub away_goals: u8,
}

impl SaveSlotInfo {
    pub fn format_timestamp(&self) -> String {
        use time::{format_description::well_known::Rfc3339, OffsetDateTime};

        let timestamp = OffsetDateTime::from_unix_timestamp_nanos(self.timestamp as i128 * 1_000_000)
            .unwrap_or_else(|_| OffsetDateTime::now_utc());

        timestamp.format(&Rfc3339).unwrap_or_else(|_| "Unknown".to_string())
    }

    pub fn display_text(&self) -> String {
        format!(
            "Slot {}: half {} ({} - {})",
            self.slot, self.half, self.home_goals, self.away_goals
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::RulesConfig;
    use crate::engine::rules::RuleEngine;
    use crate::models::{Board, Controller, MatchClock, PitchConfig};
    use tempfile::TempDir;

    fn sample() -> MatchSave {
        let mut rules = RuleEngine::new(RulesConfig::default(), PitchConfig::default());
        rules.start_half(true);
        let mut clock = MatchClock::default();
        clock.start_half(true);
        let board = Board::kickoff_layout(PitchConfig::default(), Controller::Human, Controller::Human);
        MatchSave::new(rules.snapshot(), clock, board)
    }

    #[test]
    fn test_save_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("match.dat");
        let save = sample();

        save_to_path(&path, &save).unwrap();
        assert_eq!(load_from_path(&path).unwrap(), save);
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = load_from_path(&temp_dir.path().join("nope.dat")).unwrap_err();
        assert!(matches!(err, SaveError::FileNotFound { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_slots() {
        let temp_dir = TempDir::new().unwrap();
        let manager = SaveManager::new(temp_dir.path().join("saves"));
        assert!(!manager.slot_exists(1));
        manager.save_slot(1, &sample()).unwrap();
        assert!(manager.slot_exists(1));
        assert_eq!(manager.all_slot_info().len(), 1);
        assert!(matches!(manager.save_slot(3, &sample()), Err(SaveError::InvalidSlot { slot: 3 })));

        manager.delete_slot(1).unwrap();
        assert!(manager.slot_info(1).unwrap().is_none());
    }
}
