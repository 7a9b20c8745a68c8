// Match save/load
// MessagePack + LZ4 compression with a version field and SHA-256 integrity trailer

pub mod error;
pub mod format;
pub mod manager;

pub use error::SaveError;
pub use format::{current_timestamp, decompress_and_deserialize, serialize_and_compress, MatchSave};
pub use manager::{load_from_path, save_to_path, SaveManager, SaveSlotInfo};

pub const SAVE_VERSION: u32 = 1;
