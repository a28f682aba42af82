use std::path::Path;

use crate::errors::CoreError;
use crate::repository::memory::RateStore;

use super::format;

/// High-level storage operations: save/load a rate store to/from bytes or files.
pub struct StorageManager;

impl StorageManager {
    /// Serialize a rate store to framed bytes.
    ///
    /// Flow: RateStore → bincode → RTRS framing
    pub fn save_to_bytes(store: &RateStore) -> Result<Vec<u8>, CoreError> {
        let payload = bincode::serialize(store)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize rate store: {e}")))?;
        Ok(format::write_file(format::CURRENT_VERSION, &payload))
    }

    /// Parse framed bytes back into a rate store.
    ///
    /// The payload is not trusted to be ordered: points are re-sorted per asset before
    /// the store is handed out, and invalid or misfiled points reject the whole file.
    pub fn load_from_bytes(data: &[u8]) -> Result<RateStore, CoreError> {
        let (_header, payload) = format::read_file(data)?;
        let mut store: RateStore = bincode::deserialize(payload)
            .map_err(|e| CoreError::Deserialization(format!("Failed to deserialize rate store: {e}")))?;

        let repaired = store
            .normalize()
            .map_err(|e| CoreError::InvalidFileFormat(format!("Corrupt rate store: {e}")))?;
        if repaired > 0 {
            log::warn!("Rate snapshot had {repaired} unsorted asset histories, re-sorted on load");
        }
        Ok(store)
    }

    pub fn save_to_file(store: &RateStore, path: impl AsRef<Path>) -> Result<(), CoreError> {
        let bytes = Self::save_to_bytes(store)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<RateStore, CoreError> {
        let bytes = std::fs::read(path)?;
        Self::load_from_bytes(&bytes)
    }
}
