//! Save/load persistence for explored fog
//!
//! Features:
//! - Versioned JSON envelope
//! - Backup rotation (tmp -> save, old save -> backup)
//! - Falls back to the backup when the primary save is corrupt

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PersistError;
use crate::sim::fog::{FogOfWar, FogSnapshot};

/// Current envelope version
pub const SAVE_VERSION: u32 = 1;

/// On-disk save format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveEnvelope {
    pub version: u32,
    /// Session seed the fog belongs to
    pub seed: u64,
    pub fog: FogSnapshot,
}

impl SaveEnvelope {
    pub fn new(seed: u64, fog: &FogOfWar) -> Self {
        Self {
            version: SAVE_VERSION,
            seed,
            fog: fog.snapshot(),
        }
    }
}

pub fn encode(envelope: &SaveEnvelope) -> Result<String, PersistError> {
    Ok(serde_json::to_string(envelope)?)
}

pub fn decode(json: &str) -> Result<SaveEnvelope, PersistError> {
    let envelope: SaveEnvelope = serde_json::from_str(json)?;
    if envelope.version != SAVE_VERSION {
        return Err(PersistError::UnsupportedVersion(envelope.version));
    }
    Ok(envelope)
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    PathBuf::from(name)
}

/// Backup file kept next to the save
pub fn backup_path(path: &Path) -> PathBuf {
    sibling(path, ".bak")
}

/// Write the envelope, rotating the previous save into the backup slot
pub fn save_to(path: impl AsRef<Path>, envelope: &SaveEnvelope) -> Result<(), PersistError> {
    let path = path.as_ref();
    let tmp = sibling(path, ".tmp");
    fs::write(&tmp, encode(envelope)?)?;
    if path.exists() {
        fs::rename(path, backup_path(path))?;
    }
    fs::rename(&tmp, path)?;
    log::info!("Fog saved to {}", path.display());
    Ok(())
}

fn read_envelope(path: &Path) -> Result<SaveEnvelope, PersistError> {
    decode(&fs::read_to_string(path)?)
}

/// Load a save and merge its fog into `fog`
///
/// A corrupt or unreadable primary save falls back to the backup. The
/// primary's error is returned when neither can be used.
pub fn load_into(path: impl AsRef<Path>, fog: &mut FogOfWar) -> Result<SaveEnvelope, PersistError> {
    let path = path.as_ref();
    let envelope = match read_envelope(path) {
        Ok(envelope) => envelope,
        Err(primary) => {
            log::warn!("Save {} unusable ({}), trying backup", path.display(), primary);
            match read_envelope(&backup_path(path)) {
                Ok(envelope) => envelope,
                Err(_) => return Err(primary),
            }
        }
    };
    fog.restore(&envelope.fog)?;
    log::info!(
        "Restored fog from {} ({} cells revealed)",
        path.display(),
        fog.revealed_cells()
    );
    Ok(envelope)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("fogbound-{}-{}", std::process::id(), name));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir.join("fog.json")
    }

    fn fog() -> FogOfWar {
        FogOfWar::new(640.0, 480.0, 16.0, 0.0).unwrap()
    }

    #[test]
    fn test_decode_rejects_future_version() {
        let mut envelope = SaveEnvelope::new(1, &fog());
        envelope.version = 99;
        let json = encode(&envelope).unwrap();
        assert!(matches!(decode(&json), Err(PersistError::UnsupportedVersion(99))));
    }

    #[test]
    fn test_save_then_load_restores_reveals() {
        let path = scratch("restore");
        let mut source = fog();
        source.add_fog_circle(320.0, 240.0, 100.0);
        source.update(0.0);
        save_to(&path, &SaveEnvelope::new(5, &source)).unwrap();

        let mut target = fog();
        let envelope = load_into(&path, &mut target).unwrap();
        assert_eq!(envelope.seed, 5);
        assert_eq!(target.mask(), source.mask());
    }

    #[test]
    fn test_load_merges_without_hiding() {
        let path = scratch("merge");
        let mut saved = fog();
        saved.add_fog_circle(100.0, 100.0, 50.0);
        saved.update(0.0);
        save_to(&path, &SaveEnvelope::new(1, &saved)).unwrap();

        let mut live = fog();
        live.add_fog_circle(500.0, 400.0, 50.0);
        live.update(0.0);
        load_into(&path, &mut live).unwrap();
        assert!(live.is_revealed(100.0, 100.0));
        assert!(live.is_revealed(500.0, 400.0));
    }

    #[test]
    fn test_corrupt_save_falls_back_to_backup() {
        let path = scratch("backup");
        let mut first = fog();
        first.add_fog_circle(200.0, 200.0, 60.0);
        first.update(0.0);
        save_to(&path, &SaveEnvelope::new(1, &first)).unwrap();
        save_to(&path, &SaveEnvelope::new(2, &fog())).unwrap();
        assert!(backup_path(&path).exists());

        fs::write(&path, "{ truncated").unwrap();
        let mut target = fog();
        let envelope = load_into(&path, &mut target).unwrap();
        assert_eq!(envelope.seed, 1);
        assert!(target.is_revealed(200.0, 200.0));
    }

    #[test]
    fn test_grid_mismatch_is_rejected() {
        let path = scratch("mismatch");
        save_to(&path, &SaveEnvelope::new(1, &fog())).unwrap();
        let mut other = FogOfWar::new(640.0, 480.0, 32.0, 0.0).unwrap();
        assert!(matches!(
            load_into(&path, &mut other),
            Err(PersistError::GridMismatch { .. })
        ));
    }

    #[test]
    fn test_missing_save_is_io_error() {
        let path = scratch("missing");
        let mut target = fog();
        assert!(matches!(load_into(&path, &mut target), Err(PersistError::Io(_))));
    }
}
