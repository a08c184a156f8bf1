use std::path::{Path, PathBuf};

use log::info;

use crate::error::StoreError;
use crate::model::profile::{Profile, MAX_LEVEL, MIN_LEVEL};
use crate::store::json_file::{read_json, write_json};

pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored profile, or the default one if nothing was saved yet.
    /// The default is not written until [`ProfileStore::save`] is called.
    pub fn load(&self) -> Result<Profile, StoreError> {
        if !self.path.exists() {
            return Ok(Profile::default());
        }

        let profile: Profile = read_json(&self.path)?;
        Ok(profile.normalized())
    }

    /// Overwrite the stored profile. A level outside the playable range is
    /// refused rather than clamped, so whatever is saved loads back unchanged.
    pub fn save(&self, profile: &Profile) -> Result<(), StoreError> {
        if !profile.level_in_range() {
            return Err(StoreError::InvalidProfile(format!(
                "level {} is outside {MIN_LEVEL}..={MAX_LEVEL}",
                profile.level
            )));
        }
        write_json(&self.path, profile)?;
        info!("profile saved to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn first_load_is_default_and_not_persisted() {
        let dir = tempdir().unwrap();
        let store = ProfileStore::new(dir.path().join("profile.json"));

        let profile = store.load().unwrap();

        assert_eq!(profile, Profile::default());
        assert!(!store.path().exists());
    }

    #[test]
    fn save_then_load_returns_same_profile() {
        let dir = tempdir().unwrap();
        let store = ProfileStore::new(dir.path().join("profile.json"));
        let profile = Profile {
            name: "Kiwi".into(),
            class_name: "Eniripsa".into(),
            level: 87,
            note: "prospection".into(),
            ..Profile::default()
        };

        store.save(&profile).unwrap();

        assert_eq!(store.load().unwrap(), profile);
    }

    #[test]
    fn out_of_range_level_is_refused_and_nothing_written() {
        let dir = tempdir().unwrap();
        let store = ProfileStore::new(dir.path().join("profile.json"));

        for level in [0, MAX_LEVEL + 1, 500] {
            let profile = Profile { level, ..Profile::default() };
            let err = store.save(&profile).unwrap_err();
            assert!(matches!(err, StoreError::InvalidProfile(_)));
        }
        assert!(!store.path().exists());
    }

    #[test]
    fn boundary_levels_round_trip() {
        let dir = tempdir().unwrap();
        let store = ProfileStore::new(dir.path().join("profile.json"));

        for level in [MIN_LEVEL, MAX_LEVEL] {
            let profile = Profile { level, ..Profile::default() };
            store.save(&profile).unwrap();
            assert_eq!(store.load().unwrap(), profile);
        }
    }

    #[test]
    fn hand_edited_level_is_clamped_on_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("profile.json");
        fs::write(&path, r#"{"level": 0}"#).unwrap();

        assert_eq!(ProfileStore::new(&path).load().unwrap().level, MIN_LEVEL);
    }

    #[test]
    fn save_overwrites_whole_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("profile.json");
        fs::write(&path, r#"{"name": "Old", "extra": true}"#).unwrap();
        let store = ProfileStore::new(&path);

        store.save(&Profile::default()).unwrap();
        let text = fs::read_to_string(&path).unwrap();

        assert!(!text.contains("extra"));
        assert!(!text.contains("Old"));
    }

    #[test]
    fn malformed_document_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("profile.json");
        fs::write(&path, "[1, 2").unwrap();

        let err = ProfileStore::new(&path).load().unwrap_err();

        assert!(matches!(err, StoreError::Json { .. }));
    }
}
