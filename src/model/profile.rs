use serde::{Deserialize, Serialize};

pub const MIN_LEVEL: u32 = 1;
pub const MAX_LEVEL: u32 = 200;

/// The player's character sheet. Exactly one exists per installation.
///
/// Missing keys in a stored document are filled from [`Profile::default`],
/// so a loaded profile always has every field populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    #[serde(rename = "class")]
    pub class_name: String,
    pub level: u32,
    pub orientation: String,
    /// Older documents store this as `MP`.
    #[serde(alias = "MP")]
    pub movement_points: i32,
    /// Older documents store this as `PA`.
    #[serde(alias = "PA")]
    pub action_points: i32,
    pub vitality: i32,
    pub server: String,
    pub note: String,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            name: String::new(),
            class_name: "Sacrieur".into(),
            level: 121,
            orientation: "Eau/Sagesse".into(),
            movement_points: 6,
            action_points: 12,
            vitality: 1400,
            server: "Riktus".into(),
            note: String::new(),
        }
    }
}

impl Profile {
    pub fn level_in_range(&self) -> bool {
        (MIN_LEVEL..=MAX_LEVEL).contains(&self.level)
    }

    /// Pull the level back into the playable range.
    pub fn normalized(mut self) -> Self {
        self.level = self.level.clamp(MIN_LEVEL, MAX_LEVEL);
        self
    }
}
