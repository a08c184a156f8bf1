use std::env;
use std::fs;
use std::path::PathBuf;

use log::warn;

use crate::error::StoreError;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MAX_TOKENS: u32 = 600;

/// Startup configuration, read once from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantConfig {
    pub data_dir: PathBuf,
    /// Initial content of the key field; the user may change it later.
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    pub max_tokens: u32,
}

impl AssistantConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_dir = non_empty("DOFUS_ASSISTANT_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        let max_tokens = match non_empty("DOFUS_ASSISTANT_MAX_TOKENS") {
            None => DEFAULT_MAX_TOKENS,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    warn!("ignoring DOFUS_ASSISTANT_MAX_TOKENS={raw:?}, using {DEFAULT_MAX_TOKENS}");
                    DEFAULT_MAX_TOKENS
                }
            },
        };

        Self {
            data_dir,
            api_key: lookup("OPENAI_API_KEY").unwrap_or_default(),
            api_base: non_empty("OPENAI_BASE_URL")
                .map(|url| url.trim().trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_BASE.into()),
            model: non_empty("DOFUS_ASSISTANT_MODEL")
                .map(|m| m.trim().to_string())
                .unwrap_or_else(|| DEFAULT_MODEL.into()),
            max_tokens,
        }
    }

    pub fn profile_path(&self) -> PathBuf {
        self.data_dir.join("profile.json")
    }

    pub fn recipes_path(&self) -> PathBuf {
        self.data_dir.join("recipes.json")
    }

    pub fn ensure_data_dir(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.data_dir).map_err(|e| StoreError::io(&self.data_dir, e))
    }
}

fn default_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".dofus_assistant")
}
