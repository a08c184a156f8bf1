use std::fs;
use std::path::{Path, PathBuf};

use log::warn;

use crate::ui::settings::UiSettings;

fn settings_path() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("dofus_assistant");
    path.push("ui_settings.json");
    path
}

pub fn load_settings() -> UiSettings {
    load_settings_from(&settings_path())
}

pub fn save_settings(settings: &UiSettings) {
    save_settings_to(&settings_path(), settings);
}

fn load_settings_from(path: &Path) -> UiSettings {
    fs::read_to_string(path)
        .ok()
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

fn save_settings_to(path: &Path, settings: &UiSettings) {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).ok();
    }
    match serde_json::to_string_pretty(settings) {
        Ok(json) => {
            if let Err(e) = fs::write(path, json) {
                warn!("could not save UI settings to {}: {e}", path.display());
            }
        }
        Err(e) => warn!("could not encode UI settings: {e}"),
    }
}
