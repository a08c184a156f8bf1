use serde::{Deserialize, Serialize};
use egui::Color32;
use std::collections::HashMap;

use crate::model::message::Speaker;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct UiSettings {
    pub ui_scale: f32,

    // Speaker label → RGBA
    pub speaker_colors: HashMap<String, [u8; 4]>,
}

impl Default for UiSettings {
    fn default() -> Self {
        let mut speaker_colors = HashMap::new();

        speaker_colors.insert(Speaker::User.label().into(), [40, 70, 120, 255]);
        speaker_colors.insert(Speaker::Bot.label().into(), [40, 90, 60, 255]);

        Self {
            ui_scale: 1.0,
            speaker_colors,
        }
    }
}

impl UiSettings {
    pub fn color(&self, speaker: Speaker) -> Color32 {
        self.speaker_colors
            .get(speaker.label())
            .map(|c| Color32::from_rgba_unmultiplied(c[0], c[1], c[2], c[3]))
            .unwrap_or(Color32::DARK_GRAY)
    }

    pub fn set_color(&mut self, speaker: Speaker, color: Color32) {
        self.speaker_colors.insert(
            speaker.label().to_string(),
            [color.r(), color.g(), color.b(), color.a()],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_speakers_have_colors() {
        let settings = UiSettings::default();

        assert_eq!(settings.color(Speaker::User), Color32::from_rgb(40, 70, 120));
        assert_eq!(settings.color(Speaker::Bot), Color32::from_rgb(40, 90, 60));
    }

    #[test]
    fn set_color_replaces_entry() {
        let mut settings = UiSettings::default();
        settings.set_color(Speaker::Bot, Color32::from_rgb(1, 2, 3));

        assert_eq!(settings.color(Speaker::Bot), Color32::from_rgb(1, 2, 3));
    }
}
