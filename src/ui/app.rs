use eframe::egui;
use egui::Layout;
use log::{info, warn};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::config::AssistantConfig;
use crate::engine::chat_log::ChatLog;
use crate::engine::dispatcher::{DispatchConfig, DispatchOutcome, Dispatcher};
use crate::engine::llm_client::OpenAiClient;
use crate::engine::query_agent::QueryAgent;
use crate::model::message::{ChatMessage, Speaker};
use crate::model::profile::Profile;
use crate::model::recipe::default_recipes;
use crate::store::{ProfileStore, RecipeStore};
use crate::ui::settings::UiSettings;
use crate::ui::settings_io::load_settings;
use crate::ui::{center_panel, left_panel, right_panel};

pub const WELCOME: &str = "Assistant Dofus Rétro prêt. Pas d'automatisation, usage hors-client.";

/* =========================
   UI State
   ========================= */

#[derive(Default)]
pub struct UiState {
    pub input_text: String,
    pub api_key: String,

    /// Edited in the profile panel, committed by "Sauvegarder profil".
    pub profile_draft: Profile,
    pub selected_recipe: String,

    pub should_auto_scroll: bool,
}

/* =========================
   App
   ========================= */

/// Owns every store and the transcript. Panels only call back into it.
pub struct CompanionApp {
    pub ui: UiState,
    pub settings: UiSettings,

    data_dir: PathBuf,
    profile_store: ProfileStore,
    recipe_store: RecipeStore,
    profile: Profile,

    dispatch_config: DispatchConfig,
    agent: Option<QueryAgent>,
    chat: ChatLog,
    in_flight: Vec<JoinHandle<()>>,
}

impl CompanionApp {
    pub fn new(config: AssistantConfig) -> Self {
        if let Err(e) = config.ensure_data_dir() {
            warn!("{e}");
        }
        info!("data directory: {}", config.data_dir.display());

        let profile_store = ProfileStore::new(config.profile_path());
        info!("profile document: {}", profile_store.path().display());
        let profile = profile_store.load().unwrap_or_else(|e| {
            warn!("{e}; using the default profile");
            Profile::default()
        });

        let recipe_store = RecipeStore::open(config.recipes_path()).unwrap_or_else(|e| {
            warn!("{e}; using the built-in recipes");
            RecipeStore::detached(config.recipes_path(), default_recipes())
        });
        info!("recipe document: {}", recipe_store.path().display());

        let agent = match OpenAiClient::new(&config.api_base, &config.model) {
            Ok(client) => Some(QueryAgent::new(Arc::new(client), config.max_tokens)),
            Err(e) => {
                warn!("external client unavailable, free text stays local: {e:#}");
                None
            }
        };
        info!(
            "external client available: {}, model {} at {}",
            agent.is_some(),
            config.model,
            config.api_base
        );

        let dispatch_config = DispatchConfig {
            api_key: config.api_key.clone(),
            external_client_available: agent.is_some(),
        };

        let mut chat = ChatLog::new();
        chat.push(ChatMessage::bot(WELCOME));

        let selected_recipe = recipe_store.names().next().unwrap_or_default().to_string();

        Self {
            ui: UiState {
                api_key: config.api_key,
                profile_draft: profile.clone(),
                selected_recipe,
                should_auto_scroll: true,
                ..Default::default()
            },
            settings: load_settings(),
            data_dir: config.data_dir,
            profile_store,
            recipe_store,
            profile,
            dispatch_config,
            agent,
            chat,
            in_flight: Vec::new(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }

    pub fn recipe_names(&self) -> Vec<String> {
        self.recipe_store.names().map(str::to_string).collect()
    }

    pub fn external_client_available(&self) -> bool {
        self.dispatch_config.external_client_available
    }

    pub fn queries_in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Hand one chat input to the dispatcher.
    pub fn submit(&mut self, text: &str) {
        self.dispatch_config.api_key = self.ui.api_key.clone();

        let outcome = Dispatcher::new(
            &self.profile,
            self.recipe_store.recipes(),
            &self.dispatch_config,
            self.agent.as_ref(),
        )
        .dispatch(text, &mut self.chat);

        self.track(outcome);
    }

    pub fn check_key(&mut self) {
        self.dispatch_config.api_key = self.ui.api_key.clone();

        let outcome = Dispatcher::new(
            &self.profile,
            self.recipe_store.recipes(),
            &self.dispatch_config,
            self.agent.as_ref(),
        )
        .check_key(&mut self.chat);

        self.track(outcome);
    }

    pub fn save_profile(&mut self) {
        let draft = self.ui.profile_draft.clone().normalized();

        match self.profile_store.save(&draft) {
            Ok(()) => {
                self.profile = draft;
                self.chat.push(ChatMessage::bot("Profil sauvegardé."));
                self.ui.should_auto_scroll = true;
            }
            Err(e) => {
                warn!("{e}");
                show_error("Erreur", &e.to_string());
            }
        }
    }

    pub fn import_recipes(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .set_title("Importer recettes JSON")
            .add_filter("JSON files", &["json"])
            .pick_file()
        else {
            return;
        };

        match self.recipe_store.import(&path) {
            Ok(count) => {
                self.reselect_recipe();
                self.chat.push(ChatMessage::bot(format!("Recettes importées ({count}).")));
                self.ui.should_auto_scroll = true;
            }
            Err(e) => show_error("Erreur", &e.to_string()),
        }
    }

    /// Re-read the recipe document, e.g. after editing it by hand.
    pub fn reload_recipes(&mut self) {
        match self.recipe_store.load() {
            Ok(recipes) => {
                let count = recipes.len();
                self.reselect_recipe();
                self.chat.push(ChatMessage::bot(format!("Recettes rechargées ({count}).")));
                self.ui.should_auto_scroll = true;
            }
            Err(e) => {
                warn!("{e}");
                show_error("Erreur", &e.to_string());
            }
        }
    }

    /// "Ouvrir dossier de données"
    pub fn open_data_folder(&self) {
        let result = std::fs::create_dir_all(&self.data_dir)
            .and_then(|()| file_manager_command(&self.data_dir))
            .and_then(|mut cmd| cmd.spawn());

        if let Err(e) = result {
            warn!("could not open {}: {e}", self.data_dir.display());
            show_error("Erreur", &format!("Impossible d'ouvrir le dossier : {e}"));
        }
    }

    fn reselect_recipe(&mut self) {
        if self.recipe_store.get(&self.ui.selected_recipe).is_none() {
            self.ui.selected_recipe = self.recipe_store.names().next().unwrap_or_default().to_string();
        }
    }

    fn track(&mut self, outcome: DispatchOutcome) {
        match outcome {
            DispatchOutcome::Ignored => return,
            DispatchOutcome::Answered => {}
            DispatchOutcome::Scheduled(handle) => self.in_flight.push(handle),
        }
        self.ui.should_auto_scroll = true;
    }

    pub fn draw_message(&self, ui: &mut egui::Ui, msg: &ChatMessage) {
        let bg = self.settings.color(msg.speaker);

        ui.add_space(6.0);

        match msg.speaker {
            Speaker::User => {
                let text = format!("Tu: {}", msg.text);
                ui.with_layout(Layout::right_to_left(egui::Align::TOP), |ui| {
                    bubble(ui, bg, &text);
                });
            }
            Speaker::Bot => bubble(ui, bg, &msg.text),
        }
    }
}

/* =========================
   egui App
   ========================= */

impl eframe::App for CompanionApp {
    fn update(&mut self, ctx: &egui::Context, _: &mut eframe::Frame) {
        ctx.set_pixels_per_point(self.settings.ui_scale);

        // A finished thread has already queued its answer, so prune before draining.
        self.in_flight.retain(|h| !h.is_finished());
        if self.chat.drain_pending() > 0 {
            self.ui.should_auto_scroll = true;
        }
        if !self.in_flight.is_empty() {
            ctx.request_repaint_after(Duration::from_millis(200));
        }

        left_panel::draw_left_panel(ctx, self);
        right_panel::draw_right_panel(ctx, self);
        center_panel::draw_center_panel(ctx, self);

        self.ui.should_auto_scroll = false;
    }
}

/* =========================
   UI Helpers
   ========================= */

fn bubble(ui: &mut egui::Ui, color: egui::Color32, text: &str) {
    egui::Frame::new()
        .fill(color)
        .corner_radius(egui::CornerRadius::same(8))
        .inner_margin(egui::Margin::symmetric(10, 6))
        .show(ui, |ui| {
            ui.label(egui::RichText::new(text).color(egui::Color32::WHITE));
        });
}

/// The platform's file manager pointed at `dir`.
fn file_manager_command(dir: &Path) -> io::Result<Command> {
    #[cfg(target_os = "macos")]
    let program = "open";
    #[cfg(target_os = "windows")]
    let program = "explorer";
    #[cfg(target_os = "linux")]
    let program = "xdg-open";

    #[cfg(any(target_os = "macos", target_os = "windows", target_os = "linux"))]
    {
        let mut cmd = Command::new(program);
        cmd.arg(dir);
        Ok(cmd)
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    {
        let _ = dir;
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "no file manager known for this platform",
        ))
    }
}

fn show_error(title: &str, text: &str) {
    rfd::MessageDialog::new()
        .set_level(rfd::MessageLevel::Error)
        .set_title(title)
        .set_description(text)
        .set_buttons(rfd::MessageButtons::Ok)
        .show();
}
