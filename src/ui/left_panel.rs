use eframe::egui;

use crate::model::message::Speaker;
use crate::model::profile::{MAX_LEVEL, MIN_LEVEL};
use crate::ui::app::CompanionApp;
use crate::ui::settings_io::save_settings;

pub fn draw_left_panel(ctx: &egui::Context, app: &mut CompanionApp) {
    egui::SidePanel::left("profile")
        .resizable(false)
        .default_width(200.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                draw_profile(ui, app);

                ui.separator();

                if ui.button("Sauvegarder profil").clicked() {
                    app.save_profile();
                }
                if ui.button("Importer recettes").clicked() {
                    app.import_recipes();
                }
                if ui.button("Recharger recettes").clicked() {
                    app.reload_recipes();
                }

                ui.separator();
                ui.label("Dossier de données");
                ui.label(egui::RichText::new(app.data_dir().display().to_string()).small());
                if ui.button("Ouvrir dossier de données").clicked() {
                    app.open_data_folder();
                }

                ui.separator();
                ui.collapsing("Affichage", |ui| draw_options(ui, app));
            });
        });
}

/* =========================
   Profile UI
   ========================= */

fn draw_profile(ui: &mut egui::Ui, app: &mut CompanionApp) {
    let p = &mut app.ui.profile_draft;

    ui.heading("Profil");

    ui.label("Nom");
    ui.text_edit_singleline(&mut p.name);

    ui.label("Classe");
    ui.text_edit_singleline(&mut p.class_name);

    ui.label("Niveau");
    ui.add(egui::DragValue::new(&mut p.level).range(MIN_LEVEL..=MAX_LEVEL));

    ui.label("Orientation");
    ui.text_edit_singleline(&mut p.orientation);

    ui.horizontal(|ui| {
        ui.label("PM");
        ui.add(egui::DragValue::new(&mut p.movement_points).range(0..=20));
        ui.label("PA");
        ui.add(egui::DragValue::new(&mut p.action_points).range(0..=20));
    });

    ui.label("Vitalité");
    ui.add(egui::DragValue::new(&mut p.vitality).range(0..=20_000));

    ui.label("Serveur");
    ui.text_edit_singleline(&mut p.server);

    ui.collapsing("Note", |ui| {
        ui.text_edit_multiline(&mut p.note);
    });
}

/* =========================
   Display options
   ========================= */

fn draw_options(ui: &mut egui::Ui, app: &mut CompanionApp) {
    let mut changed = false;

    ui.label("UI Scale");
    changed |= ui
        .add(egui::Slider::new(&mut app.settings.ui_scale, 0.75..=2.0))
        .changed();

    for speaker in [Speaker::User, Speaker::Bot] {
        let mut color = app.settings.color(speaker);
        ui.horizontal(|ui| {
            ui.label(speaker.label());
            if ui.color_edit_button_srgba(&mut color).changed() {
                app.settings.set_color(speaker, color);
                changed = true;
            }
        });
    }

    if changed {
        save_settings(&app.settings);
    }
}
