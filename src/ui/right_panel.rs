use eframe::egui;

use super::app::CompanionApp;

pub fn draw_right_panel(ctx: &egui::Context, app: &mut CompanionApp) {
    egui::SidePanel::right("assistant")
        .resizable(true)
        .default_width(260.0)
        .min_width(220.0)
        .show(ctx, |ui| {
            draw_api_key(ui, app);
            ui.separator();
            draw_quick_recipe(ui, app);
            ui.separator();

            if ui.button("Assistant local").clicked() {
                app.submit("/help");
            }

            let pending = app.queries_in_flight();
            if pending > 0 {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(format!("{pending} requête(s) en cours"));
                });
            }
        });
}

fn draw_api_key(ui: &mut egui::Ui, app: &mut CompanionApp) {
    ui.label("Clé OpenAI (optionnelle)");
    ui.add(
        egui::TextEdit::singleline(&mut app.ui.api_key)
            .password(true)
            .hint_text("sk-…"),
    );

    if ui.button("Tester clé").clicked() {
        app.check_key();
    }

    if !app.external_client_available() {
        ui.colored_label(
            egui::Color32::YELLOW,
            "Client HTTP indisponible : mode local uniquement.",
        );
    }
}

fn draw_quick_recipe(ui: &mut egui::Ui, app: &mut CompanionApp) {
    ui.label("Recette rapide");

    let names = app.recipe_names();
    egui::ComboBox::from_id_salt("quick_recipe")
        .selected_text(app.ui.selected_recipe.as_str())
        .show_ui(ui, |ui| {
            for name in &names {
                ui.selectable_value(&mut app.ui.selected_recipe, name.clone(), name.as_str());
            }
        });

    let has_selection = !app.ui.selected_recipe.is_empty();
    ui.horizontal(|ui| {
        if ui
            .add_enabled(has_selection, egui::Button::new("Voir recette"))
            .clicked()
        {
            let input = format!("/recipe {}", app.ui.selected_recipe);
            app.submit(&input);
        }
        if ui
            .add_enabled(has_selection, egui::Button::new("Calcul besoins"))
            .clicked()
        {
            let input = format!("/needs {}", app.ui.selected_recipe);
            app.submit(&input);
        }
    });
}
