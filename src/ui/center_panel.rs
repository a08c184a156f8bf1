use eframe::egui;

use super::app::CompanionApp;

pub fn draw_center_panel(ctx: &egui::Context, app: &mut CompanionApp) {
    let input_id = egui::Id::new("chat_input_box");

    // ---------- Input bar ----------
    egui::TopBottomPanel::bottom("chat_input").show(ctx, |ui| {
        let mut send_now = false;

        ui.horizontal(|ui| {
            let response = ui.add_sized(
                [ui.available_width() - 80.0, 28.0],
                egui::TextEdit::singleline(&mut app.ui.input_text)
                    .id(input_id)
                    .hint_text("Pose ta question ou tape /help…"),
            );

            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                send_now = true;
            }

            if ui.button("Envoyer").clicked() {
                send_now = true;
            }
        });

        if send_now {
            let text = std::mem::take(&mut app.ui.input_text);
            app.submit(&text);

            // Keep cursor focused
            ui.memory_mut(|m| m.request_focus(input_id));
        }
    });

    // ---------- Chat history ----------
    egui::CentralPanel::default().show(ctx, |ui| {
        egui::ScrollArea::vertical()
            .stick_to_bottom(app.ui.should_auto_scroll)
            .show(ui, |ui| {
                for msg in app.chat().entries() {
                    app.draw_message(ui, msg);
                }
            });
    });
}
