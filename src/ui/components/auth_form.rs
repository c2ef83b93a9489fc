use eframe::egui;

use crate::ui::state::Credentials;

/// Email + password form; returns true when submitted.
pub fn render(ui: &mut egui::Ui, title: &str, credentials: &mut Credentials) -> bool {
    ui.vertical_centered(|ui| {
        ui.heading(title);
    });
    ui.add_space(10.0);

    ui.add(egui::TextEdit::singleline(&mut credentials.email).hint_text("Email"));
    let password = ui.add(
        egui::TextEdit::singleline(&mut credentials.password)
            .password(true)
            .hint_text("Password"),
    );
    ui.add_space(6.0);

    let submitted = password.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
    ui.button(title).clicked() || submitted
}
