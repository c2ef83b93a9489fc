use eframe::egui;

use crate::ui::state::AppState;

use super::chat_area;

pub fn profile(ui: &mut egui::Ui, state: &AppState) {
    ui.vertical_centered(|ui| {
        ui.add_space(20.0);
        ui.label(egui::RichText::new("👤").size(64.0));
        ui.heading("Your Profile");
        if let Some(user) = &state.current_user {
            ui.label(user.email.as_str());
            ui.label(egui::RichText::new(&user.id).weak());
        }
    });
}

pub fn history(ui: &mut egui::Ui, state: &AppState) {
    if state.current_user.is_none() {
        ui.centered_and_justified(|ui| {
            ui.label("View your message history here");
        });
        return;
    }
    chat_area::render(ui, state.history());
}

/// Returns true when sign out was requested.
pub fn settings(ui: &mut egui::Ui, state: &AppState) -> bool {
    let mut sign_out = false;
    ui.vertical_centered(|ui| {
        ui.heading("Settings");
        if state.current_user.is_some() && ui.button("Sign Out").clicked() {
            sign_out = true;
        }
    });
    sign_out
}
