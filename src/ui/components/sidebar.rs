use crate::ui::state::{AppState, Screen};
use eframe::egui;

/// Navigation drawer; returns the screen the user picked.
pub fn render(ui: &mut egui::Ui, state: &AppState) -> Option<Screen> {
    let mut picked = None;

    ui.heading("Menu");
    ui.separator();

    for screen in Screen::ALL {
        if ui
            .selectable_label(state.screen == screen, screen.title())
            .clicked()
        {
            picked = Some(screen);
        }
    }

    ui.separator();
    match &state.current_user {
        Some(user) => {
            ui.colored_label(egui::Color32::GREEN, "●");
            ui.label(egui::RichText::new(user.display_name()).weak());
        }
        None => {
            ui.colored_label(egui::Color32::GRAY, "○");
            ui.label(egui::RichText::new("Not signed in").weak());
        }
    }

    picked
}
