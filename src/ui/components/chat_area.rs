use eframe::egui;

use crate::common::Message;

pub fn render<'a>(ui: &mut egui::Ui, messages: impl IntoIterator<Item = &'a Message>) {
    egui::ScrollArea::vertical()
        .stick_to_bottom(true)
        .auto_shrink([false, false])
        .show(ui, |ui| {
            for message in messages {
                ui.group(|ui| {
                    ui.label(format!("{}: {}", message.sender, message.content));
                });
            }
        });
}
