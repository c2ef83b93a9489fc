use eframe::egui;

/// Returns true when the user asked to send. Clearing the text is left to
/// the caller, which only does so once the write is confirmed.
pub fn render(ui: &mut egui::Ui, input_text: &mut String, sending: bool) -> bool {
    let mut send = false;
    ui.horizontal(|ui| {
        let response = ui.add(
            egui::TextEdit::singleline(input_text).hint_text("Type your message..."),
        );
        if ui.add_enabled(!sending, egui::Button::new("Send")).clicked() {
            send = true;
        }

        if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            send = true;
        }
    });

    send && !sending
}
