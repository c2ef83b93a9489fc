use eframe::egui;
use tokio::sync::mpsc;

use crate::common::{FeedCommand, FeedEvent, NoticeLevel};

use super::components::{auth_form, chat_area, input_bar, placeholders, sidebar};
use super::state::{AppState, Screen};

pub struct ChatApp {
    state: AppState,
    command_sender: mpsc::Sender<FeedCommand>,
    event_receiver: mpsc::Receiver<FeedEvent>,
}

impl ChatApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        command_sender: mpsc::Sender<FeedCommand>,
        event_receiver: mpsc::Receiver<FeedEvent>,
    ) -> Self {
        Self {
            state: AppState::new(),
            command_sender,
            event_receiver,
        }
    }

    fn handle_feed_events(&mut self) {
        while let Ok(event) = self.event_receiver.try_recv() {
            if let Some(command) = self.state.apply_event(event) {
                self.send_command(command);
            }
        }
    }

    fn send_command(&mut self, command: FeedCommand) {
        if let Err(err) = self.command_sender.try_send(command) {
            log::warn!("Failed to send command to feed worker: {err}");
            self.state.command_undelivered(err.into_inner());
        }
    }

    fn navigate(&mut self, screen: Screen) {
        if let Some(command) = self.state.navigate(screen) {
            self.send_command(command);
        }
    }

    /// Blocking alert: the rest of the UI is disabled until it is dismissed.
    fn render_notice(&mut self, ctx: &egui::Context) {
        let Some(notice) = self.state.notice() else {
            return;
        };
        let color = match notice.level {
            NoticeLevel::Success => egui::Color32::GREEN,
            NoticeLevel::Error => egui::Color32::RED,
        };

        let mut dismissed = false;
        egui::Window::new(notice.title.as_str())
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.colored_label(color, notice.body.as_str());
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });

        if dismissed {
            self.state.dismiss_notice();
        }
    }

    fn render_screen(&mut self, ui: &mut egui::Ui) {
        match self.state.screen {
            Screen::SignUp => {
                if auth_form::render(ui, "Sign Up", &mut self.state.sign_up) {
                    let command = self.state.submit_sign_up();
                    self.send_command(command);
                }
            }
            Screen::SignIn => {
                if auth_form::render(ui, "Sign In", &mut self.state.sign_in) {
                    let command = self.state.submit_sign_in();
                    self.send_command(command);
                }
            }
            Screen::Home => {
                ui.heading("Messaging App");
                ui.separator();

                let input_height = 40.0;
                let feed_height = (ui.available_height() - input_height).max(0.0);
                ui.allocate_ui(egui::vec2(ui.available_width(), feed_height), |ui| {
                    chat_area::render(ui, &self.state.messages);
                });

                ui.separator();
                if input_bar::render(ui, &mut self.state.input_text, self.state.sending) {
                    if let Some(command) = self.state.submit_message() {
                        self.send_command(command);
                    }
                }
            }
            Screen::Profile => placeholders::profile(ui, &self.state),
            Screen::History => placeholders::history(ui, &self.state),
            Screen::Settings => {
                if placeholders::settings(ui, &self.state) {
                    self.send_command(FeedCommand::SignOut);
                }
            }
        }
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_feed_events();

        let blocked = self.state.notice().is_some();

        egui::SidePanel::left("navigation")
            .resizable(true)
            .default_width(160.0)
            .show(ctx, |ui| {
                ui.add_enabled_ui(!blocked, |ui| {
                    if let Some(screen) = sidebar::render(ui, &self.state) {
                        self.navigate(screen);
                    }
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(!blocked, |ui| {
                self.render_screen(ui);
            });
        });

        self.render_notice(ctx);

        ctx.request_repaint();
    }
}
