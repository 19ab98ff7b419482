//! Trigger button, result block and the missing-file prompt.

use super::UiApp;
use eframe::egui;
use emotion_core::{Event, ResultView};

const SUCCESS_FILL: egui::Color32 = egui::Color32::from_rgb(240, 249, 255);
const SUCCESS_BORDER: egui::Color32 = egui::Color32::from_rgb(186, 230, 253);
const SUCCESS_HEADING: egui::Color32 = egui::Color32::from_rgb(3, 105, 161);
const FAILURE_FILL: egui::Color32 = egui::Color32::from_rgb(254, 242, 242);
const FAILURE_BORDER: egui::Color32 = egui::Color32::from_rgb(254, 202, 202);
const FAILURE_TEXT: egui::Color32 = egui::Color32::from_rgb(220, 38, 38);

impl UiApp {
    pub(super) fn render_trigger(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let trigger = self.controller.ui().trigger();
        let clicked = ui
            .add_enabled(
                trigger.enabled,
                egui::Button::new(trigger.label).min_size(egui::vec2(180.0, 36.0)),
            )
            .clicked();
        // Ctrl/Cmd+Enter reaches the handler even while the button is
        // disabled; the controller decides.
        let shortcut = ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::Enter));
        if clicked || shortcut {
            self.send(ctx, Event::SubmitRequested);
        }
    }

    pub(super) fn render_result(&self, ui: &mut egui::Ui) {
        let Some(view) = self.controller.ui().result() else {
            return;
        };
        let (fill, border) = if view.is_failure() {
            (FAILURE_FILL, FAILURE_BORDER)
        } else {
            (SUCCESS_FILL, SUCCESS_BORDER)
        };
        egui::Frame::new()
            .fill(fill)
            .stroke(egui::Stroke::new(1.0, border))
            .corner_radius(8.0)
            .inner_margin(egui::Margin::same(15))
            .show(ui, |ui| {
                ui.set_width(ui.available_width().min(420.0));
                match view {
                    ResultView::Success { .. } => {
                        let lines = view.lines();
                        let mut lines = lines.iter();
                        if let Some(heading) = lines.next() {
                            ui.label(
                                egui::RichText::new(heading)
                                    .heading()
                                    .color(SUCCESS_HEADING),
                            );
                            ui.add_space(6.0);
                        }
                        for line in lines {
                            ui.label(
                                egui::RichText::new(line).color(egui::Color32::from_gray(30)),
                            );
                        }
                    }
                    ResultView::Failure { message } => {
                        ui.label(egui::RichText::new(*message).color(FAILURE_TEXT));
                    }
                }
            });
    }

    pub(super) fn render_prompt(&mut self, ctx: &egui::Context) {
        let Some(message) = self.controller.ui().prompt() else {
            return;
        };
        let mut dismissed = false;
        let response = egui::Modal::new(egui::Id::new("missing-file-prompt")).show(ctx, |ui| {
            ui.set_width(280.0);
            ui.label(message);
            ui.add_space(8.0);
            if ui.button("OK").clicked() {
                dismissed = true;
            }
        });
        if dismissed || response.should_close() {
            self.send(ctx, Event::PromptDismissed);
        }
    }
}
