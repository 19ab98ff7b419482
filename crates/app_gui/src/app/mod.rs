//! eframe shell around the prediction controller.

mod drop_zone;
mod result_panel;
pub mod settings;

use eframe::{App, Frame, egui};
use emotion_core::preview::{self, PreviewHandle};
use emotion_core::{
    AppConfig, Effect, Event, PredictionClient, PredictionController, RawFileHandle, SelectionId,
    run_request,
};
use rfd::FileDialog;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

const PICKER_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp", "tif", "tiff"];
const PREVIEW_POLL: Duration = Duration::from_millis(30);

type PreviewReceiver = Receiver<(SelectionId, Option<PreviewHandle>)>;

pub struct UiApp {
    controller: PredictionController,
    client: Arc<dyn PredictionClient>,
    config: AppConfig,
    events_tx: Sender<Event>,
    events_rx: Receiver<Event>,
    pending_previews: Vec<PreviewReceiver>,
    preview_texture: Option<(SelectionId, egui::TextureHandle)>,
    drag: drop_zone::DragTracker,
}

impl UiApp {
    pub fn new(client: Arc<dyn PredictionClient>, config: AppConfig) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        Self {
            controller: PredictionController::new(),
            client,
            config,
            events_tx,
            events_rx,
            pending_previews: Vec::new(),
            preview_texture: None,
            drag: drop_zone::DragTracker::default(),
        }
    }

    /// Feeds one event to the controller and carries out what it asks for.
    fn send(&mut self, ctx: &egui::Context, event: Event) {
        let effects = self.controller.dispatch(event);
        for effect in effects {
            self.run_effect(ctx, effect);
        }
    }

    fn run_effect(&mut self, ctx: &egui::Context, effect: Effect) {
        match effect {
            Effect::PreventDefault => {
                ctx.input_mut(|i| i.raw.dropped_files.clear());
            }
            Effect::OpenFilePicker => {
                if let Some(path) = FileDialog::new()
                    .add_filter("Images", PICKER_EXTENSIONS)
                    .pick_file()
                {
                    self.send(ctx, Event::FileSelected(RawFileHandle::from_path(path)));
                }
            }
            Effect::RenderPreview(file) => {
                self.pending_previews.push(preview::render(file));
            }
            Effect::IssueRequest { submission, file } => {
                let client = Arc::clone(&self.client);
                let tx = self.events_tx.clone();
                let ctx = ctx.clone();
                thread::spawn(move || {
                    let done = run_request(client.as_ref(), submission, &file);
                    if tx.send(done).is_err() {
                        tracing::debug!("window closed before prediction finished");
                    }
                    ctx.request_repaint();
                });
            }
        }
    }

    fn drain_background(&mut self, ctx: &egui::Context) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.send(ctx, event);
        }

        let mut ready = Vec::new();
        self.pending_previews.retain(|rx| match rx.try_recv() {
            Ok(done) => {
                ready.push(done);
                false
            }
            Err(TryRecvError::Empty) => true,
            Err(TryRecvError::Disconnected) => false,
        });
        for (selection, preview) in ready {
            self.send(ctx, Event::PreviewReady { selection, preview });
        }
        if !self.pending_previews.is_empty() {
            ctx.request_repaint_after(PREVIEW_POLL);
        }
    }

    /// Keeps the GPU texture in step with the controller's preview slot.
    fn sync_preview_texture(&mut self, ctx: &egui::Context) {
        let Some(preview) = self.controller.ui().preview() else {
            self.preview_texture = None;
            return;
        };
        if matches!(&self.preview_texture, Some((id, _)) if *id == preview.selection) {
            return;
        }
        let color = egui::ColorImage::from_rgba_unmultiplied(preview.size(), &preview.rgba);
        let name = format!("preview:{}", preview.selection.0);
        let tex = ctx.load_texture(name, color, egui::TextureOptions::LINEAR);
        self.preview_texture = Some((preview.selection, tex));
    }
}

impl App for UiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.drain_background(ctx);

        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            self.render_footer(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading("Emotion Lens");
                ui.add_space(12.0);
                self.render_drop_zone(ctx, ui);
                ui.add_space(12.0);
                self.sync_preview_texture(ctx);
                if let Some((_, tex)) = &self.preview_texture {
                    let sized = egui::load::SizedTexture::from_handle(tex);
                    ui.add(egui::Image::from_texture(sized).max_size(egui::vec2(320.0, 320.0)));
                    ui.add_space(12.0);
                }
                self.render_trigger(ctx, ui);
                ui.add_space(12.0);
                self.render_result(ui);
            });
        });

        self.render_prompt(ctx);
    }
}
