//! Drop target rendering and translation of egui file drags into controller
//! drag events.

use super::UiApp;
use eframe::egui;
use emotion_core::{DragKind, DragSurface, Event, RawFileHandle};

const DROP_ZONE_SIZE: egui::Vec2 = egui::vec2(420.0, 160.0);

/// Drag status seen in the previous frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(super) struct DragTracker {
    hovering: bool,
    over_target: bool,
}

/// What the window reports about file drags in the current frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(super) struct DragFrame {
    pub hovering: bool,
    pub over_target: bool,
    pub dropped: bool,
}

impl DragTracker {
    /// Returns the drag events implied by moving from the previous frame to
    /// `frame`, in DOM order: document first, then the target.
    pub(super) fn advance(&mut self, frame: DragFrame) -> Vec<(DragKind, DragSurface)> {
        let mut out = Vec::new();
        if frame.dropped {
            let surface = if frame.over_target {
                DragSurface::DropTarget
            } else {
                DragSurface::Document
            };
            out.push((DragKind::Drop, surface));
            if self.over_target && !frame.over_target {
                out.push((DragKind::Leave, DragSurface::DropTarget));
            }
            *self = Self::default();
            return out;
        }

        if let Some(kind) = transition(self.hovering, frame.hovering) {
            out.push((kind, DragSurface::Document));
        }
        let over_target = frame.hovering && frame.over_target;
        if let Some(kind) = transition(self.over_target, over_target) {
            out.push((kind, DragSurface::DropTarget));
        }
        self.hovering = frame.hovering;
        self.over_target = over_target;
        out
    }
}

fn transition(was_inside: bool, inside: bool) -> Option<DragKind> {
    match (was_inside, inside) {
        (false, true) => Some(DragKind::Enter),
        (true, true) => Some(DragKind::Over),
        (true, false) => Some(DragKind::Leave),
        (false, false) => None,
    }
}

pub(super) fn raw_from_dropped(file: &egui::DroppedFile) -> Option<RawFileHandle> {
    let declared = Some(file.mime.clone()).filter(|m| !m.is_empty());
    if let Some(bytes) = &file.bytes {
        let name = if file.name.is_empty() {
            file.path
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        } else {
            file.name.clone()
        };
        return Some(RawFileHandle::from_bytes(name, declared, bytes.clone()));
    }
    let path = file.path.as_ref()?;
    let mut raw = RawFileHandle::from_path(path);
    raw.declared_media_type = declared;
    Some(raw)
}

impl UiApp {
    pub(super) fn render_drop_zone(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let (rect, response) = ui.allocate_exact_size(DROP_ZONE_SIZE, egui::Sense::click());

        let (hovering, pointer, dropped) = ctx.input(|i| {
            (
                !i.raw.hovered_files.is_empty(),
                i.pointer.latest_pos(),
                i.raw.dropped_files.clone(),
            )
        });
        // Some platforms report no pointer position while an OS drag is in
        // progress; the target then counts as hovered.
        let over_target = pointer.is_none_or(|p| rect.contains(p));
        let steps = self.drag.advance(DragFrame {
            hovering,
            over_target,
            dropped: !dropped.is_empty(),
        });
        let mut files: Vec<RawFileHandle> = dropped.iter().filter_map(raw_from_dropped).collect();
        for (kind, surface) in steps {
            let payload = if kind == DragKind::Drop {
                std::mem::take(&mut files)
            } else {
                Vec::new()
            };
            self.send(
                ctx,
                Event::Drag {
                    kind,
                    surface,
                    files: payload,
                },
            );
        }

        if response.clicked() {
            self.send(ctx, Event::DropTargetClicked);
        }

        let active = self.controller.ui().drag_active();
        let (fill, stroke) = if active {
            (
                egui::Color32::from_rgb(224, 242, 254),
                egui::Stroke::new(2.0, egui::Color32::from_rgb(3, 105, 161)),
            )
        } else if response.hovered() {
            (
                egui::Color32::from_gray(48),
                egui::Stroke::new(1.5, egui::Color32::GRAY),
            )
        } else {
            (
                egui::Color32::from_gray(40),
                egui::Stroke::new(1.0, egui::Color32::DARK_GRAY),
            )
        };
        let painter = ui.painter();
        painter.rect_filled(rect, 8.0, fill);
        painter.rect_stroke(rect, 8.0, stroke, egui::StrokeKind::Inside);
        let text_color = if active {
            egui::Color32::from_rgb(3, 105, 161)
        } else {
            egui::Color32::LIGHT_GRAY
        };
        painter.text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            "Drop an image here or click to browse",
            egui::FontId::proportional(16.0),
            text_color,
        );
    }
}
