//! Upload-and-predict state machine.
//!
//! The controller performs no I/O. Hosts feed it [`Event`]s through
//! [`PredictionController::dispatch`] and carry out the [`Effect`]s it hands
//! back; the outcome of an [`Effect::IssueRequest`] comes back in as
//! [`Event::RequestCompleted`]. At most one request is outstanding at a time.

use crate::client::{PredictionClient, PredictionResult};
use crate::error::{ErrorInfo, PredictError};
use crate::intake::{FileIntake, RawFileHandle, SelectedFile, SelectionId};
use crate::presenter::{Outcome, ResultPresenter, ResultView};
use crate::preview::PreviewHandle;

pub const IDLE_LABEL: &str = "Analyze Emotion";
pub const BUSY_LABEL: &str = "Analyzing...";
pub const MISSING_FILE_PROMPT: &str = "Please select an image first";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmissionId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    Enter,
    Over,
    Leave,
    Drop,
}

/// Which surface saw a drag event: the drop target itself or anywhere else
/// in the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragSurface {
    DropTarget,
    Document,
}

#[derive(Debug)]
pub enum Event {
    Drag {
        kind: DragKind,
        surface: DragSurface,
        /// Payload of a drop. Only the first entry is considered.
        files: Vec<RawFileHandle>,
    },
    DropTargetClicked,
    /// Picker or file-input result.
    FileSelected(RawFileHandle),
    PreviewReady {
        selection: SelectionId,
        preview: Option<PreviewHandle>,
    },
    SubmitRequested,
    RequestCompleted {
        submission: SubmissionId,
        outcome: Result<PredictionResult, PredictError>,
    },
    PromptDismissed,
}

/// Work for the host.
#[derive(Debug, Clone)]
pub enum Effect {
    /// Suppress the platform's default handling of the drag event and stop
    /// it from propagating. Emitted for every drag event on every surface.
    PreventDefault,
    OpenFilePicker,
    RenderPreview(SelectedFile),
    IssueRequest {
        submission: SubmissionId,
        file: SelectedFile,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestState {
    Idle,
    Submitting(SubmissionId),
    Succeeded(PredictionResult),
    Failed(ErrorInfo),
}

/// The trigger button as it should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerState {
    pub enabled: bool,
    pub label: &'static str,
}

/// Everything the host renders. Only the controller mutates it.
#[derive(Debug)]
pub struct UiState {
    drag_active: bool,
    preview: Option<PreviewHandle>,
    trigger: TriggerState,
    prompt: Option<&'static str>,
    results: ResultPresenter,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            drag_active: false,
            preview: None,
            trigger: TriggerState {
                enabled: false,
                label: IDLE_LABEL,
            },
            prompt: None,
            results: ResultPresenter::default(),
        }
    }
}

impl UiState {
    pub fn drag_active(&self) -> bool {
        self.drag_active
    }

    pub fn preview(&self) -> Option<&PreviewHandle> {
        self.preview.as_ref()
    }

    pub fn trigger(&self) -> TriggerState {
        self.trigger
    }

    /// Blocking message the host must show until [`Event::PromptDismissed`].
    pub fn prompt(&self) -> Option<&'static str> {
        self.prompt
    }

    pub fn result(&self) -> Option<&ResultView> {
        self.results.visible_view()
    }

    fn lock_trigger(&mut self) {
        self.trigger = TriggerState {
            enabled: false,
            label: BUSY_LABEL,
        };
    }

    fn release_trigger(&mut self) {
        self.trigger = TriggerState {
            enabled: true,
            label: IDLE_LABEL,
        };
    }
}

#[derive(Debug)]
pub struct PredictionController {
    intake: FileIntake,
    selected: Option<SelectedFile>,
    state: RequestState,
    request_in_flight: bool,
    next_submission: u64,
    ui: UiState,
}

impl Default for PredictionController {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictionController {
    pub fn new() -> Self {
        Self {
            intake: FileIntake::new(),
            selected: None,
            state: RequestState::Idle,
            request_in_flight: false,
            next_submission: 0,
            ui: UiState::default(),
        }
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn selected(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    pub fn request_in_flight(&self) -> bool {
        self.request_in_flight
    }

    pub fn dispatch(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::Drag {
                kind,
                surface,
                files,
            } => self.on_drag(kind, surface, files),
            Event::DropTargetClicked => vec![Effect::OpenFilePicker],
            Event::FileSelected(candidate) => self.on_file_selected(candidate),
            Event::PreviewReady { selection, preview } => {
                self.on_preview_ready(selection, preview);
                Vec::new()
            }
            Event::SubmitRequested => self.on_submit_requested(),
            Event::RequestCompleted {
                submission,
                outcome,
            } => {
                self.on_request_completed(submission, outcome);
                Vec::new()
            }
            Event::PromptDismissed => {
                self.ui.prompt = None;
                Vec::new()
            }
        }
    }

    fn on_drag(
        &mut self,
        kind: DragKind,
        surface: DragSurface,
        files: Vec<RawFileHandle>,
    ) -> Vec<Effect> {
        let mut effects = vec![Effect::PreventDefault];
        if surface != DragSurface::DropTarget {
            return effects;
        }
        match kind {
            DragKind::Enter | DragKind::Over => self.ui.drag_active = true,
            DragKind::Leave => self.ui.drag_active = false,
            DragKind::Drop => {
                self.ui.drag_active = false;
                if let Some(first) = files.into_iter().next() {
                    effects.extend(self.on_file_selected(first));
                }
            }
        }
        effects
    }

    fn on_file_selected(&mut self, candidate: RawFileHandle) -> Vec<Effect> {
        let Some(file) = self.intake.accept(candidate) else {
            return Vec::new();
        };
        tracing::debug!(
            selection = file.id.0,
            name = %file.name,
            media_type = %file.media_type,
            bytes = file.len(),
            "file selected"
        );
        self.selected = Some(file.clone());
        self.ui.preview = None;
        // A running submission keeps the trigger locked until it resolves.
        if !self.request_in_flight {
            self.ui.trigger.enabled = true;
        }
        vec![Effect::RenderPreview(file)]
    }

    fn on_preview_ready(&mut self, selection: SelectionId, preview: Option<PreviewHandle>) {
        match preview {
            // One slot: a late decode of an older selection still lands here.
            Some(preview) => self.ui.preview = Some(preview),
            None => tracing::debug!(selection = selection.0, "preview unavailable"),
        }
    }

    fn on_submit_requested(&mut self) -> Vec<Effect> {
        if self.request_in_flight {
            tracing::debug!("submit ignored, a request is already in flight");
            return Vec::new();
        }
        let Some(file) = self.selected.clone() else {
            self.ui.prompt = Some(MISSING_FILE_PROMPT);
            return Vec::new();
        };

        self.next_submission += 1;
        let submission = SubmissionId(self.next_submission);
        self.request_in_flight = true;
        self.state = RequestState::Submitting(submission);
        self.ui.lock_trigger();
        self.ui.results.hide();
        tracing::info!(submission = submission.0, name = %file.name, "submitting image");
        vec![Effect::IssueRequest { submission, file }]
    }

    fn on_request_completed(
        &mut self,
        submission: SubmissionId,
        outcome: Result<PredictionResult, PredictError>,
    ) {
        if self.state != RequestState::Submitting(submission) {
            tracing::warn!(
                submission = submission.0,
                "completion for a submission that is not in flight"
            );
            return;
        }

        match outcome {
            Ok(result) => {
                tracing::info!(
                    submission = submission.0,
                    emotion = %result.emotion,
                    confidence = result.confidence,
                    "prediction received"
                );
                self.ui.results.present(Outcome::Succeeded(&result));
                self.state = RequestState::Succeeded(result);
            }
            Err(err) => {
                let info = ErrorInfo::from(&err);
                tracing::error!(
                    submission = submission.0,
                    error = %info.detail,
                    "prediction failed"
                );
                self.ui.results.present(Outcome::Failed(&info));
                self.state = RequestState::Failed(info);
            }
        }

        self.request_in_flight = false;
        self.ui.release_trigger();
    }
}

/// Runs an [`Effect::IssueRequest`] to completion and returns the event that
/// reports it. Blocks the calling thread for the duration of the call.
pub fn run_request(
    client: &dyn PredictionClient,
    submission: SubmissionId,
    file: &SelectedFile,
) -> Event {
    Event::RequestCompleted {
        submission,
        outcome: client.predict(file),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use rstest::rstest;

    fn png(name: &str) -> RawFileHandle {
        RawFileHandle::from_bytes(name, Some("image/png".into()), vec![1u8, 2, 3])
    }

    fn submission_of(effects: &[Effect]) -> SubmissionId {
        effects
            .iter()
            .find_map(|e| match e {
                Effect::IssueRequest { submission, .. } => Some(*submission),
                _ => None,
            })
            .expect("no request issued")
    }

    fn happy() -> PredictionResult {
        PredictionResult {
            emotion: "happy".into(),
            confidence: 0.8765,
            analyzed_at: None,
        }
    }

    #[test]
    fn starts_idle_with_trigger_disabled() {
        let ctl = PredictionController::new();
        assert_eq!(ctl.state(), &RequestState::Idle);
        assert_eq!(
            ctl.ui().trigger(),
            TriggerState {
                enabled: false,
                label: IDLE_LABEL
            }
        );
        assert!(ctl.ui().result().is_none());
        assert!(ctl.ui().preview().is_none());
    }

    #[rstest]
    #[case(DragKind::Enter, true)]
    #[case(DragKind::Over, true)]
    #[case(DragKind::Leave, false)]
    #[case(DragKind::Drop, false)]
    fn drop_target_drag_state(#[case] kind: DragKind, #[case] active: bool) {
        let mut ctl = PredictionController::new();
        ctl.dispatch(Event::Drag {
            kind: DragKind::Enter,
            surface: DragSurface::DropTarget,
            files: Vec::new(),
        });
        let effects = ctl.dispatch(Event::Drag {
            kind,
            surface: DragSurface::DropTarget,
            files: Vec::new(),
        });
        assert!(matches!(effects.as_slice(), [Effect::PreventDefault]));
        assert_eq!(ctl.ui().drag_active(), active);
    }

    #[test]
    fn document_drags_are_suppressed_without_changing_state() {
        let mut ctl = PredictionController::new();
        let effects = ctl.dispatch(Event::Drag {
            kind: DragKind::Drop,
            surface: DragSurface::Document,
            files: vec![png("stray.png")],
        });
        assert!(matches!(effects.as_slice(), [Effect::PreventDefault]));
        assert!(ctl.selected().is_none());
        assert!(!ctl.ui().drag_active());
    }

    #[test]
    fn drop_on_target_takes_first_file_only() {
        let mut ctl = PredictionController::new();
        let effects = ctl.dispatch(Event::Drag {
            kind: DragKind::Drop,
            surface: DragSurface::DropTarget,
            files: vec![png("first.png"), png("second.png")],
        });
        assert_eq!(effects.len(), 2);
        assert!(matches!(&effects[1], Effect::RenderPreview(f) if f.name == "first.png"));
        assert_eq!(ctl.selected().unwrap().name, "first.png");
        assert!(ctl.ui().trigger().enabled);
    }

    #[test]
    fn clicking_target_opens_picker() {
        let mut ctl = PredictionController::new();
        let effects = ctl.dispatch(Event::DropTargetClicked);
        assert!(matches!(effects.as_slice(), [Effect::OpenFilePicker]));
    }

    #[test]
    fn new_selection_clears_old_preview() {
        let mut ctl = PredictionController::new();
        ctl.dispatch(Event::FileSelected(png("a.png")));
        let selection = ctl.selected().unwrap().id;
        ctl.dispatch(Event::PreviewReady {
            selection,
            preview: Some(PreviewHandle {
                selection,
                width: 1,
                height: 1,
                rgba: vec![0, 0, 0, 255],
            }),
        });
        assert!(ctl.ui().preview().is_some());
        ctl.dispatch(Event::FileSelected(png("b.png")));
        assert!(ctl.ui().preview().is_none());
        assert_eq!(ctl.selected().unwrap().name, "b.png");
    }

    #[test]
    fn late_preview_of_older_selection_still_lands() {
        let mut ctl = PredictionController::new();
        ctl.dispatch(Event::FileSelected(png("a.png")));
        let a = ctl.selected().unwrap().id;
        ctl.dispatch(Event::FileSelected(png("b.png")));
        assert_ne!(ctl.selected().unwrap().id, a);
        assert!(ctl.ui().preview().is_none());

        ctl.dispatch(Event::PreviewReady {
            selection: a,
            preview: Some(PreviewHandle {
                selection: a,
                width: 1,
                height: 1,
                rgba: vec![255, 0, 0, 255],
            }),
        });
        assert_eq!(ctl.ui().preview().unwrap().selection, a);
        assert_eq!(ctl.selected().unwrap().name, "b.png");
    }

    #[test]
    fn failed_decode_leaves_slot_empty() {
        let mut ctl = PredictionController::new();
        ctl.dispatch(Event::FileSelected(png("a.png")));
        let selection = ctl.selected().unwrap().id;
        ctl.dispatch(Event::PreviewReady {
            selection,
            preview: None,
        });
        assert!(ctl.ui().preview().is_none());
        assert!(ctl.ui().trigger().enabled);
    }

    #[test]
    fn submit_without_file_prompts_and_issues_nothing() {
        let mut ctl = PredictionController::new();
        let effects = ctl.dispatch(Event::SubmitRequested);
        assert!(effects.is_empty());
        assert_eq!(ctl.ui().prompt(), Some(MISSING_FILE_PROMPT));
        assert_eq!(ctl.state(), &RequestState::Idle);
        ctl.dispatch(Event::PromptDismissed);
        assert!(ctl.ui().prompt().is_none());
    }

    #[test]
    fn submitting_locks_trigger_and_hides_result() {
        let mut ctl = PredictionController::new();
        ctl.dispatch(Event::FileSelected(png("a.png")));
        let first = submission_of(&ctl.dispatch(Event::SubmitRequested));
        ctl.dispatch(Event::RequestCompleted {
            submission: first,
            outcome: Ok(happy()),
        });
        assert!(ctl.ui().result().is_some());

        let second = submission_of(&ctl.dispatch(Event::SubmitRequested));
        assert_ne!(first, second);
        assert_eq!(ctl.state(), &RequestState::Submitting(second));
        assert!(ctl.request_in_flight());
        assert_eq!(
            ctl.ui().trigger(),
            TriggerState {
                enabled: false,
                label: BUSY_LABEL
            }
        );
        assert!(ctl.ui().result().is_none());
    }

    #[test]
    fn reentrant_submit_is_ignored() {
        let mut ctl = PredictionController::new();
        ctl.dispatch(Event::FileSelected(png("a.png")));
        submission_of(&ctl.dispatch(Event::SubmitRequested));
        assert!(ctl.dispatch(Event::SubmitRequested).is_empty());
        assert!(ctl.ui().prompt().is_none());
    }

    #[test]
    fn selection_during_flight_keeps_trigger_locked() {
        let mut ctl = PredictionController::new();
        ctl.dispatch(Event::FileSelected(png("a.png")));
        let submission = submission_of(&ctl.dispatch(Event::SubmitRequested));
        ctl.dispatch(Event::FileSelected(png("b.png")));
        assert!(!ctl.ui().trigger().enabled);
        ctl.dispatch(Event::RequestCompleted {
            submission,
            outcome: Ok(happy()),
        });
        assert!(ctl.ui().trigger().enabled);
        assert_eq!(ctl.selected().unwrap().name, "b.png");
    }

    #[test]
    fn failure_is_generic_and_keeps_detail() {
        let mut ctl = PredictionController::new();
        ctl.dispatch(Event::FileSelected(png("a.png")));
        let submission = submission_of(&ctl.dispatch(Event::SubmitRequested));
        ctl.dispatch(Event::RequestCompleted {
            submission,
            outcome: Err(PredictError::Status {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: "Prediction error".into(),
            }),
        });
        match ctl.state() {
            RequestState::Failed(info) => assert!(info.detail.contains("500")),
            other => panic!("unexpected state {other:?}"),
        }
        assert!(ctl.ui().result().unwrap().is_failure());
        assert_eq!(
            ctl.ui().trigger(),
            TriggerState {
                enabled: true,
                label: IDLE_LABEL
            }
        );
    }

    #[test]
    fn stale_completion_is_ignored() {
        let mut ctl = PredictionController::new();
        ctl.dispatch(Event::FileSelected(png("a.png")));
        let submission = submission_of(&ctl.dispatch(Event::SubmitRequested));
        ctl.dispatch(Event::RequestCompleted {
            submission: SubmissionId(submission.0 + 10),
            outcome: Ok(happy()),
        });
        assert_eq!(ctl.state(), &RequestState::Submitting(submission));
        assert!(!ctl.ui().trigger().enabled);

        ctl.dispatch(Event::RequestCompleted {
            submission,
            outcome: Ok(happy()),
        });
        ctl.dispatch(Event::RequestCompleted {
            submission,
            outcome: Err(PredictError::InvalidConfidence(2.0)),
        });
        assert_eq!(ctl.state(), &RequestState::Succeeded(happy()));
    }
}
