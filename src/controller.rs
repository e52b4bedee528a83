use std::time::Duration;

use crate::cleanup::{self, CleanupRequest};
use crate::error::{AppError, AppResult, ValidationError};
use crate::flash::Flash;
use crate::fragment;
use crate::store::{FormField, FormState, KeyValueStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Translate,
    Cleanup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionState {
    Idle,
    Validating,
    InFlight,
    Success,
    Failed,
}

/// A network call for the worker to make.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    Translate {
        project_id: String,
        credential: String,
        html: String,
    },
    Cleanup {
        project_id: String,
        credential: String,
        request: CleanupRequest,
    },
}

impl Job {
    pub fn kind(&self) -> ActionKind {
        match self {
            Job::Translate { .. } => ActionKind::Translate,
            Job::Cleanup { .. } => ActionKind::Cleanup,
        }
    }
}

#[derive(Debug)]
pub struct Outcome {
    pub kind: ActionKind,
    pub result: AppResult<String>,
}

pub struct Controller {
    pub form: FormState,
    store: Box<dyn KeyValueStore + Send>,
    pub flash: Flash,
    translate: ActionState,
    cleanup: ActionState,
}

impl Controller {
    pub fn new(store: Box<dyn KeyValueStore + Send>, flash_duration: Duration) -> Self {
        let form = FormState::restore(store.as_ref());
        Self {
            form,
            store,
            flash: Flash::new(flash_duration),
            translate: ActionState::Idle,
            cleanup: ActionState::Idle,
        }
    }

    pub fn state(&self, kind: ActionKind) -> ActionState {
        match kind {
            ActionKind::Translate => self.translate,
            ActionKind::Cleanup => self.cleanup,
        }
    }

    fn set_state(&mut self, kind: ActionKind, state: ActionState) {
        tracing::debug!(?kind, ?state, "action state");
        match kind {
            ActionKind::Translate => self.translate = state,
            ActionKind::Cleanup => self.cleanup = state,
        }
    }

    pub fn is_busy(&self, kind: ActionKind) -> bool {
        self.state(kind) == ActionState::InFlight
    }

    /// Flash storage failures rather than dropping the edit.
    fn report(&mut self, result: AppResult<()>) {
        if let Err(e) = result {
            self.flash.show(e.to_string());
        }
    }

    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        let result = self.form.set(self.store.as_mut(), field, value);
        self.report(result);
    }

    /// For widgets that edit `form` in place.
    pub fn field_edited(&mut self, field: FormField) {
        let result = self.form.persist(self.store.as_mut(), field);
        self.report(result);
    }

    pub fn clear_api_key(&mut self) {
        let result = self.form.clear_api_key(self.store.as_mut());
        self.report(result);
    }

    pub fn clear_all(&mut self) {
        let result = self.form.clear_all(self.store.as_mut());
        self.report(result);
    }

    fn credentials(&self) -> (String, String) {
        (
            self.form.project_id.trim().to_string(),
            self.form.api_key.trim().to_string(),
        )
    }

    fn validate_translate(&self) -> Result<Job, ValidationError> {
        if self.form.source_text.trim().is_empty() {
            return Err(ValidationError::MissingSourceText);
        }
        let (project_id, credential) = self.credentials();
        if credential.is_empty() {
            return Err(ValidationError::MissingApiKey);
        }
        Ok(Job::Translate {
            project_id,
            credential,
            html: fragment::source_to_html(&self.form.source_text),
        })
    }

    fn validate_cleanup(&self) -> Result<Job, ValidationError> {
        let nodes = fragment::parse(&self.form.translated_text);
        if nodes.iter().all(fragment::Node::is_blank) {
            return Err(ValidationError::MissingTextToCleanup);
        }
        let (project_id, credential) = self.credentials();
        if credential.is_empty() {
            return Err(ValidationError::MissingApiKey);
        }
        Ok(Job::Cleanup {
            project_id,
            credential,
            request: cleanup::build_request(&nodes),
        })
    }

    fn clicked(&mut self, kind: ActionKind) -> Option<Job> {
        if self.is_busy(kind) {
            tracing::debug!(?kind, "ignoring click while in flight");
            return None;
        }
        self.set_state(kind, ActionState::Validating);
        let checked = match kind {
            ActionKind::Translate => self.validate_translate(),
            ActionKind::Cleanup => self.validate_cleanup(),
        };
        match checked {
            Ok(job) => {
                self.set_state(kind, ActionState::InFlight);
                Some(job)
            }
            Err(e) => {
                self.flash.show(e.to_string());
                self.set_state(kind, ActionState::Idle);
                None
            }
        }
    }

    pub fn translate_clicked(&mut self) -> Option<Job> {
        self.clicked(ActionKind::Translate)
    }

    pub fn cleanup_clicked(&mut self) -> Option<Job> {
        self.clicked(ActionKind::Cleanup)
    }

    /// Apply a finished job. Success and failure both end in `Idle`.
    pub fn complete(&mut self, outcome: Outcome) {
        let Outcome { kind, result } = outcome;
        match result {
            Ok(text) => {
                self.set_state(kind, ActionState::Success);
                match kind {
                    ActionKind::Translate => {
                        tracing::info!(chars = text.len(), "translation received");
                        self.set_field(FormField::TranslatedText, text);
                    }
                    ActionKind::Cleanup => {
                        let html = cleanup::render_html(&text);
                        tracing::info!(chars = html.len(), "cleanup rendered");
                        self.form.cleaned_html = html;
                    }
                }
            }
            Err(e) => {
                self.set_state(kind, ActionState::Failed);
                tracing::warn!(?kind, error = %e, "action failed");
                self.flash.show(e.to_string());
            }
        }
        self.set_state(kind, ActionState::Idle);
    }

    /// Marks a job that could not be handed to the worker as failed.
    pub fn abandon(&mut self, kind: ActionKind, err: AppError) {
        self.complete(Outcome { kind, result: Err(err) });
    }
}
