/// Create/edit form handling shared by every screen.
///
/// A screen owns one [`FormController`] per modal. The controller tracks the
/// mode, the field state, and whether a submit is already outstanding.

use crate::error::ApiError;
use crate::gateway::{Gateway, Resource};
use crate::models::Id;
use tracing::{debug, info, warn};

/// Field state for one entity's modal form.
pub trait EntityForm: Clone + Default + Send + Sync {
    type Entity: Resource;

    /// Seed the fields from an existing record, converted to input format.
    fn from_entity(entity: &Self::Entity) -> Self;

    /// Required fields and cross-field rules.
    fn validate(&self) -> Result<(), String>;

    /// Convert the fields into a write payload.
    fn payload(&self) -> Result<<Self::Entity as Resource>::Payload, String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(Id),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome<R> {
    Saved(R),
    /// Blocked locally; no request was sent.
    Invalid(String),
    /// Backend or transport failure; the modal stays open.
    Failed(String),
    /// A previous submit for this form is still outstanding.
    Busy,
    NotOpen,
}

impl<R> SubmitOutcome<R> {
    pub fn is_saved(&self) -> bool {
        matches!(self, SubmitOutcome::Saved(_))
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            SubmitOutcome::Invalid(message) | SubmitOutcome::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// A validated write waiting to be sent.
pub struct PendingSubmit<R: Resource> {
    mode: FormMode,
    payload: R::Payload,
}

impl<R: Resource> PendingSubmit<R> {
    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn payload(&self) -> &R::Payload {
        &self.payload
    }

    pub async fn send(&self, gateway: &Gateway) -> Result<R, ApiError> {
        match self.mode {
            FormMode::Create => gateway.create::<R>(&self.payload).await,
            FormMode::Edit(id) => gateway.replace::<R>(id, &self.payload).await,
        }
    }
}

pub struct FormController<F: EntityForm> {
    mode: Option<FormMode>,
    fields: F,
    in_flight: bool,
    error: Option<String>,
    fallback: &'static str,
}

impl<F: EntityForm> FormController<F> {
    /// `fallback` is shown when a save fails without backend detail.
    pub fn new(fallback: &'static str) -> Self {
        FormController {
            mode: None,
            fields: F::default(),
            in_flight: false,
            error: None,
            fallback,
        }
    }

    pub fn is_open(&self) -> bool {
        self.mode.is_some()
    }

    pub fn mode(&self) -> Option<FormMode> {
        self.mode
    }

    pub fn fields(&self) -> &F {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut F {
        &mut self.fields
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight
    }

    pub fn open_create(&mut self) {
        self.open_create_with(F::default());
    }

    /// Open in create mode with a screen-specific template.
    pub fn open_create_with(&mut self, template: F) {
        self.mode = Some(FormMode::Create);
        self.fields = template;
        self.error = None;
    }

    pub fn open_edit(&mut self, entity: &F::Entity) {
        self.mode = Some(FormMode::Edit(entity.id()));
        self.fields = F::from_entity(entity);
        self.error = None;
    }

    pub fn close(&mut self) {
        self.mode = None;
        self.fields = F::default();
        self.error = None;
    }

    /// Validate locally and claim the in-flight slot.
    pub fn begin_submit(&mut self) -> Result<PendingSubmit<F::Entity>, SubmitOutcome<F::Entity>> {
        let Some(mode) = self.mode else {
            return Err(SubmitOutcome::NotOpen);
        };
        if self.in_flight {
            debug!(resource = <F::Entity as Resource>::NAME, "submit ignored, previous one pending");
            return Err(SubmitOutcome::Busy);
        }

        let payload = match self.fields.validate().and_then(|_| self.fields.payload()) {
            Ok(payload) => payload,
            Err(message) => {
                self.error = Some(message.clone());
                return Err(SubmitOutcome::Invalid(message));
            }
        };

        self.in_flight = true;
        self.error = None;
        Ok(PendingSubmit { mode, payload })
    }

    /// Record the outcome of a submit started with [`begin_submit`](Self::begin_submit).
    pub fn finish_submit(&mut self, result: Result<F::Entity, ApiError>) -> SubmitOutcome<F::Entity> {
        self.in_flight = false;
        match result {
            Ok(saved) => {
                info!(resource = <F::Entity as Resource>::NAME, id = %saved.id(), "saved");
                self.close();
                SubmitOutcome::Saved(saved)
            }
            Err(err) => {
                warn!(resource = <F::Entity as Resource>::NAME, "save failed: {}", err);
                let message = err.user_message(self.fallback);
                if self.is_open() {
                    self.error = Some(message.clone());
                }
                SubmitOutcome::Failed(message)
            }
        }
    }

    pub async fn submit(&mut self, gateway: &Gateway) -> SubmitOutcome<F::Entity> {
        let pending = match self.begin_submit() {
            Ok(pending) => pending,
            Err(outcome) => return outcome,
        };
        let result = pending.send(gateway).await;
        self.finish_submit(result)
    }
}

/// Asks the user to acknowledge a destructive action.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Declined,
    Failed(String),
}

/// Delete `id` only after `confirm` agrees to `prompt`.
pub async fn delete_confirmed<R: Resource>(
    gateway: &Gateway,
    id: Id,
    prompt: &str,
    confirm: &mut dyn Confirm,
    fallback: &str,
) -> DeleteOutcome {
    if !confirm.confirm(prompt) {
        debug!(resource = R::NAME, %id, "delete declined");
        return DeleteOutcome::Declined;
    }
    match gateway.delete::<R>(id).await {
        Ok(()) => {
            info!(resource = R::NAME, %id, "deleted");
            DeleteOutcome::Deleted
        }
        Err(err) => {
            warn!(resource = R::NAME, %id, "delete failed: {}", err);
            DeleteOutcome::Failed(err.user_message(fallback))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity_forms::SpecialtyForm;
    use crate::error::ErrorDetail;
    use crate::models::Specialty;

    fn specialty() -> Specialty {
        Specialty {
            id: Id::new(3).unwrap(),
            name: "Pediatría".into(),
            description: None,
        }
    }

    #[test]
    fn second_submit_while_pending_is_ignored() {
        let mut form: FormController<SpecialtyForm> = FormController::new("Error al guardar");
        form.open_create();
        form.fields_mut().name = "Dermatología".into();

        let pending = form.begin_submit().ok().unwrap();
        assert_eq!(pending.mode(), FormMode::Create);
        assert!(matches!(form.begin_submit(), Err(SubmitOutcome::Busy)));

        assert!(form.finish_submit(Ok(specialty())).is_saved());
        assert!(!form.is_open());
        assert!(!form.is_submitting());
    }

    #[test]
    fn invalid_fields_never_claim_the_slot() {
        let mut form: FormController<SpecialtyForm> = FormController::new("Error al guardar");
        form.open_create();

        let outcome = form.begin_submit().err().unwrap();

        assert_eq!(outcome.message(), Some("El campo nombre es obligatorio."));
        assert_eq!(form.error(), Some("El campo nombre es obligatorio."));
        assert!(!form.is_submitting());
    }

    #[test]
    fn failure_keeps_fields_and_shows_fallback() {
        let mut form: FormController<SpecialtyForm> = FormController::new("Error al guardar");
        form.open_edit(&specialty());
        assert_eq!(form.mode(), Some(FormMode::Edit(Id::new(3).unwrap())));

        let _pending = form.begin_submit().ok().unwrap();
        let outcome = form.finish_submit(Err(ApiError::Status {
            status: 500,
            detail: ErrorDetail::Empty,
        }));

        assert_eq!(outcome, SubmitOutcome::Failed("Error al guardar".into()));
        assert!(form.is_open());
        assert_eq!(form.fields().name, "Pediatría");
        assert_eq!(form.error(), Some("Error al guardar"));
    }

    #[test]
    fn closed_form_has_nothing_to_submit() {
        let mut form: FormController<SpecialtyForm> = FormController::new("Error al guardar");
        assert!(matches!(form.begin_submit(), Err(SubmitOutcome::NotOpen)));

        form.open_create();
        form.close();
        assert_eq!(form.fields(), &SpecialtyForm::default());
    }
}
