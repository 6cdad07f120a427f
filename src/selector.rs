/// Cascading selection: a child collection derived from a selected parent.
///
/// Each selection change issues a [`ChildRequest`] stamped with a generation.
/// Only the outcome of the request matching the current generation may touch
/// the child collection; anything older is discarded.

use crate::error::ApiError;
use crate::gateway::Gateway;
use crate::models::{Id, MedicalRecord, Prescription, WorkingHour};
use async_trait::async_trait;
use tracing::debug;

/// How a child collection is fetched for one parent.
#[async_trait]
pub trait ChildSource: Send + Sync {
    type Child: Send;

    async fn load(&self, gateway: &Gateway, parent: Id) -> Result<Vec<Self::Child>, ApiError>;
}

/// Working hours of a doctor.
pub struct HoursOfDoctor;

#[async_trait]
impl ChildSource for HoursOfDoctor {
    type Child = WorkingHour;

    async fn load(&self, gateway: &Gateway, doctor_id: Id) -> Result<Vec<WorkingHour>, ApiError> {
        gateway.working_hours_by_doctor(doctor_id).await
    }
}

/// Medical records of a patient.
pub struct RecordsOfPatient;

#[async_trait]
impl ChildSource for RecordsOfPatient {
    type Child = MedicalRecord;

    async fn load(&self, gateway: &Gateway, patient_id: Id) -> Result<Vec<MedicalRecord>, ApiError> {
        gateway.medical_records_by_patient(patient_id).await
    }
}

/// Prescriptions issued under a medical record.
pub struct PrescriptionsOfRecord;

#[async_trait]
impl ChildSource for PrescriptionsOfRecord {
    type Child = Prescription;

    async fn load(&self, gateway: &Gateway, record_id: Id) -> Result<Vec<Prescription>, ApiError> {
        gateway.prescriptions_by_record(record_id).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChildRequest {
    parent: Id,
    generation: u64,
}

impl ChildRequest {
    pub fn parent(&self) -> Id {
        self.parent
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Children replaced with the loaded collection.
    Applied,
    /// Parent no longer exists; children are empty.
    NotFound,
    /// Load failed; message recorded, children left as they were.
    Failed,
    /// A newer selection was made; outcome ignored.
    Stale,
    /// No parent selected; children are empty and nothing was loaded.
    Cleared,
}

pub struct CascadingSelector<S: ChildSource> {
    source: S,
    selected: Option<Id>,
    generation: u64,
    children: Vec<S::Child>,
    loading: bool,
    error: Option<String>,
    fallback: &'static str,
}

impl<S: ChildSource> CascadingSelector<S> {
    pub fn new(source: S, fallback: &'static str) -> Self {
        CascadingSelector {
            source,
            selected: None,
            generation: 0,
            children: Vec::new(),
            loading: false,
            error: None,
            fallback,
        }
    }

    pub fn selected(&self) -> Option<Id> {
        self.selected
    }

    pub fn children(&self) -> &[S::Child] {
        &self.children
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Make `parent` the current selection and start its child load.
    ///
    /// Switching to a different parent drops the old children immediately.
    /// Re-selecting the same parent keeps them until the new outcome lands.
    /// With no parent there is nothing to load and `None` is returned.
    pub fn select(&mut self, parent: Option<Id>) -> Option<ChildRequest> {
        self.generation += 1;
        if self.selected != parent {
            self.children.clear();
        }
        self.selected = parent;
        self.error = None;

        match parent {
            Some(parent) => {
                self.loading = true;
                Some(ChildRequest {
                    parent,
                    generation: self.generation,
                })
            }
            None => {
                self.children.clear();
                self.loading = false;
                None
            }
        }
    }

    pub fn is_current(&self, request: &ChildRequest) -> bool {
        request.generation == self.generation
    }

    pub fn resolve(
        &mut self,
        request: ChildRequest,
        outcome: Result<Vec<S::Child>, ApiError>,
    ) -> Resolution {
        if !self.is_current(&request) {
            debug!(
                parent = %request.parent,
                current = ?self.selected,
                "discarding stale child load"
            );
            return Resolution::Stale;
        }

        self.loading = false;
        match outcome {
            Ok(children) => {
                self.children = children;
                Resolution::Applied
            }
            Err(err) if err.is_not_found() => {
                self.children.clear();
                Resolution::NotFound
            }
            Err(err) => {
                debug!(parent = %request.parent, "child load failed: {}", err);
                self.error = Some(err.user_message(self.fallback));
                Resolution::Failed
            }
        }
    }

    /// Select `parent` and load its children through the gateway.
    pub async fn change(&mut self, gateway: &Gateway, parent: Option<Id>) -> Resolution {
        let Some(request) = self.select(parent) else {
            return Resolution::Cleared;
        };
        let outcome = self.source.load(gateway, request.parent).await;
        self.resolve(request, outcome)
    }

    /// Refetch the children of the current selection.
    pub async fn reload(&mut self, gateway: &Gateway) -> Resolution {
        self.change(gateway, self.selected).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorDetail;

    struct Numbers;

    #[async_trait]
    impl ChildSource for Numbers {
        type Child = u32;

        async fn load(&self, _gateway: &Gateway, _parent: Id) -> Result<Vec<u32>, ApiError> {
            unreachable!("tests resolve requests by hand")
        }
    }

    fn id(n: u64) -> Option<Id> {
        Id::new(n)
    }

    #[test]
    fn late_response_for_an_old_parent_is_discarded() {
        let mut selector = CascadingSelector::new(Numbers, "Error");
        let first = selector.select(id(1)).unwrap();
        let second = selector.select(id(2)).unwrap();

        assert_eq!(selector.resolve(second, Ok(vec![20, 21])), Resolution::Applied);
        assert_eq!(selector.resolve(first, Ok(vec![10])), Resolution::Stale);

        assert_eq!(selector.selected(), id(2));
        assert_eq!(selector.children(), &[20, 21]);
        assert!(!selector.is_loading());
    }

    #[test]
    fn empty_result_of_an_old_parent_cannot_blank_the_new_one() {
        let mut selector = CascadingSelector::new(Numbers, "Error");
        let patient_a = selector.select(id(1)).unwrap();
        let patient_b = selector.select(id(2)).unwrap();

        selector.resolve(patient_b, Ok(vec![7]));
        selector.resolve(patient_a, Ok(Vec::new()));

        assert_eq!(selector.children(), &[7]);
    }

    #[test]
    fn no_parent_means_no_request_and_no_children() {
        let mut selector = CascadingSelector::new(Numbers, "Error");
        let request = selector.select(id(1)).unwrap();
        selector.resolve(request, Ok(vec![1, 2]));

        assert!(selector.select(None).is_none());
        assert!(selector.children().is_empty());
        assert!(!selector.is_loading());
    }

    #[test]
    fn not_found_resolves_to_empty_without_error() {
        let mut selector = CascadingSelector::new(Numbers, "Error");
        let request = selector.select(id(5)).unwrap();
        let outcome = Err(ApiError::Status {
            status: 404,
            detail: ErrorDetail::Message("Paciente no encontrado".into()),
        });

        assert_eq!(selector.resolve(request, outcome), Resolution::NotFound);
        assert!(selector.children().is_empty());
        assert_eq!(selector.error(), None);
    }

    #[test]
    fn failed_reload_keeps_last_known_children() {
        let mut selector = CascadingSelector::new(Numbers, "Error cargando");
        let request = selector.select(id(3)).unwrap();
        selector.resolve(request, Ok(vec![30]));

        let retry = selector.select(id(3)).unwrap();
        let outcome = Err(ApiError::Connection("reset".into()));

        assert_eq!(selector.resolve(retry, outcome), Resolution::Failed);
        assert_eq!(selector.children(), &[30]);
        assert_eq!(selector.error(), Some(crate::error::CONNECTION_ERROR));
    }
}
