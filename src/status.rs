/// Appointment status transitions.
///
/// Any status may be selected from any other; the backend decides which
/// transitions are legal. What the client guarantees is that every status
/// change travels together with its derived `attended` flag.

use crate::error::ApiError;
use crate::gateway::Gateway;
use crate::models::{Appointment, AppointmentStatus, Id};
use serde::Serialize;
use tracing::info;

/// Attendance implied by moving to `next`.
///
/// COMPLETED means the patient came, CANCELLED and NO_SHOW mean they did
/// not, and the remaining states leave the current flag as it was.
pub fn attended_for(next: AppointmentStatus, current_attended: bool) -> bool {
    match next {
        AppointmentStatus::Completed => true,
        AppointmentStatus::Cancelled | AppointmentStatus::NoShow => false,
        AppointmentStatus::Scheduled | AppointmentStatus::Confirmed => current_attended,
    }
}

/// Body of `PATCH /appointments/{id}/status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusUpdate {
    status: AppointmentStatus,
    attended: bool,
}

impl StatusUpdate {
    pub fn for_transition(next: AppointmentStatus, current_attended: bool) -> Self {
        StatusUpdate {
            status: next,
            attended: attended_for(next, current_attended),
        }
    }

    pub fn status(&self) -> AppointmentStatus {
        self.status
    }

    pub fn attended(&self) -> bool {
        self.attended
    }
}

/// A planned transition, remembering what was displayed before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub appointment_id: Id,
    pub previous_status: AppointmentStatus,
    pub previous_attended: bool,
    pub update: StatusUpdate,
}

impl StatusChange {
    pub fn plan(appointment: &Appointment, next: AppointmentStatus) -> Self {
        StatusChange {
            appointment_id: appointment.id,
            previous_status: appointment.status,
            previous_attended: appointment.attended,
            update: StatusUpdate::for_transition(next, appointment.attended),
        }
    }

    pub async fn submit(&self, gateway: &Gateway) -> Result<Appointment, ApiError> {
        info!(
            appointment = %self.appointment_id,
            from = self.previous_status.name(),
            to = self.update.status().name(),
            attended = self.update.attended(),
            "updating appointment status"
        );
        gateway
            .update_appointment_status(self.appointment_id, &self.update)
            .await
    }

    /// Show the planned status on `appointment` while the update is pending.
    pub fn apply_display(&self, appointment: &mut Appointment) {
        appointment.status = self.update.status();
        appointment.attended = self.update.attended();
    }

    /// Put back what was displayed before the rejected update.
    pub fn restore_display(&self, appointment: &mut Appointment) {
        appointment.status = self.previous_status;
        appointment.attended = self.previous_attended;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn appointment(status: AppointmentStatus, attended: bool) -> Appointment {
        let day = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        Appointment {
            id: Id::new(3).unwrap(),
            patient_id: Id::new(1).unwrap(),
            doctor_id: Id::new(2).unwrap(),
            start_at: day.and_hms_opt(9, 0, 0).unwrap(),
            end_at: day.and_hms_opt(9, 30, 0).unwrap(),
            status,
            attended,
            notes: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn attendance_follows_the_target_status() {
        for current in [true, false] {
            assert!(attended_for(AppointmentStatus::Completed, current));
            assert!(!attended_for(AppointmentStatus::Cancelled, current));
            assert!(!attended_for(AppointmentStatus::NoShow, current));
            assert_eq!(attended_for(AppointmentStatus::Scheduled, current), current);
            assert_eq!(attended_for(AppointmentStatus::Confirmed, current), current);
        }
    }

    #[test]
    fn plan_keeps_previous_display_for_restore() {
        let mut shown = appointment(AppointmentStatus::Completed, true);
        let change = StatusChange::plan(&shown, AppointmentStatus::NoShow);

        change.apply_display(&mut shown);
        assert_eq!((shown.status, shown.attended), (AppointmentStatus::NoShow, false));

        change.restore_display(&mut shown);
        assert_eq!((shown.status, shown.attended), (AppointmentStatus::Completed, true));
    }

    #[test]
    fn update_serializes_status_with_attended() {
        let update = StatusUpdate::for_transition(AppointmentStatus::Confirmed, true);
        assert_eq!(
            serde_json::to_value(update).unwrap(),
            serde_json::json!({"status": "CONFIRMED", "attended": true})
        );
    }
}
