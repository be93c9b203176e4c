use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use serde_json::json;
use tracing::{debug, error, info, warn};

use shared_config::AppConfig;
use shared_database::{eq, SupabaseClient};
use workflow_cell::models::{AppointmentData, BookingPayload, LocationData, PatientData, ProviderData};
use workflow_cell::services::{BookingFunctionClient, WorkflowDispatcher};

use crate::models::{
    AppointmentSlotWithDetails, BookAppointmentRequest, BookingConfirmation, BookingError,
    BookingStatus, BookingWithSlotDate, SlotStatus, ValidatedPatient,
};
use crate::services::patient::PatientService;
use crate::services::validation::validate_patient_form;

/// Days on either side of a new appointment in which another confirmed booking is refused.
pub const DUPLICATE_WINDOW_DAYS: i64 = 3;

const SLOT_WITH_DETAILS: &str = "*,provider:providers(id,name),location:locations(id,name)";
const BOOKING_WITH_SLOT_DATE: &str = "*,appointment_slot:appointment_slots(date)";

/// True when `existing` falls inside the inclusive ±3 day window around `requested`.
pub fn within_duplicate_window(existing: NaiveDate, requested: NaiveDate) -> bool {
    let start = requested - Duration::days(DUPLICATE_WINDOW_DAYS);
    let end = requested + Duration::days(DUPLICATE_WINDOW_DAYS);
    existing >= start && existing <= end
}

pub fn build_payload(patient: &ValidatedPatient, slot: &AppointmentSlotWithDetails) -> BookingPayload {
    BookingPayload {
        patient: PatientData {
            first_name: patient.first_name.clone(),
            last_name: patient.last_name.clone(),
            email: patient.email.clone(),
            phone: patient.phone.clone(),
            date_of_birth: patient.date_of_birth.format("%Y-%m-%d").to_string(),
            returning_patient: patient.returning_patient,
            gender: patient.sex.to_string(),
            referring_doctor: patient.referring_doctor.clone(),
            reason_for_visit: patient.reason_for_visit.clone(),
        },
        appointment: AppointmentData {
            date: slot.slot.date.format("%Y-%m-%d").to_string(),
            start_time: slot.slot.start_time.clone(),
            end_time: slot.slot.end_time.clone(),
            slot_id: slot.slot.id.clone(),
            location_id: slot.slot.location_id.clone(),
            provider_id: slot.slot.provider_id.clone(),
        },
        location: LocationData {
            id: slot.location.id.clone(),
            name: slot.location.name.clone(),
        },
        provider: ProviderData {
            id: slot.provider.id.clone(),
            name: slot.provider.name.clone(),
        },
    }
}

/// Runs a booking end to end: patient upsert, duplicate check, slot
/// reservation, workflow dispatch and booking record.
///
/// The steps are separate remote calls. A failed dispatch releases the slot
/// again; a process dying between reservation and the booking insert leaves a
/// booked slot with no booking row.
pub struct BookingService {
    supabase: Arc<SupabaseClient>,
    patient_service: PatientService,
    dispatcher: Arc<dyn WorkflowDispatcher>,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_dispatcher(config, Arc::new(BookingFunctionClient::new(config)))
    }

    pub fn with_dispatcher(config: &AppConfig, dispatcher: Arc<dyn WorkflowDispatcher>) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));

        Self {
            patient_service: PatientService::new(Arc::clone(&supabase)),
            supabase,
            dispatcher,
        }
    }

    pub async fn book(&self, request: BookAppointmentRequest) -> Result<BookingConfirmation, BookingError> {
        let patient = validate_patient_form(&request.patient, Utc::now().date_naive())?;

        let slot = self.get_slot(&request.slot_id).await?;
        if slot.slot.status != SlotStatus::Available {
            return Err(BookingError::SlotNotAvailable);
        }

        info!("Booking slot {} on {} at {}", slot.slot.id, slot.slot.date, slot.slot.start_time);

        // Step 1: find or create the patient
        let patient_record = self.patient_service
            .find_or_create(&patient)
            .await
            .map_err(|e| BookingError::Database(format!("Failed to resolve patient record: {}", e)))?;

        // Step 2: refuse a second confirmed booking near the same date
        self.ensure_no_nearby_booking(&patient_record.id, slot.slot.date).await?;

        // Step 3: reserve the slot
        self.set_slot_status(&slot.slot.id, SlotStatus::Booked)
            .await
            .map_err(|e| BookingError::Database(format!("Failed to update slot status: {}", e)))?;

        // Step 4: hand off to the workflow, releasing the slot if it fails
        let payload = build_payload(&patient, &slot);
        let workflow = match self.dispatcher.dispatch(&payload).await {
            Ok(response) => response,
            Err(e) => {
                error!("Workflow dispatch failed for slot {}: {}", slot.slot.id, e);
                self.release_slot(&slot.slot.id).await;
                return Err(e.into());
            }
        };

        // Step 5: record the booking; the workflow already owns it, so failures are only logged
        let booking_recorded = match self.record_booking(&patient_record.id, &slot.slot.id).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to create booking record for slot {}: {}", slot.slot.id, e);
                false
            }
        };

        info!(
            "Booking for slot {} accepted by workflow (process {:?}, state {:?})",
            slot.slot.id, workflow.process_id, workflow.state
        );

        Ok(BookingConfirmation {
            process_id: workflow.process_id,
            state: workflow.state,
            patient_id: patient_record.id,
            slot_id: slot.slot.id,
            booking_recorded,
        })
    }

    pub async fn get_slot(&self, slot_id: &str) -> Result<AppointmentSlotWithDetails, BookingError> {
        let query = format!("select={}&id={}", SLOT_WITH_DETAILS, eq(slot_id));

        let slots: Vec<AppointmentSlotWithDetails> = self.supabase
            .select("appointment_slots", &query)
            .await
            .map_err(|e| BookingError::Database(format!("Failed to load slot: {}", e)))?;

        slots.into_iter().next().ok_or(BookingError::SlotNotFound)
    }

    async fn ensure_no_nearby_booking(&self, patient_id: &str, date: NaiveDate) -> Result<(), BookingError> {
        let query = format!(
            "select={}&patient_id={}&status=eq.{}",
            BOOKING_WITH_SLOT_DATE,
            eq(patient_id),
            BookingStatus::Confirmed
        );

        let bookings: Vec<BookingWithSlotDate> = self.supabase
            .select("bookings", &query)
            .await
            .map_err(|e| BookingError::Database(format!("Failed to check existing bookings: {}", e)))?;

        let duplicate = bookings
            .iter()
            .filter_map(BookingWithSlotDate::slot_date)
            .any(|existing| within_duplicate_window(existing, date));

        if duplicate {
            info!("Patient {} already holds a confirmed booking near {}", patient_id, date);
            return Err(BookingError::DuplicateBooking);
        }

        Ok(())
    }

    async fn set_slot_status(&self, slot_id: &str, status: SlotStatus) -> anyhow::Result<()> {
        debug!("Setting slot {} to {}", slot_id, status);
        self.supabase
            .update(
                "appointment_slots",
                &format!("id={}", eq(slot_id)),
                json!({ "status": status }),
            )
            .await
    }

    async fn release_slot(&self, slot_id: &str) {
        if let Err(e) = self.set_slot_status(slot_id, SlotStatus::Available).await {
            error!("Failed to release slot {} after workflow failure: {}", slot_id, e);
        }
    }

    async fn record_booking(&self, patient_id: &str, slot_id: &str) -> anyhow::Result<()> {
        let rows = json!([{
            "patient_id": patient_id,
            "appointment_slot_id": slot_id,
            "status": BookingStatus::Confirmed,
        }]);

        let _: Vec<serde_json::Value> = self.supabase.insert("bookings", rows).await?;
        Ok(())
    }
}
