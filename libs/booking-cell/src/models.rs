use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;

use workflow_cell::models::WorkflowError;

// ==============================================================================
// DIRECTORY MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Provider {
    pub id: String,
    pub name: String,
    pub location_id: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// `{id, name}` projection embedded in slot queries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamedRef {
    pub id: String,
    pub name: String,
}

// ==============================================================================
// SLOT MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Available,
    Booked,
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotStatus::Available => write!(f, "available"),
            SlotStatus::Booked => write!(f, "booked"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppointmentSlot {
    pub id: String,
    pub location_id: String,
    pub provider_id: String,
    pub date: NaiveDate,
    /// 12-hour clock, e.g. "9:30 AM".
    pub start_time: String,
    pub end_time: String,
    pub status: SlotStatus,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppointmentSlotWithDetails {
    #[serde(flatten)]
    pub slot: AppointmentSlot,
    pub provider: NamedRef,
    pub location: NamedRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotsByPeriod {
    pub am: Vec<AppointmentSlotWithDetails>,
    pub pm: Vec<AppointmentSlotWithDetails>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlotQuery {
    pub date: NaiveDate,
    pub location_id: String,
    pub provider_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailableDatesQuery {
    pub location_id: String,
    pub provider_id: Option<String>,
}

/// "First available" is expressed by omitting the provider, sending an empty
/// value, or sending the literal `first-available`.
pub fn provider_filter(provider_id: Option<&str>) -> Option<&str> {
    provider_id
        .map(str::trim)
        .filter(|id| !id.is_empty() && *id != "first-available")
}

// ==============================================================================
// PATIENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Male => write!(f, "male"),
            Sex::Female => write!(f, "female"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    pub id: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub contact: Option<String>,
    #[serde(default)]
    pub returning_patient: bool,
    pub sex: Option<Sex>,
    pub date_of_birth: Option<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Intake form as submitted by the patient.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PatientFormData {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub returning_patient: bool,
    #[serde(default)]
    pub sex: String,
    #[serde(default)]
    pub referring_doctor: String,
    #[serde(default)]
    pub reason_for_visit: Option<String>,
}

/// Intake form after validation: phone normalized, date and sex parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedPatient {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub email: String,
    pub phone: String,
    pub returning_patient: bool,
    pub sex: Sex,
    pub referring_doctor: String,
    pub reason_for_visit: String,
}

// ==============================================================================
// BOOKING MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Confirmed => write!(f, "confirmed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: String,
    pub patient_id: String,
    pub appointment_slot_id: String,
    pub status: BookingStatus,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotDate {
    pub date: Option<NaiveDate>,
}

/// Booking row with the embedded date of its slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingWithSlotDate {
    #[serde(flatten)]
    pub booking: Booking,
    pub appointment_slot: Option<SlotDate>,
}

impl BookingWithSlotDate {
    pub fn slot_date(&self) -> Option<NaiveDate> {
        self.appointment_slot.as_ref().and_then(|s| s.date)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointmentRequest {
    pub patient: PatientFormData,
    pub slot_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmation {
    pub process_id: Option<i64>,
    pub state: Option<String>,
    pub patient_id: String,
    pub slot_id: String,
    /// False when the workflow accepted the booking but the local record could not be written.
    pub booking_recorded: bool,
}

// ==============================================================================
// ERRORS
// ==============================================================================

pub const DUPLICATE_BOOKING_MESSAGE: &str =
    "You already have a confirmed booking within 3 days. Please contact us if you need to book another appointment.";

pub const BOOKING_TIMEOUT_MESSAGE: &str = "Booking request timed out. Please try again.";

#[derive(Debug, Clone, thiserror::Error)]
pub enum BookingError {
    #[error("{}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Appointment slot not found")]
    SlotNotFound,

    #[error("Appointment slot is no longer available")]
    SlotNotAvailable,

    #[error("{}", DUPLICATE_BOOKING_MESSAGE)]
    DuplicateBooking,

    #[error("Database error: {0}")]
    Database(String),

    #[error(transparent)]
    Workflow(#[from] WorkflowError),
}
