use chrono::NaiveDate;
use regex::Regex;

use crate::models::{BookingError, PatientFormData, Sex, ValidatedPatient};

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const PHONE_PATTERN: &str = r"^\d{3}-\d{3}-\d{4}$";

/// Strip everything but digits and format the first ten as `XXX-XXX-XXXX`.
/// Shorter inputs come back as bare digits.
pub fn format_phone_number(phone: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();

    if digits.len() >= 10 {
        format!("{}-{}-{}", &digits[0..3], &digits[3..6], &digits[6..10])
    } else {
        digits
    }
}

fn matches(pattern: &str, value: &str) -> bool {
    Regex::new(pattern)
        .map(|re| re.is_match(value))
        .unwrap_or(false)
}

/// Check the intake form and normalize it. Every failing field is reported.
pub fn validate_patient_form(
    form: &PatientFormData,
    today: NaiveDate,
) -> Result<ValidatedPatient, BookingError> {
    let mut errors = Vec::new();

    if form.first_name.trim().is_empty() {
        errors.push("First name is required".to_string());
    }

    if form.last_name.trim().is_empty() {
        errors.push("Last name is required".to_string());
    }

    let date_of_birth = if form.date_of_birth.trim().is_empty() {
        errors.push("Date of birth is required".to_string());
        None
    } else {
        match NaiveDate::parse_from_str(form.date_of_birth.trim(), "%Y-%m-%d") {
            Ok(dob) if dob > today => {
                errors.push("Date of birth cannot be in the future".to_string());
                None
            }
            Ok(dob) => Some(dob),
            Err(_) => {
                errors.push("Date of birth must be formatted YYYY-MM-DD".to_string());
                None
            }
        }
    };

    let email = form.email.trim();
    if email.is_empty() {
        errors.push("Email is required".to_string());
    } else if !matches(EMAIL_PATTERN, email) {
        errors.push("Please enter a valid email address".to_string());
    }

    let phone = format_phone_number(&form.phone);
    if form.phone.trim().is_empty() {
        errors.push("Phone number is required".to_string());
    } else if !matches(PHONE_PATTERN, &phone) {
        errors.push("Please enter a valid phone number (XXX-XXX-XXXX)".to_string());
    }

    let sex = match form.sex.trim().to_ascii_lowercase().as_str() {
        "male" => Some(Sex::Male),
        "female" => Some(Sex::Female),
        _ => {
            errors.push("Please select your gender".to_string());
            None
        }
    };

    if form.referring_doctor.trim().is_empty() {
        errors.push("Referring doctor is required".to_string());
    }

    match (date_of_birth, sex) {
        (Some(date_of_birth), Some(sex)) if errors.is_empty() => Ok(ValidatedPatient {
            first_name: form.first_name.trim().to_string(),
            last_name: form.last_name.trim().to_string(),
            date_of_birth,
            email: email.to_string(),
            phone,
            returning_patient: form.returning_patient,
            sex,
            referring_doctor: form.referring_doctor.trim().to_string(),
            reason_for_visit: form
                .reason_for_visit
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
        }),
        _ => Err(BookingError::Validation(errors)),
    }
}
