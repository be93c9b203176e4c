use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};

use anyhow::Result;
use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::Deserialize;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::{eq, SupabaseClient};

use crate::models::{provider_filter, AppointmentSlotWithDetails, SlotStatus, SlotsByPeriod};

const SLOT_WITH_DETAILS: &str = "*,provider:providers(id,name),location:locations(id,name)";
const NOON_MINUTES: u32 = 12 * 60;

/// Minutes since midnight for a slot time such as "9:30 AM" or "12:15 PM".
///
/// 24-hour values ("14:00", "14:00:00") are accepted as a fallback.
pub fn parse_time_of_day(time: &str) -> Option<u32> {
    let time = time.trim();

    ["%I:%M %p", "%I:%M%p", "%H:%M:%S", "%H:%M"]
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(time, format).ok())
        .map(|t| t.hour() * 60 + t.minute())
}

/// Time of day ascending, then provider name. Unparseable times go last.
pub fn compare_slots(a: &AppointmentSlotWithDetails, b: &AppointmentSlotWithDetails) -> Ordering {
    let minutes_a = parse_time_of_day(&a.slot.start_time).unwrap_or(u32::MAX);
    let minutes_b = parse_time_of_day(&b.slot.start_time).unwrap_or(u32::MAX);

    minutes_a
        .cmp(&minutes_b)
        .then_with(|| a.provider.name.cmp(&b.provider.name))
}

/// Sort slots and, when no provider was chosen, keep only each provider's earliest slot.
pub fn arrange_slots(
    mut slots: Vec<AppointmentSlotWithDetails>,
    first_available: bool,
) -> Vec<AppointmentSlotWithDetails> {
    slots.sort_by(compare_slots);

    if !first_available {
        return slots;
    }

    let mut seen = HashSet::new();
    slots
        .into_iter()
        .filter(|slot| seen.insert(slot.slot.provider_id.clone()))
        .collect()
}

pub fn group_by_period(slots: &[AppointmentSlotWithDetails]) -> SlotsByPeriod {
    let (am, pm) = slots.iter().cloned().partition(|slot| {
        parse_time_of_day(&slot.slot.start_time)
            .map(|minutes| minutes < NOON_MINUTES)
            .unwrap_or(false)
    });

    SlotsByPeriod { am, pm }
}

#[derive(Debug, Deserialize)]
struct DateRow {
    date: NaiveDate,
}

pub struct AvailabilityService {
    supabase: SupabaseClient,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Open slots for a date at a location, optionally restricted to one provider.
    pub async fn available_slots(
        &self,
        date: NaiveDate,
        location_id: &str,
        provider_id: Option<&str>,
    ) -> Result<Vec<AppointmentSlotWithDetails>> {
        let provider_id = provider_filter(provider_id);
        debug!(
            "Fetching available slots for {} at location {} (provider: {:?})",
            date, location_id, provider_id
        );

        let mut query = format!(
            "select={}&date=eq.{}&location_id={}&status=eq.{}",
            SLOT_WITH_DETAILS,
            date.format("%Y-%m-%d"),
            eq(location_id),
            SlotStatus::Available
        );
        if let Some(provider_id) = provider_id {
            query.push_str(&format!("&provider_id={}", eq(provider_id)));
        }

        let slots: Vec<AppointmentSlotWithDetails> =
            self.supabase.select("appointment_slots", &query).await?;

        debug!("Found {} open slots before arrangement", slots.len());
        Ok(arrange_slots(slots, provider_id.is_none()))
    }

    /// Distinct dates that still have at least one open slot, ascending.
    pub async fn available_dates(
        &self,
        location_id: &str,
        provider_id: Option<&str>,
    ) -> Result<Vec<NaiveDate>> {
        let mut query = format!(
            "select=date&status=eq.{}&location_id={}",
            SlotStatus::Available,
            eq(location_id)
        );
        if let Some(provider_id) = provider_filter(provider_id) {
            query.push_str(&format!("&provider_id={}", eq(provider_id)));
        }

        let rows: Vec<DateRow> = self.supabase.select("appointment_slots", &query).await?;

        let dates: BTreeSet<NaiveDate> = rows.into_iter().map(|row| row.date).collect();
        Ok(dates.into_iter().collect())
    }
}
