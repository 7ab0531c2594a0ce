use std::sync::Arc;

use chrono::NaiveDate;

use crate::errors::ApiError;
use crate::models::{HolidayKind, HolidayPeriod, TimeSlot};
use crate::services::backend::ServiceCenter;

pub const BOOKING_WINDOW_DAYS: i64 = 30;

/// Drop slots overlapping a partial holiday on `date`. Overlap is half-open,
/// so a slot ending exactly when a closure starts is kept. Order is preserved.
pub fn filter_slots(slots: &[TimeSlot], holidays: &[HolidayPeriod], date: NaiveDate) -> Vec<TimeSlot> {
    let closures: Vec<_> = holidays
        .iter()
        .filter(|h| h.date == date)
        .filter_map(|h| match h.kind() {
            HolidayKind::Partial { start, end } => Some((start, end)),
            HolidayKind::FullDay | HolidayKind::Inert => None,
        })
        .collect();

    slots
        .iter()
        .filter(|slot| {
            let blocked = closures
                .iter()
                .find(|(start, end)| slot.overlaps(*start, *end));
            if let Some((start, end)) = blocked {
                tracing::debug!(
                    slot = %slot.label(),
                    closure_start = %start,
                    closure_end = %end,
                    "slot removed by holiday"
                );
            }
            blocked.is_none()
        })
        .copied()
        .collect()
}

/// Whether a calendar date cannot be picked: in the past, beyond the booking
/// window, or closed for the whole day.
pub fn is_date_disabled(
    date: NaiveDate,
    today: NaiveDate,
    holidays: &[HolidayPeriod],
    window_days: i64,
) -> bool {
    if date < today || (date - today).num_days() > window_days {
        return true;
    }
    holidays
        .iter()
        .any(|h| h.date == date && h.kind() == HolidayKind::FullDay)
}

/// Candidate slots from the backend, re-filtered against cached holidays.
pub struct SlotEngine {
    backend: Arc<dyn ServiceCenter>,
    holidays: Option<Vec<HolidayPeriod>>,
    holidays_error: Option<String>,
}

impl SlotEngine {
    pub fn new(backend: Arc<dyn ServiceCenter>) -> Self {
        Self {
            backend,
            holidays: None,
            holidays_error: None,
        }
    }

    /// Holidays fetched so far; empty until a fetch succeeds.
    pub fn cached_holidays(&self) -> &[HolidayPeriod] {
        self.holidays.as_deref().unwrap_or_default()
    }

    pub fn holidays_loaded(&self) -> bool {
        self.holidays.is_some()
    }

    pub fn holidays_error(&self) -> Option<&str> {
        self.holidays_error.as_deref()
    }

    pub async fn refresh_holidays(&mut self) -> Result<(), ApiError> {
        match self.backend.holidays().await {
            Ok(holidays) => {
                tracing::debug!(count = holidays.len(), "holidays loaded");
                self.holidays = Some(holidays);
                self.holidays_error = None;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load holidays, treating as none");
                self.holidays_error = Some(format!("Failed to load holiday information: {e}"));
                Err(e)
            }
        }
    }

    /// Fetch holidays unless already cached. A failure leaves the cache empty
    /// so the next call tries again.
    pub async fn ensure_holidays(&mut self) -> &[HolidayPeriod] {
        if self.holidays.is_none() {
            let _ = self.refresh_holidays().await;
        }
        self.cached_holidays()
    }

    /// Unfiltered candidates. Missing inputs yield an empty list without a
    /// request.
    pub async fn candidate_slots(
        &self,
        date: Option<NaiveDate>,
        service_descriptions: &[String],
        make: &str,
        model: &str,
    ) -> Result<Vec<TimeSlot>, ApiError> {
        let Some(date) = date else {
            return Ok(vec![]);
        };
        if service_descriptions.is_empty() || make.trim().is_empty() || model.trim().is_empty() {
            tracing::debug!("slot query missing parameters");
            return Ok(vec![]);
        }

        let slots = self
            .backend
            .appointment_slots(date, service_descriptions, make.trim(), model.trim())
            .await?;
        tracing::debug!(date = %date, count = slots.len(), "candidate slots loaded");
        Ok(slots)
    }

    pub async fn available_slots(
        &mut self,
        date: Option<NaiveDate>,
        service_descriptions: &[String],
        make: &str,
        model: &str,
    ) -> Result<Vec<TimeSlot>, ApiError> {
        let candidates = self
            .candidate_slots(date, service_descriptions, make, model)
            .await?;
        let Some(date) = date else {
            return Ok(candidates);
        };
        if candidates.is_empty() {
            return Ok(candidates);
        }
        let holidays = self.ensure_holidays().await;
        Ok(filter_slots(&candidates, holidays, date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{d, slot, t, MockCenter};
    use reqwest::StatusCode;

    fn services() -> Vec<String> {
        vec!["Oil Change".to_string(), "Tire Rotation".to_string()]
    }

    #[test]
    fn test_no_holidays_returns_slots_unchanged() {
        let slots = vec![slot("09:00", "09:50"), slot("10:00", "10:50"), slot("11:00", "11:50")];
        assert_eq!(filter_slots(&slots, &[], d("2024-06-11")), slots);
    }

    #[test]
    fn test_partial_holiday_removes_overlap() {
        let holidays = vec![HolidayPeriod::partial(d("2024-06-11"), t("14:00"), t("15:00"))];
        let slots = vec![slot("13:30", "14:20"), slot("15:00", "15:50")];

        let visible = filter_slots(&slots, &holidays, d("2024-06-11"));
        assert_eq!(visible, vec![slot("15:00", "15:50")]);
    }

    #[test]
    fn test_abutting_slots_are_kept() {
        let holidays = vec![HolidayPeriod::partial(d("2024-06-11"), t("14:00"), t("15:00"))];
        let slots = vec![
            slot("13:10", "14:00"),
            slot("14:30", "14:45"),
            slot("13:00", "16:00"),
            slot("15:00", "15:50"),
        ];

        let visible = filter_slots(&slots, &holidays, d("2024-06-11"));
        assert_eq!(visible, vec![slot("13:10", "14:00"), slot("15:00", "15:50")]);
    }

    #[test]
    fn test_holiday_on_other_date_ignored() {
        let holidays = vec![HolidayPeriod::partial(d("2024-06-12"), t("14:00"), t("15:00"))];
        let slots = vec![slot("13:30", "14:20")];
        assert_eq!(filter_slots(&slots, &holidays, d("2024-06-11")), slots);
    }

    #[test]
    fn test_full_day_and_inert_do_not_filter_slots() {
        let mut lone = HolidayPeriod::full_day(d("2024-06-11"));
        lone.start_time = Some(t("14:00"));
        let holidays = vec![HolidayPeriod::full_day(d("2024-06-11")), lone];
        let slots = vec![slot("14:00", "14:50")];
        assert_eq!(filter_slots(&slots, &holidays, d("2024-06-11")), slots);
    }

    #[test]
    fn test_date_disabled_window() {
        let today = d("2024-06-01");
        assert!(is_date_disabled(d("2024-05-31"), today, &[], BOOKING_WINDOW_DAYS));
        assert!(!is_date_disabled(d("2024-06-01"), today, &[], BOOKING_WINDOW_DAYS));
        assert!(!is_date_disabled(d("2024-07-01"), today, &[], BOOKING_WINDOW_DAYS));
        assert!(is_date_disabled(d("2024-07-02"), today, &[], BOOKING_WINDOW_DAYS));
    }

    #[test]
    fn test_full_day_holiday_disables_date() {
        let today = d("2024-06-01");
        let holidays = vec![
            HolidayPeriod::full_day(d("2024-06-10")),
            HolidayPeriod::partial(d("2024-06-11"), t("14:00"), t("15:00")),
        ];
        assert!(is_date_disabled(d("2024-06-10"), today, &holidays, BOOKING_WINDOW_DAYS));
        assert!(!is_date_disabled(d("2024-06-11"), today, &holidays, BOOKING_WINDOW_DAYS));
    }

    #[test]
    fn test_lone_boundary_does_not_disable_date() {
        let today = d("2024-06-01");
        let mut lone = HolidayPeriod::full_day(d("2024-06-12"));
        lone.end_time = Some(t("12:00"));
        assert!(!is_date_disabled(d("2024-06-12"), today, &[lone], BOOKING_WINDOW_DAYS));
    }

    #[tokio::test]
    async fn test_missing_parameters_skip_request() {
        let center = MockCenter::default().with_slots(vec![slot("09:00", "09:50")]);
        let mut engine = SlotEngine::new(Arc::new(center.clone()));

        assert!(engine
            .available_slots(None, &services(), "Toyota", "Yaris")
            .await
            .unwrap()
            .is_empty());
        assert!(engine
            .available_slots(Some(d("2024-06-11")), &[], "Toyota", "Yaris")
            .await
            .unwrap()
            .is_empty());
        assert!(engine
            .available_slots(Some(d("2024-06-11")), &services(), "", "Yaris")
            .await
            .unwrap()
            .is_empty());
        assert_eq!(center.calls("appointment_slots"), 0);
    }

    #[tokio::test]
    async fn test_available_slots_filters_and_caches_holidays() {
        let center = MockCenter::default()
            .with_slots(vec![slot("13:30", "14:20"), slot("15:00", "15:50")])
            .with_holidays(vec![HolidayPeriod::partial(d("2024-06-11"), t("14:00"), t("15:00"))]);
        let mut engine = SlotEngine::new(Arc::new(center.clone()));

        let slots = engine
            .available_slots(Some(d("2024-06-11")), &services(), "Toyota", "Yaris")
            .await
            .unwrap();
        assert_eq!(slots, vec![slot("15:00", "15:50")]);

        engine
            .available_slots(Some(d("2024-06-11")), &services(), "Toyota", "Yaris")
            .await
            .unwrap();
        assert_eq!(center.calls("holidays"), 1);
        assert_eq!(center.calls("appointment_slots"), 2);
    }

    #[tokio::test]
    async fn test_holiday_failure_treated_as_none() {
        let center = MockCenter::default()
            .with_slots(vec![slot("13:30", "14:20")])
            .fail_holidays(StatusCode::INTERNAL_SERVER_ERROR);
        let mut engine = SlotEngine::new(Arc::new(center));

        let slots = engine
            .available_slots(Some(d("2024-06-11")), &services(), "Toyota", "Yaris")
            .await
            .unwrap();
        assert_eq!(slots.len(), 1);
        assert!(engine.holidays_error().is_some());
    }

    #[tokio::test]
    async fn test_slot_error_propagates() {
        let center = MockCenter::default();
        center.fail_slots(Some((StatusCode::BAD_REQUEST, "Invalid service".to_string())));
        let mut engine = SlotEngine::new(Arc::new(center));

        let err = engine
            .available_slots(Some(d("2024-06-11")), &services(), "Toyota", "Yaris")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid service");
    }
}
