use std::sync::Arc;

use crate::api::{ApiClient, RequestOptions};
use crate::errors::AppError;
use crate::models::{HolidayPeriod, Role};
use crate::services::session::SessionStore;

/// Reject holidays the booking calendar cannot interpret: exactly one
/// boundary set, or a window that does not move forward.
pub fn validate_holiday(holiday: &HolidayPeriod) -> Result<(), AppError> {
    match (holiday.start_time, holiday.end_time) {
        (None, None) => Ok(()),
        (Some(start), Some(end)) if start < end => Ok(()),
        (Some(_), Some(_)) => Err(AppError::Validation(
            "Holiday start time must be before its end time.".to_string(),
        )),
        _ => Err(AppError::Validation(
            "Give both a start and an end time, or neither for a full-day closure.".to_string(),
        )),
    }
}

/// Holiday CRUD for administrators.
pub struct HolidayAdmin {
    api: Arc<ApiClient>,
    session: Arc<SessionStore>,
}

impl HolidayAdmin {
    pub fn new(api: Arc<ApiClient>, session: Arc<SessionStore>) -> Self {
        Self { api, session }
    }

    fn admin_token(&self) -> Result<String, AppError> {
        let session = self.session.require_role(&[Role::Admin])?;
        session
            .token()
            .map(str::to_string)
            .ok_or_else(|| AppError::Unauthorized("Please log in again.".to_string()))
    }

    pub async fn list(&self) -> Result<Vec<HolidayPeriod>, AppError> {
        let token = self.admin_token()?;
        let mut holidays: Vec<HolidayPeriod> = self
            .api
            .json_opt("/admin/holidays", RequestOptions::get().token(Some(&token)))
            .await?
            .unwrap_or_default();
        holidays.sort_by_key(|h| (h.date, h.start_time));
        Ok(holidays)
    }

    pub async fn create(&self, holiday: &HolidayPeriod) -> Result<HolidayPeriod, AppError> {
        validate_holiday(holiday)?;
        let token = self.admin_token()?;
        let created: HolidayPeriod = self
            .api
            .json(
                "/admin/holidays",
                RequestOptions::post(holiday)?.token(Some(&token)),
            )
            .await?;
        tracing::info!(date = %created.date, id = ?created.id, "holiday created");
        Ok(created)
    }

    pub async fn update(&self, id: i64, holiday: &HolidayPeriod) -> Result<HolidayPeriod, AppError> {
        validate_holiday(holiday)?;
        let token = self.admin_token()?;
        let updated: HolidayPeriod = self
            .api
            .json(
                &format!("/admin/holidays/{id}"),
                RequestOptions::put(holiday)?.token(Some(&token)),
            )
            .await?;
        tracing::info!(id, date = %updated.date, "holiday updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let token = self.admin_token()?;
        self.api
            .send(
                &format!("/admin/holidays/{id}"),
                RequestOptions::delete().token(Some(&token)),
            )
            .await?;
        tracing::info!(id, "holiday deleted");
        Ok(())
    }
}
