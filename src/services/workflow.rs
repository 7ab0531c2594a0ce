use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, Local, NaiveDate};
use rust_decimal::Decimal;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::{total_duration, Appointment, AppointmentBookingRequest, ServiceOffering, TimeSlot};
use crate::services::announcement::AnnouncementStore;
use crate::services::backend::ServiceCenter;
use crate::services::catalog;
use crate::services::lookup::{self, Lookup};
use crate::services::payment::{PaymentConfirmation, PaymentGateway};
use crate::services::session::{SessionStore, BOOKING_ROLES};
use crate::services::slots::{self, SlotEngine};

const SUCCESS_ANNOUNCEMENT: Duration = Duration::from_millis(10_000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    VehicleDetails,
    CustomerDetails,
    SelectServices,
    SelectTime,
    ConfirmBooking,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::VehicleDetails => "vehicle_details",
            Stage::CustomerDetails => "customer_details",
            Stage::SelectServices => "select_services",
            Stage::SelectTime => "select_time",
            Stage::ConfirmBooking => "confirm_booking",
        }
    }

    pub fn previous(&self) -> Stage {
        match self {
            Stage::VehicleDetails | Stage::CustomerDetails => Stage::VehicleDetails,
            Stage::SelectServices => Stage::CustomerDetails,
            Stage::SelectTime => Stage::SelectServices,
            Stage::ConfirmBooking => Stage::SelectTime,
        }
    }
}

/// Everything entered for one booking. Year is kept as typed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingDraft {
    pub vehicle_identifier: String,
    pub make: String,
    pub model: String,
    pub year: String,
    pub customer_name: String,
    pub customer_address: String,
    pub customer_phone: String,
    pub customer_nic: String,
    /// Insertion ordered, no duplicates.
    pub selected_services: Vec<String>,
    pub total_duration_minutes: u32,
    pub date: Option<NaiveDate>,
    pub selected_slot: Option<TimeSlot>,
    pub stage: Stage,
}

impl BookingDraft {
    pub fn parsed_year(&self) -> Option<i32> {
        self.year.trim().parse().ok()
    }
}

// ── Completeness predicates ──

pub fn vehicle_details_complete(draft: &BookingDraft, current_year: i32) -> bool {
    !draft.vehicle_identifier.trim().is_empty()
        && !draft.make.trim().is_empty()
        && !draft.model.trim().is_empty()
        && draft
            .parsed_year()
            .is_some_and(|y| y > 1900 && y <= current_year + 1)
}

pub fn customer_details_complete(draft: &BookingDraft) -> bool {
    !draft.customer_name.trim().is_empty()
        && !draft.customer_address.trim().is_empty()
        && is_valid_phone(&draft.customer_phone)
        && draft.customer_nic.trim().chars().count() >= 5
}

pub fn services_complete(draft: &BookingDraft) -> bool {
    !draft.selected_services.is_empty() && draft.total_duration_minutes > 0
}

pub fn time_complete(draft: &BookingDraft) -> bool {
    draft.date.is_some() && draft.selected_slot.is_some()
}

/// `ddd-ddd-dddd`
pub fn is_valid_phone(phone: &str) -> bool {
    let bytes = phone.as_bytes();
    bytes.len() == 12
        && bytes.iter().enumerate().all(|(i, b)| match i {
            3 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

fn vehicle_error(draft: &BookingDraft, current_year: i32) -> Option<&'static str> {
    if draft.vehicle_identifier.trim().is_empty() {
        Some("Please enter the vehicle ID.")
    } else if draft.make.trim().is_empty() || draft.model.trim().is_empty() {
        Some("Please select the vehicle make and model.")
    } else if !vehicle_details_complete(draft, current_year) {
        Some("Please enter a valid vehicle year.")
    } else {
        None
    }
}

fn customer_error(draft: &BookingDraft) -> Option<&'static str> {
    if draft.customer_name.trim().is_empty() || draft.customer_address.trim().is_empty() {
        Some("Please ensure all customer details are entered.")
    } else if !is_valid_phone(&draft.customer_phone) {
        Some("Please enter a valid phone number (xxx-xxx-xxxx).")
    } else if !customer_details_complete(draft) {
        Some("Please enter a valid NIC number.")
    } else {
        None
    }
}

fn invalid(message: &str) -> AppError {
    AppError::Validation(message.to_string())
}

/// Progress of one asynchronous step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepStatus {
    pub loading: bool,
    pub error: Option<String>,
}

impl StepStatus {
    fn begin(&mut self) {
        self.loading = true;
    }

    fn succeed(&mut self) {
        self.loading = false;
        self.error = None;
    }

    fn fail(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Steps {
    pub holidays: StepStatus,
    pub lookup: StepStatus,
    pub catalog: StepStatus,
    pub slots: StepStatus,
    pub submission: StepStatus,
}

/// The five-stage booking flow. Single owner; every transition goes through
/// `next`/`back`.
pub struct BookingWorkflow {
    backend: Arc<dyn ServiceCenter>,
    session: Arc<SessionStore>,
    payment: Arc<dyn PaymentGateway>,
    announcements: AnnouncementStore,
    slots: SlotEngine,
    advance_fee: Decimal,
    window_days: i64,
    pinned_today: Option<NaiveDate>,
    draft: BookingDraft,
    customer_prefilled: bool,
    available_services: Vec<ServiceOffering>,
    available_slots: Vec<TimeSlot>,
    steps: Steps,
    pending_payment: Option<PaymentConfirmation>,
}

impl BookingWorkflow {
    pub fn new(
        backend: Arc<dyn ServiceCenter>,
        session: Arc<SessionStore>,
        payment: Arc<dyn PaymentGateway>,
        announcements: AnnouncementStore,
        config: &AppConfig,
    ) -> Self {
        Self {
            slots: SlotEngine::new(Arc::clone(&backend)),
            backend,
            session,
            payment,
            announcements,
            advance_fee: config.advance_fee,
            window_days: config.booking_window_days,
            pinned_today: None,
            draft: BookingDraft::default(),
            customer_prefilled: false,
            available_services: Vec::new(),
            available_slots: Vec::new(),
            steps: Steps::default(),
            pending_payment: None,
        }
    }

    /// Pin the calendar's notion of today. Without it the local clock is
    /// read on every check.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.pinned_today = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.pinned_today
            .unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn stage(&self) -> Stage {
        self.draft.stage
    }

    pub fn steps(&self) -> &Steps {
        &self.steps
    }

    pub fn available_services(&self) -> &[ServiceOffering] {
        &self.available_services
    }

    pub fn advance_fee(&self) -> Decimal {
        self.advance_fee
    }

    /// NIC is read-only once an existing customer was loaded.
    pub fn customer_locked(&self) -> bool {
        self.customer_prefilled
    }

    pub fn pending_payment(&self) -> Option<&PaymentConfirmation> {
        self.pending_payment.as_ref()
    }

    fn current_year(&self) -> i32 {
        self.today().year()
    }

    // ── Field setters ──

    // Fields are editable only at their own stage; moving forward again
    // reloads everything downstream.
    fn require_stage(&self, stage: Stage) -> Result<(), AppError> {
        if self.draft.stage == stage {
            return Ok(());
        }
        Err(AppError::Validation(format!(
            "Go back to {} to change this.",
            stage.as_str()
        )))
    }

    pub fn set_vehicle_identifier(&mut self, identifier: &str) -> Result<(), AppError> {
        self.require_stage(Stage::VehicleDetails)?;
        self.draft.vehicle_identifier = identifier.to_string();
        Ok(())
    }

    pub fn set_make(&mut self, make: &str) -> Result<(), AppError> {
        self.require_stage(Stage::VehicleDetails)?;
        if self.draft.make != make {
            self.draft.model.clear();
        }
        self.draft.make = make.to_string();
        Ok(())
    }

    pub fn set_model(&mut self, model: &str) -> Result<(), AppError> {
        self.require_stage(Stage::VehicleDetails)?;
        self.draft.model = model.to_string();
        Ok(())
    }

    pub fn set_year(&mut self, year: &str) -> Result<(), AppError> {
        self.require_stage(Stage::VehicleDetails)?;
        self.draft.year = year.to_string();
        Ok(())
    }

    pub fn set_customer_name(&mut self, name: &str) -> Result<(), AppError> {
        self.require_stage(Stage::CustomerDetails)?;
        self.draft.customer_name = name.to_string();
        Ok(())
    }

    pub fn set_customer_address(&mut self, address: &str) -> Result<(), AppError> {
        self.require_stage(Stage::CustomerDetails)?;
        self.draft.customer_address = address.to_string();
        Ok(())
    }

    pub fn set_customer_phone(&mut self, phone: &str) -> Result<(), AppError> {
        self.require_stage(Stage::CustomerDetails)?;
        self.draft.customer_phone = phone.to_string();
        Ok(())
    }

    pub fn set_customer_nic(&mut self, nic: &str) -> Result<(), AppError> {
        self.require_stage(Stage::CustomerDetails)?;
        if self.customer_prefilled {
            return Err(invalid(
                "The NIC of an existing customer cannot be changed.",
            ));
        }
        self.draft.customer_nic = nic.to_string();
        Ok(())
    }

    // ── Transitions ──

    /// Advance one stage if the current one is complete, running the side
    /// effects of leaving it and entering the next.
    pub async fn next(&mut self) -> Result<Stage, AppError> {
        let session = self.session.require_role(BOOKING_ROLES)?;

        match self.draft.stage {
            Stage::VehicleDetails => {
                if let Some(message) = vehicle_error(&self.draft, self.current_year()) {
                    return Err(invalid(message));
                }
                self.prefill_customer(session.token()).await;
                self.draft.stage = Stage::CustomerDetails;
            }
            Stage::CustomerDetails => {
                if let Some(message) = customer_error(&self.draft) {
                    return Err(invalid(message));
                }
                self.draft.stage = Stage::SelectServices;
                self.load_catalog().await;
            }
            Stage::SelectServices => {
                if !services_complete(&self.draft) {
                    return Err(invalid("Please select at least one service."));
                }
                self.draft.stage = Stage::SelectTime;
                self.load_holidays().await;
                if self.draft.date.is_some() && self.draft.total_duration_minutes > 0 {
                    let _ = self.load_slots().await;
                }
            }
            Stage::SelectTime => {
                if !time_complete(&self.draft) {
                    return Err(invalid("Please select a date and time slot."));
                }
                self.draft.stage = Stage::ConfirmBooking;
            }
            Stage::ConfirmBooking => {
                return Err(invalid("Submit the booking to finish."));
            }
        }

        tracing::debug!(stage = self.draft.stage.as_str(), "workflow advanced");
        Ok(self.draft.stage)
    }

    pub fn back(&mut self) -> Stage {
        self.draft.stage = self.draft.stage.previous();
        self.draft.stage
    }

    /// Discard the draft and start over.
    pub fn reset(&mut self) {
        self.draft = BookingDraft::default();
        self.customer_prefilled = false;
        self.available_services.clear();
        self.available_slots.clear();
        self.pending_payment = None;
        self.steps.lookup = StepStatus::default();
        self.steps.catalog = StepStatus::default();
        self.steps.slots = StepStatus::default();
        self.steps.submission = StepStatus::default();
    }

    async fn prefill_customer(&mut self, token: Option<&str>) {
        let draft = &mut self.draft;
        draft.customer_name.clear();
        draft.customer_address.clear();
        draft.customer_phone.clear();
        draft.customer_nic.clear();
        self.customer_prefilled = false;

        self.steps.lookup.begin();
        let found = lookup::find(self.backend.as_ref(), &self.draft.vehicle_identifier, token).await;
        match found {
            Ok(Lookup::Found(record)) => {
                let draft = &mut self.draft;
                draft.customer_name = record.customer.name;
                draft.customer_address = record.customer.address;
                draft.customer_phone = record.customer.phone_no;
                draft.customer_nic = record.customer.nic_no;
                draft.make = record.vehicle.make;
                draft.model = record.vehicle.model;
                draft.year = record.vehicle.year.to_string();
                self.customer_prefilled = true;
                self.steps.lookup.succeed();
            }
            Ok(Lookup::NotFound) => {
                tracing::info!(
                    identifier = %self.draft.vehicle_identifier,
                    "new vehicle/customer, details to be entered"
                );
                self.steps.lookup.succeed();
            }
            Err(e) => {
                tracing::error!(error = %e, "prefill lookup failed");
                self.steps.lookup.fail(
                    "Could not check for existing vehicle/customer details. Please enter manually.",
                );
            }
        }
    }

    async fn load_catalog(&mut self) {
        self.clear_selection();
        self.steps.catalog.begin();
        let listed =
            catalog::list_services(self.backend.as_ref(), &self.draft.make, &self.draft.model).await;
        match listed {
            Ok(services) => {
                self.available_services = services;
                self.steps.catalog.succeed();
            }
            Err(e) => {
                self.available_services.clear();
                self.steps.catalog.fail(format!(
                    "Failed to load services for {} {}. {e}",
                    self.draft.make, self.draft.model
                ));
            }
        }
    }

    async fn load_holidays(&mut self) {
        if self.slots.holidays_loaded() {
            return;
        }
        self.steps.holidays.begin();
        match self.slots.refresh_holidays().await {
            Ok(()) => self.steps.holidays.succeed(),
            Err(e) => self
                .steps
                .holidays
                .fail(format!("Failed to load holiday information. {e}")),
        }
    }

    async fn load_slots(&mut self) -> Result<(), AppError> {
        self.available_slots.clear();
        self.draft.selected_slot = None;
        self.steps.slots.begin();

        let result = self
            .slots
            .candidate_slots(
                self.draft.date,
                &self.draft.selected_services,
                &self.draft.make,
                &self.draft.model,
            )
            .await;

        match result {
            Ok(found) => {
                if found.is_empty() {
                    tracing::info!("no slots available for the selected date and services");
                }
                self.available_slots = found;
                self.steps.slots.succeed();
                Ok(())
            }
            Err(e) => {
                self.steps.slots.fail(e.to_string());
                Err(e.into())
            }
        }
    }

    fn clear_selection(&mut self) {
        self.draft.selected_services.clear();
        self.draft.total_duration_minutes = 0;
        self.clear_time();
    }

    fn clear_time(&mut self) {
        self.draft.date = None;
        self.draft.selected_slot = None;
        self.available_slots.clear();
    }

    // ── Services and time ──

    /// Add or remove a service. Any change voids the chosen date and slot.
    pub fn toggle_service(&mut self, description: &str) -> Result<(), AppError> {
        self.require_stage(Stage::SelectServices)?;
        if !self
            .available_services
            .iter()
            .any(|s| s.description == description)
        {
            return Err(AppError::Validation(format!(
                "Unknown service: {description}"
            )));
        }

        let selected = &mut self.draft.selected_services;
        match selected.iter().position(|s| s == description) {
            Some(index) => {
                selected.remove(index);
            }
            None => selected.push(description.to_string()),
        }

        self.draft.total_duration_minutes =
            total_duration(&self.available_services, &self.draft.selected_services);
        self.clear_time();
        Ok(())
    }

    pub fn is_date_disabled(&self, date: NaiveDate) -> bool {
        slots::is_date_disabled(date, self.today(), self.slots.cached_holidays(), self.window_days)
    }

    /// Pick a calendar date and fetch its candidate slots.
    pub async fn select_date(&mut self, date: NaiveDate) -> Result<(), AppError> {
        if self.draft.stage != Stage::SelectTime {
            return Err(invalid("Choose services before picking a date."));
        }
        self.load_holidays().await;
        if self.is_date_disabled(date) {
            return Err(AppError::Validation(format!(
                "{date} is not available for booking."
            )));
        }

        self.draft.date = Some(date);
        self.draft.selected_slot = None;
        if self.draft.total_duration_minutes > 0 {
            self.load_slots().await?;
        }
        Ok(())
    }

    /// Candidate slots minus those blocked by a partial holiday.
    pub fn visible_slots(&self) -> Vec<TimeSlot> {
        match self.draft.date {
            Some(date) => slots::filter_slots(&self.available_slots, self.slots.cached_holidays(), date),
            None => Vec::new(),
        }
    }

    pub fn select_slot(&mut self, slot: TimeSlot) -> Result<(), AppError> {
        self.require_stage(Stage::SelectTime)?;
        if !self.visible_slots().contains(&slot) {
            return Err(AppError::Validation(format!(
                "The {} slot is not available.",
                slot.label()
            )));
        }
        self.draft.selected_slot = Some(slot);
        Ok(())
    }

    // ── Submission ──

    /// Charge the advance fee, then book. A failed booking keeps the draft
    /// and the payment; a retry reuses that payment.
    pub async fn submit(&mut self) -> Result<Appointment, AppError> {
        if self.draft.stage != Stage::ConfirmBooking {
            return Err(invalid("Complete every step before confirming."));
        }
        let session = self.session.require_role(BOOKING_ROLES)?;
        let token = session
            .token()
            .ok_or_else(|| AppError::Unauthorized("Authentication error. Please log in again.".to_string()))?;

        let request = self.booking_request()?;

        self.steps.submission.begin();
        let confirmation = match self.pending_payment.clone() {
            Some(pending) => {
                tracing::info!(
                    transaction_id = %pending.transaction_id,
                    "reusing payment from failed attempt"
                );
                pending
            }
            None => match self.payment.charge(self.advance_fee).await {
                Ok(confirmation) => {
                    self.pending_payment = Some(confirmation.clone());
                    confirmation
                }
                Err(e) => {
                    self.steps.submission.fail(e.to_string());
                    return Err(e);
                }
            },
        };

        let request = AppointmentBookingRequest {
            payment_transaction_id: Some(confirmation.transaction_id.clone()),
            ..request
        };

        match self.backend.book_appointment(&request, Some(token)).await {
            Ok(appointment) => {
                let message = format!(
                    "Appointment booked for {} {} on {} at {}. Advance fee paid.",
                    request.make,
                    request.model,
                    request.date.format("%B %-d, %Y"),
                    request.start_time.format("%H:%M"),
                );
                tracing::info!(
                    transaction_id = %confirmation.transaction_id,
                    vehicle = %request.vehicle_identifier,
                    "appointment booked"
                );
                self.announcements.show(message, Some(SUCCESS_ANNOUNCEMENT));
                self.reset();
                Ok(appointment)
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    transaction_id = %confirmation.transaction_id,
                    "booking failed after payment"
                );
                self.steps.submission.fail(e.to_string());
                Err(e.into())
            }
        }
    }

    fn booking_request(&self) -> Result<AppointmentBookingRequest, AppError> {
        let draft = &self.draft;
        if let Some(message) = vehicle_error(draft, self.current_year()) {
            return Err(invalid(message));
        }
        if let Some(message) = customer_error(draft) {
            return Err(invalid(message));
        }
        if !services_complete(draft) {
            return Err(invalid(
                "Please ensure all vehicle details and at least one service are selected.",
            ));
        }
        let (Some(date), Some(slot), Some(year)) = (draft.date, draft.selected_slot, draft.parsed_year())
        else {
            return Err(invalid("Please select a date and time slot."));
        };

        Ok(AppointmentBookingRequest {
            date,
            start_time: slot.start_time,
            vehicle_identifier: draft.vehicle_identifier.trim().to_string(),
            make: draft.make.trim().to_string(),
            model: draft.model.trim().to_string(),
            year,
            customer_identifier: draft.customer_nic.trim().to_string(),
            customer_name: draft.customer_name.trim().to_string(),
            customer_address: draft.customer_address.trim().to_string(),
            customer_phone_no: draft.customer_phone.trim().to_string(),
            advance_fee: self.advance_fee,
            selected_service_descriptions: draft.selected_services.clone(),
            payment_transaction_id: None,
        })
    }
}
