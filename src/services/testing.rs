//! In-memory `ServiceCenter` for unit tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;

use crate::errors::ApiError;
use crate::models::{
    Appointment, AppointmentBookingRequest, AppointmentStatus, AuthRequest, AuthResponse,
    CustomerVehicle, CustomerVehicleInput, CustomerVehicleResponse, HolidayPeriod,
    RegisterRequest, ServiceOffering, TimeSlot, Vehicle, VehicleMake, VehicleModel,
};
use crate::services::backend::ServiceCenter;

type Failure = (StatusCode, String);

#[derive(Default)]
struct Inner {
    login: Option<Result<AuthResponse, Failure>>,
    makes: Vec<VehicleMake>,
    services: Vec<ServiceOffering>,
    services_error: Option<Failure>,
    slots: Vec<TimeSlot>,
    slots_error: Option<Failure>,
    holidays: Vec<HolidayPeriod>,
    holidays_error: Option<Failure>,
    records: Vec<CustomerVehicle>,
    lookup_error: Option<Failure>,
    suggestions: HashMap<String, (Vec<Vehicle>, Duration)>,
    booking_error: Option<Failure>,
    bookings: Vec<AppointmentBookingRequest>,
    calls: HashMap<&'static str, usize>,
}

#[derive(Clone, Default)]
pub struct MockCenter {
    inner: Arc<Mutex<Inner>>,
}

fn failure((status, message): &Failure) -> ApiError {
    ApiError::Status {
        status: *status,
        message: message.clone(),
    }
}

impl MockCenter {
    fn with(self, f: impl FnOnce(&mut Inner)) -> Self {
        f(&mut self.inner.lock().unwrap());
        self
    }

    fn hit(&self, name: &'static str) {
        *self.inner.lock().unwrap().calls.entry(name).or_default() += 1;
    }

    pub fn calls(&self, name: &str) -> usize {
        self.inner.lock().unwrap().calls.get(name).copied().unwrap_or(0)
    }

    pub fn with_login(self, resp: AuthResponse) -> Self {
        self.with(|i| i.login = Some(Ok(resp)))
    }

    pub fn fail_login(&self, status: StatusCode, message: &str) {
        self.inner.lock().unwrap().login = Some(Err((status, message.to_string())));
    }

    pub fn with_makes(self, names: &[&str]) -> Self {
        let makes = names
            .iter()
            .map(|n| VehicleMake {
                id: None,
                name: n.to_string(),
            })
            .collect();
        self.with(|i| i.makes = makes)
    }

    pub fn with_services(self, services: Vec<ServiceOffering>) -> Self {
        self.with(|i| i.services = services)
    }

    pub fn fail_services(&self, failure: Option<Failure>) {
        self.inner.lock().unwrap().services_error = failure;
    }

    pub fn with_slots(self, slots: Vec<TimeSlot>) -> Self {
        self.with(|i| i.slots = slots)
    }

    pub fn fail_slots(&self, failure: Option<Failure>) {
        self.inner.lock().unwrap().slots_error = failure;
    }

    pub fn with_holidays(self, holidays: Vec<HolidayPeriod>) -> Self {
        self.with(|i| i.holidays = holidays)
    }

    pub fn fail_holidays(self, status: StatusCode) -> Self {
        self.with(|i| i.holidays_error = Some((status, "holidays unavailable".to_string())))
    }

    pub fn with_record(self, record: CustomerVehicle) -> Self {
        self.with(|i| i.records.push(record))
    }

    pub fn fail_lookup(self, status: StatusCode, message: &str) -> Self {
        self.with(|i| i.lookup_error = Some((status, message.to_string())))
    }

    pub fn with_suggestions(self, query: &str, vehicles: Vec<Vehicle>, delay: Duration) -> Self {
        self.with(|i| {
            i.suggestions.insert(query.to_string(), (vehicles, delay));
        })
    }

    pub fn fail_booking(&self, failure: Option<Failure>) {
        self.inner.lock().unwrap().booking_error = failure;
    }

    pub fn bookings(&self) -> Vec<AppointmentBookingRequest> {
        self.inner.lock().unwrap().bookings.clone()
    }
}

#[async_trait]
impl ServiceCenter for MockCenter {
    async fn login(&self, _req: &AuthRequest) -> Result<Option<AuthResponse>, ApiError> {
        self.hit("login");
        match &self.inner.lock().unwrap().login {
            Some(Ok(resp)) => Ok(Some(resp.clone())),
            Some(Err(f)) => Err(failure(f)),
            None => Ok(None),
        }
    }

    async fn register(&self, _req: &RegisterRequest) -> Result<(), ApiError> {
        self.hit("register");
        Ok(())
    }

    async fn vehicle_makes(&self) -> Result<Vec<VehicleMake>, ApiError> {
        self.hit("vehicle_makes");
        Ok(self.inner.lock().unwrap().makes.clone())
    }

    async fn vehicle_models(&self, make: &str) -> Result<Vec<VehicleModel>, ApiError> {
        self.hit("vehicle_models");
        let inner = self.inner.lock().unwrap();
        let mut names: Vec<String> = inner
            .services
            .iter()
            .filter(|s| s.make == make)
            .map(|s| s.model.clone())
            .collect();
        names.dedup();
        Ok(names
            .into_iter()
            .map(|name| VehicleModel {
                id: None,
                name,
                make_name: Some(make.to_string()),
            })
            .collect())
    }

    async fn services(&self, make: &str, model: &str) -> Result<Vec<ServiceOffering>, ApiError> {
        self.hit("services");
        let inner = self.inner.lock().unwrap();
        if let Some(f) = &inner.services_error {
            return Err(failure(f));
        }
        Ok(inner
            .services
            .iter()
            .filter(|s| s.make == make && s.model == model)
            .cloned()
            .collect())
    }

    async fn appointment_slots(
        &self,
        _date: NaiveDate,
        _service_descriptions: &[String],
        _make: &str,
        _model: &str,
    ) -> Result<Vec<TimeSlot>, ApiError> {
        self.hit("appointment_slots");
        let inner = self.inner.lock().unwrap();
        if let Some(f) = &inner.slots_error {
            return Err(failure(f));
        }
        Ok(inner.slots.clone())
    }

    async fn holidays(&self) -> Result<Vec<HolidayPeriod>, ApiError> {
        self.hit("holidays");
        let inner = self.inner.lock().unwrap();
        if let Some(f) = &inner.holidays_error {
            return Err(failure(f));
        }
        Ok(inner.holidays.clone())
    }

    async fn customer_vehicle(
        &self,
        identifier: &str,
        _token: Option<&str>,
    ) -> Result<Option<CustomerVehicleResponse>, ApiError> {
        self.hit("customer_vehicle");
        let inner = self.inner.lock().unwrap();
        if let Some(f) = &inner.lookup_error {
            return Err(failure(f));
        }
        inner
            .records
            .iter()
            .find(|r| {
                r.vehicle.vehicle_id.eq_ignore_ascii_case(identifier)
                    || r.vehicle.chassis_no.as_deref() == Some(identifier)
            })
            .map(|r| {
                Some(CustomerVehicleResponse {
                    vehicle: Some(r.vehicle.clone()),
                    customer: Some(r.customer.clone()),
                })
            })
            .ok_or_else(|| failure(&(StatusCode::NOT_FOUND, "Vehicle not found".to_string())))
    }

    async fn customer_vehicle_suggestions(
        &self,
        query: &str,
        _token: Option<&str>,
    ) -> Result<Vec<Vehicle>, ApiError> {
        self.hit("suggestions");
        let entry = self.inner.lock().unwrap().suggestions.get(query).cloned();
        match entry {
            Some((vehicles, delay)) => {
                tokio::time::sleep(delay).await;
                Ok(vehicles)
            }
            None => Ok(vec![]),
        }
    }

    async fn save_customer_vehicle(
        &self,
        input: &CustomerVehicleInput,
        _token: Option<&str>,
    ) -> Result<Option<CustomerVehicleInput>, ApiError> {
        self.hit("save_customer_vehicle");
        Ok(Some(input.clone()))
    }

    async fn book_appointment(
        &self,
        req: &AppointmentBookingRequest,
        _token: Option<&str>,
    ) -> Result<Appointment, ApiError> {
        self.hit("book_appointment");
        let mut inner = self.inner.lock().unwrap();
        if let Some(f) = &inner.booking_error {
            return Err(failure(f));
        }
        inner.bookings.push(req.clone());
        Ok(Appointment {
            id: Some(inner.bookings.len() as i64),
            date: req.date,
            start_time: req.start_time,
            end_time: None,
            vehicle_make_model_year: Some(format!("{} {} {}", req.make, req.model, req.year)),
            customer_name: Some(req.customer_name.clone()),
            vehicle_identifier: Some(req.vehicle_identifier.clone()),
            advance_fee_paid: Some(req.advance_fee),
            payment_transaction_id: req.payment_transaction_id.clone(),
            status: Some(AppointmentStatus::Upcoming),
        })
    }
}

// ── Fixtures ──

pub fn t(s: &str) -> chrono::NaiveTime {
    crate::models::availability::parse_time(s).unwrap()
}

pub fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn slot(start: &str, end: &str) -> TimeSlot {
    TimeSlot::parse(start, end).unwrap()
}

pub fn offering(description: &str, fee: i64, minutes: u32) -> ServiceOffering {
    ServiceOffering {
        id: None,
        description: description.to_string(),
        make: "Toyota".to_string(),
        model: "Yaris".to_string(),
        fee: rust_decimal::Decimal::new(fee, 0),
        duration_minutes: minutes,
    }
}

pub fn sample_record(id: &str) -> CustomerVehicle {
    CustomerVehicle {
        vehicle: Vehicle {
            id: Some(1),
            vehicle_id: id.to_string(),
            make: "Toyota".to_string(),
            model: "Yaris".to_string(),
            year: 2019,
            chassis_no: Some(format!("CH-{id}")),
            owner_name: None,
            owner_phone_no: None,
        },
        customer: crate::models::Customer {
            id: Some(9),
            name: "Nimal Perera".to_string(),
            address: "12 Temple Rd, Kandy".to_string(),
            phone_no: "077-123-4567".to_string(),
            nic_no: "901234567V".to_string(),
        },
    }
}
