use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::ApiError;
use crate::models::{
    Appointment, AppointmentBookingRequest, AuthRequest, AuthResponse, CustomerVehicleInput,
    CustomerVehicleResponse, HolidayPeriod, RegisterRequest, ServiceOffering, TimeSlot, Vehicle,
    VehicleMake, VehicleModel,
};

/// The backend calls the session store and booking workflow depend on.
#[async_trait]
pub trait ServiceCenter: Send + Sync {
    async fn login(&self, req: &AuthRequest) -> Result<Option<AuthResponse>, ApiError>;

    async fn register(&self, req: &RegisterRequest) -> Result<(), ApiError>;

    async fn vehicle_makes(&self) -> Result<Vec<VehicleMake>, ApiError>;

    async fn vehicle_models(&self, make: &str) -> Result<Vec<VehicleModel>, ApiError>;

    async fn services(&self, make: &str, model: &str) -> Result<Vec<ServiceOffering>, ApiError>;

    /// Candidate slots already accounting for business hours, existing
    /// bookings and the summed duration of `service_descriptions`.
    async fn appointment_slots(
        &self,
        date: NaiveDate,
        service_descriptions: &[String],
        make: &str,
        model: &str,
    ) -> Result<Vec<TimeSlot>, ApiError>;

    async fn holidays(&self) -> Result<Vec<HolidayPeriod>, ApiError>;

    async fn customer_vehicle(
        &self,
        identifier: &str,
        token: Option<&str>,
    ) -> Result<Option<CustomerVehicleResponse>, ApiError>;

    async fn customer_vehicle_suggestions(
        &self,
        query: &str,
        token: Option<&str>,
    ) -> Result<Vec<Vehicle>, ApiError>;

    async fn save_customer_vehicle(
        &self,
        input: &CustomerVehicleInput,
        token: Option<&str>,
    ) -> Result<Option<CustomerVehicleInput>, ApiError>;

    async fn book_appointment(
        &self,
        req: &AppointmentBookingRequest,
        token: Option<&str>,
    ) -> Result<Appointment, ApiError>;
}
