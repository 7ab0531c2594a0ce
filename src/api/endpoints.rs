use async_trait::async_trait;
use chrono::NaiveDate;

use super::{ApiClient, RequestOptions};
use crate::errors::ApiError;
use crate::models::availability::RawSlot;
use crate::models::{
    Appointment, AppointmentBookingRequest, AuthRequest, AuthResponse, CustomerVehicleInput,
    CustomerVehicleResponse, HolidayPeriod, RegisterRequest, ServiceOffering, TimeSlot, Vehicle,
    VehicleMake, VehicleModel, VehicleType,
};
use crate::services::backend::ServiceCenter;

impl ApiClient {
    pub async fn vehicle_types(&self) -> Result<Vec<VehicleType>, ApiError> {
        Ok(self
            .json_opt("/public/data/vehicle-types", RequestOptions::get())
            .await?
            .unwrap_or_default())
    }
}

/// Drop slots whose start is not before their end; keep the rest in order.
fn ordered_slots(raw: Vec<RawSlot>) -> Vec<TimeSlot> {
    raw.into_iter()
        .filter_map(|slot| match TimeSlot::try_from(slot) {
            Ok(slot) => Some(slot),
            Err(reason) => {
                tracing::warn!(reason = %reason, "ignoring malformed slot from backend");
                None
            }
        })
        .collect()
}

#[async_trait]
impl ServiceCenter for ApiClient {
    async fn login(&self, req: &AuthRequest) -> Result<Option<AuthResponse>, ApiError> {
        self.json_opt("/auth/login", RequestOptions::post(req)?).await
    }

    async fn register(&self, req: &RegisterRequest) -> Result<(), ApiError> {
        self.send("/auth/register", RequestOptions::post(req)?).await
    }

    async fn vehicle_makes(&self) -> Result<Vec<VehicleMake>, ApiError> {
        Ok(self
            .json_opt("/public/data/vehicle-makes", RequestOptions::get())
            .await?
            .unwrap_or_default())
    }

    async fn vehicle_models(&self, make: &str) -> Result<Vec<VehicleModel>, ApiError> {
        let opts = RequestOptions::get().query("makeName", make);
        Ok(self
            .json_opt("/public/data/vehicle-models", opts)
            .await?
            .unwrap_or_default())
    }

    async fn services(&self, make: &str, model: &str) -> Result<Vec<ServiceOffering>, ApiError> {
        let opts = RequestOptions::get()
            .query("makeName", make)
            .query("modelName", model);
        Ok(self
            .json_opt("/public/data/services", opts)
            .await?
            .unwrap_or_default())
    }

    async fn appointment_slots(
        &self,
        date: NaiveDate,
        service_descriptions: &[String],
        make: &str,
        model: &str,
    ) -> Result<Vec<TimeSlot>, ApiError> {
        let mut opts = RequestOptions::get().query("date", date.format("%Y-%m-%d").to_string());
        for desc in service_descriptions {
            opts = opts.query("serviceDescriptions", desc.as_str());
        }
        let opts = opts.query("makeName", make).query("modelName", model);
        let raw: Vec<RawSlot> = self
            .json_opt("/public/data/appointment-slots", opts)
            .await?
            .unwrap_or_default();
        Ok(ordered_slots(raw))
    }

    async fn holidays(&self) -> Result<Vec<HolidayPeriod>, ApiError> {
        Ok(self
            .json_opt("/public/data/holidays", RequestOptions::get())
            .await?
            .unwrap_or_default())
    }

    async fn customer_vehicle(
        &self,
        identifier: &str,
        token: Option<&str>,
    ) -> Result<Option<CustomerVehicleResponse>, ApiError> {
        let opts = RequestOptions::get()
            .query("vehicleIdentifier", identifier)
            .token(token);
        self.json_opt("/cashier/customer-vehicle", opts).await
    }

    async fn customer_vehicle_suggestions(
        &self,
        query: &str,
        token: Option<&str>,
    ) -> Result<Vec<Vehicle>, ApiError> {
        let opts = RequestOptions::get().query("query", query).token(token);
        Ok(self
            .json_opt("/cashier/customer-vehicle/suggestions", opts)
            .await?
            .unwrap_or_default())
    }

    async fn save_customer_vehicle(
        &self,
        input: &CustomerVehicleInput,
        token: Option<&str>,
    ) -> Result<Option<CustomerVehicleInput>, ApiError> {
        let opts = RequestOptions::post(input)?.token(token);
        self.json_opt("/cashier/customer-vehicle", opts).await
    }

    async fn book_appointment(
        &self,
        req: &AppointmentBookingRequest,
        token: Option<&str>,
    ) -> Result<Appointment, ApiError> {
        let opts = RequestOptions::post(req)?.token(token);
        self.json("/user/appointments", opts).await
    }
}
