use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::availability::{hhmm, hhmm_opt};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentBookingRequest {
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    pub vehicle_identifier: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    /// NIC is the durable customer key.
    pub customer_identifier: String,
    pub customer_name: String,
    pub customer_address: String,
    pub customer_phone_no: String,
    pub advance_fee: Decimal,
    pub selected_service_descriptions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_transaction_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "UPPERCASE")]
pub enum AppointmentStatus {
    Upcoming,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Upcoming => "UPCOMING",
            AppointmentStatus::Completed => "COMPLETED",
            AppointmentStatus::Cancelled => "CANCELLED",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    #[serde(default)]
    pub id: Option<i64>,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(default, with = "hhmm_opt")]
    pub end_time: Option<NaiveTime>,
    #[serde(default)]
    pub vehicle_make_model_year: Option<String>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub vehicle_identifier: Option<String>,
    #[serde(default)]
    pub advance_fee_paid: Option<Decimal>,
    #[serde(default)]
    pub payment_transaction_id: Option<String>,
    #[serde(default)]
    pub status: Option<AppointmentStatus>,
}
