use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomServiceItem {
    pub description: String,
    pub cost: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PreBillRequest {
    pub make: String,
    pub model: String,
    #[serde(default)]
    pub selected_service_descriptions: Vec<String>,
    #[serde(default)]
    pub custom_items: Vec<CustomServiceItem>,
    #[serde(default)]
    pub estimated_parts_cost: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceCostDetail {
    pub description: String,
    pub cost: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PreBillResponse {
    pub estimated_total: Decimal,
    #[serde(default)]
    pub service_breakdown: Vec<ServiceCostDetail>,
    #[serde(default)]
    pub parts_cost_estimate: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BillingRequest {
    pub vehicle_id: i64,
    #[serde(default)]
    pub selected_service_descriptions: Vec<String>,
    #[serde(default)]
    pub custom_items: Vec<CustomServiceItem>,
    #[serde(default)]
    pub parts_cost: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_by_cashier_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub vehicle_id: Option<String>,
    #[serde(default)]
    pub make: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub service_date_time: Option<NaiveDateTime>,
    #[serde(default)]
    pub service_details: Option<String>,
    pub total_cost: Decimal,
    #[serde(default)]
    pub processed_by_cashier_name: Option<String>,
    #[serde(default)]
    pub appointment_id: Option<i64>,
}
