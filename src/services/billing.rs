use rust_decimal::Decimal;

use crate::api::{ApiClient, RequestOptions};
use crate::errors::AppError;
use crate::models::{
    total_fee, Appointment, BillingRequest, CustomServiceItem, PreBillRequest, PreBillResponse,
    ServiceOffering, ServiceRecord,
};

fn require_token(token: Option<&str>) -> Result<&str, AppError> {
    token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Please log in again.".to_string()))
}

/// Custom lines with a description and a positive cost; blank rows are dropped.
pub fn billable_custom_items(items: &[CustomServiceItem]) -> Vec<CustomServiceItem> {
    items
        .iter()
        .filter(|item| !item.description.trim().is_empty() && item.cost > Decimal::ZERO)
        .cloned()
        .collect()
}

/// Local estimate: catalog fees of the selected services plus custom lines and parts.
pub fn local_estimate(offerings: &[ServiceOffering], req: &PreBillRequest) -> Decimal {
    let custom: Decimal = billable_custom_items(&req.custom_items)
        .iter()
        .map(|item| item.cost)
        .sum();
    total_fee(offerings, &req.selected_service_descriptions)
        + custom
        + req.estimated_parts_cost.max(Decimal::ZERO)
}

pub async fn pre_bill(
    api: &ApiClient,
    req: &PreBillRequest,
    token: Option<&str>,
) -> Result<PreBillResponse, AppError> {
    if req.make.trim().is_empty() || req.model.trim().is_empty() {
        return Err(AppError::Validation(
            "Please select the vehicle make and model.".to_string(),
        ));
    }
    let req = PreBillRequest {
        custom_items: billable_custom_items(&req.custom_items),
        ..req.clone()
    };

    let estimate: PreBillResponse = api
        .json("/user/pre-bill", RequestOptions::post(&req)?.token(token))
        .await?;
    tracing::info!(
        make = %req.make,
        model = %req.model,
        total = %estimate.estimated_total,
        "pre-bill estimated"
    );
    Ok(estimate)
}

/// Finalize a bill for a stored vehicle. Returns the persisted service record.
pub async fn calculate(
    api: &ApiClient,
    req: &BillingRequest,
    token: Option<&str>,
) -> Result<ServiceRecord, AppError> {
    let token = require_token(token)?;
    let req = BillingRequest {
        custom_items: billable_custom_items(&req.custom_items),
        ..req.clone()
    };
    if req.selected_service_descriptions.is_empty()
        && req.custom_items.is_empty()
        && req.parts_cost <= Decimal::ZERO
    {
        return Err(AppError::Validation(
            "Select or add at least one service item before billing.".to_string(),
        ));
    }

    let record: ServiceRecord = api
        .json(
            "/cashier/billing/calculate",
            RequestOptions::post(&req)?.token(Some(token)),
        )
        .await?;
    tracing::info!(
        vehicle_id = req.vehicle_id,
        record_id = ?record.id,
        total = %record.total_cost,
        "bill finalized"
    );
    Ok(record)
}

/// Plain-text receipt for a finalized service record.
pub async fn receipt(api: &ApiClient, record_id: i64, token: Option<&str>) -> Result<String, AppError> {
    let token = require_token(token)?;
    let path = format!("/cashier/billing/receipt/{record_id}");
    let opts = RequestOptions::get()
        .token(Some(token))
        .header("Accept", "text/plain");
    Ok(api.text(&path, opts).await?)
}

/// Service history of the signed-in user.
pub async fn history(api: &ApiClient, token: Option<&str>) -> Result<Vec<ServiceRecord>, AppError> {
    let token = require_token(token)?;
    Ok(api
        .json_opt("/user/service-history", RequestOptions::get().token(Some(token)))
        .await?
        .unwrap_or_default())
}

/// Appointments booked by the signed-in user.
pub async fn appointments(api: &ApiClient, token: Option<&str>) -> Result<Vec<Appointment>, AppError> {
    let token = require_token(token)?;
    Ok(api
        .json_opt("/user/appointments", RequestOptions::get().token(Some(token)))
        .await?
        .unwrap_or_default())
}
