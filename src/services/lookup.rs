use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::errors::{ApiError, AppError};
use crate::models::{CustomerVehicle, CustomerVehicleInput, Vehicle};
use crate::services::backend::ServiceCenter;
use crate::services::sequence::RequestSequence;

const MIN_SUGGESTION_QUERY: usize = 2;

#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Found(CustomerVehicle),
    /// No existing record; collect new-customer details instead.
    NotFound,
}

/// Resolve a vehicle ID, plate or chassis number to its customer record.
/// A 404 is a normal outcome, every other failure is an error.
pub async fn find(
    backend: &dyn ServiceCenter,
    identifier: &str,
    token: Option<&str>,
) -> Result<Lookup, ApiError> {
    let identifier = identifier.trim();
    if identifier.is_empty() {
        return Ok(Lookup::NotFound);
    }

    match backend.customer_vehicle(identifier, token).await {
        Ok(Some(resp)) => match resp.into_complete() {
            Some(found) => {
                tracing::info!(identifier, "existing customer vehicle found");
                Ok(Lookup::Found(found))
            }
            None => {
                tracing::debug!(identifier, "lookup response missing vehicle or customer");
                Ok(Lookup::NotFound)
            }
        },
        Ok(None) => Ok(Lookup::NotFound),
        Err(e) if e.is_not_found() => {
            tracing::info!(identifier, "no existing record, new customer");
            Ok(Lookup::NotFound)
        }
        Err(e) => {
            tracing::error!(identifier, error = %e, "customer vehicle lookup failed");
            Err(e)
        }
    }
}

/// Upsert a customer/vehicle pair, then read back the stored record.
pub async fn save(
    backend: &dyn ServiceCenter,
    input: &CustomerVehicleInput,
    token: Option<&str>,
) -> Result<CustomerVehicle, AppError> {
    validate_input(input)?;
    let saved = backend.save_customer_vehicle(input, token).await?;
    let identifier = saved
        .as_ref()
        .map(|s| s.vehicle_id.as_str())
        .unwrap_or(input.vehicle_id.as_str());
    match find(backend, identifier, token).await? {
        Lookup::Found(record) => Ok(record),
        Lookup::NotFound => Err(AppError::NotFound(format!(
            "vehicle {identifier} was saved but could not be read back"
        ))),
    }
}

fn validate_input(input: &CustomerVehicleInput) -> Result<(), AppError> {
    let required = [
        ("vehicle ID", &input.vehicle_id),
        ("make", &input.make),
        ("model", &input.model),
        ("customer name", &input.customer_name),
        ("address", &input.address),
        ("phone number", &input.phone_no),
        ("NIC", &input.nic_no),
    ];
    if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
        return Err(AppError::Validation(format!("The {field} is required.")));
    }
    Ok(())
}

/// Debounced typeahead over vehicle records. Overlapping searches are
/// allowed; only the newest search may publish its results.
pub struct Suggestions {
    backend: Arc<dyn ServiceCenter>,
    debounce: Duration,
    sequence: RequestSequence,
    results: Mutex<Vec<Vehicle>>,
}

impl Suggestions {
    pub fn new(backend: Arc<dyn ServiceCenter>, debounce: Duration) -> Self {
        Self {
            backend,
            debounce,
            sequence: RequestSequence::new(),
            results: Mutex::new(Vec::new()),
        }
    }

    pub fn current(&self) -> Vec<Vehicle> {
        self.results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Returns whether this search's results were applied.
    pub async fn search(&self, query: &str, token: Option<&str>) -> Result<bool, ApiError> {
        let ticket = self.sequence.issue();
        let query = query.trim();

        if query.chars().count() < MIN_SUGGESTION_QUERY {
            self.publish(Vec::new());
            return Ok(true);
        }

        if !self.debounce.is_zero() {
            tokio::time::sleep(self.debounce).await;
            if !self.sequence.is_current(ticket) {
                return Ok(false);
            }
        }

        let vehicles = self.backend.customer_vehicle_suggestions(query, token).await;
        if !self.sequence.is_current(ticket) {
            tracing::debug!(query, "discarding stale suggestions");
            return Ok(false);
        }

        match vehicles {
            Ok(vehicles) => {
                self.publish(vehicles);
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(query, error = %e, "failed to fetch suggestions");
                self.publish(Vec::new());
                Err(e)
            }
        }
    }

    fn publish(&self, vehicles: Vec<Vehicle>) {
        *self.results.lock().unwrap_or_else(|e| e.into_inner()) = vehicles;
    }
}
