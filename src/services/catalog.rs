use crate::errors::ApiError;
use crate::models::{ServiceOffering, VehicleMake, VehicleModel};
use crate::services::backend::ServiceCenter;

pub async fn makes(backend: &dyn ServiceCenter) -> Result<Vec<VehicleMake>, ApiError> {
    backend.vehicle_makes().await
}

pub async fn models(backend: &dyn ServiceCenter, make: &str) -> Result<Vec<VehicleModel>, ApiError> {
    let make = make.trim();
    if make.is_empty() {
        return Ok(vec![]);
    }
    backend.vehicle_models(make).await
}

/// Predefined services for a make/model. Blank input yields an empty list
/// without a request.
pub async fn list_services(
    backend: &dyn ServiceCenter,
    make: &str,
    model: &str,
) -> Result<Vec<ServiceOffering>, ApiError> {
    let (make, model) = (make.trim(), model.trim());
    if make.is_empty() || model.is_empty() {
        tracing::debug!("service catalog requested without make/model");
        return Ok(vec![]);
    }

    let services = backend.services(make, model).await?;
    tracing::debug!(make, model, count = services.len(), "service catalog loaded");
    Ok(services)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{offering, MockCenter};

    #[tokio::test]
    async fn test_blank_make_or_model_skips_request() {
        let center = MockCenter::default().with_services(vec![offering("Oil Change", 40, 30)]);

        assert!(list_services(&center, "", "Yaris").await.unwrap().is_empty());
        assert!(list_services(&center, "Toyota", "  ").await.unwrap().is_empty());
        assert!(models(&center, "").await.unwrap().is_empty());
        assert_eq!(center.calls("services"), 0);
        assert_eq!(center.calls("vehicle_models"), 0);
    }

    #[tokio::test]
    async fn test_lists_services_for_model() {
        let center = MockCenter::default().with_services(vec![
            offering("Oil Change", 40, 30),
            offering("Tire Rotation", 25, 20),
        ]);

        let services = list_services(&center, "Toyota", "Yaris").await.unwrap();
        assert_eq!(services.len(), 2);
        assert_eq!(services[1].duration_minutes, 20);
    }

    #[tokio::test]
    async fn test_models_for_make() {
        let center = MockCenter::default().with_services(vec![offering("Oil Change", 40, 30)]);
        let models = models(&center, "Toyota").await.unwrap();
        assert_eq!(models[0].name, "Yaris");
    }
}
