use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VehicleType {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VehicleMake {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VehicleModel {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub make_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    #[serde(default)]
    pub id: Option<i64>,
    pub vehicle_id: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    #[serde(default)]
    pub chassis_no: Option<String>,
    #[serde(default)]
    pub owner_name: Option<String>,
    #[serde(default)]
    pub owner_phone_no: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    pub address: String,
    pub phone_no: String,
    pub nic_no: String,
}

/// An existing customer together with the vehicle a lookup matched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerVehicle {
    pub vehicle: Vehicle,
    pub customer: Customer,
}

/// Wire shape of the lookup response; either half may be missing.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomerVehicleResponse {
    #[serde(default)]
    pub vehicle: Option<Vehicle>,
    #[serde(default)]
    pub customer: Option<Customer>,
}

impl CustomerVehicleResponse {
    pub fn into_complete(self) -> Option<CustomerVehicle> {
        match (self.vehicle, self.customer) {
            (Some(vehicle), Some(customer)) => Some(CustomerVehicle { vehicle, customer }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerVehicleInput {
    pub vehicle_id: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub chassis_no: String,
    pub customer_name: String,
    pub address: String,
    pub phone_no: String,
    pub nic_no: String,
}
