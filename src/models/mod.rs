pub mod auth;
pub mod availability;
pub mod billing;
pub mod booking;
pub mod catalog;
pub mod vehicle;

pub use auth::{AuthRequest, AuthResponse, RegisterRequest, Role, Session};
pub use availability::{HolidayKind, HolidayPeriod, TimeSlot};
pub use billing::{
    BillingRequest, CustomServiceItem, PreBillRequest, PreBillResponse, ServiceCostDetail,
    ServiceRecord,
};
pub use booking::{Appointment, AppointmentBookingRequest, AppointmentStatus};
pub use catalog::{total_duration, total_fee, ServiceOffering};
pub use vehicle::{
    Customer, CustomerVehicle, CustomerVehicleInput, CustomerVehicleResponse, Vehicle, VehicleMake,
    VehicleModel, VehicleType,
};
