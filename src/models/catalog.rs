use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A predefined service for one make/model. `description` is unique within
/// that make/model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceOffering {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub description: String,
    pub make: String,
    pub model: String,
    pub fee: Decimal,
    pub duration_minutes: u32,
}

/// Sum of durations of the offerings whose description is selected.
/// Unknown descriptions contribute nothing.
pub fn total_duration(offerings: &[ServiceOffering], selected: &[String]) -> u32 {
    selected
        .iter()
        .filter_map(|desc| offerings.iter().find(|o| &o.description == desc))
        .map(|o| o.duration_minutes)
        .sum()
}

pub fn total_fee(offerings: &[ServiceOffering], selected: &[String]) -> Decimal {
    selected
        .iter()
        .filter_map(|desc| offerings.iter().find(|o| &o.description == desc))
        .map(|o| o.fee)
        .sum()
}
