use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;

use crate::errors::AppError;

pub const CURRENCY: &str = "USD";

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentConfirmation {
    pub amount: Decimal,
    pub currency: String,
    pub transaction_id: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(&self, amount: Decimal) -> Result<PaymentConfirmation, AppError>;
}

/// Stand-in gateway: always approves positive amounts after a short delay.
pub struct SimulatedPayment {
    latency: Duration,
}

impl SimulatedPayment {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

impl Default for SimulatedPayment {
    fn default() -> Self {
        Self::new(Duration::from_millis(750))
    }
}

#[async_trait]
impl PaymentGateway for SimulatedPayment {
    async fn charge(&self, amount: Decimal) -> Result<PaymentConfirmation, AppError> {
        if amount <= Decimal::ZERO {
            return Err(AppError::Payment("Invalid payment amount.".to_string()));
        }

        tracing::info!(amount = %amount, currency = CURRENCY, "processing simulated payment");
        tokio::time::sleep(self.latency).await;

        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let transaction_id = format!(
            "SIM_PAY_{}_{}",
            Utc::now().timestamp_millis(),
            &suffix[..9]
        );
        tracing::info!(transaction_id = %transaction_id, "simulated payment approved");

        Ok(PaymentConfirmation {
            amount,
            currency: CURRENCY.to_string(),
            transaction_id,
        })
    }
}
