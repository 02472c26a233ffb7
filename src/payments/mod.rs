use async_trait::async_trait;

use crate::error::{AppError, Result};

/// Seam for the payment provider. Booking creation charges through this
/// trait and records the outcome as a transaction; the real provider
/// integration can slot in behind it without touching booking logic.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn charge(&self, amount_cents: i64, description: &str) -> Result<()>;
}

/// In-process stand-in for a real payment provider. Charges always succeed
/// unless the gateway is constructed as declining, which tests use to
/// exercise the failure path.
pub struct SimulatedGateway {
    decline_all: bool,
}

impl SimulatedGateway {
    pub fn new() -> Self {
        Self { decline_all: false }
    }

    pub fn declining() -> Self {
        Self { decline_all: true }
    }
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn charge(&self, amount_cents: i64, description: &str) -> Result<()> {
        if self.decline_all {
            tracing::warn!("Simulated gateway declined charge: {}", description);
            return Err(AppError::Payment("Payment was declined".to_string()));
        }
        if amount_cents < 0 {
            return Err(AppError::Payment("Charge amount cannot be negative".to_string()));
        }
        tracing::debug!("Simulated charge of {} cents accepted: {}", amount_cents, description);
        Ok(())
    }
}
