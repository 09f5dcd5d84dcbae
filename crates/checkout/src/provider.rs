use async_trait::async_trait;
use promptart_core::payment::PaymentReport;

use crate::api::{CheckoutApi, CheckoutApiError, CreatedCheckout};
use crate::order::CheckoutOrder;

/// A checkout provider: creates payable orders and reports their status.
#[async_trait]
pub trait CheckoutProvider: Send + Sync {
    async fn create_checkout(
        &self,
        order: &CheckoutOrder,
    ) -> Result<CreatedCheckout, CheckoutApiError>;

    async fn payment_status(&self, checkout_id: &str) -> Result<PaymentReport, CheckoutApiError>;
}

#[async_trait]
impl CheckoutProvider for CheckoutApi {
    async fn create_checkout(
        &self,
        order: &CheckoutOrder,
    ) -> Result<CreatedCheckout, CheckoutApiError> {
        CheckoutApi::create_checkout(self, order).await
    }

    async fn payment_status(&self, checkout_id: &str) -> Result<PaymentReport, CheckoutApiError> {
        CheckoutApi::payment_status(self, checkout_id).await
    }
}
