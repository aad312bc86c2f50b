//! Products, the server-side cart and checkout

use luxe_core::types::{Product, ServerCart};
use serde_json::{Value, json};

use super::{ClientError, LuxeClient};
use crate::types::{CartItemRequest, CheckoutResponse, ListQuery, PaymentIntent, ProductList, QuantityRequest};

impl LuxeClient {
    pub async fn products(&self, query: &ListQuery) -> Result<ProductList, ClientError> {
        self.get_with("/products", query).await
    }

    pub async fn product(&self, id: &str) -> Result<Product, ClientError> {
        self.get(&format!("/products/{id}")).await
    }

    pub async fn cart(&self) -> Result<ServerCart, ClientError> {
        self.get("/cart").await
    }

    pub async fn add_cart_item(&self, product_id: &str, quantity: u32) -> Result<(), ClientError> {
        let request = CartItemRequest {
            product_id: product_id.to_string(),
            quantity,
        };
        let _: Value = self.post("/cart/items", &request).await?;
        Ok(())
    }

    pub async fn update_cart_item(
        &self,
        product_id: &str,
        quantity: u32,
    ) -> Result<(), ClientError> {
        let _: Value = self
            .put(
                &format!("/cart/items/{product_id}"),
                &QuantityRequest { quantity },
            )
            .await?;
        Ok(())
    }

    pub async fn remove_cart_item(&self, product_id: &str) -> Result<(), ClientError> {
        let _: Value = self.delete(&format!("/cart/items/{product_id}")).await?;
        Ok(())
    }

    /// Step a cart line up or down, removing it when it would drop below one
    ///
    /// Returns the new quantity, zero when the line was removed.
    pub async fn adjust_cart_item(&self, product_id: &str, delta: i64) -> Result<u32, ClientError> {
        let current = i64::from(self.cart().await?.quantity_of(product_id));
        let target = current.checked_add(delta).ok_or_else(|| {
            ClientError::BadRequest(format!("quantity change {delta} is out of range"))
        })?;

        if target < 1 {
            self.remove_cart_item(product_id).await?;
            return Ok(0);
        }

        let quantity = u32::try_from(target)
            .map_err(|_| ClientError::BadRequest(format!("quantity {target} is too large")))?;
        if current == 0 {
            self.add_cart_item(product_id, quantity).await?;
        } else {
            self.update_cart_item(product_id, quantity).await?;
        }
        Ok(quantity)
    }

    /// Prepare payment for the server cart
    ///
    /// The order is created by the backend once the payment succeeds.
    pub async fn checkout(&self) -> Result<PaymentIntent, ClientError> {
        let response: CheckoutResponse = self.post("/orders/checkout", &json!({})).await?;
        Ok(response.into())
    }
}
