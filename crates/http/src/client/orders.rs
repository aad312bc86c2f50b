//! Order history

use super::{ClientError, LuxeClient};
use crate::types::OrderList;

impl LuxeClient {
    pub async fn my_orders(&self) -> Result<OrderList, ClientError> {
        self.get("/orders/my").await
    }
}
