//! Profile, favourites, reports and promotions

use luxe_core::types::{Report, User};
use serde_json::{Value, json};

use super::{ClientError, LuxeClient};
use crate::types::{FavouriteList, ProfileUpdate, PromotionList, ReportList, ReportRequest};

impl LuxeClient {
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ClientError> {
        self.put("/users/me", update).await
    }

    pub async fn favourites(&self) -> Result<FavouriteList, ClientError> {
        self.get("/favourites").await
    }

    /// Add the service to favourites, or remove it if already there
    pub async fn toggle_favourite(&self, service_id: &str) -> Result<(), ClientError> {
        let _: Value = self
            .post(&format!("/favourites/{service_id}"), &json!({}))
            .await?;
        Ok(())
    }

    pub async fn my_reports(&self) -> Result<ReportList, ClientError> {
        self.get("/reports/mine").await
    }

    pub async fn submit_report(&self, request: &ReportRequest) -> Result<Report, ClientError> {
        self.post("/reports", request).await
    }

    pub async fn active_promotions(&self) -> Result<PromotionList, ClientError> {
        self.get_with("/promotions", &json!({"active": "true"}))
            .await
    }
}
