//! Stylist reviews

use luxe_core::types::Review;

use super::{ClientError, LuxeClient};
use crate::types::{CreateReviewRequest, ReviewList};

/// Ratings are whole stars from one to five
pub const RATING_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

impl LuxeClient {
    pub async fn reviews(&self, service_person_id: &str) -> Result<ReviewList, ClientError> {
        self.get(&format!("/reviews/{service_person_id}")).await
    }

    pub async fn create_review(&self, request: &CreateReviewRequest) -> Result<Review, ClientError> {
        if !RATING_RANGE.contains(&request.rating) {
            return Err(ClientError::BadRequest(format!(
                "rating must be between 1 and 5, got {}",
                request.rating
            )));
        }
        if request.comment.trim().is_empty() {
            return Err(ClientError::BadRequest("please write a comment".into()));
        }

        self.post("/reviews", request).await
    }
}
