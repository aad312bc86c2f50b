//! Booking API client methods

use luxe_core::types::Booking;
use serde_json::json;

use super::{ClientError, LuxeClient};
use crate::types::{BookingCreated, BookingList, CreateBookingRequest, ListQuery, RescheduleRequest};

impl LuxeClient {
    pub async fn my_bookings(&self, query: &ListQuery) -> Result<BookingList, ClientError> {
        self.get_with("/bookings/my", query).await
    }

    /// Create a booking; the response carries the payment secret to confirm it
    pub async fn create_booking(
        &self,
        request: &CreateBookingRequest,
    ) -> Result<BookingCreated, ClientError> {
        self.post("/bookings", request).await
    }

    pub async fn cancel_booking(&self, id: &str) -> Result<Booking, ClientError> {
        self.patch(&format!("/bookings/{id}/cancel"), &json!({})).await
    }

    pub async fn reschedule_booking(
        &self,
        id: &str,
        new_booking_date: &str,
    ) -> Result<Booking, ClientError> {
        let request = RescheduleRequest {
            new_booking_date: new_booking_date.to_string(),
        };
        self.patch(&format!("/bookings/{id}/reschedule"), &request)
            .await
    }
}
