//! Service and stylist browsing

use luxe_core::types::{Service, ServicePerson};

use super::{ClientError, LuxeClient};
use crate::types::{ListQuery, NEARBY_RADIUS_METRES, NearbyList, NearbyQuery, ServiceList, SlotList, SlotQuery};

impl LuxeClient {
    pub async fn services(&self, query: &ListQuery) -> Result<ServiceList, ClientError> {
        self.get_with("/services", query).await
    }

    pub async fn service(&self, id: &str) -> Result<Service, ClientError> {
        self.get(&format!("/services/{id}")).await
    }

    pub async fn service_person(&self, id: &str) -> Result<ServicePerson, ClientError> {
        self.get(&format!("/users/{id}")).await
    }

    /// Stylists within 20km of a location
    pub async fn nearby_service_persons(
        &self,
        lat: f64,
        lng: f64,
    ) -> Result<NearbyList, ClientError> {
        let query = NearbyQuery {
            lat,
            lng,
            radius: NEARBY_RADIUS_METRES,
        };
        self.get_with("/users/nearby", &query).await
    }

    /// Open slots for a stylist on a given day (`YYYY-MM-DD`)
    pub async fn available_slots(
        &self,
        service_person_id: &str,
        date: &str,
    ) -> Result<SlotList, ClientError> {
        let query = SlotQuery {
            date: date.to_string(),
        };
        self.get_with(&format!("/bookings/slots/{service_person_id}"), &query)
            .await
    }
}
