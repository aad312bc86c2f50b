//! Request and response payloads for the backend API

use luxe_core::types::{
    Address, Booking, BookingType, Conversation, Message, Order, Pagination, Product, Promotion,
    Ref, Report, Review, Service, ServicePerson, Slot, User,
};
use serde::{Deserialize, Serialize};

/// Success envelope wrapping every backend payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Radius, in metres, used when searching for nearby stylists
pub const NEARBY_RADIUS_METRES: u32 = 20_000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: String,
}

impl RegisterRequest {
    /// Storefront registrations always create customer accounts
    pub fn customer(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        phone: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            phone: phone.filter(|p| !p.trim().is_empty()),
            role: User::CUSTOMER_ROLE.to_string(),
        }
    }
}

/// Issued on login and registration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: User,
    pub access_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

/// Filters shared by the service and product listings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl ListQuery {
    /// Category filters are sent lowercase; the "All" chip means no filter
    pub fn with_category(mut self, category: Option<&str>) -> Self {
        self.category = category
            .filter(|c| !c.eq_ignore_ascii_case("all"))
            .map(str::to_lowercase);
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceList {
    pub services: Vec<Service>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductList {
    pub products: Vec<Product>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingList {
    pub bookings: Vec<Booking>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderList {
    pub orders: Vec<Order>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewList {
    pub reviews: Vec<Review>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageList {
    pub messages: Vec<Message>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NearbyList {
    pub users: Vec<ServicePerson>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromotionList {
    pub promotions: Vec<Promotion>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportList {
    pub reports: Vec<Report>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FavouriteList {
    pub favourites: Vec<Ref<Service>>,
}

pub type ConversationList = Vec<Conversation>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyQuery {
    pub lat: f64,
    pub lng: f64,
    pub radius: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotQuery {
    pub date: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotList {
    pub date: String,
    pub slots: Vec<Slot>,
}

impl SlotList {
    /// Slots that can still be booked
    pub fn available(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter().filter(|slot| slot.available)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub service_person_id: String,
    pub service_ids: Vec<String>,
    /// Start of the chosen slot
    pub booking_date: String,
    pub booking_type: BookingType,
}

/// Payment secret handed to the hosted card element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub client_secret: String,
    /// Amount in cents
    pub amount: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingCreated {
    pub booking: Booking,
    pub client_secret: String,
}

impl BookingCreated {
    /// Payment to confirm, charging `fallback_amount` when the booking has no total
    pub fn payment_intent(&self, fallback_amount: i64) -> PaymentIntent {
        PaymentIntent {
            client_secret: self.client_secret.clone(),
            amount: self.booking.total_amount.unwrap_or(fallback_amount),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleRequest {
    pub new_booking_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemRequest {
    pub product_id: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuantityRequest {
    pub quantity: u32,
}

/// Checkout prepares a payment; the order itself is created once it succeeds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub client_secret: String,
    pub total_amount: i64,
}

impl From<CheckoutResponse> for PaymentIntent {
    fn from(checkout: CheckoutResponse) -> Self {
        Self {
            client_secret: checkout.client_secret,
            amount: checkout.total_amount,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub service_person_id: String,
    pub booking_id: String,
    pub rating: u8,
    pub comment: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartConversationRequest {
    pub target_user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub text: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UnreadCount {
    pub unread_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub reason: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}
