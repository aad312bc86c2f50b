//! Records returned by the salon backend
//!
//! Every record is tolerant: optional fields default when missing and unknown
//! fields are ignored, so a backend adding a column never breaks the client.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Reference to another document, either as a bare id or populated inline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ref<T> {
    Id(String),
    Populated(Box<T>),
}

impl<T: Identified> Ref<T> {
    /// Id of the referenced document regardless of population
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) => id.as_str(),
            Self::Populated(doc) => doc.id(),
        }
    }

    /// The populated document, if the backend expanded it
    pub fn populated(&self) -> Option<&T> {
        match self {
            Self::Id(_) => None,
            Self::Populated(doc) => Some(doc.as_ref()),
        }
    }
}

/// Documents carrying a backend id
pub trait Identified {
    fn id(&self) -> &str;
}

macro_rules! identified {
    ($($ty:ty),* $(,)?) => {
        $(impl Identified for $ty {
            fn id(&self) -> &str {
                &self.id
            }
        })*
    };
}

identified!(User, Service, ServicePerson, Product, Booking, Order, Review);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRef {
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// The signed-in account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<ImageRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

impl User {
    pub const CUSTOMER_ROLE: &'static str = "customer";

    /// Only customer accounts may use the storefront
    #[must_use]
    pub fn is_customer(&self) -> bool {
        self.role == Self::CUSTOMER_ROLE
    }

    /// First word of the display name, used in greetings
    #[must_use]
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

/// A line in the locally mirrored cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    pub name: String,
    /// Unit price in cents
    pub price: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub quantity: u32,
}

impl CartItem {
    #[must_use]
    pub fn line_total(&self) -> i64 {
        self.price * i64::from(self.quantity)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePerson {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub review_count: Option<u32>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub profile_image: Option<ImageRef>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingType {
    #[default]
    Salon,
    Home,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub base_price: Option<i64>,
    #[serde(default)]
    pub price: Option<i64>,
    #[serde(default)]
    pub home_service_fee: Option<i64>,
    #[serde(default)]
    pub is_home_service: bool,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub images: Vec<ImageRef>,
    #[serde(default)]
    pub service_person: Option<Ref<ServicePerson>>,
}

impl Service {
    /// Price shown on listings: base price, falling back to the legacy field
    #[must_use]
    pub fn display_price(&self) -> i64 {
        self.base_price.or(self.price).unwrap_or(0)
    }

    /// Amount charged for a booking of the given type
    #[must_use]
    pub fn total_for(&self, booking_type: BookingType) -> i64 {
        match booking_type {
            BookingType::Salon => self.display_price(),
            BookingType::Home => self.display_price() + self.home_service_fee.unwrap_or(0),
        }
    }
}

/// An open appointment slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub start: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default = "default_true")]
    pub available: bool,
}

const fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub discount_price: Option<i64>,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub images: Vec<ImageRef>,
}

impl Product {
    /// Sale price when one is set
    #[must_use]
    pub fn display_price(&self) -> i64 {
        self.discount_price.unwrap_or(self.price)
    }

    #[must_use]
    pub fn on_sale(&self) -> bool {
        self.discount_price.is_some()
    }

    /// Build a local cart line for this product
    #[must_use]
    pub fn to_cart_item(&self, quantity: u32) -> CartItem {
        CartItem {
            product_id: self.id.clone(),
            name: self.name.clone(),
            price: self.display_price(),
            image_url: self.images.first().map(|img| img.url.clone()),
            quantity,
        }
    }
}

/// The backend-held cart
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerCart {
    pub items: Vec<ServerCartItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerCartItem {
    pub product: Ref<Product>,
    pub quantity: u32,
    #[serde(default)]
    pub price_at_time: Option<i64>,
}

impl ServerCartItem {
    /// Unit price: the price captured when added, else the product's price
    #[must_use]
    pub fn unit_price(&self) -> i64 {
        self.price_at_time
            .or_else(|| self.product.populated().map(Product::display_price))
            .unwrap_or(0)
    }
}

impl ServerCart {
    #[must_use]
    pub fn subtotal(&self) -> i64 {
        self.items
            .iter()
            .map(|item| item.unit_price() * i64::from(item.quantity))
            .sum()
    }

    /// Total number of units across all lines
    #[must_use]
    pub fn count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Quantity held for a product, zero when absent
    #[must_use]
    pub fn quantity_of(&self, product_id: &str) -> u32 {
        self.items
            .iter()
            .find(|item| item.product.id() == product_id)
            .map_or(0, |item| item.quantity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Accepted,
    Rescheduled,
    Completed,
    Cancelled,
    Rejected,
    #[serde(other)]
    Unknown,
}

impl BookingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rescheduled => "rescheduled",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Rejected => "rejected",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Filter tabs on the bookings listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BookingTab {
    #[default]
    All,
    Upcoming,
    Completed,
    Cancelled,
}

impl BookingTab {
    #[must_use]
    pub fn includes(self, status: BookingStatus) -> bool {
        match self {
            Self::All => true,
            Self::Upcoming => matches!(
                status,
                BookingStatus::Pending | BookingStatus::Accepted | BookingStatus::Rescheduled
            ),
            Self::Completed => status == BookingStatus::Completed,
            Self::Cancelled => matches!(status, BookingStatus::Cancelled | BookingStatus::Rejected),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(rename = "_id")]
    pub id: String,
    pub status: BookingStatus,
    #[serde(default)]
    pub service_person: Option<Ref<ServicePerson>>,
    #[serde(default)]
    pub services: Vec<Ref<Service>>,
    #[serde(default)]
    pub booking_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub booking_type: Option<BookingType>,
    #[serde(default)]
    pub total_amount: Option<i64>,
}

impl Booking {
    /// Appointment time, preferring the booking date over the legacy field
    #[must_use]
    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.booking_date.or(self.scheduled_at)
    }

    /// Pending or accepted bookings that have not started yet
    #[must_use]
    pub fn can_cancel(&self, now: DateTime<Utc>) -> bool {
        let open = matches!(self.status, BookingStatus::Pending | BookingStatus::Accepted);
        open && self.date().is_none_or(|date| date >= now)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Paid,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product: Ref<Product>,
    pub quantity: u32,
    #[serde(default)]
    pub price_at_time: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: String,
    pub status: OrderStatus,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub total_amount: Option<i64>,
    #[serde(default)]
    pub delivery_method: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: String,
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub customer: Option<Ref<User>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub participants: Vec<Ref<User>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(rename = "_id")]
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub sender: Option<Ref<User>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Promotion {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub ends_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn booking(status: BookingStatus, date: Option<DateTime<Utc>>) -> Booking {
        Booking {
            id: "b1".into(),
            status,
            service_person: None,
            services: vec![],
            booking_date: date,
            scheduled_at: None,
            booking_type: None,
            total_amount: None,
        }
    }

    #[test]
    fn test_user_tolerates_extra_and_missing_fields() {
        let user: User = serde_json::from_value(json!({
            "_id": "u1",
            "name": "Thandi Mokoena",
            "email": "thandi@example.com",
            "role": "customer",
            "loyaltyPoints": 40
        }))
        .unwrap();

        assert!(user.is_customer());
        assert_eq!(user.first_name(), "Thandi");
        assert!(user.phone.is_none());
    }

    #[test]
    fn test_ref_accepts_id_or_document() {
        let bare: Ref<Product> = serde_json::from_value(json!("p1")).unwrap();
        assert_eq!(bare.id(), "p1");
        assert!(bare.populated().is_none());

        let doc: Ref<Product> =
            serde_json::from_value(json!({"_id": "p2", "name": "Argan oil", "price": 15000}))
                .unwrap();
        assert_eq!(doc.id(), "p2");
        assert_eq!(doc.populated().unwrap().price, 15000);
    }

    #[test]
    fn test_service_pricing() {
        let service: Service = serde_json::from_value(json!({
            "_id": "s1",
            "name": "Silk press",
            "price": 40000,
            "homeServiceFee": 5000
        }))
        .unwrap();

        assert_eq!(service.display_price(), 40000);
        assert_eq!(service.total_for(BookingType::Salon), 40000);
        assert_eq!(service.total_for(BookingType::Home), 45000);
    }

    #[test]
    fn test_server_cart_totals() {
        let cart: ServerCart = serde_json::from_value(json!({
            "items": [
                {"product": {"_id": "p1", "name": "Shampoo", "price": 9000, "discountPrice": 7000}, "quantity": 2},
                {"product": "p2", "quantity": 1, "priceAtTime": 12000},
                {"product": "p3", "quantity": 3}
            ]
        }))
        .unwrap();

        assert_eq!(cart.subtotal(), 2 * 7000 + 12000);
        assert_eq!(cart.count(), 6);
        assert_eq!(cart.quantity_of("p2"), 1);
        assert_eq!(cart.quantity_of("missing"), 0);
    }

    #[test]
    fn test_booking_tabs() {
        assert!(BookingTab::Upcoming.includes(BookingStatus::Rescheduled));
        assert!(!BookingTab::Upcoming.includes(BookingStatus::Completed));
        assert!(BookingTab::Cancelled.includes(BookingStatus::Rejected));
        assert!(BookingTab::All.includes(BookingStatus::Unknown));
    }

    #[test]
    fn test_unknown_status_is_tolerated() {
        let status: BookingStatus = serde_json::from_value(json!("no_show")).unwrap();
        assert_eq!(status, BookingStatus::Unknown);
    }

    #[test]
    fn test_can_cancel_only_open_future_bookings() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let tomorrow = now + Duration::days(1);
        let yesterday = now - Duration::days(1);

        assert!(booking(BookingStatus::Pending, Some(tomorrow)).can_cancel(now));
        assert!(booking(BookingStatus::Accepted, Some(tomorrow)).can_cancel(now));
        assert!(!booking(BookingStatus::Pending, Some(yesterday)).can_cancel(now));
        assert!(!booking(BookingStatus::Completed, Some(tomorrow)).can_cancel(now));
    }

    #[test]
    fn test_product_to_cart_item_uses_sale_price() {
        let product: Product = serde_json::from_value(json!({
            "_id": "p1",
            "name": "Curl cream",
            "price": 20000,
            "discountPrice": 16000,
            "images": [{"url": "https://res.cloudinary.com/luxe/curl.png"}]
        }))
        .unwrap();

        let item = product.to_cart_item(2);
        assert_eq!(item.price, 16000);
        assert_eq!(item.line_total(), 32000);
        assert_eq!(
            item.image_url.as_deref(),
            Some("https://res.cloudinary.com/luxe/curl.png")
        );
    }
}
