//! Luxe storefront core types and client state

pub mod error;
pub mod money;
pub mod store;
pub mod types;

pub use error::{CoreError, CoreResult};
pub use money::format_zar;
pub use store::StoreSnapshot;
pub use types::{
    Booking, BookingStatus, BookingTab, BookingType, CartItem, Order, OrderStatus, Product, Ref,
    Service, ServicePerson, User,
};
