//! Persisted client state: the signed-in user and the local cart mirror
//!
//! The snapshot crosses a serialization boundary on every transition. `load`
//! and `save` are pure so the owner decides where the bytes live.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{CartItem, User};

/// Key the snapshot is persisted under
pub const STORE_KEY: &str = "luxe-cx";

/// Current snapshot schema version
pub const SNAPSHOT_VERSION: u32 = 0;

/// Everything the storefront keeps between runs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSnapshot {
    pub user: Option<User>,
    pub cart: Vec<CartItem>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope<S> {
    state: S,
    #[serde(default)]
    version: u32,
}

/// Decode a persisted snapshot
///
/// Empty input is a fresh install and yields the default snapshot. Missing
/// fields take their defaults and unknown fields are ignored.
///
/// # Errors
///
/// Returns an error if the bytes are not a snapshot envelope or were written
/// by a newer schema version.
pub fn load(bytes: &[u8]) -> CoreResult<StoreSnapshot> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(StoreSnapshot::default());
    }

    let envelope: Envelope<StoreSnapshot> = serde_json::from_slice(bytes)?;
    if envelope.version > SNAPSHOT_VERSION {
        return Err(CoreError::SnapshotVersion {
            found: envelope.version,
            supported: SNAPSHOT_VERSION,
        });
    }

    Ok(envelope.state)
}

/// Encode a snapshot for persistence
#[must_use]
pub fn save(snapshot: &StoreSnapshot) -> Vec<u8> {
    let envelope = Envelope {
        state: snapshot,
        version: SNAPSHOT_VERSION,
    };
    // A snapshot holds only strings, integers and floats, so encoding cannot fail.
    serde_json::to_vec_pretty(&envelope).unwrap_or_default()
}

impl StoreSnapshot {
    /// Record the signed-in user
    pub fn login(&mut self, user: User) {
        self.user = Some(user);
    }

    /// Forget the signed-in user; the cart survives
    pub fn logout(&mut self) {
        self.user = None;
    }

    pub fn set_user(&mut self, user: User) {
        self.user = Some(user);
    }

    /// Add a line, merging quantity into an existing line for the same product
    ///
    /// `quantity` defaults to one.
    pub fn add_to_cart(&mut self, item: CartItem, quantity: Option<u32>) {
        let quantity = quantity.unwrap_or(1);
        match self
            .cart
            .iter_mut()
            .find(|line| line.product_id == item.product_id)
        {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.cart.push(CartItem { quantity, ..item }),
        }
    }

    pub fn remove_from_cart(&mut self, product_id: &str) {
        self.cart.retain(|line| line.product_id != product_id);
    }

    /// Set the quantity of a line; zero or less removes it
    pub fn update_qty(&mut self, product_id: &str, quantity: i64) {
        if quantity <= 0 {
            self.remove_from_cart(product_id);
            return;
        }

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if let Some(line) = self
            .cart
            .iter_mut()
            .find(|line| line.product_id == product_id)
        {
            line.quantity = quantity;
        }
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }

    /// Sum of all line totals in cents
    #[must_use]
    pub fn cart_subtotal(&self) -> i64 {
        self.cart.iter().map(CartItem::line_total).sum()
    }

    /// Number of units in the cart
    #[must_use]
    pub fn cart_count(&self) -> u32 {
        self.cart.iter().map(|line| line.quantity).sum()
    }
}
