//! # Cart Module
//!
//! The in-memory aggregate for one in-progress transaction.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Cart Lifecycle                                     │
//! │                                                                         │
//! │  checkout start ──► Cart::new()            (empty draft)                │
//! │                                                                         │
//! │  pick product ────► add_or_increment()     merge by (product,variation) │
//! │  change qty ──────► set_quantity()         q ≤ 0 removes the line       │
//! │  order extras ────► set_discount/shipping/order_tax                     │
//! │                                                                         │
//! │  commit ──────────► snapshot()             immutable copy for recording │
//! │                     clear()                back to empty draft          │
//! │                                                                         │
//! │  INVARIANTS:                                                            │
//! │  • subtotal = Σ line_total                                              │
//! │  • total = subtotal − discount + shipping + order_tax, clamped ≥ 0      │
//! │  • prices are frozen at add time, never re-resolved                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::money::{Money, Quantity};

// =============================================================================
// Line Identity
// =============================================================================

/// Identifies a cart line: one line per (product, variation) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineKey {
    pub product_id: String,
    pub variation_id: String,
}

impl LineKey {
    pub fn new(product_id: impl Into<String>, variation_id: impl Into<String>) -> Self {
        LineKey {
            product_id: product_id.into(),
            variation_id: variation_id.into(),
        }
    }
}

// =============================================================================
// Catalog Item
// =============================================================================

/// A priced catalog entry, resolved by the caller at add time.
///
/// ## Price Freezing
/// The unit price is whatever the catalog said when the item was added.
/// If the catalog price changes afterwards, existing cart lines keep the
/// price the customer saw.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    pub product_id: String,
    pub variation_id: String,
    pub name: String,
    pub unit_price: Money,
}

// =============================================================================
// Line Item
// =============================================================================

/// One line of the cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: String,
    pub variation_id: String,
    /// Product name at add time (frozen).
    pub name: String,
    /// Unit price at add time (frozen).
    pub unit_price: Money,
    pub quantity: Quantity,
    /// Line-level discount, absolute amount.
    pub discount: Money,
    /// Line-level tax, absolute amount.
    pub tax: Money,
}

impl LineItem {
    fn from_catalog(item: &CatalogItem, quantity: Quantity) -> Self {
        LineItem {
            product_id: item.product_id.clone(),
            variation_id: item.variation_id.clone(),
            name: item.name.clone(),
            unit_price: item.unit_price,
            quantity,
            discount: Money::zero(),
            tax: Money::zero(),
        }
    }

    /// Returns this line's identity key.
    pub fn key(&self) -> LineKey {
        LineKey::new(self.product_id.clone(), self.variation_id.clone())
    }

    fn matches(&self, key: &LineKey) -> bool {
        self.product_id == key.product_id && self.variation_id == key.variation_id
    }

    /// `unit_price × quantity − discount + tax`, rounded once
    /// (half-to-even) inside the multiplication.
    pub fn line_total(&self) -> Money {
        self.unit_price.mul_quantity(self.quantity) - self.discount + self.tax
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The in-progress transaction aggregate.
///
/// Owned exclusively by the active checkout session; never mutated from
/// two callers at once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    /// Ordered lines, unique by (product_id, variation_id).
    lines: Vec<LineItem>,
    /// Order-level discount, absolute amount.
    discount: Money,
    /// Shipping charge.
    shipping: Money,
    /// Order-level tax, absolute amount.
    order_tax: Money,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart::default()
    }

    /// Adds a product to the cart, or bumps its quantity by one unit if a
    /// line for the same (product, variation) already exists.
    ///
    /// New lines are appended, preserving the order items were rung up in.
    /// The unit price is taken from `item` and never re-resolved afterwards.
    pub fn add_or_increment(&mut self, item: &CatalogItem) {
        let key = LineKey::new(item.product_id.clone(), item.variation_id.clone());
        if let Some(line) = self.lines.iter_mut().find(|l| l.matches(&key)) {
            line.quantity = line.quantity + Quantity::ONE;
            return;
        }
        self.lines.push(LineItem::from_catalog(item, Quantity::ONE));
    }

    /// Sets the quantity for a line.
    ///
    /// ## Behavior
    /// - `quantity ≤ 0` removes the line (a non-positive quantity is never
    ///   persisted)
    /// - an absent key is a silent no-op, so duplicate UI events are
    ///   harmless and the operation is idempotent
    pub fn set_quantity(&mut self, key: &LineKey, quantity: Quantity) {
        if !quantity.is_positive() {
            self.lines.retain(|l| !l.matches(key));
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| l.matches(key)) {
            line.quantity = quantity;
        }
    }

    /// Removes a line outright. Absent key is a no-op.
    pub fn remove_line(&mut self, key: &LineKey) {
        self.lines.retain(|l| !l.matches(key));
    }

    /// Sets the order-level discount. Negative input is coerced to its
    /// absolute value so a sign slip cannot inflate the total.
    pub fn set_discount(&mut self, amount: Money) {
        self.discount = amount.abs();
    }

    /// Sets the shipping charge. Negative input is coerced to absolute.
    pub fn set_shipping(&mut self, amount: Money) {
        self.shipping = amount.abs();
    }

    /// Sets the order-level tax. Negative input is coerced to absolute.
    pub fn set_order_tax(&mut self, amount: Money) {
        self.order_tax = amount.abs();
    }

    /// Resets to the empty draft state.
    pub fn clear(&mut self) {
        *self = Cart::default();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    pub fn discount(&self) -> Money {
        self.discount
    }

    pub fn shipping(&self) -> Money {
        self.shipping
    }

    pub fn order_tax(&self) -> Money {
        self.order_tax
    }

    /// `Σ line_total`.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(|l| l.line_total()).sum()
    }

    /// `subtotal − discount + shipping + order_tax`, clamped to zero.
    pub fn total(&self) -> Money {
        (self.subtotal() - self.discount + self.shipping + self.order_tax).clamp_non_negative()
    }

    /// Takes an immutable, transaction-ready copy. The cart itself is not
    /// mutated; clearing is a separate, deliberate step after commit.
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            lines: self.lines.clone(),
            discount: self.discount,
            shipping: self.shipping,
            order_tax: self.order_tax,
            subtotal: self.subtotal(),
            total: self.total(),
        }
    }
}

// =============================================================================
// Cart Snapshot
// =============================================================================

/// Frozen copy of a cart at commit time.
///
/// This is what the transaction recorder persists; the live cart is
/// discarded (cleared) once the snapshot has been durably stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartSnapshot {
    pub lines: Vec<LineItem>,
    pub discount: Money,
    pub shipping: Money,
    pub order_tax: Money,
    pub subtotal: Money,
    pub total: Money,
}

impl CartSnapshot {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Cart totals summary for status displays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartTotals {
    pub line_count: usize,
    pub subtotal: Money,
    pub discount: Money,
    pub shipping: Money,
    pub order_tax: Money,
    pub total: Money,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            line_count: cart.line_count(),
            subtotal: cart.subtotal(),
            discount: cart.discount(),
            shipping: cart.shipping(),
            order_tax: cart.order_tax(),
            total: cart.total(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(product: &str, variation: &str, price_minor: i64) -> CatalogItem {
        CatalogItem {
            product_id: product.to_string(),
            variation_id: variation.to_string(),
            name: format!("Product {product}/{variation}"),
            unit_price: Money::from_minor(price_minor),
        }
    }

    #[test]
    fn test_add_new_line() {
        let mut cart = Cart::new();
        cart.add_or_increment(&item("p1", "v1", 999));

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.subtotal().minor(), 999);
    }

    #[test]
    fn test_add_same_pair_increments() {
        let mut cart = Cart::new();
        cart.add_or_increment(&item("p1", "v1", 999));
        cart.add_or_increment(&item("p1", "v1", 999));

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.lines()[0].quantity, Quantity::from_units(2));
        assert_eq!(cart.subtotal().minor(), 1998);
    }

    #[test]
    fn test_different_variation_is_new_line() {
        let mut cart = Cart::new();
        cart.add_or_increment(&item("p1", "v1", 999));
        cart.add_or_increment(&item("p1", "v2", 1099));

        assert_eq!(cart.line_count(), 2);
    }

    #[test]
    fn test_price_frozen_at_add_time() {
        let mut cart = Cart::new();
        cart.add_or_increment(&item("p1", "v1", 999));

        // catalog price changed; second add still merges into the old line
        // and the frozen unit price wins
        cart.add_or_increment(&item("p1", "v1", 1299));

        assert_eq!(cart.lines()[0].unit_price.minor(), 999);
        assert_eq!(cart.subtotal().minor(), 1998);
    }

    #[test]
    fn test_set_quantity() {
        let mut cart = Cart::new();
        cart.add_or_increment(&item("p1", "v1", 1000));
        let key = LineKey::new("p1", "v1");

        cart.set_quantity(&key, Quantity::from_units(3));
        assert_eq!(cart.subtotal().minor(), 3000);
    }

    #[test]
    fn test_set_quantity_zero_removes_line() {
        let mut cart = Cart::new();
        cart.add_or_increment(&item("p1", "v1", 1000));
        let key = LineKey::new("p1", "v1");

        cart.set_quantity(&key, Quantity::zero());
        assert!(cart.is_empty());

        cart.add_or_increment(&item("p1", "v1", 1000));
        cart.set_quantity(&key, Quantity::from_milli(-500));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_missing_key_is_noop() {
        let mut cart = Cart::new();
        cart.add_or_increment(&item("p1", "v1", 1000));

        cart.set_quantity(&LineKey::new("ghost", "v1"), Quantity::from_units(5));
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.subtotal().minor(), 1000);
    }

    /// Idempotence: applying the same set_quantity twice is the same as once.
    #[test]
    fn test_set_quantity_idempotent() {
        let mut cart = Cart::new();
        cart.add_or_increment(&item("p1", "v1", 1000));
        let key = LineKey::new("p1", "v1");

        cart.set_quantity(&key, Quantity::from_units(4));
        let once = cart.snapshot();
        cart.set_quantity(&key, Quantity::from_units(4));
        let twice = cart.snapshot();

        assert_eq!(once.total, twice.total);
        assert_eq!(once.lines.len(), twice.lines.len());
        assert_eq!(once.lines[0].quantity, twice.lines[0].quantity);
    }

    #[test]
    fn test_negative_adjustments_coerced_to_absolute() {
        let mut cart = Cart::new();
        cart.add_or_increment(&item("p1", "v1", 5000));

        cart.set_discount(Money::from_minor(-300));
        cart.set_shipping(Money::from_minor(-200));
        cart.set_order_tax(Money::from_minor(-100));

        assert_eq!(cart.discount().minor(), 300);
        assert_eq!(cart.shipping().minor(), 200);
        assert_eq!(cart.order_tax().minor(), 100);
        assert_eq!(cart.total().minor(), 5000 - 300 + 200 + 100);
    }

    #[test]
    fn test_total_identity() {
        let mut cart = Cart::new();
        cart.add_or_increment(&item("p1", "v1", 1000));
        cart.add_or_increment(&item("p2", "v1", 2500));
        cart.set_quantity(&LineKey::new("p1", "v1"), Quantity::from_milli(2500));
        cart.set_discount(Money::from_minor(150));
        cart.set_shipping(Money::from_minor(400));
        cart.set_order_tax(Money::from_minor(90));

        let expected =
            cart.subtotal() - cart.discount() + cart.shipping() + cart.order_tax();
        assert_eq!(cart.total(), expected.clamp_non_negative());
        assert!(cart.total().minor() >= 0);
    }

    #[test]
    fn test_total_clamped_to_zero() {
        let mut cart = Cart::new();
        cart.add_or_increment(&item("p1", "v1", 500));
        cart.set_discount(Money::from_minor(2000));

        assert_eq!(cart.total(), Money::zero());
    }

    #[test]
    fn test_snapshot_does_not_mutate_cart() {
        let mut cart = Cart::new();
        cart.add_or_increment(&item("p1", "v1", 1000));

        let snap = cart.snapshot();
        assert_eq!(snap.total.minor(), 1000);
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total().minor(), 1000);
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add_or_increment(&item("p1", "v1", 1000));
        cart.set_discount(Money::from_minor(100));

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.discount(), Money::zero());
        assert_eq!(cart.total(), Money::zero());
    }

    #[test]
    fn test_fractional_quantity_line_total() {
        let mut cart = Cart::new();
        cart.add_or_increment(&item("p1", "v1", 299));
        cart.set_quantity(&LineKey::new("p1", "v1"), Quantity::from_milli(1500));

        // 2.99 × 1.5 = 4.485 → 4.48 (half to even)
        assert_eq!(cart.subtotal().minor(), 448);
    }
}
