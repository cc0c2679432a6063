//! Shared cart session state.

use std::sync::{Arc, Mutex};

use kasa_core::{Cart, CartSnapshot, CartTotals, CatalogItem, LineKey, Money, Quantity};

/// Thread-safe handle to the active cart.
///
/// Cheap to clone; all clones see the same cart. Mutation happens under
/// a short-lived lock, never across an await point.
#[derive(Debug, Clone, Default)]
pub struct CartSession {
    cart: Arc<Mutex<Cart>>,
}

impl CartSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to the cart.
    pub fn with_cart<R>(&self, f: impl FnOnce(&Cart) -> R) -> R {
        let cart = self.cart.lock().expect("Cart mutex poisoned");
        f(&cart)
    }

    /// Write access to the cart.
    pub fn with_cart_mut<R>(&self, f: impl FnOnce(&mut Cart) -> R) -> R {
        let mut cart = self.cart.lock().expect("Cart mutex poisoned");
        f(&mut cart)
    }

    pub fn add_item(&self, item: &CatalogItem) -> CartTotals {
        self.with_cart_mut(|cart| {
            cart.add_or_increment(item);
            CartTotals::from(&*cart)
        })
    }

    pub fn set_quantity(&self, key: &LineKey, quantity: Quantity) -> CartTotals {
        self.with_cart_mut(|cart| {
            cart.set_quantity(key, quantity);
            CartTotals::from(&*cart)
        })
    }

    pub fn remove_line(&self, key: &LineKey) -> CartTotals {
        self.with_cart_mut(|cart| {
            cart.remove_line(key);
            CartTotals::from(&*cart)
        })
    }

    pub fn set_discount(&self, amount: Money) -> CartTotals {
        self.with_cart_mut(|cart| {
            cart.set_discount(amount);
            CartTotals::from(&*cart)
        })
    }

    pub fn set_shipping(&self, amount: Money) -> CartTotals {
        self.with_cart_mut(|cart| {
            cart.set_shipping(amount);
            CartTotals::from(&*cart)
        })
    }

    pub fn set_order_tax(&self, amount: Money) -> CartTotals {
        self.with_cart_mut(|cart| {
            cart.set_order_tax(amount);
            CartTotals::from(&*cart)
        })
    }

    pub fn totals(&self) -> CartTotals {
        self.with_cart(|cart| CartTotals::from(cart))
    }

    pub fn snapshot(&self) -> CartSnapshot {
        self.with_cart(|cart| cart.snapshot())
    }

    pub fn clear(&self) {
        self.with_cart_mut(|cart| cart.clear());
    }

    pub fn is_empty(&self) -> bool {
        self.with_cart(|cart| cart.is_empty())
    }
}
