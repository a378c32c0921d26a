//! Shopping cart state and its reducer.
//!
//! [`CartState`] is a plain value: an insertion-ordered list of line items
//! plus a cached total. Every change goes through [`CartState::reduce`] (or
//! the equivalent named methods), each of which recomputes the total before
//! returning, so `total_amount() == Σ price × quantity` holds after every
//! transition.
//!
//! The reducer performs no I/O. Persisting the cart after a transition is
//! the caller's job; see `CartStore` in the storefront crate.

use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// One product entry in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineItem {
    /// Product key; unique within a cart.
    pub id: ProductId,
    /// Product title at the time it was added.
    pub title: String,
    /// Unit price at the time it was added.
    pub price: Price,
    /// Number of units, always at least 1.
    pub quantity: u32,
    /// Remaining stock as last fetched from the catalog.
    pub stock: u32,
    /// Product image URL, if any.
    #[serde(default)]
    pub image: Option<String>,
}

impl CartLineItem {
    /// Price of this line (`price × quantity`).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }

    /// Whether more units are in the cart than were last known in stock.
    #[must_use]
    pub const fn exceeds_stock(&self) -> bool {
        self.quantity > self.stock
    }
}

/// Product data needed to put a new line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLineItem {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    pub stock: u32,
    pub image: Option<String>,
}

impl NewLineItem {
    fn into_line(self) -> CartLineItem {
        CartLineItem {
            id: self.id,
            title: self.title,
            price: self.price,
            quantity: 1,
            stock: self.stock,
            image: self.image,
        }
    }
}

/// A cart mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartAction {
    /// Add one unit of a product, appending a new line if needed.
    Add(NewLineItem),
    /// Add one unit to an existing line.
    Increase(ProductId),
    /// Take one unit off a line, dropping the line at zero.
    Decrease(ProductId),
    /// Drop a line entirely.
    Remove(ProductId),
    /// Empty the cart.
    Clear,
}

/// A line whose quantity is above the last-known stock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockShortfall {
    pub id: ProductId,
    pub title: String,
    pub requested: u32,
    pub available: u32,
}

/// Cart contents and derived total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CartState {
    items: Vec<CartLineItem>,
    total_amount: Price,
}

impl CartState {
    /// An empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a cart from a persisted item list.
    ///
    /// Lines with zero quantity are dropped and repeated product keys are
    /// merged into the first occurrence, so a hand-edited or stale snapshot
    /// still yields a cart that satisfies the uniqueness invariant.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = CartLineItem>) -> Self {
        let mut merged: Vec<CartLineItem> = Vec::new();
        for item in items {
            if item.quantity == 0 {
                continue;
            }
            match merged.iter_mut().find(|existing| existing.id == item.id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(item.quantity);
                }
                None => merged.push(item),
            }
        }

        let mut state = Self {
            items: merged,
            total_amount: Price::ZERO,
        };
        state.recompute_total();
        state
    }

    /// Apply one action.
    pub fn reduce(&mut self, action: CartAction) {
        match action {
            CartAction::Add(item) => self.add(item),
            CartAction::Increase(id) => self.increase(&id),
            CartAction::Decrease(id) => self.decrease(&id),
            CartAction::Remove(id) => self.remove(&id),
            CartAction::Clear => self.clear(),
        }
    }

    /// Add one unit of `item`. Stock is not checked here.
    pub fn add(&mut self, item: NewLineItem) {
        match self.line_mut(&item.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(1),
            None => self.items.push(item.into_line()),
        }
        self.recompute_total();
    }

    /// Add one unit to the line for `id`; unknown ids are ignored.
    pub fn increase(&mut self, id: &ProductId) {
        if let Some(line) = self.line_mut(id) {
            line.quantity = line.quantity.saturating_add(1);
        }
        self.recompute_total();
    }

    /// Remove one unit from the line for `id`, dropping it at quantity 1.
    pub fn decrease(&mut self, id: &ProductId) {
        match self.line_mut(id) {
            Some(line) if line.quantity > 1 => line.quantity -= 1,
            _ => self.items.retain(|line| &line.id != id),
        }
        self.recompute_total();
    }

    /// Drop the line for `id`.
    pub fn remove(&mut self, id: &ProductId) {
        self.items.retain(|line| &line.id != id);
        self.recompute_total();
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
        self.total_amount = Price::ZERO;
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Σ price × quantity over all lines.
    #[must_use]
    pub const fn total_amount(&self) -> Price {
        self.total_amount
    }

    /// Total number of units (for the cart badge).
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |acc, line| acc.saturating_add(line.quantity))
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up the line for a product.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|line| &line.id == id)
    }

    /// Lines asking for more units than the last-known stock.
    #[must_use]
    pub fn stock_shortfalls(&self) -> Vec<StockShortfall> {
        self.items
            .iter()
            .filter(|line| line.exceeds_stock())
            .map(|line| StockShortfall {
                id: line.id.clone(),
                title: line.title.clone(),
                requested: line.quantity,
                available: line.stock,
            })
            .collect()
    }

    /// Consume the cart, returning its lines.
    #[must_use]
    pub fn into_items(self) -> Vec<CartLineItem> {
        self.items
    }

    fn line_mut(&mut self, id: &ProductId) -> Option<&mut CartLineItem> {
        self.items.iter_mut().find(|line| &line.id == id)
    }

    fn recompute_total(&mut self) {
        self.total_amount = self.items.iter().map(CartLineItem::line_total).sum();
    }
}
