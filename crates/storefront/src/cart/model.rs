//! Cart line items and the pure mutation rules.
//!
//! Nothing here touches storage; [`super::CartManager`] wraps these rules with
//! persistence and change notification.

use std::collections::HashMap;

use pocketstore_core::types::price::format_amount;
use pocketstore_core::{Product, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One product in the cart together with its quantity.
///
/// Serialized as the product's own fields plus `quantity`, the layout used by
/// the `@cart_items` snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(flatten)]
    product: Product,
    quantity: u32,
}

impl CartItem {
    fn new(product: Product) -> Self {
        Self {
            product,
            quantity: 1,
        }
    }

    /// The product this line refers to.
    #[must_use]
    pub const fn product(&self) -> &Product {
        &self.product
    }

    /// Product id, the line's identity.
    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.product.id
    }

    /// Units of the product in the cart (always at least 1).
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price.times(self.quantity)
    }
}

/// Ordered cart contents.
///
/// Invariants: at most one line per product id, every quantity is at least 1,
/// lines keep the order in which their products were first added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CartItem>", into = "Vec<CartItem>")]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from raw line items, restoring the invariants.
    ///
    /// Lines with quantity 0 are dropped; duplicate ids are merged into the
    /// first occurrence by summing quantities.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = CartItem>) -> Self {
        let mut merged: Vec<CartItem> = Vec::new();
        let mut index: HashMap<ProductId, usize> = HashMap::new();

        for item in items {
            if item.quantity == 0 {
                continue;
            }
            if let Some(line) = index.get(&item.id()).and_then(|&i| merged.get_mut(i)) {
                line.quantity = line.quantity.saturating_add(item.quantity);
            } else {
                index.insert(item.id(), merged.len());
                merged.push(item);
            }
        }

        Self { items: merged }
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The line for a product, if present.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Whether a product is in the cart.
    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    fn position(&self, id: ProductId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    /// Add one unit of `product`, appending a new line if it is not in the cart.
    pub fn add(&mut self, product: &Product) {
        match self.items.iter_mut().find(|item| item.id() == product.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(1),
            None => self.items.push(CartItem::new(product.clone())),
        }
    }

    /// Remove one unit, or the whole line when `remove_all` is set or only one
    /// unit is left. Returns `false` if the product is not in the cart.
    pub fn remove(&mut self, id: ProductId, remove_all: bool) -> bool {
        let Some(pos) = self.position(id) else {
            return false;
        };

        let last_unit = self.items.get(pos).is_none_or(|line| line.quantity <= 1);
        if remove_all || last_unit {
            self.items.remove(pos);
        } else if let Some(line) = self.items.get_mut(pos) {
            line.quantity -= 1;
        }
        true
    }

    /// Add one unit to an existing line. Returns `false` if the product is not
    /// in the cart.
    pub fn increase_quantity(&mut self, id: ProductId) -> bool {
        match self.items.iter_mut().find(|item| item.id() == id) {
            Some(line) => {
                line.quantity = line.quantity.saturating_add(1);
                true
            }
            None => false,
        }
    }

    /// Remove one unit; the line goes away when its last unit does.
    pub fn decrease_quantity(&mut self, id: ProductId) -> bool {
        self.remove(id, false)
    }

    /// Drop every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of `price × quantity` over all lines, saturating at `Decimal::MAX`.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items
            .iter()
            .map(CartItem::line_total)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// [`Self::total`] formatted with exactly two decimal places.
    #[must_use]
    pub fn total_display(&self) -> String {
        format_amount(self.total())
    }

    /// Total units across all lines.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}

impl From<Vec<CartItem>> for Cart {
    fn from(items: Vec<CartItem>) -> Self {
        Self::from_items(items)
    }
}

impl From<Cart> for Vec<CartItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
pub(crate) mod tests {
    use pocketstore_core::{Category, CategoryId, Price};

    use super::*;

    pub(crate) fn product(id: i64, cents: u32) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            slug: None,
            price: Price::from_cents(cents),
            description: String::new(),
            category: Category::new(CategoryId::new(1), "Clothes"),
            images: vec![format!("https://placehold.co/{id}")],
            creation_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_repeated_add_increments_single_line() {
        let mut cart = Cart::new();
        let p = product(1, 1000);

        for _ in 0..5 {
            cart.add(&p);
        }

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(p.id).unwrap().quantity(), 5);
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut cart = Cart::new();
        cart.add(&product(3, 100));
        cart.add(&product(1, 100));
        cart.add(&product(3, 100));
        cart.add(&product(2, 100));

        let ids: Vec<i64> = cart.items().iter().map(|i| i.id().as_i64()).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_add_then_remove_all_restores_prior_state() {
        let mut cart = Cart::new();
        cart.add(&product(1, 1000));
        cart.add(&product(2, 550));
        let before = cart.clone();

        let p = product(9, 4200);
        cart.add(&p);
        cart.add(&p);
        assert!(cart.remove(p.id, true));

        assert_eq!(cart, before);
    }

    #[test]
    fn test_remove_one_unit() {
        let mut cart = Cart::new();
        let p = product(1, 1000);
        cart.add(&p);
        cart.add(&p);

        assert!(cart.remove(p.id, false));
        assert_eq!(cart.get(p.id).unwrap().quantity(), 1);

        assert!(cart.remove(p.id, false));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut cart = Cart::new();
        cart.add(&product(1, 1000));
        let before = cart.clone();

        assert!(!cart.remove(ProductId::new(77), true));
        assert!(!cart.decrease_quantity(ProductId::new(77)));
        assert!(!cart.increase_quantity(ProductId::new(77)));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_decrease_quantity_removes_at_one() {
        let mut cart = Cart::new();
        let p = product(1, 1000);
        cart.add(&p);

        assert!(cart.decrease_quantity(p.id));
        assert!(!cart.contains(p.id));
    }

    #[test]
    fn test_decrease_quantity_decrements_above_one() {
        let mut cart = Cart::new();
        let p = product(1, 1000);
        cart.add(&p);
        cart.increase_quantity(p.id);
        cart.increase_quantity(p.id);

        assert!(cart.decrease_quantity(p.id));
        assert_eq!(cart.get(p.id).unwrap().quantity(), 2);
    }

    #[test]
    fn test_total_and_count() {
        let mut cart = Cart::new();
        let a = product(1, 1000);
        let b = product(2, 550);
        cart.add(&a);
        cart.add(&a);
        cart.add(&b);

        assert_eq!(cart.total_display(), "25.50");
        assert_eq!(cart.count(), 3);
        assert_eq!(cart.len(), 2);
    }

    #[test]
    fn test_total_saturates_instead_of_overflowing() {
        let mut huge = product(1, 0);
        let amount = Decimal::from(10_u64.pow(19)) * Decimal::from(10_u64.pow(9));
        huge.price = Price::new(amount).unwrap();
        let mut cart = Cart::new();
        for _ in 0..8 {
            cart.add(&huge);
        }
        cart.add(&product(2, 550));

        assert_eq!(cart.total(), Decimal::MAX);
        assert!(cart.total_display().starts_with("79228162514264337593543950335"));
        assert_eq!(cart.count(), 9);
    }

    #[test]
    fn test_empty_cart_totals() {
        let cart = Cart::new();
        assert_eq!(cart.total_display(), "0.00");
        assert_eq!(cart.count(), 0);
    }

    #[test]
    fn test_from_items_normalizes() {
        let json = serde_json::json!([
            serde_json::to_value(CartItem { product: product(1, 100), quantity: 2 }).unwrap(),
            serde_json::to_value(CartItem { product: product(2, 100), quantity: 0 }).unwrap(),
            serde_json::to_value(CartItem { product: product(1, 100), quantity: 3 }).unwrap(),
            serde_json::to_value(CartItem { product: product(3, 100), quantity: 1 }).unwrap(),
        ]);

        let cart: Cart = serde_json::from_value(json).unwrap();

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.items()[0].id(), ProductId::new(1));
        assert_eq!(cart.items()[0].quantity(), 5);
        assert_eq!(cart.items()[1].id(), ProductId::new(3));
    }

    #[test]
    fn test_snapshot_layout() {
        let mut cart = Cart::new();
        cart.add(&product(1, 1000));

        let value = serde_json::to_value(&cart).unwrap();
        let line = &value.as_array().unwrap()[0];

        assert_eq!(line["id"], serde_json::json!(1));
        assert_eq!(line["quantity"], serde_json::json!(1));
        assert_eq!(line["price"], serde_json::json!("10.00"));
        assert_eq!(line["category"]["name"], serde_json::json!("Clothes"));
    }

    #[test]
    fn test_snapshot_accepts_numeric_prices() {
        let cart: Cart = serde_json::from_str(
            r#"[{"id": 7, "title": "Lamp", "price": 12.5, "description": "",
                 "category": {"id": 2, "name": "Home"}, "images": [], "quantity": 2}]"#,
        )
        .unwrap();

        assert_eq!(cart.total_display(), "25.00");
    }
}
