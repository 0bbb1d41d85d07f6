use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::money::Money;

pub const DEFAULT_SIZE: &str = "M";
pub const STANDARD_SHIPPING: Money = Money::from_dollars(25);
/// Subtotals strictly above this ship free.
pub const FREE_SHIPPING_OVER: Money = Money::from_dollars(500);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
    pub size: String,
    pub selected_color: Option<String>,
}

impl CartItem {
    pub fn line_total(&self) -> Money {
        self.product.price.times(self.quantity)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartTotals {
    pub subtotal: Money,
    pub shipping: Money,
    pub total: Money,
}

impl CartTotals {
    pub fn for_subtotal(subtotal: Money) -> Self {
        let shipping = if subtotal > FREE_SHIPPING_OVER {
            Money::ZERO
        } else {
            STANDARD_SHIPPING
        };
        Self {
            subtotal,
            shipping,
            total: subtotal + shipping,
        }
    }
}

/// Selected items keyed by product id, kept in first-added order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, product_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product.id == product_id)
    }

    pub fn add(&mut self, product: &Product) {
        self.add_with_color(product, None);
    }

    /// A repeated product only bumps its quantity; the colour of the
    /// existing row is kept.
    pub fn add_with_color(&mut self, product: &Product, color: Option<String>) {
        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|item| item.product.id == product.id)
        {
            existing.quantity = existing.quantity.saturating_add(1);
            return;
        }
        self.items.push(CartItem {
            product: product.clone(),
            quantity: 1,
            size: DEFAULT_SIZE.to_string(),
            selected_color: color,
        });
    }

    pub fn update_quantity(&mut self, product_id: &str, delta: i64) {
        let Some(item) = self
            .items
            .iter_mut()
            .find(|item| item.product.id == product_id)
        else {
            return;
        };
        let next = (i64::from(item.quantity) + delta).clamp(1, i64::from(u32::MAX));
        item.quantity = u32::try_from(next).unwrap_or(u32::MAX);
    }

    pub fn remove(&mut self, product_id: &str) {
        self.items.retain(|item| item.product.id != product_id);
    }

    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    pub fn totals(&self) -> CartTotals {
        CartTotals::for_subtotal(self.items.iter().map(CartItem::line_total).sum())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::catalog::{Catalog, Category, Product};
    use crate::money::Money;

    use super::{Cart, CartTotals, STANDARD_SHIPPING};

    fn priced(id: &str, dollars: u64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            price: Money::from_dollars(dollars),
            image: String::new(),
            category: Category::Jacket,
            description: String::new(),
            colors: Vec::new(),
        }
    }

    fn assert_invariants(cart: &Cart) {
        let mut seen = HashSet::new();
        for item in cart.items() {
            assert!(item.quantity >= 1, "quantity dropped below one");
            assert!(seen.insert(item.product.id.clone()), "duplicate row");
        }
    }

    #[test]
    fn adding_same_product_twice_increments_quantity() {
        let product_a = priced("a", 600);
        let mut cart = Cart::new();

        cart.add(&product_a);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 1);
        assert_eq!(cart.items()[0].size, "M");
        assert_eq!(
            cart.totals(),
            CartTotals {
                subtotal: Money::from_dollars(600),
                shipping: Money::ZERO,
                total: Money::from_dollars(600),
            }
        );

        cart.add(&product_a);
        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(cart.totals().subtotal, Money::from_dollars(1200));
    }

    #[test]
    fn re_adding_leaves_other_rows_unchanged() {
        let mut cart = Cart::new();
        cart.add(&priced("a", 10));
        cart.add_with_color(&priced("b", 20), Some("#000000".to_string()));
        let before_b = cart.get("b").cloned();

        cart.add_with_color(&priced("a", 10), Some("#FFFFFF".to_string()));

        assert_eq!(cart.get("a").map(|item| item.quantity), Some(2));
        assert_eq!(cart.get("a").and_then(|item| item.selected_color.clone()), None);
        assert_eq!(cart.get("b").cloned(), before_b);
        let order: Vec<&str> = cart.items().iter().map(|i| i.product.id.as_str()).collect();
        assert_eq!(order, vec!["a", "b"]);
    }

    #[test]
    fn decrement_clamps_at_one() {
        let mut cart = Cart::new();
        cart.add(&priced("a", 10));
        cart.add(&priced("a", 10));

        cart.update_quantity("a", -5);
        assert_eq!(cart.get("a").map(|item| item.quantity), Some(1));

        cart.update_quantity("a", 3);
        assert_eq!(cart.get("a").map(|item| item.quantity), Some(4));
    }

    #[test]
    fn update_and_remove_ignore_unknown_ids() {
        let mut cart = Cart::new();
        cart.add(&priced("a", 10));
        let snapshot = cart.clone();

        cart.update_quantity("missing", 2);
        cart.remove("missing");
        assert_eq!(cart, snapshot);

        cart.remove("a");
        assert!(cart.is_empty());
    }

    #[test]
    fn shipping_is_free_only_strictly_above_threshold() {
        assert_eq!(CartTotals::for_subtotal(Money::ZERO).shipping, STANDARD_SHIPPING);
        assert_eq!(
            CartTotals::for_subtotal(Money::from_dollars(500)).shipping,
            STANDARD_SHIPPING
        );
        assert_eq!(
            CartTotals::for_subtotal(Money::from_cents(50_001)).shipping,
            Money::ZERO
        );
        let totals = CartTotals::for_subtotal(Money::from_dollars(85));
        assert_eq!(totals.total, Money::from_dollars(110));
    }

    #[test]
    fn mixed_operation_sequence_preserves_invariants() {
        let catalog = Catalog::mock();
        let mut cart = Cart::new();
        let ids = ["s1", "t1", "h1", "s1", "j1", "t1"];
        for (step, id) in ids.iter().enumerate() {
            let product = catalog.product(id).cloned().unwrap_or_else(|| priced(id, 1));
            cart.add(&product);
            cart.update_quantity(id, if step % 2 == 0 { -3 } else { 2 });
            if step == 4 {
                cart.remove("h1");
            }
            assert_invariants(&cart);
            let totals = cart.totals();
            assert_eq!(totals.total, totals.subtotal + totals.shipping);
            assert_eq!(totals.shipping.is_zero(), totals.subtotal > Money::from_dollars(500));
        }
        assert_eq!(cart.item_count(), cart.items().iter().map(|i| u64::from(i.quantity)).sum::<u64>());
    }
}
