mod mock;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cart::CartItem;
use crate::money::Money;

pub use mock::OCCASIONS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Shirt,
    TShirt,
    FullSleeveTShirt,
    Hoodie,
    Pant,
    Jacket,
    Shoes,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Shirt,
        Category::TShirt,
        Category::FullSleeveTShirt,
        Category::Hoodie,
        Category::Pant,
        Category::Jacket,
        Category::Shoes,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Shirt => "Shirt",
            Category::TShirt => "T-shirt",
            Category::FullSleeveTShirt => "Full-Sleeve T-shirt",
            Category::Hoodie => "Hoodie",
            Category::Pant => "Pant",
            Category::Jacket => "Jacket",
            Category::Shoes => "Shoes",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|category| {
                category.label().to_ascii_lowercase() == normalized
                    || format!("{category:?}").to_ascii_lowercase() == normalized
            })
            .ok_or_else(|| format!("Unknown category '{}'.", raw.trim()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: Money,
    pub image: String,
    pub category: Category,
    pub description: String,
    #[serde(default)]
    pub colors: Vec<String>,
}

impl Product {
    pub fn default_color(&self) -> Option<&str> {
        self.colors.first().map(String::as_str)
    }

    /// The catalog spelling of `color` when this product comes in it.
    pub fn offered_color(&self, color: &str) -> Option<&str> {
        self.colors
            .iter()
            .map(String::as_str)
            .find(|candidate| candidate.eq_ignore_ascii_case(color.trim()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Processing,
    Shipped,
    Delivered,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub date: String,
    pub status: OrderStatus,
    pub items: Vec<CartItem>,
    pub total: Money,
}

/// Read-only product and order data for one storefront session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<Product>,
    orders: Vec<Order>,
}

impl Catalog {
    pub fn new(products: Vec<Product>, orders: Vec<Order>) -> Self {
        Self { products, orders }
    }

    pub fn mock() -> Self {
        let products = mock::products();
        let orders = mock::orders(&products);
        Self::new(products, orders)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|product| product.id == id)
    }

    pub fn in_category(&self, category: Category) -> Vec<Product> {
        self.products
            .iter()
            .filter(|product| product.category == category)
            .cloned()
            .collect()
    }

    /// Products whose id is listed, in catalog order. Unknown ids are ignored.
    pub fn by_ids<S: AsRef<str>>(&self, ids: &[S]) -> Vec<Product> {
        self.products
            .iter()
            .filter(|product| ids.iter().any(|id| id.as_ref() == product.id))
            .cloned()
            .collect()
    }

    pub fn inventory_listing(&self) -> String {
        self.products
            .iter()
            .map(|product| {
                format!(
                    "- ID: {}, Name: {}, Description: {}, Price: {}",
                    product.id,
                    product.name,
                    product.description,
                    product.price.compact()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::{Catalog, Category, OrderStatus};

    #[test]
    fn mock_catalog_has_six_products_and_one_order() {
        let catalog = Catalog::mock();
        assert_eq!(catalog.products().len(), 6);
        let ids: Vec<&str> = catalog.products().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "t1", "fs1", "h1", "p1", "j1"]);

        let order = &catalog.orders()[0];
        assert_eq!(order.id, "ORD-8291");
        assert_eq!(order.status, OrderStatus::Delivered);
        assert_eq!(order.items[0].product.id, "s1");
        assert_eq!(order.items[0].selected_color.as_deref(), Some("#FFFFFF"));
        assert_eq!(order.total.to_string(), "$85.00");
    }

    #[test]
    fn category_parses_labels_and_variant_names() {
        assert_eq!("t-shirt".parse::<Category>(), Ok(Category::TShirt));
        assert_eq!(
            "Full-Sleeve T-shirt".parse::<Category>(),
            Ok(Category::FullSleeveTShirt)
        );
        assert_eq!("fullsleevetshirt".parse::<Category>(), Ok(Category::FullSleeveTShirt));
        assert!("sandals".parse::<Category>().is_err());
    }

    #[test]
    fn by_ids_keeps_catalog_order_and_drops_unknown_ids() {
        let catalog = Catalog::mock();
        let picked = catalog.by_ids(&["j1", "missing", "s1"]);
        let ids: Vec<&str> = picked.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "j1"]);
    }

    #[test]
    fn offered_color_returns_catalog_spelling() {
        let catalog = Catalog::mock();
        let shirt = catalog.product("s1").cloned().unwrap_or_else(|| panic!("s1 missing"));
        assert_eq!(shirt.offered_color(" #ffffff "), Some("#FFFFFF"));
        assert_eq!(shirt.offered_color("#123456"), None);
    }

    #[test]
    fn shoes_category_is_empty_in_mock_data() {
        assert!(Catalog::mock().in_category(Category::Shoes).is_empty());
        assert_eq!(Catalog::mock().in_category(Category::Hoodie).len(), 1);
    }

    #[test]
    fn inventory_listing_has_one_line_per_product() {
        let listing = Catalog::mock().inventory_listing();
        assert_eq!(listing.lines().count(), 6);
        assert!(listing.starts_with("- ID: s1, Name: Essential White Poplin Shirt"));
        assert!(listing.contains("Price: $320\n") || listing.ends_with("Price: $320"));
        assert!(!listing.contains(".00"));
    }
}
