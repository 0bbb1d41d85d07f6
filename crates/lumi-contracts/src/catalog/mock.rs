use crate::cart::CartItem;
use crate::money::Money;

use super::{Category, Order, OrderStatus, Product};

pub const OCCASIONS: &[&str] = &[
    "Date outfit",
    "Interview look",
    "Party wear",
    "Office wear",
    "Vacation style",
    "Wedding guest",
    "Streetwear Look",
];

fn product(
    id: &str,
    name: &str,
    dollars: u64,
    image: &str,
    category: Category,
    description: &str,
    colors: &[&str],
) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        price: Money::from_dollars(dollars),
        image: image.to_string(),
        category,
        description: description.to_string(),
        colors: colors.iter().map(|color| (*color).to_string()).collect(),
    }
}

pub(super) fn products() -> Vec<Product> {
    vec![
        product(
            "s1",
            "Essential White Poplin Shirt",
            85,
            "https://images.unsplash.com/photo-1596755094514-f87e34085b2c?q=80&w=1000&auto=format&fit=crop",
            Category::Shirt,
            "A crisp, plain white shirt in Italian cotton poplin. Features a reinforced collar and pearl buttons. Designed for a sharp, clean silhouette.",
            &["#FFFFFF"],
        ),
        product(
            "t1",
            "Matte Black Half-Sleeve Tee",
            35,
            "https://images.unsplash.com/photo-1583743814966-8936f5b7be1a?q=80&w=1000&auto=format&fit=crop",
            Category::TShirt,
            "Premium heavyweight cotton tee in deep matte black. Features a relaxed yet structured fit with clean finished hems.",
            &["#000000"],
        ),
        product(
            "fs1",
            "Signature Full-Sleeve Tee",
            55,
            "https://images.unsplash.com/photo-1618354691373-d851c5c3a990?q=80&w=1000&auto=format&fit=crop",
            Category::FullSleeveTShirt,
            "Sleek, slim-fit long sleeve tee crafted from premium pima cotton jersey. A versatile staple for layered or standalone wear.",
            &["#000000"],
        ),
        product(
            "h1",
            "Monolith Studio Hoodie",
            110,
            "https://images.unsplash.com/photo-1556821840-3a63f95609a7?q=80&w=1000&auto=format&fit=crop",
            Category::Hoodie,
            "Heavyweight organic cotton hoodie with a clean, hardware-free design. Features a double-layered hood and drop shoulders.",
            &["#000000", "#708090"],
        ),
        product(
            "p1",
            "Tailored Plain Black Pant",
            140,
            "https://images.unsplash.com/photo-1541099649105-f69ad21f3246?q=80&w=1000&auto=format&fit=crop",
            Category::Pant,
            "Precision-cut plain black trousers. Crafted from high-twist wool for a sharp drape and enduring minimalist style.",
            &["#000000"],
        ),
        product(
            "j1",
            "Modern Architecture Blazer",
            320,
            "https://images.unsplash.com/photo-1591047139829-d91aecb6caea?q=80&w=1000&auto=format&fit=crop",
            Category::Jacket,
            "A structured black blazer with sharp lapels and a hidden button placket. The pinnacle of modern luxury tailoring.",
            &["#000000"],
        ),
    ]
}

pub(super) fn orders(products: &[Product]) -> Vec<Order> {
    let Some(shirt) = products.first() else {
        return Vec::new();
    };
    vec![Order {
        id: "ORD-8291".to_string(),
        date: "Oct 24, 2023".to_string(),
        status: OrderStatus::Delivered,
        items: vec![CartItem {
            product: shirt.clone(),
            quantity: 1,
            size: "M".to_string(),
            selected_color: Some("#FFFFFF".to_string()),
        }],
        total: Money::from_dollars(85),
    }]
}
