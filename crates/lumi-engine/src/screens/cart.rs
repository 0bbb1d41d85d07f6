use lumi_contracts::cart::Cart;
use lumi_contracts::money::Money;

pub const COMPLIMENTARY: &str = "Complimentary";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub size: String,
    pub color: Option<String>,
    pub unit_price: Money,
    pub quantity: u32,
    pub line_total: Money,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    pub lines: Vec<CartLine>,
    pub subtotal: Money,
    pub shipping: Money,
    pub shipping_label: String,
    pub total: Money,
}

impl CartView {
    /// The cart screen is stateless: quantity and removal intents go
    /// straight to the shell, which owns the cart.
    pub fn of(cart: &Cart) -> Self {
        let totals = cart.totals();
        let shipping_label = if totals.shipping.is_zero() {
            COMPLIMENTARY.to_string()
        } else {
            totals.shipping.to_string()
        };
        Self {
            lines: cart
                .items()
                .iter()
                .map(|item| CartLine {
                    product_id: item.product.id.clone(),
                    name: item.product.name.clone(),
                    size: item.size.clone(),
                    color: item.selected_color.clone(),
                    unit_price: item.product.price,
                    quantity: item.quantity,
                    line_total: item.line_total(),
                })
                .collect(),
            subtotal: totals.subtotal,
            shipping: totals.shipping,
            shipping_label,
            total: totals.total,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
