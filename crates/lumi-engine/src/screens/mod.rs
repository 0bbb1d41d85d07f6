//! Headless screen controllers. Each one owns its local state, splits remote
//! work into a `begin_*` job and a `finish_*` step guarded by a
//! [`RequestGate`](crate::generation::RequestGate), and renders a plain view
//! model for whatever front end drives it.

pub mod account;
pub mod ai;
pub mod cart;
pub mod explore;
pub mod occasions;
pub mod orders;

use lumi_contracts::catalog::Product;
use lumi_contracts::money::Money;

pub use account::{AccountView, MenuItem};
pub use ai::{AiJob, AiMessageView, AiMode, AiScreen, AiView, PendingTurn};
pub use cart::{CartLine, CartView};
pub use explore::{
    CategoryFilter, ExploreScreen, ExploreView, FitCheckJob, FitCheckState, RecommendJob, Selection,
};
pub use occasions::{OccasionBoard, OccasionJob, OccasionView};
pub use orders::{OrderRow, OrdersView};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCard {
    pub id: String,
    pub name: String,
    pub category: &'static str,
    pub price: Money,
}

pub(crate) fn card(product: &Product) -> ProductCard {
    ProductCard {
        id: product.id.clone(),
        name: product.name.clone(),
        category: product.category.label(),
        price: product.price,
    }
}
