use lumi_contracts::catalog::{Catalog, OrderStatus};
use lumi_contracts::money::Money;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRow {
    pub id: String,
    pub date: String,
    pub status: OrderStatus,
    pub lead_item: Option<String>,
    pub lead_size: Option<String>,
    pub item_count: usize,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrdersView {
    pub rows: Vec<OrderRow>,
}

impl OrdersView {
    pub fn of(catalog: &Catalog) -> Self {
        let rows = catalog
            .orders()
            .iter()
            .map(|order| {
                let lead = order.items.first();
                OrderRow {
                    id: order.id.clone(),
                    date: order.date.clone(),
                    status: order.status,
                    lead_item: lead.map(|item| item.product.name.clone()),
                    lead_size: lead.map(|item| item.size.clone()),
                    item_count: order.items.len(),
                    total: order.total,
                }
            })
            .collect();
        Self { rows }
    }
}
