use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};
use lumi_contracts::cart::Cart;
use lumi_contracts::conversation::Message;
use lumi_contracts::events::EventKind;
use lumi_contracts::media::InlineImage;
use serde_json::json;

use crate::events::EventSink;
use crate::gateway::{Gateway, Outcome, Pose};
use crate::generation::Ticket;
use crate::keys::KeySelector;
use crate::screens::{
    AccountView, AiScreen, CartView, CategoryFilter, ExploreScreen, OccasionBoard, OrdersView,
    Selection,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Explore,
    Ai,
    Orders,
    Cart,
    Account,
}

impl Tab {
    pub const ALL: [Tab; 5] = [Tab::Explore, Tab::Ai, Tab::Orders, Tab::Cart, Tab::Account];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Explore => "Explore",
            Tab::Ai => "Lumi AI",
            Tab::Orders => "Orders",
            Tab::Cart => "Cart",
            Tab::Account => "Account",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase();
        let tab = match normalized.as_str() {
            "explore" => Tab::Explore,
            "ai" | "lumi ai" | "lumi" => Tab::Ai,
            "orders" => Tab::Orders,
            "cart" | "bag" => Tab::Cart,
            "account" | "profile" => Tab::Account,
            _ => return Err(format!("Unknown tab '{}'.", raw.trim())),
        };
        Ok(tab)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// The mounted controller for the active tab. Stateless tabs render
/// straight from shell state.
pub enum Screen {
    Explore(ExploreScreen),
    Ai(AiScreen),
    Orders,
    Cart,
    Account,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub tab: Tab,
    pub label: &'static str,
    pub active: bool,
    /// Total units in the bag, shown on the Cart tab only.
    pub badge: Option<u64>,
}

/// Root of the storefront: owns the cart, the active tab, the theme and the
/// fit-check photo, and mounts one screen controller at a time.
pub struct Storefront {
    gateway: Gateway,
    events: EventSink,
    cart: Cart,
    tab: Tab,
    theme: Theme,
    photo: Option<InlineImage>,
    screen: Screen,
    occasions: OccasionBoard,
}

impl Storefront {
    pub fn new(gateway: Gateway) -> Self {
        let events = gateway.events().clone();
        events.emit(
            EventKind::SessionStarted,
            json!({
                "transport": gateway.transport_name(),
                "products": gateway.catalog().products().len(),
            }),
        );
        Self {
            screen: Screen::Explore(ExploreScreen::new(gateway.clone())),
            occasions: OccasionBoard::new(gateway.clone()),
            gateway,
            events,
            cart: Cart::new(),
            tab: Tab::Explore,
            theme: Theme::Light,
            photo: None,
        }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn events(&self) -> &EventSink {
        &self.events
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn photo(&self) -> Option<&InlineImage> {
        self.photo.as_ref()
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn explore(&mut self) -> Option<&mut ExploreScreen> {
        match &mut self.screen {
            Screen::Explore(screen) => Some(screen),
            _ => None,
        }
    }

    pub fn ai(&mut self) -> Option<&mut AiScreen> {
        match &mut self.screen {
            Screen::Ai(screen) => Some(screen),
            _ => None,
        }
    }

    pub fn occasions(&mut self) -> &mut OccasionBoard {
        &mut self.occasions
    }

    fn mount(&self, tab: Tab) -> Screen {
        match tab {
            Tab::Explore => Screen::Explore(ExploreScreen::new(self.gateway.clone())),
            Tab::Ai => Screen::Ai(AiScreen::new(self.gateway.clone())),
            Tab::Orders => Screen::Orders,
            Tab::Cart => Screen::Cart,
            Tab::Account => Screen::Account,
        }
    }

    /// Always remounts, even when `tab` is already active; screen-local
    /// state (chat history included) starts over.
    pub fn switch_tab(&mut self, tab: Tab) {
        self.tab = tab;
        self.screen = self.mount(tab);
        self.events.emit(EventKind::TabChanged, json!({ "tab": tab.label() }));
    }

    fn emit_cart(&self, action: &str, product_id: &str) {
        self.events.emit(
            EventKind::CartUpdated,
            json!({
                "action": action,
                "product_id": product_id,
                "units": self.cart.item_count(),
                "total_cents": self.cart.totals().total.cents(),
            }),
        );
    }

    /// Adds one unit (merging with an existing row) and shows the bag.
    pub fn add_to_cart(&mut self, product_id: &str, color: Option<String>) -> Result<()> {
        let Some(product) = self.gateway.catalog().product(product_id).cloned() else {
            bail!("unknown product '{product_id}'");
        };
        self.cart.add_with_color(&product, color);
        self.emit_cart("add", product_id);
        self.switch_tab(Tab::Cart);
        Ok(())
    }

    pub fn add_selection(&mut self, selection: Selection) -> Result<()> {
        self.add_to_cart(&selection.product.id, selection.color)
    }

    pub fn update_quantity(&mut self, product_id: &str, delta: i64) {
        self.cart.update_quantity(product_id, delta);
        self.emit_cart("quantity", product_id);
    }

    pub fn remove_from_cart(&mut self, product_id: &str) {
        self.cart.remove(product_id);
        self.emit_cart("remove", product_id);
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.events
            .emit(EventKind::ThemeChanged, json!({ "theme": self.theme.as_str() }));
        self.theme
    }

    /// Replaces the fit-check photo; the last upload wins.
    pub fn upload_photo(&mut self, photo: InlineImage) {
        self.events
            .emit(EventKind::PhotoUploaded, json!({ "mime_type": photo.mime_type }));
        self.photo = Some(photo);
    }

    pub fn nav(&self) -> Vec<NavItem> {
        let units = self.cart.item_count();
        Tab::ALL
            .into_iter()
            .map(|tab| NavItem {
                tab,
                label: tab.label(),
                active: tab == self.tab,
                badge: (tab == Tab::Cart && units > 0).then_some(units),
            })
            .collect()
    }

    pub fn cart_view(&self) -> CartView {
        CartView::of(&self.cart)
    }

    pub fn orders_view(&self) -> OrdersView {
        OrdersView::of(self.gateway.catalog())
    }

    pub fn account_view(&self) -> AccountView {
        AccountView::of(self.photo.is_some(), self.theme)
    }

    fn dropped(&self, flow: &str) {
        self.events
            .emit(EventKind::StaleResponseDropped, json!({ "flow": flow, "tab": self.tab.label() }));
    }

    /// Applies a recommendation unless Explore was remounted or the
    /// request superseded since it started.
    pub fn finish_recommendation(&mut self, ticket: Ticket, outcome: Outcome<Vec<String>>) -> bool {
        let applied = self
            .explore()
            .is_some_and(|screen| screen.finish_recommendation(ticket, outcome));
        if !applied {
            self.dropped("recommend");
        }
        applied
    }

    pub fn finish_fit_check(&mut self, ticket: Ticket, outcome: Outcome<Option<InlineImage>>) -> bool {
        let applied = self
            .explore()
            .is_some_and(|screen| screen.finish_fit_check(ticket, outcome));
        if !applied {
            self.dropped("fit_check");
        }
        applied
    }

    pub fn finish_ai_turn(&mut self, ticket: Ticket, message: Message) -> bool {
        let applied = self
            .ai()
            .is_some_and(|screen| screen.finish_submit(ticket, message));
        if !applied {
            self.dropped("ai_turn");
        }
        applied
    }

    pub fn finish_occasion(&mut self, ticket: Ticket, outcome: Outcome<String>) -> bool {
        let applied = self.occasions.finish_occasion(ticket, outcome);
        if !applied {
            self.dropped("occasion");
        }
        applied
    }

    /// Blocking chip selection on the Explore tab, personalized with the
    /// uploaded photo when there is one.
    pub fn select_category(&mut self, filter: CategoryFilter) -> Result<()> {
        let photo = self.photo.clone();
        let Some(screen) = self.explore() else {
            bail!("categories are on the Explore tab");
        };
        if let Some(job) = screen.select_category(filter, photo.as_ref()) {
            let (ticket, outcome) = job.run();
            self.finish_recommendation(ticket, outcome);
        }
        Ok(())
    }

    pub fn fit_check(&mut self, pose: Pose) -> Result<()> {
        let photo = self.photo.clone();
        let Some(screen) = self.explore() else {
            bail!("fit checks run from the Explore tab");
        };
        let job = screen.begin_fit_check(pose, photo.as_ref())?;
        let (ticket, outcome) = job.run();
        self.finish_fit_check(ticket, outcome);
        Ok(())
    }

    /// "Add to Bag" from the open product sheet.
    pub fn add_selected(&mut self) -> Result<()> {
        let Some(screen) = self.explore() else {
            bail!("open a product on the Explore tab first");
        };
        let Some(selection) = screen.add_selected() else {
            bail!("no product is open");
        };
        self.add_selection(selection)
    }

    /// "Add to Bag" on a product card Lumi suggested in the chat.
    pub fn add_suggested(&mut self, product_id: &str) -> Result<()> {
        let Some(screen) = self.ai() else {
            bail!("suggested products live on the Lumi AI tab");
        };
        if !screen.suggests(product_id) {
            bail!("Lumi has not suggested '{product_id}'");
        }
        self.add_to_cart(product_id, None)
    }

    pub fn buy_now(&mut self) -> Result<()> {
        let Some(screen) = self.explore() else {
            bail!("buy now is only offered from a fit check");
        };
        let Some(selection) = screen.buy_now() else {
            bail!("wait for a finished fit check before buying");
        };
        self.add_selection(selection)
    }

    pub fn submit_ai(&mut self, keys: &mut dyn KeySelector) -> Result<bool> {
        let Some(screen) = self.ai() else {
            bail!("switch to the Lumi AI tab first");
        };
        let Some(turn) = screen.begin_submit(keys) else {
            return Ok(false);
        };
        let (ticket, message) = turn.run();
        Ok(self.finish_ai_turn(ticket, message))
    }

    pub fn ask_occasion(&mut self, occasion: &str) -> bool {
        let Some(job) = self.occasions.begin_occasion(occasion) else {
            return false;
        };
        let (ticket, outcome) = job.run();
        self.finish_occasion(ticket, outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use anyhow::Result;
    use lumi_contracts::catalog::{Catalog, Category};
    use lumi_contracts::events::{EventKind, EventRecord};
    use lumi_contracts::media::InlineImage;

    use super::{Screen, Storefront, Tab, Theme};
    use crate::events::EventSink;
    use crate::gateway::{Gateway, Outcome, Pose};
    use crate::keys::ApiKeySlot;
    use crate::screens::{CategoryFilter, FitCheckState};
    use crate::transport::scripted::ScriptedTransport;
    use crate::transport::GenerateResponse;

    fn storefront(transport: &ScriptedTransport) -> Storefront {
        Storefront::new(Gateway::new(
            Arc::new(transport.clone()),
            Arc::new(Catalog::mock()),
        ))
    }

    #[test]
    fn starts_on_explore_with_plain_nav() {
        let shell = storefront(&ScriptedTransport::new());
        assert_eq!(shell.tab(), Tab::Explore);
        assert_eq!(shell.theme(), Theme::Light);
        let nav = shell.nav();
        assert_eq!(nav.len(), 5);
        assert_eq!(nav[1].label, "Lumi AI");
        assert!(nav[0].active);
        assert!(nav.iter().all(|item| item.badge.is_none()));
        assert_eq!("lumi ai".parse::<Tab>(), Ok(Tab::Ai));
    }

    #[test]
    fn adding_switches_to_cart_and_badges_units() -> Result<()> {
        let mut shell = storefront(&ScriptedTransport::new());
        assert!(shell.add_to_cart("ghost", None).is_err());

        shell.add_to_cart("h1", Some("#708090".to_string()))?;
        shell.switch_tab(Tab::Explore);
        shell.add_to_cart("h1", None)?;
        assert_eq!(shell.tab(), Tab::Cart);
        assert!(matches!(shell.screen(), Screen::Cart));

        let view = shell.cart_view();
        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.lines[0].quantity, 2);
        assert_eq!(view.lines[0].color.as_deref(), Some("#708090"));

        shell.update_quantity("h1", -5);
        assert_eq!(shell.cart_view().lines[0].quantity, 1);
        let badge = shell.nav().into_iter().find(|item| item.tab == Tab::Cart);
        assert_eq!(badge.and_then(|item| item.badge), Some(1));

        shell.remove_from_cart("h1");
        assert!(shell.cart_view().is_empty());
        Ok(())
    }

    #[test]
    fn switching_to_the_same_tab_remounts_fresh_chat() -> Result<()> {
        let transport = ScriptedTransport::new();
        transport.push_text("{\"text\": \"Navy suits you.\", \"suggestedProductIds\": []}");
        let mut shell = storefront(&transport);
        shell.switch_tab(Tab::Ai);
        if let Some(ai) = shell.ai() {
            ai.set_input("What colour?");
        }
        assert!(shell.submit_ai(&mut ApiKeySlot::new(None))?);
        assert_eq!(shell.ai().map(|ai| ai.transcript().len()), Some(3));

        shell.switch_tab(Tab::Ai);
        let ai = shell.ai().expect("ai mounted");
        assert_eq!(ai.transcript().len(), 1);
        assert_eq!(ai.session().history_len(), 0);
        Ok(())
    }

    #[test]
    fn suggested_products_go_straight_to_the_bag() -> Result<()> {
        let transport = ScriptedTransport::new();
        transport.push_text("{\"text\": \"Try the hoodie.\", \"suggestedProductIds\": [\"h1\"]}");
        let mut shell = storefront(&transport);
        shell.switch_tab(Tab::Ai);
        if let Some(ai) = shell.ai() {
            ai.set_input("Something cosy");
        }
        shell.submit_ai(&mut ApiKeySlot::new(None))?;
        assert!(shell.add_suggested("j1").is_err());
        assert_eq!(shell.tab(), Tab::Ai);

        shell.add_suggested("h1")?;
        assert_eq!(shell.tab(), Tab::Cart);
        let view = shell.cart_view();
        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.lines[0].product_id, "h1");
        assert!(shell.add_suggested("h1").is_err());
        Ok(())
    }

    #[test]
    fn results_for_unmounted_screens_are_dropped_and_logged() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("events.jsonl");
        let transport = ScriptedTransport::new();
        let gateway = Gateway::new(Arc::new(transport.clone()), Arc::new(Catalog::mock()))
            .with_events(EventSink::to_file(&path));
        let mut shell = Storefront::new(gateway);
        shell.upload_photo(InlineImage::new("image/jpeg", "bWU="));

        let photo = shell.photo().cloned();
        let job = shell
            .explore()
            .and_then(|explore| {
                explore.select_category(CategoryFilter::Only(Category::Hoodie), photo.as_ref())
            })
            .expect("recommendation job");
        shell.switch_tab(Tab::Orders);
        shell.switch_tab(Tab::Explore);
        assert!(!shell.finish_recommendation(job.ticket(), Outcome::Success(vec!["h1".to_string()])));
        assert_eq!(shell.explore().map(|e| e.products().len()), Some(6));

        let kinds: Vec<EventKind> = fs::read_to_string(&path)?
            .lines()
            .map(serde_json::from_str::<EventRecord>)
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|event| event.kind)
            .collect();
        assert_eq!(kinds.first(), Some(&EventKind::SessionStarted));
        assert!(kinds.contains(&EventKind::PhotoUploaded));
        assert_eq!(kinds.last(), Some(&EventKind::StaleResponseDropped));
        Ok(())
    }

    #[test]
    fn fit_check_then_buy_now_lands_in_cart() -> Result<()> {
        let transport = ScriptedTransport::new();
        transport.push(Ok(GenerateResponse {
            images: vec![InlineImage::new("image/png", "Zml0")],
            ..GenerateResponse::default()
        }));
        let mut shell = storefront(&transport);
        assert!(shell.buy_now().is_err());

        if let Some(explore) = shell.explore() {
            explore.open_product("j1")?;
        }
        shell.fit_check(Pose::Right)?;
        assert!(matches!(
            shell.explore().map(|e| e.fit_check().clone()),
            Some(FitCheckState::Ready { pose: Pose::Right, .. })
        ));
        shell.buy_now()?;
        assert_eq!(shell.tab(), Tab::Cart);
        assert_eq!(shell.cart().item_count(), 1);
        assert_eq!(shell.cart_view().lines[0].color.as_deref(), Some("#000000"));
        Ok(())
    }

    #[test]
    fn theme_photo_and_account_view() {
        let mut shell = storefront(&ScriptedTransport::new());
        assert_eq!(shell.account_view().photo_status, "NOT SET");
        assert_eq!(shell.toggle_theme(), Theme::Dark);
        shell.upload_photo(InlineImage::new("image/png", "b25l"));
        shell.upload_photo(InlineImage::new("image/png", "dHdv"));
        assert_eq!(shell.photo().map(|p| p.data.as_str()), Some("dHdv"));

        let account = shell.account_view();
        assert_eq!(account.photo_status, "ACTIVE");
        assert!(account.dark_mode);
        assert_eq!(shell.orders_view().rows.len(), 1);
    }

    #[test]
    fn occasion_board_is_reachable_from_any_tab() {
        let transport = ScriptedTransport::new();
        transport.push_text("Linen and loafers.");
        let mut shell = storefront(&transport);
        shell.switch_tab(Tab::Account);
        assert!(shell.ask_occasion("Summer vacation"));
        assert_eq!(shell.occasions().view().note.as_deref(), Some("Linen and loafers."));
    }
}
