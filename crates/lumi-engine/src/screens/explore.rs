use std::fmt;

use anyhow::{bail, Result};
use lumi_contracts::catalog::{Category, Product};
use lumi_contracts::media::InlineImage;

use super::{card, ProductCard};
use crate::gateway::{FitCheckRequest, Gateway, Outcome, Pose};
use crate::generation::{RequestGate, Ticket};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn chips() -> Vec<CategoryFilter> {
        std::iter::once(CategoryFilter::All)
            .chain(Category::ALL.into_iter().map(CategoryFilter::Only))
            .collect()
    }

    pub fn label(self) -> &'static str {
        match self {
            CategoryFilter::All => "All",
            CategoryFilter::Only(category) => category.label(),
        }
    }

    pub fn parse(raw: &str) -> Result<Self, String> {
        if raw.trim().eq_ignore_ascii_case("all") {
            return Ok(CategoryFilter::All);
        }
        raw.parse::<Category>().map(CategoryFilter::Only)
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FitCheckState {
    #[default]
    Closed,
    Loading {
        pose: Pose,
    },
    Ready {
        pose: Pose,
        image: InlineImage,
    },
    Failed {
        pose: Pose,
    },
}

impl FitCheckState {
    pub fn is_open(&self) -> bool {
        !matches!(self, FitCheckState::Closed)
    }
}

/// A product the user chose to buy, with the swatch selected at the time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub product: Product,
    pub color: Option<String>,
}

pub struct RecommendJob {
    ticket: Ticket,
    gateway: Gateway,
    photo: InlineImage,
    category: Category,
}

impl RecommendJob {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub fn run(self) -> (Ticket, Outcome<Vec<String>>) {
        (self.ticket, self.gateway.recommend(&self.photo, self.category))
    }
}

pub struct FitCheckJob {
    ticket: Ticket,
    gateway: Gateway,
    product_image_url: String,
    product_name: String,
    user_photo: Option<InlineImage>,
    color: Option<String>,
    pose: Pose,
}

impl FitCheckJob {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Fetches the product photo, then asks for the composite. A missing
    /// product photo only weakens the prompt.
    pub fn run(self) -> (Ticket, Outcome<Option<InlineImage>>) {
        let request = FitCheckRequest {
            product_name: self.product_name,
            product_image: self.gateway.fetch_product_image(&self.product_image_url),
            user_photo: self.user_photo,
            color: self.color,
            pose: self.pose,
        };
        (self.ticket, self.gateway.fit_check(&request))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipView {
    pub label: &'static str,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailView {
    pub product: ProductCard,
    pub description: String,
    pub colors: Vec<String>,
    pub selected_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExploreView {
    pub stylist_active: bool,
    pub chips: Vec<ChipView>,
    /// Set while a personalized gallery is being tailored.
    pub curating: Option<String>,
    pub personalized: bool,
    pub products: Vec<ProductCard>,
    pub detail: Option<DetailView>,
    pub fit_check: FitCheckState,
    pub pose: Pose,
}

pub struct ExploreScreen {
    gateway: Gateway,
    filter: CategoryFilter,
    products: Vec<Product>,
    personalized: bool,
    recommend_gate: RequestGate,
    detail: Option<Selection>,
    fit_check: FitCheckState,
    pose: Pose,
    fit_gate: RequestGate,
}

impl ExploreScreen {
    pub fn new(gateway: Gateway) -> Self {
        let products = gateway.catalog().products().to_vec();
        Self {
            gateway,
            filter: CategoryFilter::All,
            products,
            personalized: false,
            recommend_gate: RequestGate::new(),
            detail: None,
            fit_check: FitCheckState::Closed,
            pose: Pose::Front,
            fit_gate: RequestGate::new(),
        }
    }

    pub fn filter(&self) -> CategoryFilter {
        self.filter
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn is_curating(&self) -> bool {
        self.recommend_gate.in_flight()
    }

    pub fn fit_check(&self) -> &FitCheckState {
        &self.fit_check
    }

    pub fn selected(&self) -> Option<&Selection> {
        self.detail.as_ref()
    }

    fn show_category(&mut self, category: Category) {
        self.products = self.gateway.catalog().in_category(category);
        self.personalized = false;
    }

    /// Applies a chip. Only a specific category with a photo needs the
    /// model; any earlier recommendation still in flight is dropped.
    pub fn select_category(
        &mut self,
        filter: CategoryFilter,
        photo: Option<&InlineImage>,
    ) -> Option<RecommendJob> {
        self.filter = filter;
        self.recommend_gate.invalidate();
        match (filter, photo) {
            (CategoryFilter::All, _) => {
                self.products = self.gateway.catalog().products().to_vec();
                self.personalized = false;
                None
            }
            (CategoryFilter::Only(category), None) => {
                self.show_category(category);
                None
            }
            (CategoryFilter::Only(category), Some(photo)) => Some(RecommendJob {
                ticket: self.recommend_gate.begin(),
                gateway: self.gateway.clone(),
                photo: photo.clone(),
                category,
            }),
        }
    }

    pub fn finish_recommendation(&mut self, ticket: Ticket, outcome: Outcome<Vec<String>>) -> bool {
        if !self.recommend_gate.finish(ticket) {
            return false;
        }
        let CategoryFilter::Only(category) = self.filter else {
            return false;
        };
        let fallback = outcome.is_fallback();
        let recommended = self.gateway.catalog().by_ids(&outcome.into_value());
        if fallback || recommended.is_empty() {
            self.show_category(category);
        } else {
            self.products = recommended;
            self.personalized = true;
        }
        true
    }

    pub fn run_select_category(&mut self, filter: CategoryFilter, photo: Option<&InlineImage>) {
        if let Some(job) = self.select_category(filter, photo) {
            let (ticket, outcome) = job.run();
            self.finish_recommendation(ticket, outcome);
        }
    }

    pub fn open_product(&mut self, product_id: &str) -> Result<()> {
        let Some(product) = self.gateway.catalog().product(product_id).cloned() else {
            bail!("unknown product '{product_id}'");
        };
        self.close_fit_check();
        self.detail = Some(Selection {
            color: product.default_color().map(str::to_string),
            product,
        });
        Ok(())
    }

    pub fn select_color(&mut self, color: &str) -> Result<()> {
        let Some(selection) = self.detail.as_mut() else {
            bail!("open a product first");
        };
        let Some(offered) = selection.product.offered_color(color).map(str::to_string) else {
            bail!("{} is not offered in {}", selection.product.name, color.trim());
        };
        selection.color = Some(offered);
        Ok(())
    }

    pub fn dismiss(&mut self) {
        self.close_fit_check();
        self.detail = None;
    }

    /// "Add to Bag": hands the selection to the shell and closes the sheet.
    pub fn add_selected(&mut self) -> Option<Selection> {
        if self.fit_check.is_open() {
            return None;
        }
        self.detail.take()
    }

    /// Opens the fit check (or switches pose). Each call supersedes the
    /// previous generation.
    pub fn begin_fit_check(&mut self, pose: Pose, user_photo: Option<&InlineImage>) -> Result<FitCheckJob> {
        let Some(selection) = self.detail.as_ref() else {
            bail!("open a product first");
        };
        let job = FitCheckJob {
            ticket: self.fit_gate.begin(),
            gateway: self.gateway.clone(),
            product_image_url: selection.product.image.clone(),
            product_name: selection.product.name.clone(),
            user_photo: user_photo.cloned(),
            color: selection.color.clone(),
            pose,
        };
        self.pose = pose;
        self.fit_check = FitCheckState::Loading { pose };
        Ok(job)
    }

    pub fn finish_fit_check(&mut self, ticket: Ticket, outcome: Outcome<Option<InlineImage>>) -> bool {
        if !self.fit_gate.finish(ticket) {
            return false;
        }
        let pose = self.pose;
        self.fit_check = match outcome.into_value() {
            Some(image) => FitCheckState::Ready { pose, image },
            None => FitCheckState::Failed { pose },
        };
        true
    }

    pub fn run_fit_check(&mut self, pose: Pose, user_photo: Option<&InlineImage>) -> Result<()> {
        let job = self.begin_fit_check(pose, user_photo)?;
        let (ticket, outcome) = job.run();
        self.finish_fit_check(ticket, outcome);
        Ok(())
    }

    pub fn close_fit_check(&mut self) {
        self.fit_gate.invalidate();
        self.fit_check = FitCheckState::Closed;
        self.pose = Pose::Front;
    }

    /// Only a finished composite can be bought from the fit check view.
    pub fn buy_now(&mut self) -> Option<Selection> {
        if !matches!(self.fit_check, FitCheckState::Ready { .. }) {
            return None;
        }
        self.close_fit_check();
        self.detail.take()
    }

    pub fn view(&self, has_photo: bool) -> ExploreView {
        ExploreView {
            stylist_active: has_photo,
            chips: CategoryFilter::chips()
                .into_iter()
                .map(|chip| ChipView {
                    label: chip.label(),
                    active: chip == self.filter,
                })
                .collect(),
            curating: self.is_curating().then(|| {
                format!("Lumi is curating the best {} options for you.", self.filter)
            }),
            personalized: self.personalized,
            products: self.products.iter().map(card).collect(),
            detail: self.detail.as_ref().map(|selection| DetailView {
                product: card(&selection.product),
                description: selection.product.description.clone(),
                colors: selection.product.colors.clone(),
                selected_color: selection.color.clone(),
            }),
            fit_check: self.fit_check.clone(),
            pose: self.pose,
        }
    }
}
