pub mod config;
pub mod events;
pub mod gateway;
pub mod generation;
pub mod keys;
pub mod screens;
pub mod shell;
pub mod stylist;
pub mod transport;

pub use config::GatewayConfig;
pub use events::EventSink;
pub use gateway::{FitCheckRequest, Gateway, GroundedAdvice, Outcome, Pose};
pub use generation::{RequestGate, Ticket};
pub use keys::{ApiKeySlot, KeySelector};
pub use shell::{Storefront, Tab, Theme};
pub use stylist::{StylistReply, StylistSession};
pub use transport::{DryrunTransport, GeminiTransport, ImageSize, ModelTransport};
