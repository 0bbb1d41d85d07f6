pub mod cart;
pub mod catalog;
pub mod commands;
pub mod conversation;
pub mod events;
pub mod media;
pub mod models;
pub mod money;
