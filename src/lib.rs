//! Trading-chart analysis service
//!
//! Accepts a chart screenshot, forwards it with a fixed instruction prompt to
//! a multimodal model, and returns the model's reply in a JSON envelope. The
//! reply is parsed into a structured record at the presentation boundary.

pub mod ai;
pub mod analysis;
pub mod app;
pub mod error;
pub mod image;
pub mod models;
pub mod prompts;
pub mod render;
pub mod server;
pub mod store;

pub use error::{Error, Result};
