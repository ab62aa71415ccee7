pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod range;
pub mod render;
pub mod service;
pub mod utils;

// Re-export the pieces a front end needs
pub use config::{Config, Provider};
pub use error::AstroError;
pub use model::{DayRecord, DaySlot};
pub use range::{resolve_range, DateRange, RangeRequest};
pub use service::{AlmanacService, RenderAttributes};
