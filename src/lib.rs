//! Collects "restaurants to try this weekend" recommendations, enriches them
//! with directory and geocoding data, and charts who recommends what.

pub mod analysis;
pub mod collect;
pub mod config;
pub mod directory;
pub mod error;
pub mod extract;
pub mod geocode;
pub mod http;
pub mod model;
pub mod normalize;
pub mod output;

pub use collect::Collector;
pub use config::Config;
pub use error::{ConfigError, RecsError, Result};
pub use model::{Candidate, Enrichment, PriceTier, Recommendation};
pub use output::{read_recommendations, write_recommendations};
