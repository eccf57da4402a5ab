//! Roulette Definitions Client
//!
//! Keeps a [`FeatureRegistry`](roulette_features::FeatureRegistry) current
//! by paging feature definitions from the definitions service.
//!
//! # Features
//!
//! - 🌐 **HTTP API** - JSON RPC over `reqwest`
//! - 📄 **Pagination** - Cursor-based incremental fetching
//! - 🔄 **Background Refresh** - Periodic polling on a tokio task
//! - ⚙️ **Configuration** - Environment, `.env`, TOML and JSON sources
//!
//! # Quick Start
//!
//! ```no_run
//! use roulette_client::{ClientConfig, RouletteClient};
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), roulette_client::ClientError> {
//! let client = RouletteClient::new(ClientConfig::from_env()?)?;
//! client.refresh().await?;
//! client.start().await?;
//!
//! let input = roulette_features::to_input(json!({"user_id": "u-1"})).unwrap();
//! if let Some(eval) = client.evaluate("new-checkout", input) {
//!     println!("variant: {}", eval.variant_name());
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod fetcher;

pub use api::{HttpRouletteApi, ListFeaturesRequest, ListFeaturesResponse, RouletteApi};
pub use client::RouletteClient;
pub use config::{ClientConfig, FileFormat};
pub use error::{ClientError, ConfigError, Result};
pub use fetcher::{FetchOutcome, Fetcher};
