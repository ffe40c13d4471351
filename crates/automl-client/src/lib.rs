#![doc = include_str!("../README.md")]

mod api;
mod client;
mod config;
pub mod dataset_file;
mod error;
pub mod pipeline;
mod session;
mod store;
mod token;
mod ui_state;

pub use client::AutoMlClient;
pub use config::{data_dir, resolve_base_url, ClientConfig, API_URL_ENV, DATA_DIR_ENV, DEFAULT_BASE_URL};
pub use error::ClientError;
pub use pipeline::{SessionEvents, TracingEvents};
pub use session::Session;
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use token::{is_well_formed, TokenClaims};
pub use ui_state::UiStateStore;

pub use automl_types as types;
