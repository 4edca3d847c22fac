//! Load personal finance transactions from a spreadsheet, CSV file or static configuration,
//! filter them by date range and type, and aggregate them for bar and pie chart views. Investment
//! holdings listed in the configuration are summarized by yield date.

mod api;
pub mod args;
pub mod commands;
mod config;
pub mod dashboard;
mod error;
pub mod investments;
pub mod model;
pub mod pipeline;
pub mod render;
mod utils;


pub use api::Mode;
pub use config::{Config, InlineRow, SourceConfig};
pub use error::Error;
pub use error::Result;
