pub mod config;
pub mod core;
pub mod domain;
pub mod output;
pub mod utils;

pub use crate::config::CliConfig;
pub use crate::core::engine::ScrapeEngine;
pub use crate::domain::canteen::Canteen;
pub use crate::domain::label::{Label, LabelSource};
pub use crate::domain::model::{Dish, Menu, Price, Prices, Week};
pub use crate::domain::ports::MenuSource;
pub use crate::utils::error::{MenuError, Result};
