pub mod engine;
pub mod fetch;
pub mod fmi_bistro;
pub mod ipp_bistro;
pub mod mediziner;
pub mod pdf;
pub mod pricing;
pub mod studentenwerk;

pub use crate::domain::canteen::Canteen;
pub use crate::domain::model::{Dish, Menu, Price, Prices, Week};
pub use crate::domain::ports::MenuSource;
pub use crate::utils::error::Result;
