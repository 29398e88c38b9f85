use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::canteen::Canteen;
use crate::domain::model::Menu;
use crate::utils::error::Result;

/// Contract every menu source implements: fetch and structurally
/// extract the menus a canteen currently publishes.
///
/// An empty map is a valid result (canteen closed, nothing published);
/// errors are reserved for fetch failures and hard structural
/// anomalies, so the batch engine can isolate them per canteen.
#[async_trait]
pub trait MenuSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// The canteens this source is able to parse.
    fn canteens(&self) -> &'static [Canteen];

    async fn parse(&self, canteen: Canteen) -> Result<BTreeMap<NaiveDate, Menu>>;
}
