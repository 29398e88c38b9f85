use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::core::fetch::HttpClient;
use crate::core::{fmi_bistro, ipp_bistro, mediziner, studentenwerk};
use crate::domain::canteen::Canteen;
use crate::domain::model::Menu;
use crate::domain::ports::MenuSource;
use crate::utils::error::{MenuError, Result};

/// Runs canteens through their source parsers, one canteen at a time.
/// A failing canteen is logged and skipped; it can never abort the
/// rest of the batch.
pub struct ScrapeEngine {
    sources: Vec<Box<dyn MenuSource>>,
}

impl ScrapeEngine {
    pub fn new(sources: Vec<Box<dyn MenuSource>>) -> Self {
        Self { sources }
    }

    pub fn with_default_sources() -> Result<Self> {
        let http = HttpClient::new()?;
        Ok(Self::new(vec![
            Box::new(studentenwerk::StudentenwerkSource::new(http.clone())),
            Box::new(fmi_bistro::FmiBistroSource::new(http.clone())),
            Box::new(ipp_bistro::IppBistroSource::new(http.clone())),
            Box::new(mediziner::MedizinerMensaSource::new(http)),
        ]))
    }

    fn source_for(&self, canteen: Canteen) -> Option<&dyn MenuSource> {
        self.sources
            .iter()
            .find(|source| source.canteens().contains(&canteen))
            .map(|source| source.as_ref())
    }

    /// Parses a single canteen with its source.
    pub async fn run_one(&self, canteen: Canteen) -> Result<BTreeMap<NaiveDate, Menu>> {
        let source = self
            .source_for(canteen)
            .ok_or_else(|| MenuError::UnsupportedCanteen(canteen.id().to_string()))?;
        tracing::info!(canteen = canteen.id(), source = source.name(), "parsing");
        let menus = source.parse(canteen).await?;
        tracing::info!(canteen = canteen.id(), days = menus.len(), "parsed");
        Ok(menus)
    }

    /// Parses a batch of canteens, isolating failures per canteen.
    pub async fn run(
        &self,
        canteens: &[Canteen],
    ) -> BTreeMap<Canteen, BTreeMap<NaiveDate, Menu>> {
        let mut results = BTreeMap::new();
        for &canteen in canteens {
            match self.run_one(canteen).await {
                Ok(menus) => {
                    results.insert(canteen, menus);
                }
                Err(e) => {
                    tracing::error!(canteen = canteen.id(), error = %e, "canteen failed, continuing batch");
                }
            }
        }
        results
    }
}
