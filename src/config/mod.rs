use clap::Parser;

use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};

#[derive(Debug, Clone, Parser)]
#[command(name = "mensa-etl")]
#[command(about = "Scrapes weekly canteen menus into a canonical JSON schema")]
pub struct CliConfig {
    /// Canteen id, e.g. mensa-garching
    #[arg(short = 'c', long)]
    pub canteen: Option<String>,

    /// Only print the menu of this date (dd.mm.yyyy)
    #[arg(short = 'd', long)]
    pub date: Option<String>,

    /// Write weekly JSON files into this directory
    #[arg(short = 'j', long)]
    pub jsonify: Option<String>,

    /// Additionally write one combined JSON file per canteen
    #[arg(long)]
    pub combine: bool,

    /// List all known canteens as JSON and exit
    #[arg(long)]
    pub canteens: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(date) = &self.date {
            validation::validate_date("date", date)?;
        }
        if let Some(jsonify) = &self.jsonify {
            validation::validate_path("jsonify", jsonify)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_well_formed_config() {
        let config = CliConfig {
            canteen: Some("mensa-garching".to_string()),
            date: Some("01.11.2021".to_string()),
            jsonify: Some("./dist".to_string()),
            combine: true,
            canteens: false,
            verbose: false,
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_iso_date() {
        let config = CliConfig {
            canteen: None,
            date: Some("2021-11-01".to_string()),
            jsonify: None,
            combine: false,
            canteens: false,
            verbose: false,
        };
        assert!(config.validate().is_err());
    }
}
