use std::path::Path;

use clap::Parser;
use mensa_etl::utils::{logger, text, validation::Validate};
use mensa_etl::{output, Canteen, CliConfig, ScrapeEngine, Week};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        eprintln!("❌ {e}");
        std::process::exit(1);
    }

    if config.canteens {
        let catalog: Vec<_> = Canteen::ALL.iter().map(Canteen::to_json_obj).collect();
        println!("{}", serde_json::to_string_pretty(&catalog)?);
        return Ok(());
    }

    let Some(canteen_id) = &config.canteen else {
        eprintln!("❌ No canteen given. Choose one of:");
        for canteen in Canteen::ALL {
            eprintln!("  {}", canteen.id());
        }
        std::process::exit(1);
    };
    let Some(canteen) = Canteen::from_id(canteen_id) else {
        eprintln!("❌ Unknown canteen '{canteen_id}'");
        std::process::exit(1);
    };

    let engine = ScrapeEngine::with_default_sources()?;
    let menus = match engine.run_one(canteen).await {
        Ok(menus) => menus,
        Err(e) => {
            tracing::error!(canteen = canteen.id(), error = %e, "scrape failed");
            eprintln!("❌ Could not retrieve menus for {}: {e}", canteen.id());
            std::process::exit(1);
        }
    };

    if let Some(directory) = &config.jsonify {
        let weeks = Week::to_weeks(&menus);
        output::jsonify(&weeks, Path::new(directory), canteen, config.combine)?;
        println!("✅ Wrote {} week(s) to {directory}", weeks.len());
        return Ok(());
    }

    if let Some(date_str) = &config.date {
        let date = text::parse_date(date_str)?;
        match menus.get(&date) {
            Some(menu) => println!("{}", serde_json::to_string_pretty(menu)?),
            None => println!("There is no menu for '{}' on {date}", canteen.id()),
        }
        return Ok(());
    }

    let weeks = Week::to_weeks(&menus);
    for week in weeks.values() {
        println!("{}", serde_json::to_string_pretty(week)?);
    }
    Ok(())
}
