use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::domain::canteen::Canteen;
use crate::domain::model::Week;
use crate::utils::error::Result;

/// Version stamp of the JSON output. Incremented whenever the output
/// format changes in any way, shape or form.
pub const JSON_VERSION: &str = "2.1";

/// Writes one `<dir>/<year>/<week>.json` file per week and, on
/// request, a single combined file with every week of the canteen.
pub fn jsonify(
    weeks: &BTreeMap<u32, Week>,
    directory: &Path,
    canteen: Canteen,
    combine: bool,
) -> Result<()> {
    for week in weeks.values() {
        let year_dir = directory.join(week.year.to_string());
        fs::create_dir_all(&year_dir)?;

        let mut week_json = serde_json::to_value(week)?;
        if let Some(map) = week_json.as_object_mut() {
            map.insert("version".to_string(), JSON_VERSION.into());
        }
        let file_path = year_dir.join(format!("{:02}.json", week.calendar_week));
        fs::write(file_path, serde_json::to_string(&week_json)?)?;
    }

    if !combine {
        return Ok(());
    }

    let combined_dir = directory.join("combined");
    fs::create_dir_all(&combined_dir)?;
    let combined = serde_json::json!({
        "version": JSON_VERSION,
        "canteen_id": canteen.id(),
        "weeks": weeks.values().collect::<Vec<_>>(),
    });
    fs::write(
        combined_dir.join("combined.json"),
        serde_json::to_string(&combined)?,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Menu;
    use chrono::NaiveDate;

    fn sample_weeks() -> BTreeMap<u32, Week> {
        let date = NaiveDate::from_ymd_opt(2021, 9, 13).unwrap();
        let mut menus = BTreeMap::new();
        menus.insert(date, Menu::new(date, vec![]));
        Week::to_weeks(&menus)
    }

    #[test]
    fn test_jsonify_writes_week_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        jsonify(&sample_weeks(), temp_dir.path(), Canteen::MensaGarching, false).unwrap();

        let week_file = temp_dir.path().join("2021").join("37.json");
        let content = fs::read_to_string(week_file).unwrap();
        let json: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(json["version"], JSON_VERSION);
        assert_eq!(json["number"], 37);
        assert!(!temp_dir.path().join("combined").exists());
    }

    #[test]
    fn test_jsonify_combined_output() {
        let temp_dir = tempfile::tempdir().unwrap();
        jsonify(&sample_weeks(), temp_dir.path(), Canteen::MensaGarching, true).unwrap();

        let combined = temp_dir.path().join("combined").join("combined.json");
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(combined).unwrap()).unwrap();
        assert_eq!(json["canteen_id"], "mensa-garching");
        assert_eq!(json["weeks"][0]["year"], 2021);
    }

    #[test]
    fn test_week_file_name_is_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2021, 1, 11).unwrap(); // ISO week 2
        let mut menus = BTreeMap::new();
        menus.insert(date, Menu::new(date, vec![]));
        let weeks = Week::to_weeks(&menus);

        let temp_dir = tempfile::tempdir().unwrap();
        jsonify(&weeks, temp_dir.path(), Canteen::MensaGarching, false).unwrap();
        assert!(temp_dir.path().join("2021").join("02.json").exists());
    }
}
