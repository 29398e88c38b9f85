use std::collections::BTreeMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use chrono::NaiveDate;
use regex::Regex;
use scraper::{Html, Selector};
use unicode_normalization::UnicodeNormalization;

use crate::core::fetch::HttpClient;
use crate::core::pdf;
use crate::domain::canteen::Canteen;
use crate::domain::label::{Label, LabelSource};
use crate::domain::model::{Dish, Menu, Price, Prices, Week};
use crate::domain::ports::MenuSource;
use crate::utils::error::{MenuError, Result};
use crate::utils::text::{char_len, char_slice, collapse_whitespace};

const START_PAGE_URL: &str = "https://www.sv.tum.de/med/startseite/";
const PDF_BASE_URL: &str = "https://www.sv.tum.de";
const CANTEENS: [Canteen; 1] = [Canteen::MedizinerMensa];

const GENERIC_DISH_TYPE: &str = "Tagesgericht";

/// Character zones of the two menu columns on every body line.
const SOUP_ZONE: (usize, usize) = (0, 36);
const MAINS_ZONE: (usize, usize) = (40, 100);

// Single letter/digit allergen runs; D, I, J and Q are not assigned.
static INGREDIENTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\s([A-C]|[E-H]|[K-P]|[R-Z]|[1-9])(,([A-C]|[E-H]|[K-P]|[R-Z]|[1-9]))*(\s|\z))")
        .expect("static regex")
});
static PRICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(,\d{2})\s?€)").expect("static regex"));
static DAY_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:Montag|Dienstag|Mittwoch|Donnerstag|Freitag|Samstag|Sonntag),\s\d{1,2}\.\d{1,2}\.\d{4}")
        .expect("static regex")
});
static MULTI_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));
static TYPE_COLUMNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("static regex"));
static PDF_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)KW_([1-9]\d*)_.*_-?(\d+)").expect("static regex"));

/// Free-text weekly plan of the hospital cafeteria: one soup column
/// and one mains column at fixed character offsets, seven days a week.
pub struct MedizinerMensaSource {
    http: HttpClient,
    start_page_url: String,
    pdf_base_url: String,
}

impl MedizinerMensaSource {
    pub fn new(http: HttpClient) -> Self {
        Self::with_base_urls(http, START_PAGE_URL, PDF_BASE_URL)
    }

    pub fn with_base_urls(
        http: HttpClient,
        start_page_url: impl Into<String>,
        pdf_base_url: impl Into<String>,
    ) -> Self {
        Self {
            http,
            start_page_url: start_page_url.into(),
            pdf_base_url: pdf_base_url.into(),
        }
    }
}

#[async_trait]
impl MenuSource for MedizinerMensaSource {
    fn name(&self) -> &'static str {
        "mediziner-mensa"
    }

    fn canteens(&self) -> &'static [Canteen] {
        &CANTEENS
    }

    async fn parse(&self, _canteen: Canteen) -> Result<BTreeMap<NaiveDate, Menu>> {
        let page = self.http.get_text(&self.start_page_url).await?;
        let hrefs = find_menu_pdf_hrefs(&page);
        if hrefs.len() != 1 {
            tracing::warn!(found = hrefs.len(), "expected exactly one weekly menu link");
            return Ok(BTreeMap::new());
        }
        let pdf_url = format!("{}{}", self.pdf_base_url, hrefs[0]);

        // Example PDF name: "KW_44_Herbst_4_Mensa_2018.pdf"
        let pdf_name = pdf_url.rsplit('/').next().unwrap_or(&pdf_url);
        let (calendar_week, year) = week_and_year_from_pdf_name(pdf_name)?;

        let pdf_bytes = self.http.get_bytes(&pdf_url).await?;
        let text = pdf::extract_text(&pdf_bytes, true).await?;
        Ok(parse_text(&text, year, calendar_week).unwrap_or_default())
    }
}

fn find_menu_pdf_hrefs(page: &str) -> Vec<String> {
    let document = Html::parse_document(page);
    let Ok(link_selector) = Selector::parse(r#"a[href*="Mensaplan/KW_"]"#) else {
        return Vec::new();
    };
    document
        .select(&link_selector)
        .filter_map(|link| link.value().attr("href"))
        .map(str::to_string)
        .collect()
}

fn week_and_year_from_pdf_name(pdf_name: &str) -> Result<(u32, i32)> {
    let captures = PDF_NAME
        .captures(pdf_name)
        .ok_or_else(|| MenuError::parsing(format!("week parsing failed for PDF '{pdf_name}'")))?;
    let week = captures[1]
        .parse::<u32>()
        .map_err(|_| MenuError::parsing(format!("week parsing failed for PDF '{pdf_name}'")))?;
    let year_str = &captures[2];
    let year = match year_str.len() {
        2 => 2000
            + year_str
                .parse::<i32>()
                .map_err(|_| MenuError::parsing(format!("year parsing failed for PDF '{pdf_name}'")))?,
        4 => year_str
            .parse::<i32>()
            .map_err(|_| MenuError::parsing(format!("year parsing failed for PDF '{pdf_name}'")))?,
        _ => {
            return Err(MenuError::parsing(format!(
                "year parsing failed for PDF '{pdf_name}': got '{year_str}'"
            )))
        }
    };
    Ok((week, year))
}

/// Strips allergen code runs and the price from a raw dish string and
/// builds the dish from what remains.
pub fn parse_dish(dish_str: &str) -> Dish {
    let mut labels = std::collections::BTreeSet::new();
    let mut remaining = dish_str.to_string();

    // Adjacent runs share their separating whitespace, so stripping
    // must be repeated until nothing matches anymore.
    loop {
        let matches: Vec<String> = INGREDIENTS
            .captures_iter(&remaining)
            .filter_map(|captures| captures.get(1).map(|m| m.as_str().to_string()))
            .collect();
        if matches.is_empty() {
            break;
        }
        for code_run in &matches {
            LabelSource::MedizinerMensa.resolve_into(code_run, &mut labels);
        }
        remaining = INGREDIENTS.replace_all(&remaining, " ").to_string();
    }
    Label::add_supertypes(&mut labels);

    remaining = MULTI_WHITESPACE.replace_all(&remaining, " ").trim().to_string();
    remaining = remaining.replace(" , ", ", ");

    let mut prices = Prices::default();
    for price_match in PRICE.find_iter(&remaining) {
        let price_str = price_match
            .as_str()
            .replace('€', "")
            .replace(',', ".")
            .trim()
            .to_string();
        match price_str.parse::<f64>() {
            Ok(price) => prices = Prices::from_student(Some(Price::base(price))),
            Err(_) => tracing::warn!(price = price_match.as_str(), "unparseable price"),
        }
    }
    remaining = PRICE.replace_all(&remaining, "").trim().to_string();

    Dish::new(remaining, prices, labels, GENERIC_DISH_TYPE)
}

/// Splits the mains column into dish blocks: a blank line always
/// separates dishes, a capital letter after a line break only when the
/// previous line does not end in "mit" (which continues a description).
fn split_mains(mains: &str) -> Vec<String> {
    let mut blocks: Vec<String> = Vec::new();
    let mut current = String::new();
    for line in mains.lines() {
        if line.trim().is_empty() {
            if !current.trim().is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
            continue;
        }
        let starts_new_dish = line.chars().next().is_some_and(|c| c.is_ascii_uppercase())
            && !current.trim_end().ends_with("mit")
            && !current.trim().is_empty();
        if starts_new_dish {
            blocks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }
    if !current.trim().is_empty() {
        blocks.push(current);
    }
    blocks
}

/// Parses the converted weekly PDF text. The hospital cafeteria serves
/// every day, so anything other than seven day sections skips the week.
pub fn parse_text(text: &str, year: i32, calendar_week: u32) -> Option<BTreeMap<NaiveDate, Menu>> {
    let lines: Vec<&str> = text.lines().collect();

    // The dish-type header is the last non-empty line above the first
    // *** separator.
    let mut dish_types: Vec<String> = Vec::new();
    let mut last_non_empty: Option<usize> = None;
    for (index, line) in lines.iter().enumerate() {
        if line.contains("***") {
            if let Some(header_index) = last_non_empty {
                dish_types = TYPE_COLUMNS
                    .split(lines[header_index])
                    .map(str::trim)
                    .filter(|column| !column.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            break;
        } else if !line.trim().is_empty() {
            last_non_empty = Some(index);
        }
    }

    let Some(start) = lines.iter().position(|line| line.contains("Montag")) else {
        tracing::warn!(calendar_week, year, "no Montag line found, skipping week");
        return None;
    };
    let mut body = &lines[start..];

    // Everything below the last *** separator is the allergen legend.
    if let Some(last_separator) = body.iter().rposition(|line| line.contains("***")) {
        body = &body[..last_separator];
    }

    let joined = body.join("\n").replace('*', "");
    let day_sections: Vec<&str> = DAY_HEADER
        .split(joined.trim())
        .filter(|section| !section.trim().is_empty())
        .collect();
    if day_sections.len() != 7 {
        tracing::warn!(
            calendar_week,
            year,
            detected = day_sections.len(),
            "expected 7 day sections, skipping week"
        );
        return None;
    }

    let mut menus = BTreeMap::new();
    for (weekday, section) in day_sections.into_iter().enumerate() {
        let normalized: String = section.nfkc().collect();

        let mut soup_str = String::new();
        let mut mains_str = String::new();
        for line in normalized.lines() {
            soup_str.push_str(char_slice(line, SOUP_ZONE.0, SOUP_ZONE.1).trim());
            soup_str.push('\n');
            mains_str.push_str(char_slice(line, MAINS_ZONE.0, MAINS_ZONE.1.min(char_len(line))).trim());
            mains_str.push('\n');
        }

        let mut dishes: Vec<Dish> = Vec::new();

        // hyphenated soup names wrap across lines
        let soup_str = soup_str.replace("-\n", "").trim().replace('\n', " ");
        let mut soup = parse_dish(&soup_str);
        soup.dish_type = dish_types.first().cloned().unwrap_or_else(|| "Suppe".to_string());
        if !soup.name.is_empty() && soup.name != "Feiertag" {
            dishes.push(soup);
        }

        let mut dish_type = dish_types.get(1).cloned().unwrap_or_default();
        for block in split_mains(&mains_str) {
            if block.contains("Extraessen") {
                // only specials follow from here on
                dish_type = "Extraessen".to_string();
                continue;
            }
            let mut dish = parse_dish(&collapse_whitespace(&block.replace('\n', " ")));
            if dish.name.is_empty() || dish.name == "Feiertag" {
                continue;
            }
            if !dish_type.is_empty() {
                dish.dish_type = dish_type.clone();
            }
            dishes.push(dish);
        }

        let date = Week::date_for(year, calendar_week, weekday as u32 + 1)?;
        let mut menu = Menu::new(date, dishes);
        menu.remove_duplicates();
        menus.insert(date, menu);
    }
    Some(menus)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dish_strips_codes_and_price() {
        let dish = parse_dish("Tomatensuppe A,G 2,60 €");
        assert_eq!(dish.name, "Tomatensuppe");
        assert!(dish.labels.contains(&Label::Gluten));
        assert!(dish.labels.contains(&Label::Soy));
        assert_eq!(
            dish.prices.students.as_ref().unwrap().base_price,
            Some(2.60)
        );
        assert_eq!(dish.prices.staff, dish.prices.students);
    }

    #[test]
    fn test_parse_dish_strips_adjacent_code_runs() {
        let dish = parse_dish("Rinderbraten S 1,3 mit Soße H 4,50 €");
        assert_eq!(dish.name, "Rinderbraten mit Soße");
        for expected in [
            Label::Pork,
            Label::Meat,
            Label::Dyestuff,
            Label::Antioxidants,
            Label::Milk,
        ] {
            assert!(dish.labels.contains(&expected), "missing {expected:?}");
        }
    }

    #[test]
    fn test_parse_dish_without_price() {
        let dish = parse_dish("Salatteller");
        assert_eq!(dish.name, "Salatteller");
        assert_eq!(dish.prices, Prices::default());
    }

    #[test]
    fn test_split_mains_keeps_mit_continuations_together() {
        let blocks = split_mains("Rinderbraten mit\nKartoffeln\n\nGemüseauflauf");
        assert_eq!(blocks, ["Rinderbraten mit\nKartoffeln", "Gemüseauflauf"]);
    }

    #[test]
    fn test_split_mains_capital_letter_starts_new_dish() {
        let blocks = split_mains("Nudelauflauf\nSalatteller");
        assert_eq!(blocks, ["Nudelauflauf", "Salatteller"]);
    }

    #[test]
    fn test_split_mains_lowercase_continuation() {
        let blocks = split_mains("Schweinebraten\ndazu Kartoffelknödel");
        assert_eq!(blocks, ["Schweinebraten\ndazu Kartoffelknödel"]);
    }

    fn day_section(date: &str, soup: &str, mains_lines: &[&str]) -> String {
        let mut lines = vec![format!("Montag, {date}").replace("Montag", date_weekday(date))];
        let mut first = true;
        for main in mains_lines {
            let soup_part = if first { soup } else { "" };
            first = false;
            lines.push(format!("{soup_part:<40}{main}"));
        }
        lines.push(String::new());
        lines.join("\n")
    }

    fn date_weekday(date: &str) -> &'static str {
        match date {
            "19.11.2018" => "Montag",
            "20.11.2018" => "Dienstag",
            "21.11.2018" => "Mittwoch",
            "22.11.2018" => "Donnerstag",
            "23.11.2018" => "Freitag",
            "24.11.2018" => "Samstag",
            _ => "Sonntag",
        }
    }

    fn weekly_fixture() -> String {
        let mut text = String::new();
        text.push_str("Mediziner Mensa\n\n");
        text.push_str(&format!("{:<40}{}\n", "Suppe", "Wochenangebot"));
        text.push_str("************************************\n");
        let dates = [
            "19.11.2018",
            "20.11.2018",
            "21.11.2018",
            "22.11.2018",
            "23.11.2018",
            "24.11.2018",
            "25.11.2018",
        ];
        for date in dates {
            text.push_str(&day_section(
                date,
                "Kartoffelsuppe 1 2,60 €",
                &[
                    "Rinderbraten mit",
                    "Kloß T,A 4,50 €",
                    "",
                    "Gemüseauflauf G 3,80 €",
                ],
            ));
            text.push('\n');
        }
        text.push_str("************************************\n");
        text.push_str("Allergene: A Gluten, B Krebstiere\n");
        text
    }

    #[test]
    fn test_parse_week() {
        let menus = parse_text(&weekly_fixture(), 2018, 47).unwrap();
        assert_eq!(menus.len(), 7);

        let monday = &menus[&NaiveDate::from_ymd_opt(2018, 11, 19).unwrap()];
        assert_eq!(monday.dishes.len(), 3);

        assert_eq!(monday.dishes[0].name, "Kartoffelsuppe");
        assert_eq!(monday.dishes[0].dish_type, "Suppe");
        assert!(monday.dishes[0].labels.contains(&Label::Dyestuff));
        assert_eq!(
            monday.dishes[0].prices.students.as_ref().unwrap().base_price,
            Some(2.60)
        );

        assert_eq!(monday.dishes[1].name, "Rinderbraten mit Kloß");
        assert_eq!(monday.dishes[1].dish_type, "Wochenangebot");
        assert!(monday.dishes[1].labels.contains(&Label::Beef));
        assert!(monday.dishes[1].labels.contains(&Label::Meat));
        assert!(monday.dishes[1].labels.contains(&Label::Gluten));

        assert_eq!(monday.dishes[2].name, "Gemüseauflauf");
        assert!(monday.dishes[2].labels.contains(&Label::Soy));

        let sunday = &menus[&NaiveDate::from_ymd_opt(2018, 11, 25).unwrap()];
        assert_eq!(sunday.dishes.len(), 3);
    }

    #[test]
    fn test_wrong_day_count_skips_week() {
        let mut text = String::from("Suppe    Wochenangebot\n***\n");
        text.push_str("Montag, 19.11.2018\nKartoffelsuppe 2,60 €\n");
        assert!(parse_text(&text, 2018, 47).is_none());
    }

    #[test]
    fn test_extraessen_switches_dish_type() {
        let mut text = String::new();
        text.push_str(&format!("{:<40}{}\n", "Suppe", "Wochenangebot"));
        text.push_str("***\n");
        let dates = [
            "19.11.2018",
            "20.11.2018",
            "21.11.2018",
            "22.11.2018",
            "23.11.2018",
            "24.11.2018",
            "25.11.2018",
        ];
        for date in dates {
            text.push_str(&day_section(
                date,
                "Brühe 2,00 €",
                &[
                    "Schnitzel A 4,50 €",
                    "",
                    "Extraessen:",
                    "",
                    "Steak H 7,90 €",
                ],
            ));
            text.push('\n');
        }
        text.push_str("***\n");

        let menus = parse_text(&text, 2018, 47).unwrap();
        let monday = &menus[&NaiveDate::from_ymd_opt(2018, 11, 19).unwrap()];
        let steak = monday
            .dishes
            .iter()
            .find(|dish| dish.name == "Steak")
            .unwrap();
        assert_eq!(steak.dish_type, "Extraessen");
        let schnitzel = monday
            .dishes
            .iter()
            .find(|dish| dish.name == "Schnitzel")
            .unwrap();
        assert_eq!(schnitzel.dish_type, "Wochenangebot");
    }

    #[test]
    fn test_feiertag_days_yield_no_dishes() {
        let mut text = String::new();
        text.push_str(&format!("{:<40}{}\n", "Suppe", "Wochenangebot"));
        text.push_str("***\n");
        let dates = [
            "19.11.2018",
            "20.11.2018",
            "21.11.2018",
            "22.11.2018",
            "23.11.2018",
            "24.11.2018",
            "25.11.2018",
        ];
        for (index, date) in dates.into_iter().enumerate() {
            if index == 0 {
                text.push_str(&day_section(date, "Feiertag", &["Feiertag"]));
            } else {
                text.push_str(&day_section(date, "Brühe 2,00 €", &["Schnitzel A 4,50 €"]));
            }
            text.push('\n');
        }
        text.push_str("***\n");

        let menus = parse_text(&text, 2018, 47).unwrap();
        let monday = &menus[&NaiveDate::from_ymd_opt(2018, 11, 19).unwrap()];
        assert!(monday.dishes.is_empty());
        let tuesday = &menus[&NaiveDate::from_ymd_opt(2018, 11, 20).unwrap()];
        assert_eq!(tuesday.dishes.len(), 2);
    }
}
