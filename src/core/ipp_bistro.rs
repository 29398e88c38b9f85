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
use crate::utils::error::Result;
use crate::utils::text::{byte_slice_lossy, collapse_whitespace};

const BASE_URL: &str = "http://konradhof-catering.com/ipp/";
const CANTEENS: [Canteen; 1] = [Canteen::IppBistro];

/// Every IPP dish carries the same house code set.
const HOUSE_CODES: &str = "Mi,Gl,Sf,Sl,Ei,Se,4";

const FOUR_DISH_TYPES: [&str; 4] = [
    "Veggie",
    "Traditionelle Küche",
    "Internationale Küche",
    "Specials",
];
const GENERIC_DISH_TYPE: &str = "Tagesgericht";

// The column model hangs on the soup row: every weekday column starts
// with "Tagessuppe siehe Aushang" (sometimes split by the extractor
// into "T agessuppe…", sometimes wrapped onto two lines) or a
// closed-day placeholder.
static SOUP_ONE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)T agessuppe siehe Aushang|Tagessuppe siehe Aushang").expect("static regex")
});
static SOUP_TWO_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Aushang").expect("static regex"));
static CLOSED_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Aschermittwoch|Feiertag|Geschlossen").expect("static regex"));
static ANY_ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Tagessuppe siehe Aushang|Aushang|Aschermittwoch|Feiertag|Geschlossen")
        .expect("static regex")
});
/// „Überraschungsmenü“ without a trailing price; the price belongs
/// between the two groups.
static SURPRISE_WITHOUT_PRICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(Überraschungsmenü\s)(\s+[^\s\d]+)").expect("static regex"));
static DISH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.+?)(\d+,\d+|\?€)\s€[^)]").expect("static regex"));
static PDF_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)KW[^a-zA-Z1-9]*([1-9]\d*).*\d+\.\d+\.(\d+)").expect("static regex"));

/// Weekly PDF table where column boundaries are located by anchor
/// phrases instead of fixed arithmetic.
pub struct IppBistroSource {
    http: HttpClient,
    base_url: String,
}

impl IppBistroSource {
    pub fn new(http: HttpClient) -> Self {
        Self::with_base_url(http, BASE_URL)
    }

    pub fn with_base_url(http: HttpClient, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl MenuSource for IppBistroSource {
    fn name(&self) -> &'static str {
        "ipp-bistro"
    }

    fn canteens(&self) -> &'static [Canteen] {
        &CANTEENS
    }

    async fn parse(&self, _canteen: Canteen) -> Result<BTreeMap<NaiveDate, Menu>> {
        let page = self.http.get_text(&self.base_url).await?;
        let pdf_urls = find_menu_pdf_urls(&page);
        if pdf_urls.is_empty() {
            tracing::warn!("no weekly menu PDFs linked on the IPP page");
            return Ok(BTreeMap::new());
        }

        let mut menus = BTreeMap::new();
        for pdf_url in pdf_urls {
            // Example PDF name: KW-48_27.11-01.12.10.2017-3.pdf
            let pdf_name = pdf_url.rsplit('/').next().unwrap_or(&pdf_url);
            let Some((calendar_week, year)) = week_and_year_from_pdf_name(pdf_name) else {
                tracing::warn!(pdf_name, "cannot read calendar week from PDF name, skipping");
                continue;
            };
            let pdf_bytes = self.http.get_bytes(&pdf_url).await?;
            let text = pdf::extract_text(&pdf_bytes, true).await?;
            if let Some(parsed) = parse_text(&text, year, calendar_week) {
                menus.extend(parsed);
            }
        }
        Ok(menus)
    }
}

fn find_menu_pdf_urls(page: &str) -> Vec<String> {
    let document = Html::parse_document(page);
    let Ok(link_selector) = Selector::parse(r#"a[title*="KW_"]"#) else {
        return Vec::new();
    };
    document
        .select(&link_selector)
        .filter_map(|link| link.value().attr("href"))
        .map(str::to_string)
        .collect()
}

fn week_and_year_from_pdf_name(pdf_name: &str) -> Option<(u32, i32)> {
    let captures = PDF_NAME.captures(pdf_name)?;
    let week = captures.get(1)?.as_str().parse::<u32>().ok()?;
    let year_str = captures.get(2)?.as_str();
    let year = year_str.parse::<i32>().ok()?;
    let year = if year_str.len() == 2 { 2000 + year } else { year };
    Some((week, year))
}

/// Parses one weekly table. Soft structural anomalies (no weekday
/// header, wrong anchor count) log a warning and skip the week.
pub fn parse_text(text: &str, year: i32, calendar_week: u32) -> Option<BTreeMap<NaiveDate, Menu>> {
    let all_lines: Vec<&str> = text.lines().collect();

    // The table header names the weekdays. Monday and Friday also occur
    // in the date-range line above the table, so they cannot identify it.
    let header_index = all_lines.iter().position(|line| {
        let shrunk = line.replace(' ', "").to_lowercase();
        ["dienstag", "mittwoch", "donnerstag"]
            .iter()
            .any(|weekday| shrunk.contains(weekday))
    });
    let Some(header_index) = header_index else {
        tracing::warn!(
            calendar_week,
            year,
            first_line = all_lines.first().unwrap_or(&""),
            "menu text is not a weekly table, skipping"
        );
        return None;
    };
    let lines = &all_lines[header_index..];
    let weekdays_line = lines[0];

    // The weekday line itself may carry closed-day keywords, so the
    // soup rows are searched below it.
    let mut soup_lines = lines
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, line)| ANY_ANCHOR.find(line).is_some());
    let Some((soup_index1, soup_line1)) = soup_lines.next().map(|(i, line)| (i, *line)) else {
        tracing::warn!(calendar_week, year, "no soup anchor row found, skipping week");
        return None;
    };
    let (soup_index2, soup_line2) = soup_lines
        .next()
        .map(|(i, line)| (i, *line))
        .unwrap_or((soup_index1, ""));

    // An anchor's match offset is not the true column start: centered
    // text shifts it. One-line soup anchors and closed-day keywords
    // start 3 bytes late, the two-line "Aushang" rendering 14.
    let mut positions: Vec<(usize, usize)> = Vec::new();
    positions.extend(
        CLOSED_DAY
            .find_iter(weekdays_line)
            .map(|m| (m.start().saturating_sub(3), m.end())),
    );
    positions.extend(
        SOUP_ONE_LINE
            .find_iter(soup_line1)
            .map(|m| (m.start().saturating_sub(3), m.end())),
    );
    let two_line_positions: Vec<(usize, usize)> = SOUP_TWO_LINE
        .find_iter(soup_line2)
        .map(|m| (m.start().saturating_sub(14), m.end() + 3))
        .collect();
    positions.extend(two_line_positions.iter().copied());
    positions.extend(
        CLOSED_DAY
            .find_iter(soup_line1)
            .chain(CLOSED_DAY.find_iter(soup_line2))
            .map(|m| (m.start().saturating_sub(3), m.end())),
    );
    positions.sort_unstable();

    if positions.len() != 5 {
        tracing::warn!(
            calendar_week,
            year,
            detected = positions.len(),
            "expected 5 weekday columns, skipping week"
        );
        return None;
    }

    let soup_line_index = if two_line_positions.is_empty() {
        soup_index1
    } else {
        soup_index2
    };

    let column_starts: Vec<usize> = positions.iter().map(|(start, _)| *start).collect();
    let days = Week::non_weekend_days_for_calendar_week(year, calendar_week)?;

    // Starting three lines below the soup row skips the soup price
    // note even on weeks with closed days.
    let mut day_texts = vec![String::new(); 5];
    for line in lines.get(soup_line_index + 3..).unwrap_or(&[]) {
        for weekday in 0..5 {
            let begin = column_starts[weekday];
            let end = if weekday < 4 {
                column_starts[weekday + 1]
            } else {
                line.len()
            };
            day_texts[weekday].push(' ');
            day_texts[weekday].push_str(byte_slice_lossy(line, begin, end));
        }
    }

    let mut menus = BTreeMap::new();
    for (weekday, date) in days.into_iter().enumerate() {
        let repaired =
            SURPRISE_WITHOUT_PRICE.replace_all(&day_texts[weekday], "${1}?€ € ${2}");
        let normalized: String = repaired.nfkc().collect();
        let day_text = collapse_whitespace(&normalized) + " ";

        let dish_names_prices: Vec<(String, String)> = DISH
            .captures_iter(&day_text)
            .map(|captures| {
                (
                    captures[1].trim().to_string(),
                    captures[2].trim().to_string(),
                )
            })
            .collect();

        // The sections repeat every day, but only a full 4-dish day
        // can be labeled positionally.
        let dish_types: Vec<&str> = if dish_names_prices.len() == 4 {
            FOUR_DISH_TYPES.to_vec()
        } else {
            vec![GENERIC_DISH_TYPE; dish_names_prices.len()]
        };

        let mut labels = LabelSource::IppBistro.resolve(HOUSE_CODES);
        Label::add_supertypes(&mut labels);

        let mut dishes = Vec::with_capacity(dish_names_prices.len());
        for ((name, price_str), dish_type) in dish_names_prices.into_iter().zip(dish_types) {
            let price = match price_str.replace(',', ".").parse::<f64>() {
                Ok(price) => Some(Price::base(price)),
                Err(_) => {
                    tracing::warn!(price = price_str, "unparseable price, keeping dish without one");
                    None
                }
            };
            dishes.push(Dish::new(
                name,
                Prices::from_student(price),
                labels.clone(),
                dish_type,
            ));
        }

        let mut menu = Menu::new(date, dishes);
        menu.remove_duplicates();
        menus.insert(date, menu);
    }
    Some(menus)
}
