use std::collections::BTreeMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use regex::Regex;

use crate::core::fetch::HttpClient;
use crate::core::pdf;
use crate::domain::canteen::Canteen;
use crate::domain::label::{Label, LabelSource};
use crate::domain::model::{Dish, Menu, Price, Prices, Week};
use crate::domain::ports::MenuSource;
use crate::utils::error::{MenuError, Result};
use crate::utils::text::{char_len, char_slice, collapse_whitespace};

const BASE_URL: &str = "https://www.wilhelm-gastronomie.de/.cm4all/mediadb";
const CANTEENS: [Canteen; 1] = [Canteen::FmiBistro];

/// Character width of the decorative left margin on every body line.
const LEFT_MARGIN: usize = 13;
/// Header/trailer lines outside the menu table.
const HEADER_LINES: usize = 4;
const TRAILER_LINES: usize = 15;
const WEEKDAY_COLUMNS: usize = 5;
/// Search window around an estimated column boundary.
const WINDOW: usize = 15;
/// Surcharge guests pay on top of the published price.
const GUEST_SURCHARGE: f64 = 0.80;

/// The three price-marker rows of a weekly block, in table order.
const DISH_TYPES: [&str; 3] = ["Suppe", "Fleisch", "Vegetarisch"];

// Whole-line boilerplate between the dish rows.
static IGNORE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(suppe|meat|&|grill|vegan\*|veggie)?\s*$").expect("static regex")
});
static PRICE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+(?:,\d+)?").expect("static regex"));
static LABEL_CODES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z](?:,[A-Za-z]+)*").expect("static regex"));
static TITLE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+(?:\s+\S+)*").expect("static regex"));

/// Weekly PDF menu without any tabular markup: five weekday columns
/// must be reconstructed from character offsets alone.
pub struct FmiBistroSource {
    http: HttpClient,
    base_url: String,
}

impl FmiBistroSource {
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
impl MenuSource for FmiBistroSource {
    fn name(&self) -> &'static str {
        "fmi-bistro"
    }

    fn canteens(&self) -> &'static [Canteen] {
        &CANTEENS
    }

    async fn parse(&self, _canteen: Canteen) -> Result<BTreeMap<NaiveDate, Menu>> {
        let today = chrono::Local::now().date_naive();
        let iso_week = today.iso_week();
        let url = format!(
            "{}/Speiseplan_Garching_KW{}_{}.pdf",
            self.base_url,
            iso_week.week(),
            iso_week.year()
        );
        let pdf_bytes = self.http.get_bytes(&url).await?;
        let text = pdf::extract_text(&pdf_bytes, false).await?;
        parse_text(&text, iso_week.year(), iso_week.week())
    }
}

/// Estimated character span of a weekday column on a line of
/// `line_len` characters. The end snaps to the true line end when the
/// integer division error leaves less than 5 characters over.
pub fn column_span(line_len: usize, weekday: usize) -> (usize, usize) {
    let width = line_len / WEEKDAY_COLUMNS;
    let begin = weekday * width;
    let mut end = (begin + width).min(line_len);
    if line_len - end < 5 {
        end = line_len;
    }
    (begin, end)
}

fn relevant_lines(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text.lines().collect();
    let body = lines
        .get(HEADER_LINES..lines.len().saturating_sub(TRAILER_LINES))
        .unwrap_or(&[]);
    body.iter()
        .filter(|line| !IGNORE_LINE.is_match(line))
        .map(|line| char_slice(line, LEFT_MARGIN, char_len(line)))
        .collect()
}

fn dish_title_part(line: &str, weekday: usize) -> Option<String> {
    let (begin, end) = column_span(char_len(line), weekday);
    let column = char_slice(line, begin, end);
    TITLE_RUN.find(&column).map(|m| m.as_str().to_string())
}

/// Price and label-code substrings of a marker line for one weekday.
/// `None` means the column carries no price: no dish exists that day.
fn price_and_codes(line: &str, weekday: usize) -> Option<(String, f64)> {
    let len = char_len(line);
    let (begin, end) = column_span(len, weekday);

    let price_window = char_slice(line, end.saturating_sub(WINDOW), (end + WINDOW).min(len));
    let price_str = PRICE.find(&price_window)?.as_str().replace(',', ".");
    let price = price_str.parse::<f64>().ok()?;

    let code_window = char_slice(line, begin.saturating_sub(WINDOW), begin + WINDOW);
    let codes = LABEL_CODES
        .find(&code_window)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();
    Some((codes, price))
}

/// Parses the converted PDF text of one calendar week.
pub fn parse_text(text: &str, year: i32, calendar_week: u32) -> Result<BTreeMap<NaiveDate, Menu>> {
    let lines = relevant_lines(text);

    // The column model leans on the table shape: exactly one marker
    // row per dish-type section.
    let marker_lines = lines.iter().filter(|line| line.contains('€')).count();
    if marker_lines != DISH_TYPES.len() {
        return Err(MenuError::parsing(format!(
            "expected exactly {} price marker lines, found {marker_lines}",
            DISH_TYPES.len()
        )));
    }

    let days = Week::non_weekend_days_for_calendar_week(year, calendar_week).ok_or_else(|| {
        MenuError::parsing(format!("invalid calendar week {calendar_week} in {year}"))
    })?;

    let mut menus = BTreeMap::new();
    for (weekday, &date) in days.iter().enumerate() {
        let mut dishes: Vec<Dish> = Vec::new();
        let mut title_parts: Vec<String> = Vec::new();
        let mut dish_types = DISH_TYPES.iter();

        for line in &lines {
            if !line.contains('€') {
                if let Some(part) = dish_title_part(line, weekday) {
                    title_parts.push(part);
                }
                continue;
            }

            let dish_type = dish_types.next().unwrap_or(&DISH_TYPES[2]);
            let Some((codes, price)) = price_and_codes(line, weekday) else {
                // no price in this column: the bistro serves nothing
                // of this section today
                break;
            };

            let prices = Prices::new(
                Price::base(price),
                Price::base(price),
                Price::base(price + GUEST_SURCHARGE),
            );
            let mut labels = LabelSource::FmiBistro.resolve(&codes);
            Label::add_supertypes(&mut labels);
            let title = collapse_whitespace(&title_parts.join(" "));
            dishes.push(Dish::new(title, prices, labels, *dish_type));
            title_parts.clear();
        }

        if !dishes.is_empty() {
            menus.insert(date, Menu::new(date, dishes));
        }
    }
    Ok(menus)
}
