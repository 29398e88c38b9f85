use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};

use crate::core::fetch::HttpClient;
use crate::core::pricing::{self, MeatFlag};
use crate::domain::canteen::Canteen;
use crate::domain::label::{Label, LabelSource};
use crate::domain::model::{Dish, Menu};
use crate::domain::ports::MenuSource;
use crate::utils::error::{MenuError, Result};
use crate::utils::text;

const BASE_URL: &str = "http://www.studentenwerk-muenchen.de/mensa/speiseplan";
const DEFAULT_DISH_TYPE: &str = "Tagesgericht";

const CANTEENS: [Canteen; 14] = [
    Canteen::MensaArcisstr,
    Canteen::MensaGarching,
    Canteen::MensaLeopoldstr,
    Canteen::MensaLothstr,
    Canteen::MensaMartinsried,
    Canteen::MensaPasing,
    Canteen::MensaWeihenstephan,
    Canteen::StubistroArcisstr,
    Canteen::StubistroGoethestr,
    Canteen::StubistroGrosshadern,
    Canteen::StubistroRosenheim,
    Canteen::StubistroSchellingstr,
    Canteen::StucafeAdalbertstr,
    Canteen::StucafeGarching,
];

/// The primary source: one semi-structured HTML page per canteen with
/// repeated per-day blocks. Dish names, section types and the four
/// attribute lists are published as parallel sequences that only line
/// up positionally.
pub struct StudentenwerkSource {
    http: HttpClient,
    base_url: String,
}

impl StudentenwerkSource {
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
impl MenuSource for StudentenwerkSource {
    fn name(&self) -> &'static str {
        "studentenwerk"
    }

    fn canteens(&self) -> &'static [Canteen] {
        &CANTEENS
    }

    async fn parse(&self, canteen: Canteen) -> Result<BTreeMap<NaiveDate, Menu>> {
        let url_id = canteen
            .url_id()
            .ok_or_else(|| MenuError::UnsupportedCanteen(canteen.id().to_string()))?;
        let url = format!("{}/speiseplan_{}_-de.html", self.base_url, url_id);
        let page = self.http.get_text(&url).await?;
        parse_page(&page, canteen)
    }
}

fn selector(css: &'static str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| MenuError::parsing(format!("invalid selector '{css}': {e}")))
}

fn own_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim_end().to_string()
}

/// Extracts all daily menus from one canteen page.
pub fn parse_page(page: &str, canteen: Canteen) -> Result<BTreeMap<NaiveDate, Menu>> {
    let document = Html::parse_document(page);
    let day_selector = selector("div.c-schedule__item")?;
    let date_selector = selector("strong")?;
    let name_selector = selector("p.js-schedule-dish-description")?;
    let type_selector = selector("span.stwm-artname")?;
    let row_selector = selector("li.js-menu__list-item")?;

    let mut menus = BTreeMap::new();
    for day in document.select(&day_selector) {
        let Some(date_text) = day.select(&date_selector).next().map(own_text) else {
            tracing::warn!(canteen = canteen.id(), "day block without a date header, skipping");
            continue;
        };
        let date = match text::parse_date(&date_text) {
            Ok(date) => date,
            Err(_) => {
                tracing::warn!(
                    canteen = canteen.id(),
                    date = date_text,
                    "unparseable date header, skipping day"
                );
                continue;
            }
        };

        let dishes = parse_dishes(day, canteen, &name_selector, &type_selector, &row_selector)?;
        menus.insert(date, Menu::new(date, dishes));
    }
    Ok(menus)
}

struct AttributeRow {
    additives: String,
    allergens: String,
    type_markers: String,
    meatless: String,
}

impl AttributeRow {
    fn is_empty(&self) -> bool {
        self.additives.is_empty()
            && self.allergens.is_empty()
            && self.type_markers.is_empty()
            && self.meatless.is_empty()
    }
}

fn parse_dishes(
    day: ElementRef,
    canteen: Canteen,
    name_selector: &Selector,
    type_selector: &Selector,
    row_selector: &Selector,
) -> Result<Vec<Dish>> {
    let names: Vec<String> = day.select(name_selector).map(own_text).collect();
    let names = text::make_duplicates_unique(names);

    // Section types are sparse: a blank entry reuses the nearest
    // preceding non-blank one (forward fill).
    let mut dish_types: Vec<String> = Vec::new();
    let mut current_type = String::new();
    for type_element in day.select(type_selector) {
        let type_text = own_text(type_element);
        if !type_text.is_empty() {
            current_type = type_text;
        }
        dish_types.push(current_type.clone());
    }

    let attr = |element: ElementRef, name: &str| {
        element.value().attr(name).unwrap_or_default().trim().to_string()
    };
    let rows: Vec<AttributeRow> = day
        .select(row_selector)
        .map(|row| AttributeRow {
            additives: attr(row, "data-essen-zusatz"),
            allergens: attr(row, "data-essen-allergene"),
            type_markers: attr(row, "data-essen-typ"),
            meatless: attr(row, "data-essen-fleischlos"),
        })
        .collect();

    // The lists only correlate by position; unequal lengths would
    // silently misalign every following dish.
    if names.len() != dish_types.len() || names.len() != rows.len() {
        return Err(MenuError::parsing(format!(
            "misaligned day block at {}: {} names, {} types, {} attribute rows",
            canteen.id(),
            names.len(),
            dish_types.len(),
            rows.len()
        )));
    }

    let mut dishes: Vec<Dish> = Vec::with_capacity(names.len());
    for ((name, dish_type), row) in names.into_iter().zip(dish_types).zip(rows) {
        // Multi-row dishes publish their attributes only on the first
        // row; continuation rows take over everything but the name.
        if row.is_empty() {
            if let Some(previous) = dishes.last() {
                let inherited = Dish::new(
                    name,
                    previous.prices.clone(),
                    previous.labels.clone(),
                    previous.dish_type.clone(),
                );
                dishes.push(inherited);
                continue;
            }
        }

        let mut labels = std::collections::BTreeSet::new();
        LabelSource::Studentenwerk.resolve_into(&row.additives, &mut labels);
        LabelSource::Studentenwerk.resolve_into(&row.allergens, &mut labels);
        LabelSource::Studentenwerk.resolve_into(&row.type_markers, &mut labels);

        let flag = MeatFlag::from_code(&row.meatless);
        match flag {
            MeatFlag::Vegetarian => {
                labels.insert(Label::Vegetarian);
            }
            MeatFlag::Vegan => {
                labels.insert(Label::Vegan);
            }
            MeatFlag::Meat | MeatFlag::Unknown => {}
        }
        Label::add_supertypes(&mut labels);

        let prices = pricing::dish_prices(canteen, &dish_type, flag, &labels, &name);
        let dish_type = if dish_type.is_empty() {
            DEFAULT_DISH_TYPE.to_string()
        } else {
            dish_type
        };
        dishes.push(Dish::new(name, prices, labels, dish_type));
    }
    Ok(dishes)
}
