use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Serialize, Serializer};

use crate::domain::label::Label;

/// A single price component: optional flat amount plus an optional
/// per-unit amount (e.g. 0.75 per "100g"). Self-service canteens use
/// both, classic canteens only the flat amount.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Price {
    pub base_price: Option<f64>,
    pub price_per_unit: Option<f64>,
    pub unit: Option<String>,
}

impl Price {
    pub fn base(base_price: f64) -> Self {
        Self {
            base_price: Some(base_price),
            ..Self::default()
        }
    }

    pub fn per_unit(base_price: f64, price_per_unit: f64, unit: &str) -> Self {
        Self {
            base_price: Some(base_price),
            price_per_unit: Some(price_per_unit),
            unit: Some(unit.to_string()),
        }
    }
}

// Prices are parsed from finite decimal strings or taken from the static
// tables, never NaN, so bitwise equality is structural equality.
impl Eq for Price {}

impl Hash for Price {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.base_price.map(f64::to_bits).hash(state);
        self.price_per_unit.map(f64::to_bits).hash(state);
        self.unit.hash(state);
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.base_price, self.price_per_unit, self.unit.as_deref()) {
            (Some(base), Some(per_unit), Some(unit)) => {
                write!(f, "{base:.2}€ + {per_unit:.2} {unit}")
            }
            (None, Some(per_unit), Some(unit)) => write!(f, "{per_unit:.2} {unit}"),
            (Some(base), _, _) => write!(f, "{base:.2}€"),
            _ => write!(f, "-"),
        }
    }
}

/// Per-audience price variants. Staff and guests fall back to a copy of
/// the student price when a source publishes only one price; the three
/// audiences never share storage, so adjusting one later cannot leak
/// into the others.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Prices {
    pub students: Option<Price>,
    pub staff: Option<Price>,
    pub guests: Option<Price>,
}

impl Prices {
    pub fn new(students: Price, staff: Price, guests: Price) -> Self {
        Self {
            students: Some(students),
            staff: Some(staff),
            guests: Some(guests),
        }
    }

    pub fn from_student(students: Option<Price>) -> Self {
        Self {
            staff: students.clone(),
            guests: students.clone(),
            students,
        }
    }

    /// Bulk base-price update across all three audiences.
    pub fn set_base_price(&mut self, base_price: f64) {
        for price in [&mut self.students, &mut self.staff, &mut self.guests] {
            if let Some(price) = price {
                price.base_price = Some(base_price);
            }
        }
    }
}

impl fmt::Display for Prices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let part = |price: &Option<Price>| price.as_ref().map_or("-".to_string(), Price::to_string);
        write!(
            f,
            "students: {}, staff: {}, guests: {}",
            part(&self.students),
            part(&self.staff),
            part(&self.guests)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Dish {
    pub name: String,
    pub prices: Prices,
    #[serde(serialize_with = "serialize_labels")]
    pub labels: BTreeSet<Label>,
    pub dish_type: String,
}

impl Dish {
    pub fn new(
        name: impl Into<String>,
        prices: Prices,
        labels: BTreeSet<Label>,
        dish_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            prices,
            labels,
            dish_type: dish_type.into(),
        }
    }
}

fn serialize_labels<S: Serializer>(
    labels: &BTreeSet<Label>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut names: Vec<&'static str> = labels.iter().map(Label::name).collect();
    names.sort_unstable();
    names.serialize(serializer)
}

/// All dishes served on one calendar date, in source order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Menu {
    #[serde(rename = "date")]
    pub menu_date: NaiveDate,
    pub dishes: Vec<Dish>,
}

impl Menu {
    pub fn new(menu_date: NaiveDate, dishes: Vec<Dish>) -> Self {
        Self { menu_date, dishes }
    }

    /// Drops dishes whose full content (name, prices, labels, type)
    /// already appeared earlier in the day, keeping first-seen order.
    pub fn remove_duplicates(&mut self) {
        let mut seen: HashSet<Dish> = HashSet::new();
        self.dishes.retain(|dish| seen.insert(dish.clone()));
    }
}

/// One ISO calendar week of menus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Week {
    #[serde(rename = "number")]
    pub calendar_week: u32,
    pub year: i32,
    pub days: Vec<Menu>,
}

impl Week {
    /// Groups date-indexed menus into ISO calendar weeks. A date in
    /// January that still numbers as week 52 belongs to the previous
    /// year's week.
    pub fn to_weeks(menus: &BTreeMap<NaiveDate, Menu>) -> BTreeMap<u32, Week> {
        let mut weeks: BTreeMap<u32, Week> = BTreeMap::new();
        for menu in menus.values() {
            let date = menu.menu_date;
            let calendar_week = date.iso_week().week();
            let year = if calendar_week == 52 && date.month() == 1 {
                date.year() - 1
            } else {
                date.year()
            };
            weeks
                .entry(calendar_week)
                .or_insert_with(|| Week {
                    calendar_week,
                    year,
                    days: Vec::new(),
                })
                .days
                .push(menu.clone());
        }
        weeks
    }

    /// Monday through Friday of the given ISO calendar week. Used to
    /// align column-indexed layouts to calendar dates.
    pub fn non_weekend_days_for_calendar_week(
        year: i32,
        calendar_week: u32,
    ) -> Option<Vec<NaiveDate>> {
        let monday = NaiveDate::from_isoywd_opt(year, calendar_week, Weekday::Mon)?;
        (0..5)
            .map(|offset| monday.checked_add_days(Days::new(offset)))
            .collect()
    }

    /// Date of the given weekday (1 = Monday .. 7 = Sunday) in an ISO
    /// calendar week.
    pub fn date_for(year: i32, calendar_week: u32, weekday: u32) -> Option<NaiveDate> {
        let monday = NaiveDate::from_isoywd_opt(year, calendar_week, Weekday::Mon)?;
        monday.checked_add_days(Days::new(u64::from(weekday.checked_sub(1)?)))
    }
}
