use std::collections::BTreeSet;

use crate::domain::canteen::Canteen;
use crate::domain::label::Label;
use crate::domain::model::{Price, Prices};

/// Meat content flag as published by the Studentenwerk markup
/// (`data-essen-fleischlos`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeatFlag {
    Meat,
    Vegetarian,
    Vegan,
    Unknown,
}

impl MeatFlag {
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "0" => MeatFlag::Meat,
            "1" => MeatFlag::Vegetarian,
            "2" => MeatFlag::Vegan,
            _ => MeatFlag::Unknown,
        }
    }
}

// Base price tiers for non-vegetarian self-service dishes.
const BASE_PRICE_SAUSAGE: f64 = 0.55;
const BASE_PRICE_MEAT: f64 = 1.00;
const BASE_PRICE_FISH: f64 = 1.50;

const SIDE_DISH_TYPES: [&str; 2] = ["Beilagen", "Beilage"];

fn self_service_classic() -> Prices {
    Prices::new(
        Price::per_unit(0.0, 0.75, "100g"),
        Price::per_unit(0.0, 0.90, "100g"),
        Price::per_unit(0.0, 1.05, "100g"),
    )
}

fn self_service_vegan() -> Prices {
    Prices::new(
        Price::per_unit(0.0, 0.33, "100g"),
        Price::per_unit(0.0, 0.55, "100g"),
        Price::per_unit(0.0, 0.66, "100g"),
    )
}

fn uses_self_service(canteen: Canteen, dish_type: &str) -> bool {
    dish_type.contains("Self-Service") || canteen == Canteen::MensaGarching
}

fn is_side_dish(dish_type: &str) -> bool {
    SIDE_DISH_TYPES.contains(&dish_type)
}

/// Base tier for a non-vegetarian self-service dish, decided by the
/// dish content: fish beats sausage beats plain meat.
fn base_price_tier(labels: &BTreeSet<Label>, name: &str) -> f64 {
    let name = name.to_lowercase();
    if labels.contains(&Label::Fish) || name.contains("fisch") {
        BASE_PRICE_FISH
    } else if name.contains("wurst") {
        BASE_PRICE_SAUSAGE
    } else {
        BASE_PRICE_MEAT
    }
}

/// Computes the price set for a dish. Self-service canteens price by
/// weight with a meat/fish base surcharge (side dishes exempt); all
/// other canteens carry static per-category tables. A category missing
/// from its table yields an empty price set, never an error.
pub fn dish_prices(
    canteen: Canteen,
    dish_type: &str,
    flag: MeatFlag,
    labels: &BTreeSet<Label>,
    name: &str,
) -> Prices {
    if uses_self_service(canteen, dish_type) {
        match flag {
            MeatFlag::Vegan => return self_service_vegan(),
            MeatFlag::Vegetarian => return self_service_classic(),
            MeatFlag::Meat => {
                let mut prices = self_service_classic();
                if !is_side_dish(dish_type) {
                    prices.set_base_price(base_price_tier(labels, name));
                }
                return prices;
            }
            MeatFlag::Unknown => {}
        }
    }

    if canteen == Canteen::MensaLeopoldstr {
        return leopoldstr_prices(dish_type).unwrap_or_default();
    }
    fallback_prices(dish_type).unwrap_or_default()
}

fn flat(students: f64, staff: f64, guests: f64) -> Prices {
    Prices::new(Price::base(students), Price::base(staff), Price::base(guests))
}

fn by_weight(students: f64, staff: f64, guests: f64) -> Prices {
    Prices::new(
        Price::per_unit(0.0, students, "100g"),
        Price::per_unit(0.0, staff, "100g"),
        Price::per_unit(0.0, guests, "100g"),
    )
}

/// Mensa Leopoldstraße prices its own menu lines.
fn leopoldstr_prices(dish_type: &str) -> Option<Prices> {
    let prices = match dish_type {
        "Grüne Mensa" | "Länder-Mensa" | "Mensa Klassiker" | "Klassik Tellergericht"
        | "Mensa Spezial Pasta" => Prices::default(),
        "Vegan" => self_service_vegan(),
        "Vegetarisch" | "Länder Menü" => by_weight(0.75, 0.85, 0.95),
        "Klassik Menü" => by_weight(0.85, 0.90, 1.00),
        "Pasta-Menü" => by_weight(0.60, 0.70, 0.80),
        "Suppe" | "Länder-Suppe" | "Klassik Suppe" => flat(0.55, 0.65, 0.80),
        "Beilage" | "Dessert" => flat(0.60, 0.77, 0.92),
        "Aktionssalat 3" | "Aktionsdessert 3" => flat(0.80, 1.14, 1.34),
        "Aktionsdessert 4" => flat(1.00, 1.34, 1.54),
        "Frische Säfte" => flat(1.50, 1.50, 1.50),
        _ => return None,
    };
    Some(prices)
}

// Tagesgericht 1-4 (students, staff, guests).
const TAGESGERICHT: [(f64, f64, f64); 4] = [
    (1.00, 1.90, 2.40),
    (1.55, 2.25, 2.75),
    (1.90, 2.60, 3.10),
    (2.40, 2.95, 3.45),
];

// Aktionsgericht/Biogericht 1-11 share one ladder.
const AKTIONSGERICHT: [(f64, f64, f64); 11] = [
    (1.55, 2.25, 2.75),
    (1.90, 2.60, 3.10),
    (2.40, 2.95, 3.45),
    (2.60, 3.30, 3.80),
    (2.80, 3.65, 4.15),
    (3.00, 4.00, 4.50),
    (3.20, 4.35, 4.85),
    (3.50, 4.70, 5.20),
    (4.00, 5.05, 5.55),
    (4.50, 5.40, 5.90),
    (5.50, 6.50, 7.20),
];

// Biobeilage/Aktionsbeilage 1-6 (5 is unused upstream).
const BIOBEILAGE: [(f64, f64, f64); 6] = [
    (0.60, 0.79, 0.99),
    (0.75, 0.94, 1.14),
    (0.85, 1.14, 1.34),
    (1.05, 1.34, 1.54),
    (0.0, 0.0, 0.0),
    (1.40, 1.60, 1.80),
];

/// Fallback table (Mensa Weihenstephan, Mensa Lothstraße and everything
/// else without its own pricing).
fn fallback_prices(dish_type: &str) -> Option<Prices> {
    let prices = match dish_type {
        "Suppe" => flat(0.55, 0.65, 0.80),
        "Stärkebeilagen" => flat(0.60, 0.77, 0.92),
        "Beilage" => flat(0.60, 0.79, 0.94),
        "Salatbuffet" => by_weight(0.85, 0.90, 0.95),
        "Obst" => flat(0.80, 0.80, 0.80),
        _ => {
            let (prefix, ladder): (&str, &[(f64, f64, f64)]) =
                if let Some(rest) = dish_type.strip_prefix("Tagesgericht ") {
                    (rest, &TAGESGERICHT)
                } else if let Some(rest) = dish_type.strip_prefix("Aktionsgericht ") {
                    (rest, &AKTIONSGERICHT)
                } else if let Some(rest) = dish_type.strip_prefix("Biogericht ") {
                    (rest, &AKTIONSGERICHT)
                } else if let Some(rest) = dish_type.strip_prefix("Biobeilage ") {
                    (rest, &BIOBEILAGE)
                } else if let Some(rest) = dish_type.strip_prefix("Aktionsbeilage ") {
                    (rest, &BIOBEILAGE)
                } else {
                    return None;
                };
            let index = prefix.parse::<usize>().ok()?.checked_sub(1)?;
            let (students, staff, guests) = *ladder.get(index)?;
            flat(students, staff, guests)
        }
    };
    Some(prices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_service_fish_tier() {
        let labels = BTreeSet::from([Label::Fish]);
        let prices = dish_prices(
            Canteen::MensaGarching,
            "Tagesgericht",
            MeatFlag::Meat,
            &labels,
            "Seelachsfilet",
        );
        let students = prices.students.unwrap();
        assert_eq!(students.base_price, Some(1.50));
        assert_eq!(students.price_per_unit, Some(0.75));
    }

    #[test]
    fn test_self_service_sausage_tier_by_name() {
        let prices = dish_prices(
            Canteen::MensaGarching,
            "Tagesgericht",
            MeatFlag::Meat,
            &BTreeSet::new(),
            "Currywurst mit Pommes",
        );
        assert_eq!(prices.students.unwrap().base_price, Some(0.55));
        assert_eq!(prices.guests.unwrap().base_price, Some(0.55));
    }

    #[test]
    fn test_self_service_plain_meat_tier() {
        let prices = dish_prices(
            Canteen::MensaGarching,
            "Tagesgericht",
            MeatFlag::Meat,
            &BTreeSet::new(),
            "Rindergulasch",
        );
        assert_eq!(prices.students.unwrap().base_price, Some(1.00));
    }

    #[test]
    fn test_self_service_side_dish_has_no_base_surcharge() {
        let prices = dish_prices(
            Canteen::MensaGarching,
            "Beilagen",
            MeatFlag::Meat,
            &BTreeSet::new(),
            "Speckknödel",
        );
        let students = prices.students.unwrap();
        assert_eq!(students.base_price, Some(0.0));
        assert_eq!(students.price_per_unit, Some(0.75));
    }

    #[test]
    fn test_self_service_vegan_rates() {
        let prices = dish_prices(
            Canteen::MensaGarching,
            "Tagesgericht",
            MeatFlag::Vegan,
            &BTreeSet::new(),
            "Gemüsecurry",
        );
        assert_eq!(prices.students.unwrap().price_per_unit, Some(0.33));
        assert_eq!(prices.staff.unwrap().price_per_unit, Some(0.55));
        assert_eq!(prices.guests.unwrap().price_per_unit, Some(0.66));
    }

    #[test]
    fn test_self_service_by_dish_type_marker() {
        let prices = dish_prices(
            Canteen::MensaArcisstr,
            "Self-Service Grüne Mensa",
            MeatFlag::Vegetarian,
            &BTreeSet::new(),
            "Salatteller",
        );
        assert_eq!(prices.students.unwrap().price_per_unit, Some(0.75));
    }

    #[test]
    fn test_leopoldstr_table() {
        let prices = dish_prices(
            Canteen::MensaLeopoldstr,
            "Klassik Menü",
            MeatFlag::Unknown,
            &BTreeSet::new(),
            "Schnitzel",
        );
        assert_eq!(prices.students.unwrap().price_per_unit, Some(0.85));
    }

    #[test]
    fn test_fallback_table() {
        let prices = dish_prices(
            Canteen::MensaLothstr,
            "Tagesgericht 2",
            MeatFlag::Unknown,
            &BTreeSet::new(),
            "Linseneintopf",
        );
        assert_eq!(prices.students.unwrap().base_price, Some(1.55));
        assert_eq!(prices.staff.unwrap().base_price, Some(2.25));

        let bio = dish_prices(
            Canteen::MensaWeihenstephan,
            "Biogericht 3",
            MeatFlag::Unknown,
            &BTreeSet::new(),
            "Bio-Gulasch",
        );
        assert_eq!(bio.students.unwrap().base_price, Some(2.40));
    }

    #[test]
    fn test_unknown_category_yields_empty_prices() {
        let prices = dish_prices(
            Canteen::MensaLothstr,
            "Mitternachtsbuffet",
            MeatFlag::Unknown,
            &BTreeSet::new(),
            "Überraschung",
        );
        assert_eq!(prices, Prices::default());
    }
}
