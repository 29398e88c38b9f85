use std::collections::BTreeSet;

use serde::{Serialize, Serializer};

/// Output language for human-readable label text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    De,
    En,
}

impl Language {
    pub fn label(&self) -> &'static str {
        match self {
            Language::De => "Deutsch",
            Language::En => "English",
        }
    }
}

/// Canonical allergen/additive/dietary marker. Closed set; sources map
/// their own code alphabets onto it via [`LabelSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Label {
    Gluten,
    Wheat,
    Rye,
    Barley,
    Oat,
    Spelt,
    Hybrids,
    Shellfish,
    ChickenEggs,
    Fish,
    Peanuts,
    Soy,
    Milk,
    Lactose,
    Almonds,
    Hazelnuts,
    Walnuts,
    Cashews,
    Pecan,
    Pistachios,
    Macadamia,
    Celery,
    Mustard,
    Sesame,
    Sulphurs,
    Sulfites,
    Lupin,
    Molluscs,
    ShellFruits,
    Bavaria,
    Msc,
    Dyestuff,
    Preservatives,
    Antioxidants,
    FlavorEnhancer,
    Waxed,
    Phosphates,
    Sweeteners,
    Phenylalanine,
    CocoaContainingGrease,
    Gelatin,
    Alcohol,
    Pork,
    Beef,
    Veal,
    WildMeat,
    Lamb,
    Garlic,
    Poultry,
    Cereal,
    Meat,
    Vegan,
    Vegetarian,
}

impl Label {
    /// Stable identifier used in the JSON output.
    pub fn name(&self) -> &'static str {
        self.info().0
    }

    pub fn text(&self, language: Language) -> &'static str {
        match language {
            Language::De => self.info().1,
            Language::En => self.info().2,
        }
    }

    pub fn abbreviation(&self) -> &'static str {
        self.info().3
    }

    // (name, german, english, abbreviation)
    fn info(&self) -> (&'static str, &'static str, &'static str, &'static str) {
        use Label::*;
        match self {
            Gluten => ("GLUTEN", "Gluten", "gluten-containing cereals", "🌿"),
            Wheat => ("WHEAT", "Weizen", "wheat", "GlW"),
            Rye => ("RYE", "Roggen", "rye", "GlR"),
            Barley => ("BARLEY", "Gerste", "barley", "GlG"),
            Oat => ("OAT", "Hafer", "oat", "GlH"),
            Spelt => ("SPELT", "Dinkel", "spelt", "GlD"),
            Hybrids => ("HYBRIDS", "Hybridstämme", "hybrid strains", "GlHy"),
            Shellfish => ("SHELLFISH", "Krebstiere", "shellfish", "🦀"),
            ChickenEggs => ("CHICKEN_EGGS", "Eier", "egg", "🥚"),
            Fish => ("FISH", "Fisch", "fish", "🐟"),
            Peanuts => ("PEANUTS", "Erdnüsse", "peanut", "🥜"),
            Soy => ("SOY", "Soja", "soy", "So"),
            Milk => ("MILK", "Milch", "milk", "🥛"),
            Lactose => ("LACTOSE", "Laktose", "lactose", "La"),
            Almonds => ("ALMONDS", "Mandeln", "almonds", "ScM"),
            Hazelnuts => ("HAZELNUTS", "Haselnüsse", "hazelnuts", "🌰"),
            Walnuts => ("WALNUTS", "Walnüsse", "walnuts", "ScW"),
            Cashews => ("CASHEWS", "Cashewnüsse", "cashews", "ScC"),
            Pecan => ("PECAN", "Pekanüsse", "pecans", "ScP"),
            Pistachios => ("PISTACHIOS", "Pistazien", "pistachios", "ScPi"),
            Macadamia => ("MACADAMIA", "Macadamianüsse", "macadamias", "ScMa"),
            Celery => ("CELERY", "Sellerie", "celery", "Sl"),
            Mustard => ("MUSTARD", "Senf", "mustard", "Sf"),
            Sesame => ("SESAME", "Sesam", "sesame", "Se"),
            Sulphurs => ("SULPHURS", "Schwefeldioxid", "sulphurs", "🔻"),
            Sulfites => ("SULFITES", "Sulfite", "sulfites", "🔺"),
            Lupin => ("LUPIN", "Lupine", "lupin", "Lu"),
            Molluscs => ("MOLLUSCS", "Weichtiere", "molluscs", "🐙"),
            ShellFruits => ("SHELL_FRUITS", "Schalenfrüchte", "shell fruits", "🥥"),
            Bavaria => (
                "BAVARIA",
                "Zertifizierte Qualität Bayern",
                "Certified quality Bavaria",
                "GQB",
            ),
            Msc => (
                "MSC",
                "Marine Stewardship Council",
                "Marine Stewardship Council",
                "🎣",
            ),
            Dyestuff => ("DYESTUFF", "Farbstoffe", "dyestuff", "🎨"),
            Preservatives => ("PRESERVATIVES", "Preservate", "preservatives", "🥫"),
            Antioxidants => ("ANTIOXIDANTS", "Antioxidanten", "antioxidants", "⚗"),
            FlavorEnhancer => (
                "FLAVOR_ENHANCER",
                "Geschmacksverstärker",
                "flavor enhancer",
                "🔬",
            ),
            Waxed => ("WAXED", "Gewachst", "waxed", "🐝"),
            Phosphates => ("PHOSPHATES", "Phosphate", "phosphates", "🔷"),
            Sweeteners => ("SWEETENERS", "Süßungsmittel", "sweeteners", "🍬"),
            Phenylalanine => (
                "PHENYLALANINE",
                "Phenylaline",
                "with a source of phenylalanine",
                "💊",
            ),
            CocoaContainingGrease => (
                "COCOA_CONTAINING_GREASE",
                "Kakaohaltiges Fett",
                "cocoa-containing grease",
                "🍫",
            ),
            Gelatin => ("GELATIN", "Gelatine", "gelatin", "🍮"),
            Alcohol => ("ALCOHOL", "Alkohol", "alcohol", "🍷"),
            Pork => ("PORK", "Schweinefleisch", "pork", "🐖"),
            Beef => ("BEEF", "Rinderfleisch", "beef", "🐄"),
            Veal => ("VEAL", "Kalbsfleisch", "veal", "🐂"),
            WildMeat => ("WILD_MEAT", "Wildfleisch", "wild meat", "🐗"),
            Lamb => ("LAMB", "Lammfleisch", "lamb", "🐑"),
            Garlic => ("GARLIC", "Knoblauch", "garlic", "🧄"),
            Poultry => ("POULTRY", "Geflügel", "poultry", "🐔"),
            Cereal => ("CEREAL", "Getreide", "cereal", "🌾"),
            Meat => ("MEAT", "Fleisch", "meat", "🍖"),
            Vegan => ("VEGAN", "Vegan", "vegan", "🫑"),
            Vegetarian => ("VEGETARIAN", "Vegetarisch", "vegetarian", "🥕"),
        }
    }

    /// Derives implied labels: any shell-fruit subtype implies
    /// SHELL_FRUITS, any gluten cereal implies CEREAL, VEGAN implies
    /// VEGETARIAN, and pork/beef/veal imply MEAT.
    pub fn add_supertypes(labels: &mut BTreeSet<Label>) {
        use Label::*;
        const SHELL_FRUIT_SUBTYPES: [Label; 8] = [
            Almonds, Hazelnuts, Macadamia, Cashews, Pecan, Pistachios, Sesame, Walnuts,
        ];
        const CEREAL_SUBTYPES: [Label; 5] = [Barley, Oat, Rye, Spelt, Wheat];
        const MEAT_SUBTYPES: [Label; 3] = [Pork, Beef, Veal];

        if SHELL_FRUIT_SUBTYPES.iter().any(|l| labels.contains(l)) {
            labels.insert(ShellFruits);
        }
        if CEREAL_SUBTYPES.iter().any(|l| labels.contains(l)) {
            labels.insert(Cereal);
        }
        if labels.contains(&Vegan) {
            labels.insert(Vegetarian);
        }
        if MEAT_SUBTYPES.iter().any(|l| labels.contains(l)) {
            labels.insert(Meat);
        }
    }
}

impl Serialize for Label {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Which source's code table to resolve against. The same code means
/// different things at different sources, so every source owns its own
/// table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelSource {
    Studentenwerk,
    FmiBistro,
    IppBistro,
    MedizinerMensa,
}

impl LabelSource {
    fn name(&self) -> &'static str {
        match self {
            LabelSource::Studentenwerk => "studentenwerk",
            LabelSource::FmiBistro => "fmi-bistro",
            LabelSource::IppBistro => "ipp-bistro",
            LabelSource::MedizinerMensa => "mediziner-mensa",
        }
    }

    /// Resolves a comma/whitespace separated code string into `labels`.
    /// Unknown codes are logged and skipped; they never fail the dish.
    pub fn resolve_into(&self, raw: &str, labels: &mut BTreeSet<Label>) {
        for code in raw
            .split([',', ' '])
            .map(str::trim)
            .filter(|code| !code.is_empty())
        {
            match self.lookup(code) {
                Some(resolved) => labels.extend(resolved.iter().copied()),
                None => tracing::warn!(source = self.name(), code, "unknown label code"),
            }
        }
    }

    pub fn resolve(&self, raw: &str) -> BTreeSet<Label> {
        let mut labels = BTreeSet::new();
        self.resolve_into(raw, &mut labels);
        labels
    }

    fn lookup(&self, code: &str) -> Option<&'static [Label]> {
        use Label::*;
        let resolved: &'static [Label] = match self {
            LabelSource::Studentenwerk => match code {
                "1" => &[Dyestuff],
                "2" => &[Preservatives],
                "3" => &[Antioxidants],
                "4" => &[FlavorEnhancer],
                "5" => &[Sulphurs],
                "7" => &[Waxed],
                "8" => &[Phosphates],
                "9" => &[Sweeteners],
                "10" => &[Phenylalanine],
                "13" => &[CocoaContainingGrease],
                "14" => &[Gelatin],
                "99" => &[Alcohol],
                "Gl" => &[Gluten],
                "GlW" => &[Wheat],
                "GlR" => &[Rye],
                "GlG" => &[Barley],
                "GlH" => &[Oat],
                "GlD" => &[Spelt],
                "GlHy" => &[Hybrids],
                "Kr" => &[Shellfish],
                "Ei" => &[ChickenEggs],
                "Fi" => &[Fish],
                "Er" => &[Peanuts],
                "So" => &[Soy],
                "Mi" => &[Milk, Lactose],
                "Sc" => &[ShellFruits],
                "ScM" => &[Almonds],
                "ScH" => &[Hazelnuts],
                "ScW" => &[Walnuts],
                "ScC" => &[Cashews],
                "ScP" => &[Pecan],
                "ScPi" => &[Pistachios],
                "ScMa" => &[Macadamia],
                "Sl" => &[Celery],
                "Sf" => &[Mustard],
                "Se" => &[Sesame],
                "Sw" => &[Sulphurs, Sulfites],
                "Lu" => &[Lupin],
                "Wt" => &[Molluscs],
                "GQB" => &[Bavaria],
                "MSC" => &[Msc],
                // meat markers from the type attribute
                "S" => &[Pork],
                "R" => &[Beef],
                "K" => &[Veal],
                "Kn" => &[Garlic],
                "G" => &[Poultry],
                "W" => &[WildMeat],
                "L" => &[Lamb],
                "F" => &[Fish],
                _ => return None,
            },
            LabelSource::FmiBistro => match code {
                "a" => &[Gluten],
                "b" => &[Shellfish],
                "c" => &[ChickenEggs],
                "d" => &[Fish],
                "e" => &[Peanuts],
                "f" => &[Soy],
                "g" => &[Milk, Lactose],
                "h" => &[ShellFruits],
                "i" => &[Celery],
                "j" => &[Mustard],
                "k" => &[Sesame],
                "l" => &[Sulphurs, Sulfites],
                "m" => &[Lupin],
                "n" => &[Molluscs],
                "1" => &[Dyestuff],
                "2" => &[Preservatives],
                "3" => &[Antioxidants],
                "4" => &[FlavorEnhancer],
                _ => return None,
            },
            LabelSource::IppBistro => match code {
                "Gl" => &[Gluten],
                "Mi" => &[Milk, Lactose],
                "Sf" => &[Mustard],
                "Sl" => &[Celery],
                "Ei" => &[ChickenEggs],
                "Se" => &[Sesame],
                "Fi" => &[Fish],
                "So" => &[Soy],
                "Sw" => &[Sulphurs, Sulfites],
                "2" => &[Preservatives],
                "4" => &[FlavorEnhancer],
                _ => return None,
            },
            LabelSource::MedizinerMensa => match code {
                "1" => &[Dyestuff],
                "2" => &[Preservatives],
                "3" => &[Antioxidants],
                "4" => &[FlavorEnhancer],
                "5" => &[Sulphurs],
                "6" => &[Waxed],
                "7" => &[Phosphates],
                "8" => &[Sweeteners],
                "9" => &[Phenylalanine],
                "A" => &[Gluten],
                "B" => &[Shellfish],
                "C" => &[ChickenEggs],
                "E" => &[Fish],
                "F" => &[Peanuts],
                "G" => &[Soy],
                "H" => &[Milk, Lactose],
                "K" => &[ShellFruits],
                "L" => &[Celery],
                "M" => &[Mustard],
                "N" => &[Sesame],
                "O" => &[Sulphurs, Sulfites],
                "P" => &[Lupin],
                "R" => &[Molluscs],
                "S" => &[Pork],
                "T" => &[Beef],
                "U" => &[Poultry],
                "V" => &[Veal],
                "W" => &[WildMeat],
                "X" => &[Lamb],
                "Y" => &[Alcohol],
                "Z" => &[Garlic],
                _ => return None,
            },
        };
        Some(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hazelnut_implies_shell_fruits() {
        let mut labels = LabelSource::Studentenwerk.resolve("ScH");
        assert!(labels.contains(&Label::Hazelnuts));
        Label::add_supertypes(&mut labels);
        assert!(labels.contains(&Label::ShellFruits));
    }

    #[test]
    fn test_vegan_implies_vegetarian() {
        let mut labels = BTreeSet::from([Label::Vegan]);
        Label::add_supertypes(&mut labels);
        assert!(labels.contains(&Label::Vegetarian));
    }

    #[test]
    fn test_barley_implies_cereal() {
        let mut labels = LabelSource::Studentenwerk.resolve("GlG");
        Label::add_supertypes(&mut labels);
        assert!(labels.contains(&Label::Cereal));
    }

    #[test]
    fn test_pork_implies_meat() {
        let mut labels = LabelSource::Studentenwerk.resolve("S");
        Label::add_supertypes(&mut labels);
        assert_eq!(labels, BTreeSet::from([Label::Pork, Label::Meat]));
    }

    #[test]
    fn test_unknown_codes_are_ignored() {
        let labels = LabelSource::Studentenwerk.resolve("Gl,XXX,Ei");
        assert_eq!(labels, BTreeSet::from([Label::Gluten, Label::ChickenEggs]));
    }

    #[test]
    fn test_codes_collide_across_sources() {
        // "S" is pork at the Studentenwerk but the same letter means
        // nothing at the FMI Bistro.
        assert!(LabelSource::Studentenwerk.resolve("S").contains(&Label::Pork));
        assert!(LabelSource::FmiBistro.resolve("S").is_empty());
        // "f" is soy in the FMI letter alphabet.
        assert!(LabelSource::FmiBistro.resolve("f").contains(&Label::Soy));
    }

    #[test]
    fn test_ipp_house_code_set() {
        let labels = LabelSource::IppBistro.resolve("Mi,Gl,Sf,Sl,Ei,Se,4");
        for expected in [
            Label::Milk,
            Label::Lactose,
            Label::Gluten,
            Label::Mustard,
            Label::Celery,
            Label::ChickenEggs,
            Label::Sesame,
            Label::FlavorEnhancer,
        ] {
            assert!(labels.contains(&expected), "missing {expected:?}");
        }
    }

    #[test]
    fn test_label_text_and_abbreviation() {
        assert_eq!(Label::Fish.text(Language::De), "Fisch");
        assert_eq!(Label::Fish.text(Language::En), "fish");
        assert_eq!(Label::Mustard.abbreviation(), "Sf");
        assert_eq!(Label::ChickenEggs.name(), "CHICKEN_EGGS");
    }
}
