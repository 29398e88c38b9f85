use serde::Serialize;

/// Geocoordinates and street address of a canteen site.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Location {
    pub address: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

/// Static canteen catalog. Closed set of immutable reference data; the
/// variant decides which source parser serves the canteen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Canteen {
    MensaArcisstr,
    MensaGarching,
    MensaLeopoldstr,
    MensaLothstr,
    MensaMartinsried,
    MensaPasing,
    MensaWeihenstephan,
    StubistroArcisstr,
    StubistroGoethestr,
    StubistroGrosshadern,
    StubistroRosenheim,
    StubistroSchellingstr,
    StucafeAdalbertstr,
    StucafeGarching,
    FmiBistro,
    IppBistro,
    MedizinerMensa,
}

impl Canteen {
    pub const ALL: [Canteen; 17] = [
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
        Canteen::FmiBistro,
        Canteen::IppBistro,
        Canteen::MedizinerMensa,
    ];

    /// Kebab-case identifier used on the CLI and in output paths.
    pub fn id(&self) -> &'static str {
        match self {
            Canteen::MensaArcisstr => "mensa-arcisstr",
            Canteen::MensaGarching => "mensa-garching",
            Canteen::MensaLeopoldstr => "mensa-leopoldstr",
            Canteen::MensaLothstr => "mensa-lothstr",
            Canteen::MensaMartinsried => "mensa-martinsried",
            Canteen::MensaPasing => "mensa-pasing",
            Canteen::MensaWeihenstephan => "mensa-weihenstephan",
            Canteen::StubistroArcisstr => "stubistro-arcisstr",
            Canteen::StubistroGoethestr => "stubistro-goethestr",
            Canteen::StubistroGrosshadern => "stubistro-grosshadern",
            Canteen::StubistroRosenheim => "stubistro-rosenheim",
            Canteen::StubistroSchellingstr => "stubistro-schellingstr",
            Canteen::StucafeAdalbertstr => "stucafe-adalbertstr",
            Canteen::StucafeGarching => "stucafe-garching",
            Canteen::FmiBistro => "fmi-bistro",
            Canteen::IppBistro => "ipp-bistro",
            Canteen::MedizinerMensa => "mediziner-mensa",
        }
    }

    pub fn long_name(&self) -> &'static str {
        match self {
            Canteen::MensaArcisstr => "Mensa Arcisstraße",
            Canteen::MensaGarching => "Mensa Garching",
            Canteen::MensaLeopoldstr => "Mensa Leopoldstraße",
            Canteen::MensaLothstr => "Mensa Lothstraße",
            Canteen::MensaMartinsried => "Mensa Martinsried",
            Canteen::MensaPasing => "Mensa Pasing",
            Canteen::MensaWeihenstephan => "Mensa Weihenstephan",
            Canteen::StubistroArcisstr => "StuBistro Arcisstraße",
            Canteen::StubistroGoethestr => "StuBistro Goethestraße",
            Canteen::StubistroGrosshadern => "StuBistro Großhadern",
            Canteen::StubistroRosenheim => "StuBistro Rosenheim",
            Canteen::StubistroSchellingstr => "StuBistro Schellingstraße",
            Canteen::StucafeAdalbertstr => "StuCafé Adalbertstraße",
            Canteen::StucafeGarching => "StuCafé in der Mensa Garching",
            Canteen::FmiBistro => "FMI Bistro Garching",
            Canteen::IppBistro => "IPP Bistro Garching",
            Canteen::MedizinerMensa => "Mediziner Mensa",
        }
    }

    pub fn location(&self) -> Location {
        let (address, latitude, longitude) = match self {
            Canteen::MensaArcisstr => ("Arcisstraße 17, München", 48.14742, 11.56722),
            Canteen::MensaGarching => ("Boltzmannstraße 19, Garching", 48.268132, 11.672263),
            Canteen::MensaLeopoldstr => ("Leopoldstraße 13a, München", 48.156311, 11.582446),
            Canteen::MensaLothstr => ("Lothstraße 13d, München", 48.153989, 11.552424),
            Canteen::MensaMartinsried => {
                ("Großhaderner Straße 44, Planegg", 48.109824, 11.460006)
            }
            Canteen::MensaPasing => ("Am Stadtpark 20, München", 48.141568, 11.451119),
            Canteen::MensaWeihenstephan => {
                ("Maximus-von-Imhof-Forum 5, Freising", 48.39959, 11.723147)
            }
            Canteen::StubistroArcisstr => ("Arcisstraße 12, München", 48.156486, 11.581872),
            Canteen::StubistroGoethestr => ("Goethestraße 70, München", 48.131396, 11.558264),
            Canteen::StubistroGrosshadern => {
                ("Butenandtstraße 13, Gebäude F, München", 48.11363, 11.46503)
            }
            Canteen::StubistroRosenheim => {
                ("Hochschulstraße 1, Rosenheim", 47.867344, 12.107559)
            }
            Canteen::StubistroSchellingstr => {
                ("Schellingstraße 3, München", 48.148893, 11.579027)
            }
            Canteen::StucafeAdalbertstr => ("Adalbertstraße 5, München", 48.151507, 11.581033),
            Canteen::StucafeGarching => ("Boltzmannstraße 19, Garching", 48.268268, 11.6717),
            Canteen::FmiBistro => ("Boltzmannstraße 3, Garching", 48.262408, 11.668028),
            Canteen::IppBistro => ("Boltzmannstraße 2, Garching", 48.262371, 11.672702),
            Canteen::MedizinerMensa => ("Ismaninger Straße 22, München", 48.136569, 11.5993226),
        };
        Location {
            address,
            latitude,
            longitude,
        }
    }

    /// Upstream Studentenwerk page id. Canteens served by their own
    /// source (FMI, IPP, Mediziner) have none.
    pub fn url_id(&self) -> Option<u32> {
        match self {
            Canteen::MensaArcisstr => Some(421),
            Canteen::MensaGarching => Some(422),
            Canteen::MensaLeopoldstr => Some(411),
            Canteen::MensaLothstr => Some(431),
            Canteen::MensaMartinsried => Some(412),
            Canteen::MensaPasing => Some(432),
            Canteen::MensaWeihenstephan => Some(423),
            Canteen::StubistroArcisstr => Some(450),
            Canteen::StubistroGoethestr => Some(418),
            Canteen::StubistroGrosshadern => Some(414),
            Canteen::StubistroRosenheim => Some(441),
            Canteen::StubistroSchellingstr => Some(416),
            Canteen::StucafeAdalbertstr => Some(512),
            Canteen::StucafeGarching => Some(524),
            Canteen::FmiBistro | Canteen::IppBistro | Canteen::MedizinerMensa => None,
        }
    }

    pub fn from_id(id: &str) -> Option<Canteen> {
        // historical spelling variant
        if id.eq_ignore_ascii_case("stubistro-großhadern") {
            return Some(Canteen::StubistroGrosshadern);
        }
        Canteen::ALL
            .into_iter()
            .find(|canteen| canteen.id().eq_ignore_ascii_case(id))
    }

    pub fn to_json_obj(&self) -> serde_json::Value {
        serde_json::json!({
            "canteen_id": self.id(),
            "name": self.long_name(),
            "location": self.location(),
            "url_id": self.url_id(),
        })
    }
}

impl std::fmt::Display for Canteen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_id_roundtrip() {
        for canteen in Canteen::ALL {
            assert_eq!(Canteen::from_id(canteen.id()), Some(canteen));
        }
    }

    #[test]
    fn test_from_id_accepts_spelling_variant() {
        assert_eq!(
            Canteen::from_id("stubistro-großhadern"),
            Some(Canteen::StubistroGrosshadern)
        );
    }

    #[test]
    fn test_from_id_unknown() {
        assert_eq!(Canteen::from_id("mensa-atlantis"), None);
    }

    #[test]
    fn test_catalog_json_shape() {
        let json = Canteen::MensaGarching.to_json_obj();
        assert_eq!(json["canteen_id"], "mensa-garching");
        assert_eq!(json["url_id"], 422);
        assert_eq!(json["location"]["latitude"], 48.268132);
        assert_eq!(Canteen::FmiBistro.to_json_obj()["url_id"], serde_json::Value::Null);
    }
}
