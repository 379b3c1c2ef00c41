#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Continent {
    Asia,
    SouthAmerica,
    NorthAmerica,
    Europe,
    Oceania,
    Other,
}

impl Continent {
    pub fn as_str(self) -> &'static str {
        match self {
            Continent::Asia => "Asia",
            Continent::SouthAmerica => "South America",
            Continent::NorthAmerica => "North America",
            Continent::Europe => "Europe",
            Continent::Oceania => "Oceania",
            Continent::Other => "Other",
        }
    }
}

/// Country buckets used by the per-continent depth analysis. Mexico sits in
/// the South America bucket in the source data model and is kept there.
const COUNTRY_CONTINENTS: &[(&str, Continent)] = &[
    ("japan", Continent::Asia),
    ("china", Continent::Asia),
    ("india", Continent::Asia),
    ("indonesia", Continent::Asia),
    ("chile", Continent::SouthAmerica),
    ("peru", Continent::SouthAmerica),
    ("mexico", Continent::SouthAmerica),
    ("united states", Continent::NorthAmerica),
    ("canada", Continent::NorthAmerica),
    ("italy", Continent::Europe),
    ("greece", Continent::Europe),
    ("turkey", Continent::Europe),
    ("new zealand", Continent::Oceania),
];

pub fn country_continents() -> &'static [(&'static str, Continent)] {
    COUNTRY_CONTINENTS
}

/// Unlisted and missing countries fall into [`Continent::Other`].
pub fn continent_for(country: Option<&str>) -> Continent {
    let Some(country) = country.map(str::trim) else {
        return Continent::Other;
    };
    COUNTRY_CONTINENTS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(country))
        .map(|(_, continent)| *continent)
        .unwrap_or(Continent::Other)
}
