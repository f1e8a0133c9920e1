// ============================================================================
// Region Normalizer
// ============================================================================
//
// Maps a country name plus free-text state/province to the subdivision code
// the store uses ("California" -> "CA"). Anything that does not resolve is
// passed through untouched: normalization never fails an order.
//
// ============================================================================

pub struct Country {
    pub name: &'static str,
    pub alpha2: &'static str,
    pub alpha3: &'static str,
    pub aliases: &'static [&'static str],
    /// (code, name)
    pub subdivisions: &'static [(&'static str, &'static str)],
}

impl Country {
    fn matches(&self, query: &str) -> bool {
        self.name.eq_ignore_ascii_case(query)
            || self.alpha2.eq_ignore_ascii_case(query)
            || self.alpha3.eq_ignore_ascii_case(query)
            || self.aliases.iter().any(|alias| alias.eq_ignore_ascii_case(query))
    }

    /// Subdivision code for a name or an already-canonical code
    pub fn subdivision_code(&self, state: &str) -> Option<&'static str> {
        let query = state.trim();
        self.subdivisions
            .iter()
            .find(|(code, name)| name.eq_ignore_ascii_case(query) || code.eq_ignore_ascii_case(query))
            .map(|(code, _)| *code)
    }
}

pub fn find_country(name: &str) -> Option<&'static Country> {
    let query = name.trim();
    if query.is_empty() {
        return None;
    }
    COUNTRIES.iter().find(|country| country.matches(query))
}

/// Canonical subdivision code, or the original state text when the country
/// or the subdivision is unknown.
pub fn state_code(country: &str, state: &str) -> String {
    match find_country(country).and_then(|c| c.subdivision_code(state)) {
        Some(code) => code.to_string(),
        None => {
            tracing::debug!(country = %country, state = %state, "No canonical region, passing state through");
            state.to_string()
        }
    }
}

static COUNTRIES: &[Country] = &[
    Country {
        name: "United States",
        alpha2: "US",
        alpha3: "USA",
        aliases: &["United States of America", "U.S.", "U.S.A."],
        subdivisions: US_STATES,
    },
    Country {
        name: "Canada",
        alpha2: "CA",
        alpha3: "CAN",
        aliases: &[],
        subdivisions: CA_PROVINCES,
    },
    Country {
        name: "Australia",
        alpha2: "AU",
        alpha3: "AUS",
        aliases: &[],
        subdivisions: AU_STATES,
    },
];

static US_STATES: &[(&str, &str)] = &[
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("DC", "District of Columbia"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
    ("AS", "American Samoa"),
    ("GU", "Guam"),
    ("MP", "Northern Mariana Islands"),
    ("PR", "Puerto Rico"),
    ("VI", "Virgin Islands"),
    ("UM", "United States Minor Outlying Islands"),
    ("AA", "Armed Forces Americas"),
    ("AE", "Armed Forces Europe"),
    ("AP", "Armed Forces Pacific"),
];

static CA_PROVINCES: &[(&str, &str)] = &[
    ("AB", "Alberta"),
    ("BC", "British Columbia"),
    ("MB", "Manitoba"),
    ("NB", "New Brunswick"),
    ("NL", "Newfoundland and Labrador"),
    ("NS", "Nova Scotia"),
    ("NT", "Northwest Territories"),
    ("NU", "Nunavut"),
    ("ON", "Ontario"),
    ("PE", "Prince Edward Island"),
    ("QC", "Quebec"),
    ("SK", "Saskatchewan"),
    ("YT", "Yukon"),
];

static AU_STATES: &[(&str, &str)] = &[
    ("ACT", "Australian Capital Territory"),
    ("NSW", "New South Wales"),
    ("NT", "Northern Territory"),
    ("QLD", "Queensland"),
    ("SA", "South Australia"),
    ("TAS", "Tasmania"),
    ("VIC", "Victoria"),
    ("WA", "Western Australia"),
];
