//! Place name to airport/region code lookup

/// City names the search form commonly sends, lowercased
const CITY_CODES: &[(&str, &str)] = &[
    // India
    ("mumbai", "BOM"),
    ("delhi", "DEL"),
    ("bangalore", "BLR"),
    ("chennai", "MAA"),
    ("kolkata", "CCU"),
    ("hyderabad", "HYD"),
    ("pune", "PNQ"),
    ("ahmedabad", "AMD"),
    ("kochi", "COK"),
    ("goa", "GOI"),
    // Metro regions
    ("london", "LON"),
    ("paris", "PAR"),
    ("new york", "NYC"),
    ("tokyo", "TYO"),
    ("chicago", "CHI"),
    ("toronto", "YTO"),
    ("rome", "ROM"),
    ("stockholm", "STO"),
    // Everything else
    ("dubai", "DXB"),
    ("singapore", "SIN"),
    ("bangkok", "BKK"),
    ("sydney", "SYD"),
    ("los angeles", "LAX"),
    ("san francisco", "SFO"),
    ("vancouver", "YVR"),
    ("amsterdam", "AMS"),
    ("frankfurt", "FRA"),
    ("madrid", "MAD"),
    ("barcelona", "BCN"),
    ("berlin", "BER"),
    ("munich", "MUC"),
    ("zurich", "ZUR"),
    ("vienna", "VIE"),
    ("brussels", "BRU"),
    ("oslo", "OSL"),
    ("copenhagen", "CPH"),
    ("helsinki", "HEL"),
    ("istanbul", "IST"),
    ("athens", "ATH"),
    ("lisbon", "LIS"),
    ("dublin", "DUB"),
    ("edinburgh", "EDI"),
    ("manchester", "MAN"),
];

/// Map a place name or code to the code sent upstream.
///
/// The city table is consulted before the three-letter rule, so a city whose
/// name is itself three letters resolves to its airport ("Goa" maps to GOI,
/// not GOA). Other three-letter alphabetic input is taken as a code already.
/// Anything else degrades to its first three characters uppercased, which may
/// not be a real code; the upstream then returns poor or no matches for it.
pub fn airport_code(location: &str) -> String {
    let trimmed = location.trim();

    let normalized = trimmed.to_lowercase();
    if let Some((_, code)) = CITY_CODES.iter().find(|(city, _)| *city == normalized) {
        return code.to_string();
    }

    if trimmed.len() == 3 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return trimmed.to_ascii_uppercase();
    }

    trimmed.chars().take(3).collect::<String>().to_uppercase()
}
