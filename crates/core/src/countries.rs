//! Candidate countries and regions for each whole-hour UTC offset.

pub const UNKNOWN_OFFSET: &str = "Unknown offset";

const OFFSET_COUNTRIES: [(i32, &[&str]); 25] = [
    (-12, &["Baker Island (US)", "Howland Island (US)"]),
    (-11, &["American Samoa", "Niue (NZ)"]),
    (-10, &["Hawaii (US)", "Cook Islands (NZ)"]),
    (-9, &["Alaska (US)"]),
    (-8, &["US Pacific (California, Washington)", "Canada (Pacific)"]),
    (-7, &["US Mountain", "Canada (Mountain)"]),
    (-6, &["US Central", "Mexico (Central)", "Guatemala", "Costa Rica"]),
    (-5, &["US Eastern", "Canada (Eastern)", "Colombia", "Peru"]),
    (-4, &["Atlantic (Canada)", "Bolivia", "Venezuela"]),
    (-3, &["Argentina", "Brazil (East)", "Chile"]),
    (-2, &["Fernando de Noronha (Brazil)"]),
    (-1, &["Azores (Portugal)"]),
    (0, &["UK", "Ireland", "Portugal (mainland)", "Iceland", "Morocco"]),
    (1, &["Central Europe (Germany, France)", "Algeria", "Nigeria"]),
    (
        2,
        &["Eastern Europe (Ukraine, Greece)", "Israel", "Egypt", "South Africa", "Romania"],
    ),
    (3, &["Russia (Moscow)", "Saudi Arabia", "Kenya"]),
    (4, &["United Arab Emirates", "Armenia", "Seychelles"]),
    (5, &["Pakistan", "Uzbekistan", "Maldives"]),
    (6, &["Bangladesh", "Bhutan"]),
    (7, &["Thailand", "Vietnam", "Cambodia"]),
    (8, &["China", "Singapore", "Malaysia", "Western Australia"]),
    (9, &["Japan", "South Korea", "East Timor"]),
    (10, &["Eastern Australia", "Papua New Guinea", "Guam"]),
    (11, &["Solomon Islands", "New Caledonia (France)"]),
    (12, &["Fiji", "New Zealand", "Tuvalu", "Marshall Islands"]),
];

/// Every known candidate for `offset`, in table order.
pub fn countries_for_offset(offset: i32) -> Option<&'static [&'static str]> {
    OFFSET_COUNTRIES
        .iter()
        .find(|(o, _)| *o == offset)
        .map(|(_, countries)| *countries)
}

/// At most `top_n` candidates for `offset`; "Unknown offset" outside the table.
pub fn top_countries(offset: i32, top_n: usize) -> Vec<String> {
    match countries_for_offset(offset) {
        Some(countries) => countries.iter().take(top_n).map(|c| c.to_string()).collect(),
        None => vec![UNKNOWN_OFFSET.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::candidate_offsets;

    #[test]
    fn test_every_candidate_offset_has_countries() {
        for offset in candidate_offsets() {
            let countries = countries_for_offset(offset).unwrap();
            assert!(!countries.is_empty(), "offset {offset}");
        }
    }

    #[test]
    fn test_top_countries_truncates() {
        assert_eq!(top_countries(2, 5).len(), 5);
        assert_eq!(top_countries(2, 2), vec!["Eastern Europe (Ukraine, Greece)", "Israel"]);
    }

    #[test]
    fn test_top_countries_keeps_short_lists_unpadded() {
        assert_eq!(top_countries(-9, 5), vec!["Alaska (US)"]);
    }

    #[test]
    fn test_top_countries_unknown_offset() {
        assert_eq!(top_countries(14, 5), vec![UNKNOWN_OFFSET]);
    }
}
