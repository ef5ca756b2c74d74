//! Callsign prefix to airline name resolution.
//!
//! The first three characters of an ICAO callsign usually name the operator
//! (`DLH9LF` is Lufthansa). The table is small and fixed; anything it does not
//! know is shown as the raw prefix so the column is never blank.

/// ICAO operator designators with their display names.
pub const AIRLINES: &[(&str, &str)] = &[
    ("DLH", "Lufthansa"),
    ("BAW", "British Airways"),
    ("AFR", "Air France"),
    ("KLM", "KLM"),
    ("AAL", "American Airlines"),
    ("UAL", "United Airlines"),
    ("SWR", "Swiss"),
    ("RYR", "Ryanair"),
    ("EZY", "easyJet"),
    ("WZZ", "Wizz Air"),
    ("SAS", "Scandinavian Airlines"),
    ("TAP", "TAP Air Portugal"),
    ("IBE", "Iberia"),
    ("QTR", "Qatar Airways"),
    ("THY", "Turkish Airlines"),
    ("DLR", "German Aerospace Center"),
];

pub fn lookup(code: &str) -> Option<&'static str> {
    AIRLINES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

/// Resolves the airline for a callsign.
///
/// Returns the mapped name for a known prefix, the uppercased prefix for an
/// unknown one, and `"Unknown"` when there is no callsign at all.
pub fn airline_name(callsign: Option<&str>) -> String {
    let callsign = match callsign.map(str::trim) {
        Some(c) if !c.is_empty() => c,
        _ => return "Unknown".to_string(),
    };

    let code: String = callsign.chars().take(3).collect::<String>().to_uppercase();
    match lookup(&code) {
        Some(name) => name.to_string(),
        None => code,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_prefixes_resolve() {
        assert_eq!(airline_name(Some("DLH9LF")), "Lufthansa");
        assert_eq!(airline_name(Some("BAW123")), "British Airways");
        assert_eq!(airline_name(Some("EZY45MK")), "easyJet");
    }

    #[test]
    fn test_every_table_entry_resolves() {
        for (code, name) in AIRLINES {
            assert_eq!(airline_name(Some(&format!("{}100", code))), *name);
        }
    }

    #[test]
    fn test_prefix_is_case_insensitive() {
        assert_eq!(airline_name(Some("ryr81xk")), "Ryanair");
        assert_eq!(airline_name(Some("Klm1234")), "KLM");
    }

    #[test]
    fn test_unknown_prefix_passes_through_uppercased() {
        assert_eq!(airline_name(Some("xyz42")), "XYZ");
        assert_eq!(airline_name(Some("N12")), "N12");
        assert_eq!(airline_name(Some("ab")), "AB");
    }

    #[test]
    fn test_missing_callsign_is_unknown() {
        assert_eq!(airline_name(None), "Unknown");
        assert_eq!(airline_name(Some("")), "Unknown");
        assert_eq!(airline_name(Some("   ")), "Unknown");
    }
}
