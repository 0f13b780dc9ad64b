//! Timezone name handling for availability queries.

/// Timezone used when the caller does not supply one.
pub const DEFAULT_TIMEZONE: &str = "Asia/Kolkata";

/// Legacy IANA link names and the canonical zone they point to.
const LEGACY_ALIASES: &[(&str, &str)] = &[
    ("Asia/Calcutta", "Asia/Kolkata"),
    ("Asia/Katmandu", "Asia/Kathmandu"),
    ("Asia/Rangoon", "Asia/Yangon"),
    ("Asia/Saigon", "Asia/Ho_Chi_Minh"),
    ("Europe/Kiev", "Europe/Kyiv"),
    ("America/Buenos_Aires", "America/Argentina/Buenos_Aires"),
    ("Pacific/Truk", "Pacific/Chuuk"),
];

/// Returns the canonical IANA name for `name`.
///
/// Blank input yields `default`; legacy aliases are rewritten; anything
/// else is passed through trimmed and left for the provider to judge.
pub fn canonical_timezone(name: Option<&str>, default: &str) -> String {
    let name = match name.map(str::trim) {
        Some(n) if !n.is_empty() => n,
        _ => default,
    };

    LEGACY_ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
        .map(|(_, canonical)| (*canonical).to_string())
        .unwrap_or_else(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_or_blank_uses_default() {
        assert_eq!(canonical_timezone(None, DEFAULT_TIMEZONE), "Asia/Kolkata");
        assert_eq!(canonical_timezone(Some("  "), "UTC"), "UTC");
    }

    #[test]
    fn legacy_alias_is_rewritten() {
        assert_eq!(
            canonical_timezone(Some("Asia/Calcutta"), DEFAULT_TIMEZONE),
            "Asia/Kolkata"
        );
        assert_eq!(canonical_timezone(Some("europe/kiev"), "UTC"), "Europe/Kyiv");
    }

    #[test]
    fn legacy_default_is_rewritten_too() {
        assert_eq!(canonical_timezone(None, "Asia/Calcutta"), "Asia/Kolkata");
    }

    #[test]
    fn other_names_pass_through() {
        assert_eq!(
            canonical_timezone(Some(" America/New_York "), DEFAULT_TIMEZONE),
            "America/New_York"
        );
    }
}
