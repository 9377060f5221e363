//! Monthly commentary lookup
//!
//! Care staff maintain free-text commentary in a spreadsheet-like store,
//! one row per (device serial, agency, month). The store is fetched by a
//! collaborator; this module only performs the matching. Identifiers are
//! hand-typed on both sides, so matching normalizes aggressively: all
//! whitespace (full-width space included) is stripped and text lowercased,
//! and agency identifiers compare on their digits alone. An empty agency
//! cell acts as a wildcard.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One fetched commentary row
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentaryRow {
    /// Month cell as typed, e.g. "2025/10", "2025-10", "2025年10月"
    pub month_cell: String,
    pub serial_id: String,
    pub agency_id: String,
    /// Per-category commentary texts keyed by category name
    pub fields: HashMap<String, String>,
}

/// Commentary field carrying the half-year trend summary, per mode.
pub const ACTIVE_TREND_SUMMARY: &str = "active_trend_summary";
pub const BED_TREND_SUMMARY: &str = "bed_trend_summary";

/// Strip every whitespace character (U+3000 included) and lowercase.
pub fn normalize_identifier(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Keep digits only, so "001-23" and " 00123 " compare equal.
pub fn normalize_digits(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Extract (year, month) from a free-form month cell: the first four-digit
/// run is the year, the next digit run (up to two digits) is the month.
pub fn parse_month_cell(text: &str) -> Option<(i32, u32)> {
    let digits: Vec<(usize, char)> = text
        .char_indices()
        .filter(|(_, c)| c.is_ascii_digit())
        .collect();

    // Find four consecutive digit characters for the year.
    let mut year_end = None;
    for window in digits.windows(4) {
        let contiguous = window
            .windows(2)
            .all(|pair| pair[1].0 == pair[0].0 + pair[0].1.len_utf8());
        if contiguous {
            let year: i32 = window.iter().map(|(_, c)| c).collect::<String>().parse().ok()?;
            year_end = Some((window[3].0 + window[3].1.len_utf8(), year));
            break;
        }
    }
    let (year_end, year) = year_end?;

    let rest = &text[year_end..];
    let month_digits: String = rest
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .take(2)
        .collect();
    if month_digits.is_empty() {
        return None;
    }
    let month: u32 = month_digits.parse().ok()?;
    Some((year, month))
}

/// Find the commentary for (serial, agency, year, month).
///
/// The first matching row wins. Field values are trimmed and empty ones
/// dropped; no match yields an empty map, never an error.
pub fn find_month_commentary(
    rows: &[CommentaryRow],
    serial_id: &str,
    agency_id: &str,
    year: i32,
    month: u32,
) -> HashMap<String, String> {
    let target_serial = normalize_identifier(serial_id);
    let target_agency = normalize_digits(agency_id);

    for row in rows {
        if parse_month_cell(&row.month_cell) != Some((year, month)) {
            continue;
        }
        if normalize_identifier(&row.serial_id) != target_serial {
            continue;
        }
        let row_agency = normalize_digits(&row.agency_id);
        if !row_agency.is_empty() && row_agency != target_agency {
            continue;
        }

        return row
            .fields
            .iter()
            .filter_map(|(key, value)| {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some((key.clone(), trimmed.to_string()))
                }
            })
            .collect();
    }

    HashMap::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(month_cell: &str, serial: &str, agency: &str) -> CommentaryRow {
        let mut fields = HashMap::new();
        fields.insert("active_summary".to_string(), " slept well this month ".to_string());
        fields.insert(ACTIVE_TREND_SUMMARY.to_string(), "steady".to_string());
        fields.insert("bed_summary".to_string(), "".to_string());
        CommentaryRow {
            month_cell: month_cell.to_string(),
            serial_id: serial.to_string(),
            agency_id: agency.to_string(),
            fields,
        }
    }

    #[test]
    fn identifier_normalization_strips_all_whitespace() {
        assert_eq!(normalize_identifier(" AB\u{3000}12 c "), "ab12c");
        assert_eq!(normalize_identifier(""), "");
    }

    #[test]
    fn digit_normalization_keeps_digits_only() {
        assert_eq!(normalize_digits("  001-23 "), "00123");
        assert_eq!(normalize_digits("112"), "112");
        assert_eq!(normalize_digits("n/a"), "");
    }

    #[test]
    fn month_cell_accepts_common_layouts() {
        assert_eq!(parse_month_cell("2025/10"), Some((2025, 10)));
        assert_eq!(parse_month_cell("2025-10"), Some((2025, 10)));
        assert_eq!(parse_month_cell("2025年10月"), Some((2025, 10)));
        assert_eq!(parse_month_cell(" 2025 / 3 "), Some((2025, 3)));
        assert_eq!(parse_month_cell("october"), None);
        assert_eq!(parse_month_cell("2025"), None);
    }

    #[test]
    fn lookup_matches_normalized_serial_and_agency() {
        let rows = vec![row("2025/10", " SN-100 ", " 1 1-2 ")];
        let found = find_month_commentary(&rows, "sn-100", "112", 2025, 10);
        assert_eq!(found.get("active_summary").map(String::as_str), Some("slept well this month"));
        // Empty field values are dropped.
        assert!(!found.contains_key("bed_summary"));
    }

    #[test]
    fn leading_zeros_distinguish_agencies() {
        // "001-12" keeps its zeros as "00112" and is not the agency "112".
        assert_eq!(normalize_digits("001-12"), "00112");
        let rows = vec![row("2025/10", "SN-100", "001-12")];
        assert!(find_month_commentary(&rows, "SN-100", "112", 2025, 10).is_empty());
        assert!(!find_month_commentary(&rows, "SN-100", "00112", 2025, 10).is_empty());
    }

    #[test]
    fn wrong_month_or_serial_finds_nothing() {
        let rows = vec![row("2025/10", "SN-100", "112")];
        assert!(find_month_commentary(&rows, "sn-100", "112", 2025, 9).is_empty());
        assert!(find_month_commentary(&rows, "sn-200", "112", 2025, 10).is_empty());
    }

    #[test]
    fn empty_agency_cell_is_a_wildcard() {
        let rows = vec![row("2025/10", "SN-100", "")];
        let found = find_month_commentary(&rows, "SN-100", "999", 2025, 10);
        assert!(!found.is_empty());
    }

    #[test]
    fn agency_mismatch_rejects_the_row() {
        let rows = vec![row("2025/10", "SN-100", "113")];
        assert!(find_month_commentary(&rows, "SN-100", "112", 2025, 10).is_empty());
    }

    #[test]
    fn first_matching_row_wins() {
        let mut second = row("2025/10", "SN-100", "112");
        second
            .fields
            .insert("active_summary".to_string(), "other text".to_string());
        let rows = vec![row("2025/10", "SN-100", "112"), second];
        let found = find_month_commentary(&rows, "SN-100", "112", 2025, 10);
        assert_eq!(
            found.get("active_summary").map(String::as_str),
            Some("slept well this month")
        );
    }
}
