//! LaTeX string escaping and small formatting helpers.
//!
//! Every piece of user- or LLM-supplied text that ends up in a rendered
//! document goes through [`escape`] exactly once. The section renderers rely
//! on that single-pass guarantee: re-escaping already-escaped text would
//! corrupt the inserted control sequences.

use chrono::NaiveDate;

/// Placeholder used wherever a date is missing or unparseable.
pub const PRESENT: &str = "Present";

/// Separator between the two ends of a date range.
const RANGE_SEP: &str = " -- ";

/// Escapes LaTeX-significant characters in `text`.
///
/// Backslash takes precedence: it is mapped to `\textbackslash{}` in the same
/// pass as every other character, so escape sequences inserted for `& % $ # _
/// { } ~ ^` are never themselves re-escaped. Square brackets are wrapped in
/// group braces so downstream macros cannot read them as optional-argument
/// delimiters.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '&' => out.push_str("\\&"),
            '%' => out.push_str("\\%"),
            '$' => out.push_str("\\$"),
            '#' => out.push_str("\\#"),
            '_' => out.push_str("\\_"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            '[' => out.push_str("{[}"),
            ']' => out.push_str("{]}"),
            _ => out.push(c),
        }
    }
    out
}

/// Formats a date-like string as abbreviated month + 4-digit year
/// (e.g. `"May 2023"`). Missing or unparseable input yields [`PRESENT`].
///
/// Accepted inputs: `2023-05-01`, `2023-05`, `2023`, `May 2023`, `May 2023`
/// with full month names, and `05/2023`. A bare year renders as the year
/// alone, as there is no month to abbreviate.
pub fn format_date(value: Option<&str>) -> String {
    let raw = match value.map(str::trim) {
        Some(v) if !v.is_empty() => v,
        _ => return PRESENT.to_string(),
    };

    // The placeholder round-trips: "Present" in, "Present" out.
    if raw.eq_ignore_ascii_case(PRESENT) || raw.eq_ignore_ascii_case("current") {
        return PRESENT.to_string();
    }

    if let Some(date) = parse_full_date(raw) {
        return date.format("%b %Y").to_string();
    }

    if let Some((year, month)) = parse_year_month(raw) {
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, 1) {
            return date.format("%b %Y").to_string();
        }
    }

    if let Ok(year) = raw.parse::<i32>() {
        if (1000..=9999).contains(&year) {
            return year.to_string();
        }
    }

    PRESENT.to_string()
}

/// Formats a `start`/`end` pair. Whichever side is absent is simply left out,
/// so a range never ends (or begins) with a dangling separator.
pub fn date_range(start: Option<&str>, end: Option<&str>) -> String {
    let has_start = start.map(str::trim).is_some_and(|s| !s.is_empty());
    let has_end = end.map(str::trim).is_some_and(|s| !s.is_empty());

    match (has_start, has_end) {
        (true, true) => format!("{}{}{}", format_date(start), RANGE_SEP, format_date(end)),
        (true, false) => format_date(start),
        (false, true) => format_date(end),
        (false, false) => String::new(),
    }
}

/// Builds a `\href` construct around escaped display text. With no URL the
/// escaped text stands alone; with no text the URL doubles as the label.
pub fn hyperlink(text: Option<&str>, url: Option<&str>) -> String {
    let text = text.map(str::trim).filter(|t| !t.is_empty());
    let url = url.map(str::trim).filter(|u| !u.is_empty());

    match (text, url) {
        (Some(t), Some(u)) => format!("\\href{{{}}}{{{}}}", sanitize_url(u), escape(t)),
        (Some(t), None) => escape(t),
        (None, Some(u)) => format!("\\href{{{}}}{{{}}}", sanitize_url(u), escape(u)),
        (None, None) => String::new(),
    }
}

/// URLs go into the `\href` argument position, where only a handful of
/// characters are unsafe. Percent-encode those instead of TeX-escaping.
fn sanitize_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for c in url.chars() {
        match c {
            '%' => out.push_str("%25"),
            '#' => out.push_str("%23"),
            '{' => out.push_str("%7B"),
            '}' => out.push_str("%7D"),
            '\\' => out.push_str("%5C"),
            ' ' => out.push_str("%20"),
            _ => out.push(c),
        }
    }
    out
}

fn parse_full_date(raw: &str) -> Option<NaiveDate> {
    const FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%b %d, %Y", "%B %d, %Y"];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

fn parse_year_month(raw: &str) -> Option<(i32, u32)> {
    // "2023-05" / "05/2023"
    if let Some((a, b)) = raw.split_once(['-', '/']) {
        if let (Ok(year), Ok(month)) = (a.trim().parse::<i32>(), b.trim().parse::<u32>()) {
            if (1..=12).contains(&month) {
                return Some((year, month));
            }
        }
        if let (Ok(month), Ok(year)) = (a.trim().parse::<u32>(), b.trim().parse::<i32>()) {
            if (1..=12).contains(&month) && year >= 1000 {
                return Some((year, month));
            }
        }
    }

    // "May 2023" / "September 2023"
    if let Some((name, year)) = raw.rsplit_once(' ') {
        if let Ok(year) = year.trim().parse::<i32>() {
            if let Some(month) = month_from_name(name.trim()) {
                return Some((year, month));
            }
        }
    }

    None
}

fn month_from_name(name: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    ];
    let lower = name.to_lowercase();
    MONTHS
        .iter()
        .position(|m| lower.starts_with(m))
        .map(|i| i as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const METACHARS: [char; 5] = ['&', '%', '$', '#', '_'];

    #[test]
    fn test_escape_neutralizes_all_special_characters() {
        let input = r"100% of A&B's $5 #1 _x_ {y} ~z^ \cmd [opt]";
        let out = escape(input);
        // No bare metacharacter survives: every occurrence is preceded by a
        // backslash we inserted ourselves.
        for c in METACHARS {
            for (i, ch) in out.char_indices() {
                if ch == c {
                    let prev = out[..i].chars().next_back();
                    assert_eq!(prev, Some('\\'), "bare '{c}' at byte {i} in {out:?}");
                }
            }
        }
        assert!(out.contains("\\textbackslash{}"));
        assert!(out.contains("{[}") && out.contains("{]}"));
    }

    #[test]
    fn test_escape_backslash_first_prevents_double_escaping() {
        // The backslash of an input "\&" must not swallow the following '&'.
        assert_eq!(escape(r"\&"), r"\textbackslash{}\&");
    }

    #[test]
    fn test_escape_idempotent_on_plain_text() {
        let plain = "Senior Rust Engineer, Zurich 2023";
        assert_eq!(escape(&escape(plain)), escape(plain));
    }

    #[test]
    fn test_escape_empty_input_yields_empty_output() {
        assert_eq!(escape(""), "");
    }

    #[test]
    fn test_format_date_missing_and_unparseable_yield_present() {
        assert_eq!(format_date(None), "Present");
        assert_eq!(format_date(Some("")), "Present");
        assert_eq!(format_date(Some("not-a-date")), "Present");
        assert_eq!(format_date(Some("13/13")), "Present");
    }

    #[test]
    fn test_format_date_renders_abbreviated_month_and_year() {
        assert_eq!(format_date(Some("2023-05-01")), "May 2023");
        assert_eq!(format_date(Some("2023-05")), "May 2023");
        assert_eq!(format_date(Some("May 2023")), "May 2023");
        assert_eq!(format_date(Some("September 2021")), "Sep 2021");
        assert_eq!(format_date(Some("05/2023")), "May 2023");
    }

    #[test]
    fn test_format_date_bare_year_stays_a_year() {
        assert_eq!(format_date(Some("2019")), "2019");
    }

    #[test]
    fn test_date_range_no_dangling_separator() {
        assert_eq!(date_range(Some("2020-01-01"), None), "Jan 2020");
        assert!(!date_range(Some("2020-01-01"), None).contains("--"));
        assert_eq!(
            date_range(Some("2020-01-01"), Some("2022-06-01")),
            "Jan 2020 -- Jun 2022"
        );
        assert_eq!(date_range(None, Some("2022-06-01")), "Jun 2022");
        assert_eq!(date_range(None, None), "");
    }

    #[test]
    fn test_hyperlink_degrades_to_escaped_text_without_url() {
        assert_eq!(hyperlink(Some("A&B"), None), "A\\&B");
    }

    #[test]
    fn test_hyperlink_wraps_escaped_text() {
        assert_eq!(
            hyperlink(Some("my site"), Some("https://example.com")),
            "\\href{https://example.com}{my site}"
        );
        assert_eq!(hyperlink(None, None), "");
    }

    #[test]
    fn test_hyperlink_percent_encodes_unsafe_url_characters() {
        assert_eq!(
            hyperlink(Some("docs"), Some("https://example.com/a%20b#c")),
            "\\href{https://example.com/a%2520b%23c}{docs}"
        );
    }
}
