use chrono::NaiveDate;

pub const DATE_PATTERN: &str = "%d.%m.%Y";
pub const CLI_DATE_FORMAT: &str = "dd.mm.yyyy";

/// Parses a German-style date ("13.09.2021").
pub fn parse_date(date_str: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(date_str.trim(), DATE_PATTERN)
}

/// Makes repeated names unique by appending " (2)", " (3)", … in order
/// of appearance. Guards against two dishes sharing a display name but
/// carrying different attributes.
pub fn make_duplicates_unique(names: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(names.len());
    names
        .into_iter()
        .map(|name| {
            let count = seen.iter().filter(|previous| **previous == name).count();
            seen.push(name.clone());
            if count > 0 {
                format!("{} ({})", name, count + 1)
            } else {
                name
            }
        })
        .collect()
}

/// Collapses every whitespace run into a single space and trims.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Slice by character index; the fixed-width column math counts
/// characters, not bytes. Out-of-range indices clamp to the end.
pub fn char_slice(text: &str, start: usize, end: usize) -> String {
    if end <= start {
        return String::new();
    }
    text.chars().skip(start).take(end - start).collect()
}

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Slice by byte offsets that may not sit on char boundaries (regex
/// match positions shifted by a fixed correction). Both ends are moved
/// down to the nearest boundary.
pub fn byte_slice_lossy(text: &str, start: usize, end: usize) -> &str {
    let mut start = start.min(text.len());
    let mut end = end.min(text.len());
    while !text.is_char_boundary(start) {
        start -= 1;
    }
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    if end <= start {
        ""
    } else {
        &text[start..end]
    }
}
