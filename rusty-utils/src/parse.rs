/// Parse a compact duration token like `30s`, `10m`, `2h`, `1d`, or plain seconds.
pub fn parse_duration_seconds(raw: &str) -> Option<u64> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    let mut chars = value.chars();
    let unit = chars.next_back();

    let (number_raw, multiplier) = match unit {
        Some('s') | Some('S') => (chars.as_str(), 1_u64),
        Some('m') | Some('M') => (chars.as_str(), 60_u64),
        Some('h') | Some('H') => (chars.as_str(), 60_u64 * 60),
        Some('d') | Some('D') => (chars.as_str(), 60_u64 * 60 * 24),
        Some(last) if last.is_ascii_digit() => (value, 1_u64),
        _ => return None,
    };

    let number = number_raw.trim().parse::<u64>().ok()?;
    if number == 0 {
        return None;
    }

    number.checked_mul(multiplier)
}

/// Parse a boolean flag written as `true`/`false`, `yes`/`no`, `on`/`off` or `1`/`0`.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Parse a one-based page number typed by a user and convert it to a zero-based index.
///
/// Returns `None` when the value is not a number or falls outside `1..=page_count`.
pub fn parse_page_index(raw: &str, page_count: usize) -> Option<usize> {
    let page = raw.trim().parse::<usize>().ok()?;
    (1..=page_count).contains(&page).then(|| page - 1)
}
