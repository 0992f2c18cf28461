use std::sync::LazyLock;

use regex::bytes::Regex;

/// Maximum number of request bytes read from a connection
pub const REQUEST_BUDGET: usize = 1024;

static SECONDS_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[?&]s=(-?\d+)").unwrap());

static VALUE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[?&]v=(-?\d+)").unwrap());

/// Requested path from the raw request bytes
///
/// Only the request line is looked at. Anything that is not a GET, including
/// an empty request, is treated as a request for `/`.
pub fn request_path(request: &[u8]) -> &[u8] {
    let line = first_line(request);

    if line.starts_with(b"GET ") {
        line.split(|b| *b == b' ').nth(1).unwrap_or_default()
    } else {
        b"/"
    }
}

fn first_line(request: &[u8]) -> &[u8] {
    request
        .windows(2)
        .position(|pair| pair == b"\r\n")
        .map_or(request, |end| &request[..end])
}

/// Numeric `s=` query parameter (watering seconds)
pub fn seconds_param(path: &[u8]) -> Option<i64> {
    number_param(&SECONDS_REGEX, path)
}

/// Numeric `v=` query parameter (threshold value)
pub fn value_param(path: &[u8]) -> Option<i64> {
    number_param(&VALUE_REGEX, path)
}

/// Digit runs too long for `i64` saturate so the caller's clamp still applies
fn number_param(regex: &Regex, path: &[u8]) -> Option<i64> {
    let caps = regex.captures(path)?;
    let digits = std::str::from_utf8(&caps[1]).ok()?;

    match digits.parse::<i64>() {
        Ok(value) => Some(value),
        Err(_) if digits.starts_with('-') => Some(i64::MIN),
        Err(_) => Some(i64::MAX),
    }
}
