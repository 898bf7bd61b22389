/// Splits `input` on every occurrence of `delimiter`.
///
/// Empty segments are kept, including a trailing one, so `"a,,"` yields
/// three parts.
pub fn split(input: &str, delimiter: char) -> Vec<String> {
    input.split(delimiter).map(str::to_string).collect()
}

pub fn trim(input: &str) -> String {
    input.trim().to_string()
}

pub fn to_lower(input: &str) -> String {
    input.to_lowercase()
}

/// Source of "today" for default dates.
pub trait Clock {
    /// Today's local date as `YYYY-MM-DD`.
    fn today(&self) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> String {
        today_iso()
    }
}

pub fn today_iso() -> String {
    chrono::Local::now().format("%Y-%m-%d").to_string()
}

/// Expands a leading `~/` to `$HOME`.
pub fn expand_home(path: &str) -> std::path::PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => {
            let home = std::env::var("HOME").unwrap_or_default();
            std::path::PathBuf::from(home).join(rest)
        }
        None => std::path::PathBuf::from(path),
    }
}

#[cfg(test)]
pub(crate) fn is_iso_date(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}
