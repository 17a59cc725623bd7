use chrono::{Duration, NaiveDate};

const MONTH_NAMES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sep", "oct", "nov", "dic",
];

/// Spanish month name, `None` outside 1..=12.
pub fn month_name(month: u32) -> Option<&'static str> {
    month
        .checked_sub(1)
        .and_then(|idx| MONTH_NAMES.get(idx as usize))
        .copied()
}

/// Three-letter Spanish month abbreviation, `None` outside 1..=12.
pub fn month_abbreviation(month: u32) -> Option<&'static str> {
    month
        .checked_sub(1)
        .and_then(|idx| MONTH_ABBREVIATIONS.get(idx as usize))
        .copied()
}

pub fn first_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Last calendar day of the month, leap years included.
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let next_month_start = if month == 12 {
        NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month.checked_add(1)?, 1)?
    };
    // Rejects month 0 and months above 12.
    first_day_of_month(year, month)?;
    Some(next_month_start - Duration::days(1))
}

pub fn format_iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn format_day_month_year(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// `sep-24` style header for a whole month.
pub fn month_header(year: i32, month: u32) -> Option<String> {
    let abbr = month_abbreviation(month)?;
    Some(format!("{abbr}-{:02}", year.rem_euclid(100)))
}

/// `01/10-15/10/25` style header for an explicit range.
pub fn range_header(start: NaiveDate, end: NaiveDate) -> String {
    format!("{}-{}", start.format("%d/%m"), end.format("%d/%m/%y"))
}
