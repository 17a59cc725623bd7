use chrono::NaiveDate;
use push_report::{
    DateConfig, DateMode, ErrorKind, parse_date_config, resolve_date_config,
};
use tempfile::tempdir;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn month_mode_ends_on_last_calendar_day() {
    let cases = [
        (2, 2024, 29),
        (2, 2023, 28),
        (4, 2025, 30),
        (9, 2024, 30),
        (12, 2025, 31),
        (1, 2026, 31),
    ];
    for (month, year, last) in cases {
        let text = format!("MES={month}\nAÑO={year}\n");
        let resolved = parse_date_config(&text, "inline").unwrap();
        assert_eq!(resolved.config.start(), d(year, month, 1));
        assert_eq!(resolved.config.end(), d(year, month, last), "{month}/{year}");
        assert_eq!(resolved.config.mode(), DateMode::Month { month, year });
    }
}

#[test]
fn range_mode_round_trips_iso_strings() {
    let text = "FECHA_INICIO=2025-10-01\nFECHA_FIN=2025-10-15\n";
    let resolved = parse_date_config(text, "inline").unwrap();
    assert_eq!(resolved.config.mode(), DateMode::Range);
    assert_eq!(resolved.config.start_iso(), "2025-10-01");
    assert_eq!(resolved.config.end_iso(), "2025-10-15");
    assert_eq!(resolved.config.label(), "01/10/2025 al 15/10/2025");
    assert_eq!(resolved.config.period_header(), "01/10-15/10/25");
}

#[test]
fn range_takes_priority_over_month() {
    let text = "# both modes\nMES=9\nAÑO=2024\nFECHA_INICIO=2025-01-05\nFECHA_FIN=2025-01-06\n";
    let resolved = parse_date_config(text, "inline").unwrap();
    assert_eq!(resolved.config.mode(), DateMode::Range);
    assert_eq!(resolved.config.start(), d(2025, 1, 5));
}

#[test]
fn empty_range_values_fall_back_to_month() {
    let text = "MES=9\nANO=2024\nFECHA_INICIO=\nFECHA_FIN=2025-01-06\n";
    let resolved = parse_date_config(text, "inline").unwrap();
    assert_eq!(resolved.config.label(), "septiembre 2024");
    assert_eq!(resolved.config.period_header(), "sep-24");
}

#[test]
fn missing_both_modes_is_missing_config() {
    let err = parse_date_config("# nothing here\nMES=3\n", "cfg.txt").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingConfig);
}

#[test]
fn invalid_values_map_to_their_kinds() {
    let cases = [
        ("FECHA_INICIO=2025/10/01\nFECHA_FIN=2025-10-15\n", ErrorKind::InvalidDateFormat),
        ("FECHA_INICIO=2025-10-16\nFECHA_FIN=2025-10-15\n", ErrorKind::InvalidRange),
        ("MES=13\nAÑO=2025\n", ErrorKind::InvalidMonth),
        ("MES=0\nAÑO=2025\n", ErrorKind::InvalidMonth),
        ("MES=sep\nAÑO=2025\n", ErrorKind::InvalidMonth),
        ("MES=9\nAÑO=dos mil\n", ErrorKind::InvalidDateFormat),
    ];
    for (text, kind) in cases {
        let err = parse_date_config(text, "inline").unwrap_err();
        assert_eq!(err.kind(), kind, "{text}");
    }
}

#[test]
fn unusual_year_is_only_a_warning() {
    let resolved = parse_date_config("MES=2\nAÑO=2019\n", "inline").unwrap();
    assert_eq!(resolved.config.end(), d(2019, 2, 28));
    assert_eq!(resolved.warnings, vec!["unusual year: 2019".to_string()]);
}

#[test]
fn missing_file_is_synthesized_and_used() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config_fechas.txt");

    let resolved = resolve_date_config(&path).unwrap();
    assert!(resolved.synthesized);
    assert!(path.exists());
    assert_eq!(resolved.config, DateConfig::month(10, 2025).unwrap());

    let reread = resolve_date_config(&path).unwrap();
    assert!(!reread.synthesized);
    assert_eq!(reread.config, resolved.config);
}

#[test]
fn direct_range_constructor_rejects_inverted_bounds() {
    let err = DateConfig::range(d(2025, 2, 1), d(2025, 1, 1)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRange);
}
