mod common;

use common::{column_values, donation_records, fields, records};
use donor_ledger::{
    data::Value,
    filter::{FilterError, FilterSpec, apply},
    record::Record,
};
use proptest::prelude::*;

fn names(spec: &FilterSpec, search: &str) -> Vec<String> {
    let records = donation_records();
    let matched = apply(&records, spec, search, &fields()).expect("filter applies");
    matched
        .iter()
        .map(|record| {
            fields()
                .full_name(record)
                .or_else(|| fields().sender(record))
                .unwrap_or_default()
        })
        .collect()
}

#[test]
fn year_ignores_unparsable_dates() {
    let spec = FilterSpec {
        year: Some(2023),
        ..FilterSpec::default()
    };
    assert_eq!(
        names(&spec, ""),
        ["Иванов Иван БИН: 123456789012", "Иванов Иван", "Петрова Анна"]
    );
}

#[test]
fn month_matches_derived_label_case_insensitively() {
    let spec = FilterSpec {
        month: Some("март".to_string()),
        ..FilterSpec::default()
    };
    assert_eq!(names(&spec, ""), ["Иванов Иван", "Петрова Анна"]);
}

#[test]
fn explicit_month_column_wins_over_date_and_ignores_case() {
    let records = records(
        r#"[
            {"ФИО": "А", "Месяц": "МАРТ", "Дата": "15.01.2023"},
            {"ФИО": "Б", "month": "март"},
            {"ФИО": "В", "Дата": "15.01.2023"}
        ]"#,
    );
    let march = FilterSpec {
        month: Some("Март".to_string()),
        ..FilterSpec::default()
    };
    let matched = apply(&records, &march, "", &fields()).unwrap();
    assert_eq!(column_values(&matched, "ФИО"), ["А", "Б"]);

    let january = FilterSpec {
        month: Some("январь".to_string()),
        ..FilterSpec::default()
    };
    let matched = apply(&records, &january, "", &fields()).unwrap();
    assert_eq!(column_values(&matched, "ФИО"), ["В"]);
}

#[test]
fn search_sees_full_precision_amounts() {
    let records = records(r#"[{"ФИО": "А", "Сумма": 12.345}, {"ФИО": "Б", "Сумма": 12.35}]"#);
    let matched = apply(&records, &FilterSpec::default(), "12.345", &fields()).unwrap();
    assert_eq!(column_values(&matched, "ФИО"), ["А"]);
}

#[test]
fn date_range_mixes_formats() {
    let spec = FilterSpec {
        date_from: Some("01.03.2023".to_string()),
        date_to: Some("2023-03-31".to_string()),
        ..FilterSpec::default()
    };
    assert_eq!(names(&spec, ""), ["Иванов Иван", "Петрова Анна"]);
}

#[test]
fn amount_bound_skips_non_numeric_amounts() {
    let spec = FilterSpec {
        amount_from: Some(1000.0),
        ..FilterSpec::default()
    };
    let matched = names(&spec, "");
    assert_eq!(matched.len(), 3);
    assert!(!matched.iter().any(|name| name == "Сидоров"));
    assert!(matched[2].starts_with("ТОО Ромашка"));
}

#[test]
fn inverted_range_matches_nothing() {
    let spec = FilterSpec {
        amount_from: Some(5000.0),
        amount_to: Some(100.0),
        ..FilterSpec::default()
    };
    assert!(names(&spec, "").is_empty());
}

#[test]
fn source_and_language_compare_without_case() {
    let spec = FilterSpec {
        source: Some(" KASPI ".to_string()),
        language: vec!["Русский".to_string()],
        ..FilterSpec::default()
    };
    assert_eq!(
        names(&spec, ""),
        ["Иванов Иван БИН: 123456789012", "Иванов Иван"]
    );

    let english = FilterSpec {
        language: vec!["english".to_string()],
        ..FilterSpec::default()
    };
    assert_eq!(names(&english, ""), ["Сидоров"]);
}

#[test]
fn multi_select_is_or_within_and_across_fields() {
    let spec = FilterSpec {
        gender: vec!["м".to_string(), "ж".to_string()],
        language: vec!["казахский".to_string()],
        ..FilterSpec::default()
    };
    assert_eq!(names(&spec, ""), ["Петрова Анна"]);
}

#[test]
fn search_intersects_with_criteria() {
    assert_eq!(
        names(&FilterSpec::default(), "ромашка"),
        ["ТОО Ромашка\nБИК: KCJBKZKX ИИК: KZ01 БИН: 987654321098"]
    );
    let spec = FilterSpec {
        source: Some("kaspi".to_string()),
        ..FilterSpec::default()
    };
    assert!(names(&spec, "петрова").is_empty());
}

#[test]
fn invalid_end_date_is_an_error() {
    let records = donation_records();
    let spec = FilterSpec {
        date_to: Some("31.02.2023".to_string()),
        ..FilterSpec::default()
    };
    let err = apply(&records, &spec, "", &fields()).unwrap_err();
    assert!(matches!(err, FilterError::InvalidDate { bound: "end", .. }));
}

#[test]
fn type_scenario_keeps_single_and_frequent_in_order() {
    let records = records(
        r#"[
            {"ФИО": "А", "type": "single"},
            {"ФИО": "Б", "type": "periodic"},
            {"ФИО": "В", "type": "frequent"},
            {"ФИО": "Г"}
        ]"#,
    );
    let spec = FilterSpec {
        donor_type: vec!["single".to_string(), "frequent".to_string()],
        ..FilterSpec::default()
    };
    let matched = apply(&records, &spec, "", &fields()).unwrap();
    assert_eq!(column_values(&matched, "ФИО"), ["А", "В"]);
}

#[test]
fn query_pairs_round_trip_through_spec() {
    let spec = FilterSpec {
        year: Some(2023),
        month: Some("Март".to_string()),
        amount_to: Some(2500.5),
        source: Some("Kaspi".to_string()),
        donor_type: vec!["single".to_string(), "periodic".to_string()],
        ..FilterSpec::default()
    };
    let pairs = spec.to_query_pairs();
    assert_eq!(
        spec.to_query_string(),
        "year=2023&month=Март&amount_to=2500.5&source=Kaspi&type=single&type=periodic"
    );
    assert_eq!(FilterSpec::from_query_pairs(pairs).unwrap(), spec);
}

#[test]
fn malformed_query_value_is_rejected() {
    let err = FilterSpec::from_query_pairs([("year", "двадцать")]).unwrap_err();
    assert_eq!(
        err,
        FilterError::InvalidParameter {
            name: "year".to_string(),
            value: "двадцать".to_string()
        }
    );
}

fn amount_record(amount: Option<i64>) -> Record {
    let value = amount.map_or(Value::from("—"), Value::from);
    Record::from_pairs([("Сумма", value)])
}

proptest! {
    #[test]
    fn empty_spec_returns_input_unchanged(
        amounts in prop::collection::vec(prop::option::of(-50i64..50), 0..20)
    ) {
        let records = amounts.into_iter().map(amount_record).collect::<Vec<_>>();
        let matched = apply(&records, &FilterSpec::default(), "", &fields()).unwrap();
        prop_assert_eq!(matched.len(), records.len());
        prop_assert!(matched.iter().zip(&records).all(|(m, r)| std::ptr::eq(*m, r)));
    }

    #[test]
    fn point_amount_range_selects_exact_amounts(
        amounts in prop::collection::vec(prop::option::of(0i64..6), 1..20),
        pick in any::<prop::sample::Index>()
    ) {
        let target = pick.get(&amounts).unwrap_or(3) as f64;
        let records = amounts.iter().copied().map(amount_record).collect::<Vec<_>>();
        let spec = FilterSpec {
            amount_from: Some(target),
            amount_to: Some(target),
            ..FilterSpec::default()
        };
        let matched = apply(&records, &spec, "", &fields()).unwrap();
        let expected = amounts.iter().filter(|a| **a == Some(target as i64)).count();
        prop_assert_eq!(matched.len(), expected);
        prop_assert!(matched.iter().all(|r| fields().amount(r) == Some(target)));
    }
}
