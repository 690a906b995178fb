use std::num::NonZeroUsize;

use criterion::{Criterion, criterion_group, criterion_main};
use donor_ledger::{
    classify::annotate_donor_types,
    data::Value,
    fields::FieldMap,
    filter::FilterSpec,
    paginate::BrowseState,
    record::Record,
};

const SOURCES: [&str; 3] = ["Kaspi", "Сайт", "Банк"];
const LANGUAGES: [&str; 2] = ["русский", "казахский"];

fn generate_donations(rows: usize) -> Vec<Record> {
    (0..rows)
        .map(|i| {
            let day = (i % 28) + 1;
            let month = (i % 12) + 1;
            let date = if i % 2 == 0 {
                format!("{day:02}.{month:02}.2023")
            } else {
                format!("2023-{month:02}-{day:02}")
            };
            let mut cells = vec![
                ("ФИО".to_string(), Value::from(format!("Донор {}", i % 997))),
                ("Сумма".to_string(), Value::from(((i % 50) * 100) as f64)),
                ("Дата".to_string(), Value::from(date)),
                ("язык".to_string(), Value::from(LANGUAGES[i % LANGUAGES.len()])),
            ];
            if i % 5 != 0 {
                cells.push(("источник".to_string(), Value::from(SOURCES[i % SOURCES.len()])));
            }
            Record::from_pairs(cells)
        })
        .collect()
}

fn bench_filter_paginate(c: &mut Criterion) {
    let fields = FieldMap::default();
    let records = generate_donations(50_000);
    let page_size = NonZeroUsize::new(10).expect("page size");
    let spec = FilterSpec {
        year: Some(2023),
        amount_from: Some(1000.0),
        amount_to: Some(4000.0),
        source: Some("kaspi".to_string()),
        language: vec!["Русский".to_string()],
        ..FilterSpec::default()
    };

    let mut group = c.benchmark_group("browse");

    group.bench_function("criteria_page_3", |b| {
        let state = BrowseState::new().with_filter(spec.clone()).with_page(3);
        b.iter(|| {
            state
                .view(&records, &fields, page_size)
                .expect("filter applies")
        });
    });

    group.bench_function("search_only", |b| {
        let state = BrowseState::new().with_search("донор 42");
        b.iter(|| {
            state
                .view(&records, &fields, page_size)
                .expect("filter applies")
        });
    });

    group.bench_function("classify", |b| {
        b.iter(|| annotate_donor_types(&records, &fields));
    });

    group.finish();
}

criterion_group!(benches, bench_filter_paginate);
criterion_main!(benches);
