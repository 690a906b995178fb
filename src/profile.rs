//! `profile` command: resolve a donor key and summarize that donor's history.

use anyhow::{Context, Result, anyhow, bail};
use log::{info, warn};

use crate::{
    analytics::DonorProfile,
    cli::ProfileArgs,
    config::EngineConfig,
    data::format_number,
    identity::{DonorKey, resolve_key, select_donor_records},
    load_input,
    normalize::{OrderingPolicy, derive_columns},
    record::Record,
    table,
};

pub fn execute(args: &ProfileArgs, config: &EngineConfig) -> Result<()> {
    let records = load_input(&args.input)?;
    let key = key_from_args(args, &records, config)?;
    info!("Building profile for donor '{key}'");

    let selected = select_donor_records(&records, &key, &config.fields);
    if selected.is_empty() {
        warn!("No records found for donor '{key}'");
    }
    let profile = DonorProfile::build(key, selected, &config.fields);

    if args.json {
        let json = serde_json::to_string_pretty(&profile).context("Serializing profile")?;
        println!("{json}");
        return Ok(());
    }
    print_report(&profile, config);
    Ok(())
}

fn key_from_args(args: &ProfileArgs, records: &[Record], config: &EngineConfig) -> Result<DonorKey> {
    if let Some(raw) = &args.key {
        return DonorKey::new(raw).with_context(|| format!("Invalid donor key '{raw}'"));
    }
    let (Some(row), Some(column)) = (args.row, args.column.as_deref()) else {
        bail!("Provide either --key or both --row and --column");
    };
    let record = row
        .checked_sub(1)
        .and_then(|idx| records.get(idx))
        .ok_or_else(|| anyhow!("Row {row} is out of range (1..={})", records.len()))?;
    resolve_key(record, &record.display(column), &config.fields)
        .with_context(|| format!("Row {row}, column '{column}'"))
}

fn print_report(profile: &DonorProfile<'_>, config: &EngineConfig) {
    let stats = &profile.summary.stats;
    println!("Donor: {}", profile.key);
    let headers = vec!["metric".to_string(), "value".to_string()];
    let rows = vec![
        vec!["donations".to_string(), stats.total_count.to_string()],
        vec!["total amount".to_string(), format_number(stats.total_amount)],
        vec!["average amount".to_string(), stats.average_amount.to_string()],
        vec!["first donation".to_string(), stats.first_donation_label()],
        vec!["last donation".to_string(), stats.last_donation_label()],
    ];
    table::print_table(&headers, &rows);

    if !profile.summary.histogram.is_empty() {
        println!();
        println!("Donations by month:");
        print!("{}", table::render_histogram(&profile.summary.histogram));
    }

    if !profile.records.is_empty() {
        let columns =
            derive_columns(&profile.records, &OrderingPolicy::from_fields(&config.fields));
        println!();
        print!("{}", table::render_records(&columns, &profile.records));
    }
}
