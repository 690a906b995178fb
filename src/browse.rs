//! `browse` command: filter, search and page through a record file.

use anyhow::{Context, Result};
use log::info;

use crate::{
    classify::classify_within,
    cli::BrowseArgs,
    config::EngineConfig,
    io_utils, load_input,
    normalize::{OrderingPolicy, derive_columns},
    paginate::BrowseState,
    table,
};

pub fn execute(args: &BrowseArgs, config: &EngineConfig) -> Result<()> {
    let page_size = config.page_size()?;
    let mut records = load_input(&args.input)?;
    let spec = args.filter.to_spec();
    if args.print_query {
        println!("{}", spec.to_query_string());
    }
    if args.classify {
        let loaded = records.len();
        records = classify_within(&records, &spec, &config.fields)
            .context("Classifying donors")?;
        info!(
            "Classified {} of {} record(s) passing the other criteria",
            records.len(),
            loaded
        );
    }

    let state = BrowseState::new()
        .with_filter(spec)
        .with_search(args.search.as_str())
        .with_page(args.page);
    let view = state
        .view(&records, &config.fields, page_size)
        .context("Applying filter")?;
    let columns = derive_columns(&view.matched, &OrderingPolicy::from_fields(&config.fields));

    if let Some(output) = &args.output {
        let encoding = io_utils::resolve_encoding(args.output_encoding.as_deref())?;
        let csv_text = io_utils::records_to_csv(&columns, &view.matched, b',')?;
        io_utils::write_export(Some(output.as_path()), &csv_text, encoding)?;
        info!(
            "Exported {} matching record(s) to {:?}",
            view.matched.len(),
            output
        );
        return Ok(());
    }

    if view.page.total == 0 {
        println!("No records match the current filter.");
    } else {
        print!("{}", table::render_records(&columns, &view.page.items));
        println!(
            "Page {} of {} ({} matching record(s)); pages: {}",
            view.page.page,
            view.page.page_count,
            view.page.total,
            view.page
                .visible_pages
                .iter()
                .map(|n| {
                    if *n == view.page.page {
                        format!("[{n}]")
                    } else {
                        n.to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(" ")
        );
    }
    info!(
        "Matched {} of {} record(s); showing page {}",
        view.matched.len(),
        records.len(),
        view.state.page
    );
    Ok(())
}
