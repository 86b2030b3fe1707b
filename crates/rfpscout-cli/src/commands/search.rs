//! Direct search and statistics commands

use crate::app::{OutputFormat, SearchArgs, StatsArgs};
use crate::output::format_envelope;
use anyhow::Result;
use rfpscout_core::tools::{self, ToolEnvelope};
use rfpscout_core::{AlgoliaClient, Config};

pub async fn run(args: SearchArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let client = AlgoliaClient::new(config.search.clone())?;

    let search = tools::SearchArgs {
        query: args.query.join(" "),
        filters: args.filters,
        hits_per_page: args.limit,
        date_range: args.date_range,
    };
    let envelope = tools::search_rfps(&client, &search).await;

    report(&envelope, format)
}

pub async fn run_stats(args: StatsArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let client = AlgoliaClient::new(config.search.clone())?;

    let stats = tools::StatisticsArgs {
        facet_by: args.facet,
        filters: args.filters,
        date_range: args.date_range,
    };
    let envelope = tools::rfp_statistics(&client, &stats).await;

    report(&envelope, format)
}

fn report(envelope: &ToolEnvelope, format: OutputFormat) -> Result<()> {
    if let ToolEnvelope::Failure(failure) = envelope {
        if format == OutputFormat::Json {
            print!("{}", format_envelope(envelope, format));
        }
        anyhow::bail!("{}", failure.error);
    }

    print!("{}", format_envelope(envelope, format));
    Ok(())
}
