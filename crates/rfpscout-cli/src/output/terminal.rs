//! Terminal output formatter

use rfpscout_core::tools::{SearchEnvelope, StatisticsEnvelope};
use rfpscout_core::{RfpRecord, SchemaInfo};

pub fn format_search(search: &SearchEnvelope) -> String {
    let mut output = format!(
        "{} matching RFPs, showing {}\n",
        search.total_matching_rfps, search.returned_results
    );

    for (i, record) in search.results.iter().enumerate() {
        output.push_str(&format!("\n{:>2}. {}\n", i + 1, record.title));

        let place: Vec<&str> = [record.issuer.as_str(), record.location.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect();
        if !place.is_empty() {
            output.push_str(&format!("    {}\n", place.join(", ")));
        }
        if let Some(closing) = &record.closing_date {
            output.push_str(&format!("    Closes: {}\n", closing));
        }
        if !record.cn_status.is_empty() {
            output.push_str(&format!("    Status: {}\n", record.cn_status));
        }
        if !record.site_url.is_empty() {
            output.push_str(&format!("    {}\n", record.site_url));
        }
    }

    output
}

pub fn format_statistics(stats: &StatisticsEnvelope) -> String {
    let mut output = format!(
        "{} RFPs by {} ({})\n\n",
        stats.total_rfps, stats.facet_field, stats.date_range
    );

    let width = stats
        .breakdown
        .iter()
        .map(|row| row.value.len())
        .max()
        .unwrap_or(0);
    for row in &stats.breakdown {
        output.push_str(&format!(
            "  {:<width$}  {:>6}  {:>6.2}%\n",
            row.value,
            row.count,
            row.percentage,
            width = width
        ));
    }

    output
}

pub fn format_sources(sources: &[RfpRecord]) -> String {
    if sources.is_empty() {
        return String::new();
    }

    let mut output = String::from("\nSources:\n");
    for record in sources {
        if record.site_url.is_empty() {
            output.push_str(&format!("  - {}\n", record.title));
        } else {
            output.push_str(&format!("  - {} <{}>\n", record.title, record.site_url));
        }
    }
    output
}

pub fn format_schema(schema: &SchemaInfo) -> String {
    let source = if schema.is_discovered() {
        "sampled from index"
    } else {
        "default, index not sampled"
    };

    let mut output = format!("Schema ({})\n", source);
    output.push_str(&format!("  Date fields: {}\n", schema.date_fields.join(", ")));
    output.push_str(&format!("  Sample keys: {}\n", schema.sample_keys.join(", ")));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use rfpscout_core::tools::FacetCount;

    #[test]
    fn test_statistics_table_aligns_values() {
        let stats = StatisticsEnvelope {
            success: true,
            total_rfps: 4,
            facet_field: "cnStatus".to_string(),
            date_range: "past_week".to_string(),
            breakdown: vec![
                FacetCount {
                    value: "pursuing".to_string(),
                    count: 3,
                    percentage: 75.0,
                },
                FacetCount {
                    value: "monitor".to_string(),
                    count: 1,
                    percentage: 25.0,
                },
            ],
        };
        let text = format_statistics(&stats);
        assert!(text.starts_with("4 RFPs by cnStatus (past_week)"));
        assert!(text.contains("  pursuing       3   75.00%\n"));
        assert!(text.contains("  monitor        1   25.00%\n"));
    }

    #[test]
    fn test_sources_omit_empty_urls() {
        let summary = RfpRecord::statistics_summary(9, "site");
        assert_eq!(
            format_sources(&[summary]),
            "\nSources:\n  - Statistical Analysis of 9 RFPs\n"
        );
        assert_eq!(format_sources(&[]), "");
    }
}
