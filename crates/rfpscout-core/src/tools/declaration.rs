//! Function declarations handed to the model

use super::{FacetField, SEARCH_TOOL, STATISTICS_TOOL};
use crate::llm::{FunctionDeclaration, Schema, Tool};
use crate::schema::SchemaInfo;

const DATE_RANGE_OPTIONS: &str = "'today', 'yesterday', 'past_week', 'past_month', 'past_3_months', \
     or custom range like 'YYYY-MM-DD_to_YYYY-MM-DD'";

/// Declare the search and statistics tools, naming the index's date fields
pub fn build_tool_declaration(schema: &SchemaInfo) -> Tool {
    Tool {
        function_declarations: vec![search_declaration(schema), statistics_declaration()],
    }
}

fn search_declaration(schema: &SchemaInfo) -> FunctionDeclaration {
    let filter_description = format!(
        "Optional Algolia filter string for refined search. \
         Available date fields: {}. \
         IMPORTANT DATE FIELD MEANINGS:\n\
         - 'created': When the RFP was SCRAPED/ADDED to our database (use this for 'scraped on' questions)\n\
         - 'publishDate': When the RFP was originally published on the source website\n\
         - 'closingDate': Submission deadline for the RFP\n\
         - 'updated': When the record was last modified\n\n\
         Date filter examples: 'created>=1728518400000 AND created<=1728604799000' for RFPs scraped in a date range. \
         Location example: 'location:California'. Category example: 'categories:\"IT Services\"'. \
         IMPORTANT: All dates must be Unix timestamps in milliseconds (not seconds).",
        schema.date_fields.join(", ")
    );

    FunctionDeclaration {
        name: SEARCH_TOOL.to_string(),
        description: "Search the RFP (Request for Proposal) and solicitations database. \
             Use this tool to find government contracts, RFPs, bids, and procurement opportunities. \
             You can search by keywords, filter by date ranges, locations, or categories. \
             The database contains information about IT services, managed services, consulting, \
             and other government contracts."
            .to_string(),
        parameters: Schema::object()
            .property(
                "query",
                Schema::string(
                    "The search keywords or terms. For company/product names (Infor, Microsoft, \
                     Oracle, SAP, etc.), use the EXACT name only. For general topics, use \
                     descriptive terms (e.g., 'IT managed services', 'consulting', 'cloud migration')",
                ),
            )
            .property("filters", Schema::string(filter_description))
            .property(
                "date_range",
                Schema::string(format!(
                    "Simplified date filtering for when RFPs were scraped. Options: {}. \
                     Use this instead of manually constructing date filters.",
                    DATE_RANGE_OPTIONS
                )),
            )
            .property(
                "hits_per_page",
                Schema::integer(
                    "Number of results to return (default: 5, max: 50). For statistical counts, \
                     you only need 1 result since total_matching_rfps is returned.",
                ),
            )
            .require("query"),
    }
}

fn statistics_declaration() -> FunctionDeclaration {
    let facets = FacetField::ALL
        .iter()
        .map(|f| format!("- '{}': {}", f.as_str(), facet_meaning(*f)))
        .collect::<Vec<_>>()
        .join("\n");

    FunctionDeclaration {
        name: STATISTICS_TOOL.to_string(),
        description: "Get statistical analysis and trends from the RFP database using aggregation. \
             Use this for questions about patterns, trends, distributions, and percentages. \
             Examples: 'What % of RFPs are we pursuing?', 'Which states have most RFPs?', \
             'What are the trends?', 'How many RFPs by pursuit status?'"
            .to_string(),
        parameters: Schema::object()
            .property(
                "facet_by",
                Schema::string(format!(
                    "Field to group/aggregate by for statistics. Options:\n{}\n\
                     Use cnStatus for pursuit trends and patterns.",
                    facets
                )),
            )
            .property(
                "filters",
                Schema::string(
                    "Optional filters to narrow statistics (same format as search_rfp_database filters)",
                ),
            )
            .property(
                "date_range",
                Schema::string(format!(
                    "Time period for analysis. Same options as search_rfp_database: {}. \
                     Use for time-based trend analysis.",
                    DATE_RANGE_OPTIONS
                )),
            )
            .require("facet_by"),
    }
}

fn facet_meaning(facet: FacetField) -> &'static str {
    match facet {
        FacetField::CnStatus => {
            "Pursuit status breakdown (pursuing, notPursuing, monitor, researching, submitted)"
        }
        FacetField::CnType => "Solicitation type breakdown (RFP, RFQ, RFI, ...)",
        FacetField::Location => "Geographic distribution by state/region",
        FacetField::Site => "Distribution by RFP source website",
    }
}
