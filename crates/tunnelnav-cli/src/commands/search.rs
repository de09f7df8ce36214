//! Building search by name fragment.

use anyhow::{Context, Result};
use serde::Serialize;

use tunnelnav_lib::Campus;

use tunnelnav_cli::output::{render_names, OutputFormat};

#[derive(Debug, Serialize)]
struct SearchResults<'a> {
    query: &'a str,
    matches: &'a [String],
}

pub fn handle_search_command(
    campus: &Campus,
    query: &str,
    limit: usize,
    format: OutputFormat,
) -> Result<()> {
    let matches = campus.search_buildings(query, limit);

    if format == OutputFormat::Json {
        let results = SearchResults {
            query,
            matches: &matches,
        };
        let json =
            serde_json::to_string_pretty(&results).context("failed to serialize search results")?;
        println!("{json}");
        return Ok(());
    }

    if matches.is_empty() {
        let suggestions = campus.fuzzy_building_matches(query, limit);
        if suggestions.is_empty() {
            println!("No buildings match '{query}'.");
        } else {
            println!("No buildings match '{query}'. Did you mean:");
            print!("{}", render_names(&suggestions, format)?);
        }
        return Ok(());
    }

    print!("{}", render_names(&matches, format)?);
    Ok(())
}
