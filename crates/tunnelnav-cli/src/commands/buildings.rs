//! Building listing.

use anyhow::Result;
use tracing::debug;

use tunnelnav_lib::Campus;

use tunnelnav_cli::output::{render_names, OutputFormat};

pub fn handle_buildings_command(campus: &Campus, format: OutputFormat) -> Result<()> {
    let names = campus.building_names();
    debug!(
        buildings = names.len(),
        nodes = campus.node_count(),
        corridors = campus.graph().edge_count(),
        "listing buildings"
    );
    print!("{}", render_names(&names, format)?);
    Ok(())
}
