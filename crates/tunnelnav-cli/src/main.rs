mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use tunnelnav_cli::logging::{init_logging, LoggingConfig};
use tunnelnav_cli::output::OutputFormat;
use tunnelnav_cli::terminal::ColorPalette;
use tunnelnav_lib::DEFAULT_SEARCH_LIMIT;

use commands::route::{DirectionsSource, PreferenceArg, RouteCommandArgs};

#[derive(Parser, Debug)]
#[command(author, version, about = "Campus tunnel and skyway routing")]
struct Cli {
    /// Campus data file (SQLite or JSON). Falls back to TUNNELNAV_DATA_PATH.
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Enhanced, global = true)]
    format: OutputFormat,

    /// Disable ANSI colors.
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose a walking route from a location to a building.
    Route {
        /// Destination building name.
        #[arg(long = "to")]
        to: String,
        /// Current latitude in degrees.
        #[arg(long = "lat", allow_negative_numbers = true)]
        latitude: f64,
        /// Current longitude in degrees.
        #[arg(long = "lon", allow_negative_numbers = true)]
        longitude: f64,
        /// Outdoor versus indoor trade-off for disconnected buildings.
        #[arg(long, value_enum)]
        preference: Option<PreferenceArg>,
        /// Source of outdoor walking directions.
        #[arg(long, value_enum, default_value_t = DirectionsSource::Auto)]
        directions: DirectionsSource,
    },
    /// Find buildings whose name contains a fragment.
    Search {
        query: String,
        /// Maximum number of matches.
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
        limit: usize,
    },
    /// List every building in the campus data.
    Buildings,
}

fn main() -> Result<()> {
    init_logging(&LoggingConfig::from_env());
    let cli = Cli::parse();

    let palette = if cli.no_color {
        ColorPalette::plain()
    } else {
        ColorPalette::detect()
    };
    let data_path = commands::resolve_data_path(cli.data)?;
    let campus = commands::open_campus(&data_path)?;

    match cli.command {
        Command::Route {
            to,
            latitude,
            longitude,
            preference,
            directions,
        } => {
            let args = RouteCommandArgs {
                to,
                latitude,
                longitude,
                preference,
                directions,
            };
            commands::route::handle_route_command(campus, &args, cli.format, palette)
        }
        Command::Search { query, limit } => {
            commands::search::handle_search_command(&campus, &query, limit, cli.format)
        }
        Command::Buildings => commands::buildings::handle_buildings_command(&campus, cli.format),
    }
}
