//! Route command handler for composing a walk to a campus building.

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::ValueEnum;
use tracing::info;

use tunnelnav_lib::{
    Campus, DirectionsProvider, Error as RouteError, MapboxDirections, RouteComposer,
    RouteRequest, RouteSummary, RoutingConfig, RoutingPreference, StraightLineDirections,
    ThrottledVisitCounter,
};

use tunnelnav_cli::output::{render_route, OutputFormat};
use tunnelnav_cli::terminal::ColorPalette;

/// Routing preference as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PreferenceArg {
    Indoor,
    Balanced,
    Fastest,
}

impl From<PreferenceArg> for RoutingPreference {
    fn from(value: PreferenceArg) -> Self {
        match value {
            PreferenceArg::Indoor => RoutingPreference::Indoor,
            PreferenceArg::Balanced => RoutingPreference::Balanced,
            PreferenceArg::Fastest => RoutingPreference::Fastest,
        }
    }
}

/// Where outdoor walking directions come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DirectionsSource {
    /// Mapbox walking profile; requires `MAPBOX_API_KEY`.
    Mapbox,
    /// Offline straight-line estimate.
    StraightLine,
    /// Mapbox when a token is configured, straight-line otherwise.
    #[default]
    Auto,
}

/// Arguments for the route command.
#[derive(Debug, Clone)]
pub struct RouteCommandArgs {
    /// Destination building name.
    pub to: String,
    pub latitude: f64,
    pub longitude: f64,
    pub preference: Option<PreferenceArg>,
    pub directions: DirectionsSource,
}

impl RouteCommandArgs {
    pub fn to_request(&self) -> RouteRequest {
        let request = RouteRequest::new(self.to.clone(), self.latitude, self.longitude);
        match self.preference {
            Some(preference) => request.with_preference(preference.into()),
            None => request,
        }
    }
}

/// Handle the route subcommand.
pub fn handle_route_command(
    campus: Campus,
    args: &RouteCommandArgs,
    format: OutputFormat,
    palette: ColorPalette,
) -> Result<()> {
    let config = RoutingConfig::from_env();
    let directions = build_directions(args.directions, &config)?;
    let composer = RouteComposer::new(Arc::new(campus), directions)
        .with_visit_counter(Arc::new(ThrottledVisitCounter::default()))
        .with_config(config);

    let request = args.to_request();
    let route = composer
        .compose(&request)
        .map_err(handle_route_failure)?;

    let summary = RouteSummary::new(request.target_building_name.clone(), route);
    let rendered =
        render_route(&summary, format, palette).context("failed to serialize route summary")?;
    print!("{rendered}");
    Ok(())
}

fn build_directions(
    source: DirectionsSource,
    config: &RoutingConfig,
) -> Result<Arc<dyn DirectionsProvider>> {
    let straight_line = StraightLineDirections {
        walking_speed: config.indoor_walking_speed,
    };

    match source {
        DirectionsSource::StraightLine => Ok(Arc::new(straight_line)),
        DirectionsSource::Mapbox => {
            let client = MapboxDirections::from_env()
                .context("failed to build the Mapbox directions client")?
                .ok_or_else(|| {
                    anyhow!("--directions mapbox requires the MAPBOX_API_KEY environment variable")
                })?;
            Ok(Arc::new(client))
        }
        DirectionsSource::Auto => {
            match MapboxDirections::from_env()
                .context("failed to build the Mapbox directions client")?
            {
                Some(client) => Ok(Arc::new(client)),
                None => {
                    info!("MAPBOX_API_KEY not set; using straight-line outdoor directions");
                    Ok(Arc::new(straight_line))
                }
            }
        }
    }
}

fn handle_route_failure(err: RouteError) -> anyhow::Error {
    match err {
        RouteError::UnknownBuilding { name, suggestions } => {
            anyhow!(format_unknown_building_message(&name, &suggestions))
        }
        RouteError::RouteNotFound { start, goal } => {
            anyhow!(format_route_not_found_message(&start, &goal))
        }
        other => anyhow::Error::new(other),
    }
}

fn format_route_not_found_message(start: &str, goal: &str) -> String {
    format!("No indoor route connects '{}' and '{}'.", start, goal)
}

fn format_unknown_building_message(name: &str, suggestions: &[String]) -> String {
    let mut message = format!("Unknown building '{}'.", name);
    match suggestions {
        [] => {}
        [only] => message.push_str(&format!(" Did you mean '{only}'?")),
        many => {
            let joined = many
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ");
            message.push_str(&format!(" Did you mean one of: {}?", joined));
        }
    }
    message
}
