use std::path::PathBuf;

use thiserror::Error;

/// Convenient result alias for the tunnelnav library.
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`], used by transports to pick a
/// response class without matching on messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad coordinates or an empty target. No external calls were made.
    InvalidInput,
    /// The target building name is unknown to the graph store.
    TargetNotFound,
    /// Candidate resolution, node selection or indoor pathfinding came up empty.
    NoPathFound,
    /// A collaborator failed on a call whose leg is not optional.
    ExternalProviderUnavailable,
    /// Anything else (I/O, malformed campus data).
    Internal,
}

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when request validation fails before any routing work.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// Raised when a building name could not be found in the campus graph.
    #[error("unknown building name: {name}{}", format_suggestions(.suggestions))]
    UnknownBuilding {
        name: String,
        suggestions: Vec<String>,
    },

    /// Raised when candidate resolution produced no indoor nodes.
    #[error("no indoor candidate nodes found for {target}")]
    NoCandidates { target: String },

    /// Raised when the start-node ranking cannot find the destination among its candidates.
    #[error("target building {name} is not part of the candidate node list")]
    TargetNotInCandidates { name: String },

    /// Raised when no indoor path exists between two buildings.
    #[error("no route found between {start} and {goal}")]
    RouteNotFound { start: String, goal: String },

    /// Raised when a building exists but carries no usable coordinates.
    #[error("building {name} has no latitude/longitude")]
    MissingCoordinates { name: String },

    /// Raised by collaborators (directions provider, visit counter) that could not serve a call.
    #[error("external provider unavailable: {message}")]
    ProviderUnavailable { message: String },

    /// Raised when a campus file is neither a SQLite database nor a JSON document.
    #[error("unsupported campus format at {path}; expected a SQLite database or JSON document")]
    UnsupportedCampusFormat { path: PathBuf },

    /// Raised when a campus file could not be found.
    #[error("campus data not found at {path}")]
    CampusNotFound { path: PathBuf },

    /// Wrapper for SQLite errors.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for HTTP client errors.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Wrapper for JSON decoding errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Map the error onto the routing failure taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidInput { .. } => ErrorKind::InvalidInput,
            Error::UnknownBuilding { .. } => ErrorKind::TargetNotFound,
            Error::NoCandidates { .. }
            | Error::TargetNotInCandidates { .. }
            | Error::RouteNotFound { .. }
            | Error::MissingCoordinates { .. } => ErrorKind::NoPathFound,
            Error::ProviderUnavailable { .. } | Error::Http(_) => {
                ErrorKind::ExternalProviderUnavailable
            }
            Error::UnsupportedCampusFormat { .. }
            | Error::CampusNotFound { .. }
            | Error::Sqlite(_)
            | Error::Io(_)
            | Error::Json(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Error::InvalidInput {
            message: message.into(),
        }
    }
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else if suggestions.len() == 1 {
        format!(". Did you mean '{}'?", suggestions[0])
    } else {
        format!(
            ". Did you mean one of: {}?",
            suggestions
                .iter()
                .map(|s| format!("'{}'", s))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}
