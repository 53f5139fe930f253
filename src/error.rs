//! Error taxonomy for the catalog core. Callers need to tell a broken store
//! apart from a missing dataset or a failed read, so each failure class gets
//! its own variant instead of a flattened string.

use thiserror::Error;

/// Boxed source error for failures that can come from several libraries
/// (filesystem, HTTP, JSON).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used throughout the persistence layer.
pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// The embedded store could not be opened or its schema created.
    #[error("could not initialize song store ({context})")]
    Initialization {
        context: String,
        #[source]
        source: BoxError,
    },
    /// The bundled dataset was unreachable or malformed.
    #[error("could not load bundled dataset from {origin}")]
    Fetch {
        origin: String,
        #[source]
        source: BoxError,
    },
    /// An insert or commit during seeding failed; the batch was rolled back.
    #[error("hydration failed ({context})")]
    Hydration {
        context: String,
        #[source]
        source: rusqlite::Error,
    },
    /// A read against an open store failed.
    #[error("song query failed ({context})")]
    Query {
        context: String,
        #[source]
        source: rusqlite::Error,
    },
}

impl CatalogError {
    pub(crate) fn initialization(context: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Initialization {
            context: context.into(),
            source: source.into(),
        }
    }

    pub(crate) fn fetch(origin: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Fetch {
            origin: origin.into(),
            source: source.into(),
        }
    }

    pub(crate) fn hydration(context: impl Into<String>, source: rusqlite::Error) -> Self {
        Self::Hydration {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn query(context: impl Into<String>, source: rusqlite::Error) -> Self {
        Self::Query {
            context: context.into(),
            source,
        }
    }

    /// True for failures that abort the session before any song can be shown.
    /// The bootstrap uses this to decide whether to print the retry hint.
    pub fn is_startup_failure(&self) -> bool {
        matches!(
            self,
            Self::Initialization { .. } | Self::Fetch { .. } | Self::Hydration { .. }
        )
    }
}
