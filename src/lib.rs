//! Trash index and query engine.
//!
//! Discovers the freedesktop.org trash directories of the current user,
//! pairs every `.trashinfo` sidecar with its stored data, and exposes the
//! result as one filtered, sorted catalog ([`TrashBox`]). Selected entries
//! can then be restored or removed one by one with [`restore`] and
//! [`remove`].
//!
//! ```no_run
//! use trash_box_core::{BoxOptions, LocatorConfig, QueryMode, TrashBox};
//!
//! let options = BoxOptions::default()
//!     .with_queries(["report"])
//!     .with_query_mode(QueryMode::Literal)
//!     .with_day(0, 7);
//! let mut trash = TrashBox::new(options, LocatorConfig::from_env())?;
//! trash.open()?;
//! let report = trash_box_core::restore(&trash.files, None);
//! report.into_result()?;
//! # Ok::<(), trash_box_core::CoreError>(())
//! ```

pub mod catalog;
pub mod config;
pub mod errors;
pub mod filter;
pub mod fs;
pub mod helpers;
pub mod loader;
pub mod locator;
pub mod models;
pub mod mutate;
pub mod query;
pub mod sort;
pub mod trashinfo;

pub use catalog::{BoxOptions, TrashBox};
pub use config::{Environ, LocatorConfig};
pub use errors::{CoreError, Result};
pub use helpers::{parse_size, print_size, DISPLAY_TIME_FORMAT, TRASHINFO_EXTENSION, TRASHINFO_TIME_FORMAT};
pub use loader::{load, Loaded};
pub use locator::discover;
pub use models::{
    Discovery,
    Entry,
    LocationKind,
    OrphanKind,
    OrphanMeta,
    Size,
    SkipReason,
    SkippedLocation,
    TrashLocation,
};
pub use mutate::{fix_orphans, remove, restore, BatchReport, EntryReport, Outcome};
pub use query::{Matcher, QueryMode};
pub use sort::SortKey;
pub use trashinfo::{TrashInfo, TrashInfoError};

/// Re-export a small stable API surface for command crates.
pub mod prelude {
    pub use crate::{
        catalog::{BoxOptions, TrashBox},
        config::LocatorConfig,
        errors::{CoreError, Result},
        models::*,
        mutate::{fix_orphans, remove, restore, BatchReport},
        query::QueryMode,
        sort::SortKey,
    };
}
