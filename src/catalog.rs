//! The catalog: every trashed entry visible to the user, filtered, matched
//! and sorted according to [`BoxOptions`].

use std::env;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{debug, warn};

use crate::config::LocatorConfig;
use crate::errors::{CoreError, Result};
use crate::filter::{DayRange, Filter, SizeRange};
use crate::fs::disk_usage;
use crate::helpers::{normalize_path, parse_size};
use crate::loader::load;
use crate::locator::discover;
use crate::models::{Entry, OrphanMeta, Size, SkippedLocation, TrashLocation};
use crate::query::{Matcher, QueryMode};
use crate::sort::{keep_last, sort_entries, SortKey};

/// Query configuration for one [`TrashBox`].
///
/// Defaults: ascending date order, regex queries, no filters, no limit.
/// Contradicting pairs (`day_new`/`day_old`, `size_large`/`size_small`,
/// `directory`/`cwd`) are rejected by [`BoxOptions::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxOptions {
    pub ascend: bool,
    /// Compute sizes for display even when no size filter or sort asks for them.
    pub get_size: bool,
    pub directory: Option<PathBuf>,
    pub cwd: bool,
    pub queries: Vec<String>,
    pub sort_by: SortKey,
    pub query_mode: QueryMode,
    pub day_new: Option<u32>,
    pub day_old: Option<u32>,
    pub size_large: Option<String>,
    pub size_small: Option<String>,
    /// Keep only the last N entries; 0 keeps all.
    pub limit_last: usize,
    /// Reference time for the day filters, `Local::now()` when unset.
    pub now: Option<DateTime<Local>>,
    /// Directory used for `cwd` and for resolving a relative `directory`,
    /// the process working directory when unset.
    pub working_dir: Option<PathBuf>,
}

impl Default for BoxOptions {
    fn default() -> Self {
        Self {
            ascend: true,
            get_size: false,
            directory: None,
            cwd: false,
            queries: Vec::new(),
            sort_by: SortKey::default(),
            query_mode: QueryMode::default(),
            day_new: None,
            day_old: None,
            size_large: None,
            size_small: None,
            limit_last: 0,
            now: None,
            working_dir: None,
        }
    }
}

impl BoxOptions {
    pub fn with_ascend(mut self, ascend: bool) -> Self {
        self.ascend = ascend;
        self
    }

    pub fn with_get_size(mut self, get_size: bool) -> Self {
        self.get_size = get_size;
        self
    }

    /// An empty path clears the directory scope.
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        let directory = directory.into();
        self.directory = (!directory.as_os_str().is_empty()).then_some(directory);
        self
    }

    pub fn with_cwd(mut self, cwd: bool) -> Self {
        self.cwd = cwd;
        self
    }

    pub fn with_queries<I, S>(mut self, queries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.queries = queries.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_sort_by(mut self, sort_by: SortKey) -> Self {
        self.sort_by = sort_by;
        self
    }

    pub fn with_query_mode(mut self, query_mode: QueryMode) -> Self {
        self.query_mode = query_mode;
        self
    }

    /// Day windows; `0` leaves a side unset.
    pub fn with_day(mut self, day_new: u32, day_old: u32) -> Self {
        self.day_new = (day_new > 0).then_some(day_new);
        self.day_old = (day_old > 0).then_some(day_old);
        self
    }

    /// Size thresholds such as `10MB`; an empty string leaves a side unset.
    pub fn with_size(mut self, size_large: &str, size_small: &str) -> Self {
        self.size_large = (!size_large.is_empty()).then(|| size_large.to_string());
        self.size_small = (!size_small.is_empty()).then(|| size_small.to_string());
        self
    }

    pub fn with_limit_last(mut self, limit_last: usize) -> Self {
        self.limit_last = limit_last;
        self
    }

    pub fn with_now(mut self, now: DateTime<Local>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn with_working_dir(mut self, working_dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(working_dir.into());
        self
    }

    /// Rejects mutually exclusive option pairs.
    pub fn validate(&self) -> Result<()> {
        if self.day_new.is_some() && self.day_old.is_some() {
            return Err(CoreError::invalid_input("day-new and day-old are mutually exclusive"));
        }
        if self.size_large.is_some() && self.size_small.is_some() {
            return Err(CoreError::invalid_input("size-large and size-small are mutually exclusive"));
        }
        if self.directory.is_some() && self.cwd {
            return Err(CoreError::invalid_input("directory and cwd are mutually exclusive"));
        }
        Ok(())
    }

    /// Whether sizes end up computed for the listed entries.
    pub fn shows_size(&self) -> bool {
        self.get_size || self.needs_size()
    }

    fn needs_size(&self) -> bool {
        self.sort_by.needs_size() || self.size_large.is_some() || self.size_small.is_some()
    }
}

/// Unified view over every trash location.
#[derive(Debug)]
pub struct TrashBox {
    options: BoxOptions,
    locator: LocatorConfig,
    matcher: Matcher,
    filter: Filter,

    /// Matching entries in final order, filled by [`TrashBox::open`].
    pub files: Vec<Entry>,
    /// Every inconsistency found, regardless of filters.
    pub orphans: Vec<OrphanMeta>,
    pub locations: Vec<TrashLocation>,
    pub skipped: Vec<SkippedLocation>,
}

impl TrashBox {
    /// Validates the options and compiles queries and thresholds. Nothing
    /// is read from the trash yet.
    ///
    /// [`BoxOptions::validate`] runs here as well as in any command layer:
    /// options built directly through the library would otherwise let
    /// `day_new` silently win over `day_old` (and `size_large` over
    /// `size_small`) in the filter.
    pub fn new(options: BoxOptions, locator: LocatorConfig) -> Result<Self> {
        options.validate()?;
        let matcher = Matcher::new(options.query_mode, &options.queries)?;
        let filter = build_filter(&options)?;

        Ok(Self {
            options,
            locator,
            matcher,
            filter,
            files: Vec::new(),
            orphans: Vec::new(),
            locations: Vec::new(),
            skipped: Vec::new(),
        })
    }

    pub fn options(&self) -> &BoxOptions {
        &self.options
    }

    /// Whether entries carry a size after [`TrashBox::open`].
    pub fn shows_size(&self) -> bool {
        self.options.shows_size()
    }

    /// Discovers and loads every location, then filters, matches, sorts and
    /// truncates. A location that cannot be listed is skipped with a warning.
    pub fn open(&mut self) -> Result<()> {
        let discovery = discover(&self.locator)?;
        let now = self.options.now.unwrap_or_else(Local::now);

        let mut entries = Vec::new();
        let mut orphans = Vec::new();
        for location in &discovery.locations {
            match load(location) {
                Ok(loaded) => {
                    entries.extend(loaded.entries);
                    orphans.extend(loaded.orphans);
                }
                Err(err) => warn!(path = %location.path.display(), error = %err, "skipping trash dir"),
            }
        }
        let total = entries.len();

        let mut files: Vec<Entry> = entries
            .into_iter()
            .filter(|entry| self.filter.keep_scope(entry, &now))
            .filter(|entry| self.matcher.is_match(&entry.original_path.to_string_lossy()))
            .collect();

        if self.options.needs_size() {
            compute_sizes(&mut files);
        }
        files.retain(|entry| self.filter.keep_size(entry));

        sort_entries(&mut files, self.options.sort_by, self.options.ascend);
        keep_last(&mut files, self.options.limit_last);

        if self.options.get_size {
            compute_sizes(&mut files);
        }

        debug!(total, matched = files.len(), orphans = orphans.len(), "trash box opened");
        self.files = files;
        self.orphans = orphans;
        self.locations = discovery.locations;
        self.skipped = discovery.skipped;
        Ok(())
    }
}

fn build_filter(options: &BoxOptions) -> Result<Filter> {
    let directory = if options.cwd {
        Some(working_dir(options)?)
    } else {
        match &options.directory {
            Some(dir) => Some(normalize_path(dir, &working_dir(options)?)),
            None => None,
        }
    };

    let days = match (options.day_new, options.day_old) {
        (Some(days), _) => Some(DayRange::New(days)),
        (None, Some(days)) => Some(DayRange::Old(days)),
        (None, None) => None,
    };

    let sizes = match (&options.size_large, &options.size_small) {
        (Some(large), _) => Some(SizeRange::Large(parse_size(large)?)),
        (None, Some(small)) => Some(SizeRange::Small(parse_size(small)?)),
        (None, None) => None,
    };

    Ok(Filter { directory, days, sizes })
}

fn working_dir(options: &BoxOptions) -> Result<PathBuf> {
    let dir = match &options.working_dir {
        Some(dir) => dir.clone(),
        None => env::current_dir().map_err(|err| CoreError::io(Path::new("."), err))?,
    };
    Ok(normalize_path(&dir, Path::new("/")))
}

/// Fills in pending sizes. A failure marks only that entry as unknown.
fn compute_sizes(entries: &mut [Entry]) {
    for entry in entries.iter_mut().filter(|entry| entry.size.is_pending()) {
        entry.size = match disk_usage(&entry.trash_path) {
            Ok(bytes) => Size::Known(bytes),
            Err(err) => {
                warn!(path = %entry.trash_path.display(), error = %err, "unable to compute size");
                Size::Unknown
            }
        };
    }
}
