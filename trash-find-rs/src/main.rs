use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use trash_box_core::helpers::normalize_path;
use trash_box_core::{
    fix_orphans, remove, restore, BatchReport, BoxOptions, CoreError, Entry, LocatorConfig,
    QueryMode, SortKey, TrashBox, DISPLAY_TIME_FORMAT,
};

/// Find trashed files, then optionally restore or remove them.
///
/// Output is one tab separated line per entry: deletion date, size when
/// requested, original path and, with --show-trashpath, the stored path.
#[derive(Debug, Parser)]
#[command(name = "trash-find", version)]
struct Cli {
    /// Queries matched against the original path (any query may match)
    queries: Vec<String>,

    /// Only entries deleted directly from this directory
    #[arg(short = 'd', long, conflicts_with = "cwd")]
    directory: Option<PathBuf>,

    /// Only entries deleted directly from the current directory
    #[arg(short = 'c', long)]
    cwd: bool,

    /// Sort key: date, path, name or size
    #[arg(short = 's', long, default_value = "date")]
    sort: SortKey,

    /// Query mode: regex, glob, literal or full
    #[arg(short = 'm', long, default_value = "regex")]
    mode: QueryMode,

    /// Only entries deleted within the last N days
    #[arg(long, value_name = "DAYS", conflicts_with = "day_old")]
    day_new: Option<u32>,

    /// Only entries deleted more than N days ago
    #[arg(long, value_name = "DAYS")]
    day_old: Option<u32>,

    /// Only entries at least this large (e.g. 5MB, 1GB)
    #[arg(long, value_name = "SIZE", conflicts_with = "size_small")]
    size_large: Option<String>,

    /// Only entries smaller than this (e.g. 5MB, 1GB)
    #[arg(long, value_name = "SIZE")]
    size_small: Option<String>,

    /// Reverse the sort order
    #[arg(short = 'r', long)]
    reverse: bool,

    /// Show only the last N entries
    #[arg(short = 'n', long, value_name = "N", default_value_t = 0)]
    last: usize,

    /// Always show sizes, '-' when unknown
    #[arg(short = 'S', long)]
    show_size: bool,

    /// Show the stored path inside the trash
    #[arg(long)]
    show_trashpath: bool,

    /// Remove the listed entries PERMANENTLY
    #[arg(long, conflicts_with = "restore")]
    rm: bool,

    /// Restore the listed entries
    #[arg(long)]
    restore: bool,

    /// Restore into this directory instead of the original location
    #[arg(long, value_name = "DIR", requires = "restore")]
    restore_to: Option<PathBuf>,

    /// Delete trashinfo files that have no stored data
    #[arg(long, conflicts_with_all = ["rm", "restore"])]
    fix_orphans: bool,
}

impl Cli {
    fn box_options(&self) -> BoxOptions {
        BoxOptions::default()
            .with_ascend(!self.reverse)
            .with_get_size(self.show_size)
            .with_directory(self.directory.clone().unwrap_or_default())
            .with_cwd(self.cwd)
            .with_queries(self.queries.iter().cloned())
            .with_sort_by(self.sort)
            .with_query_mode(self.mode)
            .with_day(self.day_new.unwrap_or(0), self.day_old.unwrap_or(0))
            .with_size(
                self.size_large.as_deref().unwrap_or_default(),
                self.size_small.as_deref().unwrap_or_default(),
            )
            .with_limit_last(self.last)
    }
}

fn list_files(out: &mut impl Write, files: &[Entry], show_size: bool, show_trash_path: bool) -> io::Result<()> {
    for file in files {
        write!(out, "{}", file.deleted_at.format(DISPLAY_TIME_FORMAT))?;
        if show_size {
            write!(out, "\t{}", file.size.human())?;
        }
        write!(out, "\t{}", file.original_path.display())?;
        if show_trash_path {
            write!(out, "\t{}", file.trash_path.display())?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn report_failures(action: &str, report: &BatchReport) {
    for (path, err) in report.failures() {
        eprintln!("trash-find: {action} failed: {}: {err}", path.display());
    }
    for (path, err) in report.metadata_left() {
        eprintln!("trash-find: trashinfo left behind for {}: {err}", path.display());
    }
}

fn run(cli: Cli) -> Result<bool, CoreError> {
    debug!(?cli, "starting find");

    let restore_to = match &cli.restore_to {
        Some(dir) => {
            let cwd = env::current_dir().map_err(|err| CoreError::io(".", err))?;
            Some(normalize_path(dir, &cwd))
        }
        None => None,
    };

    let mut trash = TrashBox::new(cli.box_options(), LocatorConfig::from_env())?;
    trash.open()?;

    let mut stdout = io::stdout().lock();
    list_files(&mut stdout, &trash.files, trash.shows_size(), cli.show_trashpath)
        .map_err(|err| CoreError::io("<stdout>", err))?;

    if !trash.orphans.is_empty() && !cli.fix_orphans {
        eprintln!(
            "trash-find: found {} invalid trashinfo entries, remove them with --fix-orphans",
            trash.orphans.len()
        );
    }

    let report = if cli.fix_orphans {
        let report = fix_orphans(&trash.orphans);
        report_failures("fix", &report);
        report
    } else if cli.rm {
        let report = remove(&trash.files);
        report_failures("remove", &report);
        report
    } else if cli.restore {
        if let Some(dir) = &restore_to {
            eprintln!("trash-find: restoring to {} instead of original paths", dir.display());
        }
        let report = restore(&trash.files, restore_to.as_deref());
        report_failures("restore", &report);
        report
    } else {
        return Ok(true);
    };

    Ok(report.is_success())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .compact()
        .init();

    match run(Cli::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("trash-find: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutually_exclusive_flags_are_rejected_by_the_parser() {
        for args in [
            &["trash-find", "--day-new", "1", "--day-old", "2"][..],
            &["trash-find", "--size-large", "1MB", "--size-small", "2MB"][..],
            &["trash-find", "--cwd", "--directory", "/tmp"][..],
            &["trash-find", "--rm", "--restore"][..],
            &["trash-find", "--restore-to", "/tmp"][..],
        ] {
            assert!(Cli::try_parse_from(args.iter().copied()).is_err(), "{args:?} should be rejected");
        }
    }

    #[test]
    fn flags_map_onto_box_options() {
        let cli = Cli::try_parse_from([
            "trash-find", "-m", "glob", "-s", "size", "-r", "-n", "3", "--day-old", "7", "--size-large", "1GB", "*.iso",
        ])
        .unwrap();
        let options = cli.box_options();
        assert_eq!(options.query_mode, QueryMode::Glob);
        assert_eq!(options.sort_by, SortKey::Size);
        assert!(!options.ascend);
        assert_eq!(options.limit_last, 3);
        assert_eq!(options.day_old, Some(7));
        assert_eq!(options.size_large.as_deref(), Some("1GB"));
        assert_eq!(options.queries, ["*.iso"]);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn unknown_mode_is_a_parse_error() {
        assert!(Cli::try_parse_from(["trash-find", "-m", "fuzzy"]).is_err());
    }
}
