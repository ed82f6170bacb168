mod common;

use std::fs;
use std::path::PathBuf;

use common::{days_ago, originals, Fixture, GB, KB, MB};
use trash_box_core::{BoxOptions, OrphanKind, QueryMode, Size, SortKey};

fn scenario() -> Fixture {
    let fx = Fixture::new();
    fx.trash("recent", &fx.path("docs/recent.txt"), days_ago(1), KB);
    fx.trash("tenth", &fx.path("docs/tenth.iso"), days_ago(10), 10 * MB);
    fx.trash("old", &fx.path("media/old.mkv"), days_ago(30), 2 * GB);
    fx
}

#[test]
fn day_old_keeps_entries_older_than_the_window() {
    let fx = scenario();
    let trash = fx.open(BoxOptions::default().with_day(0, 7));
    assert_eq!(originals(&trash), [fx.path("media/old.mkv"), fx.path("docs/tenth.iso")]);
}

#[test]
fn size_large_keeps_only_big_entries() {
    let fx = scenario();
    let trash = fx.open(BoxOptions::default().with_size("1GB", ""));
    assert_eq!(originals(&trash), [fx.path("media/old.mkv")]);
    assert_eq!(trash.files[0].size, Size::Known(2 * GB));
}

#[test]
fn filter_kinds_combine_with_and() {
    let fx = scenario();
    let trash = fx.open(BoxOptions::default().with_day(0, 7).with_size("1GB", ""));
    assert_eq!(originals(&trash), [fx.path("media/old.mkv")]);
}

#[test]
fn day_new_and_day_old_partition_the_catalog() {
    let fx = scenario();
    fx.trash("edge", &fx.path("docs/edge.txt"), days_ago(10), KB);

    let all = fx.open(BoxOptions::default()).files.len();
    let new = fx.open(BoxOptions::default().with_day(10, 0));
    let old = fx.open(BoxOptions::default().with_day(0, 10));

    assert_eq!(new.files.len() + old.files.len(), all);
    assert!(new.files.iter().any(|f| f.original_path == fx.path("docs/edge.txt")));
    assert!(old.files.iter().all(|f| f.original_path != fx.path("docs/edge.txt")));
}

#[test]
fn sizes_are_only_computed_when_asked_for() {
    let fx = scenario();
    let trash = fx.open(BoxOptions::default());
    assert!(trash.files.iter().all(|f| f.size == Size::Pending));

    let trash = fx.open(BoxOptions::default().with_get_size(true));
    assert!(trash.files.iter().all(|f| matches!(f.size, Size::Known(_))));
}

#[test]
fn size_sort_descending_with_last_n() {
    let fx = scenario();
    let trash = fx.open(
        BoxOptions::default()
            .with_sort_by(SortKey::Size)
            .with_ascend(false)
            .with_limit_last(2),
    );
    assert_eq!(originals(&trash), [fx.path("docs/tenth.iso"), fx.path("docs/recent.txt")]);
}

#[test]
fn last_n_applies_after_sorting() {
    let fx = scenario();
    let trash = fx.open(BoxOptions::default().with_limit_last(1));
    assert_eq!(originals(&trash), [fx.path("docs/recent.txt")]);
}

#[test]
fn same_original_path_matches_in_full_mode_oldest_first() {
    let fx = Fixture::new();
    let report = fx.path("home/u/report.txt");
    fx.trash("report.txt", &report, days_ago(2), KB);
    fx.trash("report.txt.2", &report, days_ago(5), KB);
    fx.trash("other", &fx.path("home/u/Report.txt"), days_ago(1), KB);

    let query = report.to_string_lossy().into_owned();
    let trash = fx.open(
        BoxOptions::default()
            .with_query_mode(QueryMode::Full)
            .with_queries([query]),
    );

    assert_eq!(trash.files.len(), 2);
    assert!(trash.files.iter().all(|f| f.original_path == report));
    assert_eq!(trash.files[0].deleted_at, days_ago(5));
    assert_eq!(trash.files[1].deleted_at, days_ago(2));
}

#[test]
fn empty_query_list_matches_everything_and_queries_are_or_ed() {
    let fx = scenario();
    assert_eq!(fx.open(BoxOptions::default()).files.len(), 3);

    let trash = fx.open(
        BoxOptions::default()
            .with_query_mode(QueryMode::Literal)
            .with_queries(["RECENT", "MKV"]),
    );
    assert_eq!(trash.files.len(), 2);

    let trash = fx.open(BoxOptions::default().with_query_mode(QueryMode::Glob).with_queries(["*.iso"]));
    assert_eq!(originals(&trash), [fx.path("docs/tenth.iso")]);

    let trash = fx.open(BoxOptions::default().with_queries([r"docs/.*\.txt$"]));
    assert_eq!(originals(&trash), [fx.path("docs/recent.txt")]);
}

#[test]
fn directory_scope_matches_the_parent_directory() {
    let fx = scenario();
    fx.trash("nested", &fx.path("docs/sub/nested.txt"), days_ago(3), KB);

    let trash = fx.open(BoxOptions::default().with_directory(fx.path("docs/")));
    assert_eq!(originals(&trash), [fx.path("docs/tenth.iso"), fx.path("docs/recent.txt")]);
}

#[test]
fn cwd_scope_keeps_only_direct_children_of_the_working_dir() {
    let fx = scenario();
    fx.trash("nested", &fx.path("docs/sub/nested.txt"), days_ago(3), KB);

    let trash = fx.open(BoxOptions::default().with_working_dir(fx.path("docs")).with_cwd(true));
    assert_eq!(originals(&trash), [fx.path("docs/tenth.iso"), fx.path("docs/recent.txt")]);

    let trash = fx.open(BoxOptions::default().with_working_dir(fx.path("docs/sub")).with_cwd(true));
    assert_eq!(originals(&trash), [fx.path("docs/sub/nested.txt")]);
}

#[test]
fn home_and_volume_trash_are_merged() {
    let fx = scenario();
    let volume_trash = fx.volume_trash();
    fx.trash_in(&volume_trash, "usb", &PathBuf::from("photos/usb.jpg"), days_ago(20), KB);

    let trash = fx.open(BoxOptions::default());
    assert_eq!(trash.locations.len(), 2);
    assert_eq!(trash.files.len(), 4);
    assert_eq!(trash.files[1].original_path, fx.volume.join("photos/usb.jpg"));
    assert_eq!(trash.files[1].trash_dir, volume_trash);
}

#[test]
fn orphans_are_reported_but_never_filtered() {
    let fx = scenario();
    fx.write_info(&fx.home_trash, "ghost", &fx.path("docs/ghost.txt"), days_ago(1));
    fs::write(fx.home_trash.join("files/stray"), b"stray").unwrap();
    fs::write(fx.home_trash.join("info/junk.trashinfo"), b"garbage").unwrap();

    let trash = fx.open(BoxOptions::default().with_queries(["matches-nothing"]));
    assert!(trash.files.is_empty());

    let kinds: Vec<_> = trash.orphans.iter().map(|o| o.kind.clone()).collect();
    assert_eq!(kinds.len(), 3);
    assert!(kinds.contains(&OrphanKind::MissingFile));
    assert!(kinds.contains(&OrphanKind::MissingMetadata));
    assert!(kinds.iter().any(|k| matches!(k, OrphanKind::Corrupt(_))));
}

#[test]
fn open_is_deterministic() {
    let fx = scenario();
    fx.trash("twin-a", &fx.path("docs/b.txt"), days_ago(4), KB);
    fx.trash("twin-b", &fx.path("docs/a.txt"), days_ago(4), KB);

    let first = fx.open(BoxOptions::default()).files;
    let second = fx.open(BoxOptions::default()).files;
    assert_eq!(first, second);

    let twins: Vec<_> = first.iter().filter(|f| f.deleted_at == days_ago(4)).collect();
    assert_eq!(twins[0].original_path, fx.path("docs/a.txt"));
    assert_eq!(twins[1].original_path, fx.path("docs/b.txt"));
}
