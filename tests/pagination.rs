//! Scroll-and-merge collection across captures.

mod support;

use std::time::Duration;
use support::{
    blank, desktop, frame_with, paste, patch_of, study_canvas, template_of, test_config, Action,
    World, VIEW_H, VIEW_W,
};
use tasksweep::collector::merge;
use tasksweep::config::{ScrollSearchConfig, TwoPhaseConfig};
use tasksweep::{
    CancelToken, CourseDedupIndex, DedupPolicy, ExactDedup, IconScanner, Marker,
    PaginatedCollector, Point, RunContext, ScanSession, SearchState, TaskProcessor,
    TemplateStore,
};

fn collector(search: ScrollSearchConfig) -> PaginatedCollector {
    let cfg = test_config();
    PaginatedCollector::new(
        IconScanner::default(),
        cfg.layout.scroll_anchor,
        search,
        TwoPhaseConfig::default(),
    )
}

fn task_world(list: tasksweep::OwnedImage) -> World {
    let cfg = test_config();
    World::new(cfg.layout, list, blank(VIEW_W, VIEW_H))
}

fn positions(items: &[tasksweep::WorkItem]) -> Vec<Point> {
    items.iter().map(|i| i.position).collect()
}

#[test]
fn rows_far_apart_stay_distinct() {
    let patch = patch_of(Marker::VideoDuration);
    let tpl = template_of(Marker::VideoDuration);
    let frame = frame_with(130, 520, &patch, &[Point::new(100, 100), Point::new(100, 500)]);
    let found = IconScanner::default().find_all(&frame, &tpl, &CancelToken::new());

    let items = merge(found, CourseDedupIndex::new(30));
    assert_eq!(
        positions(&items),
        vec![Point::new(100, 100), Point::new(100, 500)]
    );
}

#[test]
fn rows_in_one_band_merge_into_the_first() {
    let patch = patch_of(Marker::VideoDuration);
    let tpl = template_of(Marker::VideoDuration);
    let frame = frame_with(130, 200, &patch, &[Point::new(100, 100), Point::new(100, 115)]);
    let found = IconScanner::default().find_all(&frame, &tpl, &CancelToken::new());
    assert_eq!(found.first(), Some(&Point::new(100, 100)));

    let items = merge(found, CourseDedupIndex::new(30));
    assert_eq!(positions(&items), vec![Point::new(100, 100)]);
}

#[test]
fn dedup_across_captures_keeps_first_seen() {
    let tpl = template_of(Marker::VideoDuration);
    let patch = patch_of(Marker::VideoDuration);
    let scanner = IconScanner::default();
    let cancel = CancelToken::new();
    let first = frame_with(130, 200, &patch, &[Point::new(100, 100)]);
    let second = frame_with(130, 200, &patch, &[Point::new(100, 115), Point::new(40, 170)]);

    let mut session = ScanSession::new(CourseDedupIndex::new(30));
    for frame in [&first, &second] {
        session.count_capture();
        for p in scanner.find_all(frame, &tpl, &cancel) {
            session.offer(p);
        }
    }
    assert_eq!(session.captures(), 2);
    assert_eq!(
        positions(&session.finish()),
        vec![Point::new(100, 100), Point::new(40, 170)]
    );
}

#[test]
fn vertical_distance_decides_identity() {
    for (y1, y2, same) in [(0, 29, true), (0, 30, false), (45, 16, true), (45, 15, false)] {
        let mut index = CourseDedupIndex::new(30);
        assert!(index.is_new(Point::new(5, y1)));
        assert_eq!(!index.is_new(Point::new(900, y2)), same, "y1={y1} y2={y2}");
    }
}

#[test]
fn merged_collection_is_in_reading_order() {
    let items = merge(
        [
            Point::new(90, 300),
            Point::new(10, 40),
            Point::new(70, 40),
            Point::new(5, 300),
            Point::new(50, 120),
        ],
        ExactDedup::new(),
    );
    let pos = positions(&items);
    assert!(pos
        .windows(2)
        .all(|w| w[0].reading_order(&w[1]) != std::cmp::Ordering::Greater));
    assert_eq!(items.iter().map(|i| i.ordinal).collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
}

#[test]
fn empty_list_stops_at_the_soft_cap() {
    let (mut desk, world) = desktop(task_world(blank(VIEW_W, 400)));
    let ctx = RunContext::new(CancelToken::new());
    let collection = collector(ScrollSearchConfig::default())
        .scroll_search(&mut desk, &template_of(Marker::Task), ExactDedup::new(), &ctx)
        .unwrap();

    assert!(collection.items.is_empty());
    assert_eq!(collection.state, SearchState::Exhausted);
    assert_eq!(collection.scroll_attempts, 6);
    assert_eq!(collection.captures, 7);
    assert_eq!(world.borrow().scrolls(), vec![-5; 6]);
}

#[test]
fn empty_list_never_exceeds_the_hard_cap() {
    let (mut desk, world) = desktop(task_world(blank(VIEW_W, 400)));
    let ctx = RunContext::new(CancelToken::new());
    let search = ScrollSearchConfig {
        soft_cap: 10,
        ..ScrollSearchConfig::default()
    };
    let collection = collector(search)
        .scroll_search(&mut desk, &template_of(Marker::Task), ExactDedup::new(), &ctx)
        .unwrap();

    assert!(collection.items.is_empty());
    assert_eq!(collection.state, SearchState::Exhausted);
    assert_eq!(collection.scroll_attempts, 10);
    assert_eq!(world.borrow().scrolls().len(), 10);
    // The pointer is parked on the anchor before every scroll.
    let w = world.borrow();
    let anchor = test_config().layout.scroll_anchor;
    for pair in w.actions.windows(2) {
        if let Action::Scroll(_) = pair[1] {
            assert_eq!(pair[0], Action::Move(anchor));
        }
    }
}

#[test]
fn slow_list_is_found_after_scrolling() {
    let mut list = blank(VIEW_W, 400);
    paste(&mut list, &patch_of(Marker::Task), Point::new(60, 250));
    let (mut desk, world) = desktop(task_world(list));
    let ctx = RunContext::new(CancelToken::new());
    let collection = collector(ScrollSearchConfig::default())
        .scroll_search(&mut desk, &template_of(Marker::Task), ExactDedup::new(), &ctx)
        .unwrap();

    assert_eq!(collection.state, SearchState::Found);
    assert_eq!(collection.scroll_attempts, 5);
    // Five scrolls of thirty pixels move the row from 250 to 100.
    assert_eq!(positions(&collection.items), vec![Point::new(60, 100)]);
    assert_eq!(world.borrow().offset, 150);
}

#[test]
fn failed_capture_ends_the_search() {
    let mut world = task_world(blank(VIEW_W, 400));
    world.failing_captures = vec![2];
    let (mut desk, world) = desktop(world);
    let ctx = RunContext::new(CancelToken::new());
    let collection = collector(ScrollSearchConfig::default())
        .scroll_search(&mut desk, &template_of(Marker::Task), ExactDedup::new(), &ctx)
        .unwrap();

    assert_eq!(collection.state, SearchState::Exhausted);
    assert_eq!(collection.scroll_attempts, 2);
    assert_eq!(world.borrow().captures, 3);
}

#[test]
fn empty_template_skips_the_search() {
    let (mut desk, world) = desktop(task_world(blank(VIEW_W, 400)));
    let ctx = RunContext::new(CancelToken::new());
    let collection = collector(ScrollSearchConfig::default())
        .scroll_search(
            &mut desk,
            &tasksweep::Template::empty("6.png"),
            ExactDedup::new(),
            &ctx,
        )
        .unwrap();
    assert!(collection.items.is_empty());
    assert_eq!(world.borrow().captures, 0);
    assert!(world.borrow().actions.is_empty());
}

#[test]
fn cancelled_search_issues_no_input() {
    let (mut desk, world) = desktop(task_world(blank(VIEW_W, 400)));
    let cancel = CancelToken::new();
    cancel.cancel();
    let ctx = RunContext::new(cancel);
    let collection = collector(ScrollSearchConfig::default())
        .scroll_search(&mut desk, &template_of(Marker::Task), ExactDedup::new(), &ctx)
        .unwrap();
    assert_eq!(collection.state, SearchState::Exhausted);
    assert!(world.borrow().actions.is_empty());
}

#[test]
fn cancel_after_the_first_scroll_stops_the_search() {
    let mut world = task_world(blank(VIEW_W, 400));
    let cancel = CancelToken::new();
    // Raised during the settle wait after the first scroll.
    world.cancel_at = Some((Duration::from_millis(1000), cancel.clone()));
    let (mut desk, world) = desktop(world);
    let collection = collector(ScrollSearchConfig::default())
        .scroll_search(
            &mut desk,
            &template_of(Marker::Task),
            ExactDedup::new(),
            &RunContext::new(cancel),
        )
        .unwrap();

    assert_eq!(collection.state, SearchState::Exhausted);
    assert_eq!(collection.scroll_attempts, 1);
    assert_eq!(collection.captures, 1);
    let w = world.borrow();
    assert_eq!(w.scrolls(), vec![-5]);
    assert_eq!(w.captures, 1);
    assert_eq!(w.actions.last(), Some(&Action::Scroll(-5)));
}

#[test]
fn task_list_merges_both_markers() {
    let mut list = blank(VIEW_W, VIEW_H);
    paste(&mut list, &patch_of(Marker::TaskAlt), Point::new(150, 30));
    paste(&mut list, &patch_of(Marker::Task), Point::new(40, 90));
    paste(&mut list, &patch_of(Marker::Task), Point::new(40, 30));
    let (mut desk, _) = desktop(task_world(list));
    let processor = TaskProcessor::new(test_config(), support::full_store());

    let tasks = processor
        .collect_tasks(&mut desk, &RunContext::new(CancelToken::new()))
        .unwrap();
    assert_eq!(
        positions(&tasks),
        vec![Point::new(40, 30), Point::new(150, 30), Point::new(40, 90)]
    );
}

#[test]
fn two_phase_scan_keeps_incomplete_videos_across_both_views() {
    let cfg = test_config();
    let world = World::new(cfg.layout, blank(VIEW_W, VIEW_H), study_canvas(&cfg.completion));
    let (mut desk, world) = desktop(world);
    world.borrow_mut().page = support::Page::Study;
    let processor = TaskProcessor::new(cfg.clone(), support::full_store());

    let videos = processor
        .collect_incomplete_videos(&mut desk, &RunContext::new(CancelToken::new()))
        .unwrap();
    assert_eq!(
        positions(&videos),
        vec![Point::new(30, 20), Point::new(30, 100)]
    );

    let w = world.borrow();
    assert_eq!(w.scrolls(), vec![-10, 10]);
    assert_eq!(w.actions[0], Action::Move(cfg.layout.scroll_anchor));
    assert_eq!(w.captures, 2);
    assert_eq!(w.offset, 0);
}

#[test]
fn two_phase_scan_without_badge_template_keeps_every_row() {
    let cfg = test_config();
    let world = World::new(cfg.layout, blank(VIEW_W, VIEW_H), study_canvas(&cfg.completion));
    let (mut desk, world) = desktop(world);
    world.borrow_mut().page = support::Page::Study;
    let store = TemplateStore::new().with(Marker::VideoDuration, template_of(Marker::VideoDuration));
    let processor = TaskProcessor::new(cfg, store);

    let videos = processor
        .collect_incomplete_videos(&mut desk, &RunContext::new(CancelToken::new()))
        .unwrap();
    assert_eq!(
        positions(&videos),
        vec![Point::new(30, 20), Point::new(30, 60), Point::new(30, 100)]
    );
}
