//! Watermark behaviour of the incremental renderer across runs.

mod common;

use std::fs;

use buildlog_dash::pipeline;
use buildlog_dash::render::{AnsiRenderer, CheckpointFile, parse_run_folder};
use common::Workspace;

fn watermark(ws: &Workspace) -> i64 {
    CheckpointFile::new(ws.checkpoint()).read().unwrap()
}

#[test]
fn test_second_run_only_renders_new_folders() {
    let ws = Workspace::new();
    ws.capture("2024-01-01T00:00:00", "foo.log", b"first");
    ws.capture("2024-01-02T00:00:00", "foo.log", b"second");
    pipeline::init_checkpoint(&ws.config(), 0, false).unwrap();

    let first = pipeline::render_captures(&ws.config(), AnsiRenderer::new()).unwrap();
    assert_eq!(first.folders_rendered, 2);
    assert_eq!(watermark(&ws), parse_run_folder("2024-01-02T00:00:00").unwrap());

    // Delete an already rendered page: older folders are not revisited.
    fs::remove_file(ws.html().join("foo/2024-01-01T00:00:00.html")).unwrap();
    ws.capture("2024-01-03T00:00:00", "bar.log", b"third");

    let second = pipeline::render_captures(&ws.config(), AnsiRenderer::new()).unwrap();
    // The boundary folder plus the new one.
    assert_eq!(second.folders_rendered, 2);
    assert_eq!(second.pages_written, 2);
    assert!(!ws.html().join("foo/2024-01-01T00:00:00.html").exists());
    assert!(ws.html().join("bar/2024-01-03T00:00:00.html").exists());
    assert_eq!(watermark(&ws), parse_run_folder("2024-01-03T00:00:00").unwrap());
}

#[test]
fn test_rerender_is_byte_identical() {
    let ws = Workspace::new();
    let capture = b"\x1b[1m==> Making package: foo 1.0-1\x1b[0m\r\n\
        \x1b[33m  -> \x1b[0mDownloading 10%\r  -> Downloading 100%\n\
        \x1b[31merror:\x1b[0m <missing> & broken\n";
    ws.capture("2024-01-01T00:00:00", "foo.log", capture);
    pipeline::init_checkpoint(&ws.config(), 0, false).unwrap();

    pipeline::render_captures(&ws.config(), AnsiRenderer::new()).unwrap();
    let page = ws.html().join("foo/2024-01-01T00:00:00.html");
    let first = fs::read(&page).unwrap();

    pipeline::render_captures(&ws.config(), AnsiRenderer::new()).unwrap();
    let second = fs::read(&page).unwrap();

    assert_eq!(first, second);
    let html = String::from_utf8(first).unwrap();
    assert!(html.contains("&lt;missing&gt; &amp; broken"));
    assert!(!html.contains("Downloading 10%"));
}

#[test]
fn test_invalid_folder_name_fails_whole_run() {
    let ws = Workspace::new();
    ws.capture("2024-01-01T00:00:00", "foo.log", b"ok");
    ws.capture("not-a-timestamp", "foo.log", b"bad");
    pipeline::init_checkpoint(&ws.config(), 0, false).unwrap();

    let err = pipeline::render_captures(&ws.config(), AnsiRenderer::new()).unwrap_err();
    assert!(err.to_string().contains("not-a-timestamp"));
}

#[test]
fn test_folders_before_watermark_are_skipped() {
    let ws = Workspace::new();
    ws.capture("2023-12-31T23:59:59", "old.log", b"old");
    ws.capture("2024-01-01T00:00:00", "new.log", b"new");
    let at = parse_run_folder("2024-01-01T00:00:00").unwrap();
    pipeline::init_checkpoint(&ws.config(), at, false).unwrap();

    let stats = pipeline::render_captures(&ws.config(), AnsiRenderer::new()).unwrap();
    assert_eq!(stats.folders_seen, 2);
    assert_eq!(stats.folders_rendered, 1);
    assert!(!ws.html().join("old").exists());
    assert!(ws.html().join("new/2024-01-01T00:00:00.html").exists());
}
