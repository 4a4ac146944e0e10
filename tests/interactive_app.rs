mod common;

use blocksweep::app::{App, SearchSpec};
use blocksweep::controller::Controller;
use common::{read, write, FnTransform};
use std::io::Cursor;
use tempfile::tempdir;

fn run(root: &std::path::Path, script: &str, input: &str) -> String {
    let controller = Controller::new(FnTransform::new(|input: &str| input.replace("old", "new")));
    let spec = SearchSpec {
        root: root.to_path_buf(),
        globs: "**/*.txt".to_string(),
        begin_pattern: "^BEGIN".to_string(),
        end_pattern: "^END".to_string(),
    };
    let mut app = App::new(controller, spec, script.to_string());
    let mut out = Vec::new();
    app.run_interactive(Cursor::new(input.to_string()), &mut out)
        .unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn commit_then_quit() {
    let dir = tempdir().unwrap();
    write(dir.path(), "doc.txt", "BEGIN\nold\nEND\nBEGIN\nold\nEND\n");

    let out = run(dir.path(), "replace", "commit\nquit\ncommit\n");
    assert_eq!(read(dir.path(), "doc.txt"), "BEGIN\nnew\nEND\nBEGIN\nold\nEND\n");
    assert!(out.contains("--- before ---\nBEGIN\nold\nEND\n"));
    assert!(out.contains("--- after ---\nBEGIN\nnew\nEND\n"));
    // コミット後の一覧は2件目を選択している
    assert!(out.contains(">     4: BEGIN"));
}

#[test]
fn commit_is_refused_without_script() {
    let dir = tempdir().unwrap();
    write(dir.path(), "doc.txt", "BEGIN\nold\nEND");

    let out = run(dir.path(), "", "commit\n");
    assert!(out.contains("nothing to commit"));
    assert_eq!(read(dir.path(), "doc.txt"), "BEGIN\nold\nEND");
}

#[test]
fn select_uses_one_based_lines_and_reports_errors() {
    let dir = tempdir().unwrap();
    write(dir.path(), "sub/doc.txt", "x\nBEGIN\nold\nEND");

    let out = run(
        dir.path(),
        "replace",
        "select sub/doc.txt 2\nselect sub/doc.txt 99\nbogus\napply\nlist\n",
    );
    assert!(out.contains("error: Session error: Line 98 is out of range"));
    assert!(out.contains("unknown command: bogus"));
    assert!(out.contains("sub/doc.txt\n>     2: BEGIN\n"));
    // select は選択だけで、スクリプトは apply で実行される
    assert_eq!(out.matches("--- after ---\nBEGIN\nnew\nEND\n").count(), 2);
}

#[test]
fn missing_file_is_reported_and_the_loop_continues() {
    let dir = tempdir().unwrap();
    write(dir.path(), "doc.txt", "BEGIN\nEND");

    let controller = Controller::new(FnTransform::new(|input: &str| input.to_string()));
    let spec = SearchSpec {
        root: dir.path().to_path_buf(),
        globs: "*.txt".to_string(),
        begin_pattern: "^BEGIN".to_string(),
        end_pattern: String::new(),
    };
    let mut app = App::new(controller, spec, String::new());
    let mut out = Vec::new();
    app.run_interactive(Cursor::new("select gone.txt 1\nlist\nquit\n"), &mut out)
        .unwrap();

    let out = String::from_utf8(out).unwrap();
    assert!(out.contains("error: File operation failed: File not found"));
    assert!(out.ends_with("doc.txt\n>     1: BEGIN\n"));
}
