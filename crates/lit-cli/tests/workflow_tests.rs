mod common;

use common::lit;

#[test]
fn init_add_commit_log_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    lit(dir.path(), &["init"]).assert_success();

    std::fs::write(dir.path().join("hello.txt"), b"hello\n").unwrap();
    lit(dir.path(), &["add", "hello.txt"]).assert_success();
    lit(dir.path(), &["commit", "-m", "initial commit"]).assert_success();

    let log = lit(dir.path(), &["log", "--oneline"]);
    log.assert_success();
    assert!(log.stdout.contains("initial commit"));

    let status = lit(dir.path(), &["status", "--short"]);
    status.assert_success();
    assert_eq!(status.stdout, "");
}

#[test]
fn status_reports_staged_and_untracked() {
    let dir = tempfile::tempdir().unwrap();
    lit(dir.path(), &["init"]).assert_success();

    std::fs::write(dir.path().join("a.txt"), b"a\n").unwrap();
    lit(dir.path(), &["add", "a.txt"]).assert_success();
    std::fs::write(dir.path().join("b.txt"), b"b\n").unwrap();

    let status = lit(dir.path(), &["status", "--short"]);
    status.assert_success();
    assert!(status.stdout.contains("A a.txt"));
    assert!(status.stdout.contains("? b.txt"));
}

#[test]
fn branch_and_checkout_switch_head() {
    let dir = tempfile::tempdir().unwrap();
    lit(dir.path(), &["init", "-b", "main"]).assert_success();
    std::fs::write(dir.path().join("f.txt"), b"1\n").unwrap();
    lit(dir.path(), &["add", "f.txt"]).assert_success();
    lit(dir.path(), &["commit", "-m", "first"]).assert_success();

    lit(dir.path(), &["branch", "feature"]).assert_success();
    lit(dir.path(), &["checkout", "feature"]).assert_success();

    let branches = lit(dir.path(), &["branch"]);
    branches.assert_success();
    assert!(branches.stdout.contains("feature"));
    assert!(branches.stdout.contains("main"));
}

#[test]
fn diff_shows_unstaged_change() {
    let dir = tempfile::tempdir().unwrap();
    lit(dir.path(), &["init"]).assert_success();
    std::fs::write(dir.path().join("f.txt"), b"one\n").unwrap();
    lit(dir.path(), &["add", "f.txt"]).assert_success();
    lit(dir.path(), &["commit", "-m", "first"]).assert_success();

    std::fs::write(dir.path().join("f.txt"), b"two\n").unwrap();
    let diff = lit(dir.path(), &["diff"]);
    diff.assert_success();
    assert!(diff.stdout.contains("-one"));
    assert!(diff.stdout.contains("+two"));
}

#[test]
fn reset_soft_moves_head_keeps_index() {
    let dir = tempfile::tempdir().unwrap();
    lit(dir.path(), &["init"]).assert_success();
    std::fs::write(dir.path().join("f.txt"), b"1\n").unwrap();
    lit(dir.path(), &["add", "f.txt"]).assert_success();
    lit(dir.path(), &["commit", "-m", "first"]).assert_success();

    let first_commit = lit(dir.path(), &["log"])
        .stdout
        .lines()
        .find(|l| l.starts_with("commit "))
        .unwrap()
        .trim_start_matches("commit ")
        .to_string();

    std::fs::write(dir.path().join("f.txt"), b"2\n").unwrap();
    lit(dir.path(), &["add", "f.txt"]).assert_success();
    lit(dir.path(), &["commit", "-m", "second"]).assert_success();

    lit(dir.path(), &["reset", "--soft", &first_commit]).assert_success();

    let status = lit(dir.path(), &["status", "--short"]);
    status.assert_success();
    assert!(status.stdout.contains("M f.txt") || status.stdout.contains("A f.txt"));
}

#[test]
fn tag_create_and_list() {
    let dir = tempfile::tempdir().unwrap();
    lit(dir.path(), &["init"]).assert_success();
    std::fs::write(dir.path().join("f.txt"), b"1\n").unwrap();
    lit(dir.path(), &["add", "f.txt"]).assert_success();
    lit(dir.path(), &["commit", "-m", "first"]).assert_success();

    lit(dir.path(), &["tag", "v1.0"]).assert_success();
    let tags = lit(dir.path(), &["tag", "--list"]);
    tags.assert_success();
    assert!(tags.stdout.contains("v1.0"));
}

#[test]
fn cat_file_pretty_prints_blob() {
    let dir = tempfile::tempdir().unwrap();
    lit(dir.path(), &["init"]).assert_success();
    std::fs::write(dir.path().join("f.txt"), b"hi\n").unwrap();
    lit(dir.path(), &["add", "f.txt"]).assert_success();
    lit(dir.path(), &["commit", "-m", "first"]).assert_success();

    let ls_tree = lit(dir.path(), &["ls-tree", "HEAD"]);
    ls_tree.assert_success();
    let blob_oid = ls_tree.stdout.split_whitespace().nth(2).expect("ls-tree line has an oid column").to_string();

    let cat_file = lit(dir.path(), &["cat-file", "-p", &blob_oid]);
    cat_file.assert_success();
    assert_eq!(cat_file.stdout, "hi\n");
}

#[test]
fn fatal_outside_repository_exits_128() {
    let dir = tempfile::tempdir().unwrap();
    let result = lit(dir.path(), &["status"]);
    assert_eq!(result.exit_code, 128);
}
