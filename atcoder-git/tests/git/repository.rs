use crate::helpers::{AMBIENT_EMAIL, AMBIENT_NAME, TestRepo};
use atcoder_git::repository::{GitError, GitRepository, GitUser, Repository, UtcOffset};
use claims::{assert_ok_eq, assert_matches};
use tempfile::TempDir;

fn someone() -> GitUser {
    GitUser {
        name: "Someone".to_owned(),
        email: "someone@example.com".to_owned(),
    }
}

#[test]
fn open_fails_outside_a_work_tree() {
    let dir = TempDir::new().unwrap();

    let result = GitRepository::open(dir.path(), None, UtcOffset::UTC);
    assert_matches!(result, Err(GitError::NotAWorkTree(_)));

    let result = GitRepository::open(dir.path().join("missing"), None, UtcOffset::UTC);
    assert_matches!(result, Err(GitError::NotAWorkTree(_)));
}

#[test]
fn open_fails_inside_the_git_directory() {
    let test_repo = TestRepo::init();

    let result = GitRepository::open(test_repo.dir.path().join(".git"), None, UtcOffset::UTC);
    assert_matches!(result, Err(GitError::NotAWorkTree(_)));
}

#[test]
fn has_update_is_false_before_the_first_commit() {
    let test_repo = TestRepo::init();
    let repository = test_repo.open(None);

    assert_ok_eq!(repository.has_update("abc100/A/Main.cpp", 1000), false);
}

#[test]
fn has_update_matches_the_exact_second() {
    let test_repo = TestRepo::init();
    let repository = test_repo.open(Some(someone()));

    repository
        .update_file("abc100/A/Main.cpp", 1000, b"int main() {}\n", "Update abc100/A/Main.cpp")
        .unwrap();

    assert_ok_eq!(repository.has_update("abc100/A/Main.cpp", 1000), true);
    assert_ok_eq!(repository.has_update("abc100/A/Main.cpp", 1001), false);
    assert_ok_eq!(repository.has_update("abc100/A/Main.cpp", 999), false);
    assert_ok_eq!(repository.has_update("abc100/B/Main.cpp", 1000), false);
}

#[test]
fn update_file_commits_with_historical_dates() {
    let test_repo = TestRepo::init();
    let repository = test_repo.open(Some(someone()));

    repository
        .update_file("arc001/C/Main.py", 1560046356, b"print(1)\n", "Update arc001/C/Main.py\n\nhttps://atcoder.jp/contests/arc001/submissions/1")
        .unwrap();

    assert_eq!(test_repo.dates(), vec!["1560046356 +0900|1560046356 +0900"]);
    assert_eq!(
        test_repo.git(&["log", "-1", "--pretty=format:%an <%ae>|%cn <%ce>"]),
        "Someone <someone@example.com>|Someone <someone@example.com>"
    );
    assert_eq!(
        test_repo.git(&["log", "-1", "--pretty=format:%B"]).trim_end(),
        "Update arc001/C/Main.py\n\nhttps://atcoder.jp/contests/arc001/submissions/1"
    );
    assert_eq!(test_repo.read("arc001/C/Main.py"), b"print(1)\n");
}

#[test]
fn update_file_writes_raw_bytes() {
    let test_repo = TestRepo::init();
    let repository = test_repo.open(None);
    let content = b"\xef\xbb\xbfputs 'hi'\r\n\x00\xff";

    repository
        .update_file("practice/A/Main.rb", 10, content, "Update practice/A/Main.rb")
        .unwrap();

    assert_eq!(test_repo.read("practice/A/Main.rb"), content);
}

#[test]
fn unchanged_content_still_gets_a_commit() {
    let test_repo = TestRepo::init();
    let repository = test_repo.open(None);

    repository
        .update_file("abc100/A/Main.cpp", 100, b"same\n", "first")
        .unwrap();
    repository
        .update_file("abc100/A/Main.cpp", 200, b"same\n", "second")
        .unwrap();

    assert_eq!(test_repo.commit_count(), 2);
    assert_ok_eq!(repository.has_update("abc100/A/Main.cpp", 100), true);
    assert_ok_eq!(repository.has_update("abc100/A/Main.cpp", 200), true);
}

#[test]
fn ambient_identity_is_used_without_a_user() {
    let test_repo = TestRepo::init();
    let repository = test_repo.open(None);

    repository
        .update_file("abc100/A/Main.cpp", 100, b"x\n", "Update abc100/A/Main.cpp")
        .unwrap();

    assert_eq!(
        test_repo.git(&["log", "-1", "--pretty=format:%an <%ae>"]),
        format!("{} <{}>", AMBIENT_NAME, AMBIENT_EMAIL)
    );
}

#[test]
fn negative_offsets_are_recorded() {
    let test_repo = TestRepo::init();
    let offset: UtcOffset = "-0330".parse().unwrap();
    let repository = GitRepository::open(test_repo.dir.path(), None, offset).unwrap();

    repository
        .update_file("abc100/A/Main.cpp", 100, b"x\n", "Update abc100/A/Main.cpp")
        .unwrap();

    assert_eq!(test_repo.dates(), vec!["100 -0330|100 -0330"]);
    assert_ok_eq!(repository.has_update("abc100/A/Main.cpp", 100), true);
}

#[test]
fn paths_outside_the_work_tree_are_refused() {
    let test_repo = TestRepo::init();
    let repository = test_repo.open(None);

    assert!(
        repository
            .update_file("../escape/Main.cpp", 100, b"x\n", "nope")
            .is_err()
    );
    assert_eq!(test_repo.commit_count(), 0);
}
