use crate::helpers::{FakeDetails, FakeSource, TestRepo, accepted};
use atcoder_git::repository::Repository;
use atcoder_git::sync::{SyncDriver, SyncReport};
use claims::assert_ok_eq;

#[test]
fn two_submissions_to_one_path_become_two_commits() {
    let test_repo = TestRepo::init();
    let repository = test_repo.open(None);
    let source = FakeSource {
        submissions: vec![accepted(2, 200), accepted(1, 100)],
    };
    let driver = SyncDriver::new(source, FakeDetails::default());

    let report = driver.sync(&repository, "tourist").unwrap();

    assert_eq!(
        report,
        SyncReport {
            committed: 2,
            already_recorded: 0,
            not_accepted: 0
        }
    );
    assert_eq!(test_repo.dates(), vec!["100 +0900|100 +0900", "200 +0900|200 +0900"]);
    assert_eq!(test_repo.read("abc100/A/Main.cpp"), b"code of 2\n");
    assert_eq!(
        test_repo.git(&["log", "-1", "--pretty=format:%B"]).trim_end(),
        "Update abc100/A/Main.cpp\n\nhttps://atcoder.jp/contests/abc100/submissions/2"
    );
    assert_eq!(
        test_repo.git(&["show", "HEAD~1:abc100/A/Main.cpp"]),
        "code of 1\n"
    );
}

#[test]
fn rerunning_sync_adds_no_commits() {
    let test_repo = TestRepo::init();
    let repository = test_repo.open(None);
    let source = FakeSource {
        submissions: vec![accepted(1, 100), accepted(2, 200)],
    };
    let details = FakeDetails::default();
    let driver = SyncDriver::new(source, &details);

    driver.sync(&repository, "tourist").unwrap();
    let head = test_repo.git(&["rev-parse", "HEAD"]);
    let report = driver.sync(&repository, "tourist").unwrap();

    assert_eq!(report.committed, 0);
    assert_eq!(report.already_recorded, 2);
    assert_eq!(test_repo.commit_count(), 2);
    assert_eq!(test_repo.git(&["rev-parse", "HEAD"]), head);
    assert_eq!(*details.requested.borrow(), vec![1, 2]);
}

#[test]
fn interrupted_sync_resumes_where_it_stopped() {
    let test_repo = TestRepo::init();
    let repository = test_repo.open(None);

    let earlier = SyncDriver::new(
        FakeSource {
            submissions: vec![accepted(1, 100)],
        },
        FakeDetails::default(),
    );
    earlier.sync(&repository, "tourist").unwrap();

    let details = FakeDetails::default();
    let later = SyncDriver::new(
        FakeSource {
            submissions: vec![accepted(1, 100), accepted(2, 200), accepted(3, 300)],
        },
        &details,
    );
    let report = later.sync(&repository, "tourist").unwrap();

    assert_eq!(report.committed, 2);
    assert_eq!(report.already_recorded, 1);
    assert_eq!(*details.requested.borrow(), vec![2, 3]);
    assert_eq!(test_repo.commit_count(), 3);
    assert_ok_eq!(repository.has_update("abc100/A/Main.cpp", 300), true);
}

#[test]
fn rejected_submissions_are_not_committed() {
    let test_repo = TestRepo::init();
    let repository = test_repo.open(None);
    let mut wrong = accepted(1, 100);
    wrong.result = "WA".to_owned();
    let source = FakeSource {
        submissions: vec![wrong, accepted(2, 200)],
    };

    let report = SyncDriver::new(source, FakeDetails::default())
        .sync(&repository, "tourist")
        .unwrap();

    assert_eq!(report.not_accepted, 1);
    assert_eq!(test_repo.dates(), vec!["200 +0900|200 +0900"]);
}
