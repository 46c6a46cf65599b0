//! Full pass against a local stand-in for the account site, over real HTTP.

mod common;

use common::account_server::{self, account_page, ServerOptions, PASSWORD, USERNAME};
use qfetch_core::rapidhost::RapidhostClient;
use qfetch_core::remote::RemoteAccount;
use qfetch_core::scheduler::{run_pass, FailureKind, GroupFilter, SchedulerSettings};
use qfetch_core::transfer::CurlFetcher;

#[test]
fn pass_downloads_verifies_and_deletes_over_http() {
    let server = account_server::start(
        |base| {
            account_page(
                "10 MB",
                &[
                    ("201", "release", vec![(format!("{base}files/big.bin"), "19.53 KB")]),
                    ("202", "broken", vec![(format!("{base}files/tiny.bin"), "0.1 KB")]),
                ],
            )
        },
        &[("big.bin", vec![7u8; 20_000]), ("tiny.bin", vec![1u8; 100])],
    );
    let dir = tempfile::tempdir().unwrap();
    let client = RapidhostClient::new(&server.base_url, USERNAME, PASSWORD).unwrap();
    let settings = SchedulerSettings::new(dir.path());

    let report = run_pass(&client, &CurlFetcher::default(), &settings, &GroupFilter::None).unwrap();

    assert_eq!(report.quota_at_start, 10 * 1024 * 1024);
    assert_eq!(report.deleted, vec!["201".to_string()]);
    assert_eq!(server.delete_bodies(), vec!["ids%5B%5D=201".to_string()]);
    assert_eq!(server.logins(), 1);

    let big = dir.path().join("big.bin");
    assert_eq!(std::fs::metadata(&big).unwrap().len(), 20_000);
    assert!(!dir.path().join("tiny.bin").exists());

    let broken = report.groups.iter().find(|g| g.key.id == "202").unwrap();
    assert_eq!(
        broken.failures[0].kind,
        FailureKind::TransferTooSmall {
            actual: 100,
            minimum: 7000
        }
    );
}

#[test]
fn missing_remote_file_fails_the_transfer() {
    let server = account_server::start(
        |base| {
            account_page(
                "1 GB",
                &[("301", "gone", vec![(format!("{base}files/nowhere.bin"), "1 MB")])],
            )
        },
        &[],
    );
    let dir = tempfile::tempdir().unwrap();
    let client = RapidhostClient::new(&server.base_url, USERNAME, PASSWORD).unwrap();

    let report = run_pass(
        &client,
        &CurlFetcher::default(),
        &SchedulerSettings::new(dir.path()),
        &GroupFilter::None,
    )
    .unwrap();

    let kind = &report.groups[0].failures[0].kind;
    assert_eq!(kind.label(), "transfer_failed");
    assert!(!dir.path().join("nowhere.bin").exists());
    assert!(server.delete_bodies().is_empty());
}

#[test]
fn wrong_password_fails_the_refresh() {
    let server = account_server::start(|_| account_page("1 GB", &[]), &[]);
    let client = RapidhostClient::new(&server.base_url, USERNAME, "wrong").unwrap();
    let err = client.fetch_snapshot().unwrap_err();
    assert!(format!("{err:#}").contains("403"));
}

#[test]
fn session_is_reused_across_refreshes() {
    let server = account_server::start(|_| account_page("2 GB", &[]), &[]);
    let client = RapidhostClient::new(&server.base_url, USERNAME, PASSWORD).unwrap();
    for _ in 0..3 {
        let snap = client.fetch_snapshot().unwrap();
        assert_eq!(snap.quota_text.as_deref(), Some("2 GB"));
    }
    assert_eq!(server.logins(), 1);
}

#[test]
fn login_without_session_is_an_error_not_an_empty_account() {
    let server = account_server::start_with_options(
        |_| account_page("2 GB", &[]),
        &[],
        ServerOptions {
            grant_session: false,
        },
    );
    let client = RapidhostClient::new(&server.base_url, USERNAME, "whatever").unwrap();

    let err = client.fetch_snapshot().unwrap_err();

    assert!(format!("{err:#}").contains("no session after login"), "{err:#}");
    // Lazy login plus one forced re-login.
    assert_eq!(server.logins(), 2);
}

#[test]
fn delete_on_fresh_client_logs_in_first() {
    let server = account_server::start(|_| account_page("2 GB", &[]), &[]);
    let client = RapidhostClient::new(&server.base_url, USERNAME, PASSWORD).unwrap();

    client.delete_group("401").unwrap();

    assert_eq!(server.logins(), 1);
    assert_eq!(server.delete_bodies(), vec!["ids%5B%5D=401".to_string()]);
}
