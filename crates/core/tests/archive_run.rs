//! End-to-end archive runs: SQLite registry, OAuth issuer and HTTP trigger
//! client against the stub server, with real storage sinks.

mod common;

use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use common::StubServer;
use object_store::{memory::InMemory, path::Path as ObjectPath, ObjectStore};
use tempfile::TempDir;
use trigger_archiver_core::{
    testing::{fixtures, MockRegistry, MockStorageSink, MockTokenIssuer, MockTriggerClient},
    ArchiveConfig, ArchiveError, ArchiveOrchestrator, ClientErrorPolicy, HttpTriggerClient,
    LocalStorageSink, OAuthTokenIssuer, ObjectStoreSink, SqliteRegistry, StorageSink, TokenConfig,
    TriggerConfig, TriggerError,
};

fn run_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
}

/// Registry with clients 1-4:
/// 1 has no credential, 2 uses credential 7, 3 points at a missing
/// credential, 4 has no credential.
fn seeded_registry(server: &StubServer) -> SqliteRegistry {
    let conn = fixtures::registry_connection();
    fixtures::insert_client(&conn, 1, "Acme", None);
    fixtures::insert_client(&conn, 2, "Globex", Some(7));
    fixtures::insert_client(&conn, 3, "Initech", Some(99));
    fixtures::insert_client(&conn, 4, "Umbrella", None);
    fixtures::insert_credential(&conn, 7, "globex-service", "s3cret", &server.token_url());

    SqliteRegistry::from_connection(conn, fixtures::CLIENTS_QUERY).unwrap()
}

fn orchestrator(
    server: &StubServer,
    storage: Arc<dyn StorageSink>,
    policy: ClientErrorPolicy,
) -> ArchiveOrchestrator {
    let registry = Arc::new(seeded_registry(server));

    let issuer = OAuthTokenIssuer::new(
        registry.clone(),
        TokenConfig {
            url_template: None,
            scope: None,
            timeout_secs: 5,
        },
    );
    let trigger = HttpTriggerClient::new(TriggerConfig {
        base_url: server.base_url.clone(),
        timeout_secs: 5,
    });

    ArchiveOrchestrator::new(
        ArchiveConfig {
            on_client_error: policy,
            ..ArchiveConfig::default()
        },
        registry,
        Arc::new(issuer),
        Arc::new(trigger),
        storage,
    )
}

fn read_key(dir: &TempDir, key: &str) -> Option<String> {
    std::fs::read_to_string(dir.path().join(Path::new(key))).ok()
}

#[tokio::test]
async fn test_full_run_to_local_disk() {
    let server = StubServer::start().await;
    server.set_trigger_response(1, 200, r#"{"ok":true}"#);
    server.set_trigger_response(2, 200, r#"{"data":1}"#);
    server.set_trigger_response(3, 200, "[]");
    server.set_trigger_response(4, 200, r#"{"late":true}"#);

    let dir = TempDir::new().unwrap();
    let sink = Arc::new(LocalStorageSink::new(dir.path()));
    let orch = orchestrator(&server, sink, ClientErrorPolicy::Abort);

    let summary = orch.run_archive_on(run_date()).await.unwrap();

    assert!(summary.is_success());
    assert_eq!(summary.run_date, "20240115");
    let ids: Vec<i64> = summary.archived.iter().map(|a| a.client_id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);

    assert_eq!(
        read_key(&dir, "trigger/1/file/1_trigger_20240115.json").as_deref(),
        Some(r#"{"ok":true}"#)
    );
    assert_eq!(
        read_key(&dir, "trigger/2/file/2_trigger_20240115.json").as_deref(),
        Some(r#"{"data":1}"#)
    );
    assert_eq!(
        read_key(&dir, "trigger/3/file/3_trigger_20240115.json").as_deref(),
        Some("[]")
    );

    // Only client 2 resolved a token
    let requests = server.trigger_requests();
    let auth: Vec<(Option<String>, Option<String>)> = requests
        .into_iter()
        .map(|r| (r.client_id, r.authorization))
        .collect();
    assert_eq!(
        auth,
        vec![
            (Some("1".to_string()), None),
            (Some("2".to_string()), Some("Bearer tok123".to_string())),
            (Some("3".to_string()), None),
            (Some("4".to_string()), None),
        ]
    );

    assert_eq!(server.token_requests().len(), 1);
    assert!(!summary.archived[0].authenticated);
    assert!(summary.archived[1].authenticated);
    assert!(!summary.archived[2].authenticated);
}

#[tokio::test]
async fn test_trigger_failure_aborts_before_later_clients() {
    let server = StubServer::start().await;
    server.set_trigger_response(2, 500, "boom");

    let dir = TempDir::new().unwrap();
    let sink = Arc::new(LocalStorageSink::new(dir.path()));
    let orch = orchestrator(&server, sink, ClientErrorPolicy::Abort);

    let err = orch.run_archive_on(run_date()).await.unwrap_err();

    assert_eq!(err.client_id(), Some(2));
    assert!(matches!(
        err,
        ArchiveError::Trigger {
            source: TriggerError::FetchFailed { status: 500 },
            ..
        }
    ));

    // Client 1 stays archived, nothing for 2 and later
    assert!(read_key(&dir, "trigger/1/file/1_trigger_20240115.json").is_some());
    assert!(read_key(&dir, "trigger/2/file/2_trigger_20240115.json").is_none());
    assert!(read_key(&dir, "trigger/3/file/3_trigger_20240115.json").is_none());
    assert!(read_key(&dir, "trigger/4/file/4_trigger_20240115.json").is_none());

    let fetched: Vec<Option<String>> = server
        .trigger_requests()
        .into_iter()
        .map(|r| r.client_id)
        .collect();
    assert_eq!(fetched, vec![Some("1".to_string()), Some("2".to_string())]);
}

#[tokio::test]
async fn test_continue_policy_archives_remaining_clients() {
    let server = StubServer::start().await;
    server.set_trigger_response(2, 503, "unavailable");

    let dir = TempDir::new().unwrap();
    let sink = Arc::new(LocalStorageSink::new(dir.path()));
    let orch = orchestrator(&server, sink, ClientErrorPolicy::Continue);

    let summary = orch.run_archive_on(run_date()).await.unwrap();

    assert!(!summary.is_success());
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].client_id, 2);
    assert!(summary.failed[0].error.contains("503"));

    let ids: Vec<i64> = summary.archived.iter().map(|a| a.client_id).collect();
    assert_eq!(ids, vec![1, 3, 4]);
    assert!(read_key(&dir, "trigger/4/file/4_trigger_20240115.json").is_some());
}

#[tokio::test]
async fn test_rerun_overwrites_same_keys() {
    let server = StubServer::start().await;
    server.set_trigger_response(1, 200, "first");

    let dir = TempDir::new().unwrap();
    let sink = Arc::new(LocalStorageSink::new(dir.path()));
    let orch = orchestrator(&server, sink, ClientErrorPolicy::Abort);

    orch.run_archive_on(run_date()).await.unwrap();
    server.set_trigger_response(1, 200, "second");
    let summary = orch.run_archive_on(run_date()).await.unwrap();

    assert_eq!(
        read_key(&dir, "trigger/1/file/1_trigger_20240115.json").as_deref(),
        Some("second")
    );
    assert_eq!(summary.archived.len(), 4);

    let files = std::fs::read_dir(dir.path().join("trigger/1/file"))
        .unwrap()
        .count();
    assert_eq!(files, 1);
}

#[tokio::test]
async fn test_full_run_to_object_store() {
    let server = StubServer::start().await;
    server.set_trigger_response(2, 200, r#"{"data":1}"#);

    let store = Arc::new(InMemory::new());
    let sink = Arc::new(ObjectStoreSink::new(store.clone(), "archive-bucket"));
    let orch = orchestrator(&server, sink, ClientErrorPolicy::Abort);

    let summary = orch.run_archive_on(run_date()).await.unwrap();

    assert_eq!(
        summary.archived[1].location,
        "s3://archive-bucket/trigger/2/file/2_trigger_20240115.json"
    );

    let object = store
        .get(&ObjectPath::from("trigger/2/file/2_trigger_20240115.json"))
        .await
        .unwrap()
        .bytes()
        .await
        .unwrap();
    assert_eq!(&object[..], br#"{"data":1}"#);
}

#[tokio::test]
async fn test_token_endpoint_rejection_still_fetches_unauthenticated() {
    let server = StubServer::start().await;
    server.set_token_response(401, r#"{"error":"invalid_client"}"#);

    let dir = TempDir::new().unwrap();
    let sink = Arc::new(LocalStorageSink::new(dir.path()));
    let orch = orchestrator(&server, sink, ClientErrorPolicy::Abort);

    let summary = orch.run_archive_on(run_date()).await.unwrap();

    assert_eq!(summary.archived.len(), 4);
    assert!(!summary.archived[1].authenticated);
    assert!(server
        .trigger_requests()
        .iter()
        .all(|r| r.authorization.is_none()));
}

#[test]
fn test_registry_failure_is_fatal() {
    let issuer = Arc::new(MockTokenIssuer::new());
    let trigger = Arc::new(MockTriggerClient::new());
    let storage = Arc::new(MockStorageSink::new());

    let orch = ArchiveOrchestrator::new(
        ArchiveConfig {
            on_client_error: ClientErrorPolicy::Continue,
            ..ArchiveConfig::default()
        },
        Arc::new(MockRegistry::failing("database is locked")),
        issuer.clone(),
        trigger.clone(),
        storage.clone(),
    );

    let err = tokio_test::block_on(orch.run_archive_on(run_date())).unwrap_err();

    assert!(matches!(err, ArchiveError::Registry(_)));
    assert!(tokio_test::block_on(trigger.recorded_fetches()).is_empty());
    assert_eq!(tokio_test::block_on(storage.upload_count()), 0);
}
