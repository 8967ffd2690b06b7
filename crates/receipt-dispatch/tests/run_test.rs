//! Whole-run setup behaviour against a loopback stub of the document service:
//! which failures abort the run, and what a dry run touches.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use receipt_dispatch::auth::BearerToken;
use receipt_dispatch::config::{ApiConfig, RosterConfig, ShareConfig};
use receipt_dispatch::{run, run_with_roster, DispatchConfig, FileOutcome, FlowKind};
use routing::{FolderId, Roster, RosterEntry, RoutingConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

type RequestLog = Arc<Mutex<Vec<String>>>;

fn content_length(head: &str) -> usize {
    head.lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse().ok())
        .unwrap_or(0)
}

/// Serve `routes` (method + path, status, body); unknown routes 404.
/// Returns the base URL and the `METHOD /path` line of every request.
async fn spawn_stub(routes: Vec<(&'static str, u16, String)>) -> (String, RequestLog) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen: RequestLog = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap_or(0);
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
                if let Some(end) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                    let head = String::from_utf8_lossy(&raw[..end]).into_owned();
                    if raw.len() >= end + 4 + content_length(&head) {
                        break;
                    }
                }
            }
            let text = String::from_utf8_lossy(&raw).into_owned();
            let request_line: String = text
                .split_whitespace()
                .take(2)
                .collect::<Vec<_>>()
                .join(" ");
            log.lock().unwrap().push(request_line.clone());

            let (status, body) = routes
                .iter()
                .find(|(route, _, _)| *route == request_line)
                .map(|(_, s, b)| (*s, b.clone()))
                .unwrap_or((404, String::new()));
            let reason = match status {
                200 => "OK",
                401 => "Unauthorized",
                404 => "Not Found",
                _ => "Internal Server Error",
            };
            let response = format!(
                "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (format!("http://{addr}"), seen)
}

fn listing(items: &[(i64, &str)]) -> String {
    let data: Vec<_> = items
        .iter()
        .map(|(id, label)| serde_json::json!({"id": id, "label": label}))
        .collect();
    serde_json::json!({ "data": data }).to_string()
}

fn config(base_url: &str, roster_path: PathBuf, share: &Path) -> DispatchConfig {
    DispatchConfig {
        api: ApiConfig {
            base_url: base_url.to_string(),
            email: "rh@example.com".to_string(),
            password: "secret".to_string(),
            timeout_secs: 5,
            ..ApiConfig::default()
        },
        routing: RoutingConfig {
            system_root_id: FolderId(1),
            ..RoutingConfig::default()
        },
        roster: RosterConfig { path: roster_path },
        shares: vec![ShareConfig {
            path: share.to_path_buf(),
            sector: None,
            flow: FlowKind::Payroll,
        }],
        ..DispatchConfig::default()
    }
}

fn roster() -> Roster {
    [RosterEntry {
        full_name: "ANA LIMA".to_string(),
        display_name: "Ana Lima".to_string(),
        tax_id: "12345678901".to_string(),
        phone: "55(11)98765-4321".to_string(),
        email: "ana@example.com".to_string(),
    }]
    .into_iter()
    .collect()
}

fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

fn listing_requests(log: &RequestLog) -> usize {
    log.lock()
        .unwrap()
        .iter()
        .filter(|line| line.contains("/storage/"))
        .count()
}

#[tokio::test]
async fn test_rejected_login_aborts_before_any_listing() {
    let (base, log) = spawn_stub(vec![(
        "POST /login",
        401,
        r#"{"message":"invalid credentials"}"#.to_string(),
    )])
    .await;
    let dir = tempfile::tempdir().unwrap();
    let config = config(&base, dir.path().join("roster.xlsx"), dir.path());

    let err = run(&config, FlowKind::Payroll, false).await.unwrap_err();

    assert!(format!("{err:#}").contains("401"));
    assert_eq!(*log.lock().unwrap(), vec!["POST /login".to_string()]);
}

#[tokio::test]
async fn test_unreadable_roster_aborts_after_login() {
    let (base, log) = spawn_stub(vec![(
        "POST /login",
        200,
        r#"{"accessToken":{"token":"jwt"}}"#.to_string(),
    )])
    .await;
    let dir = tempfile::tempdir().unwrap();
    let config = config(&base, dir.path().join("missing.xlsx"), dir.path());

    let err = run(&config, FlowKind::Payroll, false).await.unwrap_err();

    assert!(format!("{err:#}").contains("missing.xlsx"));
    assert_eq!(listing_requests(&log), 0);
}

#[tokio::test]
async fn test_empty_roster_aborts_before_any_listing() {
    let (base, log) = spawn_stub(vec![]).await;
    let dir = tempfile::tempdir().unwrap();
    let config = config(&base, dir.path().join("roster.xlsx"), dir.path());

    let err = run_with_roster(
        &config,
        FlowKind::Payroll,
        false,
        client(),
        BearerToken::new("jwt"),
        &Roster::new(),
    )
    .await
    .unwrap_err();

    assert!(err.to_string().contains("no employees"));
    assert_eq!(listing_requests(&log), 0);
}

#[tokio::test]
async fn test_failed_root_listing_aborts() {
    let (base, _) = spawn_stub(vec![(
        "GET /storage/folder/1/folders",
        500,
        "{}".to_string(),
    )])
    .await;
    let dir = tempfile::tempdir().unwrap();
    let config = config(&base, dir.path().join("roster.xlsx"), dir.path());

    let err = run_with_roster(
        &config,
        FlowKind::Payroll,
        false,
        client(),
        BearerToken::new("jwt"),
        &roster(),
    )
    .await
    .unwrap_err();

    let message = format!("{err:#}");
    assert!(message.contains("root folder 1"));
    assert!(message.contains("500"));
}

#[tokio::test]
async fn test_root_without_sectors_aborts() {
    let (base, _) = spawn_stub(vec![(
        "GET /storage/folder/1/folders",
        200,
        listing(&[]),
    )])
    .await;
    let dir = tempfile::tempdir().unwrap();
    let config = config(&base, dir.path().join("roster.xlsx"), dir.path());

    let err = run_with_roster(
        &config,
        FlowKind::Payroll,
        false,
        client(),
        BearerToken::new("jwt"),
        &roster(),
    )
    .await
    .unwrap_err();

    assert!(err.to_string().contains("no sector folders"));
}

#[tokio::test]
async fn test_dry_run_resolves_over_http_and_leaves_files() {
    let (base, log) = spawn_stub(vec![
        ("GET /storage/folder/1/folders", 200, listing(&[(10, "MATRIZ")])),
        ("GET /storage/folder/10/folders", 200, listing(&[(11, "Ana Lima")])),
        ("GET /storage/folder/11/folders", 200, listing(&[(111, "RECIBOS")])),
    ])
    .await;
    let dir = tempfile::tempdir().unwrap();
    let share = dir.path().join("FOLHA MATRIZ");
    let period = share.join("2024").join("03-2024");
    fs::create_dir_all(&period).unwrap();
    fs::write(period.join("ANA_LIMA_RECIBO.pdf"), b"%PDF-1.4").unwrap();
    let config = config(&base, dir.path().join("roster.xlsx"), &share);

    let report = run_with_roster(
        &config,
        FlowKind::Payroll,
        true,
        client(),
        BearerToken::new("jwt"),
        &roster(),
    )
    .await
    .unwrap();

    assert_eq!(report.files.len(), 1);
    assert_eq!(
        report.files[0].outcome,
        FileOutcome::Resolved {
            employee: "ANA LIMA".into(),
            folder: FolderId(111)
        }
    );
    assert!(report.finished_at.is_some());
    assert!(period.join("ANA_LIMA_RECIBO.pdf").exists());
    assert!(!log
        .lock()
        .unwrap()
        .iter()
        .any(|line| line.contains("subscriptionFlow")));
}
