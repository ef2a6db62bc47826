//! Integration tests for probe bookkeeping and offline alerting.
//!
//! A local TCP listener stands in for the webhook receiver and counts
//! how many deliveries actually arrive.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use gatekeep_db::models::access_point::{AccessPoint, CreateAccessPoint};
use gatekeep_db::repositories::AccessPointRepo;
use gatekeep_monitor::{record_outcome, AlertSender, ProbeOutcome, Transition};
use sqlx::PgPool;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Spawn a webhook stand-in that counts accepted requests.
///
/// Replies with `connection: close` so every delivery opens its own
/// socket and the accept count equals the delivery count.
async fn counting_webhook() -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind webhook listener");
    let url = format!("http://{}/hook", listener.local_addr().unwrap());
    let hits = Arc::new(AtomicUsize::new(0));

    let counter = hits.clone();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            counter.fetch_add(1, Ordering::SeqCst);
            read_request(&mut socket).await;
            let _ = socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                )
                .await;
        }
    });

    (url, hits)
}

/// Drain one HTTP request (headers plus content-length body).
async fn read_request(socket: &mut TcpStream) {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => data.extend_from_slice(&buf[..n]),
        }
        let Some(header_end) = data.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let headers = String::from_utf8_lossy(&data[..header_end]).to_lowercase();
        let body_len: usize = headers
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0);
        if data.len() >= header_end + 4 + body_len {
            return;
        }
    }
}

async fn wait_for_hits(hits: &AtomicUsize, expected: usize) {
    for _ in 0..60 {
        if hits.load(Ordering::SeqCst) >= expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("webhook never reached {expected} deliveries");
}

async fn make_ap(pool: &PgPool) -> AccessPoint {
    AccessPointRepo::create(
        pool,
        &CreateAccessPoint {
            name: "AP-Test".into(),
            ip_address: "10.0.0.40".into(),
            location: None,
        },
    )
    .await
    .expect("create access point")
}

async fn refetch(pool: &PgPool, id: i64) -> AccessPoint {
    AccessPointRepo::find_by_id(pool, id)
        .await
        .expect("fetch access point")
        .expect("access point exists")
}

#[sqlx::test(migrations = "../db/migrations")]
async fn offline_transition_delivers_exactly_one_alert(pool: PgPool) {
    let (url, hits) = counting_webhook().await;
    let sender = AlertSender::new();

    let ap = make_ap(&pool).await;
    // Mark it online first so the drop counts as a transition.
    AccessPointRepo::update_probe_result(&pool, ap.id, true, Some(3), chrono::Utc::now())
        .await
        .unwrap();

    let ap = refetch(&pool, ap.id).await;
    let report = record_outcome(&pool, &sender, &url, ap, ProbeOutcome::OFFLINE).await;
    assert_eq!(report.transition, Transition::WentOffline);
    wait_for_hits(&hits, 1).await;

    // Staying offline raises nothing new.
    let ap = refetch(&pool, report.ap_id).await;
    let report = record_outcome(&pool, &sender, &url, ap, ProbeOutcome::OFFLINE).await;
    assert_eq!(report.transition, Transition::None);
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    // Recovery is recorded but never alerted.
    let ap = refetch(&pool, report.ap_id).await;
    let online = ProbeOutcome {
        online: true,
        latency_ms: Some(4),
    };
    let report = record_outcome(&pool, &sender, &url, ap, online).await;
    assert_eq!(report.transition, Transition::CameOnline);
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    // The stored state followed the outcomes.
    let ap = refetch(&pool, report.ap_id).await;
    assert_eq!(ap.is_online, Some(true));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn first_probe_offline_raises_no_alert(pool: PgPool) {
    let (url, hits) = counting_webhook().await;
    let sender = AlertSender::new();

    // Never probed before: is_online is NULL, so there is no
    // transition to report even though the AP is down.
    let ap = make_ap(&pool).await;
    let report = record_outcome(&pool, &sender, &url, ap, ProbeOutcome::OFFLINE).await;
    assert_eq!(report.transition, Transition::None);

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}
