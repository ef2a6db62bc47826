//! Integration tests for repository invariants that only show up
//! against a real database: the ping-history bound and the
//! all-or-nothing details snapshot replace.

use chrono::{Duration, Utc};
use gatekeep_core::wire::{ConnectionRecord, DnsRecord};
use gatekeep_db::models::access_point::CreateAccessPoint;
use gatekeep_db::repositories::dns_repo::replace_details_snapshot;
use gatekeep_db::repositories::{
    AccessPointRepo, ConnectionRepo, DnsRepo, PingHistoryRepo, SettingRepo,
};
use sqlx::PgPool;

async fn make_ap(pool: &PgPool) -> i64 {
    AccessPointRepo::create(
        pool,
        &CreateAccessPoint {
            name: "AP".to_string(),
            ip_address: "10.0.0.40".to_string(),
            location: None,
        },
    )
    .await
    .expect("create ap")
    .id
}

#[sqlx::test(migrations = "./migrations")]
async fn ping_history_never_exceeds_limit(pool: PgPool) {
    let ap_id = make_ap(&pool).await;

    // Insert well past the limit, evicting after each append the way
    // the monitor does.
    let base = Utc::now() - Duration::hours(6);
    for i in 0..230 {
        let checked_at = base + Duration::minutes(i);
        PingHistoryRepo::insert(&pool, ap_id, i % 7 != 0, Some(5), checked_at)
            .await
            .unwrap();
        PingHistoryRepo::evict_beyond_limit(&pool, ap_id).await.unwrap();
    }

    assert_eq!(PingHistoryRepo::count_for_ap(&pool, ap_id).await.unwrap(), 200);

    // The survivors are the newest rows.
    let recent = PingHistoryRepo::recent(&pool, ap_id, 1).await.unwrap();
    assert_eq!(recent[0].checked_at, base + Duration::minutes(229));
}

#[sqlx::test(migrations = "./migrations")]
async fn eviction_is_per_access_point(pool: PgPool) {
    let first = make_ap(&pool).await;
    let second = make_ap(&pool).await;

    let now = Utc::now();
    for i in 0..10 {
        PingHistoryRepo::insert(&pool, first, true, None, now + Duration::seconds(i))
            .await
            .unwrap();
    }
    PingHistoryRepo::insert(&pool, second, true, None, now).await.unwrap();

    PingHistoryRepo::evict_beyond_limit(&pool, first).await.unwrap();

    assert_eq!(PingHistoryRepo::count_for_ap(&pool, first).await.unwrap(), 10);
    assert_eq!(PingHistoryRepo::count_for_ap(&pool, second).await.unwrap(), 1);
}

fn connection(src: &str) -> ConnectionRecord {
    ConnectionRecord {
        src_ip: src.to_string(),
        dst_ip: "1.1.1.1".to_string(),
        dst_port: Some(443),
        bytes_orig: 10,
        bytes_reply: 20,
    }
}

fn dns(domain: &str) -> DnsRecord {
    DnsRecord {
        domain: domain.to_string(),
        ip_address: Some("1.2.3.4".to_string()),
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn failed_snapshot_replace_preserves_previous_data(pool: PgPool) {
    let recorded_at = Utc::now();
    replace_details_snapshot(
        &pool,
        "r1",
        &[connection("10.0.0.5"), connection("10.0.0.6")],
        &[dns("example.com")],
        recorded_at,
    )
    .await
    .unwrap();

    // A router name wider than the column blows up mid-transaction.
    let oversized = "x".repeat(200);
    let result = replace_details_snapshot(
        &pool,
        &oversized,
        &[connection("10.0.0.9")],
        &[dns("other.example")],
        Utc::now(),
    )
    .await;
    assert!(result.is_err());

    // The prior snapshot is fully intact, including both tables.
    let connections = ConnectionRepo::list_all(&pool).await.unwrap();
    assert_eq!(connections.len(), 2);
    assert!(connections.iter().all(|c| c.recorded_at == recorded_at));

    let dns_rows = DnsRepo::list_all(&pool).await.unwrap();
    assert_eq!(dns_rows.len(), 1);
    assert_eq!(dns_rows[0].domain, "example.com");
}

#[sqlx::test(migrations = "./migrations")]
async fn oversized_snapshot_batches_are_chunked(pool: PgPool) {
    // 11,000 rows at 7 binds each would need 77,000 parameters in one
    // statement, past the Postgres 65,535 cap. The insert must split.
    let connections: Vec<ConnectionRecord> = (0..11_000)
        .map(|i| connection(&format!("10.{}.{}.{}", i / 65536, (i / 256) % 256, i % 256)))
        .collect();

    replace_details_snapshot(&pool, "r1", &connections, &[], Utc::now())
        .await
        .unwrap();

    assert_eq!(ConnectionRepo::list_all(&pool).await.unwrap().len(), 11_000);
}

#[sqlx::test(migrations = "./migrations")]
async fn settings_upsert_overwrites(pool: PgPool) {
    SettingRepo::set(&pool, "alert_webhook_url", "https://hooks.example/a")
        .await
        .unwrap();
    SettingRepo::set(&pool, "alert_webhook_url", "https://hooks.example/b")
        .await
        .unwrap();

    let value = SettingRepo::get(&pool, "alert_webhook_url").await.unwrap();
    assert_eq!(value.as_deref(), Some("https://hooks.example/b"));
}
