//! Benchmark tests for critical operations
//!
//! Run with: cargo test --release -- --ignored --nocapture bench

use std::time::Instant;

use tempfile::NamedTempFile;

use tglinks::config::Config;
use tglinks::database::{init_db, AppState};
use tglinks::listing::{paginate, LinkQuery, ListParams, FEED_PAGE_SIZE};
use tglinks::model::{LinkInput, LinkType};
use tglinks::store::Counter;

/// Benchmark helper to measure execution time
fn benchmark<F>(name: &str, iterations: usize, mut f: F)
where
    F: FnMut(usize),
{
    let start = Instant::now();

    for i in 0..iterations {
        f(i);
    }

    let duration = start.elapsed();
    let avg_ms = duration.as_secs_f64() * 1000.0 / iterations as f64;
    let ops_per_sec = (iterations as f64 / duration.as_secs_f64()) as u64;

    println!("  {} ({} iterations)", name, iterations);
    println!("    Total time: {:?}", duration);
    println!("    Avg time: {:.3}ms", avg_ms);
    println!("    Throughput: {} ops/sec\n", ops_per_sec);
}

fn setup_state() -> (AppState, NamedTempFile) {
    let temp_db = NamedTempFile::new().unwrap();
    let db = init_db(temp_db.path().to_str().unwrap()).unwrap();
    (AppState::new(db, Config::default()), temp_db)
}

fn input(i: usize) -> LinkInput {
    LinkInput {
        title: format!("Bench Group {i}"),
        url: format!("https://t.me/bench{i}"),
        description: if i % 3 == 0 { "python talk".to_string() } else { String::new() },
        link_type: if i % 2 == 0 { LinkType::Group } else { LinkType::Channel },
        category: if i % 2 == 0 { "programming" } else { "news" }.to_string(),
    }
}

#[test]
#[ignore] // Run explicitly with: cargo test bench --release -- --ignored --nocapture
fn bench_create_links() {
    println!("\n=== Benchmark: Create links ===\n");

    let (state, _db) = setup_state();
    let user = state
        .store
        .create_user("bench_user", "not-a-password-hash".to_string())
        .unwrap();

    benchmark("Create link", 1000, |i| {
        state.store.create_link(&user.id, input(i)).unwrap();
    });
}

#[test]
#[ignore]
fn bench_home_feed() {
    println!("\n=== Benchmark: Home feed ===\n");

    let (state, _db) = setup_state();
    let user = state
        .store
        .create_user("bench_user", "not-a-password-hash".to_string())
        .unwrap();
    for i in 0..5000 {
        state.store.create_link(&user.id, input(i)).unwrap();
    }

    let plain = LinkQuery::default();
    benchmark("Recent, first page (5000 links)", 100, |_| {
        let links = plain.apply(state.store.active_links().unwrap());
        paginate(links, FEED_PAGE_SIZE, None);
    });

    let filtered = LinkQuery::from_params(&ListParams {
        search: Some("python".to_string()),
        category: Some("programming".to_string()),
        sort: Some("popular".to_string()),
        ..Default::default()
    });
    benchmark("Search + category + popular (5000 links)", 100, |_| {
        let links = filtered.apply(state.store.active_links().unwrap());
        paginate(links, FEED_PAGE_SIZE, Some("3"));
    });

    benchmark("Owner feed (5000 links)", 100, |_| {
        state.store.links_by_owner(&user.id).unwrap();
    });
}

#[test]
#[ignore]
fn bench_counters() {
    println!("\n=== Benchmark: Counters ===\n");

    let (state, _db) = setup_state();
    let user = state
        .store
        .create_user("bench_user", "not-a-password-hash".to_string())
        .unwrap();
    let link = state.store.create_link(&user.id, input(0)).unwrap();

    benchmark("Record view", 1000, |_| {
        state.store.record_view(&link.hash_id).unwrap();
    });

    benchmark("Bump likes counter", 1000, |_| {
        state.store.bump_counter(&link.hash_id, Counter::Likes, 1).unwrap();
    });

    benchmark("Toggle like", 1000, |_| {
        state.store.toggle_like(&link.hash_id, &user.id).unwrap();
    });
}
