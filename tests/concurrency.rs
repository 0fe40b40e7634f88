#![cfg(feature = "mysql")]

mod common;

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use common::{FOREIGN_KEYS, MockConnection, mysql_column, mysql_fk};
use schemata::prelude::*;

const THREADS: usize = 8;

fn slow_server() -> MockConnection {
    MockConnection::mysql("8.0.33")
        .delay(Duration::from_millis(20))
        .on(
            r"^SHOW FULL COLUMNS FROM `orders`",
            vec![
                mysql_column("id", "int", false, "PRI", None, "auto_increment"),
                mysql_column("user_id", "int", false, "MUL", None, ""),
            ],
        )
        .on(
            r"^SHOW FULL COLUMNS FROM `users`",
            vec![mysql_column("id", "int", false, "PRI", None, "auto_increment")],
        )
        .on(FOREIGN_KEYS, vec![mysql_fk("fk_user", "user_id", "users", "id")])
}

#[test]
fn test_concurrent_first_lookups_load_once() {
    let catalog = schemata::open(slow_server(), CatalogOptions::default()).unwrap();
    let barrier = Barrier::new(THREADS);

    let results: Vec<Option<Arc<TableSchema>>> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    catalog.table_schema("orders").unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let conn = catalog.connection();
    assert_eq!(conn.count("SHOW FULL COLUMNS"), 1);
    assert_eq!(conn.count(FOREIGN_KEYS), 1);

    let first = results[0].as_ref().expect("orders exists");
    assert_eq!(first.foreign_keys.len(), 1);
    for schema in &results[1..] {
        let schema = schema.as_ref().unwrap();
        assert!(Arc::ptr_eq(first, schema));
    }
}

#[test]
fn test_distinct_tables_load_independently() {
    let catalog = schemata::open(slow_server(), CatalogOptions::default()).unwrap();
    let barrier = Barrier::new(THREADS);

    thread::scope(|s| {
        for i in 0..THREADS {
            let (catalog, barrier) = (&catalog, &barrier);
            s.spawn(move || {
                barrier.wait();
                let table = if i % 2 == 0 { "orders" } else { "users" };
                assert!(catalog.table_schema(table).unwrap().is_some());
            });
        }
    });

    let conn = catalog.connection();
    assert_eq!(conn.count("SHOW FULL COLUMNS FROM `orders`"), 1);
    assert_eq!(conn.count("SHOW FULL COLUMNS FROM `users`"), 1);
}

#[test]
fn test_refresh_during_reads_never_returns_partial_schema() {
    let catalog = schemata::open(slow_server(), CatalogOptions::default()).unwrap();

    thread::scope(|s| {
        for _ in 0..THREADS / 2 {
            s.spawn(|| {
                for _ in 0..4 {
                    let schema = catalog.table_schema("orders").unwrap().unwrap();
                    assert_eq!(schema.columns.len(), 2);
                    assert_eq!(schema.foreign_keys.len(), 1);
                }
            });
        }
        s.spawn(|| {
            for _ in 0..4 {
                catalog.refresh_table_schema("orders");
                thread::sleep(Duration::from_millis(5));
            }
        });
    });

    // Every load issues the column query and the foreign-key query as a pair
    let conn = catalog.connection();
    assert_eq!(conn.count("SHOW FULL COLUMNS"), conn.count(FOREIGN_KEYS));
}

#[test]
fn test_uncached_lookups_still_load_one_at_a_time() {
    let catalog = schemata::open(slow_server(), CatalogOptions::new().cache_enabled(false)).unwrap();
    let barrier = Barrier::new(THREADS);

    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                barrier.wait();
                assert!(catalog.table_schema("orders").unwrap().is_some());
            });
        }
    });

    let conn = catalog.connection();
    assert_eq!(conn.count("SHOW FULL COLUMNS"), THREADS);
    assert_eq!(conn.peak_concurrency(), 1);
    assert!(catalog.cache().is_empty());
}

#[test]
fn test_reload_after_invalidation_waits_for_inflight_load() {
    let catalog = schemata::open(slow_server(), CatalogOptions::default()).unwrap();

    thread::scope(|s| {
        let reader = s.spawn(|| catalog.table_schema("orders").unwrap());
        thread::sleep(Duration::from_millis(5));
        catalog.refresh_table_schema("orders");
        assert!(catalog.table_schema("orders").unwrap().is_some());
        assert!(reader.join().unwrap().is_some());
    });

    assert_eq!(catalog.connection().peak_concurrency(), 1);
}
