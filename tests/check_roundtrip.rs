#![cfg(feature = "mysql")]

mod common;

use common::{FakeMySql, mysql_column};
use schemata::prelude::*;

fn products(version: &str) -> Catalog<FakeMySql> {
    let server = FakeMySql::new(version);
    server.create_table(
        "products",
        vec![
            mysql_column("id", "int", false, "PRI", None, "auto_increment"),
            mysql_column("price", "decimal(10,2)", false, "", None, ""),
            mysql_column("stock", "int", false, "", Some("0"), ""),
        ],
    );
    schemata::open(server, CatalogOptions::default()).unwrap()
}

#[test]
fn test_added_check_is_reported() {
    let catalog = products("8.0.33");
    assert!(catalog.checks("products").unwrap().is_empty());

    catalog
        .add_check("chk_price", "products", "price > 0", true)
        .unwrap();

    let checks = catalog.checks("products").unwrap();
    assert_eq!(checks.len(), 1);
    assert_eq!(checks[0].name(), Some("chk_price"));
    assert_eq!(checks[0].expression, "(price > 0)");
    assert_eq!(checks[0].normalized_expression(), "price > 0");
}

#[test]
fn test_ddl_invalidates_cached_checks() {
    let catalog = products("8.0.33");
    catalog.add_check("chk_price", "products", "price > 0", true).unwrap();
    assert_eq!(catalog.checks("products").unwrap().len(), 1);

    catalog.add_check("chk_stock", "products", "stock >= 0", true).unwrap();
    let names: Vec<_> = catalog
        .checks("products")
        .unwrap()
        .iter()
        .filter_map(|c| c.name().map(str::to_string))
        .collect();
    assert_eq!(names, ["chk_price", "chk_stock"]);

    catalog.drop_check("chk_price", "products").unwrap();
    let checks = catalog.checks("products").unwrap();
    assert_eq!(checks.len(), 1);
    assert_eq!(checks[0].normalized_expression(), "stock >= 0");
}

#[test]
fn test_statements_sent_to_server() {
    let catalog = products("8.0.33");
    catalog.add_check("chk_price", "products", "price > 0", false).unwrap();
    catalog.drop_check("chk_price", "products").unwrap();

    let ddl: Vec<_> = catalog
        .connection()
        .queries()
        .into_iter()
        .filter(|q| q.starts_with("ALTER TABLE"))
        .collect();
    assert_eq!(
        ddl,
        [
            "ALTER TABLE `products` ADD CONSTRAINT `chk_price` CHECK (price > 0) NOT ENFORCED",
            "ALTER TABLE `products` DROP CHECK `chk_price`",
        ]
    );
}

#[test]
fn test_mariadb_drops_by_constraint() {
    let catalog = products("10.6.16-MariaDB");
    catalog.add_check("chk_price", "products", "price > 0", true).unwrap();
    assert_eq!(catalog.checks("products").unwrap().len(), 1);

    catalog.drop_check("chk_price", "products").unwrap();
    assert!(catalog.checks("products").unwrap().is_empty());
    assert!(catalog
        .connection()
        .queries()
        .iter()
        .any(|q| q == "ALTER TABLE `products` DROP CONSTRAINT `chk_price`"));
}

#[test]
fn test_mariadb_cannot_create_unenforced_checks() {
    let catalog = products("10.6.16-MariaDB");
    let before = catalog.connection().queries().len();
    let err = catalog
        .add_check("chk_price", "products", "price > 0", false)
        .unwrap_err();
    assert!(err.is_not_supported(), "{err}");
    assert_eq!(catalog.connection().queries().len(), before);
}

#[test]
fn test_old_mysql_rejects_check_ddl() {
    let catalog = products("5.7.44");
    let err = catalog
        .add_check("chk_price", "products", "price > 0", true)
        .unwrap_err();
    assert!(err.is_not_supported());
    assert!(catalog.drop_check("chk_price", "products").unwrap_err().is_not_supported());
    assert!(catalog.connection().queries().is_empty());
}

#[test]
fn test_empty_expression_is_invalid() {
    let catalog = products("8.0.33");
    let err = catalog.add_check("chk_blank", "products", "   ", true).unwrap_err();
    assert!(matches!(err, SchemaError::InvalidArgument(_)), "{err}");
    assert!(catalog.connection().queries().is_empty());
}

#[test]
fn test_server_errors_propagate() {
    let catalog = products("8.0.33");
    catalog.add_check("chk_price", "products", "price > 0", true).unwrap();
    let err = catalog
        .add_check("chk_price", "products", "price > 1", true)
        .unwrap_err();
    match err {
        SchemaError::Connection(e) => assert!(e.has_sql_state("HY000")),
        other => panic!("expected a connection error, got {other}"),
    }
    // The original check survives the rejected duplicate
    assert_eq!(catalog.checks("products").unwrap().len(), 1);
}
