#![allow(dead_code)]

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

pub const ECOMMERCE_DDL: &str = r#"
CREATE TABLE Users (
    user_id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    tier TEXT CHECK(tier IN ('VIP', 'Basic')) DEFAULT 'Basic',
    join_date DATE NOT NULL
);
CREATE TABLE Products (
    product_id INTEGER PRIMARY KEY AUTOINCREMENT,
    product_name TEXT NOT NULL,
    category TEXT NOT NULL,
    price REAL NOT NULL
);
CREATE TABLE Orders (
    order_id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL,
    product_id INTEGER NOT NULL,
    quantity INTEGER NOT NULL,
    order_date DATETIME NOT NULL,
    FOREIGN KEY (user_id) REFERENCES Users(user_id),
    FOREIGN KEY (product_id) REFERENCES Products(product_id)
);
"#;

/// Creates `<dir>/<name>.db` with three related tables and a handful of rows.
pub fn ecommerce_db(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(format!("{}.db", name));
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(ECOMMERCE_DDL).unwrap();
    for (n, tier, date) in [
        ("Kim", "VIP", "2023-01-15"),
        ("Lee", "Basic", "2023-03-22"),
        ("Park", "VIP", "2023-05-10"),
        ("Jung", "Basic", "2023-07-08"),
        ("Choi", "VIP", "2023-09-12"),
    ] {
        conn.execute(
            "INSERT INTO Users (name, tier, join_date) VALUES (?1, ?2, ?3)",
            (n, tier, date),
        )
        .unwrap();
    }
    for (n, cat, price) in [
        ("Laptop", "Electronics", 1200000.0),
        ("Mouse", "Electronics", 25000.0),
        ("Desk", "Furniture", 150000.0),
    ] {
        conn.execute(
            "INSERT INTO Products (product_name, category, price) VALUES (?1, ?2, ?3)",
            (n, cat, price),
        )
        .unwrap();
    }
    conn.execute_batch(
        "INSERT INTO Orders (user_id, product_id, quantity, order_date) VALUES
            (1, 1, 1, '2024-01-02 10:00:00'),
            (2, 2, 3, '2024-01-03 11:30:00'),
            (1, 3, 1, '2024-02-10 09:15:00');",
    )
    .unwrap();
    path
}

/// Moves the file's mtime forward so content-change detection fires even
/// on filesystems with coarse timestamps.
pub fn bump_mtime(path: &Path) {
    let meta = std::fs::metadata(path).unwrap();
    let next = meta.modified().unwrap() + Duration::from_secs(5);
    let f = std::fs::File::options().write(true).open(path).unwrap();
    f.set_modified(next).unwrap();
}

pub fn set_mtime(path: &Path, t: SystemTime) {
    let f = std::fs::File::options().write(true).open(path).unwrap();
    f.set_modified(t).unwrap();
}

pub const TAGGED_RESPONSE: &str = "<reasoning>\nCount VIP users in Users.\n</reasoning>\n<sql>\nSELECT COUNT(*) AS vip_users FROM Users WHERE tier = 'VIP'\n</sql>";
