// ==========================================
// 纺织家具生产经营系统 - 演示库重建脚本
// ==========================================
// 用法: cargo run --bin seed_demo_db [db_path]
// 行为: 备份并重建数据库 → 建表 → 写入演示数据
// ==========================================

use std::error::Error;
use std::fs;
use std::path::Path;

use chrono::{Duration, Local, Utc};
use rusqlite::{params, Connection};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use textile_workshop::app::get_default_db_path;
use textile_workshop::db::open_sqlite_connection;

/// 演示账号统一口令
const DEMO_PASSWORD: &str = "demo1234";

fn main() -> Result<(), Box<dyn Error>> {
    textile_workshop::logging::init();

    let db_path = std::env::args().nth(1).unwrap_or_else(get_default_db_path);

    backup_and_reset_db(&db_path)?;

    let conn = open_sqlite_connection(&db_path)?;

    // 建表
    let schema_sql = include_str!("../../scripts/dev_db/schema.sql");
    conn.execute_batch(schema_sql)?;

    // 演示数据
    seed_users(&conn)?;
    seed_catalog(&conn)?;
    seed_stock(&conn)?;

    print_quick_counts(&conn)?;

    tracing::info!("演示库已就绪: {}", db_path);
    Ok(())
}

fn backup_and_reset_db(db_path: &str) -> Result<(), Box<dyn Error>> {
    let path = Path::new(db_path);
    if !path.exists() {
        return Ok(());
    }

    let ts = Local::now().format("%Y%m%d_%H%M%S").to_string();
    let backup_path = format!("{}.bak.{}", db_path, ts);
    fs::copy(path, &backup_path)?;
    fs::remove_file(path)?;

    eprintln!("Backed up {} -> {}", db_path, backup_path);
    Ok(())
}

/// 口令散列: hex(sha256(salt || password))，与 AuthApi 口径一致
fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

fn seed_users(conn: &Connection) -> Result<(), Box<dyn Error>> {
    let users = [
        ("DIRECTOR", "王总", "director"),
        ("MANAGER", "李经理", "manager"),
        ("WAREHOUSE", "张库管", "warehouse"),
        ("CUSTOMER", "演示客户", "customer"),
    ];

    let now = Utc::now().to_rfc3339();
    for (role, full_name, login) in users {
        let salt = Uuid::new_v4().simple().to_string();
        let hash = hash_password(&salt, DEMO_PASSWORD);
        conn.execute(
            r#"
            INSERT INTO users (role, full_name, login, password_salt, password_hash, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![role, full_name, login, salt, hash, now],
        )?;
    }

    Ok(())
}

fn seed_catalog(conn: &Connection) -> Result<(), Box<dyn Error>> {
    conn.execute_batch(
        r#"
        INSERT INTO lookup_fabric_name (id, name) VALUES
            (1, '华夫格棉布'), (2, '珊瑚绒'), (3, '帆布');
        INSERT INTO lookup_fabric_color (id, name) VALUES
            (1, '米白'), (2, '灰蓝'), (3, '墨绿');
        INSERT INTO lookup_fabric_pattern (id, name) VALUES
            (1, '素色'), (2, '条纹');
        INSERT INTO lookup_fabric_composition (id, name) VALUES
            (1, '100% 棉'), (2, '涤纶');
        INSERT INTO lookup_fitting_type (id, name) VALUES
            (1, '拉链'), (2, '织带'), (3, '填充物');
        "#,
    )?;

    conn.execute_batch(
        r#"
        INSERT INTO fabrics (article, name_code, color_code, pattern_code, composition_code,
                             width_mm, unit, price, image_path) VALUES
            ('F001', 1, 1, 1, 1, 1500, 'm', 52.0, NULL),
            ('F002', 2, 2, 1, 2, 1600, 'm', 64.5, NULL),
            ('F003', 3, 3, 2, 1, 1400, 'm', 38.0, NULL);

        INSERT INTO fittings (article, name, type_code, width_mm, length_mm, dimension_unit,
                              weight_value, weight_unit, price, image_path) VALUES
            ('T001', '尼龙拉链 40cm', 1, 4.0, 400.0, 'mm', 8.0, 'g', 2.5, NULL),
            ('T002', '纯棉织带', 2, 20.0, NULL, 'mm', 5.0, 'g', 1.2, NULL),
            ('T003', '羽丝绒填充物', 3, NULL, NULL, NULL, 500.0, 'g', 18.0, NULL);

        INSERT INTO manufactured_goods (article, name, width_mm, length_mm, unit, price,
                                        image_path, comment) VALUES
            ('P001', '华夫格毛巾', 500, 1000, 'pcs', 45.0, NULL, '经典款'),
            ('P002', '珊瑚绒盖毯', 1500, 2000, 'pcs', 159.0, NULL, NULL),
            ('P003', '帆布靠枕', 450, 450, 'pcs', 89.0, NULL, '含填充');
        "#,
    )?;

    Ok(())
}

fn seed_stock(conn: &Connection) -> Result<(), Box<dyn Error>> {
    let base = Utc::now() - Duration::days(30);

    let rolls = [
        ("F001", 50_000i64, 1500i64, 0i64),
        ("F001", 25_000, 1500, 3),
        ("F002", 40_000, 1600, 7),
        ("F003", 60_000, 1400, 12),
    ];
    for (article, length_mm, width_mm, day_offset) in rolls {
        conn.execute(
            r#"
            INSERT INTO fabric_rolls (roll_id, fabric_article, length_mm, width_mm, received_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                Uuid::new_v4().to_string(),
                article,
                length_mm,
                width_mm,
                (base + Duration::days(day_offset)).to_rfc3339(),
            ],
        )?;
    }

    let batches = [
        ("T001", 500.0f64, 0i64),
        ("T002", 1200.0, 5),
        ("T003", 80.0, 9),
    ];
    for (article, quantity, day_offset) in batches {
        conn.execute(
            r#"
            INSERT INTO fitting_batches (batch_id, fitting_article, quantity, received_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                Uuid::new_v4().to_string(),
                article,
                quantity,
                (base + Duration::days(day_offset)).to_rfc3339(),
            ],
        )?;
    }

    Ok(())
}

fn print_quick_counts(conn: &Connection) -> Result<(), Box<dyn Error>> {
    let tables = [
        "users",
        "fabrics",
        "fittings",
        "manufactured_goods",
        "fabric_rolls",
        "fitting_batches",
    ];
    for table in tables {
        let count: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })?;
        println!("{:<20} {}", table, count);
    }
    println!("演示账号口令: {}", DEMO_PASSWORD);
    Ok(())
}
