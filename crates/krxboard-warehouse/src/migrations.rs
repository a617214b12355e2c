use ::duckdb::{params, Connection};

struct Migration {
    version: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "0001_stock_rows",
        sql: r#"
CREATE TABLE IF NOT EXISTS stock_rows (
    code TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    price DOUBLE NOT NULL,
    change_pct DOUBLE NOT NULL,
    grade TEXT NOT NULL,
    inst_rank INTEGER NOT NULL,
    fore_rank INTEGER NOT NULL,
    volume BIGINT NOT NULL,
    market TEXT NOT NULL,
    source TEXT,
    updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS ingest_log (
    request_id TEXT NOT NULL,
    source TEXT NOT NULL,
    row_count BIGINT NOT NULL,
    status TEXT NOT NULL,
    timestamp TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#,
    },
    Migration {
        // stock_rows stays unindexed beyond its key: upserts rewrite every column.
        version: "0002_ingest_log_index",
        sql: r#"
CREATE INDEX IF NOT EXISTS idx_ingest_log_source_ts ON ingest_log(source, timestamp);
"#,
    },
    Migration {
        // Replaced per (base_dt, inv_div) by delete-then-insert, so no key.
        version: "0003_inv_net_buy_day",
        sql: r#"
CREATE TABLE IF NOT EXISTS inv_net_buy_day (
    base_dt TEXT NOT NULL,
    inv_div TEXT NOT NULL,
    stock_cd TEXT NOT NULL,
    stock_nm TEXT NOT NULL,
    net_buy_qty BIGINT NOT NULL,
    net_buy_amt BIGINT NOT NULL,
    rank_qty INTEGER NOT NULL,
    rank_amt INTEGER NOT NULL
);
"#,
    },
];

pub fn apply_migrations(connection: &Connection) -> Result<(), ::duckdb::Error> {
    connection.execute_batch(
        r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version TEXT PRIMARY KEY,
    applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#,
    )?;

    for migration in MIGRATIONS {
        let applied_count: i64 = connection.query_row(
            "SELECT COUNT(*) FROM schema_migrations WHERE version = ?",
            params![migration.version],
            |row| row.get(0),
        )?;

        if applied_count == 0 {
            tracing::debug!(version = migration.version, "applying warehouse migration");
            connection.execute_batch(migration.sql)?;
            connection.execute(
                "INSERT INTO schema_migrations (version) VALUES (?)",
                params![migration.version],
            )?;
        }
    }

    Ok(())
}
