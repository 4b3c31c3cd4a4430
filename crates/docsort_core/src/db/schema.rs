//! Ledger schema versioning.
//!
//! The schema version lives in `PRAGMA user_version`. Version 0 is an empty
//! database; version 1 adds the `documents` table.

use super::{DbError, DbResult};
use log::info;
use rusqlite::Connection;
use std::cmp::Ordering;

/// Schema version written by this binary.
pub const SCHEMA_VERSION: u32 = 1;

const SCHEMA_V1: &str = include_str!("schema_v1.sql");

/// Brings an empty database up to `SCHEMA_VERSION` in one transaction.
///
/// Databases written by a newer binary are refused rather than opened.
pub fn ensure_schema(conn: &mut Connection) -> DbResult<()> {
    let found: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    match found.cmp(&SCHEMA_VERSION) {
        Ordering::Equal => Ok(()),
        Ordering::Greater => Err(DbError::SchemaTooNew {
            found,
            supported: SCHEMA_VERSION,
        }),
        Ordering::Less => {
            let tx = conn.transaction()?;
            tx.execute_batch(SCHEMA_V1)?;
            tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
            tx.commit()?;
            info!("event=db_schema module=db status=ok from={found} to={SCHEMA_VERSION}");
            Ok(())
        }
    }
}
