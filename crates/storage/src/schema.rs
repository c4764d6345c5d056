use rusqlite::Connection;

use genval_core::EntityModel;

use crate::error::StorageError;

pub fn init(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        PRAGMA busy_timeout = 5000;
    ",
    )?;
    Ok(())
}

/// Quote an identifier for embedding in SQL text.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Create the table backing one entity model.
///
/// Every property becomes a nullable BLOB column holding a msgpack-encoded
/// value; a configured store default becomes a blob-literal DEFAULT so that
/// omitted columns pick it up on insert.
pub fn create_table(conn: &Connection, model: &EntityModel) -> Result<(), StorageError> {
    let mut columns = vec!["row_id BLOB PRIMARY KEY CHECK (length(row_id) = 16)".to_string()];
    for prop in model.properties() {
        let mut column = format!("{} BLOB", quote_ident(prop.name()));
        if let Some(default) = prop.store_default() {
            let bytes = default
                .to_msgpack()
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            column.push_str(&format!(" DEFAULT (X'{}')", hex(&bytes)));
        }
        columns.push(column);
    }
    let sql = format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quote_ident(model.name()),
        columns.join(", ")
    );
    conn.execute(&sql, [])?;
    Ok(())
}
