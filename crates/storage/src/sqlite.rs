use std::collections::BTreeMap;

use rusqlite::Connection;

use genval_core::{EntityModel, FieldValue, RowId};

use crate::error::StorageError;
use crate::schema::{self, quote_ident};
use crate::traits::{PreparedRow, Store, StoredRow};

pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    pub fn open(path: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        schema::init(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        schema::init(&conn)?;
        Ok(Self { conn })
    }

    pub fn create_table(&self, model: &EntityModel) -> Result<(), StorageError> {
        schema::create_table(&self.conn, model)
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}

fn encode_value(value: &FieldValue) -> Result<rusqlite::types::Value, StorageError> {
    match value {
        FieldValue::Null => Ok(rusqlite::types::Value::Null),
        other => {
            let bytes = other
                .to_msgpack()
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            Ok(rusqlite::types::Value::Blob(bytes))
        }
    }
}

fn read_row(conn: &Connection, table: &str, key: RowId) -> Result<Option<StoredRow>, StorageError> {
    let sql = format!("SELECT * FROM {} WHERE row_id = ?1", quote_ident(table));
    let mut stmt = conn.prepare(&sql)?;
    let names: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
    let mut rows = stmt.query(rusqlite::params![key.as_bytes().as_slice()])?;
    let Some(row) = rows.next()? else {
        return Ok(None);
    };
    let mut out = BTreeMap::new();
    for (i, name) in names.iter().enumerate() {
        if name == "row_id" {
            continue;
        }
        let blob: Option<Vec<u8>> = row.get(i)?;
        let value = match blob {
            None => FieldValue::Null,
            Some(bytes) => FieldValue::from_msgpack(&bytes)
                .map_err(|e| StorageError::Serialization(e.to_string()))?,
        };
        out.insert(name.clone(), value);
    }
    Ok(Some(out))
}

impl Store for SqliteStorage {
    fn insert(
        &mut self,
        table: &str,
        key: RowId,
        row: &PreparedRow,
    ) -> Result<StoredRow, StorageError> {
        let tx = self.conn.transaction()?;

        let mut columns = vec![quote_ident("row_id")];
        let mut params: Vec<rusqlite::types::Value> =
            vec![rusqlite::types::Value::Blob(key.as_bytes().to_vec())];
        for (name, slot) in row {
            if let Some(value) = slot {
                columns.push(quote_ident(name));
                params.push(encode_value(value)?);
            }
        }
        let placeholders: Vec<String> = (1..=params.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(table),
            columns.join(", "),
            placeholders.join(", ")
        );
        let result = tx.execute(&sql, rusqlite::params_from_iter(params));
        match result {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                return Err(StorageError::ConstraintViolation(key.to_string()));
            }
            Err(e) => return Err(StorageError::Sqlite(e)),
        }

        let stored =
            read_row(&tx, table, key)?.ok_or_else(|| StorageError::NotFound(key.to_string()))?;
        tx.commit()?;
        Ok(stored)
    }

    fn update(
        &mut self,
        table: &str,
        key: RowId,
        row: &PreparedRow,
    ) -> Result<StoredRow, StorageError> {
        let tx = self.conn.transaction()?;

        let mut sets = Vec::new();
        let mut params: Vec<rusqlite::types::Value> = Vec::new();
        for (name, slot) in row {
            if let Some(value) = slot {
                sets.push(format!("{} = ?{}", quote_ident(name), sets.len() + 1));
                params.push(encode_value(value)?);
            }
        }
        if !sets.is_empty() {
            params.push(rusqlite::types::Value::Blob(key.as_bytes().to_vec()));
            let sql = format!(
                "UPDATE {} SET {} WHERE row_id = ?{}",
                quote_ident(table),
                sets.join(", "),
                params.len()
            );
            let affected = tx.execute(&sql, rusqlite::params_from_iter(params))?;
            if affected == 0 {
                return Err(StorageError::NotFound(key.to_string()));
            }
        }

        let stored =
            read_row(&tx, table, key)?.ok_or_else(|| StorageError::NotFound(key.to_string()))?;
        tx.commit()?;
        Ok(stored)
    }

    fn fetch(&self, table: &str, key: RowId) -> Result<Option<StoredRow>, StorageError> {
        read_row(&self.conn, table, key)
    }
}
