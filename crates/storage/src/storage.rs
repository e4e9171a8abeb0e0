//! `SQLite` sink implementation

use std::path::Path;

use msgpipe_core::{RowSet, Value};
use rusqlite::{Connection, OptionalExtension as _, params, params_from_iter};

use crate::error::{Result, StorageError};

/// Handle to the destination `SQLite` database.
#[derive(Debug)]
pub struct Storage {
    pub(crate) conn: Connection,
}

/// Quote a name for use as an SQL identifier, doubling embedded quotes.
///
/// Empty names and names containing NUL are rejected.
pub fn quote_identifier(name: &str) -> Result<String> {
    if name.is_empty() || name.contains('\0') {
        return Err(StorageError::InvalidIdentifier(name.to_owned()));
    }
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

impl Storage {
    /// Open (creating if needed) the database file at `db_path`.
    pub fn new(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        Self::configure(conn)
    }

    pub fn in_memory() -> Result<Self> {
        Self::configure(Connection::open_in_memory()?)
    }

    fn configure(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "busy_timeout", 5000i32)?;
        Ok(Self { conn })
    }

    /// Write `rows` as table `table`, replacing any table of that name.
    ///
    /// Drop, create and insert run in one transaction, so a failure leaves the
    /// previous table untouched. Column types are `INTEGER` or `TEXT` as
    /// inferred by [`RowSet::column_type`]; no index column is added.
    /// Returns the number of rows written.
    pub fn replace_table(&self, table: &str, rows: &RowSet) -> Result<usize> {
        let table_ident = quote_identifier(table)?;
        if rows.width() == 0 {
            return Err(StorageError::EmptySchema { table: table.to_owned() });
        }

        let column_defs = rows
            .columns()
            .iter()
            .enumerate()
            .map(|(i, name)| -> Result<String> {
                Ok(format!("{} {}", quote_identifier(name)?, rows.column_type(i).sql_name()))
            })
            .collect::<Result<Vec<_>>>()?
            .join(", ");
        let placeholders =
            (1..=rows.width()).map(|i| format!("?{i}")).collect::<Vec<_>>().join(", ");

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(&format!("DROP TABLE IF EXISTS {table_ident}"), [])?;
        tx.execute(&format!("CREATE TABLE {table_ident} ({column_defs})"), [])?;
        {
            let mut stmt = tx.prepare(&format!("INSERT INTO {table_ident} VALUES ({placeholders})"))?;
            for row in rows.rows() {
                stmt.execute(params_from_iter(row.iter()))?;
            }
        }
        tx.commit()?;

        tracing::info!(table, rows = rows.len(), columns = rows.width(), "replaced table");
        Ok(rows.len())
    }

    pub fn table_exists(&self, table: &str) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE",
                params![table],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Column names of `table` in declaration order.
    pub fn table_columns(&self, table: &str) -> Result<Vec<String>> {
        self.ensure_exists(table)?;
        let mut stmt = self.conn.prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")?;
        let names = stmt
            .query_map(params![table], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
    }

    pub fn row_count(&self, table: &str) -> Result<usize> {
        self.ensure_exists(table)?;
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quote_identifier(table)?),
            [],
            |row| row.get(0),
        )?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Read the whole table back in insertion order.
    pub fn read_table(&self, table: &str) -> Result<RowSet> {
        let columns = self.table_columns(table)?;
        let width = columns.len();
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT * FROM {} ORDER BY rowid", quote_identifier(table)?))?;
        let rows = stmt
            .query_map([], |row| (0..width).map(|i| row.get::<_, Value>(i)).collect())?
            .collect::<rusqlite::Result<Vec<Vec<Value>>>>()?;
        RowSet::from_rows(columns, rows).map_err(|source| StorageError::DataCorruption {
            context: format!("reading table {table}"),
            source,
        })
    }

    fn ensure_exists(&self, table: &str) -> Result<()> {
        if self.table_exists(table)? { Ok(()) } else { Err(StorageError::NotFound(table.to_owned())) }
    }
}
