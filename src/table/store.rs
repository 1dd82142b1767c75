//! Shared table store
//!
//! The single owner of the in-memory table. Handlers share it by
//! `Arc<TableStore>`; every operation takes the lock exactly once, so a
//! read-modify-write never interleaves with another request.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::errors::{TableError, TableResult};
use super::memory::Table;
use super::record::{Page, Record, Row, RowKey};
use crate::observability::{log_event_with_fields, Event};
use crate::schema::{SchemaValidator, TableSchema};

/// Thread-safe table store with optional schema enforcement
#[derive(Debug)]
pub struct TableStore {
    table: RwLock<Table>,
    schema: Option<TableSchema>,
}

impl TableStore {
    /// Store without a declared schema; any record is accepted
    pub fn new(table: Table) -> Self {
        Self {
            table: RwLock::new(table),
            schema: None,
        }
    }

    /// Store enforcing `schema` on every write.
    ///
    /// Declared columns join the column set. Loaded rows that do not conform
    /// are kept and reported once.
    pub fn with_schema(mut table: Table, schema: TableSchema) -> Self {
        table.ensure_columns(schema.column_names());

        let validator = SchemaValidator::new(&schema);
        let drifted = table
            .rows()
            .iter()
            .filter(|row| validator.validate_record(&row.record).is_err())
            .count();
        if drifted > 0 {
            log_event_with_fields(Event::SchemaDrift, &[("rows", drifted.to_string().as_str())]);
        }

        Self {
            table: RwLock::new(table),
            schema: Some(schema),
        }
    }

    pub fn schema(&self) -> Option<&TableSchema> {
        self.schema.as_ref()
    }

    // The table has no cross-row invariant a panicking writer could leave
    // half-applied, so a poisoned lock is still safe to use.
    fn read(&self) -> RwLockReadGuard<'_, Table> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Table> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Known column names in order
    pub fn columns(&self) -> Vec<String> {
        self.read().columns().to_vec()
    }

    /// Records of a 1-based page plus the full row count
    pub fn page(&self, page: i64, per_page: i64) -> Page<Record> {
        self.read().page(page, per_page)
    }

    /// Keyed rows of a 1-based page plus the full row count
    pub fn page_rows(&self, page: i64, per_page: i64) -> Page<Row> {
        self.read().page_rows(page, per_page)
    }

    /// Record at position `index`
    pub fn get(&self, index: usize) -> TableResult<Record> {
        self.read()
            .get(index)
            .map(|row| row.record.clone())
            .ok_or(TableError::RowNotFound)
    }

    /// Record carrying `key`
    pub fn get_by_key(&self, key: RowKey) -> TableResult<Record> {
        let table = self.read();
        let index = table.position_of(key).ok_or(TableError::RowNotFound)?;
        Ok(table.rows()[index].record.clone())
    }

    /// Appends `record` and returns it unchanged, along with its key
    pub fn insert(&self, record: Record) -> TableResult<(RowKey, Record)> {
        if let Some(schema) = &self.schema {
            SchemaValidator::new(schema).validate_record(&record)?;
        }

        let mut table = self.write();
        let row = table.insert(record);
        Ok((row.key, row.record.clone()))
    }

    /// Overwrites known fields of the row at `index`, returning the full record.
    ///
    /// A missing row is reported before the body is validated.
    pub fn update(&self, index: usize, partial: &Record) -> TableResult<Record> {
        let mut table = self.write();
        if index >= table.len() {
            return Err(TableError::RowNotFound);
        }
        self.validate_partial(partial)?;

        table
            .update(index, partial)
            .cloned()
            .ok_or(TableError::RowNotFound)
    }

    /// Overwrites known fields of the row carrying `key`
    pub fn update_by_key(&self, key: RowKey, partial: &Record) -> TableResult<Record> {
        let mut table = self.write();
        let index = table.position_of(key).ok_or(TableError::RowNotFound)?;
        self.validate_partial(partial)?;

        table
            .update(index, partial)
            .cloned()
            .ok_or(TableError::RowNotFound)
    }

    /// Removes the row at `index`; later rows shift down by one
    pub fn delete(&self, index: usize) -> TableResult<Row> {
        self.write().delete(index).ok_or(TableError::RowNotFound)
    }

    /// Removes the row carrying `key`
    pub fn delete_by_key(&self, key: RowKey) -> TableResult<Row> {
        let mut table = self.write();
        let index = table.position_of(key).ok_or(TableError::RowNotFound)?;
        table.delete(index).ok_or(TableError::RowNotFound)
    }

    /// Every record in current order
    pub fn export(&self) -> Vec<Record> {
        self.read().export()
    }

    fn validate_partial(&self, partial: &Record) -> TableResult<()> {
        if let Some(schema) = &self.schema {
            SchemaValidator::new(schema).validate_partial(partial)?;
        }
        Ok(())
    }
}

impl Default for TableStore {
    fn default() -> Self {
        Self::new(Table::new())
    }
}
