//! In-memory table
//!
//! An ordered sequence of rows plus the set of known column names. Rows are
//! addressed either by position (0-based, shifts on delete) or by their
//! stable [`RowKey`].

use serde_json::Value;

use super::record::{page_bounds, Page, Record, Row, RowKey};

/// In-memory table. Not synchronized; see [`super::TableStore`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Row>,
    next_key: RowKey,
}

impl Table {
    /// Empty table: zero rows, zero columns
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty table with a known header
    pub fn with_columns(columns: Vec<String>) -> Self {
        Self {
            columns,
            ..Self::default()
        }
    }

    /// Table built from a header and records, keys assigned in order
    pub fn from_records(columns: Vec<String>, records: Vec<Record>) -> Self {
        let mut table = Self::with_columns(columns);
        for record in records {
            table.push(record);
        }
        table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Adds any column not yet known, keeping existing order
    pub fn ensure_columns<I, S>(&mut self, columns: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for column in columns {
            let column = column.as_ref();
            if !self.has_column(column) {
                self.columns.push(column.to_string());
            }
        }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Records for a 1-based page, plus the full row count
    pub fn page(&self, page: i64, per_page: i64) -> Page<Record> {
        let (start, end) = page_bounds(self.rows.len(), page, per_page);
        Page {
            data: self.rows[start..end]
                .iter()
                .map(|row| row.record.clone())
                .collect(),
            total_records: self.rows.len(),
        }
    }

    /// Keyed rows for a 1-based page, plus the full row count
    pub fn page_rows(&self, page: i64, per_page: i64) -> Page<Row> {
        let (start, end) = page_bounds(self.rows.len(), page, per_page);
        Page {
            data: self.rows[start..end].to_vec(),
            total_records: self.rows.len(),
        }
    }

    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    /// Current position of the row carrying `key`
    pub fn position_of(&self, key: RowKey) -> Option<usize> {
        self.rows.iter().position(|row| row.key == key)
    }

    /// Appends a record as the new last row.
    ///
    /// Keys the table has not seen join the column set. Returns the new row.
    pub fn insert(&mut self, record: Record) -> &Row {
        self.ensure_columns(record.keys());
        let index = self.push(record);
        &self.rows[index]
    }

    /// Overwrites the fields of `partial` that name known columns.
    ///
    /// Unknown keys are ignored. Returns the full updated record, or `None`
    /// if `index` is out of bounds.
    pub fn update(&mut self, index: usize, partial: &Record) -> Option<&Record> {
        let columns = &self.columns;
        let row = self.rows.get_mut(index)?;

        for (key, value) in partial {
            if columns.iter().any(|c| c == key) {
                set_field(&mut row.record, key, value.clone());
            }
        }

        Some(&row.record)
    }

    /// Removes the row at `index`; later rows shift down by one
    pub fn delete(&mut self, index: usize) -> Option<Row> {
        if index < self.rows.len() {
            Some(self.rows.remove(index))
        } else {
            None
        }
    }

    /// Every record in current order
    pub fn export(&self) -> Vec<Record> {
        self.rows.iter().map(|row| row.record.clone()).collect()
    }

    fn push(&mut self, record: Record) -> usize {
        let key = self.next_key;
        self.next_key += 1;
        self.rows.push(Row { key, record });
        self.rows.len() - 1
    }
}

/// Sets a field in place, appending it when absent
fn set_field(record: &mut Record, key: &str, value: Value) {
    match record.get_mut(key) {
        Some(slot) => *slot = value,
        None => {
            record.insert(key.to_string(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    fn three_rows() -> Table {
        Table::from_records(
            vec!["name".into(), "n".into()],
            vec![
                record(json!({"name": "a", "n": 1})),
                record(json!({"name": "b", "n": 2})),
                record(json!({"name": "c", "n": 3})),
            ],
        )
    }

    #[test]
    fn test_keys_assigned_in_order() {
        let table = three_rows();
        let keys: Vec<_> = table.rows().iter().map(|r| r.key).collect();
        assert_eq!(keys, vec![0, 1, 2]);
    }

    #[test]
    fn test_insert_appends_and_extends_columns() {
        let mut table = three_rows();
        let row = table.insert(record(json!({"name": "d", "extra": true})));
        assert_eq!(row.key, 3);
        assert_eq!(table.len(), 4);
        assert!(table.has_column("extra"));
        assert_eq!(table.export().last().unwrap()["name"], "d");
    }

    #[test]
    fn test_update_only_known_columns() {
        let mut table = three_rows();
        let updated = table
            .update(1, &record(json!({"n": 20, "bogus": "x"})))
            .unwrap()
            .clone();

        assert_eq!(updated, record(json!({"name": "b", "n": 20})));
        assert!(!table.has_column("bogus"));
    }

    #[test]
    fn test_update_preserves_column_order() {
        let mut table = three_rows();
        let updated = table.update(0, &record(json!({"n": 9, "name": "z"}))).unwrap();
        let keys: Vec<_> = updated.keys().cloned().collect();
        assert_eq!(keys, vec!["name", "n"]);
    }

    #[test]
    fn test_update_out_of_bounds() {
        let mut table = three_rows();
        assert!(table.update(3, &record(json!({"n": 0}))).is_none());
        assert_eq!(table, three_rows());
    }

    #[test]
    fn test_delete_compacts_but_keeps_keys() {
        let mut table = three_rows();
        let removed = table.delete(0).unwrap();
        assert_eq!(removed.key, 0);
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0).unwrap().record["name"], "b");
        assert_eq!(table.get(0).unwrap().key, 1);
        assert_eq!(table.position_of(2), Some(1));
        assert_eq!(table.position_of(0), None);
    }

    #[test]
    fn test_keys_not_reused_after_delete() {
        let mut table = three_rows();
        table.delete(2);
        let row = table.insert(record(json!({"name": "d", "n": 4})));
        assert_eq!(row.key, 3);
    }

    #[test]
    fn test_page_total_is_full_count() {
        let table = three_rows();
        let page = table.page(2, 2);
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.total_records, 3);
        assert!(table.page(5, 2).data.is_empty());
    }

    #[test]
    fn test_empty_table() {
        let table = Table::new();
        assert!(table.is_empty());
        assert!(table.columns().is_empty());
        assert!(table.export().is_empty());
    }
}
