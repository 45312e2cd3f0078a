//! Current row of a running statement

use super::raw::{RawColumn, RawStatement};
use crate::core::bridge::{ColumnSource, Decode, DecodeRow};
use crate::core::error::{DatabaseError, Result};
use crate::core::value::{Cell, CellRow, StorageClass};
use std::fmt;

/// Read access to the row a [`Statement`](super::Statement) is positioned on
///
/// A `Row` borrows its statement, so the statement cannot step (which would
/// invalidate the row) while the row is alive.
pub struct Row<'stmt> {
    raw: &'stmt RawStatement,
    count: usize,
}

impl<'stmt> Row<'stmt> {
    pub(crate) fn new(raw: &'stmt RawStatement) -> Self {
        Self {
            count: raw.column_count(),
            raw,
        }
    }

    fn column(&self, index: usize) -> Result<RawColumn<'stmt>> {
        if index >= self.count {
            return Err(DatabaseError::ColumnIndex {
                index,
                count: self.count,
            });
        }
        Ok(self.raw.column(index))
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.count
    }

    /// Name of column `index`
    pub fn column_name(&self, index: usize) -> Result<String> {
        self.column(index)?;
        self.raw
            .column_name(index)
            .ok_or_else(|| DatabaseError::other(format!("column {} has no name", index)))
    }

    /// Storage class of the value in column `index`
    pub fn column_type(&self, index: usize) -> Result<StorageClass> {
        Ok(self.column(index)?.storage_class())
    }

    /// Read column `index` as `T`
    ///
    /// `Ok(None)` means the stored value is NULL or of a storage class `T`
    /// cannot be read from.
    pub fn result<T: Decode>(&self, index: usize) -> Result<Option<T::Output>> {
        let column = self.column(index)?;
        Ok(T::decode(&column))
    }

    /// Read consecutive columns starting at `start` as a tuple
    pub fn results<R: DecodeRow>(&self, start: usize) -> Result<R::Output> {
        let end = start.saturating_add(R::LEN);
        if end > self.count {
            return Err(DatabaseError::ColumnIndex {
                index: start.max(self.count),
                count: self.count,
            });
        }
        let columns: Vec<RawColumn<'stmt>> = (start..end).map(|i| self.raw.column(i)).collect();
        Ok(R::decode_row(columns.as_slice()))
    }

    /// Read column `index` as a [`Cell`]
    pub fn cell(&self, index: usize) -> Result<Cell> {
        Ok(self.result::<Cell>(index)?.unwrap_or_default())
    }

    /// All columns as cells
    pub fn cells(&self) -> Result<Vec<Cell>> {
        (0..self.count).map(|index| self.cell(index)).collect()
    }

    /// All columns as cells keyed by column name
    pub fn to_map(&self) -> Result<CellRow> {
        let mut map = CellRow::with_capacity(self.count);
        for index in 0..self.count {
            map.insert(self.column_name(index)?, self.cell(index)?);
        }
        Ok(map)
    }
}

impl fmt::Debug for Row<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Row")
            .field("column_count", &self.count)
            .finish()
    }
}
