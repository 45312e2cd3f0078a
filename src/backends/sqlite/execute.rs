//! Execution driver
//!
//! Runs a statement to completion, handing each row to a callback.

use super::row::Row;
use super::statement::Statement;
use crate::core::bridge::DecodeRow;
use crate::core::error::Result;
use tracing::debug;

impl Statement<'_> {
    /// Step until done, calling `callback` with each row and its 1-based ordinal
    ///
    /// On success the cursor is reset with bindings kept, so the statement can
    /// run again right away. An error from stepping or from the callback is
    /// returned as is, without a reset.
    ///
    /// Returns the number of rows produced.
    pub fn execute_with<F>(&mut self, mut callback: F) -> Result<u64>
    where
        F: FnMut(&Row<'_>, u64) -> Result<()>,
    {
        let mut rows = 0u64;
        while self.step()? {
            rows += 1;
            let row = self.row()?;
            callback(&row, rows)?;
        }

        self.reset(false);
        debug!(query = %self.query(), rows, "executed statement");
        Ok(rows)
    }

    /// Run the statement, discarding any rows
    pub fn execute(&mut self) -> Result<u64> {
        self.execute_with(|_, _| Ok(()))
    }

    /// Run the statement and decode every row as a tuple
    pub fn collect<R: DecodeRow>(&mut self) -> Result<Vec<R::Output>> {
        let mut rows = Vec::new();
        self.execute_with(|row, _| {
            rows.push(row.results::<R>(0)?);
            Ok(())
        })?;
        Ok(rows)
    }
}
