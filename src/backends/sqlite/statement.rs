//! Prepared statements
//!
//! A [`Statement`] tracks its cursor with an explicit [`State`] checked on every
//! call. Parameters are 1-based and columns are 0-based.

use super::connection::Connection;
use super::raw::RawStatement;
use super::row::Row;
use crate::core::bridge::{self, Decode, DecodeRow, Encode, EncodeMany};
use crate::core::error::{DatabaseError, Result};
use crate::core::state::State;
use crate::core::value::Cell;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, trace};

mod sealed {
    pub trait Sealed {}

    impl Sealed for usize {}
    impl Sealed for i32 {}
    impl Sealed for &str {}
}

/// Parameter addressing: a 1-based position or a parameter name
///
/// Names include their prefix character, e.g. `":name"`, `"@name"` or `"$name"`.
pub trait ParamIndex: sealed::Sealed {
    /// Resolve to a position within `1..=count`
    #[doc(hidden)]
    fn resolve(&self, count: usize, lookup: &dyn Fn(&str) -> Option<usize>) -> Result<usize>;
}

impl ParamIndex for usize {
    fn resolve(&self, count: usize, _lookup: &dyn Fn(&str) -> Option<usize>) -> Result<usize> {
        if (1..=count).contains(self) {
            Ok(*self)
        } else {
            Err(DatabaseError::ParameterIndex {
                index: *self,
                count,
            })
        }
    }
}

impl ParamIndex for i32 {
    fn resolve(&self, count: usize, lookup: &dyn Fn(&str) -> Option<usize>) -> Result<usize> {
        // Negative positions are reported as 0, which is never valid.
        usize::try_from(*self).unwrap_or(0).resolve(count, lookup)
    }
}

impl ParamIndex for &str {
    fn resolve(&self, _count: usize, lookup: &dyn Fn(&str) -> Option<usize>) -> Result<usize> {
        lookup(*self).ok_or_else(|| DatabaseError::ParameterName((*self).to_string()))
    }
}

/// A prepared statement bound to a [`Connection`]
///
/// # Examples
///
/// ```rust
/// use rust_sql_bridge::prelude::*;
///
/// let db = Connection::open_in_memory()?;
/// db.execute_batch("CREATE TABLE players (id INTEGER PRIMARY KEY, name TEXT, cash REAL)")?;
///
/// let mut insert = Statement::new(&db, "INSERT INTO players (name, cash) VALUES (?, ?)")?;
/// for i in 1..=3 {
///     insert.bind_many(1, (format!("Player{}", i), i as f64 * 1000.0))?;
///     insert.execute()?;
/// }
///
/// let mut select = Statement::new(&db, "SELECT id, name FROM players")?;
/// let rows = select.collect::<(i64, String)>()?;
/// assert_eq!(rows.len(), 3);
/// assert_eq!(rows[0], (Some(1), Some("Player1".to_string())));
/// # Ok::<(), DatabaseError>(())
/// ```
pub struct Statement<'conn> {
    connection: &'conn Connection,
    raw: Option<RawStatement>,
    query: String,
    persistent: bool,
    state: State,
}

impl<'conn> Statement<'conn> {
    /// Prepare `query`
    ///
    /// An empty query (or one holding only whitespace and comments) yields a
    /// statement with no prepared handle; give it text with
    /// [`Statement::set_query`].
    pub fn new(connection: &'conn Connection, query: &str) -> Result<Self> {
        Self::with_hint(connection, query, false)
    }

    /// Prepare `query`, hinting the engine that it will be reused many times
    pub fn persistent(connection: &'conn Connection, query: &str) -> Result<Self> {
        Self::with_hint(connection, query, true)
    }

    fn with_hint(connection: &'conn Connection, query: &str, persistent: bool) -> Result<Self> {
        let raw = Self::prepare(connection, query, persistent)?;
        Ok(Self {
            connection,
            raw,
            query: query.to_string(),
            persistent,
            state: State::Unbound,
        })
    }

    fn prepare(connection: &Connection, query: &str, persistent: bool) -> Result<Option<RawStatement>> {
        let db = connection.handle()?;
        let raw = RawStatement::prepare(db, query, persistent)?;
        debug!(query, persistent, empty = raw.is_none(), "prepared statement");
        Ok(raw)
    }

    fn raw(&self) -> Result<&RawStatement> {
        self.raw.as_ref().ok_or(DatabaseError::EmptyStatement)
    }

    /// Query text
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Replace the query text and prepare it again
    ///
    /// Only allowed while [`State::Unbound`]. If preparing the new text fails the
    /// statement keeps its previous query.
    pub fn set_query(&mut self, query: &str) -> Result<()> {
        if self.state != State::Unbound {
            return Err(DatabaseError::invalid_state("alter the query", self.state));
        }

        let raw = Self::prepare(self.connection, query, self.persistent)?;
        self.raw = raw;
        self.query = query.to_string();
        Ok(())
    }

    /// Current cursor state
    pub fn state(&self) -> State {
        self.state
    }

    /// Number of parameters in the prepared query
    pub fn parameter_count(&self) -> Result<usize> {
        Ok(self.raw()?.parameter_count())
    }

    /// Number of result columns
    pub fn column_count(&self) -> Result<usize> {
        Ok(self.raw()?.column_count())
    }

    /// Name of the result column at `index`
    pub fn column_name(&self, index: usize) -> Result<String> {
        let raw = self.raw()?;
        let count = raw.column_count();
        if index >= count {
            return Err(DatabaseError::ColumnIndex { index, count });
        }
        raw.column_name(index)
            .ok_or_else(|| DatabaseError::other(format!("column {} has no name", index)))
    }

    /// Map of result column name to index
    ///
    /// When names repeat the last column wins.
    pub fn columns(&self) -> Result<HashMap<String, usize>> {
        let count = self.column_count()?;
        let mut columns = HashMap::with_capacity(count);
        for index in 0..count {
            columns.insert(self.column_name(index)?, index);
        }
        Ok(columns)
    }

    /// Bind one value
    ///
    /// Accepted in every state and always leaves the statement
    /// [`State::Bound`]. From [`State::Row`] or [`State::Done`] the cursor is
    /// reset first, keeping the other bindings. The index is validated before
    /// anything reaches the engine.
    pub fn bind<I: ParamIndex, T: Encode>(&mut self, index: I, value: T) -> Result<&mut Self> {
        let raw = self.raw.as_mut().ok_or(DatabaseError::EmptyStatement)?;
        let count = raw.parameter_count();
        let position = index.resolve(count, &|name| raw.parameter_index(name))?;

        if self.state.is_running() {
            raw.reset();
            self.state = State::Bound;
        }

        trace!(position, "bind");
        value.encode(&mut raw.param(position))?;
        self.state = State::Bound;
        Ok(self)
    }

    /// Bind consecutive parameters starting at `start`
    ///
    /// The whole range is validated and every value encoded before the first
    /// one reaches the engine, so a value that cannot be encoded leaves the
    /// statement untouched. If the engine rejects a value part way through,
    /// all bindings are cleared and the statement is left [`State::Unbound`].
    pub fn bind_many<M: EncodeMany>(&mut self, start: usize, values: M) -> Result<&mut Self> {
        let raw = self.raw.as_mut().ok_or(DatabaseError::EmptyStatement)?;
        if values.is_empty() {
            return Ok(self);
        }

        let count = raw.parameter_count();
        start.resolve(count, &|_| None)?;
        let last = start + values.len() - 1;
        last.resolve(count, &|_| None)?;

        let mut cells = Vec::with_capacity(values.len());
        values.for_each_value(&mut |_, value| {
            cells.push(bridge::encode(value)?);
            Ok(())
        })?;

        if self.state.is_running() {
            raw.reset();
            self.state = State::Bound;
        }

        trace!(start, last, "bind range");
        for (offset, cell) in cells.iter().enumerate() {
            if let Err(err) = cell.encode(&mut raw.param(start + offset)) {
                raw.clear_bindings();
                self.state = State::Unbound;
                return Err(err);
            }
        }
        self.state = State::Bound;
        Ok(self)
    }

    /// Advance to the next row
    ///
    /// Returns `Ok(true)` when a row is available ([`State::Row`]) and
    /// `Ok(false)` once evaluation is exhausted ([`State::Done`]). A statement in
    /// `Done` stays there without touching the engine until it is reset. On an
    /// engine error the statement also moves to `Done`.
    pub fn step(&mut self) -> Result<bool> {
        let raw = self.raw.as_mut().ok_or(DatabaseError::EmptyStatement)?;
        if self.state == State::Done {
            return Ok(false);
        }

        match raw.step() {
            Ok(true) => {
                self.state = State::Row;
                Ok(true)
            }
            Ok(false) => {
                trace!(query = %self.query, "done");
                self.state = State::Done;
                Ok(false)
            }
            Err(err) => {
                self.state = State::Done;
                Err(err)
            }
        }
    }

    /// Rewind the cursor
    ///
    /// Leaves the statement [`State::Bound`] when bindings are kept and
    /// [`State::Unbound`] when they are cleared. The query text is unchanged.
    pub fn reset(&mut self, clear_bindings: bool) -> &mut Self {
        if let Some(raw) = self.raw.as_mut() {
            raw.reset();
            if clear_bindings {
                raw.clear_bindings();
            }
        }
        trace!(clear_bindings, "reset");
        self.state = State::after_reset(clear_bindings);
        self
    }

    /// Current row
    ///
    /// Fails unless the statement is [`State::Row`].
    pub fn row(&self) -> Result<Row<'_>> {
        if !self.state.has_row() {
            return Err(DatabaseError::NoRow { state: self.state });
        }
        Ok(Row::new(self.raw()?))
    }

    /// Read column `index` of the current row as `T`
    pub fn result<T: Decode>(&self, index: usize) -> Result<Option<T::Output>> {
        self.row()?.result::<T>(index)
    }

    /// Read consecutive columns of the current row starting at `start`
    pub fn results<R: DecodeRow>(&self, start: usize) -> Result<R::Output> {
        self.row()?.results::<R>(start)
    }

    /// Read column `index` of the current row as a [`Cell`]
    pub fn cell(&self, index: usize) -> Result<Cell> {
        self.row()?.cell(index)
    }
}

impl fmt::Debug for Statement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Statement")
            .field("query", &self.query)
            .field("persistent", &self.persistent)
            .field("state", &self.state)
            .finish()
    }
}
