//! Raw statement handle
//!
//! Safe wrappers over the `sqlite3_stmt` API exposed through `rusqlite::ffi`.
//! Index arguments are validated by the caller; this layer only translates
//! result codes into [`DatabaseError`]s.

use crate::core::bridge::{ColumnSource, ParamSink};
use crate::core::error::{DatabaseError, Result};
use crate::core::value::StorageClass;
use rusqlite::ffi;
use std::borrow::Cow;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int, c_uint, c_void};
use std::ptr::{self, NonNull};
use std::slice;

/// Static description of a result code (`sqlite3_errstr`)
pub(crate) fn error_string(code: c_int) -> String {
    // SAFETY: sqlite3_errstr returns a static nul-terminated string or null.
    let message = unsafe { ffi::sqlite3_errstr(code) };
    if message.is_null() {
        format!("unknown error ({})", code)
    } else {
        // SAFETY: checked non-null above.
        unsafe { CStr::from_ptr(message) }
            .to_string_lossy()
            .into_owned()
    }
}

/// Engine error for `code`, preferring the connection's detailed message
pub(crate) fn engine_error(db: *mut ffi::sqlite3, code: c_int) -> DatabaseError {
    if db.is_null() {
        return DatabaseError::engine(code, error_string(code));
    }
    // SAFETY: db is a live connection handle owned by the caller's Connection.
    let message = unsafe { ffi::sqlite3_errmsg(db) };
    if message.is_null() {
        DatabaseError::engine(code, error_string(code))
    } else {
        // SAFETY: checked non-null above; the string lives until the next API call.
        let message = unsafe { CStr::from_ptr(message) }.to_string_lossy().into_owned();
        DatabaseError::engine(code, message)
    }
}

fn length(len: usize, what: &str) -> Result<c_int> {
    c_int::try_from(len).map_err(|_| {
        DatabaseError::out_of_range(format!("{} of {} bytes exceeds the engine limit", what, len))
    })
}

/// An owned, finalized-on-drop `sqlite3_stmt`
pub(crate) struct RawStatement {
    ptr: NonNull<ffi::sqlite3_stmt>,
    db: *mut ffi::sqlite3,
}

impl RawStatement {
    /// Prepare `sql` on `db`
    ///
    /// Returns `Ok(None)` when the text holds no statement (empty, whitespace or
    /// comments only). Text after the first statement is rejected.
    pub(crate) fn prepare(db: *mut ffi::sqlite3, sql: &str, persistent: bool) -> Result<Option<Self>> {
        let len = length(sql.len(), "query text")?;
        let flags: c_uint = if persistent {
            ffi::SQLITE_PREPARE_PERSISTENT as c_uint
        } else {
            0
        };
        let mut stmt: *mut ffi::sqlite3_stmt = ptr::null_mut();
        let mut tail: *const c_char = ptr::null();

        // SAFETY: db is live, sql points to len readable bytes, out-pointers are valid.
        let rc = unsafe {
            ffi::sqlite3_prepare_v3(
                db,
                sql.as_ptr().cast::<c_char>(),
                len,
                flags,
                &mut stmt,
                &mut tail,
            )
        };
        if rc != ffi::SQLITE_OK {
            return Err(engine_error(db, rc));
        }

        let Some(ptr) = NonNull::new(stmt) else {
            return Ok(None);
        };
        let raw = RawStatement { ptr, db };

        if !tail.is_null() {
            let consumed = (tail as usize).saturating_sub(sql.as_ptr() as usize);
            let rest = sql.get(consumed..).unwrap_or("");
            // Leftover whitespace, semicolons and comments prepare to nothing.
            if !rest.trim_matches(|c: char| c.is_whitespace() || c == ';').is_empty()
                && Self::prepare(db, rest, false)?.is_some()
            {
                return Err(DatabaseError::query(format!(
                    "multiple statements in one query; unprepared remainder: {}",
                    rest.trim()
                )));
            }
        }

        Ok(Some(raw))
    }

    pub(crate) fn parameter_count(&self) -> usize {
        // SAFETY: ptr is a live prepared statement.
        let count = unsafe { ffi::sqlite3_bind_parameter_count(self.ptr.as_ptr()) };
        usize::try_from(count).unwrap_or(0)
    }

    /// 1-based index of a named parameter (`:name`, `@name`, `$name`, `?NNN`)
    pub(crate) fn parameter_index(&self, name: &str) -> Option<usize> {
        let name = CString::new(name).ok()?;
        // SAFETY: ptr is live and name is nul-terminated.
        let index = unsafe { ffi::sqlite3_bind_parameter_index(self.ptr.as_ptr(), name.as_ptr()) };
        usize::try_from(index).ok().filter(|&index| index > 0)
    }

    /// Parameter slot; `index` must be within `1..=parameter_count()`
    pub(crate) fn param(&mut self, index: usize) -> RawParam<'_> {
        RawParam {
            index: index as c_int,
            stmt: self,
        }
    }

    /// Advance the cursor: `Ok(true)` on a row, `Ok(false)` when done
    pub(crate) fn step(&mut self) -> Result<bool> {
        // SAFETY: ptr is a live prepared statement.
        match unsafe { ffi::sqlite3_step(self.ptr.as_ptr()) } {
            ffi::SQLITE_ROW => Ok(true),
            ffi::SQLITE_DONE => Ok(false),
            code => Err(engine_error(self.db, code)),
        }
    }

    /// Rewind the cursor, returning the code of the last failed step (or OK)
    pub(crate) fn reset(&mut self) -> c_int {
        // SAFETY: ptr is a live prepared statement.
        unsafe { ffi::sqlite3_reset(self.ptr.as_ptr()) }
    }

    pub(crate) fn clear_bindings(&mut self) {
        // SAFETY: ptr is a live prepared statement; this call cannot fail.
        unsafe {
            ffi::sqlite3_clear_bindings(self.ptr.as_ptr());
        }
    }

    pub(crate) fn column_count(&self) -> usize {
        // SAFETY: ptr is a live prepared statement.
        let count = unsafe { ffi::sqlite3_column_count(self.ptr.as_ptr()) };
        usize::try_from(count).unwrap_or(0)
    }

    /// Column name; `index` must be within `0..column_count()`
    pub(crate) fn column_name(&self, index: usize) -> Option<String> {
        // SAFETY: ptr is live and index was validated by the caller.
        let name = unsafe { ffi::sqlite3_column_name(self.ptr.as_ptr(), index as c_int) };
        if name.is_null() {
            return None;
        }
        // SAFETY: checked non-null; copied out before any further API call.
        Some(unsafe { CStr::from_ptr(name) }.to_string_lossy().into_owned())
    }

    /// Column of the current row; `index` must be within `0..column_count()`
    pub(crate) fn column(&self, index: usize) -> RawColumn<'_> {
        RawColumn {
            stmt: self,
            index: index as c_int,
        }
    }
}

impl Drop for RawStatement {
    fn drop(&mut self) {
        // SAFETY: ptr is owned by this value and finalized exactly once.
        unsafe {
            ffi::sqlite3_finalize(self.ptr.as_ptr());
        }
    }
}

/// One parameter slot of a [`RawStatement`]
pub(crate) struct RawParam<'a> {
    stmt: &'a mut RawStatement,
    index: c_int,
}

impl RawParam<'_> {
    fn check(&self, rc: c_int) -> Result<()> {
        if rc == ffi::SQLITE_OK {
            Ok(())
        } else {
            Err(engine_error(self.stmt.db, rc))
        }
    }

    fn raw(&self) -> *mut ffi::sqlite3_stmt {
        self.stmt.ptr.as_ptr()
    }
}

impl ParamSink for RawParam<'_> {
    fn put_null(&mut self) -> Result<()> {
        // SAFETY: statement is live and the index was validated.
        let rc = unsafe { ffi::sqlite3_bind_null(self.raw(), self.index) };
        self.check(rc)
    }

    fn put_int32(&mut self, value: i32) -> Result<()> {
        // SAFETY: as above.
        let rc = unsafe { ffi::sqlite3_bind_int(self.raw(), self.index, value) };
        self.check(rc)
    }

    fn put_int64(&mut self, value: i64) -> Result<()> {
        // SAFETY: as above.
        let rc = unsafe { ffi::sqlite3_bind_int64(self.raw(), self.index, value) };
        self.check(rc)
    }

    fn put_double(&mut self, value: f64) -> Result<()> {
        // SAFETY: as above.
        let rc = unsafe { ffi::sqlite3_bind_double(self.raw(), self.index, value) };
        self.check(rc)
    }

    fn put_text(&mut self, value: &str) -> Result<()> {
        let len = length(value.len(), "text")?;
        // SAFETY: value points to len bytes; SQLITE_TRANSIENT makes the engine copy them.
        let rc = unsafe {
            ffi::sqlite3_bind_text(
                self.raw(),
                self.index,
                value.as_ptr().cast::<c_char>(),
                len,
                ffi::SQLITE_TRANSIENT(),
            )
        };
        self.check(rc)
    }

    fn put_blob(&mut self, value: &[u8]) -> Result<()> {
        let len = length(value.len(), "blob")?;
        let rc = if value.is_empty() {
            // SAFETY: as above; a zero-length blob needs no buffer.
            unsafe { ffi::sqlite3_bind_zeroblob(self.raw(), self.index, 0) }
        } else {
            // SAFETY: value points to len bytes; SQLITE_TRANSIENT makes the engine copy them.
            unsafe {
                ffi::sqlite3_bind_blob(
                    self.raw(),
                    self.index,
                    value.as_ptr().cast::<c_void>(),
                    len,
                    ffi::SQLITE_TRANSIENT(),
                )
            }
        };
        self.check(rc)
    }
}

/// One column of the current row of a [`RawStatement`]
pub(crate) struct RawColumn<'a> {
    stmt: &'a RawStatement,
    index: c_int,
}

impl RawColumn<'_> {
    fn raw(&self) -> *mut ffi::sqlite3_stmt {
        self.stmt.ptr.as_ptr()
    }

    fn bytes(&self, data: *const u8) -> Vec<u8> {
        if data.is_null() {
            return Vec::new();
        }
        // SAFETY: column_bytes is read after the text/blob accessor, as the engine requires.
        let len = unsafe { ffi::sqlite3_column_bytes(self.raw(), self.index) };
        let len = usize::try_from(len).unwrap_or(0);
        // SAFETY: data points to len bytes valid until the next step/reset.
        unsafe { slice::from_raw_parts(data, len) }.to_vec()
    }
}

impl ColumnSource for RawColumn<'_> {
    fn storage_class(&self) -> StorageClass {
        // SAFETY: the statement holds a row and the index was validated.
        let code = unsafe { ffi::sqlite3_column_type(self.raw(), self.index) };
        StorageClass::from_code(code).unwrap_or(StorageClass::Null)
    }

    fn int32(&self) -> i32 {
        // SAFETY: as above.
        unsafe { ffi::sqlite3_column_int(self.raw(), self.index) }
    }

    fn int64(&self) -> i64 {
        // SAFETY: as above.
        unsafe { ffi::sqlite3_column_int64(self.raw(), self.index) }
    }

    fn double(&self) -> f64 {
        // SAFETY: as above.
        unsafe { ffi::sqlite3_column_double(self.raw(), self.index) }
    }

    fn text(&self) -> Cow<'_, str> {
        // SAFETY: as above.
        let data = unsafe { ffi::sqlite3_column_text(self.raw(), self.index) };
        let bytes = self.bytes(data);
        match String::from_utf8(bytes) {
            Ok(text) => Cow::Owned(text),
            Err(err) => Cow::Owned(String::from_utf8_lossy(err.as_bytes()).into_owned()),
        }
    }

    fn blob(&self) -> Cow<'_, [u8]> {
        // SAFETY: as above.
        let data = unsafe { ffi::sqlite3_column_blob(self.raw(), self.index) };
        Cow::Owned(self.bytes(data.cast::<u8>()))
    }
}
