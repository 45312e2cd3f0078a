//! Compile-time value bridging
//!
//! Every logical type that can be bound or read implements [`Encode`] and/or
//! [`Decode`]. The impl is chosen by the compiler from the static type, so a
//! type without an impl is rejected at compile time and there is no runtime
//! type dispatch.
//!
//! Both traits are written against small slot abstractions rather than the
//! engine itself:
//!
//! - [`ParamSink`] receives one encoded value (a parameter slot, or a [`Cell`]
//!   when encoding offline through [`encode`]).
//! - [`ColumnSource`] exposes one value for decoding (a column of the current
//!   row, or a [`Cell`] when decoding offline through [`decode`]).
//!
//! # Example
//!
//! ```rust
//! use rust_sql_bridge::bridge::{decode, encode};
//! use rust_sql_bridge::Cell;
//!
//! let cell = encode(&42i16).unwrap();
//! assert_eq!(cell, Cell::Integer(42));
//! assert_eq!(decode::<i16>(&cell), Some(42));
//! assert_eq!(decode::<String>(&cell), Some("42".to_string()));
//! assert_eq!(decode::<Vec<u8>>(&cell), None);
//! ```

mod blob;
mod builtin;
#[cfg(feature = "chrono")]
mod datetime;
#[cfg(feature = "json")]
mod json;

pub use blob::{Blob, BlobStorage};
pub use builtin::Null;
#[cfg(feature = "json")]
pub use json::Json;

use super::error::Result;
use super::value::{Cell, StorageClass};
use std::borrow::Cow;

/// Destination for one encoded value
///
/// The methods mirror the engine's bind calls. An [`Encode`] impl calls exactly
/// one of them.
pub trait ParamSink {
    /// Store SQL NULL
    fn put_null(&mut self) -> Result<()>;
    /// Store an integer through the 32-bit path
    fn put_int32(&mut self, value: i32) -> Result<()>;
    /// Store an integer through the 64-bit path
    fn put_int64(&mut self, value: i64) -> Result<()>;
    /// Store a double
    fn put_double(&mut self, value: f64) -> Result<()>;
    /// Store UTF-8 text
    fn put_text(&mut self, value: &str) -> Result<()>;
    /// Store raw bytes
    fn put_blob(&mut self, value: &[u8]) -> Result<()>;
}

/// Source of one value to decode
///
/// The accessors follow the engine's column conversion rules: asking for an
/// integer from a real truncates, asking for text from a number renders it.
/// Decoders check [`ColumnSource::storage_class`] first and only call the
/// accessor that matches.
pub trait ColumnSource {
    /// Storage class of the value
    fn storage_class(&self) -> StorageClass;
    /// Value through the 32-bit integer path
    fn int32(&self) -> i32;
    /// Value through the 64-bit integer path
    fn int64(&self) -> i64;
    /// Value as a double
    fn double(&self) -> f64;
    /// Value as text
    fn text(&self) -> Cow<'_, str>;
    /// Value as bytes
    fn blob(&self) -> Cow<'_, [u8]>;
}

/// Encoding half of a bridge
pub trait Encode {
    /// Write `self` into the slot
    fn encode(&self, sink: &mut dyn ParamSink) -> Result<()>;
}

/// Decoding half of a bridge
///
/// `Output` is the value produced; it is `Self` for every built-in type. The
/// [`Blob`] wrapper decodes to the wrapped user type instead.
pub trait Decode {
    /// Decoded value type
    type Output;

    /// Read the value, or `None` when the storage class is incompatible
    fn decode(source: &dyn ColumnSource) -> Option<Self::Output>;
}

/// A fixed group of values bound to consecutive parameters
pub trait EncodeMany {
    /// Number of values
    fn len(&self) -> usize;

    /// True if there are no values
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Visit every value in order with its offset from the first parameter
    fn for_each_value(&self, f: &mut dyn FnMut(usize, &dyn Encode) -> Result<()>) -> Result<()>;
}

/// A fixed group of types read from consecutive columns
pub trait DecodeRow {
    /// Number of columns consumed
    const LEN: usize;

    /// Tuple of optional decoded values
    type Output;

    /// Decode `columns[0..LEN]`; the caller guarantees the slice is long enough
    fn decode_row<S: ColumnSource>(columns: &[S]) -> Self::Output;
}

/// [`ParamSink`] that captures the value as a [`Cell`]
#[derive(Debug, Default)]
pub struct CellSink {
    cell: Cell,
}

impl CellSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the captured cell
    pub fn into_cell(self) -> Cell {
        self.cell
    }
}

impl ParamSink for CellSink {
    fn put_null(&mut self) -> Result<()> {
        self.cell = Cell::Null;
        Ok(())
    }

    fn put_int32(&mut self, value: i32) -> Result<()> {
        self.cell = Cell::Integer(i64::from(value));
        Ok(())
    }

    fn put_int64(&mut self, value: i64) -> Result<()> {
        self.cell = Cell::Integer(value);
        Ok(())
    }

    fn put_double(&mut self, value: f64) -> Result<()> {
        self.cell = Cell::Real(value);
        Ok(())
    }

    fn put_text(&mut self, value: &str) -> Result<()> {
        self.cell = Cell::Text(value.to_string());
        Ok(())
    }

    fn put_blob(&mut self, value: &[u8]) -> Result<()> {
        self.cell = Cell::Blob(value.to_vec());
        Ok(())
    }
}

impl ColumnSource for Cell {
    fn storage_class(&self) -> StorageClass {
        Cell::storage_class(self)
    }

    fn int32(&self) -> i32 {
        // The engine's 32-bit accessor keeps the low 32 bits.
        self.int64() as i32
    }

    fn int64(&self) -> i64 {
        match self {
            Cell::Null => 0,
            Cell::Integer(v) => *v,
            Cell::Real(v) => *v as i64,
            Cell::Text(s) => s.trim().parse().unwrap_or(0),
            Cell::Blob(_) => 0,
        }
    }

    fn double(&self) -> f64 {
        match self {
            Cell::Null => 0.0,
            Cell::Integer(v) => *v as f64,
            Cell::Real(v) => *v,
            Cell::Text(s) => s.trim().parse().unwrap_or(0.0),
            Cell::Blob(_) => 0.0,
        }
    }

    fn text(&self) -> Cow<'_, str> {
        match self {
            Cell::Null => Cow::Borrowed(""),
            Cell::Integer(v) => Cow::Owned(v.to_string()),
            Cell::Real(v) => Cow::Owned(format!("{:?}", v)),
            Cell::Text(s) => Cow::Borrowed(s.as_str()),
            Cell::Blob(b) => String::from_utf8_lossy(b),
        }
    }

    fn blob(&self) -> Cow<'_, [u8]> {
        match self {
            Cell::Blob(b) => Cow::Borrowed(b.as_slice()),
            Cell::Text(s) => Cow::Borrowed(s.as_bytes()),
            Cell::Null => Cow::Borrowed(&[]),
            other => Cow::Owned(other.text().into_owned().into_bytes()),
        }
    }
}

/// Encode a value into a [`Cell`] without touching the engine
pub fn encode<T: Encode + ?Sized>(value: &T) -> Result<Cell> {
    let mut sink = CellSink::new();
    value.encode(&mut sink)?;
    Ok(sink.into_cell())
}

/// Decode a [`Cell`] as `T` without touching the engine
pub fn decode<T: Decode>(cell: &Cell) -> Option<T::Output> {
    T::decode(cell)
}

impl<T: Encode> EncodeMany for [T] {
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn for_each_value(&self, f: &mut dyn FnMut(usize, &dyn Encode) -> Result<()>) -> Result<()> {
        for (offset, value) in self.iter().enumerate() {
            f(offset, value)?;
        }
        Ok(())
    }
}

impl<T: Encode> EncodeMany for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn for_each_value(&self, f: &mut dyn FnMut(usize, &dyn Encode) -> Result<()>) -> Result<()> {
        self.as_slice().for_each_value(f)
    }
}

impl<T: Encode, const N: usize> EncodeMany for [T; N] {
    fn len(&self) -> usize {
        N
    }

    fn for_each_value(&self, f: &mut dyn FnMut(usize, &dyn Encode) -> Result<()>) -> Result<()> {
        self.as_slice().for_each_value(f)
    }
}

impl<M: EncodeMany + ?Sized> EncodeMany for &M {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn for_each_value(&self, f: &mut dyn FnMut(usize, &dyn Encode) -> Result<()>) -> Result<()> {
        (**self).for_each_value(f)
    }
}

macro_rules! tuple_bridges {
    ($($len:expr => ($($idx:tt $name:ident),+);)+) => {$(
        impl<$($name: Encode),+> EncodeMany for ($($name,)+) {
            fn len(&self) -> usize {
                $len
            }

            fn for_each_value(
                &self,
                f: &mut dyn FnMut(usize, &dyn Encode) -> Result<()>,
            ) -> Result<()> {
                $( f($idx, &self.$idx)?; )+
                Ok(())
            }
        }

        impl<$($name: Decode),+> DecodeRow for ($($name,)+) {
            const LEN: usize = $len;
            type Output = ($(Option<<$name as Decode>::Output>,)+);

            fn decode_row<S: ColumnSource>(columns: &[S]) -> Self::Output {
                ($( <$name as Decode>::decode(&columns[$idx]), )+)
            }
        }
    )+};
}

tuple_bridges! {
    1 => (0 A);
    2 => (0 A, 1 B);
    3 => (0 A, 1 B, 2 C);
    4 => (0 A, 1 B, 2 C, 3 D);
    5 => (0 A, 1 B, 2 C, 3 D, 4 E);
    6 => (0 A, 1 B, 2 C, 3 D, 4 E, 5 F);
    7 => (0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G);
    8 => (0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H);
    9 => (0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H, 8 I);
    10 => (0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H, 8 I, 9 J);
    11 => (0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H, 8 I, 9 J, 10 K);
    12 => (0 A, 1 B, 2 C, 3 D, 4 E, 5 F, 6 G, 7 H, 8 I, 9 J, 10 K, 11 L);
}
