//! User-defined blob types
//!
//! A type opts into blob storage by implementing [`BlobStorage`], a symmetric
//! pair of functions to and from bytes. Wrapping a value in [`Blob`] encodes it
//! immediately; the wrapper then binds as a BLOB and decodes back to the
//! original type.

use super::{ColumnSource, Decode, Encode, ParamSink};
use crate::core::error::Result;
use crate::core::value::StorageClass;
use std::fmt;
use std::marker::PhantomData;

/// Conversion between a user type and its stored bytes
///
/// Implementations must round-trip: `from_storage(&to_storage(v))` returns a
/// value equal to `v` for every `v` the type can produce. A type that cannot
/// guarantee this must say so in its own documentation.
pub trait BlobStorage: Sized {
    /// Serialize the value into the bytes stored in the engine
    fn to_storage(&self) -> Vec<u8>;

    /// Rebuild a value from stored bytes, or `None` if they are malformed
    fn from_storage(bytes: &[u8]) -> Option<Self>;
}

/// An eagerly encoded blob of `T`
///
/// ```rust
/// use rust_sql_bridge::bridge::{decode, encode, Blob, BlobStorage};
///
/// #[derive(Debug, PartialEq)]
/// struct Point(i16, i16);
///
/// impl BlobStorage for Point {
///     fn to_storage(&self) -> Vec<u8> {
///         [self.0.to_le_bytes(), self.1.to_le_bytes()].concat()
///     }
///
///     fn from_storage(bytes: &[u8]) -> Option<Self> {
///         let x = i16::from_le_bytes(bytes.get(0..2)?.try_into().ok()?);
///         let y = i16::from_le_bytes(bytes.get(2..4)?.try_into().ok()?);
///         Some(Point(x, y))
///     }
/// }
///
/// let cell = encode(&Blob::new(&Point(3, -4))).unwrap();
/// assert_eq!(decode::<Blob<Point>>(&cell), Some(Point(3, -4)));
/// ```
pub struct Blob<T> {
    bytes: Vec<u8>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: BlobStorage> Blob<T> {
    /// Encode `value` now
    pub fn new(value: &T) -> Self {
        Self {
            bytes: value.to_storage(),
            _marker: PhantomData,
        }
    }

    /// Decode the captured bytes back into `T`
    pub fn value(&self) -> Option<T> {
        T::from_storage(&self.bytes)
    }
}

impl<T> Blob<T> {
    /// Bytes captured at construction
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the wrapper, returning the bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl<T: BlobStorage> From<T> for Blob<T> {
    fn from(value: T) -> Self {
        Blob::new(&value)
    }
}

impl<T> Clone for Blob<T> {
    fn clone(&self) -> Self {
        Self {
            bytes: self.bytes.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> PartialEq for Blob<T> {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl<T> fmt::Debug for Blob<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Blob")
            .field("type", &std::any::type_name::<T>())
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl<T> Encode for Blob<T> {
    fn encode(&self, sink: &mut dyn ParamSink) -> Result<()> {
        sink.put_blob(&self.bytes)
    }
}

impl<T: BlobStorage> Decode for Blob<T> {
    type Output = T;

    fn decode(source: &dyn ColumnSource) -> Option<T> {
        match source.storage_class() {
            StorageClass::Blob => T::from_storage(&source.blob()),
            _ => None,
        }
    }
}
