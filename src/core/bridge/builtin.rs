//! Built-in bridges: null, booleans, integers, reals, text and bytes

use super::{ColumnSource, Decode, Encode, ParamSink};
use crate::core::error::{DatabaseError, Result};
use crate::core::value::{Cell, StorageClass};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::rc::Rc;
use std::sync::Arc;

/// The null sentinel
///
/// Binding `Null` stores SQL NULL. Reading `Null` yields `Some(Null)` only when
/// the column holds NULL, which makes it the one type that can observe a null
/// cell as a present value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Null;

impl Encode for Null {
    fn encode(&self, sink: &mut dyn ParamSink) -> Result<()> {
        sink.put_null()
    }
}

impl Decode for Null {
    type Output = Null;

    fn decode(source: &dyn ColumnSource) -> Option<Null> {
        match source.storage_class() {
            StorageClass::Null => Some(Null),
            _ => None,
        }
    }
}

impl Encode for () {
    fn encode(&self, sink: &mut dyn ParamSink) -> Result<()> {
        sink.put_null()
    }
}

impl Encode for bool {
    fn encode(&self, sink: &mut dyn ParamSink) -> Result<()> {
        sink.put_int32(i32::from(*self))
    }
}

impl Decode for bool {
    type Output = bool;

    fn decode(source: &dyn ColumnSource) -> Option<bool> {
        match source.storage_class() {
            StorageClass::Integer => Some(source.int64() != 0),
            _ => None,
        }
    }
}

/// Integers whose whole range fits the engine's signed 32-bit path.
///
/// The 32-bit accessor truncates, so a stored value is first checked against
/// the 32-bit range through the 64-bit accessor.
macro_rules! int32_bridge {
    ($($ty:ty),+) => {$(
        impl Encode for $ty {
            fn encode(&self, sink: &mut dyn ParamSink) -> Result<()> {
                sink.put_int32(i32::from(*self))
            }
        }

        impl Decode for $ty {
            type Output = $ty;

            fn decode(source: &dyn ColumnSource) -> Option<$ty> {
                if !source.storage_class().is_numeric() {
                    return None;
                }
                i32::try_from(source.int64()).ok()?;
                <$ty>::try_from(source.int32()).ok()
            }
        }
    )+};
}

/// Integers routed through the 64-bit path.
macro_rules! int64_bridge {
    ($($ty:ty),+) => {$(
        impl Encode for $ty {
            fn encode(&self, sink: &mut dyn ParamSink) -> Result<()> {
                let value = i64::try_from(*self).map_err(|_| {
                    DatabaseError::out_of_range(format!(
                        "{} {} does not fit a 64-bit signed integer",
                        stringify!($ty),
                        self
                    ))
                })?;
                sink.put_int64(value)
            }
        }

        impl Decode for $ty {
            type Output = $ty;

            fn decode(source: &dyn ColumnSource) -> Option<$ty> {
                if !source.storage_class().is_numeric() {
                    return None;
                }
                <$ty>::try_from(source.int64()).ok()
            }
        }
    )+};
}

int32_bridge!(i8, i16, i32, u8, u16);
int64_bridge!(i64, isize, u32, u64, usize);

/// NaN has no engine representation (it would be stored as NULL).
fn real(value: f64) -> Result<f64> {
    if value.is_nan() {
        return Err(DatabaseError::out_of_range("NaN cannot be stored as a real"));
    }
    Ok(value)
}

/// Floating-point types, checked against the engine's double width.
///
/// A finite stored value that overflows a narrower type reads as absent.
macro_rules! real_bridge {
    ($($ty:ty),+) => {$(
        const _: () = assert!(
            std::mem::size_of::<$ty>() <= std::mem::size_of::<f64>(),
            "floating-point type too large"
        );

        impl Encode for $ty {
            fn encode(&self, sink: &mut dyn ParamSink) -> Result<()> {
                sink.put_double(real(f64::from(*self))?)
            }
        }

        impl Decode for $ty {
            type Output = $ty;

            fn decode(source: &dyn ColumnSource) -> Option<$ty> {
                if !source.storage_class().is_numeric() {
                    return None;
                }
                let value = source.double();
                let narrowed = value as $ty;
                if value.is_finite() && narrowed.is_infinite() {
                    return None;
                }
                Some(narrowed)
            }
        }
    )+};
}

real_bridge!(f32, f64);

impl Encode for str {
    fn encode(&self, sink: &mut dyn ParamSink) -> Result<()> {
        sink.put_text(self)
    }
}

impl Encode for String {
    fn encode(&self, sink: &mut dyn ParamSink) -> Result<()> {
        sink.put_text(self)
    }
}

impl Encode for Cow<'_, str> {
    fn encode(&self, sink: &mut dyn ParamSink) -> Result<()> {
        sink.put_text(self)
    }
}

impl Encode for char {
    fn encode(&self, sink: &mut dyn ParamSink) -> Result<()> {
        let mut buf = [0u8; 4];
        sink.put_text(self.encode_utf8(&mut buf))
    }
}

impl Decode for String {
    type Output = String;

    fn decode(source: &dyn ColumnSource) -> Option<String> {
        match source.storage_class() {
            StorageClass::Null | StorageClass::Blob => None,
            _ => Some(source.text().into_owned()),
        }
    }
}

impl Decode for char {
    type Output = char;

    fn decode(source: &dyn ColumnSource) -> Option<char> {
        let text = String::decode(source)?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }
}

impl Encode for [u8] {
    fn encode(&self, sink: &mut dyn ParamSink) -> Result<()> {
        sink.put_blob(self)
    }
}

impl Encode for Vec<u8> {
    fn encode(&self, sink: &mut dyn ParamSink) -> Result<()> {
        sink.put_blob(self)
    }
}

impl<const N: usize> Encode for [u8; N] {
    fn encode(&self, sink: &mut dyn ParamSink) -> Result<()> {
        sink.put_blob(self)
    }
}

impl Decode for Vec<u8> {
    type Output = Vec<u8>;

    fn decode(source: &dyn ColumnSource) -> Option<Vec<u8>> {
        match source.storage_class() {
            StorageClass::Blob => Some(source.blob().into_owned()),
            _ => None,
        }
    }
}

impl<const N: usize> Decode for [u8; N] {
    type Output = [u8; N];

    fn decode(source: &dyn ColumnSource) -> Option<[u8; N]> {
        match source.storage_class() {
            StorageClass::Blob => <[u8; N]>::try_from(source.blob().as_ref()).ok(),
            _ => None,
        }
    }
}

impl Encode for Cell {
    fn encode(&self, sink: &mut dyn ParamSink) -> Result<()> {
        match self {
            Cell::Null => sink.put_null(),
            Cell::Integer(v) => sink.put_int64(*v),
            Cell::Real(v) => sink.put_double(real(*v)?),
            Cell::Text(s) => sink.put_text(s),
            Cell::Blob(b) => sink.put_blob(b),
        }
    }
}

impl Decode for Cell {
    type Output = Cell;

    fn decode(source: &dyn ColumnSource) -> Option<Cell> {
        Some(match source.storage_class() {
            StorageClass::Null => Cell::Null,
            StorageClass::Integer => Cell::Integer(source.int64()),
            StorageClass::Real => Cell::Real(source.double()),
            StorageClass::Text => Cell::Text(source.text().into_owned()),
            StorageClass::Blob => Cell::Blob(source.blob().into_owned()),
        })
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode(&self, sink: &mut dyn ParamSink) -> Result<()> {
        match self {
            Some(value) => value.encode(sink),
            None => sink.put_null(),
        }
    }
}

/// A null cell decodes as `Some(None)`; any other cell goes through `T`.
impl<T: Decode> Decode for Option<T> {
    type Output = Option<T::Output>;

    fn decode(source: &dyn ColumnSource) -> Option<Self::Output> {
        match source.storage_class() {
            StorageClass::Null => Some(None),
            _ => T::decode(source).map(Some),
        }
    }
}

// Reference and pointer types resolve to the bridge of the pointee.

impl<T: Encode + ?Sized> Encode for &T {
    fn encode(&self, sink: &mut dyn ParamSink) -> Result<()> {
        (**self).encode(sink)
    }
}

impl<T: Encode + ?Sized> Encode for &mut T {
    fn encode(&self, sink: &mut dyn ParamSink) -> Result<()> {
        (**self).encode(sink)
    }
}

impl<T: Encode + ?Sized> Encode for Box<T> {
    fn encode(&self, sink: &mut dyn ParamSink) -> Result<()> {
        (**self).encode(sink)
    }
}

impl<T: Encode + ?Sized> Encode for Rc<T> {
    fn encode(&self, sink: &mut dyn ParamSink) -> Result<()> {
        (**self).encode(sink)
    }
}

impl<T: Encode + ?Sized> Encode for Arc<T> {
    fn encode(&self, sink: &mut dyn ParamSink) -> Result<()> {
        (**self).encode(sink)
    }
}

impl<T: Decode> Decode for Box<T> {
    type Output = Box<T::Output>;

    fn decode(source: &dyn ColumnSource) -> Option<Self::Output> {
        T::decode(source).map(Box::new)
    }
}

#[cfg(test)]
mod tests {
    use super::super::{decode, encode};
    use super::*;

    #[test]
    fn test_null_sentinel() {
        let cell = encode(&Null).unwrap();
        assert_eq!(cell, Cell::Null);
        assert_eq!(decode::<Null>(&cell), Some(Null));
        assert_eq!(decode::<i32>(&cell), None);
        assert_eq!(decode::<String>(&cell), None);
        assert_eq!(decode::<bool>(&cell), None);
        assert_eq!(decode::<Option<i32>>(&cell), Some(None));
        assert_eq!(decode::<Null>(&Cell::Integer(0)), None);
    }

    #[test]
    fn test_bool_via_integer() {
        assert_eq!(encode(&true).unwrap(), Cell::Integer(1));
        assert_eq!(encode(&false).unwrap(), Cell::Integer(0));
        assert_eq!(decode::<bool>(&Cell::Integer(5)), Some(true));
        assert_eq!(decode::<bool>(&Cell::Real(1.0)), None);
    }

    #[test]
    fn test_integer_narrowing() {
        assert_eq!(decode::<u8>(&Cell::Integer(255)), Some(255));
        assert_eq!(decode::<u8>(&Cell::Integer(256)), None);
        assert_eq!(decode::<i8>(&Cell::Integer(-128)), Some(-128));
        assert_eq!(decode::<i32>(&Cell::Integer(0x1_0000_0005)), None);
        assert_eq!(decode::<bool>(&Cell::Integer(0x1_0000_0000)), Some(true));
        assert_eq!(decode::<u64>(&Cell::Integer(-1)), None);
        assert_eq!(decode::<u32>(&Cell::Integer(4_000_000_000)), Some(4_000_000_000));
        assert_eq!(decode::<i64>(&Cell::Real(9.9)), Some(9));
        assert_eq!(decode::<i64>(&Cell::Text("9".to_string())), None);
    }

    #[test]
    fn test_u64_out_of_range() {
        let err = encode(&u64::MAX).unwrap_err();
        assert!(err.is_usage_error());
        assert_eq!(encode(&(i64::MAX as u64)).unwrap(), Cell::Integer(i64::MAX));
    }

    #[test]
    fn test_reals() {
        assert_eq!(decode::<f64>(&Cell::Integer(3)), Some(3.0));
        assert_eq!(decode::<f32>(&Cell::Real(0.5)), Some(0.5));
        assert_eq!(decode::<f64>(&Cell::Blob(vec![])), None);

        assert_eq!(decode::<f32>(&Cell::Real(1e300)), None);
        assert_eq!(decode::<f32>(&Cell::Real(-1e300)), None);
        assert_eq!(decode::<f32>(&Cell::Real(f64::INFINITY)), Some(f32::INFINITY));
        assert_eq!(decode::<f64>(&Cell::Real(1e300)), Some(1e300));
    }

    #[test]
    fn test_nan_rejected() {
        assert!(matches!(encode(&f64::NAN), Err(DatabaseError::OutOfRange(_))));
        assert!(matches!(encode(&f32::NAN), Err(DatabaseError::OutOfRange(_))));
        assert!(matches!(encode(&Cell::Real(f64::NAN)), Err(DatabaseError::OutOfRange(_))));
        assert_eq!(encode(&f64::NEG_INFINITY).unwrap(), Cell::Real(f64::NEG_INFINITY));
    }

    #[test]
    fn test_text_rules() {
        assert_eq!(decode::<String>(&Cell::Integer(42)).as_deref(), Some("42"));
        assert_eq!(decode::<String>(&Cell::Blob(b"hi".to_vec())), None);
        assert_eq!(encode(&'x').unwrap(), Cell::Text("x".to_string()));
        assert_eq!(decode::<char>(&Cell::Text("x".to_string())), Some('x'));
        assert_eq!(decode::<char>(&Cell::Text("xy".to_string())), None);
    }

    #[test]
    fn test_bytes_rules() {
        let cell = encode(&vec![0u8, 255, 7]).unwrap();
        assert_eq!(decode::<Vec<u8>>(&cell), Some(vec![0, 255, 7]));
        assert_eq!(decode::<[u8; 3]>(&cell), Some([0, 255, 7]));
        assert_eq!(decode::<[u8; 4]>(&cell), None);
        assert_eq!(decode::<Vec<u8>>(&Cell::Text("abc".to_string())), None);
    }

    #[test]
    fn test_reference_elision() {
        let value = 12i32;
        let reference = &value;
        assert_eq!(encode(&reference).unwrap(), encode(&value).unwrap());
        assert_eq!(
            encode(&Box::new("boxed")).unwrap(),
            Cell::Text("boxed".to_string())
        );
        assert_eq!(
            encode(&Arc::<str>::from("shared")).unwrap(),
            Cell::Text("shared".to_string())
        );
        assert_eq!(encode(&Some(3u16)).unwrap(), Cell::Integer(3));
        assert_eq!(encode(&Option::<u16>::None).unwrap(), Cell::Null);
    }

    #[test]
    fn test_cell_passthrough() {
        let cells = [
            Cell::Null,
            Cell::Integer(-4),
            Cell::Real(0.25),
            Cell::Text("t".to_string()),
            Cell::Blob(vec![1]),
        ];
        for cell in &cells {
            assert_eq!(encode(cell).unwrap(), *cell);
            assert_eq!(decode::<Cell>(cell).as_ref(), Some(cell));
        }
    }
}
