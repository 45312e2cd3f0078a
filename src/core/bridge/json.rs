//! JSON text bridge for serde types

use super::{ColumnSource, Decode, Encode, ParamSink};
use crate::core::error::Result;
use crate::core::value::StorageClass;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Stores `T` as JSON text
///
/// Reading accepts TEXT and BLOB cells holding a JSON document; anything that
/// fails to parse as `T` decodes as absent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Unwrap the inner value
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T: Serialize> Encode for Json<T> {
    fn encode(&self, sink: &mut dyn ParamSink) -> Result<()> {
        let text = serde_json::to_string(&self.0)?;
        sink.put_text(&text)
    }
}

impl<T: DeserializeOwned> Decode for Json<T> {
    type Output = Json<T>;

    fn decode(source: &dyn ColumnSource) -> Option<Self> {
        match source.storage_class() {
            StorageClass::Text | StorageClass::Blob => {
                serde_json::from_slice(&source.blob()).ok().map(Json)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::{decode, encode};
    use super::*;
    use crate::core::value::Cell;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Settings {
        volume: u8,
        tags: Vec<String>,
    }

    #[test]
    fn test_json_round_trip() {
        let settings = Settings {
            volume: 7,
            tags: vec!["a".to_string(), "b".to_string()],
        };
        let cell = encode(&Json(&settings)).unwrap();
        assert_eq!(
            cell,
            Cell::Text(r#"{"volume":7,"tags":["a","b"]}"#.to_string())
        );
        let decoded = decode::<Json<Settings>>(&cell).map(Json::into_inner);
        assert_eq!(decoded, Some(settings));
    }

    #[test]
    fn test_json_malformed_is_absent() {
        let cell = Cell::Text("{not json".to_string());
        assert_eq!(decode::<Json<Settings>>(&cell), None);
        assert_eq!(decode::<Json<u8>>(&Cell::Integer(1)), None);
    }
}
