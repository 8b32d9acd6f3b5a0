//! Serde adapter for variable-length byte fields, written as a hex string.
//!
//! Use with `#[serde(with = "nyzo_types::hex_bytes")]` on a `Vec<u8>`.

use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode(bytes))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
    let s = String::deserialize(deserializer)?;
    hex::decode(s.trim()).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Blob {
        #[serde(with = "crate::hex_bytes")]
        data: Vec<u8>,
    }

    #[test]
    fn writes_hex_string() {
        let blob = Blob {
            data: vec![0xde, 0xad, 0x01],
        };
        let json = serde_json::to_string(&blob).unwrap();
        assert_eq!(json, r#"{"data":"dead01"}"#);
        assert_eq!(serde_json::from_str::<Blob>(&json).unwrap(), blob);
    }

    #[test]
    fn empty_is_empty_string() {
        let json = serde_json::to_string(&Blob { data: vec![] }).unwrap();
        assert_eq!(json, r#"{"data":""}"#);
    }

    #[test]
    fn rejects_bad_hex() {
        assert!(serde_json::from_str::<Blob>(r#"{"data":"zz"}"#).is_err());
    }
}
