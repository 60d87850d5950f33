//! Relay-style global node ids: base64 of `"<Type>:<pk>"`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::fmt::{Display, Formatter, Result as FmtResult};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GlobalIdError {
    #[error("Couldn't resolve id: {0}.")]
    Malformed(String),

    #[error("Must receive a {expected} id.")]
    WrongType { expected: String, found: String },

    #[error("Invalid primary key in id: {0}.")]
    InvalidPk(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalId {
    pub type_name: String,
    pub pk: String,
}

impl GlobalId {
    pub fn new(type_name: impl Into<String>, pk: impl ToString) -> Self {
        Self {
            type_name: type_name.into(),
            pk: pk.to_string(),
        }
    }

    pub fn encode(&self) -> String {
        STANDARD.encode(format!("{}:{}", self.type_name, self.pk))
    }

    pub fn parse(raw: &str) -> Result<Self, GlobalIdError> {
        let decoded = STANDARD
            .decode(raw.trim())
            .map_err(|_| GlobalIdError::Malformed(raw.to_string()))?;
        let decoded =
            String::from_utf8(decoded).map_err(|_| GlobalIdError::Malformed(raw.to_string()))?;
        let (type_name, pk) = decoded
            .split_once(':')
            .ok_or_else(|| GlobalIdError::Malformed(raw.to_string()))?;
        if type_name.is_empty() || pk.is_empty() {
            return Err(GlobalIdError::Malformed(raw.to_string()));
        }
        Ok(Self::new(type_name, pk))
    }

    /// Parse `raw` and return its integer primary key if it names `expected_type`.
    pub fn parse_pk(raw: &str, expected_type: &str) -> Result<i32, GlobalIdError> {
        let id = Self::parse(raw)?;
        if id.type_name != expected_type {
            return Err(GlobalIdError::WrongType {
                expected: expected_type.to_string(),
                found: id.type_name,
            });
        }
        id.pk
            .parse::<i32>()
            .map_err(|_| GlobalIdError::InvalidPk(raw.to_string()))
    }
}

impl Display for GlobalId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_matches_relay_format() {
        // base64("Product:72")
        assert_eq!(GlobalId::new("Product", 72).encode(), "UHJvZHVjdDo3Mg==");
    }

    #[test]
    fn test_parse_pk_for_expected_type() {
        assert_eq!(GlobalId::parse_pk("UHJvZHVjdDo3Mg==", "Product"), Ok(72));
    }

    #[test]
    fn test_parse_pk_rejects_other_types() {
        let raw = GlobalId::new("Category", 3).encode();
        assert!(matches!(
            GlobalId::parse_pk(&raw, "Product"),
            Err(GlobalIdError::WrongType { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            GlobalId::parse("not base64!"),
            Err(GlobalIdError::Malformed(_))
        ));
        let no_separator = STANDARD.encode("Product72");
        assert!(GlobalId::parse(&no_separator).is_err());
    }

    #[test]
    fn test_parse_pk_rejects_non_numeric_pk() {
        let raw = GlobalId::new("Product", "abc").encode();
        assert!(matches!(
            GlobalId::parse_pk(&raw, "Product"),
            Err(GlobalIdError::InvalidPk(_))
        ));
    }
}
