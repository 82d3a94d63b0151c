//! Entity identifiers are strings prefixed with the entity type
//! (`job_…`, `invoice_…`) rather than raw UUIDs.

use uuid::Uuid;

use super::value_objects::ValueObjectError;

/// Builds `<prefix><uuid-simple>`
pub fn generate_with_prefix(prefix: &str) -> String {
  format!("{}{}", prefix, Uuid::new_v4().simple())
}

/// Checks that `value` is `prefix` followed by a non-empty `[A-Za-z0-9-]` tail
pub fn validate_prefixed(value: &str, prefix: &str) -> Result<(), ValueObjectError> {
  let tail = value.strip_prefix(prefix).ok_or_else(|| {
    ValueObjectError::InvalidIdentifier(format!("'{}' must start with '{}'", value, prefix))
  })?;

  if tail.is_empty() || tail.len() > 64 {
    return Err(ValueObjectError::InvalidIdentifier(format!(
      "'{}' has an invalid length",
      value
    )));
  }

  if !tail.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
    return Err(ValueObjectError::InvalidIdentifier(format!(
      "'{}' contains invalid characters",
      value
    )));
  }

  Ok(())
}

/// Declares a string identifier type with a fixed prefix
macro_rules! prefixed_id {
  ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
    $(#[$meta])*
    #[derive(
      Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
    )]
    #[serde(try_from = "String", into = "String")]
    pub struct $name(String);

    impl $name {
      pub const PREFIX: &'static str = $prefix;

      pub fn generate() -> Self {
        Self($crate::domain::shared::ids::generate_with_prefix(Self::PREFIX))
      }

      pub fn parse(
        value: impl Into<String>,
      ) -> Result<Self, $crate::domain::shared::value_objects::ValueObjectError> {
        let value = value.into();
        $crate::domain::shared::ids::validate_prefixed(&value, Self::PREFIX)?;
        Ok(Self(value))
      }

      pub fn as_str(&self) -> &str {
        &self.0
      }
    }

    impl TryFrom<String> for $name {
      type Error = $crate::domain::shared::value_objects::ValueObjectError;

      fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
      }
    }

    impl From<$name> for String {
      fn from(id: $name) -> Self {
        id.0
      }
    }

    impl std::fmt::Display for $name {
      fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
      }
    }
  };
}

pub(crate) use prefixed_id;

#[cfg(test)]
mod tests {
  use super::*;

  prefixed_id!(SampleId, "sample_");

  #[test]
  fn test_generated_ids_carry_prefix() {
    let id = SampleId::generate();
    assert!(id.as_str().starts_with("sample_"));
    assert_eq!(id.as_str().len(), "sample_".len() + 32);
    assert_eq!(SampleId::parse(id.to_string()).unwrap(), id);
  }

  #[test]
  fn test_parse_rejects_wrong_prefix() {
    assert!(SampleId::parse("other_abc").is_err());
    assert!(SampleId::parse("sample_").is_err());
    assert!(SampleId::parse("sample_a b").is_err());
    assert!(SampleId::parse("sample_legacy-42").is_ok());
  }

  #[test]
  fn test_serde_goes_through_validation() {
    let parsed: SampleId = serde_json::from_str("\"sample_abc123\"").unwrap();
    assert_eq!(parsed.as_str(), "sample_abc123");
    assert!(serde_json::from_str::<SampleId>("\"nope\"").is_err());
  }
}
