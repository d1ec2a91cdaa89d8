//! Common serde helpers shared by the response models

use serde::{Deserialize, Deserializer};

/// Numeric field that the upstream may send either as a JSON number or as a
/// decimal string ("181.39000")
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
  Number(f64),
  Text(String),
}

/// Deserialize a numeric-convertible field into `f64`.
///
/// Empty or non-numeric strings are rejected so a malformed bar fails the
/// whole body instead of silently becoming zero.
pub fn de_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
  D: Deserializer<'de>,
{
  match NumberOrString::deserialize(deserializer)? {
    NumberOrString::Number(n) => Ok(n),
    NumberOrString::Text(s) => s
      .trim()
      .parse::<f64>()
      .map_err(|e| serde::de::Error::custom(format!("invalid number '{}': {}", s, e))),
  }
}

/// Deserialize an optional numeric-convertible field. Absent, `null` and
/// empty-string values become `None`; anything else must parse.
pub fn de_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
  D: Deserializer<'de>,
{
  match Option::<NumberOrString>::deserialize(deserializer)? {
    None => Ok(None),
    Some(NumberOrString::Number(n)) => Ok(Some(n)),
    Some(NumberOrString::Text(s)) if s.trim().is_empty() => Ok(None),
    Some(NumberOrString::Text(s)) => s
      .trim()
      .parse::<f64>()
      .map(Some)
      .map_err(|e| serde::de::Error::custom(format!("invalid number '{}': {}", s, e))),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde::Deserialize;

  #[derive(Deserialize)]
  struct Holder {
    #[serde(deserialize_with = "de_f64")]
    value: f64,
  }

  #[test]
  fn test_de_f64_accepts_strings_and_numbers() {
    let h: Holder = serde_json::from_str(r#"{"value": "181.39000"}"#).unwrap();
    assert_eq!(h.value, 181.39);

    let h: Holder = serde_json::from_str(r#"{"value": 42}"#).unwrap();
    assert_eq!(h.value, 42.0);
  }

  #[test]
  fn test_de_f64_rejects_garbage() {
    assert!(serde_json::from_str::<Holder>(r#"{"value": "n/a"}"#).is_err());
    assert!(serde_json::from_str::<Holder>(r#"{"value": ""}"#).is_err());
    assert!(serde_json::from_str::<Holder>(r#"{"value": null}"#).is_err());
  }

  #[derive(Deserialize)]
  struct OptHolder {
    #[serde(default, deserialize_with = "de_opt_f64")]
    value: Option<f64>,
  }

  #[test]
  fn test_de_opt_f64() {
    let h: OptHolder = serde_json::from_str(r#"{"value": "1.5"}"#).unwrap();
    assert_eq!(h.value, Some(1.5));

    let h: OptHolder = serde_json::from_str(r#"{}"#).unwrap();
    assert_eq!(h.value, None);

    let h: OptHolder = serde_json::from_str(r#"{"value": null}"#).unwrap();
    assert_eq!(h.value, None);

    let h: OptHolder = serde_json::from_str(r#"{"value": ""}"#).unwrap();
    assert_eq!(h.value, None);

    assert!(serde_json::from_str::<OptHolder>(r#"{"value": "n/a"}"#).is_err());
  }
}
