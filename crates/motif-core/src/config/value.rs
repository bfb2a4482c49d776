//! Variant values held by the configuration store.

use serde::{Deserialize, Serialize};

/// Reference to a pluggable strategy by registry identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StrategyRef {
    /// Identifier registered in the strategy registry
    pub strategy: String,
}

impl StrategyRef {
    /// Create a reference to the given identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self { strategy: id.into() }
    }
}

/// Configuration value types
///
/// Variant order matters for untagged deserialization: whole numbers become
/// `Integer`, `{"strategy": "..."}` becomes `Strategy` and any other JSON
/// object or array is kept verbatim as `Object`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Strategy(StrategyRef),
    Object(serde_json::Value),
}

impl ConfigValue {
    /// Name of the variant, used in type-mismatch errors
    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::Boolean(_) => "boolean",
            ConfigValue::Integer(_) => "integer",
            ConfigValue::Float(_) => "float",
            ConfigValue::String(_) => "string",
            ConfigValue::Strategy(_) => "strategy",
            ConfigValue::Object(_) => "object",
        }
    }

    /// Parse a scalar from its textual form (environment overrides).
    ///
    /// Tries boolean, then integer, then float; falls back to a string.
    pub fn parse_scalar(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed {
            "true" => return ConfigValue::Boolean(true),
            "false" => return ConfigValue::Boolean(false),
            _ => {}
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return ConfigValue::Integer(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            if f.is_finite() {
                return ConfigValue::Float(f);
            }
        }
        ConfigValue::String(raw.to_string())
    }

    /// Try to get as i64
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Strategy identifier, accepting either a strategy reference or a plain string
    pub fn as_strategy_id(&self) -> Option<&str> {
        match self {
            ConfigValue::Strategy(r) => Some(&r.strategy),
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(v: bool) -> Self {
        ConfigValue::Boolean(v)
    }
}

impl From<i64> for ConfigValue {
    fn from(v: i64) -> Self {
        ConfigValue::Integer(v)
    }
}

impl From<i32> for ConfigValue {
    fn from(v: i32) -> Self {
        ConfigValue::Integer(i64::from(v))
    }
}

impl From<u32> for ConfigValue {
    fn from(v: u32) -> Self {
        ConfigValue::Integer(i64::from(v))
    }
}

impl From<f64> for ConfigValue {
    fn from(v: f64) -> Self {
        ConfigValue::Float(v)
    }
}

impl From<&str> for ConfigValue {
    fn from(v: &str) -> Self {
        ConfigValue::String(v.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(v: String) -> Self {
        ConfigValue::String(v)
    }
}

impl From<StrategyRef> for ConfigValue {
    fn from(v: StrategyRef) -> Self {
        ConfigValue::Strategy(v)
    }
}

impl From<serde_json::Value> for ConfigValue {
    fn from(v: serde_json::Value) -> Self {
        ConfigValue::Object(v)
    }
}

/// Types that can be read out of a [`ConfigValue`] without coercion
pub trait FromConfigValue: Sized {
    /// Name reported when the stored value has a different type
    const EXPECTED: &'static str;

    /// Extract the value, or `None` if the variant does not match
    fn from_config_value(value: &ConfigValue) -> Option<Self>;
}

impl FromConfigValue for bool {
    const EXPECTED: &'static str = "boolean";

    fn from_config_value(value: &ConfigValue) -> Option<Self> {
        value.as_bool()
    }
}

impl FromConfigValue for i64 {
    const EXPECTED: &'static str = "integer";

    fn from_config_value(value: &ConfigValue) -> Option<Self> {
        value.as_i64()
    }
}

macro_rules! integer_from_config_value {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl FromConfigValue for $ty {
                const EXPECTED: &'static str = $name;

                fn from_config_value(value: &ConfigValue) -> Option<Self> {
                    value.as_i64().and_then(|i| <$ty>::try_from(i).ok())
                }
            }
        )*
    };
}

integer_from_config_value! {
    i32 => "32-bit integer",
    u32 => "non-negative 32-bit integer",
    u64 => "non-negative integer",
    usize => "non-negative integer",
}

impl FromConfigValue for f64 {
    const EXPECTED: &'static str = "float";

    fn from_config_value(value: &ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl FromConfigValue for String {
    const EXPECTED: &'static str = "string";

    fn from_config_value(value: &ConfigValue) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FromConfigValue for StrategyRef {
    const EXPECTED: &'static str = "strategy";

    fn from_config_value(value: &ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::Strategy(r) => Some(r.clone()),
            _ => None,
        }
    }
}

impl FromConfigValue for serde_json::Value {
    const EXPECTED: &'static str = "object";

    fn from_config_value(value: &ConfigValue) -> Option<Self> {
        match value {
            ConfigValue::Object(v) => Some(v.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalar() {
        assert_eq!(ConfigValue::parse_scalar("true"), ConfigValue::Boolean(true));
        assert_eq!(ConfigValue::parse_scalar("42"), ConfigValue::Integer(42));
        assert_eq!(ConfigValue::parse_scalar("0.5"), ConfigValue::Float(0.5));
        assert_eq!(
            ConfigValue::parse_scalar("yarn-client"),
            ConfigValue::String("yarn-client".to_string())
        );
    }

    #[test]
    fn test_no_implicit_coercion() {
        let int = ConfigValue::Integer(3);
        assert_eq!(i64::from_config_value(&int), Some(3));
        assert_eq!(f64::from_config_value(&int), None);
        assert_eq!(String::from_config_value(&int), None);

        let negative = ConfigValue::Integer(-1);
        assert_eq!(u32::from_config_value(&negative), None);
        assert_eq!(i32::from_config_value(&negative), Some(-1));
    }

    #[test]
    fn test_untagged_deserialization() {
        let values: Vec<ConfigValue> =
            serde_json::from_str(r#"[true, 4, 1.5, "1g", {"strategy": "triangles"}, {"k": 1}]"#)
                .unwrap();

        assert_eq!(values[0], ConfigValue::Boolean(true));
        assert_eq!(values[1], ConfigValue::Integer(4));
        assert_eq!(values[2], ConfigValue::Float(1.5));
        assert_eq!(values[3], ConfigValue::String("1g".to_string()));
        assert_eq!(values[4], ConfigValue::Strategy(StrategyRef::new("triangles")));
        assert_eq!(values[5], ConfigValue::Object(serde_json::json!({"k": 1})));
    }

    #[test]
    fn test_strategy_id_accepts_plain_string() {
        assert_eq!(ConfigValue::from("motifs").as_strategy_id(), Some("motifs"));
        assert_eq!(
            ConfigValue::from(StrategyRef::new("cliques")).as_strategy_id(),
            Some("cliques")
        );
        assert_eq!(ConfigValue::from(7i64).as_strategy_id(), None);
    }
}
