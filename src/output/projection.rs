//! Config-driven field inclusion.
//!
//! Each tool declares a closed set of output fields. An [`OutputConfig`] maps
//! those fields to a [`FieldMode`]; anything not configured falls back to the
//! field's default, which is `notEmpty` unless the tool says otherwise.

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// When a field is emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldMode {
    /// Always emitted, even when empty.
    Always,
    /// Emitted only when it has a value.
    #[default]
    NotEmpty,
    /// Never emitted.
    Never,
}

impl FieldMode {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldMode::Always => "always",
            FieldMode::NotEmpty => "notEmpty",
            FieldMode::Never => "never",
        }
    }

    /// Unknown mode names read as `notEmpty`.
    pub fn parse(value: &str) -> Self {
        match value {
            "always" => FieldMode::Always,
            "never" => FieldMode::Never,
            _ => FieldMode::NotEmpty,
        }
    }

    pub fn includes(self, has_value: bool) -> bool {
        match self {
            FieldMode::Always => true,
            FieldMode::Never => false,
            FieldMode::NotEmpty => has_value,
        }
    }
}

impl Serialize for FieldMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FieldMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(FieldMode::parse(&value))
    }
}

/// A tool's closed set of output fields.
pub trait OutputField: Copy + Eq + Hash + Debug + 'static {
    const ALL: &'static [Self];

    /// Key used both in the config file and in the projected output.
    fn key(self) -> &'static str;

    fn default_mode(self) -> FieldMode {
        FieldMode::NotEmpty
    }

    fn from_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|field| field.key() == key)
    }
}

/// Per-field display modes, layered over the field defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig<F: OutputField> {
    overrides: HashMap<F, FieldMode>,
}

impl<F: OutputField> Default for OutputConfig<F> {
    fn default() -> Self {
        Self {
            overrides: HashMap::new(),
        }
    }
}

impl<F: OutputField> OutputConfig<F> {
    pub fn mode_of(&self, field: F) -> FieldMode {
        self.overrides
            .get(&field)
            .copied()
            .unwrap_or_else(|| field.default_mode())
    }

    pub fn set(&mut self, field: F, mode: FieldMode) {
        self.overrides.insert(field, mode);
    }

    pub fn with(mut self, field: F, mode: FieldMode) -> Self {
        self.set(field, mode);
        self
    }

    pub fn should_include(&self, field: F, has_value: bool) -> bool {
        self.mode_of(field).includes(has_value)
    }

    /// Starts a projected record.
    pub fn project(&self) -> Projection<'_, F> {
        Projection {
            config: self,
            map: Map::new(),
        }
    }
}

impl<F: OutputField> Serialize for OutputConfig<F> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(F::ALL.len()))?;
        for field in F::ALL {
            map.serialize_entry(field.key(), &self.mode_of(*field))?;
        }
        map.end()
    }
}

impl<'de, F: OutputField> Deserialize<'de> for OutputConfig<F> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = HashMap::<String, FieldMode>::deserialize(deserializer)?;
        let mut config = Self::default();
        for (key, mode) in raw {
            match F::from_key(&key) {
                Some(field) => config.set(field, mode),
                None => log::debug!("Ignoring unknown output field {:?}", key),
            }
        }
        Ok(config)
    }
}

/// Builds the field-inclusion map for one record.
pub struct Projection<'a, F: OutputField> {
    config: &'a OutputConfig<F>,
    map: Map<String, Value>,
}

impl<F: OutputField> Projection<'_, F> {
    /// Adds `field` if its mode allows it given whether it has a value.
    pub fn field(mut self, field: F, has_value: bool, value: impl Into<Value>) -> Self {
        if self.config.should_include(field, has_value) {
            self.map.insert(field.key().to_string(), value.into());
        }
        self
    }

    pub fn text(self, field: F, value: &str) -> Self {
        self.field(field, !value.is_empty(), value)
    }

    /// Zero is treated as absent, the way the API leaves unset ids and revisions.
    pub fn number(self, field: F, value: u32) -> Self {
        self.field(field, value != 0, value)
    }

    /// Adds a key that is not subject to configuration.
    pub fn always(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.map.insert(key.to_string(), value.into());
        self
    }

    pub fn finish(self) -> Map<String, Value> {
        self.map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Field {
        Name,
        Notes,
    }

    impl OutputField for Field {
        const ALL: &'static [Self] = &[Field::Name, Field::Notes];

        fn key(self) -> &'static str {
            match self {
                Field::Name => "name",
                Field::Notes => "notes",
            }
        }

        fn default_mode(self) -> FieldMode {
            match self {
                Field::Notes => FieldMode::Always,
                Field::Name => FieldMode::NotEmpty,
            }
        }
    }

    #[test]
    fn modes_follow_the_inclusion_rule() {
        assert!(FieldMode::Always.includes(false));
        assert!(!FieldMode::Never.includes(true));
        assert!(FieldMode::NotEmpty.includes(true));
        assert!(!FieldMode::NotEmpty.includes(false));
    }

    #[test]
    fn unknown_mode_reads_as_not_empty() {
        let mode: FieldMode = serde_json::from_str("\"sometimes\"").unwrap();
        assert_eq!(mode, FieldMode::NotEmpty);
    }

    #[test]
    fn config_merges_over_defaults_and_ignores_unknown_keys() {
        let config: OutputConfig<Field> =
            serde_json::from_str(r#"{"name": "never", "bogus": "always"}"#).unwrap();
        assert_eq!(config.mode_of(Field::Name), FieldMode::Never);
        assert_eq!(config.mode_of(Field::Notes), FieldMode::Always);
    }

    #[test]
    fn config_serializes_effective_modes() {
        let config = OutputConfig::<Field>::default().with(Field::Name, FieldMode::Never);
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value, serde_json::json!({"name": "never", "notes": "always"}));
    }

    #[test]
    fn never_drops_a_present_value() {
        let config = OutputConfig::<Field>::default().with(Field::Name, FieldMode::Never);
        let map = config.project().text(Field::Name, "value").finish();
        assert!(!map.contains_key("name"));
    }

    #[test]
    fn always_keeps_an_empty_value() {
        let config = OutputConfig::<Field>::default();
        let map = config.project().text(Field::Notes, "").finish();
        assert_eq!(map.get("notes"), Some(&Value::String(String::new())));
    }

    #[test]
    fn not_empty_tracks_the_value() {
        let config = OutputConfig::<Field>::default();
        assert!(!config.project().text(Field::Name, "").finish().contains_key("name"));
        assert!(config.project().text(Field::Name, "x").finish().contains_key("name"));
        assert!(!config.project().number(Field::Name, 0).finish().contains_key("name"));
    }

    #[test]
    fn always_keys_bypass_configuration() {
        let config = OutputConfig::<Field>::default();
        let map = config.project().always("items", Vec::<Value>::new()).finish();
        assert_eq!(map.get("items"), Some(&Value::Array(vec![])));
    }
}
