//! Legacy key names accepted by the configuration store.

use tracing::debug;

use super::keys;
use super::Configuration;

/// Alias table: (legacy key, canonical key)
pub const ALIASES: &[(&str, &str)] = &[
    ("master_computation", keys::MASTER_COMPUTATION_CLASS),
    ("computation", keys::COMPUTATION_CLASS),
    ("input_graph_path", keys::GRAPH_PATH),
    ("input_graph_local", keys::GRAPH_LOCAL),
    ("output_active", keys::OUTPUT_ACTIVE),
    ("output_path", keys::OUTPUT_PATH),
];

/// Canonical key for a legacy alias, if it is one
pub fn canonical_key(key: &str) -> Option<&'static str> {
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, canonical)| *canonical)
}

impl Configuration {
    /// Move every aliased entry to its canonical key.
    ///
    /// The alias key is removed and its value replaces any value already
    /// stored under the canonical key. Returns the number of entries moved;
    /// a second call finds nothing left to move.
    pub fn resolve_aliases(&mut self) -> usize {
        let mut resolved = 0;
        for (alias, canonical) in ALIASES {
            if let Some(value) = self.remove(alias) {
                debug!(alias = %alias, canonical = %canonical, "Resolved configuration alias");
                self.set(*canonical, value);
                resolved += 1;
            }
        }
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigValue;

    #[test]
    fn test_input_graph_path_alias() {
        let mut config = Configuration::new();
        config.set("input_graph_path", "graphs/citeseer.graph");

        assert_eq!(config.resolve_aliases(), 1);
        assert!(!config.contains("input_graph_path"));
        assert_eq!(
            config.get::<String>(keys::GRAPH_PATH, String::new()).unwrap(),
            "graphs/citeseer.graph"
        );
    }

    #[test]
    fn test_alias_overrides_canonical_value() {
        let mut config = Configuration::new();
        config.set(keys::OUTPUT_ACTIVE, true);
        config.set("output_active", false);

        config.resolve_aliases();
        assert_eq!(config.get_raw(keys::OUTPUT_ACTIVE), Some(&ConfigValue::Boolean(false)));
    }

    #[test]
    fn test_resolution_is_one_shot() {
        let mut config = Configuration::new();
        for (alias, _) in ALIASES {
            config.set(*alias, "x");
        }

        assert_eq!(config.resolve_aliases(), ALIASES.len());
        assert_eq!(config.resolve_aliases(), 0);
        assert_eq!(config.len(), ALIASES.len());
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let mut config = Configuration::new();
        config.set("Output_Path", "elsewhere");

        assert_eq!(config.resolve_aliases(), 0);
        assert!(config.contains("Output_Path"));
        assert_eq!(canonical_key("OUTPUT_PATH"), None);
        assert_eq!(canonical_key("output_path"), Some(keys::OUTPUT_PATH));
    }
}
