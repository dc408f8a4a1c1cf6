//! Planner configuration.

use serde::Deserialize;

/// Configuration for the planner.
///
/// Deserializes from JSON with every field optional; missing fields keep
/// their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlannerConfig {
    /// Fixpoint budget per rewrite rule.
    pub max_rule_iterations: usize,
    /// Cut incompatible taps away from groupings they share.
    pub normalize_heterogeneous_sources: bool,
    /// Replace a boundary with the tap that directly follows it.
    pub collapse_adjacent_boundaries: bool,
    /// Scheme of planner-inserted boundary taps.
    pub temp_scheme: String,
    /// Experimental: keep parallel links in remainder partitions.
    pub multi_edge_remainder: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_rule_iterations: 1000,
            normalize_heterogeneous_sources: true,
            collapse_adjacent_boundaries: true,
            temp_scheme: "sequence".to_string(),
            multi_edge_remainder: false,
        }
    }
}

impl PlannerConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn with_max_rule_iterations(mut self, max: usize) -> Self {
        self.max_rule_iterations = max;
        self
    }

    pub fn with_heterogeneous_sources(mut self, enable: bool) -> Self {
        self.normalize_heterogeneous_sources = enable;
        self
    }

    pub fn with_boundary_collapse(mut self, enable: bool) -> Self {
        self.collapse_adjacent_boundaries = enable;
        self
    }

    pub fn with_temp_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.temp_scheme = scheme.into();
        self
    }

    pub fn with_multi_edge_remainder(mut self, enable: bool) -> Self {
        self.multi_edge_remainder = enable;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = PlannerConfig::default();

        assert_eq!(config.max_rule_iterations, 1000);
        assert!(config.normalize_heterogeneous_sources);
        assert!(config.collapse_adjacent_boundaries);
        assert_eq!(config.temp_scheme, "sequence");
        assert!(!config.multi_edge_remainder);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = PlannerConfig::from_json(r#"{ "temp_scheme": "avro" }"#).unwrap();

        assert_eq!(config, PlannerConfig::default().with_temp_scheme("avro"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(PlannerConfig::from_json(r#"{ "max_iterations": 3 }"#).is_err());
    }
}
