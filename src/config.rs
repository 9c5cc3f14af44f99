use serde::{Deserialize, Serialize};

/// Engine configuration read once at daemon startup.
///
/// `protection_interval_secs` and the `min_reclaimable_blocks` /
/// `cleaning_interval_secs` pair are carried from `cleanerd.h` even
/// though the scheduling loop itself is out of scope:
/// a caller's scheduler still needs somewhere to read these from, and
/// `min_reclaimable_blocks` is useful informational output for deciding
/// whether a cycle's selection was worth acting on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Name of the policy to select from the registry, e.g. "timestamp".
    pub policy_name: String,
    /// Maximum number of segments returned per cleaning cycle.
    pub nsegments_per_clean_max: usize,
    /// Seconds walked back from the checkpoint tip to derive the
    /// protection checkpoint (consumed by an external checkpoint
    /// oracle, not by the engine itself).
    pub protection_interval_secs: i64,
    /// Minimum reclaimable block count for a cycle to be considered
    /// worthwhile by the caller. Informational; the engine does not
    /// enforce it.
    pub min_reclaimable_blocks: u64,
    /// Seconds between cleaning cycles. Informational; the engine does
    /// not schedule itself.
    pub cleaning_interval_secs: u64,
}

impl EngineConfig {
    /// Sensible defaults for a production daemon.
    pub fn production() -> Self {
        EngineConfig {
            policy_name: "timestamp".to_string(),
            nsegments_per_clean_max: 10,
            protection_interval_secs: 3600,
            min_reclaimable_blocks: 256,
            cleaning_interval_secs: 60,
        }
    }

    /// Smaller capacity and tighter intervals for tests and the demo CLI.
    pub fn testing() -> Self {
        let mut config = Self::production();
        config.nsegments_per_clean_max = 4;
        config.protection_interval_secs = 60;
        config.min_reclaimable_blocks = 1;
        config
    }

    /// Load from JSON.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).map_err(|e| anyhow::anyhow!("failed to parse config: {}", e))
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Validate configuration; returns all violations found rather than
    /// stopping at the first.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.policy_name.is_empty() {
            errors.push("policy_name must not be empty".to_string());
        }
        if self.nsegments_per_clean_max == 0 {
            errors.push("nsegments_per_clean_max must be > 0".to_string());
        }
        if self.protection_interval_secs < 0 {
            errors.push("protection_interval_secs must be >= 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig::production()
    }
}

/// Fluent builder for assembling a validated `EngineConfig`.
pub struct ConfigBuilder {
    config: EngineConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        ConfigBuilder {
            config: EngineConfig::production(),
        }
    }

    pub fn from_preset(preset: &str) -> Self {
        let config = match preset {
            "testing" => EngineConfig::testing(),
            _ => EngineConfig::production(),
        };
        ConfigBuilder { config }
    }

    pub fn policy_name(mut self, name: impl Into<String>) -> Self {
        self.config.policy_name = name.into();
        self
    }

    pub fn nsegments_per_clean_max(mut self, n: usize) -> Self {
        self.config.nsegments_per_clean_max = n;
        self
    }

    pub fn protection_interval_secs(mut self, secs: i64) -> Self {
        self.config.protection_interval_secs = secs;
        self
    }

    pub fn build(self) -> anyhow::Result<EngineConfig> {
        match self.config.validate() {
            Ok(()) => Ok(self.config),
            Err(errors) => Err(anyhow::anyhow!(
                "configuration validation failed: {}",
                errors.join("; ")
            )),
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_defaults_valid() {
        assert!(EngineConfig::production().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let mut cfg = EngineConfig::production();
        cfg.nsegments_per_clean_max = 0;
        let errors = cfg.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.contains("nsegments_per_clean_max")));
    }

    #[test]
    fn test_json_round_trip() {
        let cfg = EngineConfig::testing();
        let json = cfg.to_json();
        let parsed = EngineConfig::from_json(&json).unwrap();
        assert_eq!(parsed.policy_name, cfg.policy_name);
        assert_eq!(parsed.nsegments_per_clean_max, cfg.nsegments_per_clean_max);
    }

    #[test]
    fn test_config_file_round_trip() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cleanerd.json");
        let cfg = ConfigBuilder::new()
            .policy_name("segregation")
            .nsegments_per_clean_max(12)
            .build()
            .unwrap();

        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(cfg.to_json().as_bytes()).unwrap();
        drop(file);

        let contents = std::fs::read_to_string(&path).unwrap();
        let loaded = EngineConfig::from_json(&contents).unwrap();
        assert_eq!(loaded.policy_name, "segregation");
        assert_eq!(loaded.nsegments_per_clean_max, 12);
    }

    #[test]
    fn test_builder() {
        let cfg = ConfigBuilder::new()
            .policy_name("greedy")
            .nsegments_per_clean_max(8)
            .build()
            .unwrap();
        assert_eq!(cfg.policy_name, "greedy");
        assert_eq!(cfg.nsegments_per_clean_max, 8);
    }
}
