use std::collections::HashMap;

use crate::error::CleanerError;
use crate::policies::cost_benefit::CostBenefitPolicy;
use crate::policies::greedy::GreedyPolicy;
use crate::policies::segregation::HotColdPolicy;
use crate::policies::timestamp::TimestampPolicy;
use crate::policy::Policy;

/// Name-to-implementation lookup table for cleaning policies, owned
/// rather than global so tests can build independent registries.
pub struct PolicyRegistry {
    policies: HashMap<String, Box<dyn Policy>>,
}

impl PolicyRegistry {
    pub fn new() -> Self {
        PolicyRegistry {
            policies: HashMap::new(),
        }
    }

    /// A registry pre-loaded with the four built-in policies.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(TimestampPolicy::new()));
        registry.register(Box::new(GreedyPolicy::new()));
        registry.register(Box::new(CostBenefitPolicy::new()));
        registry.register(Box::new(HotColdPolicy::new()));
        registry
    }

    pub fn register(&mut self, policy: Box<dyn Policy>) {
        self.policies.insert(policy.name().to_string(), policy);
    }

    pub fn get(&self, name: &str) -> Result<&dyn Policy, CleanerError> {
        self.policies
            .get(name)
            .map(|p| p.as_ref())
            .ok_or_else(|| CleanerError::UnknownPolicy(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.policies.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl Default for PolicyRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
