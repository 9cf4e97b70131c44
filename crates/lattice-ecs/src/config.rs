use serde::{Deserialize, Serialize};

/// Tuning knobs for a [`World`](crate::World).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcsConfig {
    /// Number of dense slots each component storage reserves up front.
    /// Storages double from here when they fill up.
    pub initial_capacity: usize,
}

impl EcsConfig {
    pub const DEFAULT_INITIAL_CAPACITY: usize = 100;
}

impl Default for EcsConfig {
    fn default() -> Self {
        Self {
            initial_capacity: Self::DEFAULT_INITIAL_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_capacity() {
        assert_eq!(EcsConfig::default().initial_capacity, 100);
    }
}
