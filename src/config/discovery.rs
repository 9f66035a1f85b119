//! Discovery configuration

use serde::{Deserialize, Serialize};

/// Candidate generation and probing configuration.
///
/// The literal address/port/hostname lists are heuristics for where a
/// same-network inference server tends to live; every one of them is
/// overridable. Ordering guarantees (history first, first-seen dedup)
/// come from the catalog builder, not from these lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// High-probability endpoints probed sequentially before the full sweep
    pub quick_probe_urls: Vec<String>,
    /// Host addresses crossed with `ports` (loopback plus CGNAT-style guesses)
    pub address_patterns: Vec<String>,
    /// Common inference-server ports
    pub ports: Vec<u16>,
    /// Service hostnames crossed with `dns_suffixes` and `ports`
    pub service_hostnames: Vec<String>,
    /// DNS suffix variants for the service hostnames ("" means bare hostname)
    pub dns_suffixes: Vec<String>,
    /// Concurrency cap for batch probing
    pub max_concurrent: usize,
    /// Per-probe timeout on the quick path (milliseconds)
    pub quick_timeout_ms: u64,
    /// Per-probe timeout on the batch path (milliseconds)
    pub probe_timeout_ms: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            quick_probe_urls: vec![
                "http://127.0.0.1:11434".to_string(),
                "http://localhost:11434".to_string(),
                "http://127.0.0.1:1234".to_string(),
                "http://localhost:8080".to_string(),
            ],
            address_patterns: vec![
                "127.0.0.1".to_string(),
                "localhost".to_string(),
                "100.64.0.1".to_string(),
                "100.64.0.2".to_string(),
                "100.64.0.3".to_string(),
                "100.100.100.100".to_string(),
            ],
            ports: vec![11434, 1234, 8080, 8000, 5000],
            service_hostnames: vec![
                "ollama".to_string(),
                "llm".to_string(),
                "inference".to_string(),
                "ai-server".to_string(),
            ],
            dns_suffixes: vec![
                "".to_string(),
                ".local".to_string(),
                ".lan".to_string(),
                ".home".to_string(),
            ],
            max_concurrent: 5,
            quick_timeout_ms: 3000,
            probe_timeout_ms: 3000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discovery_config_defaults() {
        let config = DiscoveryConfig::default();
        assert_eq!(config.max_concurrent, 5);
        assert_eq!(config.quick_timeout_ms, 3000);
        assert!(config.ports.contains(&11434));
        assert!(config.dns_suffixes.contains(&"".to_string()));
    }

    #[test]
    fn test_discovery_config_toml_roundtrip() {
        let toml_str = r#"
            max_concurrent = 3
            ports = [11434]
        "#;
        let config: DiscoveryConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.max_concurrent, 3);
        assert_eq!(config.ports, vec![11434]);
        // Unspecified sections keep defaults
        assert_eq!(config.quick_timeout_ms, 3000);
    }
}
