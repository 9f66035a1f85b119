//! Candidate endpoint catalog builder.
//!
//! Assembles the ordered list of base URLs discovery will probe. Pure data
//! generation: no network I/O, no side effects, deterministic for a given
//! history + configuration, so discovery and recovery can rebuild it freely.

use crate::config::DiscoveryConfig;
use std::collections::HashSet;

/// Ordered, deduplicated set of candidate URLs.
///
/// Priority order:
/// 1. previously-successful endpoints (most recent first, already capped
///    by the history store)
/// 2. address patterns crossed with common inference ports
/// 3. service hostnames crossed with DNS suffixes and the same ports
///
/// First occurrence wins on duplicates, so history entries always keep
/// their front position.
pub fn build_candidates(history: &[String], config: &DiscoveryConfig) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    let mut push = |url: String, seen: &mut HashSet<String>, out: &mut Vec<String>| {
        let normalized = normalize(&url);
        if seen.insert(normalized.clone()) {
            out.push(normalized);
        }
    };

    for url in history {
        push(url.clone(), &mut seen, &mut candidates);
    }

    for address in &config.address_patterns {
        for port in &config.ports {
            push(
                format!("http://{}:{}", address, port),
                &mut seen,
                &mut candidates,
            );
        }
    }

    for hostname in &config.service_hostnames {
        for suffix in &config.dns_suffixes {
            for port in &config.ports {
                push(
                    format!("http://{}{}:{}", hostname, suffix, port),
                    &mut seen,
                    &mut candidates,
                );
            }
        }
    }

    candidates
}

/// High-probability candidates for the sequential quick path: persisted
/// history first, then the configured quick-probe defaults.
pub fn quick_candidates(history: &[String], config: &DiscoveryConfig) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for url in history.iter().chain(config.quick_probe_urls.iter()) {
        let normalized = normalize(url);
        if seen.insert(normalized.clone()) {
            candidates.push(normalized);
        }
    }

    candidates
}

/// Canonical form used for dedup: no trailing slash.
fn normalize(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
