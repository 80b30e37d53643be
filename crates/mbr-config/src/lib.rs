//! mbr-config
//!
//! Layered YAML configuration for reconciliation runs.
//!
//! - Documents are deep-merged in order: earlier docs are base, later docs override.
//! - The merged document is canonicalised (object keys sorted at every depth) and
//!   hashed with SHA-256. The hash is recorded in every run manifest.
//! - An unused-key guard reports leaf keys that no reader consumes for the
//!   selected report kind. Callers choose whether that is a warning or an error.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;

// ---------------------------------------------------------------------------
// Report kinds
// ---------------------------------------------------------------------------

/// Which report a run produces. Selects the consumed-key registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    MassBalance,
    Discrepancy,
    Compliance,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::MassBalance => "mass_balance",
            ReportKind::Discrepancy => "discrepancy",
            ReportKind::Compliance => "compliance",
        }
    }

    /// Case-insensitive; accepts `-` in place of `_`.
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "mass_balance" => Ok(ReportKind::MassBalance),
            "discrepancy" => Ok(ReportKind::Discrepancy),
            "compliance" => Ok(ReportKind::Compliance),
            other => bail!(
                "REPORT_KIND_UNKNOWN: '{}'; expected one of: mass_balance | discrepancy | compliance",
                other
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Unused-key guard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusedKeyPolicy {
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnusedKeyReport {
    pub report_kind: String,
    /// Consumed JSON-pointer prefixes used for this analysis (sorted, unique)
    pub consumed_prefixes: Vec<String>,
    /// Unused leaf pointers (sorted, unique)
    pub unused_leaf_pointers: Vec<String>,
}

impl UnusedKeyReport {
    pub fn is_clean(&self) -> bool {
        self.unused_leaf_pointers.is_empty()
    }
}

/// JSON-pointer prefixes actually read for a report kind.
///
/// A leaf under any listed prefix counts as consumed.
///
/// Current readers:
/// - `mbr_balance::BalanceConfig::from_config_json`: `/thresholds`, `/inference`, `/analysis`
/// - `mbr-report` (compliance only): `/compliance/standard`
pub fn consumed_pointers_for_kind(kind: ReportKind) -> &'static [&'static str] {
    match kind {
        ReportKind::MassBalance | ReportKind::Discrepancy => {
            &["/thresholds", "/inference", "/analysis"]
        }
        ReportKind::Compliance => &[
            "/thresholds",
            "/inference",
            "/analysis",
            "/compliance/standard",
        ],
    }
}

/// Leaf keys of `config_json` that `kind` never reads, sorted.
///
/// `Fail` turns a non-empty result into a `CONFIG_UNUSED_KEYS` error; `Warn`
/// always returns the report and leaves logging to the caller.
pub fn report_unused_keys(
    kind: ReportKind,
    config_json: &Value,
    policy: UnusedKeyPolicy,
) -> Result<UnusedKeyReport> {
    let consumed_prefixes: Vec<String> = consumed_pointers_for_kind(kind)
        .iter()
        .map(|p| normalize_pointer(p))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let unused_leaf_pointers: Vec<String> = leaf_pointers(config_json)
        .into_iter()
        .filter(|leaf| !consumed_prefixes.iter().any(|c| is_prefix_pointer(c, leaf)))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let report = UnusedKeyReport {
        report_kind: kind.as_str().to_string(),
        consumed_prefixes,
        unused_leaf_pointers,
    };

    if policy == UnusedKeyPolicy::Fail && !report.is_clean() {
        let shown = &report.unused_leaf_pointers[..report.unused_leaf_pointers.len().min(12)];
        bail!(
            "CONFIG_UNUSED_KEYS (kind={}): {} unused config leaf key(s) detected. \
            Remove them or update the consumed registry. First few: {:?}",
            report.report_kind,
            report.unused_leaf_pointers.len(),
            shown
        );
    }

    Ok(report)
}

/// Leading "/", no trailing "/". Blank input is the root pointer "/".
fn normalize_pointer(p: &str) -> String {
    format!("/{}", p.trim().trim_matches('/'))
}

/// "/a/b" consumes "/a/b" and "/a/b/c" but not "/a/bc". "/" consumes everything.
fn is_prefix_pointer(prefix: &str, leaf: &str) -> bool {
    prefix == "/"
        || leaf
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// RFC 6901 pointer of every scalar leaf. Empty containers have none.
fn leaf_pointers(v: &Value) -> Vec<String> {
    fn walk(v: &Value, at: String, out: &mut Vec<String>) {
        match v {
            Value::Object(map) => {
                for (k, child) in map {
                    walk(child, format!("{at}/{}", escape_pointer_token(k)), out);
                }
            }
            Value::Array(items) => {
                for (i, child) in items.iter().enumerate() {
                    walk(child, format!("{at}/{i}"), out);
                }
            }
            _ if at.is_empty() => out.push("/".to_string()),
            _ => out.push(at),
        }
    }

    let mut out = Vec::new();
    walk(v, String::new(), &mut out);
    out
}

fn escape_pointer_token(s: &str) -> String {
    s.replace('~', "~0").replace('/', "~1")
}

// ---------------------------------------------------------------------------
// Loading + hashing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// SHA-256 (hex) of `canonical_json`.
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
}

/// Read each path and merge in order. See [`load_layered_yaml_from_strings`].
pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let docs = paths
        .iter()
        .map(|p| fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {p}")))
        .collect::<Result<Vec<String>>>()?;

    let doc_refs: Vec<&str> = docs.iter().map(String::as_str).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let mut merged = Value::Object(Map::new());
    for (i, raw) in yaml_docs.iter().enumerate() {
        let layer: serde_yaml::Value =
            serde_yaml::from_str(raw).with_context(|| format!("invalid yaml (layer {i})"))?;
        let layer = serde_json::to_value(layer)
            .with_context(|| format!("yaml->json conversion failed (layer {i})"))?;
        // An empty document is a no-op layer, not an override to null.
        if !layer.is_null() {
            merge_into(&mut merged, layer);
        }
    }

    let canonical_json = canonicalize_json(&merged)?;
    Ok(LoadedConfig {
        config_hash: hex::encode(Sha256::digest(canonical_json.as_bytes())),
        canonical_json,
        config_json: merged,
    })
}

/// Objects merge key by key; any other overlay value replaces the base.
fn merge_into(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (k, v) in overlay_map {
                merge_into(base_map.entry(k).or_insert(Value::Null), v);
            }
        }
        (slot, v) => *slot = v,
    }
}

/// Compact JSON with object keys sorted at every depth, so the hash does not
/// depend on YAML key order or on serde_json's map implementation.
fn canonicalize_json(v: &Value) -> Result<String> {
    serde_json::to_string(&sorted_keys(v)).context("canonical json serialize failed")
}

fn sorted_keys(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let sorted: BTreeMap<&String, Value> =
                map.iter().map(|(k, vv)| (k, sorted_keys(vv))).collect();
            Value::Object(sorted.into_iter().map(|(k, vv)| (k.clone(), vv)).collect())
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sorted_keys).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_requires_segment_boundary() {
        assert!(is_prefix_pointer("/thresholds", "/thresholds/warning_pct"));
        assert!(is_prefix_pointer("/thresholds", "/thresholds"));
        assert!(!is_prefix_pointer("/thresholds", "/thresholds_old/x"));
        assert!(is_prefix_pointer("/", "/anything"));
    }

    #[test]
    fn normalize_adds_leading_and_strips_trailing_slash() {
        assert_eq!(normalize_pointer("analysis/"), "/analysis");
        assert_eq!(normalize_pointer(""), "/");
        assert_eq!(normalize_pointer("///"), "/");
    }

    #[test]
    fn empty_containers_have_no_leaves() {
        let v = serde_json::json!({ "legacy": {}, "list": [], "x": 1 });
        assert_eq!(leaf_pointers(&v), vec!["/x".to_string()]);
        assert!(leaf_pointers(&serde_json::json!({})).is_empty());
    }

    #[test]
    fn pointer_tokens_are_escaped() {
        let v = serde_json::json!({ "a/b": { "c~d": 1 } });
        assert_eq!(leaf_pointers(&v), vec!["/a~1b/c~0d".to_string()]);
    }

    #[test]
    fn merge_overrides_leaves_and_keeps_siblings() {
        let mut a = serde_json::json!({ "t": { "x": 1, "y": 2 } });
        merge_into(&mut a, serde_json::json!({ "t": { "y": 3 }, "u": [1] }));
        assert_eq!(a, serde_json::json!({ "t": { "x": 1, "y": 3 }, "u": [1] }));
    }
}
