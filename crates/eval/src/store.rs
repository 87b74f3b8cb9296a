//! The host-persisted rule store record.
//!
//! The shape is deliberately permissive on load: unknown fields are
//! ignored, settings fall back to defaults, and rule entries that do not
//! carry the required fields are silently dropped rather than failing
//! the whole store.

use tracing::warn;

use crate::engine::{Rule, RuleOptions};

pub const STORE_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    pub default_backup: bool,
    /// Budget for one full scan, milliseconds.
    pub scan_timeout_ms: u64,
    pub debug: bool,
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            default_backup: false,
            scan_timeout_ms: 30_000,
            debug: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuleStore {
    pub version: String,
    pub rules: Vec<Rule>,
    pub settings: StoreSettings,
    /// ISO timestamp of the last run, host-maintained.
    pub last_run: Option<String>,
}

/// Parse a store from its JSON text.
pub fn load(text: &str) -> Result<RuleStore, serde_json::Error> {
    let root: serde_json::Value = serde_json::from_str(text)?;
    Ok(from_json(&root))
}

/// Build a store from parsed JSON, dropping invalid rule entries.
pub fn from_json(root: &serde_json::Value) -> RuleStore {
    let version = root
        .get("version")
        .and_then(|v| v.as_str())
        .unwrap_or(STORE_VERSION)
        .to_string();

    let mut rules = Vec::new();
    if let Some(entries) = root.get("rules").and_then(|v| v.as_array()) {
        for entry in entries {
            match rule_from_json(entry) {
                Some(rule) => rules.push(rule),
                None => warn!("dropping invalid rule entry from store"),
            }
        }
    }

    let settings_obj = root.get("settings");
    let defaults = StoreSettings::default();
    let settings = StoreSettings {
        default_backup: settings_obj
            .and_then(|s| s.get("defaultBackup"))
            .and_then(|v| v.as_bool())
            .unwrap_or(defaults.default_backup),
        scan_timeout_ms: settings_obj
            .and_then(|s| s.get("scanTimeout"))
            .and_then(|v| v.as_u64())
            .unwrap_or(defaults.scan_timeout_ms),
        debug: settings_obj
            .and_then(|s| s.get("debug"))
            .and_then(|v| v.as_bool())
            .unwrap_or(defaults.debug),
    };

    let last_run = root
        .get("lastRun")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());

    RuleStore {
        version,
        rules,
        settings,
        last_run,
    }
}

/// A valid entry needs a string `id` and a non-empty string `action`.
fn rule_from_json(v: &serde_json::Value) -> Option<Rule> {
    let obj = v.as_object()?;
    let id = obj.get("id")?.as_str()?.to_string();
    let action = obj.get("action")?.as_str()?.to_string();
    if action.trim().is_empty() {
        return None;
    }
    let name = obj
        .get("name")
        .and_then(|n| n.as_str())
        .unwrap_or(&id)
        .to_string();
    let condition = obj
        .get("condition")
        .and_then(|c| c.as_str())
        .unwrap_or("")
        .to_string();
    let scope = obj
        .get("scope")
        .and_then(|s| s.as_str())
        .map(|s| s.to_string());
    let backup = obj
        .get("options")
        .and_then(|o| o.get("backup"))
        .and_then(|b| b.as_bool())
        .unwrap_or(false);
    Some(Rule {
        id,
        name,
        condition,
        action,
        scope,
        options: RuleOptions { backup },
    })
}

/// Serialize a store back to the persisted JSON shape.
pub fn to_json(store: &RuleStore) -> serde_json::Value {
    let rules: Vec<serde_json::Value> = store
        .rules
        .iter()
        .map(|r| {
            serde_json::json!({
                "id": r.id,
                "name": r.name,
                "condition": r.condition,
                "action": r.action,
                "scope": r.scope,
                "options": { "backup": r.options.backup },
            })
        })
        .collect();
    serde_json::json!({
        "version": store.version,
        "rules": rules,
        "settings": {
            "defaultBackup": store.settings.default_backup,
            "scanTimeout": store.settings.scan_timeout_ms,
            "debug": store.settings.debug,
        },
        "lastRun": store.last_run,
    })
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
