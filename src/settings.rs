/// Settings schema and migration of persisted settings
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Placeholder every group title template must carry
pub const DOMAIN_PLACEHOLDER: &str = "{domain}";

/// Storage key holding the serialized settings object
pub const SETTINGS_STORAGE_KEY: &str = "settings";

/// Renamed settings keys: (deprecated name, current name)
///
/// Append new renames here; entries are never removed while old installs may
/// still carry the deprecated name.
pub const LEGACY_KEYS: &[(&str, &str)] = &[
    ("enableAutomaticSorting", "enableAlphabeticSorting"),
    ("enableGrouping", "enableTabGrouping"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Organize automatically when tabs navigate or close
    pub enable_alphabetic_sorting: bool,
    /// Cluster same-domain tabs into native groups
    pub enable_tab_grouping: bool,
    /// Group title template with `{domain}` and `{count}` placeholders
    pub group_title_format: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            enable_alphabetic_sorting: true,
            enable_tab_grouping: true,
            group_title_format: "{domain} ({count})".to_string(),
        }
    }
}

impl Settings {
    pub fn group_title(&self, domain: &str, count: usize) -> String {
        self.group_title_format
            .replace("{domain}", domain)
            .replace("{count}", &count.to_string())
    }

    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(enabled) = patch.enable_alphabetic_sorting {
            self.enable_alphabetic_sorting = enabled;
        }
        if let Some(enabled) = patch.enable_tab_grouping {
            self.enable_tab_grouping = enabled;
        }
        if let Some(format) = patch.group_title_format {
            if is_valid_title_format(&format) {
                self.group_title_format = format;
            } else {
                warn!("Ignoring group title format without {}: {}", DOMAIN_PLACEHOLDER, format);
            }
        }
    }

    /// Overwrite the fields named in `values`, which must already be schema-valid
    pub fn merge(&mut self, values: Map<String, Value>) -> Result<()> {
        let mut current = self.to_object()?;
        current.extend(values);
        *self = serde_json::from_value(Value::Object(current))
            .map_err(|e| Error::InvalidStorageFormat(e.to_string()))?;
        Ok(())
    }

    pub fn to_object(&self) -> Result<Map<String, Value>> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(Error::InvalidStorageFormat(format!(
                "settings serialized to a non-object: {other}"
            ))),
            Err(e) => Err(Error::InvalidStorageFormat(e.to_string())),
        }
    }
}

/// Partial update of `Settings`; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_alphabetic_sorting: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_tab_grouping: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_title_format: Option<String>,
}

/// Titles are how existing groups are found again, so two domains must never
/// render to the same title
pub fn is_valid_title_format(format: &str) -> bool {
    format.contains(DOMAIN_PLACEHOLDER)
}

/// Decode a persisted settings blob into schema-valid, migrated values
///
/// Keys in the current schema are copied through when their type matches the
/// default and the value is usable (a title format must name `{domain}`).
/// Deprecated keys are renamed through `LEGACY_KEYS` and win over a current
/// key holding a different value. Everything else is dropped. The result is
/// not written back.
pub fn parse_valid_state(persisted: &str) -> Result<Map<String, Value>> {
    parse_valid_state_with(persisted, LEGACY_KEYS)
}

fn parse_valid_state_with(
    persisted: &str,
    legacy_keys: &[(&str, &str)],
) -> Result<Map<String, Value>> {
    let decoded: Value = serde_json::from_str(persisted)
        .map_err(|e| Error::InvalidStorageFormat(e.to_string()))?;
    let decoded = match decoded {
        Value::Object(map) => map,
        other => {
            return Err(Error::InvalidStorageFormat(format!(
                "expected a settings object, found {other}"
            )));
        }
    };

    let schema = Settings::default().to_object()?;
    let mut valid = Map::new();
    let mut migrated = Map::new();

    for (key, value) in decoded {
        if schema.contains_key(&key) {
            if is_valid_setting(&schema, &key, &value) {
                valid.insert(key, value);
            } else {
                warn!("Dropping setting {} with unexpected value {}", key, value);
            }
            continue;
        }

        let replacement = legacy_keys
            .iter()
            .find(|(old, _)| *old == key)
            .map(|(_, new)| *new);

        match replacement {
            Some(new_key) if is_valid_setting(&schema, new_key, &value) => {
                debug!("Migrating setting {} to {}", key, new_key);
                migrated.insert(new_key.to_string(), value);
            }
            Some(new_key) => {
                warn!("Dropping legacy setting {} (no valid replacement {})", key, new_key);
            }
            None => debug!("Dropping unknown setting {}", key),
        }
    }

    valid.extend(migrated);
    Ok(valid)
}

fn is_valid_setting(schema: &Map<String, Value>, key: &str, value: &Value) -> bool {
    let same_type = schema
        .get(key)
        .is_some_and(|default| std::mem::discriminant(default) == std::mem::discriminant(value));
    match (key, value) {
        ("groupTitleFormat", Value::String(format)) => same_type && is_valid_title_format(format),
        _ => same_type,
    }
}
