//! Registry of user-adjustable settings.
//!
//! Each entry maps a dotted name to a getter and setter on [`AppConfig`],
//! plus whether a change should re-render the current pull-request list.

use std::fmt;

use thiserror::Error;

use super::config::AppConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingValue {
    Bool(bool),
    Integer(u64),
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Bool(b) => write!(f, "{b}"),
            SettingValue::Integer(n) => write!(f, "{n}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    Bool,
    Integer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    RefreshInterval,
    ShowDraftPrs,
    ShowArchived,
    ShowAccountLabels,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SettingError {
    #[error("unknown setting: {0}")]
    Unknown(String),

    #[error("invalid value '{value}' for {name}: expected {expected}")]
    InvalidValue {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

pub struct SettingDescriptor {
    pub key: SettingKey,
    pub name: &'static str,
    pub kind: SettingKind,
    pub get: fn(&AppConfig) -> SettingValue,
    pub set: fn(&mut AppConfig, SettingValue),
    pub affects_refresh_presentation: bool,
}

impl fmt::Debug for SettingDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field(
                "affects_refresh_presentation",
                &self.affects_refresh_presentation,
            )
            .finish()
    }
}

/// Outcome of a successful [`apply`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingChange {
    pub key: SettingKey,
    pub value: SettingValue,
    pub affects_refresh_presentation: bool,
}

pub static SETTINGS: &[SettingDescriptor] = &[
    SettingDescriptor {
        key: SettingKey::RefreshInterval,
        name: "refresh.interval_secs",
        kind: SettingKind::Integer,
        get: |c| SettingValue::Integer(c.refresh.interval_secs),
        set: |c, v| {
            if let SettingValue::Integer(n) = v {
                c.refresh.interval_secs = n;
            }
        },
        affects_refresh_presentation: false,
    },
    SettingDescriptor {
        key: SettingKey::ShowDraftPrs,
        name: "display.show_draft_prs",
        kind: SettingKind::Bool,
        get: |c| SettingValue::Bool(c.display.show_draft_prs),
        set: |c, v| {
            if let SettingValue::Bool(b) = v {
                c.display.show_draft_prs = b;
            }
        },
        affects_refresh_presentation: true,
    },
    SettingDescriptor {
        key: SettingKey::ShowArchived,
        name: "display.show_archived",
        kind: SettingKind::Bool,
        get: |c| SettingValue::Bool(c.display.show_archived),
        set: |c, v| {
            if let SettingValue::Bool(b) = v {
                c.display.show_archived = b;
            }
        },
        affects_refresh_presentation: true,
    },
    SettingDescriptor {
        key: SettingKey::ShowAccountLabels,
        name: "display.show_account_labels",
        kind: SettingKind::Bool,
        get: |c| SettingValue::Bool(c.display.show_account_labels),
        set: |c, v| {
            if let SettingValue::Bool(b) = v {
                c.display.show_account_labels = b;
            }
        },
        affects_refresh_presentation: true,
    },
];

pub fn lookup(name: &str) -> Option<&'static SettingDescriptor> {
    SETTINGS.iter().find(|s| s.name == name)
}

fn parse_value(descriptor: &SettingDescriptor, raw: &str) -> Result<SettingValue, SettingError> {
    let raw = raw.trim();
    let parsed = match descriptor.kind {
        SettingKind::Bool => match raw.to_ascii_lowercase().as_str() {
            "true" | "on" | "yes" | "1" => Some(SettingValue::Bool(true)),
            "false" | "off" | "no" | "0" => Some(SettingValue::Bool(false)),
            _ => None,
        },
        SettingKind::Integer => raw.parse().ok().map(SettingValue::Integer),
    };
    parsed.ok_or_else(|| SettingError::InvalidValue {
        name: descriptor.name,
        value: raw.to_string(),
        expected: match descriptor.kind {
            SettingKind::Bool => "a boolean",
            SettingKind::Integer => "a non-negative integer",
        },
    })
}

/// Parse `raw` for the named setting and write it into `config`.
pub fn apply(config: &mut AppConfig, name: &str, raw: &str) -> Result<SettingChange, SettingError> {
    let descriptor = lookup(name).ok_or_else(|| SettingError::Unknown(name.to_string()))?;
    let value = parse_value(descriptor, raw)?;
    (descriptor.set)(config, value);
    Ok(SettingChange {
        key: descriptor.key,
        value: (descriptor.get)(config),
        affects_refresh_presentation: descriptor.affects_refresh_presentation,
    })
}

/// `(name, current value)` for every registered setting.
pub fn describe(config: &AppConfig) -> Vec<(&'static str, SettingValue)> {
    SETTINGS
        .iter()
        .map(|s| (s.name, (s.get)(config)))
        .collect()
}
