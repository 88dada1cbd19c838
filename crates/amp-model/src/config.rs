//! Transformation configuration.
//!
//! Configuration exists in two shapes:
//!
//! - [`RawTransformConfig`]: exactly what was loaded from disk. Enumerated
//!   settings are plain strings so an unknown value can be reported by the
//!   validator instead of failing deserialization.
//! - [`TransformConfig`]: the typed configuration, only obtainable from a raw
//!   configuration whose every setting parses.
//!
//! Raw field names follow the camelCase keys of the Amplitude tag
//! configuration (`apiKey`, `entityMappingRules`, ...).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Fallback behaviour for entities that no rule matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IncludeEntities {
    /// Copy unmatched entities into `event_properties` under their own name.
    All,
    /// Drop unmatched entities.
    None,
}

impl IncludeEntities {
    pub const ALLOWED: [&'static str; 2] = ["all", "none"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::None => "none",
        }
    }
}

impl FromStr for IncludeEntities {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "all" => Ok(Self::All),
            "none" => Ok(Self::None),
            other => Err(ModelError::unknown("includeEntities", other)),
        }
    }
}

/// Output namespace an entity rule writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityTarget {
    EventProperties,
    UserProperties,
}

impl EntityTarget {
    pub const ALLOWED: [&'static str; 2] = ["event_properties", "user_properties"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EventProperties => "event_properties",
            Self::UserProperties => "user_properties",
        }
    }
}

impl FromStr for EntityTarget {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "event_properties" => Ok(Self::EventProperties),
            "user_properties" => Ok(Self::UserProperties),
            other => Err(ModelError::unknown("target", other)),
        }
    }
}

/// Whether a rule matches one schema major version or all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleVersion {
    /// Match only the major version encoded in the rule key.
    Control,
    /// Match any version of the schema.
    Free,
}

impl RuleVersion {
    pub const ALLOWED: [&'static str; 2] = ["control", "free"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Control => "control",
            Self::Free => "free",
        }
    }
}

impl FromStr for RuleVersion {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "control" => Ok(Self::Control),
            "free" => Ok(Self::Free),
            other => Err(ModelError::unknown("version", other)),
        }
    }
}

impl fmt::Display for RuleVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of the Amplitude `time` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AmplitudeTime {
    /// Leave `time` unset; Amplitude stamps the upload time.
    No,
    /// Wall-clock time of the transformation.
    Current,
    /// Read from the event at a dotted property path.
    EventProperty { time_prop: String },
}

impl AmplitudeTime {
    pub const ALLOWED: [&'static str; 3] = ["no", "current", "eventProperty"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::No => "no",
            Self::Current => "current",
            Self::EventProperty { .. } => "eventProperty",
        }
    }

    /// Parses the setting together with its `timeProp` companion.
    pub fn parse(setting: &str, time_prop: &str) -> Result<Self> {
        match setting {
            "no" => Ok(Self::No),
            "current" => Ok(Self::Current),
            "eventProperty" if time_prop.is_empty() => Err(ModelError::Empty { field: "timeProp" }),
            "eventProperty" => Ok(Self::EventProperty {
                time_prop: time_prop.to_string(),
            }),
            other => Err(ModelError::unknown("amplitudeTime", other)),
        }
    }
}

/// Entity inclusion rule as loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawInclusionRule {
    pub key: String,
    pub mapped_key: Option<String>,
    #[serde(alias = "propertiesObjectToPopulate")]
    pub target: String,
    pub version: String,
}

/// Entity exclusion rule as loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawExclusionRule {
    pub key: String,
    pub version: String,
}

/// Event or user property mapping rule as loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawSimpleRule {
    pub key: String,
    pub mapped_key: Option<String>,
}

/// Transformation configuration exactly as loaded from a file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTransformConfig {
    pub api_key: String,
    pub include_self_describing_event: bool,
    pub extract_from_array: bool,
    pub include_entities: String,
    pub entity_mapping_rules: Vec<RawInclusionRule>,
    pub entity_exclusion_rules: Vec<RawExclusionRule>,
    pub include_common_event_properties: bool,
    pub event_mapping_rules: Vec<RawSimpleRule>,
    pub include_common_user_properties: bool,
    pub mkt_to_user_utm: bool,
    pub user_mapping_rules: Vec<RawSimpleRule>,
    pub forward_ip: bool,
    pub amplitude_time: String,
    pub time_prop: String,
}

/// Maps an entity to an output namespace, optionally renaming it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InclusionRule {
    pub key: String,
    pub mapped_key: Option<String>,
    pub target: EntityTarget,
    pub version: RuleVersion,
}

impl InclusionRule {
    pub fn new(key: impl Into<String>, target: EntityTarget, version: RuleVersion) -> Self {
        Self {
            key: key.into(),
            mapped_key: None,
            target,
            version,
        }
    }

    #[must_use]
    pub fn with_mapped_key(mut self, mapped_key: impl Into<String>) -> Self {
        self.mapped_key = Some(mapped_key.into());
        self
    }
}

/// Drops an entity from the output entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionRule {
    pub key: String,
    pub version: RuleVersion,
}

impl ExclusionRule {
    pub fn new(key: impl Into<String>, version: RuleVersion) -> Self {
        Self {
            key: key.into(),
            version,
        }
    }
}

/// Copies the value at a dotted path under `mapped_key` (or `key`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleRule {
    pub key: String,
    pub mapped_key: Option<String>,
}

impl SimpleRule {
    pub fn new(key: impl Into<String>, mapped_key: Option<&str>) -> Self {
        Self {
            key: key.into(),
            mapped_key: mapped_key.map(str::to_string),
        }
    }

    /// Output property name for this rule.
    pub fn output_key(&self) -> &str {
        self.mapped_key.as_deref().unwrap_or(&self.key)
    }
}

/// Validated transformation configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformConfig {
    pub api_key: String,
    pub include_self_describing_event: bool,
    pub extract_from_array: bool,
    pub include_entities: IncludeEntities,
    pub entity_mapping_rules: Vec<InclusionRule>,
    pub entity_exclusion_rules: Vec<ExclusionRule>,
    pub include_common_event_properties: bool,
    pub event_mapping_rules: Vec<SimpleRule>,
    pub include_common_user_properties: bool,
    pub mkt_to_user_utm: bool,
    pub user_mapping_rules: Vec<SimpleRule>,
    pub forward_ip: bool,
    pub amplitude_time: AmplitudeTime,
}

impl TransformConfig {
    /// Configuration with every optional behaviour switched off.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            include_self_describing_event: false,
            extract_from_array: false,
            include_entities: IncludeEntities::None,
            entity_mapping_rules: Vec::new(),
            entity_exclusion_rules: Vec::new(),
            include_common_event_properties: false,
            event_mapping_rules: Vec::new(),
            include_common_user_properties: false,
            mkt_to_user_utm: false,
            user_mapping_rules: Vec::new(),
            forward_ip: false,
            amplitude_time: AmplitudeTime::No,
        }
    }
}

fn non_empty_key(key: &str) -> Result<String> {
    if key.is_empty() {
        return Err(ModelError::Empty { field: "key" });
    }
    Ok(key.to_string())
}

fn optional_mapped_key(mapped_key: Option<&String>) -> Option<String> {
    mapped_key.filter(|k| !k.is_empty()).cloned()
}

impl TryFrom<&RawInclusionRule> for InclusionRule {
    type Error = ModelError;

    fn try_from(raw: &RawInclusionRule) -> Result<Self> {
        Ok(Self {
            key: non_empty_key(&raw.key)?,
            mapped_key: optional_mapped_key(raw.mapped_key.as_ref()),
            target: raw.target.parse()?,
            version: raw.version.parse()?,
        })
    }
}

impl TryFrom<&RawExclusionRule> for ExclusionRule {
    type Error = ModelError;

    fn try_from(raw: &RawExclusionRule) -> Result<Self> {
        Ok(Self {
            key: non_empty_key(&raw.key)?,
            version: raw.version.parse()?,
        })
    }
}

impl TryFrom<&RawSimpleRule> for SimpleRule {
    type Error = ModelError;

    fn try_from(raw: &RawSimpleRule) -> Result<Self> {
        Ok(Self {
            key: non_empty_key(&raw.key)?,
            mapped_key: optional_mapped_key(raw.mapped_key.as_ref()),
        })
    }
}

impl TryFrom<RawTransformConfig> for TransformConfig {
    type Error = ModelError;

    /// Structural conversion; stops at the first setting that does not parse.
    fn try_from(raw: RawTransformConfig) -> Result<Self> {
        if raw.api_key.is_empty() {
            return Err(ModelError::Empty { field: "apiKey" });
        }
        Ok(Self {
            include_entities: raw.include_entities.parse()?,
            entity_mapping_rules: raw
                .entity_mapping_rules
                .iter()
                .map(InclusionRule::try_from)
                .collect::<Result<_>>()?,
            entity_exclusion_rules: raw
                .entity_exclusion_rules
                .iter()
                .map(ExclusionRule::try_from)
                .collect::<Result<_>>()?,
            event_mapping_rules: raw
                .event_mapping_rules
                .iter()
                .map(SimpleRule::try_from)
                .collect::<Result<_>>()?,
            user_mapping_rules: raw
                .user_mapping_rules
                .iter()
                .map(SimpleRule::try_from)
                .collect::<Result<_>>()?,
            amplitude_time: AmplitudeTime::parse(&raw.amplitude_time, &raw.time_prop)?,
            api_key: raw.api_key,
            include_self_describing_event: raw.include_self_describing_event,
            extract_from_array: raw.extract_from_array,
            include_common_event_properties: raw.include_common_event_properties,
            include_common_user_properties: raw.include_common_user_properties,
            mkt_to_user_utm: raw.mkt_to_user_utm,
            forward_ip: raw.forward_ip,
        })
    }
}
