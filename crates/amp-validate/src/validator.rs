use std::str::FromStr;

use serde::Serialize;

use amp_model::{
    AmplitudeTime, EntityTarget, IncludeEntities, RawExclusionRule, RawInclusionRule,
    RawSimpleRule, RawTransformConfig, RuleVersion,
};

/// Issue severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Error,
    Warning,
}

/// A validation issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub severity: Severity,
    /// Configuration path, e.g. `entityMappingRules[1].version`.
    pub field: String,
    pub message: String,
}

impl Issue {
    fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            field: field.into(),
            message: message.into(),
        }
    }

    fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validation report for one configuration.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<Issue>,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    /// Consumes the report, keeping error-level issues only.
    pub fn into_errors(self) -> Vec<Issue> {
        self.issues
            .into_iter()
            .filter(|i| i.severity == Severity::Error)
            .collect()
    }
}

/// Configuration validator.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    stop_at_first_error: bool,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop checking after the first error-level issue.
    #[must_use]
    pub fn fail_fast(mut self, enable: bool) -> Self {
        self.stop_at_first_error = enable;
        self
    }

    /// Checks `config` and returns every issue found, in check order.
    pub fn check(&self, config: &RawTransformConfig) -> ValidationReport {
        let mut report = ValidationReport::default();
        let checks: [fn(&RawTransformConfig, &mut Vec<Issue>); 6] = [
            check_api_key,
            check_include_entities,
            check_inclusion_rules,
            check_exclusion_rules,
            check_mapping_rules,
            check_amplitude_time,
        ];
        for check in checks {
            check(config, &mut report.issues);
            if self.stop_at_first_error && report.has_errors() {
                break;
            }
        }
        report
    }
}

fn allowed<T: FromStr>(value: &str) -> bool {
    value.parse::<T>().is_ok()
}

fn unknown_value(field: String, value: &str, allowed: &[&str]) -> Issue {
    Issue::error(
        field,
        format!("'{value}' is not one of: {}", allowed.join(", ")),
    )
}

fn check_api_key(config: &RawTransformConfig, issues: &mut Vec<Issue>) {
    if config.api_key.is_empty() {
        issues.push(Issue::error("apiKey", "API key must not be empty"));
    }
}

fn check_include_entities(config: &RawTransformConfig, issues: &mut Vec<Issue>) {
    if !allowed::<IncludeEntities>(&config.include_entities) {
        issues.push(unknown_value(
            "includeEntities".to_string(),
            &config.include_entities,
            &IncludeEntities::ALLOWED,
        ));
    }
}

fn check_key(field: &str, idx: usize, key: &str, issues: &mut Vec<Issue>) {
    if key.is_empty() {
        issues.push(Issue::error(
            format!("{field}[{idx}].key"),
            "rule key must not be empty",
        ));
    }
}

fn check_version(field: &str, idx: usize, key: &str, version: &str, issues: &mut Vec<Issue>) {
    match version.parse::<RuleVersion>() {
        Err(_) => issues.push(unknown_value(
            format!("{field}[{idx}].version"),
            version,
            &RuleVersion::ALLOWED,
        )),
        Ok(RuleVersion::Control) if !key.is_empty() && !ends_with_digit(key) => {
            issues.push(Issue::warning(
                format!("{field}[{idx}].key"),
                format!("control rule '{key}' does not end in a version digit and will be ignored"),
            ));
        }
        Ok(_) => {}
    }
}

fn ends_with_digit(key: &str) -> bool {
    key.chars().last().is_some_and(|c| c.is_ascii_digit())
}

fn check_inclusion_rules(config: &RawTransformConfig, issues: &mut Vec<Issue>) {
    const FIELD: &str = "entityMappingRules";
    for (idx, RawInclusionRule { key, target, version, .. }) in
        config.entity_mapping_rules.iter().enumerate()
    {
        check_key(FIELD, idx, key, issues);
        if !allowed::<EntityTarget>(target) {
            issues.push(unknown_value(
                format!("{FIELD}[{idx}].target"),
                target,
                &EntityTarget::ALLOWED,
            ));
        }
        check_version(FIELD, idx, key, version, issues);
    }
}

fn check_exclusion_rules(config: &RawTransformConfig, issues: &mut Vec<Issue>) {
    const FIELD: &str = "entityExclusionRules";
    for (idx, RawExclusionRule { key, version }) in
        config.entity_exclusion_rules.iter().enumerate()
    {
        check_key(FIELD, idx, key, issues);
        check_version(FIELD, idx, key, version, issues);
    }
}

fn check_simple_rules(field: &str, rules: &[RawSimpleRule], issues: &mut Vec<Issue>) {
    for (idx, rule) in rules.iter().enumerate() {
        check_key(field, idx, &rule.key, issues);
    }
}

fn check_mapping_rules(config: &RawTransformConfig, issues: &mut Vec<Issue>) {
    check_simple_rules("eventMappingRules", &config.event_mapping_rules, issues);
    check_simple_rules("userMappingRules", &config.user_mapping_rules, issues);
}

fn check_amplitude_time(config: &RawTransformConfig, issues: &mut Vec<Issue>) {
    if !AmplitudeTime::ALLOWED.contains(&config.amplitude_time.as_str()) {
        issues.push(unknown_value(
            "amplitudeTime".to_string(),
            &config.amplitude_time,
            &AmplitudeTime::ALLOWED,
        ));
        return;
    }
    if config.amplitude_time == "eventProperty" && config.time_prop.is_empty() {
        issues.push(Issue::error(
            "timeProp",
            "timeProp is required when amplitudeTime is 'eventProperty'",
        ));
    }
}
