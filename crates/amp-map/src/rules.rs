//! Entity rule compilation.
//!
//! Each rule is reduced to a reference string. An entity property matches a
//! rule when its name starts with the rule's reference; within a table the
//! first matching rule wins, so declaration order is precedence.
//!
//! | version   | reference                                    |
//! |-----------|----------------------------------------------|
//! | `control` | canonical key, e.g. `contexts_com_acme_foo_1` |
//! | `free`    | canonical key minus its last two characters, e.g. `contexts_com_acme_foo` |

use tracing::{debug, trace};

use amp_model::{EntityTarget, ExclusionRule, InclusionRule, RuleVersion, TransformConfig};

use crate::schema::canonicalize;

/// Fields shared by inclusion and exclusion rules.
pub trait EntityRule {
    fn key(&self) -> &str;
    fn version(&self) -> RuleVersion;
}

impl EntityRule for InclusionRule {
    fn key(&self) -> &str {
        &self.key
    }

    fn version(&self) -> RuleVersion {
        self.version
    }
}

impl EntityRule for ExclusionRule {
    fn key(&self) -> &str {
        &self.key
    }

    fn version(&self) -> RuleVersion {
        self.version
    }
}

/// A rule together with its derived match reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledRule<R> {
    pub reference: String,
    pub canonical_key: String,
    pub rule: R,
}

impl CompiledRule<InclusionRule> {
    /// Output property name: the rule's `mapped_key`, else the canonical key.
    pub fn output_key(&self) -> &str {
        self.rule.mapped_key.as_deref().unwrap_or(&self.canonical_key)
    }

    pub fn target(&self) -> EntityTarget {
        self.rule.target
    }
}

/// Derives the match reference for a canonical key.
pub fn reference_for(canonical_key: &str, version: RuleVersion) -> String {
    match version {
        RuleVersion::Control => canonical_key.to_string(),
        RuleVersion::Free => {
            let keep = canonical_key.chars().count().saturating_sub(2);
            canonical_key.chars().take(keep).collect()
        }
    }
}

/// Whether a rule can be compiled. A `control` rule whose key does not end in
/// a digit carries no version to pin and would match too broadly.
fn is_usable<R: EntityRule>(rule: &R) -> bool {
    match rule.version() {
        RuleVersion::Control => rule.key().chars().last().is_some_and(|c| c.is_ascii_digit()),
        RuleVersion::Free => true,
    }
}

/// Ordered rule table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable<R> {
    rules: Vec<CompiledRule<R>>,
}

impl<R> Default for RuleTable<R> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<R> RuleTable<R> {
    /// First rule, in declaration order, whose reference prefixes `name`.
    pub fn first_match(&self, name: &str) -> Option<&CompiledRule<R>> {
        self.rules
            .iter()
            .find(|rule| name.starts_with(rule.reference.as_str()))
    }

    pub fn matches(&self, name: &str) -> bool {
        self.first_match(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Compiles rules into a match table, silently dropping unusable `control`
/// rules and preserving the order of the rest.
pub fn compile<R: EntityRule + Clone>(rules: &[R]) -> RuleTable<R> {
    let compiled: Vec<CompiledRule<R>> = rules
        .iter()
        .filter(|rule| {
            let usable = is_usable(*rule);
            if !usable {
                trace!(key = rule.key(), "dropping control rule without version digit");
            }
            usable
        })
        .map(|rule| {
            let canonical_key = canonicalize(rule.key());
            CompiledRule {
                reference: reference_for(&canonical_key, rule.version()),
                canonical_key,
                rule: rule.clone(),
            }
        })
        .collect();
    debug!(
        declared = rules.len(),
        compiled = compiled.len(),
        "compiled entity rules"
    );
    RuleTable { rules: compiled }
}

/// Compiled entity tables for one configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityRules {
    pub inclusions: RuleTable<InclusionRule>,
    pub exclusions: RuleTable<ExclusionRule>,
}

impl EntityRules {
    /// Compiles both tables. Inclusion rules whose own reference falls under
    /// an exclusion are removed, since they could never apply.
    pub fn compile(config: &TransformConfig) -> Self {
        let exclusions = compile(&config.entity_exclusion_rules);
        let mut inclusions = compile(&config.entity_mapping_rules);
        inclusions.rules.retain(|rule| {
            let excluded = exclusions.matches(&rule.reference);
            if excluded {
                debug!(reference = %rule.reference, "inclusion rule shadowed by exclusion");
            }
            !excluded
        });
        Self {
            inclusions,
            exclusions,
        }
    }
}
