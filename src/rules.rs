//! Ordered text-rewrite rules.
//!
//! A [`RuleTable`] is an ordered list of [`RewriteRule`]s applied one after
//! another to the whole text. Each rule is a total function from text to
//! text: a literal rule replaces every exact occurrence of a substring, a
//! pattern rule replaces every non-overlapping regex match. Replacements are
//! inserted verbatim (no `$1` expansion).
//!
//! Tables are declared as lists of serde-friendly [`RuleSpec`]s so they can
//! be dumped, edited and loaded back from JSON.

use regex::{NoExpand, Regex};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{Error, Result};

/// How a rule's `pattern` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleKind {
    /// Exact substring.
    Literal,
    /// Regular expression (`regex` crate syntax).
    Pattern,
}

/// Declarative form of one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Rule name, unique within its table.
    pub name: String,
    /// How `pattern` is matched.
    pub kind: RuleKind,
    /// Literal text or regular expression to match.
    pub pattern: String,
    /// Text inserted verbatim for each match.
    #[serde(default)]
    pub replacement: String,
}

impl RuleSpec {
    /// Rule matching `pattern` literally.
    #[must_use]
    pub fn literal(name: &str, pattern: &str, replacement: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: RuleKind::Literal,
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
        }
    }

    /// Rule matching `pattern` as a regular expression.
    #[must_use]
    pub fn pattern(name: &str, pattern: &str, replacement: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: RuleKind::Pattern,
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
enum Matcher {
    Literal,
    Pattern(Regex),
}

/// A compiled rule with its position in its table.
#[derive(Debug, Clone)]
pub struct RewriteRule {
    spec: RuleSpec,
    order: usize,
    matcher: Matcher,
}

impl RewriteRule {
    fn compile(spec: RuleSpec, order: usize) -> Result<Self> {
        if spec.pattern.is_empty() {
            return Err(Error::InvalidRule {
                name: spec.name,
                reason: "empty pattern".to_string(),
            });
        }
        let matcher = match spec.kind {
            RuleKind::Literal => Matcher::Literal,
            RuleKind::Pattern => {
                let re = Regex::new(&spec.pattern).map_err(|e| Error::InvalidRule {
                    name: spec.name.clone(),
                    reason: e.to_string(),
                })?;
                Matcher::Pattern(re)
            }
        };
        Ok(Self {
            spec,
            order,
            matcher,
        })
    }

    /// Name of the rule.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// Zero-based position; a rule only ever sees the output of the rules
    /// ordered before it.
    #[must_use]
    pub fn order(&self) -> usize {
        self.order
    }

    /// Declarative form this rule was compiled from.
    #[must_use]
    pub fn spec(&self) -> &RuleSpec {
        &self.spec
    }

    /// Whether the rule would change `text`.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        match &self.matcher {
            Matcher::Literal => text.contains(self.spec.pattern.as_str()),
            Matcher::Pattern(re) => re.is_match(text),
        }
    }

    /// Rewrite every occurrence in `text`.
    #[must_use]
    pub fn apply(&self, text: &str) -> String {
        match &self.matcher {
            Matcher::Literal => text.replace(self.spec.pattern.as_str(), &self.spec.replacement),
            Matcher::Pattern(re) => re
                .replace_all(text, NoExpand(&self.spec.replacement))
                .into_owned(),
        }
    }
}

/// A named, ordered rule table.
#[derive(Debug, Clone)]
pub struct RuleTable {
    name: String,
    rules: Vec<RewriteRule>,
}

impl RuleTable {
    /// Compile `specs` in the order given.
    pub fn from_specs(name: &str, specs: Vec<RuleSpec>) -> Result<Self> {
        let rules = specs
            .into_iter()
            .enumerate()
            .map(|(order, spec)| RewriteRule::compile(spec, order))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            name: name.to_string(),
            rules,
        })
    }

    /// Load a table from a JSON array of rule specs.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pmc_extract::rules::RuleTable;
    ///
    /// let table = RuleTable::from_json(
    ///     "custom",
    ///     r#"[{ "name": "drop-b", "kind": "pattern", "pattern": "</?b>" }]"#,
    /// )?;
    /// assert_eq!(table.apply("<b>bold</b>"), "bold");
    /// # Ok::<(), pmc_extract::Error>(())
    /// ```
    pub fn from_json(name: &str, json: &str) -> Result<Self> {
        let specs: Vec<RuleSpec> = serde_json::from_str(json)?;
        Self::from_specs(name, specs)
    }

    /// Serialize the table back to its JSON spec list.
    pub fn to_json(&self) -> Result<String> {
        let specs: Vec<&RuleSpec> = self.rules.iter().map(RewriteRule::spec).collect();
        Ok(serde_json::to_string_pretty(&specs)?)
    }

    /// Name of the table.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Compiled rules in application order.
    #[must_use]
    pub fn rules(&self) -> &[RewriteRule] {
        &self.rules
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the table has no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule names in application order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(RewriteRule::name).collect()
    }

    /// Position of the first rule called `name`.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.rules.iter().position(|r| r.name() == name)
    }

    /// Apply every rule, in order, to `text`.
    #[must_use]
    pub fn apply(&self, text: &str) -> String {
        let mut out = text.to_string();
        for rule in &self.rules {
            if rule.matches(&out) {
                trace!(table = %self.name, rule = rule.name(), "rule fired");
                out = rule.apply(&out);
            }
        }
        out
    }
}
