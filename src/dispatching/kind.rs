//! Named dispatching rules and rule selection.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{rules, DispatchingRule, RuleEngine};
use crate::error::JobShopError;

/// The built-in dispatching rules, addressable by name.
///
/// Canonical identifiers are the snake_case names
/// (`"shortest_processing_time"`, ...). The short codes (`"spt"`, ...) are
/// accepted as aliases; matching is case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchingRuleKind {
    /// [`rules::Spt`]
    ShortestProcessingTime,
    /// [`rules::Fcfs`]
    FirstComeFirstServed,
    /// [`rules::Mwkr`]
    MostWorkRemaining,
    /// [`rules::RandomRule`]
    Random,
    /// [`rules::Lpt`]
    LongestProcessingTime,
    /// [`rules::Lwkr`]
    LeastWorkRemaining,
    /// [`rules::Mopnr`]
    MostOperationsRemaining,
}

impl DispatchingRuleKind {
    /// Every built-in rule.
    pub const ALL: [DispatchingRuleKind; 7] = [
        Self::ShortestProcessingTime,
        Self::FirstComeFirstServed,
        Self::MostWorkRemaining,
        Self::Random,
        Self::LongestProcessingTime,
        Self::LeastWorkRemaining,
        Self::MostOperationsRemaining,
    ];

    /// Canonical identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShortestProcessingTime => "shortest_processing_time",
            Self::FirstComeFirstServed => "first_come_first_served",
            Self::MostWorkRemaining => "most_work_remaining",
            Self::Random => "random",
            Self::LongestProcessingTime => "longest_processing_time",
            Self::LeastWorkRemaining => "least_work_remaining",
            Self::MostOperationsRemaining => "most_operations_remaining",
        }
    }

    fn alias(&self) -> &'static str {
        match self {
            Self::ShortestProcessingTime => "spt",
            Self::FirstComeFirstServed => "fcfs",
            Self::MostWorkRemaining => "mwkr",
            Self::Random => "rnd",
            Self::LongestProcessingTime => "lpt",
            Self::LeastWorkRemaining => "lwkr",
            Self::MostOperationsRemaining => "mopnr",
        }
    }

    /// Rule implementation.
    pub fn rule(&self) -> Arc<dyn DispatchingRule> {
        match self {
            Self::ShortestProcessingTime => Arc::new(rules::Spt),
            Self::FirstComeFirstServed => Arc::new(rules::Fcfs),
            Self::MostWorkRemaining => Arc::new(rules::Mwkr),
            Self::Random => Arc::new(rules::RandomRule),
            Self::LongestProcessingTime => Arc::new(rules::Lpt),
            Self::LeastWorkRemaining => Arc::new(rules::Lwkr),
            Self::MostOperationsRemaining => Arc::new(rules::Mopnr),
        }
    }
}

impl fmt::Display for DispatchingRuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DispatchingRuleKind {
    type Err = JobShopError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == needle || kind.alias() == needle)
            .ok_or_else(|| JobShopError::UnknownDispatchingRule(s.to_string()))
    }
}

/// What the solver should dispatch with: a rule name, a built-in kind, a
/// user rule, or a composed engine.
#[derive(Debug, Clone)]
pub enum RuleChoice {
    /// A rule identifier, resolved when the solver is created.
    Named(String),
    /// A built-in rule.
    Kind(DispatchingRuleKind),
    /// A user-supplied rule.
    Custom(Arc<dyn DispatchingRule>),
    /// A fully configured engine.
    Engine(RuleEngine),
}

impl RuleChoice {
    /// Wraps a user rule.
    pub fn custom<R: DispatchingRule + 'static>(rule: R) -> Self {
        Self::Custom(Arc::new(rule))
    }

    /// Resolves the choice into an engine.
    ///
    /// # Errors
    /// [`JobShopError::UnknownDispatchingRule`] for an unrecognized name.
    pub fn into_engine(self) -> Result<RuleEngine, JobShopError> {
        match self {
            Self::Named(name) => {
                let kind: DispatchingRuleKind = name.parse()?;
                Ok(RuleEngine::new().with_shared_rule(kind.rule()))
            }
            Self::Kind(kind) => Ok(RuleEngine::new().with_shared_rule(kind.rule())),
            Self::Custom(rule) => Ok(RuleEngine::new().with_shared_rule(rule)),
            Self::Engine(engine) => Ok(engine),
        }
    }
}

impl From<&str> for RuleChoice {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<String> for RuleChoice {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl From<DispatchingRuleKind> for RuleChoice {
    fn from(kind: DispatchingRuleKind) -> Self {
        Self::Kind(kind)
    }
}

impl From<Arc<dyn DispatchingRule>> for RuleChoice {
    fn from(rule: Arc<dyn DispatchingRule>) -> Self {
        Self::Custom(rule)
    }
}

impl From<RuleEngine> for RuleChoice {
    fn from(engine: RuleEngine) -> Self {
        Self::Engine(engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical_names() {
        for kind in DispatchingRuleKind::ALL {
            assert_eq!(kind.as_str().parse::<DispatchingRuleKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.as_str());
        }
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!(
            "SPT".parse::<DispatchingRuleKind>().unwrap(),
            DispatchingRuleKind::ShortestProcessingTime
        );
        assert_eq!(
            " fcfs ".parse::<DispatchingRuleKind>().unwrap(),
            DispatchingRuleKind::FirstComeFirstServed
        );
    }

    #[test]
    fn test_parse_unknown() {
        let err = "edd".parse::<DispatchingRuleKind>().unwrap_err();
        assert_eq!(err, JobShopError::UnknownDispatchingRule("edd".into()));
    }

    #[test]
    fn test_rule_names() {
        assert_eq!(DispatchingRuleKind::MostWorkRemaining.rule().name(), "MWKR");
        assert_eq!(DispatchingRuleKind::Random.rule().name(), "RANDOM");
    }

    #[test]
    fn test_rule_choice_resolution() {
        assert!(RuleChoice::from("most_work_remaining").into_engine().is_ok());
        assert!(RuleChoice::from("nope").into_engine().is_err());
        let engine = RuleChoice::custom(rules::Lpt).into_engine().unwrap();
        assert_eq!(engine.rule_names(), vec!["LPT".to_string()]);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&DispatchingRuleKind::FirstComeFirstServed).unwrap();
        assert_eq!(json, "\"first_come_first_served\"");
    }
}
