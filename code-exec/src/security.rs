//! Pre-execution source screening.
//!
//! A syntactic denylist matched against raw source text. It has known false
//! negatives (string concatenation, aliasing, reflection) and false positives
//! (`import osmosis`); it only runs ahead of execution and is not an
//! isolation boundary.

use regex::Regex;
use serde::Serialize;

/// Category of a disallowed construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Violation {
    Filesystem,
    Network,
    Execution,
    DynamicImport,
    ProcessExit,
}

impl Violation {
    pub fn message(&self) -> &'static str {
        match self {
            Violation::Filesystem => "Potentially unsafe filesystem operation detected",
            Violation::Network => "Potentially unsafe network operation detected",
            Violation::Execution => "Potentially unsafe execution operation detected",
            Violation::DynamicImport => "Dynamic imports are not allowed",
            Violation::ProcessExit => "System.exit() is not allowed",
        }
    }
}

/// Declarative rule: `(category, pattern, languages)`; `None` applies to every language.
type RuleSpec = (Violation, &'static str, Option<&'static [&'static str]>);

const RULES: &[RuleSpec] = &[
    (Violation::Filesystem, r"(?i)import\s+os", None),
    (Violation::Filesystem, r"(?i)import\s+sys", None),
    (Violation::Filesystem, r"(?i)import\s+subprocess", None),
    (Violation::Filesystem, r"(?i)#include\s*<unistd\.h>", None),
    (Violation::Filesystem, r"(?i)#include\s*<sys/.*>", None),
    (Violation::Filesystem, r"(?i)Runtime\.getRuntime", None),
    (Violation::Filesystem, r"(?i)ProcessBuilder", None),
    (Violation::Filesystem, r#"(?i)require\s*\(\s*['"]fs['"]\s*\)"#, None),
    (Violation::Filesystem, r#"(?i)require\s*\(\s*['"]child_process['"]\s*\)"#, None),
    (Violation::Network, r"(?i)import\s+socket", None),
    (Violation::Network, r"(?i)import\s+urllib", None),
    (Violation::Network, r"(?i)import\s+requests", None),
    (Violation::Network, r"(?i)#include\s*<netinet/.*>", None),
    (Violation::Network, r#"(?i)require\s*\(\s*['"]http['"]\s*\)"#, None),
    (Violation::Network, r#"(?i)require\s*\(\s*['"]https['"]\s*\)"#, None),
    (Violation::Network, r#"(?i)require\s*\(\s*['"]net['"]\s*\)"#, None),
    (Violation::Execution, r"(?i)system\s*\(", None),
    (Violation::Execution, r"(?i)exec\s*\(", None),
    (Violation::Execution, r"(?i)eval\s*\(", None),
    (Violation::Execution, r"(?i)fork\s*\(", None),
    (Violation::Execution, r"(?i)spawn\s*\(", None),
    (Violation::DynamicImport, r"__import__", Some(&["python"])),
    (Violation::ProcessExit, r"System\.exit", Some(&["java"])),
];

struct Rule {
    violation: Violation,
    pattern: Regex,
    languages: Option<&'static [&'static str]>,
}

impl Rule {
    fn applies_to(&self, language: &str) -> bool {
        self.languages
            .map_or(true, |languages| languages.contains(&language))
    }
}

/// Outcome of screening one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScreenReport {
    pub allowed: bool,
    /// Distinct categories in rule order
    pub violations: Vec<Violation>,
}

/// Immutable rule set; evaluation keeps no state between calls.
pub struct SecurityScreener {
    rules: Vec<Rule>,
}

impl SecurityScreener {
    pub fn new() -> Self {
        let rules = RULES
            .iter()
            .map(|(violation, pattern, languages)| Rule {
                violation: *violation,
                pattern: Regex::new(pattern).expect("valid screening pattern"),
                languages: *languages,
            })
            .collect();
        Self { rules }
    }

    /// Evaluate every applicable rule and collect all matched categories.
    pub fn validate(&self, code: &str, language: &str) -> ScreenReport {
        let mut violations = Vec::new();
        for rule in self.rules.iter().filter(|rule| rule.applies_to(language)) {
            if !violations.contains(&rule.violation) && rule.pattern.is_match(code) {
                violations.push(rule.violation);
            }
        }

        ScreenReport {
            allowed: violations.is_empty(),
            violations,
        }
    }
}

impl Default for SecurityScreener {
    fn default() -> Self {
        Self::new()
    }
}
