use super::error::GrammarError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

const MGOL_RULES: &str = include_str!("mgol_rules.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(rename = "rule_number")]
    pub number: usize,
    pub left: String,
    pub right: Vec<String>,
}

impl Rule {
    pub fn new(number: usize, left: &str, right: &[&str]) -> Self {
        Self {
            number,
            left: left.to_string(),
            right: right.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Number of grammar symbols popped on reduction
    pub fn arity(&self) -> usize {
        self.right.len()
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.left, self.right.join(" "))
    }
}

/// Rules ordered by number; the lowest-numbered rule is the augmented start
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
    by_number: HashMap<usize, usize>,
}

impl RuleSet {
    pub fn new(mut rules: Vec<Rule>, origin: &str) -> Result<Self, GrammarError> {
        let invalid = |message: String| GrammarError::RulesFormat {
            origin: origin.to_string(),
            message,
        };

        if rules.is_empty() {
            return Err(invalid("no rules".to_string()));
        }

        rules.sort_by_key(|rule| rule.number);

        let mut by_number = HashMap::new();
        for (index, rule) in rules.iter().enumerate() {
            if rule.left.trim().is_empty() {
                return Err(invalid(format!("rule {} has an empty left side", rule.number)));
            }
            if by_number.insert(rule.number, index).is_some() {
                return Err(invalid(format!("rule {} is defined twice", rule.number)));
            }
        }

        Ok(Self { rules, by_number })
    }

    /// Parse `[{"rule_number", "left", "right"}]`
    pub fn from_json(content: &str, origin: &str) -> Result<Self, GrammarError> {
        let rules: Vec<Rule> =
            serde_json::from_str(content).map_err(|e| GrammarError::RulesFormat {
                origin: origin.to_string(),
                message: e.to_string(),
            })?;

        Self::new(rules, origin)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GrammarError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| GrammarError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json(&content, &path.display().to_string())
    }

    /// The bundled MGol grammar
    pub fn mgol() -> Result<Self, GrammarError> {
        Self::from_json(MGOL_RULES, "mgol_rules.json")
    }

    pub fn to_json(&self) -> Result<String, GrammarError> {
        serde_json::to_string_pretty(&self.rules).map_err(|e| GrammarError::RulesFormat {
            origin: "export".to_string(),
            message: e.to_string(),
        })
    }

    pub fn get(&self, number: usize) -> Option<&Rule> {
        self.by_number.get(&number).map(|&index| &self.rules[index])
    }

    pub fn rule(&self, number: usize) -> Result<&Rule, GrammarError> {
        self.get(number)
            .ok_or(GrammarError::UnknownRule { rule: number })
    }

    pub fn start_rule(&self) -> &Rule {
        &self.rules[0]
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn is_nonterminal(&self, symbol: &str) -> bool {
        self.rules.iter().any(|rule| rule.left == symbol)
    }

    /// Left-hand sides, excluding the augmented start
    pub fn nonterminals(&self) -> BTreeSet<&str> {
        let start = self.start_rule().left.as_str();
        self.rules
            .iter()
            .map(|rule| rule.left.as_str())
            .filter(|left| *left != start)
            .collect()
    }

    /// Every right-hand symbol that never appears on a left side
    pub fn terminals(&self) -> BTreeSet<&str> {
        let lefts: BTreeSet<&str> = self.rules.iter().map(|r| r.left.as_str()).collect();
        self.rules
            .iter()
            .flat_map(|rule| rule.right.iter().map(String::as_str))
            .filter(|symbol| !lefts.contains(symbol))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_bundled_rules() {
        let rules = RuleSet::mgol().unwrap();

        assert_eq!(rules.len(), 39);
        assert_eq!(rules.start_rule().left, "P'");
        assert_eq!(rules.rule(19).unwrap().to_string(), "CMD -> id rcb LD pt_v");
        assert_eq!(rules.rule(20).unwrap().arity(), 3);
        assert!(rules.is_nonterminal("EXP_R"));
        assert!(!rules.nonterminals().contains("P'"));
        assert!(rules.terminals().contains("vir"));
        assert!(!rules.terminals().contains("LD"));
    }

    #[test]
    fn test_unknown_rule() {
        let rules = RuleSet::mgol().unwrap();
        assert_matches!(rules.rule(40), Err(GrammarError::UnknownRule { rule: 40 }));
    }

    #[test]
    fn test_rejects_duplicates_and_garbage() {
        let duplicated = r#"[
            {"rule_number": 1, "left": "S", "right": ["a"]},
            {"rule_number": 1, "left": "S", "right": ["b"]}
        ]"#;
        assert_matches!(
            RuleSet::from_json(duplicated, "dup.json"),
            Err(GrammarError::RulesFormat { .. })
        );
        assert_matches!(
            RuleSet::from_json("{\"rule_number\": 1}", "bad.json"),
            Err(GrammarError::RulesFormat { .. })
        );
        assert_matches!(
            RuleSet::from_json("[]", "empty.json"),
            Err(GrammarError::RulesFormat { .. })
        );
    }

    #[test]
    fn test_json_round_trip_through_a_file() {
        let rules = RuleSet::mgol().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        std::fs::write(&path, rules.to_json().unwrap()).unwrap();

        let loaded = RuleSet::load(&path).unwrap();
        assert_eq!(loaded.rules(), rules.rules());
    }
}
