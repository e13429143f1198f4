//! SLR(1) construction: LR(0) canonical collection plus FIRST/FOLLOW

use super::category::ErrorCategory;
use super::error::GrammarError;
use super::rules::{Rule, RuleSet};
use super::tables::{Action, ActionTable, GotoTable, END_MARKER};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct Item {
    /// Index into `RuleSet::rules`
    rule: usize,
    dot: usize,
}

/// A kernel item as seen by an [`ErrorPolicy`]
#[derive(Debug, Clone, Copy)]
pub struct KernelItem<'a> {
    pub rule: &'a Rule,
    pub dot: usize,
}

impl<'a> KernelItem<'a> {
    /// Symbol right after the dot, if any
    pub fn next_symbol(&self) -> Option<&'a str> {
        self.rule.right.get(self.dot).map(String::as_str)
    }
}

/// Chooses the category written into a state's blank action cells
pub trait ErrorPolicy {
    fn category(&self, state: usize, kernel: &[KernelItem<'_>]) -> ErrorCategory;
}

/// Every blank cell is an unexpected token
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformErrorPolicy;

impl ErrorPolicy for UniformErrorPolicy {
    fn category(&self, _state: usize, _kernel: &[KernelItem<'_>]) -> ErrorCategory {
        ErrorCategory::UnexpectedToken
    }
}

/// Categories for the MGol grammar, derived from what each state is parsing
#[derive(Debug, Clone, Copy, Default)]
pub struct MgolErrorPolicy;

impl MgolErrorPolicy {
    const BY_LEFT_SIDE: [(ErrorCategory, &'static [&'static str]); 5] = [
        (ErrorCategory::MalformedDeclaration, &["V", "LV", "D", "L", "TIPO"]),
        (ErrorCategory::MalformedLoop, &["R", "CABR", "CPR"]),
        (ErrorCategory::MalformedConditional, &["COND", "CAB", "CP", "EXP_R"]),
        (ErrorCategory::MalformedIo, &["ES", "ARG"]),
        (ErrorCategory::MalformedAssignment, &["CMD", "LD", "OPRD"]),
    ];
}

impl ErrorPolicy for MgolErrorPolicy {
    fn category(&self, state: usize, kernel: &[KernelItem<'_>]) -> ErrorCategory {
        let expects = |terminal: &str| {
            kernel
                .iter()
                .any(|item| item.next_symbol() == Some(terminal))
        };

        if expects("fc_p") {
            return ErrorCategory::UnbalancedParentheses;
        }
        if expects("pt_v") {
            return ErrorCategory::MissingSemicolon;
        }

        for (category, lefts) in Self::BY_LEFT_SIDE {
            if kernel.iter().any(|item| lefts.contains(&item.rule.left.as_str())) {
                return category;
            }
        }

        if state == 0 {
            ErrorCategory::MissingProgramStart
        } else {
            ErrorCategory::UnexpectedToken
        }
    }
}

#[derive(Debug, Clone)]
pub struct SlrTables {
    pub actions: ActionTable,
    pub gotos: GotoTable,
}

pub struct SlrBuilder<'a, P: ErrorPolicy = UniformErrorPolicy> {
    rules: &'a RuleSet,
    policy: P,
    nonterminals: HashSet<&'a str>,
    productions: HashMap<&'a str, Vec<usize>>,
    /// Grammar symbols in order of first appearance
    symbols: Vec<&'a str>,
}

impl<'a> SlrBuilder<'a, UniformErrorPolicy> {
    pub fn new(rules: &'a RuleSet) -> Self {
        let mut nonterminals = HashSet::new();
        let mut productions: HashMap<&str, Vec<usize>> = HashMap::new();
        let mut symbols = Vec::new();
        let mut seen = HashSet::new();

        for (index, rule) in rules.rules().iter().enumerate() {
            nonterminals.insert(rule.left.as_str());
            productions.entry(rule.left.as_str()).or_default().push(index);

            for symbol in std::iter::once(&rule.left).chain(&rule.right) {
                if seen.insert(symbol.as_str()) {
                    symbols.push(symbol.as_str());
                }
            }
        }

        Self {
            rules,
            policy: UniformErrorPolicy,
            nonterminals,
            productions,
            symbols,
        }
    }
}

impl<'a, P: ErrorPolicy> SlrBuilder<'a, P> {
    pub fn with_error_policy<Q: ErrorPolicy>(self, policy: Q) -> SlrBuilder<'a, Q> {
        SlrBuilder {
            rules: self.rules,
            policy,
            nonterminals: self.nonterminals,
            productions: self.productions,
            symbols: self.symbols,
        }
    }

    fn rule(&self, item: Item) -> &'a Rule {
        &self.rules.rules()[item.rule]
    }

    fn next_symbol(&self, item: Item) -> Option<&'a str> {
        self.rule(item).right.get(item.dot).map(String::as_str)
    }

    fn is_nonterminal(&self, symbol: &str) -> bool {
        self.nonterminals.contains(symbol)
    }

    fn terminals(&self) -> Vec<String> {
        self.symbols
            .iter()
            .filter(|symbol| !self.is_nonterminal(symbol))
            .map(|symbol| symbol.to_string())
            .chain(std::iter::once(END_MARKER.to_string()))
            .collect()
    }

    fn goto_nonterminals(&self) -> Vec<String> {
        let start = self.rules.start_rule().left.as_str();
        self.symbols
            .iter()
            .filter(|symbol| self.is_nonterminal(symbol) && **symbol != start)
            .map(|symbol| symbol.to_string())
            .collect()
    }

    fn closure(&self, kernel: &BTreeSet<Item>) -> BTreeSet<Item> {
        let mut items = kernel.clone();
        let mut pending: Vec<Item> = kernel.iter().copied().collect();

        while let Some(item) = pending.pop() {
            let Some(symbol) = self.next_symbol(item) else {
                continue;
            };
            for &rule in self.productions.get(symbol).into_iter().flatten() {
                let added = Item { rule, dot: 0 };
                if items.insert(added) {
                    pending.push(added);
                }
            }
        }

        items
    }

    /// Kernels of the LR(0) canonical collection and their transitions
    fn canonical_collection(&self) -> (Vec<BTreeSet<Item>>, Vec<Vec<(&'a str, usize)>>) {
        let start = BTreeSet::from([Item { rule: 0, dot: 0 }]);
        let mut kernels = vec![start.clone()];
        let mut index: HashMap<BTreeSet<Item>, usize> = HashMap::from([(start, 0)]);
        let mut transitions = vec![Vec::new()];
        let mut queue = VecDeque::from([0]);

        while let Some(state) = queue.pop_front() {
            let closure = self.closure(&kernels[state]);

            for &symbol in &self.symbols {
                let next: BTreeSet<Item> = closure
                    .iter()
                    .filter(|item| self.next_symbol(**item) == Some(symbol))
                    .map(|item| Item {
                        rule: item.rule,
                        dot: item.dot + 1,
                    })
                    .collect();
                if next.is_empty() {
                    continue;
                }

                let target = match index.get(&next) {
                    Some(&target) => target,
                    None => {
                        let target = kernels.len();
                        kernels.push(next.clone());
                        transitions.push(Vec::new());
                        index.insert(next, target);
                        queue.push_back(target);
                        target
                    }
                };
                transitions[state].push((symbol, target));
            }
        }

        (kernels, transitions)
    }

    /// FIRST of a symbol sequence, and whether the whole sequence is nullable
    fn first_of(
        &self,
        sequence: impl IntoIterator<Item = &'a str>,
        first: &HashMap<&'a str, BTreeSet<&'a str>>,
        nullable: &HashSet<&'a str>,
    ) -> (BTreeSet<&'a str>, bool) {
        let mut result = BTreeSet::new();
        for symbol in sequence {
            match first.get(symbol) {
                Some(set) => result.extend(set.iter().copied()),
                None => {
                    result.insert(symbol);
                    return (result, false);
                }
            }
            if !nullable.contains(symbol) {
                return (result, false);
            }
        }
        (result, true)
    }

    fn first_sets(&self) -> (HashMap<&'a str, BTreeSet<&'a str>>, HashSet<&'a str>) {
        let mut first: HashMap<&str, BTreeSet<&str>> = self
            .nonterminals
            .iter()
            .map(|nt| (*nt, BTreeSet::new()))
            .collect();
        let mut nullable = HashSet::new();

        loop {
            let mut changed = false;
            for rule in self.rules.rules() {
                let (set, is_nullable) =
                    self.first_of(rule.right.iter().map(String::as_str), &first, &nullable);

                let entry = first.entry(rule.left.as_str()).or_default();
                let before = entry.len();
                entry.extend(set);
                changed |= entry.len() != before;

                if is_nullable {
                    changed |= nullable.insert(rule.left.as_str());
                }
            }
            if !changed {
                return (first, nullable);
            }
        }
    }

    fn follow_sets(
        &self,
        first: &HashMap<&'a str, BTreeSet<&'a str>>,
        nullable: &HashSet<&'a str>,
    ) -> HashMap<&'a str, BTreeSet<&'a str>> {
        let mut follow: HashMap<&str, BTreeSet<&str>> = self
            .nonterminals
            .iter()
            .map(|nt| (*nt, BTreeSet::new()))
            .collect();
        follow
            .entry(self.rules.start_rule().left.as_str())
            .or_default()
            .insert(END_MARKER);

        loop {
            let mut changed = false;
            for rule in self.rules.rules() {
                for (position, symbol) in rule.right.iter().enumerate() {
                    if !self.is_nonterminal(symbol) {
                        continue;
                    }

                    let rest = rule.right[position + 1..].iter().map(String::as_str);
                    let (mut addition, rest_nullable) = self.first_of(rest, first, nullable);
                    if rest_nullable {
                        if let Some(left_follow) = follow.get(rule.left.as_str()) {
                            addition.extend(left_follow.iter().copied());
                        }
                    }

                    let entry = follow.entry(symbol.as_str()).or_default();
                    let before = entry.len();
                    entry.extend(addition);
                    changed |= entry.len() != before;
                }
            }
            if !changed {
                return follow;
            }
        }
    }

    pub fn build(&self) -> Result<SlrTables, GrammarError> {
        let (kernels, transitions) = self.canonical_collection();
        let (first, nullable) = self.first_sets();
        let follow = self.follow_sets(&first, &nullable);

        let state_count = kernels.len();
        let mut actions = ActionTable::new(self.terminals(), state_count);
        let mut gotos = GotoTable::new(self.goto_nonterminals(), state_count);

        for (state, edges) in transitions.iter().enumerate() {
            for &(symbol, target) in edges {
                if self.is_nonterminal(symbol) {
                    gotos.set(state, symbol, target)?;
                } else {
                    actions.set(state, symbol, Action::Shift(target))?;
                }
            }
        }

        for (state, kernel) in kernels.iter().enumerate() {
            for item in self.closure(kernel) {
                let rule = self.rule(item);
                if item.dot < rule.right.len() {
                    continue;
                }

                if item.rule == 0 {
                    actions.set(state, END_MARKER, Action::Accept)?;
                    continue;
                }

                for &terminal in follow.get(rule.left.as_str()).into_iter().flatten() {
                    actions.set(state, terminal, Action::Reduce(rule.number))?;
                }
            }

            let kernel_items: Vec<KernelItem<'_>> = kernel
                .iter()
                .map(|item| KernelItem {
                    rule: self.rule(*item),
                    dot: item.dot,
                })
                .collect();
            let category = self.policy.category(state, &kernel_items);
            actions.fill_blanks(state, Action::Error(category.number()));
        }

        Ok(SlrTables { actions, gotos })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn mgol_tables() -> SlrTables {
        let rules = RuleSet::mgol().unwrap();
        SlrBuilder::new(&rules)
            .with_error_policy(MgolErrorPolicy)
            .build()
            .unwrap()
    }

    /// Drive the tables over terminal names; true on accept
    fn accepts(tables: &SlrTables, rules: &RuleSet, input: &[&str]) -> bool {
        let mut stack = vec![0usize];
        let mut input = input.iter().copied().chain(std::iter::once(END_MARKER));
        let mut lookahead = input.next().unwrap();

        loop {
            let state = *stack.last().unwrap();
            match tables.actions.action(state, lookahead) {
                Some(Action::Shift(target)) => {
                    stack.push(target);
                    lookahead = input.next().unwrap_or(END_MARKER);
                }
                Some(Action::Reduce(number)) => {
                    let rule = rules.rule(number).unwrap();
                    stack.truncate(stack.len() - rule.arity());
                    let top = *stack.last().unwrap();
                    stack.push(tables.gotos.goto(top, &rule.left).unwrap());
                }
                Some(Action::Accept) => return true,
                Some(Action::Error(_)) | None => return false,
            }
        }
    }

    #[test]
    fn test_mgol_grammar_is_slr1() {
        let tables = mgol_tables();
        assert!(tables.actions.state_count() > 40);
        assert_eq!(tables.actions.terminals().last().map(String::as_str), Some("$"));
        assert!(tables.gotos.nonterminals().iter().all(|nt| nt != "P'"));
    }

    #[test]
    fn test_tables_accept_programs() {
        let rules = RuleSet::mgol().unwrap();
        let tables = mgol_tables();

        let program = [
            "inicio", "varinicio", "inteiro", "id", "vir", "id", "pt_v", "varfim", "pt_v",
            "leia", "id", "pt_v",
            "se", "ab_p", "id", "opr", "num", "fc_p", "entao",
            "id", "rcb", "id", "opm", "num", "pt_v",
            "fimse",
            "repita", "ab_p", "id", "opr", "id", "fc_p",
            "escreva", "lit", "pt_v",
            "fimrepita",
            "fim",
        ];
        assert!(accepts(&tables, &rules, &program));
        assert!(!accepts(&tables, &rules, &["inicio", "fim"]));
        assert!(!accepts(&tables, &rules, &["varinicio"]));
    }

    #[test]
    fn test_every_cell_is_filled() {
        let tables = mgol_tables();
        for state in 0..tables.actions.state_count() {
            for terminal in tables.actions.terminals() {
                assert!(tables.actions.action(state, terminal).is_some());
            }
        }
    }

    #[test]
    fn test_error_categories() {
        let tables = mgol_tables();

        assert_eq!(
            tables.actions.action(0, "fim"),
            Some(Action::Error(ErrorCategory::MissingProgramStart.number()))
        );

        let categories: BTreeSet<u16> = tables
            .actions
            .cells()
            .filter_map(|(_, _, action)| match action {
                Action::Error(category) => Some(category),
                _ => None,
            })
            .collect();
        for expected in [3, 4, 5, 6, 7, 8, 9] {
            assert!(categories.contains(&expected), "category {expected} never used");
        }
    }

    #[test]
    fn test_conflicts_are_rejected() {
        let ambiguous = RuleSet::new(
            vec![
                Rule::new(1, "S'", &["E"]),
                Rule::new(2, "E", &["E", "+", "E"]),
                Rule::new(3, "E", &["n"]),
            ],
            "ambiguous",
        )
        .unwrap();

        assert_matches!(
            SlrBuilder::new(&ambiguous).build(),
            Err(GrammarError::Conflict { .. })
        );
    }

    #[test]
    fn test_nullable_productions() {
        let rules = RuleSet::new(
            vec![
                Rule::new(1, "S'", &["S"]),
                Rule::new(2, "S", &["a", "B", "c"]),
                Rule::new(3, "B", &["b"]),
                Rule::new(4, "B", &[]),
            ],
            "nullable",
        )
        .unwrap();
        let tables = SlrBuilder::new(&rules).build().unwrap();

        assert!(accepts(&tables, &rules, &["a", "c"]));
        assert!(accepts(&tables, &rules, &["a", "b", "c"]));
        assert!(!accepts(&tables, &rules, &["a", "b"]));
    }
}
