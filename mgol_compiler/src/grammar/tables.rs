//! Action and goto tables with their tab-separated file format

use super::error::GrammarError;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// End-of-input column of the action table
pub const END_MARKER: &str = "$";

const HEADER_LABEL: &str = "STATE";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Shift(usize),
    Reduce(usize),
    Accept,
    /// Syntax-error category to report
    Error(u16),
}

impl Action {
    /// True for actions that let the parser make progress
    pub fn is_viable(&self) -> bool {
        !matches!(self, Action::Error(_))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Shift(state) => write!(f, "s{}", state),
            Action::Reduce(rule) => write!(f, "r{}", rule),
            Action::Accept => f.write_str("acc"),
            Action::Error(category) => write!(f, "e{}", category),
        }
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(cell: &str) -> Result<Self, Self::Err> {
        if cell == "acc" {
            return Ok(Action::Accept);
        }

        let number = |digits: &str| {
            digits
                .parse::<usize>()
                .map_err(|_| format!("invalid action cell '{}'", cell))
        };

        let mut chars = cell.chars();
        match (chars.next(), chars.as_str()) {
            (Some('s'), rest) => number(rest).map(Action::Shift),
            (Some('r'), rest) => number(rest).map(Action::Reduce),
            (Some('e'), rest) => rest
                .parse::<u16>()
                .map(Action::Error)
                .map_err(|_| format!("invalid error slot '{}'", cell)),
            _ => Err(format!("invalid action cell '{}'", cell)),
        }
    }
}

/// Header plus rows of optional cells; shared by both tables
#[derive(Debug, Clone)]
struct Grid<T> {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<Option<T>>>,
}

impl<T: Copy> Grid<T> {
    fn new(columns: Vec<String>, state_count: usize) -> Self {
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        let rows = vec![vec![None; columns.len()]; state_count];
        Self {
            columns,
            index,
            rows,
        }
    }

    fn get(&self, state: usize, column: &str) -> Option<T> {
        let col = *self.index.get(column)?;
        self.rows.get(state)?.get(col).copied().flatten()
    }

    fn cell_mut(&mut self, state: usize, column: &str) -> Option<&mut Option<T>> {
        let col = *self.index.get(column)?;
        self.rows.get_mut(state)?.get_mut(col)
    }

    fn parse<F>(content: &str, origin: &str, parse_cell: F) -> Result<Self, GrammarError>
    where
        F: Fn(&str) -> Result<T, String>,
    {
        let mut lines = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty());

        let Some((_, header)) = lines.next() else {
            return Err(GrammarError::table_format(origin, 1, "missing header row"));
        };

        let columns: Vec<String> = header
            .trim_end_matches('\r')
            .split('\t')
            .skip(1)
            .map(|name| name.trim().to_string())
            .collect();
        if columns.is_empty() {
            return Err(GrammarError::table_format(origin, 1, "header has no columns"));
        }

        let mut grid = Self::new(columns, 0);

        for (line_index, line) in lines {
            let line_number = line_index + 1;
            let mut cells = line.trim_end_matches('\r').split('\t');

            let state_cell = cells.next().unwrap_or_default().trim();
            let state: usize = state_cell.parse().map_err(|_| {
                GrammarError::table_format(
                    origin,
                    line_number,
                    format!("invalid state number '{}'", state_cell),
                )
            })?;
            if state != grid.rows.len() {
                return Err(GrammarError::table_format(
                    origin,
                    line_number,
                    format!("expected state {}, found {}", grid.rows.len(), state),
                ));
            }

            let mut row = vec![None; grid.columns.len()];
            for (col, cell) in cells.enumerate() {
                let cell = cell.trim();
                if cell.is_empty() {
                    continue;
                }
                let slot = row.get_mut(col).ok_or_else(|| {
                    GrammarError::table_format(origin, line_number, "more cells than columns")
                })?;
                *slot = Some(
                    parse_cell(cell)
                        .map_err(|e| GrammarError::table_format(origin, line_number, e))?,
                );
            }

            grid.rows.push(row);
        }

        Ok(grid)
    }

    fn render<F>(&self, render_cell: F) -> String
    where
        F: Fn(&T) -> String,
    {
        let mut output = String::new();
        output.push_str(HEADER_LABEL);
        for column in &self.columns {
            output.push('\t');
            output.push_str(column);
        }
        output.push('\n');

        for (state, row) in self.rows.iter().enumerate() {
            output.push_str(&state.to_string());
            for cell in row {
                output.push('\t');
                if let Some(value) = cell {
                    output.push_str(&render_cell(value));
                }
            }
            output.push('\n');
        }

        output
    }
}

fn read_table(path: &Path) -> Result<String, GrammarError> {
    std::fs::read_to_string(path).map_err(|source| GrammarError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_table(path: &Path, content: &str) -> Result<(), GrammarError> {
    std::fs::write(path, content).map_err(|source| GrammarError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// `(state, terminal) -> Action`; a blank cell is no action at all
#[derive(Debug, Clone)]
pub struct ActionTable {
    grid: Grid<Action>,
}

impl ActionTable {
    pub fn new(terminals: Vec<String>, state_count: usize) -> Self {
        Self {
            grid: Grid::new(terminals, state_count),
        }
    }

    pub fn action(&self, state: usize, terminal: &str) -> Option<Action> {
        self.grid.get(state, terminal)
    }

    /// Whether `(state, terminal)` holds a shift, reduce, or accept
    pub fn has_action(&self, state: usize, terminal: &str) -> bool {
        self.action(state, terminal)
            .is_some_and(|action| action.is_viable())
    }

    /// Set a cell, reporting a conflict if it already holds something else
    pub fn set(&mut self, state: usize, terminal: &str, action: Action) -> Result<(), GrammarError> {
        let slot = self
            .grid
            .cell_mut(state, terminal)
            .ok_or_else(|| GrammarError::UndefinedSymbol {
                symbol: terminal.to_string(),
                table: "action table",
            })?;

        match *slot {
            Some(existing) if existing != action => Err(GrammarError::Conflict {
                state,
                terminal: terminal.to_string(),
                existing,
                incoming: action,
            }),
            _ => {
                *slot = Some(action);
                Ok(())
            }
        }
    }

    /// Fill every blank cell of `state` with `action`
    pub fn fill_blanks(&mut self, state: usize, action: Action) {
        if let Some(row) = self.grid.rows.get_mut(state) {
            for cell in row.iter_mut().filter(|cell| cell.is_none()) {
                *cell = Some(action);
            }
        }
    }

    pub fn terminals(&self) -> &[String] {
        &self.grid.columns
    }

    pub fn state_count(&self) -> usize {
        self.grid.rows.len()
    }

    /// Every filled cell as `(state, terminal, action)`
    pub fn cells(&self) -> impl Iterator<Item = (usize, &str, Action)> + '_ {
        self.grid.rows.iter().enumerate().flat_map(move |(state, row)| {
            row.iter().copied().enumerate().filter_map(move |(col, cell)| {
                cell.map(|action| (state, self.grid.columns[col].as_str(), action))
            })
        })
    }

    pub fn from_tsv(content: &str, origin: &str) -> Result<Self, GrammarError> {
        let grid = Grid::parse(content, origin, Action::from_str)?;
        if !grid.index.contains_key(END_MARKER) {
            return Err(GrammarError::UndefinedSymbol {
                symbol: END_MARKER.to_string(),
                table: "action table",
            });
        }
        Ok(Self { grid })
    }

    pub fn to_tsv(&self) -> String {
        self.grid.render(Action::to_string)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GrammarError> {
        let path = path.as_ref();
        Self::from_tsv(&read_table(path)?, &path.display().to_string())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), GrammarError> {
        write_table(path.as_ref(), &self.to_tsv())
    }
}

/// `(state, nonterminal) -> state`
#[derive(Debug, Clone)]
pub struct GotoTable {
    grid: Grid<usize>,
}

impl GotoTable {
    pub fn new(nonterminals: Vec<String>, state_count: usize) -> Self {
        Self {
            grid: Grid::new(nonterminals, state_count),
        }
    }

    pub fn goto(&self, state: usize, nonterminal: &str) -> Option<usize> {
        self.grid.get(state, nonterminal)
    }

    pub fn set(&mut self, state: usize, nonterminal: &str, target: usize) -> Result<(), GrammarError> {
        let slot = self
            .grid
            .cell_mut(state, nonterminal)
            .ok_or_else(|| GrammarError::UndefinedSymbol {
                symbol: nonterminal.to_string(),
                table: "goto table",
            })?;
        *slot = Some(target);
        Ok(())
    }

    pub fn nonterminals(&self) -> &[String] {
        &self.grid.columns
    }

    pub fn state_count(&self) -> usize {
        self.grid.rows.len()
    }

    pub fn targets(&self) -> impl Iterator<Item = usize> + '_ {
        self.grid.rows.iter().flatten().flatten().copied()
    }

    pub fn from_tsv(content: &str, origin: &str) -> Result<Self, GrammarError> {
        let grid = Grid::parse(content, origin, |cell| {
            cell.parse::<usize>()
                .map_err(|_| format!("invalid goto cell '{}'", cell))
        })?;
        Ok(Self { grid })
    }

    pub fn to_tsv(&self) -> String {
        self.grid.render(usize::to_string)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GrammarError> {
        let path = path.as_ref();
        Self::from_tsv(&read_table(path)?, &path.display().to_string())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), GrammarError> {
        write_table(path.as_ref(), &self.to_tsv())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    const ACTIONS: &str = "STATE\tid\tpt_v\t$\n\
                           0\ts2\t\te1\n\
                           1\t\t\tacc\n\
                           2\tr3\tr3\tr3\n";

    #[test]
    fn test_action_cells() {
        assert_eq!("s12".parse::<Action>(), Ok(Action::Shift(12)));
        assert_eq!("r3".parse::<Action>(), Ok(Action::Reduce(3)));
        assert_eq!("acc".parse::<Action>(), Ok(Action::Accept));
        assert_eq!("e9".parse::<Action>(), Ok(Action::Error(9)));
        assert!("x1".parse::<Action>().is_err());
        assert!("s".parse::<Action>().is_err());
    }

    #[test]
    fn test_action_table_queries() {
        let table = ActionTable::from_tsv(ACTIONS, "actions.tsv").unwrap();

        assert_eq!(table.state_count(), 3);
        assert_eq!(table.action(0, "id"), Some(Action::Shift(2)));
        assert_eq!(table.action(0, "pt_v"), None);
        assert_eq!(table.action(0, "$"), Some(Action::Error(1)));
        assert_eq!(table.action(1, "$"), Some(Action::Accept));
        assert_eq!(table.action(7, "id"), None);
        assert_eq!(table.action(0, "opm"), None);

        assert!(table.has_action(2, "pt_v"));
        assert!(!table.has_action(0, "$"));
    }

    #[test]
    fn test_tsv_round_trip() {
        let table = ActionTable::from_tsv(ACTIONS, "actions.tsv").unwrap();
        assert_eq!(table.to_tsv(), ACTIONS);
    }

    #[test]
    fn test_malformed_tables() {
        assert_matches!(
            ActionTable::from_tsv("", "empty.tsv"),
            Err(GrammarError::TableFormat { line: 1, .. })
        );
        assert_matches!(
            ActionTable::from_tsv("STATE\tid\t$\n0\tq7\t\n", "bad.tsv"),
            Err(GrammarError::TableFormat { line: 2, .. })
        );
        assert_matches!(
            ActionTable::from_tsv("STATE\tid\t$\n1\ts1\t\n", "order.tsv"),
            Err(GrammarError::TableFormat { line: 2, .. })
        );
        assert_matches!(
            ActionTable::from_tsv("STATE\tid\n0\ts1\n", "noend.tsv"),
            Err(GrammarError::UndefinedSymbol { .. })
        );
        assert_matches!(
            GotoTable::from_tsv("STATE\tA\n0\t1\t2\n", "wide.tsv"),
            Err(GrammarError::TableFormat { line: 2, .. })
        );
    }

    #[test]
    fn test_goto_blank_is_undefined() {
        let table = GotoTable::from_tsv("STATE\tA\tB\n0\t3\t\n1\t\t4\n", "goto.tsv").unwrap();

        assert_eq!(table.goto(0, "A"), Some(3));
        assert_eq!(table.goto(0, "B"), None);
        assert_eq!(table.goto(1, "B"), Some(4));
        assert_eq!(table.goto(1, "C"), None);
    }

    #[test]
    fn test_conflicting_set_is_reported() {
        let mut table = ActionTable::new(vec!["id".into(), "$".into()], 1);

        table.set(0, "id", Action::Shift(1)).unwrap();
        table.set(0, "id", Action::Shift(1)).unwrap();
        assert_matches!(
            table.set(0, "id", Action::Reduce(2)),
            Err(GrammarError::Conflict { state: 0, .. })
        );

        table.fill_blanks(0, Action::Error(1));
        assert_eq!(table.action(0, "$"), Some(Action::Error(1)));
        assert_eq!(table.action(0, "id"), Some(Action::Shift(1)));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("goto.tsv");

        let mut table = GotoTable::new(vec!["A".into()], 2);
        table.set(1, "A", 5).unwrap();
        table.save(&path).unwrap();

        let loaded = GotoTable::load(&path).unwrap();
        assert_eq!(loaded.goto(1, "A"), Some(5));
        assert_eq!(loaded.goto(0, "A"), None);
    }
}
