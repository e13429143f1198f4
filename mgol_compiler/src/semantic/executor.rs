//! Rule-keyed semantic actions over the value stack
//!
//! Every reduction pops one value per right-hand symbol and pushes exactly one
//! value for the left side, so the value stack always holds one entry fewer
//! than the parser's state stack. Rules without a registered action push an
//! empty nonterminal. Type errors become diagnostics and set a sticky flag that
//! suppresses the final program; only internal failures are `Err`.

use super::codegen::{c_string_literal, CodeBuffer, TemporaryKind};
use super::error::SemanticError;
use crate::config::compile_time::semantic::MAX_SEMANTIC_ERRORS;
use crate::diagnostics::Diagnostic;
use crate::grammar::Rule;
use crate::logging::codes::{self, Code};
use crate::symbols::SymbolTable;
use crate::tokens::{DataType, Keyword, Token, TokenClass};
use crate::utils::{BoundedStack, Position, Span, Spanned};
use crate::{log_debug, log_error, log_warning};

pub type SemanticAction =
    fn(&mut SemanticExecutor, &Reduction<'_>, &mut SymbolTable) -> Result<Token, SemanticError>;

/// Values popped for one reduction, leftmost first
pub struct Reduction<'r> {
    pub rule: &'r Rule,
    pub values: Vec<Spanned<Token>>,
    /// Parser position when the reduction fired
    pub position: Position,
}

impl Reduction<'_> {
    pub fn token(&self, index: usize) -> Result<&Token, SemanticError> {
        self.values
            .get(index)
            .map(|value| &value.value)
            .ok_or(SemanticError::ValueStackUnderflow {
                rule: self.rule.number,
                needed: index + 1,
                available: self.values.len(),
            })
    }

    /// Where the `index`th right-hand symbol started
    pub fn position_of(&self, index: usize) -> Position {
        self.values
            .get(index)
            .map(|value| value.span.start)
            .unwrap_or(self.position)
    }

    fn empty(&self) -> Token {
        Token::nonterminal(self.rule.left.as_str())
    }
}

const MGOL_ACTIONS: [(usize, SemanticAction); 21] = [
    (6, declaration),
    (7, declare_identifier),
    (8, declare_identifier),
    (9, declared_type),
    (10, declared_type),
    (11, declared_type),
    (13, read_statement),
    (14, write_statement),
    (15, pass_through),
    (16, pass_through),
    (17, pass_through),
    (19, assignment),
    (20, arithmetic),
    (21, operand_expression),
    (22, identifier_operand),
    (23, number_operand),
    (25, close_conditional),
    (26, open_conditional),
    (27, relational),
    (33, close_loop),
    (34, open_loop),
];

pub struct SemanticExecutor {
    actions: Vec<Option<SemanticAction>>,
    values: BoundedStack<Spanned<Token>>,
    code: CodeBuffer,
    pending_type: DataType,
    /// Identifiers of the declaration being reduced, rightmost first
    pending_names: Vec<String>,
    last_relational: Option<String>,
    /// Statements that recompute each open loop's condition
    loop_recompute: Vec<String>,
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
}

impl SemanticExecutor {
    /// Executor with the MGol actions registered
    pub fn new(capacity: usize) -> Self {
        let mut executor = Self::without_actions(capacity);
        for (rule, action) in MGOL_ACTIONS {
            executor.register(rule, action);
        }
        executor
    }

    /// Executor where every rule only synthesizes an empty nonterminal
    pub fn without_actions(capacity: usize) -> Self {
        Self {
            actions: Vec::new(),
            values: BoundedStack::new(capacity),
            code: CodeBuffer::new(),
            pending_type: DataType::Null,
            pending_names: Vec::new(),
            last_relational: None,
            loop_recompute: Vec::new(),
            diagnostics: Vec::new(),
            error_count: 0,
        }
    }

    pub fn register(&mut self, rule: usize, action: SemanticAction) {
        if self.actions.len() <= rule {
            self.actions.resize(rule + 1, None);
        }
        self.actions[rule] = Some(action);
    }

    fn action_for(&self, rule: usize) -> Option<SemanticAction> {
        self.actions.get(rule).copied().flatten()
    }

    /// Push a token the parser just shifted
    pub fn shift(&mut self, token: Spanned<Token>) -> Result<(), SemanticError> {
        self.values.push(token)?;
        Ok(())
    }

    pub fn reduce(
        &mut self,
        rule: &Rule,
        position: Position,
        symbols: &mut SymbolTable,
    ) -> Result<(), SemanticError> {
        let arity = rule.arity();
        if self.values.len() < arity {
            return Err(SemanticError::ValueStackUnderflow {
                rule: rule.number,
                needed: arity,
                available: self.values.len(),
            });
        }

        let values = self.values.pop_many(arity)?;
        let span = values
            .iter()
            .map(|value| value.span)
            .reduce(Span::merge)
            .unwrap_or_else(|| Span::empty(position));

        let reduction = Reduction {
            rule,
            values,
            position,
        };

        let value = match self.action_for(rule.number) {
            Some(action) => action(self, &reduction, symbols)?,
            None => reduction.empty(),
        };

        log_debug!("Semantic action", "rule" => rule.number, "value" => &value.lexeme);
        self.values.push(Spanned::new(value, span))?;
        Ok(())
    }

    /// Drop values above `len`; recovery uses this to realign with the state stack
    pub fn truncate_values(&mut self, len: usize) {
        self.values.truncate(len);
    }

    pub fn value_depth(&self) -> usize {
        self.values.len()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Every semantic error reported, including any past the recording limit
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    pub fn code(&self) -> &CodeBuffer {
        &self.code
    }

    /// The C program, unless a semantic error was reported
    pub fn generate_program(&self) -> Option<String> {
        if self.has_errors() {
            None
        } else {
            Some(self.code.render_program())
        }
    }

    fn report(&mut self, code: Code, message: String, position: Position, lexeme: &str) {
        self.error_count += 1;
        log_error!(code, &message, span = Span::single(position),
            "lexeme" => lexeme,
            "line" => position.line,
            "column" => position.column
        );

        if self.diagnostics.len() < MAX_SEMANTIC_ERRORS {
            self.diagnostics
                .push(Diagnostic::semantic(code, message, position).with_lexeme(lexeme));
        } else if self.error_count == MAX_SEMANTIC_ERRORS + 1 {
            log_warning!("Semantic error limit reached; further errors are only counted",
                "limit" => MAX_SEMANTIC_ERRORS
            );
        }
    }

    /// Registry type of `id`, reporting it when undeclared
    fn lookup(&mut self, id: &Token, position: Position, symbols: &SymbolTable) -> DataType {
        let data_type = symbols.data_type_of(&id.lexeme);
        if data_type == DataType::Null {
            self.report(
                codes::semantic::UNDECLARED_IDENTIFIER,
                format!("Variable '{}' not declared", id.lexeme),
                position,
                &id.lexeme,
            );
        }
        data_type
    }

    fn declare(
        &mut self,
        id: &Token,
        position: Position,
        symbols: &mut SymbolTable,
    ) -> Result<(), SemanticError> {
        let current = symbols.data_type_of(&id.lexeme);
        if current != DataType::Null {
            self.report(
                codes::semantic::REDECLARATION,
                format!("Variable '{}' already declared as {}", id.lexeme, current),
                position,
                &id.lexeme,
            );
            return Ok(());
        }

        if self.pending_type != DataType::Null {
            symbols.set_data_type(&id.lexeme, self.pending_type)?;
            self.pending_names.push(id.lexeme.clone());
        }
        Ok(())
    }
}

fn unresolved() -> Token {
    Token::new(TokenClass::Nonterminal, "", DataType::Null)
}

fn c_relational(operator: &str) -> &str {
    match operator {
        "=" => "==",
        "<>" => "!=",
        other => other,
    }
}

fn declared_type(
    executor: &mut SemanticExecutor,
    reduction: &Reduction<'_>,
    _symbols: &mut SymbolTable,
) -> Result<Token, SemanticError> {
    let keyword = reduction.token(0)?;
    let data_type = match keyword.class {
        TokenClass::Keyword(Keyword::Inteiro) => DataType::Integer,
        TokenClass::Keyword(Keyword::Real) => DataType::Real,
        TokenClass::Keyword(Keyword::Literal) => DataType::Literal,
        _ => DataType::Null,
    };

    executor.pending_type = data_type;
    Ok(Token::new(
        TokenClass::Nonterminal,
        keyword.lexeme.clone(),
        data_type,
    ))
}

fn declare_identifier(
    executor: &mut SemanticExecutor,
    reduction: &Reduction<'_>,
    symbols: &mut SymbolTable,
) -> Result<Token, SemanticError> {
    let id = reduction.token(0)?;
    executor.declare(id, reduction.position_of(0), symbols)?;
    Ok(reduction.empty())
}

fn declaration(
    executor: &mut SemanticExecutor,
    reduction: &Reduction<'_>,
    _symbols: &mut SymbolTable,
) -> Result<Token, SemanticError> {
    let declared = reduction.token(0)?;
    let mut names = std::mem::take(&mut executor.pending_names);
    names.reverse();

    if let Some(c_type) = declared.data_type.c_type() {
        if !names.is_empty() {
            executor
                .code
                .emit_line(&format!("{} {};", c_type, names.join(", ")));
        }
    }

    executor.pending_type = DataType::Null;
    Ok(reduction.empty())
}

fn read_statement(
    executor: &mut SemanticExecutor,
    reduction: &Reduction<'_>,
    symbols: &mut SymbolTable,
) -> Result<Token, SemanticError> {
    let id = reduction.token(1)?;
    let data_type = executor.lookup(id, reduction.position_of(1), symbols);

    if let Some(spec) = data_type.format_spec() {
        let target = if data_type == DataType::Literal {
            id.lexeme.clone()
        } else {
            format!("&{}", id.lexeme)
        };
        executor
            .code
            .emit_line(&format!("scanf(\"{}\", {});", spec, target));
    }
    Ok(reduction.empty())
}

fn write_statement(
    executor: &mut SemanticExecutor,
    reduction: &Reduction<'_>,
    symbols: &mut SymbolTable,
) -> Result<Token, SemanticError> {
    let argument = reduction.token(1)?;

    let data_type = match argument.class {
        TokenClass::LiteralConstant => {
            let text = c_string_literal(&argument.lexeme);
            executor
                .code
                .emit_line(&format!("printf(\"%s\", {});", text));
            return Ok(reduction.empty());
        }
        TokenClass::Identifier => executor.lookup(argument, reduction.position_of(1), symbols),
        _ => argument.data_type,
    };

    if let Some(spec) = data_type.format_spec() {
        executor
            .code
            .emit_line(&format!("printf(\"{}\", {});", spec, argument.lexeme));
    }
    Ok(reduction.empty())
}

fn pass_through(
    _executor: &mut SemanticExecutor,
    reduction: &Reduction<'_>,
    _symbols: &mut SymbolTable,
) -> Result<Token, SemanticError> {
    Ok(reduction.token(0)?.clone())
}

fn assignment(
    executor: &mut SemanticExecutor,
    reduction: &Reduction<'_>,
    symbols: &mut SymbolTable,
) -> Result<Token, SemanticError> {
    let id = reduction.token(0)?;
    let value = reduction.token(2)?;
    let target = executor.lookup(id, reduction.position_of(0), symbols);

    if target == DataType::Null || value.data_type == DataType::Null {
        return Ok(reduction.empty());
    }

    if target != value.data_type {
        executor.report(
            codes::semantic::ASSIGNMENT_TYPE_MISMATCH,
            format!(
                "Cannot assign {} value '{}' to '{}' of type {}",
                value.data_type, value.lexeme, id.lexeme, target
            ),
            reduction.position_of(0),
            &id.lexeme,
        );
        return Ok(reduction.empty());
    }

    let statement = if target == DataType::Literal {
        format!("strcpy({}, {});", id.lexeme, value.lexeme)
    } else {
        format!("{} = {};", id.lexeme, value.lexeme)
    };
    executor.code.emit_line(&statement);
    Ok(reduction.empty())
}

/// Shared checks for `OPRD op OPRD`; `None` when the production is in error
fn binary_operands<'a>(
    executor: &mut SemanticExecutor,
    reduction: &'a Reduction<'_>,
) -> Result<Option<(&'a Token, &'a Token, &'a Token)>, SemanticError> {
    let left = reduction.token(0)?;
    let operator = reduction.token(1)?;
    let right = reduction.token(2)?;

    if left.data_type == DataType::Null || right.data_type == DataType::Null {
        return Ok(None);
    }

    if left.data_type != right.data_type {
        executor.report(
            codes::semantic::TYPE_MISMATCH,
            format!(
                "Operands of '{}' have different types: '{}' is {}, '{}' is {}",
                operator.lexeme, left.lexeme, left.data_type, right.lexeme, right.data_type
            ),
            reduction.position_of(0),
            &operator.lexeme,
        );
        return Ok(None);
    }

    Ok(Some((left, operator, right)))
}

fn arithmetic(
    executor: &mut SemanticExecutor,
    reduction: &Reduction<'_>,
    _symbols: &mut SymbolTable,
) -> Result<Token, SemanticError> {
    let Some((left, operator, right)) = binary_operands(executor, reduction)? else {
        return Ok(unresolved());
    };

    let Some(kind) = TemporaryKind::for_arithmetic(left.data_type) else {
        executor.report(
            codes::semantic::LITERAL_IN_ARITHMETIC,
            format!(
                "Operator '{}' cannot be applied to literal operands",
                operator.lexeme
            ),
            reduction.position_of(0),
            &operator.lexeme,
        );
        return Ok(unresolved());
    };

    let temporary = executor.code.new_temporary(kind)?;
    executor.code.emit_line(&format!(
        "{} = {} {} {};",
        temporary, left.lexeme, operator.lexeme, right.lexeme
    ));
    Ok(Token::new(TokenClass::Nonterminal, temporary, left.data_type))
}

fn relational(
    executor: &mut SemanticExecutor,
    reduction: &Reduction<'_>,
    _symbols: &mut SymbolTable,
) -> Result<Token, SemanticError> {
    executor.last_relational = None;

    let Some((left, operator, right)) = binary_operands(executor, reduction)? else {
        return Ok(unresolved());
    };

    let temporary = executor.code.new_temporary(TemporaryKind::Bool)?;
    let statement = format!(
        "{} = {} {} {};",
        temporary,
        left.lexeme,
        c_relational(&operator.lexeme),
        right.lexeme
    );
    executor.code.emit_line(&statement);
    executor.last_relational = Some(statement);

    Ok(Token::new(
        TokenClass::Nonterminal,
        temporary,
        TemporaryKind::Bool.data_type(),
    ))
}

fn operand_expression(
    _executor: &mut SemanticExecutor,
    reduction: &Reduction<'_>,
    _symbols: &mut SymbolTable,
) -> Result<Token, SemanticError> {
    let operand = reduction.token(0)?;
    Ok(Token::new(
        TokenClass::Nonterminal,
        operand.lexeme.clone(),
        operand.data_type,
    ))
}

fn identifier_operand(
    executor: &mut SemanticExecutor,
    reduction: &Reduction<'_>,
    symbols: &mut SymbolTable,
) -> Result<Token, SemanticError> {
    let id = reduction.token(0)?;
    let data_type = executor.lookup(id, reduction.position_of(0), symbols);
    Ok(Token::new(TokenClass::Nonterminal, id.lexeme.clone(), data_type))
}

fn number_operand(
    _executor: &mut SemanticExecutor,
    reduction: &Reduction<'_>,
    _symbols: &mut SymbolTable,
) -> Result<Token, SemanticError> {
    let number = reduction.token(0)?;
    Ok(Token::new(
        TokenClass::Nonterminal,
        number.lexeme.clone(),
        number.data_type,
    ))
}

fn open_conditional(
    executor: &mut SemanticExecutor,
    reduction: &Reduction<'_>,
    _symbols: &mut SymbolTable,
) -> Result<Token, SemanticError> {
    let condition = reduction.token(2)?;
    executor
        .code
        .open_block(&format!("if ({})", condition.lexeme));
    Ok(reduction.empty())
}

fn close_conditional(
    executor: &mut SemanticExecutor,
    reduction: &Reduction<'_>,
    _symbols: &mut SymbolTable,
) -> Result<Token, SemanticError> {
    executor.code.close_block();
    Ok(reduction.empty())
}

fn open_loop(
    executor: &mut SemanticExecutor,
    reduction: &Reduction<'_>,
    _symbols: &mut SymbolTable,
) -> Result<Token, SemanticError> {
    let condition = reduction.token(2)?;
    executor
        .code
        .open_block(&format!("while ({})", condition.lexeme));

    let recompute = executor.last_relational.take().unwrap_or_default();
    executor.loop_recompute.push(recompute);
    Ok(reduction.empty())
}

fn close_loop(
    executor: &mut SemanticExecutor,
    reduction: &Reduction<'_>,
    _symbols: &mut SymbolTable,
) -> Result<Token, SemanticError> {
    if let Some(recompute) = executor.loop_recompute.pop() {
        if !recompute.is_empty() {
            executor.code.emit_line(&recompute);
        }
    }
    executor.code.close_block();
    Ok(reduction.empty())
}
