//! Calculator session state
//!
//! Keypad state (entry display, the expression being built, the memory
//! register) is an explicit value owned by one UI session. Every key press is
//! a pure transition `(SessionState, CalculatorAction) -> SessionState`; no
//! evaluation state survives between transitions except what the returned
//! value carries.
//!
//! Two flags drive entry handling:
//! - `fresh_entry`: the next digit replaces the display instead of extending it
//! - `operand_pending`: the display holds an operand not yet committed to
//!   `expression`

use crate::config::constants::compile_time::session::{MAX_DISPLAY_LENGTH, MAX_HISTORY_ENTRIES};
use crate::evaluator::format_result;
use crate::logging::codes;
use crate::scientific::ScientificFunction;
use crate::{log_debug, log_warning};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOperator {
    pub fn symbol(&self) -> char {
        match self {
            Self::Add => '+',
            Self::Subtract => '-',
            Self::Multiply => '*',
            Self::Divide => '/',
        }
    }

    /// Keypad symbol, including the `×` and `÷` aliases
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match crate::tokens::classify_symbol(symbol)? {
            crate::tokens::Token::Plus => Some(Self::Add),
            crate::tokens::Token::Minus => Some(Self::Subtract),
            crate::tokens::Token::Star => Some(Self::Multiply),
            crate::tokens::Token::Slash => Some(Self::Divide),
            _ => None,
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// One key press
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CalculatorAction {
    Digit(u8),
    Decimal,
    Operator(BinaryOperator),
    LeftParen,
    RightParen,
    Equals,
    /// C: reset entry and expression, keep memory and history
    Clear,
    /// CE: reset only the current entry
    ClearEntry,
    Backspace,
    MemoryClear,
    MemoryRecall,
    MemoryAdd,
    MemorySubtract,
    MemoryStore,
    /// Apply a scientific function to the displayed value
    ApplyFunction(ScientificFunction),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub expression: String,
    pub result: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub display: String,
    pub expression: String,
    pub memory: f64,
    pub last_result: Option<f64>,
    pub error: Option<String>,
    pub fresh_entry: bool,
    pub operand_pending: bool,
    pub history: VecDeque<HistoryEntry>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            display: "0".to_string(),
            expression: String::new(),
            memory: 0.0,
            last_result: None,
            error: None,
            fresh_entry: true,
            operand_pending: true,
            history: VecDeque::new(),
        }
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(self, action: CalculatorAction) -> Self {
        apply(self, action)
    }

    /// Numeric value of the display (0 when it does not parse)
    pub fn display_value(&self) -> f64 {
        self.display.parse().unwrap_or(0.0)
    }

    /// Expression that `Equals` would evaluate right now
    pub fn pending_expression(&self) -> String {
        if self.operand_pending {
            format!("{}{}", self.expression, self.display)
        } else {
            self.expression.trim_end().to_string()
        }
    }

    fn last_symbol(&self) -> Option<char> {
        self.expression.trim_end().chars().last()
    }

    fn open_parens(&self) -> usize {
        let opens = self.expression.matches('(').count();
        let closes = self.expression.matches(')').count();
        opens.saturating_sub(closes)
    }

    fn commit_display(&mut self) {
        self.expression.push_str(&self.display);
        self.operand_pending = false;
    }

    fn push_history(&mut self, expression: String, result: String) {
        if self.history.len() >= MAX_HISTORY_ENTRIES {
            self.history.pop_front();
        }
        self.history.push_back(HistoryEntry { expression, result });
    }

    fn show_result(&mut self, expression: String, value: f64) {
        let rendered = format_result(value);
        self.push_history(expression, rendered.clone());
        self.display = rendered;
        self.expression.clear();
        self.last_result = Some(value);
        self.error = None;
        self.fresh_entry = true;
        self.operand_pending = true;
    }

    fn show_error(&mut self, message: String) {
        self.error = Some(message);
        self.display = "0".to_string();
        self.expression.clear();
        self.fresh_entry = true;
        self.operand_pending = true;
    }
}

fn is_operator_symbol(ch: char) -> bool {
    matches!(ch, '+' | '-' | '*' | '/')
}

/// Pure transition function
pub fn apply(mut state: SessionState, action: CalculatorAction) -> SessionState {
    log_debug!("Session action", "action" => format!("{:?}", action));

    // Any key other than a memory key acknowledges a shown error
    let memory_key = matches!(
        action,
        CalculatorAction::MemoryClear
            | CalculatorAction::MemoryAdd
            | CalculatorAction::MemorySubtract
            | CalculatorAction::MemoryStore
    );
    if !memory_key {
        state.error = None;
    }

    match action {
        CalculatorAction::Digit(digit) if digit <= 9 => {
            let ch = char::from(b'0' + digit);
            if state.fresh_entry || state.display == "0" {
                state.display = ch.to_string();
            } else if !push_display(&mut state, ch) {
                return state;
            }
            state.fresh_entry = false;
            state.operand_pending = true;
        }
        CalculatorAction::Digit(_) => {}

        CalculatorAction::Decimal => {
            if state.fresh_entry {
                state.display = "0.".to_string();
            } else if !state.display.contains('.') && !push_display(&mut state, '.') {
                return state;
            }
            state.fresh_entry = false;
            state.operand_pending = true;
        }

        CalculatorAction::Operator(operator) => {
            if state.operand_pending {
                state.commit_display();
                state.expression.push_str(&format!(" {} ", operator));
            } else {
                match state.last_symbol() {
                    Some(')') => state.expression.push_str(&format!(" {} ", operator)),
                    Some(last) if is_operator_symbol(last) => {
                        // Replace the pending operator
                        let trimmed = state.expression.trim_end();
                        let cut = trimmed.len() - last.len_utf8();
                        state.expression = format!("{} {} ", trimmed[..cut].trim_end(), operator);
                    }
                    // Right after '(' only a sign makes sense
                    Some('(') if operator == BinaryOperator::Subtract => {
                        state.expression.push('-');
                    }
                    _ => return state,
                }
            }
            state.fresh_entry = true;
        }

        CalculatorAction::LeftParen => {
            let typed_number = state.operand_pending && !state.fresh_entry;
            let after_operand = state.last_symbol() == Some(')');
            if typed_number || after_operand {
                // No implicit multiplication
                return state;
            }
            state.expression.push('(');
            state.operand_pending = false;
            state.fresh_entry = true;
        }

        CalculatorAction::RightParen => {
            if state.open_parens() == 0 {
                return state;
            }
            if state.operand_pending {
                state.commit_display();
                state.expression.push(')');
            } else if state.last_symbol() == Some(')') {
                state.expression.push(')');
            } else {
                return state;
            }
            state.fresh_entry = true;
        }

        CalculatorAction::Equals => {
            let expression = state.pending_expression();
            if expression.trim().is_empty() {
                return state;
            }
            match crate::pipeline::evaluate_expression(&expression) {
                Ok(value) => state.show_result(expression, value),
                Err(error) => state.show_error(error.user_message()),
            }
        }

        CalculatorAction::Clear => {
            state = SessionState {
                memory: state.memory,
                history: state.history,
                ..SessionState::default()
            };
        }

        CalculatorAction::ClearEntry => {
            state.display = "0".to_string();
            state.fresh_entry = true;
            state.operand_pending = true;
        }

        CalculatorAction::Backspace => {
            if state.fresh_entry {
                return state;
            }
            state.display.pop();
            if state.display.is_empty() || state.display == "-" {
                state.display = "0".to_string();
                state.fresh_entry = true;
            }
        }

        CalculatorAction::MemoryClear => state.memory = 0.0,
        CalculatorAction::MemoryStore => {
            state.memory = state.display_value();
            state.fresh_entry = true;
        }
        CalculatorAction::MemoryAdd => {
            state.memory += state.display_value();
            state.fresh_entry = true;
        }
        CalculatorAction::MemorySubtract => {
            state.memory -= state.display_value();
            state.fresh_entry = true;
        }
        CalculatorAction::MemoryRecall => {
            state.display = format_result(state.memory);
            state.fresh_entry = true;
            state.operand_pending = true;
        }

        CalculatorAction::ApplyFunction(function) => {
            let value = state.display_value();
            let label = format!("{}({})", function, state.display);
            match crate::scientific::dispatch(function.as_str(), value) {
                Ok(result) => {
                    // The function result replaces the operand, not the expression
                    let rendered = format_result(result);
                    state.push_history(label, rendered.clone());
                    state.display = rendered;
                    state.last_result = Some(result);
                    state.fresh_entry = true;
                    state.operand_pending = true;
                }
                Err(error) => {
                    let message = crate::pipeline::PipelineError::from(error).user_message();
                    state.show_error(message);
                }
            }
        }
    }

    state
}

/// Append to the display; false when the display is full
fn push_display(state: &mut SessionState, ch: char) -> bool {
    if state.display.chars().count() >= MAX_DISPLAY_LENGTH {
        log_warning!(code = codes::session::DISPLAY_OVERFLOW, "Display is full, input ignored",
            "max" => MAX_DISPLAY_LENGTH
        );
        return false;
    }
    state.display.push(ch);
    true
}

/// Apply a sequence of actions from the initial state
pub fn run<I>(actions: I) -> SessionState
where
    I: IntoIterator<Item = CalculatorAction>,
{
    actions.into_iter().fold(SessionState::default(), apply)
}

/// Parse keypad text such as `"12+3="` into actions. `c` is Clear, `e` is
/// ClearEntry, `<` is Backspace; other characters map to their keys.
pub fn parse_keys(keys: &str) -> Result<Vec<CalculatorAction>, char> {
    keys.chars()
        .filter(|ch| !ch.is_whitespace())
        .map(|ch| match ch {
            '0'..='9' => Ok(CalculatorAction::Digit(ch as u8 - b'0')),
            '.' => Ok(CalculatorAction::Decimal),
            '(' => Ok(CalculatorAction::LeftParen),
            ')' => Ok(CalculatorAction::RightParen),
            '=' => Ok(CalculatorAction::Equals),
            'c' | 'C' => Ok(CalculatorAction::Clear),
            'e' | 'E' => Ok(CalculatorAction::ClearEntry),
            '<' => Ok(CalculatorAction::Backspace),
            other => BinaryOperator::from_symbol(other)
                .map(CalculatorAction::Operator)
                .ok_or(other),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use CalculatorAction::*;

    fn keys(text: &str) -> SessionState {
        run(parse_keys(text).unwrap())
    }

    #[test]
    fn test_initial_state() {
        let state = SessionState::new();
        assert_eq!(state.display, "0");
        assert!(state.expression.is_empty());
        assert_eq!(state.memory, 0.0);
    }

    #[test]
    fn test_digit_entry() {
        let state = keys("007.50");
        assert_eq!(state.display, "7.50");
        assert_eq!(keys(".5").display, "0.5");
        assert_eq!(keys("1..2").display, "1.2");
    }

    #[test]
    fn test_precedence_through_keypad() {
        let state = keys("2+3*4=");
        assert_eq!(state.display, "14");
        assert_eq!(state.last_result, Some(14.0));
        assert_eq!(state.history.back().unwrap().expression, "2 + 3 * 4");
    }

    #[test]
    fn test_operator_replacement() {
        let state = keys("9+*3=");
        assert_eq!(state.display, "27");
    }

    #[test]
    fn test_parentheses() {
        assert_eq!(keys("(2+3)*4=").display, "20");
        assert_eq!(keys("2*(3+4)=").display, "14");
        // No implicit multiplication
        assert_eq!(keys("2(3)=").display, "23");
    }

    #[test]
    fn test_result_feeds_next_expression() {
        let state = keys("6/4=*2=");
        assert_eq!(state.display, "3");
        assert_eq!(state.history.len(), 2);
    }

    #[test]
    fn test_digit_after_result_starts_over() {
        assert_eq!(keys("1+1=5").display, "5");
        assert_eq!(keys("1+1=5").expression, "");
    }

    #[test]
    fn test_division_by_zero_shows_error() {
        let state = keys("5/0=");
        assert_eq!(state.error.as_deref(), Some("Division by zero"));
        assert_eq!(state.display, "0");

        let recovered = state.apply(Digit(7));
        assert!(recovered.error.is_none());
        assert_eq!(recovered.display, "7");
    }

    #[test]
    fn test_incomplete_expression_error() {
        let state = keys("(2+=");
        assert_eq!(state.error.as_deref(), Some("Invalid expression"));
    }

    #[test]
    fn test_clear_keeps_memory() {
        let state = run([Digit(4), MemoryStore, Digit(2), Clear]);
        assert_eq!(state.memory, 4.0);
        assert_eq!(state.display, "0");

        let state = state.apply(MemoryRecall);
        assert_eq!(state.display, "4");
    }

    #[test]
    fn test_memory_arithmetic() {
        let state = run([
            Digit(5),
            MemoryAdd,
            Digit(2),
            MemoryAdd,
            Digit(1),
            MemorySubtract,
        ]);
        assert_eq!(state.memory, 6.0);
        assert_eq!(state.apply(MemoryClear).memory, 0.0);
    }

    #[test]
    fn test_clear_entry_and_backspace() {
        let state = keys("12+34e5=");
        assert_eq!(state.display, "17");

        let state = keys("123<<");
        assert_eq!(state.display, "1");
        assert_eq!(keys("1<").display, "0");
    }

    #[test]
    fn test_scientific_functions() {
        let state = run([Digit(1), Digit(6), ApplyFunction(ScientificFunction::Sqrt)]);
        assert_eq!(state.display, "4");
        assert_eq!(state.history.back().unwrap().expression, "sqrt(16)");

        let state = run([Digit(9), ApplyFunction(ScientificFunction::Negate)]);
        assert_eq!(state.display, "-9");

        let state = run([
            Digit(2),
            Operator(BinaryOperator::Add),
            Digit(9),
            ApplyFunction(ScientificFunction::Sqrt),
            Equals,
        ]);
        assert_eq!(state.display, "5");

        let state = run([
            Digit(1),
            ApplyFunction(ScientificFunction::Negate),
            ApplyFunction(ScientificFunction::Sqrt),
        ]);
        assert_eq!(
            state.error.as_deref(),
            Some("Square root of negative number")
        );
    }

    #[test]
    fn test_history_is_bounded() {
        let mut state = SessionState::new();
        for _ in 0..(MAX_HISTORY_ENTRIES + 5) {
            state = run_from(state, "1+1=");
        }
        assert_eq!(state.history.len(), MAX_HISTORY_ENTRIES);
    }

    fn run_from(state: SessionState, text: &str) -> SessionState {
        parse_keys(text).unwrap().into_iter().fold(state, apply)
    }

    #[test]
    fn test_unicode_operator_keys() {
        assert_eq!(keys("6\u{00D7}7=").display, "42");
        assert_eq!(keys("9\u{00F7}2=").display, "4.5");
        assert_eq!(parse_keys("2%"), Err('%'));
    }

    #[test]
    fn test_state_serializes() {
        let state = keys("1+2=");
        let json = serde_json::to_string(&state).unwrap();
        let back: SessionState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
