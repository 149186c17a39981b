//! Recursive-descent evaluator
//!
//! ```text
//! expression := term (('+' | '-') term)*
//! term       := unary (('*' | '/') unary)*
//! unary      := ('+' | '-') unary | primary
//! primary    := NUMBER | '(' expression ')'
//! ```
//!
//! Values are computed while parsing; no tree is built. The first error
//! aborts the walk.

use crate::config::constants::compile_time::syntax::MAX_PARSE_DEPTH;
use crate::config::runtime::EvaluatorPreferences;
use crate::evaluator::error::{EvalError, EvalResult};
use crate::log_debug;
use crate::tokens::{Token, TokenKind, TokenStream};
use crate::utils::Span;

/// Validate grouping before any evaluation. Reports the stray `)` or the
/// innermost unclosed `(`.
pub fn check_balance(tokens: &TokenStream) -> EvalResult<()> {
    let mut open: Vec<Span> = Vec::new();

    for token in tokens.iter() {
        match token.value {
            Token::LParen => open.push(token.span),
            Token::RParen => {
                if open.pop().is_none() {
                    return Err(EvalError::unbalanced(token.span));
                }
            }
            _ => {}
        }
    }

    match open.pop() {
        Some(span) => Err(EvalError::unbalanced(span)),
        None => Ok(()),
    }
}

pub struct Parser {
    tokens: TokenStream,
    depth: usize,
    max_depth_seen: usize,
    operations: usize,
    preferences: EvaluatorPreferences,
}

impl Parser {
    pub fn new(tokens: TokenStream) -> Self {
        Self::with_preferences(tokens, EvaluatorPreferences::default())
    }

    pub fn with_preferences(tokens: TokenStream, preferences: EvaluatorPreferences) -> Self {
        Self {
            tokens,
            depth: 0,
            max_depth_seen: 0,
            operations: 0,
            preferences,
        }
    }

    /// Evaluate the whole stream. Trailing tokens after a complete
    /// expression are an error.
    pub fn parse(&mut self) -> EvalResult<f64> {
        if self.tokens.is_empty() {
            return Err(EvalError::incomplete(self.tokens.eof_span()));
        }

        let value = self.parse_expression()?;

        if !self.tokens.is_at_end() {
            let current = self.tokens.current();
            return Err(EvalError::unexpected(current.value, current.span));
        }

        Ok(value)
    }

    /// Binary operations reduced so far
    pub fn operations(&self) -> usize {
        self.operations
    }

    pub fn max_depth_seen(&self) -> usize {
        self.max_depth_seen
    }

    fn parse_expression(&mut self) -> EvalResult<f64> {
        let mut value = self.parse_term()?;

        while self.tokens.current_token().is_additive() {
            let operator = self.tokens.advance();
            let rhs = self.parse_term()?;
            value = self.reduce(operator.value, value, rhs, operator.span)?;
        }

        Ok(value)
    }

    fn parse_term(&mut self) -> EvalResult<f64> {
        let mut value = self.parse_unary()?;

        while self.tokens.current_token().is_multiplicative() {
            let operator = self.tokens.advance();
            let rhs = self.parse_unary()?;
            value = self.reduce(operator.value, value, rhs, operator.span)?;
        }

        Ok(value)
    }

    fn parse_unary(&mut self) -> EvalResult<f64> {
        let Some(sign) = self.tokens.consume_if(Token::is_additive) else {
            return self.parse_primary();
        };

        self.enter(sign.span)?;
        let operand = self.parse_unary();
        self.leave();

        match sign.value {
            Token::Minus => operand.map(|v| -v),
            _ => operand,
        }
    }

    fn parse_primary(&mut self) -> EvalResult<f64> {
        let current = self.tokens.current().clone();

        match current.value {
            Token::Number(value) => {
                self.tokens.advance();
                Ok(value)
            }
            Token::LParen => {
                self.tokens.advance();
                if self.tokens.check(TokenKind::RParen) {
                    let close = self.tokens.current_span();
                    return Err(EvalError::incomplete(current.span.merge(close)));
                }

                self.enter(current.span)?;
                let inner = self.parse_expression();
                self.leave();
                let value = inner?;

                self.tokens.expect_token(TokenKind::RParen)?;
                Ok(value)
            }
            // An operand is missing: end of input, `)` right after an
            // operator, or a binary operator with nothing on its left.
            Token::Eof | Token::RParen | Token::Star | Token::Slash => {
                Err(EvalError::incomplete(current.span))
            }
            Token::Plus | Token::Minus => Err(EvalError::unexpected(current.value, current.span)),
        }
    }

    fn reduce(&mut self, operator: Token, lhs: f64, rhs: f64, span: Span) -> EvalResult<f64> {
        let value = match operator {
            Token::Plus => lhs + rhs,
            Token::Minus => lhs - rhs,
            Token::Star => lhs * rhs,
            Token::Slash => {
                if rhs == 0.0 {
                    return Err(EvalError::DivisionByZero { span });
                }
                lhs / rhs
            }
            other => return Err(EvalError::unexpected(other, span)),
        };

        self.operations += 1;

        if self.preferences.trace_operations {
            log_debug!("Reduced binary operation",
                "operator" => operator,
                "lhs" => lhs,
                "rhs" => rhs,
                "value" => value
            );
        }

        if !value.is_finite() {
            return Err(EvalError::NonFiniteResult { value });
        }

        Ok(value)
    }

    fn enter(&mut self, span: Span) -> EvalResult<()> {
        if self.depth >= MAX_PARSE_DEPTH {
            return Err(EvalError::NestingTooDeep {
                depth: self.depth + 1,
                span,
            });
        }
        self.depth += 1;
        self.max_depth_seen = self.max_depth_seen.max(self.depth);
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexical::tokenize;
    use crate::tokens::TokenStreamBuilder;
    use assert_matches::assert_matches;

    fn eval(source: &str) -> EvalResult<f64> {
        let tokens = tokenize(source).unwrap();
        check_balance(&tokens)?;
        Parser::new(tokens).parse()
    }

    #[test]
    fn test_precedence_and_grouping() {
        assert_eq!(eval("2+3*4"), Ok(14.0));
        assert_eq!(eval("(2+3)*4"), Ok(20.0));
        assert_eq!(eval("2*(3+4)*5"), Ok(70.0));
    }

    #[test]
    fn test_left_associativity() {
        assert_eq!(eval("10-2-3"), Ok(5.0));
        assert_eq!(eval("100/10/5"), Ok(2.0));
        assert_eq!(eval("8/4*2"), Ok(4.0));
    }

    #[test]
    fn test_unary_signs() {
        assert_eq!(eval("-5+3"), Ok(-2.0));
        assert_eq!(eval("3*-2"), Ok(-6.0));
        assert_eq!(eval("--2"), Ok(2.0));
        assert_eq!(eval("+4"), Ok(4.0));
        assert_eq!(eval("-(2+3)"), Ok(-5.0));
        assert_eq!(eval("2--3"), Ok(5.0));
    }

    #[test]
    fn test_balance_is_checked_first() {
        assert_matches!(
            eval("(2+3"),
            Err(EvalError::UnbalancedParentheses { span }) if span.start.column == 1
        );
        assert_matches!(
            eval("2+3)"),
            Err(EvalError::UnbalancedParentheses { span }) if span.start.column == 4
        );
        assert_matches!(eval("(2+"), Err(EvalError::UnbalancedParentheses { .. }));
        assert_matches!(eval(")("), Err(EvalError::UnbalancedParentheses { .. }));
    }

    #[test]
    fn test_incomplete_expressions() {
        assert_matches!(eval("2+"), Err(EvalError::IncompleteExpression { .. }));
        assert_matches!(eval(""), Err(EvalError::IncompleteExpression { .. }));
        assert_matches!(eval("   "), Err(EvalError::IncompleteExpression { .. }));
        assert_matches!(eval("()"), Err(EvalError::IncompleteExpression { .. }));
        assert_matches!(eval("(2+)"), Err(EvalError::IncompleteExpression { .. }));
        assert_matches!(eval("*3"), Err(EvalError::IncompleteExpression { .. }));
        assert_matches!(eval("(/2)"), Err(EvalError::IncompleteExpression { .. }));
        assert_matches!(eval("2*/3"), Err(EvalError::IncompleteExpression { .. }));
        assert_matches!(eval("-"), Err(EvalError::IncompleteExpression { .. }));
    }

    #[test]
    fn test_adjacent_operands_are_rejected() {
        assert_matches!(
            eval("2(3)"),
            Err(EvalError::UnexpectedToken { found: Token::LParen, .. })
        );
        assert_matches!(
            eval("(1)(2)"),
            Err(EvalError::UnexpectedToken { found: Token::LParen, .. })
        );
        assert_matches!(
            eval("2 3"),
            Err(EvalError::UnexpectedToken { found: Token::Number(_), .. })
        );
        assert_matches!(
            eval("(2 3)"),
            Err(EvalError::UnexpectedToken { found: Token::Number(_), .. })
        );
    }

    #[test]
    fn test_division_by_zero_names_the_operator() {
        let error = eval("1 + 5/0").unwrap_err();
        assert_matches!(error, EvalError::DivisionByZero { span } if span.slice("1 + 5/0") == "/");

        assert_matches!(eval("4/(2-2)"), Err(EvalError::DivisionByZero { .. }));
        assert_matches!(eval("4/-0"), Err(EvalError::DivisionByZero { .. }));
        assert_eq!(eval("0/4"), Ok(0.0));
    }

    #[test]
    fn test_first_error_wins() {
        // Left division fails before the right operand is ever examined
        let error = eval("1/0 + 2/0").unwrap_err();
        assert_matches!(error, EvalError::DivisionByZero { span } if span.start.column == 2);
    }

    #[test]
    fn test_overflow_is_non_finite() {
        let huge = format!("1{}", "0".repeat(300));
        let source = format!("{0}*{0}", huge);
        assert_matches!(eval(&source), Err(EvalError::NonFiniteResult { .. }));
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!(
            "{}1{}",
            "(".repeat(MAX_PARSE_DEPTH + 1),
            ")".repeat(MAX_PARSE_DEPTH + 1)
        );
        assert_matches!(eval(&deep), Err(EvalError::NestingTooDeep { .. }));

        let signs = format!("{}1", "-".repeat(MAX_PARSE_DEPTH + 1));
        assert_matches!(eval(&signs), Err(EvalError::NestingTooDeep { .. }));

        let ok = format!("{}1{}", "(".repeat(10), ")".repeat(10));
        assert_eq!(eval(&ok), Ok(1.0));
    }

    #[test]
    fn test_built_stream() {
        let tokens = TokenStreamBuilder::new()
            .push_token(Token::Number(6.0), "6")
            .push_token(Token::Slash, "/")
            .push_token(Token::Number(3.0), "3")
            .build();
        let mut parser = Parser::new(tokens);
        assert_eq!(parser.parse(), Ok(2.0));
        assert_eq!(parser.operations(), 1);
        assert_eq!(parser.max_depth_seen(), 0);
    }
}
