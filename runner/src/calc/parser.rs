use super::CalcError;
use super::lexer::{Spanned, Token};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOperator {
    Negation,
    LogicalNot,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOperator {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Modulo,
    LogicalAnd,
    LogicalOr,
    Equality,
    Inequality,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Str(String),
    Boolean(bool),
    Unit,
    Variable(String),
    Unary {
        operator: UnaryOperator,
        operand: Box<Expr>,
    },
    Binary {
        operator: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Conditional {
        condition: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementKind {
    Let(String, Expr),
    Assign(String, Expr),
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    pub line: usize,
}

// Binding powers (precedence). Higher = tighter binding.
const BP_CONDITIONAL: u8 = 2;
const BP_OR: u8 = 4;
const BP_AND: u8 = 6;
const BP_EQUALITY: u8 = 8;
const BP_COMPARISON: u8 = 10;
const BP_ADDITIVE: u8 = 12;
const BP_MULTIPLICATIVE: u8 = 14;
const BP_UNARY: u8 = 16;

/// Deepest expression the parser accepts. Evaluation recurses over the same
/// tree, so this also bounds the evaluator's stack use.
const MAX_DEPTH: usize = 256;

/// Parse a whole calc program.
pub fn parse(tokens: Vec<Spanned>) -> Result<Vec<Statement>, CalcError> {
    let mut parser = StatementParser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let mut statements = Vec::new();

    loop {
        parser.skip_separators();
        if parser.at_end() {
            break;
        }
        statements.push(parser.parse_statement()?);
        match parser.peek() {
            None | Some(Token::Separator) => {}
            Some(token) => {
                let message = format!("unexpected {} after statement", describe(token));
                return Err(parser.error(message));
            }
        }
    }

    Ok(statements)
}

struct StatementParser {
    tokens: Vec<Spanned>,
    pos: usize,
    /// Nesting of the expression being parsed, counting both recursion and
    /// left-leaning operator chains.
    depth: usize,
}

impl StatementParser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset).map(|t| &t.token)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).map(|t| t.token.clone());
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Line of the current token, or of the last one at end of input.
    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|t| t.line)
            .unwrap_or(1)
    }

    fn error(&self, message: impl Into<String>) -> CalcError {
        CalcError::syntax(self.line(), message)
    }

    fn skip_separators(&mut self) {
        while self.peek() == Some(&Token::Separator) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), CalcError> {
        match self.peek() {
            Some(token) if *token == expected => {
                self.pos += 1;
                Ok(())
            }
            Some(token) => {
                let message = format!("expected {}, found {}", describe(&expected), describe(token));
                Err(self.error(message))
            }
            None => Err(self.error(format!("expected {}", describe(&expected)))),
        }
    }

    fn expect_ident(&mut self) -> Result<String, CalcError> {
        match self.advance() {
            Some(Token::Ident(name)) => Ok(name),
            _ => Err(self.error("expected identifier")),
        }
    }

    fn parse_statement(&mut self) -> Result<Statement, CalcError> {
        let line = self.line();

        let kind = if self.peek() == Some(&Token::Let) {
            self.advance();
            let name = self.expect_ident()?;
            self.expect(Token::Eq)?;
            StatementKind::Let(name, self.parse_expr(0)?)
        } else if let (Some(Token::Ident(name)), Some(Token::Eq)) = (self.peek(), self.peek_at(1)) {
            let name = name.clone();
            self.pos += 2;
            StatementKind::Assign(name, self.parse_expr(0)?)
        } else {
            StatementKind::Expr(self.parse_expr(0)?)
        };

        Ok(Statement { kind, line })
    }

    // ------------------------------------------------------------------
    // Pratt parser core
    // ------------------------------------------------------------------

    fn descend(&mut self) -> Result<(), CalcError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(self.error("expression nested too deeply"));
        }
        Ok(())
    }

    fn parse_expr(&mut self, min_bp: u8) -> Result<Expr, CalcError> {
        let entry = self.depth;
        let result = self.parse_operators(min_bp);
        self.depth = entry;
        result
    }

    fn parse_operators(&mut self, min_bp: u8) -> Result<Expr, CalcError> {
        self.descend()?;
        let mut left = self.parse_prefix()?;

        loop {
            let Some(token) = self.peek() else { break };
            let Some((l_bp, r_bp)) = infix_bp(token) else { break };

            if l_bp < min_bp {
                break;
            }
            let is_question = *token == Token::Question;
            // Each operator wraps `left` one level deeper.
            self.descend()?;

            if is_question {
                self.advance();
                let then = self.parse_expr(0)?;
                self.expect(Token::Colon)?;
                let otherwise = self.parse_expr(r_bp)?;
                left = Expr::Conditional {
                    condition: Box::new(left),
                    then: Box::new(then),
                    otherwise: Box::new(otherwise),
                };
                continue;
            }

            let operator = match self.advance() {
                Some(Token::Plus) => BinaryOperator::Addition,
                Some(Token::Minus) => BinaryOperator::Subtraction,
                Some(Token::Star) => BinaryOperator::Multiplication,
                Some(Token::Slash) => BinaryOperator::Division,
                Some(Token::Percent) => BinaryOperator::Modulo,
                Some(Token::EqEq) => BinaryOperator::Equality,
                Some(Token::BangEq) => BinaryOperator::Inequality,
                Some(Token::Gt) => BinaryOperator::GreaterThan,
                Some(Token::Lt) => BinaryOperator::LessThan,
                Some(Token::GtEq) => BinaryOperator::GreaterThanOrEqual,
                Some(Token::LtEq) => BinaryOperator::LessThanOrEqual,
                Some(Token::AmpAmp) => BinaryOperator::LogicalAnd,
                Some(Token::PipePipe) => BinaryOperator::LogicalOr,
                _ => return Err(self.error("unexpected infix operator")),
            };
            let right = self.parse_expr(r_bp)?;

            left = Expr::Binary {
                operator,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_prefix(&mut self) -> Result<Expr, CalcError> {
        let token = self
            .advance()
            .ok_or_else(|| self.error("unexpected end of input"))?;

        match token {
            Token::Number(n) => Ok(Expr::Number(n)),
            Token::Str(s) => Ok(Expr::Str(s)),
            Token::True => Ok(Expr::Boolean(true)),
            Token::False => Ok(Expr::Boolean(false)),
            Token::Unit => Ok(Expr::Unit),

            Token::Ident(name) => match self.peek() {
                Some(Token::Unit) => {
                    self.advance();
                    Ok(Expr::Call { name, args: Vec::new() })
                }
                Some(Token::LParen) => {
                    self.advance();
                    let args = self.parse_arguments()?;
                    Ok(Expr::Call { name, args })
                }
                _ => Ok(Expr::Variable(name)),
            },

            Token::Bang => Ok(Expr::Unary {
                operator: UnaryOperator::LogicalNot,
                operand: Box::new(self.parse_expr(BP_UNARY)?),
            }),
            Token::Minus => Ok(Expr::Unary {
                operator: UnaryOperator::Negation,
                operand: Box::new(self.parse_expr(BP_UNARY)?),
            }),

            Token::LParen => {
                let expr = self.parse_expr(0)?;
                self.expect(Token::RParen)?;
                Ok(expr)
            }

            // The token was consumed; report against its own line.
            other => {
                self.pos -= 1;
                Err(self.error(format!("unexpected {}", describe(&other))))
            }
        }
    }

    /// Comma-separated call arguments; the opening parenthesis is consumed.
    fn parse_arguments(&mut self) -> Result<Vec<Expr>, CalcError> {
        let mut args = vec![self.parse_expr(0)?];
        while self.peek() == Some(&Token::Comma) {
            self.advance();
            args.push(self.parse_expr(0)?);
        }
        self.expect(Token::RParen)?;
        Ok(args)
    }
}

/// Infix binding powers: returns (left_bp, right_bp) or None if not infix.
fn infix_bp(token: &Token) -> Option<(u8, u8)> {
    match token {
        Token::Question => Some((BP_CONDITIONAL, BP_CONDITIONAL)),
        Token::PipePipe => Some((BP_OR, BP_OR + 1)),
        Token::AmpAmp => Some((BP_AND, BP_AND + 1)),
        Token::EqEq | Token::BangEq => Some((BP_EQUALITY, BP_EQUALITY + 1)),
        Token::Gt | Token::Lt | Token::GtEq | Token::LtEq => {
            Some((BP_COMPARISON, BP_COMPARISON + 1))
        }
        Token::Plus | Token::Minus => Some((BP_ADDITIVE, BP_ADDITIVE + 1)),
        Token::Star | Token::Slash | Token::Percent => {
            Some((BP_MULTIPLICATIVE, BP_MULTIPLICATIVE + 1))
        }
        _ => None,
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Number(n) => format!("number `{n}`"),
        Token::Str(_) => "string".to_string(),
        Token::Ident(name) => format!("`{name}`"),
        Token::Separator => "end of statement".to_string(),
        Token::True => "`true`".to_string(),
        Token::False => "`false`".to_string(),
        Token::Unit => "`()`".to_string(),
        Token::Let => "`let`".to_string(),
        Token::Plus => "`+`".to_string(),
        Token::Minus => "`-`".to_string(),
        Token::Star => "`*`".to_string(),
        Token::Slash => "`/`".to_string(),
        Token::Percent => "`%`".to_string(),
        Token::Eq => "`=`".to_string(),
        Token::EqEq => "`==`".to_string(),
        Token::BangEq => "`!=`".to_string(),
        Token::Gt => "`>`".to_string(),
        Token::Lt => "`<`".to_string(),
        Token::GtEq => "`>=`".to_string(),
        Token::LtEq => "`<=`".to_string(),
        Token::AmpAmp => "`&&`".to_string(),
        Token::PipePipe => "`||`".to_string(),
        Token::Bang => "`!`".to_string(),
        Token::Question => "`?`".to_string(),
        Token::Colon => "`:`".to_string(),
        Token::Comma => "`,`".to_string(),
        Token::LParen => "`(`".to_string(),
        Token::RParen => "`)`".to_string(),
    }
}
