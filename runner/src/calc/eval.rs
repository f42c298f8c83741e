use std::collections::HashMap;
use std::io::Write;

use super::CalcError;
use super::parser::{BinaryOperator, Expr, Statement, StatementKind, UnaryOperator};
use super::value::Value;

/// Evaluates calc statements, sending `print` output to a writer.
pub struct Evaluator<'a> {
    variables: HashMap<String, Value>,
    output: &'a mut dyn Write,
    line: usize,
}

impl<'a> Evaluator<'a> {
    pub fn new(output: &'a mut dyn Write) -> Self {
        Evaluator {
            variables: HashMap::new(),
            output,
            line: 1,
        }
    }

    pub fn run(&mut self, statements: &[Statement]) -> Result<(), CalcError> {
        for statement in statements {
            self.line = statement.line;
            match &statement.kind {
                StatementKind::Let(name, expr) => {
                    let value = self.evaluate(expr)?;
                    self.variables.insert(name.clone(), value);
                }
                StatementKind::Assign(name, expr) => {
                    if !self.variables.contains_key(name) {
                        return Err(self.error(format!(
                            "assignment to undeclared variable `{name}` (use `let`)"
                        )));
                    }
                    let value = self.evaluate(expr)?;
                    self.variables.insert(name.clone(), value);
                }
                StatementKind::Expr(expr) => {
                    self.evaluate(expr)?;
                }
            }
        }
        Ok(())
    }

    fn error(&self, message: impl Into<String>) -> CalcError {
        CalcError::runtime(self.line, message)
    }

    fn evaluate(&mut self, expr: &Expr) -> Result<Value, CalcError> {
        match expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Str(s) => Ok(Value::String(s.clone())),
            Expr::Boolean(b) => Ok(Value::Boolean(*b)),
            Expr::Unit => Ok(Value::Unit),
            Expr::Variable(name) => self
                .variables
                .get(name)
                .cloned()
                .ok_or_else(|| self.error(format!("undefined variable `{name}`"))),

            Expr::Unary { operator, operand } => {
                let value = self.evaluate(operand)?;
                match operator {
                    UnaryOperator::LogicalNot => Ok(Value::Boolean(!value.is_truthy())),
                    UnaryOperator::Negation => Ok(Value::Number(-self.number(&value)?)),
                }
            }

            // Short-circuit before evaluating the right operand.
            Expr::Binary {
                operator: BinaryOperator::LogicalAnd,
                left,
                right,
            } => {
                let left = self.evaluate(left)?;
                if !left.is_truthy() {
                    return Ok(Value::Boolean(false));
                }
                Ok(Value::Boolean(self.evaluate(right)?.is_truthy()))
            }
            Expr::Binary {
                operator: BinaryOperator::LogicalOr,
                left,
                right,
            } => {
                let left = self.evaluate(left)?;
                if left.is_truthy() {
                    return Ok(Value::Boolean(true));
                }
                Ok(Value::Boolean(self.evaluate(right)?.is_truthy()))
            }
            Expr::Binary {
                operator,
                left,
                right,
            } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                self.binary_op(*operator, &left, &right)
            }

            Expr::Conditional {
                condition,
                then,
                otherwise,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.evaluate(then)
                } else {
                    self.evaluate(otherwise)
                }
            }

            Expr::Call { name, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.evaluate(arg)?);
                }
                self.call(name, values)
            }
        }
    }

    fn call(&mut self, name: &str, args: Vec<Value>) -> Result<Value, CalcError> {
        match name {
            "print" => {
                let line = args
                    .iter()
                    .map(Value::to_string)
                    .collect::<Vec<_>>()
                    .join("\t");
                writeln!(self.output, "{}", line)
                    .map_err(|e| self.error(format!("cannot write output: {e}")))?;
                Ok(Value::Unit)
            }
            "len" => match self.single_arg(name, args)? {
                Value::String(s) => Ok(Value::Number(s.chars().count() as f64)),
                other => Err(self.type_error("string", &other)),
            },
            "str" => Ok(Value::String(self.single_arg(name, args)?.to_string())),
            "num" => match self.single_arg(name, args)? {
                Value::Number(n) => Ok(Value::Number(n)),
                Value::String(s) => s
                    .trim()
                    .parse::<f64>()
                    .map(Value::Number)
                    .map_err(|_| self.error(format!("cannot convert \"{s}\" to a number"))),
                other => Err(self.type_error("number or string", &other)),
            },
            _ => Err(self.error(format!("unknown function `{name}`"))),
        }
    }

    fn single_arg(&self, name: &str, args: Vec<Value>) -> Result<Value, CalcError> {
        let count = args.len();
        let mut args = args.into_iter();
        match (args.next(), args.next()) {
            (Some(value), None) => Ok(value),
            _ => Err(self.error(format!("`{name}` takes 1 argument, got {count}"))),
        }
    }

    fn type_error(&self, expected: &str, got: &Value) -> CalcError {
        self.error(format!("type error: expected {}, got {}", expected, got.type_name()))
    }

    fn number(&self, value: &Value) -> Result<f64, CalcError> {
        match value {
            Value::Number(n) => Ok(*n),
            other => Err(self.type_error("number", other)),
        }
    }

    fn binary_op(
        &self,
        op: BinaryOperator,
        left: &Value,
        right: &Value,
    ) -> Result<Value, CalcError> {
        match op {
            BinaryOperator::Addition => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{}{}", a, b))),
                _ => Err(self.error(format!(
                    "type error: cannot add {} and {}",
                    left.type_name(),
                    right.type_name()
                ))),
            },
            BinaryOperator::Subtraction => Ok(Value::Number(self.number(left)? - self.number(right)?)),
            BinaryOperator::Multiplication => {
                Ok(Value::Number(self.number(left)? * self.number(right)?))
            }
            BinaryOperator::Division | BinaryOperator::Modulo => {
                let a = self.number(left)?;
                let b = self.number(right)?;
                if b == 0.0 {
                    return Err(self.error("division by zero"));
                }
                let result = if op == BinaryOperator::Division { a / b } else { a % b };
                Ok(Value::Number(result))
            }
            BinaryOperator::Equality => Ok(Value::Boolean(left == right)),
            BinaryOperator::Inequality => Ok(Value::Boolean(left != right)),
            BinaryOperator::GreaterThan => self.compare(left, right, |a, b| a > b),
            BinaryOperator::LessThan => self.compare(left, right, |a, b| a < b),
            BinaryOperator::GreaterThanOrEqual => self.compare(left, right, |a, b| a >= b),
            BinaryOperator::LessThanOrEqual => self.compare(left, right, |a, b| a <= b),
            BinaryOperator::LogicalAnd => Ok(Value::Boolean(left.is_truthy() && right.is_truthy())),
            BinaryOperator::LogicalOr => Ok(Value::Boolean(left.is_truthy() || right.is_truthy())),
        }
    }

    fn compare(
        &self,
        left: &Value,
        right: &Value,
        f: impl Fn(f64, f64) -> bool,
    ) -> Result<Value, CalcError> {
        Ok(Value::Boolean(f(self.number(left)?, self.number(right)?)))
    }
}
