//! Abstract Syntax Tree (AST) definitions for koa contracts.
//!
//! Every node implements `Display` with a canonical rendering. Tests compare
//! trees through that rendering, so it must stay stable: infix and prefix
//! expressions are always fully parenthesized.

use std::fmt;

/// The type tag attached to parameters, return values and assignments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataStructure {
    /// No value (functions without a return type)
    #[default]
    Void,
    /// 32-bit signed integer
    Int,
    /// UTF-8 string
    String,
    /// Boolean
    Bool,
}

impl fmt::Display for DataStructure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DataStructure::Void => "void",
            DataStructure::Int => "int",
            DataStructure::String => "string",
            DataStructure::Bool => "bool",
        })
    }
}

/// A whole contract: the root of the tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Contract {
    /// The functions, in declaration order
    pub functions: Vec<FunctionLiteral>,
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("contract {")?;
        for function in &self.functions {
            write!(f, " {}", function)?;
        }
        f.write_str(" }")
    }
}

/// A function definition.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionLiteral {
    /// The function name
    pub name: Identifier,
    /// The parameters
    pub parameters: Vec<ParameterLiteral>,
    /// The declared return type, `Void` when omitted
    pub return_type: DataStructure,
    /// The function body
    pub body: BlockStatement,
}

impl fmt::Display for FunctionLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "func {}(", self.name)?;
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", param)?;
        }
        f.write_str(")")?;
        if self.return_type != DataStructure::Void {
            write!(f, " {}", self.return_type)?;
        }
        write!(f, " {}", self.body)
    }
}

/// A typed function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterLiteral {
    /// The parameter name
    pub identifier: Identifier,
    /// The parameter type
    pub ty: DataStructure,
}

impl fmt::Display for ParameterLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.identifier, self.ty)
    }
}

/// A braced list of statements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockStatement {
    /// The statements in the block
    pub statements: Vec<Statement>,
}

impl fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.statements.is_empty() {
            return f.write_str("{}");
        }
        f.write_str("{ ")?;
        for (i, stmt) in self.statements.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", stmt)?;
        }
        f.write_str(" }")
    }
}

/// A koa statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `return <expr>?`
    Return(ReturnStatement),
    /// `<type> <ident> = <expr>`
    Assign(AssignStatement),
    /// `if (<expr>) { ... } else { ... }`
    If(IfStatement),
    /// A bare expression
    Expression(ExpressionStatement),
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Return(stmt) => match &stmt.return_value {
                Some(value) => write!(f, "return {}", value),
                None => f.write_str("return"),
            },
            Statement::Assign(stmt) => {
                write!(f, "{} {} = {}", stmt.ty, stmt.variable, stmt.value)
            }
            Statement::If(stmt) => {
                write!(f, "if ({}) {}", stmt.condition, stmt.consequence)?;
                if let Some(alternative) = &stmt.alternative {
                    write!(f, " else {}", alternative)?;
                }
                Ok(())
            }
            Statement::Expression(stmt) => write!(f, "{}", stmt.expr),
        }
    }
}

/// A return statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    /// The returned value, if any
    pub return_value: Option<Expression>,
}

/// A typed variable declaration with its initial value.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignStatement {
    /// The declared type
    pub ty: DataStructure,
    /// The variable being declared
    pub variable: Identifier,
    /// The assigned value
    pub value: Expression,
}

/// A conditional.
#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    /// The condition
    pub condition: Expression,
    /// The then branch
    pub consequence: BlockStatement,
    /// The optional else branch
    pub alternative: Option<BlockStatement>,
}

/// An expression used as a statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    /// The expression
    pub expr: Expression,
}

/// A koa expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Variable or parameter reference
    Identifier(Identifier),
    /// Integer literal
    IntegerLiteral(IntegerLiteral),
    /// String literal
    StringLiteral(StringLiteral),
    /// `true` / `false`
    BooleanLiteral(BooleanLiteral),
    /// Binary operation
    Infix(InfixExpression),
    /// Unary operation
    Prefix(PrefixExpression),
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(ident) => write!(f, "{}", ident),
            Expression::IntegerLiteral(lit) => write!(f, "{}", lit.value),
            Expression::StringLiteral(lit) => write!(f, "\"{}\"", lit.value),
            Expression::BooleanLiteral(lit) => write!(f, "{}", lit.value),
            Expression::Infix(infix) => {
                write!(f, "({} {} {})", infix.left, infix.operator, infix.right)
            }
            Expression::Prefix(prefix) => write!(f, "({}{})", prefix.operator, prefix.right),
        }
    }
}

/// An identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    /// The name of the identifier
    pub value: String,
}

impl Identifier {
    /// Creates an identifier.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// An integer literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntegerLiteral {
    /// The value
    pub value: i64,
}

/// A string literal with escapes resolved and quotes removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringLiteral {
    /// The value
    pub value: String,
}

/// A boolean literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BooleanLiteral {
    /// The value
    pub value: bool,
}

/// A binary operation.
#[derive(Debug, Clone, PartialEq)]
pub struct InfixExpression {
    /// Left operand
    pub left: Box<Expression>,
    /// The operator
    pub operator: Operator,
    /// Right operand
    pub right: Box<Expression>,
}

/// A unary operation.
#[derive(Debug, Clone, PartialEq)]
pub struct PrefixExpression {
    /// The operator, `Minus` or `Bang`
    pub operator: Operator,
    /// The operand
    pub right: Box<Expression>,
}

/// Operators usable in infix and prefix position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// +
    Plus,
    /// -
    Minus,
    /// *
    Asterisk,
    /// /
    Slash,
    /// %
    Mod,
    /// !
    Bang,
    /// <
    Lt,
    /// >
    Gt,
    /// <=
    LtEq,
    /// >=
    GtEq,
    /// ==
    Eq,
    /// !=
    NotEq,
    /// &&
    Land,
    /// ||
    Lor,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operator::Plus => "+",
            Operator::Minus => "-",
            Operator::Asterisk => "*",
            Operator::Slash => "/",
            Operator::Mod => "%",
            Operator::Bang => "!",
            Operator::Lt => "<",
            Operator::Gt => ">",
            Operator::LtEq => "<=",
            Operator::GtEq => ">=",
            Operator::Eq => "==",
            Operator::NotEq => "!=",
            Operator::Land => "&&",
            Operator::Lor => "||",
        })
    }
}

impl From<Identifier> for Expression {
    fn from(ident: Identifier) -> Self {
        Expression::Identifier(ident)
    }
}

impl From<i64> for Expression {
    fn from(value: i64) -> Self {
        Expression::IntegerLiteral(IntegerLiteral { value })
    }
}

impl From<bool> for Expression {
    fn from(value: bool) -> Self {
        Expression::BooleanLiteral(BooleanLiteral { value })
    }
}

impl From<&str> for Expression {
    fn from(value: &str) -> Self {
        Expression::StringLiteral(StringLiteral {
            value: value.to_string(),
        })
    }
}

impl Expression {
    /// Builds `left <operator> right`.
    pub fn infix(left: impl Into<Expression>, operator: Operator, right: impl Into<Expression>) -> Self {
        Expression::Infix(InfixExpression {
            left: Box::new(left.into()),
            operator,
            right: Box::new(right.into()),
        })
    }

    /// Builds `<operator>right`.
    pub fn prefix(operator: Operator, right: impl Into<Expression>) -> Self {
        Expression::Prefix(PrefixExpression {
            operator,
            right: Box::new(right.into()),
        })
    }
}
