//! AST of the resolver script language.

use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub struct ProgramData {
    pub body: Vec<StatementType>,
}

impl ProgramData {
    /// A body made of a single expression statement yields that expression.
    pub fn as_single_expression(&self) -> Option<&ExpressionType> {
        match self.body.as_slice() {
            [StatementType::ExpressionStatement(expression)] => Some(expression),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StatementType {
    ExpressionStatement(ExpressionType),
    VariableDeclaration(VariableDeclarationData),
    FunctionDeclaration(Rc<FunctionData>),
    ImportStatement {
        target: String,
    },
    IfStatement {
        test: ExpressionType,
        consequent: Vec<StatementType>,
        alternate: Option<Vec<StatementType>>,
    },
    WhileStatement {
        test: ExpressionType,
        body: Vec<StatementType>,
    },
    ForStatement {
        init: Option<ForInit>,
        test: Option<ExpressionType>,
        update: Option<ExpressionType>,
        body: Vec<StatementType>,
    },
    ForOfStatement {
        target: BindingTarget,
        iterable: ExpressionType,
        body: Vec<StatementType>,
    },
    ReturnStatement(Option<ExpressionType>),
    YieldStatement(Option<ExpressionType>),
    BreakStatement,
    ContinueStatement,
    ThrowStatement(ExpressionType),
    TryStatement {
        block: Vec<StatementType>,
        handler: Option<CatchClauseData>,
        finalizer: Option<Vec<StatementType>>,
    },
    EmptyStatement,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    VariableDeclaration(VariableDeclarationData),
    Expression(ExpressionType),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VariableDeclarationKind {
    Var,
    Let,
    Const,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclarationData {
    pub kind: VariableDeclarationKind,
    pub declarations: Vec<VariableDeclaratorData>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaratorData {
    pub id: BindingTarget,
    pub init: Option<ExpressionType>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BindingTarget {
    Identifier(String),
    ArrayPattern(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionData {
    pub name: Option<String>,
    pub params: Vec<ParameterData>,
    pub body: Vec<StatementType>,
    /// Declared with `function*` or containing a `yield` in its own body.
    pub is_generator: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterData {
    pub name: String,
    pub default: Option<ExpressionType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatchClauseData {
    pub param: Option<String>,
    pub body: Vec<StatementType>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionType {
    Literal(LiteralType),
    Identifier(String),
    ArrayExpression(Vec<ExpressionType>),
    ObjectExpression(Vec<(PropertyKey, ExpressionType)>),
    ListComprehension {
        element: Box<ExpressionType>,
        clauses: Vec<ComprehensionClause>,
    },
    MapComprehension {
        key: Box<ExpressionType>,
        value: Box<ExpressionType>,
        clauses: Vec<ComprehensionClause>,
    },
    FunctionExpression(Rc<FunctionData>),
    UnaryExpression {
        operator: UnaryOperator,
        argument: Box<ExpressionType>,
    },
    BinaryExpression {
        operator: BinaryOperator,
        left: Box<ExpressionType>,
        right: Box<ExpressionType>,
    },
    LogicalExpression {
        operator: LogicalOperator,
        left: Box<ExpressionType>,
        right: Box<ExpressionType>,
    },
    ConditionalExpression {
        test: Box<ExpressionType>,
        consequent: Box<ExpressionType>,
        alternate: Box<ExpressionType>,
    },
    AssignmentExpression {
        operator: AssignmentOperator,
        target: AssignmentTarget,
        value: Box<ExpressionType>,
    },
    UpdateExpression {
        operator: UpdateOperator,
        target: AssignmentTarget,
    },
    MemberExpression {
        object: Box<ExpressionType>,
        property: String,
    },
    IndexExpression {
        object: Box<ExpressionType>,
        index: Box<ExpressionType>,
    },
    CallExpression {
        callee: Box<ExpressionType>,
        arguments: Vec<ExpressionType>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKey {
    Name(String),
    Computed(ExpressionType),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ComprehensionClause {
    For {
        target: BindingTarget,
        iterable: ExpressionType,
    },
    If(ExpressionType),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AssignmentTarget {
    Identifier(String),
    Member {
        object: Box<ExpressionType>,
        property: String,
    },
    Index {
        object: Box<ExpressionType>,
        index: Box<ExpressionType>,
    },
    ArrayPattern(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralType {
    NullLiteral,
    BooleanLiteral(bool),
    IntegerLiteral(i64),
    FloatLiteral(f64),
    StringLiteral(String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnaryOperator {
    Minus,
    LogicalNot,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Power,
    Equal,
    NotEqual,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    In,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogicalOperator {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AssignmentOperator {
    Assign,
    AddAssign,
    SubtractAssign,
    MultiplyAssign,
    DivideAssign,
    RemainderAssign,
}

impl AssignmentOperator {
    /// The binary operator a compound assignment applies, if any.
    pub fn binary_operator(&self) -> Option<BinaryOperator> {
        match self {
            AssignmentOperator::Assign => None,
            AssignmentOperator::AddAssign => Some(BinaryOperator::Add),
            AssignmentOperator::SubtractAssign => Some(BinaryOperator::Subtract),
            AssignmentOperator::MultiplyAssign => Some(BinaryOperator::Multiply),
            AssignmentOperator::DivideAssign => Some(BinaryOperator::Divide),
            AssignmentOperator::RemainderAssign => Some(BinaryOperator::Remainder),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpdateOperator {
    Increment,
    Decrement,
}
