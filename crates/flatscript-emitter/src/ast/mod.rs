//! Abstract Syntax Tree (AST) definitions for structured scripts.
//!
//! The front end builds these structures; the emitter only reads them.
//! Every node is plain owned data so a program can be constructed in code
//! or loaded from its JSON interchange form with [`Program::from_json`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EmitError, Result};

/// A complete program: top-level statements followed by text blocks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Program {
    /// The top-level statements, in source order
    #[serde(default)]
    pub top_level_statements: Vec<TopLevelStatement>,
    /// Named string blocks, emitted after every top-level statement
    #[serde(default)]
    pub texts: Vec<Text>,
}

impl Program {
    /// Parses a program from its JSON interchange form.
    pub fn from_json(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Serializes the program to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Iterates over the script statements of the program.
    pub fn scripts(&self) -> impl Iterator<Item = &ScriptStatement> {
        self.top_level_statements.iter().filter_map(|stmt| match stmt {
            TopLevelStatement::Script(script) => Some(script),
            _ => None,
        })
    }
}

/// A statement that may appear at the top level of a program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TopLevelStatement {
    /// `script Name { ... }`
    Script(ScriptStatement),
    /// `raw ` ... ``, emitted verbatim
    Raw(RawStatement),
    /// A construct the front end knows about but this backend cannot lower
    Unsupported {
        /// The leading token of the construct (e.g. `mapscripts`)
        token: String,
    },
}

impl TopLevelStatement {
    /// The leading token of the statement, used in diagnostics.
    pub fn token_literal(&self) -> &str {
        match self {
            TopLevelStatement::Script(_) => "script",
            TopLevelStatement::Raw(_) => "raw",
            TopLevelStatement::Unsupported { token } => token,
        }
    }
}

/// A named script with a structured body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptStatement {
    /// The script's label
    pub name: String,
    /// The body statements
    pub body: Vec<Statement>,
}

/// Opaque assembler text passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawStatement {
    /// The literal text
    pub value: String,
}

/// A named multi-line string literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Text {
    /// The label of the text block
    pub name: String,
    /// The string value; each line becomes one `.string` directive
    pub value: String,
}

/// A statement inside a script body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Statement {
    /// A flat command such as `msgbox` or `setflag`
    Command(Command),
    /// If statement with optional elif and else clauses
    If(IfStatement),
    /// While statement
    While(LoopStatement),
    /// Do-while statement
    DoWhile(LoopStatement),
    /// Break out of the innermost enclosing loop
    Break {
        /// The enclosing loop
        loop_id: LoopId,
    },
    /// Continue with the innermost enclosing loop's next iteration
    Continue {
        /// The enclosing loop
        loop_id: LoopId,
    },
}

/// A flat, non-branching command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// The command name
    pub name: String,
    /// The literal arguments, already in target syntax
    #[serde(default)]
    pub args: Vec<String>,
}

impl Command {
    /// Creates a command with arguments.
    pub fn new(name: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Creates a command without arguments.
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Whether the command ends execution of the current script.
    pub fn is_terminal(&self) -> bool {
        self.name == "end" || self.name == "return"
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} {}", self.name, self.args.join(", "))
        }
    }
}

/// Stable index of a loop statement, assigned by the front end.
///
/// Two loops with identical bodies still get distinct ids, so bindings
/// keyed by `LoopId` behave like identity-keyed bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoopId(pub u32);

impl fmt::Display for LoopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A while or do-while loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopStatement {
    /// The loop's identity
    pub id: LoopId,
    /// The loop condition
    pub condition: BooleanExpression,
    /// The loop body
    pub body: Vec<Statement>,
}

/// An if statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStatement {
    /// The `if` condition and its body
    pub consequence: ConditionalBlock,
    /// The `elif` clauses, in order
    #[serde(default)]
    pub elifs: Vec<ConditionalBlock>,
    /// The `else` body
    #[serde(default)]
    pub alternative: Option<Vec<Statement>>,
}

/// A condition paired with the body it guards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalBlock {
    /// The guard
    pub condition: BooleanExpression,
    /// The guarded statements
    pub body: Vec<Statement>,
}

/// A short-circuit boolean expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BooleanExpression {
    /// An atomic comparison
    Comparison(OperatorExpression),
    /// Two sub-expressions joined by `&&` or `||`
    Binary {
        /// Left operand, evaluated first
        left: Box<BooleanExpression>,
        /// The joining operator
        operator: Operator,
        /// Right operand
        right: Box<BooleanExpression>,
    },
}

impl BooleanExpression {
    /// `left && right`
    pub fn and(left: BooleanExpression, right: BooleanExpression) -> Self {
        Self::binary(left, Operator::And, right)
    }

    /// `left || right`
    pub fn or(left: BooleanExpression, right: BooleanExpression) -> Self {
        Self::binary(left, Operator::Or, right)
    }

    /// A binary node with an arbitrary operator token.
    pub fn binary(left: BooleanExpression, operator: Operator, right: BooleanExpression) -> Self {
        BooleanExpression::Binary {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }
    }

    /// `flag(NAME)`
    pub fn flag(flag: impl Into<String>) -> Self {
        BooleanExpression::Comparison(OperatorExpression::Flag {
            flag: flag.into(),
            set: true,
        })
    }

    /// `!flag(NAME)`
    pub fn flag_unset(flag: impl Into<String>) -> Self {
        BooleanExpression::Comparison(OperatorExpression::Flag {
            flag: flag.into(),
            set: false,
        })
    }

    /// `var(NAME) <operator> value`
    pub fn var(var: impl Into<String>, operator: Operator, value: impl Into<String>) -> Self {
        BooleanExpression::Comparison(OperatorExpression::Var {
            var: var.into(),
            operator,
            value: value.into(),
        })
    }

    /// Number of atomic comparisons in the expression.
    pub fn leaf_count(&self) -> usize {
        match self {
            BooleanExpression::Comparison(_) => 1,
            BooleanExpression::Binary { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }
}

/// Operator tokens produced by the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `&&`
    And,
    /// `||`
    Or,
}

impl Operator {
    /// The suffix of the `goto_if_*` command for a comparison operator.
    pub fn jump_suffix(self) -> Option<&'static str> {
        match self {
            Operator::Equal => Some("eq"),
            Operator::NotEqual => Some("ne"),
            Operator::Less => Some("lt"),
            Operator::LessEqual => Some("le"),
            Operator::Greater => Some("gt"),
            Operator::GreaterEqual => Some("ge"),
            Operator::And | Operator::Or => None,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::Less => "<",
            Operator::LessEqual => "<=",
            Operator::Greater => ">",
            Operator::GreaterEqual => ">=",
            Operator::And => "&&",
            Operator::Or => "||",
        };
        f.write_str(symbol)
    }
}

/// An atomic comparison the target can test with a conditional jump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OperatorExpression {
    /// `flag(NAME)` / `!flag(NAME)`
    Flag {
        /// The flag constant
        flag: String,
        /// Whether the comparison is true when the flag is set
        set: bool,
    },
    /// `var(NAME) <op> value`
    Var {
        /// The variable constant
        var: String,
        /// Comparison operator
        operator: Operator,
        /// The value compared against
        value: String,
    },
}

impl OperatorExpression {
    /// Renders the conditional jump that transfers control to `label`
    /// when the comparison holds, one instruction per line.
    pub fn render_jump(&self, label: &str, out: &mut String) -> Result<()> {
        match self {
            OperatorExpression::Flag { flag, set: true } => {
                out.push_str(&format!("\tgoto_if_set {}, {}\n", flag, label));
            }
            OperatorExpression::Flag { flag, set: false } => {
                out.push_str(&format!("\tgoto_if_unset {}, {}\n", flag, label));
            }
            OperatorExpression::Var { var, operator, value } => {
                let suffix = operator
                    .jump_suffix()
                    .ok_or(EmitError::MalformedCondition { operator: *operator })?;
                out.push_str(&format!("\tcompare {}, {}\n", var, value));
                out.push_str(&format!("\tgoto_if_{} {}\n", suffix, label));
            }
        }
        Ok(())
    }
}

impl fmt::Display for OperatorExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatorExpression::Flag { flag, set: true } => write!(f, "flag({})", flag),
            OperatorExpression::Flag { flag, set: false } => write!(f, "!flag({})", flag),
            OperatorExpression::Var { var, operator, value } => {
                write!(f, "var({}) {} {}", var, operator, value)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_display() {
        assert_eq!(Command::bare("lock").to_string(), "lock");
        assert_eq!(
            Command::new("msgbox", ["Text_Hello", "MSGBOX_DEFAULT"]).to_string(),
            "msgbox Text_Hello, MSGBOX_DEFAULT"
        );
    }

    #[test]
    fn test_terminal_commands() {
        assert!(Command::bare("end").is_terminal());
        assert!(Command::bare("return").is_terminal());
        assert!(!Command::bare("release").is_terminal());
    }

    #[test]
    fn test_flag_jumps() {
        let mut out = String::new();
        OperatorExpression::Flag { flag: "FLAG_1".into(), set: true }
            .render_jump("Script_2", &mut out)
            .unwrap();
        OperatorExpression::Flag { flag: "FLAG_2".into(), set: false }
            .render_jump("Script_3", &mut out)
            .unwrap();
        assert_eq!(
            out,
            "\tgoto_if_set FLAG_1, Script_2\n\tgoto_if_unset FLAG_2, Script_3\n"
        );
    }

    #[test]
    fn test_var_jump() {
        let mut out = String::new();
        let expr = OperatorExpression::Var {
            var: "VAR_1".into(),
            operator: Operator::GreaterEqual,
            value: "5".into(),
        };
        expr.render_jump("Script_1", &mut out).unwrap();
        assert_eq!(out, "\tcompare VAR_1, 5\n\tgoto_if_ge Script_1\n");
    }

    #[test]
    fn test_var_jump_rejects_logical_operator() {
        let mut out = String::new();
        let expr = OperatorExpression::Var {
            var: "VAR_1".into(),
            operator: Operator::Or,
            value: "5".into(),
        };
        let err = expr.render_jump("Script_1", &mut out).unwrap_err();
        assert!(matches!(err, EmitError::MalformedCondition { operator: Operator::Or }));
    }

    #[test]
    fn test_leaf_count() {
        let expr = BooleanExpression::or(
            BooleanExpression::and(BooleanExpression::flag("A"), BooleanExpression::flag("B")),
            BooleanExpression::var("VAR_1", Operator::Equal, "1"),
        );
        assert_eq!(expr.leaf_count(), 3);
    }

    #[test]
    fn test_program_json() {
        let source = r#"{
            "top_level_statements": [
                {"type": "script", "name": "Main", "body": [
                    {"type": "command", "name": "lock"},
                    {"type": "while", "id": 0,
                     "condition": {"comparison": {"kind": "flag", "flag": "FLAG_1", "set": true}},
                     "body": [{"type": "break", "loop_id": 0}]}
                ]},
                {"type": "raw", "value": "Label:\n\tend"}
            ],
            "texts": [{"name": "Text_1", "value": "Hi"}]
        }"#;
        let program = Program::from_json(source).unwrap();
        assert_eq!(program.top_level_statements.len(), 2);
        assert_eq!(program.scripts().count(), 1);
        let script = program.scripts().next().unwrap();
        assert!(matches!(&script.body[1], Statement::While(l) if l.id == LoopId(0)));

        let again = Program::from_json(&program.to_json().unwrap()).unwrap();
        assert_eq!(again, program);
    }

    #[test]
    fn test_unknown_statement_kind_is_rejected() {
        let source = r#"{"top_level_statements": [{"type": "movement", "name": "M"}]}"#;
        assert!(matches!(Program::from_json(source), Err(EmitError::Json(_))));
    }
}
