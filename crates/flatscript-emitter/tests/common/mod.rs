//! A tiny interpreter for emitted scripts.
//!
//! Understands labels, `goto`, the flag and variable conditional jumps,
//! `setflag` / `clearflag` / `setvar` / `addvar`, and `end` / `return`.
//! Every other instruction is recorded in the trace and otherwise ignored.

#![allow(dead_code)]

use std::cmp::Ordering;

use flatscript_emitter::ast::{
    BooleanExpression, Command, ConditionalBlock, IfStatement, LoopId, LoopStatement, Operator,
    Program, ScriptStatement, Statement, TopLevelStatement,
};
use flatscript_emitter::{EmitOptions, Emitter};
use rustc_hash::{FxHashMap, FxHashSet};

const STEP_LIMIT: usize = 10_000;

#[derive(Debug, Clone)]
struct Instruction {
    name: String,
    args: Vec<String>,
}

/// Parsed emitted text.
#[derive(Debug)]
pub struct Listing {
    instructions: Vec<Instruction>,
    labels: FxHashMap<String, usize>,
}

/// What happened during one run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Trace {
    /// Non-control instructions in execution order, e.g. `msgbox Text_1`
    pub commands: Vec<String>,
    /// Flags and variables tested, in order
    pub tested: Vec<String>,
    /// The instruction that stopped execution
    pub exit: String,
}

impl Trace {
    /// How many times the named command ran.
    pub fn count(&self, name: &str) -> usize {
        self.commands
            .iter()
            .filter(|c| c.split(' ').next() == Some(name))
            .count()
    }

    /// Whether the flag or variable was ever tested.
    pub fn tested(&self, name: &str) -> bool {
        self.tested.iter().any(|t| t == name)
    }
}

/// Machine state a run starts from.
#[derive(Debug, Clone, Default)]
pub struct State {
    pub flags: FxHashSet<String>,
    pub vars: FxHashMap<String, i64>,
}

impl State {
    pub fn with_flags(flags: &[&str]) -> Self {
        Self {
            flags: flags.iter().map(|f| f.to_string()).collect(),
            vars: FxHashMap::default(),
        }
    }
}

impl Listing {
    pub fn parse(text: &str) -> Self {
        let mut instructions = Vec::new();
        let mut labels = FxHashMap::default();
        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            if let Some(instr) = line.strip_prefix('\t') {
                let (name, rest) = instr.split_once(' ').unwrap_or((instr, ""));
                let args = if rest.is_empty() {
                    Vec::new()
                } else {
                    rest.split(", ").map(str::to_string).collect()
                };
                instructions.push(Instruction { name: name.to_string(), args });
            } else if let Some(label) = line.strip_suffix(':') {
                let previous = labels.insert(label.to_string(), instructions.len());
                assert!(previous.is_none(), "duplicate label {}", label);
            } else {
                panic!("unexpected line {:?}", line);
            }
        }
        Self { instructions, labels }
    }

    /// Every label defined in the listing.
    pub fn labels(&self) -> Vec<&str> {
        self.labels.keys().map(String::as_str).collect()
    }

    /// Every label referenced by a jump.
    pub fn jump_targets(&self) -> FxHashSet<&str> {
        self.instructions
            .iter()
            .filter(|i| i.name.starts_with("goto"))
            .filter_map(|i| i.args.last())
            .map(String::as_str)
            .collect()
    }

    /// Number of unconditional `goto` instructions.
    pub fn gotos(&self) -> usize {
        self.instructions.iter().filter(|i| i.name == "goto").count()
    }

    /// Runs from `entry` until `end` / `return`.
    pub fn run(&self, entry: &str, mut state: State) -> Trace {
        let mut trace = Trace::default();
        let mut pc = self.target(entry);
        let mut comparison = Ordering::Equal;

        for _ in 0..STEP_LIMIT {
            let Some(instr) = self.instructions.get(pc) else {
                trace.exit = "<fell off>".into();
                return trace;
            };
            pc += 1;
            let arg = |i: usize| instr.args[i].as_str();
            match instr.name.as_str() {
                "end" | "return" => {
                    trace.exit = instr.name.clone();
                    return trace;
                }
                "goto" => pc = self.target(arg(0)),
                "goto_if_set" | "goto_if_unset" => {
                    trace.tested.push(arg(0).to_string());
                    let set = state.flags.contains(arg(0));
                    if set == (instr.name == "goto_if_set") {
                        pc = self.target(arg(1));
                    }
                }
                "compare" => {
                    trace.tested.push(arg(0).to_string());
                    let value: i64 = arg(1).parse().expect("numeric compare operand");
                    let current = state.vars.get(arg(0)).copied().unwrap_or(0);
                    comparison = current.cmp(&value);
                }
                name if name.starts_with("goto_if_") => {
                    let taken = match &name["goto_if_".len()..] {
                        "eq" => comparison == Ordering::Equal,
                        "ne" => comparison != Ordering::Equal,
                        "lt" => comparison == Ordering::Less,
                        "le" => comparison != Ordering::Greater,
                        "gt" => comparison == Ordering::Greater,
                        "ge" => comparison != Ordering::Less,
                        other => panic!("unknown condition {}", other),
                    };
                    if taken {
                        pc = self.target(arg(0));
                    }
                }
                other => {
                    match other {
                        "setflag" => {
                            state.flags.insert(arg(0).to_string());
                        }
                        "clearflag" => {
                            state.flags.remove(arg(0));
                        }
                        "setvar" | "addvar" => {
                            let value: i64 = arg(1).parse().expect("numeric operand");
                            let var = state.vars.entry(arg(0).to_string()).or_insert(0);
                            if other == "setvar" {
                                *var = value;
                            } else {
                                *var += value;
                            }
                        }
                        _ => {}
                    }
                    let mut text = instr.name.clone();
                    if !instr.args.is_empty() {
                        text.push(' ');
                        text.push_str(&instr.args.join(", "));
                    }
                    trace.commands.push(text);
                }
            }
        }
        panic!("script did not terminate within {} steps", STEP_LIMIT);
    }

    fn target(&self, label: &str) -> usize {
        *self
            .labels
            .get(label)
            .unwrap_or_else(|| panic!("jump to undefined label {}", label))
    }
}

// ============================================================================
// Program construction helpers
// ============================================================================

pub fn cmd(name: &str) -> Statement {
    Statement::Command(Command::bare(name))
}

pub fn cmd_args(name: &str, args: &[&str]) -> Statement {
    Statement::Command(Command::new(name, args.iter().copied()))
}

pub fn if_(condition: BooleanExpression, body: Vec<Statement>) -> Statement {
    if_else(condition, body, None)
}

pub fn if_else(
    condition: BooleanExpression,
    body: Vec<Statement>,
    alternative: Option<Vec<Statement>>,
) -> Statement {
    Statement::If(IfStatement {
        consequence: ConditionalBlock { condition, body },
        elifs: Vec::new(),
        alternative,
    })
}

pub fn while_(id: u32, condition: BooleanExpression, body: Vec<Statement>) -> Statement {
    Statement::While(LoopStatement {
        id: LoopId(id),
        condition,
        body,
    })
}

pub fn do_while(id: u32, condition: BooleanExpression, body: Vec<Statement>) -> Statement {
    Statement::DoWhile(LoopStatement {
        id: LoopId(id),
        condition,
        body,
    })
}

pub fn break_(id: u32) -> Statement {
    Statement::Break { loop_id: LoopId(id) }
}

pub fn continue_(id: u32) -> Statement {
    Statement::Continue { loop_id: LoopId(id) }
}

pub fn var_lt(var: &str, value: i64) -> BooleanExpression {
    BooleanExpression::var(var, Operator::Less, value.to_string())
}

pub fn program(body: Vec<Statement>) -> Program {
    Program {
        top_level_statements: vec![TopLevelStatement::Script(ScriptStatement {
            name: "Main".into(),
            body,
        })],
        texts: Vec::new(),
    }
}

pub fn emit(program: &Program, optimize: bool) -> String {
    Emitter::new(program, EmitOptions { optimize })
        .emit()
        .expect("program should emit")
}

/// Emits `body` as script `Main` and runs it from `state`.
pub fn run(body: Vec<Statement>, optimize: bool, state: State) -> Trace {
    let text = emit(&program(body), optimize);
    Listing::parse(&text).run("Main", state)
}
