//! Line-oriented scripts that drive a dependency tree.
//!
//! ```text
//! # build, then satisfy the smallest requirement
//! push 5 3 7
//! show
//! pop 3
//! leaves
//! ```
//!
//! One command per line; blank lines are skipped and `#` starts a comment
//! that runs to the end of the line, so values cannot contain `#`. Tokens
//! that parse as integers become [`ScriptValue::Int`], everything else is
//! [`ScriptValue::Text`].

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use regex::Regex;
use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{ordered_factory, DependencyTree, Direction, Ordered};

/// A token from a script. Integers sort before text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ScriptValue {
    Int(i64),
    Text(String),
}

impl FromStr for ScriptValue {
    type Err = Infallible;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Ok(match token.parse::<i64>() {
            Ok(n) => ScriptValue::Int(n),
            Err(_) => ScriptValue::Text(token.to_string()),
        })
    }
}

impl From<i64> for ScriptValue {
    fn from(n: i64) -> Self {
        ScriptValue::Int(n)
    }
}

impl From<&str> for ScriptValue {
    fn from(token: &str) -> Self {
        match token.parse() {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for ScriptValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptValue::Int(n) => write!(f, "{}", n),
            ScriptValue::Text(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Push(Vec<ScriptValue>),
    Pop(Vec<ScriptValue>),
    Show,
    Leaves,
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// 1-based source line
    pub line: usize,
    pub command: Command,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    pub steps: Vec<Step>,
}

impl Script {
    #[instrument(level = "debug", skip(source))]
    pub fn parse(source: &str) -> ApplicationResult<Self> {
        let command_regex = Regex::new(r"^(push|pop|show|leaves|reset)(?:\s+(.*))?$")
            .map_err(|e| ApplicationError::Parse {
                line: 0,
                message: e.to_string(),
            })?;

        let mut steps = Vec::new();
        for (idx, raw) in source.lines().enumerate() {
            let line = idx + 1;
            let text = raw.split('#').next().unwrap_or_default().trim();
            if text.is_empty() {
                continue;
            }

            let Some(caps) = command_regex.captures(text) else {
                return Err(ApplicationError::Parse {
                    line,
                    message: format!("unknown command: {}", text),
                });
            };
            let keyword = caps.get(1).map_or("", |m| m.as_str());
            let args: Vec<ScriptValue> = caps
                .get(2)
                .map_or("", |m| m.as_str())
                .split_whitespace()
                .map(ScriptValue::from)
                .collect();

            let command = match keyword {
                "push" | "pop" if args.is_empty() => {
                    return Err(ApplicationError::Parse {
                        line,
                        message: format!("{} needs at least one value", keyword),
                    });
                }
                "push" => Command::Push(args),
                "pop" => Command::Pop(args),
                _ if !args.is_empty() => {
                    return Err(ApplicationError::Parse {
                        line,
                        message: format!("{} takes no arguments", keyword),
                    });
                }
                "show" => Command::Show,
                "leaves" => Command::Leaves,
                _ => Command::Reset,
            };
            steps.push(Step { line, command });
        }

        debug!(steps = steps.len(), "parsed script");
        Ok(Self { steps })
    }
}

/// What a single step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// `leaf` is false when the value was redundant everywhere and dropped.
    Pushed { value: ScriptValue, leaf: bool },
    Popped { value: ScriptValue },
    Rendered(String),
    Leaves(Vec<ScriptValue>),
    Reset,
}

pub type ScriptTree = DependencyTree<Ordered<ScriptValue>>;

/// Turns the tree into the text recorded by a `show` step.
pub type Renderer = fn(&ScriptTree) -> String;

/// Applies scripts to one tree, which persists across runs.
pub struct ScriptRunner {
    tree: ScriptTree,
    direction: Direction,
    renderer: Renderer,
}

impl ScriptRunner {
    pub fn new(direction: Direction) -> Self {
        Self {
            tree: DependencyTree::with_factory(ordered_factory(direction)),
            direction,
            renderer: |tree| tree.to_string(),
        }
    }

    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn tree(&self) -> &ScriptTree {
        &self.tree
    }

    pub fn into_tree(self) -> ScriptTree {
        self.tree
    }

    /// Runs every step in order, stopping at the first rejected `pop`.
    ///
    /// Steps before the failing one stay applied.
    #[instrument(level = "debug", skip_all, fields(steps = script.steps.len()))]
    pub fn run(&mut self, script: &Script) -> ApplicationResult<Vec<Outcome>> {
        let mut outcomes = Vec::new();
        for step in &script.steps {
            self.apply(step, &mut outcomes)?;
        }
        info!(
            nodes = self.tree.len(),
            leaves = self.tree.leaves_values().len(),
            "script finished"
        );
        Ok(outcomes)
    }

    fn apply(&mut self, step: &Step, outcomes: &mut Vec<Outcome>) -> ApplicationResult<()> {
        match &step.command {
            Command::Push(values) => {
                for value in values {
                    let leaf = self.tree.push(value.clone()).is_some();
                    outcomes.push(Outcome::Pushed {
                        value: value.clone(),
                        leaf,
                    });
                }
            }
            Command::Pop(values) => {
                for value in values {
                    self.tree
                        .pop(value)
                        .map_err(|source| ApplicationError::Script {
                            line: step.line,
                            source,
                        })?;
                    outcomes.push(Outcome::Popped {
                        value: value.clone(),
                    });
                }
            }
            Command::Show => outcomes.push(Outcome::Rendered((self.renderer)(&self.tree))),
            Command::Leaves => outcomes.push(Outcome::Leaves(self.tree.leaves_values().to_vec())),
            Command::Reset => {
                self.tree = DependencyTree::with_factory(ordered_factory(self.direction));
                outcomes.push(Outcome::Reset);
            }
        }
        Ok(())
    }
}
