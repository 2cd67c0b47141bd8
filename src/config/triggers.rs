// src/config/triggers.rs
//! Compiler for the line-oriented trigger configuration.
//!
//! ```text
//! // comment
//! t1,TITLE,election
//! t2,DESCRIPTION,Trump
//! t3,AFTER,2016-10-03T17:00:10Z
//! t4,AND,t2,t3
//! ADD,t1,t4
//! ```
//!
//! Every non-blank, non-comment line is split on `,` without trimming the
//! fields. `ADD` appends named triggers to the activation list; any other
//! first field names a trigger defined by the kind keyword in field 1.
//!
//! Names resolve in a single pass, in line order. Redefining a name replaces
//! the registry entry, but combinators built earlier keep the old node.
//!
//! Unknown names are tolerated: an `ADD` skips them, and a `NOT`/`AND` whose
//! operands are missing leaves its own name untouched. `OR` is registered when
//! at least one operand exists; with a single operand it becomes `Or(x, x)`.
//! Each of these is reported as a [`Diagnostic`] and logged, never as an error.
//! Structural problems (unknown kind, too few fields, malformed timestamp)
//! abort the whole compile.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{ConfigError, LineFault};
use crate::trigger::{parse_cutoff, ActivationList, TriggerArena, TriggerId};

pub const DEFAULT_TRIGGER_CONFIG_PATH: &str = "config/triggers.txt";
pub const ENV_TRIGGER_CONFIG_PATH: &str = "TRIGGER_CONFIG_PATH";

const ADD_DIRECTIVE: &str = "ADD";
const COMMENT_MARKER: &str = "//";

/// Soft findings that never change the compiled result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// `ADD` named a trigger that is not registered.
    UnknownActivation { line: usize, name: String },
    /// A combinator referenced unregistered names; the line had no effect.
    UnresolvedReference {
        line: usize,
        name: String,
        kind: &'static str,
        missing: Vec<String>,
    },
    /// `OR` with one unregistered operand, compiled over the other side only.
    PartialOr {
        line: usize,
        name: String,
        missing: String,
    },
    /// A phrase trigger with no words; it matches every item.
    EmptyPhrase { line: usize, name: String },
}

impl Diagnostic {
    pub fn line(&self) -> usize {
        match self {
            Diagnostic::UnknownActivation { line, .. }
            | Diagnostic::UnresolvedReference { line, .. }
            | Diagnostic::PartialOr { line, .. }
            | Diagnostic::EmptyPhrase { line, .. } => *line,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownActivation { line, name } => {
                write!(f, "line {line}: ADD skips unknown trigger `{name}`")
            }
            Diagnostic::UnresolvedReference {
                line,
                name,
                kind,
                missing,
            } => write!(
                f,
                "line {line}: {kind} trigger `{name}` not defined, unknown reference(s): {}",
                missing.join(", ")
            ),
            Diagnostic::PartialOr {
                line,
                name,
                missing,
            } => write!(
                f,
                "line {line}: OR trigger `{name}` ignores unknown operand `{missing}`"
            ),
            Diagnostic::EmptyPhrase { line, name } => {
                write!(f, "line {line}: trigger `{name}` has an empty phrase and matches everything")
            }
        }
    }
}

/// Output of a successful compile.
#[derive(Debug, Clone, Default)]
pub struct CompileReport {
    pub activations: ActivationList,
    pub diagnostics: Vec<Diagnostic>,
    /// Names registered at the end of the input, sorted.
    pub registered: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Title,
    Description,
    After,
    Before,
    Not,
    And,
    Or,
}

impl Kind {
    fn parse(keyword: &str) -> Option<Self> {
        match keyword {
            "TITLE" => Some(Kind::Title),
            "DESCRIPTION" => Some(Kind::Description),
            "AFTER" => Some(Kind::After),
            "BEFORE" => Some(Kind::Before),
            "NOT" => Some(Kind::Not),
            "AND" => Some(Kind::And),
            "OR" => Some(Kind::Or),
            _ => None,
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            Kind::Title => "TITLE",
            Kind::Description => "DESCRIPTION",
            Kind::After => "AFTER",
            Kind::Before => "BEFORE",
            Kind::Not => "NOT",
            Kind::And => "AND",
            Kind::Or => "OR",
        }
    }

    /// Fields required on the line: name, kind, then the arguments.
    fn fields_needed(self) -> usize {
        match self {
            Kind::And | Kind::Or => 4,
            _ => 3,
        }
    }
}

#[derive(Default)]
struct Compiler {
    arena: TriggerArena,
    registry: HashMap<String, TriggerId>,
    active: Vec<TriggerId>,
    diagnostics: Vec<Diagnostic>,
}

impl Compiler {
    fn note(&mut self, diag: Diagnostic) {
        warn!(target: "triggers", line = diag.line(), "{diag}");
        self.diagnostics.push(diag);
    }

    fn lookup(&self, name: &str) -> Option<TriggerId> {
        self.registry.get(name).copied()
    }

    fn line(&mut self, line: usize, text: &str) -> Result<(), ConfigError> {
        let fields: Vec<&str> = text.split(',').collect();

        if fields[0] == ADD_DIRECTIVE {
            for name in &fields[1..] {
                match self.lookup(name) {
                    Some(id) => self.active.push(id),
                    None => self.note(Diagnostic::UnknownActivation {
                        line,
                        name: name.to_string(),
                    }),
                }
            }
            return Ok(());
        }

        let malformed = |fault| ConfigError::MalformedLine {
            line,
            text: text.to_string(),
            fault,
        };

        let keyword = fields.get(1).ok_or_else(|| malformed(LineFault::MissingKind))?;
        let kind =
            Kind::parse(keyword).ok_or_else(|| malformed(LineFault::UnknownKind(keyword.to_string())))?;
        if fields.len() < kind.fields_needed() {
            return Err(malformed(LineFault::MissingArguments {
                kind: kind.keyword(),
                expected: kind.fields_needed(),
                found: fields.len(),
            }));
        }

        let name = fields[0];
        let arg = fields[2];
        let built = match kind {
            Kind::Title | Kind::Description => {
                let id = if kind == Kind::Title {
                    self.arena.title(arg)
                } else {
                    self.arena.description(arg)
                };
                if arg.split_whitespace().next().is_none() {
                    self.note(Diagnostic::EmptyPhrase {
                        line,
                        name: name.to_string(),
                    });
                }
                Some(id)
            }
            Kind::After | Kind::Before => {
                let cutoff = parse_cutoff(arg).map_err(|e| ConfigError::MalformedTimestamp {
                    line,
                    value: e.value,
                })?;
                Some(if kind == Kind::After {
                    self.arena.after(cutoff)
                } else {
                    self.arena.before(cutoff)
                })
            }
            Kind::Not => match self.lookup(arg) {
                Some(inner) => Some(self.arena.not(inner)?),
                None => {
                    self.unresolved(line, name, kind, &[arg]);
                    None
                }
            },
            Kind::And => match (self.lookup(arg), self.lookup(fields[3])) {
                (Some(l), Some(r)) => Some(self.arena.and(l, r)?),
                (l, r) => {
                    let missing = missing_names(&[(arg, l), (fields[3], r)]);
                    self.unresolved(line, name, kind, &missing);
                    None
                }
            },
            Kind::Or => match (self.lookup(arg), self.lookup(fields[3])) {
                (Some(l), Some(r)) => Some(self.arena.or(l, r)?),
                (Some(only), None) | (None, Some(only)) => {
                    let missing = if self.registry.contains_key(arg) {
                        fields[3]
                    } else {
                        arg
                    };
                    self.note(Diagnostic::PartialOr {
                        line,
                        name: name.to_string(),
                        missing: missing.to_string(),
                    });
                    Some(self.arena.or(only, only)?)
                }
                (None, None) => {
                    self.unresolved(line, name, kind, &[arg, fields[3]]);
                    None
                }
            },
        };

        if let Some(id) = built {
            self.registry.insert(name.to_string(), id);
        }
        Ok(())
    }

    fn unresolved(&mut self, line: usize, name: &str, kind: Kind, missing: &[&str]) {
        self.note(Diagnostic::UnresolvedReference {
            line,
            name: name.to_string(),
            kind: kind.keyword(),
            missing: missing.iter().map(|s| s.to_string()).collect(),
        });
    }

    fn finish(self) -> CompileReport {
        let mut registered: Vec<String> = self.registry.into_keys().collect();
        registered.sort();
        CompileReport {
            activations: ActivationList::from_parts(self.arena, self.active),
            diagnostics: self.diagnostics,
            registered,
        }
    }
}

fn missing_names<'a>(refs: &[(&'a str, Option<TriggerId>)]) -> Vec<&'a str> {
    refs.iter()
        .filter(|(_, id)| id.is_none())
        .map(|(name, _)| *name)
        .collect()
}

/// Blank (empty or whitespace-only) and `//` comment lines are skipped.
fn is_ignored(text: &str) -> bool {
    text.trim().is_empty() || text.starts_with(COMMENT_MARKER)
}

/// Compile configuration lines into an activation list plus diagnostics.
pub fn compile_report<I, S>(lines: I) -> Result<CompileReport, ConfigError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut compiler = Compiler::default();
    for (idx, raw) in lines.into_iter().enumerate() {
        let text = raw.as_ref().trim_end_matches(['\r', '\n']);
        if is_ignored(text) {
            continue;
        }
        compiler.line(idx + 1, text)?;
    }

    let report = compiler.finish();
    info!(
        target: "triggers",
        activations = report.activations.len(),
        registered = report.registered.len(),
        diagnostics = report.diagnostics.len(),
        "trigger config compiled"
    );
    Ok(report)
}

/// Compile configuration lines into the ordered activation list.
pub fn compile<I, S>(lines: I) -> Result<ActivationList, ConfigError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    compile_report(lines).map(|r| r.activations)
}

/// Compile a whole configuration text.
pub fn compile_str(text: &str) -> Result<CompileReport, ConfigError> {
    compile_report(text.lines())
}

/// Read and compile a configuration file.
pub fn load_trigger_config(path: &Path) -> Result<CompileReport, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    compile_str(&content)
}

/// Resolve the config path:
/// 1) `explicit` (CLI flag or settings file)
/// 2) $TRIGGER_CONFIG_PATH
/// 3) config/triggers.txt, when it exists
pub fn resolve_trigger_config_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(p) = explicit {
        return Some(p);
    }
    if let Ok(p) = std::env::var(ENV_TRIGGER_CONFIG_PATH) {
        return Some(PathBuf::from(p));
    }
    let default = PathBuf::from(DEFAULT_TRIGGER_CONFIG_PATH);
    default.exists().then_some(default)
}
