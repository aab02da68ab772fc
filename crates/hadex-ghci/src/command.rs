//! GHCi command vocabulary
//!
//! Every interaction with the interpreter is one line of text, and the exact
//! strings matter (`:delete *`, not `:delete-all`). Building them in one
//! place keeps the vocabulary greppable and testable.

use std::fmt;

/// A single command understood by the interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GhciCommand {
    /// `:load <module>`
    Load(String),
    /// `:delete *` - remove every breakpoint
    DeleteAllBreakpoints,
    /// `:break <module> <line>`
    Break { module: String, line: u32 },
    /// `:step <function>` - begin stepping at a function
    StepInto(String),
    /// `:step` - single step from the current stop
    Step,
    /// `:continue` - run to the next breakpoint or to completion
    Continue,
    /// Bare expression evaluation (also used to start the debuggee)
    Evaluate(String),
}

impl GhciCommand {
    /// Render the exact command line sent to the interpreter.
    pub fn render(&self) -> String {
        match self {
            GhciCommand::Load(module) => format!(":load {}", module),
            GhciCommand::DeleteAllBreakpoints => ":delete *".to_string(),
            GhciCommand::Break { module, line } => format!(":break {} {}", module, line),
            GhciCommand::StepInto(function) => format!(":step {}", function),
            GhciCommand::Step => ":step".to_string(),
            GhciCommand::Continue => ":continue".to_string(),
            GhciCommand::Evaluate(expression) => expression.clone(),
        }
    }
}

impl fmt::Display for GhciCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
