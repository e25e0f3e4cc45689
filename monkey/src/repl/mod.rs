//! REPL (Read-Eval-Print Loop) for Monkey

use crate::ast::Statement;
use crate::error::CompileError;
use crate::interp::{DEFAULT_MAX_DEPTH, EnvRef, Interpreter, Object, new_environment};
use crate::parser::parse;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::path::PathBuf;

pub const PROMPT: &str = ">> ";
const HISTORY_FILE: &str = ".monkey_history";

/// Result of evaluating one line
#[derive(Debug, PartialEq)]
pub enum Outcome {
    /// Value to print; runtime errors arrive here as [`Object::Error`]
    Value(Object),
    /// Nothing to print: empty input, or evaluation ended on a `let`
    Silent,
    /// The line did not parse and was not evaluated
    ParseErrors(Vec<CompileError>),
}

/// Evaluation state shared by all lines of one session
pub struct Session {
    interpreter: Interpreter,
    env: EnvRef,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl Session {
    pub fn new(max_depth: usize) -> Self {
        Session {
            interpreter: Interpreter::with_max_depth(max_depth),
            env: new_environment(),
        }
    }

    /// Global environment of the session
    pub fn env(&self) -> &EnvRef {
        &self.env
    }

    /// Parse and evaluate one line against the session environment
    pub fn eval_line(&mut self, line: &str) -> Outcome {
        let (program, errors) = parse(line);
        if !errors.is_empty() {
            return Outcome::ParseErrors(errors);
        }

        // Statements run one at a time so that a `return` or an error ends
        // the line with that value, whatever follows it.
        let mut outcome = Outcome::Silent;
        for stmt in &program.statements {
            match self.interpreter.eval(stmt, &self.env) {
                Object::ReturnValue(value) => return Outcome::Value(*value),
                value @ Object::Error(_) => return Outcome::Value(value),
                _ if matches!(stmt, Statement::Let(_)) => outcome = Outcome::Silent,
                value => outcome = Outcome::Value(value),
            }
        }
        outcome
    }
}

/// Line-editing front end
pub struct Repl {
    editor: DefaultEditor,
    session: Session,
    prompt: String,
    history_path: Option<PathBuf>,
}

/// REPL settings from the command line
#[derive(Debug, Clone)]
pub struct ReplConfig {
    pub prompt: String,
    pub history: bool,
    pub max_depth: usize,
}

impl Default for ReplConfig {
    fn default() -> Self {
        ReplConfig {
            prompt: PROMPT.to_string(),
            history: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Repl {
    /// Create a new REPL
    pub fn new(config: ReplConfig) -> RlResult<Self> {
        let editor = DefaultEditor::new()?;

        let history_path = if config.history {
            dirs_home().map(|h| h.join(HISTORY_FILE))
        } else {
            None
        };

        let mut repl = Repl {
            editor,
            session: Session::new(config.max_depth),
            prompt: config.prompt,
            history_path,
        };

        // Load history if available
        if let Some(ref path) = repl.history_path {
            let _ = repl.editor.load_history(path);
        }

        Ok(repl)
    }

    /// Run the REPL
    pub fn run(&mut self) -> RlResult<()> {
        println!("Monkey REPL v{}", env!("CARGO_PKG_VERSION"));
        println!("Type :help for help, :quit to exit.\n");

        loop {
            match self.editor.readline(&self.prompt) {
                Ok(line) => {
                    let line = line.trim();

                    if line.is_empty() {
                        continue;
                    }

                    // Add to history
                    let _ = self.editor.add_history_entry(line);

                    // Handle commands
                    if line.starts_with(':') {
                        if self.handle_command(line) {
                            break;
                        }
                        continue;
                    }

                    print_outcome(self.session.eval_line(line));
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Goodbye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {err}");
                    break;
                }
            }
        }

        // Save history
        if let Some(ref path) = self.history_path {
            let _ = self.editor.save_history(path);
        }

        Ok(())
    }

    /// Handle REPL commands (starting with :); returns true to exit
    fn handle_command(&mut self, cmd: &str) -> bool {
        match cmd {
            ":quit" | ":q" | ":exit" => {
                println!("Goodbye!");
                true
            }
            ":help" | ":h" | ":?" => {
                print_help();
                false
            }
            ":clear" => {
                print!("\x1B[2J\x1B[1;1H");
                false
            }
            _ => {
                println!("Unknown command: {cmd}");
                println!("Type :help for help.");
                false
            }
        }
    }
}

fn print_outcome(outcome: Outcome) {
    match outcome {
        Outcome::Value(value) => println!("{value}"),
        Outcome::Silent => {}
        Outcome::ParseErrors(errors) => {
            for err in errors {
                println!("\t{}", err.message());
            }
        }
    }
}

fn print_help() {
    println!("Monkey REPL Commands:");
    println!("  :help, :h, :?   Show this help");
    println!("  :quit, :q       Exit the REPL");
    println!("  :clear          Clear the screen");
    println!();
    println!("You can enter:");
    println!("  - Bindings: let add = fn(a, b) {{ a + b }};");
    println!("  - Expressions: add(1, 2) * 3");
    println!("  - Collections: [1, 2, 3][0], {{\"key\": \"value\"}}[\"key\"]");
    println!();
    println!("Built-in functions:");
    println!("  len(x)          Length of a string or array");
    println!("  first(a)        First element of an array");
    println!("  last(a)         Last element of an array");
    println!("  rest(a)         Array without its first element");
    println!("  push(a, x)      New array with x appended");
    println!("  puts(...)       Print each argument on its own line");
}

/// Get home directory
fn dirs_home() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var("USERPROFILE").ok().map(PathBuf::from)
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOME").ok().map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_keeps_bindings() {
        let mut session = Session::default();
        assert_eq!(session.eval_line("let a = 5;"), Outcome::Silent);
        assert_eq!(
            session.eval_line("a * 2"),
            Outcome::Value(Object::Integer(10))
        );
        assert!(session.env().borrow().get("a").is_some());
    }

    #[test]
    fn test_session_functions_across_lines() {
        let mut session = Session::default();
        session.eval_line("let add = fn(x, y) { x + y };");
        assert_eq!(
            session.eval_line("add(1, add(2, 3))"),
            Outcome::Value(Object::Integer(6))
        );
    }

    #[test]
    fn test_session_parse_errors_do_not_evaluate() {
        let mut session = Session::default();
        let Outcome::ParseErrors(errors) = session.eval_line("let x = 1; let = 2;") else {
            panic!("Expected parse errors");
        };
        assert_eq!(
            errors[0].message(),
            "expected next token to be IDENT, got = instead"
        );
        // the valid first statement was not run either
        assert!(session.env().borrow().get("x").is_none());
    }

    #[test]
    fn test_session_runtime_error_is_a_value() {
        let mut session = Session::default();
        assert_eq!(
            session.eval_line("let y = missing;"),
            Outcome::Value(Object::Error("identifier not found: missing".to_string()))
        );
        assert_eq!(
            session.eval_line("1 + 1"),
            Outcome::Value(Object::Integer(2))
        );
    }

    #[test]
    fn test_session_silent_on_empty_program() {
        let mut session = Session::default();
        assert_eq!(session.eval_line(""), Outcome::Silent);
    }

    #[test]
    fn test_session_return_before_let_is_printed() {
        let mut session = Session::default();
        assert_eq!(
            session.eval_line("return 5; let x = 1;"),
            Outcome::Value(Object::Integer(5))
        );
        // evaluation stopped at the return
        assert!(session.env().borrow().get("x").is_none());

        assert_eq!(
            session.eval_line("if (true) { return 7; }; let y = 2;"),
            Outcome::Value(Object::Integer(7))
        );
        assert!(session.env().borrow().get("y").is_none());
    }

    #[test]
    fn test_session_silent_only_when_last_let_runs() {
        let mut session = Session::default();
        assert_eq!(session.eval_line("1 + 1; let z = 3;"), Outcome::Silent);
        assert_eq!(
            session.eval_line("let w = 1; w + z"),
            Outcome::Value(Object::Integer(4))
        );
    }

    #[test]
    fn test_session_null_is_printed() {
        let mut session = Session::default();
        assert_eq!(
            session.eval_line("if (false) { 1 }"),
            Outcome::Value(Object::Null)
        );
    }

    #[test]
    fn test_session_depth_limit() {
        let mut session = Session::new(10);
        session.eval_line("let f = fn(n) { f(n + 1) };");
        let Outcome::Value(Object::Error(msg)) = session.eval_line("f(0)") else {
            panic!("Expected runtime error");
        };
        assert!(msg.contains("maximum call depth of 10"));
    }

    #[test]
    fn test_repl_config_default() {
        let config = ReplConfig::default();
        assert_eq!(config.prompt, ">> ");
        assert!(config.history);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_dirs_home_returns_some() {
        // HOME (or USERPROFILE) is normally set
        let home = dirs_home();
        if let Some(h) = home {
            assert!(!h.as_os_str().is_empty());
        }
    }

    #[test]
    fn test_handle_command() {
        // Skip when no terminal is available
        let Ok(mut repl) = Repl::new(ReplConfig {
            history: false,
            ..ReplConfig::default()
        }) else {
            return;
        };
        assert!(repl.handle_command(":quit"));
        assert!(repl.handle_command(":q"));
        assert!(!repl.handle_command(":help"));
        assert!(!repl.handle_command(":clear"));
        assert!(!repl.handle_command(":unknown"));
    }
}
