//! The anode REPL.
//!
//! Evaluates one statement at a time against the session's shared world, so
//! globals, functions, types and templates defined on earlier lines stay
//! visible. Meta-commands start with `/`; anything else is compiled as a
//! module named `repl_line_<n>`.
//!
//! Line editing is intentionally plain (locked stdin); an interactive
//! editor is a front-end concern outside the core. History is kept
//! in-memory for `/history` and appended to `~/.anode_history`.

use std::fs::OpenOptions;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::Compiler;

const NUDGE: &str = "Type '/help' for help or '/exit' to exit.";

/// REPL session state.
pub struct Repl {
    compiler: Compiler,
    history: Vec<String>,
    history_path: Option<PathBuf>,
    /// Whether a plugged backend would be invoked; toggled by `/compile`.
    compile_enabled: bool,
}

impl Repl {
    pub fn new() -> Self {
        Self {
            compiler: Compiler::new(),
            history: Vec::new(),
            history_path: history_file_path(),
            compile_enabled: true,
        }
    }

    /// Run the interactive loop until `/exit` or end of input.
    pub fn run(
        &mut self,
        input: &mut impl BufRead,
        output: &mut impl Write,
    ) -> anyhow::Result<()> {
        writeln!(output, "Welcome to the anode REPL. {}", NUDGE)?;

        loop {
            write!(output, "anode> ")?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                break;
            }
            let line = line.trim_end().to_owned();
            if line.is_empty() {
                continue;
            }

            self.remember(&line);

            if let Some(command) = line.strip_prefix('/') {
                if !self.dispatch_command(command, output)? {
                    break;
                }
                continue;
            }

            self.evaluate(&line, output)?;
        }

        Ok(())
    }

    /// Handle one meta-command; returns false when the REPL should exit.
    fn dispatch_command(&mut self, command: &str, output: &mut impl Write) -> anyhow::Result<bool> {
        match command {
            "exit" => return Ok(false),
            "help" => {
                writeln!(output, "Meta-Command      Description")?;
                writeln!(output, "/help             Displays this text.")?;
                writeln!(
                    output,
                    "/compile          Toggles compilation.  When disabled, no backend code is generated."
                )?;
                writeln!(output, "/history          Displays command history.")?;
                writeln!(output, "/exit             Exits the anode REPL.")?;
                writeln!(output)?;
                writeln!(output, "Valid anode statements may also be entered.")?;
            }
            "history" => {
                for entry in &self.history {
                    writeln!(output, "{}", entry)?;
                }
            }
            "compile" => {
                self.compile_enabled = !self.compile_enabled;
                writeln!(
                    output,
                    "compilation {}",
                    if self.compile_enabled { "enabled" } else { "disabled" }
                )?;
            }
            other => {
                writeln!(output, "Unknown command: /{}", other)?;
            }
        }
        Ok(true)
    }

    /// Compile one line as a module and report.
    fn evaluate(&mut self, line: &str, output: &mut impl Write) -> anyhow::Result<()> {
        let module_name = self.compiler.next_repl_module_name();
        let outcome = self.compiler.compile_module(&module_name, line);

        for diagnostic in &outcome.diagnostics {
            writeln!(output, "{}", diagnostic)?;
        }

        if outcome.succeeded() && self.compile_enabled {
            // Without a plugged backend the evaluated value is unavailable;
            // report the static type each result would have.
            for ty in &outcome.result_types {
                writeln!(output, "result type: {}", ty)?;
            }
        }
        Ok(())
    }

    fn remember(&mut self, line: &str) {
        self.history.push(line.to_owned());
        if let Some(path) = &self.history_path {
            if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
                let _ = writeln!(file, "{}", line);
            }
        }
    }
}

impl Default for Repl {
    fn default() -> Self {
        Self::new()
    }
}

fn history_file_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".anode_history"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run_lines(lines: &str) -> String {
        let mut repl = Repl::new();
        repl.history_path = None; // keep tests off the real history file
        let mut input = Cursor::new(lines.as_bytes().to_vec());
        let mut output = Vec::new();
        repl.run(&mut input, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_greeting_and_exit() {
        let out = run_lines("/exit\n");
        assert!(out.contains("Welcome to the anode REPL."));
    }

    #[test]
    fn test_help_lists_commands() {
        let out = run_lines("/help\n/exit\n");
        assert!(out.contains("/compile"));
        assert!(out.contains("/history"));
    }

    #[test]
    fn test_statement_reports_result_type() {
        let out = run_lines("1 + 2 * 3;\n/exit\n");
        assert!(out.contains("result type: int"));
    }

    #[test]
    fn test_state_persists_across_lines() {
        let out = run_lines("foo:int = 100;\nfoo + 2;\n/exit\n");
        assert_eq!(out.matches("result type: int").count(), 2);
        assert!(!out.contains("error"));
    }

    #[test]
    fn test_error_reported_and_prompt_returns() {
        let out = run_lines("nope;\n1;\n/exit\n");
        assert!(out.contains("error"));
        assert!(out.contains("result type: int"));
    }

    #[test]
    fn test_history_echoed() {
        let out = run_lines("1;\n/history\n/exit\n");
        assert!(out.contains("1;"));
    }

    #[test]
    fn test_compile_toggle() {
        let out = run_lines("/compile\n1;\n/exit\n");
        assert!(out.contains("compilation disabled"));
        assert!(!out.contains("result type"));
    }
}
