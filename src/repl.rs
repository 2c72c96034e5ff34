// File: src/repl.rs
//
// Interactive REPL for P-Logo.
// Each complete input is compiled and run against one persistent machine, so
// functions, variables and the turtle pose carry over between inputs.
// - Multi-line input while braces or parentheses are unclosed
// - Command history with up/down arrow navigation
// - Special commands (:help, :reset, :vars, :fns, :pose, :lines, :quit)
// - Errors are printed and the machine stays usable

use crate::ast::Builtin;
use crate::errors::LogoError;
use crate::vm::Machine;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// REPL session that owns the machine and handles user interaction
pub struct Repl {
    machine: Machine,
    editor: DefaultEditor,
}

impl Repl {
    pub fn new(machine: Machine) -> Result<Self, ReadlineError> {
        let editor = DefaultEditor::new()?;
        Ok(Repl { machine, editor })
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    fn show_banner(&self) {
        println!("{}", format!("P-Logo REPL v{}", env!("CARGO_PKG_VERSION")).bright_cyan().bold());
        println!(
            "  Type {} for commands or {} to exit",
            ":help".bright_yellow(),
            ":quit".bright_yellow()
        );
        println!();
    }

    /// Starts the REPL loop
    pub fn run(&mut self) -> Result<(), ReadlineError> {
        self.show_banner();

        let mut buffer = String::new();

        loop {
            let prompt = if buffer.is_empty() {
                "plogo> ".bright_green().to_string()
            } else {
                "  ...> ".bright_blue().to_string()
            };

            match self.editor.readline(&prompt) {
                Ok(line) => {
                    let _ = self.editor.add_history_entry(line.as_str());

                    // Commands are only recognised outside multi-line input
                    if buffer.is_empty() && line.trim().starts_with(':') {
                        if self.handle_command(line.trim()) {
                            continue;
                        } else {
                            break;
                        }
                    }

                    buffer.push_str(&line);
                    buffer.push('\n');

                    if is_input_complete(&buffer) {
                        self.eval_input(&buffer);
                        buffer.clear();
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("{}", "^C (:quit to exit)".bright_yellow());
                    buffer.clear();
                }
                Err(ReadlineError::Eof) => {
                    println!("{}", "Goodbye!".bright_cyan());
                    break;
                }
                Err(err) => return Err(err),
            }
        }

        Ok(())
    }

    /// Handles special REPL commands starting with ':'
    /// Returns true to continue REPL, false to quit
    fn handle_command(&mut self, cmd: &str) -> bool {
        match cmd {
            ":help" | ":h" => self.show_help(),
            ":quit" | ":q" | ":exit" => {
                println!("{}", "Goodbye!".bright_cyan());
                return false;
            }
            ":reset" | ":r" => {
                self.machine.soft_reset();
                println!("{}", "Machine reset (root variables kept)".bright_green());
            }
            ":hard-reset" => {
                self.machine.hard_reset();
                println!("{}", "Machine reset".bright_green());
            }
            ":vars" | ":v" => self.show_variables(),
            ":fns" => self.show_functions(),
            ":pose" | ":p" => {
                let pose = self.machine.pose();
                println!(
                    "  x = {:.2}  y = {:.2}  angle = {:.2}  pen {}",
                    pose.x,
                    pose.y,
                    pose.angle,
                    if self.machine.is_pen_down() { "down" } else { "up" }
                );
            }
            ":lines" => {
                for (i, line) in self.machine.history().iter().enumerate() {
                    println!(
                        "  {:>4}  ({:.2}, {:.2}) -> ({:.2}, {:.2})  width {}",
                        i, line.from.x, line.from.y, line.to.x, line.to.y, line.thickness
                    );
                }
                println!("  {} segment(s)", self.machine.history().len());
            }
            _ => {
                println!(
                    "{} Unknown command: {}. Type {} for available commands.",
                    "Error:".bright_red(),
                    cmd.bright_yellow(),
                    ":help".bright_yellow()
                );
            }
        }
        true
    }

    fn show_help(&self) {
        println!();
        println!("{}", "REPL Commands:".bright_cyan().bold());
        println!("  {}   Display this help message", ":help".bright_yellow());
        println!("  {}   Exit the REPL", ":quit".bright_yellow());
        println!("  {}  Reset the machine, keeping root variables", ":reset".bright_yellow());
        println!("  {}  Reset everything", ":hard-reset".bright_yellow());
        println!("  {}   Show root-frame variables", ":vars".bright_yellow());
        println!("  {}    Show user functions", ":fns".bright_yellow());
        println!("  {}   Show the turtle pose", ":pose".bright_yellow());
        println!("  {}  List drawn segments", ":lines".bright_yellow());
        println!();
        println!("{}", "Built-in functions:".bright_cyan().bold());
        println!("  {}", Builtin::catalogue().join(", ").dimmed());
        println!();
        println!("{}", "Multi-line Input:".bright_cyan().bold());
        println!("  Leave braces or parentheses unclosed to continue on the next line.");
        println!();
    }

    fn show_variables(&self) {
        let vars = self.machine.root_variables();
        if vars.is_empty() {
            println!("  {}", "(no variables)".dimmed());
        }
        for (name, value) in vars {
            println!("  {} = {}", name.bright_yellow(), value);
        }
        for binding in self.machine.int_var_bindings() {
            println!(
                "  {} {} in [{}, {}]",
                "intvar".dimmed(),
                binding.name,
                binding.range.min,
                binding.range.max
            );
        }
        for binding in self.machine.float_var_bindings() {
            println!(
                "  {} {} in [{}, {}]",
                "floatvar".dimmed(),
                binding.name,
                binding.range.min,
                binding.range.max
            );
        }
    }

    fn show_functions(&self) {
        let names = self.machine.function_names();
        if names.is_empty() {
            println!("  {}", "(no functions)".dimmed());
        } else {
            println!("  {}", names.join(", "));
        }
    }

    /// Compiles and runs one complete input; errors are printed, not fatal
    pub fn eval_input(&mut self, input: &str) -> Option<LogoError> {
        if input.trim().is_empty() {
            return None;
        }

        let printed_before = self.machine.messages().len();
        let result = crate::compile_and_run(input, &mut self.machine);

        for message in self.machine.messages().iter().skip(printed_before) {
            println!("{} {}", "=>".bright_blue(), message);
        }

        match result {
            Ok(()) => None,
            Err(err) => {
                println!("{}", err);
                Some(err)
            }
        }
    }
}

/// Checks if the input is syntactically complete
/// Returns true if all braces/parentheses are balanced outside strings and comments
pub fn is_input_complete(input: &str) -> bool {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return true;
    }

    let mut brace_count = 0;
    let mut paren_count = 0;
    let mut in_string = false;
    let mut escape_next = false;
    let mut in_comment = false;

    for ch in trimmed.chars() {
        if in_comment {
            if ch == '\n' {
                in_comment = false;
            }
            continue;
        }

        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '#' if !in_string => in_comment = true,
            '{' if !in_string => brace_count += 1,
            '}' if !in_string => brace_count -= 1,
            '(' if !in_string => paren_count += 1,
            ')' if !in_string => paren_count -= 1,
            _ => {}
        }
    }

    // Over-closed input is "complete" so the parser can report it
    !in_string && brace_count <= 0 && paren_count <= 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_completeness() {
        assert!(is_input_complete("f(10)"));
        assert!(is_input_complete(""));
        assert!(!is_input_complete("loop(4) {"));
        assert!(!is_input_complete("loop(4) {\n f(10)"));
        assert!(is_input_complete("loop(4) {\n f(10)\n}"));
        assert!(!is_input_complete("debug(\"open"));
        assert!(is_input_complete("debug(\"{ not a brace\")"));
        assert!(is_input_complete("f(1) # comment with {"));
        assert!(is_input_complete("}"));
    }
}
