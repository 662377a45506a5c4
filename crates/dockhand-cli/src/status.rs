use std::io::{IsTerminal, Write};

use dockhand_machine::ProgressSink;

/// Single-line status reporter: `start` opens a line, `succeed`/`fail`
/// close it with a verdict mark. On a terminal the open line is
/// rewritten in place; piped output stays line-oriented.
pub struct StatusLine {
    tty: bool,
}

impl StatusLine {
    pub fn new() -> Self {
        Self {
            tty: std::io::stdout().is_terminal(),
        }
    }

    pub fn start(&mut self, msg: &str) {
        if self.tty {
            print!("- {msg}");
            let _ = std::io::stdout().flush();
        } else {
            println!("- {msg}");
        }
    }

    pub fn succeed(&mut self, msg: &str) {
        self.wipe();
        println!("✓ {msg}");
    }

    pub fn fail(&mut self, msg: &str) {
        self.wipe();
        eprintln!("✗ {msg}");
    }

    /// Return to column 0 and clear any open status line.
    fn wipe(&self) {
        if self.tty {
            print!("\r\x1b[2K");
            let _ = std::io::stdout().flush();
        }
    }
}

impl Default for StatusLine {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders build progress as an in-place `label [step/total]` line.
pub struct TermProgress {
    tty: bool,
    label: String,
    total: u64,
    open: bool,
}

impl TermProgress {
    pub fn new() -> Self {
        Self {
            tty: std::io::stdout().is_terminal(),
            label: String::new(),
            total: 0,
            open: false,
        }
    }
}

impl Default for TermProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for TermProgress {
    fn begin(&mut self, label: &str, total: u64) {
        self.label = label.to_owned();
        self.total = total;
        self.open = true;
    }

    fn set(&mut self, step: u64) {
        if !self.open {
            return;
        }
        if self.tty {
            print!("\r\x1b[2K{} [{}/{}]", self.label, step, self.total);
            let _ = std::io::stdout().flush();
        } else {
            println!("{} [{}/{}]", self.label, step, self.total);
        }
    }

    fn clear(&mut self) {
        if self.open {
            if self.tty {
                print!("\r\x1b[2K");
                let _ = std::io::stdout().flush();
            }
            self.open = false;
        }
    }
}

impl Drop for TermProgress {
    fn drop(&mut self) {
        self.clear();
    }
}
