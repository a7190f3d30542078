//! Plain-terminal printer for output log entries (owo-colors).

use std::io::{self, Write};

use owo_colors::OwoColorize;

use crate::console::OutputLog;

#[derive(Debug, Clone, Copy, Default)]
pub struct LogPrinter {
    pub color: bool,
}

impl LogPrinter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn format_entry(&self, entry: &str) -> String {
        if !self.color {
            return entry.to_string();
        }
        if entry.starts_with("> ") {
            format!("{}", entry.green())
        } else if entry.starts_with("Error: ") {
            format!("{}", entry.red())
        } else {
            entry.to_string()
        }
    }

    /// Write entries from index `from` onwards. Returns the new high-water mark.
    pub fn print_new<W: Write>(&self, log: &OutputLog, from: usize, out: &mut W) -> io::Result<usize> {
        for entry in log.entries().iter().skip(from) {
            writeln!(out, "{}", self.format_entry(entry))?;
        }
        out.flush()?;
        Ok(log.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_new_only_writes_unseen_entries() {
        let mut log = OutputLog::new();
        log.append("> GET a");
        log.append("1");
        let printer = LogPrinter::new(false);
        let mut out = Vec::new();
        let mark = printer.print_new(&log, 0, &mut out).unwrap();
        assert_eq!(mark, 2);

        log.append("> KEYS");
        let mark = printer.print_new(&log, mark, &mut out).unwrap();
        assert_eq!(mark, 3);
        assert_eq!(String::from_utf8(out).unwrap(), "> GET a\n1\n> KEYS\n");
    }

    #[test]
    fn test_color_only_touches_echo_and_errors() {
        let printer = LogPrinter::new(true);
        assert_eq!(printer.format_entry("plain"), "plain");
        assert_ne!(printer.format_entry("> SET a 1"), "> SET a 1");
        assert!(printer.format_entry("Error: boom").contains("Error: boom"));
    }
}
