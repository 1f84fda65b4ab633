//! # Interactive loop
//! Line-per-turn terminal session. Owns its ledger for the lifetime of the loop.
//!
//! Commands (case-insensitive, surrounding whitespace ignored):
//! - `quit` — end the session
//! - `:history` — show the last analyses
//! - `:clear` — empty the history
//!
//! Anything else is analysed.

use std::io::{BufRead, Write};

use anyhow::Context;
use tracing::info;

use crate::engine;
use crate::history::HistoryLedger;
use crate::presentation::{render_history_text, render_text};
use crate::sentiment::PolarityScorer;

const BANNER: &str = "============================================================";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Quit,
    History,
    Clear,
    Analyze,
}

fn parse_command(line: &str) -> Command {
    let t = line.trim();
    if t.eq_ignore_ascii_case("quit") {
        Command::Quit
    } else if t.eq_ignore_ascii_case(":history") {
        Command::History
    } else if t.eq_ignore_ascii_case(":clear") {
        Command::Clear
    } else {
        Command::Analyze
    }
}

pub struct Repl<'a> {
    scorer: &'a dyn PolarityScorer,
    ledger: HistoryLedger,
    preview_chars: usize,
}

impl<'a> Repl<'a> {
    pub fn new(scorer: &'a dyn PolarityScorer, preview_chars: usize) -> Self {
        Self {
            scorer,
            ledger: HistoryLedger::new(),
            preview_chars: preview_chars.max(1),
        }
    }

    pub fn ledger(&self) -> &HistoryLedger {
        &self.ledger
    }

    /// Run until `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut out: W) -> anyhow::Result<()> {
        writeln!(out, "{BANNER}")?;
        writeln!(out, "Sentiment Analysis - Interactive")?;
        writeln!(out, "{BANNER}")?;
        writeln!(
            out,
            "\nEnter text to analyze (':history', ':clear', or 'quit' to exit):"
        )?;

        let mut lines = input.lines();
        loop {
            write!(out, "\nText: ")?;
            out.flush()?;

            let Some(line) = lines.next() else {
                writeln!(out)?;
                break;
            };
            let line = line.context("reading input line")?;

            match parse_command(&line) {
                Command::Quit => {
                    writeln!(out, "\nExiting sentiment analyzer. Goodbye!")?;
                    break;
                }
                Command::History => {
                    write!(
                        out,
                        "\n{}",
                        render_history_text(&self.ledger.entries(), self.preview_chars)
                    )?;
                }
                Command::Clear => {
                    self.ledger.clear();
                    crate::metrics::record_clear();
                    writeln!(out, "\nHistory cleared.")?;
                }
                Command::Analyze => {
                    match engine::analyze(self.scorer, &mut self.ledger, &line) {
                        Ok(a) => write!(out, "\n{}", render_text(&a))?,
                        Err(e) if e.is_empty_input() => {
                            writeln!(out, "\nWarning: please enter some text to analyze ({e}).")?
                        }
                        Err(e) => writeln!(out, "\nError: {e}")?,
                    }
                }
            }
        }

        info!(analyses = self.ledger.len(), "session finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::LexiconScorer;
    use std::io::Cursor;

    fn run_script(script: &str) -> (String, usize) {
        let scorer = LexiconScorer::embedded();
        let mut repl = Repl::new(&scorer, 100);
        let mut out = Vec::new();
        repl.run(Cursor::new(script.to_string()), &mut out).unwrap();
        (String::from_utf8(out).unwrap(), repl.ledger().len())
    }

    #[test]
    fn commands_parse_case_insensitively() {
        assert_eq!(parse_command("QUIT"), Command::Quit);
        assert_eq!(parse_command("  Quit \r"), Command::Quit);
        assert_eq!(parse_command(":History"), Command::History);
        assert_eq!(parse_command(":CLEAR"), Command::Clear);
        assert_eq!(parse_command("quit it now"), Command::Analyze);
    }

    #[test]
    fn quit_stops_before_remaining_lines() {
        let (out, n) = run_script("I love it!\nQuit\nthis is terrible\n");
        assert!(out.contains(">>> SENTIMENT LABEL: POSITIVE <<<"));
        assert!(out.contains("Goodbye!"));
        assert!(!out.contains("NEGATIVE"));
        assert_eq!(n, 1);
    }

    #[test]
    fn empty_line_warns_without_recording() {
        let (out, n) = run_script("   \nquit\n");
        assert!(out.contains("Warning: please enter some text"));
        assert_eq!(n, 0);
    }

    #[test]
    fn history_and_clear_commands() {
        let (out, n) = run_script("good day\nawful day\n:history\n:clear\n:history\n");
        assert!(out.contains("#1 - Negative"));
        assert!(out.contains("#2 - Positive"));
        assert!(out.contains("History cleared."));
        assert!(out.contains("No analysis history yet"));
        assert_eq!(n, 0);
    }

    #[test]
    fn end_of_input_ends_session() {
        let (_, n) = run_script("one\ntwo\nthree\nfour\nfive\nsix\nseven");
        assert_eq!(n, 5);
    }
}
