//! Boundary to the host shell
//!
//! The core never draws and never shows dialogs. After every tick it hands a
//! [`Frame`] to a [`RenderSink`]; once per finished session it hands a
//! [`TerminalSummary`] to a [`TerminalListener`]. Closures implement both.

use serde::{Deserialize, Serialize};

use crate::sim::{GameId, Outcome, Phase, Snapshot, TerminalCause};

/// What a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub phase: Phase,
    /// Best single-player score on record (None for versus games)
    pub high_score: Option<u64>,
    pub snapshot: Snapshot,
}

/// End-of-session report for the shell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminalSummary {
    pub game: GameId,
    /// Display names, player 1 first
    pub players: Vec<String>,
    pub outcome: Outcome,
    pub cause: TerminalCause,
    /// High score after this session (None for versus games)
    pub high_score: Option<u64>,
    /// The session beat the previous high score
    pub new_high_score: bool,
}

impl TerminalSummary {
    /// One-line human readable result, e.g. for a dialog or a log line
    pub fn headline(&self) -> String {
        match self.outcome {
            Outcome::Winner { side, score } => {
                let name = self
                    .players
                    .get(side.index())
                    .map(String::as_str)
                    .unwrap_or("Unknown");
                format!("{} wins {}-{}", name, score.player1, score.player2)
            }
            Outcome::Final { score, level, length } => {
                let name = self.players.first().map(String::as_str).unwrap_or("Player");
                let mut line = format!("{} scored {}", name, score);
                if let Some(level) = level {
                    line.push_str(&format!(" (level {})", level));
                }
                if let Some(length) = length {
                    line.push_str(&format!(" (length {})", length));
                }
                if self.new_high_score {
                    line.push_str(" - new high score!");
                }
                line
            }
        }
    }
}

/// Consumes one frame per tick
pub trait RenderSink {
    fn present(&mut self, frame: &Frame);
}

impl<F: FnMut(&Frame)> RenderSink for F {
    fn present(&mut self, frame: &Frame) {
        self(frame)
    }
}

/// Receives the terminal summary, at most once per session
pub trait TerminalListener {
    fn on_terminal(&mut self, summary: &TerminalSummary);
}

impl<F: FnMut(&TerminalSummary)> TerminalListener for F {
    fn on_terminal(&mut self, summary: &TerminalSummary) {
        self(summary)
    }
}
