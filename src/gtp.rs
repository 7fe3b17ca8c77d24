//! Go Text Protocol (GTP) front end.
//!
//! GTP is a text-based protocol for communicating with Go-playing programs.
//! This module implements the subset of GTP version 2 needed to play games
//! through graphical interfaces like Sabaki or GoGui.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `protocol_version`
//! - `list_commands`, `known_command <cmd>`
//! - `quit`
//! - `boardsize <size>` - Only the compiled board size is accepted
//! - `clear_board`
//! - `komi <value>`
//! - `play <color> <vertex>`
//! - `genmove <color>` - Answers `resign` when the game looks lost
//! - `showboard`
//! - `final_score` - Quick area estimate, all stones counted alive
//!
//! ## Example
//!
//! ```ignore
//! use montecasino::gtp::GtpEngine;
//! let mut engine = GtpEngine::new();
//! engine.run()?;
//! ```

use std::io::{self, BufRead, Write};

use log::debug;

use crate::board::{Color, Move};
use crate::constants::{N, PASS_MOVE};
use crate::engine::{EngineParams, select_move};
use crate::hint::DomainHint;
use crate::position::{Position, empty_position, fast_score, parse_coord, play_move, str_coord};

/// The list of known GTP commands.
const KNOWN_COMMANDS: &[&str] = &[
    "boardsize",
    "clear_board",
    "final_score",
    "genmove",
    "known_command",
    "komi",
    "list_commands",
    "name",
    "play",
    "protocol_version",
    "quit",
    "showboard",
    "version",
];

/// GTP engine state.
pub struct GtpEngine {
    /// Current game position
    pos: Position,
    /// Engine parameters used for every genmove
    params: EngineParams,
    hint: DomainHint,
}

impl Default for GtpEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GtpEngine {
    /// Create a new GTP engine with default settings.
    pub fn new() -> Self {
        Self::with_params(EngineParams::default())
    }

    /// Create a new GTP engine with the given engine parameters.
    pub fn with_params(params: EngineParams) -> Self {
        let hint = DomainHint::from_params(&params);
        Self {
            pos: Position::new(),
            params,
            hint,
        }
    }

    /// Run the GTP command loop on stdin and stdout.
    pub fn run(&mut self) -> anyhow::Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run_with(stdin.lock(), stdout.lock())
    }

    /// Run the GTP command loop until `quit` or end of input.
    pub fn run_with<R: BufRead, O: Write>(&mut self, input: R, mut output: O) -> anyhow::Result<()> {
        for line in input.lines() {
            let line = line?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            if parts.is_empty() {
                continue;
            }

            let command = parts[0].to_lowercase();
            let args = &parts[1..];
            debug!("gtp <- {command_line}");

            let (success, message) = self.execute(&command, args);
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();

            write!(output, "{prefix}{id_str} {message}\n\n")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command ID from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        if end > 0 {
            if let Ok(id) = trimmed[..end].parse::<u32>() {
                return (Some(id), trimmed[end..].trim());
            }
        }
        (None, trimmed)
    }

    /// Execute a GTP command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, "montecasino".to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => (true, "2".to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                let Some(cmd) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let known = KNOWN_COMMANDS.contains(&cmd.to_lowercase().as_str());
                (true, known.to_string())
            }

            "quit" => (true, String::new()),

            "boardsize" => match args.first().map(|a| a.parse::<usize>()) {
                None => (false, "missing argument".to_string()),
                Some(Ok(size)) if size == N => (true, String::new()),
                Some(Ok(_)) => (false, "unacceptable size".to_string()),
                Some(Err(_)) => (false, "invalid size".to_string()),
            },

            "clear_board" => {
                empty_position(&mut self.pos);
                (true, String::new())
            }

            "komi" => match args.first().map(|a| a.parse::<f32>()) {
                None => (false, "missing argument".to_string()),
                Some(Ok(komi)) => {
                    self.pos.komi = komi;
                    (true, String::new())
                }
                Some(Err(_)) => (false, "invalid komi".to_string()),
            },

            "play" => {
                if args.len() < 2 {
                    return (false, "missing arguments".to_string());
                }
                let Some(color) = Color::parse(args[0]) else {
                    return (false, "invalid color".to_string());
                };
                let pt = parse_coord(args[1]);
                if pt == PASS_MOVE && !args[1].eq_ignore_ascii_case("pass") {
                    return (false, "invalid vertex".to_string());
                }
                match play_move(&mut self.pos, Move::new(pt, color)) {
                    Ok(()) => (true, String::new()),
                    Err(e) => (false, e.to_string()),
                }
            }

            "genmove" => {
                let Some(color) = args.first().and_then(|a| Color::parse(a)) else {
                    return (false, "invalid color".to_string());
                };

                let decision = select_move(&self.pos, color, &self.params, &self.hint);
                if decision.is_resign() {
                    return (true, "resign".to_string());
                }
                match play_move(&mut self.pos, Move::new(decision.point, color)) {
                    Ok(()) => (true, str_coord(decision.point)),
                    Err(e) => (false, e.to_string()),
                }
            }

            "showboard" => (true, format!("\n{}", self.pos)),

            "final_score" => {
                let score = fast_score(&self.pos);
                let text = if score > 0.0 {
                    format!("W+{score:.1}")
                } else if score < 0.0 {
                    format!("B+{:.1}", -score)
                } else {
                    "0".to_string()
                };
                (true, text)
            }

            _ => (false, format!("unknown command: {command}")),
        }
    }
}
