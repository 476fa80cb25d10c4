//! Client for the external solve-one-decision engine.
//!
//! The engine takes a JSON spot description on stdin and answers with the
//! legal-action summary plus an action distribution on stdout. Nothing here
//! evaluates the spot; this module only moves JSON across the process
//! boundary and types the answer.

use std::env;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{ChildStdin, Command, Stdio};
use std::thread;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming the engine binary.
pub const CLI_ENV_VAR: &str = "QUASAR_CLI";

/// Default location of the engine binary relative to the working directory.
pub const DEFAULT_CLI_PATH: &str = "build/engine/quasar_cli";

/// Errors raised while talking to the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No engine binary could be located.
    #[error("solver binary not found; set QUASAR_CLI or pass an explicit path")]
    NotFound,
    /// Spawning or talking to the process failed.
    #[error("solver I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// The engine exited non-zero.
    #[error("solver exited with status {status}: {stderr}")]
    SolverFailed {
        /// Exit code, if the process was not killed by a signal.
        status: String,
        /// Captured standard error.
        stderr: String,
    },
    /// The request or response was not the expected JSON.
    #[error("solver JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Betting street of a spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Street {
    /// No board cards.
    #[default]
    Preflop,
    /// Three board cards.
    Flop,
    /// Four board cards.
    Turn,
    /// Five board cards.
    River,
}

/// Public description of one decision point, in the engine's schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spot {
    /// Current betting street.
    pub street: Street,
    /// Small blind, 1.0 when absent.
    #[serde(default = "default_sb")]
    pub sb: f64,
    /// Big blind, 2.0 when absent.
    #[serde(default = "default_bb")]
    pub bb: f64,
    /// Per-player ante.
    #[serde(default)]
    pub ante: f64,
    /// Seat index of the player to act.
    #[serde(default)]
    pub to_act: usize,
    /// Seat index of the button.
    #[serde(default)]
    pub button: usize,
    /// Remaining stack per seat.
    pub stacks: Vec<f64>,
    /// Chips each seat has put in over the whole hand.
    pub committed_total: Vec<f64>,
    /// Chips each seat has put in on this street.
    pub committed_on_street: Vec<f64>,
    /// Size of the last full raise on this street.
    #[serde(default)]
    pub last_raise_size: f64,
    /// Board card ids.
    #[serde(default)]
    pub board: Vec<i32>,
    /// "BigBlind" or "OneChip"; engine default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_bet_rule: Option<String>,
}

fn default_sb() -> f64 {
    1.0
}

fn default_bb() -> f64 {
    2.0
}

/// Action codes used on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    /// Code 0.
    Fold,
    /// Code 1.
    Check,
    /// Code 2.
    Call,
    /// Code 3.
    Bet,
    /// Code 4.
    Raise,
    /// Code 5.
    AllIn,
}

impl ActionType {
    /// Decode a wire action code.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(ActionType::Fold),
            1 => Some(ActionType::Check),
            2 => Some(ActionType::Call),
            3 => Some(ActionType::Bet),
            4 => Some(ActionType::Raise),
            5 => Some(ActionType::AllIn),
            _ => None,
        }
    }

    /// Wire action code.
    pub fn code(&self) -> i32 {
        match self {
            ActionType::Fold => 0,
            ActionType::Check => 1,
            ActionType::Call => 2,
            ActionType::Bet => 3,
            ActionType::Raise => 4,
            ActionType::AllIn => 5,
        }
    }
}

/// Legal bet or raise targets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RaiseBounds {
    /// Smallest legal total after the action.
    pub min_to: f64,
    /// Largest legal total after the action.
    pub max_to: f64,
}

/// A concrete action as the engine reports it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineAction {
    /// Wire action code, see [`ActionType`].
    #[serde(rename = "type")]
    pub code: i32,
    /// Chip amount; the "to" total for bets and raises.
    #[serde(default)]
    pub amount: f64,
}

impl EngineAction {
    /// Decoded action type, `None` for unknown codes.
    pub fn kind(&self) -> Option<ActionType> {
        ActionType::from_code(self.code)
    }
}

/// An action with its probability.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightedAction {
    /// The action.
    #[serde(flatten)]
    pub action: EngineAction,
    /// Probability of taking it.
    pub prob: f64,
}

/// Legal-action summary for the player to act.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegalSummary {
    /// Checking is legal.
    pub can_check: bool,
    /// Folding is legal.
    pub can_fold: bool,
    /// Chips needed to call, 0.0 when nothing is owed.
    pub call_amount: f64,
    /// Bet range when no bet is facing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bet: Option<RaiseBounds>,
    /// Raise range when a bet is facing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raise: Option<RaiseBounds>,
    /// Discretized candidate actions.
    #[serde(default)]
    pub suggestions: Vec<EngineAction>,
}

/// Engine answer for one spot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveResponse {
    /// What the player to act may do.
    pub legal: LegalSummary,
    /// Action distribution over the suggestions.
    #[serde(default)]
    pub uniform_actions: Vec<WeightedAction>,
}

/// Anything that can answer a spot.
pub trait SpotSolver {
    /// Solve a spot given as raw JSON, returning raw JSON.
    fn solve_json(&self, payload: &str) -> Result<String, EngineError>;

    /// Solve a typed spot.
    fn solve_one_move(&self, spot: &Spot) -> Result<SolveResponse, EngineError> {
        let payload = serde_json::to_string(spot)?;
        let out = self.solve_json(&payload)?;
        Ok(serde_json::from_str(&out)?)
    }
}

/// Engine reached by spawning its command line binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliSolver {
    program: PathBuf,
    args: Vec<String>,
}

impl CliSolver {
    /// Use the binary at `program`.
    pub fn new<P: Into<PathBuf>>(program: P) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Builder method: extra arguments passed before the payload is piped in.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Locate the engine via `QUASAR_CLI`, then the default build path.
    pub fn discover() -> Result<Self, EngineError> {
        let mut candidates = Vec::new();
        if let Some(path) = env::var_os(CLI_ENV_VAR) {
            candidates.push(PathBuf::from(path));
        }
        if let Ok(cwd) = env::current_dir() {
            candidates.push(cwd.join(DEFAULT_CLI_PATH));
        }
        candidates
            .into_iter()
            .find(|p| is_executable(p))
            .map(Self::new)
            .ok_or(EngineError::NotFound)
    }

    /// Path of the binary.
    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl SpotSolver for CliSolver {
    fn solve_json(&self, payload: &str) -> Result<String, EngineError> {
        log::debug!("invoking {}", self.program.display());
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // The solver may write, or exit, before it has read all of stdin.
        let stdin = child.stdin.take();
        let (output, written) = thread::scope(|s| {
            let writer = s.spawn(move || write_payload(stdin, payload.as_bytes()));
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")));
            (output, written)
        });
        let output = output?;

        if !output.status.success() {
            let status = output
                .status
                .code()
                .map_or_else(|| "signal".to_string(), |c| c.to_string());
            return Err(EngineError::SolverFailed {
                status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        written?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Write the whole payload and close stdin. A solver that exits early
/// closes the pipe; that is reported through its exit status instead.
fn write_payload(stdin: Option<ChildStdin>, payload: &[u8]) -> io::Result<()> {
    let Some(mut stdin) = stdin else {
        return Ok(());
    };
    match stdin.write_all(payload) {
        Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
