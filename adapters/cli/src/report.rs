//! Per-turn JSON report written to stderr on request.

use code_royale_core::TurnCommands;
use code_royale_system_queen::QueenDecision;
use code_royale_world::{query, World};
use serde::Serialize;

/// Summary of one turn's inputs and decisions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub(crate) struct TurnReport {
    turn: usize,
    gold: i32,
    gold_per_minute: i32,
    rule: &'static str,
    mode: String,
    queen: String,
    train: String,
    exposed_to_tower: bool,
}

impl TurnReport {
    /// Captures the report for a turn after its commands were chosen.
    pub(crate) fn capture(
        turn: usize,
        world: &World,
        decision: &QueenDecision,
        commands: &TurnCommands,
    ) -> Self {
        Self {
            turn,
            gold: query::gold(world),
            gold_per_minute: query::gold_per_minute(world),
            rule: decision.rule,
            mode: decision.mode.to_string(),
            queen: commands.queen.to_string(),
            train: commands.train.to_string(),
            exposed_to_tower: query::enemy_tower_within_range(world),
        }
    }

    /// Renders the report as a single JSON line.
    pub(crate) fn to_json_line(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
