//! Turn driver: feeds snapshots into the world and emits the chosen commands.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use code_royale_core::{SiteLayout, TurnCommands, TurnSnapshot};
use code_royale_system_queen::QueenPolicy;
use code_royale_system_training::Training;
use code_royale_world::{self as world, World, WorldError};

use crate::{
    protocol::{self, Reader},
    report::TurnReport,
};

/// Owns the world and the decision systems for one game.
#[derive(Debug)]
pub(crate) struct Driver {
    world: World,
    queen: QueenPolicy,
    training: Training,
    turn: usize,
}

impl Driver {
    /// Creates a driver for the announced site layout.
    pub(crate) fn new(layouts: Vec<SiteLayout>) -> Self {
        Self {
            world: World::new(layouts),
            queen: QueenPolicy::new(),
            training: Training::default(),
            turn: 0,
        }
    }

    /// Absorbs one snapshot and decides both command lines for it.
    pub(crate) fn play_turn(
        &mut self,
        snapshot: TurnSnapshot,
    ) -> Result<(TurnCommands, TurnReport), WorldError> {
        world::apply(&mut self.world, snapshot)?;

        let decision = self.queen.decide(&self.world);
        let commands = TurnCommands {
            queen: decision.action,
            train: self.training.decide(&self.world),
        };
        let report = TurnReport::capture(self.turn, &self.world, &decision, &commands);
        if world::query::enemy_tower_within_range(&self.world) {
            tracing::warn!(turn = self.turn, "queen is inside enemy tower range");
        }

        self.turn += 1;
        Ok((commands, report))
    }

    /// Number of turns played so far.
    pub(crate) const fn turns(&self) -> usize {
        self.turn
    }
}

/// Plays the game read from `input`, writing commands to `output`.
///
/// When `reports` is provided, a JSON turn report is written to it after each
/// turn. Returns the number of turns played once input ends between turns.
pub(crate) fn run<R, W>(input: R, mut output: W, mut reports: Option<&mut dyn Write>) -> Result<usize>
where
    R: BufRead,
    W: Write,
{
    let mut reader = Reader::new(input);
    let layouts = reader
        .read_layouts()
        .context("failed to read the site layout")?;
    let site_count = layouts.len();
    tracing::debug!(site_count, "site layout received");

    let mut driver = Driver::new(layouts);
    loop {
        let turn = driver.turns();
        let Some(snapshot) = reader
            .read_turn(site_count)
            .with_context(|| format!("failed to read turn {turn}"))?
        else {
            break;
        };

        let (commands, report) = driver
            .play_turn(snapshot)
            .with_context(|| format!("failed to apply turn {turn}"))?;
        protocol::write_commands(&mut output, &commands)
            .with_context(|| format!("failed to write commands for turn {turn}"))?;

        if let Some(sink) = reports.as_mut() {
            let line = report.to_json_line().context("failed to encode turn report")?;
            writeln!(sink, "{line}").context("failed to write turn report")?;
        }
    }

    Ok(driver.turns())
}
