#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure training system that selects the barracks to train from this turn.

use code_royale_core::{CreepKind, Site, TrainDirective};
use code_royale_world::{
    query::{self, Tally, GIANT_GPM_THRESHOLD},
    World,
};

/// Live knights at which knight barracks stop training.
pub const KNIGHT_CAP: usize = 12;
/// Live archers at which archer barracks stop training.
pub const ARCHER_CAP: usize = 3;
/// Live giants at which giant barracks stop training.
pub const GIANT_CAP: usize = 1;

/// Creep caps applied when choosing barracks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    knight_cap: usize,
    archer_cap: usize,
    giant_cap: usize,
}

impl Config {
    /// Creates a configuration with explicit per-kind caps.
    #[must_use]
    pub const fn new(knight_cap: usize, archer_cap: usize, giant_cap: usize) -> Self {
        Self {
            knight_cap,
            archer_cap,
            giant_cap,
        }
    }

    const fn cap(&self, kind: CreepKind) -> usize {
        match kind {
            CreepKind::Knight => self.knight_cap,
            CreepKind::Archer => self.archer_cap,
            CreepKind::Giant => self.giant_cap,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(KNIGHT_CAP, ARCHER_CAP, GIANT_CAP)
    }
}

/// Stateless system producing the per-turn training directive.
#[derive(Clone, Copy, Debug, Default)]
pub struct Training {
    config: Config,
}

impl Training {
    /// Creates the training system using the supplied caps.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Scans own idle barracks in site order and lists those that should train.
    ///
    /// While the enemy queen is critically weak, the first idle knight barracks
    /// becomes the entire directive.
    #[must_use]
    pub fn decide(&self, world: &World) -> TrainDirective {
        let idle: Vec<&Site> = query::sites(world)
            .iter()
            .filter(|site| site.is_owned_by_self() && site.is_barracks() && !site.is_training())
            .collect();

        if query::enemy_queen_critically_weak(world) {
            if let Some(barracks) = idle.iter().find(|site| site.trains_knight()) {
                tracing::debug!(site = %barracks, "knight rush on weakened enemy queen");
                return TrainDirective::from(vec![barracks.id()]);
            }
        }

        let gold_per_minute = query::gold_per_minute(world);
        let mut directive = TrainDirective::new();
        for barracks in idle {
            let Some(kind) = trained_kind(barracks) else {
                continue;
            };
            if kind == CreepKind::Giant && gold_per_minute <= GIANT_GPM_THRESHOLD {
                continue;
            }
            if query::has_at_least(world, creep_tally(kind), self.config.cap(kind)) {
                continue;
            }
            directive.push(barracks.id());
        }

        tracing::debug!(%directive, "training directive");
        directive
    }
}

fn trained_kind(barracks: &Site) -> Option<CreepKind> {
    [CreepKind::Knight, CreepKind::Archer, CreepKind::Giant]
        .into_iter()
        .find(|&kind| barracks.trains(kind))
}

const fn creep_tally(kind: CreepKind) -> Tally {
    match kind {
        CreepKind::Knight => Tally::OwnedKnights,
        CreepKind::Archer => Tally::OwnedArchers,
        CreepKind::Giant => Tally::OwnedGiants,
    }
}
