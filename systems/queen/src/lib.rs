#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure decision system that chooses the queen's action for the current turn.
//!
//! The policy is an ordered table of rules evaluated first-match-wins against
//! an immutable world. Nothing is remembered between turns, so evaluating the
//! same world twice yields the same decision.

use std::fmt;

use code_royale_core::{BuildKind, CreepKind, Position, QueenAction, Site};
use code_royale_world::{
    query::{self, Nearest, Tally, GIANT_GPM_THRESHOLD},
    World,
};

/// Own towers required before the defence falls back on repairing them.
pub const MIN_TOWERS_FOR_REPAIR: usize = 3;
/// Towers below this health are worth repairing while under attack.
pub const REPAIR_HEALTH_CAP: i32 = 500;
/// Towers below this health are topped up whenever the queen touches them.
pub const UPGRADE_HEALTH_CAP: i32 = 550;
/// Enemy barracks closer than this (to their edge) are raided.
pub const RAID_DISTANCE: i32 = 300;
/// Queen health the queen must exceed before raiding.
pub const RAID_MIN_HEALTH: i32 = 40;
/// Mines of at most this size are not worth upgrading.
pub const MINE_UPGRADE_MIN_SIZE: i32 = 2;
/// Mines already yielding this much are left alone.
pub const MINE_UPGRADE_YIELD_CAP: i32 = 3;
/// Mine size of a site that is nearly worthless as a mine.
pub const DEPLETED_MINE_SIZE: i32 = 1;
/// Mines the queen claims before investing in barracks.
pub const TARGET_MINES: usize = 2;
/// Treasury the queen must hold before building giant barracks.
pub const GIANT_BARRACKS_GOLD: i32 = 300;

/// Implicit state the queen is in, named after the rule group that fired.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QueenMode {
    /// Standing on a free site and building on it.
    AtFreeSite,
    /// Reacting to nearby enemy knights.
    Defending,
    /// Improving the economy or the structures already owned.
    Economy,
    /// Moving in to destroy enemy barracks.
    Attacking,
    /// Walking toward the next objective, or doing nothing.
    IdleMove,
}

impl fmt::Display for QueenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::AtFreeSite => "at-free-site",
            Self::Defending => "defending",
            Self::Economy => "economy",
            Self::Attacking => "attacking",
            Self::IdleMove => "idle-move",
        };
        f.write_str(label)
    }
}

/// Outcome of a single policy evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueenDecision {
    /// State the queen is in this turn.
    pub mode: QueenMode,
    /// Name of the rule that produced the action.
    pub rule: &'static str,
    /// Action to emit.
    pub action: QueenAction,
}

/// Facts shared by every rule, derived once per evaluation.
#[derive(Clone, Copy, Debug)]
struct Situation<'w> {
    world: &'w World,
    touched: Option<&'w Site>,
    gold_per_minute: i32,
    threatened: bool,
}

impl<'w> Situation<'w> {
    fn observe(world: &'w World) -> Self {
        Self {
            world,
            touched: query::touched_site(world),
            gold_per_minute: query::gold_per_minute(world),
            threatened: query::enemy_knights_within_threat(world),
        }
    }

    fn touched_free(&self) -> Option<&'w Site> {
        self.touched.filter(|site| site.is_free())
    }

    fn touched_own(&self) -> Option<&'w Site> {
        self.touched.filter(|site| site.is_owned_by_self())
    }

    fn has(&self, tally: Tally, n: usize) -> bool {
        query::has_at_least(self.world, tally, n)
    }
}

/// Queen rule: fires when `decide` yields an action.
struct QueenRule {
    name: &'static str,
    mode: QueenMode,
    decide: fn(&Situation<'_>) -> Option<QueenAction>,
}

/// Structure choice for a touched free site.
struct BuildRule {
    name: &'static str,
    decide: fn(&Situation<'_>) -> Option<BuildKind>,
}

const QUEEN_RULES: &[QueenRule] = &[
    QueenRule {
        name: "build-on-free-site",
        mode: QueenMode::AtFreeSite,
        decide: build_on_free_site,
    },
    QueenRule {
        name: "repair-home-tower",
        mode: QueenMode::Defending,
        decide: repair_home_tower,
    },
    QueenRule {
        name: "repair-closest-tower",
        mode: QueenMode::Defending,
        decide: repair_closest_tower,
    },
    QueenRule {
        name: "fortify-free-site",
        mode: QueenMode::Defending,
        decide: fortify_free_site,
    },
    QueenRule {
        name: "fortify-touched-site",
        mode: QueenMode::Defending,
        decide: fortify_touched_site,
    },
    QueenRule {
        name: "retreat-to-archer",
        mode: QueenMode::Defending,
        decide: retreat_to_archer,
    },
    QueenRule {
        name: "retreat-to-origin",
        mode: QueenMode::Defending,
        decide: retreat_to_origin,
    },
    QueenRule {
        name: "raid-enemy-barracks",
        mode: QueenMode::Attacking,
        decide: raid_enemy_barracks,
    },
    QueenRule {
        name: "upgrade-tower",
        mode: QueenMode::Economy,
        decide: upgrade_touched_tower,
    },
    QueenRule {
        name: "upgrade-mine",
        mode: QueenMode::Economy,
        decide: upgrade_touched_mine,
    },
    QueenRule {
        name: "replace-depleted-mine",
        mode: QueenMode::Economy,
        decide: replace_depleted_mine,
    },
    QueenRule {
        name: "expand-to-free-site",
        mode: QueenMode::IdleMove,
        decide: expand_to_free_site,
    },
    QueenRule {
        name: "advance-on-enemy-barracks",
        mode: QueenMode::IdleMove,
        decide: advance_on_enemy_barracks,
    },
];

/// Structure choices for a free site, in priority order.
const FREE_SITE_BUILDS: &[BuildRule] = &[
    BuildRule {
        name: "tower-under-threat",
        decide: tower_under_threat,
    },
    BuildRule {
        name: "claim-gold",
        decide: claim_gold,
    },
    BuildRule {
        name: "giant-barracks",
        decide: giant_barracks,
    },
    BuildRule {
        name: "knight-barracks",
        decide: knight_barracks,
    },
    BuildRule {
        name: "archer-barracks",
        decide: archer_barracks,
    },
    BuildRule {
        name: "first-knight-barracks",
        decide: first_knight_barracks,
    },
    BuildRule {
        name: "mine-remaining-gold",
        decide: mine_remaining_gold,
    },
    BuildRule {
        name: "fallback-tower",
        decide: fallback_tower,
    },
];

/// Barracks kinds the queen converts depleted mines into, in priority order.
const REPLACEMENT_BARRACKS: [CreepKind; 3] = [CreepKind::Knight, CreepKind::Archer, CreepKind::Giant];

/// Stateless rule-table policy for the queen.
#[derive(Clone, Copy, Debug, Default)]
pub struct QueenPolicy;

impl QueenPolicy {
    /// Creates the queen policy.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Evaluates the rule table against the world and returns the first match.
    ///
    /// Falls back to [`QueenAction::Idle`] when no rule applies.
    #[must_use]
    pub fn decide(&self, world: &World) -> QueenDecision {
        let situation = Situation::observe(world);

        let fired = QUEEN_RULES
            .iter()
            .find_map(|rule| (rule.decide)(&situation).map(|action| (rule, action)));

        match fired {
            Some((rule, action)) => {
                tracing::debug!(rule = rule.name, mode = %rule.mode, %action, "queen rule fired");
                QueenDecision {
                    mode: rule.mode,
                    rule: rule.name,
                    action,
                }
            }
            None => {
                tracing::debug!("nothing to do");
                QueenDecision {
                    mode: QueenMode::IdleMove,
                    rule: "idle",
                    action: QueenAction::Idle,
                }
            }
        }
    }
}

fn build_on(site: &Site, kind: BuildKind) -> QueenAction {
    QueenAction::Build {
        site: site.id(),
        kind,
    }
}

fn walk_to(position: Position) -> QueenAction {
    QueenAction::Move(position)
}

/// Closest free site the queen should head for, avoiding enemy towers when any stand.
fn expansion_target<'w>(situation: &Situation<'w>) -> Option<Nearest<'w, Site>> {
    if situation.has(Tally::EnemyTowers, 1) {
        query::closest_free_safe_site(situation.world)
    } else {
        query::closest_free_site(situation.world)
    }
}

fn build_on_free_site(s: &Situation<'_>) -> Option<QueenAction> {
    let site = s.touched_free()?;
    let (choice, kind) = FREE_SITE_BUILDS
        .iter()
        .find_map(|rule| (rule.decide)(s).map(|kind| (rule, kind)))?;
    tracing::debug!(site = %site, choice = choice.name, "choosing structure");
    Some(build_on(site, kind))
}

fn tower_under_threat(s: &Situation<'_>) -> Option<BuildKind> {
    s.threatened.then_some(BuildKind::Tower)
}

fn claim_gold(s: &Situation<'_>) -> Option<BuildKind> {
    let site = s.touched_free()?;
    (site.gold() > 0 && !s.has(Tally::OwnedMines, TARGET_MINES)).then_some(BuildKind::Mine)
}

fn giant_barracks(s: &Situation<'_>) -> Option<BuildKind> {
    (s.gold_per_minute > GIANT_GPM_THRESHOLD
        && query::gold(s.world) > GIANT_BARRACKS_GOLD
        && !s.has(Tally::OwnedBarracks(CreepKind::Giant), 1))
    .then_some(BuildKind::Barracks(CreepKind::Giant))
}

fn knight_barracks(s: &Situation<'_>) -> Option<BuildKind> {
    (s.gold_per_minute > 4 && !s.has(Tally::OwnedBarracks(CreepKind::Knight), 2))
        .then_some(BuildKind::Barracks(CreepKind::Knight))
}

fn archer_barracks(s: &Situation<'_>) -> Option<BuildKind> {
    (s.gold_per_minute > 5 && !s.has(Tally::OwnedBarracks(CreepKind::Archer), 1))
        .then_some(BuildKind::Barracks(CreepKind::Archer))
}

fn first_knight_barracks(s: &Situation<'_>) -> Option<BuildKind> {
    (s.gold_per_minute > 2 && !s.has(Tally::OwnedBarracks(CreepKind::Knight), 1))
        .then_some(BuildKind::Barracks(CreepKind::Knight))
}

fn mine_remaining_gold(s: &Situation<'_>) -> Option<BuildKind> {
    let site = s.touched_free()?;
    (site.gold() > 0).then_some(BuildKind::Mine)
}

fn fallback_tower(_: &Situation<'_>) -> Option<BuildKind> {
    Some(BuildKind::Tower)
}

fn repair_home_tower(s: &Situation<'_>) -> Option<QueenAction> {
    if !s.threatened || !s.has(Tally::OwnedTowers, MIN_TOWERS_FOR_REPAIR) {
        return None;
    }
    let tower = query::home_owned_old_tower(s.world)?;
    tower
        .entity
        .tower_health_below(REPAIR_HEALTH_CAP)
        .then(|| build_on(tower.entity, BuildKind::Tower))
}

fn repair_closest_tower(s: &Situation<'_>) -> Option<QueenAction> {
    if !s.threatened || !s.has(Tally::OwnedTowers, MIN_TOWERS_FOR_REPAIR) {
        return None;
    }
    let tower = query::closest_owned_old_tower(s.world)?;
    tower
        .entity
        .tower_health_below(REPAIR_HEALTH_CAP)
        .then(|| build_on(tower.entity, BuildKind::Tower))
}

fn fortify_free_site(s: &Situation<'_>) -> Option<QueenAction> {
    if !s.threatened {
        return None;
    }
    let target = expansion_target(s)?;
    Some(build_on(target.entity, BuildKind::Tower))
}

fn fortify_touched_site(s: &Situation<'_>) -> Option<QueenAction> {
    if !s.threatened {
        return None;
    }
    let site = s.touched?;
    let fortifiable = (site.is_barracks() && !site.is_training())
        || (site.is_mine_structure() && site.is_owned_by_self())
        || site.is_tower();
    fortifiable.then(|| build_on(site, BuildKind::Tower))
}

fn retreat_to_archer(s: &Situation<'_>) -> Option<QueenAction> {
    if !s.threatened {
        return None;
    }
    let archer = query::closest_owned_archer(s.world)?;
    Some(walk_to(archer.entity.position))
}

fn retreat_to_origin(s: &Situation<'_>) -> Option<QueenAction> {
    s.threatened.then_some(walk_to(Position::ORIGIN))
}

fn raid_enemy_barracks(s: &Situation<'_>) -> Option<QueenAction> {
    let queen = query::queen(s.world)?;
    let barracks = query::closest_enemy_barracks(s.world)?;
    (barracks.distance < RAID_DISTANCE && queen.health > RAID_MIN_HEALTH)
        .then(|| walk_to(barracks.entity.position()))
}

fn upgrade_touched_tower(s: &Situation<'_>) -> Option<QueenAction> {
    let site = s.touched_own()?;
    (site.is_tower() && site.tower_health_below(UPGRADE_HEALTH_CAP))
        .then(|| build_on(site, BuildKind::Tower))
}

fn upgrade_touched_mine(s: &Situation<'_>) -> Option<QueenAction> {
    let site = s.touched_own()?;
    (site.is_mine_structure()
        && site.mine_size() > MINE_UPGRADE_MIN_SIZE
        && site.mine_yield_below(MINE_UPGRADE_YIELD_CAP))
    .then(|| build_on(site, BuildKind::Mine))
}

fn replace_depleted_mine(s: &Situation<'_>) -> Option<QueenAction> {
    let site = s
        .touched_own()
        .filter(|site| site.is_mine_structure() && site.mine_size() == DEPLETED_MINE_SIZE)?;
    let missing = REPLACEMENT_BARRACKS
        .into_iter()
        .find(|&kind| !s.has(Tally::OwnedBarracks(kind), 1))?;
    Some(build_on(site, BuildKind::Barracks(missing)))
}

fn expand_to_free_site(s: &Situation<'_>) -> Option<QueenAction> {
    let target = expansion_target(s)?;
    Some(walk_to(target.entity.position()))
}

fn advance_on_enemy_barracks(s: &Situation<'_>) -> Option<QueenAction> {
    let barracks = query::closest_enemy_barracks(s.world)?;
    Some(walk_to(barracks.entity.position()))
}
