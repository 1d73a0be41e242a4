#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Code Royale bot.
//!
//! This crate defines the entity registry and the command surface that connect
//! the turn driver, the authoritative world, and the decision systems. The
//! driver decodes a [`TurnSnapshot`] from the referee, the world absorbs it via
//! its `apply` entry point, and systems query the world to produce the two
//! lines of [`TurnCommands`] emitted each turn.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a site, stable for the whole game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SiteId(i32);

impl SiteId {
    /// Creates a new site identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Location on the map expressed in integer map units.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    x: i32,
    y: i32,
}

impl Position {
    /// Map origin, used as the retreat point of last resort.
    pub const ORIGIN: Self = Self::new(0, 0);

    /// Creates a new position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical coordinate.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Euclidean distance to `other`, rounded half away from zero.
    ///
    /// This matches the rounding the referee applies when it reports ranges,
    /// so comparisons against tower radii line up with the game's own checks.
    #[must_use]
    pub fn distance(self, other: Position) -> i32 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        dx.hypot(dy).round() as i32
    }
}

/// Raised when a wire code does not map onto a known enum variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("unknown {field} code {code}")]
pub struct CodeError {
    /// Name of the protocol field that carried the code.
    pub field: &'static str,
    /// Offending value.
    pub code: i32,
}

/// Controller of a site or unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Owner {
    /// Nobody controls the site.
    Neutral,
    /// Controlled by this bot.
    Friendly,
    /// Controlled by the opponent.
    Enemy,
}

impl Owner {
    /// Decodes the referee's owner code (`-1`, `0`, `1`).
    pub fn from_code(code: i32) -> Result<Self, CodeError> {
        match code {
            -1 => Ok(Self::Neutral),
            0 => Ok(Self::Friendly),
            1 => Ok(Self::Enemy),
            _ => Err(CodeError {
                field: "owner",
                code,
            }),
        }
    }
}

/// Structure currently standing on a site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureKind {
    /// No structure; the site is buildable.
    Empty,
    /// Gold mine.
    Mine,
    /// Defensive tower.
    Tower,
    /// Barracks training a single creep kind.
    Barracks,
}

impl StructureKind {
    /// Decodes the referee's structure code (`-1`, `0`, `1`, `2`).
    pub fn from_code(code: i32) -> Result<Self, CodeError> {
        match code {
            -1 => Ok(Self::Empty),
            0 => Ok(Self::Mine),
            1 => Ok(Self::Tower),
            2 => Ok(Self::Barracks),
            _ => Err(CodeError {
                field: "structure type",
                code,
            }),
        }
    }
}

impl fmt::Display for StructureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Empty => "empty",
            Self::Mine => "mine",
            Self::Tower => "tower",
            Self::Barracks => "barracks",
        };
        f.write_str(label)
    }
}

/// Disposable combat units trained by barracks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CreepKind {
    /// Fast melee unit that hunts the enemy queen.
    Knight,
    /// Ranged unit that defends against creeps.
    Archer,
    /// Slow unit that destroys towers.
    Giant,
}

impl CreepKind {
    /// Decodes the creep code shared by unit types and barracks param2 (`0`, `1`, `2`).
    pub fn from_code(code: i32) -> Result<Self, CodeError> {
        match code {
            0 => Ok(Self::Knight),
            1 => Ok(Self::Archer),
            2 => Ok(Self::Giant),
            _ => Err(CodeError {
                field: "creep type",
                code,
            }),
        }
    }

    /// Wire code of the creep kind.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::Knight => 0,
            Self::Archer => 1,
            Self::Giant => 2,
        }
    }
}

/// Role of a reported unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    /// The side's queen.
    Queen,
    /// An ordinary creep.
    Creep(CreepKind),
}

impl UnitKind {
    /// Decodes the referee's unit type code (`-1` for queens, otherwise a creep code).
    pub fn from_code(code: i32) -> Result<Self, CodeError> {
        if code == -1 {
            return Ok(Self::Queen);
        }
        CreepKind::from_code(code)
            .map(Self::Creep)
            .map_err(|_| CodeError {
                field: "unit type",
                code,
            })
    }
}

/// Immutable part of a site, known from the start of the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SiteLayout {
    /// Identifier of the site.
    pub id: SiteId,
    /// Centre of the site.
    pub position: Position,
    /// Radius of the site's footprint.
    pub radius: i32,
}

/// Per-turn state of a site, replaced wholesale every turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SiteStatus {
    /// Gold left in the ground, `-1` when unknown.
    pub gold: i32,
    /// Maximum mining rate of the site, `-1` when unknown.
    pub mine_size: i32,
    /// Structure standing on the site.
    pub structure: StructureKind,
    /// Controller of the structure.
    pub owner: Owner,
    /// Tower health, mine yield, or barracks turns until training finishes.
    pub param1: i32,
    /// Tower attack radius, or the creep code trained by a barracks.
    pub param2: i32,
}

impl SiteStatus {
    /// Status of a site nothing has been reported about yet.
    pub const UNKNOWN: Self = Self {
        gold: -1,
        mine_size: -1,
        structure: StructureKind::Empty,
        owner: Owner::Neutral,
        param1: -1,
        param2: -2,
    };
}

impl Default for SiteStatus {
    fn default() -> Self {
        Self::UNKNOWN
    }
}

/// Fixed map location that can host a single structure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Site {
    layout: SiteLayout,
    status: SiteStatus,
}

impl Site {
    /// Creates a site with an unknown status.
    #[must_use]
    pub const fn new(layout: SiteLayout) -> Self {
        Self {
            layout,
            status: SiteStatus::UNKNOWN,
        }
    }

    /// Replaces every mutable field with the latest reported status.
    pub fn update(&mut self, status: SiteStatus) {
        self.status = status;
    }

    /// Identifier of the site.
    #[must_use]
    pub const fn id(&self) -> SiteId {
        self.layout.id
    }

    /// Centre of the site.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.layout.position
    }

    /// Radius of the site's footprint.
    #[must_use]
    pub const fn radius(&self) -> i32 {
        self.layout.radius
    }

    /// Immutable layout of the site.
    #[must_use]
    pub const fn layout(&self) -> &SiteLayout {
        &self.layout
    }

    /// Latest reported status of the site.
    #[must_use]
    pub const fn status(&self) -> &SiteStatus {
        &self.status
    }

    /// Gold left in the ground.
    #[must_use]
    pub const fn gold(&self) -> i32 {
        self.status.gold
    }

    /// Maximum mining rate of the site.
    #[must_use]
    pub const fn mine_size(&self) -> i32 {
        self.status.mine_size
    }

    /// First structure-specific parameter.
    #[must_use]
    pub const fn param1(&self) -> i32 {
        self.status.param1
    }

    /// Second structure-specific parameter.
    #[must_use]
    pub const fn param2(&self) -> i32 {
        self.status.param2
    }

    /// Structure standing on the site.
    #[must_use]
    pub const fn structure(&self) -> StructureKind {
        self.status.structure
    }

    /// Controller of the site's structure.
    #[must_use]
    pub const fn owner(&self) -> Owner {
        self.status.owner
    }

    /// Reports whether the site has no structure and can be built on.
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.status.structure == StructureKind::Empty
    }

    /// Reports whether the site hosts a mine.
    #[must_use]
    pub fn is_mine_structure(&self) -> bool {
        self.status.structure == StructureKind::Mine
    }

    /// Reports whether the site hosts a tower.
    #[must_use]
    pub fn is_tower(&self) -> bool {
        self.status.structure == StructureKind::Tower
    }

    /// Reports whether the site hosts barracks.
    #[must_use]
    pub fn is_barracks(&self) -> bool {
        self.status.structure == StructureKind::Barracks
    }

    /// Reports whether this bot controls the site.
    #[must_use]
    pub fn is_owned_by_self(&self) -> bool {
        self.status.owner == Owner::Friendly
    }

    /// Reports whether the opponent controls the site.
    #[must_use]
    pub fn is_owned_by_enemy(&self) -> bool {
        self.status.owner == Owner::Enemy
    }

    /// Reports whether barracks on the site are busy training.
    #[must_use]
    pub const fn is_training(&self) -> bool {
        self.status.param1 > 0
    }

    /// Reports whether the site's barracks produce knights.
    #[must_use]
    pub const fn trains_knight(&self) -> bool {
        self.status.param2 == CreepKind::Knight.code()
    }

    /// Reports whether the site's barracks produce archers.
    #[must_use]
    pub const fn trains_archer(&self) -> bool {
        self.status.param2 == CreepKind::Archer.code()
    }

    /// Reports whether the site's barracks produce giants.
    #[must_use]
    pub const fn trains_giant(&self) -> bool {
        self.status.param2 == CreepKind::Giant.code()
    }

    /// Reports whether the site's barracks produce the given creep kind.
    #[must_use]
    pub const fn trains(&self, kind: CreepKind) -> bool {
        self.status.param2 == kind.code()
    }

    /// Reports whether a tower's health (param1) is below `cap`.
    #[must_use]
    pub const fn tower_health_below(&self, cap: i32) -> bool {
        self.status.param1 < cap
    }

    /// Reports whether a mine's current yield (param1) is below `cap`.
    #[must_use]
    pub const fn mine_yield_below(&self, cap: i32) -> bool {
        self.status.param1 < cap
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Site {}: ({}:{}) {}>",
            self.id(),
            self.position().x(),
            self.position().y(),
            self.structure()
        )
    }
}

/// A side's single long-lived queen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Queen {
    /// Current position.
    pub position: Position,
    /// Side controlling the queen.
    pub owner: Owner,
    /// Remaining health.
    pub health: i32,
}

/// A disposable combat unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Creep {
    /// Current position.
    pub position: Position,
    /// Side controlling the creep.
    pub owner: Owner,
    /// Kind of creep.
    pub kind: CreepKind,
    /// Remaining health.
    pub health: i32,
}

impl Creep {
    /// Reports whether this bot controls the creep.
    #[must_use]
    pub fn is_owned_by_self(&self) -> bool {
        self.owner == Owner::Friendly
    }

    /// Reports whether the creep is a knight.
    #[must_use]
    pub fn is_knight(&self) -> bool {
        self.kind == CreepKind::Knight
    }

    /// Reports whether the creep is an archer.
    #[must_use]
    pub fn is_archer(&self) -> bool {
        self.kind == CreepKind::Archer
    }

    /// Reports whether the creep is a giant.
    #[must_use]
    pub fn is_giant(&self) -> bool {
        self.kind == CreepKind::Giant
    }
}

/// A unit as reported by the referee for a single turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unit {
    /// A queen sighting.
    Queen(Queen),
    /// A creep sighting.
    Creep(Creep),
}

impl Unit {
    /// Builds a unit from raw report fields, tagging it by role.
    #[must_use]
    pub const fn from_report(position: Position, owner: Owner, kind: UnitKind, health: i32) -> Self {
        match kind {
            UnitKind::Queen => Self::Queen(Queen {
                position,
                owner,
                health,
            }),
            UnitKind::Creep(kind) => Self::Creep(Creep {
                position,
                owner,
                kind,
                health,
            }),
        }
    }
}

/// Latest status reported for a single site.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SiteReport {
    /// Site the status applies to.
    pub id: SiteId,
    /// Full replacement status.
    pub status: SiteStatus,
}

/// Everything the referee reports at the start of a turn.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TurnSnapshot {
    /// Gold in the treasury.
    pub gold: i32,
    /// Site the own queen is touching, if any.
    pub touched_site: Option<SiteId>,
    /// Per-site status reports.
    pub sites: Vec<SiteReport>,
    /// Every unit on the map.
    pub units: Vec<Unit>,
}

/// Structure the queen can order on a site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildKind {
    /// Defensive tower.
    Tower,
    /// Gold mine.
    Mine,
    /// Barracks producing the given creep kind.
    Barracks(CreepKind),
}

impl fmt::Display for BuildKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Tower => "TOWER",
            Self::Mine => "MINE",
            Self::Barracks(CreepKind::Knight) => "BARRACKS-KNIGHT",
            Self::Barracks(CreepKind::Archer) => "BARRACKS-ARCHER",
            Self::Barracks(CreepKind::Giant) => "BARRACKS-GIANT",
        };
        f.write_str(label)
    }
}

/// First output line: what the queen does this turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueenAction {
    /// Walk toward a position.
    Move(Position),
    /// Build (or upgrade) a structure on a touched site.
    Build {
        /// Site receiving the structure.
        site: SiteId,
        /// Structure to build.
        kind: BuildKind,
    },
    /// No action; rendered as an empty line.
    Idle,
}

impl fmt::Display for QueenAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move(target) => write!(f, "MOVE {} {}", target.x(), target.y()),
            Self::Build { site, kind } => write!(f, "BUILD {site} {kind}"),
            Self::Idle => Ok(()),
        }
    }
}

/// Second output line: barracks that start training this turn.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainDirective {
    sites: Vec<SiteId>,
}

impl TrainDirective {
    /// Creates an empty directive.
    #[must_use]
    pub const fn new() -> Self {
        Self { sites: Vec::new() }
    }

    /// Appends a barracks to the directive.
    pub fn push(&mut self, site: SiteId) {
        self.sites.push(site);
    }

    /// Barracks listed in the directive, in emission order.
    #[must_use]
    pub fn sites(&self) -> &[SiteId] {
        &self.sites
    }

    /// Reports whether no barracks trains this turn.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

impl From<Vec<SiteId>> for TrainDirective {
    fn from(sites: Vec<SiteId>) -> Self {
        Self { sites }
    }
}

impl fmt::Display for TrainDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TRAIN")?;
        for site in &self.sites {
            write!(f, " {site}")?;
        }
        Ok(())
    }
}

/// The pair of commands emitted each turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnCommands {
    /// Queen action line.
    pub queen: QueenAction,
    /// Training line.
    pub train: TrainDirective,
}
