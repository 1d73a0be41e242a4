//! Read-only queries exposing world state to systems.
//!
//! Every "closest" query measures from the own queen's current position unless
//! stated otherwise, and yields `None` when no candidate matches or the queen
//! has not been sighted yet.

use code_royale_core::{Creep, CreepKind, Position, Queen, Site, SiteId};

use crate::World;

/// Enemy knights closer than this to a healthy queen are a threat.
pub const THREAT_RADIUS: i32 = 600;
/// Threat radius used once the queen's health drops below [`LOW_HEALTH_CUTOFF`].
pub const LOW_HEALTH_THREAT_RADIUS: i32 = 1000;
/// Queen health under which threats are assessed with the wider radius.
pub const LOW_HEALTH_CUTOFF: i32 = 30;
/// Extra clearance added to an enemy tower's attack radius around the queen.
pub const TOWER_SAFETY_MARGIN: i32 = 60;
/// Enemy queen health under which an all-in knight rush is ordered.
pub const CRITICAL_ENEMY_HEALTH: i32 = 10;
/// Gold per minute the economy must exceed before giants are worth funding.
pub const GIANT_GPM_THRESHOLD: i32 = 15;

/// Entity selected by a "closest" query together with its distance.
#[derive(Debug)]
pub struct Nearest<'a, T> {
    /// Winning candidate.
    pub entity: &'a T,
    /// Distance recorded for the candidate when it was selected.
    pub distance: i32,
}

impl<T> Clone for Nearest<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Nearest<'_, T> {}

/// Live entity sets that can be counted with [`count`] and [`has_at_least`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tally {
    /// Own knights on the map.
    OwnedKnights,
    /// Own archers on the map.
    OwnedArchers,
    /// Own giants on the map.
    OwnedGiants,
    /// Own mines.
    OwnedMines,
    /// Own towers.
    OwnedTowers,
    /// Enemy towers.
    EnemyTowers,
    /// Own barracks producing the given creep kind.
    OwnedBarracks(CreepKind),
}

/// Gold currently in the treasury.
#[must_use]
pub fn gold(world: &World) -> i32 {
    world.gold
}

/// Every site, in the order announced at game start.
#[must_use]
pub fn sites(world: &World) -> &[Site] {
    &world.sites
}

/// Looks up a site by identifier.
#[must_use]
pub fn site(world: &World, id: SiteId) -> Option<&Site> {
    world.sites.iter().find(|site| site.id() == id)
}

/// Site the own queen is touching this turn, if any.
#[must_use]
pub fn touched_site(world: &World) -> Option<&Site> {
    world.touched_site.and_then(|id| site(world, id))
}

/// Creeps reported this turn.
#[must_use]
pub fn creeps(world: &World) -> &[Creep] {
    &world.creeps
}

/// The own queen, once sighted.
#[must_use]
pub fn queen(world: &World) -> Option<&Queen> {
    world.queen.as_ref()
}

/// The enemy queen, once sighted.
#[must_use]
pub fn enemy_queen(world: &World) -> Option<&Queen> {
    world.enemy_queen.as_ref()
}

/// Position of the own queen on her first sighting.
#[must_use]
pub fn home(world: &World) -> Option<Position> {
    world.home
}

/// Gold per minute: the summed yield (param1) of all own mines.
#[must_use]
pub fn gold_per_minute(world: &World) -> i32 {
    let gpm: i32 = world
        .sites
        .iter()
        .filter(|site| site.is_owned_by_self() && site.is_mine_structure())
        .map(Site::param1)
        .sum();
    tracing::trace!(gpm, "gold per minute");
    gpm
}

/// Counts the live entities in the requested set.
#[must_use]
pub fn count(world: &World, tally: Tally) -> usize {
    let found = match tally {
        Tally::OwnedKnights => count_own_creeps(world, Creep::is_knight),
        Tally::OwnedArchers => count_own_creeps(world, Creep::is_archer),
        Tally::OwnedGiants => count_own_creeps(world, Creep::is_giant),
        Tally::OwnedMines => count_sites(world, |site| {
            site.is_owned_by_self() && site.is_mine_structure()
        }),
        Tally::OwnedTowers => count_sites(world, |site| site.is_owned_by_self() && site.is_tower()),
        Tally::EnemyTowers => count_sites(world, |site| site.is_owned_by_enemy() && site.is_tower()),
        Tally::OwnedBarracks(kind) => count_sites(world, |site| {
            site.is_owned_by_self() && site.is_barracks() && site.trains(kind)
        }),
    };
    tracing::trace!(?tally, found, "tally");
    found
}

/// Reports whether at least `n` entities of the requested set exist.
#[must_use]
pub fn has_at_least(world: &World, tally: Tally, n: usize) -> bool {
    count(world, tally) >= n
}

/// Closest site of any kind, measured to the site's edge.
#[must_use]
pub fn closest_site(world: &World) -> Option<Nearest<'_, Site>> {
    let origin = queen(world)?.position;
    closest_by(world.sites.iter(), |site| edge_distance(origin, site))
}

/// Closest buildable site, measured to the site's edge.
#[must_use]
pub fn closest_free_site(world: &World) -> Option<Nearest<'_, Site>> {
    let origin = queen(world)?.position;
    closest_by(world.sites.iter().filter(|site| site.is_free()), |site| {
        edge_distance(origin, site)
    })
}

/// Closest buildable site outside every enemy tower's attack radius.
///
/// A candidate is unsafe when its centre lies within `param2` of an enemy
/// tower's centre. Distance to the queen is measured centre to centre.
#[must_use]
pub fn closest_free_safe_site(world: &World) -> Option<Nearest<'_, Site>> {
    let origin = queen(world)?.position;
    let towers: Vec<&Site> = world
        .sites
        .iter()
        .filter(|site| site.is_owned_by_enemy() && site.is_tower())
        .collect();

    let safe = world.sites.iter().filter(|site| {
        site.is_free()
            && towers
                .iter()
                .all(|tower| tower.position().distance(site.position()) > tower.param2())
    });
    closest_by(safe, |site| origin.distance(site.position()))
}

/// Oldest own tower relative to the queen's position.
///
/// See [`home_owned_old_tower`] for the selection rule.
#[must_use]
pub fn closest_owned_old_tower(world: &World) -> Option<Nearest<'_, Site>> {
    let origin = queen(world)?.position;
    oldest_owned_tower(world, origin)
}

/// Oldest own tower relative to the queen's home position.
///
/// Towers shrink their attack radius (param2) as they decay, so a smaller
/// param2 marks an older tower. The scan is a loose last-writer-wins pass: a
/// candidate replaces the current pick whenever its param2 is smaller *or* its
/// edge distance is smaller than the values recorded for the pick. The result
/// therefore depends on scan order and is not a lexicographic minimum.
#[must_use]
pub fn home_owned_old_tower(world: &World) -> Option<Nearest<'_, Site>> {
    let origin = home(world)?;
    oldest_owned_tower(world, origin)
}

/// Closest own archer, measured centre to centre.
#[must_use]
pub fn closest_owned_archer(world: &World) -> Option<Nearest<'_, Creep>> {
    let origin = queen(world)?.position;
    closest_by(
        world
            .creeps
            .iter()
            .filter(|creep| creep.is_owned_by_self() && creep.is_archer()),
        |creep| origin.distance(creep.position),
    )
}

/// Closest enemy tower, measured to the site's edge.
#[must_use]
pub fn closest_enemy_tower(world: &World) -> Option<Nearest<'_, Site>> {
    let origin = queen(world)?.position;
    closest_by(
        world
            .sites
            .iter()
            .filter(|site| site.is_owned_by_enemy() && site.is_tower()),
        |site| edge_distance(origin, site),
    )
}

/// Closest enemy barracks, measured to the site's edge.
#[must_use]
pub fn closest_enemy_barracks(world: &World) -> Option<Nearest<'_, Site>> {
    let origin = queen(world)?.position;
    closest_by(
        world
            .sites
            .iter()
            .filter(|site| site.is_owned_by_enemy() && site.is_barracks()),
        |site| edge_distance(origin, site),
    )
}

/// Closest own mine, measured to the site's edge.
#[must_use]
pub fn closest_owned_mine(world: &World) -> Option<Nearest<'_, Site>> {
    let origin = queen(world)?.position;
    closest_by(
        world
            .sites
            .iter()
            .filter(|site| site.is_owned_by_self() && site.is_mine_structure()),
        |site| edge_distance(origin, site),
    )
}

/// Closest enemy knight, measured centre to centre. Ties go to the later knight.
#[must_use]
pub fn closest_enemy_knight(world: &World) -> Option<Nearest<'_, Creep>> {
    let origin = queen(world)?.position;
    let mut best: Option<Nearest<'_, Creep>> = None;
    for creep in world
        .creeps
        .iter()
        .filter(|creep| !creep.is_owned_by_self() && creep.is_knight())
    {
        let distance = origin.distance(creep.position);
        if best.map_or(true, |current| distance <= current.distance) {
            best = Some(Nearest {
                entity: creep,
                distance,
            });
        }
    }
    best
}

/// Radius inside which enemy knights threaten a queen with the given health.
#[must_use]
pub const fn threat_radius(queen_health: i32) -> i32 {
    if queen_health < LOW_HEALTH_CUTOFF {
        LOW_HEALTH_THREAT_RADIUS
    } else {
        THREAT_RADIUS
    }
}

/// Reports whether any enemy knight is within the queen's threat radius.
#[must_use]
pub fn enemy_knights_within_threat(world: &World) -> bool {
    let Some(queen) = queen(world) else {
        return false;
    };
    let limit = threat_radius(queen.health);
    world
        .creeps
        .iter()
        .filter(|creep| !creep.is_owned_by_self() && creep.is_knight())
        .any(|creep| queen.position.distance(creep.position) <= limit)
}

/// Reports whether the queen stands within an enemy tower's reach plus margin.
#[must_use]
pub fn enemy_tower_within_range(world: &World) -> bool {
    let Some(queen) = queen(world) else {
        return false;
    };
    world
        .sites
        .iter()
        .filter(|site| site.is_owned_by_enemy() && site.is_tower())
        .any(|tower| {
            queen.position.distance(tower.position()) <= tower.param2() + TOWER_SAFETY_MARGIN
        })
}

/// Reports whether the enemy queen is nearly dead.
#[must_use]
pub fn enemy_queen_critically_weak(world: &World) -> bool {
    enemy_queen(world).map_or(false, |queen| queen.health < CRITICAL_ENEMY_HEALTH)
}

fn edge_distance(origin: Position, site: &Site) -> i32 {
    origin.distance(site.position()) - site.radius()
}

fn closest_by<'a, T, I, F>(candidates: I, mut measure: F) -> Option<Nearest<'a, T>>
where
    I: IntoIterator<Item = &'a T>,
    F: FnMut(&T) -> i32,
{
    let mut best: Option<Nearest<'a, T>> = None;
    for entity in candidates {
        let distance = measure(entity);
        if best.map_or(true, |current| distance < current.distance) {
            best = Some(Nearest { entity, distance });
        }
    }
    best
}

fn oldest_owned_tower(world: &World, origin: Position) -> Option<Nearest<'_, Site>> {
    let mut best: Option<(Nearest<'_, Site>, i32)> = None;
    for site in world
        .sites
        .iter()
        .filter(|site| site.is_owned_by_self() && site.is_tower())
    {
        let distance = edge_distance(origin, site);
        let replaces = best.map_or(true, |(current, age)| {
            site.param2() < age || distance < current.distance
        });
        if replaces {
            best = Some((
                Nearest {
                    entity: site,
                    distance,
                },
                site.param2(),
            ));
        }
    }
    best.map(|(nearest, _)| nearest)
}

fn count_own_creeps(world: &World, matches: fn(&Creep) -> bool) -> usize {
    world
        .creeps
        .iter()
        .filter(|creep| creep.is_owned_by_self() && matches(creep))
        .count()
}

fn count_sites(world: &World, matches: impl Fn(&Site) -> bool) -> usize {
    world.sites.iter().filter(|site| matches(site)).count()
}
