#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the Code Royale bot.
//!
//! The world owns the fixed set of sites, both queens, and the creeps seen this
//! turn. Adapters feed it one [`TurnSnapshot`] per turn through [`apply`];
//! systems read it exclusively through the [`query`] module.

use code_royale_core::{Creep, Owner, Position, Queen, Site, SiteId, SiteLayout, TurnSnapshot, Unit};
use thiserror::Error;

pub mod query;

/// Reasons a snapshot can be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum WorldError {
    /// A site report names a site that was not part of the initial layout.
    #[error("snapshot reports unknown site {0}")]
    UnknownSite(SiteId),
    /// The touched site is not part of the initial layout.
    #[error("queen is touching unknown site {0}")]
    UnknownTouchedSite(SiteId),
}

/// Represents the authoritative Code Royale world state.
#[derive(Clone, Debug)]
pub struct World {
    sites: Vec<Site>,
    queen: Option<Queen>,
    enemy_queen: Option<Queen>,
    home: Option<Position>,
    creeps: Vec<Creep>,
    gold: i32,
    touched_site: Option<SiteId>,
}

impl World {
    /// Creates a world from the site list announced at game start.
    ///
    /// The site collection is fixed from here on; later snapshots only
    /// overwrite the status of these sites.
    #[must_use]
    pub fn new(layouts: impl IntoIterator<Item = SiteLayout>) -> Self {
        Self {
            sites: layouts.into_iter().map(Site::new).collect(),
            queen: None,
            enemy_queen: None,
            home: None,
            creeps: Vec::new(),
            gold: 0,
            touched_site: None,
        }
    }

    fn site_index(&self, id: SiteId) -> Option<usize> {
        self.sites.iter().position(|site| site.id() == id)
    }

    fn absorb_queen(&mut self, sighting: Queen) {
        let slot = if sighting.owner == Owner::Friendly {
            &mut self.queen
        } else {
            &mut self.enemy_queen
        };

        if let Some(queen) = slot.as_mut() {
            *queen = sighting;
            return;
        }

        *slot = Some(sighting);
        if sighting.owner == Owner::Friendly {
            self.home = Some(sighting.position);
            tracing::debug!(
                x = sighting.position.x(),
                y = sighting.position.y(),
                "home recorded"
            );
        }
    }
}

/// Absorbs a turn snapshot, mutating the world in place.
///
/// Site statuses are overwritten, never merged. Creeps from the previous turn
/// are discarded before the reported ones are stored. Queens are updated in
/// place so their identity survives across turns. The snapshot is validated
/// up front: on error the world is left untouched.
pub fn apply(world: &mut World, snapshot: TurnSnapshot) -> Result<(), WorldError> {
    let mut indices = Vec::with_capacity(snapshot.sites.len());
    for report in &snapshot.sites {
        let index = world
            .site_index(report.id)
            .ok_or(WorldError::UnknownSite(report.id))?;
        indices.push(index);
    }

    if let Some(touched) = snapshot.touched_site {
        if world.site_index(touched).is_none() {
            return Err(WorldError::UnknownTouchedSite(touched));
        }
    }

    world.gold = snapshot.gold;
    world.touched_site = snapshot.touched_site;

    for (index, report) in indices.into_iter().zip(&snapshot.sites) {
        world.sites[index].update(report.status);
    }

    world.creeps.clear();
    for unit in snapshot.units {
        match unit {
            Unit::Queen(queen) => world.absorb_queen(queen),
            Unit::Creep(creep) => world.creeps.push(creep),
        }
    }

    Ok(())
}
