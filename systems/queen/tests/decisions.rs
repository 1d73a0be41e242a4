use code_royale_core::{
    BuildKind, Creep, CreepKind, Owner, Position, Queen, QueenAction, SiteId, SiteLayout,
    SiteReport, SiteStatus, StructureKind, TurnSnapshot, Unit,
};
use code_royale_system_queen::{QueenMode, QueenPolicy};
use code_royale_world::{self as world, World};

/// Builds a single-turn world one site and unit at a time.
#[derive(Default)]
struct Scenario {
    gold: i32,
    touched: Option<i32>,
    moved_to: Option<Position>,
    layouts: Vec<SiteLayout>,
    reports: Vec<SiteReport>,
    units: Vec<Unit>,
}

impl Scenario {
    fn new() -> Self {
        Self {
            gold: 100,
            ..Self::default()
        }
    }

    fn site(mut self, id: i32, x: i32, y: i32, status: SiteStatus) -> Self {
        self.layouts.push(SiteLayout {
            id: SiteId::new(id),
            position: Position::new(x, y),
            radius: 60,
        });
        self.reports.push(SiteReport {
            id: SiteId::new(id),
            status,
        });
        self
    }

    fn queen(mut self, owner: Owner, x: i32, y: i32, health: i32) -> Self {
        self.units.push(Unit::Queen(Queen {
            position: Position::new(x, y),
            owner,
            health,
        }));
        self
    }

    fn creep(mut self, owner: Owner, kind: CreepKind, x: i32, y: i32) -> Self {
        self.units.push(Unit::Creep(Creep {
            position: Position::new(x, y),
            owner,
            kind,
            health: 25,
        }));
        self
    }

    fn touching(mut self, id: i32) -> Self {
        self.touched = Some(id);
        self
    }

    /// Replays the turn with the own queen relocated, keeping her first position as home.
    fn then_queen_at(mut self, x: i32, y: i32) -> Self {
        self.moved_to = Some(Position::new(x, y));
        self
    }

    fn gold(mut self, gold: i32) -> Self {
        self.gold = gold;
        self
    }

    fn build(self) -> World {
        let mut world = World::new(self.layouts);
        let snapshot = TurnSnapshot {
            gold: self.gold,
            touched_site: self.touched.map(SiteId::new),
            sites: self.reports,
            units: self.units,
        };
        world::apply(&mut world, snapshot.clone()).expect("scenario snapshot is valid");

        if let Some(position) = self.moved_to {
            let mut later = snapshot;
            for unit in &mut later.units {
                if let Unit::Queen(queen) = unit {
                    if queen.owner == Owner::Friendly {
                        queen.position = position;
                    }
                }
            }
            world::apply(&mut world, later).expect("scenario snapshot is valid");
        }
        world
    }
}

fn free_site(gold: i32) -> SiteStatus {
    SiteStatus {
        gold,
        mine_size: 2,
        structure: StructureKind::Empty,
        owner: Owner::Neutral,
        param1: -1,
        param2: -1,
    }
}

fn structure(structure: StructureKind, owner: Owner, param1: i32, param2: i32) -> SiteStatus {
    SiteStatus {
        gold: 100,
        mine_size: 2,
        structure,
        owner,
        param1,
        param2,
    }
}

fn own_mine(yield_per_turn: i32, mine_size: i32) -> SiteStatus {
    SiteStatus {
        mine_size,
        ..structure(StructureKind::Mine, Owner::Friendly, yield_per_turn, -1)
    }
}

fn build(site: i32, kind: BuildKind) -> QueenAction {
    QueenAction::Build {
        site: SiteId::new(site),
        kind,
    }
}

#[test]
fn free_gold_site_without_mines_becomes_mine() {
    let world = Scenario::new()
        .site(4, 200, 200, free_site(180))
        .queen(Owner::Friendly, 200, 200, 100)
        .touching(4)
        .build();

    let decision = QueenPolicy::new().decide(&world);

    assert_eq!(decision.action, build(4, BuildKind::Mine));
    assert_eq!(decision.action.to_string(), "BUILD 4 MINE");
    assert_eq!(decision.mode, QueenMode::AtFreeSite);
    assert_eq!(decision.rule, "build-on-free-site");
}

#[test]
fn free_site_under_threat_becomes_tower() {
    let world = Scenario::new()
        .site(4, 200, 200, free_site(180))
        .queen(Owner::Friendly, 200, 200, 100)
        .creep(Owner::Enemy, CreepKind::Knight, 500, 200)
        .touching(4)
        .build();

    assert_eq!(QueenPolicy::new().decide(&world).action, build(4, BuildKind::Tower));
}

#[test]
fn strong_economy_buys_giant_barracks() {
    let world = Scenario::new()
        .gold(350)
        .site(0, 100, 100, own_mine(8, 3))
        .site(1, 300, 100, own_mine(8, 3))
        .site(2, 500, 100, free_site(0))
        .queen(Owner::Friendly, 500, 100, 100)
        .touching(2)
        .build();

    assert_eq!(
        QueenPolicy::new().decide(&world).action,
        build(2, BuildKind::Barracks(CreepKind::Giant))
    );
}

#[test]
fn modest_economy_buys_knight_barracks_first() {
    let world = Scenario::new()
        .site(0, 100, 100, own_mine(3, 3))
        .site(1, 300, 100, own_mine(3, 3))
        .site(2, 500, 100, free_site(0))
        .queen(Owner::Friendly, 500, 100, 100)
        .touching(2)
        .build();

    assert_eq!(
        QueenPolicy::new().decide(&world).action,
        build(2, BuildKind::Barracks(CreepKind::Knight))
    );
}

#[test]
fn archer_barracks_follow_two_knight_barracks() {
    let world = Scenario::new()
        .site(0, 100, 100, own_mine(3, 3))
        .site(1, 300, 100, own_mine(3, 3))
        .site(2, 500, 100, structure(StructureKind::Barracks, Owner::Friendly, 0, 0))
        .site(3, 700, 100, structure(StructureKind::Barracks, Owner::Friendly, 0, 0))
        .site(4, 900, 100, free_site(0))
        .queen(Owner::Friendly, 900, 100, 100)
        .touching(4)
        .build();

    assert_eq!(
        QueenPolicy::new().decide(&world).action,
        build(4, BuildKind::Barracks(CreepKind::Archer))
    );
}

#[test]
fn thin_economy_buys_first_knight_barracks() {
    let world = Scenario::new()
        .site(0, 100, 100, own_mine(1, 3))
        .site(1, 300, 100, own_mine(2, 3))
        .site(2, 500, 100, free_site(0))
        .queen(Owner::Friendly, 500, 100, 100)
        .touching(2)
        .build();

    assert_eq!(
        QueenPolicy::new().decide(&world).action,
        build(2, BuildKind::Barracks(CreepKind::Knight)),
        "gold per minute of 3 only funds the first knight barracks"
    );
}

#[test]
fn free_site_with_gold_and_no_income_becomes_extra_mine() {
    let world = Scenario::new()
        .site(0, 100, 100, own_mine(0, 3))
        .site(1, 300, 100, own_mine(1, 3))
        .site(2, 500, 100, free_site(50))
        .queen(Owner::Friendly, 500, 100, 100)
        .touching(2)
        .build();

    let decision = QueenPolicy::new().decide(&world);
    assert_eq!(decision.action, build(2, BuildKind::Mine));
    assert_eq!(decision.action.to_string(), "BUILD 2 MINE");
}

#[test]
fn exhausted_free_site_without_income_becomes_tower() {
    let world = Scenario::new()
        .site(2, 500, 100, free_site(0))
        .queen(Owner::Friendly, 500, 100, 100)
        .touching(2)
        .build();

    let decision = QueenPolicy::new().decide(&world);
    assert_eq!(decision.action, build(2, BuildKind::Tower));
}

#[test]
fn threatened_queen_repairs_home_tower() {
    let world = Scenario::new()
        .site(0, 150, 100, structure(StructureKind::Tower, Owner::Friendly, 300, 200))
        .site(1, 800, 100, structure(StructureKind::Tower, Owner::Friendly, 700, 400))
        .site(2, 900, 300, structure(StructureKind::Tower, Owner::Friendly, 700, 400))
        .queen(Owner::Friendly, 100, 100, 100)
        .creep(Owner::Enemy, CreepKind::Knight, 400, 100)
        .build();

    let decision = QueenPolicy::new().decide(&world);

    assert_eq!(decision.action, build(0, BuildKind::Tower));
    assert_eq!(decision.action.to_string(), "BUILD 0 TOWER");
    assert_eq!(decision.mode, QueenMode::Defending);
    assert_eq!(decision.rule, "repair-home-tower");
}

#[test]
fn threatened_queen_away_from_home_repairs_closest_tower() {
    let world = Scenario::new()
        .site(0, 150, 100, structure(StructureKind::Tower, Owner::Friendly, 600, 200))
        .site(1, 1500, 100, structure(StructureKind::Tower, Owner::Friendly, 300, 200))
        .site(2, 1000, 800, structure(StructureKind::Tower, Owner::Friendly, 700, 400))
        .queen(Owner::Friendly, 100, 100, 100)
        .creep(Owner::Enemy, CreepKind::Knight, 1600, 100)
        .then_queen_at(1450, 100)
        .build();

    let decision = QueenPolicy::new().decide(&world);

    assert_eq!(decision.action, build(1, BuildKind::Tower));
    assert_eq!(decision.rule, "repair-closest-tower", "home tower is still healthy");
    assert_eq!(decision.mode, QueenMode::Defending);
}

#[test]
fn threatened_queen_without_towers_fortifies_closest_free_site() {
    let world = Scenario::new()
        .site(0, 600, 100, free_site(100))
        .site(1, 300, 100, free_site(100))
        .queen(Owner::Friendly, 100, 100, 100)
        .creep(Owner::Enemy, CreepKind::Knight, 400, 100)
        .build();

    let decision = QueenPolicy::new().decide(&world);
    assert_eq!(decision.action, build(1, BuildKind::Tower));
    assert_eq!(decision.rule, "fortify-free-site");
}

#[test]
fn threatened_queen_on_own_mine_fortifies_it() {
    let world = Scenario::new()
        .site(0, 100, 100, own_mine(2, 2))
        .queen(Owner::Friendly, 100, 100, 100)
        .creep(Owner::Enemy, CreepKind::Knight, 400, 100)
        .touching(0)
        .build();

    let decision = QueenPolicy::new().decide(&world);
    assert_eq!(decision.action, build(0, BuildKind::Tower));
    assert_eq!(decision.rule, "fortify-touched-site");
}

#[test]
fn threatened_queen_with_nowhere_to_build_retreats() {
    let with_archer = Scenario::new()
        .queen(Owner::Friendly, 500, 500, 100)
        .creep(Owner::Enemy, CreepKind::Knight, 700, 500)
        .creep(Owner::Friendly, CreepKind::Archer, 300, 450)
        .build();
    let decision = QueenPolicy::new().decide(&with_archer);
    assert_eq!(decision.action, QueenAction::Move(Position::new(300, 450)));
    assert_eq!(decision.rule, "retreat-to-archer");

    let alone = Scenario::new()
        .queen(Owner::Friendly, 500, 500, 100)
        .creep(Owner::Enemy, CreepKind::Knight, 700, 500)
        .build();
    let decision = QueenPolicy::new().decide(&alone);
    assert_eq!(decision.action, QueenAction::Move(Position::ORIGIN));
    assert_eq!(decision.action.to_string(), "MOVE 0 0");
}

#[test]
fn nearby_enemy_barracks_are_raided() {
    let world = Scenario::new()
        .site(0, 400, 100, structure(StructureKind::Barracks, Owner::Enemy, 0, 0))
        .site(1, 150, 600, free_site(100))
        .queen(Owner::Friendly, 150, 100, 80)
        .build();

    let decision = QueenPolicy::new().decide(&world);
    assert_eq!(decision.action, QueenAction::Move(Position::new(400, 100)));
    assert_eq!(decision.mode, QueenMode::Attacking);
}

#[test]
fn enemy_barracks_at_raid_distance_are_only_approached() {
    let world = Scenario::new()
        .site(0, 460, 100, structure(StructureKind::Barracks, Owner::Enemy, 0, 0))
        .queen(Owner::Friendly, 100, 100, 100)
        .build();

    let decision = QueenPolicy::new().decide(&world);
    assert_eq!(decision.action, QueenAction::Move(Position::new(460, 100)));
    assert_eq!(decision.rule, "advance-on-enemy-barracks", "edge distance 300 is not a raid");
    assert_eq!(decision.mode, QueenMode::IdleMove);
}

#[test]
fn queen_with_nothing_to_claim_advances_on_enemy_barracks() {
    let world = Scenario::new()
        .site(0, 100, 100, own_mine(3, 3))
        .site(1, 1500, 100, structure(StructureKind::Barracks, Owner::Enemy, 0, 1))
        .queen(Owner::Friendly, 100, 100, 100)
        .build();

    let decision = QueenPolicy::new().decide(&world);
    assert_eq!(decision.action, QueenAction::Move(Position::new(1500, 100)));
    assert_eq!(decision.action.to_string(), "MOVE 1500 100");
    assert_eq!(decision.rule, "advance-on-enemy-barracks");
}

#[test]
fn touched_weak_tower_is_upgraded() {
    let world = Scenario::new()
        .site(0, 100, 100, structure(StructureKind::Tower, Owner::Friendly, 549, 300))
        .queen(Owner::Friendly, 100, 100, 100)
        .touching(0)
        .build();

    let decision = QueenPolicy::new().decide(&world);
    assert_eq!(decision.action, build(0, BuildKind::Tower));
    assert_eq!(decision.mode, QueenMode::Economy);
}

#[test]
fn touched_large_mine_is_upgraded() {
    let world = Scenario::new()
        .site(0, 100, 100, own_mine(2, 4))
        .queen(Owner::Friendly, 100, 100, 100)
        .touching(0)
        .build();

    assert_eq!(QueenPolicy::new().decide(&world).action, build(0, BuildKind::Mine));
}

#[test]
fn depleted_mine_is_replaced_by_first_missing_barracks() {
    let world = Scenario::new()
        .site(0, 100, 100, own_mine(1, 1))
        .site(1, 400, 100, structure(StructureKind::Barracks, Owner::Friendly, 0, 0))
        .queen(Owner::Friendly, 100, 100, 100)
        .touching(0)
        .build();

    let decision = QueenPolicy::new().decide(&world);
    assert_eq!(decision.action, build(0, BuildKind::Barracks(CreepKind::Archer)));
    assert_eq!(decision.rule, "replace-depleted-mine");
}

#[test]
fn idle_queen_walks_to_safe_free_site() {
    let world = Scenario::new()
        .site(0, 300, 100, free_site(100))
        .site(1, 900, 100, free_site(100))
        .site(2, 450, 100, structure(StructureKind::Tower, Owner::Enemy, 500, 200))
        .queen(Owner::Friendly, 100, 100, 100)
        .build();

    let decision = QueenPolicy::new().decide(&world);
    assert_eq!(decision.action, QueenAction::Move(Position::new(900, 100)));
    assert_eq!(decision.mode, QueenMode::IdleMove);
}

#[test]
fn no_objective_means_no_action() {
    let world = Scenario::new()
        .site(0, 100, 100, own_mine(3, 3))
        .queen(Owner::Friendly, 900, 900, 100)
        .build();

    let decision = QueenPolicy::new().decide(&world);
    assert_eq!(decision.action, QueenAction::Idle);
    assert_eq!(decision.action.to_string(), "");
}

#[test]
fn decisions_are_idempotent() {
    let world = Scenario::new()
        .site(0, 150, 100, structure(StructureKind::Tower, Owner::Friendly, 300, 200))
        .site(1, 600, 100, free_site(100))
        .queen(Owner::Friendly, 100, 100, 100)
        .queen(Owner::Enemy, 1800, 800, 100)
        .creep(Owner::Enemy, CreepKind::Knight, 400, 100)
        .build();

    let policy = QueenPolicy::new();
    let first = policy.decide(&world);
    let second = policy.decide(&world);
    assert_eq!(first, second);
}
