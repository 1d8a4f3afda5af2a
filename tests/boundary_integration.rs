//! Boundary policy integration tests
//!
//! Neighbourhood rules, geometry and hit testing of the three lattice
//! shapes, exercised through the `Boundary` union the controller uses.

use asep_sim::boundary::{Boundary, BoundaryPolicy, PathShape, TargetKind};
use asep_sim::core::config::BoundaryKind;
use asep_sim::core::types::{Direction, Endpoint, Transition};
use asep_sim::lattice::ParticleRegistry;
use asep_sim::scheduler::jump::{resolve, MoveChoice, Rejection};

const N: usize = 7;

#[test]
fn test_closed_walls_block_both_ends() {
    let closed = Boundary::new(BoundaryKind::Closed, N);
    assert_eq!(closed.candidate_target(N - 1, Direction::Right), TargetKind::Blocked);
    assert_eq!(closed.candidate_target(0, Direction::Left), TargetKind::Blocked);
    for site in 0..N - 1 {
        assert_eq!(
            closed.candidate_target(site, Direction::Right),
            TargetKind::InBounds(site + 1)
        );
    }
    assert!(!closed.has_reservoirs());
    assert!(!closed.exits_at(N - 1));
    assert_eq!(closed.bond_count(), N - 1);
}

#[test]
fn test_circular_never_blocks() {
    let ring = Boundary::new(BoundaryKind::Circular, N);
    for site in 0..N {
        for direction in [Direction::Right, Direction::Left] {
            assert!(matches!(
                ring.candidate_target(site, direction),
                TargetKind::InBounds(_)
            ));
        }
    }
    assert_eq!(ring.candidate_target(N - 1, Direction::Right), TargetKind::InBounds(0));
    assert_eq!(ring.candidate_target(0, Direction::Left), TargetKind::InBounds(N - 1));
    assert_eq!(ring.bond_count(), N);
}

#[test]
fn test_open_single_sided_reservoirs() {
    let open = Boundary::new(BoundaryKind::Open, N);
    assert_eq!(open.candidate_target(N - 1, Direction::Right), TargetKind::ReservoirExit);
    assert_eq!(
        open.candidate_target(0, Direction::Left),
        TargetKind::ReservoirEntryPoint
    );
    assert_eq!(open.entry_target(), Some(0));
    assert!(open.exits_at(N - 1));
    assert!(!open.exits_at(0));
    assert!(open.has_reservoirs());
}

#[test]
fn test_entry_legality_tracks_site_zero() {
    let open = Boundary::new(BoundaryKind::Open, N);
    let mut registry = ParticleRegistry::new(N);
    assert!(open.is_entry_legal(registry.lattice()));

    registry.reserve(0).unwrap();
    assert!(!open.is_entry_legal(registry.lattice()));
    registry.release(0);

    let id = registry.spawn_at(0).unwrap();
    assert!(!open.is_entry_legal(registry.lattice()));
    registry.remove_particle(id).unwrap();
    assert!(open.is_entry_legal(registry.lattice()));
}

#[test]
fn test_resolve_checks_occupancy_and_reservations() {
    let ring = Boundary::new(BoundaryKind::Circular, N);
    let mut registry = ParticleRegistry::new(N);
    registry.spawn_at(3).unwrap();
    registry.spawn_at(4).unwrap();
    registry.reserve(2).unwrap();

    assert_eq!(
        resolve(3, MoveChoice::Hop(Direction::Right), &ring, registry.lattice()),
        Err(Rejection::Occupied(4))
    );
    assert_eq!(
        resolve(3, MoveChoice::Hop(Direction::Left), &ring, registry.lattice()),
        Err(Rejection::Reserved(2))
    );
    assert_eq!(
        resolve(4, MoveChoice::Hop(Direction::Right), &ring, registry.lattice()),
        Ok(Transition::hop(4, 5))
    );
}

#[test]
fn test_paths_connect_endpoints() {
    for kind in [BoundaryKind::Closed, BoundaryKind::Circular, BoundaryKind::Open] {
        let boundary = Boundary::new(kind, N);
        let hop = Transition::hop(2, 3);
        let path = boundary.path(&hop);
        assert!(path.start().distance(boundary.site_position(2)) < 1e-4);
        assert!(path.end().distance(boundary.site_position(3)) < 1e-4);
    }

    let ring = Boundary::new(BoundaryKind::Circular, N);
    assert!(matches!(ring.path(&Transition::hop(N - 1, 0)), PathShape::Arc { .. }));

    let open = Boundary::new(BoundaryKind::Open, N);
    let exit = open.path(&Transition::exit(N - 1));
    assert!(matches!(exit, PathShape::Portal { .. }));
    let sink = open.reservoir_position(Endpoint::ExitReservoir).unwrap();
    assert!(exit.end().distance(sink) < 1e-4);
}

#[test]
fn test_ring_neighbours_are_evenly_spaced() {
    let ring = Boundary::new(BoundaryKind::Circular, N);
    let gaps: Vec<f32> = (0..N)
        .map(|s| ring.site_position(s).distance(ring.site_position((s + 1) % N)))
        .collect();
    for gap in &gaps {
        assert!((gap - gaps[0]).abs() < 1e-4);
    }
}

#[test]
fn test_hit_test_round_trip() {
    for kind in [BoundaryKind::Closed, BoundaryKind::Circular, BoundaryKind::Open] {
        let boundary = Boundary::new(kind, N);
        for site in 0..N {
            assert_eq!(
                boundary.hit_test(boundary.site_position(site)),
                Some(Endpoint::Site(site))
            );
        }
    }
    let open = Boundary::new(BoundaryKind::Open, N);
    for reservoir in [Endpoint::EntryReservoir, Endpoint::ExitReservoir] {
        let anchor = open.reservoir_position(reservoir).unwrap();
        assert_eq!(open.hit_test(anchor), Some(reservoir));
    }
    let closed = Boundary::new(BoundaryKind::Closed, N);
    let beyond = closed.site_position(0) - glam::Vec2::new(1.5, 0.0);
    assert_eq!(closed.hit_test(beyond), None);
}
