//! Exponential-race jump scheduling
//!
//! Each idle particle carries one armed event whose wait time is drawn from
//! an exponential distribution with the particle's total rate. Which move the
//! event performs is only decided when it fires, against the lattice as it
//! is at that moment. An illegal move is rejected without touching any state
//! and the particle is re-armed with a fresh wait.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::trace;

use crate::boundary::{BoundaryPolicy, TargetKind};
use crate::core::config::SimulationParams;
use crate::core::types::{Direction, ParticleId, SimTime, SiteIndex, Transition};
use crate::lattice::{Lattice, Particle, ParticleRegistry};
use crate::scheduler::queue::{EventKind, EventQueue, EventToken};

/// Rates the scheduler samples from
///
/// Configuration only: replacing them affects waits drawn afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateParams {
    pub right: f64,
    pub left: f64,
    pub entry: f64,
    pub exit: f64,
    /// Divides every wait time; the animation speed of the host
    pub time_scale: f64,
}

impl RateParams {
    pub fn from_params(params: &SimulationParams) -> Self {
        Self {
            right: params.right_rate,
            left: params.left_rate,
            entry: params.entry_rate,
            exit: params.exit_rate,
            time_scale: params.animation_speed,
        }
    }

    /// Total jump rate of a particle; the exit rate only counts on a site
    /// that borders the sink reservoir
    pub fn total(&self, exits: bool) -> f64 {
        let mut total = self.right + self.left;
        if exits {
            total += self.exit;
        }
        total
    }

    /// Rates seen by a particle on `site`. A direction that runs into a wall
    /// can never be taken, so it drops out of the race.
    pub fn at_site<B: BoundaryPolicy + ?Sized>(&self, site: SiteIndex, boundary: &B) -> Self {
        let mut rates = *self;
        if boundary.candidate_target(site, Direction::Right) == TargetKind::Blocked {
            rates.right = 0.0;
        }
        if boundary.candidate_target(site, Direction::Left) == TargetKind::Blocked {
            rates.left = 0.0;
        }
        rates
    }
}

impl Default for RateParams {
    fn default() -> Self {
        Self::from_params(&SimulationParams::default())
    }
}

/// The move chosen when a jump event fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveChoice {
    Hop(Direction),
    Exit,
}

/// Why a fired event did not produce a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Wall, or a hop pointed at a reservoir
    Blocked,
    Occupied(SiteIndex),
    /// Destination of another transition in flight
    Reserved(SiteIndex),
    /// Entry site taken or reserved
    EntryBlocked,
}

/// Result of firing one due event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FireOutcome {
    /// A particle's move was accepted and must now be animated or committed
    Accepted {
        particle: ParticleId,
        choice: MoveChoice,
        transition: Transition,
        time: SimTime,
    },
    /// The source reservoir feeds site 0
    EntryAccepted { transition: Transition, time: SimTime },
    /// Nothing changed
    Rejected {
        particle: Option<ParticleId>,
        reason: Rejection,
        time: SimTime,
    },
    /// The event had been cancelled
    Stale,
}

#[derive(Debug)]
pub struct JumpScheduler {
    queue: EventQueue,
    rng: ChaCha8Rng,
    rates: RateParams,
    entry_pending: Option<EventToken>,
    armed: u64,
}

impl JumpScheduler {
    /// Create a scheduler; `None` seeds from entropy
    pub fn new(rates: RateParams, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            queue: EventQueue::new(),
            rng,
            rates,
            entry_pending: None,
            armed: 0,
        }
    }

    pub fn rates(&self) -> &RateParams {
        &self.rates
    }

    pub fn set_rates(&mut self, rates: RateParams) {
        self.rates = rates;
    }

    pub fn rng_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    /// Events armed since creation, including re-arms after rejection
    pub fn armed_count(&self) -> u64 {
        self.armed
    }

    /// Events in the queue, stale ones included
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn next_fire_time(&self) -> Option<SimTime> {
        self.queue.peek_time()
    }

    pub fn has_entry_pending(&self) -> bool {
        self.entry_pending.is_some()
    }

    /// Exponential wait for `total_rate`, scaled by the time scale
    pub fn sample_wait(&mut self, total_rate: f64) -> Option<SimTime> {
        if total_rate <= 0.0 || !total_rate.is_finite() {
            return None;
        }
        // gen() is in [0, 1); flip it so ln never sees zero
        let u: f64 = 1.0 - self.rng.gen::<f64>();
        Some(-u.ln() / total_rate / self.rates.time_scale.max(f64::MIN_POSITIVE))
    }

    /// Arm the next jump of an idle particle, replacing any pending event.
    ///
    /// A particle whose total rate is zero is left without an event.
    pub fn arm_particle<B: BoundaryPolicy + ?Sized>(
        &mut self,
        now: SimTime,
        particle: &mut Particle,
        boundary: &B,
    ) -> Option<EventToken> {
        particle.pending = None;
        if !particle.is_idle() {
            return None;
        }
        let site = particle.site();
        let total = self
            .rates
            .at_site(site, boundary)
            .total(boundary.exits_at(site));
        let wait = self.sample_wait(total)?;
        let token = self.queue.push(now + wait, EventKind::Jump(particle.id));
        particle.pending = Some(token);
        self.armed += 1;
        trace!(particle = %particle.id, site = particle.site(), at = now + wait, "armed jump");
        Some(token)
    }

    pub fn cancel_particle(&mut self, particle: &mut Particle) {
        particle.pending = None;
    }

    /// Arm the next reservoir entry attempt, replacing any pending one
    pub fn arm_entry<B: BoundaryPolicy + ?Sized>(
        &mut self,
        now: SimTime,
        boundary: &B,
    ) -> Option<EventToken> {
        self.entry_pending = None;
        if !boundary.has_reservoirs() {
            return None;
        }
        let wait = self.sample_wait(self.rates.entry)?;
        let token = self.queue.push(now + wait, EventKind::Entry);
        self.entry_pending = Some(token);
        self.armed += 1;
        trace!(at = now + wait, "armed entry");
        Some(token)
    }

    pub fn cancel_entry(&mut self) {
        self.entry_pending = None;
    }

    /// Cancel every armed event, for particles and the reservoir alike
    pub fn cancel_all(&mut self, registry: &mut ParticleRegistry) {
        for id in registry.ids() {
            if let Some(particle) = registry.get_mut(id) {
                particle.pending = None;
            }
        }
        self.entry_pending = None;
        self.queue.clear();
    }

    /// Drop queued events whose tokens nobody holds any more
    pub fn purge_stale(&mut self, registry: &ParticleRegistry) {
        let entry = self.entry_pending;
        self.queue.retain(|ev| match ev.kind {
            EventKind::Entry => entry == Some(ev.token),
            EventKind::Jump(id) => registry
                .get(id)
                .map(|p| p.pending == Some(ev.token))
                .unwrap_or(false),
        });
    }

    /// Pick a move by partitioning `[0, total)` into right, left and exit slices
    pub fn choose_move(&mut self, rates: &RateParams, exits: bool) -> Option<MoveChoice> {
        let total = rates.total(exits);
        if total <= 0.0 {
            return None;
        }
        let v = self.rng.gen::<f64>() * total;
        Some(partition(v, rates, exits))
    }

    /// Fire the earliest event due at `now`, if any.
    ///
    /// Legality is decided here, against the lattice as it is now. A
    /// rejected particle is re-armed from the event's own fire time; a
    /// rejected entry is left unarmed.
    pub fn fire_next<B: BoundaryPolicy + ?Sized>(
        &mut self,
        now: SimTime,
        registry: &mut ParticleRegistry,
        boundary: &B,
    ) -> Option<FireOutcome> {
        let event = self.queue.pop_due(now)?;
        let time = event.time();

        match event.kind {
            EventKind::Entry => {
                if self.entry_pending != Some(event.token) {
                    return Some(FireOutcome::Stale);
                }
                self.entry_pending = None;
                match boundary.entry_target() {
                    Some(site) if boundary.is_entry_legal(registry.lattice()) => {
                        Some(FireOutcome::EntryAccepted {
                            transition: Transition::entry(site),
                            time,
                        })
                    }
                    _ => {
                        // Re-armed by the owner once site 0 frees up
                        trace!(at = time, "entry rejected");
                        Some(FireOutcome::Rejected {
                            particle: None,
                            reason: Rejection::EntryBlocked,
                            time,
                        })
                    }
                }
            }
            EventKind::Jump(id) => {
                let live = registry
                    .get(id)
                    .map(|p| p.pending == Some(event.token) && p.is_idle())
                    .unwrap_or(false);
                if !live {
                    return Some(FireOutcome::Stale);
                }

                let site = match registry.get_mut(id) {
                    Some(particle) => {
                        particle.pending = None;
                        particle.site()
                    }
                    None => return Some(FireOutcome::Stale),
                };

                let rates = self.rates.at_site(site, boundary);
                let Some(choice) = self.choose_move(&rates, boundary.exits_at(site)) else {
                    return Some(FireOutcome::Stale);
                };

                match resolve(site, choice, boundary, registry.lattice()) {
                    Ok(transition) => Some(FireOutcome::Accepted {
                        particle: id,
                        choice,
                        transition,
                        time,
                    }),
                    Err(reason) => {
                        trace!(particle = %id, site, ?choice, ?reason, "jump rejected");
                        if let Some(particle) = registry.get_mut(id) {
                            self.arm_particle(time, particle, boundary);
                        }
                        Some(FireOutcome::Rejected {
                            particle: Some(id),
                            reason,
                            time,
                        })
                    }
                }
            }
        }
    }
}

/// Map a uniform draw in `[0, total)` onto a move
fn partition(v: f64, rates: &RateParams, exits: bool) -> MoveChoice {
    if v < rates.right {
        MoveChoice::Hop(Direction::Right)
    } else if v < rates.right + rates.left || !exits {
        MoveChoice::Hop(Direction::Left)
    } else {
        MoveChoice::Exit
    }
}

/// Turn a chosen move into a transition, or say why it cannot happen
pub fn resolve<B: BoundaryPolicy + ?Sized>(
    site: SiteIndex,
    choice: MoveChoice,
    boundary: &B,
    lattice: &Lattice,
) -> Result<Transition, Rejection> {
    match choice {
        MoveChoice::Exit => {
            if boundary.exits_at(site) {
                Ok(Transition::exit(site))
            } else {
                Err(Rejection::Blocked)
            }
        }
        MoveChoice::Hop(direction) => match boundary.candidate_target(site, direction) {
            TargetKind::InBounds(target) if lattice.is_occupied(target) => {
                Err(Rejection::Occupied(target))
            }
            TargetKind::InBounds(target) if lattice.is_reserved(target) => {
                Err(Rejection::Reserved(target))
            }
            TargetKind::InBounds(target) => Ok(Transition::hop(site, target)),
            // Outflow is governed by the exit rate alone
            TargetKind::ReservoirExit
            | TargetKind::ReservoirEntryPoint
            | TargetKind::Blocked => Err(Rejection::Blocked),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::{Boundary, Closed, Open};
    use crate::core::config::BoundaryKind;

    fn rates(right: f64, left: f64, entry: f64, exit: f64) -> RateParams {
        RateParams {
            right,
            left,
            entry,
            exit,
            time_scale: 1.0,
        }
    }

    #[test]
    fn test_total_rate_includes_exit_only_at_boundary() {
        let r = rates(1.0, 0.5, 0.0, 2.0);
        assert_eq!(r.total(false), 1.5);
        assert_eq!(r.total(true), 3.5);
    }

    #[test]
    fn test_partition_slices() {
        let r = rates(1.0, 0.5, 0.0, 2.0);
        assert_eq!(partition(0.2, &r, true), MoveChoice::Hop(Direction::Right));
        assert_eq!(partition(1.2, &r, true), MoveChoice::Hop(Direction::Left));
        assert_eq!(partition(3.0, &r, true), MoveChoice::Exit);
        // Without exit slice the top of the range stays a left hop
        assert_eq!(partition(1.49, &r, false), MoveChoice::Hop(Direction::Left));
    }

    #[test]
    fn test_sample_wait_zero_rate() {
        let mut scheduler = JumpScheduler::new(rates(0.0, 0.0, 0.0, 0.0), Some(1));
        assert!(scheduler.sample_wait(0.0).is_none());
        let w = scheduler.sample_wait(2.0).unwrap();
        assert!(w >= 0.0 && w.is_finite());
    }

    #[test]
    fn test_sample_wait_mean() {
        let mut scheduler = JumpScheduler::new(rates(0.0, 0.0, 0.0, 0.0), Some(3));
        let n = 20_000;
        let mean: f64 = (0..n).map(|_| scheduler.sample_wait(4.0).unwrap()).sum::<f64>() / n as f64;
        assert!((mean - 0.25).abs() < 0.02, "mean wait {}", mean);
    }

    #[test]
    fn test_time_scale_shortens_waits() {
        let mut slow = JumpScheduler::new(rates(1.0, 0.0, 0.0, 0.0), Some(9));
        let mut fast = JumpScheduler::new(
            RateParams {
                time_scale: 4.0,
                ..rates(1.0, 0.0, 0.0, 0.0)
            },
            Some(9),
        );
        let a = slow.sample_wait(1.0).unwrap();
        let b = fast.sample_wait(1.0).unwrap();
        assert!((a / 4.0 - b).abs() < 1e-12);
    }

    #[test]
    fn test_zero_rate_particle_not_armed() {
        let mut registry = ParticleRegistry::new(5);
        let id = registry.spawn_at(2).unwrap();
        let boundary = Closed::new(5);
        let mut scheduler = JumpScheduler::new(rates(0.0, 0.0, 0.0, 0.0), Some(1));
        let particle = registry.get_mut(id).unwrap();
        assert!(scheduler.arm_particle(0.0, particle, &boundary).is_none());
        assert!(!particle.has_pending_event());
        assert_eq!(scheduler.queued(), 0);
    }

    #[test]
    fn test_walls_drop_out_of_the_race() {
        let closed = Closed::new(5);
        let r = rates(1.0, 0.5, 0.0, 0.0);
        assert_eq!(r.at_site(2, &closed).total(false), 1.5);
        assert_eq!(r.at_site(4, &closed).right, 0.0);
        assert_eq!(r.at_site(0, &closed).left, 0.0);

        // Right-only particle against the right wall is never armed
        let mut registry = ParticleRegistry::new(5);
        let id = registry.spawn_at(4).unwrap();
        let mut scheduler = JumpScheduler::new(rates(1.0, 0.0, 0.0, 0.0), Some(1));
        assert!(scheduler
            .arm_particle(0.0, registry.get_mut(id).unwrap(), &closed)
            .is_none());

        // Reservoir sides are not walls
        let open = Open::new(5);
        assert_eq!(r.at_site(4, &open).right, 1.0);
        assert_eq!(r.at_site(0, &open).left, 0.5);
    }

    #[test]
    fn test_rejection_leaves_state_and_rearms() {
        let mut registry = ParticleRegistry::new(5);
        let a = registry.spawn_at(2).unwrap();
        registry.spawn_at(3).unwrap();
        let boundary = Closed::new(5);
        let mut scheduler = JumpScheduler::new(rates(1.0, 0.0, 0.0, 0.0), Some(11));
        let first = scheduler
            .arm_particle(0.0, registry.get_mut(a).unwrap(), &boundary)
            .unwrap();

        let before = registry.lattice().occupancy();
        let outcome = scheduler.fire_next(f64::MAX, &mut registry, &boundary).unwrap();
        assert!(matches!(
            outcome,
            FireOutcome::Rejected {
                particle: Some(p),
                reason: Rejection::Occupied(3),
                ..
            } if p == a
        ));
        assert_eq!(registry.lattice().occupancy(), before);
        let particle = registry.get(a).unwrap();
        assert_eq!(particle.site(), 2);
        assert!(particle.has_pending_event());
        assert_ne!(particle.pending, Some(first));
    }

    #[test]
    fn test_cancelled_event_is_stale() {
        let mut registry = ParticleRegistry::new(5);
        let a = registry.spawn_at(0).unwrap();
        let boundary = Closed::new(5);
        let mut scheduler = JumpScheduler::new(rates(1.0, 0.0, 0.0, 0.0), Some(2));
        scheduler.arm_particle(0.0, registry.get_mut(a).unwrap(), &boundary);
        scheduler.cancel_particle(registry.get_mut(a).unwrap());
        let outcome = scheduler.fire_next(f64::MAX, &mut registry, &boundary);
        assert_eq!(outcome, Some(FireOutcome::Stale));
        assert!(scheduler.fire_next(f64::MAX, &mut registry, &boundary).is_none());
    }

    #[test]
    fn test_exit_accepted_at_last_site() {
        let mut registry = ParticleRegistry::new(5);
        let a = registry.spawn_at(4).unwrap();
        let boundary = Open::new(5);
        let mut scheduler = JumpScheduler::new(rates(0.0, 0.0, 0.0, 1.0), Some(4));
        scheduler.arm_particle(0.0, registry.get_mut(a).unwrap(), &boundary);
        let outcome = scheduler.fire_next(f64::MAX, &mut registry, &boundary).unwrap();
        match outcome {
            FireOutcome::Accepted {
                particle,
                choice,
                transition,
                ..
            } => {
                assert_eq!(particle, a);
                assert_eq!(choice, MoveChoice::Exit);
                assert!(transition.is_exit());
            }
            other => panic!("expected exit, got {:?}", other),
        }
    }

    #[test]
    fn test_hop_into_reservoir_is_blocked() {
        let lattice = Lattice::new(5);
        let open = Open::new(5);
        assert_eq!(
            resolve(4, MoveChoice::Hop(Direction::Right), &open, &lattice),
            Err(Rejection::Blocked)
        );
        assert_eq!(
            resolve(0, MoveChoice::Hop(Direction::Left), &open, &lattice),
            Err(Rejection::Blocked)
        );
        assert_eq!(
            resolve(3, MoveChoice::Exit, &open, &lattice),
            Err(Rejection::Blocked)
        );
    }

    #[test]
    fn test_entry_rejected_when_site_zero_taken() {
        let mut registry = ParticleRegistry::new(5);
        registry.spawn_at(0).unwrap();
        let boundary = Boundary::new(BoundaryKind::Open, 5);
        let mut scheduler = JumpScheduler::new(rates(0.0, 0.0, 1.0, 0.0), Some(5));
        scheduler.arm_entry(0.0, &boundary).unwrap();
        let outcome = scheduler.fire_next(f64::MAX, &mut registry, &boundary).unwrap();
        assert!(matches!(
            outcome,
            FireOutcome::Rejected {
                particle: None,
                reason: Rejection::EntryBlocked,
                ..
            }
        ));
        assert!(!scheduler.has_entry_pending());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_entry_not_armed_without_reservoirs() {
        let boundary = Closed::new(5);
        let mut scheduler = JumpScheduler::new(rates(0.0, 0.0, 1.0, 0.0), Some(5));
        assert!(scheduler.arm_entry(0.0, &boundary).is_none());
        assert!(!scheduler.has_entry_pending());
    }

    #[test]
    fn test_purge_stale_and_cancel_all() {
        let mut registry = ParticleRegistry::new(5);
        let a = registry.spawn_at(1).unwrap();
        let boundary = Closed::new(5);
        let mut scheduler = JumpScheduler::new(rates(1.0, 1.0, 0.0, 0.0), Some(8));
        for _ in 0..3 {
            scheduler.arm_particle(0.0, registry.get_mut(a).unwrap(), &boundary);
        }
        assert_eq!(scheduler.queued(), 3);
        scheduler.purge_stale(&registry);
        assert_eq!(scheduler.queued(), 1);
        scheduler.cancel_all(&mut registry);
        assert_eq!(scheduler.queued(), 0);
        assert!(!registry.get(a).unwrap().has_pending_event());
    }
}
