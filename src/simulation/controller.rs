//! Simulation controller
//!
//! Composes the registry, boundary policy, scheduler and interpolator, and
//! is the only thing the host talks to. The controller owns the event queue
//! and the clock outright: time moves only inside `tick`, so nothing can fire
//! after `dispose` or against a lattice that `initialize` has replaced.

use glam::Vec2;
use tracing::{debug, error, info, warn};

use crate::animation::{AnimationInterpolator, JumpPhase};
use crate::boundary::{Boundary, BoundaryPolicy, TargetKind};
use crate::core::config::SimulationParams;
use crate::core::error::{AsepError, Result};
use crate::core::types::{Direction, Endpoint, ParticleId, SimTime, Transition};
use crate::lattice::ParticleRegistry;
use crate::render::{collect_scene, SceneView};
use crate::scheduler::{FireOutcome, JumpScheduler, RateParams};
use crate::simulation::events::{EventBuffer, SimEvent, SimEventKind};
use crate::simulation::interaction::{Action, ClickOutcome, ClickTarget};
use crate::simulation::stats::SimulationStats;

/// Who a commit is for: an existing particle, or the reservoir feeding site 0
#[derive(Debug, Clone, Copy)]
enum Subject {
    Particle(ParticleId),
    Inbound,
}

#[derive(Debug)]
pub struct SimulationController<B: BoundaryPolicy = Boundary> {
    params: SimulationParams,
    boundary: B,
    registry: ParticleRegistry,
    scheduler: JumpScheduler,
    interpolator: AnimationInterpolator,
    /// Reservoir entry in flight; the particle only exists once it commits
    inbound: JumpPhase,
    clock: SimTime,
    paused: bool,
    disposed: bool,
    fresh_commit: bool,
    stats: SimulationStats,
    events: EventBuffer,
}

impl<B: BoundaryPolicy> SimulationController<B> {
    /// Build a controller and run `initialize` with `params`
    pub fn new(params: SimulationParams) -> Result<Self> {
        let params = params.clamped();
        params.validate()?;
        let mut controller = Self {
            boundary: B::from_params(&params),
            registry: ParticleRegistry::new(params.lattice_size),
            scheduler: JumpScheduler::new(RateParams::from_params(&params), params.seed),
            interpolator: AnimationInterpolator::new(params.animation, params.animation_speed),
            inbound: JumpPhase::Idle,
            clock: 0.0,
            paused: params.is_paused,
            disposed: false,
            fresh_commit: false,
            stats: SimulationStats::new(params.lattice_size),
            events: EventBuffer::default(),
            params: params.clone(),
        };
        controller.initialize(params)?;
        Ok(controller)
    }

    // === ACCESSORS ===

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn boundary(&self) -> &B {
        &self.boundary
    }

    pub fn registry(&self) -> &ParticleRegistry {
        &self.registry
    }

    pub fn interpolator(&self) -> &AnimationInterpolator {
        &self.interpolator
    }

    pub fn scheduler(&self) -> &JumpScheduler {
        &self.scheduler
    }

    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    /// Reservoir entry currently being animated
    pub fn inbound(&self) -> &JumpPhase {
        &self.inbound
    }

    pub fn particle_count(&self) -> usize {
        self.registry.len()
    }

    pub fn clock(&self) -> SimTime {
        self.clock
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// True if no transition is in flight anywhere
    pub fn is_quiescent(&self) -> bool {
        self.inbound.is_idle() && self.registry.iter().all(|p| p.is_idle())
    }

    /// Read-only snapshot for the render callback
    pub fn view(&self) -> SceneView {
        collect_scene(self)
    }

    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        self.events.drain()
    }

    fn ensure_live(&self) -> Result<()> {
        if self.disposed {
            Err(AsepError::Disposed)
        } else {
            Ok(())
        }
    }

    // === LIFECYCLE ===

    /// Start over with a fresh lattice.
    ///
    /// Everything is validated and the new lattice populated before the old
    /// state is touched, so a failed call leaves the running simulation as
    /// it was.
    pub fn initialize(&mut self, params: SimulationParams) -> Result<()> {
        self.ensure_live()?;
        let params = params.clamped();
        params.validate()?;

        let boundary = B::from_params(&params);
        let mut scheduler = JumpScheduler::new(RateParams::from_params(&params), params.seed);
        let mut registry = ParticleRegistry::new(params.lattice_size);
        registry.place_random(params.num_particles, scheduler.rng_mut())?;

        self.scheduler.cancel_all(&mut self.registry);
        self.registry.clear();

        self.boundary = boundary;
        self.registry = registry;
        self.scheduler = scheduler;
        self.interpolator = AnimationInterpolator::new(params.animation, params.animation_speed);
        self.inbound = JumpPhase::Idle;
        self.clock = 0.0;
        self.paused = params.is_paused;
        self.fresh_commit = true;
        self.stats = SimulationStats::new(params.lattice_size);
        self.events.clear();
        self.events.push(0.0, SimEventKind::Reset);
        self.params = params;

        if !self.paused {
            self.arm_all(0.0);
        }

        info!(
            boundary = self.boundary.kind().name(),
            sites = self.boundary.size(),
            particles = self.registry.len(),
            "simulation initialized"
        );
        Ok(())
    }

    /// Apply a new parameter set.
    ///
    /// Values are clamped first. A change to the lattice shape, particle
    /// count or seed re-initializes; a rate change re-arms every idle
    /// particle with fresh waits.
    pub fn update(&mut self, params: SimulationParams) -> Result<()> {
        self.ensure_live()?;
        let params = params.clamped();
        if self.params.is_structural_change(&params) {
            return self.initialize(params);
        }

        let rates_changed = self.params.rates_changed(&params);
        let pause_changed = self.params.is_paused != params.is_paused;
        debug!(?params, rates_changed, pause_changed, "parameters updated");

        self.scheduler.set_rates(RateParams::from_params(&params));
        self.interpolator = AnimationInterpolator::new(params.animation, params.animation_speed);
        self.params = params;

        if pause_changed {
            self.set_paused(self.params.is_paused)?;
        } else if rates_changed && !self.paused {
            self.scheduler.cancel_entry();
            self.arm_all(self.clock);
        }
        Ok(())
    }

    /// Pause or resume.
    ///
    /// Pausing leaves armed events in the queue but freezes the clock, so
    /// none of them fire. Resuming draws a fresh wait for every idle
    /// particle; by memorylessness this is the same process.
    pub fn set_paused(&mut self, paused: bool) -> Result<()> {
        self.ensure_live()?;
        self.params.is_paused = paused;
        if paused == self.paused {
            return Ok(());
        }
        self.paused = paused;
        if paused {
            self.events.push(self.clock, SimEventKind::Paused);
            info!(at = self.clock, "simulation paused");
        } else {
            self.scheduler.cancel_entry();
            self.arm_all(self.clock);
            self.events.push(self.clock, SimEventKind::Resumed);
            info!(at = self.clock, "simulation resumed");
        }
        Ok(())
    }

    /// Cancel everything and drop all state. The controller is unusable
    /// afterwards.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.scheduler.cancel_all(&mut self.registry);
        self.registry.clear();
        self.inbound = JumpPhase::Idle;
        self.events.clear();
        self.disposed = true;
        info!("simulation disposed");
    }

    pub fn apply_action(&mut self, action: Action) -> Result<()> {
        match action {
            Action::ResetSimulation => self.initialize(self.params.clone()),
            Action::TogglePause => self.set_paused(!self.paused),
        }
    }

    // === TIME ===

    /// Advance by `dt` seconds.
    ///
    /// Fires every event due in the window, in time order, then advances
    /// all transitions in flight. Returns true if anything is mid-transition
    /// or a commit happened since the last call.
    pub fn tick(&mut self, dt: f64) -> bool {
        if self.disposed || self.paused {
            return false;
        }
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        let target = self.clock + dt;

        while let Some(outcome) =
            self.scheduler
                .fire_next(target, &mut self.registry, &self.boundary)
        {
            self.handle_outcome(outcome);
        }
        self.clock = target;

        let animating = self.advance_transitions(dt);
        self.stats.observe(self.registry.lattice(), self.clock);

        let needs_render = animating || self.fresh_commit;
        self.fresh_commit = false;
        needs_render
    }

    /// Tick in fixed steps until `duration` seconds have passed
    pub fn run_for(&mut self, duration: f64, step: f64) {
        if step <= 0.0 || !duration.is_finite() {
            return;
        }
        let mut remaining = duration;
        while remaining > 0.0 && !self.disposed && !self.paused {
            let dt = step.min(remaining);
            self.tick(dt);
            remaining -= dt;
        }
    }

    fn handle_outcome(&mut self, outcome: FireOutcome) {
        match outcome {
            FireOutcome::Stale => {}
            FireOutcome::Rejected { .. } => {
                self.stats.rejections += 1;
            }
            FireOutcome::Accepted {
                particle,
                transition,
                time,
                ..
            } => {
                if let Err(e) = self.start_transition(Subject::Particle(particle), transition, time) {
                    warn!(particle = %particle, error = %e, "could not start transition");
                    self.arm_particle(particle, time);
                }
            }
            FireOutcome::EntryAccepted { transition, time } => {
                if let Err(e) = self.start_transition(Subject::Inbound, transition, time) {
                    warn!(error = %e, "could not start entry");
                }
            }
        }
    }

    /// Reserve the destination and hand the transition to the interpolator,
    /// or commit on the spot when transitions are instant
    fn start_transition(&mut self, subject: Subject, transition: Transition, now: SimTime) -> Result<()> {
        let idle = match subject {
            Subject::Particle(id) => self
                .registry
                .get(id)
                .ok_or(AsepError::ParticleNotFound(id))?
                .is_idle(),
            Subject::Inbound => self.inbound.is_idle(),
        };
        if !idle {
            return Err(match subject {
                Subject::Particle(id) => AsepError::ParticleBusy(id),
                Subject::Inbound => AsepError::SiteOccupied(0),
            });
        }

        if self.interpolator.is_instant() {
            return self.commit(subject, transition, now);
        }
        if let Endpoint::Site(site) = transition.to {
            self.registry.reserve(site)?;
        }
        let phase = self.interpolator.begin(transition);
        match subject {
            Subject::Particle(id) => {
                if let Some(particle) = self.registry.get_mut(id) {
                    self.scheduler.cancel_particle(particle);
                    particle.phase = phase;
                }
            }
            Subject::Inbound => {
                self.scheduler.cancel_entry();
                self.inbound = phase;
            }
        }
        Ok(())
    }

    /// Advance every transition in flight; commit the ones that finish
    fn advance_transitions(&mut self, dt: f64) -> bool {
        let mut animating = false;

        for id in self.registry.ids() {
            let finished = match self.registry.get_mut(id) {
                Some(particle) if !particle.is_idle() => {
                    animating = true;
                    self.interpolator.advance(&mut particle.phase, dt)
                }
                _ => None,
            };
            if let Some(transition) = finished {
                if let Err(e) = self.commit(Subject::Particle(id), transition, self.clock) {
                    error!(particle = %id, error = %e, "commit failed");
                }
            }
        }

        if !self.inbound.is_idle() {
            animating = true;
            if let Some(transition) = self.interpolator.advance(&mut self.inbound, dt) {
                if let Err(e) = self.commit(Subject::Inbound, transition, self.clock) {
                    error!(error = %e, "entry commit failed");
                }
            }
        }

        animating
    }

    /// The single point where a transition becomes logical truth
    fn commit(&mut self, subject: Subject, transition: Transition, now: SimTime) -> Result<()> {
        self.stats.observe(self.registry.lattice(), now);

        match (subject, transition.from, transition.to) {
            (Subject::Particle(id), Endpoint::Site(from), Endpoint::Site(to)) => {
                self.registry.commit_move(id, from, to)?;
                let direction = self.hop_direction(from, to);
                self.stats.record_hop(direction);
                self.events.push(now, SimEventKind::Hop { particle: id, from, to });
                debug!(particle = %id, from, to, at = now, "hop committed");
                if let Some(particle) = self.registry.get_mut(id) {
                    particle.phase = JumpPhase::Idle;
                }
                self.arm_particle(id, now);
            }
            (Subject::Particle(id), Endpoint::Site(site), Endpoint::ExitReservoir) => {
                self.registry.remove_particle(id)?;
                self.stats.exits += 1;
                self.events.push(now, SimEventKind::Exited { particle: id, site });
                debug!(particle = %id, site, at = now, "exit committed");
            }
            (Subject::Inbound, Endpoint::EntryReservoir, Endpoint::Site(site)) => {
                self.registry.release(site);
                let id = self.registry.spawn_at(site)?;
                self.inbound = JumpPhase::Idle;
                self.stats.entries += 1;
                self.events.push(now, SimEventKind::Entered { particle: id, site });
                debug!(particle = %id, site, at = now, "entry committed");
                self.arm_particle(id, now);
            }
            (subject, from, to) => {
                return Err(AsepError::Config(format!(
                    "inconsistent transition {:?} -> {:?} for {:?}",
                    from, to, subject
                )));
            }
        }

        self.fresh_commit = true;
        self.refresh_entry(now);
        Ok(())
    }

    fn hop_direction(&self, from: usize, to: usize) -> Direction {
        if self.boundary.candidate_target(from, Direction::Right) == TargetKind::InBounds(to) {
            Direction::Right
        } else {
            Direction::Left
        }
    }

    // === SCHEDULING ===

    fn arm_particle(&mut self, id: ParticleId, now: SimTime) {
        if self.paused || self.disposed {
            return;
        }
        if let Some(particle) = self.registry.get_mut(id) {
            self.scheduler.arm_particle(now, particle, &self.boundary);
        }
    }

    /// Arm an entry attempt if the reservoir has none pending and site 0
    /// can take a particle
    fn refresh_entry(&mut self, now: SimTime) {
        if self.paused || self.disposed || self.scheduler.has_entry_pending() {
            return;
        }
        if self.inbound.is_idle() && self.boundary.is_entry_legal(self.registry.lattice()) {
            self.scheduler.arm_entry(now, &self.boundary);
        }
    }

    /// Fresh waits for every idle particle and the reservoir
    fn arm_all(&mut self, now: SimTime) {
        for id in self.registry.ids() {
            self.arm_particle(id, now);
        }
        self.refresh_entry(now);
        self.scheduler.purge_stale(&self.registry);
    }

    // === INTERACTION ===

    /// Toggle a particle on a site, or start a manual reservoir transition.
    ///
    /// Exclusion is checked synchronously; a click that would break it is
    /// rejected with no change.
    pub fn handle_click(&mut self, target: ClickTarget) -> Result<ClickOutcome> {
        self.ensure_live()?;
        match target {
            Endpoint::Site(site) => self.toggle_site(site),
            Endpoint::EntryReservoir => self.manual_entry(),
            Endpoint::ExitReservoir => self.manual_exit(),
        }
    }

    /// Hit-test a point in lattice units and click whatever is there
    pub fn click_at(&mut self, point: Vec2) -> Result<ClickOutcome> {
        self.ensure_live()?;
        match self.boundary.hit_test(point) {
            Some(target) => self.handle_click(target),
            None => Ok(ClickOutcome::Missed),
        }
    }

    fn toggle_site(&mut self, site: usize) -> Result<ClickOutcome> {
        let lattice = self.registry.lattice();
        if !lattice.contains(site) {
            return Err(AsepError::SiteOutOfRange {
                site,
                size: lattice.size(),
            });
        }
        self.stats.observe(lattice, self.clock);

        if let Some(particle) = self.registry.particle_at(site) {
            if !particle.is_idle() {
                return Ok(ClickOutcome::Rejected);
            }
            let id = particle.id;
            self.registry.remove_particle(id)?;
            self.stats.manual_edits += 1;
            self.events.push(self.clock, SimEventKind::Removed { particle: id, site });
            self.fresh_commit = true;
            self.refresh_entry(self.clock);
            debug!(particle = %id, site, "particle removed by hand");
            return Ok(ClickOutcome::Removed { particle: id, site });
        }

        if self.registry.lattice().is_reserved(site) {
            return Ok(ClickOutcome::Rejected);
        }
        let id = self.registry.spawn_at(site)?;
        self.stats.manual_edits += 1;
        self.events.push(self.clock, SimEventKind::Added { particle: id, site });
        self.fresh_commit = true;
        self.arm_particle(id, self.clock);
        debug!(particle = %id, site, "particle placed by hand");
        Ok(ClickOutcome::Added { particle: id, site })
    }

    fn manual_entry(&mut self) -> Result<ClickOutcome> {
        if !self.boundary.has_reservoirs() {
            return Err(AsepError::NoReservoir);
        }
        let site = match self.boundary.entry_target() {
            Some(site) if self.inbound.is_idle() && self.boundary.is_entry_legal(self.registry.lattice()) => site,
            _ => return Ok(ClickOutcome::Rejected),
        };
        self.scheduler.cancel_entry();
        self.start_transition(Subject::Inbound, Transition::entry(site), self.clock)?;
        Ok(ClickOutcome::EntryStarted)
    }

    fn manual_exit(&mut self) -> Result<ClickOutcome> {
        if !self.boundary.has_reservoirs() {
            return Err(AsepError::NoReservoir);
        }
        let last = self.registry.lattice().last_site();
        let id = match self.registry.particle_at(last) {
            Some(particle) if particle.is_idle() && self.boundary.exits_at(last) => particle.id,
            _ => return Ok(ClickOutcome::Rejected),
        };
        self.start_transition(Subject::Particle(id), Transition::exit(last), self.clock)?;
        Ok(ClickOutcome::ExitStarted { particle: id })
    }
}
