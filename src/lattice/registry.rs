//! Particle registry
//!
//! Owns every particle record together with the lattice they sit on. All
//! writes to a particle's site and to lattice occupancy go through here, so
//! the two can never disagree.

use ahash::AHashMap;
use rand::Rng;

use crate::animation::JumpPhase;
use crate::core::error::{AsepError, Result};
use crate::core::types::{ParticleId, SiteIndex};
use crate::lattice::occupancy::Lattice;
use crate::scheduler::EventToken;

/// A single particle on the lattice
#[derive(Debug, Clone)]
pub struct Particle {
    pub id: ParticleId,
    site: SiteIndex,
    /// Visual sub-state; `Idle` whenever no transition is in flight
    pub phase: JumpPhase,
    /// Token of the one armed event for this particle, if any
    pub(crate) pending: Option<EventToken>,
}

impl Particle {
    fn new(id: ParticleId, site: SiteIndex) -> Self {
        Self {
            id,
            site,
            phase: JumpPhase::Idle,
            pending: None,
        }
    }

    /// Committed site
    pub fn site(&self) -> SiteIndex {
        self.site
    }

    pub fn is_idle(&self) -> bool {
        self.phase.is_idle()
    }

    pub fn has_pending_event(&self) -> bool {
        self.pending.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct ParticleRegistry {
    lattice: Lattice,
    particles: AHashMap<ParticleId, Particle>,
    next_id: u32,
}

impl ParticleRegistry {
    pub fn new(size: usize) -> Self {
        Self {
            lattice: Lattice::new(size),
            particles: AHashMap::new(),
            next_id: 0,
        }
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn get(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.get(&id)
    }

    pub fn get_mut(&mut self, id: ParticleId) -> Option<&mut Particle> {
        self.particles.get_mut(&id)
    }

    pub fn particle_at(&self, site: SiteIndex) -> Option<&Particle> {
        self.lattice
            .occupant(site)
            .and_then(|id| self.particles.get(&id))
    }

    /// All particle ids in ascending order
    ///
    /// Callers that consume randomness per particle iterate this list so
    /// seeded runs stay reproducible.
    pub fn ids(&self) -> Vec<ParticleId> {
        let mut ids: Vec<ParticleId> = self.particles.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Particles in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = &Particle> + '_ {
        self.ids().into_iter().filter_map(move |id| self.particles.get(&id))
    }

    fn allocate_id(&mut self) -> ParticleId {
        let id = ParticleId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Place `count` particles on distinct random vacant sites.
    ///
    /// Fails without placing anything if there are not enough vacant sites.
    pub fn place_random<R: Rng + ?Sized>(
        &mut self,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<ParticleId>> {
        let vacant: Vec<SiteIndex> = self
            .lattice
            .vacant_sites()
            .filter(|&s| !self.lattice.is_reserved(s))
            .collect();
        if count > vacant.len() {
            return Err(AsepError::InsufficientCapacity {
                requested: count,
                capacity: vacant.len(),
            });
        }

        let mut chosen: Vec<SiteIndex> = rand::seq::index::sample(rng, vacant.len(), count)
            .into_iter()
            .map(|i| vacant[i])
            .collect();
        chosen.sort_unstable();

        let mut ids = Vec::with_capacity(count);
        for site in chosen {
            ids.push(self.spawn_at(site)?);
        }
        Ok(ids)
    }

    /// Create an idle particle on a vacant site
    pub fn spawn_at(&mut self, site: SiteIndex) -> Result<ParticleId> {
        if !self.lattice.contains(site) {
            return Err(AsepError::SiteOutOfRange {
                site,
                size: self.lattice.size(),
            });
        }
        if self.lattice.is_occupied(site) {
            return Err(AsepError::SiteOccupied(site));
        }
        let id = self.allocate_id();
        self.lattice.place(site, id)?;
        self.particles.insert(id, Particle::new(id, site));
        Ok(id)
    }

    /// Move a particle from `from` to `to` and release any reservation on `to`.
    ///
    /// This is the only way a particle changes site. Preconditions are
    /// checked before anything is written.
    pub fn commit_move(&mut self, id: ParticleId, from: SiteIndex, to: SiteIndex) -> Result<()> {
        let particle = self.particles.get(&id).ok_or(AsepError::ParticleNotFound(id))?;
        if particle.site != from || self.lattice.occupant(from) != Some(id) {
            return Err(AsepError::SiteVacant(from));
        }
        if !self.lattice.contains(to) {
            return Err(AsepError::SiteOutOfRange {
                site: to,
                size: self.lattice.size(),
            });
        }
        if self.lattice.is_occupied(to) {
            return Err(AsepError::SiteOccupied(to));
        }

        self.lattice.vacate(from)?;
        self.lattice.release(to);
        self.lattice.place(to, id)?;
        if let Some(particle) = self.particles.get_mut(&id) {
            particle.site = to;
        }
        Ok(())
    }

    /// Remove a particle from both the registry and the lattice.
    ///
    /// The returned record has its pending token cleared; cancelling the
    /// queued event is the scheduler's job.
    pub fn remove_particle(&mut self, id: ParticleId) -> Result<Particle> {
        let site = self
            .particles
            .get(&id)
            .map(|p| p.site)
            .ok_or(AsepError::ParticleNotFound(id))?;
        self.lattice.vacate(site)?;
        let mut particle = self
            .particles
            .remove(&id)
            .ok_or(AsepError::ParticleNotFound(id))?;
        particle.pending = None;
        Ok(particle)
    }

    /// Reserve the destination of an accepted transition
    pub fn reserve(&mut self, site: SiteIndex) -> Result<()> {
        self.lattice.reserve(site)
    }

    pub fn release(&mut self, site: SiteIndex) {
        self.lattice.release(site)
    }

    /// Drop every particle and reservation
    pub fn clear(&mut self) {
        self.particles.clear();
        self.lattice.clear();
    }

    /// Every particle's committed site is occupied by that particle and
    /// nothing else is occupied
    pub fn is_consistent(&self) -> bool {
        self.particles
            .values()
            .all(|p| self.lattice.occupant(p.site) == Some(p.id))
            && self.lattice.occupied_count() == self.particles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_place_random_distinct_sites() {
        let mut registry = ParticleRegistry::new(10);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let ids = registry.place_random(10, &mut rng).unwrap();
        assert_eq!(ids.len(), 10);
        assert_eq!(registry.lattice().occupied_count(), 10);
        assert!(registry.is_consistent());
    }

    #[test]
    fn test_place_random_insufficient_capacity_places_nothing() {
        let mut registry = ParticleRegistry::new(3);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let err = registry.place_random(4, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            AsepError::InsufficientCapacity {
                requested: 4,
                capacity: 3
            }
        ));
        assert!(registry.is_empty());
        assert_eq!(registry.lattice().occupied_count(), 0);
    }

    #[test]
    fn test_commit_move_updates_both_sides() {
        let mut registry = ParticleRegistry::new(5);
        let id = registry.spawn_at(2).unwrap();
        registry.reserve(3).unwrap();
        registry.commit_move(id, 2, 3).unwrap();
        assert_eq!(registry.get(id).unwrap().site(), 3);
        assert!(!registry.lattice().is_occupied(2));
        assert!(registry.lattice().is_occupied(3));
        assert!(!registry.lattice().is_reserved(3));
        assert!(registry.is_consistent());
    }

    #[test]
    fn test_commit_move_rejects_occupied_target() {
        let mut registry = ParticleRegistry::new(5);
        let a = registry.spawn_at(2).unwrap();
        registry.spawn_at(3).unwrap();
        assert!(matches!(
            registry.commit_move(a, 2, 3),
            Err(AsepError::SiteOccupied(3))
        ));
        // Nothing changed
        assert_eq!(registry.get(a).unwrap().site(), 2);
        assert!(registry.is_consistent());
    }

    #[test]
    fn test_commit_move_wrong_origin() {
        let mut registry = ParticleRegistry::new(5);
        let a = registry.spawn_at(1).unwrap();
        assert!(registry.commit_move(a, 0, 2).is_err());
        assert!(matches!(
            registry.commit_move(ParticleId(99), 1, 2),
            Err(AsepError::ParticleNotFound(_))
        ));
    }

    #[test]
    fn test_remove_particle() {
        let mut registry = ParticleRegistry::new(5);
        let id = registry.spawn_at(4).unwrap();
        let removed = registry.remove_particle(id).unwrap();
        assert_eq!(removed.site(), 4);
        assert!(registry.is_empty());
        assert!(!registry.lattice().is_occupied(4));
        assert!(registry.remove_particle(id).is_err());
    }

    #[test]
    fn test_ids_are_sorted_and_unique() {
        let mut registry = ParticleRegistry::new(6);
        let a = registry.spawn_at(5).unwrap();
        let b = registry.spawn_at(0).unwrap();
        registry.remove_particle(a).unwrap();
        let c = registry.spawn_at(5).unwrap();
        assert_ne!(a, c);
        assert_eq!(registry.ids(), vec![b, c]);
        assert_eq!(registry.particle_at(0).map(|p| p.id), Some(b));
    }
}
