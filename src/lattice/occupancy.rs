//! Site occupancy for a 1-D lattice
//!
//! Holds the authoritative answer to "is site i taken?". Each site stores the
//! id of its occupant so lookups by site are O(1). Reservations mark the
//! destination of an accepted transition that has not committed yet; a
//! reserved site still reports vacant.

use crate::core::error::{AsepError, Result};
use crate::core::types::{ParticleId, SiteIndex};

#[derive(Debug, Clone)]
pub struct Lattice {
    sites: Vec<Option<ParticleId>>,
    reserved: Vec<bool>,
}

impl Lattice {
    pub fn new(size: usize) -> Self {
        Self {
            sites: vec![None; size],
            reserved: vec![false; size],
        }
    }

    /// Number of sites N
    pub fn size(&self) -> usize {
        self.sites.len()
    }

    /// Last valid site index
    pub fn last_site(&self) -> SiteIndex {
        self.sites.len().saturating_sub(1)
    }

    pub fn contains(&self, site: SiteIndex) -> bool {
        site < self.sites.len()
    }

    /// Out-of-range sites report vacant
    pub fn is_occupied(&self, site: SiteIndex) -> bool {
        matches!(self.sites.get(site), Some(Some(_)))
    }

    pub fn occupant(&self, site: SiteIndex) -> Option<ParticleId> {
        self.sites.get(site).copied().flatten()
    }

    pub fn is_reserved(&self, site: SiteIndex) -> bool {
        self.reserved.get(site).copied().unwrap_or(false)
    }

    /// Vacant, unreserved and in range: a transition may target this site
    pub fn is_available(&self, site: SiteIndex) -> bool {
        self.contains(site) && !self.is_occupied(site) && !self.is_reserved(site)
    }

    pub fn occupied_count(&self) -> usize {
        self.sites.iter().filter(|s| s.is_some()).count()
    }

    /// Occupancy as plain booleans, site 0 first
    pub fn occupancy(&self) -> Vec<bool> {
        self.sites.iter().map(|s| s.is_some()).collect()
    }

    pub fn vacant_sites(&self) -> impl Iterator<Item = SiteIndex> + '_ {
        self.sites
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_none())
            .map(|(i, _)| i)
    }

    fn check_range(&self, site: SiteIndex) -> Result<()> {
        if self.contains(site) {
            Ok(())
        } else {
            Err(AsepError::SiteOutOfRange {
                site,
                size: self.size(),
            })
        }
    }

    pub(super) fn place(&mut self, site: SiteIndex, id: ParticleId) -> Result<()> {
        self.check_range(site)?;
        if self.sites[site].is_some() {
            return Err(AsepError::SiteOccupied(site));
        }
        self.sites[site] = Some(id);
        Ok(())
    }

    pub(super) fn vacate(&mut self, site: SiteIndex) -> Result<ParticleId> {
        self.check_range(site)?;
        self.sites[site].take().ok_or(AsepError::SiteVacant(site))
    }

    pub(super) fn reserve(&mut self, site: SiteIndex) -> Result<()> {
        self.check_range(site)?;
        if self.sites[site].is_some() || self.reserved[site] {
            return Err(AsepError::SiteOccupied(site));
        }
        self.reserved[site] = true;
        Ok(())
    }

    pub(super) fn release(&mut self, site: SiteIndex) {
        if let Some(flag) = self.reserved.get_mut(site) {
            *flag = false;
        }
    }

    pub(super) fn clear(&mut self) {
        self.sites.iter_mut().for_each(|s| *s = None);
        self.reserved.iter_mut().for_each(|r| *r = false);
    }
}
