//! Lattice geometry in lattice units
//!
//! Lattice space has y pointing up and one unit between neighbouring sites.
//! Canvas mapping lives in `render::viewport`.

use glam::Vec2;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

use crate::core::types::SiteIndex;

/// Distance between neighbouring sites
pub const SITE_SPACING: f32 = 1.0;

/// A click within this distance of a site centre selects the site
pub const SITE_HIT_RADIUS: f32 = 0.45;

/// Distance from the outer sites to the reservoir anchors (Open only)
pub const RESERVOIR_OFFSET: f32 = 1.5;

/// A click within this distance of a reservoir anchor selects the reservoir
pub const RESERVOIR_HIT_RADIUS: f32 = 0.6;

/// Height of the curve a particle follows into or out of a reservoir
pub const PORTAL_BULGE: f32 = 1.2;

/// Ring radius never drops below this, so tiny rings stay readable
pub const MIN_RING_RADIUS: f32 = 1.0;

/// Position of a site on a horizontal line centred at the origin
pub fn line_position(site: SiteIndex, size: usize) -> Vec2 {
    let centre = (size.saturating_sub(1)) as f32 / 2.0;
    Vec2::new((site as f32 - centre) * SITE_SPACING, 0.0)
}

/// Radius of a ring whose neighbouring sites sit one spacing apart (chord)
pub fn ring_radius(size: usize) -> f32 {
    if size < 2 {
        return MIN_RING_RADIUS;
    }
    let r = SITE_SPACING / (2.0 * (PI / size as f32).sin());
    r.max(MIN_RING_RADIUS)
}

/// Angle of a site on the ring: site 0 at the top, increasing clockwise
pub fn ring_angle(site: SiteIndex, size: usize) -> f32 {
    FRAC_PI_2 - TAU * site as f32 / size.max(1) as f32
}

pub fn ring_position(site: SiteIndex, size: usize) -> Vec2 {
    let radius = ring_radius(size);
    let angle = ring_angle(site, size);
    Vec2::new(radius * angle.cos(), radius * angle.sin())
}

/// Shortest signed angular distance from `from` to `to`, in (-PI, PI]
pub fn shortest_sweep(from: f32, to: f32) -> f32 {
    let mut sweep = (to - from).rem_euclid(TAU);
    if sweep > PI {
        sweep -= TAU;
    }
    sweep
}

/// Geometric path a particle follows while `Inside`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathShape {
    Line {
        from: Vec2,
        to: Vec2,
    },
    Arc {
        centre: Vec2,
        radius: f32,
        start_angle: f32,
        sweep: f32,
    },
    /// Quadratic Bezier through a control point off the lattice axis
    Portal {
        from: Vec2,
        control: Vec2,
        to: Vec2,
    },
}

impl PathShape {
    pub fn line(from: Vec2, to: Vec2) -> Self {
        PathShape::Line { from, to }
    }

    /// Portal curve that bulges upward between two anchors
    pub fn portal(from: Vec2, to: Vec2) -> Self {
        let control = (from + to) * 0.5 + Vec2::new(0.0, PORTAL_BULGE);
        PathShape::Portal { from, control, to }
    }

    /// Point at parameter `s` in [0, 1]; values outside are clamped
    pub fn point_at(&self, s: f32) -> Vec2 {
        let s = s.clamp(0.0, 1.0);
        match *self {
            PathShape::Line { from, to } => from.lerp(to, s),
            PathShape::Arc {
                centre,
                radius,
                start_angle,
                sweep,
            } => {
                let angle = start_angle + sweep * s;
                centre + Vec2::new(angle.cos(), angle.sin()) * radius
            }
            PathShape::Portal { from, control, to } => {
                let a = from.lerp(control, s);
                let b = control.lerp(to, s);
                a.lerp(b, s)
            }
        }
    }

    pub fn start(&self) -> Vec2 {
        self.point_at(0.0)
    }

    pub fn end(&self) -> Vec2 {
        self.point_at(1.0)
    }
}
