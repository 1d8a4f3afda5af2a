//! Plain-text render target for terminals and logs

use std::fmt::Write;

use crate::core::config::{BoundaryKind, SimulationParams};
use crate::core::types::Endpoint;
use crate::render::{CanvasSize, ParticleView, RenderTarget, SceneView};

/// Renders each frame as a few lines of text.
///
/// Sites are drawn left to right: `o` occupied, `+` reserved, `.` vacant.
#[derive(Debug, Default)]
pub struct TextRenderer {
    frame: String,
    frames: u64,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text of the most recent frame
    pub fn frame(&self) -> &str {
        &self.frame
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    fn strip(scene: &SceneView) -> String {
        let cells: String = scene
            .sites
            .iter()
            .map(|site| {
                if site.occupied {
                    'o'
                } else if site.reserved {
                    '+'
                } else {
                    '.'
                }
            })
            .collect();
        match scene.boundary {
            BoundaryKind::Closed => format!("|{}|", cells),
            BoundaryKind::Circular => format!("~{}~", cells),
            BoundaryKind::Open => format!("E>{}>X", cells),
        }
    }

    fn describe_motion(particle: &ParticleView) -> Option<String> {
        let transition = particle.phase.transition()?;
        let who = particle
            .id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "new".to_string());
        Some(format!(
            "  {} {} {} -> {} ({:.0}%)",
            who,
            particle.phase.name(),
            endpoint_label(transition.from),
            endpoint_label(transition.to),
            particle.progress * 100.0
        ))
    }
}

fn endpoint_label(endpoint: Endpoint) -> String {
    match endpoint {
        Endpoint::Site(site) => site.to_string(),
        Endpoint::EntryReservoir => "entry".to_string(),
        Endpoint::ExitReservoir => "exit".to_string(),
    }
}

impl RenderTarget for TextRenderer {
    fn render(&mut self, scene: &SceneView, _canvas: CanvasSize, params: &SimulationParams) {
        self.frame.clear();
        let particles = scene.particles.iter().filter(|p| p.id.is_some()).count();
        // Writing into a String cannot fail
        let _ = writeln!(
            self.frame,
            "t={:.3}s {} N={} particles={}{}",
            scene.clock,
            scene.boundary.name(),
            scene.sites.len(),
            particles,
            if scene.paused { " [paused]" } else { "" }
        );
        let _ = writeln!(
            self.frame,
            "rates: right {:.2} left {:.2}{}",
            params.right_rate,
            params.left_rate,
            if scene.boundary == BoundaryKind::Open {
                format!(" entry {:.2} exit {:.2}", params.entry_rate, params.exit_rate)
            } else {
                String::new()
            }
        );
        let _ = writeln!(self.frame, "{}", Self::strip(scene));
        for line in scene.particles.iter().filter_map(Self::describe_motion) {
            let _ = writeln!(self.frame, "{}", line);
        }
        self.frames += 1;
    }
}
