//! Per-frame draw data handed to the compositor
//!
//! The simulation never touches the GPU. Each frame it produces the fog mask,
//! the composite uniforms and flat instance lists the renderer uploads as-is.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::settings::Settings;
use crate::sim::fog::MaskTexture;
use crate::sim::influence::InfluenceGizmo;
use crate::sim::launch::PullIndicator;
use crate::sim::state::GameState;
use crate::sim::tick::preview_trajectory;

/// Steps in the dotted trajectory preview
pub const PREVIEW_STEPS: usize = 90;

/// Uniforms for the fog composite pass
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct CompositeUniforms {
    /// Fog animation clock (seconds)
    pub time: f32,
    /// 1.0 composites fog, 0.0 shows the raw scene
    pub show_fog: f32,
    pub screen_size: [f32; 2],
}

impl CompositeUniforms {
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// One circle sprite (planet, ship, asteroid)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    pub position: [f32; 2],
    pub radius: f32,
    pub rotation: f32,
    pub color: [f32; 4],
}

impl SpriteInstance {
    pub const fn new(pos: Vec2, radius: f32, rotation: f32, color: [f32; 4]) -> Self {
        Self {
            position: [pos.x, pos.y],
            radius,
            rotation,
            color,
        }
    }
}

/// Colors for world bodies
pub mod colors {
    pub const HOME: [f32; 4] = [0.2, 0.6, 1.0, 1.0];
    pub const PLANET: [f32; 4] = [0.7, 0.5, 0.3, 1.0];
    pub const SHIP: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
    pub const ASTEROID: [f32; 4] = [0.5, 0.5, 0.55, 1.0];
}

/// Everything the renderer needs for one frame
#[derive(Debug)]
pub struct FrameData<'a> {
    pub fog_mask: &'a MaskTexture,
    pub uniforms: CompositeUniforms,
    pub sprites: Vec<SpriteInstance>,
    pub gizmos: Vec<InfluenceGizmo>,
    pub pull: Option<PullIndicator>,
    /// Predicted path while a drag is in progress
    pub preview: Vec<Vec2>,
}

/// Collect draw data and refresh the fog mask
pub fn build_frame<'a>(
    state: &'a mut GameState,
    settings: &Settings,
    viewport: Vec2,
) -> FrameData<'a> {
    let uniforms = CompositeUniforms {
        time: state.fog.accum(),
        show_fog: if settings.debug { 0.0 } else { 1.0 },
        screen_size: [viewport.x, viewport.y],
    };

    let body_count = state.planets.len() + state.ships.len() + state.asteroids.len();
    let mut sprites = Vec::with_capacity(1 + body_count);
    sprites.push(SpriteInstance::new(
        state.home.center(),
        state.home.target.radius,
        state.home.spin,
        colors::HOME,
    ));
    sprites.extend(
        state
            .planets
            .iter()
            .map(|p| SpriteInstance::new(p.pos, p.radius, 0.0, colors::PLANET)),
    );
    sprites.extend(
        state
            .asteroids
            .iter()
            .map(|a| SpriteInstance::new(a.pos, a.radius, a.rotation, colors::ASTEROID)),
    );
    sprites.extend(state.ships.iter().map(|s| {
        SpriteInstance::new(s.pos, s.radius, crate::angle_deg(s.vel).to_radians(), colors::SHIP)
    }));

    let pull = state.drag.indicator(&state.launch);
    let preview = match state.drag.gesture() {
        Some(gesture) if gesture.normalized_strength > 0.0 => {
            let velocity = gesture.launch_velocity(&state.launch);
            let rim = state.home.target.radius + state.ship_tuning.radius;
            let start = state.home.center() + velocity.normalize_or_zero() * rim;
            preview_trajectory(state, start, velocity, PREVIEW_STEPS, crate::consts::SIM_DT)
        }
        _ => Vec::new(),
    };

    let gizmos = state.field.gizmos(settings.debug);

    FrameData {
        fog_mask: state.fog.render(),
        uniforms,
        sprites,
        gizmos,
        pull,
        preview,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::influencers::Repulser;
    use crate::sim::launch::{PointerState, update_drag};

    fn state() -> GameState {
        let mut settings = Settings::default();
        settings.world.width = 1600.0;
        settings.world.height = 1600.0;
        GameState::empty(3, &settings).unwrap()
    }

    #[test]
    fn test_uniforms_layout() {
        assert_eq!(std::mem::size_of::<CompositeUniforms>(), 16);
        let u = CompositeUniforms {
            time: 1.0,
            show_fog: 1.0,
            screen_size: [1280.0, 720.0],
        };
        assert_eq!(u.as_bytes().len(), 16);
    }

    #[test]
    fn test_debug_disables_fog_and_shows_ranges() {
        let mut state = state();
        state.add_influencer(Box::new(Repulser::test(Vec2::new(400.0, 400.0))));
        let mut settings = Settings::default();

        let frame = build_frame(&mut state, &settings, Vec2::new(1280.0, 720.0));
        assert_eq!(frame.uniforms.show_fog, 1.0);
        assert!(frame.gizmos.is_empty());

        settings.debug = true;
        let frame = build_frame(&mut state, &settings, Vec2::new(1280.0, 720.0));
        assert_eq!(frame.uniforms.show_fog, 0.0);
        assert_eq!(frame.gizmos.len(), 1);
        assert_eq!(frame.gizmos[0].radius, 100.0);
    }

    #[test]
    fn test_frame_mask_includes_pending_reveals() {
        let mut state = state();
        state.fog.add_fog_circle(800.0, 800.0, 200.0);
        let settings = Settings::default();
        let frame = build_frame(&mut state, &settings, Vec2::new(1280.0, 720.0));
        let mask = frame.fog_mask;
        assert!(mask.texels().iter().any(|&t| t == 255));
    }

    #[test]
    fn test_drag_produces_indicator_and_preview() {
        let mut state = state();
        let settings = Settings::default();
        let home = state.home.center();
        let target = state.home.target;
        let launch = state.launch;
        update_drag(&mut state.drag, &PointerState::press(home), &target, &launch, 0.0);
        update_drag(
            &mut state.drag,
            &PointerState::hold(home + Vec2::new(0.0, -60.0)),
            &target,
            &launch,
            0.0,
        );

        let frame = build_frame(&mut state, &settings, Vec2::new(1280.0, 720.0));
        let pull = frame.pull.unwrap();
        assert!((pull.scale - 0.6).abs() < 1e-5);
        assert_eq!(frame.preview.len(), PREVIEW_STEPS);
        // Slingshot: pulled down, preview heads up
        assert!(frame.preview[PREVIEW_STEPS - 1].y > home.y);
        assert_eq!(frame.sprites.len(), 1);
    }
}
