//! Player movement with wall sliding
//!
//! Held direction keys become a unit direction scaled by the player's
//! speed. The candidate position is clamped to the canvas, then resolved
//! against device bodies: full move first, then X-only, then Y-only.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::collides_with_any;
use super::device::Device;
use crate::clamp_vec;

/// Which direction keys are currently held
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl InputState {
    /// Apply a key-down/key-up event by `KeyboardEvent.key` name.
    /// Arrows and WASD are recognised; returns false for any other key.
    pub fn set_key(&mut self, key: &str, held: bool) -> bool {
        let flag = match key {
            "ArrowUp" | "w" | "W" => &mut self.up,
            "ArrowDown" | "s" | "S" => &mut self.down,
            "ArrowLeft" | "a" | "A" => &mut self.left,
            "ArrowRight" | "d" | "D" => &mut self.right,
            _ => return false,
        };
        *flag = held;
        true
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Raw axis vector, each component in {-1, 0, 1}
    pub fn axis(&self) -> Vec2 {
        let axis = |neg: bool, pos: bool| (pos as i8 - neg as i8) as f32;
        Vec2::new(axis(self.left, self.right), axis(self.up, self.down))
    }
}

/// The player avatar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Centre position
    pub pos: Vec2,
    /// Collision radius
    pub radius: f32,
    /// Walking speed (px/s)
    pub speed: f32,
    /// Walk cycle phase, cosmetic only
    #[serde(skip)]
    pub step_phase: f32,
}

impl Player {
    pub fn new(pos: Vec2, radius: f32, speed: f32) -> Self {
        Self {
            pos,
            radius,
            speed,
            step_phase: 0.0,
        }
    }

    /// Velocity for the held keys. Diagonals are normalised so they are
    /// no faster than straight moves.
    pub fn velocity(&self, input: &InputState) -> Vec2 {
        input.axis().normalize_or_zero() * self.speed
    }
}

/// Playable area the player centre must stay inside
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    /// Canvas inset by `radius + margin` on every side
    pub fn inset(canvas: Vec2, radius: f32, margin: f32) -> Self {
        let inset = Vec2::splat(radius + margin);
        Self {
            min: inset,
            max: canvas - inset,
        }
    }

    #[inline]
    pub fn clamp(&self, p: Vec2) -> Vec2 {
        clamp_vec(p, self.min, self.max)
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }
}

/// Result of one movement step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveOutcome {
    /// Velocity requested by input (before collision)
    pub velocity: Vec2,
    /// Whether the position actually changed
    pub moved: bool,
}

/// Advance the player by `dt` seconds
pub fn step_player(
    player: &mut Player,
    input: &InputState,
    devices: &[Device],
    bounds: &Bounds,
    dt: f32,
    step_rate: f32,
) -> MoveOutcome {
    let velocity = player.velocity(input);
    if velocity == Vec2::ZERO {
        player.step_phase = 0.0;
        return MoveOutcome {
            velocity,
            moved: false,
        };
    }

    let start = player.pos;
    let target = bounds.clamp(start + velocity * dt);
    let blocked = |p: Vec2| collides_with_any(p, player.radius, devices);

    let resolved = if !blocked(target) {
        target
    } else {
        // Slide: take X if it is free, then Y from wherever X left us
        let mut pos = start;
        if !blocked(Vec2::new(target.x, pos.y)) {
            pos.x = target.x;
        }
        if !blocked(Vec2::new(pos.x, target.y)) {
            pos.y = target.y;
        }
        pos
    };

    player.pos = resolved;
    let moved = resolved != start;
    if moved {
        player.step_phase += dt * step_rate;
    } else {
        player.step_phase = 0.0;
    }

    MoveOutcome { velocity, moved }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::collision::circle_intersects_rect;
    use crate::sim::device::DeviceKind;
    use proptest::prelude::*;

    fn canvas_bounds() -> Bounds {
        Bounds::inset(Vec2::new(CANVAS_WIDTH, CANVAS_HEIGHT), PLAYER_RADIUS, WALL_MARGIN)
    }

    fn player_at(x: f32, y: f32) -> Player {
        Player::new(Vec2::new(x, y), PLAYER_RADIUS, PLAYER_SPEED)
    }

    fn input_from_bits(bits: u8) -> InputState {
        InputState {
            up: bits & 1 != 0,
            down: bits & 2 != 0,
            left: bits & 4 != 0,
            right: bits & 8 != 0,
        }
    }

    #[test]
    fn test_set_key_arrows_and_wasd() {
        let mut input = InputState::default();
        assert!(input.set_key("ArrowUp", true));
        assert!(input.set_key("d", true));
        assert!(!input.set_key("e", true));
        assert_eq!(input.axis(), Vec2::new(1.0, -1.0));

        input.set_key("ArrowUp", false);
        assert_eq!(input.axis(), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let input = InputState {
            left: true,
            right: true,
            ..Default::default()
        };
        assert_eq!(player_at(0.0, 0.0).velocity(&input), Vec2::ZERO);
    }

    #[test]
    fn test_straight_move_distance() {
        let mut player = player_at(450.0, 300.0);
        let input = InputState {
            right: true,
            ..Default::default()
        };
        let out = step_player(&mut player, &input, &[], &canvas_bounds(), 0.5, STEP_RATE);
        assert!(out.moved);
        assert!((player.pos.x - 530.0).abs() < 1e-3);
        assert_eq!(player.pos.y, 300.0);
        assert!(player.step_phase > 0.0);
    }

    #[test]
    fn test_no_input_skips_and_resets_phase() {
        let mut player = player_at(450.0, 300.0);
        player.step_phase = 3.0;
        let out = step_player(
            &mut player,
            &InputState::default(),
            &[],
            &canvas_bounds(),
            0.1,
            STEP_RATE,
        );
        assert!(!out.moved);
        assert_eq!(player.pos, Vec2::new(450.0, 300.0));
        assert_eq!(player.step_phase, 0.0);
    }

    #[test]
    fn test_clamped_to_canvas() {
        let mut player = player_at(20.0, 20.0);
        let input = InputState {
            up: true,
            left: true,
            ..Default::default()
        };
        step_player(&mut player, &input, &[], &canvas_bounds(), 0.2, STEP_RATE);
        let edge = PLAYER_RADIUS + WALL_MARGIN;
        assert_eq!(player.pos, Vec2::new(edge, edge));
    }

    #[test]
    fn test_slides_along_wall() {
        // Wall directly right of the player; pushing right+down slides down
        let wall = Device::new("wall", "Wall", DeviceKind::Other, 0.0, 200.0, 0.0, 50.0, 600.0);
        let mut player = player_at(200.0 - PLAYER_RADIUS - 1.0, 300.0);
        let input = InputState {
            right: true,
            down: true,
            ..Default::default()
        };
        let out = step_player(&mut player, &input, &[wall], &canvas_bounds(), 0.1, STEP_RATE);
        assert!(out.moved);
        assert_eq!(player.pos.x, 200.0 - PLAYER_RADIUS - 1.0);
        assert!(player.pos.y > 300.0);
    }

    #[test]
    fn test_blocked_in_corner_does_not_move() {
        let devices = vec![
            Device::new("r", "R", DeviceKind::Other, 0.0, 116.0, 0.0, 50.0, 600.0),
            Device::new("b", "B", DeviceKind::Other, 0.0, 0.0, 116.0, 900.0, 50.0),
        ];
        let mut player = player_at(100.0, 100.0);
        player.step_phase = 1.0;
        let input = InputState {
            right: true,
            down: true,
            ..Default::default()
        };
        let out = step_player(&mut player, &input, &devices, &canvas_bounds(), 0.1, STEP_RATE);
        assert!(!out.moved);
        assert_eq!(player.pos, Vec2::new(100.0, 100.0));
        assert_eq!(player.step_phase, 0.0);
    }

    #[test]
    fn test_diagonal_into_corner_gap_never_overlaps() {
        // Both single-axis moves are free but the diagonal clips the box corner
        let block = Device::new("c", "C", DeviceKind::Other, 0.0, 116.0, 116.0, 40.0, 40.0);
        let mut player = player_at(100.0, 100.0);
        let input = InputState {
            right: true,
            down: true,
            ..Default::default()
        };
        step_player(&mut player, &input, &[block.clone()], &canvas_bounds(), 0.1, STEP_RATE);
        assert!(!circle_intersects_rect(player.pos, PLAYER_RADIUS, &block.rect()));
    }

    proptest! {
        #[test]
        fn prop_speed_is_uniform(bits in 0u8..16) {
            let input = input_from_bits(bits);
            let v = player_at(0.0, 0.0).velocity(&input);
            if input.axis() != Vec2::ZERO {
                prop_assert!((v.length() - PLAYER_SPEED).abs() < 1e-3);
            } else {
                prop_assert_eq!(v, Vec2::ZERO);
            }
        }

        #[test]
        fn prop_never_overlaps_or_leaves_canvas(
            moves in proptest::collection::vec((0u8..16, 0.0f32..0.2), 1..120)
        ) {
            let devices = crate::layout::HouseLayout::default().devices;
            let bounds = canvas_bounds();
            let mut player = player_at(PLAYER_SPAWN.0, PLAYER_SPAWN.1);
            for (bits, dt) in moves {
                step_player(&mut player, &input_from_bits(bits), &devices, &bounds, dt, STEP_RATE);
                prop_assert!(bounds.contains(player.pos));
                for d in &devices {
                    prop_assert!(!circle_intersects_rect(player.pos, player.radius, &d.rect()));
                }
            }
        }
    }
}
