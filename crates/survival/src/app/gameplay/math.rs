use engine::Vec2;

pub(crate) const TILE_WIDTH: i32 = 8;
const ANIMATION_SNAP_EPSILON: f32 = 0.001;

pub(crate) fn distance(a: Vec2, b: Vec2) -> f32 {
    (a - b).length()
}

pub(crate) fn almost_equals(a: f32, b: f32, epsilon: f32) -> bool {
    (a - b).abs() <= epsilon
}

/// Exponential approach toward `target`; snaps and returns `true` once within epsilon.
pub(crate) fn animate_f32_to_target(value: &mut f32, target: f32, delta_t: f32, rate: f32) -> bool {
    *value += (target - *value) * (1.0 - 2.0_f32.powf(-rate * delta_t));
    if almost_equals(*value, target, ANIMATION_SNAP_EPSILON) {
        *value = target;
        return true;
    }
    false
}

pub(crate) fn animate_v2_to_target(value: &mut Vec2, target: Vec2, delta_t: f32, rate: f32) {
    animate_f32_to_target(&mut value.x, target.x, delta_t, rate);
    animate_f32_to_target(&mut value.y, target.y, delta_t, rate);
}

/// Oscillates in `[0, 1]`.
pub(crate) fn sin_breathe(time: f32, rate: f32) -> f32 {
    ((time * rate).sin() + 1.0) / 2.0
}

pub(crate) fn world_pos_to_tile_pos(world_pos: f32) -> i32 {
    (world_pos / TILE_WIDTH as f32).round() as i32
}

pub(crate) fn tile_pos_to_world_pos(tile_pos: i32) -> f32 {
    tile_pos as f32 * TILE_WIDTH as f32
}

pub(crate) fn round_v2_to_tile(world_pos: Vec2) -> Vec2 {
    Vec2::new(
        tile_pos_to_world_pos(world_pos_to_tile_pos(world_pos.x)),
        tile_pos_to_world_pos(world_pos_to_tile_pos(world_pos.y)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        assert_eq!(distance(Vec2::new(0.0, 0.0), Vec2::new(3.0, 4.0)), 5.0);
        assert_eq!(distance(Vec2::new(-2.0, 1.0), Vec2::new(-2.0, 1.0)), 0.0);
    }

    #[test]
    fn animate_moves_fraction_of_gap_and_does_not_overshoot() {
        let mut value = 0.0;
        let arrived = animate_f32_to_target(&mut value, 10.0, 1.0, 1.0);
        assert!(!arrived);
        assert!((value - 5.0).abs() < 0.0001);

        for _ in 0..200 {
            animate_f32_to_target(&mut value, 10.0, 1.0 / 60.0, 30.0);
            assert!(value <= 10.0);
        }
        assert_eq!(value, 10.0);
    }

    #[test]
    fn animate_snaps_when_within_epsilon() {
        let mut value = 9.9995;
        assert!(animate_f32_to_target(&mut value, 10.0, 0.0, 30.0));
        assert_eq!(value, 10.0);
    }

    #[test]
    fn animate_v2_eases_each_axis() {
        let mut camera = Vec2::ZERO;
        animate_v2_to_target(&mut camera, Vec2::new(8.0, -4.0), 1.0, 1.0);
        assert!((camera.x - 4.0).abs() < 0.0001);
        assert!((camera.y + 2.0).abs() < 0.0001);
    }

    #[test]
    fn sin_breathe_stays_in_unit_range() {
        for step in 0..100 {
            let value = sin_breathe(step as f32 * 0.173, 5.0);
            assert!((0.0..=1.0).contains(&value));
        }
        assert!((sin_breathe(0.0, 5.0) - 0.5).abs() < 0.0001);
    }

    #[test]
    fn tile_snapping_rounds_to_nearest_tile() {
        assert_eq!(world_pos_to_tile_pos(11.9), 1);
        assert_eq!(world_pos_to_tile_pos(12.1), 2);
        assert_eq!(world_pos_to_tile_pos(-12.1), -2);
        assert_eq!(tile_pos_to_world_pos(-3), -24.0);
        assert_eq!(
            round_v2_to_tile(Vec2::new(3.5, -4.5)),
            Vec2::new(0.0, -8.0)
        );
    }
}
