mod common;

use flowviz_core::contour::BACKGROUND;
use flowviz_core::{
    CameraDirection, ContourConfig, ContourView, Rgb8, Vec3, VelocityColorMapper,
    VelocityComponent, VelocityField, WorkerPool,
};
use std::sync::Arc;

fn mesh_view(width: usize, height: usize) -> ContourView {
    let field = common::graded_field(4);
    let pool = Arc::new(WorkerPool::new(3).unwrap());
    let config = ContourConfig {
        resolution: 256,
        ..ContourConfig::default()
    };
    ContourView::new(&field, pool, config, width, height)
}

#[test]
fn test_render_matches_direct_sampling_away_from_faces() {
    let mut view = mesh_view(120, 90);
    view.set_camera_direction(CameraDirection::Z);
    view.set_component(VelocityComponent::Y);
    view.set_depth(0.6);
    let image = view.render();

    let mut checked = 0;
    for py in (0..90).step_by(7) {
        for px in (0..120).step_by(7) {
            let world = view.to_world_position(px as i32, py as i32).unwrap();
            assert_eq!(world.z, 0.6);

            // keep well inside a cell so the 256-texel cache and the direct
            // query agree
            let near_face = [world.x, world.y]
                .iter()
                .any(|&c| ((c * 4.0) - (c * 4.0).round()).abs() < 0.05);
            if near_face {
                continue;
            }

            let expected = match view.velocity_at(&world) {
                Some(v) => view.mapper().color_of_scalar(v.y),
                None => BACKGROUND,
            };
            assert_eq!(image.pixel(px, py), expected, "pixel ({px}, {py}) at {world:?}");
            checked += 1;
        }
    }
    assert!(checked > 50);
}

#[test]
fn test_component_range_follows_field() {
    let mut view = mesh_view(64, 64);
    view.set_component(VelocityComponent::Z);
    assert_eq!(view.velocity_range(), (-3.0, 0.0));
    view.set_component(VelocityComponent::X);
    assert_eq!(view.velocity_range(), (0.0, 3.0));
}

#[test]
fn test_invalidation_contract() {
    let mut view = mesh_view(64, 48);
    assert!(view.is_cache_dirty());
    let first = view.render();
    assert!(view.cache().is_some());

    // resampling changes only
    view.pan(5, 5);
    view.zoom(32, 24, -120);
    view.resize(80, 60);
    assert!(!view.is_cache_dirty());

    view.set_velocity_range(0.0, 100.0);
    assert!(view.is_cache_dirty());
    view.set_velocity_range(0.0, 3.0);
    view.resize(64, 48);
    view.zoom(32, 24, 120);
    view.pan(-5, -5);
    let second = view.render();
    assert_eq!(first.width(), second.width());

    view.set_mapper_colors(Rgb8::BLACK, Rgb8::WHITE);
    let third = view.render();
    assert_ne!(second, third);
}

#[test]
fn test_camera_directions_fit_projected_bounds() {
    let mut view = mesh_view(100, 100);
    for camera in [CameraDirection::X, CameraDirection::Y, CameraDirection::Z] {
        view.set_camera_direction(camera);
        let (lb, rt) = view.world_rect();
        assert!(lb.x < 0.0 && lb.y < 0.0 && rt.x > 1.0 && rt.y > 1.0);
        assert_eq!(view.depth(), 0.5);

        let image = view.render();
        assert_eq!(image.pixel(0, 0), BACKGROUND);
        assert_ne!(image.pixel(50, 50), BACKGROUND);
    }
}

#[test]
fn test_views_share_one_pool() {
    let field = common::graded_field(3);
    let pool = Arc::new(WorkerPool::new(2).unwrap());
    let config = ContourConfig {
        resolution: 32,
        ..ContourConfig::default()
    };
    let mut a = ContourView::new(&field, Arc::clone(&pool), config, 40, 40);
    let mut b = ContourView::new(&field, Arc::clone(&pool), config, 40, 40);
    b.set_camera_direction(CameraDirection::X);
    assert_eq!(Arc::strong_count(&pool), 3);

    let _ = a.render();
    let _ = b.render();
    assert_eq!(
        a.velocity_at(&Vec3::new(0.1, 0.1, 0.1)),
        field.sample(&Vec3::new(0.1, 0.1, 0.1))
    );
}
