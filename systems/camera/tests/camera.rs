use glam::Vec2;
use pixel_office_core::AgentId;
use pixel_office_system_camera::{Camera, CameraConfig};

fn office_camera() -> Camera {
    let mut camera = Camera::new(CameraConfig::default());
    camera.set_viewport(Vec2::new(800.0, 600.0));
    camera.set_map_size(20, 10);
    camera
}

#[test]
fn follow_converges_exactly_on_a_resting_character() {
    let mut camera = office_camera();
    let agent = AgentId::new(4);
    let position = Vec2::new(40.0, 24.0);
    let target = camera.follow_target(position);
    assert_eq!(target, Vec2::new(360.0, 168.0));

    camera.follow(agent);
    let mut settled_at = None;
    for tick in 0..200 {
        camera.update(|id| (id == agent).then_some(position));
        if camera.pan() == target {
            settled_at = Some(tick);
            break;
        }
    }
    let settled_at = settled_at.expect("pan must settle on the target");
    assert!(settled_at > 10, "follow eases instead of jumping");

    for _ in 0..10 {
        camera.update(|_| Some(position));
        assert_eq!(camera.pan(), target, "no oscillation once settled");
    }
    assert_eq!(camera.following(), Some(agent));
}

#[test]
fn follow_moves_a_fixed_fraction_per_tick() {
    let mut camera = office_camera();
    camera.follow(AgentId::new(1));
    camera.update(|_| Some(Vec2::new(40.0, 24.0)));
    let first = camera.pan();
    assert!((first.x - 36.0).abs() < 1e-4);
    assert!((first.y - 16.8).abs() < 1e-4);
}

#[test]
fn manual_pan_and_zoom_break_the_lock() {
    let mut camera = office_camera();
    camera.follow(AgentId::new(1));
    camera.pan_by(Vec2::new(5.0, 0.0));
    assert_eq!(camera.following(), None);

    camera.follow(AgentId::new(1));
    assert!(camera.set_zoom(5));
    assert_eq!(camera.following(), None);
}

#[test]
fn vanished_character_releases_the_lock() {
    let mut camera = office_camera();
    camera.follow(AgentId::new(9));
    camera.update(|_| None);
    assert_eq!(camera.following(), None);
    assert_eq!(camera.pan(), Vec2::ZERO);
}

#[test]
fn scroll_zoom_waits_for_threshold() {
    let mut camera = office_camera();
    assert_eq!(camera.zoom(), 3);

    assert_eq!(camera.zoom_by_scroll(-30.0), None);
    assert_eq!(camera.zoom_by_scroll(-30.0), Some(4));
    assert_eq!(camera.zoom_by_scroll(49.0), None);
    assert_eq!(camera.zoom_by_scroll(1.0), Some(3));

    assert!(camera.set_zoom(10));
    assert_eq!(camera.zoom_by_scroll(-120.0), None, "already at the top step");
    assert_eq!(camera.zoom(), 10);
}

#[test]
fn shrinking_the_viewport_reclamps_pan() {
    let mut camera = office_camera();
    camera.pan_by(Vec2::new(600.0, 0.0));
    assert_eq!(camera.pan(), Vec2::new(600.0, 0.0));

    camera.set_viewport(Vec2::new(200.0, 200.0));
    // 960/2 + 100 - 50
    assert_eq!(camera.pan(), Vec2::new(530.0, 0.0));
}
