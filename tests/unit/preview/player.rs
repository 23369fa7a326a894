use super::*;
use crate::foundation::core::{Canvas, Fps};
use crate::preview::cache::ImageCache;
use crate::test_support::color_project;

fn player() -> Player {
    let project = color_project(
        Fps::default(),
        &[([255, 0, 0, 255], 1000), ([0, 255, 0, 255], 500)],
    );
    let cache = ImageCache::prepare(&project).unwrap();
    let compositor =
        PreviewCompositor::new(&project.timeline, &cache, Canvas::new(4, 4).unwrap()).unwrap();
    Player::new(compositor)
}

#[test]
fn stopped_player_produces_nothing() {
    let mut p = player();
    assert_eq!(p.transport(), Transport::Stopped);
    assert!(p.tick(10.0).is_none());
}

#[test]
fn playing_follows_host_clock_and_loops() {
    let mut p = player();
    p.play(5000.0);
    assert_eq!(p.position_ms(5000.0), Some(0.0));
    assert_eq!(p.position_ms(6200.0), Some(1200.0));
    assert_eq!(p.position_ms(6600.0), Some(100.0));

    let px = p.tick(6200.0).unwrap().pixel(1, 1).unwrap();
    assert_eq!(px, [0, 255, 0, 255]);
    assert_eq!(p.last_state(), Some(PlayheadState::Solo { clip: 1 }));
}

#[test]
fn pause_holds_and_resume_continues() {
    let mut p = player();
    p.play(0.0);
    p.pause(300.0);
    assert_eq!(p.position_ms(10_000.0), Some(300.0));
    p.play(20_000.0);
    assert_eq!(p.position_ms(20_100.0), Some(400.0));
}

#[test]
fn seek_moves_play_head() {
    let mut p = player();
    p.seek(0.0, 1100.0);
    assert_eq!(p.transport(), Transport::Paused { at_ms: 1100.0 });
    p.play(50.0);
    assert_eq!(p.position_ms(150.0), Some(1200.0));
    p.seek(150.0, 1600.0);
    assert_eq!(p.position_ms(150.0), Some(100.0));
}

#[test]
fn stop_rewinds() {
    let mut p = player();
    p.play(0.0);
    p.tick(700.0);
    p.stop();
    assert!(p.tick(800.0).is_none());
    assert_eq!(p.last_state(), None);
    p.play(1000.0);
    assert_eq!(p.position_ms(1000.0), Some(0.0));
}
