use super::*;
use crate::effects::transitions::{TransitionKind, TransitionSpec};
use crate::test_support::png_bytes;

fn sample_project() -> Project {
    let mut timeline = Timeline::new(Fps::integer(24).unwrap());
    let mut images = ImageLibrary::new();
    for (i, color) in [[255, 0, 0, 255], [0, 0, 255, 255], [9, 9, 9, 255]]
        .into_iter()
        .enumerate()
    {
        let name = format!("clip-{i}.png");
        images.insert(name.clone(), png_bytes(3, 2, color));
        timeline
            .push(Clip::new(format!("clip-{i}"), name, 3, 2, 800 + i as u64 * 100))
            .unwrap();
    }
    timeline
        .set_transition(
            0,
            TransitionSpec {
                kind: TransitionKind::Pixelate,
                duration_ms: 300,
                params: serde_json::json!({ "maxBlock": 12 }),
            },
        )
        .unwrap();
    timeline
        .set_transition(1, TransitionSpec::new(TransitionKind::SlideDown, 250))
        .unwrap();
    Project { timeline, images }
}

#[test]
fn archive_round_trip_is_exact() {
    let project = sample_project();
    let dir = tempfile::tempdir().unwrap();
    write_project(&project, dir.path()).unwrap();

    let back = read_project(dir.path()).unwrap();
    assert_eq!(back, project);

    let again = tempfile::tempdir().unwrap();
    write_project(&back, again.path()).unwrap();
    let m1 = std::fs::read_to_string(dir.path().join(MANIFEST_FILE)).unwrap();
    let m2 = std::fs::read_to_string(again.path().join(MANIFEST_FILE)).unwrap();
    assert_eq!(m1, m2);
}

#[test]
fn manifest_uses_documented_field_names() {
    let json = manifest_json(&sample_project().timeline).unwrap();
    let v: serde_json::Value = serde_json::from_str(&json).unwrap();
    let clip = &v["clips"][0];
    assert_eq!(clip["id"], "clip-0");
    assert_eq!(clip["filename"], "clip-0.png");
    assert_eq!(clip["durationMs"], 800);
    assert_eq!(clip["transitionAfter"]["kind"], "pixelate");
    assert_eq!(clip["transitionAfter"]["durationMs"], 300);
    assert!(v["clips"][2].get("transitionAfter").is_none());
}

#[test]
fn missing_image_file_is_reported() {
    let project = sample_project();
    let dir = tempfile::tempdir().unwrap();
    write_project(&project, dir.path()).unwrap();
    std::fs::remove_file(image_path(dir.path(), "clip-1.png")).unwrap();
    let err = read_project(dir.path()).unwrap_err();
    assert!(err.to_string().contains("clip-1"));
}

#[test]
fn traversal_in_file_names_is_rejected() {
    let json = r#"{
        "version": 1,
        "fps": { "num": 30, "den": 1 },
        "clips": [
            { "id": "a", "filename": "../etc/passwd", "width": 1, "height": 1, "durationMs": 500 }
        ]
    }"#;
    assert!(timeline_from_manifest(json).is_err());
}

#[test]
fn manifest_load_reapplies_duration_invariant() {
    let json = r#"{
        "version": 1,
        "fps": { "num": 30, "den": 1 },
        "clips": [
            { "id": "a", "filename": "a.png", "width": 1, "height": 1, "durationMs": 200,
              "transitionAfter": { "kind": "fade", "durationMs": 400 } },
            { "id": "b", "filename": "b.png", "width": 1, "height": 1, "durationMs": 500 }
        ]
    }"#;
    let t = timeline_from_manifest(json).unwrap();
    assert_eq!(t.clip(0).unwrap().duration_ms, 434);
}

#[test]
fn unknown_version_is_rejected() {
    let json = r#"{ "version": 9, "fps": { "num": 30, "den": 1 }, "clips": [] }"#;
    assert!(timeline_from_manifest(json).is_err());
}
