use std::{
    fs,
    path::PathBuf,
    process::{Command, Output},
};

use pixel_office_core::{
    CellCoord, FurnitureKind, FurnitureRecord, FurnitureUid, LayoutSnapshot, TileType,
};
use serde_json::Value;

fn scratch_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("pixel-office-{}-{name}", std::process::id()));
    fs::write(&path, contents).expect("scratch file written");
    path
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pixel-office"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to invoke pixel-office")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).expect("utf-8 output")
}

fn two_chair_office() -> LayoutSnapshot {
    let mut layout = LayoutSnapshot::filled(8, 6, TileType::FLOOR);
    layout.furniture.extend([
        FurnitureRecord::new(FurnitureUid::new(1), FurnitureKind::Chair, CellCoord::new(1, 3)),
        FurnitureRecord::new(FurnitureUid::new(2), FurnitureKind::Chair, CellCoord::new(5, 3)),
        FurnitureRecord::new(FurnitureUid::new(3), FurnitureKind::Desk, CellCoord::new(2, 1)),
    ]);
    layout
}

fn layout_file(name: &str, layout: &LayoutSnapshot) -> PathBuf {
    scratch_file(name, &serde_json::to_string(layout).expect("layout serialises"))
}

#[test]
fn validate_reports_the_layout_summary() {
    let path = layout_file("validate.json", &two_chair_office());
    let output = stdout(&run(&["validate", path.to_str().expect("utf-8 path")]));

    assert!(
        output.contains("8x6 tiles, 3 furniture, 2 seats"),
        "unexpected summary: {output}"
    );
}

#[test]
fn validate_rejects_malformed_layouts() {
    let mut layout = LayoutSnapshot::filled(4, 4, TileType::FLOOR);
    let _ = layout.tiles.pop();
    let path = layout_file("malformed.json", &layout);

    let output = run(&["validate", path.to_str().expect("utf-8 path")]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("layout declares 16 tiles but contains 15"),
        "unexpected error: {stderr}"
    );
}

#[test]
fn exported_strings_import_back_to_the_same_layout() {
    let layout = two_chair_office();
    let path = layout_file("export.json", &layout);

    let encoded = stdout(&run(&["export", path.to_str().expect("utf-8 path")]));
    let encoded = encoded.trim();
    assert!(encoded.starts_with("office:v1:8x6:"), "unexpected header: {encoded}");

    let imported = stdout(&run(&["import", encoded]));
    let decoded: LayoutSnapshot = serde_json::from_str(&imported).expect("layout json");
    assert_eq!(decoded, layout);
}

#[test]
fn import_rejects_foreign_strings() {
    let output = run(&["import", "room:v1:4x4:e30"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("layout prefix 'room' is not supported"), "{stderr}");
}

#[test]
fn simulate_prints_seat_payloads() {
    let path = layout_file("simulate.json", &two_chair_office());
    let output = stdout(&run(&[
        "simulate",
        path.to_str().expect("utf-8 path"),
        "--agents",
        "3",
        "--ticks",
        "5",
        "--tick-hz",
        "30",
    ]));
    let report: Value = serde_json::from_str(&output).expect("report json");

    assert_eq!(report["ticks"], 5);
    assert_eq!(report["frames"], 5);
    assert_eq!(report["seats"]["1"]["seatId"], 1);
    assert_eq!(report["seats"]["2"]["seatId"], 2);
    assert_eq!(report["seats"]["3"]["seatId"], Value::Null, "only two chairs");
    assert_eq!(report["names"]["agent-2"]["seatId"], 2);
}

#[test]
fn unknown_config_keys_abort_before_running() {
    let config = scratch_file("bad.toml", "[camera]\nzoom_maximum = 4\n");
    let output = run(&[
        "--config",
        config.to_str().expect("utf-8 path"),
        "simulate",
        "--ticks",
        "1",
    ]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("could not parse config file"), "{stderr}");
}

#[test]
fn out_of_range_config_values_abort_before_running() {
    let config = scratch_file("lerp.toml", "[camera]\nfollow_lerp = 0.0\n");
    let output = run(&[
        "--config",
        config.to_str().expect("utf-8 path"),
        "simulate",
        "--ticks",
        "1",
    ]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("camera.follow_lerp out of range"), "{stderr}");
}
