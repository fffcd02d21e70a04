//! Example demonstrating the headless collection pipeline
//!
//! This example simulates pointer traffic for a handwritten symbol and walks
//! through:
//! 1. Capturing the gesture with the min-step filter and time re-shifting
//! 2. Normalizing the strokes into the export frame
//! 3. Wrapping them into a labeled sample and a versioned dataset document
//!
//! Run with: cargo run --example capture_demo

use glyphpad::capture::CaptureSession;
use glyphpad::dataset;
use glyphpad::geometry;
use glyphpad::sample::Sample;
use glyphpad::stroke;

fn main() {
    println!("=== GlyphPad Pipeline Demo ===\n");

    let frame_width = 300;
    let frame_height = 300;
    let frame_margin = 0.1;

    // Simulate drawing a small "x" in the upper-left corner of the canvas,
    // with move events every 8 ms the way a pointer stream delivers them.
    let mut session = CaptureSession::new();
    let mut raw_moves = 0;

    for (stroke_idx, (from, to)) in [((30, 30), (110, 110)), ((110, 30), (30, 110))]
        .iter()
        .enumerate()
    {
        let start_ms = 2000 + 600 * stroke_idx as u64;
        session.pointer_down(from.0, from.1, start_ms);
        let steps = 50;
        for i in 1..=steps {
            let x = from.0 + (to.0 - from.0) * i / steps;
            let y = from.1 + (to.1 - from.1) * i / steps;
            session.pointer_move(x, y, start_ms + 8 * i as u64);
            raw_moves += 1;
        }
        session.pointer_up();
    }

    let kept = stroke::total_points(session.strokes());
    println!("Captured {} strokes from {} raw pointer moves", session.strokes().len(), raw_moves);
    println!(
        "Min-step filter kept {} points ({:.1}% reduction)",
        kept,
        100.0 * (1.0 - kept as f64 / (raw_moves + 2) as f64)
    );
    println!(
        "First committed point time: {} ms (re-shifted to the session start)\n",
        session.strokes()[0][0].time
    );

    // Normalize into the export frame.
    let bbox_before = geometry::bounding_box(session.strokes()).unwrap();
    let normalized = geometry::normalize(frame_width, frame_height, frame_margin, session.strokes());
    let bbox_after = geometry::bounding_box(&normalized).unwrap();

    println!("Normalizing into a {frame_width}x{frame_height} frame (margin {frame_margin}):");
    println!(
        "  bounding box before: {}x{} at ({}, {})",
        bbox_before.width(),
        bbox_before.height(),
        bbox_before.x_min,
        bbox_before.y_min
    );
    println!(
        "  bounding box after:  {}x{} at ({}, {})\n",
        bbox_after.width(),
        bbox_after.height(),
        bbox_after.x_min,
        bbox_after.y_min
    );

    // Wrap into a labeled sample and a dataset document.
    let sample = Sample::build(0, "\\times", "U+D7", frame_width, frame_height, normalized);
    println!(
        "Built sample {}: '{}' ({}) with {} points",
        sample.id, sample.symbol_label, sample.unicode, sample.total_point_count
    );

    let document = dataset::serialize(&[sample], frame_margin);
    match dataset::to_json(&document) {
        Ok(json) => {
            println!(
                "Serialized dataset: version {}, {} samples, {} bytes of JSON",
                document.format_version,
                document.sample_count,
                json.len()
            );
            println!(
                "Would export as: {}",
                dataset::export_filename(chrono::Local::now())
            );
        }
        Err(e) => println!("Serialization failed: {e}"),
    }

    println!("\nDemo complete!");
}
