use filament_smoother::cancel::CancelToken;
use filament_smoother::config::{self, SmoothTarget};
use filament_smoother::table_io::{derive_output_name, JsonTableFile, RecordSink, RecordSource};
use filament_smoother::{AttributeSmoothingStats, PoseAttribute, TrajectorySmoother};
use std::env;
use std::path::Path;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    env_logger::init();
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = config::load_smooth_config(Path::new(&config_path))?;

    let source = JsonTableFile::new(&config.input);
    let mut document = source.load().map_err(|e| e.to_string())?;

    let smoother = TrajectorySmoother::new(config.smoother.clone());
    let cancel = CancelToken::new();
    let stats = match config.target {
        SmoothTarget::Rot => vec![smoother
            .smooth_attribute(&mut document.particles, PoseAttribute::AngleRot, &cancel)
            .map_err(|e| e.to_string())?],
        SmoothTarget::Psi => vec![smoother
            .smooth_attribute(&mut document.particles, PoseAttribute::AnglePsi, &cancel)
            .map_err(|e| e.to_string())?],
        SmoothTarget::Shifts => smoother
            .smooth_shifts(&mut document.particles, &cancel)
            .map_err(|e| e.to_string())?,
    };

    let output_path = derive_output_name(
        &config.input,
        config.target.suffix(),
        &config.output.directory,
    );
    JsonTableFile::new(&output_path)
        .store(&document)
        .map_err(|e| e.to_string())?;

    for pass in &stats {
        print_pass_summary(pass);
    }
    println!("Updated table saved as {}", output_path.display());
    Ok(())
}

fn print_pass_summary(stats: &AttributeSmoothingStats) {
    println!("Smoothing summary ({})", stats.attribute.label());
    println!("  filaments: {}", stats.filaments);
    println!("  fitted: {}", stats.fitted);
    println!("  discarded: {}", stats.discarded.len());
    println!(
        "  segments: {} -> {}",
        stats.segments_before, stats.segments_after
    );
}

fn usage() -> String {
    "usage: smooth_poses <config.json>".to_string()
}
