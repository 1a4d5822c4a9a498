use filament_smoother::cancel::CancelToken;
use filament_smoother::config;
use filament_smoother::table_io::{
    derive_output_name, write_text_report, JsonTableFile, RecordSink, RecordSource, TableDocument,
    REPORT_FILE_NAME,
};
use filament_smoother::MajorityClassUnifier;
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
    let config = config::load_unify_config(Path::new(&config_path))?;

    let reference = JsonTableFile::new(&config.reference)
        .load()
        .map_err(|e| e.to_string())?;
    let classified = JsonTableFile::new(&config.classified)
        .load()
        .map_err(|e| e.to_string())?;

    let unifier = MajorityClassUnifier::new(config.cutoff).map_err(|e| e.to_string())?;
    let (unified, report) = unifier
        .unify(&reference.particles, &classified.particles, &CancelToken::new())
        .map_err(|e| e.to_string())?;

    // The unified table carries the classified run's optics block, but the
    // reference run's pose fields.
    let document = TableDocument {
        optics: classified.optics.clone(),
        particles: unified,
    };
    let output_path = derive_output_name(
        &config.classified,
        "class_corrected",
        &config.output.directory,
    );
    JsonTableFile::new(&output_path)
        .store(&document)
        .map_err(|e| e.to_string())?;

    let report_path = config.output.directory.join(REPORT_FILE_NAME);
    write_text_report(&report_path, &report.render_text()).map_err(|e| e.to_string())?;

    println!(
        "Unified {} of {} filaments ({} segments)",
        report.filaments_after, report.filaments_before, report.total_segments
    );
    println!("Corrected table saved as {}", output_path.display());
    println!("Report written to {}", report_path.display());
    Ok(())
}

fn usage() -> String {
    "usage: unify_classes <config.json>".to_string()
}
