use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use mini_scene::{lint, Scene};

#[derive(Parser)]
#[command(name = "mini-lint")]
#[command(about = "Check a .mini scene file for broken or suspicious content")]
#[command(version)]
struct Cli {
    /// Input .mini file
    input: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    eprintln!("Loading {}...", cli.input.display());
    let scene = Scene::load(&cli.input)
        .with_context(|| format!("Failed to load {}", cli.input.display()))?;

    let report = lint(&scene).with_context(|| format!("{} failed lint", cli.input.display()))?;

    println!(
        "Checked {} object(s), {} mesh(es), {} triangle(s)",
        report.objects_checked, report.meshes_checked, report.triangles_checked
    );
    if report.is_clean() {
        println!("No problems found.");
    } else {
        println!("{} warning(s):", report.warnings.len());
        for warning in &report.warnings {
            println!("  - {}", warning);
        }
    }

    Ok(())
}
