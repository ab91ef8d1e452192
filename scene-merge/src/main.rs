use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use mini_scene::{Scene, SceneStats};

#[derive(Parser)]
#[command(name = "mini-merge")]
#[command(about = "Combine several .mini scene files into one")]
#[command(version)]
struct Cli {
    /// Input .mini files, merged in the order given
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output path
    #[arg(short, long)]
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut merged = Scene::new();
    for input in &cli.inputs {
        eprintln!("Loading {}...", input.display());
        let scene = Scene::load(input).with_context(|| format!("Failed to load {}", input.display()))?;
        merged
            .merge(scene)
            .with_context(|| format!("Failed to merge {}", input.display()))?;
    }

    print_stats(&merged);

    eprintln!("Saving to {}...", cli.output.display());
    merged
        .save(&cli.output)
        .with_context(|| format!("Failed to save {}", cli.output.display()))?;

    let file_size = std::fs::metadata(&cli.output)?.len();
    eprintln!("Done. Merged {} file(s) into {} ({})", cli.inputs.len(), cli.output.display(), format_bytes(file_size));

    Ok(())
}

fn print_stats(scene: &Scene) {
    let stats = SceneStats::gather(scene);
    eprintln!("  Instances: {}", stats.instances);
    eprintln!("  Objects:   {}", stats.objects);
    eprintln!("  Materials: {}", stats.materials);
    eprintln!("  Textures:  {}", stats.textures);
    eprintln!("  Lights:    {}", stats.quad_lights + stats.dir_lights);
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
