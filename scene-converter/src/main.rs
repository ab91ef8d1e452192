use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use mini_scene::{FormatVersion, SaveOptions, Scene, SceneStats};

#[derive(Parser)]
#[command(name = "mini-convert")]
#[command(about = "Load a .mini scene file and save it again, optionally in another format version")]
#[command(version)]
struct Cli {
    /// Input .mini file
    input: PathBuf,

    /// Output path (defaults to <input>.v<version>.mini)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Format version to write
    #[arg(long, default_value_t = FormatVersion::CURRENT.number(), value_parser = clap::value_parser!(u32).range(10..=11))]
    format_version: u32,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let version = FormatVersion::from_number(cli.format_version)
        .with_context(|| format!("Unknown format version {}", cli.format_version))?;
    let output = cli
        .output
        .unwrap_or_else(|| cli.input.with_extension(format!("v{}.mini", version.number())));

    eprintln!("Loading {}...", cli.input.display());
    let scene = Scene::load(&cli.input)
        .with_context(|| format!("Failed to load {}", cli.input.display()))?;

    print_stats(&scene);

    eprintln!("Saving to {} (format {})...", output.display(), version);
    scene
        .save_with_options(&output, &SaveOptions::with_version(version))
        .with_context(|| format!("Failed to save {}", output.display()))?;

    let file_size = std::fs::metadata(&output)?.len();
    eprintln!("Done. Output: {} ({})", output.display(), format_bytes(file_size));

    Ok(())
}

fn print_stats(scene: &Scene) {
    let stats = SceneStats::gather(scene);
    eprintln!("  Instances: {}", stats.instances);
    eprintln!("  Objects:   {}", stats.objects);
    eprintln!("  Meshes:    {}", stats.unique_meshes);
    eprintln!("  Materials: {}", stats.materials);
    eprintln!("  Textures:  {}", stats.textures);
    eprintln!("  Lights:    {}", stats.quad_lights + stats.dir_lights);
    eprintln!("  Env map:   {}", if stats.has_env_map { "yes" } else { "no" });
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
