//! Scene file analyzer tool.
//!
//! Loads a .mini scene file and prints what it contains: instance and mesh
//! counts (both unique and as instanced), textures, materials, lights and
//! world bounds. Textures can optionally be written out as image files.
//!
//! Usage: cargo run -p mini-info -- <file.mini> [--json] [--extract-textures <dir>]

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use mini_scene::{Scene, SceneStats, Texture, TextureFormat};

#[derive(Parser)]
#[command(name = "mini-info")]
#[command(about = "Print statistics about a .mini scene file")]
#[command(version)]
struct Cli {
    /// Input .mini file
    input: PathBuf,

    /// Print the statistics as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Write every texture to this directory (PNG for images, .ptx for ptex payloads)
    #[arg(long, value_name = "DIR")]
    extract_textures: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let file_size = fs::metadata(&cli.input)
        .with_context(|| format!("Cannot read {}", cli.input.display()))?
        .len();
    let scene = Scene::load(&cli.input)
        .with_context(|| format!("Failed to load {}", cli.input.display()))?;
    log::info!("Scene loaded from {}", cli.input.display());

    let stats = SceneStats::gather(&scene);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        let file_name = cli.input.file_name().unwrap_or_default().to_string_lossy();
        println!("Scene File: {}", file_name);
        println!("File Size: {}", format_bytes(file_size));
        println!();
        print_scene_summary(&stats);
    }

    if let Some(dir) = &cli.extract_textures {
        let written = extract_textures(&scene, dir)?;
        eprintln!("Extracted {} texture(s) to {}", written, dir.display());
    }

    Ok(())
}

fn print_scene_summary(stats: &SceneStats) {
    println!("Instances:");
    println!("  {:<24} {}", "instance slots", pretty(stats.instance_slots));
    println!("  {:<24} {}", "instances", pretty(stats.instances));
    println!("  {:<24} {}", "objects", pretty(stats.objects));
    println!();

    println!("Unique geometry:");
    println!("  {:<24} {}", "meshes", pretty(stats.unique_meshes));
    println!("  {:<24} {}", "triangles", pretty(stats.unique_triangles));
    println!("  {:<24} {}", "vertices", pretty(stats.unique_vertices));
    println!();

    println!("Instanced geometry:");
    println!("  {:<24} {}", "meshes", pretty(stats.actual_meshes));
    println!("  {:<24} {}", "triangles", pretty(stats.actual_triangles));
    println!("  {:<24} {}", "vertices", pretty(stats.actual_vertices));
    println!("  {:<24} {}", "normals", pretty(stats.actual_normals));
    println!("  {:<24} {}", "texcoords", pretty(stats.actual_texcoords));
    println!();

    println!("Textures and materials:");
    println!("  {:<24} {}", "textures", pretty(stats.textures));
    println!("  {:<24} {}", " - ptex", pretty(stats.ptex_textures));
    println!("  {:<24} {}", " - image", pretty(stats.image_textures));
    println!("  {:<24} {}", "texture data", format_bytes(stats.texture_bytes() as u64));
    println!("  {:<24} {}", " - in ptex", format_bytes(stats.ptex_bytes as u64));
    println!("  {:<24} {}", " - in texels", format_bytes(stats.texel_bytes as u64));
    println!("  {:<24} {}", "materials", pretty(stats.materials));
    println!();

    println!("Lights:");
    println!("  {:<24} {}", "quad lights", pretty(stats.quad_lights));
    println!("  {:<24} {}", "directional lights", pretty(stats.dir_lights));
    match stats.env_map_size {
        Some([width, height]) => println!("  {:<24} yes, {}x{} texels", "env map", width, height),
        None => println!("  {:<24} no", "env map"),
    }
    println!();

    match &stats.bounds {
        Some(bounds) => {
            let [x0, y0, z0] = bounds.min;
            let [x1, y1, z1] = bounds.max;
            let [cx, cy, cz] = bounds.center;
            let [ex, ey, ez] = bounds.extent;
            println!("Bounds:");
            println!("  {:<24} ({}, {}, {}) - ({}, {}, {})", "box", x0, y0, z0, x1, y1, z1);
            println!("  {:<24} ({}, {}, {})", "center", cx, cy, cz);
            println!("  {:<24} {} x {} x {}", "extent", ex, ey, ez);
        }
        None => println!("Bounds: empty"),
    }
}

/// Writes every table texture plus the environment map; returns how many files were written.
fn extract_textures(scene: &Scene, dir: &Path) -> Result<usize> {
    fs::create_dir_all(dir).with_context(|| format!("Cannot create {}", dir.display()))?;

    let mut ids: Vec<_> = scene.textures.keys().copied().collect();
    ids.sort_unstable();

    let mut written = 0;
    for id in ids {
        let Some(texture) = scene.get_texture(id) else {
            continue;
        };
        if write_texture(texture, &dir.join(format!("texture_{}", id)))? {
            written += 1;
        }
    }
    if let Some(env_map) = &scene.env_map_light {
        if write_texture(&env_map.texture, &dir.join("env_map"))? {
            written += 1;
        }
    }
    Ok(written)
}

/// Writes one texture next to `stem`, choosing the extension from its format.
fn write_texture(texture: &Texture, stem: &Path) -> Result<bool> {
    if texture.format == TextureFormat::EmbeddedPtex {
        let path = stem.with_extension("ptx");
        fs::write(&path, &texture.data).with_context(|| format!("Cannot write {}", path.display()))?;
        return Ok(true);
    }

    let Some(image) = texture.to_image() else {
        log::warn!(
            "Skipping {}: {:?} texture of size {}x{} cannot be exported",
            stem.display(),
            texture.format,
            texture.size.x,
            texture.size.y
        );
        return Ok(false);
    };
    let path = stem.with_extension("png");
    image
        .to_rgba8()
        .save(&path)
        .with_context(|| format!("Cannot write {}", path.display()))?;
    Ok(true)
}

fn pretty(n: usize) -> String {
    if n < 1000 {
        return n.to_string();
    }
    let scaled = if n < 1_000_000 {
        format!("{:.2}K", n as f64 / 1e3)
    } else if n < 1_000_000_000 {
        format!("{:.2}M", n as f64 / 1e6)
    } else {
        format!("{:.2}G", n as f64 / 1e9)
    };
    format!("{:<10} ({})", scaled, n)
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
