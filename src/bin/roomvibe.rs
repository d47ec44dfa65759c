use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use kurbo::Rect;

#[derive(Parser, Debug)]
#[command(name = "roomvibe", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite a scene to a PNG snapshot.
    Export(ExportArgs),
    /// Validate a scene JSON without rendering.
    Check(CheckArgs),
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path. Defaults to the standard download filename.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Render at 2.5x output resolution.
    #[arg(long)]
    hires: bool,

    /// Stamp the free-tier watermark (1x only).
    #[arg(long)]
    watermark: bool,
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

/// On-disk scene description: a catalog plus one placement. Image references
/// resolve relative to the scene file's directory.
#[derive(Debug, serde::Deserialize)]
struct SceneFile {
    catalog: roomvibe::Catalog,
    room: String,
    art: String,
    #[serde(default)]
    frame: roomvibe::FrameStyle,
    #[serde(default = "center_default")]
    center: roomvibe::NormPoint,
    #[serde(default)]
    scale: Option<f64>,
}

fn center_default() -> roomvibe::NormPoint {
    roomvibe::NormPoint::CENTER
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Export(args) => cmd_export(args),
        Command::Check(args) => cmd_check(args),
    }
}

fn read_scene_json(path: &Path) -> anyhow::Result<SceneFile> {
    let f = File::open(path).with_context(|| format!("open scene '{}'", path.display()))?;
    let r = BufReader::new(f);
    let scene: SceneFile = serde_json::from_reader(r).with_context(|| "parse scene JSON")?;
    Ok(scene)
}

fn build_stage(scene: &SceneFile) -> anyhow::Result<roomvibe::Stage> {
    scene.catalog.validate()?;

    let room = scene
        .catalog
        .room(&scene.room)
        .with_context(|| format!("unknown room '{}'", scene.room))?;
    let artwork = scene
        .catalog
        .artwork(&scene.art)
        .with_context(|| format!("unknown artwork '{}'", scene.art))?;

    let scale = match scene.scale {
        Some(v) => roomvibe::ScaleFactor::new(v)?,
        None => roomvibe::ScaleFactor::default(),
    };
    let placement = roomvibe::Placement {
        artwork_id: artwork.id.clone(),
        room_id: room.id.clone(),
        frame: scene.frame,
        center: scene.center.validated()?,
        scale,
    };

    // The logical export canvas doubles as the container, so the snapshot
    // matches what an embed of that size would show.
    let container = Rect::new(
        0.0,
        0.0,
        f64::from(roomvibe::export::LOGICAL_WIDTH),
        f64::from(roomvibe::export::LOGICAL_HEIGHT),
    );
    let mut stage = roomvibe::Stage::new(container)?;
    stage.set_background(room);
    stage.mount_overlay(artwork, &placement, roomvibe::OverlayClass::Visible)?;
    Ok(stage)
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let scene = read_scene_json(&args.in_path)?;
    let stage = build_stage(&scene)?;

    let assets_root = args.in_path.parent().unwrap_or_else(|| Path::new("."));
    let mut store = roomvibe::FsImageStore::new(assets_root);

    let opts = roomvibe::ExportOptions {
        high_res: args.hires,
        entitlements: roomvibe::Entitlements {
            free_tier: args.watermark,
            hires_export: true,
        },
    };
    let canvas = roomvibe::export::compose(&stage, &mut store, &opts)?;

    let out = args
        .out
        .unwrap_or_else(|| PathBuf::from(roomvibe::export_filename(args.hires)));
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
    }

    let bytes = roomvibe::export::encode_png(&canvas)?;
    std::fs::write(&out, bytes).with_context(|| format!("write png '{}'", out.display()))?;

    eprintln!("wrote {}", out.display());
    Ok(())
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let scene = read_scene_json(&args.in_path)?;
    build_stage(&scene)?;
    eprintln!(
        "ok: {} artworks, {} rooms, placement '{}' in '{}'",
        scene.catalog.artworks.len(),
        scene.catalog.rooms.len(),
        scene.art,
        scene.room
    );
    Ok(())
}
