use anyhow::{Context, Result, anyhow, bail};
use clap::{ArgAction, Parser};
use log::{info, warn};
use pagemark::autosave::{self, AutosaveOptions};
use pagemark::engine::FixedPageRenderer;
use pagemark::scene::ThreadedAssetLoader;
use pagemark::{Config, EditorDocument, EditorSession, MemoryScene};
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(name = "pagemark")]
#[command(
    version,
    about = "Reconcile document overlays into a page scene and inspect the result"
)]
struct Cli {
    /// Document or export snapshot (JSON) to load
    #[arg(long, value_name = "PATH", conflicts_with = "restore")]
    document: Option<PathBuf>,

    /// Load the autosaved document instead of a file
    #[arg(long, action = ArgAction::SetTrue)]
    restore: bool,

    /// Page to show (1-based)
    #[arg(long, value_name = "N", default_value_t = 1)]
    page: u32,

    /// Zoom factor (defaults to view.initial_scale)
    #[arg(long, value_name = "S")]
    scale: Option<f64>,

    /// Page size in points, e.g. 612x792
    #[arg(long, value_name = "WxH", value_parser = parse_page_size)]
    page_size: Option<(f64, f64)>,

    /// Print the export snapshot as JSON instead of the scene
    #[arg(long, action = ArgAction::SetTrue)]
    export: bool,

    /// Write the loaded document to the autosave file
    #[arg(long, action = ArgAction::SetTrue)]
    save: bool,

    /// Upper bound on waiting for image loads
    #[arg(long, value_name = "MS", default_value_t = 2000)]
    asset_timeout_ms: u64,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn parse_page_size(raw: &str) -> Result<(f64, f64), String> {
    let (width, height) = raw
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected <W>x<H>, got '{raw}'"))?;
    let parse = |value: &str| {
        value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v > 0.0)
            .ok_or_else(|| format!("invalid page dimension '{value}'"))
    };
    Ok((parse(width)?, parse(height)?))
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let autosave_options = AutosaveOptions::from_config(&config.autosave);

    let document = if let Some(path) = &cli.document {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read document {}", path.display()))?;
        let doc: EditorDocument = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse document {}", path.display()))?;
        Some(doc)
    } else if cli.restore {
        let restored = autosave::load_document(&autosave_options)?;
        if restored.is_none() {
            bail!(
                "no autosaved document found at {}",
                autosave_options.document_path().display()
            );
        }
        restored
    } else {
        None
    };

    let (page_width, page_height) = cli
        .page_size
        .unwrap_or((config.view.page_width, config.view.page_height));
    let page_count = document
        .as_ref()
        .map(|doc| {
            let last_used = doc.overlays.iter().map(|o| o.page).max().unwrap_or(1);
            doc.page_count.max(last_used)
        })
        .unwrap_or(1)
        .max(1);
    let renderer = FixedPageRenderer::new(page_count, page_width, page_height);

    let loader = ThreadedAssetLoader::spawn().context("failed to start asset loader")?;
    let mut session = EditorSession::new(&config, MemoryScene::new(), loader, renderer)?;

    if let Some(doc) = document {
        let dropped = session.load_document(doc);
        if dropped > 0 {
            warn!("Dropped {dropped} overlays with repeated ids");
        }
    }

    let scale = cli.scale.unwrap_or(config.view.initial_scale);
    session
        .set_view(cli.page, scale)
        .map_err(|err| anyhow!("cannot show page {}: {err}", cli.page))?;

    wait_for_assets(&mut session, Duration::from_millis(cli.asset_timeout_ms));

    if cli.save {
        autosave::save_document(session.document(), &autosave_options)?;
    }

    if cli.export {
        let snapshot = session.export_snapshot();
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print!("{}", session.surface().describe());
    }

    Ok(())
}

fn wait_for_assets(
    session: &mut EditorSession<MemoryScene, ThreadedAssetLoader, FixedPageRenderer>,
    timeout: Duration,
) {
    use pagemark::scene::AssetLoader;

    let deadline = Instant::now() + timeout;
    while session.loader().in_flight() > 0 {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            warn!(
                "Gave up waiting for {} asset loads after {} ms",
                session.loader().in_flight(),
                timeout.as_millis()
            );
            break;
        }
        let completions = session.loader_mut().wait_completed(remaining);
        let inserted = session.apply_completions(completions);
        if inserted > 0 {
            info!("Inserted {inserted} image nodes");
        }
    }
}
