//! Load command - run a resource manifest through the loader

use anyhow::{Context, Result};
use clap::Args;
use mengine_core::resources::Resource;
use mengine_core::{LoaderConfig, ResourceLoader, ResourceManifest, config};
use std::path::{Path, PathBuf};

/// Arguments for the load command
#[derive(Args)]
pub struct LoadArgs {
    /// Resource manifest (TOML with [[resources]] entries)
    pub manifest: PathBuf,

    /// Directory relative paths are read from (default: the manifest's directory)
    #[arg(long)]
    pub asset_dir: Option<PathBuf>,

    /// Fetch relative paths from this URL instead of disk
    #[arg(long)]
    pub base_url: Option<String>,

    /// Sample rate decoded audio is resampled to
    #[arg(long)]
    pub sample_rate: Option<u32>,
}

/// Execute the load command
pub fn execute(args: LoadArgs) -> Result<()> {
    run(args, config::load())
}

/// Load the manifest using `stored` as the base configuration
fn run(args: LoadArgs, stored: LoaderConfig) -> Result<()> {
    let manifest = ResourceManifest::load(&args.manifest)?;
    let config = resolve_config(stored, &args);
    let loader = ResourceLoader::from_config(&config).context("Failed to create resource loader")?;

    let sources = manifest.to_source_map();
    println!("=== Loading {} resources ===", sources.len());

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create runtime")?;

    let mut on_progress = |done: usize, total: usize| println!("  [{}/{}]", done, total);
    let mut loaded = None;
    rt.block_on(loader.load(
        sources.clone(),
        |results| loaded = Some(results),
        Some(&mut on_progress),
    ));
    let results = loaded.unwrap_or_default();

    println!();
    for (key, location) in sources.iter() {
        println!("  {:<16} {:<24} {}", key, location, describe(results.get(key)));
    }

    let failed = sources.len() - results.len();
    if failed > 0 {
        anyhow::bail!("{} of {} resources failed to load", failed, sources.len());
    }
    Ok(())
}

/// Apply command-line overrides on top of the stored configuration
fn resolve_config(mut config: LoaderConfig, args: &LoadArgs) -> LoaderConfig {
    config.asset_dir = match &args.asset_dir {
        Some(dir) => dir.clone(),
        None => manifest_dir(&args.manifest),
    };
    if args.base_url.is_some() {
        config.base_url = args.base_url.clone();
    }
    if let Some(rate) = args.sample_rate {
        config.sample_rate = rate;
    }
    config
}

fn manifest_dir(manifest: &Path) -> PathBuf {
    match manifest.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn describe(resource: Option<&Resource>) -> String {
    match resource {
        None => "FAILED".to_string(),
        Some(Resource::Bytes(bytes)) => format!("midi, {} bytes", bytes.len()),
        Some(Resource::Audio(buffer)) => format!(
            "audio, {} ch, {:.2}s @ {} Hz",
            buffer.number_of_channels(),
            buffer.duration(),
            buffer.sample_rate()
        ),
        Some(Resource::Image(image)) => format!("image, {}x{}", image.width(), image.height()),
    }
}
