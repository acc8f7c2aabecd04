use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use glyphcast::cli::Cli;
use glyphcast::export::{validate_glb, ExportOptions, ExportScope};
use glyphcast::font::{DiskFontProvider, FontProvider, HttpFontProvider, DEFAULT_FONT_URL};
use glyphcast::texture::{load_texture_file, TextureService, DEFAULT_TEXTURE_URL};
use glyphcast::{MeshUpdater, ViewerSession};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    run(cli).await
}

async fn run(cli: Cli) -> Result<()> {
    let timeout = Duration::from_secs(cli.timeout_secs);

    let fonts: Arc<dyn FontProvider> = match &cli.fonts_dir {
        Some(dir) => Arc::new(DiskFontProvider::new(dir)),
        None => {
            let url = cli
                .font_url
                .clone()
                .or_else(|| std::env::var("GLYPHCAST_FONT_URL").ok())
                .unwrap_or_else(|| DEFAULT_FONT_URL.to_string());
            Arc::new(HttpFontProvider::new(url, timeout)?)
        }
    };
    let updater = MeshUpdater::with_default_engine(fonts);

    let mut session = ViewerSession::new();
    let (width, height) = cli.viewport;
    session.set_viewport(width, height);

    // Resolve textures before building so the mesh lands with its map.
    if let Some(path) = &cli.texture {
        session.set_texture(load_texture_file(path)?);
    }
    if let Some(prompt) = &cli.texture_prompt {
        let url = cli
            .texture_url
            .clone()
            .or_else(|| std::env::var("GLYPHCAST_TEXTURE_URL").ok())
            .unwrap_or_else(|| DEFAULT_TEXTURE_URL.to_string());
        let service = TextureService::new(url, timeout)?;
        let handle = service
            .generate(prompt)
            .await
            .context("generating texture")?;
        session.set_texture(handle);
    }

    let outcome = updater
        .regenerate(&mut session, cli.text_params(), cli.material_params())
        .await
        .context("regenerating text mesh")?;
    let handle = outcome.handle().context("regeneration was superseded")?;
    log::info!(
        "mesh ready: {} vertices, {} triangles, camera distance {:.2}",
        handle.vertices,
        handle.triangles,
        session.camera.distance_to_target()
    );

    let options = ExportOptions {
        scope: if cli.full_scene {
            ExportScope::FullScene
        } else {
            ExportScope::MeshOnly
        },
    };
    let Some(bytes) = session.export_glb(&options)? else {
        log::warn!("nothing to export");
        return Ok(());
    };
    std::fs::write(&cli.output, &bytes)
        .with_context(|| format!("writing {}", cli.output.display()))?;
    log::info!("wrote {} ({} bytes)", cli.output.display(), bytes.len());

    if cli.validate {
        let stats = validate_glb(&bytes).context("validating export")?;
        log::info!(
            "validated: {} nodes, {} meshes, {} materials, {} images, {} vertices, {} triangles",
            stats.nodes,
            stats.meshes,
            stats.materials,
            stats.images,
            stats.vertices,
            stats.triangles
        );
    }
    Ok(())
}
