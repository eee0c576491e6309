use super::load_generator;
use paletteer::config::Config;
use paletteer::error::Error;
use paletteer::report::{self, Renderer};
use paletteer::store;
use paletteer::sync::{self, SyncMode, SyncOptions};

pub(crate) fn run_sync(
    renderer: &Renderer,
    config: &Config,
    mode: SyncMode,
    options: SyncOptions,
) -> Result<i32, Error> {
    let generator = load_generator(config)?;
    let entries = store::discover(&config.corpus.themes_dir)?;
    let summary = sync::run(&entries, &generator, mode, options)?;
    renderer.print(&report::render_sync(&summary, renderer.color()));
    Ok(0)
}
