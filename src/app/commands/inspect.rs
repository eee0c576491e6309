use super::{load_corpus, load_generator};
use paletteer::config::Config;
use paletteer::corpus::{Corpus, LabeledTheme};
use paletteer::error::Error;
use paletteer::report::{self, Renderer};

fn find<'a>(corpus: &'a Corpus, id: &str) -> Result<&'a LabeledTheme, Error> {
    corpus
        .get(id)
        .ok_or_else(|| Error::UnknownTheme(id.to_string()))
}

pub(crate) fn run_preview(renderer: &Renderer, config: &Config, id: &str) -> Result<i32, Error> {
    let generator = load_generator(config)?;
    let corpus = load_corpus(config)?;
    let theme = find(&corpus, id)?;
    let decisions = generator.explain(theme.palette());
    renderer.print(&report::render_preview(
        theme.id(),
        theme.palette(),
        &decisions,
        theme.source(),
        renderer.color(),
    ));
    Ok(0)
}

pub(crate) fn run_features(renderer: &Renderer, config: &Config, id: &str) -> Result<i32, Error> {
    let corpus = load_corpus(config)?;
    let theme = find(&corpus, id)?;
    renderer.print(&report::render_features(
        theme.id(),
        &theme.features(),
        renderer.color(),
    ));
    Ok(0)
}
