//! Seam to the rendering collaborator.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::assets::AssetCatalog;
use crate::difficulty::Difficulty;
use crate::error::RenderError;
use crate::notifier::SourceId;
use crate::question::Question;

/// Everything a renderer needs to draw one question.
#[derive(Debug, Clone, Copy)]
pub struct QuestionView<'a> {
    pub source: &'a SourceId,
    pub question: &'a Question,
    pub difficulty: Difficulty,
    pub max_questions: usize,
}

impl QuestionView<'_> {
    pub fn operator_symbol(&self) -> &'static str {
        self.question.operator().symbol()
    }

    /// Asset names the view refers to, resolved through `assets`.
    pub fn assets<'c>(&self, assets: &'c AssetCatalog) -> Vec<&'c str> {
        [
            assets.board_for(i64::from(self.question.operand1())),
            assets.board_for(i64::from(self.question.operand2())),
            assets.sequence_board(self.question.index()),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

pub trait Renderer {
    fn render(&mut self, view: &QuestionView<'_>) -> Result<(), RenderError>;
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn render(&mut self, view: &QuestionView<'_>) -> Result<(), RenderError> {
        (**self).render(view)
    }
}

/// Renders nothing. Used where no display exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct Headless;

impl Renderer for Headless {
    fn render(&mut self, _view: &QuestionView<'_>) -> Result<(), RenderError> {
        Ok(())
    }
}

/// Verifies asset files exist below a root directory.
#[derive(Debug, Clone)]
pub struct AssetRoot {
    root: PathBuf,
}

impl AssetRoot {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn verify(&self, asset: &str) -> Result<PathBuf, RenderError> {
        let path = self.root.join(asset);
        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => Ok(path),
            Ok(_) => Err(RenderError::AssetMissing {
                asset: asset.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a file"),
            }),
            Err(source) => Err(RenderError::AssetMissing {
                asset: asset.to_string(),
                source,
            }),
        }
    }
}

/// Writes one line per question.
#[derive(Debug)]
pub struct TextRenderer<W: Write> {
    out: W,
    assets: AssetCatalog,
    asset_root: Option<AssetRoot>,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W, assets: AssetCatalog) -> Self {
        Self {
            out,
            assets,
            asset_root: None,
        }
    }

    /// Require every referenced asset to exist below `root`.
    pub fn with_asset_root(mut self, root: AssetRoot) -> Self {
        self.asset_root = Some(root);
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn render(&mut self, view: &QuestionView<'_>) -> Result<(), RenderError> {
        if let Some(root) = &self.asset_root {
            for asset in view.assets(&self.assets) {
                root.verify(asset)?;
            }
        }
        writeln!(
            self.out,
            "[{}/{}] {}",
            view.question.index(),
            view.max_questions,
            view.question.text()
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::Operator;
    use crate::question::Permutation;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    fn view_of<'a>(source: &'a SourceId, question: &'a Question) -> QuestionView<'a> {
        QuestionView {
            source,
            question,
            difficulty: Difficulty::Easy,
            max_questions: 5,
        }
    }

    #[test]
    fn test_text_renderer_writes_question() {
        let source = SourceId::new("addition");
        let question = Question::new(Permutation::new(2, 3, Operator::Add), 1).unwrap();
        let mut renderer = TextRenderer::new(Vec::new(), AssetCatalog::load().unwrap());
        renderer.render(&view_of(&source, &question)).unwrap();
        let out = String::from_utf8(renderer.into_inner()).unwrap();
        assert_eq!(out, "[1/5] 2 + 3 = ?\n");
    }

    #[test]
    fn test_view_resolves_assets() {
        let source = SourceId::new("addition");
        let question = Question::new(Permutation::new(2, 12, Operator::Add), 2).unwrap();
        let assets = AssetCatalog::load().unwrap();
        let view = view_of(&source, &question);
        assert_eq!(view.assets(&assets), ["boards/2.png", "sequence/second.png"]);
        assert_eq!(view.operator_symbol(), "+");
    }

    #[test]
    fn test_missing_asset_fails() {
        let dir = tempdir().unwrap();
        let source = SourceId::new("addition");
        let question = Question::new(Permutation::new(2, 3, Operator::Add), 1).unwrap();
        let mut renderer = TextRenderer::new(Vec::new(), AssetCatalog::load().unwrap())
            .with_asset_root(AssetRoot::new(dir.path()));

        let result = renderer.render(&view_of(&source, &question));
        assert_matches!(result, Err(RenderError::AssetMissing { asset, .. }) if asset == "boards/2.png");
    }

    #[test]
    fn test_present_assets_pass() {
        let dir = tempdir().unwrap();
        for asset in ["boards/2.png", "boards/3.png", "sequence/first.png"] {
            let path = dir.path().join(asset);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, b"png").unwrap();
        }
        let source = SourceId::new("addition");
        let question = Question::new(Permutation::new(2, 3, Operator::Add), 1).unwrap();
        let mut renderer = TextRenderer::new(Vec::new(), AssetCatalog::load().unwrap())
            .with_asset_root(AssetRoot::new(dir.path()));
        renderer.render(&view_of(&source, &question)).unwrap();
    }
}
