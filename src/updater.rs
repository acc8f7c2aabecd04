use std::sync::Arc;

use crate::error::Result;
use crate::font::FontProvider;
use crate::geometry::{ExtrudedTextEngine, TextEngine, TextGeometry};
use crate::params::{MaterialParams, TextParams};
use crate::session::{CommitOutcome, RegenTicket, ViewerSession};

/// Rebuilds the displayed mesh from parameters. Regeneration suspends once,
/// at the font load; the session is only borrowed again when the finished
/// geometry commits, so a failure or a stale result leaves the previous
/// mesh exactly as it was.
pub struct MeshUpdater {
    fonts: Arc<dyn FontProvider>,
    engine: Box<dyn TextEngine>,
}

impl MeshUpdater {
    pub fn new(fonts: Arc<dyn FontProvider>, engine: Box<dyn TextEngine>) -> Self {
        Self { fonts, engine }
    }

    pub fn with_default_engine(fonts: Arc<dyn FontProvider>) -> Self {
        Self::new(fonts, Box::new(ExtrudedTextEngine::new()))
    }

    /// Builds the geometry a ticket asks for. Touches no session state, so
    /// any number of builds may be in flight at once.
    pub async fn build(&self, ticket: &RegenTicket) -> Result<TextGeometry> {
        ticket.text.validate()?;
        let face = self.fonts.load(ticket.text.font).await?;
        self.engine.extrude(&face, &ticket.text)
    }

    /// Issue, build, commit in one call. Validation happens before the
    /// ticket is issued, so a doomed request never supersedes a good one
    /// that is still building.
    pub async fn regenerate(
        &self,
        session: &mut ViewerSession,
        text: TextParams,
        material: MaterialParams,
    ) -> Result<CommitOutcome> {
        text.validate()?;
        let ticket = session.begin_regenerate(text, material);
        let geometry = self.build(&ticket).await?;
        Ok(session.commit_mesh(ticket, geometry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures::future::BoxFuture;

    use crate::error::Error;
    use crate::font::FontFace;
    use crate::params::FontId;

    const TEST_FONT: &str = r#"{
        "familyName": "Test",
        "resolution": 1000,
        "glyphs": { "a": { "ha": 600, "o": "m 0 0 l 500 0 l 500 700 l 0 700" } }
    }"#;

    struct CountingProvider {
        face: Arc<FontFace>,
        loads: AtomicUsize,
    }

    impl CountingProvider {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                face: Arc::new(FontFace::from_slice(TEST_FONT.as_bytes()).unwrap()),
                loads: AtomicUsize::new(0),
            })
        }
    }

    impl FontProvider for CountingProvider {
        fn load(&self, _font: FontId) -> BoxFuture<'_, Result<Arc<FontFace>>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            let face = Arc::clone(&self.face);
            Box::pin(async move { Ok(face) })
        }
    }

    fn text(content: &str) -> TextParams {
        let mut params = TextParams::default();
        params.content = content.to_string();
        params
    }

    #[test]
    fn test_regenerate_attaches_mesh() {
        let provider = CountingProvider::new();
        let updater = MeshUpdater::with_default_engine(provider.clone());
        let mut session = ViewerSession::new();

        let outcome = pollster::block_on(updater.regenerate(
            &mut session,
            text("a"),
            MaterialParams::default(),
        ))
        .unwrap();
        assert!(outcome.is_applied());
        assert!(session.scene.has_mesh());
        assert_eq!(provider.loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_regenerate_keeps_previous_mesh() {
        let provider = CountingProvider::new();
        let updater = MeshUpdater::with_default_engine(provider.clone());
        let mut session = ViewerSession::new();

        pollster::block_on(updater.regenerate(&mut session, text("a"), MaterialParams::default()))
            .unwrap();
        let kept = Arc::clone(&session.scene.mesh().unwrap().geometry);
        let kept_id = session.scene.mesh().unwrap().id;

        // The test face has no 'z' and no '?', so this build fails.
        let err = pollster::block_on(updater.regenerate(
            &mut session,
            text("zzz"),
            MaterialParams::default(),
        ))
        .unwrap_err();
        assert!(matches!(err, Error::MissingGlyphs { .. }));

        let mesh = session.scene.mesh().unwrap();
        assert_eq!(mesh.id, kept_id);
        assert!(Arc::ptr_eq(&mesh.geometry, &kept));
    }

    #[test]
    fn test_empty_text_fails_before_the_font_loads() {
        let provider = CountingProvider::new();
        let updater = MeshUpdater::with_default_engine(provider.clone());
        let mut session = ViewerSession::new();

        let err = pollster::block_on(updater.regenerate(
            &mut session,
            text("  "),
            MaterialParams::default(),
        ))
        .unwrap_err();
        assert!(matches!(err, Error::EmptyText));
        assert_eq!(provider.loads.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_font_faces_are_shared_across_rebuilds() {
        let provider = CountingProvider::new();
        let updater = MeshUpdater::with_default_engine(provider.clone());
        let mut session = ViewerSession::new();

        for content in ["a", "aa", "aaa"] {
            pollster::block_on(updater.regenerate(
                &mut session,
                text(content),
                MaterialParams::default(),
            ))
            .unwrap();
        }
        // This stub does not cache, so each rebuild asks the provider once.
        assert_eq!(provider.loads.load(Ordering::SeqCst), 3);
    }
}
