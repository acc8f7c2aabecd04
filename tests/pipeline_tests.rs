use std::path::PathBuf;
use std::sync::Arc;

use glyphcast::export::{validate_glb, ExportOptions, ExportScope};
use glyphcast::font::DiskFontProvider;
use glyphcast::{FontId, MaterialParams, MeshUpdater, TextParams, ViewerSession};

#[cfg(test)]
mod pipeline_tests {
    use super::*;

    fn fixture_fonts() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/fonts")
    }

    fn updater() -> MeshUpdater {
        MeshUpdater::with_default_engine(Arc::new(DiskFontProvider::new(fixture_fonts())))
    }

    fn params(content: &str) -> TextParams {
        TextParams {
            content: content.to_string(),
            font: FontId::Helvetiker,
            ..TextParams::default()
        }
    }

    #[test]
    fn test_text_to_glb_end_to_end() {
        let updater = updater();
        let mut session = ViewerSession::new();
        session.set_viewport(800, 600);

        let outcome = pollster::block_on(updater.regenerate(
            &mut session,
            params("glb"),
            MaterialParams::default(),
        ))
        .unwrap();
        let handle = outcome.handle().unwrap();
        assert!(handle.vertices > 0);
        assert!(handle.triangles > 0);
        assert!(handle.bounds.center().length() < 1e-4);
        assert!(session.camera.position.z > 0.0);

        let bytes = session.export_glb(&ExportOptions::default()).unwrap().unwrap();
        let stats = validate_glb(&bytes).unwrap();
        assert_eq!(stats.vertices, handle.vertices);
        assert_eq!(stats.triangles, handle.triangles);

        // Through a file and back, the way the command line drives it.
        let path = std::env::temp_dir().join(format!("glyphcast-e2e-{}.glb", std::process::id()));
        std::fs::write(&path, &bytes).unwrap();
        let reread = std::fs::read(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(validate_glb(&reread).unwrap(), stats);
    }

    #[test]
    fn test_depth_and_bevel_set_the_extruded_thickness() {
        let updater = updater();
        let mut session = ViewerSession::new();

        let text = params("g");
        let depth = text.depth;
        let bevel = text.bevel_thickness;
        pollster::block_on(updater.regenerate(&mut session, text, MaterialParams::default()))
            .unwrap();

        let size = session.mesh_handle().unwrap().bounds.size();
        assert!((size.z - (depth + 2.0 * bevel)).abs() < 1e-4);
    }

    #[test]
    fn test_hole_glyph_keeps_its_hole() {
        let updater = updater();
        let mut solid = ViewerSession::new();
        let mut holed = ViewerSession::new();

        pollster::block_on(updater.regenerate(&mut solid, params("g"), MaterialParams::default()))
            .unwrap();
        pollster::block_on(updater.regenerate(&mut holed, params("b"), MaterialParams::default()))
            .unwrap();

        // Same outer square, but the holed glyph's inner contour adds wall
        // geometry the solid one does not have.
        let solid_handle = solid.mesh_handle().unwrap();
        let holed_handle = holed.mesh_handle().unwrap();
        assert!(holed_handle.vertices > solid_handle.vertices);
        assert!(
            (holed_handle.bounds.size().x - solid_handle.bounds.size().x).abs() < 1e-4
        );
    }

    #[test]
    fn test_unknown_glyphs_substitute_and_still_export() {
        let updater = updater();
        let mut session = ViewerSession::new();

        let outcome = pollster::block_on(updater.regenerate(
            &mut session,
            params("zzz"),
            MaterialParams::default(),
        ))
        .unwrap();
        assert!(outcome.is_applied());

        let bytes = session.export_glb(&ExportOptions::default()).unwrap().unwrap();
        assert!(validate_glb(&bytes).unwrap().triangles > 0);
    }

    #[test]
    fn test_full_scene_export_validates() {
        let updater = updater();
        let mut session = ViewerSession::new();

        pollster::block_on(updater.regenerate(
            &mut session,
            params("go"),
            MaterialParams::default(),
        ))
        .unwrap();

        let bytes = session
            .export_glb(&ExportOptions {
                scope: ExportScope::FullScene,
            })
            .unwrap()
            .unwrap();
        let stats = validate_glb(&bytes).unwrap();
        assert_eq!(stats.nodes, 2);
        assert_eq!(stats.meshes, 1);

        let needle = b"KHR_lights_punctual";
        assert!(bytes.windows(needle.len()).any(|w| w == needle));
    }
}
