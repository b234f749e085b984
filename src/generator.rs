//! Batch orchestration: one copy acquisition per batch, then a
//! variation × color × format cycle where each cell renders independently and
//! failures are skipped instead of aborting the run.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn, error};

use crate::color;
use crate::copywriter::{self, CopySource};
use crate::models::{
    default_target_sizes, CanvasConfig, FormatSize, GeneratedFlyer, PromotionalBrief,
};
use crate::render::FlyerRenderer;
use crate::svg;

pub const DEFAULT_FORMATS: [&str; 3] = ["facebook", "instagram", "story"];

const FALLBACK_FORMAT_SIZE: FormatSize = FormatSize { width: 1080, height: 1080 };

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("no text variations could be produced")]
    NoVariations,
    #[error("output directory error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct FlyerGenerator {
    copy: Arc<dyn CopySource>,
    renderer: Arc<dyn FlyerRenderer>,
    output_dir: PathBuf,
}

impl FlyerGenerator {
    pub fn new(
        copy: Arc<dyn CopySource>,
        renderer: Arc<dyn FlyerRenderer>,
        output_dir: PathBuf,
    ) -> Self {
        Self { copy, renderer, output_dir }
    }

    /// Render a full batch. The result may be shorter than
    /// `quantity * formats.len()` when individual cells fail; callers treat
    /// that as partial success. The only fatal error before I/O is an empty
    /// variation list, which the acquisition contract should make impossible.
    pub async fn generate(
        &self,
        brief: &PromotionalBrief,
        quantity: u32,
        formats: &[String],
        language: &str,
    ) -> Result<Vec<GeneratedFlyer>, GeneratorError> {
        info!("🚀 Generating {} flyer(s) x {} format(s) for '{}'", quantity, formats.len(), brief.product);

        let variations = copywriter::acquire(self.copy.as_ref(), brief, quantity, language).await;
        if variations.is_empty() {
            return Err(GeneratorError::NoVariations);
        }

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let batch_ts = Utc::now().format("%Y%m%d_%H%M%S").to_string();

        let mut flyers = Vec::new();
        for i in 0..quantity as usize {
            let variation = &variations[i % variations.len()];
            let base_color = if brief.colors.is_empty() {
                color::DEFAULT_BASE_COLOR
            } else {
                brief.colors[i % brief.colors.len()].as_str()
            };

            for format in formats {
                let size = match brief.target_sizes.get(format) {
                    Some(size) => *size,
                    None => {
                        warn!("⚠️ No target size for format '{}', using {}x{}",
                            format, FALLBACK_FORMAT_SIZE.width, FALLBACK_FORMAT_SIZE.height);
                        FALLBACK_FORMAT_SIZE
                    }
                };
                let config = canvas_config(base_color, size);
                let filename = format!(
                    "flyer_{}_{}_{}_{}.png",
                    batch_ts, i + 1, variation.tone, format
                );

                let doc = svg::compose(variation, &config);
                match self.renderer.render(&doc).await {
                    Ok(bytes) => {
                        let path = self.output_dir.join(&filename);
                        if let Err(e) = tokio::fs::write(&path, &bytes).await {
                            error!("❌ Failed to write {}: {}, skipping cell", filename, e);
                            continue;
                        }
                        info!("🖼️ Rendered {} ({} bytes)", filename, bytes.len());
                        flyers.push(GeneratedFlyer {
                            filename,
                            variation: variation.clone(),
                            background_color: config.background_color.clone(),
                            format: format.clone(),
                        });
                    }
                    Err(e) => {
                        error!("❌ Render failed for {}: {}, skipping cell", filename, e);
                    }
                }
            }
        }

        info!("✅ Batch complete: {}/{} cells rendered", flyers.len(), quantity as usize * formats.len());
        Ok(flyers)
    }

    /// Ad-hoc entry point: synthesizes a generic brief around the product and
    /// offer, borrowing a palette for the colors when none are given.
    pub async fn quick_generate(
        &self,
        product: &str,
        offer: &str,
        colors: Vec<String>,
        quantity: u32,
    ) -> Result<Vec<GeneratedFlyer>, GeneratorError> {
        let colors = if colors.is_empty() {
            color::palette_for("").iter().map(|c| c.to_string()).collect()
        } else {
            colors
        };
        let brief = PromotionalBrief {
            product: product.to_string(),
            business_type: "local business".to_string(),
            offer: offer.to_string(),
            validity: "limited time".to_string(),
            location: "our store".to_string(),
            phone: String::new(),
            schedule: String::new(),
            colors,
            target_sizes: default_target_sizes(),
        };
        let formats: Vec<String> = DEFAULT_FORMATS.iter().map(|f| f.to_string()).collect();
        self.generate(&brief, quantity, &formats, "en").await
    }

    /// Release the renderer's underlying resources (browser session).
    pub async fn shutdown(&self) {
        self.renderer.shutdown().await;
    }
}

/// Derive the per-cell canvas from a base color and a format size.
pub fn canvas_config(base_color: &str, size: FormatSize) -> CanvasConfig {
    CanvasConfig {
        width: size.width,
        height: size.height,
        background_color: base_color.to_string(),
        text_color: color::contrast_color(base_color),
        accent_color: color::accent_color(base_color),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::copywriter::{CopyError, CopySource};
    use crate::render::RenderError;
    use crate::svg::FlyerDocument;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct UnreachableSource;

    #[async_trait]
    impl CopySource for UnreachableSource {
        async fn produce_variations(
            &self,
            _brief: &PromotionalBrief,
            _quantity: u32,
            _language: &str,
        ) -> Result<Vec<crate::models::TextVariation>, CopyError> {
            Err(CopyError::Http("network unreachable".to_string()))
        }
    }

    /// Renderer stub emitting a tiny payload, optionally failing every n-th cell.
    struct StubRenderer {
        calls: AtomicUsize,
        fail_every: Option<usize>,
    }

    impl StubRenderer {
        fn new() -> Self {
            Self { calls: AtomicUsize::new(0), fail_every: None }
        }

        fn failing_every(n: usize) -> Self {
            Self { calls: AtomicUsize::new(0), fail_every: Some(n) }
        }
    }

    #[async_trait]
    impl FlyerRenderer for StubRenderer {
        async fn render(&self, _doc: &FlyerDocument) -> Result<Vec<u8>, RenderError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(n) = self.fail_every {
                if call % n == 0 {
                    return Err(RenderError::Raster("simulated cell failure".to_string()));
                }
            }
            Ok(vec![0u8; 8])
        }
    }

    fn temp_output_dir() -> PathBuf {
        std::env::temp_dir().join(format!("flyer_studio_test_{}", uuid::Uuid::new_v4()))
    }

    fn pizza_brief() -> PromotionalBrief {
        PromotionalBrief {
            product: "Pizza".to_string(),
            business_type: "restaurant".to_string(),
            offer: "50% off".to_string(),
            validity: "this weekend".to_string(),
            location: "Main St".to_string(),
            phone: String::new(),
            schedule: String::new(),
            colors: vec!["#FF0000".to_string(), "#00FF00".to_string()],
            target_sizes: default_target_sizes(),
        }
    }

    fn generator(renderer: StubRenderer, dir: &PathBuf) -> FlyerGenerator {
        FlyerGenerator::new(Arc::new(UnreachableSource), Arc::new(renderer), dir.clone())
    }

    #[tokio::test]
    async fn unreachable_source_cycles_fallback_copy_and_colors() {
        let dir = temp_output_dir();
        let flyers = generator(StubRenderer::new(), &dir)
            .generate(&pizza_brief(), 4, &["facebook".to_string()], "en")
            .await
            .unwrap();

        assert_eq!(flyers.len(), 4);
        for f in &flyers {
            assert!(
                f.variation.title.contains("Pizza") || f.variation.description.contains("Pizza"),
                "fallback copy should mention the product: {:?}",
                f.variation.title
            );
        }
        let cycled: Vec<_> = flyers.iter().map(|f| f.background_color.as_str()).collect();
        assert_eq!(cycled, vec!["#FF0000", "#00FF00", "#FF0000", "#00FF00"]);

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn colors_cycle_modulo_palette_length() {
        let dir = temp_output_dir();
        let mut brief = pizza_brief();
        brief.colors = vec!["#111111".to_string(), "#222222".to_string(), "#333333".to_string()];
        let flyers = generator(StubRenderer::new(), &dir)
            .generate(&brief, 5, &["instagram".to_string()], "en")
            .await
            .unwrap();

        assert_eq!(flyers[3].background_color, "#111111");
        assert_eq!(flyers[4].background_color, "#222222");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn failed_cells_are_skipped_not_fatal() {
        let dir = temp_output_dir();
        let flyers = generator(StubRenderer::failing_every(3), &dir)
            .generate(&pizza_brief(), 3, &["facebook".to_string(), "story".to_string()], "en")
            .await
            .unwrap();

        // 6 cells, every 3rd render fails -> 4 survive
        assert_eq!(flyers.len(), 4);

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn filenames_are_unique_within_a_batch() {
        let dir = temp_output_dir();
        let flyers = generator(StubRenderer::new(), &dir)
            .generate(
                &pizza_brief(),
                5,
                &["facebook".to_string(), "instagram".to_string(), "story".to_string()],
                "en",
            )
            .await
            .unwrap();

        assert_eq!(flyers.len(), 15);
        let names: HashSet<_> = flyers.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(names.len(), flyers.len());
        for f in &flyers {
            assert!(f.filename.ends_with(&format!("{}.png", f.format)));
            assert!(dir.join(&f.filename).exists());
        }

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn empty_color_list_uses_the_default_base() {
        let dir = temp_output_dir();
        let mut brief = pizza_brief();
        brief.colors.clear();
        let flyers = generator(StubRenderer::new(), &dir)
            .generate(&brief, 2, &["instagram".to_string()], "en")
            .await
            .unwrap();
        assert!(flyers.iter().all(|f| f.background_color == color::DEFAULT_BASE_COLOR));

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn unknown_format_falls_back_to_square() {
        let dir = temp_output_dir();
        let flyers = generator(StubRenderer::new(), &dir)
            .generate(&pizza_brief(), 1, &["billboard".to_string()], "en")
            .await
            .unwrap();
        assert_eq!(flyers.len(), 1);
        assert_eq!(flyers[0].format, "billboard");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn quick_path_supplies_palette_and_default_formats() {
        let dir = temp_output_dir();
        let flyers = generator(StubRenderer::new(), &dir)
            .quick_generate("Smoothies", "2x1", Vec::new(), 2)
            .await
            .unwrap();

        // 2 variations x 3 default formats
        assert_eq!(flyers.len(), 6);
        let palette = color::palette_for("");
        assert!(flyers.iter().all(|f| palette.contains(&f.background_color.as_str())));

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[test]
    fn canvas_config_derives_all_three_colors() {
        let config = canvas_config("#FF0000", FormatSize { width: 1200, height: 630 });
        assert_eq!(config.width, 1200);
        assert_eq!(config.text_color, "#FFFFFF");
        assert_eq!(config.accent_color, "#646363");
        assert_eq!(config.background_color, "#FF0000");
    }
}
