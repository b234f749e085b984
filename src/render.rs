//! Rasterization backends. Both implement the [`FlyerRenderer`] capability so
//! the orchestrator never depends on a concrete backend.

use crate::svg::FlyerDocument;
use async_trait::async_trait;
use base64::Engine;
use std::time::Duration;
use thirtyfour::prelude::*;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, error};

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("svg parse error: {0}")]
    Svg(String),
    #[error("raster error: {0}")]
    Raster(String),
    #[error("png encode error: {0}")]
    Encode(String),
    #[error("browser error: {0}")]
    Browser(String),
}

#[async_trait]
pub trait FlyerRenderer: Send + Sync {
    /// Rasterize one composed flyer into encoded image bytes.
    async fn render(&self, doc: &FlyerDocument) -> Result<Vec<u8>, RenderError>;

    /// Release any underlying process or connection. Idempotent.
    async fn shutdown(&self) {}
}

/// CPU rasterizer: SVG markup -> usvg tree -> resvg pixmap -> PNG.
pub struct VectorRenderer {
    options: usvg::Options<'static>,
}

impl VectorRenderer {
    pub fn new() -> Self {
        let mut fontdb = usvg::fontdb::Database::new();
        fontdb.load_system_fonts();
        let options = usvg::Options {
            fontdb: std::sync::Arc::new(fontdb),
            ..Default::default()
        };
        Self { options }
    }
}

impl Default for VectorRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FlyerRenderer for VectorRenderer {
    async fn render(&self, doc: &FlyerDocument) -> Result<Vec<u8>, RenderError> {
        let markup = doc.to_svg();
        let tree = usvg::Tree::from_str(&markup, &self.options)
            .map_err(|e| RenderError::Svg(e.to_string()))?;

        let mut pixmap = resvg::tiny_skia::Pixmap::new(doc.width, doc.height)
            .ok_or_else(|| RenderError::Raster("failed to allocate pixmap".to_string()))?;
        resvg::render(&tree, resvg::tiny_skia::Transform::identity(), &mut pixmap.as_mut());

        // pixmap holds premultiplied RGBA8; demultiply before encoding
        let mut rgba = Vec::with_capacity((doc.width * doc.height * 4) as usize);
        for px in pixmap.pixels() {
            let c = px.demultiply();
            rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        let img = image::RgbaImage::from_raw(doc.width, doc.height, rgba)
            .ok_or_else(|| RenderError::Encode("pixmap size mismatch".to_string()))?;

        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .map_err(|e| RenderError::Encode(e.to_string()))?;
        Ok(bytes)
    }
}

/// Screenshot rasterizer driving a headless browser over WebDriver.
///
/// The session is connected lazily on first render and must be released with
/// [`FlyerRenderer::shutdown`]; the server's shutdown path guarantees that.
pub struct BrowserRenderer {
    webdriver_url: String,
    driver: RwLock<Option<WebDriver>>,
}

impl BrowserRenderer {
    pub fn new(webdriver_url: String) -> Self {
        Self { webdriver_url, driver: RwLock::new(None) }
    }

    async fn ensure_started(&self) -> Result<WebDriver, RenderError> {
        {
            let guard = self.driver.read().await;
            if let Some(driver) = guard.as_ref() {
                return Ok(driver.clone());
            }
        }

        let mut guard = self.driver.write().await;
        if let Some(driver) = guard.as_ref() {
            return Ok(driver.clone());
        }

        let mut caps = DesiredCapabilities::chrome();
        for arg in ["--headless=new", "--hide-scrollbars", "--force-device-scale-factor=1"] {
            caps.add_arg(arg)
                .map_err(|e| RenderError::Browser(format!("bad capability {}: {}", arg, e)))?;
        }
        let driver = WebDriver::new(&self.webdriver_url, caps)
            .await
            .map_err(|e| RenderError::Browser(format!("failed to start browser: {}", e)))?;
        info!("🌐 Connected headless browser at {}", self.webdriver_url);

        *guard = Some(driver.clone());
        Ok(driver)
    }

    fn wrap_html(doc: &FlyerDocument) -> String {
        format!(
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><style>html,body{{margin:0;padding:0;overflow:hidden}}svg{{display:block}}</style></head><body>{}</body></html>",
            doc.to_svg()
        )
    }
}

#[async_trait]
impl FlyerRenderer for BrowserRenderer {
    async fn render(&self, doc: &FlyerDocument) -> Result<Vec<u8>, RenderError> {
        let driver = self.ensure_started().await?;

        let html = Self::wrap_html(doc);
        let data_url = format!(
            "data:text/html;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(html.as_bytes())
        );

        driver
            .set_window_rect(0, 0, doc.width, doc.height)
            .await
            .map_err(|e| RenderError::Browser(format!("failed to set viewport: {}", e)))?;
        driver
            .goto(&data_url)
            .await
            .map_err(|e| RenderError::Browser(format!("navigation failed: {}", e)))?;

        // give fonts and layout a moment to settle before the screenshot
        tokio::time::sleep(Duration::from_millis(250)).await;

        driver
            .screenshot_as_png()
            .await
            .map_err(|e| RenderError::Browser(format!("screenshot failed: {}", e)))
    }

    async fn shutdown(&self) {
        let mut guard = self.driver.write().await;
        if let Some(driver) = guard.take() {
            if let Err(e) = driver.quit().await {
                error!("❌ Failed to quit browser cleanly: {}", e);
            } else {
                info!("🌐 Browser session released");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CanvasConfig, TextVariation};
    use crate::svg;

    fn doc() -> FlyerDocument {
        let config = CanvasConfig {
            width: 320,
            height: 480,
            background_color: "#FF0000".to_string(),
            text_color: "#FFFFFF".to_string(),
            accent_color: "#646363".to_string(),
        };
        let variation = TextVariation {
            title: "T".to_string(),
            subtitle: "S".to_string(),
            call_to_action: "C".to_string(),
            description: "D".to_string(),
            tone: "urgent".to_string(),
        };
        svg::compose(&variation, &config)
    }

    #[tokio::test]
    async fn vector_renderer_emits_png_at_canvas_size() {
        let bytes = VectorRenderer::new().render(&doc()).await.unwrap();
        // PNG signature
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.width(), 320);
        assert_eq!(decoded.height(), 480);
    }

    #[test]
    fn html_wrapper_embeds_the_markup() {
        let html = BrowserRenderer::wrap_html(&doc());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<svg"));
        assert!(html.contains("margin:0"));
    }
}
