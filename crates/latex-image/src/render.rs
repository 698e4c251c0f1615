//! Remote LaTeX rendering: query composition, fetch, PNG transcode, base64.

use std::io::Cursor;

use base64::Engine;
use image::{GenericImageView, ImageFormat};

use crate::types::{DarkMode, FontSize, LatexError, LatexResult, Preferences};

/// Public rendering endpoint. The whole query string is the LaTeX source.
pub const DEFAULT_ENDPOINT: &str = "https://latex.codecogs.com/png.image";

/// Upper bound on the transcoded PNG, before base64.
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 4 * 1024 * 1024;

const DPI_DIRECTIVE: &str = r"\dpi{300}";

/// Formula plus a snapshot of the preferences it renders with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    formula: String,
    dark_mode: DarkMode,
    font_size: Option<FontSize>,
}

impl RenderRequest {
    /// Whitespace is stripped from `formula`.
    pub fn new(formula: &str, preferences: Preferences) -> Self {
        Self {
            formula: formula.chars().filter(|c| !c.is_whitespace()).collect(),
            dark_mode: preferences.dark_mode,
            font_size: preferences.font_size,
        }
    }

    pub fn formula(&self) -> &str {
        &self.formula
    }

    pub fn color_directive(&self) -> &'static str {
        match self.dark_mode {
            DarkMode::On => r"\fg{white}",
            DarkMode::Off => r"\fg{black}",
            DarkMode::Unset => r"\bg{white}\fg{black}",
        }
    }

    /// LaTeX source sent to the renderer, before percent-encoding.
    pub fn source(&self) -> String {
        let size = self.font_size.unwrap_or(FontSize::DEFAULT);
        format!(
            "{DPI_DIRECTIVE}\\{}{}{}",
            size.ident(),
            self.color_directive(),
            self.formula
        )
    }

    /// Percent-encoded source, usable as the raw query string.
    pub fn query(&self) -> String {
        url::form_urlencoded::byte_serialize(self.source().as_bytes()).collect()
    }
}

/// A rendered equation, re-encoded as PNG.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl RenderedImage {
    pub fn base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.png)
    }

    /// Markdown block quote embedding the image as a data URI.
    pub fn to_markdown(&self) -> String {
        format!("> ![LaTeX Equation](data:image/png;base64,{})", self.base64())
    }
}

/// Fetches rendered equations from the remote endpoint.
pub struct RenderPipeline {
    client: reqwest::Client,
    endpoint: String,
    max_image_bytes: usize,
}

impl RenderPipeline {
    pub fn new(endpoint: impl Into<String>, max_image_bytes: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            max_image_bytes,
        }
    }

    pub fn url_for(&self, request: &RenderRequest) -> String {
        format!("{}?{}", self.endpoint, request.query())
    }

    /// Fetch, decode and re-encode one equation. No retries.
    pub async fn render(&self, request: &RenderRequest) -> LatexResult<RenderedImage> {
        let url = self.url_for(request);
        tracing::debug!("Rendering {}", request.source());

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LatexError::Status {
                code: status.as_u16(),
                reason: status
                    .canonical_reason()
                    .unwrap_or("Unknown status")
                    .to_string(),
            });
        }

        let body = response.bytes().await?;
        let image = transcode_png(&body, self.max_image_bytes)?;

        tracing::info!(
            "Rendered {}x{} equation ({} bytes)",
            image.width,
            image.height,
            image.png.len()
        );
        Ok(image)
    }
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT, DEFAULT_MAX_IMAGE_BYTES)
    }
}

/// Decode any supported raster format and re-encode it as RGBA PNG.
pub fn transcode_png(bytes: &[u8], max_bytes: usize) -> LatexResult<RenderedImage> {
    let decoded = image::load_from_memory(bytes)?;
    let (width, height) = decoded.dimensions();
    let rgba = decoded.to_rgba8();

    let mut png = Vec::new();
    rgba.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

    if png.len() > max_bytes {
        return Err(LatexError::TooLarge {
            size: png.len(),
            max: max_bytes,
        });
    }

    Ok(RenderedImage { png, width, height })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(dark_mode: DarkMode, font_size: Option<FontSize>) -> RenderRequest {
        RenderRequest::new("x^2", Preferences::new(dark_mode, font_size))
    }

    #[test]
    fn test_source_layout() {
        let req = request(DarkMode::On, Some(FontSize::Huge));
        assert_eq!(req.source(), r"\dpi{300}\huge\fg{white}x^2");
    }

    #[test]
    fn test_default_font_size_is_small() {
        let req = request(DarkMode::Off, None);
        assert_eq!(req.source(), r"\dpi{300}\small\fg{black}x^2");
    }

    #[test]
    fn test_color_modes_are_distinct() {
        let on = request(DarkMode::On, Some(FontSize::Tiny)).query();
        let off = request(DarkMode::Off, Some(FontSize::Tiny)).query();
        let unset = request(DarkMode::Unset, Some(FontSize::Tiny)).query();
        assert_ne!(on, off);
        assert_ne!(on, unset);
        assert_ne!(off, unset);
        assert!(request(DarkMode::Unset, None).source().contains(r"\bg{white}\fg{black}"));
    }

    #[test]
    fn test_whitespace_stripped() {
        let req = RenderRequest::new(" x ^ 2\t+\n1 ", Preferences::default());
        assert_eq!(req.formula(), "x^2+1");
        let query = req.query();
        assert!(!query.contains(' '));
        assert!(!query.contains('+'), "no encoded spaces expected: {query}");
    }

    #[test]
    fn test_query_is_percent_encoded() {
        let req = request(DarkMode::On, Some(FontSize::Small));
        assert_eq!(req.query(), "%5Cdpi%7B300%7D%5Csmall%5Cfg%7Bwhite%7Dx%5E2");
    }

    #[test]
    fn test_transcode_from_jpeg() {
        let img = image::DynamicImage::new_rgb8(7, 3);
        let mut jpeg = Vec::new();
        img.write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)
            .unwrap();

        let out = transcode_png(&jpeg, DEFAULT_MAX_IMAGE_BYTES).unwrap();
        assert_eq!((out.width, out.height), (7, 3));
        assert_eq!(
            image::guess_format(&out.png).unwrap(),
            ImageFormat::Png
        );
    }

    #[test]
    fn test_transcode_rejects_garbage_and_oversize() {
        assert!(matches!(
            transcode_png(b"not an image", DEFAULT_MAX_IMAGE_BYTES),
            Err(LatexError::Image(_))
        ));

        let img = image::DynamicImage::new_rgb8(4, 4);
        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();
        assert!(matches!(transcode_png(&png, 8), Err(LatexError::TooLarge { max: 8, .. })));
    }

    #[test]
    fn test_markdown_shape() {
        let image = RenderedImage {
            png: vec![1, 2, 3],
            width: 1,
            height: 1,
        };
        assert_eq!(image.to_markdown(), "> ![LaTeX Equation](data:image/png;base64,AQID)");
    }
}
