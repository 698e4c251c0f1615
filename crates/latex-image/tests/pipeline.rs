//! Render pipeline tests against a mocked rendering endpoint.

use std::io::Cursor;

use base64::Engine;
use image::{GenericImageView, ImageFormat};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use latex_image::{
    DarkMode, FontSize, LatexError, Preferences, RenderPipeline, RenderRequest,
    DEFAULT_MAX_IMAGE_BYTES,
};

fn make_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = image::DynamicImage::new_rgba8(width, height);
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
    buf
}

async fn mock_endpoint(template: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/png.image"))
        .respond_with(template)
        .mount(&server)
        .await;
    server
}

fn pipeline(server: &MockServer) -> RenderPipeline {
    RenderPipeline::new(format!("{}/png.image", server.uri()), DEFAULT_MAX_IMAGE_BYTES)
}

#[tokio::test]
async fn renders_and_preserves_dimensions() {
    let server = mock_endpoint(
        ResponseTemplate::new(200).set_body_bytes(make_image(37, 19, ImageFormat::Png)),
    )
    .await;

    let request = RenderRequest::new("x^2", Preferences::new(DarkMode::On, Some(FontSize::Huge)));
    let rendered = pipeline(&server).render(&request).await.unwrap();

    let markdown = rendered.to_markdown();
    let payload = markdown
        .strip_prefix("> ![LaTeX Equation](data:image/png;base64,")
        .and_then(|rest| rest.strip_suffix(')'))
        .expect("markdown data URI");
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .unwrap();
    let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Png).unwrap();
    assert_eq!(decoded.dimensions(), (37, 19));
}

#[tokio::test]
async fn transcodes_non_png_responses() {
    let server = mock_endpoint(
        ResponseTemplate::new(200).set_body_bytes(make_image(12, 5, ImageFormat::Bmp)),
    )
    .await;

    let request = RenderRequest::new(r"\frac{a}{b}", Preferences::default());
    let rendered = pipeline(&server).render(&request).await.unwrap();

    assert_eq!((rendered.width, rendered.height), (12, 5));
    assert_eq!(image::guess_format(&rendered.png).unwrap(), ImageFormat::Png);
}

#[tokio::test]
async fn sends_whitespace_free_query() {
    let server = mock_endpoint(
        ResponseTemplate::new(200).set_body_bytes(make_image(2, 2, ImageFormat::Png)),
    )
    .await;

    let request = RenderRequest::new("x ^ 2", Preferences::default());
    pipeline(&server).render(&request).await.unwrap();

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    let query = received[0].url.query().unwrap_or_default().to_string();
    assert!(!query.contains(' '));
    assert!(!query.contains('+'));
    assert!(!query.contains("%20"));
    assert!(query.ends_with("x%5E2"), "unexpected query: {query}");
    assert!(query.contains("%5Cbg%7Bwhite%7D%5Cfg%7Bblack%7D"));
}

#[tokio::test]
async fn surfaces_http_status() {
    let server = mock_endpoint(ResponseTemplate::new(503)).await;

    let request = RenderRequest::new("x^2", Preferences::default());
    let err = pipeline(&server).render(&request).await.unwrap_err();

    assert!(err.is_render_failure());
    match err {
        LatexError::Status { code, reason } => {
            assert_eq!(code, 503);
            assert_eq!(reason, "Service Unavailable");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn rejects_undecodable_body() {
    let server =
        mock_endpoint(ResponseTemplate::new(200).set_body_string("<html>oops</html>")).await;

    let request = RenderRequest::new("x^2", Preferences::default());
    let err = pipeline(&server).render(&request).await.unwrap_err();
    assert!(matches!(err, LatexError::Image(_)));
}
