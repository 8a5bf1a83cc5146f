#![forbid(unsafe_code)]

//! PNG/JPG/PDF output from decorated Graphviz SVG.

use crate::render::HeadlessError;

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error(transparent)]
    Headless(#[from] HeadlessError),
    #[error("failed to parse SVG: {0}")]
    SvgParse(String),
    #[error("failed to allocate a {width}x{height} pixmap")]
    PixmapAlloc { width: u32, height: u32 },
    #[error("failed to encode PNG")]
    PngEncode,
    #[error("invalid background color {0:?}")]
    Background(String),
    #[error("JPG output requires an opaque background color (e.g. white)")]
    JpegOpaqueBackgroundRequired,
    #[error("failed to encode JPG: {0}")]
    JpegEncode(#[from] image::ImageError),
    #[error("failed to convert SVG to PDF")]
    PdfConvert,
}

impl From<prismaflow_render::Error> for RasterError {
    fn from(err: prismaflow_render::Error) -> Self {
        Self::Headless(HeadlessError::Render(err))
    }
}

pub type Result<T> = std::result::Result<T, RasterError>;

#[derive(Debug, Clone)]
pub struct RasterOptions {
    pub scale: f32,
    /// CSS-like color (`white`, `transparent`, `#rrggbb`, `#rrggbbaa`). PNG defaults to
    /// transparent, JPG to white.
    pub background: Option<String>,
    pub jpeg_quality: u8,
    /// Fallback family when the SVG names a font the system does not have.
    pub font_family: String,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            background: None,
            jpeg_quality: 90,
            font_family: "Helvetica".to_string(),
        }
    }
}

fn usvg_options(font_family: &str) -> usvg::Options<'static> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    opt.font_family = font_family.to_string();
    opt
}

pub fn svg_to_png(svg: &str, options: &RasterOptions) -> Result<Vec<u8>> {
    let background = match options.background.as_deref() {
        Some(bg) => Some(parse_color(bg)?),
        None => None,
    };
    let pixmap = svg_to_pixmap(svg, options, background)?;
    pixmap.encode_png().map_err(|_| RasterError::PngEncode)
}

pub fn svg_to_jpeg(svg: &str, options: &RasterOptions) -> Result<Vec<u8>> {
    let color = parse_color(options.background.as_deref().unwrap_or("white"))?;
    if color.alpha() != 1.0 {
        return Err(RasterError::JpegOpaqueBackgroundRequired);
    }

    let pixmap = svg_to_pixmap(svg, options, Some(color))?;
    let (w, h) = (pixmap.width(), pixmap.height());

    // The background is opaque, so dropping alpha loses nothing.
    let rgb: Vec<u8> = pixmap
        .data()
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();

    let mut out = Vec::new();
    let mut enc =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, options.jpeg_quality);
    enc.encode(&rgb, w, h, image::ExtendedColorType::Rgb8)?;
    Ok(out)
}

pub fn svg_to_pdf(svg: &str, options: &RasterOptions) -> Result<Vec<u8>> {
    let mut opt = svg2pdf::usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    opt.font_family = options.font_family.clone();

    let tree = svg2pdf::usvg::Tree::from_str(svg, &opt)
        .map_err(|err| RasterError::SvgParse(err.to_string()))?;

    svg2pdf::to_pdf(
        &tree,
        svg2pdf::ConversionOptions::default(),
        svg2pdf::PageOptions::default(),
    )
    .map_err(|_| RasterError::PdfConvert)
}

fn svg_to_pixmap(
    svg: &str,
    options: &RasterOptions,
    background: Option<tiny_skia::Color>,
) -> Result<tiny_skia::Pixmap> {
    let tree = usvg::Tree::from_str(svg, &usvg_options(&options.font_family))
        .map_err(|err| RasterError::SvgParse(err.to_string()))?;

    // Graphviz sizes its SVG in `pt`; usvg resolves that (and the viewBox) into the tree size.
    let size = tree.size();
    let (width, height) = (size.width(), size.height());
    let scale = options.scale;
    let width_px = (width * scale).ceil().max(1.0) as u32;
    let height_px = (height * scale).ceil().max(1.0) as u32;

    let mut pixmap =
        tiny_skia::Pixmap::new(width_px, height_px).ok_or(RasterError::PixmapAlloc {
            width: width_px,
            height: height_px,
        })?;
    if let Some(color) = background {
        pixmap.fill(color);
    }

    tracing::debug!(width_px, height_px, scale, "rasterizing svg");
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    Ok(pixmap)
}

fn parse_color(text: &str) -> Result<tiny_skia::Color> {
    parse_tiny_skia_color(text).ok_or_else(|| RasterError::Background(text.to_string()))
}

fn parse_tiny_skia_color(text: &str) -> Option<tiny_skia::Color> {
    let s = text.trim().to_ascii_lowercase();
    let named = match s.as_str() {
        "transparent" => Some((0, 0, 0, 0)),
        "white" => Some((255, 255, 255, 255)),
        "black" => Some((0, 0, 0, 255)),
        _ => None,
    };
    if let Some((r, g, b, a)) = named {
        return Some(tiny_skia::Color::from_rgba8(r, g, b, a));
    }

    let hex = s.strip_prefix('#')?;
    let digit = |c: u8| (c as char).to_digit(16).map(|v| v as u8);
    let bytes = hex.as_bytes();
    let channels: Vec<u8> = match bytes.len() {
        3 | 4 => bytes
            .iter()
            .map(|&c| digit(c).map(|v| (v << 4) | v))
            .collect::<Option<_>>()?,
        6 | 8 => bytes
            .chunks_exact(2)
            .map(|pair| Some((digit(pair[0])? << 4) | digit(pair[1])?))
            .collect::<Option<_>>()?,
        _ => return None,
    };
    let alpha = channels.get(3).copied().unwrap_or(255);
    Some(tiny_skia::Color::from_rgba8(
        channels[0],
        channels[1],
        channels[2],
        alpha,
    ))
}
