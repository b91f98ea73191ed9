use plotters::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, info};

use super::runner::SampleSeries;
use crate::config::ChartConfig;

const BUNDLED_FAMILY: &str = "dejavu-sans";
static BUNDLED_REGULAR: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");
static BUNDLED_BOLD: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Cannot chart an empty sample series")]
    EmptySeries,

    #[error("Failed to load font {path}: {message}")]
    Font { path: PathBuf, message: String },

    #[error("Failed to draw chart: {0}")]
    Draw(String),

    #[error("Failed to encode PNG: {0}")]
    Encode(#[from] image::ImageError),
}

/// Draws size-vs-time line charts as PNG bytes.
///
/// Text uses the bundled DejaVu Sans unless `font_path` points at another
/// TTF, which is then registered under its own family name.
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    width: u32,
    height: u32,
    family: String,
}

impl ChartRenderer {
    pub fn new(config: &ChartConfig) -> Result<Self, ChartError> {
        let family = match &config.font_path {
            Some(path) => {
                let family = format!("custom:{}", path.display());
                register_font_file(&family, path)?;
                info!("Charts use font {}", path.display());
                family
            }
            None => {
                register_bundled_font()?;
                BUNDLED_FAMILY.to_string()
            }
        };

        Ok(Self {
            width: config.width,
            height: config.height,
            family,
        })
    }

    /// Font family the chart text is drawn with.
    pub fn font_family(&self) -> &str {
        &self.family
    }

    pub fn render(&self, algo_name: &str, series: &SampleSeries) -> Result<Vec<u8>, ChartError> {
        if series.is_empty() {
            return Err(ChartError::EmptySeries);
        }

        let points: Vec<(f64, f64)> = series
            .samples()
            .iter()
            .map(|s| (s.input_size as f64, s.elapsed_ms))
            .collect();
        let x_max = points.iter().map(|(x, _)| *x).fold(1.0, f64::max) * 1.05;
        let y_max = series.max_elapsed_ms().max(1e-3) * 1.1;

        let mut buffer = vec![0u8; self.width as usize * self.height as usize * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (self.width, self.height))
                .into_drawing_area();
            root.fill(&WHITE).map_err(draw_error)?;

            let family = self.family.as_str();
            let mut chart = ChartBuilder::on(&root)
                .margin(20)
                .x_label_area_size(50)
                .y_label_area_size(70)
                .caption(
                    format!("Time Complexity Analysis: {}", algo_name),
                    (family, 24).into_font().style(FontStyle::Bold),
                )
                .build_cartesian_2d(0f64..x_max, 0f64..y_max)
                .map_err(draw_error)?;

            chart
                .configure_mesh()
                .light_line_style(BLACK.mix(0.05))
                .bold_line_style(BLACK.mix(0.15))
                .x_desc("Input size (n)")
                .y_desc("Running time (ms)")
                .label_style((family, 14))
                .axis_desc_style((family, 16))
                .draw()
                .map_err(draw_error)?;

            chart
                .draw_series(LineSeries::new(points.iter().copied(), BLUE.stroke_width(2)))
                .map_err(draw_error)?;
            chart
                .draw_series(points.iter().map(|&point| Circle::new(point, 4, BLUE.filled())))
                .map_err(draw_error)?;

            root.present().map_err(draw_error)?;
        }

        let image = image::RgbImage::from_raw(self.width, self.height, buffer)
            .ok_or_else(|| ChartError::Draw("bitmap buffer size mismatch".to_string()))?;
        let mut png = Vec::new();
        image::DynamicImage::ImageRgb8(image)
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?;

        debug!("Rendered {} byte chart for {}", png.len(), algo_name);
        Ok(png)
    }
}

fn draw_error<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Draw(e.to_string())
}

fn register_bundled_font() -> Result<(), ChartError> {
    static REGISTERED: OnceLock<Result<(), String>> = OnceLock::new();
    REGISTERED
        .get_or_init(|| register_family(BUNDLED_FAMILY, BUNDLED_REGULAR, BUNDLED_BOLD))
        .clone()
        .map_err(|message| ChartError::Font {
            path: PathBuf::from("assets/fonts/DejaVuSans.ttf"),
            message,
        })
}

fn register_font_file(family: &str, path: &Path) -> Result<(), ChartError> {
    let bytes = std::fs::read(path).map_err(|e| ChartError::Font {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    // plotters keeps registered fonts for the life of the process
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());

    register_family(family, bytes, bytes).map_err(|message| ChartError::Font {
        path: path.to_path_buf(),
        message,
    })
}

fn register_family(family: &str, regular: &'static [u8], bold: &'static [u8]) -> Result<(), String> {
    for (style, bytes) in [(FontStyle::Normal, regular), (FontStyle::Bold, bold)] {
        plotters::style::register_font(family, style, bytes)
            .map_err(|_| "not a valid TrueType font".to_string())?;
    }
    debug!("Registered chart font family {}", family);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::runner::Sample;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn small_renderer() -> ChartRenderer {
        ChartRenderer::new(&ChartConfig {
            width: 320,
            height: 200,
            font_path: None,
        })
        .unwrap()
    }

    #[test]
    fn test_render_produces_png() {
        let mut series = SampleSeries::default();
        for (size, ms) in [(5, 0.01), (10, 0.04), (15, 0.09)] {
            series.push(Sample { input_size: size, elapsed_ms: ms });
        }

        let png = small_renderer().render("bubble", &series).unwrap();
        assert!(png.len() > PNG_SIGNATURE.len());
        assert_eq!(&png[..8], &PNG_SIGNATURE);

        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.width(), 320);
        assert_eq!(decoded.height(), 200);
    }

    #[test]
    fn test_render_single_zero_sample() {
        let mut series = SampleSeries::default();
        series.push(Sample { input_size: 1, elapsed_ms: 0.0 });
        assert!(small_renderer().render("binary", &series).is_ok());
    }

    #[test]
    fn test_render_rejects_empty_series() {
        let result = small_renderer().render("linear", &SampleSeries::default());
        assert!(matches!(result, Err(ChartError::EmptySeries)));
    }

    #[test]
    fn test_missing_font_file() {
        let result = ChartRenderer::new(&ChartConfig {
            font_path: Some(PathBuf::from("/nonexistent/font.ttf")),
            ..ChartConfig::default()
        });
        assert!(matches!(result, Err(ChartError::Font { .. })));
    }

    fn series(points: &[(usize, f64)]) -> SampleSeries {
        let mut series = SampleSeries::default();
        for &(input_size, elapsed_ms) in points {
            series.push(Sample { input_size, elapsed_ms });
        }
        series
    }

    #[test]
    fn test_default_config_draws_text() {
        let renderer = ChartRenderer::new(&ChartConfig::default()).unwrap();
        assert_eq!(renderer.font_family(), BUNDLED_FAMILY);

        let png = renderer
            .render("bubble", &series(&[(100, 0.5), (200, 2.0), (300, 4.5)]))
            .unwrap();
        let image = image::load_from_memory(&png).unwrap().to_rgb8();

        // the y label area left of the plot only holds tick labels and the axis description
        let inked = (20..85)
            .flat_map(|x| (80..520).map(move |y| (x, y)))
            .filter(|&(x, y)| image.get_pixel(x, y).0 != [255, 255, 255])
            .count();
        assert!(inked > 0, "expected axis text in the label area");
    }

    #[test]
    fn test_font_path_registers_separate_family() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts/DejaVuSans.ttf");
        let renderer = ChartRenderer::new(&ChartConfig {
            width: 320,
            height: 200,
            font_path: Some(path),
        })
        .unwrap();

        assert_ne!(renderer.font_family(), BUNDLED_FAMILY);
        assert!(renderer.render("linear", &series(&[(1, 0.1)])).is_ok());
        assert_eq!(small_renderer().font_family(), BUNDLED_FAMILY);
    }
}
