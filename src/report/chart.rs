use crate::model::{Error, Result};
use plotters::prelude::*;
use plotters::style::register_font;
use std::sync::OnceLock;

pub const CREATED_COLOR: (u8, u8, u8) = (0x54, 0x70, 0xC6);
pub const ASSIGNED_COLOR: (u8, u8, u8) = (0x91, 0xCC, 0x75);

pub const WIDE_CHART: (u32, u32) = (1200, 600);
pub const MEMBER_CHART: (u32, u32) = (1200, 500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarLayout {
    Stacked,
    Grouped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub color: (u8, u8, u8),
    pub values: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub categories: Vec<String>,
    pub series: Vec<Series>,
    pub layout: BarLayout,
    pub size: (u32, u32),
}

// New
impl BarChart {
    /// Two-series chart of created and assigned issues per category.
    pub fn created_assigned(
        title: impl ToString,
        x_label: impl ToString,
        rows: Vec<(String, usize, usize)>,
        layout: BarLayout,
        size: (u32, u32),
    ) -> Self {
        let (categories, created, assigned) = rows.into_iter().fold(
            (vec![], vec![], vec![]),
            |(mut names, mut created, mut assigned), (name, c, a)| {
                names.push(name);
                created.push(c);
                assigned.push(a);
                (names, created, assigned)
            },
        );
        Self {
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: "Number of issues".to_string(),
            categories,
            series: vec![
                Series {
                    name: "Issues created".to_string(),
                    color: CREATED_COLOR,
                    values: created,
                },
                Series {
                    name: "Issues assigned".to_string(),
                    color: ASSIGNED_COLOR,
                    values: assigned,
                },
            ],
            layout,
            size,
        }
    }
}

impl BarChart {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Highest bar, stacked bars counting as one.
    pub fn max_value(&self) -> usize {
        (0..self.categories.len())
            .map(|index| {
                let values = self.series.iter().map(|s| s.values.get(index).copied().unwrap_or(0));
                match self.layout {
                    BarLayout::Stacked => values.sum(),
                    BarLayout::Grouped => values.max().unwrap_or(0),
                }
            })
            .max()
            .unwrap_or(0)
    }
}

pub trait ChartRenderer {
    /// PNG bytes for `chart`.
    fn render_png(&self, chart: &BarChart) -> Result<Vec<u8>>;
}

const FONT: &str = "sans-serif";
static FONT_BYTES: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");
static FONT_READY: OnceLock<bool> = OnceLock::new();

/// Draws the chart with title, category labels, axis descriptions and a legend into an RGB
/// bitmap and encodes it as PNG. Text uses the bundled DejaVu Sans font.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitmapChartRenderer;

impl ChartRenderer for BitmapChartRenderer {
    fn render_png(&self, chart: &BarChart) -> Result<Vec<u8>> {
        if !*FONT_READY.get_or_init(|| register_font(FONT, FontStyle::Normal, FONT_BYTES).is_ok()) {
            return Err(Error::Chart("bundled chart font could not be loaded".to_string()));
        }
        let (width, height) = chart.size;
        let mut pixels = vec![0u8; width as usize * height as usize * 3];
        draw_bars(chart, &mut pixels).map_err(|e| Error::Chart(e.to_string()))?;
        encode_png(&pixels, width, height)
    }
}

/// Horizontal extent of the bar for `series` in category `index`.
fn bar_span(layout: BarLayout, index: usize, series: usize, series_count: usize) -> (f64, f64) {
    let start = index as f64 + 0.1;
    match layout {
        BarLayout::Stacked => (start + 0.1, start + 0.7),
        BarLayout::Grouped => {
            let width = 0.8 / series_count.max(1) as f64;
            let left = start + width * series as f64;
            (left, left + width)
        }
    }
}

fn draw_bars(chart: &BarChart, pixels: &mut [u8]) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let root = BitMapBackend::with_buffer(pixels, chart.size).into_drawing_area();
    root.fill(&WHITE)?;

    let count = chart.categories.len();
    let max = chart.max_value() as i32;
    let centers = (0..count).map(|index| index as f64 + 0.5).collect::<Vec<_>>();

    let mut context = ChartBuilder::on(&root)
        .caption(&chart.title, (FONT, 26))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(
            (0f64..count.max(1) as f64).with_key_points(centers),
            0..(max + max / 10 + 1),
        )?;

    let category_label = |x: &f64| {
        chart
            .categories
            .get(x.floor() as usize)
            .cloned()
            .unwrap_or_default()
    };
    context
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .x_label_formatter(&category_label)
        .label_style((FONT, 14))
        .axis_desc_style((FONT, 16))
        .draw()?;

    let series_count = chart.series.len();
    let mut stack = vec![0i32; count];
    for (position, series) in chart.series.iter().enumerate() {
        let (r, g, b) = series.color;
        let color = RGBColor(r, g, b);
        let mut bars = vec![];
        for (index, base) in stack.iter_mut().enumerate() {
            let value = series.values.get(index).copied().unwrap_or(0) as i32;
            let (left, right) = bar_span(chart.layout, index, position, series_count);
            let bottom = match chart.layout {
                BarLayout::Stacked => *base,
                BarLayout::Grouped => 0,
            };
            bars.push(Rectangle::new([(left, bottom), (right, bottom + value)], color.filled()));
            *base += value;
        }
        context
            .draw_series(bars)?
            .label(series.name.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 6), (x + 14, y + 6)], color.filled()));
    }

    context
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font((FONT, 14))
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let chart_error = |e: png::EncodingError| Error::Chart(e.to_string());
    let mut png_bytes = Vec::new();
    let mut encoder = png::Encoder::new(&mut png_bytes, width, height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header().map_err(chart_error)?;
    writer.write_image_data(pixels).map_err(chart_error)?;
    writer.finish().map_err(chart_error)?;
    Ok(png_bytes)
}
