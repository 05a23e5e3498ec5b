use crate::palette;
use crate::runtime::{CategorizedReport, GraduatedReport, HeatmapReport, Report, SimplifyReport};
use crate::simplify::Bounds;
use anyhow::{Context, Result};
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use std::ops::Range;

const ORIGINAL_PATH_COLOR: RGBColor = RGBColor(170, 170, 170);

pub struct GraphConfig {
    pub title: Option<String>,
    pub width: u32,
    pub height: u32,
    /// Dash pattern for the unsimplified path; empty draws it solid
    pub original_dash: Vec<f64>,
}

/// Draw a report as a PNG legend or preview chart
pub fn render_report(report: &Report, config: &GraphConfig) -> Result<Vec<u8>> {
    match report {
        Report::Stats(_) => anyhow::bail!("stats output has no chart; run without --png"),
        Report::Graduated(r) => render_png(config, |root| draw_graduated(root, r, config)),
        Report::Categorized(r) => render_png(config, |root| draw_categorized(root, r, config)),
        Report::Heatmap(r) => render_png(config, |root| draw_heatmap(root, r, config)),
        Report::Simplify(r) => render_png(config, |root| draw_simplify(root, r, config)),
    }
}

/// Render into an RGB buffer and encode it as PNG
fn render_png<F>(config: &GraphConfig, draw: F) -> Result<Vec<u8>>
where
    F: FnOnce(&DrawingArea<BitMapBackend<'_>, Shift>) -> Result<()>,
{
    let mut buffer = vec![0u8; (config.width * config.height * 3) as usize];

    {
        let root = BitMapBackend::with_buffer(&mut buffer, (config.width, config.height))
            .into_drawing_area();

        root.fill(&WHITE)
            .context("Failed to fill background")?;

        draw(&root)?;

        root.present().context("Failed to present drawing")?;
    }

    let mut png_bytes = Vec::new();
    {
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(
                &buffer,
                config.width,
                config.height,
                image::ColorType::Rgb8,
            )
            .context("Failed to encode PNG")?;
    }

    Ok(png_bytes)
}

fn hex_to_rgb(hex: &str) -> RGBColor {
    palette::parse_hex_color(hex)
        .map(|c| RGBColor(c.red, c.green, c.blue))
        .unwrap_or(BLACK)
}

fn format_bound(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{:.0}", v)
    } else {
        format!("{:.2}", v)
    }
}

/// One filled bar per entry, labelled below the x axis
fn draw_bars(
    root: &DrawingArea<BitMapBackend<'_>, Shift>,
    caption: &str,
    y_desc: &str,
    bars: &[(String, RGBColor, f64)],
) -> Result<()> {
    let n = bars.len();
    if n == 0 {
        anyhow::bail!("Cannot create chart with no classes");
    }

    let y_max = bars.iter().map(|(_, _, v)| *v).fold(0.0, f64::max);
    let y_range = 0.0..if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .caption(caption, ("sans-serif", 20))
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d((0..n).into_segmented(), y_range)
        .context("Failed to build chart")?;

    let label_of = |v: &SegmentValue<usize>| match v {
        SegmentValue::CenterOf(i) => bars.get(*i).map(|b| b.0.clone()).unwrap_or_default(),
        _ => String::new(),
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&label_of)
        .y_desc(y_desc)
        .draw()
        .context("Failed to draw mesh")?;

    chart
        .draw_series(bars.iter().enumerate().map(|(i, (_, color, value))| {
            let mut bar = Rectangle::new(
                [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), *value)],
                color.filled(),
            );
            bar.set_margin(0, 0, 5, 5);
            bar
        }))
        .context("Failed to draw bars")?;

    Ok(())
}

fn draw_graduated(
    root: &DrawingArea<BitMapBackend<'_>, Shift>,
    report: &GraduatedReport,
    config: &GraphConfig,
) -> Result<()> {
    let caption = config
        .title
        .clone()
        .unwrap_or_else(|| format!("{} ({})", report.field, report.method.name()));
    let bars: Vec<(String, RGBColor, f64)> = report
        .classes
        .iter()
        .map(|c| {
            let label = format!("{}-{}", format_bound(c.lower), format_bound(c.upper));
            (label, hex_to_rgb(&c.color), c.count as f64)
        })
        .collect();
    draw_bars(root, &caption, "features", &bars)
}

fn draw_categorized(
    root: &DrawingArea<BitMapBackend<'_>, Shift>,
    report: &CategorizedReport,
    config: &GraphConfig,
) -> Result<()> {
    let caption = config.title.clone().unwrap_or_else(|| report.field.clone());
    let bars: Vec<(String, RGBColor, f64)> = report
        .colors
        .iter()
        .map(|(label, color)| {
            let count = report.statistics.counts.get(label).copied().unwrap_or(0);
            (label.to_string(), hex_to_rgb(color), count as f64)
        })
        .collect();
    draw_bars(root, &caption, "features", &bars)
}

/// Horizontal strip showing the gradient interpolated to 100 steps
fn draw_heatmap(
    root: &DrawingArea<BitMapBackend<'_>, Shift>,
    report: &HeatmapReport,
    config: &GraphConfig,
) -> Result<()> {
    const STEPS: usize = 100;

    let stops: Vec<&str> = report.stops.iter().map(|(_, c)| c.as_str()).collect();
    let colors = palette::interpolate_palette(&stops, STEPS);
    if colors.is_empty() {
        anyhow::bail!("Heatmap palette '{}' has no colors", report.palette);
    }

    let caption = config.title.clone().unwrap_or_else(|| report.palette.clone());
    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .caption(&caption, ("sans-serif", 20))
        .x_label_area_size(40)
        .build_cartesian_2d(0f64..1f64, 0f64..1f64)
        .context("Failed to build chart")?;

    chart
        .configure_mesh()
        .disable_mesh()
        .disable_y_axis()
        .x_desc("position")
        .draw()
        .context("Failed to draw mesh")?;

    let width = 1.0 / colors.len() as f64;
    chart
        .draw_series(colors.iter().enumerate().map(|(i, color)| {
            let x0 = i as f64 * width;
            Rectangle::new([(x0, 0.0), (x0 + width, 1.0)], hex_to_rgb(color).filled())
        }))
        .context("Failed to draw gradient")?;

    Ok(())
}

fn padded_range(min: f64, max: f64) -> Range<f64> {
    if min == max {
        (min - 1.0)..(max + 1.0)
    } else {
        let padding = (max - min) * 0.05;
        (min - padding)..(max + padding)
    }
}

/// Original path in grey under the simplified path in blue
fn draw_simplify(
    root: &DrawingArea<BitMapBackend<'_>, Shift>,
    report: &SimplifyReport,
    config: &GraphConfig,
) -> Result<()> {
    let bounds = Bounds::of(&report.original)
        .context("Cannot create graph with no data points")?;

    let caption = config.title.clone().unwrap_or_else(|| {
        format!(
            "{} -> {} points",
            report.original.len(),
            report.simplified.len()
        )
    });

    let mut chart = ChartBuilder::on(root)
        .margin(10)
        .caption(&caption, ("sans-serif", 20))
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(
            padded_range(bounds.min_x, bounds.max_x),
            padded_range(bounds.min_y, bounds.max_y),
        )
        .context("Failed to build chart")?;

    chart
        .configure_mesh()
        .x_desc(&report.x_field)
        .y_desc(&report.y_field)
        .draw()
        .context("Failed to draw mesh")?;

    let original: Vec<(f64, f64)> = report.original.iter().map(|&p| p.into()).collect();
    let simplified: Vec<(f64, f64)> = report.simplified.iter().map(|&p| p.into()).collect();

    let grey = ORIGINAL_PATH_COLOR.stroke_width(1);
    let original_series = match config.original_dash.as_slice() {
        [] => chart
            .draw_series(LineSeries::new(original, grey))
            .context("Failed to draw original path")?,
        dashes => {
            let size = dashes[0].round().max(1.0) as u32;
            let spacing = dashes.get(1).copied().unwrap_or(dashes[0]).round().max(1.0) as u32;
            chart
                .draw_series(DashedLineSeries::new(original, size, spacing, grey))
                .context("Failed to draw original path")?
        }
    };
    original_series
        .label("original")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], grey));

    chart
        .draw_series(LineSeries::new(simplified.clone(), BLUE.mix(0.8).stroke_width(2)))
        .context("Failed to draw simplified path")?
        .label("simplified")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.mix(0.8).stroke_width(2)));

    chart
        .draw_series(simplified.iter().map(|&(x, y)| Circle::new((x, y), 3, BLUE.filled())))
        .context("Failed to draw vertices")?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.9))
        .border_style(BLACK.mix(0.3))
        .draw()
        .context("Failed to draw legend")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{ClassificationMethod, GraduatedClass};
    use crate::simplify::Point;

    fn config() -> GraphConfig {
        GraphConfig {
            title: None,
            width: 320,
            height: 240,
            original_dash: vec![4.0, 4.0],
        }
    }

    fn is_valid_png(bytes: &[u8]) -> bool {
        bytes.len() > 8 && bytes[0..8] == [137, 80, 78, 71, 13, 10, 26, 10]
    }

    #[test]
    fn test_hex_to_rgb() {
        assert_eq!(hex_to_rgb("#ff8000"), RGBColor(255, 128, 0));
        assert_eq!(hex_to_rgb("#f80"), RGBColor(255, 136, 0));
        assert_eq!(hex_to_rgb("not a color"), BLACK);
    }

    #[test]
    fn test_format_bound() {
        assert_eq!(format_bound(10.0), "10");
        assert_eq!(format_bound(2.345), "2.35");
    }

    #[test]
    fn test_padded_range() {
        assert_eq!(padded_range(5.0, 5.0), 4.0..6.0);
        assert_eq!(padded_range(0.0, 100.0), -5.0..105.0);
    }

    #[test]
    fn test_render_graduated() {
        let report = Report::Graduated(GraduatedReport {
            field: "pop".to_string(),
            method: ClassificationMethod::Quantile,
            palette: "Blues".to_string(),
            breaks: vec![0.0, 5.0, 10.0],
            classes: vec![
                GraduatedClass { lower: 0.0, upper: 5.0, color: "#deebf7".to_string(), count: 3 },
                GraduatedClass { lower: 5.0, upper: 10.0, color: "#3182bd".to_string(), count: 2 },
            ],
            skipped: 0,
        });
        let png = render_report(&report, &config()).unwrap();
        assert!(is_valid_png(&png));
    }

    #[test]
    fn test_render_simplify_solid_and_dashed() {
        let points = vec![Point::new(0.0, 0.0), Point::new(1.0, 2.0), Point::new(2.0, 0.0)];
        let report = Report::Simplify(SimplifyReport {
            x_field: "x".to_string(),
            y_field: "y".to_string(),
            tolerance: 0.1,
            high_quality: false,
            original: points.clone(),
            simplified: points,
        });
        assert!(is_valid_png(&render_report(&report, &config()).unwrap()));

        let solid = GraphConfig { original_dash: Vec::new(), ..config() };
        assert!(is_valid_png(&render_report(&report, &solid).unwrap()));
    }

    #[test]
    fn test_render_heatmap() {
        let report = Report::Heatmap(HeatmapReport {
            palette: "Classic".to_string(),
            stops: vec![(0.0, "#0000ff".to_string()), (1.0, "#ff0000".to_string())],
        });
        assert!(is_valid_png(&render_report(&report, &config()).unwrap()));
    }

    #[test]
    fn test_render_stats_is_error() {
        use crate::classify::compute_statistics;
        let report = Report::Stats(crate::runtime::StatsReport {
            field: "pop".to_string(),
            statistics: compute_statistics(&[1.0, 2.0]).unwrap(),
            skipped: 0,
        });
        assert!(render_report(&report, &config()).is_err());
    }
}
