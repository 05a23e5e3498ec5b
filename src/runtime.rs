// Runtime executor for styling commands

use crate::category::{self, CategoryColorMap, CategoryStatistics};
use crate::classify::{self, ClassificationMethod, GraduatedClass, Statistics};
use crate::config::Defaults;
use crate::csv_reader::{self, CsvData};
use crate::palette::{self, ColorRamp, PaletteCategory};
use crate::parser::ast::{
    CategorizedCommand, Command, GraduatedCommand, HeatmapCommand, SimplifyCommand, StatsCommand,
};
use crate::simplify::{self, Point};
use anyhow::{anyhow, Context, Result};
use std::fmt;

/// Result of running one command
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    Stats(StatsReport),
    Graduated(GraduatedReport),
    Categorized(CategorizedReport),
    Heatmap(HeatmapReport),
    Simplify(SimplifyReport),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatsReport {
    pub field: String,
    pub statistics: Statistics,
    /// Cells that were blank or not numeric
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraduatedReport {
    pub field: String,
    pub method: ClassificationMethod,
    pub palette: String,
    pub breaks: Vec<f64>,
    pub classes: Vec<GraduatedClass>,
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategorizedReport {
    pub field: String,
    pub palette: String,
    /// Labels in sorted order with their assigned colors
    pub colors: CategoryColorMap,
    pub statistics: CategoryStatistics,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapReport {
    pub palette: String,
    pub stops: Vec<(f64, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimplifyReport {
    pub x_field: String,
    pub y_field: String,
    pub tolerance: f64,
    pub high_quality: bool,
    pub original: Vec<Point>,
    pub simplified: Vec<Point>,
}

/// Run a parsed command against the attribute table, filling unset
/// options from `defaults`
pub fn execute(command: &Command, csv_data: Option<&CsvData>, defaults: &Defaults) -> Result<Report> {
    tracing::debug!(command = command.name(), "executing");

    let executor: &dyn Executor = match command {
        Command::Stats(c) => c,
        Command::Graduated(c) => c,
        Command::Categorized(c) => c,
        Command::Heatmap(c) => c,
        Command::Simplify(c) => c,
    };

    executor.execute(csv_data, defaults)
}

/// One implementation per command
trait Executor {
    fn execute(&self, csv_data: Option<&CsvData>, defaults: &Defaults) -> Result<Report>;
}

fn require_data<'a>(csv_data: Option<&'a CsvData>, command: &str) -> Result<&'a CsvData> {
    csv_data.ok_or_else(|| anyhow!("'{}' requires CSV input", command))
}

/// Numeric values of `field`, failing when none are usable
fn numeric_field(data: &CsvData, field: &str) -> Result<(String, Vec<f64>, usize)> {
    let selector = csv_reader::parse_column_selector(field);
    let (name, values, skipped) = csv_reader::extract_numeric_values(data, selector)
        .with_context(|| format!("Failed to extract column '{}'", field))?;
    if values.is_empty() {
        anyhow::bail!("Column '{}' contains no numeric values", name);
    }
    Ok((name, values, skipped))
}

/// Graduated ramps may be sequential or diverging; unknown names fall
/// back to the first sequential ramp.
fn graduated_ramp(name: &str) -> ColorRamp {
    let is_diverging = palette::palette_names(PaletteCategory::Diverging)
        .iter()
        .any(|n| n.eq_ignore_ascii_case(name.trim()));
    let category = if is_diverging {
        PaletteCategory::Diverging
    } else {
        PaletteCategory::Sequential
    };
    palette::get_palette(category, name)
}

impl Executor for StatsCommand {
    fn execute(&self, csv_data: Option<&CsvData>, _defaults: &Defaults) -> Result<Report> {
        let data = require_data(csv_data, "stats")?;
        let (field, values, skipped) = numeric_field(data, &self.field)?;
        let statistics = classify::compute_statistics(&values)
            .with_context(|| format!("Failed to compute statistics for '{}'", field))?;

        tracing::info!(field = %field, count = statistics.count, "computed statistics");
        Ok(Report::Stats(StatsReport { field, statistics, skipped }))
    }
}

impl Executor for GraduatedCommand {
    fn execute(&self, csv_data: Option<&CsvData>, defaults: &Defaults) -> Result<Report> {
        let data = require_data(csv_data, "graduated")?;
        let (field, values, skipped) = numeric_field(data, &self.field)?;

        let method_name = self.method.as_deref().unwrap_or(&defaults.method);
        let method = ClassificationMethod::from_name(method_name);
        let num_classes = self.classes.unwrap_or(defaults.classes);
        let palette = self.palette.clone().unwrap_or_else(|| defaults.palette.clone());
        let invert = self.invert.unwrap_or(defaults.invert);

        let ramp = graduated_ramp(&palette);
        let classes = classify::graduated_classes(&values, method, num_classes, &ramp, invert)
            .with_context(|| format!("Failed to classify '{}'", field))?;

        let mut breaks: Vec<f64> = classes.iter().map(|c| c.lower).collect();
        if let Some(last) = classes.last() {
            breaks.push(last.upper);
        }

        tracing::info!(
            field = %field,
            method = method.name(),
            classes = classes.len(),
            "computed class breaks"
        );
        Ok(Report::Graduated(GraduatedReport {
            field,
            method,
            palette,
            breaks,
            classes,
            skipped,
        }))
    }
}

impl Executor for CategorizedCommand {
    fn execute(&self, csv_data: Option<&CsvData>, defaults: &Defaults) -> Result<Report> {
        let data = require_data(csv_data, "categorized")?;
        let selector = csv_reader::parse_column_selector(&self.field);
        let (field, labels) = csv_reader::extract_column_as_string(data, selector)
            .with_context(|| format!("Failed to extract column '{}'", self.field))?;

        let statistics = category::compute_category_statistics(&labels, |label: &String| {
            (!label.is_empty()).then(|| label.clone())
        });
        if statistics.total == 0 {
            anyhow::bail!("Column '{}' contains no category labels", field);
        }

        let palette = self
            .palette
            .clone()
            .unwrap_or_else(|| defaults.qualitative_palette.clone());
        let ramp = palette::get_palette(PaletteCategory::Qualitative, &palette);
        let sorted = category::sorted_categories(&statistics.categories);
        let colors = category::build_category_color_map(&sorted, &ramp);

        if sorted.len() > ramp.len() {
            tracing::warn!(
                categories = sorted.len(),
                colors = ramp.len(),
                "more categories than palette colors, colors will repeat"
            );
        }
        tracing::info!(field = %field, categories = sorted.len(), "assigned category colors");
        Ok(Report::Categorized(CategorizedReport {
            field,
            palette,
            colors,
            statistics,
        }))
    }
}

impl Executor for HeatmapCommand {
    fn execute(&self, _csv_data: Option<&CsvData>, defaults: &Defaults) -> Result<Report> {
        let palette = self
            .palette
            .clone()
            .unwrap_or_else(|| defaults.heatmap_palette.clone());
        let ramp = palette::get_palette(PaletteCategory::Heatmap, &palette);
        let stops = palette::heatmap_gradient(&ramp);
        Ok(Report::Heatmap(HeatmapReport { palette, stops }))
    }
}

impl Executor for SimplifyCommand {
    fn execute(&self, csv_data: Option<&CsvData>, defaults: &Defaults) -> Result<Report> {
        let data = require_data(csv_data, "simplify")?;
        let x_selector = csv_reader::parse_column_selector(&self.x);
        let y_selector = csv_reader::parse_column_selector(&self.y);
        let original = csv_reader::extract_points(data, x_selector, y_selector)?;

        let tolerance = self.tolerance.unwrap_or(defaults.tolerance);
        let high_quality = self.high_quality.unwrap_or(false);
        let simplified = simplify::simplify_with(&original, tolerance, high_quality);

        tracing::info!(
            original = original.len(),
            simplified = simplified.len(),
            tolerance,
            high_quality,
            "simplified path"
        );
        Ok(Report::Simplify(SimplifyReport {
            x_field: self.x.clone(),
            y_field: self.y.clone(),
            tolerance,
            high_quality,
            original,
            simplified,
        }))
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Stats(r) => {
                let s = &r.statistics;
                writeln!(f, "stats: {}", r.field)?;
                writeln!(f, "  count     {}", s.count)?;
                writeln!(f, "  min       {}", s.min)?;
                writeln!(f, "  max       {}", s.max)?;
                writeln!(f, "  sum       {}", s.sum)?;
                writeln!(f, "  mean      {}", s.mean)?;
                writeln!(f, "  median    {}", s.median)?;
                writeln!(f, "  variance  {}", s.variance)?;
                writeln!(f, "  std_dev   {}", s.std_dev)?;
                writeln!(f, "  range     {}", s.range)?;
                if r.skipped > 0 {
                    writeln!(f, "  skipped   {}", r.skipped)?;
                }
                Ok(())
            }
            Report::Graduated(r) => {
                writeln!(
                    f,
                    "graduated: {} ({}, {} classes, {})",
                    r.field,
                    r.method.name(),
                    r.classes.len(),
                    r.palette
                )?;
                let breaks: Vec<String> = r.breaks.iter().map(|b| b.to_string()).collect();
                writeln!(f, "  breaks: {}", breaks.join(", "))?;
                for (i, class) in r.classes.iter().enumerate() {
                    writeln!(
                        f,
                        "  {}  {} .. {}  {}  {}",
                        i + 1,
                        class.lower,
                        class.upper,
                        class.color,
                        class.count
                    )?;
                }
                if r.skipped > 0 {
                    writeln!(f, "  skipped: {}", r.skipped)?;
                }
                Ok(())
            }
            Report::Categorized(r) => {
                writeln!(
                    f,
                    "categorized: {} ({} categories, {})",
                    r.field,
                    r.colors.len(),
                    r.palette
                )?;
                for (label, color) in r.colors.iter() {
                    let count = r.statistics.counts.get(label).copied().unwrap_or(0);
                    let pct = r.statistics.percentages.get(label).copied().unwrap_or(0.0);
                    writeln!(f, "  {}  {}  {}  {:.2}%", label, color, count, pct)?;
                }
                Ok(())
            }
            Report::Heatmap(r) => {
                writeln!(f, "heatmap: {}", r.palette)?;
                for (position, color) in &r.stops {
                    writeln!(f, "  {:.2}  {}", position, color)?;
                }
                Ok(())
            }
            Report::Simplify(r) => {
                writeln!(
                    f,
                    "simplify: {}, {} (tolerance {}{})",
                    r.x_field,
                    r.y_field,
                    r.tolerance,
                    if r.high_quality { ", high quality" } else { "" }
                )?;
                writeln!(f, "  points: {} -> {}", r.original.len(), r.simplified.len())?;
                writeln!(f, "  {},{}", r.x_field, r.y_field)?;
                for p in &r.simplified {
                    writeln!(f, "  {},{}", p.x, p.y)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_command;
    use std::io::Cursor;

    fn csv(content: &str) -> CsvData {
        csv_reader::read_csv(Cursor::new(content)).unwrap()
    }

    fn run(dsl: &str, data: Option<&CsvData>) -> Result<Report> {
        let (_, command) = parse_command(dsl).map_err(|e| anyhow!("{:?}", e))?;
        execute(&command, data, &Defaults::default())
    }

    const REGIONS: &str = "region,pop,landuse\n\
                           a,1,forest\n\
                           b,2,water\n\
                           c,3,forest\n\
                           d,4,urban\n\
                           e,,forest\n";

    #[test]
    fn test_execute_stats() {
        let data = csv(REGIONS);
        let report = run("stats(field: pop)", Some(&data)).unwrap();
        match report {
            Report::Stats(r) => {
                assert_eq!(r.field, "pop");
                assert_eq!(r.statistics.count, 4);
                assert_eq!(r.statistics.mean, 2.5);
                assert_eq!(r.statistics.median, 2.5);
                assert_eq!(r.skipped, 1);
            }
            other => panic!("Expected Stats, got {:?}", other),
        }
    }

    #[test]
    fn test_execute_graduated_uses_defaults() {
        let data = csv(REGIONS);
        let report = run("graduated(field: pop, classes: 3)", Some(&data)).unwrap();
        match report {
            Report::Graduated(r) => {
                assert_eq!(r.method, ClassificationMethod::EqualInterval);
                assert_eq!(r.palette, "Viridis");
                assert_eq!(r.breaks, vec![1.0, 2.0, 3.0, 4.0]);
                assert_eq!(r.classes.len(), 3);
                assert_eq!(r.classes.iter().map(|c| c.count).sum::<usize>(), 4);
            }
            other => panic!("Expected Graduated, got {:?}", other),
        }
    }

    #[test]
    fn test_execute_graduated_invert_reverses_colors() {
        let data = csv(REGIONS);
        let plain = run("graduated(field: pop, classes: 2, palette: Blues)", Some(&data)).unwrap();
        let inverted = run(
            "graduated(field: pop, classes: 2, palette: Blues, invert: true)",
            Some(&data),
        )
        .unwrap();
        match (plain, inverted) {
            (Report::Graduated(a), Report::Graduated(b)) => {
                assert_eq!(a.classes[0].color, b.classes[1].color);
                assert_eq!(a.classes[1].color, b.classes[0].color);
            }
            _ => panic!("Expected Graduated reports"),
        }
    }

    #[test]
    fn test_execute_graduated_diverging_palette() {
        let data = csv(REGIONS);
        let report = run("graduated(field: pop, classes: 2, palette: rdbu)", Some(&data)).unwrap();
        let expected = palette::get_palette(PaletteCategory::Diverging, "RdBu");
        match report {
            Report::Graduated(r) => assert_eq!(r.classes[0].color, expected[0]),
            _ => panic!("Expected Graduated"),
        }
    }

    #[test]
    fn test_execute_graduated_no_numeric_values() {
        let data = csv("name,code\na,x\nb,y\n");
        let result = run("graduated(field: code)", Some(&data));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("no numeric values"));
    }

    #[test]
    fn test_execute_categorized_sorted_labels() {
        let data = csv(REGIONS);
        let report = run("categorized(field: landuse)", Some(&data)).unwrap();
        match report {
            Report::Categorized(r) => {
                let labels: Vec<&str> = r.colors.iter().map(|(l, _)| l).collect();
                assert_eq!(labels, vec!["forest", "urban", "water"]);
                let set1 = palette::get_palette(PaletteCategory::Qualitative, "Set1");
                assert_eq!(r.colors.get("forest"), Some(set1[0].as_str()));
                assert_eq!(r.statistics.total, 5);
                assert_eq!(r.statistics.counts["forest"], 3);
                assert_eq!(r.statistics.percentages["forest"], 60.0);
            }
            other => panic!("Expected Categorized, got {:?}", other),
        }
    }

    #[test]
    fn test_execute_heatmap_without_data() {
        let report = run(r#"heatmap(palette: "Fire")"#, None).unwrap();
        match report {
            Report::Heatmap(r) => {
                assert_eq!(r.stops.first().map(|s| s.0), Some(0.0));
                assert_eq!(r.stops.last().map(|s| s.0), Some(1.0));
            }
            other => panic!("Expected Heatmap, got {:?}", other),
        }
    }

    #[test]
    fn test_execute_requires_data() {
        let result = run("stats(field: pop)", None);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("requires CSV input"));
    }

    #[test]
    fn test_execute_simplify() {
        let data = csv("x,y\n0,0\n1,0.01\n2,0\n3,5\n4,6\n5,7\n");
        let report = run("simplify(x: x, y: y, tolerance: 0.5)", Some(&data)).unwrap();
        match report {
            Report::Simplify(r) => {
                assert_eq!(r.original.len(), 6);
                assert_eq!(r.simplified.first(), Some(&Point::new(0.0, 0.0)));
                assert_eq!(r.simplified.last(), Some(&Point::new(5.0, 7.0)));
                assert!(r.simplified.len() < r.original.len());
            }
            other => panic!("Expected Simplify, got {:?}", other),
        }
    }

    #[test]
    fn test_report_display_stats() {
        let data = csv(REGIONS);
        let text = run("stats(field: pop)", Some(&data)).unwrap().to_string();
        assert!(text.starts_with("stats: pop"));
        assert!(text.contains("count     4"));
        assert!(text.contains("skipped   1"));
    }

    #[test]
    fn test_report_display_categorized() {
        let data = csv(REGIONS);
        let text = run("categorized(field: landuse)", Some(&data)).unwrap().to_string();
        assert!(text.contains("3 categories"));
        assert!(text.contains("forest"));
        assert!(text.contains("60.00%"));
    }
}
