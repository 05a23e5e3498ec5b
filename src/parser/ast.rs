// Abstract Syntax Tree for the styling command DSL

/// A single styling request. Optional settings left as `None` are filled
/// from the configured defaults at execution time.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Stats(StatsCommand),
    Graduated(GraduatedCommand),
    Categorized(CategorizedCommand),
    Heatmap(HeatmapCommand),
    Simplify(SimplifyCommand),
}

impl Command {
    /// Whether the command reads an attribute table
    pub fn requires_data(&self) -> bool {
        !matches!(self, Command::Heatmap(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Stats(_) => "stats",
            Command::Graduated(_) => "graduated",
            Command::Categorized(_) => "categorized",
            Command::Heatmap(_) => "heatmap",
            Command::Simplify(_) => "simplify",
        }
    }
}

/// stats(field: col)
#[derive(Debug, Clone, PartialEq)]
pub struct StatsCommand {
    pub field: String,
}

/// graduated(field: col, method: "quantile", classes: 5, palette: "Blues", invert: true)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GraduatedCommand {
    pub field: String,
    pub method: Option<String>,
    pub classes: Option<usize>,
    pub palette: Option<String>,
    pub invert: Option<bool>,
}

/// categorized(field: col, palette: "Set2")
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CategorizedCommand {
    pub field: String,
    pub palette: Option<String>,
}

/// heatmap(palette: "Fire")
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HeatmapCommand {
    pub palette: Option<String>,
}

/// simplify(x: lng, y: lat, tolerance: 0.001, high_quality: false)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimplifyCommand {
    pub x: String,
    pub y: String,
    pub tolerance: Option<f64>,
    pub high_quality: Option<bool>,
}
