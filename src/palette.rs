// Color ramps for thematic styling: registry lookup, sampling, interpolation

use ::palette::{Mix, Srgb};

/// Ordered list of hex colors
pub type ColorRamp = Vec<String>;

/// Registry category a ramp is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaletteCategory {
    #[default]
    Sequential,
    Diverging,
    Qualitative,
    Heatmap,
}

impl PaletteCategory {
    /// Parse a category name; unknown names resolve to `Sequential`
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "diverging" => PaletteCategory::Diverging,
            "qualitative" | "categorical" => PaletteCategory::Qualitative,
            "heatmap" | "heat" => PaletteCategory::Heatmap,
            _ => PaletteCategory::Sequential,
        }
    }

    fn ramps(self) -> &'static [(&'static str, &'static [&'static str])] {
        match self {
            PaletteCategory::Sequential => SEQUENTIAL,
            PaletteCategory::Diverging => DIVERGING,
            PaletteCategory::Qualitative => QUALITATIVE,
            PaletteCategory::Heatmap => HEATMAP,
        }
    }
}

// =============================================================================
// Registry
// =============================================================================

pub const VIRIDIS: &[&str] = &[
    "#440154", "#482878", "#3e4a89", "#31688e", "#26828e",
    "#1f9e89", "#35b779", "#6ece58", "#b5de2b", "#fde725",
];

pub const PLASMA: &[&str] = &[
    "#0d0887", "#46039f", "#7201a8", "#9c179e", "#bd3786",
    "#d8576b", "#ed7953", "#fb9f3a", "#fdca26", "#f0f921",
];

pub const INFERNO: &[&str] = &[
    "#000004", "#1b0c41", "#4a0c6b", "#781c6d", "#a52c60",
    "#cf4446", "#ed6925", "#fb9b06", "#f7d13d", "#fcffa4",
];

pub const MAGMA: &[&str] = &[
    "#000004", "#180f3d", "#440f76", "#721f81", "#9e2f7f",
    "#cd4071", "#f1605d", "#fd9668", "#feca8d", "#fcfdbf",
];

pub const BLUES: &[&str] = &[
    "#f7fbff", "#deebf7", "#c6dbef", "#9ecae1", "#6baed6",
    "#4292c6", "#2171b5", "#08519c", "#08306b",
];

pub const GREENS: &[&str] = &[
    "#f7fcf5", "#e5f5e0", "#c7e9c0", "#a1d99b", "#74c476",
    "#41ab5d", "#238b45", "#006d2c", "#00441b",
];

pub const REDS: &[&str] = &[
    "#fff5f0", "#fee0d2", "#fcbba1", "#fc9272", "#fb6a4a",
    "#ef3b2c", "#cb181d", "#a50f15", "#67000d",
];

pub const ORANGES: &[&str] = &[
    "#fff5eb", "#fee6ce", "#fdd0a2", "#fdae6b", "#fd8d3c",
    "#f16913", "#d94801", "#a63603", "#7f2704",
];

pub const PURPLES: &[&str] = &[
    "#fcfbfd", "#efedf5", "#dadaeb", "#bcbddc", "#9e9ac8",
    "#807dba", "#6a51a3", "#54278f", "#3f007d",
];

pub const YLORRD: &[&str] = &[
    "#ffffcc", "#ffeda0", "#fed976", "#feb24c", "#fd8d3c",
    "#fc4e2a", "#e31a1c", "#bd0026", "#800026",
];

pub const RDBU: &[&str] = &[
    "#67001f", "#b2182b", "#d6604d", "#f4a582", "#fddbc7",
    "#f7f7f7", "#d1e5f0", "#92c5de", "#4393c3", "#2166ac", "#053061",
];

pub const RDYLGN: &[&str] = &[
    "#a50026", "#d73027", "#f46d43", "#fdae61", "#fee08b",
    "#ffffbf", "#d9ef8b", "#a6d96a", "#66bd63", "#1a9850", "#006837",
];

pub const SPECTRAL: &[&str] = &[
    "#9e0142", "#d53e4f", "#f46d43", "#fdae61", "#fee08b",
    "#ffffbf", "#e6f598", "#abdda4", "#66c2a5", "#3288bd", "#5e4fa2",
];

pub const BRBG: &[&str] = &[
    "#543005", "#8c510a", "#bf812d", "#dfc27d", "#f6e8c3",
    "#f5f5f5", "#c7eae5", "#80cdc1", "#35978f", "#01665e", "#003c30",
];

pub const PIYG: &[&str] = &[
    "#8e0152", "#c51b7d", "#de77ae", "#f1b6da", "#fde0ef",
    "#f7f7f7", "#e6f5d0", "#b8e186", "#7fbc41", "#4d9221", "#276419",
];

pub const SET1: &[&str] = &[
    "#e41a1c", "#377eb8", "#4daf4a", "#984ea3", "#ff7f00",
    "#ffff33", "#a65628", "#f781bf", "#999999",
];

pub const SET2: &[&str] = &[
    "#66c2a5", "#fc8d62", "#8da0cb", "#e78ac3", "#a6d854",
    "#ffd92f", "#e5c494", "#b3b3b3",
];

pub const SET3: &[&str] = &[
    "#8dd3c7", "#ffffb3", "#bebada", "#fb8072", "#80b1d3",
    "#fdb462", "#b3de69", "#fccde5", "#d9d9d9", "#bc80bd",
    "#ccebc5", "#ffed6f",
];

pub const PASTEL1: &[&str] = &[
    "#fbb4ae", "#b3cde3", "#ccebc5", "#decbe4", "#fed9a6",
    "#ffffcc", "#e5d8bd", "#fddaec", "#f2f2f2",
];

pub const DARK2: &[&str] = &[
    "#1b9e77", "#d95f02", "#7570b3", "#e7298a", "#66a61e",
    "#e6ab02", "#a6761d", "#666666",
];

pub const PAIRED: &[&str] = &[
    "#a6cee3", "#1f78b4", "#b2df8a", "#33a02c", "#fb9a99",
    "#e31a1c", "#fdbf6f", "#ff7f00", "#cab2d6", "#6a3d9a",
    "#ffff99", "#b15928",
];

pub const CATEGORY10: &[&str] = &[
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd",
    "#8c564b", "#e377c2", "#7f7f7f", "#bcbd22", "#17becf",
];

/// Blue through red, the stock heat-layer gradient
pub const HEAT_CLASSIC: &[&str] = &["#0000ff", "#00ffff", "#00ff00", "#ffff00", "#ff0000"];

pub const HEAT_FIRE: &[&str] = &["#000000", "#7f0000", "#ff0000", "#ff7f00", "#ffff00", "#ffffff"];

pub const HEAT_COOL: &[&str] = &["#f7fcf0", "#ccebc5", "#7bccc4", "#2b8cbe", "#084081"];

// The first entry of each table is that category's fallback.
const SEQUENTIAL: &[(&str, &[&str])] = &[
    ("Viridis", VIRIDIS),
    ("Plasma", PLASMA),
    ("Inferno", INFERNO),
    ("Magma", MAGMA),
    ("Blues", BLUES),
    ("Greens", GREENS),
    ("Reds", REDS),
    ("Oranges", ORANGES),
    ("Purples", PURPLES),
    ("YlOrRd", YLORRD),
];

const DIVERGING: &[(&str, &[&str])] = &[
    ("RdBu", RDBU),
    ("RdYlGn", RDYLGN),
    ("Spectral", SPECTRAL),
    ("BrBG", BRBG),
    ("PiYG", PIYG),
];

const QUALITATIVE: &[(&str, &[&str])] = &[
    ("Set1", SET1),
    ("Set2", SET2),
    ("Set3", SET3),
    ("Pastel1", PASTEL1),
    ("Dark2", DARK2),
    ("Paired", PAIRED),
    ("Category10", CATEGORY10),
];

const HEATMAP: &[(&str, &[&str])] = &[
    ("Classic", HEAT_CLASSIC),
    ("Fire", HEAT_FIRE),
    ("Cool", HEAT_COOL),
    ("Inferno", INFERNO),
];

/// Look up a ramp by name (case-insensitive) within a category.
/// Unknown names fall back to the category's first ramp.
pub fn get_palette(category: PaletteCategory, name: &str) -> ColorRamp {
    let ramps = category.ramps();
    let wanted = name.trim();
    let colors = match ramps.iter().find(|(n, _)| n.eq_ignore_ascii_case(wanted)) {
        Some((_, colors)) => *colors,
        None => {
            tracing::debug!(palette = wanted, ?category, "unknown palette, using default");
            ramps[0].1
        }
    };
    colors.iter().map(|c| c.to_string()).collect()
}

/// Names of every ramp registered under `category`, in registry order
pub fn palette_names(category: PaletteCategory) -> Vec<&'static str> {
    category.ramps().iter().map(|(name, _)| *name).collect()
}

// =============================================================================
// Sampling & interpolation
// =============================================================================

/// Pick `count` colors evenly spaced across `ramp`, repeating stops when
/// `count` exceeds the ramp length.
pub fn sample_colors<S: AsRef<str>>(ramp: &[S], count: usize) -> ColorRamp {
    if ramp.is_empty() || count == 0 {
        return Vec::new();
    }
    if count == ramp.len() {
        return ramp.iter().map(|c| c.as_ref().to_string()).collect();
    }
    if count == 1 {
        return vec![ramp[0].as_ref().to_string()];
    }

    let last = (ramp.len() - 1) as f64;
    (0..count)
        .map(|i| {
            let idx = (i as f64 * last / (count - 1) as f64).round() as usize;
            ramp[idx.min(ramp.len() - 1)].as_ref().to_string()
        })
        .collect()
}

/// Linear blend of two 6-digit hex colors on their sRGB components.
/// `weight` 0 yields `c1`, 1 yields `c2`. Anything that is not 6-digit hex
/// is read as black.
pub fn interpolate_color(c1: &str, c2: &str, weight: f64) -> String {
    let a = parse_hex_digits(c1, &[6]).unwrap_or(BLACK);
    let b = parse_hex_digits(c2, &[6]).unwrap_or(BLACK);
    let w = if weight.is_nan() { 0.0 } else { weight.clamp(0.0, 1.0) };

    let mixed = a.into_format::<f32>().mix(b.into_format::<f32>(), w as f32);
    to_hex(mixed.into_format::<u8>())
}

/// Stretch `ramp` to `steps` colors by interpolating between adjacent
/// stops. Requests at or below the ramp length truncate it instead.
pub fn interpolate_palette<S: AsRef<str>>(ramp: &[S], steps: usize) -> ColorRamp {
    if ramp.is_empty() || steps == 0 {
        return Vec::new();
    }
    if steps <= ramp.len() {
        return ramp[..steps].iter().map(|c| c.as_ref().to_string()).collect();
    }

    let last = ramp.len() - 1;
    (0..steps)
        .map(|i| {
            let pos = i as f64 * last as f64 / (steps - 1) as f64;
            let lo = (pos.floor() as usize).min(last);
            let hi = (lo + 1).min(last);
            let frac = pos - lo as f64;
            if frac == 0.0 {
                ramp[lo].as_ref().to_string()
            } else {
                interpolate_color(ramp[lo].as_ref(), ramp[hi].as_ref(), frac)
            }
        })
        .collect()
}

/// Gradient stops for a heat layer: each color paired with its position
/// in [0, 1]. A single color sits at 1.0.
pub fn heatmap_gradient<S: AsRef<str>>(ramp: &[S]) -> Vec<(f64, String)> {
    match ramp.len() {
        0 => Vec::new(),
        1 => vec![(1.0, ramp[0].as_ref().to_string())],
        n => ramp
            .iter()
            .enumerate()
            .map(|(i, c)| (i as f64 / (n - 1) as f64, c.as_ref().to_string()))
            .collect(),
    }
}

// =============================================================================
// Hex colors
// =============================================================================

const BLACK: Srgb<u8> = Srgb::new(0, 0, 0);

/// Lowercase `#rrggbb`
pub fn to_hex(color: Srgb<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", color.red, color.green, color.blue)
}

/// Parse hex with an optional leading `#` when its digit count is one of `lengths`
fn parse_hex_digits(input: &str, lengths: &[usize]) -> Option<Srgb<u8>> {
    let trimmed = input.trim();
    let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if !lengths.contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    digits.parse::<Srgb<u8>>().ok()
}

/// Parse `#rrggbb`, `rrggbb` or the short `#rgb` form
pub fn parse_hex_color(input: &str) -> Option<Srgb<u8>> {
    parse_hex_digits(input, &[6, 3])
}

/// Expand 3-digit hex and lowercase it; `None` if the input is not hex
pub fn normalize_hex(input: &str) -> Option<String> {
    parse_hex_color(input).map(to_hex)
}
