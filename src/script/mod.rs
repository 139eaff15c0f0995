//! Gnuplot script generation.
//!
//! This module turns a [`PlotConfig`] snapshot into gnuplot script text.
//! Everything here is pure: no I/O, no process handling. A malformed
//! expression is not detected here; it surfaces later as a render failure.

mod palette;

use std::path::Path;

pub use palette::Palette;

/// Raster width of the rendered image in pixels.
pub const OUTPUT_WIDTH: u32 = 600;
/// Raster height of the rendered image in pixels.
pub const OUTPUT_HEIGHT: u32 = 400;
/// Sample count for 2D curves. High enough to keep `sin(1/x)` and friends smooth.
pub const SAMPLES: u32 = 1000;
/// Isosample count per axis for 3D surfaces.
pub const ISOSAMPLES: u32 = 100;
/// Default elevation angle for 3D views.
pub const DEFAULT_ROT_X: &str = "60";
/// Default azimuth angle for 3D views.
pub const DEFAULT_ROT_Z: &str = "30";

/// Plotting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Curves of `x`, drawn with `plot`.
    #[default]
    TwoD,
    /// A surface of `x` and `y`, drawn with `splot`.
    ThreeD,
}

impl Mode {
    /// Short lowercase name, used in file names.
    pub fn slug(self) -> &'static str {
        match self {
            Mode::TwoD => "functions",
            Mode::ThreeD => "3d",
        }
    }

    /// Tab title.
    pub fn title(self) -> &'static str {
        match self {
            Mode::TwoD => "2D Functions",
            Mode::ThreeD => "3D Functions",
        }
    }
}

/// A plot axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Horizontal axis.
    X,
    /// Vertical axis in 2D, depth axis in 3D.
    Y,
    /// Height axis (3D only).
    Z,
}

impl Axis {
    /// The axis letter, also the default label.
    pub fn letter(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        }
    }
}

/// A line color token (`#RRGGBB`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineColor(pub &'static str);

impl LineColor {
    /// Hex form, e.g. `#3478F6`.
    pub fn hex(self) -> &'static str {
        self.0
    }
}

/// Optional range for one axis.
///
/// The range only constrains the axis when both bounds are filled in;
/// a half-entered range is ignored rather than reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeSpec {
    /// Lower bound as typed.
    pub min: String,
    /// Upper bound as typed.
    pub max: String,
}

impl RangeSpec {
    /// Create a range from both bounds.
    pub fn new(min: impl Into<String>, max: impl Into<String>) -> Self {
        Self {
            min: min.into(),
            max: max.into(),
        }
    }

    /// Whether both bounds are present.
    pub fn is_constrained(&self) -> bool {
        !self.min.trim().is_empty() && !self.max.trim().is_empty()
    }

    /// The `[min:max]` clause, or `None` when unconstrained.
    pub fn clause(&self) -> Option<String> {
        self.is_constrained()
            .then(|| format!("[{}:{}]", self.min.trim(), self.max.trim()))
    }
}

/// Ranges for all three axes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ranges {
    /// X range.
    pub x: RangeSpec,
    /// Y range.
    pub y: RangeSpec,
    /// Z range (3D only).
    pub z: RangeSpec,
}

impl Ranges {
    /// Range of one axis.
    pub fn get(&self, axis: Axis) -> &RangeSpec {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }

    /// Mutable range of one axis.
    pub fn get_mut(&mut self, axis: Axis) -> &mut RangeSpec {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
        }
    }
}

/// Axis labels as typed. Blank labels fall back to the axis letter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AxisLabels {
    /// X label.
    pub x: String,
    /// Y label.
    pub y: String,
    /// Z label (3D only).
    pub z: String,
}

impl AxisLabels {
    /// Raw label text of one axis.
    pub fn get(&self, axis: Axis) -> &str {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }

    /// Mutable label text of one axis.
    pub fn get_mut(&mut self, axis: Axis) -> &mut String {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
        }
    }

    /// Label to emit for one axis.
    pub fn resolved(&self, axis: Axis) -> &str {
        let label = self.get(axis).trim();
        if label.is_empty() {
            axis.letter()
        } else {
            label
        }
    }
}

/// 3D view angles as typed. Blank fields fall back to 60/30.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rotation {
    /// Rotation about the x axis (elevation).
    pub x: String,
    /// Rotation about the z axis (azimuth).
    pub z: String,
}

impl Rotation {
    /// The `<rotx>,<rotz>` pair for `set view`.
    pub fn view(&self) -> String {
        let rot_x = non_blank(&self.x).unwrap_or(DEFAULT_ROT_X);
        let rot_z = non_blank(&self.z).unwrap_or(DEFAULT_ROT_Z);
        format!("{},{}", rot_x, rot_z)
    }
}

/// One 2D curve as seen by the script builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Curve {
    /// Gnuplot expression in `x`.
    pub expression: String,
    /// Line color.
    pub color: LineColor,
    /// Hidden curves are left out of the script entirely.
    pub visible: bool,
}

/// Snapshot of everything needed to build one script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotConfig {
    /// Which command to emit.
    pub mode: Mode,
    /// 2D curves in list order.
    pub curves: Vec<Curve>,
    /// The active 3D expression.
    pub surface: Option<String>,
    /// Axis ranges.
    pub ranges: Ranges,
    /// Axis labels.
    pub labels: AxisLabels,
    /// Emit `set grid`.
    pub grid: bool,
    /// 3D view angles.
    pub rotation: Rotation,
    /// 3D color palette.
    pub palette: Palette,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            mode: Mode::TwoD,
            curves: Vec::new(),
            surface: None,
            ranges: Ranges::default(),
            labels: AxisLabels::default(),
            grid: true,
            rotation: Rotation::default(),
            palette: Palette::default(),
        }
    }
}

impl PlotConfig {
    /// Whether [`build_script`] would produce anything.
    pub fn is_renderable(&self) -> bool {
        match self.mode {
            Mode::TwoD => self.curves.iter().any(|c| c.visible),
            Mode::ThreeD => self.surface.as_deref().and_then(non_blank).is_some(),
        }
    }
}

/// Build the gnuplot script for `config`, writing its image to `output`.
///
/// Returns `None` when there is nothing to draw: no visible curve in 2D, no
/// expression in 3D. Callers clear the display instead of rendering.
pub fn build_script(config: &PlotConfig, output: &Path) -> Option<String> {
    if !config.is_renderable() {
        return None;
    }

    let mut script = preamble(config, output);
    match config.mode {
        Mode::TwoD => push_plot(&mut script, config),
        Mode::ThreeD => push_splot(&mut script, config),
    }
    Some(script)
}

fn preamble(config: &PlotConfig, output: &Path) -> String {
    let mut script = format!(
        "set terminal pngcairo size {},{} enhanced font \"sans,10\"\n",
        OUTPUT_WIDTH, OUTPUT_HEIGHT
    );
    script.push_str(&format!(
        "set output \"{}\"\n",
        escape_double(&output.to_string_lossy())
    ));

    if config.grid {
        script.push_str("set grid\n");
    }

    let axes: &[Axis] = match config.mode {
        Mode::TwoD => &[Axis::X, Axis::Y],
        Mode::ThreeD => &[Axis::X, Axis::Y, Axis::Z],
    };
    for &axis in axes {
        script.push_str(&format!(
            "set {}label \"{}\"\n",
            axis.letter(),
            escape_double(&single_line(config.labels.resolved(axis)))
        ));
    }

    script.push_str(&format!("set samples {}\n", SAMPLES));
    script
}

fn push_plot(script: &mut String, config: &PlotConfig) {
    let ranges = range_clauses(&[&config.ranges.x, &config.ranges.y]);

    let terms: Vec<String> = config
        .curves
        .iter()
        .filter(|curve| curve.visible)
        .map(|curve| {
            format!(
                "{} title '{}' with lines lw 2 lc rgb '{}'",
                curve.expression,
                escape_single(&format!("y={}", curve.expression)),
                curve.color.hex()
            )
        })
        .collect();

    script.push_str("plot ");
    script.push_str(&ranges);
    script.push_str(&terms.join(", \\\n     "));
    script.push('\n');
}

fn push_splot(script: &mut String, config: &PlotConfig) {
    let expression = config
        .surface
        .as_deref()
        .and_then(non_blank)
        .unwrap_or_default();

    script.push_str(&format!("set view {}\n", config.rotation.view()));
    // Put the xy plane at the bottom of the z axis.
    script.push_str("set ticslevel 0\n");
    script.push_str("set hidden3d\n");
    script.push_str("set pm3d at s\n");
    script.push_str(&format!("set isosamples {},{}\n", ISOSAMPLES, ISOSAMPLES));

    if let Some(spec) = config.palette.directive() {
        script.push_str(&format!("set palette {}\n", spec));
    }

    let ranges = range_clauses(&[&config.ranges.x, &config.ranges.y, &config.ranges.z]);
    script.push_str(&format!(
        "splot {}{} title '{}' with lines\n",
        ranges,
        expression,
        escape_single(&format!("z={}", expression))
    ));
}

/// Positional range clauses, each followed by a space.
///
/// Gnuplot assigns ranges by position, so an unconstrained axis that precedes
/// a constrained one is kept as `[]`. Trailing unconstrained axes are dropped.
fn range_clauses(ranges: &[&RangeSpec]) -> String {
    let clauses: Vec<Option<String>> = ranges.iter().map(|r| r.clause()).collect();
    let Some(last) = clauses.iter().rposition(Option::is_some) else {
        return String::new();
    };

    clauses[..=last]
        .iter()
        .map(|clause| format!("{} ", clause.as_deref().unwrap_or("[]")))
        .collect()
}

fn non_blank(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Replace each run of CR/LF characters with one space.
///
/// A line break inside a directive would end it early.
pub fn single_line(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_break = false;
    for ch in text.chars() {
        if ch == '\n' || ch == '\r' {
            if !in_break {
                out.push(' ');
            }
            in_break = true;
        } else {
            out.push(ch);
            in_break = false;
        }
    }
    out
}

/// Escape text for a double-quoted gnuplot string.
fn escape_double(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Escape text for a single-quoted gnuplot string.
fn escape_single(text: &str) -> String {
    text.replace('\'', "''")
}
