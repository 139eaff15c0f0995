//! Plot session - what the user has entered on each tab.
//!
//! This module holds the 2D function list, the active 3D function and the
//! per-tab settings. Every mutation returns an [`Effect`] telling the caller
//! whether to render, clear the display, or do nothing. No I/O happens here.

mod examples;

use crate::script::{Axis, AxisLabels, Curve, LineColor, Mode, Palette, PlotConfig, Ranges, Rotation};

pub use examples::{Example, EXAMPLES_2D, EXAMPLES_3D};

/// Line colors for 2D functions, picked by list length at insertion.
pub const LINE_COLORS: [LineColor; 6] = [
    LineColor("#3478F6"),
    LineColor("#34C759"),
    LineColor("#FF3B30"),
    LineColor("#AF52DE"),
    LineColor("#FF9500"),
    LineColor("#00C7BE"),
];

/// What the caller should do after a session change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Build the current tab's script and render it.
    Render,
    /// Nothing is drawable any more; blank the image.
    ClearDisplay,
    /// No visible change.
    Nothing,
}

/// Stable identifier of a function entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

/// A 2D function in the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionEntry {
    /// Stable identifier.
    pub id: EntryId,
    /// Gnuplot expression in `x`.
    pub expression: String,
    /// Line color assigned when the entry was added.
    pub color: LineColor,
    /// Whether the function is drawn.
    pub visible: bool,
}

/// Settings shared by both tabs (each tab has its own copy).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabSettings {
    /// Axis ranges.
    pub ranges: Ranges,
    /// Axis labels.
    pub labels: AxisLabels,
    /// Grid on or off.
    pub grid: bool,
}

impl Default for TabSettings {
    fn default() -> Self {
        Self {
            ranges: Ranges::default(),
            labels: AxisLabels::default(),
            grid: true,
        }
    }
}

/// A settings edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Setting {
    /// Flip the grid.
    ToggleGrid,
    /// Replace an axis label.
    Label(Axis, String),
    /// Replace the lower bound of an axis range.
    RangeMin(Axis, String),
    /// Replace the upper bound of an axis range.
    RangeMax(Axis, String),
    /// Replace the elevation angle (3D).
    RotationX(String),
    /// Replace the azimuth angle (3D).
    RotationZ(String),
    /// Step to the next palette (3D).
    CyclePalette,
}

#[derive(Debug, Clone, Default)]
struct FunctionsTab {
    entries: Vec<FunctionEntry>,
    settings: TabSettings,
    example_index: usize,
}

#[derive(Debug, Clone, Default)]
struct SurfaceTab {
    active: Option<String>,
    settings: TabSettings,
    rotation: Rotation,
    palette: Palette,
    example_index: usize,
}

/// Both tabs and which one is showing.
#[derive(Debug, Clone, Default)]
pub struct PlotSession {
    tab: Mode,
    functions: FunctionsTab,
    surface: SurfaceTab,
    next_id: u64,
}

impl PlotSession {
    /// Create an empty session on the 2D tab.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current tab.
    pub fn tab(&self) -> Mode {
        self.tab
    }

    /// Show another tab.
    ///
    /// Never renders: whatever the target tab last rendered stays valid.
    pub fn switch_tab(&mut self, tab: Mode) -> Effect {
        self.tab = tab;
        Effect::Nothing
    }

    /// The 2D function list in insertion order.
    pub fn entries(&self) -> &[FunctionEntry] {
        &self.functions.entries
    }

    /// Identifier of the entry at `index`.
    pub fn entry_id_at(&self, index: usize) -> Option<EntryId> {
        self.functions.entries.get(index).map(|e| e.id)
    }

    /// Append a 2D function. Blank input is ignored.
    pub fn add_function(&mut self, expression: &str) -> Effect {
        let expression = expression.trim();
        if expression.is_empty() {
            return Effect::Nothing;
        }

        let color = LINE_COLORS[self.functions.entries.len() % LINE_COLORS.len()];
        let id = self.allocate_id();
        self.functions.entries.push(FunctionEntry {
            id,
            expression: expression.to_string(),
            color,
            visible: true,
        });
        self.rebuild(Mode::TwoD)
    }

    /// Show or hide a 2D function.
    pub fn toggle_visible(&mut self, id: EntryId) -> Effect {
        match self.functions.entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.visible = !entry.visible;
                self.rebuild(Mode::TwoD)
            },
            None => Effect::Nothing,
        }
    }

    /// Drop a 2D function. Remaining entries keep their order and colors.
    pub fn remove_function(&mut self, id: EntryId) -> Effect {
        let before = self.functions.entries.len();
        self.functions.entries.retain(|e| e.id != id);
        if self.functions.entries.len() == before {
            return Effect::Nothing;
        }
        self.rebuild(Mode::TwoD)
    }

    /// The 3D expression, if any.
    pub fn active_function(&self) -> Option<&str> {
        self.surface.active.as_deref()
    }

    /// Replace the 3D expression. Blank input is ignored.
    pub fn set_active_function(&mut self, expression: &str) -> Effect {
        let expression = expression.trim();
        if expression.is_empty() {
            return Effect::Nothing;
        }
        self.surface.active = Some(expression.to_string());
        self.rebuild(Mode::ThreeD)
    }

    /// Settings of a tab.
    pub fn settings(&self, tab: Mode) -> &TabSettings {
        match tab {
            Mode::TwoD => &self.functions.settings,
            Mode::ThreeD => &self.surface.settings,
        }
    }

    /// 3D view angles.
    pub fn rotation(&self) -> &Rotation {
        &self.surface.rotation
    }

    /// 3D palette.
    pub fn palette(&self) -> Palette {
        self.surface.palette
    }

    /// Apply a settings edit to the current tab.
    ///
    /// Renders only when the tab already has something to draw.
    pub fn apply(&mut self, setting: Setting) -> Effect {
        let tab = self.tab;
        if !self.apply_to(tab, setting) {
            return Effect::Nothing;
        }
        if self.has_content(tab) {
            Effect::Render
        } else {
            Effect::Nothing
        }
    }

    /// Replace the current tab's content with the next canned example.
    pub fn cycle_example(&mut self) -> Effect {
        match self.tab {
            Mode::TwoD => {
                let example = EXAMPLES_2D[self.functions.example_index];
                self.functions.example_index = (self.functions.example_index + 1) % EXAMPLES_2D.len();

                let id = self.allocate_id();
                self.functions.entries = vec![FunctionEntry {
                    id,
                    expression: example.expression.to_string(),
                    color: LINE_COLORS[0],
                    visible: true,
                }];
            },
            Mode::ThreeD => {
                let example = EXAMPLES_3D[self.surface.example_index];
                self.surface.example_index = (self.surface.example_index + 1) % EXAMPLES_3D.len();
                self.surface.active = Some(example.expression.to_string());
            },
        }
        self.rebuild(self.tab)
    }

    /// The example [`cycle_example`](Self::cycle_example) will load next.
    pub fn next_example(&self) -> Example {
        match self.tab {
            Mode::TwoD => EXAMPLES_2D[self.functions.example_index],
            Mode::ThreeD => EXAMPLES_3D[self.surface.example_index],
        }
    }

    /// Re-render the current tab on request.
    pub fn refresh(&self) -> Effect {
        if self.has_content(self.tab) {
            Effect::Render
        } else {
            Effect::Nothing
        }
    }

    /// Whether a tab has anything to draw.
    pub fn has_content(&self, tab: Mode) -> bool {
        self.plot_config(tab).is_renderable()
    }

    /// Snapshot of a tab for the script builder.
    pub fn plot_config(&self, tab: Mode) -> PlotConfig {
        let settings = self.settings(tab);
        let mut config = PlotConfig {
            mode: tab,
            ranges: settings.ranges.clone(),
            labels: settings.labels.clone(),
            grid: settings.grid,
            ..PlotConfig::default()
        };

        match tab {
            Mode::TwoD => {
                config.curves = self
                    .functions
                    .entries
                    .iter()
                    .map(|e| Curve {
                        expression: e.expression.clone(),
                        color: e.color,
                        visible: e.visible,
                    })
                    .collect();
            },
            Mode::ThreeD => {
                config.surface = self.surface.active.clone();
                config.rotation = self.surface.rotation.clone();
                config.palette = self.surface.palette;
            },
        }
        config
    }

    fn rebuild(&self, tab: Mode) -> Effect {
        if self.has_content(tab) {
            Effect::Render
        } else {
            Effect::ClearDisplay
        }
    }

    fn allocate_id(&mut self) -> EntryId {
        self.next_id += 1;
        EntryId(self.next_id)
    }

    /// Returns false when the setting does not exist on `tab`.
    fn apply_to(&mut self, tab: Mode, setting: Setting) -> bool {
        let is_3d = tab == Mode::ThreeD;
        let settings = match tab {
            Mode::TwoD => &mut self.functions.settings,
            Mode::ThreeD => &mut self.surface.settings,
        };

        match setting {
            Setting::ToggleGrid => settings.grid = !settings.grid,
            Setting::Label(Axis::Z, _) | Setting::RangeMin(Axis::Z, _) | Setting::RangeMax(Axis::Z, _)
                if !is_3d =>
            {
                return false;
            },
            Setting::Label(axis, text) => *settings.labels.get_mut(axis) = text,
            Setting::RangeMin(axis, text) => settings.ranges.get_mut(axis).min = text,
            Setting::RangeMax(axis, text) => settings.ranges.get_mut(axis).max = text,
            Setting::RotationX(_) | Setting::RotationZ(_) | Setting::CyclePalette if !is_3d => {
                return false;
            },
            Setting::RotationX(text) => self.surface.rotation.x = text,
            Setting::RotationZ(text) => self.surface.rotation.z = text,
            Setting::CyclePalette => self.surface.palette = self.surface.palette.next(),
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::{build_script, RangeSpec};
    use std::path::Path;

    fn session_with(expressions: &[&str]) -> PlotSession {
        let mut session = PlotSession::new();
        for expr in expressions {
            session.add_function(expr);
        }
        session
    }

    fn expressions(session: &PlotSession) -> Vec<&str> {
        session.entries().iter().map(|e| e.expression.as_str()).collect()
    }

    #[test]
    fn add_assigns_cycling_colors() {
        let session = session_with(&["a", "b", "c", "d", "e", "f", "g"]);
        let colors: Vec<_> = session.entries().iter().map(|e| e.color).collect();
        assert_eq!(&colors[..6], &LINE_COLORS);
        assert_eq!(colors[6], LINE_COLORS[0]);
    }

    #[test]
    fn blank_add_is_ignored() {
        let mut session = PlotSession::new();
        assert_eq!(session.add_function("   "), Effect::Nothing);
        assert_eq!(session.add_function(""), Effect::Nothing);
        assert!(session.entries().is_empty());
        assert_eq!(session.add_function("x**2"), Effect::Render);
    }

    #[test]
    fn remove_keeps_order_and_colors() {
        let mut session = session_with(&["a", "b", "c", "d"]);
        let before: Vec<_> = session.entries().to_vec();

        let id = session.entry_id_at(1).unwrap();
        assert_eq!(session.remove_function(id), Effect::Render);

        assert_eq!(expressions(&session), vec!["a", "c", "d"]);
        let colors: Vec<_> = session.entries().iter().map(|e| e.color).collect();
        assert_eq!(colors, vec![before[0].color, before[2].color, before[3].color]);
    }

    #[test]
    fn removing_last_function_clears_display() {
        let mut session = session_with(&["x"]);
        let id = session.entry_id_at(0).unwrap();
        assert_eq!(session.remove_function(id), Effect::ClearDisplay);
        assert_eq!(session.remove_function(id), Effect::Nothing);
    }

    #[test]
    fn ids_survive_index_shifts() {
        let mut session = session_with(&["a", "b", "c"]);
        let c = session.entry_id_at(2).unwrap();
        session.remove_function(session.entry_id_at(0).unwrap());
        session.toggle_visible(c);
        let entry = session.entries().iter().find(|e| e.id == c).unwrap();
        assert_eq!(entry.expression, "c");
        assert!(!entry.visible);
    }

    #[test]
    fn hiding_everything_clears_display() {
        let mut session = session_with(&["a", "b"]);
        let a = session.entry_id_at(0).unwrap();
        let b = session.entry_id_at(1).unwrap();
        assert_eq!(session.toggle_visible(a), Effect::Render);
        assert_eq!(session.toggle_visible(b), Effect::ClearDisplay);
        assert_eq!(session.toggle_visible(b), Effect::Render);
    }

    #[test]
    fn example_cycle_replaces_list() {
        let mut session = session_with(&["a", "b"]);
        assert_eq!(session.next_example().name, "Linear");

        assert_eq!(session.cycle_example(), Effect::Render);
        assert_eq!(expressions(&session), vec![EXAMPLES_2D[0].expression]);
        assert_eq!(session.entries()[0].color, LINE_COLORS[0]);
        assert_eq!(session.next_example().name, "Quadratic");

        for _ in 1..EXAMPLES_2D.len() {
            session.cycle_example();
            assert_eq!(session.entries().len(), 1);
        }
        assert_eq!(expressions(&session), vec![EXAMPLES_2D[EXAMPLES_2D.len() - 1].expression]);

        session.cycle_example();
        assert_eq!(expressions(&session), vec![EXAMPLES_2D[0].expression]);
    }

    #[test]
    fn example_cycle_in_3d_sets_active_function() {
        let mut session = PlotSession::new();
        session.switch_tab(Mode::ThreeD);
        assert_eq!(session.cycle_example(), Effect::Render);
        assert_eq!(session.active_function(), Some("x**2 + y**2"));
        assert_eq!(session.next_example().name, "Saddle");
        assert!(session.entries().is_empty());
    }

    #[test]
    fn set_active_function_replaces() {
        let mut session = PlotSession::new();
        assert_eq!(session.set_active_function(" "), Effect::Nothing);
        assert_eq!(session.set_active_function("x*y"), Effect::Render);
        assert_eq!(session.set_active_function("x-y"), Effect::Render);
        assert_eq!(session.active_function(), Some("x-y"));
    }

    #[test]
    fn settings_render_only_with_content() {
        let mut session = PlotSession::new();
        assert_eq!(session.apply(Setting::ToggleGrid), Effect::Nothing);
        assert!(!session.settings(Mode::TwoD).grid);

        session.add_function("x");
        assert_eq!(
            session.apply(Setting::RangeMin(Axis::X, "-1".into())),
            Effect::Render
        );
        assert_eq!(session.settings(Mode::TwoD).ranges.x, RangeSpec::new("-1", ""));
    }

    #[test]
    fn surface_settings_ignored_on_2d_tab() {
        let mut session = session_with(&["x"]);
        assert_eq!(session.apply(Setting::CyclePalette), Effect::Nothing);
        assert_eq!(session.apply(Setting::RotationX("10".into())), Effect::Nothing);
        assert_eq!(session.apply(Setting::Label(Axis::Z, "h".into())), Effect::Nothing);
        assert_eq!(session.palette(), Palette::Default);
        assert_eq!(session.rotation(), &Rotation::default());
    }

    #[test]
    fn palette_cycles_on_3d_tab() {
        let mut session = PlotSession::new();
        session.switch_tab(Mode::ThreeD);
        session.set_active_function("x*y");
        for _ in 0..Palette::ALL.len() {
            assert_eq!(session.apply(Setting::CyclePalette), Effect::Render);
        }
        assert_eq!(session.palette(), Palette::Default);
    }

    #[test]
    fn switching_tabs_preserves_state() {
        let mut session = session_with(&["x**2", "sin(x)"]);
        session.toggle_visible(session.entry_id_at(1).unwrap());
        session.apply(Setting::Label(Axis::X, "time".into()));
        session.apply(Setting::RangeMax(Axis::Y, "4".into()));
        let entries = session.entries().to_vec();
        let settings = session.settings(Mode::TwoD).clone();

        assert_eq!(session.switch_tab(Mode::ThreeD), Effect::Nothing);
        session.set_active_function("x*y");
        session.apply(Setting::ToggleGrid);
        session.apply(Setting::Label(Axis::X, "east".into()));
        assert_eq!(session.switch_tab(Mode::TwoD), Effect::Nothing);

        assert_eq!(session.entries(), &entries[..]);
        assert_eq!(session.settings(Mode::TwoD), &settings);
        assert_eq!(session.settings(Mode::ThreeD).labels.x, "east");
        assert!(!session.settings(Mode::ThreeD).grid);
    }

    #[test]
    fn refresh_needs_content() {
        let mut session = PlotSession::new();
        assert_eq!(session.refresh(), Effect::Nothing);
        session.add_function("x");
        assert_eq!(session.refresh(), Effect::Render);
        session.switch_tab(Mode::ThreeD);
        assert_eq!(session.refresh(), Effect::Nothing);
    }

    #[test]
    fn default_session_script() {
        let session = session_with(&["x**2", "sin(x)"]);
        let script = build_script(&session.plot_config(Mode::TwoD), Path::new("/tmp/p.png")).unwrap();
        assert_eq!(script.matches(" with lines lw 2 ").count(), 2);
        assert!(script.find("x**2 title").unwrap() < script.find("sin(x) title").unwrap());
        assert!(!script.contains('['));
        assert!(script.contains("set grid\n"));
        assert!(script.contains("set xlabel \"x\"\n"));
        assert!(script.contains("set ylabel \"y\"\n"));
    }
}
