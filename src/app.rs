//! Application state and logic.
//!
//! [`App`] binds the session to the renderer and the image exchange: session
//! transitions come back as [`Effect`]s, effects start [`RenderTask`]s, and
//! [`App::tick`] collects finished work. All failures end up in
//! [`App::status`]; none of them stop the application.

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use image::DynamicImage;
use ratatui_image::picker::Picker;
use ratatui_image::protocol::StatefulProtocol;
use serde::Deserialize;

use crate::config::Config;
use crate::error::{PlotboxError, Result};
use crate::exchange::{self, SaveDialog, SystemClipboard};
use crate::input::InputState;
use crate::render::{RenderOutcome, RenderTask, Renderer, Workspace};
use crate::script::{build_script, Axis, Mode};
use crate::session::{Effect, PlotSession, Setting};
use crate::task::{Poll, Task};

/// Application theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Theme {
    /// Gruvbox dark theme.
    #[serde(rename = "dark")]
    GruvboxDark,
    /// Gruvbox light theme.
    #[serde(rename = "light")]
    GruvboxLight,
}

impl Theme {
    /// Get the next theme in the cycle.
    pub fn next(self) -> Self {
        match self {
            Theme::GruvboxDark => Theme::GruvboxLight,
            Theme::GruvboxLight => Theme::GruvboxDark,
        }
    }

    /// Get the theme name.
    pub fn name(self) -> &'static str {
        match self {
            Theme::GruvboxDark => "Gruvbox Dark",
            Theme::GruvboxLight => "Gruvbox Light",
        }
    }
}

/// An editable field on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// The function entry.
    Expression,
    /// Lower range bound.
    RangeMin(Axis),
    /// Upper range bound.
    RangeMax(Axis),
    /// Axis label.
    Label(Axis),
    /// 3D elevation.
    RotationX,
    /// 3D azimuth.
    RotationZ,
}

impl Field {
    /// Fields shown on a tab, in focus order.
    pub fn all(mode: Mode) -> Vec<Field> {
        let axes: &[Axis] = match mode {
            Mode::TwoD => &[Axis::X, Axis::Y],
            Mode::ThreeD => &[Axis::X, Axis::Y, Axis::Z],
        };
        let mut fields = vec![Field::Expression];
        for &axis in axes {
            fields.push(Field::RangeMin(axis));
            fields.push(Field::RangeMax(axis));
        }
        fields.extend(axes.iter().map(|&axis| Field::Label(axis)));
        if mode == Mode::ThreeD {
            fields.push(Field::RotationX);
            fields.push(Field::RotationZ);
        }
        fields
    }

    /// Short caption.
    pub fn caption(self) -> String {
        match self {
            Field::Expression => "function".to_string(),
            Field::RangeMin(axis) => format!("{} min", axis.letter()),
            Field::RangeMax(axis) => format!("{} max", axis.letter()),
            Field::Label(axis) => format!("{} label", axis.letter()),
            Field::RotationX => "rot x".to_string(),
            Field::RotationZ => "rot z".to_string(),
        }
    }

    fn into_setting(self, text: String) -> Option<Setting> {
        match self {
            Field::Expression => None,
            Field::RangeMin(axis) => Some(Setting::RangeMin(axis, text)),
            Field::RangeMax(axis) => Some(Setting::RangeMax(axis, text)),
            Field::Label(axis) => Some(Setting::Label(axis, text)),
            Field::RotationX => Some(Setting::RotationX(text)),
            Field::RotationZ => Some(Setting::RotationZ(text)),
        }
    }
}

/// Keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Single-key commands.
    Normal,
    /// Typing into a field.
    Editing(Field),
}

/// Display state of one tab.
#[derive(Default)]
pub struct TabView {
    /// Last successfully rendered image file.
    pub artifact: Option<PathBuf>,
    /// Decoded image of `artifact`.
    pub image: Option<DynamicImage>,
    /// Terminal graphics state built from `image` on first draw.
    pub protocol: Option<StatefulProtocol>,
    /// Render in progress.
    pub in_flight: Option<RenderTask>,
}

impl TabView {
    /// Drop the image and any running render. Returns false if there was
    /// nothing to drop.
    fn clear(&mut self) -> bool {
        let cancelled = match self.in_flight.take() {
            Some(task) => {
                task.cancel();
                true
            },
            None => false,
        };
        self.image = None;
        self.protocol = None;
        let removed = match self.artifact.take() {
            Some(old) => {
                let _ = crate::render::remove_if_present(&old);
                true
            },
            None => false,
        };
        cancelled || removed
    }
}

struct PendingSave {
    mode: Mode,
    task: Task<Result<Option<PathBuf>>>,
}

/// Application state.
pub struct App {
    /// Functions and settings of both tabs.
    pub session: PlotSession,
    /// Expression entry.
    pub input: InputState,
    /// Buffer of the settings field being edited.
    pub field_input: InputState,
    /// Keyboard focus.
    pub focus: Focus,
    /// Selected row of the 2D function list.
    pub selected: usize,
    /// Status message.
    pub status: String,
    /// Current theme.
    pub theme: Theme,
    /// Set when the user asked to quit.
    pub should_quit: bool,
    /// Terminal image protocol picker, if the terminal answered the query.
    pub picker: Option<Picker>,
    views: [TabView; 2],
    renderer: Renderer,
    workspace: Workspace,
    dialog: SaveDialog,
    clipboard: SystemClipboard,
    export_dir: PathBuf,
    pending_save: Option<PendingSave>,
}

impl App {
    /// Create a new application instance.
    pub fn new(config: &Config, picker: Option<Picker>) -> Result<Self> {
        let renderer = Renderer::new(config.renderer.clone()).with_settle(config.settle_timeout());
        Ok(Self {
            session: PlotSession::new(),
            input: InputState::new(),
            field_input: InputState::new(),
            focus: Focus::Normal,
            selected: 0,
            status: "Ready".to_string(),
            theme: config.theme,
            should_quit: false,
            picker,
            views: [TabView::default(), TabView::default()],
            renderer,
            workspace: Workspace::new()?,
            dialog: SaveDialog::new(config.dialog.clone()),
            clipboard: SystemClipboard::new(),
            export_dir: config
                .export_dir
                .clone()
                .unwrap_or_else(exchange::default_export_dir),
            pending_save: None,
        })
    }

    /// Current tab.
    pub fn tab(&self) -> Mode {
        self.session.tab()
    }

    /// Display state of a tab.
    pub fn view(&self, mode: Mode) -> &TabView {
        &self.views[Self::slot(mode)]
    }

    /// Mutable display state of a tab.
    pub fn view_mut(&mut self, mode: Mode) -> &mut TabView {
        &mut self.views[Self::slot(mode)]
    }

    /// Whether the current tab is rendering.
    pub fn is_rendering(&self) -> bool {
        self.view(self.tab()).in_flight.is_some()
    }

    fn slot(mode: Mode) -> usize {
        match mode {
            Mode::TwoD => 0,
            Mode::ThreeD => 1,
        }
    }

    /// Carry out a session effect on the current tab.
    pub fn apply_effect(&mut self, effect: Effect) {
        let mode = self.tab();
        match effect {
            Effect::Render => self.render(mode),
            Effect::ClearDisplay => self.clear_view(mode),
            Effect::Nothing => {},
        }
    }

    fn clear_view(&mut self, mode: Mode) {
        if self.view_mut(mode).clear() {
            self.status = "Graph cleared".to_string();
        }
    }

    /// Build the script for `mode` and start rendering it.
    ///
    /// A render already running for the same tab is cancelled.
    pub fn render(&mut self, mode: Mode) {
        let config = self.session.plot_config(mode);
        let output = self.workspace.next_output_path(mode);
        let Some(script) = build_script(&config, &output) else {
            self.clear_view(mode);
            return;
        };

        let request = self.workspace.request(mode, script);
        let task = self.renderer.start(request);
        let view = self.view_mut(mode);
        if let Some(previous) = view.in_flight.replace(task) {
            tracing::debug!("Superseding render #{}", previous.id());
            previous.cancel();
        }
        self.status = "Plotting...".to_string();
    }

    /// Collect finished renders and dialogs.
    pub fn tick(&mut self) {
        for mode in [Mode::TwoD, Mode::ThreeD] {
            let polled = match &self.view(mode).in_flight {
                Some(task) => task.poll(),
                None => continue,
            };
            match polled {
                Poll::Pending => {},
                Poll::Ready(outcome) => {
                    self.view_mut(mode).in_flight = None;
                    self.finish_render(mode, outcome);
                },
                Poll::Gone => self.view_mut(mode).in_flight = None,
            }
        }

        let polled = match &self.pending_save {
            Some(pending) => pending.task.poll(),
            None => return,
        };
        match polled {
            Poll::Pending => {},
            Poll::Ready(choice) => {
                if let Some(pending) = self.pending_save.take() {
                    self.finish_save(pending.mode, choice);
                }
            },
            Poll::Gone => self.pending_save = None,
        }
    }

    /// Whether any background work is outstanding.
    pub fn is_busy(&self) -> bool {
        self.pending_save.is_some() || self.views.iter().any(|v| v.in_flight.is_some())
    }

    fn finish_render(&mut self, mode: Mode, outcome: RenderOutcome) {
        match outcome {
            RenderOutcome::Success { artifact, .. } => match exchange::load_artifact(&artifact) {
                Ok(Some(image)) => {
                    let view = self.view_mut(mode);
                    if let Some(old) = view.artifact.replace(artifact) {
                        let _ = crate::render::remove_if_present(&old);
                    }
                    view.image = Some(image);
                    view.protocol = None;
                    self.status = "Graph updated".to_string();
                },
                Ok(None) => self.status = "Graph not generated. Try again.".to_string(),
                Err(e) => {
                    tracing::error!("Error displaying graph: {}", e);
                    self.status = format!("Error displaying graph: {}", e);
                },
            },
            RenderOutcome::Cancelled => {},
            other => {
                if let Err(e) = other.into_result() {
                    self.status = e.to_string();
                }
            },
        }
    }

    /// Export the current tab's image through the save dialog.
    pub fn save_png(&mut self) {
        let mode = self.tab();
        let Some(artifact) = self.view(mode).artifact.clone() else {
            self.status = "No graph to save. Generate a graph first.".to_string();
            return;
        };
        if !artifact.is_file() {
            self.status = "Graph not generated. Try again.".to_string();
            return;
        }
        if self.pending_save.is_some() {
            self.status = "Save dialog already open".to_string();
            return;
        }
        if let Err(e) = exchange::ensure_export_dir(&self.export_dir) {
            self.status = format!("Error saving: {}", e);
            return;
        }

        let default_path = exchange::default_export_path(&self.export_dir, mode, chrono::Local::now());
        let dialog = self.dialog.clone();
        self.pending_save = Some(PendingSave {
            mode,
            task: Task::spawn(move || dialog.pick(&default_path)),
        });
        self.status = "Choose where to save...".to_string();
    }

    fn finish_save(&mut self, mode: Mode, choice: Result<Option<PathBuf>>) {
        let destination = match choice {
            Ok(Some(path)) => path,
            Ok(None) => {
                self.status = "Save cancelled".to_string();
                return;
            },
            Err(e) => {
                tracing::error!("{}", e);
                self.status = e.to_string();
                return;
            },
        };

        let Some(artifact) = self.view(mode).artifact.clone() else {
            self.status = "Graph disappeared. Generate it again.".to_string();
            return;
        };
        self.status = match exchange::export_artifact(&artifact, &destination) {
            Ok(()) => format!("Graph saved: {}", destination.display()),
            Err(PlotboxError::ArtifactMissing { .. }) => {
                "Graph disappeared. Generate it again.".to_string()
            },
            Err(e) => {
                tracing::error!("Export failed: {}", e);
                e.to_string()
            },
        };
    }

    /// Copy the current tab's image to the clipboard.
    pub fn copy_image(&mut self) {
        let Some(artifact) = self.view(self.tab()).artifact.clone() else {
            self.status = "No graph to copy. Generate a graph first.".to_string();
            return;
        };
        self.status = match exchange::copy_artifact_to_clipboard(&artifact, &mut self.clipboard) {
            Ok(()) => "Graph copied to clipboard!".to_string(),
            Err(PlotboxError::ArtifactMissing { .. }) => "Graph not generated. Try again.".to_string(),
            Err(e) => {
                tracing::error!("Clipboard copy failed: {}", e);
                format!("Error copying graph: {}", e)
            },
        };
    }

    /// Show another tab. The tab keeps whatever it rendered last.
    pub fn switch_tab(&mut self, mode: Mode) {
        if self.tab() == mode {
            return;
        }
        let effect = self.session.switch_tab(mode);
        self.apply_effect(effect);
        self.focus = Focus::Normal;
        self.input.clear();
        self.selected = 0;
        self.status = mode.title().to_string();
    }

    /// Submit the expression entry.
    pub fn submit_expression(&mut self) {
        let text = self.input.take();
        let effect = match self.tab() {
            Mode::TwoD => self.session.add_function(&text),
            Mode::ThreeD => self.session.set_active_function(&text),
        };
        if self.tab() == Mode::TwoD && effect != Effect::Nothing {
            self.selected = self.session.entries().len().saturating_sub(1);
        }
        self.apply_effect(effect);
    }

    /// Flip visibility of the selected 2D function.
    pub fn toggle_selected(&mut self) {
        if let Some(id) = self.session.entry_id_at(self.selected) {
            let effect = self.session.toggle_visible(id);
            self.apply_effect(effect);
        }
    }

    /// Remove the selected 2D function.
    pub fn remove_selected(&mut self) {
        if let Some(id) = self.session.entry_id_at(self.selected) {
            let effect = self.session.remove_function(id);
            self.selected = self
                .selected
                .min(self.session.entries().len().saturating_sub(1));
            self.apply_effect(effect);
        }
    }

    /// Load the next canned example.
    pub fn cycle_example(&mut self) {
        let example = self.session.next_example();
        let effect = self.session.cycle_example();
        self.selected = 0;
        self.apply_effect(effect);
        self.status = format!("Example: {}", example.name);
    }

    /// Apply a settings change.
    pub fn change_setting(&mut self, setting: Setting) {
        let effect = self.session.apply(setting);
        self.apply_effect(effect);
    }

    /// Re-render the current tab.
    pub fn refresh(&mut self) {
        match self.session.refresh() {
            Effect::Nothing => {
                self.status = match self.tab() {
                    Mode::TwoD => "Add a function first to see the graph",
                    Mode::ThreeD => "Enter a 3D function first",
                }
                .to_string();
            },
            effect => self.apply_effect(effect),
        }
    }

    /// Cancel outstanding renders before exit.
    pub fn shutdown(&mut self) {
        for view in &mut self.views {
            if let Some(task) = view.in_flight.take() {
                task.cancel();
            }
        }
    }

    /// Cycle to the next theme.
    pub fn cycle_theme(&mut self) {
        self.theme = self.theme.next();
        self.status = format!("Theme: {}", self.theme.name());
    }

    /// Current text of a field.
    pub fn field_value(&self, field: Field) -> String {
        let settings = self.session.settings(self.tab());
        match field {
            Field::Expression => self.input.text.clone(),
            Field::RangeMin(axis) => settings.ranges.get(axis).min.clone(),
            Field::RangeMax(axis) => settings.ranges.get(axis).max.clone(),
            Field::Label(axis) => settings.labels.get(axis).to_string(),
            Field::RotationX => self.session.rotation().x.clone(),
            Field::RotationZ => self.session.rotation().z.clone(),
        }
    }

    /// Start editing `field`.
    pub fn begin_edit(&mut self, field: Field) {
        if field != Field::Expression {
            self.field_input = InputState::with_text(self.field_value(field));
        }
        self.focus = Focus::Editing(field);
        self.status = format!("Editing {}", field.caption());
    }

    /// The buffer of the field being edited.
    pub fn active_input(&mut self) -> Option<&mut InputState> {
        match self.focus {
            Focus::Normal => None,
            Focus::Editing(Field::Expression) => Some(&mut self.input),
            Focus::Editing(_) => Some(&mut self.field_input),
        }
    }

    /// Commit the field being edited. Settings only re-render when changed.
    pub fn commit_edit(&mut self) {
        let Focus::Editing(field) = self.focus else {
            return;
        };
        if field == Field::Expression {
            self.submit_expression();
            return;
        }

        let text = self.field_input.text.trim().to_string();
        if text == self.field_value(field) {
            return;
        }
        if let Some(setting) = field.into_setting(text) {
            self.change_setting(setting);
        }
    }

    /// Commit and move focus to the next (or previous) field.
    pub fn cycle_field(&mut self, forward: bool) {
        let Focus::Editing(field) = self.focus else {
            return;
        };
        if field != Field::Expression {
            self.commit_edit();
        }
        let fields = Field::all(self.tab());
        let index = fields.iter().position(|&f| f == field).unwrap_or(0);
        let next = if forward {
            (index + 1) % fields.len()
        } else {
            (index + fields.len() - 1) % fields.len()
        };
        self.begin_edit(fields[next]);
    }

    /// Handle a key event.
    pub fn handle_key(&mut self, key: KeyEvent) {
        match self.focus {
            Focus::Editing(field) => self.handle_key_editing(field, key),
            Focus::Normal => self.handle_key_normal(key),
        }
    }

    fn handle_key_editing(&mut self, field: Field, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc) => {
                self.focus = Focus::Normal;
                self.status = "Edit cancelled".to_string();
            },
            (_, KeyCode::Enter) => {
                self.commit_edit();
                if field != Field::Expression {
                    self.focus = Focus::Normal;
                }
            },
            (_, KeyCode::Tab) => self.cycle_field(true),
            (_, KeyCode::BackTab) => self.cycle_field(false),
            (_, KeyCode::Backspace) => self.edit(InputState::backspace),
            (_, KeyCode::Delete) => self.edit(InputState::delete),
            (_, KeyCode::Left) => self.edit(InputState::move_left),
            (_, KeyCode::Right) => self.edit(InputState::move_right),
            (_, KeyCode::Home) => self.edit(InputState::move_home),
            (_, KeyCode::End) => self.edit(InputState::move_end),
            (KeyModifiers::CONTROL, KeyCode::Char('u')) => self.edit(InputState::clear),
            (KeyModifiers::NONE, KeyCode::Char(c)) | (KeyModifiers::SHIFT, KeyCode::Char(c)) => {
                if let Some(input) = self.active_input() {
                    input.insert(c);
                }
            },
            _ => {},
        }
    }

    fn edit(&mut self, op: fn(&mut InputState)) {
        if let Some(input) = self.active_input() {
            op(input);
        }
    }

    fn handle_key_normal(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            // Quit
            (KeyModifiers::NONE, KeyCode::Char('q')) => self.should_quit = true,
            (KeyModifiers::CONTROL, KeyCode::Char('c')) => self.should_quit = true,

            // Tabs
            (KeyModifiers::NONE, KeyCode::Char('1')) => self.switch_tab(Mode::TwoD),
            (KeyModifiers::NONE, KeyCode::Char('2')) => self.switch_tab(Mode::ThreeD),
            (KeyModifiers::NONE, KeyCode::Tab) => {
                let next = match self.tab() {
                    Mode::TwoD => Mode::ThreeD,
                    Mode::ThreeD => Mode::TwoD,
                };
                self.switch_tab(next);
            },

            // Editing
            (KeyModifiers::NONE, KeyCode::Char('a'))
            | (KeyModifiers::NONE, KeyCode::Char('i'))
            | (KeyModifiers::NONE, KeyCode::Enter) => self.begin_edit(Field::Expression),
            (KeyModifiers::NONE, KeyCode::Char('f')) => {
                let fields = Field::all(self.tab());
                self.begin_edit(fields[1]);
            },

            // Function list
            (KeyModifiers::NONE, KeyCode::Up) | (KeyModifiers::NONE, KeyCode::Char('k')) => {
                self.selected = self.selected.saturating_sub(1);
            },
            (KeyModifiers::NONE, KeyCode::Down) | (KeyModifiers::NONE, KeyCode::Char('j')) => {
                if self.selected + 1 < self.session.entries().len() {
                    self.selected += 1;
                }
            },
            (KeyModifiers::NONE, KeyCode::Char(' ')) => self.toggle_selected(),
            (KeyModifiers::NONE, KeyCode::Char('d'))
            | (KeyModifiers::NONE, KeyCode::Char('x'))
            | (KeyModifiers::NONE, KeyCode::Delete) => self.remove_selected(),

            // Plot
            (KeyModifiers::NONE, KeyCode::Char('e')) => self.cycle_example(),
            (KeyModifiers::NONE, KeyCode::Char('g')) => self.change_setting(Setting::ToggleGrid),
            (KeyModifiers::NONE, KeyCode::Char('p')) => {
                if self.tab() == Mode::ThreeD {
                    self.change_setting(Setting::CyclePalette);
                    self.status = format!("Palette: {}", self.session.palette().name());
                }
            },
            (KeyModifiers::NONE, KeyCode::Char('r')) => self.refresh(),

            // Export
            (KeyModifiers::NONE, KeyCode::Char('s')) => self.save_png(),
            (KeyModifiers::NONE, KeyCode::Char('y')) => self.copy_image(),

            // Appearance
            (KeyModifiers::SHIFT, KeyCode::Char('T')) => self.cycle_theme(),
            (KeyModifiers::SHIFT, KeyCode::Char('?')) | (KeyModifiers::NONE, KeyCode::Char('?')) => {
                self.status = "Help: a=add, f=fields, space=show/hide, d=remove, e=example, g=grid, p=palette, r=refresh, s=save, y=copy, 1/2=tab, q=quit".to_string();
            },

            _ => {},
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn app() -> App {
        App::new(&Config::default(), None).unwrap()
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn theme_round_trip() {
        assert_eq!(Theme::GruvboxDark.next().next(), Theme::GruvboxDark);
        assert_eq!(Theme::GruvboxLight.name(), "Gruvbox Light");
    }

    #[test]
    fn field_order_per_tab() {
        let two_d = Field::all(Mode::TwoD);
        assert_eq!(two_d.len(), 7);
        assert_eq!(two_d[0], Field::Expression);
        assert!(!two_d.contains(&Field::RotationX));

        let three_d = Field::all(Mode::ThreeD);
        assert_eq!(three_d.len(), 12);
        assert_eq!(three_d.last(), Some(&Field::RotationZ));
    }

    #[test]
    fn save_and_copy_without_graph() {
        let mut app = app();
        app.save_png();
        assert_eq!(app.status, "No graph to save. Generate a graph first.");
        app.copy_image();
        assert_eq!(app.status, "No graph to copy. Generate a graph first.");
    }

    #[test]
    fn refresh_on_empty_tab_explains() {
        let mut app = app();
        app.refresh();
        assert_eq!(app.status, "Add a function first to see the graph");
        app.switch_tab(Mode::ThreeD);
        app.refresh();
        assert_eq!(app.status, "Enter a 3D function first");
        assert!(!app.is_busy());
    }

    #[test]
    fn typed_expression_is_added_on_enter() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.focus, Focus::Editing(Field::Expression));
        type_text(&mut app, "  sin(x) ");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.session.entries().len(), 1);
        assert_eq!(app.session.entries()[0].expression, "sin(x)");
        assert!(app.input.text.is_empty());
        assert!(app.is_rendering());
        app.shutdown();
    }

    #[test]
    fn blank_expression_does_nothing() {
        let mut app = app();
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "   ");
        press(&mut app, KeyCode::Enter);
        assert!(app.session.entries().is_empty());
        assert!(!app.is_busy());
    }

    #[test]
    fn settings_edit_without_content_does_not_render() {
        let mut app = app();
        app.begin_edit(Field::RangeMin(Axis::X));
        type_text(&mut app, "-5");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.focus, Focus::Normal);
        assert_eq!(app.session.settings(Mode::TwoD).ranges.x.min, "-5");
        assert!(!app.is_busy());
    }

    #[test]
    fn escape_discards_field_edit() {
        let mut app = app();
        app.begin_edit(Field::Label(Axis::Y));
        type_text(&mut app, "amplitude");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.session.settings(Mode::TwoD).labels.y, "");
    }

    #[test]
    fn tab_moves_between_fields_and_commits() {
        let mut app = app();
        app.begin_edit(Field::RangeMin(Axis::X));
        type_text(&mut app, "0");
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, Focus::Editing(Field::RangeMax(Axis::X)));
        assert_eq!(app.session.settings(Mode::TwoD).ranges.x.min, "0");

        app.handle_key(KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT));
        assert_eq!(app.focus, Focus::Editing(Field::RangeMin(Axis::X)));
        assert_eq!(app.field_input.text, "0");
    }

    #[test]
    fn tabs_keep_their_own_inputs() {
        let mut app = app();
        type_text(&mut app, "e");
        assert_eq!(app.session.entries()[0].expression, "2*x + 3");
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.tab(), Mode::ThreeD);
        assert!(app.session.active_function().is_none());
        press(&mut app, KeyCode::Char('1'));
        assert_eq!(app.session.entries().len(), 1);
        app.shutdown();
    }

    #[test]
    fn remove_keeps_selection_in_bounds() {
        let mut app = app();
        for expr in ["x", "x**2"] {
            app.input = InputState::with_text(expr);
            app.submit_expression();
        }
        assert_eq!(app.selected, 1);
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.selected, 0);
        assert_eq!(app.session.entries()[0].expression, "x");
        app.shutdown();
    }

    #[cfg(unix)]
    mod rendering {
        use super::*;
        use std::fs;
        use std::os::unix::fs::PermissionsExt;

        /// An app whose renderer copies a real PNG to the scripted output.
        fn app_with_fake_renderer(bin: &std::path::Path, body: &str) -> App {
            let fixture = bin.join("fixture.png");
            image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]))
                .save(&fixture)
                .unwrap();
            let script = bin.join("fake-gnuplot");
            let body = body
                .replace("{fixture}", &fixture.to_string_lossy())
                .replace("{log}", &bin.join("renders.log").to_string_lossy());
            fs::write(&script, format!("#!/bin/sh\n{}\n", body)).unwrap();
            fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

            let config = Config {
                renderer: script.to_string_lossy().into_owned(),
                dialog: "false".to_string(),
                export_dir: Some(bin.join("exports")),
                ..Config::default()
            };
            App::new(&config, None).unwrap()
        }

        const COPIES_FIXTURE: &str =
            r#"out=$(sed -n 's/^set output "\(.*\)"$/\1/p' "$1"); cp "{fixture}" "$out""#;

        fn settle(app: &mut App) {
            let deadline = Instant::now() + Duration::from_secs(10);
            while app.is_busy() && Instant::now() < deadline {
                app.tick();
                std::thread::sleep(Duration::from_millis(10));
            }
        }

        #[test]
        fn retrigger_cancels_running_render() {
            let bin = tempfile::tempdir().unwrap();
            let mut app = app_with_fake_renderer(
                bin.path(),
                r#"out=$(sed -n 's/^set output "\(.*\)"$/\1/p' "$1"); sleep 0.3; cp "{fixture}" "$out"; echo "done $out" >> "{log}""#,
            );
            app.input = InputState::with_text("x");
            app.submit_expression();
            let first = app.view(Mode::TwoD).in_flight.as_ref().unwrap().output_path().to_path_buf();

            app.change_setting(Setting::ToggleGrid);
            let second = app.view(Mode::TwoD).in_flight.as_ref().unwrap().output_path().to_path_buf();
            assert_ne!(first, second);

            settle(&mut app);
            // Outlast the superseded renderer's sleep, then collect again.
            std::thread::sleep(Duration::from_millis(500));
            app.tick();

            assert_eq!(app.status, "Graph updated");
            assert_eq!(app.view(Mode::TwoD).artifact.as_deref(), Some(second.as_path()));
            assert!(!first.exists());
            let log = fs::read_to_string(bin.path().join("renders.log")).unwrap();
            assert!(log.contains(&format!("done {}", second.display())));
            assert!(!log.contains(&format!("done {}", first.display())));
        }

        #[test]
        fn clearing_a_running_render_resets_status() {
            let bin = tempfile::tempdir().unwrap();
            let mut app = app_with_fake_renderer(bin.path(), "sleep 5");
            app.input = InputState::with_text("x");
            app.submit_expression();
            assert_eq!(app.status, "Plotting...");

            app.toggle_selected();
            for _ in 0..5 {
                app.tick();
            }
            assert!(!app.is_busy());
            assert_eq!(app.status, "Graph cleared");
        }

        #[test]
        fn finished_render_is_displayed() {
            let bin = tempfile::tempdir().unwrap();
            let mut app = app_with_fake_renderer(bin.path(), COPIES_FIXTURE);
            app.input = InputState::with_text("sin(x)");
            app.submit_expression();
            settle(&mut app);

            let view = app.view(Mode::TwoD);
            assert_eq!(app.status, "Graph updated");
            assert!(view.artifact.as_ref().is_some_and(|p| p.is_file()));
            assert_eq!(view.image.as_ref().map(|i| (i.width(), i.height())), Some((3, 2)));
        }

        #[test]
        fn new_render_replaces_previous_artifact() {
            let bin = tempfile::tempdir().unwrap();
            let mut app = app_with_fake_renderer(bin.path(), COPIES_FIXTURE);
            app.input = InputState::with_text("x");
            app.submit_expression();
            settle(&mut app);
            let first = app.view(Mode::TwoD).artifact.clone().unwrap();

            app.change_setting(Setting::ToggleGrid);
            settle(&mut app);
            let second = app.view(Mode::TwoD).artifact.clone().unwrap();
            assert_ne!(first, second);
            assert!(!first.exists());
            assert!(second.is_file());
        }

        #[test]
        fn renderer_failure_is_reported() {
            let bin = tempfile::tempdir().unwrap();
            let mut app = app_with_fake_renderer(bin.path(), "exit 1");
            app.input = InputState::with_text("sin(");
            app.submit_expression();
            settle(&mut app);
            assert_eq!(app.status, "Gnuplot failed. Check your function syntax.");
            assert!(app.view(Mode::TwoD).image.is_none());
        }

        #[test]
        fn hiding_last_curve_clears_display() {
            let bin = tempfile::tempdir().unwrap();
            let mut app = app_with_fake_renderer(bin.path(), COPIES_FIXTURE);
            app.input = InputState::with_text("x");
            app.submit_expression();
            settle(&mut app);
            let artifact = app.view(Mode::TwoD).artifact.clone().unwrap();

            app.toggle_selected();
            assert!(app.view(Mode::TwoD).image.is_none());
            assert!(!artifact.exists());
        }

        #[test]
        fn cancelled_save_dialog_keeps_graph() {
            let bin = tempfile::tempdir().unwrap();
            let mut app = app_with_fake_renderer(bin.path(), COPIES_FIXTURE);
            app.input = InputState::with_text("x");
            app.submit_expression();
            settle(&mut app);

            app.save_png();
            settle(&mut app);
            assert_eq!(app.status, "Save cancelled");
            assert!(bin.path().join("exports").is_dir());
            assert!(app.view(Mode::TwoD).artifact.is_some());
        }
    }
}
