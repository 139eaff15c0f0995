//! PlotBox - plot mathematical functions with gnuplot from the terminal.

use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use plotbox::{
    app::App,
    config::{load_config, Config},
    exchange,
    render::{Renderer, Workspace, INSTALL_HINT},
    script::{build_script, single_line, Curve, Mode, Palette, PlotConfig, RangeSpec, Rotation},
    session::LINE_COLORS,
    ui, PlotboxError,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use ratatui_image::picker::Picker;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "plotbox", version)]
#[command(about = "Plot mathematical functions with gnuplot", long_about = None)]
struct Args {
    /// Alternate configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Renderer executable (overrides the config file)
    #[arg(long)]
    renderer: Option<PathBuf>,

    /// Enable logging to specified file
    #[arg(long)]
    log: Option<PathBuf>,

    /// Tab to open on start
    #[arg(long, value_enum, default_value_t = TabArg::TwoD)]
    tab: TabArg,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the generated gnuplot script without running it
    Script {
        #[command(flatten)]
        plot: PlotArgs,

        /// Image path written into the script
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Render a plot to a PNG file
    Render {
        #[command(flatten)]
        plot: PlotArgs,

        /// Destination PNG
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum TabArg {
    #[value(name = "2d")]
    TwoD,
    #[value(name = "3d")]
    ThreeD,
}

impl From<TabArg> for Mode {
    fn from(tab: TabArg) -> Self {
        match tab {
            TabArg::TwoD => Mode::TwoD,
            TabArg::ThreeD => Mode::ThreeD,
        }
    }
}

/// Plot description shared by `script` and `render`.
#[derive(ClapArgs, Debug)]
struct PlotArgs {
    /// Plot a surface z = f(x, y) instead of curves
    #[arg(long = "3d")]
    three_d: bool,

    /// Expression to plot (repeatable in 2D; the last one wins in 3D)
    #[arg(short = 'e', long = "expr", allow_hyphen_values = true)]
    expressions: Vec<String>,

    /// X range as MIN:MAX
    #[arg(long, value_parser = parse_range, allow_hyphen_values = true)]
    xrange: Option<RangeSpec>,

    /// Y range as MIN:MAX
    #[arg(long, value_parser = parse_range, allow_hyphen_values = true)]
    yrange: Option<RangeSpec>,

    /// Z range as MIN:MAX (3D only)
    #[arg(long, value_parser = parse_range, allow_hyphen_values = true)]
    zrange: Option<RangeSpec>,

    /// X axis label
    #[arg(long)]
    xlabel: Option<String>,

    /// Y axis label
    #[arg(long)]
    ylabel: Option<String>,

    /// Z axis label (3D only)
    #[arg(long)]
    zlabel: Option<String>,

    /// Leave the grid off
    #[arg(long)]
    no_grid: bool,

    /// 3D view angles as ROTX,ROTZ
    #[arg(long, value_parser = parse_view)]
    view: Option<Rotation>,

    /// 3D color palette
    #[arg(long, value_parser = parse_palette)]
    palette: Option<Palette>,
}

impl PlotArgs {
    fn into_config(self) -> PlotConfig {
        let mode = if self.three_d { Mode::ThreeD } else { Mode::TwoD };
        let mut config = PlotConfig {
            mode,
            grid: !self.no_grid,
            rotation: self.view.unwrap_or_default(),
            palette: self.palette.unwrap_or_default(),
            ..PlotConfig::default()
        };
        config.ranges.x = self.xrange.unwrap_or_default();
        config.ranges.y = self.yrange.unwrap_or_default();
        config.labels.x = self.xlabel.unwrap_or_default();
        config.labels.y = self.ylabel.unwrap_or_default();

        match mode {
            Mode::TwoD => {
                config.curves = self
                    .expressions
                    .into_iter()
                    .map(|e| single_line(&e).trim().to_string())
                    .filter(|e| !e.is_empty())
                    .enumerate()
                    .map(|(i, expression)| Curve {
                        expression,
                        color: LINE_COLORS[i % LINE_COLORS.len()],
                        visible: true,
                    })
                    .collect();
            },
            Mode::ThreeD => {
                config.ranges.z = self.zrange.unwrap_or_default();
                config.labels.z = self.zlabel.unwrap_or_default();
                config.surface = self
                    .expressions
                    .into_iter()
                    .rev()
                    .map(|e| single_line(&e).trim().to_string())
                    .find(|e| !e.is_empty());
            },
        }
        config
    }
}

fn parse_range(value: &str) -> std::result::Result<RangeSpec, String> {
    let (min, max) = value
        .split_once(':')
        .ok_or_else(|| format!("expected MIN:MAX, got '{}'", value))?;
    Ok(RangeSpec::new(min.trim(), max.trim()))
}

fn parse_view(value: &str) -> std::result::Result<Rotation, String> {
    let (x, z) = value
        .split_once(',')
        .ok_or_else(|| format!("expected ROTX,ROTZ, got '{}'", value))?;
    Ok(Rotation {
        x: x.trim().to_string(),
        z: z.trim().to_string(),
    })
}

fn parse_palette(value: &str) -> std::result::Result<Palette, String> {
    Palette::from_name(value).ok_or_else(|| {
        let names: Vec<_> = Palette::ALL.iter().map(|p| p.name()).collect();
        format!("unknown palette '{}' (one of: {})", value, names.join(", "))
    })
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging if --log option is provided
    if let Some(log_path) = &args.log {
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_path)
            .with_context(|| format!("Failed to open log file {}", log_path.display()))?;
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(log_file))
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
        tracing::info!("Starting PlotBox");
    }

    let mut config = load_config(args.config.as_deref())?;
    if let Some(renderer) = &args.renderer {
        config.renderer = renderer.display().to_string();
    }

    match args.command {
        Some(Command::Script { plot, output }) => print_script(plot, output),
        Some(Command::Render { plot, output }) => render_to_file(&config, plot, &output),
        None => run_tui(&config, args.tab.into()),
    }
}

fn print_script(plot: PlotArgs, output: Option<PathBuf>) -> Result<()> {
    let config = plot.into_config();
    let output = output.unwrap_or_else(|| PathBuf::from(format!("{}.png", config.mode.slug())));
    let Some(script) = build_script(&config, &output) else {
        bail!("Nothing to plot: give at least one expression with -e");
    };
    print!("{}", script);
    Ok(())
}

fn render_to_file(config: &Config, plot: PlotArgs, destination: &std::path::Path) -> Result<()> {
    let plot = plot.into_config();
    let mut workspace = Workspace::new()?;
    let Some(script) = build_script(&plot, &workspace.next_output_path(plot.mode)) else {
        bail!("Nothing to plot: give at least one expression with -e");
    };

    let renderer = Renderer::new(config.renderer.clone()).with_settle(config.settle_timeout());
    let request = workspace.request(plot.mode, script);
    let artifact = renderer.render_blocking(request).into_result()?;
    let destination = exchange::with_png_suffix(destination.to_path_buf());
    exchange::export_artifact(&artifact, &destination)?;
    tracing::info!("Rendered {}", destination.display());
    println!("{}", destination.display());
    Ok(())
}

fn run_tui(config: &Config, tab: Mode) -> Result<()> {
    let renderer = Renderer::new(config.renderer.clone());
    if let Err(e) = renderer.probe() {
        tracing::error!("{}", e);
        if matches!(e, PlotboxError::RendererMissing { .. }) {
            eprintln!("{}\n\n{}", e, INSTALL_HINT);
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }

    // Query the terminal for its image protocol before taking over the screen
    let picker = Picker::from_query_stdio().ok();
    let mut app = App::new(config, picker)?;
    if tab == Mode::ThreeD {
        app.switch_tab(tab);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableBracketedPaste, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {}", err);
    }

    tracing::info!("PlotBox exited");
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        app.tick();
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Event::Paste(text) => {
                    if let Some(input) = app.active_input() {
                        input.insert_str(&text);
                    }
                },
                _ => {},
            }
        }

        if app.should_quit {
            app.shutdown();
            break;
        }
    }

    Ok(())
}
