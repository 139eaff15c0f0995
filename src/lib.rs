//! PlotBox - a terminal front-end for gnuplot.
//!
//! PlotBox lets you type mathematical functions, turns them into gnuplot
//! scripts, runs gnuplot in the background and shows the rendered PNG right
//! in the terminal. There is a 2D tab with a list of curves and a 3D tab with
//! a single surface.
//!
//! # Features
//!
//! - Multiple 2D curves with per-curve colors and visibility
//! - 3D surfaces with adjustable view angles and color palettes
//! - Axis ranges, labels and grid per tab
//! - Canned example functions
//! - PNG export through a native save dialog
//! - Clipboard copy of the rendered graph
//!
//! # Example
//!
//! ```
//! use plotbox::script::{build_script, Mode, PlotConfig};
//! use std::path::Path;
//!
//! let config = PlotConfig {
//!     mode: Mode::ThreeD,
//!     surface: Some("x**2 + y**2".to_string()),
//!     ..PlotConfig::default()
//! };
//! let script = build_script(&config, Path::new("/tmp/surface.png")).unwrap();
//! assert!(script.contains("splot x**2 + y**2"));
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]
#![deny(unsafe_code)]

pub mod app;
pub mod config;
pub mod error;
pub mod exchange;
pub mod input;
pub mod render;
pub mod script;
pub mod session;
pub mod task;
pub mod ui;

pub use error::{PlotboxError, Result};
