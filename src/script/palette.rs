//! Color palettes for 3D surfaces.

/// Color palette for pm3d surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Palette {
    /// Gnuplot's built-in palette (no `set palette` line).
    #[default]
    Default,
    /// Rainbow (rgbformulae 33,13,10).
    Rainbow,
    /// Black-red-yellow-white.
    Hot,
    /// Cyan to magenta.
    Cool,
    /// Black to white.
    Grayscale,
    /// Dark blue through cyan to white.
    Ocean,
    /// Three-stop viridis approximation.
    Viridis,
}

impl Palette {
    /// All palettes in cycle order.
    pub const ALL: [Palette; 7] = [
        Palette::Default,
        Palette::Rainbow,
        Palette::Hot,
        Palette::Cool,
        Palette::Grayscale,
        Palette::Ocean,
        Palette::Viridis,
    ];

    /// Get the next palette in cycle.
    pub fn next(self) -> Self {
        match self {
            Self::Default => Self::Rainbow,
            Self::Rainbow => Self::Hot,
            Self::Hot => Self::Cool,
            Self::Cool => Self::Grayscale,
            Self::Grayscale => Self::Ocean,
            Self::Ocean => Self::Viridis,
            Self::Viridis => Self::Default,
        }
    }

    /// Get palette name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Default => "Default",
            Self::Rainbow => "Rainbow",
            Self::Hot => "Hot",
            Self::Cool => "Cool",
            Self::Grayscale => "Grayscale",
            Self::Ocean => "Ocean",
            Self::Viridis => "Viridis",
        }
    }

    /// Look a palette up by name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Argument of `set palette`, or `None` for the built-in palette.
    pub fn directive(self) -> Option<&'static str> {
        match self {
            Self::Default => None,
            Self::Rainbow => Some("rgbformulae 33,13,10"),
            Self::Hot => Some("rgbformulae 34,35,36"),
            Self::Cool => Some("rgbformulae 23,28,3"),
            Self::Grayscale => Some("gray"),
            Self::Ocean => Some("defined (0 \"dark-blue\", 0.5 \"cyan\", 1 \"white\")"),
            Self::Viridis => Some("defined (0 \"#440154\", 0.5 \"#21918c\", 1 \"#fde725\")"),
        }
    }
}
