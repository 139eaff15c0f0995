//! Canned example functions.

/// A named example expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Example {
    /// Short display name.
    pub name: &'static str,
    /// Gnuplot expression.
    pub expression: &'static str,
}

const fn example(name: &'static str, expression: &'static str) -> Example {
    Example { name, expression }
}

/// Examples for the 2D tab, in cycle order.
pub const EXAMPLES_2D: [Example; 10] = [
    example("Linear", "2*x + 3"),
    example("Quadratic", "x**2"),
    example("Cubic", "x**3"),
    example("Gaussian", "exp(-x**2)"),
    example("Log", "log(abs(x))"),
    example("Absolute", "abs(x)"),
    example("Sine", "sin(x)"),
    example("Sinc", "sin(x)/x"),
    example("Bessel", "besj0(x)"),
    example("Sigmoid", "tanh(x)"),
];

/// Examples for the 3D tab, in cycle order.
pub const EXAMPLES_3D: [Example; 10] = [
    example("Paraboloid", "x**2 + y**2"),
    example("Saddle", "x**2 - y**2"),
    example("Hemisphere", "sqrt(1 - x**2 - y**2)"),
    example("Gaussian", "exp(-(x**2 + y**2))"),
    example("Mexican Hat", "(x**2 + y**2)*exp(-(x**2 + y**2))"),
    example("Ripples", "sin(sqrt(x**2 + y**2))"),
    example("Bessel", "besj0(sqrt(x**2 + y**2))"),
    example("Wave Mesh", "sin(x)*cos(y)"),
    example("Lorentzian", "1/(1 + x**2 + y**2)"),
    example("Damped", "sin(sqrt(x**2+y**2))*exp(-sqrt(x**2+y**2)/5)"),
];
