//! Math intrinsics and named constants available inside expressions.

/// Argument-count contract of an intrinsic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many arguments.
    Exact(usize),
    /// A reduction over at least this many arguments.
    AtLeast(usize),
}

/// The fixed intrinsic catalog. All intrinsics take and return doubles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intrinsic {
    /// Absolute value.
    Abs,
    /// Square root.
    Sqrt,
    /// Round toward negative infinity.
    Floor,
    /// Round toward positive infinity.
    Ceiling,
    /// Sine (radians).
    Sin,
    /// Cosine (radians).
    Cos,
    /// Tangent (radians).
    Tan,
    /// Minimum of exactly two arguments.
    Min2,
    /// Maximum of exactly two arguments.
    Max2,
    /// Minimum over a variadic argument list.
    Minx,
    /// Maximum over a variadic argument list.
    Maxx,
}

impl Intrinsic {
    /// Resolves a surface name to an intrinsic.
    pub fn lookup(name: &str) -> Option<Self> {
        Some(match name {
            "abs" => Self::Abs,
            "sqrt" => Self::Sqrt,
            "floor" => Self::Floor,
            "ceiling" => Self::Ceiling,
            "sin" => Self::Sin,
            "cos" => Self::Cos,
            "tan" => Self::Tan,
            "min2" => Self::Min2,
            "max2" => Self::Max2,
            "minx" => Self::Minx,
            "maxx" => Self::Maxx,
            _ => return None,
        })
    }

    /// Returns the surface name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Abs => "abs",
            Self::Sqrt => "sqrt",
            Self::Floor => "floor",
            Self::Ceiling => "ceiling",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Min2 => "min2",
            Self::Max2 => "max2",
            Self::Minx => "minx",
            Self::Maxx => "maxx",
        }
    }

    /// Returns the argument-count contract.
    pub const fn arity(self) -> Arity {
        match self {
            Self::Abs
            | Self::Sqrt
            | Self::Floor
            | Self::Ceiling
            | Self::Sin
            | Self::Cos
            | Self::Tan => Arity::Exact(1),
            Self::Min2 | Self::Max2 => Arity::Exact(2),
            Self::Minx | Self::Maxx => Arity::AtLeast(1),
        }
    }

    /// Applies the intrinsic to already-checked arguments.
    pub fn apply(self, args: &[f64]) -> f64 {
        match self {
            Self::Abs => args[0].abs(),
            Self::Sqrt => args[0].sqrt(),
            Self::Floor => args[0].floor(),
            Self::Ceiling => args[0].ceil(),
            Self::Sin => args[0].sin(),
            Self::Cos => args[0].cos(),
            Self::Tan => args[0].tan(),
            Self::Min2 => args[0].min(args[1]),
            Self::Max2 => args[0].max(args[1]),
            Self::Minx => args.iter().copied().fold(f64::INFINITY, f64::min),
            Self::Maxx => args.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

/// Resolves a named math constant, substituted as a float literal.
pub fn constant(name: &str) -> Option<f32> {
    match name {
        "pi" => Some(std::f32::consts::PI),
        "e" => Some(std::f32::consts::E),
        _ => None,
    }
}
