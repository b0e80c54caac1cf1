use std::fmt;
use std::str::FromStr;

use crate::foundation::error::{CompositorError, CompositorResult};

/// One CSS-style color filter function.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FilterOp {
    /// `grayscale(a)`, `a` in `[0, 1]`.
    Grayscale(f32),
    /// `sepia(a)`, `a` in `[0, 1]`.
    Sepia(f32),
    /// `saturate(s)`, `s >= 0`; `1` is identity.
    Saturate(f32),
    /// `brightness(b)`, `b >= 0`; `1` is identity.
    Brightness(f32),
    /// `contrast(c)`, `c >= 0`; `1` is identity.
    Contrast(f32),
}

impl FilterOp {
    fn name(self) -> &'static str {
        match self {
            Self::Grayscale(_) => "grayscale",
            Self::Sepia(_) => "sepia",
            Self::Saturate(_) => "saturate",
            Self::Brightness(_) => "brightness",
            Self::Contrast(_) => "contrast",
        }
    }

    fn amount(self) -> f32 {
        match self {
            Self::Grayscale(v)
            | Self::Sepia(v)
            | Self::Saturate(v)
            | Self::Brightness(v)
            | Self::Contrast(v) => v,
        }
    }

    fn is_identity(self) -> bool {
        match self {
            Self::Grayscale(a) | Self::Sepia(a) => a == 0.0,
            Self::Saturate(v) | Self::Brightness(v) | Self::Contrast(v) => v == 1.0,
        }
    }

    /// Affine color transform (3x3 matrix + offset) from the W3C Filter Effects definitions.
    fn color_affine(self) -> ColorAffine {
        match self {
            Self::Grayscale(a) => {
                let s = 1.0 - a;
                ColorAffine::matrix([
                    [0.2126 + 0.7874 * s, 0.7152 - 0.7152 * s, 0.0722 - 0.0722 * s],
                    [0.2126 - 0.2126 * s, 0.7152 + 0.2848 * s, 0.0722 - 0.0722 * s],
                    [0.2126 - 0.2126 * s, 0.7152 - 0.7152 * s, 0.0722 + 0.9278 * s],
                ])
            }
            Self::Sepia(a) => {
                let s = 1.0 - a;
                ColorAffine::matrix([
                    [0.393 + 0.607 * s, 0.769 - 0.769 * s, 0.189 - 0.189 * s],
                    [0.349 - 0.349 * s, 0.686 + 0.314 * s, 0.168 - 0.168 * s],
                    [0.272 - 0.272 * s, 0.534 - 0.534 * s, 0.131 + 0.869 * s],
                ])
            }
            Self::Saturate(s) => ColorAffine::matrix([
                [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
                [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
                [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
            ]),
            Self::Brightness(b) => ColorAffine::scale(b, 0.0),
            Self::Contrast(c) => ColorAffine::scale(c, 0.5 - 0.5 * c),
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.amount())
    }
}

#[derive(Clone, Copy, Debug)]
struct ColorAffine {
    m: [[f32; 3]; 3],
    offset: f32,
}

impl ColorAffine {
    fn matrix(m: [[f32; 3]; 3]) -> Self {
        Self { m, offset: 0.0 }
    }

    fn scale(k: f32, offset: f32) -> Self {
        Self {
            m: [[k, 0.0, 0.0], [0.0, k, 0.0], [0.0, 0.0, k]],
            offset,
        }
    }

    fn apply(&self, c: [f32; 3]) -> [f32; 3] {
        let mut out = [0.0f32; 3];
        for (i, row) in self.m.iter().enumerate() {
            let v = row[0] * c[0] + row[1] * c[1] + row[2] * c[2] + self.offset;
            out[i] = v.clamp(0.0, 1.0);
        }
        out
    }
}

const PRESETS: &[(&str, &[FilterOp])] = &[
    ("none", &[]),
    ("grayscale", &[FilterOp::Grayscale(1.0)]),
    ("sepia", &[FilterOp::Sepia(1.0)]),
    ("saturate", &[FilterOp::Saturate(2.0)]),
    ("bright", &[FilterOp::Brightness(1.25)]),
    (
        "vintage",
        &[
            FilterOp::Sepia(0.5),
            FilterOp::Contrast(1.1),
            FilterOp::Brightness(0.95),
        ],
    ),
    ("noir", &[FilterOp::Grayscale(1.0), FilterOp::Contrast(1.4)]),
];

/// Uniform visual transform applied to the cropped pixels before any overlay.
///
/// Parsed from CSS filter syntax (`"grayscale(100%) brightness(1.2)"`) or a preset name. An empty
/// list is the identity.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FilterSpec {
    ops: Vec<FilterOp>,
}

impl FilterSpec {
    /// The identity filter.
    pub fn identity() -> Self {
        Self::default()
    }

    /// A filter applying `ops` in order.
    pub fn new(ops: Vec<FilterOp>) -> Self {
        Self { ops }
    }

    /// Look up a named preset (`none`, `grayscale`, `sepia`, `saturate`, `bright`, `vintage`,
    /// `noir`).
    pub fn preset(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        PRESETS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, ops)| Self::new(ops.to_vec()))
    }

    /// Names of all presets, in display order.
    pub fn preset_names() -> impl Iterator<Item = &'static str> {
        PRESETS.iter().map(|(n, _)| *n)
    }

    /// Parse CSS filter syntax or a preset name.
    pub fn parse(input: &str) -> CompositorResult<Self> {
        let s = input.trim();
        if s.is_empty() {
            return Ok(Self::identity());
        }
        if let Some(p) = Self::preset(s) {
            return Ok(p);
        }

        let mut ops = Vec::new();
        let mut rest = s;
        while !rest.is_empty() {
            let open = rest.find('(').ok_or_else(|| {
                CompositorError::validation(format!("unknown filter or preset '{rest}'"))
            })?;
            let close = rest[open..]
                .find(')')
                .map(|i| open + i)
                .ok_or_else(|| CompositorError::validation(format!("unclosed filter in '{s}'")))?;
            let name = rest[..open].trim().to_ascii_lowercase();
            let arg = rest[open + 1..close].trim();
            ops.push(parse_op(&name, arg)?);
            rest = rest[close + 1..].trim_start();
        }
        Ok(Self { ops })
    }

    /// The filter functions in application order.
    pub fn ops(&self) -> &[FilterOp] {
        &self.ops
    }

    /// `true` when applying the filter leaves every pixel unchanged.
    pub fn is_identity(&self) -> bool {
        self.ops.iter().all(|op| op.is_identity())
    }

    /// Apply the filter to premultiplied RGBA8 pixels in place. Alpha is preserved.
    pub(crate) fn apply_premul_in_place(&self, rgba8_premul: &mut [u8]) {
        if self.is_identity() {
            return;
        }
        let chain: Vec<ColorAffine> = self
            .ops
            .iter()
            .filter(|op| !op.is_identity())
            .map(|op| op.color_affine())
            .collect();

        for px in rgba8_premul.chunks_exact_mut(4) {
            let a = px[3];
            if a == 0 {
                continue;
            }
            let af = f32::from(a) / 255.0;
            let mut c = [
                (f32::from(px[0]) / 255.0 / af).min(1.0),
                (f32::from(px[1]) / 255.0 / af).min(1.0),
                (f32::from(px[2]) / 255.0 / af).min(1.0),
            ];
            for step in &chain {
                c = step.apply(c);
            }
            for i in 0..3 {
                px[i] = (c[i] * af * 255.0).round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

fn parse_op(name: &str, arg: &str) -> CompositorResult<FilterOp> {
    let amount = if arg.is_empty() {
        1.0
    } else {
        parse_amount(arg)?
    };
    if amount < 0.0 {
        return Err(CompositorError::validation(format!(
            "filter '{name}' amount must be >= 0, got {amount}"
        )));
    }
    match name {
        "grayscale" | "greyscale" => Ok(FilterOp::Grayscale(amount.min(1.0))),
        "sepia" => Ok(FilterOp::Sepia(amount.min(1.0))),
        "saturate" | "saturation" => Ok(FilterOp::Saturate(amount)),
        "brightness" => Ok(FilterOp::Brightness(amount)),
        "contrast" => Ok(FilterOp::Contrast(amount)),
        _ => Err(CompositorError::validation(format!(
            "unknown filter function '{name}'"
        ))),
    }
}

fn parse_amount(arg: &str) -> CompositorResult<f32> {
    let (num, divisor) = match arg.strip_suffix('%') {
        Some(n) => (n.trim(), 100.0),
        None => (arg, 1.0),
    };
    let v: f32 = num
        .parse()
        .map_err(|_| CompositorError::validation(format!("invalid filter amount '{arg}'")))?;
    if !v.is_finite() {
        return Err(CompositorError::validation(format!(
            "filter amount must be finite, got '{arg}'"
        )));
    }
    Ok(v / divisor)
}

impl FromStr for FilterSpec {
    type Err = CompositorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for FilterSpec {
    type Error = CompositorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<FilterSpec> for String {
    fn from(f: FilterSpec) -> Self {
        f.to_string()
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ops.is_empty() {
            return f.write_str("none");
        }
        for (i, op) in self.ops.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{op}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/filter.rs"]
mod tests;
