//! Value range, value-to-row mapping and axis ticks.

/// Average number of plot rows per axis label.
const ROWS_PER_TICK: f64 = 5.0;

/// Two-point linear interpolation through `(x_lo, y_lo)` and `(x_hi, y_hi)`.
///
/// Stays finite for any finite inputs with `x` between `x_lo` and `x_hi`,
/// including spans wider than `f64::MAX`.
pub fn interpolate(x_lo: f64, y_lo: f64, x_hi: f64, y_hi: f64, x: f64) -> f64 {
    let dx = x_hi - x_lo;
    let dy = y_hi - y_lo;
    if dx.is_finite() && dy.is_finite() {
        return y_lo + (x - x_lo) / dx * dy;
    }

    // The span overflowed; work in halves.
    let t = (x / 2.0 - x_lo / 2.0) / (x_hi / 2.0 - x_lo / 2.0);
    2.0 * (y_lo / 2.0 + t * (y_hi / 2.0 - y_lo / 2.0))
}

/// How tick values are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickStyle {
    /// Evenly spaced between max and min, no rounding.
    #[default]
    Even,
    /// Snapped to 1/2/5 x 10^n steps inside the range.
    Nice,
}

/// Vertical data range of the plot. Always `min < max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub min: f64,
    pub max: f64,
}

impl Scale {
    /// Derives the range from the samples, widening a flat range by 1 on
    /// each side. Returns `None` for an empty slice.
    ///
    /// Flat values too large for a unit pad to register are widened by their
    /// own rounding step instead, clamped to the finite range.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let (min, max) = values
            .into_iter()
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })?;

        if min < max {
            return Some(Self { min, max });
        }

        let (lo, hi) = (min - 1.0, max + 1.0);
        if lo < hi {
            return Some(Self { min: lo, max: hi });
        }

        let pad = min.abs() * f64::EPSILON;
        Some(Self {
            min: (min - pad).max(-f64::MAX),
            max: (max + pad).min(f64::MAX),
        })
    }

    /// Screen row of `value`, with `max` on row 1 and `min` on row
    /// `graph_height - 1`.
    pub fn row_of(&self, value: f64, graph_height: u16) -> f64 {
        interpolate(self.max, 1.0, self.min, f64::from(graph_height) - 1.0, value)
    }
}

/// An axis label position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    pub row: u16,
    pub value: f64,
}

/// Scale and ticks for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub scale: Scale,
    pub ticks: Vec<Tick>,
}

impl Axis {
    pub fn compute(
        values: impl IntoIterator<Item = f64>,
        graph_height: u16,
        style: TickStyle,
    ) -> Option<Self> {
        let scale = Scale::from_values(values)?;
        let ticks = match style {
            TickStyle::Even => even_ticks(&scale, graph_height),
            TickStyle::Nice => nice_ticks(&scale, graph_height),
        };
        Some(Self { scale, ticks })
    }
}

/// Number of axis labels for a plot of the given height, at least one.
pub fn tick_count(graph_height: u16) -> usize {
    ((f64::from(graph_height) / ROWS_PER_TICK).round() as usize).max(1)
}

/// Ticks evenly spaced in both rows and values, from `max` down to `min`.
pub fn even_ticks(scale: &Scale, graph_height: u16) -> Vec<Tick> {
    let n = tick_count(graph_height);
    if n == 1 {
        return vec![Tick {
            row: 1,
            value: scale.max,
        }];
    }

    let last = (n - 1) as f64;
    let bottom = f64::from(graph_height) - 1.0;
    (0..n)
        .map(|i| {
            let i = i as f64;
            Tick {
                row: to_row(interpolate(0.0, 1.0, last, bottom, i)),
                value: interpolate(0.0, scale.max, last, scale.min, i),
            }
        })
        .collect()
}

/// Ticks on round values, each placed on the row its value maps to.
pub fn nice_ticks(scale: &Scale, graph_height: u16) -> Vec<Tick> {
    let target = tick_count(graph_height).max(2);
    let range = nice_num(scale.max - scale.min, false);
    let spacing = nice_num(range / (target - 1) as f64, true);
    if !spacing.is_finite() || spacing <= 0.0 {
        return even_ticks(scale, graph_height);
    }

    let first = (scale.min / spacing).ceil() as i64;
    let last = (scale.max / spacing).floor() as i64;
    let ticks: Vec<Tick> = (first..=last)
        .rev()
        .map(|k| k as f64 * spacing)
        .map(|value| Tick {
            row: to_row(scale.row_of(value, graph_height)),
            value,
        })
        .collect();

    // No round value inside a narrow range.
    if ticks.is_empty() {
        return even_ticks(scale, graph_height);
    }
    ticks
}

/// Nearest "nice" number (1, 2 or 5 times a power of ten) to `range`.
///
/// With `round` the closest nice number is taken, otherwise the smallest
/// nice number not below `range`.
pub fn nice_num(range: f64, round: bool) -> f64 {
    let exponent = range.log10().floor();
    let fraction = range / 10f64.powf(exponent);

    let nice_fraction = if round {
        if fraction < 1.5 {
            1.0
        } else if fraction < 3.0 {
            2.0
        } else if fraction < 7.0 {
            5.0
        } else {
            10.0
        }
    } else if fraction <= 1.0 {
        1.0
    } else if fraction <= 2.0 {
        2.0
    } else if fraction <= 5.0 {
        5.0
    } else {
        10.0
    };

    nice_fraction * 10f64.powf(exponent)
}

/// Rounds a fractional row to a grid index.
pub fn to_row(y: f64) -> u16 {
    y.round().clamp(0.0, f64::from(u16::MAX)) as u16
}
