/// Knot represents point through which spline passes together with local curvature.
/// - `x` - coordinate,
/// - `y` - coordinate,
/// - `y2` - second derivative of the spline at `x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Knot {
    x: f64,
    y: f64,
    y2: f64,
}

/// Quantity computed when a spline is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Evaluation {
    #[default]
    Value,
    FirstDerivative,
    SecondDerivative,
}

impl Knot {
    /// # Example
    /// ```
    /// use cubic_knots::Knot;
    ///
    /// let knot = Knot::new(1.0, 2.0, -0.5);
    /// assert_eq!(1.0, knot.get_x());
    /// assert_eq!(2.0, knot.get_y());
    /// assert_eq!(-0.5, knot.get_y2());
    /// ```
    pub fn new(x: f64, y: f64, y2: f64) -> Self {
        Knot { x, y, y2 }
    }

    /// Knot without curvature, as found at the ends of a natural spline.
    pub fn flat(x: f64, y: f64) -> Self {
        Knot { x, y, y2: 0.0 }
    }

    pub fn get_x(&self) -> f64 {
        self.x
    }

    pub fn get_y(&self) -> f64 {
        self.y
    }

    pub fn get_y2(&self) -> f64 {
        self.y2
    }

    pub(crate) fn overwrite(&mut self, y: f64, y2: f64) {
        self.y = y;
        self.y2 = y2;
    }
}

/// Evaluates the cubic between two adjacent knots at `x`.
///
/// With `h = max.x - min.x`, `a = (max.x - x) / h` and `b = (x - min.x) / h`:
/// - value: `a*y0 + b*y1 + ((a^3 - a)*y2_0 + (b^3 - b)*y2_1) * h^2 / 6`,
/// - first derivative: `(y1 - y0)/h - a^2*h*y2_0/2 + b^2*h*y2_1/2 - (y2_1 - y2_0)*h/6`,
/// - second derivative: `a*y2_0 + b*y2_1`.
///
/// `x` is not checked against the interval, points outside are extrapolated.
///
/// # Example
/// ```
/// use cubic_knots::{evaluate_between, Evaluation, Knot};
/// use assert_approx_eq::assert_approx_eq;
///
/// let min = Knot::new(0.0, 0.0, 0.0);
/// let max = Knot::new(1.0, 1.0, -3.0);
///
/// assert_approx_eq!(0.6875, evaluate_between(&min, &max, 0.5, Evaluation::Value), 1e-12);
/// assert_approx_eq!(-1.5, evaluate_between(&min, &max, 0.5, Evaluation::SecondDerivative), 1e-12);
/// ```
pub fn evaluate_between(min: &Knot, max: &Knot, x: f64, evaluation: Evaluation) -> f64 {
    let h = max.x - min.x;
    let a = (max.x - x) / h;
    let b = (x - min.x) / h;

    match evaluation {
        Evaluation::Value => {
            a * min.y + b * max.y
                + ((a * a * a - a) * min.y2 + (b * b * b - b) * max.y2) * (h * h) / 6.0
        }
        Evaluation::FirstDerivative => {
            (max.y - min.y) / h - 0.5 * a * a * h * min.y2 + 0.5 * b * b * h * max.y2
                - (max.y2 - min.y2) * h / 6.0
        }
        Evaluation::SecondDerivative => a * min.y2 + b * max.y2,
    }
}
