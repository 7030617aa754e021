use log::{debug, warn};
use nalgebra::DVector;

use crate::error::{Result, SplineError};
use crate::knot::{evaluate_between, Evaluation, Knot};
use crate::point::Point;
use crate::tridiagonal::{
    solve_first_derivatives, solve_periodic_second_derivatives, solve_second_derivatives,
    BoundaryRow, TridiagonalSystem,
};

/// Fraction of the outermost interval at which an extra knot is placed for
/// [BoundaryCondition::FirstAndSecondDerivative] when no ratio is given.
pub const DEFAULT_INSERTION_RATIO: f64 = 0.5;

/// First and second derivative imposed at one end of the spline.
/// `ratio` positions the additional knot inside the outermost interval,
/// measured from the end, and must lie strictly between 0 and 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EndConstraint {
    pub first: f64,
    pub second: f64,
    pub ratio: f64,
}

impl EndConstraint {
    pub fn new(first: f64, second: f64) -> Self {
        EndConstraint { first, second, ratio: DEFAULT_INSERTION_RATIO }
    }

    pub fn with_ratio(self, ratio: f64) -> Self {
        EndConstraint { ratio, ..self }
    }
}

/// Constraints closing the interpolation system at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum BoundaryCondition {
    /// Zero second derivative at both ends.
    #[default]
    Natural,
    /// Zero first derivative at both ends.
    Clamped,
    /// First and second derivative wrap around from the last point to the first.
    Periodic,
    /// Third derivative continuous across the second and the second to last point.
    NotAKnot,
    FirstDerivative { start: f64, end: f64 },
    SecondDerivative { start: f64, end: f64 },
    /// Both derivatives fixed at both ends. Adds one knot next to each end, so
    /// the spline ends up with two knots more than there are points.
    FirstAndSecondDerivative { start: EndConstraint, end: EndConstraint },
}

impl BoundaryCondition {
    pub fn minimum_points(&self) -> usize {
        match self {
            BoundaryCondition::NotAKnot | BoundaryCondition::FirstAndSecondDerivative { .. } => 5,
            _ => 3,
        }
    }

    /// Computes knots interpolating `points`, which must be strictly increasing in x.
    pub fn build_knots(&self, points: &[Point]) -> Result<Vec<Knot>> {
        check_points(points, self.minimum_points())?;
        debug!("interpolating {} points with {:?}", points.len(), self);

        match *self {
            BoundaryCondition::Natural => second_derivative(points, 0.0, 0.0),
            BoundaryCondition::Clamped => first_derivative(points, 0.0, 0.0),
            BoundaryCondition::Periodic => periodic(points),
            BoundaryCondition::NotAKnot => not_a_knot(points),
            BoundaryCondition::FirstDerivative { start, end } => first_derivative(points, start, end),
            BoundaryCondition::SecondDerivative { start, end } => second_derivative(points, start, end),
            BoundaryCondition::FirstAndSecondDerivative { start, end } => {
                first_and_second_derivative(points, start, end)
            }
        }
    }
}

fn check_points(points: &[Point], minimum: usize) -> Result<()> {
    if points.len() < minimum {
        return Err(SplineError::interpolation(format!(
            "at least {} points are required, got {}",
            minimum,
            points.len()
        )));
    }
    if let Some(point) = points.iter().find(|p| !p.get_x().is_finite() || !p.get_y().is_finite()) {
        return Err(SplineError::interpolation(format!(
            "point ({}, {}) is not finite",
            point.get_x(),
            point.get_y()
        )));
    }
    if let Some(w) = points.windows(2).find(|w| w[1].get_x() <= w[0].get_x()) {
        return Err(SplineError::interpolation(format!(
            "x values must be strictly increasing, {} is followed by {}",
            w[0].get_x(),
            w[1].get_x()
        )));
    }
    Ok(())
}

fn assemble(points: &[Point], y2: &DVector<f64>) -> Vec<Knot> {
    points
        .iter()
        .zip(y2.iter())
        .map(|(p, y2)| Knot::new(p.get_x(), p.get_y(), *y2))
        .collect()
}

fn second_derivative(points: &[Point], start: f64, end: f64) -> Result<Vec<Knot>> {
    let y2 = solve_second_derivatives(points, BoundaryRow::fixed(start), BoundaryRow::fixed(end))?;
    Ok(assemble(points, &y2))
}

fn first_derivative(points: &[Point], start: f64, end: f64) -> Result<Vec<Knot>> {
    let slopes = solve_first_derivatives(points, BoundaryRow::fixed(start), BoundaryRow::fixed(end))?;
    let y2 = curvatures_from_slopes(points, &slopes);
    Ok(assemble(points, &y2))
}

/// Second derivatives of the C2 cubic with the given slopes at every point.
/// Each knot takes the value from the interval to its right, the last one from its left.
fn curvatures_from_slopes(points: &[Point], slopes: &DVector<f64>) -> DVector<f64> {
    let size = points.len();
    let mut y2 = DVector::<f64>::zeros(size);

    for i in 0..size - 1 {
        let h = points[i + 1].get_x() - points[i].get_x();
        let secant = (points[i + 1].get_y() - points[i].get_y()) / h;
        y2[i] = (6.0 * secant - 4.0 * slopes[i] - 2.0 * slopes[i + 1]) / h;
        if i == size - 2 {
            y2[i + 1] = (-6.0 * secant + 2.0 * slopes[i] + 4.0 * slopes[i + 1]) / h;
        }
    }
    y2
}

fn periodic(points: &[Point]) -> Result<Vec<Knot>> {
    let first = points[0].get_y();
    let last = points[points.len() - 1].get_y();
    if first != last {
        warn!("periodic interpolation of data with different end values {} and {}", first, last);
    }

    let y2 = solve_periodic_second_derivatives(points)?;
    Ok(assemble(points, &y2))
}

/// Solves the interior points with end rows forcing the outer interior cubics
/// through the outermost points, then reads the outer curvature off those cubics.
fn not_a_knot(points: &[Point]) -> Result<Vec<Knot>> {
    let size = points.len();
    let inner = &points[1..size - 1];

    let (p0, p1, p2) = (&points[0], &points[1], &points[2]);
    let h = p2.get_x() - p1.get_x();
    let a = (p2.get_x() - p0.get_x()) / h;
    let b = (p0.get_x() - p1.get_x()) / h;
    let first = BoundaryRow::new(
        (a * a * a - a) * h * h / 6.0,
        (b * b * b - b) * h * h / 6.0,
        p0.get_y() - a * p1.get_y() - b * p2.get_y(),
    );

    let (q0, q1, q2) = (&points[size - 3], &points[size - 2], &points[size - 1]);
    let h = q1.get_x() - q0.get_x();
    let a = (q1.get_x() - q2.get_x()) / h;
    let b = (q2.get_x() - q0.get_x()) / h;
    let last = BoundaryRow::new(
        (b * b * b - b) * h * h / 6.0,
        (a * a * a - a) * h * h / 6.0,
        q2.get_y() - a * q0.get_y() - b * q1.get_y(),
    );

    let y2 = solve_second_derivatives(inner, first, last)?;
    let inner_knots = assemble(inner, &y2);
    let count = inner_knots.len();

    let start_y2 = evaluate_between(&inner_knots[0], &inner_knots[1], p0.get_x(), Evaluation::SecondDerivative);
    let end_y2 = evaluate_between(
        &inner_knots[count - 2],
        &inner_knots[count - 1],
        q2.get_x(),
        Evaluation::SecondDerivative,
    );

    let mut knots = Vec::with_capacity(size);
    knots.push(Knot::new(p0.get_x(), p0.get_y(), start_y2));
    knots.extend(inner_knots);
    knots.push(Knot::new(q2.get_x(), q2.get_y(), end_y2));
    Ok(knots)
}

fn check_ratio(ratio: f64) -> Result<()> {
    if ratio > 0.0 && ratio < 1.0 {
        Ok(())
    } else {
        Err(SplineError::interpolation(format!(
            "insertion ratio must lie strictly between 0 and 1, got {}",
            ratio
        )))
    }
}

/// Inserts a knot inside each outermost interval. Their ordinates are unknown
/// and get eliminated through the imposed end slopes:
/// `ya = y0 + g0*k0 + g0^2*(2*m0 + ma)/6` on the left and
/// `yb = yn - e0*kn + e0^2*(2*mn + mb)/6` on the right, where `g0` and `e0` are
/// the widths between the ends and the inserted knots. The two rows next to
/// each end are rewritten accordingly, the rest is the usual second derivative
/// system.
fn first_and_second_derivative(points: &[Point], start: EndConstraint, end: EndConstraint) -> Result<Vec<Knot>> {
    check_ratio(start.ratio)?;
    check_ratio(end.ratio)?;

    let size = points.len();
    let x = |i: usize| points[i].get_x();
    let y = |i: usize| points[i].get_y();
    let (k0, m0) = (start.first, start.second);
    let (kn, mn) = (end.first, end.second);

    let g0 = start.ratio * (x(1) - x(0));
    let g1 = (x(1) - x(0)) - g0;
    let e0 = end.ratio * (x(size - 1) - x(size - 2));
    let e1 = (x(size - 1) - x(size - 2)) - e0;

    // unknown r is the second derivative at knot r + 1
    let mut system = TridiagonalSystem::zeros(size);

    let left = (y(1) - y(0) - g0 * k0) / g1;
    system.set_row(
        0,
        0.0,
        3.0 * g0 + 2.0 * g1 + g0 * g0 / g1,
        g1,
        6.0 * left - 6.0 * k0 - 3.0 * g0 * m0 - 2.0 * g0 * g0 * m0 / g1,
    );
    let h1 = x(2) - x(1);
    system.set_row(
        1,
        g1 - g0 * g0 / g1,
        2.0 * (g1 + h1),
        h1,
        6.0 * (y(2) - y(1)) / h1 - 6.0 * left + 2.0 * g0 * g0 * m0 / g1,
    );

    for i in 2..size - 2 {
        let hl = x(i) - x(i - 1);
        let hr = x(i + 1) - x(i);
        let dl = y(i) - y(i - 1);
        let dr = y(i + 1) - y(i);
        system.set_row(i, hl, 2.0 * (hl + hr), hr, 6.0 * (dr / hr - dl / hl));
    }

    let right = (y(size - 1) - y(size - 2) - e0 * kn) / e1;
    let hl = x(size - 2) - x(size - 3);
    system.set_row(
        size - 2,
        hl,
        2.0 * (hl + e1),
        e1 - e0 * e0 / e1,
        6.0 * right + 2.0 * e0 * e0 * mn / e1 - 6.0 * (y(size - 2) - y(size - 3)) / hl,
    );
    system.set_row(
        size - 1,
        e1,
        3.0 * e0 + 2.0 * e1 + e0 * e0 / e1,
        0.0,
        6.0 * kn - 6.0 * right - 3.0 * e0 * mn - 2.0 * e0 * e0 * mn / e1,
    );

    let y2 = system.solve()?;
    let (ma, mb) = (y2[0], y2[size - 1]);
    let ya = y(0) + g0 * k0 + g0 * g0 * (2.0 * m0 + ma) / 6.0;
    let yb = y(size - 1) - e0 * kn + e0 * e0 * (2.0 * mn + mb) / 6.0;

    let mut knots = Vec::with_capacity(size + 2);
    knots.push(Knot::new(x(0), y(0), m0));
    knots.push(Knot::new(x(0) + g0, ya, ma));
    for i in 1..size - 1 {
        knots.push(Knot::new(x(i), y(i), y2[i]));
    }
    knots.push(Knot::new(x(size - 1) - e0, yb, mb));
    knots.push(Knot::new(x(size - 1), y(size - 1), mn));
    Ok(knots)
}
