use std::path::Path;

use log::{debug, trace};

use crate::boundary::BoundaryCondition;
use crate::error::{Result, SplineError};
use crate::io;
use crate::knot::{evaluate_between, Evaluation, Knot};
use crate::point::Point;
use crate::search::{find_segment_bisect, find_segment_linear};
use crate::segment::Segment;

/// Cubic spline stored as knots strictly increasing in x.
///
/// The spline is defined on `[first knot x, last knot x]` only and needs at
/// least two knots to be defined anywhere. Knots are handed out by value or as
/// a borrowed slice, so no reference to them can outlive a mutating call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Spline {
    knots: Vec<Knot>,
}

impl Spline {
    pub fn new() -> Self {
        Spline { knots: Vec::new() }
    }

    /// Builds a spline from knots given in any order. Knots sharing an x value
    /// collapse into the one given last.
    pub fn from_knots(knots: Vec<Knot>) -> Result<Self> {
        let mut spline = Spline { knots: Vec::with_capacity(knots.len()) };
        for knot in knots {
            spline.insert_knot(knot)?;
        }
        Ok(spline)
    }

    /// Interpolates `points` under the given boundary condition.
    ///
    /// # Example
    /// ```
    /// use cubic_knots::{BoundaryCondition, Evaluation, Point, Spline};
    /// use assert_approx_eq::assert_approx_eq;
    ///
    /// let points = vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0), Point::new(2.0, 0.0)];
    /// let spline = Spline::from_points(&points, BoundaryCondition::Natural).unwrap();
    ///
    /// assert_eq!(3, spline.num_knots());
    /// assert_approx_eq!(-3.0, spline.knots()[1].get_y2(), 1e-12);
    /// assert_approx_eq!(0.6875, spline.evaluate(0.5, Evaluation::Value), 1e-12);
    /// ```
    pub fn from_points(points: &[Point], boundary: BoundaryCondition) -> Result<Self> {
        let mut spline = Spline::new();
        spline.interpolate(points, boundary)?;
        Ok(spline)
    }

    /// Replaces all knots with the interpolation of `points` and returns the new
    /// knot count. Previous knots are discarded even when interpolation fails.
    pub fn interpolate(&mut self, points: &[Point], boundary: BoundaryCondition) -> Result<usize> {
        self.knots.clear();
        self.knots = boundary.build_knots(points)?;
        debug!("spline rebuilt with {} knots", self.knots.len());
        Ok(self.knots.len())
    }

    /// Inserts `knot` keeping knots sorted and returns its index. A knot already
    /// present at the same x gets its `y` and `y2` overwritten instead.
    ///
    /// # Errors
    /// [SplineError::UndefinedAt] when x of the knot is not finite.
    /// ```
    /// use cubic_knots::{Knot, Spline};
    ///
    /// let mut spline = Spline::new();
    /// spline.insert_knot(Knot::new(2.0, 1.0, 0.0)).unwrap();
    /// spline.insert_knot(Knot::new(0.0, 3.0, 0.0)).unwrap();
    /// assert_eq!(1, spline.insert_knot(Knot::new(1.0, 2.0, 0.0)).unwrap());
    /// assert_eq!(1, spline.insert_knot(Knot::new(1.0, 5.0, 0.0)).unwrap());
    ///
    /// assert_eq!(3, spline.num_knots());
    /// assert_eq!(5.0, spline.knots()[1].get_y());
    /// assert!(spline.insert_knot(Knot::new(f64::NAN, 0.0, 0.0)).is_err());
    /// ```
    pub fn insert_knot(&mut self, knot: Knot) -> Result<usize> {
        let x = knot.get_x();
        if !x.is_finite() {
            return Err(SplineError::UndefinedAt(x));
        }

        let size = self.knots.len();
        let (first, last) = match (self.knots.first(), self.knots.last()) {
            (Some(first), Some(last)) => (first.get_x(), last.get_x()),
            _ => {
                self.knots.push(knot);
                return Ok(0);
            }
        };

        let index = if x > last {
            self.knots.push(knot);
            size
        } else if x == last {
            self.knots[size - 1].overwrite(knot.get_y(), knot.get_y2());
            size - 1
        } else if x < first {
            self.knots.insert(0, knot);
            0
        } else {
            let segment = find_segment_bisect(&self.knots, x, 0, size - 1)?;
            if self.knots[segment].get_x() == x {
                self.knots[segment].overwrite(knot.get_y(), knot.get_y2());
                segment
            } else if self.knots[segment + 1].get_x() == x {
                self.knots[segment + 1].overwrite(knot.get_y(), knot.get_y2());
                segment + 1
            } else {
                self.knots.insert(segment + 1, knot);
                segment + 1
            }
        };

        trace!("knot at x = {} stored at index {}, {} knots", x, index, self.knots.len());
        Ok(index)
    }

    pub fn clear(&mut self) {
        self.knots.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.knots.is_empty()
    }

    pub fn num_knots(&self) -> usize {
        self.knots.len()
    }

    pub fn num_segments(&self) -> usize {
        self.knots.len().saturating_sub(1)
    }

    pub fn knots(&self) -> &[Knot] {
        &self.knots
    }

    pub fn knot(&self, index: usize) -> Option<Knot> {
        self.knots.get(index).copied()
    }

    /// Interval on which the spline is defined, `None` with fewer than two knots.
    pub fn domain(&self) -> Option<(f64, f64)> {
        match (self.knots.first(), self.knots.last()) {
            (Some(first), Some(last)) if self.knots.len() > 1 => Some((first.get_x(), last.get_x())),
            _ => None,
        }
    }

    pub fn segment(&self, index: usize) -> Result<Segment> {
        if index >= self.num_segments() {
            return Err(SplineError::InvalidSegment { index, count: self.num_segments() });
        }
        Ok(Segment::from_knots(&self.knots[index], &self.knots[index + 1]))
    }

    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.knots.windows(2).map(|w| Segment::from_knots(&w[0], &w[1]))
    }

    /// Index of the segment containing `x`, found by bisection over all knots.
    pub fn find_segment(&self, x: f64) -> Result<usize> {
        find_segment_bisect(&self.knots, x, 0, self.knots.len().saturating_sub(1))
    }

    /// Bisection restricted to knots `index_min..=index_max`.
    pub fn find_segment_in(&self, x: f64, index_min: usize, index_max: usize) -> Result<usize> {
        find_segment_bisect(&self.knots, x, index_min, index_max)
    }

    /// Linear search starting from segment `hint`.
    pub fn find_segment_from(&self, x: f64, hint: usize) -> Result<usize> {
        find_segment_linear(&self.knots, x, hint)
    }

    /// Evaluates the spline at `x`, `NaN` where it is undefined.
    pub fn evaluate(&self, x: f64, evaluation: Evaluation) -> f64 {
        self.try_evaluate(x, evaluation).unwrap_or(f64::NAN)
    }

    pub fn try_evaluate(&self, x: f64, evaluation: Evaluation) -> Result<f64> {
        let index = self.find_segment(x)?;
        Ok(self.evaluate_segment(index, x, evaluation))
    }

    /// Evaluates the spline at `x` searching linearly from segment `hint`, which
    /// is updated to the segment used. `NaN` where the spline is undefined, the
    /// hint is left untouched then.
    pub fn evaluate_from(&self, x: f64, evaluation: Evaluation, hint: &mut usize) -> f64 {
        match self.find_segment_from(x, *hint) {
            Ok(index) => {
                *hint = index;
                self.evaluate_segment(index, x, evaluation)
            }
            Err(_) => f64::NAN,
        }
    }

    /// Evaluates the spline at every x, carrying the located segment over to
    /// the next query. Fastest for sorted input.
    pub fn batch_evaluate(&self, x_values: &[f64], evaluation: Evaluation) -> Vec<f64> {
        let mut hint = 0;
        x_values
            .iter()
            .map(|x| self.evaluate_from(*x, evaluation, &mut hint))
            .collect()
    }

    /// Evaluator remembering the last segment it used.
    pub fn cursor(&self) -> Cursor<'_> {
        Cursor { spline: self, segment: 0 }
    }

    /// Reads knots stored one `x y y2` triple per line.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let knots = io::load_knots(path.as_ref())?;
        Spline::from_knots(knots)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        io::save_knots(path.as_ref(), &self.knots)
    }

    fn evaluate_segment(&self, index: usize, x: f64, evaluation: Evaluation) -> f64 {
        evaluate_between(&self.knots[index], &self.knots[index + 1], x, evaluation)
    }
}

/// Sequential evaluator over a borrowed [Spline]. While it lives the spline
/// cannot be modified.
///
/// # Example
/// ```
/// use cubic_knots::{BoundaryCondition, Evaluation, Point, Spline};
///
/// let points: Vec<Point> = (0..6).map(|i| Point::new(i as f64, (i * i) as f64)).collect();
/// let spline = Spline::from_points(&points, BoundaryCondition::NotAKnot).unwrap();
///
/// let mut cursor = spline.cursor();
/// for i in 0..=50 {
///     let x = i as f64 / 10.0;
///     assert!((cursor.evaluate(x, Evaluation::Value).unwrap() - x * x).abs() < 1e-9);
/// }
/// assert_eq!(4, cursor.segment());
/// ```
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    spline: &'a Spline,
    segment: usize,
}

impl Cursor<'_> {
    pub fn evaluate(&mut self, x: f64, evaluation: Evaluation) -> Result<f64> {
        self.segment = self.spline.find_segment_from(x, self.segment)?;
        Ok(self.spline.evaluate_segment(self.segment, x, evaluation))
    }

    pub fn segment(&self) -> usize {
        self.segment
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use assert_approx_eq::assert_approx_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;
    use crate::boundary::EndConstraint;

    fn x_squared_spline() -> Spline {
        let points: Vec<Point> = [0.0, 0.9, 1.1, 1.7, 2.0]
            .iter()
            .map(|x: &f64| Point::new(*x, x.powi(2)))
            .collect();
        Spline::from_points(&points, BoundaryCondition::FirstDerivative { start: 0.0, end: 4.0 }).unwrap()
    }

    #[test]
    fn over_x_squared_function() {
        let eps = 1e-9;
        let spline = x_squared_spline();

        assert_eq!(5, spline.num_knots());
        assert_eq!(4, spline.num_segments());
        assert_approx_eq!(spline.evaluate(0.0, Evaluation::Value), 0.0, eps);
        assert_approx_eq!(spline.evaluate(0.13, Evaluation::Value), 0.13_f64.powi(2), eps);
        assert_approx_eq!(spline.evaluate(0.69, Evaluation::Value), 0.69_f64.powi(2), eps);
        assert_approx_eq!(spline.evaluate(1.0, Evaluation::Value), 1.0, eps);
        assert_approx_eq!(spline.evaluate(1.8643128, Evaluation::Value), 1.8643128_f64.powi(2), eps);
        assert_approx_eq!(spline.evaluate(2.0, Evaluation::Value), 4.0, eps);
        assert_approx_eq!(spline.evaluate(1.3, Evaluation::FirstDerivative), 2.6, eps);
        assert_approx_eq!(spline.evaluate(1.3, Evaluation::SecondDerivative), 2.0, eps);

        assert!(spline.evaluate(3.0, Evaluation::Value).is_nan());
        assert!(spline.evaluate(-0.1, Evaluation::FirstDerivative).is_nan());
        assert!(matches!(spline.try_evaluate(3.0, Evaluation::Value), Err(SplineError::UndefinedAt(_))));
    }

    #[test]
    fn over_x_squared_function_with_cursor() {
        let eps = 1e-9;
        let spline = x_squared_spline();
        let mut cursor = spline.cursor();

        for x in [0.0, 0.13, 0.69, 1.0, 1.13, 1.8643128, 2.0] {
            assert_approx_eq!(cursor.evaluate(x, Evaluation::Value).unwrap(), x * x, eps);
        }
        assert_eq!(3, cursor.segment());

        assert!(cursor.evaluate(3.0, Evaluation::Value).is_err());
        assert_eq!(3, cursor.segment());

        assert_approx_eq!(cursor.evaluate(0.95, Evaluation::Value).unwrap(), 0.9025, eps);
        assert_eq!(1, cursor.segment());
    }

    #[test]
    fn over_x_squared_function_batch() {
        let eps = 1e-9;
        let spline = x_squared_spline();

        let x_vector = vec![0.0, 0.13, 0.69, 1.0, 1.13, 1.8643128, 2.0];
        let result = spline.batch_evaluate(&x_vector, Evaluation::Value);

        assert_eq!(x_vector.len(), result.len());
        for i in 0..x_vector.len() {
            assert_approx_eq!(result[i], x_vector[i].powi(2), eps);
        }

        let x_vector = vec![0.0, 0.13, 3.0, 1.0];
        let result = spline.batch_evaluate(&x_vector, Evaluation::Value);
        assert!(result[2].is_nan());
        assert_approx_eq!(result[3], 1.0, eps);
    }

    #[test]
    fn evaluate_from_updates_hint() {
        let spline = x_squared_spline();
        let mut hint = 0;

        spline.evaluate_from(1.5, Evaluation::Value, &mut hint);
        assert_eq!(2, hint);

        assert!(spline.evaluate_from(2.5, Evaluation::Value, &mut hint).is_nan());
        assert_eq!(2, hint);

        spline.evaluate_from(0.5, Evaluation::Value, &mut hint);
        assert_eq!(0, hint);
    }

    #[test]
    fn natural_three_points() {
        let eps = 1e-12;
        let points = vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0), Point::new(2.0, 0.0)];
        let spline = Spline::from_points(&points, BoundaryCondition::Natural).unwrap();

        let knots = spline.knots();
        assert_eq!(3, knots.len());
        assert_approx_eq!(knots[0].get_y2(), 0.0, eps);
        assert_approx_eq!(knots[1].get_y2(), -3.0, eps);
        assert_approx_eq!(knots[2].get_y2(), 0.0, eps);

        let expected = evaluate_between(&knots[0], &knots[1], 0.5, Evaluation::Value);
        assert_approx_eq!(spline.evaluate(0.5, Evaluation::Value), expected, eps);
        assert_approx_eq!(spline.evaluate(0.5, Evaluation::Value), 0.6875, eps);
        assert_approx_eq!(spline.evaluate(1.5, Evaluation::Value), 0.6875, eps);
    }

    #[test]
    fn interpolate_rebuilds_from_scratch() {
        let mut spline = Spline::from_knots(vec![Knot::new(-5.0, 1.0, 0.0), Knot::new(10.0, 1.0, 0.0)]).unwrap();
        let points: Vec<Point> = (0..4).map(|i| Point::new(i as f64, (i as f64).sqrt())).collect();

        assert_eq!(4, spline.interpolate(&points, BoundaryCondition::Clamped).unwrap());
        assert_eq!(Some((0.0, 3.0)), spline.domain());

        let boundary = BoundaryCondition::FirstAndSecondDerivative {
            start: EndConstraint::new(0.0, 0.0),
            end: EndConstraint::new(0.0, 0.0),
        };
        let count = spline.interpolate(&points, boundary);
        assert!(matches!(count, Err(SplineError::InterpolationFailed(_))));
        assert!(spline.is_empty());
    }

    #[test]
    fn two_points_fail() {
        let points = vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)];
        let error = Spline::from_points(&points, BoundaryCondition::Natural).unwrap_err();

        assert!(matches!(error, SplineError::InterpolationFailed(_)));
        assert_eq!(-6, error.code());
    }

    #[test]
    fn segments_match_knots() {
        let eps = 1e-9;
        let points: Vec<Point> = [0.0, 0.5, 1.5, 2.0, 3.5].iter().map(|x: &f64| Point::new(*x, x.cos())).collect();
        let spline = Spline::from_points(&points, BoundaryCondition::Natural).unwrap();

        assert_eq!(spline.num_segments(), spline.segments().count());
        for (i, segment) in spline.segments().enumerate() {
            assert_eq!(segment, spline.segment(i).unwrap());
            assert_eq!(spline.knots()[i].get_x(), segment.get_x0());
            let x = segment.get_x0() + 0.25;
            assert_approx_eq!(segment.evaluate(x, Evaluation::Value), spline.evaluate(x, Evaluation::Value), eps);
        }

        assert!(matches!(spline.segment(4), Err(SplineError::InvalidSegment { index: 4, count: 4 })));
        assert!(Spline::new().segment(0).is_err());
    }

    #[test]
    fn continuity_at_knots() {
        let eps = 1e-9;
        let mut rng = StdRng::seed_from_u64(5);
        let mut x = 0.0;
        let mut points = Vec::new();
        for _ in 0..25 {
            x += rng.gen_range(0.05..2.0);
            points.push(Point::new(x, rng.gen_range(-3.0..3.0)));
        }

        for boundary in [BoundaryCondition::Natural, BoundaryCondition::Clamped, BoundaryCondition::NotAKnot] {
            let spline = Spline::from_points(&points, boundary).unwrap();
            let knots = spline.knots();
            for i in 1..knots.len() - 1 {
                let x = knots[i].get_x();
                for evaluation in [Evaluation::Value, Evaluation::FirstDerivative, Evaluation::SecondDerivative] {
                    assert_approx_eq!(
                        evaluate_between(&knots[i - 1], &knots[i], x, evaluation),
                        evaluate_between(&knots[i], &knots[i + 1], x, evaluation),
                        eps
                    );
                }
            }
        }
    }

    #[test]
    fn insertion_keeps_order_and_overwrites() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut spline = Spline::new();
        let mut expected = BTreeMap::new();

        for _ in 0..300 {
            let key: i32 = rng.gen_range(-40..40);
            let y = rng.gen_range(-1.0..1.0);
            let index = spline.insert_knot(Knot::new(key as f64 * 0.5, y, 2.0 * y)).unwrap();
            expected.insert(key, y);

            assert_eq!(key as f64 * 0.5, spline.knots()[index].get_x());
            assert_eq!(spline.num_knots().saturating_sub(1), spline.num_segments());
            assert!(spline.knots().windows(2).all(|w| w[0].get_x() < w[1].get_x()));
        }

        assert_eq!(expected.len(), spline.num_knots());
        for (knot, (key, y)) in spline.knots().iter().zip(expected.iter()) {
            assert_eq!(*key as f64 * 0.5, knot.get_x());
            assert_eq!(*y, knot.get_y());
            assert_eq!(2.0 * y, knot.get_y2());
        }
    }

    #[test]
    fn insert_existing_x_keeps_count() {
        let mut spline = x_squared_spline();

        assert_eq!(2, spline.insert_knot(Knot::new(1.1, 7.0, 0.0)).unwrap());
        assert_eq!(0, spline.insert_knot(Knot::new(0.0, 7.0, 0.0)).unwrap());
        assert_eq!(4, spline.insert_knot(Knot::new(2.0, 7.0, 0.0)).unwrap());

        assert_eq!(5, spline.num_knots());
        assert_eq!(Some(Knot::new(1.1, 7.0, 0.0)), spline.knot(2));
    }

    #[test]
    fn from_knots_sorts() {
        let spline = Spline::from_knots(vec![
            Knot::new(2.0, 0.0, 0.0),
            Knot::new(0.0, 1.0, 0.0),
            Knot::new(1.0, 2.0, 0.0),
            Knot::new(0.0, 3.0, 0.0),
        ])
        .unwrap();

        let xs: Vec<f64> = spline.knots().iter().map(|k| k.get_x()).collect();
        assert_eq!(vec![0.0, 1.0, 2.0], xs);
        assert_eq!(3.0, spline.knots()[0].get_y());
    }

    #[test]
    fn empty_and_single_knot_splines_are_undefined() {
        let mut spline = Spline::new();

        assert_eq!(0, spline.num_segments());
        assert_eq!(None, spline.domain());
        assert!(spline.evaluate(0.0, Evaluation::Value).is_nan());

        spline.insert_knot(Knot::new(0.0, 1.0, 0.0)).unwrap();
        assert_eq!(0, spline.num_segments());
        assert!(spline.evaluate(0.0, Evaluation::Value).is_nan());
        assert!(spline.find_segment(0.0).is_err());

        spline.clear();
        assert!(spline.is_empty());
    }

    #[test]
    fn restricted_bisection() {
        let spline = x_squared_spline();

        assert_eq!(2, spline.find_segment_in(1.5, 2, 3).unwrap());
        assert!(spline.find_segment_in(0.5, 2, 3).is_err());
        assert_eq!(spline.find_segment(1.5).unwrap(), spline.find_segment_from(1.5, 0).unwrap());
    }

    #[test]
    fn save_and_load_round_trip() {
        let points: Vec<Point> = [0.0, 0.3, 1.0, 1.4, 2.2, 3.0].iter().map(|x: &f64| Point::new(*x, x.exp())).collect();
        let spline = Spline::from_points(&points, BoundaryCondition::NotAKnot).unwrap();
        let path = std::env::temp_dir().join(format!("cubic_knots_round_trip_{}.txt", std::process::id()));

        spline.save(&path).unwrap();
        let loaded = Spline::load(&path);
        std::fs::remove_file(&path).unwrap();

        assert_eq!(spline, loaded.unwrap());
    }

    #[ignore]
    #[test]
    fn perfomance() {
        use std::time::Instant;

        let mut rng = StdRng::seed_from_u64(1);
        let points: Vec<Point> = (0..2000).map(|i| Point::new(i as f64 * 0.01, rng.gen_range(0.0..10.0))).collect();
        let spline = Spline::from_points(&points, BoundaryCondition::Natural).unwrap();

        let x_vector: Vec<f64> = (0..200_000).map(|i| i as f64 * 1e-4).collect();

        let now = Instant::now();
        for x in x_vector.iter() {
            assert!(!spline.evaluate(*x, Evaluation::Value).is_nan());
        }
        println!("bisection time: {:.2?}", now.elapsed());

        let now = Instant::now();
        let result = spline.batch_evaluate(&x_vector, Evaluation::Value);
        assert!(result.iter().all(|y| !y.is_nan()));
        println!("linear search time: {:.2?}", now.elapsed());
    }
}
