use crate::knot::{Evaluation, Knot};

/// Cubic piece between two adjacent knots written as
/// `a*(x - x0)^3 + b*(x - x0)^2 + c*(x - x0) + d`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    x0: f64,
}

impl Segment {
    pub fn new(a: f64, b: f64, c: f64, d: f64, x0: f64) -> Self {
        Segment { a, b, c, d, x0 }
    }

    /// Derives explicit coefficients of the cubic joining `min` and `max`, anchored at `min.x`.
    pub fn from_knots(min: &Knot, max: &Knot) -> Self {
        let x1 = max.get_x() - min.get_x();
        let a = (max.get_y2() - min.get_y2()) / (6.0 * x1);
        let b = 0.5 * min.get_y2();
        let c = (max.get_y() - a * x1 * x1 * x1 - b * x1 * x1 - min.get_y()) / x1;
        let d = min.get_y();

        Segment { a, b, c, d, x0: min.get_x() }
    }

    pub fn get_a(&self) -> f64 {
        self.a
    }

    pub fn get_b(&self) -> f64 {
        self.b
    }

    pub fn get_c(&self) -> f64 {
        self.c
    }

    pub fn get_d(&self) -> f64 {
        self.d
    }

    pub fn get_x0(&self) -> f64 {
        self.x0
    }

    pub fn evaluate(&self, x: f64, evaluation: Evaluation) -> f64 {
        let t = x - self.x0;
        match evaluation {
            Evaluation::Value => ((self.a * t + self.b) * t + self.c) * t + self.d,
            Evaluation::FirstDerivative => (3.0 * self.a * t + 2.0 * self.b) * t + self.c,
            Evaluation::SecondDerivative => 6.0 * self.a * t + 2.0 * self.b,
        }
    }
}
