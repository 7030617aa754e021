//! Univariate cubic spline interpolation over knots carrying their curvature.
//!
//! A [Spline] is a sorted sequence of [Knot]s `(x, y, y2)`. It is built from
//! [Point]s under one of the [BoundaryCondition] families, or knot by knot with
//! [Spline::insert_knot]. Evaluation locates the enclosing segment either by
//! bisection ([Spline::evaluate]) or by a linear walk from a hint
//! ([Spline::evaluate_from], [Cursor]) which is cheaper for sorted queries.
//!
//! A spline is plain owned data. Mutation needs `&mut Spline` and evaluation
//! `&Spline`, so a spline shared between threads has to sit behind a lock such
//! as `RwLock`.
//!
//! # Example
//! ```
//! use cubic_knots::{BoundaryCondition, Evaluation, Point, Spline};
//! use assert_approx_eq::assert_approx_eq;
//!
//! let points = vec![
//!     Point::new(0.0, 3.0),
//!     Point::new(1.0, 1.0),
//!     Point::new(2.0, 4.0),
//! ];
//! let spline = Spline::from_points(&points, BoundaryCondition::Clamped).unwrap();
//!
//! assert_approx_eq!(1.0, spline.evaluate(1.0, Evaluation::Value), 1e-12);
//! assert_approx_eq!(0.0, spline.evaluate(0.0, Evaluation::FirstDerivative), 1e-12);
//! assert!(spline.evaluate(2.5, Evaluation::Value).is_nan());
//! ```

mod boundary;
mod error;
pub mod io;
mod knot;
mod point;
pub mod search;
mod segment;
mod spline;
pub mod tridiagonal;

pub use boundary::{BoundaryCondition, EndConstraint, DEFAULT_INSERTION_RATIO};
pub use error::{Result, SplineError};
pub use knot::{evaluate_between, Evaluation, Knot};
pub use point::{points_from_slices, Point};
pub use segment::Segment;
pub use spline::{Cursor, Spline};
