extern crate cubic_knots;

use std::io::{stdin, stdout};

use anyhow::Context;
use cubic_knots::{io, BoundaryCondition, Spline};

/// Reads `x y` samples from stdin and prints the knots of their not-a-knot spline.
fn main() -> anyhow::Result<()> {
    env_logger::init();

    let points = io::read_points(stdin().lock()).context("reading samples from stdin")?;
    let spline = Spline::from_points(&points, BoundaryCondition::NotAKnot)
        .with_context(|| format!("interpolating {} samples", points.len()))?;

    println!("# x y y2");
    io::write_knots(stdout().lock(), spline.knots())?;
    Ok(())
}
