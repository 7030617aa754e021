extern crate cubic_knots;

use cubic_knots::{BoundaryCondition, EndConstraint, Evaluation, Point, Spline};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let period = 2.0 * std::f64::consts::PI;
    let number_of_points = 9;
    let mut points: Vec<Point> = (0..number_of_points)
        .map(|i| {
            let x = period * i as f64 / (number_of_points - 1) as f64;
            Point::new(x, x.sin())
        })
        .collect();
    points[number_of_points - 1] = Point::new(period, 0.0);

    let conditions = [
        ("natural", BoundaryCondition::Natural),
        ("clamped", BoundaryCondition::Clamped),
        ("periodic", BoundaryCondition::Periodic),
        ("not-a-knot", BoundaryCondition::NotAKnot),
        ("y1", BoundaryCondition::FirstDerivative { start: 1.0, end: 1.0 }),
        ("y2", BoundaryCondition::SecondDerivative { start: 0.0, end: 0.0 }),
        (
            "y1-y2",
            BoundaryCondition::FirstAndSecondDerivative {
                start: EndConstraint::new(1.0, 0.0).with_ratio(0.25),
                end: EndConstraint::new(1.0, 0.0).with_ratio(0.25),
            },
        ),
    ];

    let splines = conditions
        .iter()
        .map(|(_, condition)| Spline::from_points(&points, *condition))
        .collect::<Result<Vec<_>, _>>()?;

    let names: Vec<&str> = conditions.iter().map(|(name, _)| *name).collect();
    println!("x;{}", names.join(";"));

    let number_of_steps = 64;
    for i in 0..=number_of_steps {
        let x = period * i as f64 / number_of_steps as f64;
        let values: Vec<String> = splines
            .iter()
            .map(|s| format!("{:.4}", s.evaluate(x, Evaluation::Value) - x.sin()))
            .collect();
        println!("{:.3};{}", x, values.join(";"));
    }
    Ok(())
}
