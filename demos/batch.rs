extern crate cubic_knots;

use cubic_knots::{BoundaryCondition, Evaluation, Point, Spline};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let x_min = 0.0;
    let x_max = 6.0;

    let points = vec![
        Point::new(x_min, 1.0),
        Point::new(1.0, -1.0),
        Point::new(2.0, 0.0),
        Point::new(4.0, 3.0),
        Point::new(5.0, 1.0),
        Point::new(x_max, 1.0),
    ];

    let spline = Spline::from_points(&points, BoundaryCondition::Clamped)?;

    let number_of_steps = 60;
    let step = (x_max - x_min) / number_of_steps as f64;

    let mut x_vector = Vec::new();

    for i in 0..=number_of_steps {
        x_vector.push(x_min + step * i as f64);
    }

    let result = spline.batch_evaluate(&x_vector, Evaluation::Value);

    println!("x;y");
    for i in 0..=number_of_steps {
        println!("{:.2};{:.2}", x_vector[i], result[i]);
    }
    Ok(())
}
