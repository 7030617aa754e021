//! Mapping of a location to the segment enclosing it.
//!
//! Both locators return the index `i` with `knots[i].x <= x < knots[i + 1].x`,
//! except at the last knot which belongs to the last segment.

use crate::error::{Result, SplineError};
use crate::knot::Knot;

/// Bisection restricted to knots `index_min..=index_max`. The range is clamped
/// to the knots available. Suited for queries in random order.
pub fn find_segment_bisect(knots: &[Knot], x: f64, index_min: usize, index_max: usize) -> Result<usize> {
    if knots.len() < 2 {
        return Err(SplineError::UndefinedAt(x));
    }

    let mut max = index_max.clamp(1, knots.len() - 1);
    let mut min = index_min.min(max - 1);

    if !(knots[min].get_x() <= x && x <= knots[max].get_x()) {
        return Err(SplineError::UndefinedAt(x));
    }

    while max - min > 1 {
        let mid = (min + max) / 2;
        if x < knots[mid].get_x() {
            max = mid;
        } else {
            min = mid;
        }
    }
    Ok(min)
}

/// Walks one knot at a time from segment `hint`. Cheap when consecutive
/// queries move monotonically through the spline.
pub fn find_segment_linear(knots: &[Knot], x: f64, hint: usize) -> Result<usize> {
    let size = knots.len();
    if size < 2 || !(knots[0].get_x() <= x && x <= knots[size - 1].get_x()) {
        return Err(SplineError::UndefinedAt(x));
    }

    let last_segment = size - 2;
    let mut index = hint.min(last_segment);

    while x < knots[index].get_x() {
        index -= 1;
    }
    while index < last_segment && x >= knots[index + 1].get_x() {
        index += 1;
    }
    Ok(index)
}
