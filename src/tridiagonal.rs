//! Tridiagonal systems behind every boundary condition family.
//!
//! Unknowns are either first or second derivatives at the knots. Interior rows
//! follow from continuity between neighbouring cubics, first and last rows are
//! supplied by the caller as [BoundaryRow]. Systems are solved with the Thomas
//! algorithm, cyclic ones through Sherman-Morrison. When elimination without
//! pivoting breaks down the system is handed to a dense LU decomposition.

use log::{debug, warn};
use nalgebra::{DMatrix, DVector};

use crate::error::{Result, SplineError};
use crate::point::Point;

const PIVOT_TOLERANCE: f64 = 1e-13;

/// Coefficients of the first or last equation of a general system.
/// `off` multiplies the unknown adjacent to the boundary one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryRow {
    pub diag: f64,
    pub off: f64,
    pub rhs: f64,
}

impl BoundaryRow {
    pub fn new(diag: f64, off: f64, rhs: f64) -> Self {
        BoundaryRow { diag, off, rhs }
    }

    /// Row pinning the boundary unknown to `value`.
    pub fn fixed(value: f64) -> Self {
        BoundaryRow { diag: 1.0, off: 0.0, rhs: value }
    }
}

/// `lower[i] * u[i-1] + diag[i] * u[i] + upper[i] * u[i+1] = rhs[i]`.
/// `lower[0]` and `upper[n-1]` are ignored.
#[derive(Debug, Clone)]
pub struct TridiagonalSystem {
    lower: DVector<f64>,
    diag: DVector<f64>,
    upper: DVector<f64>,
    rhs: DVector<f64>,
}

impl TridiagonalSystem {
    pub fn zeros(size: usize) -> Self {
        TridiagonalSystem {
            lower: DVector::zeros(size),
            diag: DVector::zeros(size),
            upper: DVector::zeros(size),
            rhs: DVector::zeros(size),
        }
    }

    pub fn len(&self) -> usize {
        self.diag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diag.is_empty()
    }

    pub fn set_row(&mut self, row: usize, lower: f64, diag: f64, upper: f64, rhs: f64) {
        self.lower[row] = lower;
        self.diag[row] = diag;
        self.upper[row] = upper;
        self.rhs[row] = rhs;
    }

    pub fn solve(&self) -> Result<DVector<f64>> {
        if self.is_empty() {
            return Err(SplineError::interpolation("empty linear system"));
        }

        match thomas(&self.lower, &self.diag, &self.upper, &self.rhs) {
            Some(solution) => Ok(solution),
            None => {
                warn!("tridiagonal elimination of {} unknowns broke down, using dense LU", self.len());
                dense_solve(self.to_dense(), &self.rhs)
            }
        }
    }

    fn to_dense(&self) -> DMatrix<f64> {
        let size = self.len();
        let mut matrix = DMatrix::<f64>::zeros(size, size);
        for i in 0..size {
            matrix[(i, i)] = self.diag[i];
            if i > 0 {
                matrix[(i, i - 1)] = self.lower[i];
            }
            if i + 1 < size {
                matrix[(i, i + 1)] = self.upper[i];
            }
        }
        matrix
    }
}

/// Symmetric tridiagonal system with wrap-around corners.
/// `off[i]` couples unknowns `i` and `(i + 1) % n`, so `off[n-1]` is the corner element.
#[derive(Debug, Clone)]
pub struct CyclicTridiagonalSystem {
    diag: DVector<f64>,
    off: DVector<f64>,
    rhs: DVector<f64>,
}

impl CyclicTridiagonalSystem {
    pub fn zeros(size: usize) -> Self {
        CyclicTridiagonalSystem {
            diag: DVector::zeros(size),
            off: DVector::zeros(size),
            rhs: DVector::zeros(size),
        }
    }

    pub fn len(&self) -> usize {
        self.diag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diag.is_empty()
    }

    pub fn set_row(&mut self, row: usize, diag: f64, off: f64, rhs: f64) {
        self.diag[row] = diag;
        self.off[row] = off;
        self.rhs[row] = rhs;
    }

    pub fn solve(&self) -> Result<DVector<f64>> {
        let size = self.len();
        if size < 2 {
            return Err(SplineError::interpolation("cyclic system needs at least 2 unknowns"));
        }
        // two unknowns: both couplings land on the same matrix entry
        if size == 2 {
            return dense_solve(self.to_dense(), &self.rhs);
        }

        match self.sherman_morrison() {
            Some(solution) => Ok(solution),
            None => {
                warn!("cyclic elimination of {} unknowns broke down, using dense LU", size);
                dense_solve(self.to_dense(), &self.rhs)
            }
        }
    }

    fn sherman_morrison(&self) -> Option<DVector<f64>> {
        let size = self.len();
        let corner = self.off[size - 1];
        let gamma = -self.diag[0];
        if gamma == 0.0 {
            return None;
        }

        let mut lower = DVector::<f64>::zeros(size);
        let mut upper = DVector::<f64>::zeros(size);
        for i in 0..size - 1 {
            upper[i] = self.off[i];
            lower[i + 1] = self.off[i];
        }

        let mut diag = self.diag.clone();
        diag[0] -= gamma;
        diag[size - 1] -= corner * corner / gamma;

        let x = thomas(&lower, &diag, &upper, &self.rhs)?;

        let mut u = DVector::<f64>::zeros(size);
        u[0] = gamma;
        u[size - 1] = corner;
        let z = thomas(&lower, &diag, &upper, &u)?;

        let denominator = 1.0 + z[0] + corner * z[size - 1] / gamma;
        if denominator == 0.0 {
            return None;
        }
        let factor = (x[0] + corner * x[size - 1] / gamma) / denominator;

        let solution = x - z * factor;
        if solution.iter().all(|v| v.is_finite()) {
            Some(solution)
        } else {
            None
        }
    }

    fn to_dense(&self) -> DMatrix<f64> {
        let size = self.len();
        let mut matrix = DMatrix::<f64>::zeros(size, size);
        for i in 0..size {
            let j = (i + 1) % size;
            matrix[(i, i)] += self.diag[i];
            matrix[(i, j)] += self.off[i];
            matrix[(j, i)] += self.off[i];
        }
        matrix
    }
}

/// Thomas algorithm. Returns `None` when a pivot vanishes relative to its row.
fn thomas(
    lower: &DVector<f64>,
    diag: &DVector<f64>,
    upper: &DVector<f64>,
    rhs: &DVector<f64>,
) -> Option<DVector<f64>> {
    let size = diag.len();
    let mut c_prime = DVector::<f64>::zeros(size);
    let mut d_prime = DVector::<f64>::zeros(size);

    for i in 0..size {
        let (pivot, carried_rhs) = if i == 0 {
            (diag[0], rhs[0])
        } else {
            (
                diag[i] - lower[i] * c_prime[i - 1],
                rhs[i] - lower[i] * d_prime[i - 1],
            )
        };

        let scale = diag[i].abs() + lower[i].abs() + upper[i].abs();
        if !(pivot.abs() > PIVOT_TOLERANCE * scale) {
            return None;
        }

        if i + 1 < size {
            c_prime[i] = upper[i] / pivot;
        }
        d_prime[i] = carried_rhs / pivot;
    }

    let mut x = DVector::<f64>::zeros(size);
    x[size - 1] = d_prime[size - 1];
    for i in (0..size - 1).rev() {
        x[i] = d_prime[i] - c_prime[i] * x[i + 1];
    }

    if x.iter().all(|v| v.is_finite()) {
        Some(x)
    } else {
        None
    }
}

fn dense_solve(matrix: DMatrix<f64>, rhs: &DVector<f64>) -> Result<DVector<f64>> {
    match matrix.lu().solve(rhs) {
        Some(solution) if solution.iter().all(|v| v.is_finite()) => Ok(solution),
        _ => Err(SplineError::interpolation("singular system")),
    }
}

fn check_general(points: &[Point]) -> Result<()> {
    if points.len() < 3 {
        return Err(SplineError::interpolation(format!(
            "at least 3 points are required, got {}",
            points.len()
        )));
    }
    Ok(())
}

/// Solves for the first derivative at every point.
///
/// Interior row `i`, with `hl`, `hr` the widths left and right of the point and
/// `dl`, `dr` the matching increments of `y`:
/// `hr*k[i-1] + 2*(hl + hr)*k[i] + hl*k[i+1] = 3*(hl*dr/hr + hr*dl/hl)`.
pub fn solve_first_derivatives(
    points: &[Point],
    first: BoundaryRow,
    last: BoundaryRow,
) -> Result<DVector<f64>> {
    check_general(points)?;
    let size = points.len();
    let mut system = TridiagonalSystem::zeros(size);

    system.set_row(0, 0.0, first.diag, first.off, first.rhs);
    for i in 1..size - 1 {
        let (hl, hr, dl, dr) = flanks(points, i);
        system.set_row(i, hr, 2.0 * (hl + hr), hl, 3.0 * (hl * dr / hr + hr * dl / hl));
    }
    system.set_row(size - 1, last.off, last.diag, 0.0, last.rhs);

    debug!("solving {} first derivatives", size);
    system.solve()
}

/// Solves for the second derivative at every point.
///
/// Interior row `i`: `hl*m[i-1] + 2*(hl + hr)*m[i] + hr*m[i+1] = 6*(dr/hr - dl/hl)`.
pub fn solve_second_derivatives(
    points: &[Point],
    first: BoundaryRow,
    last: BoundaryRow,
) -> Result<DVector<f64>> {
    check_general(points)?;
    let size = points.len();
    let mut system = TridiagonalSystem::zeros(size);

    system.set_row(0, 0.0, first.diag, first.off, first.rhs);
    for i in 1..size - 1 {
        let (hl, hr, dl, dr) = flanks(points, i);
        system.set_row(i, hl, 2.0 * (hl + hr), hr, 6.0 * (dr / hr - dl / hl));
    }
    system.set_row(size - 1, last.off, last.diag, 0.0, last.rhs);

    debug!("solving {} second derivatives", size);
    system.solve()
}

/// Solves for periodic second derivatives. The first and last point share one
/// unknown, so the system has one row less than there are points. The returned
/// vector has an entry per point with the last one copied from the first.
pub fn solve_periodic_second_derivatives(points: &[Point]) -> Result<DVector<f64>> {
    if points.len() < 3 {
        return Err(SplineError::interpolation(format!(
            "periodic interpolation requires at least 3 points, got {}",
            points.len()
        )));
    }

    let unknowns = points.len() - 1;
    let widths: Vec<f64> = points.windows(2).map(|w| w[1].get_x() - w[0].get_x()).collect();
    let slopes: Vec<f64> = points
        .windows(2)
        .zip(&widths)
        .map(|(w, h)| (w[1].get_y() - w[0].get_y()) / h)
        .collect();

    let mut system = CyclicTridiagonalSystem::zeros(unknowns);
    for i in 0..unknowns {
        let previous = (i + unknowns - 1) % unknowns;
        system.set_row(
            i,
            2.0 * (widths[previous] + widths[i]),
            widths[i],
            6.0 * (slopes[i] - slopes[previous]),
        );
    }

    debug!("solving {} periodic second derivatives", unknowns);
    let solution = system.solve()?;

    let mut y2 = DVector::<f64>::zeros(points.len());
    y2.rows_mut(0, unknowns).copy_from(&solution);
    y2[unknowns] = solution[0];
    Ok(y2)
}

fn flanks(points: &[Point], i: usize) -> (f64, f64, f64, f64) {
    let hl = points[i].get_x() - points[i - 1].get_x();
    let hr = points[i + 1].get_x() - points[i].get_x();
    let dl = points[i].get_y() - points[i - 1].get_y();
    let dr = points[i + 1].get_y() - points[i].get_y();
    (hl, hr, dl, dr)
}
