//! Plain text persistence.
//!
//! Knots are stored one per line as `x y y2`, samples as `x y`. Fields are
//! separated by whitespace, blank lines and lines starting with `#` are skipped.
//! Writing pads every field to a fixed width and emits no header.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use log::debug;

use crate::error::{Result, SplineError};
use crate::knot::Knot;
use crate::point::Point;

const FIELD_WIDTH: usize = 24;

pub fn read_knots(reader: impl BufRead) -> Result<Vec<Knot>> {
    read_records(reader, |[x, y, y2]: [f64; 3]| Knot::new(x, y, y2))
}

pub fn read_points(reader: impl BufRead) -> Result<Vec<Point>> {
    read_records(reader, |[x, y]: [f64; 2]| Point::new(x, y))
}

pub fn write_knots(mut writer: impl Write, knots: &[Knot]) -> Result<()> {
    for knot in knots {
        writeln!(
            writer,
            "{:>w$e} {:>w$e} {:>w$e}",
            knot.get_x(),
            knot.get_y(),
            knot.get_y2(),
            w = FIELD_WIDTH
        )
        .map_err(SplineError::FileWrite)?;
    }
    writer.flush().map_err(SplineError::FileWrite)
}

pub fn write_points(mut writer: impl Write, points: &[Point]) -> Result<()> {
    for point in points {
        writeln!(writer, "{:>w$e} {:>w$e}", point.get_x(), point.get_y(), w = FIELD_WIDTH)
            .map_err(SplineError::FileWrite)?;
    }
    writer.flush().map_err(SplineError::FileWrite)
}

pub fn load_knots(path: &Path) -> Result<Vec<Knot>> {
    let file = File::open(path).map_err(SplineError::FileRead)?;
    let knots = read_knots(BufReader::new(file))?;
    debug!("read {} knots from {}", knots.len(), path.display());
    Ok(knots)
}

pub fn save_knots(path: &Path, knots: &[Knot]) -> Result<()> {
    let file = File::create(path).map_err(SplineError::FileWrite)?;
    write_knots(BufWriter::new(file), knots)?;
    debug!("wrote {} knots to {}", knots.len(), path.display());
    Ok(())
}

pub fn load_points(path: &Path) -> Result<Vec<Point>> {
    let file = File::open(path).map_err(SplineError::FileRead)?;
    read_points(BufReader::new(file))
}

fn read_records<T, const N: usize>(reader: impl BufRead, build: impl Fn([f64; N]) -> T) -> Result<Vec<T>> {
    let mut records = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(SplineError::FileRead)?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        records.push(build(parse_fields(line, index + 1)?));
    }
    Ok(records)
}

fn parse_fields<const N: usize>(line: &str, line_number: usize) -> Result<[f64; N]> {
    let format_error = |message: String| SplineError::FileFormat { line: line_number, message };

    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != N {
        return Err(format_error(format!("expected {} fields, got '{}'", N, line)));
    }

    let mut values = [0.0; N];
    for (value, part) in values.iter_mut().zip(parts) {
        *value = part
            .parse()
            .map_err(|_| format_error(format!("invalid number '{}'", part)))?;
    }
    Ok(values)
}
