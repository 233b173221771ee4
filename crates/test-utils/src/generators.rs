//! Synthetic scalar fields and sample data for mesh and isoline tests.
//!
//! Grids are row-major (row 0 first), matching the vertex order of an
//! implicit mesh grid.

/// A scattered or gridded data item, as a caller would hand to a mesh
/// builder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

/// Lay `values` out on a regular grid starting at `(x0, y0)`.
///
/// # Example
///
/// ```
/// use test_utils::grid_samples;
///
/// let samples = grid_samples(&[1.0, 2.0, 3.0, 4.0], 2, 0.0, 0.0, 1.0, 1.0);
/// assert_eq!(samples[3].x, 1.0);
/// assert_eq!(samples[3].y, 1.0);
/// assert_eq!(samples[3].value, 4.0);
/// ```
pub fn grid_samples(values: &[f64], width: usize, x0: f64, y0: f64, dx: f64, dy: f64) -> Vec<Sample> {
    values
        .iter()
        .enumerate()
        .map(|(i, &value)| Sample {
            x: x0 + dx * (i % width.max(1)) as f64,
            y: y0 + dy * (i / width.max(1)) as f64,
            value,
        })
        .collect()
}

/// Creates a test grid with predictable values.
///
/// Each cell value is calculated as: `col * 1000 + row`, so a vertex can be
/// traced back to its grid cell.
///
/// # Example
///
/// ```
/// use test_utils::create_test_grid;
///
/// let grid = create_test_grid(10, 5);
/// assert_eq!(grid.len(), 50); // 10 * 5
/// assert_eq!(grid[1], 1000.0); // col=1, row=0
/// assert_eq!(grid[10], 1.0);  // col=0, row=1
/// ```
pub fn create_test_grid(width: usize, height: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f64);
        }
    }
    data
}

/// Creates a grid whose value is the row number.
///
/// Every threshold strictly between two rows crosses the grid as one
/// straight horizontal line.
pub fn create_row_ramp_grid(width: usize, height: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        data.extend(std::iter::repeat(row as f64).take(width));
    }
    data
}

/// Creates a radial bump: `peak` at the grid center falling linearly to
/// zero at the corners.
///
/// Thresholds inside `(0, peak)` produce closed rings around the center.
pub fn create_bump_grid(width: usize, height: usize, peak: f64) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height);
    let center_x = (width as f64 - 1.0) / 2.0;
    let center_y = (height as f64 - 1.0) / 2.0;
    let max_dist = center_x.hypot(center_y).max(f64::MIN_POSITIVE);

    for row in 0..height {
        for col in 0..width {
            let dist = (col as f64 - center_x).hypot(row as f64 - center_y);
            data.push(peak * (1.0 - dist / max_dist));
        }
    }
    data
}

/// Creates a smooth wave field `sin(x) * cos(y)` spanning a few periods.
pub fn create_wave_grid(width: usize, height: usize) -> Vec<f64> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            let x = col as f64 / width.max(1) as f64 * std::f64::consts::TAU * 2.0;
            let y = row as f64 / height.max(1) as f64 * std::f64::consts::TAU * 2.0;
            data.push(x.sin() * y.cos() * 50.0 + 50.0);
        }
    }
    data
}

/// Creates a grid filled with a constant value.
pub fn create_constant_grid(width: usize, height: usize, value: f64) -> Vec<f64> {
    vec![value; width * height]
}

/// Creates a zero grid with NaN at the given `(col, row)` positions.
pub fn create_grid_with_nans(
    width: usize,
    height: usize,
    nan_positions: &[(usize, usize)],
) -> Vec<f64> {
    let mut data = vec![0.0; width * height];
    for &(col, row) in nan_positions {
        if col < width && row < height {
            data[row * width + col] = f64::NAN;
        }
    }
    data
}

/// Straight polyline from `start` to `end` with `segments` equal pieces.
pub fn straight_line(start: (f64, f64), end: (f64, f64), segments: usize) -> Vec<(f64, f64)> {
    let segments = segments.max(1);
    (0..=segments)
        .map(|i| {
            let t = i as f64 / segments as f64;
            (start.0 + (end.0 - start.0) * t, start.1 + (end.1 - start.1) * t)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_grid() {
        let grid = create_test_grid(10, 5);
        assert_eq!(grid.len(), 50);
        assert_eq!(grid[0], 0.0); // col=0, row=0
        assert_eq!(grid[1], 1000.0); // col=1, row=0
        assert_eq!(grid[10], 1.0); // col=0, row=1
        assert_eq!(grid[11], 1001.0); // col=1, row=1
    }

    #[test]
    fn test_create_row_ramp_grid() {
        let grid = create_row_ramp_grid(3, 2);
        assert_eq!(grid, vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_create_bump_grid_peaks_in_center() {
        let grid = create_bump_grid(5, 5, 10.0);
        assert_eq!(grid[12], 10.0);
        assert!(grid[0].abs() < 1e-12);
        assert!(grid.iter().all(|&v| v <= 10.0));
    }

    #[test]
    fn test_create_grid_with_nans() {
        let grid = create_grid_with_nans(10, 10, &[(5, 5), (0, 0)]);
        assert!(grid[0].is_nan()); // (0, 0)
        assert!(grid[55].is_nan()); // (5, 5) = row 5 * 10 + col 5
        assert!(!grid[1].is_nan()); // (1, 0) should be 0.0
    }

    #[test]
    fn test_create_constant_grid() {
        assert_eq!(create_constant_grid(2, 3, 7.5), vec![7.5; 6]);
    }

    #[test]
    fn test_grid_samples_layout() {
        let samples = grid_samples(&create_test_grid(3, 2), 3, 10.0, 20.0, 0.5, 2.0);
        assert_eq!(samples.len(), 6);
        assert_eq!((samples[4].x, samples[4].y), (10.5, 22.0));
        assert_eq!(samples[4].value, 1001.0);
    }

    #[test]
    fn test_straight_line() {
        let line = straight_line((0.0, 0.0), (10.0, 0.0), 4);
        assert_eq!(line.len(), 5);
        assert_eq!(line[2], (5.0, 0.0));
    }
}
