//! Shared test utilities for the geoviz workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic scalar field generators
//! - JSON spec fixtures and grid definitions
//! - Approximate equality assertions
//! - A one-shot tracing subscriber for tests
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{assert_approx_eq, create_bump_grid, fixtures};
//! ```

pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;

use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

static INIT_TRACING: Once = Once::new();

/// Install a test-friendly tracing subscriber, once per process.
///
/// The filter comes from `RUST_LOG` and defaults to `warn`. Output goes
/// through the test writer so it is captured per test.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_test_writer()
            .try_init();
    });
}

/// Panics unless `|left - right| <= epsilon`. NaN on either side fails.
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(0.1 + 0.2, 0.3, 1e-12);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if !(diff <= epsilon) {
            panic!(
                "assertion failed: {} ~= {}\n  left: {:?}\n right: {:?}\n  diff: {:?} (epsilon {:?})",
                stringify!($left),
                stringify!($right),
                left,
                right,
                diff,
                epsilon
            );
        }
    }};
}

/// Component-wise [`assert_approx_eq!`] for `(x, y)` pairs.
///
/// ```ignore
/// use test_utils::assert_xy_approx_eq;
///
/// assert_xy_approx_eq!((p.x, p.y), (0.0, 0.5), 1e-12);
/// ```
#[macro_export]
macro_rules! assert_xy_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let (lx, ly): (f64, f64) = $left;
        let (rx, ry): (f64, f64) = $right;
        $crate::assert_approx_eq!(lx, rx, $epsilon);
        $crate::assert_approx_eq!(ly, ry, $epsilon);
    }};
}
