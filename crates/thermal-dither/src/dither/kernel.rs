//! Weight tables for the five dither algorithms.
//!
//! Each kernel lists the not-yet-visited neighbours that receive a share of
//! a pixel's quantization error. The tables are fixed data: changing a weight
//! changes every printed image, so treat them as pinned.

/// Neighbour offsets and weights for one algorithm.
///
/// Each entry is `(dx, dy, weight)`; the neighbour at that offset receives
/// `error * weight / divisor`. Entries with `dy == 0` always have `dx > 0`,
/// so every target lies ahead of the current pixel in row-major order.
///
/// # Error Propagation
///
/// The total error propagated is `sum(weights) / divisor`. Floyd-Steinberg,
/// Sierra-2-4A and Stucki propagate 100%. Atkinson propagates 6/8 and
/// Atkinson+ 14/16; the remainder is dropped.
///
/// # Buffer Sizing
///
/// `max_dy` is how many rows ahead the kernel reaches, so the error buffer
/// needs `max_dy + 1` rows.
#[derive(Debug, Clone, Copy)]
pub struct Kernel {
    /// `(dx, dy, weight)` per receiving neighbour.
    pub entries: &'static [(i32, i32, u8)],

    /// Each neighbour receives `error * weight / divisor`.
    pub divisor: u8,

    /// Largest `dy` among the entries.
    pub max_dy: usize,
}

impl Kernel {
    /// Fraction of the quantization error handed to neighbours when none of
    /// them falls outside the image.
    pub fn propagation(&self) -> f32 {
        let sum: u32 = self.entries.iter().map(|&(_, _, w)| w as u32).sum();
        sum as f32 / self.divisor as f32
    }
}

/// Atkinson+ kernel, the recommended default.
///
/// Same six-neighbour footprint as Atkinson but with heavier weights next to
/// the pixel, propagating 14/16 = 87.5% of the error. Midtones keep more
/// detail than classic Atkinson while highlights still do not bloom.
///
/// ```text
///        X   3   2
///    2   3   2
///        2          (/16)
/// ```
pub const ATKINSON_PLUS: Kernel = Kernel {
    entries: &[
        (1, 0, 3),  // right
        (2, 0, 2),  // two right
        (-1, 1, 2), // below left
        (0, 1, 3),  // below
        (1, 1, 2),  // below right
        (0, 2, 2),  // two below
    ],
    divisor: 16,
    max_dy: 2,
};

/// Classic Atkinson.
///
/// Six neighbours at 1/8 each, so only three quarters of the error move on.
/// The lost quarter keeps artifacts from spreading across flat areas.
///
/// ```text
///        X   1   1
///    1   1   1
///        1
/// ```
pub const ATKINSON: Kernel = Kernel {
    entries: &[
        (1, 0, 1),  // right
        (2, 0, 1),  // two right
        (-1, 1, 1), // below left
        (0, 1, 1),  // below
        (1, 1, 1),  // below right
        (0, 2, 1),  // two below
    ],
    divisor: 8,
    max_dy: 2,
};

/// Floyd-Steinberg.
///
/// Four neighbours, weights summing to the divisor.
///
/// ```text
///        X   7
///    3   5   1
/// ```
pub const FLOYD_STEINBERG: Kernel = Kernel {
    entries: &[
        (1, 0, 7),  // right
        (-1, 1, 3), // below left
        (0, 1, 5),  // below
        (1, 1, 1),  // below right
    ],
    divisor: 16,
    max_dy: 1,
};

/// Sierra-2-4A kernel in its two-tap form.
///
/// Half the error goes right, half goes straight down. Cheapest of the five.
///
/// ```text
///    X   1
///    1          (/2)
/// ```
pub const SIERRA_24A: Kernel = Kernel {
    entries: &[(1, 0, 1), (0, 1, 1)],
    divisor: 2,
    max_dy: 1,
};

/// Stucki.
///
/// Twelve neighbours over three rows, weights summing to 42. Smoothest
/// gradients of the set, and the slowest.
///
/// ```text
///            X   8   4
///    2   4   8   4   2
///    1   2   4   2   1
/// ```
pub const STUCKI: Kernel = Kernel {
    entries: &[
        (1, 0, 8),
        (2, 0, 4),
        (-2, 1, 2),
        (-1, 1, 4),
        (0, 1, 8),
        (1, 1, 4),
        (2, 1, 2),
        (-2, 2, 1),
        (-1, 2, 2),
        (0, 2, 4),
        (1, 2, 2),
        (2, 2, 1),
    ],
    divisor: 42,
    max_dy: 2,
};
