//! Resize policy: load-factor watermarks and prime table sizing.
//!
//! All functions here are pure. Load factors are kept as integer ratios so
//! that threshold checks never depend on floating-point rounding.

/// High-load watermark as `numerator / denominator` (0.7).
pub const MAX_LOAD: (usize, usize) = (7, 10);

/// Low-load watermark as `numerator / denominator` (0.3).
pub const MIN_LOAD: (usize, usize) = (3, 10);

/// Table size used when no expected count is given.
pub const MIN_TABLE_SIZE: usize = 2;

/// Largest table the map will allocate. `2^31 - 1` is itself prime.
pub const MAX_TABLE_SIZE: usize = i32::MAX as usize;

/// Trial-division primality test using the 6k +/- 1 wheel.
pub fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        return true;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }
    let mut i = 5usize;
    while i.checked_mul(i).is_some_and(|sq| sq <= n) {
        if n % i == 0 || n % (i + 2) == 0 {
            return false;
        }
        i += 6;
    }
    true
}

/// Smallest prime `>= n` that fits in a table, or `None` past `MAX_TABLE_SIZE`.
pub fn smallest_prime_at_least(n: usize) -> Option<usize> {
    let mut candidate = n.max(MIN_TABLE_SIZE);
    while candidate <= MAX_TABLE_SIZE {
        if is_prime(candidate) {
            return Some(candidate);
        }
        candidate += 1;
    }
    None
}

/// `ceil(n / 0.7)`, the number of buckets that holds `n` entries at the high watermark.
fn buckets_for(n: usize) -> Option<usize> {
    let (num, den) = MAX_LOAD;
    n.checked_mul(den).map(|scaled| scaled.div_ceil(num))
}

/// Initial table size for an optional expected-count hint.
///
/// Returns `None` when the hint cannot be honored within `MAX_TABLE_SIZE`.
pub fn initial_table_size(expected: Option<usize>) -> Option<usize> {
    match expected {
        Some(n) if n > 0 => buckets_for(n).and_then(smallest_prime_at_least),
        _ => Some(MIN_TABLE_SIZE),
    }
}

/// True when `count / table_size` is strictly above the high watermark.
pub fn exceeds_max_load(count: usize, table_size: usize) -> bool {
    let (num, den) = MAX_LOAD;
    (count as u128) * (den as u128) > (table_size as u128) * (num as u128)
}

/// True when `count / table_size` is strictly below the low watermark.
pub fn below_min_load(count: usize, table_size: usize) -> bool {
    let (num, den) = MIN_LOAD;
    (count as u128) * (den as u128) < (table_size as u128) * (num as u128)
}

/// Table size after growth: smallest prime `>= 2 * count / 0.7`.
///
/// `None` means growth would exceed `MAX_TABLE_SIZE` and must be skipped.
pub fn grow_target(count: usize) -> Option<usize> {
    count
        .checked_mul(2)
        .and_then(buckets_for)
        .and_then(smallest_prime_at_least)
}

/// Table size after a shrinking removal, never below `min_table_size`.
pub fn shrink_target(count: usize, min_table_size: usize) -> Option<usize> {
    buckets_for(count)
        .and_then(smallest_prime_at_least)
        .map(|size| size.max(min_table_size))
}

/// Table size for an explicit trim: smallest prime `>= count`.
pub fn trim_target(count: usize) -> Option<usize> {
    smallest_prime_at_least(count)
}
