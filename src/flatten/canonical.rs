//! Deterministic ordering for unordered row sets
//!
//! Traversal order depends on mapping iteration order, so two runs over equal
//! inputs may emit the same rows in different orders. [`canonicalize`] sorts
//! the pairs inside each row and then the rows themselves, which makes row
//! sets comparable with `==`.
//!
//! Values are only comparable within one [`PrimitiveKind`]. A key that holds a
//! string in one row and a number in another is a caller error and is
//! reported as [`CanonicalError::KindMismatch`] instead of being ordered
//! arbitrarily.

use crate::flatten::row::Row;
use crate::flatten::value::{Primitive, PrimitiveKind};
use std::cmp::Ordering;
use std::collections::HashMap;
use thiserror::Error;

/// One row as `(key, value)` pairs sorted by key
pub type CanonicalRow = Vec<(String, Primitive)>;

/// Sorted rows, each with sorted pairs
pub type Canonical = Vec<CanonicalRow>;

#[derive(Debug, Error, PartialEq)]
pub enum CanonicalError {
    #[error("cannot compare values of key '{key}': {left} vs {right}")]
    KindMismatch {
        key: String,
        left: PrimitiveKind,
        right: PrimitiveKind,
    },
}

/// Total order within one primitive kind
///
/// `false < true`, numbers by exact value (floats among themselves via
/// `f64::total_cmp`), strings lexicographically. Numerically equal values of
/// different variants order `Int < UInt < Float`, so distinct primitives
/// never compare equal. Returns an error when the kinds differ.
pub fn compare_primitives(left: &Primitive, right: &Primitive) -> Result<Ordering, CanonicalError> {
    compare_at("", left, right)
}

fn compare_at(key: &str, left: &Primitive, right: &Primitive) -> Result<Ordering, CanonicalError> {
    use Primitive::*;

    let ordering = match (left, right) {
        (Bool(a), Bool(b)) => a.cmp(b),
        (Str(a), Str(b)) => a.cmp(b),
        (Int(a), Int(b)) => a.cmp(b),
        (UInt(a), UInt(b)) => a.cmp(b),
        (Float(a), Float(b)) => a.total_cmp(b),
        (Int(a), UInt(b)) => i128::from(*a).cmp(&i128::from(*b)),
        (UInt(a), Int(b)) => i128::from(*a).cmp(&i128::from(*b)),
        (Int(a), Float(b)) => compare_int_float(i128::from(*a), *b),
        (UInt(a), Float(b)) => compare_int_float(i128::from(*a), *b),
        (Float(a), Int(b)) => compare_int_float(i128::from(*b), *a).reverse(),
        (Float(a), UInt(b)) => compare_int_float(i128::from(*b), *a).reverse(),
        _ => {
            return Err(CanonicalError::KindMismatch {
                key: key.to_string(),
                left: left.kind(),
                right: right.kind(),
            })
        }
    };
    Ok(ordering.then_with(|| number_rank(left).cmp(&number_rank(right))))
}

/// Exact comparison of an integer against a float, no lossy casts of the integer
fn compare_int_float(int: i128, float: f64) -> Ordering {
    // Bounds of every i64/u64 value; both are exact powers of two in f64
    const UPPER: f64 = 18_446_744_073_709_551_616.0;
    const LOWER: f64 = -9_223_372_036_854_775_808.0;

    if float.is_nan() {
        // Matches total_cmp: negative NaN below everything, positive NaN above
        return if float.is_sign_negative() {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }
    if float >= UPPER {
        return Ordering::Less;
    }
    if float < LOWER {
        return Ordering::Greater;
    }

    // In range, so the integer part converts to i128 exactly
    let whole = float.trunc();
    int.cmp(&(whole as i128)).then_with(|| {
        if float > whole {
            Ordering::Less
        } else if float < whole {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    })
}

fn number_rank(value: &Primitive) -> u8 {
    match value {
        Primitive::Int(_) => 0,
        Primitive::UInt(_) => 1,
        Primitive::Float(_) => 2,
        _ => 0,
    }
}

/// Sort rows into a canonical, comparable form
///
/// Equal multisets of rows produce identical output regardless of the order
/// of rows or of pairs within a row.
pub fn canonicalize(rows: &[Row]) -> Result<Canonical, CanonicalError> {
    check_kinds(rows)?;

    let mut canonical: Canonical = rows
        .iter()
        .map(|row| {
            let mut pairs: CanonicalRow = row.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
            pairs.sort_by(|a, b| compare_pairs(a, b));
            pairs
        })
        .collect();

    canonical.sort_by(|a, b| compare_rows(a, b));
    Ok(canonical)
}

/// Every key must hold a single kind across all rows
fn check_kinds(rows: &[Row]) -> Result<(), CanonicalError> {
    let mut seen: HashMap<&str, &Primitive> = HashMap::new();

    for row in rows {
        for (key, value) in row.iter() {
            match seen.get(key.as_str()) {
                Some(first) => {
                    compare_at(key, first, value)?;
                }
                None => {
                    seen.insert(key, value);
                }
            }
        }
    }

    Ok(())
}

// Kinds are checked up front, so a mismatch here is unreachable; fall back to
// comparing kinds to keep the order total.
fn compare_values(key: &str, left: &Primitive, right: &Primitive) -> Ordering {
    compare_at(key, left, right)
        .unwrap_or_else(|_| kind_rank(left.kind()).cmp(&kind_rank(right.kind())))
}

fn kind_rank(kind: PrimitiveKind) -> u8 {
    match kind {
        PrimitiveKind::Bool => 0,
        PrimitiveKind::Number => 1,
        PrimitiveKind::String => 2,
    }
}

fn compare_pairs(left: &(String, Primitive), right: &(String, Primitive)) -> Ordering {
    left.0
        .cmp(&right.0)
        .then_with(|| compare_values(&left.0, &left.1, &right.1))
}

/// Lexicographic over pairs; a row that is a prefix of another sorts first
fn compare_rows(left: &CanonicalRow, right: &CanonicalRow) -> Ordering {
    for (a, b) in left.iter().zip(right.iter()) {
        let ordering = compare_pairs(a, b);
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    left.len().cmp(&right.len())
}
