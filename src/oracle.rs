//! Read-only check of a computed scan against the data it came from.

use std::fmt;

/// First index where a scan disagrees with the running sum of its input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mismatch {
    pub index: usize,
    pub expected: i64,
    pub actual: i64,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "scan incorrect at index {}: expected {}, actual {}",
            self.index, self.expected, self.actual
        )
    }
}

/// Checks `scan[i] == data[0] + ... + data[i]` for every index.
pub fn verify(data: &[i64], scan: &[i64]) -> Result<(), Mismatch> {
    verify_with_offset(data, scan, 0)
}

/// Same as [`verify`], but the running sum starts at `offset`.
///
/// A node checks its own partition this way, passing its exclusive carry.
/// A length difference is reported at the first index present in only one
/// of the two slices.
pub fn verify_with_offset(data: &[i64], scan: &[i64], offset: i64) -> Result<(), Mismatch> {
    let mut sum = offset;
    for (index, (&d, &s)) in data.iter().zip(scan).enumerate() {
        sum += d;
        if s != sum {
            return Err(Mismatch {
                index,
                expected: sum,
                actual: s,
            });
        }
    }

    if data.len() != scan.len() {
        let index = data.len().min(scan.len());
        let expected = data.get(index).map_or(sum, |d| sum + d);
        return Err(Mismatch {
            index,
            expected,
            actual: scan.get(index).copied().unwrap_or_default(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_correct_scan() {
        assert_eq!(verify(&[1, 2, 3, 4, 5], &[1, 3, 6, 10, 15]), Ok(()));
        assert_eq!(verify(&[], &[]), Ok(()));
    }

    #[test]
    fn reports_first_mismatch() {
        let err = verify(&[1, 2, 3, 4], &[1, 3, 7, 9]).unwrap_err();
        assert_eq!(
            err,
            Mismatch {
                index: 2,
                expected: 6,
                actual: 7
            }
        );
        assert_eq!(err.to_string(), "scan incorrect at index 2: expected 6, actual 7");
    }

    #[test]
    fn offset_shifts_running_sum() {
        assert_eq!(verify_with_offset(&[4, 5], &[14, 19], 10), Ok(()));
        assert!(verify_with_offset(&[4, 5], &[4, 9], 10).is_err());
    }

    #[test]
    fn length_mismatch_fails() {
        let err = verify(&[1, 2, 3], &[1, 3]).unwrap_err();
        assert_eq!(err.index, 2);
        assert_eq!(err.expected, 6);

        let err = verify(&[1], &[1, 1]).unwrap_err();
        assert_eq!(err.index, 1);
        assert_eq!(err.actual, 1);
    }
}
