/// Number of ways to choose `r` items out of `n`, ignoring order.
///
/// Zero when `r > n`; `None` when the result does not fit in a `u64`.
pub fn n_choose_r(n: u64, r: u64) -> Option<u64> {
    if r > n {
        return Some(0);
    }
    let r = r.min(n - r);
    let mut result: u128 = 1;
    for i in 0..r {
        // the running value is always C(n, i + 1), so the division is exact
        result = result.checked_mul((n - i) as u128)? / (i + 1) as u128;
        if result > u64::MAX as u128 {
            return None;
        }
    }
    u64::try_from(result).ok()
}

/// Number of ordered arrangements of `r` items out of `n`.
///
/// Zero when `r > n`; `None` when the result does not fit in a `u64`.
pub fn n_permute_r(n: u64, r: u64) -> Option<u64> {
    if r > n {
        return Some(0);
    }
    (n - r + 1..=n).try_fold(1u64, |acc, k| acc.checked_mul(k))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choose() {
        assert_eq!(Some(1), n_choose_r(0, 0));
        assert_eq!(Some(1), n_choose_r(5, 0));
        assert_eq!(Some(5), n_choose_r(5, 1));
        assert_eq!(Some(10), n_choose_r(5, 2));
        assert_eq!(Some(10), n_choose_r(5, 3));
        assert_eq!(Some(0), n_choose_r(3, 4));
        assert_eq!(Some(252), n_choose_r(10, 5));
        assert_eq!(Some(118_264_581_564_861_424), n_choose_r(60, 30));
    }

    #[test]
    fn test_choose_overflow() {
        assert_eq!(Some(14_226_520_737_620_288_370), n_choose_r(67, 33));
        assert_eq!(None, n_choose_r(68, 34));
        assert_eq!(None, n_choose_r(200, 100));
    }

    #[test]
    fn test_choose_row_sums() {
        for n in 0..40u64 {
            let total: u64 = (0..=n).map(|r| n_choose_r(n, r).unwrap()).sum();
            assert_eq!(1u64 << n, total);
        }
    }

    #[test]
    fn test_permute() {
        assert_eq!(Some(1), n_permute_r(5, 0));
        assert_eq!(Some(20), n_permute_r(5, 2));
        assert_eq!(Some(120), n_permute_r(5, 5));
        assert_eq!(Some(0), n_permute_r(2, 3));
        assert_eq!(Some(2_432_902_008_176_640_000), n_permute_r(20, 20));
        assert_eq!(None, n_permute_r(21, 21));
    }
}
