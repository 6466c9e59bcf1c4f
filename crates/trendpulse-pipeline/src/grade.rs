//! Rank-to-grade mapping.

/// Map a 1-based rank to a 0–100 grade by linear interpolation over the
/// retained-set size.
///
/// The grade is a pure function of rank position and pool size — never of
/// the underlying score distribution — so the consuming UI gets evenly
/// distributed buckets regardless of score skew. A pool of one (or zero)
/// grades 100.
#[must_use]
pub fn grade_for_rank(rank: usize, total_retained: usize) -> u8 {
    if total_retained <= 1 {
        return 100;
    }
    #[allow(clippy::cast_precision_loss)]
    let step = 100.0 / (total_retained - 1) as f64;
    #[allow(clippy::cast_precision_loss)]
    let raw = 100.0 - (rank.saturating_sub(1)) as f64 * step;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        raw.round().clamp(0.0, 100.0) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_100_and_0() {
        for n in 2..=250 {
            assert_eq!(grade_for_rank(1, n), 100, "top of a pool of {n}");
            assert_eq!(grade_for_rank(n, n), 0, "bottom of a pool of {n}");
        }
    }

    #[test]
    fn singleton_pool_grades_100() {
        assert_eq!(grade_for_rank(1, 1), 100);
        assert_eq!(grade_for_rank(1, 0), 100);
    }

    #[test]
    fn grade_is_monotonically_non_increasing_in_rank() {
        for n in [2, 5, 20, 100] {
            for rank in 1..n {
                assert!(
                    grade_for_rank(rank, n) >= grade_for_rank(rank + 1, n),
                    "rank {rank} vs {} in pool of {n}",
                    rank + 1
                );
            }
        }
    }

    #[test]
    fn twenty_item_pool_steps_by_about_five() {
        // 100/19 ≈ 5.263 per step, rounded.
        let grades: Vec<u8> = (1..=20).map(|r| grade_for_rank(r, 20)).collect();
        assert_eq!(grades[0], 100);
        assert_eq!(grades[1], 95);
        assert_eq!(grades[2], 89);
        assert_eq!(grades[19], 0);
        // No two non-adjacent ranks share a grade unless rounding collides;
        // with a 5.26 step they never do.
        for window in grades.windows(2) {
            let delta = window[0] - window[1];
            assert!((5..=6).contains(&delta), "step was {delta}");
        }
    }

    #[test]
    fn out_of_range_rank_clamps() {
        assert_eq!(grade_for_rank(50, 20), 0);
        assert_eq!(grade_for_rank(0, 20), 100);
    }
}
