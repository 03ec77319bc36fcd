use proptest::prelude::*;

use juror_types::{CriterionScore, GeoFix, GeoPoint, ScoreSheet};

proptest! {
    /// Any in-range value rounds to a score whose value is within half a step.
    #[test]
    fn score_rounds_to_nearest_tenth(v in 1.0f64..=5.0) {
        let score = CriterionScore::from_f64(v).unwrap();
        prop_assert!((score.value() - v).abs() <= 0.05 + 1e-9);
        prop_assert!(score >= CriterionScore::MIN && score <= CriterionScore::MAX);
    }

    /// Stepping never leaves the valid range.
    #[test]
    fn score_step_stays_in_range(start in 10u8..=50, steps in -100i32..100) {
        let score = CriterionScore::from_f64(f64::from(start) / 10.0).unwrap().step(steps);
        prop_assert!(score >= CriterionScore::MIN && score <= CriterionScore::MAX);
    }

    /// The mean lies between the smallest and largest criterion score.
    #[test]
    fn mean_is_bounded_by_scores(p in 10u8..=50, f in 10u8..=50, e in 10u8..=50) {
        let sheet = ScoreSheet {
            presentation: CriterionScore::from_f64(f64::from(p) / 10.0).unwrap(),
            flavor: CriterionScore::from_f64(f64::from(f) / 10.0).unwrap(),
            experience: CriterionScore::from_f64(f64::from(e) / 10.0).unwrap(),
            comment: None,
        };
        let lo = f64::from(p.min(f).min(e)) / 10.0;
        let hi = f64::from(p.max(f).max(e)) / 10.0;
        prop_assert!(sheet.mean() >= lo - 1e-9 && sheet.mean() <= hi + 1e-9);
    }

    /// Distance is symmetric and a point is always inside its own geofence.
    #[test]
    fn distance_symmetric(
        lat1 in -80.0f64..80.0, lon1 in -179.0f64..179.0,
        lat2 in -80.0f64..80.0, lon2 in -179.0f64..179.0,
    ) {
        let a = GeoPoint::new(lat1, lon1);
        let b = GeoPoint::new(lat2, lon2);
        prop_assert!((a.distance_m(&b) - b.distance_m(&a)).abs() < 1e-3);
        prop_assert!(GeoFix::against(a, a, 0.0).in_radius);
    }
}
