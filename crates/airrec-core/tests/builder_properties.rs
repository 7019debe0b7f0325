use airrec_core::{build, Column, FeatureRecord, InvalidRatingError, RawRatings};
use proptest::prelude::*;

proptest! {
    #[test]
    fn valid_ratings_keep_their_order(v in prop::array::uniform5(1i64..=5)) {
        let record = build(&RawRatings::from(v)).expect("ratings in range");
        let expected = v.map(|x| x as f64);
        prop_assert_eq!(record.values(), expected);
        for (i, (column, rating)) in record.iter().enumerate() {
            prop_assert_eq!(column.name(), FeatureRecord::COLUMNS[i]);
            prop_assert_eq!(i64::from(rating.get()), v[i]);
        }
    }

    #[test]
    fn out_of_range_rating_is_rejected(
        v in prop::array::uniform5(1i64..=5),
        slot in 0usize..5,
        bad in prop_oneof![i64::MIN..=0, 6i64..=i64::MAX],
    ) {
        let mut v = v;
        v[slot] = bad;
        let err = build(&RawRatings::from(v)).unwrap_err();
        prop_assert_eq!(
            err,
            InvalidRatingError::OutOfRange { column: Column::ALL[slot], value: bad }
        );
    }

    #[test]
    fn highlighted_columns_hold_the_maximum(v in prop::array::uniform5(1i64..=5)) {
        let record = build(&RawRatings::from(v)).expect("ratings in range");
        let max = v.iter().copied().max().unwrap_or(1);
        let highlighted = record.highlighted();
        prop_assert!(!highlighted.is_empty());
        for column in Column::ALL {
            let is_max = v[column.index()] == max;
            prop_assert_eq!(highlighted.contains(&column), is_max);
        }
    }
}
