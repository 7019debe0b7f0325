//! Ratings and the feature record built from them.
//!
//! A [`FeatureRecord`] is exactly one row of five ratings in the fixed column
//! order the model was trained on. Swapping two columns raises no error; it
//! silently yields a wrong prediction.

use serde::de::{self, Deserializer, Unexpected, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::InvalidRatingError;

/// The five columns in model order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    SeatComfort,
    FoodBev,
    CabinService,
    Entertainment,
    GroundService,
}

impl Column {
    /// All columns, in model order.
    pub const ALL: [Column; 5] = [
        Column::SeatComfort,
        Column::FoodBev,
        Column::CabinService,
        Column::Entertainment,
        Column::GroundService,
    ];

    /// Column name as the model artifact expects it.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Column::SeatComfort => "seat_comfort",
            Column::FoodBev => "food_bev",
            Column::CabinService => "cabin_service",
            Column::Entertainment => "entertainment",
            Column::GroundService => "ground_service",
        }
    }

    /// Position in the feature vector.
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Human-readable caption.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Column::SeatComfort => "Seat Comfort",
            Column::FoodBev => "Food & Beverage",
            Column::CabinService => "Cabin Service",
            Column::Entertainment => "Entertainment",
            Column::GroundService => "Ground Service",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A rating in the closed range `1..=5`.
///
/// [`Rating::new`] is the only constructor, so an out-of-range `Rating`
/// cannot exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;
    /// Initial value of the interactive form.
    pub const DEFAULT: Rating = Rating(3);

    /// Checks `value` for `column`. Values are never clamped.
    pub fn new(column: Column, value: i64) -> Result<Self, InvalidRatingError> {
        match u8::try_from(value) {
            Ok(v) if (Self::MIN..=Self::MAX).contains(&v) => Ok(Self(v)),
            _ => Err(InvalidRatingError::OutOfRange { column, value }),
        }
    }

    fn required(column: Column, value: Option<i64>) -> Result<Self, InvalidRatingError> {
        match value {
            Some(v) => Self::new(column, v),
            None => Err(InvalidRatingError::Missing { column }),
        }
    }

    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Rating {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unchecked input as a caller sends it.
///
/// Missing fields stay `None` and are rejected by [`build`]. Integers beyond
/// the `i64` range saturate, so they still fail there as out of range.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawRatings {
    #[serde(default, deserialize_with = "saturating_rating")]
    pub seat_comfort: Option<i64>,
    #[serde(default, deserialize_with = "saturating_rating")]
    pub food_bev: Option<i64>,
    #[serde(default, deserialize_with = "saturating_rating")]
    pub cabin_service: Option<i64>,
    #[serde(default, deserialize_with = "saturating_rating")]
    pub entertainment: Option<i64>,
    #[serde(default, deserialize_with = "saturating_rating")]
    pub ground_service: Option<i64>,
}

impl RawRatings {
    /// All five values set to the form's initial value.
    #[must_use]
    pub fn form_defaults() -> Self {
        let d = Some(i64::from(Rating::DEFAULT.get()));
        Self {
            seat_comfort: d,
            food_bev: d,
            cabin_service: d,
            entertainment: d,
            ground_service: d,
        }
    }
}

impl From<[i64; 5]> for RawRatings {
    fn from(v: [i64; 5]) -> Self {
        Self {
            seat_comfort: Some(v[0]),
            food_bev: Some(v[1]),
            cabin_service: Some(v[2]),
            entertainment: Some(v[3]),
            ground_service: Some(v[4]),
        }
    }
}

/// Accepts `null` or any JSON integer. Integers outside `i64` saturate;
/// fractional numbers and other types are rejected.
fn saturating_rating<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_option(OptionalRating)
}

struct OptionalRating;

impl<'de> Visitor<'de> for OptionalRating {
    type Value = Option<i64>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer rating or null")
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(IntegerRating).map(Some)
    }
}

struct IntegerRating;

impl<'de> Visitor<'de> for IntegerRating {
    type Value = i64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer rating")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
        Ok(v)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
        Ok(i64::try_from(v).unwrap_or(i64::MAX))
    }

    fn visit_i128<E: de::Error>(self, v: i128) -> Result<i64, E> {
        Ok(i64::try_from(v).unwrap_or(if v < 0 { i64::MIN } else { i64::MAX }))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<i64, E> {
        Ok(i64::try_from(v).unwrap_or(i64::MAX))
    }

    // serde_json hands integers beyond u64 over as floats; `as` saturates
    #[allow(clippy::cast_possible_truncation)]
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<i64, E> {
        if v.is_finite() && v.fract() == 0.0 {
            Ok(v as i64)
        } else {
            Err(E::invalid_type(Unexpected::Float(v), &self))
        }
    }
}

/// One row of model input. Field order is column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct FeatureRecord {
    pub seat_comfort: Rating,
    pub food_bev: Rating,
    pub cabin_service: Rating,
    pub entertainment: Rating,
    pub ground_service: Rating,
}

impl FeatureRecord {
    /// Column names in model order.
    pub const COLUMNS: [&'static str; 5] = [
        "seat_comfort",
        "food_bev",
        "cabin_service",
        "entertainment",
        "ground_service",
    ];

    #[must_use]
    pub fn get(&self, column: Column) -> Rating {
        match column {
            Column::SeatComfort => self.seat_comfort,
            Column::FoodBev => self.food_bev,
            Column::CabinService => self.cabin_service,
            Column::Entertainment => self.entertainment,
            Column::GroundService => self.ground_service,
        }
    }

    /// Dense feature vector for the model.
    #[must_use]
    pub fn values(&self) -> [f64; 5] {
        Column::ALL.map(|c| f64::from(self.get(c).get()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Column, Rating)> + '_ {
        Column::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    /// Columns holding the highest rating; all of them on a tie.
    #[must_use]
    pub fn highlighted(&self) -> Vec<Column> {
        let max = self.iter().map(|(_, r)| r).max().unwrap_or_default();
        self.iter()
            .filter(|(_, r)| *r == max)
            .map(|(c, _)| c)
            .collect()
    }
}

impl Default for FeatureRecord {
    fn default() -> Self {
        Self {
            seat_comfort: Rating::DEFAULT,
            food_bev: Rating::DEFAULT,
            cabin_service: Rating::DEFAULT,
            entertainment: Rating::DEFAULT,
            ground_service: Rating::DEFAULT,
        }
    }
}

impl TryFrom<[i64; 5]> for FeatureRecord {
    type Error = InvalidRatingError;

    fn try_from(v: [i64; 5]) -> Result<Self, Self::Error> {
        build(&RawRatings::from(v))
    }
}

/// Builds a [`FeatureRecord`] from unchecked input.
///
/// The first invalid column (in model order) determines the error.
pub fn build(raw: &RawRatings) -> Result<FeatureRecord, InvalidRatingError> {
    Ok(FeatureRecord {
        seat_comfort: Rating::required(Column::SeatComfort, raw.seat_comfort)?,
        food_bev: Rating::required(Column::FoodBev, raw.food_bev)?,
        cabin_service: Rating::required(Column::CabinService, raw.cabin_service)?,
        entertainment: Rating::required(Column::Entertainment, raw.entertainment)?,
        ground_service: Rating::required(Column::GroundService, raw.ground_service)?,
    })
}
