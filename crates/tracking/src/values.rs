//! Value objects of the tracking context.
//!
//! Primitives with an invariant (`Water`, `Weight`, `Time`) implement
//! [`SafeValue`]: the checked constructor returns the domain error, and the
//! trusted path is used where validity already follows from the operation.

use core::ops::{Add, Sub};

use aqua_core::{SafeValue, Validated, ValueObject};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{
    ExtremeWeightForSuitableWaterBalance, NegativeWaterAmount, NegativeWeightAmount, NotUtc,
};

/// Non-negative amount of water.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Water {
    milliliters: i64,
}

impl Water {
    pub const ZERO: Water = Water { milliliters: 0 };

    pub fn milliliters(&self) -> i64 {
        self.milliliters
    }
}

impl ValueObject for Water {}

impl SafeValue for Water {
    type Raw = i64;
    type Invalid = NegativeWaterAmount;

    fn try_new(milliliters: i64) -> Result<Self, NegativeWaterAmount> {
        if milliliters < 0 {
            return Err(NegativeWaterAmount);
        }
        Ok(Self { milliliters })
    }

    fn from_validated(milliliters: i64, _proof: Validated) -> Self {
        Self { milliliters }
    }
}

impl Add for Water {
    type Output = Water;

    /// The sum of two non-negative amounts stays non-negative.
    ///
    /// Clamps at `i64::MAX` milliliters. Subtracting from a clamped sum does
    /// not restore the original operand.
    fn add(self, rhs: Water) -> Water {
        Water {
            milliliters: self.milliliters.saturating_add(rhs.milliliters),
        }
    }
}

impl Sub for Water {
    type Output = Result<Water, NegativeWaterAmount>;

    fn sub(self, rhs: Water) -> Self::Output {
        Water::try_new(self.milliliters - rhs.milliliters)
    }
}

impl TryFrom<i64> for Water {
    type Error = NegativeWaterAmount;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Water::try_new(value)
    }
}

impl From<Water> for i64 {
    fn from(value: Water) -> Self {
        value.milliliters
    }
}

/// Non-negative body weight.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Weight {
    kilograms: i64,
}

impl Weight {
    pub fn kilograms(&self) -> i64 {
        self.kilograms
    }
}

impl ValueObject for Weight {}

impl SafeValue for Weight {
    type Raw = i64;
    type Invalid = NegativeWeightAmount;

    fn try_new(kilograms: i64) -> Result<Self, NegativeWeightAmount> {
        if kilograms < 0 {
            return Err(NegativeWeightAmount);
        }
        Ok(Self { kilograms })
    }

    fn from_validated(kilograms: i64, _proof: Validated) -> Self {
        Self { kilograms }
    }
}

impl TryFrom<i64> for Weight {
    type Error = NegativeWeightAmount;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Weight::try_new(value)
    }
}

impl From<Weight> for i64 {
    fn from(value: Weight) -> Self {
        value.kilograms
    }
}

/// Instant in UTC.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Time {
    instant: DateTime<Utc>,
}

impl Time {
    pub fn now() -> Self {
        Self::from(Utc::now())
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    pub fn date(&self) -> NaiveDate {
        self.instant.date_naive()
    }
}

impl ValueObject for Time {}

impl SafeValue for Time {
    type Raw = DateTime<FixedOffset>;
    type Invalid = NotUtc;

    fn try_new(instant: DateTime<FixedOffset>) -> Result<Self, NotUtc> {
        if instant.offset().local_minus_utc() != 0 {
            return Err(NotUtc);
        }
        Ok(Self {
            instant: instant.with_timezone(&Utc),
        })
    }

    fn from_validated(instant: DateTime<FixedOffset>, _proof: Validated) -> Self {
        Self {
            instant: instant.with_timezone(&Utc),
        }
    }
}

impl From<DateTime<Utc>> for Time {
    fn from(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }
}

/// What the user drinks from when no amount is given.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Glass {
    capacity: Water,
}

impl Glass {
    pub const DEFAULT_MILLILITERS: i64 = 200;

    pub fn new(capacity: Water) -> Self {
        Self { capacity }
    }

    pub fn capacity(&self) -> Water {
        self.capacity
    }
}

impl Default for Glass {
    fn default() -> Self {
        Self {
            capacity: Water {
                milliliters: Self::DEFAULT_MILLILITERS,
            },
        }
    }
}

impl ValueObject for Glass {}

/// Water drunk (or to be drunk) over a day.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WaterBalance {
    water: Water,
}

impl WaterBalance {
    pub fn new(water: Water) -> Self {
        Self { water }
    }

    pub fn water(&self) -> Water {
        self.water
    }

    /// Recommended daily balance for `weight`.
    ///
    /// Defined for 30..=150 kg as `1500 + (kg - 20) * 10` ml.
    pub fn suitable_when(weight: Weight) -> Result<Self, ExtremeWeightForSuitableWaterBalance> {
        let kilograms = weight.kilograms();
        if !(30..=150).contains(&kilograms) {
            return Err(ExtremeWeightForSuitableWaterBalance);
        }

        let milliliters = 1500 + (kilograms - 20) * 10;
        Ok(Self {
            water: Water { milliliters },
        })
    }
}

impl Default for Water {
    fn default() -> Self {
        Water::ZERO
    }
}

impl ValueObject for WaterBalance {}

/// Daily water balance the user aims for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Target {
    water_balance: WaterBalance,
}

impl Target {
    /// Tolerance around the target that still counts as a good day.
    pub const TOLERANCE_MILLILITERS: i64 = 150;

    pub fn new(water_balance: WaterBalance) -> Self {
        Self { water_balance }
    }

    pub fn water_balance(&self) -> WaterBalance {
        self.water_balance
    }

    pub fn result_for(&self, balance: WaterBalance) -> DayResult {
        let target = self.water_balance.water().milliliters();
        let actual = balance.water().milliliters();

        if actual < target.saturating_sub(Self::TOLERANCE_MILLILITERS) {
            DayResult::NotEnoughWater
        } else if actual > target.saturating_add(Self::TOLERANCE_MILLILITERS) {
            DayResult::ExcessWater
        } else {
            DayResult::Good
        }
    }
}

impl ValueObject for Target {}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayResult {
    Good,
    NotEnoughWater,
    ExcessWater,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use proptest::prelude::*;

    use super::*;

    fn water(ml: i64) -> Water {
        Water::try_new(ml).unwrap()
    }

    #[test]
    fn negative_water_is_rejected() {
        assert_eq!(Water::try_new(-1), Err(NegativeWaterAmount));
        assert_eq!(water(0), Water::ZERO);
    }

    #[test]
    fn trusted_water_needs_the_valid_flag() {
        assert_eq!(Water::trusted(300, true), Ok(water(300)));
        assert!(Water::trusted(300, false).is_err());
    }

    #[test]
    fn subtraction_revalidates() {
        assert_eq!(water(500) - water(200), Ok(water(300)));
        assert_eq!(water(200) - water(500), Err(NegativeWaterAmount));
    }

    #[test]
    fn weight_rejects_negative() {
        assert_eq!(Weight::try_new(-3), Err(NegativeWeightAmount));
        assert_eq!(Weight::try_new(70).unwrap().kilograms(), 70);
    }

    #[test]
    fn time_accepts_only_zero_offset() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let plus_three = FixedOffset::east_opt(3 * 3600).unwrap();

        let at_utc = utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let at_plus_three = plus_three.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();

        let time = Time::try_new(at_utc).unwrap();
        assert_eq!(time.date(), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(Time::try_new(at_plus_three), Err(NotUtc));
    }

    #[test]
    fn default_glass_holds_200_ml() {
        assert_eq!(Glass::default().capacity(), water(200));
    }

    #[test]
    fn suitable_balance_follows_weight() {
        let balance = WaterBalance::suitable_when(Weight::try_new(70).unwrap()).unwrap();
        assert_eq!(balance.water(), water(2000));

        assert!(WaterBalance::suitable_when(Weight::try_new(30).unwrap()).is_ok());
        assert!(WaterBalance::suitable_when(Weight::try_new(150).unwrap()).is_ok());
        assert_eq!(
            WaterBalance::suitable_when(Weight::try_new(29).unwrap()),
            Err(ExtremeWeightForSuitableWaterBalance)
        );
        assert_eq!(
            WaterBalance::suitable_when(Weight::try_new(151).unwrap()),
            Err(ExtremeWeightForSuitableWaterBalance)
        );
    }

    #[test]
    fn day_result_uses_150_ml_tolerance() {
        let target = Target::new(WaterBalance::new(water(2000)));

        assert_eq!(target.result_for(WaterBalance::new(water(1849))), DayResult::NotEnoughWater);
        assert_eq!(target.result_for(WaterBalance::new(water(1850))), DayResult::Good);
        assert_eq!(target.result_for(WaterBalance::new(water(2150))), DayResult::Good);
        assert_eq!(target.result_for(WaterBalance::new(water(2151))), DayResult::ExcessWater);
    }

    #[test]
    fn day_result_does_not_overflow_at_the_largest_amounts() {
        let max = WaterBalance::new(water(i64::MAX));
        let huge = Target::new(max);

        assert_eq!(huge.result_for(max), DayResult::Good);
        assert_eq!(huge.result_for(WaterBalance::default()), DayResult::NotEnoughWater);
        assert_eq!(
            Target::new(WaterBalance::default()).result_for(max),
            DayResult::ExcessWater
        );
    }

    #[test]
    fn addition_clamps_at_the_largest_amount() {
        let sum = water(i64::MAX) + water(500);

        assert_eq!(sum, water(i64::MAX));
        assert_eq!((sum - water(500)).unwrap(), water(i64::MAX - 500));
    }

    #[test]
    fn deserialization_goes_through_validation() {
        let ok: Water = serde_json::from_str("250").unwrap();
        assert_eq!(ok, water(250));
        assert!(serde_json::from_str::<Water>("-5").is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            .. ProptestConfig::default()
        })]

        #[test]
        fn sum_of_valid_amounts_is_valid(a in 0i64..1_000_000, b in 0i64..1_000_000) {
            let sum = water(a) + water(b);
            prop_assert_eq!(sum.milliliters(), a + b);
            prop_assert_eq!(sum - water(b), Ok(water(a)));
        }
    }
}
