//! Feature encoding for the premium models.
//!
//! Both estimators were fit on the same 8-column design matrix, so the column
//! order below is part of the model contract and must not change.

use serde::{Deserialize, Serialize};

use super::applicant::{smoker, PredictionInput, Region};

/// Number of model inputs.
pub const NUM_FEATURES: usize = 8;

/// Column names in model order.
pub const FEATURE_NAMES: [&str; NUM_FEATURES] = [
    "age",
    "sex",
    "bmi",
    "children",
    "smoker",
    "region_northwest",
    "region_southeast",
    "region_southwest",
];

/// Fixed-order numeric input to an estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f64; NUM_FEATURES]);

impl FeatureVector {
    /// Encode a form submission. Deterministic and infallible.
    #[must_use]
    pub fn encode(input: &PredictionInput) -> Self {
        let flag = |r: Region| if input.region == r { 1.0 } else { 0.0 };

        Self([
            f64::from(input.age),
            input.sex.code(),
            input.bmi.value(),
            f64::from(input.children),
            smoker::code(input.smoker),
            flag(Region::Northwest),
            flag(Region::Southeast),
            flag(Region::Southwest),
        ])
    }

    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Build from a raw slice.
    ///
    /// # Errors
    /// Returns error if the slice length is not 8.
    pub fn from_slice(v: &[f64]) -> Result<Self, String> {
        let arr: [f64; NUM_FEATURES] = v
            .try_into()
            .map_err(|_| format!("Expected {NUM_FEATURES} features, got {}", v.len()))?;
        Ok(Self(arr))
    }

    /// Sum of the three region flags; 0 means northeast.
    #[must_use]
    pub fn region_flag_sum(&self) -> f64 {
        self.0[5..].iter().sum()
    }
}

impl std::ops::Index<usize> for FeatureVector {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        &self.0[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::applicant::{BmiInput, Sex};

    fn input(region: Region) -> PredictionInput {
        PredictionInput {
            age: 30,
            sex: Sex::Male,
            bmi: BmiInput::Direct(25.0),
            children: 0,
            smoker: false,
            region,
        }
    }

    #[test]
    fn test_reference_example() {
        let v = FeatureVector::encode(&input(Region::Northeast));
        assert_eq!(v.as_slice(), &[30.0, 0.0, 25.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_region_one_hot_is_exclusive() {
        for region in Region::ALL {
            let v = FeatureVector::encode(&input(region));
            assert_eq!(v.as_slice().len(), NUM_FEATURES);
            let sum = v.region_flag_sum();
            if region == Region::Northeast {
                assert_eq!(sum, 0.0);
            } else {
                assert_eq!(sum, 1.0);
            }
        }

        assert_eq!(FeatureVector::encode(&input(Region::Northwest))[5], 1.0);
        assert_eq!(FeatureVector::encode(&input(Region::Southeast))[6], 1.0);
        assert_eq!(FeatureVector::encode(&input(Region::Southwest))[7], 1.0);
    }

    #[test]
    fn test_codes_and_column_order() {
        let v = FeatureVector::encode(&PredictionInput {
            age: 52,
            sex: Sex::Female,
            bmi: BmiInput::Direct(31.4),
            children: 3,
            smoker: true,
            region: Region::Southeast,
        });
        assert_eq!(v.as_slice(), &[52.0, 1.0, 31.4, 3.0, 1.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_derived_bmi_not_rounded() {
        let v = FeatureVector::encode(&PredictionInput {
            bmi: BmiInput::Derived {
                height_cm: 170.0,
                weight_kg: 70.0,
            },
            ..input(Region::Northeast)
        });
        assert!((v[2] - 70.0 / (1.7 * 1.7)).abs() < 1e-12);
        assert!((v[2] - 24.22).abs() < 0.01);
    }

    #[test]
    fn test_from_slice_length_checked() {
        assert!(FeatureVector::from_slice(&[0.0; 8]).is_ok());
        assert!(FeatureVector::from_slice(&[0.0; 9]).is_err());
    }
}
