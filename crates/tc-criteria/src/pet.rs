//! PET comfort parameters: the person MEMI models and which PET scale
//! classifies them.

use crate::Criteria;
use crate::condition::ThermalCondition;
use crate::error::{CriteriaError, CriteriaResult};
use serde::{Deserialize, Serialize};
use tc_models::pet::{
    PetBody, PetPosture, core_temperature_category, pet_category, pet_category_humid,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PetParameterSpec", into = "PetParameterSpec")]
pub struct PetParameter {
    body: PetBody,
    humid_acclimated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct PetParameterSpec {
    age: f64,
    sex: f64,
    height: f64,
    body_mass: f64,
    posture: PetPosture,
    humid_acclimated: bool,
}

impl Default for PetParameterSpec {
    fn default() -> Self {
        PetParameter::default().into()
    }
}

impl From<PetParameter> for PetParameterSpec {
    fn from(p: PetParameter) -> Self {
        Self {
            age: p.body.age,
            sex: p.body.sex,
            height: p.body.height,
            body_mass: p.body.body_mass,
            posture: p.body.posture,
            humid_acclimated: p.humid_acclimated,
        }
    }
}

impl TryFrom<PetParameterSpec> for PetParameter {
    type Error = CriteriaError;

    fn try_from(s: PetParameterSpec) -> CriteriaResult<Self> {
        let body = PetBody {
            age: s.age,
            sex: s.sex,
            height: s.height,
            body_mass: s.body_mass,
            posture: s.posture,
        };
        PetParameter::new(body, s.humid_acclimated)
    }
}

impl PetParameter {
    /// `humid_acclimated` selects the Lin and Matzarakis scale for people
    /// used to humid (sub)tropical climates.
    pub fn new(body: PetBody, humid_acclimated: bool) -> CriteriaResult<Self> {
        body.validate()?;
        Ok(Self {
            body,
            humid_acclimated,
        })
    }

    pub fn body(&self) -> &PetBody {
        &self.body
    }

    pub fn humid_acclimated(&self) -> bool {
        self.humid_acclimated
    }

    /// PET stress category from -4 (extreme cold) to 4 (extreme heat).
    pub fn category(&self, pet: f64) -> i8 {
        if self.humid_acclimated {
            pet_category_humid(pet)
        } else {
            pet_category(pet)
        }
    }

    /// Comfortable only in the "no thermal stress" category.
    pub fn is_comfortable(&self, pet: f64) -> bool {
        self.category(pet) == 0
    }

    pub fn thermal_condition(&self, pet: f64) -> ThermalCondition {
        ThermalCondition::from_sign(self.category(pet).signum())
    }

    /// -2 hypothermia to 2 hyperthermia.
    pub fn core_temperature_category(&self, t_core: f64) -> i8 {
        core_temperature_category(t_core)
    }
}

impl Criteria for PetParameter {
    type Category = i8;

    fn model(&self) -> &'static str {
        "PET"
    }

    fn categorize(&self, pet: f64) -> i8 {
        self.category(pet)
    }

    fn condition(&self, pet: f64) -> ThermalCondition {
        self.thermal_condition(pet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CriteriaError;
    use tc_models::ModelError;

    #[test]
    fn temperate_scale_by_default() {
        let p = PetParameter::default();
        assert!(!p.humid_acclimated());
        assert_eq!(p.body().age, 36.0);
        assert!(p.is_comfortable(18.0));
        assert!(p.is_comfortable(23.0));
        assert!(!p.is_comfortable(25.0));
        assert_eq!(p.thermal_condition(25.0), ThermalCondition::Hot);
        assert_eq!(p.thermal_condition(10.0), ThermalCondition::Cold);
    }

    #[test]
    fn humid_scale_shifts_comfort_up() {
        let p = PetParameter::new(PetBody::default(), true).unwrap();
        assert!(p.is_comfortable(28.0));
        assert_eq!(p.thermal_condition(20.0), ThermalCondition::Cold);
        assert_eq!(p.category(43.0), 4);
    }

    #[test]
    fn invalid_body_rejected() {
        let body = PetBody {
            sex: 1.5,
            ..PetBody::default()
        };
        let err = PetParameter::new(body, false).unwrap_err();
        assert!(matches!(
            err,
            CriteriaError::Model(ModelError::OutOfRange { .. })
        ));
    }

    #[test]
    fn deserialize_validates() {
        let p: PetParameter =
            serde_yaml::from_str("age: 70\nposture: seated\nhumid_acclimated: true\n").unwrap();
        assert_eq!(p.body().age, 70.0);
        assert_eq!(p.body().posture, PetPosture::Seated);
        assert!(p.humid_acclimated());
        let bad: Result<PetParameter, _> = serde_yaml::from_str("height: 4.0\n");
        assert!(bad.is_err());
        let yaml = serde_yaml::to_string(&p).unwrap();
        assert!(yaml.contains("body_mass"));
    }
}
