//! Category labels shared by all comfort criteria.

use serde::{Deserialize, Serialize};

/// Three-way thermal condition of one timestep.
///
/// `Unresolved` marks a timestep whose model did not converge; it is never
/// comfortable and is counted separately in percent statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThermalCondition {
    Cold,
    Neutral,
    Hot,
    Unresolved,
}

impl ThermalCondition {
    /// -1 / 0 / +1, or `None` when unresolved.
    pub fn value(&self) -> Option<i8> {
        match self {
            ThermalCondition::Cold => Some(-1),
            ThermalCondition::Neutral => Some(0),
            ThermalCondition::Hot => Some(1),
            ThermalCondition::Unresolved => None,
        }
    }

    pub fn from_sign(sign: i8) -> Self {
        match sign {
            s if s < 0 => ThermalCondition::Cold,
            0 => ThermalCondition::Neutral,
            _ => ThermalCondition::Hot,
        }
    }
}

/// Why a PMV timestep is uncomfortable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiscomfortReason {
    TooDry,
    TooCold,
    Comfortable,
    TooHot,
    TooHumid,
    Unresolved,
}

impl DiscomfortReason {
    /// -2 dry, -1 cold, 0 comfortable, +1 hot, +2 humid.
    pub fn value(&self) -> Option<i8> {
        match self {
            DiscomfortReason::TooDry => Some(-2),
            DiscomfortReason::TooCold => Some(-1),
            DiscomfortReason::Comfortable => Some(0),
            DiscomfortReason::TooHot => Some(1),
            DiscomfortReason::TooHumid => Some(2),
            DiscomfortReason::Unresolved => None,
        }
    }
}

/// UTCI thermal stress on the eleven-point scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UtciCategory {
    ExtremeColdStress,
    VeryStrongColdStress,
    StrongColdStress,
    ModerateColdStress,
    SlightColdStress,
    NoThermalStress,
    SlightHeatStress,
    ModerateHeatStress,
    StrongHeatStress,
    VeryStrongHeatStress,
    ExtremeHeatStress,
}

impl UtciCategory {
    pub const ALL: [UtciCategory; 11] = [
        UtciCategory::ExtremeColdStress,
        UtciCategory::VeryStrongColdStress,
        UtciCategory::StrongColdStress,
        UtciCategory::ModerateColdStress,
        UtciCategory::SlightColdStress,
        UtciCategory::NoThermalStress,
        UtciCategory::SlightHeatStress,
        UtciCategory::ModerateHeatStress,
        UtciCategory::StrongHeatStress,
        UtciCategory::VeryStrongHeatStress,
        UtciCategory::ExtremeHeatStress,
    ];

    /// Position on the -5..=5 scale.
    pub fn value(&self) -> i8 {
        *self as i8 - 5
    }

    pub fn from_value(value: i8) -> Option<Self> {
        value
            .checked_add(5)
            .and_then(|v| usize::try_from(v).ok())
            .and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn label(&self) -> &'static str {
        match self {
            UtciCategory::ExtremeColdStress => "Extreme Cold Stress",
            UtciCategory::VeryStrongColdStress => "Very Strong Cold Stress",
            UtciCategory::StrongColdStress => "Strong Cold Stress",
            UtciCategory::ModerateColdStress => "Moderate Cold Stress",
            UtciCategory::SlightColdStress => "Slight Cold Stress",
            UtciCategory::NoThermalStress => "No Thermal Stress",
            UtciCategory::SlightHeatStress => "Slight Heat Stress",
            UtciCategory::ModerateHeatStress => "Moderate Heat Stress",
            UtciCategory::StrongHeatStress => "Strong Heat Stress",
            UtciCategory::VeryStrongHeatStress => "Very Strong Heat Stress",
            UtciCategory::ExtremeHeatStress => "Extreme Heat Stress",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utci_category_values() {
        assert_eq!(UtciCategory::ExtremeColdStress.value(), -5);
        assert_eq!(UtciCategory::NoThermalStress.value(), 0);
        assert_eq!(UtciCategory::ExtremeHeatStress.value(), 5);
        for c in UtciCategory::ALL {
            assert_eq!(UtciCategory::from_value(c.value()), Some(c));
        }
        assert_eq!(UtciCategory::from_value(6), None);
        assert_eq!(UtciCategory::from_value(-6), None);
    }

    #[test]
    fn condition_signs() {
        assert_eq!(ThermalCondition::from_sign(-3), ThermalCondition::Cold);
        assert_eq!(ThermalCondition::from_sign(0), ThermalCondition::Neutral);
        assert_eq!(ThermalCondition::from_sign(2), ThermalCondition::Hot);
        assert_eq!(ThermalCondition::Unresolved.value(), None);
    }
}
