//! Standard Effective Temperature from the Gagge two-node model.
//!
//! The body is simulated for one hour in one-minute steps as a skin node and
//! a core node exchanging heat with the environment. The resulting skin heat
//! loss is then mapped to the temperature of a standard environment (50% RH,
//! still air, standard clothing for the activity) that would produce the same
//! loss.
//!
//! Both inner solves are bounded:
//! - the clothing surface temperature loop of each time step
//! - the final Newton-secant solve for SET
//!
//! Hitting either bound, or producing a non-finite state, yields
//! [`SetOutcome::NonConverged`].
//!
//! Out-of-range policy: air speed is floored at 0.1 m/s; all other inputs are
//! extrapolated.

use crate::inputs::ThermalInputs;
use serde::{Deserialize, Serialize};
use tc_core::units::constants::{STANDARD_PRESSURE_PA, STEFAN_BOLTZMANN};
use tc_solver::Convergence;
use tracing::debug;

/// Minutes simulated before the heat balance is evaluated.
pub const SET_SIMULATION_MINUTES: usize = 60;
pub const DEFAULT_MAX_CLOTHING_ITERATIONS: usize = 100;
pub const DEFAULT_MAX_NEWTON_ITERATIONS: usize = 100;

const CLOTHING_TOLERANCE: f64 = 0.01;
const NEWTON_TOLERANCE: f64 = 0.01;
const NEWTON_DELTA: f64 = 0.0001;

// Body and control constants.
const KCLO: f64 = 0.25;
const BODY_WEIGHT: f64 = 69.9;
const BODY_SURFACE_AREA: f64 = 1.8258;
const MET_FACTOR: f64 = 58.2;
const CSW: f64 = 170.0;
const CDIL: f64 = 120.0;
const CSTR: f64 = 0.5;
const TEMP_SKIN_NEUTRAL: f64 = 33.7;
const TEMP_CORE_NEUTRAL: f64 = 36.8;
const TEMP_BODY_NEUTRAL: f64 = 36.49;
const SKIN_BLOOD_FLOW_NEUTRAL: f64 = 6.3;

/// Iteration caps for the SET solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetConfig {
    /// Cap on the clothing temperature loop within each time step.
    pub max_clothing_iterations: usize,
    /// Cap on the final SET solve.
    pub max_newton_iterations: usize,
}

impl Default for SetConfig {
    fn default() -> Self {
        Self {
            max_clothing_iterations: DEFAULT_MAX_CLOTHING_ITERATIONS,
            max_newton_iterations: DEFAULT_MAX_NEWTON_ITERATIONS,
        }
    }
}

/// Result of a SET evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SetOutcome {
    Converged {
        set: f64,
        iterations: usize,
    },
    NonConverged {
        /// Value of the solve when it stopped; may be non-finite.
        last_estimate: f64,
        iterations: usize,
        stage: &'static str,
    },
}

impl SetOutcome {
    /// SET if the solve converged.
    pub fn value(&self) -> Option<f64> {
        match self {
            SetOutcome::Converged { set, .. } => Some(*set),
            SetOutcome::NonConverged { .. } => None,
        }
    }

    /// Converged value, or the last estimate otherwise.
    pub fn estimate(&self) -> f64 {
        match self {
            SetOutcome::Converged { set, .. } => *set,
            SetOutcome::NonConverged { last_estimate, .. } => *last_estimate,
        }
    }

    pub fn is_converged(&self) -> bool {
        matches!(self, SetOutcome::Converged { .. })
    }

    pub fn convergence(&self) -> Convergence {
        match *self {
            SetOutcome::Converged { iterations, .. } => Convergence::Converged { iterations },
            SetOutcome::NonConverged {
                iterations, stage, ..
            } => Convergence::NonConverged { iterations, stage },
        }
    }
}

/// Saturation vapor pressure (torr) used by the two-node model.
pub fn saturated_vapor_pressure_torr(db_temp: f64) -> f64 {
    (18.6686 - 4030.183 / (db_temp + 235.0)).exp()
}

/// Standard Effective Temperature (C) by the Pierce two-node model.
pub fn pierce_set(inputs: &ThermalInputs, config: &SetConfig) -> SetOutcome {
    let ThermalInputs {
        ta,
        tr,
        vel,
        rh,
        met,
        clo,
        wme,
    } = *inputs;

    let vapor_pressure = rh * saturated_vapor_pressure_torr(ta) / 100.0;
    let air_velocity = vel.max(0.1);

    let mut temp_skin = TEMP_SKIN_NEUTRAL;
    let mut temp_core = TEMP_CORE_NEUTRAL;
    let mut skin_blood_flow = SKIN_BLOOD_FLOW_NEUTRAL;
    let mut alfa = 0.1;
    let mut esk = 0.1 * met;

    let pressure_atm = STANDARD_PRESSURE_PA / 1000.0 * 0.009869;
    let rcl = 0.155 * clo;
    let facl = 1.0 + 0.15 * clo;
    let lr = 2.2 / pressure_atm;
    let rm = met * MET_FACTOR;
    let mut m = rm;

    let (wcrit, icl) = if clo <= 0.0 {
        (0.38 * air_velocity.powf(-0.29), 1.0)
    } else {
        (0.59 * air_velocity.powf(-0.08), 0.45)
    };

    let chc = (3.0 * pressure_atm.powf(0.53))
        .max(8.600001 * (air_velocity * pressure_atm).powf(0.53));
    let mut chr = 4.7;
    let mut ctc = chr + chc;
    let mut ra = 1.0 / (facl * ctc);
    let mut top = (chr * tr + chc * ta) / ctc;
    let mut tcl = top + (temp_skin - top) / (ctc * (ra + rcl));

    let mut tcl_old = 0.0;
    let mut refresh_coefficients = true;
    let mut iterations = 0;

    // Quantities read after the loop.
    let mut dry = 0.0;
    let mut pwet = 0.0;

    for _ in 0..SET_SIMULATION_MINUTES - 1 {
        let mut inner = 0;
        while (tcl - tcl_old).abs() > CLOTHING_TOLERANCE {
            if inner == config.max_clothing_iterations {
                debug!(tcl, tcl_old, "SET clothing temperature loop hit its bound");
                return SetOutcome::NonConverged {
                    last_estimate: f64::NAN,
                    iterations,
                    stage: "clothing temperature",
                };
            }
            inner += 1;
            iterations += 1;

            if refresh_coefficients {
                tcl_old = tcl;
                chr = 4.0 * STEFAN_BOLTZMANN * ((tcl + tr) / 2.0 + 273.15).powi(3) * 0.72;
                ctc = chr + chc;
                ra = 1.0 / (facl * ctc);
                top = (chr * tr + chc * ta) / ctc;
            }
            tcl = (ra * temp_skin + rcl * top) / (ra + rcl);
            refresh_coefficients = true;
        }
        refresh_coefficients = false;

        dry = (temp_skin - top) / (ra + rcl);
        let hfcs = (temp_core - temp_skin) * (5.28 + 1.163 * skin_blood_flow);
        let eres = 0.0023 * m * (44.0 - vapor_pressure);
        let cres = 0.0014 * m * (34.0 - ta);
        let scr = m - hfcs - eres - cres - wme;
        let ssk = hfcs - dry - esk;

        let tcsk = 0.97 * alfa * BODY_WEIGHT;
        let tccr = 0.97 * (1.0 - alfa) * BODY_WEIGHT;
        temp_skin += ssk * BODY_SURFACE_AREA / (tcsk * 60.0);
        temp_core += scr * BODY_SURFACE_AREA / (tccr * 60.0);
        let temp_body = alfa * temp_skin + (1.0 - alfa) * temp_core;

        let skin_signal = temp_skin - TEMP_SKIN_NEUTRAL;
        let warms = skin_signal.max(0.0);
        let colds = (-skin_signal).max(0.0);
        let core_signal = temp_core - TEMP_CORE_NEUTRAL;
        let warmc = core_signal.max(0.0);
        let coldc = (-core_signal).max(0.0);
        let warmb = (temp_body - TEMP_BODY_NEUTRAL).max(0.0);

        skin_blood_flow =
            ((SKIN_BLOOD_FLOW_NEUTRAL + CDIL * warmc) / (1.0 + CSTR * colds)).clamp(0.5, 90.0);
        let regsw = (CSW * warmb * (warms / 10.7).exp()).min(500.0);
        let mut ersw = 0.68 * regsw;

        let rea = 1.0 / (lr * facl * chc);
        let recl = rcl / (lr * icl);
        let emax = (saturated_vapor_pressure_torr(temp_skin) - vapor_pressure) / (rea + recl);
        let mut prsw = ersw / emax;
        pwet = 0.06 + 0.94 * prsw;
        let mut edif = pwet * emax - ersw;
        if pwet > wcrit {
            pwet = wcrit;
            prsw = wcrit / 0.94;
            ersw = prsw * emax;
            edif = 0.06 * (1.0 - prsw) * emax;
        }
        if emax < 0.0 {
            edif = 0.0;
            ersw = 0.0;
            pwet = wcrit;
        }
        esk = ersw + edif;

        let mshiv = 19.4 * colds * coldc;
        m = rm + mshiv;
        alfa = 0.0417737 + 0.7451833 / (skin_blood_flow + 0.585417);
    }

    // Standard environment for the same activity.
    let hsk = dry + esk;
    let w = pwet;
    let pssk = saturated_vapor_pressure_torr(temp_skin);
    let chr_s = chr;
    let chc_s = if met < 0.85 {
        3.0
    } else {
        (5.66 * (met - 0.85).powf(0.39)).max(3.0)
    };
    let ctc_s = chc_s + chr_s;
    let rclo_s = 1.52 / (met - wme / MET_FACTOR + 0.6944) - 0.1835;
    let rcl_s = 0.155 * rclo_s;
    let facl_s = 1.0 + KCLO * rclo_s;
    let fcl_s = 1.0 / (1.0 + 0.155 * facl_s * ctc_s * rclo_s);
    let im_s = 0.45;
    let icl_s = im_s * chc_s / ctc_s * (1.0 - fcl_s) / (chc_s / ctc_s - fcl_s * im_s);
    let ra_s = 1.0 / (facl_s * ctc_s);
    let rea_s = 1.0 / (lr * facl_s * chc_s);
    let recl_s = rcl_s / (lr * icl_s);
    let hd_s = 1.0 / (ra_s + rcl_s);
    let he_s = 1.0 / (rea_s + recl_s);

    let err = |x: f64| {
        hsk - hd_s * (temp_skin - x) - w * he_s * (pssk - 0.5 * saturated_vapor_pressure_torr(x))
    };

    let mut dx: f64 = 100.0;
    let mut x_old = temp_skin - hsk / hd_s;
    let mut x = x_old;
    let mut newton = 0;
    while dx.abs() > NEWTON_TOLERANCE {
        if newton == config.max_newton_iterations {
            debug!(x, dx, "SET solve hit its iteration bound");
            return SetOutcome::NonConverged {
                last_estimate: x,
                iterations: iterations + newton,
                stage: "standard effective temperature",
            };
        }
        newton += 1;
        let err1 = err(x_old);
        let err2 = err(x_old + NEWTON_DELTA);
        x = x_old - NEWTON_DELTA * err1 / (err2 - err1);
        dx = x - x_old;
        x_old = x;
    }
    iterations += newton;

    if !x.is_finite() {
        return SetOutcome::NonConverged {
            last_estimate: x,
            iterations,
            stage: "non-finite state",
        };
    }
    SetOutcome::Converged { set: x, iterations }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn office() -> ThermalInputs {
        ThermalInputs::new(19.0, 23.0, 0.5, 60.0, 1.5, 0.4)
    }

    #[test]
    fn reference_point() {
        let outcome = pierce_set(&office(), &SetConfig::default());
        let set = outcome.value().unwrap();
        assert!((set - 18.7369).abs() < 0.01, "set = {set}");
        assert!(outcome.convergence().is_converged());
    }

    #[test]
    fn neutral_indoor_point() {
        let inputs = ThermalInputs::new(24.0, 24.0, 0.1, 50.0, 1.1, 0.7);
        let set = pierce_set(&inputs, &SetConfig::default()).value().unwrap();
        assert!((set - 25.0695).abs() < 0.01, "set = {set}");
    }

    #[test]
    fn zero_newton_budget_is_non_converged() {
        let cfg = SetConfig {
            max_newton_iterations: 0,
            ..SetConfig::default()
        };
        let outcome = pierce_set(&office(), &cfg);
        assert!(!outcome.is_converged());
        assert_eq!(outcome.value(), None);
        match outcome {
            SetOutcome::NonConverged { stage, .. } => {
                assert_eq!(stage, "standard effective temperature")
            }
            SetOutcome::Converged { .. } => unreachable!(),
        }
    }

    #[test]
    fn zero_clothing_budget_is_non_converged() {
        let cfg = SetConfig {
            max_clothing_iterations: 0,
            ..SetConfig::default()
        };
        let outcome = pierce_set(&office(), &cfg);
        assert!(matches!(
            outcome,
            SetOutcome::NonConverged {
                stage: "clothing temperature",
                ..
            }
        ));
    }

    #[test]
    fn non_finite_input_is_non_converged() {
        let mut inputs = office();
        inputs.ta = f64::NAN;
        let outcome = pierce_set(&inputs, &SetConfig::default());
        assert!(!outcome.is_converged());
        assert!(!outcome.convergence().is_converged());
    }

    #[test]
    fn extreme_finite_inputs_are_tagged() {
        let cfg = SetConfig::default();
        for inputs in [
            ThermalInputs::new(60.0, 90.0, 3.0, 95.0, 4.0, 0.0),
            ThermalInputs::new(-40.0, -50.0, 10.0, 5.0, 0.8, 3.0),
            ThermalInputs::new(45.0, 45.0, 0.0, 100.0, 6.0, 2.0),
        ] {
            match pierce_set(&inputs, &cfg) {
                SetOutcome::Converged { set, iterations } => {
                    assert!(set.is_finite(), "{inputs:?}");
                    assert!(iterations > 0);
                }
                SetOutcome::NonConverged { stage, .. } => assert!(!stage.is_empty()),
            }
        }
    }

    #[test]
    fn still_air_floor() {
        let calm = ThermalInputs { vel: 0.0, ..office() };
        let floor = ThermalInputs { vel: 0.1, ..office() };
        let cfg = SetConfig::default();
        assert_eq!(pierce_set(&calm, &cfg), pierce_set(&floor, &cfg));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn converged_set_is_finite(
            ta in -60.0f64..70.0,
            dtr in -40.0f64..60.0,
            vel in 0.0f64..20.0,
            rh in 0.0f64..100.0,
            met in 0.7f64..8.0,
            clo in 0.0f64..4.0,
        ) {
            let inputs = ThermalInputs::new(ta, ta + dtr, vel, rh, met, clo);
            if let SetOutcome::Converged { set, .. } = pierce_set(&inputs, &SetConfig::default()) {
                prop_assert!(set.is_finite());
            }
        }
    }
}
