//! Predicted Mean Vote and Predicted Percentage of Dissatisfied.
//!
//! [`fanger_pmv`] is the ISO 7730 steady-state heat balance.
//! [`predicted_mean_vote`] adds the ASHRAE 55 elevated air speed correction:
//! above the still-air threshold, air and radiant temperatures are lowered
//! by the cooling effect that keeps SET unchanged at still air.
//!
//! Out-of-range policy: all inputs are extrapolated. The clothing
//! temperature loop is capped at 150 iterations; hitting the cap is reported
//! through [`Convergence`].

use crate::error::{ModelError, ModelResult};
use crate::inputs::ThermalInputs;
use crate::set::{SetConfig, SetOutcome, pierce_set};
use serde::{Deserialize, Serialize};
use tc_solver::{Convergence, RootConfig, bisect, secant, solve_secant_then_bisect};
use tracing::debug;

/// Air speed at or below which no cooling effect is applied (m/s).
pub const DEFAULT_STILL_AIR_THRESHOLD: f64 = 0.1;
pub const FANGER_MAX_ITERATIONS: usize = 150;
const FANGER_TOLERANCE: f64 = 0.00015;
/// Search range and tolerance for the cooling effect (C).
const COOLING_EFFECT_BRACKET: (f64, f64) = (0.0, 40.0);
const COOLING_EFFECT_TOLERANCE: f64 = 0.001;

/// Heat loss components of the Fanger balance (W/m2).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HeatLoss {
    /// Diffusion through the skin.
    pub cond: f64,
    /// Sweating.
    pub sweat: f64,
    /// Latent respiration.
    pub res_l: f64,
    /// Sensible respiration.
    pub res_s: f64,
    /// Radiation from the clothing surface.
    pub rad: f64,
    /// Convection from the clothing surface.
    pub conv: f64,
}

impl HeatLoss {
    pub fn total(&self) -> f64 {
        self.cond + self.sweat + self.res_l + self.res_s + self.rad + self.conv
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FangerResult {
    pub pmv: f64,
    pub ppd: f64,
    pub heat_loss: HeatLoss,
    pub convergence: Convergence,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PmvResult {
    pub pmv: f64,
    pub ppd: f64,
    /// Standard Effective Temperature at the given air speed (C).
    pub set: f64,
    /// Air temperature after the cooling effect (C).
    pub ta_adj: f64,
    /// Cooling effect of elevated air speed (C).
    pub cooling_effect: f64,
    pub heat_loss: HeatLoss,
    /// Status of PMV and PPD. SET only counts here above still air.
    pub convergence: Convergence,
    /// Status of the SET solve behind `set`.
    pub set_convergence: Convergence,
}

/// Fanger's PMV with PPD and heat loss terms.
pub fn fanger_pmv(inputs: &ThermalInputs) -> FangerResult {
    let ThermalInputs {
        ta,
        tr,
        vel,
        rh,
        met,
        clo,
        wme,
    } = *inputs;

    let pa = rh * 10.0 * (16.6536 - 4030.183 / (ta + 235.0)).exp();
    let icl = 0.155 * clo;
    let m = met * 58.15;
    let w = wme * 58.15;
    let mw = m - w;
    let fcl = if icl <= 0.078 {
        1.0 + 1.29 * icl
    } else {
        1.05 + 0.645 * icl
    };

    let hcf = 12.1 * vel.sqrt();
    let taa = ta + 273.0;
    let tra = tr + 273.0;
    let tcla = taa + (35.5 - ta) / (3.5 * icl + 0.1);

    let p1 = icl * fcl;
    let p2 = p1 * 3.96;
    let p3 = p1 * 100.0;
    let p4 = p1 * taa;
    let p5 = 308.7 - 0.028 * mw + p2 * (tra / 100.0).powi(4);

    let mut xn = tcla / 100.0;
    let mut xf = tcla / 50.0;
    let mut hc = hcf;
    let mut n = 0;
    let mut convergence = Convergence::Converged { iterations: 0 };
    while (xn - xf).abs() > FANGER_TOLERANCE {
        if n == FANGER_MAX_ITERATIONS {
            debug!(xn, xf, "PMV clothing temperature loop hit its bound");
            convergence = Convergence::NonConverged {
                iterations: n,
                stage: "clothing surface temperature",
            };
            break;
        }
        xf = (xf + xn) / 2.0;
        let hcn = 2.38 * (100.0 * xf - taa).abs().powf(0.25);
        hc = hcf.max(hcn);
        xn = (p5 + p4 * hc - p2 * xf.powi(4)) / (100.0 + p3 * hc);
        n += 1;
    }
    if convergence.is_converged() {
        convergence = Convergence::Converged { iterations: n };
    }
    let tcl = 100.0 * xn - 273.0;

    let heat_loss = HeatLoss {
        cond: 3.05 * 0.001 * (5733.0 - 6.99 * mw - pa),
        sweat: if mw > 58.15 { 0.42 * (mw - 58.15) } else { 0.0 },
        res_l: 1.7 * 0.00001 * m * (5867.0 - pa),
        res_s: 0.0014 * m * (34.0 - ta),
        rad: 3.96 * fcl * (xn.powi(4) - (tra / 100.0).powi(4)),
        conv: fcl * hc * (tcl - ta),
    };

    let ts = 0.303 * (-0.036 * m).exp() + 0.028;
    let pmv = ts * (mw - heat_loss.total());
    if !pmv.is_finite() && convergence.is_converged() {
        convergence = Convergence::NonConverged {
            iterations: n,
            stage: "non-finite state",
        };
    }

    FangerResult {
        pmv,
        ppd: ppd_from_pmv(pmv),
        heat_loss,
        convergence,
    }
}

/// PPD (%) from PMV. The minimum is 5% at PMV 0.
pub fn ppd_from_pmv(pmv: f64) -> f64 {
    100.0 - 95.0 * (-0.03353 * pmv.powi(4) - 0.2179 * pmv.powi(2)).exp()
}

/// Symmetric PMV band `(lower, upper)` that yields `ppd`.
///
/// `ppd` must lie strictly between 5 and 100.
pub fn pmv_from_ppd(ppd: f64, pmv_up_bound: f64, ppd_tolerance: f64) -> ModelResult<(f64, f64)> {
    if !(ppd > 5.0 && ppd < 100.0) {
        return Err(ModelError::OutOfRange {
            what: "ppd must be between 5 and 100",
            value: ppd,
        });
    }
    let config = RootConfig {
        low: 0.0,
        up: pmv_up_bound,
        tolerance: ppd_tolerance,
    };
    let upper = solve_secant_then_bisect(|pmv| ppd_from_pmv(pmv) - ppd, &config, true)?;
    Ok((-upper, upper))
}

/// PPD limit of an ISO 7730 comfort class (1, 2 or 3).
pub fn ppd_threshold_from_comfort_class(comfort_class: u8) -> ModelResult<f64> {
    match comfort_class {
        1 => Ok(6.0),
        2 => Ok(10.0),
        3 => Ok(15.0),
        other => Err(ModelError::InvalidArg {
            what: format!("comfort class {other} is not one of 1, 2, 3"),
        }),
    }
}

/// PMV with the SET-based elevated air speed correction.
///
/// At still air PMV and PPD come straight from [`fanger_pmv`], so a SET
/// failure is only reported through `set_convergence`. Above still air the
/// cooling effect is derived from SET and both statuses are combined.
pub fn predicted_mean_vote(
    inputs: &ThermalInputs,
    still_air_threshold: f64,
    set_config: &SetConfig,
) -> PmvResult {
    let set_outcome = pierce_set(inputs, set_config);
    let se_temp = set_outcome.estimate();
    let set_convergence = set_outcome.convergence();

    if inputs.vel <= still_air_threshold {
        let fanger = fanger_pmv(inputs);
        return PmvResult {
            pmv: fanger.pmv,
            ppd: fanger.ppd,
            set: se_temp,
            ta_adj: inputs.ta,
            cooling_effect: 0.0,
            heat_loss: fanger.heat_loss,
            convergence: fanger.convergence,
            set_convergence,
        };
    }

    let (cooling_effect, ce_convergence) =
        match cooling_effect_for_set(inputs, se_temp, still_air_threshold, set_config) {
            Some(ce) => (ce, Convergence::Converged { iterations: 0 }),
            None => (
                0.0,
                Convergence::NonConverged {
                    iterations: 0,
                    stage: "cooling effect",
                },
            ),
        };
    let fanger = fanger_pmv(&inputs.cooled(cooling_effect, still_air_threshold));

    PmvResult {
        pmv: fanger.pmv,
        ppd: fanger.ppd,
        set: se_temp,
        ta_adj: inputs.ta - cooling_effect,
        cooling_effect,
        heat_loss: fanger.heat_loss,
        convergence: set_convergence.and(ce_convergence).and(fanger.convergence),
        set_convergence,
    }
}

/// Temperature drop at still air that reproduces `se_temp`.
fn cooling_effect_for_set(
    inputs: &ThermalInputs,
    se_temp: f64,
    still_air_threshold: f64,
    set_config: &SetConfig,
) -> Option<f64> {
    if !se_temp.is_finite() {
        return None;
    }
    let residual = |ce: f64| {
        let still = inputs.cooled(ce, still_air_threshold);
        se_temp - pierce_set(&still, set_config).estimate()
    };
    let (lo, hi) = COOLING_EFFECT_BRACKET;
    secant(lo, hi, residual, COOLING_EFFECT_TOLERANCE)
        .filter(|ce| ce.is_finite())
        .or_else(|| bisect(lo, hi, residual, COOLING_EFFECT_TOLERANCE, 0.0))
}

/// PMV inputs where exactly one variable (or air and radiant temperature
/// together) is unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialThermalInputs {
    pub ta: Option<f64>,
    pub tr: Option<f64>,
    pub vel: Option<f64>,
    pub rh: Option<f64>,
    pub met: Option<f64>,
    pub clo: Option<f64>,
    pub wme: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PmvSlot {
    TaTr,
    Ta,
    Tr,
    Vel,
    Rh,
    Met,
    Clo,
    Wme,
}

impl PartialThermalInputs {
    fn missing_slot(&self) -> ModelResult<PmvSlot> {
        let fields = [
            self.ta, self.tr, self.vel, self.rh, self.met, self.clo, self.wme,
        ];
        let missing: Vec<usize> = fields
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_none())
            .map(|(i, _)| i)
            .collect();
        let slot = match missing.as_slice() {
            [0, 1] => PmvSlot::TaTr,
            [0] => PmvSlot::Ta,
            [1] => PmvSlot::Tr,
            [2] => PmvSlot::Vel,
            [3] => PmvSlot::Rh,
            [4] => PmvSlot::Met,
            [5] => PmvSlot::Clo,
            [6] => PmvSlot::Wme,
            _ => {
                return Err(ModelError::InvalidArg {
                    what: "exactly one PMV input (or ta and tr together) must be missing"
                        .to_string(),
                });
            }
        };
        Ok(slot)
    }

    fn fill(&self, slot: PmvSlot, x: f64) -> ThermalInputs {
        let known = |v: Option<f64>| v.unwrap_or(x);
        let (ta, tr) = match slot {
            PmvSlot::TaTr => (x, x),
            _ => (known(self.ta), known(self.tr)),
        };
        ThermalInputs {
            ta,
            tr,
            vel: known(self.vel),
            rh: known(self.rh),
            met: known(self.met),
            clo: known(self.clo),
            wme: known(self.wme),
        }
    }
}

/// Solve for the missing input that produces `target_pmv`.
///
/// Clothing is solved by bisection only; the PMV response to clo is too
/// flat near the bracket ends for the secant pass.
pub fn calc_missing_pmv_input(
    target_pmv: f64,
    inputs: &PartialThermalInputs,
    config: &RootConfig,
    still_air_threshold: f64,
) -> ModelResult<ThermalInputs> {
    let slot = inputs.missing_slot()?;
    let set_config = SetConfig::default();
    let residual = |x: f64| {
        let pmv = predicted_mean_vote(&inputs.fill(slot, x), still_air_threshold, &set_config).pmv;
        // PMV falls as air speed rises.
        if slot == PmvSlot::Vel {
            target_pmv - pmv
        } else {
            pmv - target_pmv
        }
    };
    let x = solve_secant_then_bisect(residual, config, slot != PmvSlot::Clo)?;
    Ok(inputs.fill(slot, x))
}

/// Convenience for callers that only need the SET value.
pub fn standard_effective_temperature(inputs: &ThermalInputs) -> SetOutcome {
    pierce_set(inputs, &SetConfig::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel_close(a: f64, b: f64, rel: f64) -> bool {
        (a - b).abs() <= rel * b.abs()
    }

    #[test]
    fn fanger_reference_point() {
        let r = fanger_pmv(&ThermalInputs::new(19.0, 23.0, 0.1, 60.0, 1.5, 0.4));
        assert!(rel_close(r.pmv, -0.680633, 1e-2), "pmv = {}", r.pmv);
        assert!(rel_close(r.ppd, 14.7373, 1e-2));
        assert!(rel_close(r.heat_loss.cond, 11.60697, 1e-2));
        assert!(rel_close(r.heat_loss.sweat, 12.2115, 1e-2));
        assert!(rel_close(r.heat_loss.res_l, 6.7457, 1e-2));
        assert!(rel_close(r.heat_loss.res_s, 1.8317, 1e-2));
        assert!(rel_close(r.heat_loss.rad, 26.63829, 1e-2));
        assert!(rel_close(r.heat_loss.conv, 44.745778, 1e-2));
        assert!(rel_close(r.heat_loss.total(), 103.78, 1e-2));
        assert!(r.convergence.is_converged());
    }

    #[test]
    fn ppd_minimum_at_neutral() {
        assert_eq!(ppd_from_pmv(0.0), 5.0);
        assert!(rel_close(ppd_from_pmv(-0.5), 10.0, 1e-1));
        assert!(rel_close(ppd_from_pmv(-1.0), 26.0, 1e-1));
        assert_eq!(ppd_from_pmv(1.3), ppd_from_pmv(-1.3));
    }

    #[test]
    fn pmv_band_from_ppd() {
        let (lo, hi) = pmv_from_ppd(10.0, 3.0, 0.001).unwrap();
        assert!(rel_close(hi, 0.4892, 1e-2));
        assert_eq!(lo, -hi);
        assert!(pmv_from_ppd(5.0, 3.0, 0.001).is_err());
        assert!(pmv_from_ppd(100.0, 3.0, 0.001).is_err());
    }

    #[test]
    fn comfort_class_thresholds() {
        assert_eq!(ppd_threshold_from_comfort_class(1).unwrap(), 6.0);
        assert_eq!(ppd_threshold_from_comfort_class(2).unwrap(), 10.0);
        assert_eq!(ppd_threshold_from_comfort_class(3).unwrap(), 15.0);
        assert!(ppd_threshold_from_comfort_class(4).is_err());
    }

    #[test]
    fn elevated_air_speed_correction() {
        let inputs = ThermalInputs::new(19.0, 23.0, 0.5, 60.0, 1.5, 0.4);
        let r = predicted_mean_vote(&inputs, DEFAULT_STILL_AIR_THRESHOLD, &SetConfig::default());
        assert!(rel_close(r.pmv, -1.7377, 1e-2), "pmv = {}", r.pmv);
        assert!(rel_close(r.set, 18.7369, 1e-3));
        assert!(rel_close(r.cooling_effect, 3.8764, 1e-2));
        assert!((r.ta_adj - (19.0 - r.cooling_effect)).abs() < 1e-12);
        assert!(r.convergence.is_converged());
    }

    #[test]
    fn still_air_uses_fanger_directly() {
        let inputs = ThermalInputs::new(24.0, 24.0, 0.1, 50.0, 1.1, 0.7);
        let r = predicted_mean_vote(&inputs, DEFAULT_STILL_AIR_THRESHOLD, &SetConfig::default());
        assert!(rel_close(r.pmv, -0.05357, 1e-3));
        assert!(rel_close(r.ppd, 5.0594, 1e-3));
        assert_eq!(r.cooling_effect, 0.0);
        assert_eq!(r.ta_adj, 24.0);
    }

    #[test]
    fn set_failure_flags_the_result() {
        let inputs = ThermalInputs::new(19.0, 23.0, 0.5, 60.0, 1.5, 0.4);
        let cfg = SetConfig {
            max_newton_iterations: 0,
            ..SetConfig::default()
        };
        let r = predicted_mean_vote(&inputs, DEFAULT_STILL_AIR_THRESHOLD, &cfg);
        assert!(!r.convergence.is_converged());
        assert!(!r.set_convergence.is_converged());
    }

    #[test]
    fn set_failure_at_still_air_keeps_fanger_result() {
        let inputs = ThermalInputs::new(22.0, 22.0, 0.05, 50.0, 1.1, 0.7);
        let cfg = SetConfig {
            max_clothing_iterations: 1,
            max_newton_iterations: 0,
        };
        let r = predicted_mean_vote(&inputs, DEFAULT_STILL_AIR_THRESHOLD, &cfg);
        let fanger = fanger_pmv(&inputs);
        assert_eq!(r.pmv, fanger.pmv);
        assert_eq!(r.ppd, fanger.ppd);
        assert!(r.convergence.is_converged());
        assert!(!r.set_convergence.is_converged());
        assert_eq!(r.cooling_effect, 0.0);
    }

    #[test]
    fn extreme_finite_inputs_never_report_nan_as_converged() {
        let cfg = SetConfig::default();
        for inputs in [
            ThermalInputs::new(60.0, 90.0, 3.0, 95.0, 4.0, 0.0),
            ThermalInputs::new(-40.0, -50.0, 10.0, 5.0, 0.8, 3.0),
            ThermalInputs::new(45.0, 45.0, 0.0, 100.0, 6.0, 2.0),
        ] {
            let r = predicted_mean_vote(&inputs, DEFAULT_STILL_AIR_THRESHOLD, &cfg);
            if r.convergence.is_converged() {
                assert!(r.pmv.is_finite(), "{inputs:?}");
                assert!(r.ppd.is_finite(), "{inputs:?}");
            }
            if r.set_convergence.is_converged() {
                assert!(r.set.is_finite(), "{inputs:?}");
            }
        }
    }

    #[test]
    fn missing_air_temperature() {
        let partial = PartialThermalInputs {
            ta: None,
            tr: Some(20.0),
            vel: Some(0.05),
            rh: Some(50.0),
            met: Some(1.2),
            clo: Some(0.75),
            wme: Some(0.0),
        };
        let solved =
            calc_missing_pmv_input(-0.5, &partial, &RootConfig::default(), 0.1).unwrap();
        let check = predicted_mean_vote(&solved, 0.1, &SetConfig::default());
        assert!((check.pmv + 0.5).abs() < 0.01);
    }

    #[test]
    fn too_many_missing_inputs() {
        let partial = PartialThermalInputs::default();
        assert!(calc_missing_pmv_input(0.0, &partial, &RootConfig::default(), 0.1).is_err());
    }
}
