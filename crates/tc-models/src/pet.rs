//! Physiological Equivalent Temperature (PET) on the Munich energy balance
//! model (MEMI).
//!
//! MEMI balances three nodes (core, skin, clothing) of a person described by
//! age, sex, height, mass and posture. PET is the air temperature of a
//! reference room (still air, 50% humidity, MRT equal to air temperature)
//! in which that person, at the same core and skin temperatures, has zero
//! net heat flux.
//!
//! The metabolic rate is given in met. One met is taken as the resting rate,
//! 1.17 times the male and 1.22 times the female basal rate. The reference
//! room keeps Hoeppe's 80 W of activity above basal. Vapor transfer follows
//! the Walther and Goestchel correction.

use crate::error::{ModelError, ModelResult};
use crate::inputs::ThermalInputs;
use serde::{Deserialize, Serialize};
use tc_core::units::constants::STANDARD_PRESSURE_PA;
use tc_core::units::{Pressure, to_pa};
use tc_solver::{Convergence, secant_componentwise};
use tracing::debug;

/// Set-point core temperature (C).
pub const TC_SET: f64 = 36.6;
/// Set-point skin temperature (C).
pub const TSK_SET: f64 = 34.0;
/// Set-point mean body temperature (C).
pub const TBODY_SET: f64 = 0.1 * TSK_SET + 0.9 * TC_SET;

const C_AIR: f64 = 1010.0;
const L_VAP: f64 = 2.42e6;
const C_B: f64 = 3640.0;
const EM_SK: f64 = 0.99;
const EM_CL: f64 = 0.95;
const SIGM: f64 = 5.67e-8;

/// Residual (W/m2) accepted on each node by the secant search.
const BALANCE_EPSILON: f64 = 0.01;
/// Residual (W/m2) accepted by the incremental fallback.
const BRUTE_FORCE_EPSILON: f64 = 0.1;
const BRUTE_FORCE_STEPS: [f64; 3] = [0.001, 0.01, 0.01];
const MAX_BRUTE_FORCE_ITERATIONS: usize = 100_000;
/// Search interval (C) of the reference room temperature.
const PET_BRACKET: (f64, f64) = (-40.0, 60.0);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetPosture {
    #[default]
    Standing,
    Seated,
    Crouching,
}

impl PetPosture {
    fn radiant_efficiency(self) -> f64 {
        match self {
            PetPosture::Seated => 0.696,
            PetPosture::Standing | PetPosture::Crouching => 0.725,
        }
    }

    /// Convective coefficient (W/m2K) at sea level for air speed `vel`.
    fn convection(self, vel: f64) -> f64 {
        match self {
            PetPosture::Standing => 2.67 + 6.5 * vel.powf(0.67),
            PetPosture::Seated => 2.26 + 7.42 * vel.powf(0.67),
            PetPosture::Crouching => 8.6 * vel.powf(0.513),
        }
    }
}

/// The person MEMI balances.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PetBody {
    /// Years.
    pub age: f64,
    /// 0 is male, 1 female; values between blend basal metabolism.
    pub sex: f64,
    /// Meters.
    pub height: f64,
    /// Kilograms.
    pub body_mass: f64,
    pub posture: PetPosture,
}

impl Default for PetBody {
    fn default() -> Self {
        Self {
            age: 36.0,
            sex: 0.5,
            height: 1.65,
            body_mass: 62.0,
            posture: PetPosture::Standing,
        }
    }
}

impl PetBody {
    pub fn validate(&self) -> ModelResult<()> {
        let checks = [
            ("age must be between 0 and 120", self.age, (0.0..=120.0).contains(&self.age)),
            ("sex must be between 0 and 1", self.sex, (0.0..=1.0).contains(&self.sex)),
            (
                "height must be between 0.6 and 3 m",
                self.height,
                (0.6..=3.0).contains(&self.height),
            ),
            (
                "body_mass must be above 0 and at most 300 kg",
                self.body_mass,
                self.body_mass > 0.0 && self.body_mass <= 300.0,
            ),
        ];
        for (what, value, ok) in checks {
            if !ok {
                return Err(ModelError::OutOfRange { what, value });
            }
        }
        Ok(())
    }

    /// Dubois surface area (m2).
    pub fn dubois_area(&self) -> f64 {
        0.203 * self.body_mass.powf(0.425) * self.height.powf(0.725)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PetResult {
    /// Physiological equivalent temperature (C).
    pub pet: f64,
    pub t_core: f64,
    pub t_skin: f64,
    pub t_clo: f64,
    /// Status of the node balance. A non-converged result keeps the last
    /// temperatures of the incremental search.
    pub convergence: Convergence,
}

/// Environment seen by MEMI: the actual one, or the PET reference room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Actual,
    Reference,
}

/// Everything in the balance that does not depend on body temperatures.
#[derive(Debug, Clone, Copy)]
struct MemiConstants {
    ta: f64,
    tr: f64,
    a_du: f64,
    a_clo: f64,
    a_effr: f64,
    feff: f64,
    hc: f64,
    fcl: f64,
    facl: f64,
    rcl: f64,
    htcl: f64,
    /// Air vapor pressure (hPa).
    vpa: f64,
    /// Internal heat production (W/m2).
    he: f64,
    /// Respiratory heat loss (W/m2).
    ere: f64,
}

impl MemiConstants {
    #[allow(clippy::too_many_arguments)]
    fn new(
        ta: f64,
        tr: f64,
        vel: f64,
        rh: f64,
        met: f64,
        clo: f64,
        body: &PetBody,
        b_press: f64,
        env: Environment,
    ) -> Self {
        let a_du = body.dubois_area();
        let feff = body.posture.radiant_efficiency();

        let fcl = 1.0 + 0.31 * clo;
        let facl_raw = (173.51 * clo - 2.36 - 100.76 * clo * clo + 19.28 * clo.powi(3)) / 100.0;
        let a_clo = a_du * facl_raw + a_du * (fcl - 1.0);
        let a_effr = a_du * feff;

        let vpa = match env {
            Environment::Actual => rh / 100.0 * 6.105 * (17.27 * ta / (237.7 + ta)).exp(),
            Environment::Reference => 12.0,
        };

        let hc = body.posture.convection(vel) * (b_press / STANDARD_PRESSURE_PA).powf(0.55);

        let (m, ht) = (body.body_mass, body.height);
        let age_term = 1.0 + 0.004 * (30.0 - body.age);
        let r_fem = ht * 100.0 / m.cbrt() - 42.1;
        let metab_female = 3.19 * m.powf(0.75) * (age_term + 0.018 * r_fem);
        let r_mal = ht * 100.0 / m.cbrt() - 43.4;
        let metab_male = 3.45 * m.powf(0.75) * (age_term + 0.01 * r_mal);
        let (mec, fec) = match env {
            Environment::Actual => (
                metab_male * 1.17 * met / a_du,
                metab_female * 1.22 * met / a_du,
            ),
            Environment::Reference => ((80.0 + metab_male) / a_du, (80.0 + metab_female) / a_du),
        };
        let he = (1.0 - body.sex) * mec + body.sex * fec;

        let texp = 0.47 * ta + 21.0;
        let dventpulm = he * 1.44e-6;
        let eres = C_AIR * (ta - texp) * dventpulm;
        let vpexp = 6.11 * 10f64.powf(7.45 * texp / (235.0 + texp));
        let erel = 0.623 * L_VAP / (b_press / 100.0) * (vpa - vpexp) * dventpulm;
        let ere = eres + erel;

        let rcl = clo / 6.45;
        let facl = facl_raw.min(1.0);
        let y = if clo >= 2.0 {
            1.0
        } else if clo > 0.6 {
            (ht - 0.2) / ht
        } else if clo > 0.3 {
            0.5
        } else if clo > 0.0 {
            0.1
        } else {
            0.0
        };
        let r2 = a_du * (fcl - 1.0 + facl) / (6.28 * ht * y);
        let r1 = facl * a_du / (6.28 * ht * y);
        let htcl = 6.28 * ht * y * (r2 - r1) / (rcl * (r2 / r1).ln() * a_clo);

        Self {
            ta,
            tr,
            a_du,
            a_clo,
            a_effr,
            feff,
            hc,
            fcl,
            facl,
            rcl,
            htcl,
            vpa,
            he,
            ere,
        }
    }

    /// Heat flux terms shared by the node and whole-body balances.
    fn fluxes(&self, t_core: f64, t_sk: f64, t_clo: f64) -> Fluxes {
        let t_body = 0.1 * t_sk + 0.9 * t_core;

        let mut esw = L_VAP / 1000.0 * (sweat_volume(t_body) / 3600.0);
        let pv_sk = 6.105 * (17.27 * t_sk / (237.7 + t_sk)).exp();
        let lw = 1.67;
        let fecl = 1.0 / (1.0 + 0.92 * self.hc * self.rcl);
        let emax = self.hc * lw * fecl * (pv_sk - self.vpa);
        let mut w = esw / emax;
        if w > 1.0 {
            w = 1.0;
            if esw - emax < 0.0 {
                esw = emax;
            }
        }
        if esw < 0.0 {
            esw = 0.0;
        }
        let i_m = 0.38;
        let r_ecl = (1.0 / (self.fcl * self.hc) + self.rcl) / (lw * i_m);
        let ediff = (1.0 - w) * (pv_sk - self.vpa) / r_ecl;
        let evap = -(ediff + esw);

        let tr4 = (self.tr + 273.15).powi(4);
        let rbare = self.a_effr * (1.0 - self.facl) * EM_SK * SIGM * (tr4 - (t_sk + 273.15).powi(4))
            / self.a_du;
        let rclo =
            self.feff * self.a_clo * EM_CL * SIGM * (tr4 - (t_clo + 273.15).powi(4)) / self.a_du;

        let cbare = self.hc * (self.ta - t_sk) * (1.0 - self.facl);
        let cclo = self.hc * (self.ta - t_clo) * self.a_clo / self.a_du;

        Fluxes {
            evap,
            rbare,
            rclo,
            cbare,
            cclo,
        }
    }

    /// Net flux (W/m2) into the core, skin and clothing nodes.
    fn node_balance(&self, t: &[f64; 3]) -> [f64; 3] {
        let [t_core, t_sk, t_clo] = *t;
        let f = self.fluxes(t_core, t_sk, t_clo);
        let vaso_ex = (vaso_circulation(t_core, t_sk) / 3600.0 * C_B + 5.28) * (t_core - t_sk);
        let clo_ex = self.htcl * (t_sk - t_clo);
        [
            self.he + self.ere - vaso_ex,
            f.rbare + f.cbare + f.evap + vaso_ex - clo_ex,
            f.cclo + f.rclo + clo_ex,
        ]
    }

    /// Net flux (W/m2) into the whole body.
    fn body_balance(&self, t: &[f64; 3]) -> f64 {
        let f = self.fluxes(t[0], t[1], t[2]);
        self.he + self.ere + f.rclo + f.rbare + f.cclo + f.cbare + f.evap
    }
}

struct Fluxes {
    evap: f64,
    rbare: f64,
    rclo: f64,
    cbare: f64,
    cclo: f64,
}

/// Skin blood flow (L/m2h) from core and skin temperatures, capped at 90.
pub fn vaso_circulation(t_core: f64, t_skin: f64) -> f64 {
    let sig_skin = (TSK_SET - t_skin).max(0.0);
    let sig_core = (t_core - TC_SET).max(0.0);
    ((6.3 + 75.0 * sig_core) / (1.0 + 0.5 * sig_skin)).min(90.0)
}

/// Sweat rate (g/m2h) from mean body temperature, capped at 500.
pub fn sweat_volume(t_body: f64) -> f64 {
    (304.94e-3 * (t_body - TBODY_SET).max(0.0)).min(500.0)
}

/// MEMI energy balance of a person at core, skin and clothing temperatures
/// `t_human`.
///
/// Returns the net flux on each node (W/m2). In [`Environment::Reference`]
/// humidity and metabolic rate are those of the PET reference room.
pub fn memi_balance(
    t_human: [f64; 3],
    inputs: &ThermalInputs,
    body: &PetBody,
    b_press: Pressure,
    env: Environment,
) -> [f64; 3] {
    let c = MemiConstants::new(
        inputs.ta,
        inputs.tr,
        inputs.vel,
        inputs.rh,
        inputs.met,
        inputs.clo,
        body,
        to_pa(b_press),
        env,
    );
    c.node_balance(&t_human)
}

/// Physiological equivalent temperature and the steady body temperatures
/// behind it.
///
/// Uses `ta`, `tr`, `vel`, `rh`, `met` and `clo` of `inputs`. The node
/// balance is solved with a componentwise secant over six widening
/// brackets, then an incremental search. PET itself is bisected on
/// [-40, 60] C to 0.01 C.
pub fn physiologic_equivalent_temperature(
    inputs: &ThermalInputs,
    body: &PetBody,
    b_press: Pressure,
) -> ModelResult<PetResult> {
    body.validate()?;
    if !(inputs.clo > 0.0) {
        return Err(ModelError::OutOfRange {
            what: "clo must be above 0 for PET",
            value: inputs.clo,
        });
    }
    let b_press = to_pa(b_press);
    let actual = MemiConstants::new(
        inputs.ta,
        inputs.tr,
        inputs.vel,
        inputs.rh,
        inputs.met,
        inputs.clo,
        body,
        b_press,
        Environment::Actual,
    );

    let t_core_in = TC_SET;
    let t_env = (inputs.ta + inputs.tr) / 2.0;
    let r_body = 1.0 / actual.htcl - actual.rcl;
    let r_tot = r_body + actual.rcl;
    let t_sk_in = t_core_in * (actual.rcl / r_tot) + t_env * (r_body / r_tot);
    let t_clo_in = (inputs.ta + inputs.tr + t_sk_in) / 3.0;
    let start = [t_core_in, t_sk_in, t_clo_in];

    let balance = |t: &[f64; 3]| actual.node_balance(t);
    let mut solved = None;
    for i in 1..=6 {
        let w = i as f64;
        let low = [start[0] - 5.0 * w, start[1] - 10.0 * w, start[2] - 10.0 * w];
        let high = [start[0] + 5.0 * w, start[1] + 10.0 * w, start[2] + 10.0 * w];
        if let Some(t) = secant_componentwise(low, high, balance, BALANCE_EPSILON) {
            solved = Some((t, Convergence::Converged { iterations: i }));
            break;
        }
    }
    let (t_human, convergence) = match solved {
        Some(found) => found,
        None => {
            debug!(ta = inputs.ta, tr = inputs.tr, "PET secant failed, using incremental search");
            brute_force_balance(start, balance)
        }
    };

    let reference = |tx: f64| {
        MemiConstants::new(
            tx,
            tx,
            0.1,
            50.0,
            inputs.met,
            0.9,
            body,
            b_press,
            Environment::Reference,
        )
        .body_balance(&t_human)
    };
    let (mut ti, mut tf) = PET_BRACKET;
    let mut pet = 0.0;
    while tf - ti > BALANCE_EPSILON {
        if reference(ti) * reference(pet) < 0.0 {
            tf = pet;
        } else {
            ti = pet;
        }
        pet = (ti + tf) / 2.0;
    }

    Ok(PetResult {
        pet,
        t_core: t_human[0],
        t_skin: t_human[1],
        t_clo: t_human[2],
        convergence,
    })
}

/// Steps each temperature by a fixed increment toward a zero residual.
fn brute_force_balance<F>(mut t: [f64; 3], balance: F) -> ([f64; 3], Convergence)
where
    F: Fn(&[f64; 3]) -> [f64; 3],
{
    let mut residual = balance(&t);
    for iterations in 0..MAX_BRUTE_FORCE_ITERATIONS {
        if residual.iter().all(|v| v.abs() < BRUTE_FORCE_EPSILON) {
            return (t, Convergence::Converged { iterations });
        }
        for (j, r) in residual.iter().enumerate() {
            if *r > BRUTE_FORCE_EPSILON {
                t[j] += BRUTE_FORCE_STEPS[j];
            } else if *r < -BRUTE_FORCE_EPSILON {
                t[j] -= BRUTE_FORCE_STEPS[j];
            }
        }
        residual = balance(&t);
    }
    let convergence = if residual.iter().all(|v| v.abs() < BRUTE_FORCE_EPSILON) {
        Convergence::Converged {
            iterations: MAX_BRUTE_FORCE_ITERATIONS,
        }
    } else {
        Convergence::NonConverged {
            iterations: MAX_BRUTE_FORCE_ITERATIONS,
            stage: "memi balance",
        }
    };
    (t, convergence)
}

/// Matzarakis and Mayer PET scale for temperate climates, from -4 (extreme
/// cold stress) to 4 (extreme heat stress).
pub fn pet_category(pet: f64) -> i8 {
    categorize(pet, [4.0, 8.0, 13.0, 18.0], [23.0, 29.0, 35.0, 41.0])
}

/// Lin and Matzarakis PET scale for humid (sub)tropical climates.
pub fn pet_category_humid(pet: f64) -> i8 {
    categorize(pet, [14.0, 18.0, 22.0, 26.0], [30.0, 34.0, 38.0, 42.0])
}

/// Cold edges are exclusive, hot edges inclusive.
fn categorize(pet: f64, cold: [f64; 4], hot: [f64; 4]) -> i8 {
    if let Some(i) = cold.iter().position(|edge| pet < *edge) {
        return i as i8 - 4;
    }
    match hot.iter().position(|edge| pet <= *edge) {
        Some(i) => i as i8,
        None => 4,
    }
}

/// Core temperature class: -2 hypothermia, -1 cold, 0 normal, 1 hot,
/// 2 hyperthermia.
pub fn core_temperature_category(t_core: f64) -> i8 {
    match t_core {
        t if t < 35.0 => -2,
        t if t < 36.5 => -1,
        t if t < 37.5 => 0,
        t if t < 38.3 => 1,
        _ => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tc_core::units::constants::standard_pressure;

    fn pet_at(ta: f64, tr: f64) -> PetResult {
        let inputs = ThermalInputs::new(ta, tr, 1.0, 50.0, 2.3, 1.0);
        physiologic_equivalent_temperature(&inputs, &PetBody::default(), standard_pressure())
            .unwrap()
    }

    fn rel_close(a: f64, b: f64, rel: f64) -> bool {
        (a - b).abs() <= rel * b.abs()
    }

    #[test]
    fn cold_reference_point() {
        let r = pet_at(-20.0, 10.0);
        assert!(r.convergence.is_converged());
        assert!(rel_close(r.pet, -16.958, 1e-2), "pet {}", r.pet);
        assert!(rel_close(r.t_core, 22.81, 1e-2), "core {}", r.t_core);
        assert!(rel_close(r.t_skin, 4.039, 1e-2), "skin {}", r.t_skin);
        assert!(rel_close(r.t_clo, -7.78, 1e-2), "clo {}", r.t_clo);
    }

    #[test]
    fn mild_reference_point() {
        let r = pet_at(20.0, 30.0);
        assert!(r.convergence.is_converged());
        assert!(rel_close(r.pet, 22.2986, 1e-2), "pet {}", r.pet);
        assert!(rel_close(r.t_core, 36.885, 1e-2), "core {}", r.t_core);
        assert!(rel_close(r.t_skin, 28.814, 1e-2), "skin {}", r.t_skin);
        assert!(rel_close(r.t_clo, 24.61, 1e-2), "clo {}", r.t_clo);
    }

    #[test]
    fn hot_reference_point() {
        let r = pet_at(30.0, 60.0);
        assert!(r.convergence.is_converged());
        assert!(rel_close(r.pet, 42.462, 1e-2), "pet {}", r.pet);
        assert!(rel_close(r.t_core, 39.228, 1e-2), "core {}", r.t_core);
        assert!(rel_close(r.t_skin, 38.142, 1e-2), "skin {}", r.t_skin);
        assert!(rel_close(r.t_clo, 40.277, 1e-2), "clo {}", r.t_clo);
    }

    #[test]
    fn solved_temperatures_balance_the_nodes() {
        let inputs = ThermalInputs::new(20.0, 30.0, 1.0, 50.0, 2.3, 1.0);
        let body = PetBody::default();
        let r = physiologic_equivalent_temperature(&inputs, &body, standard_pressure()).unwrap();
        let residual = memi_balance(
            [r.t_core, r.t_skin, r.t_clo],
            &inputs,
            &body,
            standard_pressure(),
            Environment::Actual,
        );
        assert!(residual.iter().all(|v| v.abs() < BALANCE_EPSILON));
    }

    #[test]
    fn invalid_body_and_clothing_rejected() {
        let inputs = ThermalInputs::new(20.0, 20.0, 0.1, 50.0, 1.2, 0.7);
        let old = PetBody {
            age: 130.0,
            ..PetBody::default()
        };
        assert!(physiologic_equivalent_temperature(&inputs, &old, standard_pressure()).is_err());
        let bare = ThermalInputs { clo: 0.0, ..inputs };
        assert!(
            physiologic_equivalent_temperature(&bare, &PetBody::default(), standard_pressure())
                .is_err()
        );
    }

    #[test]
    fn categories() {
        let cases = [
            (3.0, -4),
            (4.0, -3),
            (12.9, -2),
            (17.0, -1),
            (18.0, 0),
            (23.0, 0),
            (23.1, 1),
            (35.0, 2),
            (41.0, 3),
            (41.5, 4),
        ];
        for (pet, cat) in cases {
            assert_eq!(pet_category(pet), cat, "pet {pet}");
        }
        assert_eq!(pet_category_humid(13.0), -4);
        assert_eq!(pet_category_humid(26.0), 0);
        assert_eq!(pet_category_humid(30.0), 0);
        assert_eq!(pet_category_humid(31.0), 1);
        assert_eq!(pet_category_humid(43.0), 4);
        assert_eq!(core_temperature_category(34.0), -2);
        assert_eq!(core_temperature_category(36.0), -1);
        assert_eq!(core_temperature_category(37.0), 0);
        assert_eq!(core_temperature_category(38.0), 1);
        assert_eq!(core_temperature_category(39.0), 2);
    }

    #[test]
    fn physiology_caps() {
        assert_eq!(vaso_circulation(45.0, 20.0), 90.0);
        assert!((vaso_circulation(TC_SET, TSK_SET) - 6.3).abs() < 1e-12);
        assert_eq!(sweat_volume(30.0), 0.0);
        assert!(sweat_volume(TBODY_SET + 1.0) > 0.0);
    }
}
