//! tc-models: thermal comfort models as pure functions.
//!
//! Contains:
//! - utci (Universal Thermal Climate Index polynomial + inverse solve)
//! - pmv (Fanger PMV/PPD + elevated air speed correction + inverse solve)
//! - set (Pierce two-node model and Standard Effective Temperature)
//! - adaptive (ASHRAE-55 / EN-15251 adaptive comfort + prevailing temperature)
//! - pet (Physiological Equivalent Temperature on the MEMI three-node balance)
//! - solarcal (MRT correction for solar exposure)
//! - indices (humidex, heat index, wind chill, WBGT, apparent and effective
//!   temperature, discomfort index, thermal sensation, degree-time)
//! - clothing (clothing level from outdoor temperature)
//! - local (radiant asymmetry discomfort)
//! - psychrometrics (vapor pressure, humidity ratio, dew point)
//!
//! Every model is a deterministic function of its inputs. Iterative models
//! report non-convergence in their result instead of failing.

pub mod adaptive;
pub mod clothing;
pub mod error;
pub mod indices;
pub mod inputs;
pub mod local;
pub mod pet;
pub mod pmv;
pub mod psychrometrics;
pub mod set;
pub mod solarcal;
pub mod utci;

pub use adaptive::{
    AdaptiveResult, AdaptiveStandard, adaptive_comfort_ashrae55, adaptive_comfort_conditioned,
    adaptive_comfort_en15251, cooling_effect_ashrae55, cooling_effect_en15251,
    monthly_average_prevailing, t_operative, weighted_running_mean_daily,
    weighted_running_mean_hourly,
};
pub use clothing::{ClothingSchedule, schiavon_clo};
pub use error::{ModelError, ModelResult};
pub use inputs::ThermalInputs;
pub use local::{AsymmetryType, radiant_asymmetry_ppd};
pub use pet::{
    PetBody, PetPosture, PetResult, core_temperature_category, pet_category,
    pet_category_humid, physiologic_equivalent_temperature,
};
pub use pmv::{
    FangerResult, HeatLoss, PartialThermalInputs, PmvResult, calc_missing_pmv_input, fanger_pmv,
    pmv_from_ppd, ppd_from_pmv, predicted_mean_vote, standard_effective_temperature,
};
pub use set::{SetConfig, SetOutcome, pierce_set};
pub use solarcal::{
    IndoorHeatExchange, OutdoorHeatExchange, Posture, SkyExposure, SolarCalParameter,
    SolarInputs, indoor_sky_heat_exch, outdoor_sky_heat_exch,
};
pub use utci::{
    PartialUtciInputs, UtciInputs, UtciOutput, calc_missing_utci_input,
    universal_thermal_climate_index, utci_evaluate,
};
