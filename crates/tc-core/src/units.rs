// tc-core/src/units.rs

use uom::si::f64::{
    Pressure as UomPressure, ThermodynamicTemperature as UomThermodynamicTemperature,
};

// Psychrometric quantities carry units; the comfort models work in plain f64.
pub type Pressure = UomPressure;
pub type Temperature = UomThermodynamicTemperature;

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

#[inline]
pub fn degc(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::degree_celsius;
    Temperature::new::<degree_celsius>(v)
}

#[inline]
pub fn to_kelvin(t: Temperature) -> f64 {
    use uom::si::thermodynamic_temperature::kelvin;
    t.get::<kelvin>()
}

#[inline]
pub fn to_pa(p: Pressure) -> f64 {
    use uom::si::pressure::pascal;
    p.get::<pascal>()
}

pub mod constants {
    use super::*;

    /// Standard sea-level atmospheric pressure.
    pub const STANDARD_PRESSURE_PA: f64 = 101_325.0;

    /// Stefan-Boltzmann constant used by the comfort literature (W/m2K4).
    pub const STEFAN_BOLTZMANN: f64 = 5.6697e-8;

    #[inline]
    pub fn standard_pressure() -> Pressure {
        pa(STANDARD_PRESSURE_PA)
    }
}
