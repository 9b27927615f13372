// ul-core/src/units.rs

use uom::si::f64::{
    Energy as UomEnergy, Length as UomLength, Mass as UomMass, MassRate as UomMassRate,
    Power as UomPower, Pressure as UomPressure, Ratio as UomRatio,
    TemperatureInterval as UomTemperatureInterval,
    ThermodynamicTemperature as UomThermodynamicTemperature, Time as UomTime,
    Velocity as UomVelocity, Volume as UomVolume, VolumeRate as UomVolumeRate,
};

// Public canonical unit types (SI, f64)
pub type Energy = UomEnergy;
pub type Length = UomLength;
pub type Mass = UomMass;
pub type MassRate = UomMassRate;
pub type Power = UomPower;
pub type Pressure = UomPressure;
pub type Ratio = UomRatio;
pub type TempInterval = UomTemperatureInterval;
pub type Temperature = UomThermodynamicTemperature;
pub type Time = UomTime;
pub type Velocity = UomVelocity;
pub type Volume = UomVolume;
pub type VolumeRate = UomVolumeRate;

#[inline]
pub fn pa(v: f64) -> Pressure {
    use uom::si::pressure::pascal;
    Pressure::new::<pascal>(v)
}

#[inline]
pub fn bar(v: f64) -> Pressure {
    use uom::si::pressure::bar;
    Pressure::new::<bar>(v)
}

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn degc(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::degree_celsius;
    Temperature::new::<degree_celsius>(v)
}

#[inline]
pub fn delta_k(v: f64) -> TempInterval {
    use uom::si::temperature_interval::kelvin;
    TempInterval::new::<kelvin>(v)
}

#[inline]
pub fn kgps(v: f64) -> MassRate {
    use uom::si::mass_rate::kilogram_per_second;
    MassRate::new::<kilogram_per_second>(v)
}

#[inline]
pub fn w(v: f64) -> Power {
    use uom::si::power::watt;
    Power::new::<watt>(v)
}

#[inline]
pub fn j(v: f64) -> Energy {
    use uom::si::energy::joule;
    Energy::new::<joule>(v)
}

#[inline]
pub fn kg(v: f64) -> Mass {
    use uom::si::mass::kilogram;
    Mass::new::<kilogram>(v)
}

#[inline]
pub fn m3(v: f64) -> Volume {
    use uom::si::volume::cubic_meter;
    Volume::new::<cubic_meter>(v)
}

#[inline]
pub fn m(v: f64) -> Length {
    use uom::si::length::meter;
    Length::new::<meter>(v)
}

#[inline]
pub fn mps(v: f64) -> Velocity {
    use uom::si::velocity::meter_per_second;
    Velocity::new::<meter_per_second>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

#[inline]
pub fn unitless(v: f64) -> Ratio {
    use uom::si::ratio::ratio;
    Ratio::new::<ratio>(v)
}

/// Pressure in bar.
#[inline]
pub fn to_bar(p: Pressure) -> f64 {
    use uom::si::pressure::bar;
    p.get::<bar>()
}

/// Temperature in °C.
#[inline]
pub fn to_degc(t: Temperature) -> f64 {
    use uom::si::thermodynamic_temperature::degree_celsius;
    t.get::<degree_celsius>()
}

/// Shift a temperature by an interval.
#[inline]
pub fn offset_temperature(t: Temperature, by: TempInterval) -> Temperature {
    k(t.value + by.value)
}

pub mod constants {
    use super::*;

    /// Standard atmosphere in bar.
    pub const P_ATM_BAR: f64 = 1.013;

    #[inline]
    pub fn p_atm() -> Pressure {
        bar(P_ATM_BAR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_smoke() {
        let _p = pa(101_325.0);
        let _t = k(300.0);
        let _mdot = kgps(1.2);
        let _l = m(2.0);
        let _dt = s(0.1);
        let _r = unitless(0.5);
        let _v = mps(2.0);
        let _q = w(1.0e6);
        let _e = j(3.6e6);
        let _mass = kg(1.0);
        let _vol = m3(1.0);
        let _patm = constants::p_atm();
    }

    #[test]
    fn engineering_units_convert_to_si() {
        assert!((bar(16.0).value - 1.6e6).abs() < 1e-6);
        assert!((degc(20.0).value - 293.15).abs() < 1e-9);
        assert!((to_bar(pa(4.0e5)) - 4.0).abs() < 1e-12);
        assert!((to_degc(k(373.15)) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn offset_temperature_applies_interval() {
        let t = offset_temperature(degc(80.0), delta_k(-20.0));
        assert!((to_degc(t) - 60.0).abs() < 1e-9);
    }
}
