use approx::assert_relative_eq;
use petroflash::si::*;
use petroflash::{EosError, EosResult, Mixture, Stream};

fn wet_gas() -> EosResult<Mixture> {
    let mut mixture = Mixture::new();
    mixture.add_component("water", 0.1)?;
    mixture.add_component("methane", 0.8)?;
    mixture.add_component("ethane", 0.07)?;
    mixture.add_component("propane", 0.03)?;
    mixture.set_multiphase_check(true);
    Ok(mixture)
}

#[test]
fn unit_conversions() -> EosResult<()> {
    let mut stream = Stream::new("wet gas", &wet_gas()?);
    stream.set_pressure(0.0, "barg")?;
    assert_relative_eq!(stream.pressure().convert_into(PASCAL), 101325.0);
    stream.set_pressure(100.0, "psia")?;
    assert_relative_eq!(stream.pressure().convert_into(BAR), 6.894757293168361);
    stream.set_temperature(212.0, "F")?;
    assert_relative_eq!(stream.temperature().convert_into(KELVIN), 373.15, epsilon = 1e-10);
    stream.set_flow_rate(24.0, "t/d")?;
    assert_relative_eq!(stream.flow_rate().convert_into(KILOGRAM / HOUR), 1000.0, epsilon = 1e-10);
    assert!(matches!(
        stream.set_temperature(1.0, "Rankine"),
        Err(EosError::UnsupportedUnit { .. })
    ));
    Ok(())
}

#[test]
fn water_knock_out() -> EosResult<()> {
    let mut stream = Stream::new("wet gas", &wet_gas()?);
    stream.set_pressure(50.0, "bara")?;
    stream.set_temperature(30.0, "C")?;
    stream.set_flow_rate(10.0, "kg/s")?;
    stream.run()?;
    assert_eq!(stream.number_of_phases()?, 2);
    assert!(stream.has_phase_type("gas")?);
    assert!(stream.has_phase_type("aqueous")?);
    assert!(!stream.has_phase_type("oil")?);

    let water = stream.phase("aqueous")?.expect("aqueous phase");
    assert!(water.composition["water"] > 0.99);
    assert!(water.mass_density.convert_into(KILOGRAM / CUBIC_METER) > 700.0);
    let gas = stream.phase("gas")?.expect("gas phase");
    assert!(gas.compressibility > 0.8);
    let total: f64 = [gas, water]
        .iter()
        .map(|p| p.mass_flow_rate.convert_into(KILOGRAM / SECOND))
        .sum();
    assert_relative_eq!(total, 10.0, max_relative = 1e-8);
    Ok(())
}

#[test]
fn snapshot_of_mixture() -> EosResult<()> {
    let mut mixture = wet_gas()?;
    let stream = Stream::new("wet gas", &mixture);
    mixture.add_component("n-decane", 0.1)?;
    assert_eq!(stream.mixture().number_of_components(), 4);
    assert_eq!(mixture.number_of_components(), 5);
    Ok(())
}

#[cfg(feature = "rayon")]
#[test]
fn parallel_streams() -> EosResult<()> {
    use petroflash::execute_streams;
    let mixture = wet_gas()?;
    let mut streams: Vec<_> = [10.0, 30.0, 50.0, 70.0]
        .iter()
        .map(|&p| -> EosResult<Stream> {
            let mut s = Stream::new(&format!("{p} bar"), &mixture);
            s.set_pressure(p, "bara")?;
            s.set_temperature(30.0, "C")?;
            Ok(s)
        })
        .collect::<EosResult<_>>()?;
    let results = execute_streams(&mut streams, Some(2))?;
    assert!(results.iter().all(|r| r.is_ok()));
    for s in &streams {
        let mut serial = s.clone();
        serial.run()?;
        assert_eq!(s.number_of_phases()?, serial.number_of_phases()?);
    }
    Ok(())
}
