use approx::assert_relative_eq;
use petroflash::components::{ComponentTable, Pedersen, TbpCorrelation, TbpFraction};
use petroflash::si::*;
use petroflash::{EosError, EosResult, FlashOptions, Mixture, PhaseEquilibrium, PhaseType};

fn water_gas_oil() -> EosResult<Mixture> {
    let mut mixture = Mixture::new();
    mixture.add_component("water", 0.5)?;
    mixture.add_component("methane", 0.3)?;
    mixture.add_component("propane", 0.05)?;
    mixture.add_tbp_fraction("C10+", 0.15, 0.2 * KILOGRAM / MOL, 0.83)?;
    mixture.set_multiphase_check(true);
    Ok(mixture)
}

#[test]
fn three_phase_split() -> EosResult<()> {
    let mixture = water_gas_oil()?;
    let vle = mixture.tp_flash(320.0 * KELVIN, 20.0 * BAR, None)?;
    assert_eq!(vle.number_of_phases(), 3);
    assert_eq!(
        vle.phase_types(),
        &[PhaseType::Vapor, PhaseType::LiquidHydrocarbon, PhaseType::Aqueous]
    );

    // material balance
    let feed = mixture.validate()?;
    for (z, x) in feed.iter().zip(vle.overall_molefracs().iter()) {
        assert_relative_eq!(z, x, epsilon = 1e-8);
    }
    assert_relative_eq!(vle.phase_fractions().sum(), 1.0, epsilon = 1e-12);
    assert!(vle.phase_fractions().iter().all(|&b| b > 0.0));

    // equal fugacities
    assert!(PhaseEquilibrium::fugacity_residual(vle.states()) < 1e-6);
    assert!(vle.diagnostics().residual < 1e-6);
    Ok(())
}

#[test]
fn repeated_flash_is_identical() -> EosResult<()> {
    let mixture = water_gas_oil()?;
    let (t, p) = (320.0 * KELVIN, 20.0 * BAR);
    let vle1 = mixture.tp_flash(t, p, None)?;
    let vle2 = mixture.tp_flash(t, p, None)?;
    assert_eq!(vle1.phase_types(), vle2.phase_types());
    for (b1, b2) in vle1.phase_fractions().iter().zip(vle2.phase_fractions().iter()) {
        assert_eq!(b1, b2);
    }
    for (s1, s2) in vle1.states().iter().zip(vle2.states().iter()) {
        assert_eq!(s1.molefracs, s2.molefracs);
    }
    Ok(())
}

#[test]
fn phase_limit_without_multiphase_check() -> EosResult<()> {
    let mixture = water_gas_oil()?;
    let options = FlashOptions::new().multiphase_check(false);
    let vle = mixture.tp_flash(320.0 * KELVIN, 20.0 * BAR, Some(options))?;
    assert!(vle.number_of_phases() <= 2);
    Ok(())
}

#[test]
fn pure_component_at_saturation() -> EosResult<()> {
    let mut mixture = Mixture::new();
    mixture.add_component("propane", 1.0)?;
    let eos = mixture.equation_of_state()?;
    let t = 300.0 * KELVIN;
    let p = PhaseEquilibrium::pure_saturation_pressure(&eos, t, Default::default())?;
    let vle = mixture.tp_flash(t, p, None)?;
    assert_eq!(vle.number_of_phases(), 2);
    assert!(vle.has_phase_type(PhaseType::Vapor));

    let liquid = mixture.tp_flash(t, 1.5 * p, None)?;
    assert_eq!(liquid.number_of_phases(), 1);
    assert_eq!(liquid.phase_types(), &[PhaseType::LiquidHydrocarbon]);
    Ok(())
}

#[test]
fn input_errors() -> EosResult<()> {
    let fraction = TbpFraction::new("C90", 2.5 * KILOGRAM / MOL, 1.0);
    assert!(matches!(
        Pedersen.characterize(&fraction),
        Err(EosError::InvalidCorrelationInput { .. })
    ));
    let mut table = ComponentTable::new();
    assert!(matches!(
        table.register_pseudo(fraction),
        Err(EosError::InvalidCorrelationInput { .. })
    ));
    assert!(matches!(
        table.register_defined("unobtainium"),
        Err(EosError::UnknownComponent(_))
    ));

    let mut mixture = Mixture::new();
    mixture.add_component("methane", 0.25)?;
    mixture.add_component("ethane", 0.25)?;
    assert!(matches!(
        mixture.tp_flash(300.0 * KELVIN, BAR, None),
        Err(EosError::InvalidComposition(_))
    ));
    assert!(matches!(
        mixture.add_component("unobtainium", 0.5),
        Err(EosError::UnknownComponent(_))
    ));
    assert!(matches!(
        mixture.set_mixing_rule("Huron-Vidal"),
        Err(EosError::Error(_))
    ));
    Ok(())
}
