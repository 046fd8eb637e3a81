//! Component property table.
//!
//! Defined components are taken from a database of critical properties;
//! pseudo-components (TBP fractions) are characterized from their molar
//! mass and relative density.
use petroflash_core::cubic::PengRobinsonRecord;
use petroflash_core::parameter::{Identifier, PureRecord};
use petroflash_core::si::{MolarWeight, Pressure, Temperature, GRAM, KELVIN, MOL, PASCAL};
use serde::{Deserialize, Serialize};
use std::fmt;

mod characterization;
mod database;
mod interaction;
mod table;

pub use characterization::{Pedersen, TbpCorrelation, TbpFraction};
pub use database::{ComponentDatabase, ComponentRecord};
pub use interaction::default_interaction;
pub use table::ComponentTable;

/// Chemical family of a component.
///
/// The class determines the default binary interaction parameters.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ComponentClass {
    Water,
    Nitrogen,
    CarbonDioxide,
    HydrogenSulfide,
    /// Light gases that are neither hydrocarbons nor acid gases.
    Inert,
    Hydrocarbon,
    /// Lumped TBP fraction.
    Pseudo,
}

/// A registered component with its Peng-Robinson parameters.
#[derive(Debug, Clone)]
pub struct Component {
    class: ComponentClass,
    record: PureRecord<PengRobinsonRecord>,
    tbp: Option<TbpFraction>,
}

impl Component {
    pub fn new(class: ComponentClass, record: PureRecord<PengRobinsonRecord>) -> Self {
        Self {
            class,
            record,
            tbp: None,
        }
    }

    pub(crate) fn pseudo(fraction: TbpFraction, record: PengRobinsonRecord) -> Self {
        let record = PureRecord::new(
            Identifier::pseudo(&fraction.name),
            fraction.molar_weight.convert_into(GRAM / MOL),
            record,
        );
        Self {
            class: ComponentClass::Pseudo,
            record,
            tbp: Some(fraction),
        }
    }

    pub fn name(&self) -> &str {
        self.record.identifier.name.as_deref().unwrap_or("")
    }

    pub fn identifier(&self) -> &Identifier {
        &self.record.identifier
    }

    pub fn class(&self) -> ComponentClass {
        self.class
    }

    pub fn record(&self) -> &PureRecord<PengRobinsonRecord> {
        &self.record
    }

    /// Characterization input of a pseudo-component.
    pub fn tbp_fraction(&self) -> Option<&TbpFraction> {
        self.tbp.as_ref()
    }

    pub fn molar_weight(&self) -> MolarWeight {
        self.record.molarweight * GRAM / MOL
    }

    pub fn critical_temperature(&self) -> Temperature {
        self.record.model_record.tc() * KELVIN
    }

    pub fn critical_pressure(&self) -> Pressure {
        self.record.model_record.pc() * PASCAL
    }

    pub fn acentric_factor(&self) -> f64 {
        self.record.model_record.acentric_factor()
    }

    pub fn is_pseudo(&self) -> bool {
        self.class == ComponentClass::Pseudo
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:?}): M = {}, Tc = {}, pc = {}, ω = {:.4}",
            self.name(),
            self.class,
            self.molar_weight(),
            self.critical_temperature(),
            self.critical_pressure(),
            self.acentric_factor()
        )
    }
}
