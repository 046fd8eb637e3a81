use super::{Component, ComponentClass};
use petroflash_core::cubic::PengRobinsonRecord;
use petroflash_core::parameter::{BinaryRecord, Identifier, ParameterError, PureRecord};
use petroflash_core::{EosError, EosResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

const COMPONENTS: &str = include_str!("parameters/components.json");
const BINARY: &str = include_str!("parameters/binary.json");

/// Database entry of a defined component.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ComponentRecord {
    pub class: ComponentClass,
    #[serde(flatten)]
    pub peng_robinson: PengRobinsonRecord,
}

/// Critical properties of defined components and binary interaction
/// parameters that replace the defaults of the component classes.
#[derive(Debug, Clone)]
pub struct ComponentDatabase {
    records: Vec<PureRecord<ComponentRecord>>,
    binary_records: Vec<BinaryRecord<Identifier, f64>>,
}

impl ComponentDatabase {
    /// The database shipped with the crate.
    pub fn embedded() -> Result<Self, ParameterError> {
        Self::from_json_str(COMPONENTS, Some(BINARY))
    }

    /// Read a database from json files.
    pub fn from_json<P: AsRef<Path>>(
        file_pure: P,
        file_binary: Option<P>,
    ) -> Result<Self, ParameterError> {
        let records = PureRecord::from_json_file(file_pure)?;
        let binary_records = match file_binary {
            Some(file) => BinaryRecord::from_json(file)?,
            None => Vec::new(),
        };
        Ok(Self {
            records,
            binary_records,
        })
    }

    /// Parse a database from json strings.
    pub fn from_json_str(pure: &str, binary: Option<&str>) -> Result<Self, ParameterError> {
        let records = serde_json::from_str(pure)?;
        let binary_records = match binary {
            Some(binary) => serde_json::from_str(binary)?,
            None => Vec::new(),
        };
        Ok(Self {
            records,
            binary_records,
        })
    }

    pub fn records(&self) -> &[PureRecord<ComponentRecord>] {
        &self.records
    }

    /// Find a component by name, alias, formula or CAS number.
    ///
    /// Exact names take precedence over the other identifiers.
    pub fn get(&self, query: &str) -> EosResult<Component> {
        let by_name = self.records.iter().find(|r| {
            r.identifier
                .name
                .as_deref()
                .is_some_and(|n| n.eq_ignore_ascii_case(query.trim()))
        });
        by_name
            .or_else(|| self.records.iter().find(|r| r.identifier.matches(query)))
            .map(|r| {
                let record = PureRecord::new(
                    r.identifier.clone(),
                    r.molarweight,
                    r.model_record.peng_robinson.clone(),
                );
                Component::new(r.model_record.class, record)
            })
            .ok_or_else(|| EosError::UnknownComponent(query.to_string()))
    }

    /// Tabulated binary interaction parameter of two components.
    pub fn binary_interaction(&self, id1: &Identifier, id2: &Identifier) -> Option<f64> {
        let same = |a: &Identifier, b: &Identifier| {
            a.name.is_some() && a.name.as_deref().map(str::to_lowercase) == b.name.as_deref().map(str::to_lowercase)
        };
        self.binary_records
            .iter()
            .find(|br| {
                (same(&br.id1, id1) && same(&br.id2, id2))
                    || (same(&br.id1, id2) && same(&br.id2, id1))
            })
            .map(|br| br.model_record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::arr1;
    use petroflash_core::cubic::{CubicOptions, PengRobinson, PengRobinsonParameters};
    use petroflash_core::parameter::Parameter;
    use petroflash_core::si::{CUBIC_METER, GRAM, KELVIN, KILOGRAM, MOL, PASCAL};
    use petroflash_core::{Root, State};
    use std::fs;
    use std::sync::Arc;

    #[test]
    fn embedded_database() -> EosResult<()> {
        let db = ComponentDatabase::embedded()?;
        assert_eq!(db.records().len(), 19);

        let water = db.get("H2O")?;
        assert_eq!(water.name(), "water");
        assert_eq!(water.class(), ComponentClass::Water);
        assert!(water.record().model_record.is_aqueous());
        assert_relative_eq!(water.critical_temperature().convert_into(KELVIN), 647.096);

        assert_eq!(db.get("nC4")?.name(), "n-butane");
        assert_eq!(db.get("CO2")?.class(), ComponentClass::CarbonDioxide);
        assert_relative_eq!(db.get("Methane")?.molar_weight().convert_into(GRAM / MOL), 16.0428);
        assert!(matches!(db.get("unobtainium"), Err(EosError::UnknownComponent(_))));
        Ok(())
    }

    #[test]
    fn tabulated_interactions() -> EosResult<()> {
        let db = ComponentDatabase::embedded()?;
        let h2s = db.get("H2S")?;
        let co2 = db.get("CO2")?;
        let methane = db.get("methane")?;
        assert_eq!(db.binary_interaction(co2.identifier(), h2s.identifier()), Some(0.097));
        assert_eq!(db.binary_interaction(h2s.identifier(), co2.identifier()), Some(0.097));
        assert_eq!(db.binary_interaction(co2.identifier(), methane.identifier()), None);
        Ok(())
    }

    #[test]
    fn database_from_files() -> EosResult<()> {
        let dir = std::env::temp_dir().join(format!("petroflash-db-{}", std::process::id()));
        fs::create_dir_all(&dir).map_err(ParameterError::from)?;
        let (file_pure, file_binary) = (dir.join("components.json"), dir.join("binary.json"));
        fs::write(&file_pure, COMPONENTS).map_err(ParameterError::from)?;
        fs::write(&file_binary, BINARY).map_err(ParameterError::from)?;

        let embedded = ComponentDatabase::embedded()?;
        let db = ComponentDatabase::from_json(&file_pure, Some(&file_binary))?;
        assert_eq!(db.records().len(), embedded.records().len());
        for (a, b) in db.records().iter().zip(embedded.records()) {
            assert_eq!(a.identifier.name, b.identifier.name);
            assert_eq!(a.model_record, b.model_record);
        }
        let (h2s, co2) = (db.get("H2S")?, db.get("CO2")?);
        assert_eq!(db.binary_interaction(h2s.identifier(), co2.identifier()), Some(0.097));

        let pure_only = ComponentDatabase::from_json(&file_pure, None)?;
        assert_eq!(pure_only.records().len(), 19);
        assert_eq!(pure_only.binary_interaction(h2s.identifier(), co2.identifier()), None);
        assert!(ComponentDatabase::from_json(dir.join("missing.json"), None).is_err());

        fs::remove_dir_all(&dir).map_err(ParameterError::from)?;
        Ok(())
    }

    #[test]
    fn water_density_at_standard_conditions() -> EosResult<()> {
        let water = ComponentDatabase::embedded()?.get("water")?;
        let parameters = PengRobinsonParameters::from_records(vec![water.record().clone()], None)?;
        let options = CubicOptions {
            volume_correction: true,
            ..Default::default()
        };
        let eos = Arc::new(PengRobinson::with_options(Arc::new(parameters), options));
        let state = State::new_tpx(
            &eos,
            288.15 * KELVIN,
            101325.0 * PASCAL,
            &arr1(&[1.0]),
            Root::Liquid,
        )?;
        assert_relative_eq!(
            state.mass_density().convert_into(KILOGRAM / CUBIC_METER),
            999.1,
            max_relative = 1e-4
        );
        Ok(())
    }
}
