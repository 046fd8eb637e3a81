use super::interaction::interaction_matrix;
use super::{Component, ComponentDatabase, Pedersen, TbpCorrelation, TbpFraction};
use petroflash_core::cubic::PengRobinsonParameters;
use petroflash_core::parameter::{Parameter, ParameterError};
use petroflash_core::EosResult;
use std::fmt;
use std::sync::Arc;

/// Ordered set of the components of a fluid.
///
/// Components are immutable once registered. Registering the same
/// component twice returns the existing entry.
#[derive(Clone)]
pub struct ComponentTable {
    database: Option<Arc<ComponentDatabase>>,
    correlation: Arc<dyn TbpCorrelation>,
    components: Vec<Component>,
}

impl Default for ComponentTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ComponentTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentTable")
            .field("correlation", &self.correlation.name())
            .field("components", &self.names())
            .finish()
    }
}

impl fmt::Display for ComponentTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.components {
            writeln!(f, "{}", c)?;
        }
        Ok(())
    }
}

impl ComponentTable {
    /// Table that uses the embedded database and the Pedersen correlation.
    pub fn new() -> Self {
        Self {
            database: None,
            correlation: Arc::new(Pedersen),
            components: Vec::new(),
        }
    }

    pub fn with_database(database: Arc<ComponentDatabase>) -> Self {
        Self {
            database: Some(database),
            ..Self::new()
        }
    }

    pub fn with_correlation(mut self, correlation: Arc<dyn TbpCorrelation>) -> Self {
        self.correlation = correlation;
        self
    }

    fn database(&mut self) -> EosResult<Arc<ComponentDatabase>> {
        match &self.database {
            Some(database) => Ok(database.clone()),
            None => {
                let database = Arc::new(ComponentDatabase::embedded()?);
                self.database = Some(database.clone());
                Ok(database)
            }
        }
    }

    /// Register a component of the database and return its index.
    pub fn register_defined(&mut self, name: &str) -> EosResult<usize> {
        let component = self.database()?.get(name)?;
        match self.position(&component) {
            Some(i) => Ok(i),
            None => {
                self.components.push(component);
                Ok(self.components.len() - 1)
            }
        }
    }

    /// Characterize and register a TBP fraction and return its index.
    pub fn register_pseudo(&mut self, fraction: TbpFraction) -> EosResult<usize> {
        if let Some(i) = self.index_of(&fraction.name) {
            return match self.components[i].tbp_fraction() {
                Some(existing) if *existing == fraction => Ok(i),
                _ => Err(ParameterError::IncompatibleParameters(format!(
                    "component `{}` is already registered with different properties",
                    fraction.name
                ))
                .into()),
            };
        }
        let record = self.correlation.characterize(&fraction)?;
        self.components.push(Component::pseudo(fraction, record));
        Ok(self.components.len() - 1)
    }

    fn position(&self, component: &Component) -> Option<usize> {
        self.components
            .iter()
            .position(|c| !c.is_pseudo() && c.name() == component.name())
    }

    /// Index of the component with the given name, alias, formula or CAS number.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.components
            .iter()
            .position(|c| c.identifier().matches(name))
    }

    pub fn get(&self, name: &str) -> Option<&Component> {
        self.index_of(name).map(|i| &self.components[i])
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.components.iter().map(|c| c.name()).collect()
    }

    /// Peng-Robinson parameters of all registered components.
    pub fn parameters(&self) -> EosResult<PengRobinsonParameters> {
        let records = self.components.iter().map(|c| c.record().clone()).collect();
        let k_ij = interaction_matrix(&self.components, self.database.as_deref());
        Ok(PengRobinsonParameters::from_records(records, Some(k_ij))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::ComponentClass;
    use petroflash_core::si::{KILOGRAM, MOL};
    use petroflash_core::EosError;

    #[test]
    fn idempotent_registration() -> EosResult<()> {
        let mut table = ComponentTable::new();
        assert_eq!(table.register_defined("water")?, 0);
        assert_eq!(table.register_defined("H2O")?, 0);
        assert_eq!(table.register_defined("methane")?, 1);

        let c7 = TbpFraction::new("C7", 0.096 * KILOGRAM / MOL, 0.738);
        assert_eq!(table.register_pseudo(c7.clone())?, 2);
        assert_eq!(table.register_pseudo(c7)?, 2);
        assert_eq!(table.len(), 3);
        assert_eq!(table.names(), vec!["water", "methane", "C7"]);
        assert_eq!(table.get("C7").map(|c| c.class()), Some(ComponentClass::Pseudo));

        let c7_heavy = TbpFraction::new("C7", 0.1 * KILOGRAM / MOL, 0.738);
        assert!(matches!(
            table.register_pseudo(c7_heavy),
            Err(EosError::ParameterError(_))
        ));
        Ok(())
    }

    #[test]
    fn unknown_component() {
        let mut table = ComponentTable::new();
        assert!(matches!(
            table.register_defined("kryptonite"),
            Err(EosError::UnknownComponent(_))
        ));
        assert!(table.is_empty());
    }

    #[test]
    fn parameters() -> EosResult<()> {
        let mut table = ComponentTable::new();
        table.register_defined("water")?;
        table.register_defined("CO2")?;
        table.register_pseudo(TbpFraction::new("C10+", 0.2 * KILOGRAM / MOL, 0.85))?;
        let parameters = table.parameters()?;
        assert_eq!(parameters.k_ij()[[0, 1]], 0.19);
        assert_eq!(parameters.k_ij()[[1, 2]], 0.1);
        assert_eq!(parameters.k_ij()[[2, 0]], 0.5);
        Ok(())
    }
}
