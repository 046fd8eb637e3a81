//! Records of pure substances and binary pairs, and the trait that builds
//! equation of state parameters from them.
use ndarray::Array2;
use serde::de::DeserializeOwned;
use std::io;
use thiserror::Error;

mod identifier;
mod model_record;

pub use identifier::Identifier;
pub use model_record::{BinaryRecord, PureRecord};

/// Constructor methods for parameters.
///
/// Parameters are built from one record per component and an optional
/// matrix of binary interaction parameters in the same order.
pub trait Parameter
where
    Self: Sized,
{
    type Pure: Clone + DeserializeOwned;
    type Binary: Clone + DeserializeOwned + Default;

    /// Creates parameters from records for pure substances and possibly binary parameters.
    fn from_records(
        pure_records: Vec<PureRecord<Self::Pure>>,
        binary_records: Option<Array2<Self::Binary>>,
    ) -> Result<Self, ParameterError>;

    /// The records the parameters were built from.
    #[allow(clippy::type_complexity)]
    fn records(&self) -> (&[PureRecord<Self::Pure>], Option<&Array2<Self::Binary>>);

    /// Parameters of the components in `component_list`, in that order.
    fn subset(&self, component_list: &[usize]) -> Result<Self, ParameterError> {
        let (pure_records, binary_records) = self.records();
        let n = pure_records.len();
        if let Some(&i) = component_list.iter().find(|&&i| i >= n) {
            return Err(ParameterError::IncompatibleParameters(format!(
                "component index {} out of bounds for {} components",
                i, n
            )));
        }
        let pure_records = component_list
            .iter()
            .map(|&i| pure_records[i].clone())
            .collect();
        let m = component_list.len();
        let binary_records = binary_records.map(|br| {
            Array2::from_shape_fn([m, m], |(i, j)| {
                br[(component_list[i], component_list[j])].clone()
            })
        });
        Self::from_records(pure_records, binary_records)
    }
}

/// Error type for invalid records and problems reading parameter files.
#[derive(Error, Debug)]
pub enum ParameterError {
    #[error(transparent)]
    FileIO(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error("Incompatible parameters: {0}")]
    IncompatibleParameters(String),
}
