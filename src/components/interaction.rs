use super::{Component, ComponentClass, ComponentDatabase};
use itertools::Itertools;
use ndarray::Array2;

/// Default binary interaction parameter of two component classes.
pub fn default_interaction(class1: ComponentClass, class2: ComponentClass) -> f64 {
    use ComponentClass::*;
    let k_ij = |c1: ComponentClass, c2: ComponentClass| match (c1, c2) {
        (Water, Hydrocarbon) | (Water, Pseudo) => Some(0.5),
        (Water, Nitrogen) => Some(0.48),
        (Water, CarbonDioxide) => Some(0.19),
        (Water, HydrogenSulfide) => Some(0.04),
        (Nitrogen, Hydrocarbon) | (Nitrogen, Pseudo) => Some(0.08),
        (Nitrogen, CarbonDioxide) => Some(-0.02),
        (CarbonDioxide, Hydrocarbon) => Some(0.12),
        (CarbonDioxide, Pseudo) => Some(0.1),
        (HydrogenSulfide, Hydrocarbon) | (HydrogenSulfide, Pseudo) => Some(0.08),
        _ => None,
    };
    k_ij(class1, class2)
        .or_else(|| k_ij(class2, class1))
        .unwrap_or(0.0)
}

/// Symmetric matrix of binary interaction parameters.
///
/// Tabulated values of the database take precedence over the class defaults.
pub(crate) fn interaction_matrix(
    components: &[Component],
    database: Option<&ComponentDatabase>,
) -> Array2<f64> {
    let n = components.len();
    let mut k_ij = Array2::zeros((n, n));
    for (i, j) in (0..n).tuple_combinations() {
        let (c1, c2) = (&components[i], &components[j]);
        let k = database
            .and_then(|db| db.binary_interaction(c1.identifier(), c2.identifier()))
            .unwrap_or_else(|| default_interaction(c1.class(), c2.class()));
        k_ij[[i, j]] = k;
        k_ij[[j, i]] = k;
    }
    k_ij
}

#[cfg(test)]
mod tests {
    use super::*;
    use petroflash_core::EosResult;

    #[test]
    fn class_defaults() {
        use ComponentClass::*;
        assert_eq!(default_interaction(Water, Hydrocarbon), 0.5);
        assert_eq!(default_interaction(Hydrocarbon, Water), 0.5);
        assert_eq!(default_interaction(CarbonDioxide, Nitrogen), -0.02);
        assert_eq!(default_interaction(Pseudo, CarbonDioxide), 0.1);
        assert_eq!(default_interaction(Hydrocarbon, Pseudo), 0.0);
        assert_eq!(default_interaction(Inert, Water), 0.0);
    }

    #[test]
    fn tabulated_values_override_defaults() -> EosResult<()> {
        let db = ComponentDatabase::embedded()?;
        let components = vec![db.get("methane")?, db.get("H2S")?, db.get("water")?];
        let k_ij = interaction_matrix(&components, Some(&db));
        assert_eq!(k_ij[[0, 1]], 0.08);
        assert_eq!(k_ij[[1, 2]], 0.04);
        assert_eq!(k_ij[[2, 0]], 0.5);
        assert_eq!(k_ij, k_ij.t());
        assert!(k_ij.diag().iter().all(|&k| k == 0.0));
        Ok(())
    }
}
