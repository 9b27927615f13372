//! The interface a process model exposes to the allocation engine.

use crate::edge::EdgeSet;

/// A simulated process that can be linked to background datasets.
///
/// The engine only reads [`ProcessModel::edges`]; everything else is the
/// model's own lifecycle.
pub trait ProcessModel {
    type Params;
    type Overrides;
    type Error;

    fn name(&self) -> &str;

    /// Replace the parameters. Invalidates any evaluated state.
    fn initialize(&mut self, params: Self::Params) -> Result<(), Self::Error>;

    /// Build and solve the model from its parameters and populate its edges.
    fn evaluate(&mut self) -> Result<(), Self::Error>;

    /// Edges of the last successful evaluation, if any.
    fn edges(&self) -> Option<&EdgeSet>;

    /// Apply parameter changes to the evaluated model without rebuilding it.
    fn recalculate(&mut self, overrides: Self::Overrides) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ImpactCategory, StaticScoreBackend};
    use crate::edge::{DatasetRef, EdgeAmount, Endpoint, FlowEdge};
    use crate::engine::ImpactEngine;
    use crate::error::{ConfigurationError, LcaError};

    /// Gas boiler with a fixed efficiency.
    struct Boiler {
        heat_w: f64,
        efficiency: f64,
        edges: Option<EdgeSet>,
    }

    impl ProcessModel for Boiler {
        type Params = f64;
        type Overrides = f64;
        type Error = LcaError;

        fn name(&self) -> &str {
            "boiler"
        }

        fn initialize(&mut self, heat_w: f64) -> Result<(), LcaError> {
            self.heat_w = heat_w;
            self.edges = None;
            Ok(())
        }

        fn evaluate(&mut self) -> Result<(), LcaError> {
            let gas = Endpoint::Dataset(DatasetRef::new("ei", "gas").with_unit("MJ"));
            self.edges = Some(
                EdgeSet::new()
                    .with(FlowEdge::input(
                        "gas",
                        gas,
                        EdgeAmount::quantity(self.heat_w / self.efficiency, "W"),
                    ))
                    .with(
                        FlowEdge::output("heat", Endpoint::Unlinked, EdgeAmount::quantity(self.heat_w, "W"))
                            .with_dataset_unit("MJ")
                            .functional(1.0),
                    ),
            );
            Ok(())
        }

        fn edges(&self) -> Option<&EdgeSet> {
            self.edges.as_ref()
        }

        fn recalculate(&mut self, efficiency: f64) -> Result<(), LcaError> {
            self.efficiency = efficiency;
            self.evaluate()
        }
    }

    #[test]
    fn engine_reads_model_edges_only() {
        let mut model = Boiler {
            heat_w: 0.0,
            efficiency: 0.9,
            edges: None,
        };
        let mut engine = ImpactEngine::new(StaticScoreBackend::new().with_score("gwp", "ei::gas", 0.06));
        let gwp = ImpactCategory::new("gwp");

        model.initialize(1.0e6).unwrap();
        let err = engine.compute_for(&model, &[gwp.clone()]).unwrap_err();
        assert!(matches!(
            err,
            LcaError::Configuration(ConfigurationError::EdgesNotPopulated { .. })
        ));

        model.evaluate().unwrap();
        let per_mj = engine.compute_for(&model, &[gwp.clone()]).unwrap();
        assert!((per_mj.allocated(&gwp, "heat").unwrap() - 0.06 / 0.9).abs() < 1e-12);

        model.recalculate(0.6).unwrap();
        let worse = engine.compute_for(&model, &[gwp.clone()]).unwrap();
        assert!(worse.allocated(&gwp, "heat").unwrap() > per_mj.allocated(&gwp, "heat").unwrap());
        assert_eq!(engine.requests(), 1);
    }
}
