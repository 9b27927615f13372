//! Allocation invariants over generated edge sets.

use proptest::prelude::*;
use ul_lca::{
    AllocationBasis, CoProducts, DatasetRef, EdgeAmount, EdgeSet, Endpoint, FlowEdge,
    ImpactCategory, ImpactEngine, StaticScoreBackend,
};

const UNITS: [&str; 4] = ["W", "kW", "MJ", "kWh"];

fn categories() -> Vec<ImpactCategory> {
    vec!["gwp".into(), "water".into()]
}

fn scenario(
    inputs: &[(f64, f64, usize)],
    outputs: &[(f64, f64)],
) -> (EdgeSet, StaticScoreBackend) {
    let mut edges = EdgeSet::new();
    let mut backend = StaticScoreBackend::new();
    for (i, (amount, score, unit)) in inputs.iter().enumerate() {
        let code = format!("in{i}");
        edges.insert(FlowEdge::input(
            code.clone(),
            Endpoint::Dataset(DatasetRef::new("ei", code.clone()).with_unit("MJ")),
            EdgeAmount::quantity(*amount, UNITS[*unit]),
        ));
        for (k, cat) in categories().into_iter().enumerate() {
            backend.insert(cat, format!("ei::{code}"), score * (k + 1) as f64);
        }
    }
    let weight: f64 = outputs.iter().map(|(_, w)| w).sum();
    for (i, (amount, w)) in outputs.iter().enumerate() {
        edges.insert(
            FlowEdge::output(
                format!("out{i}"),
                Endpoint::Unlinked,
                EdgeAmount::quantity(*amount, "W"),
            )
            .with_dataset_unit("MJ")
            .functional(w / weight),
        );
    }
    (edges, backend)
}

proptest! {
    #[test]
    fn allocated_amounts_reassemble_total(
        inputs in prop::collection::vec((1.0f64..1e7, 0.0f64..5.0, 0usize..4), 1..6),
        outputs in prop::collection::vec((1.0f64..1e7, 0.01f64..1.0), 1..4),
    ) {
        let (edges, backend) = scenario(&inputs, &outputs);
        let report = ImpactEngine::new(backend).compute(&edges, &categories()).unwrap();

        for cat in categories() {
            let total = report.total(&cat).unwrap();
            let reassembled: f64 = edges
                .functional()
                .map(|f| report.allocated(&cat, &f.name).unwrap() * report.resolved[&f.name])
                .sum();
            prop_assert!((reassembled - total).abs() <= 1e-9 * total.abs().max(1.0));
        }
    }

    #[test]
    fn recomputing_is_idempotent(
        inputs in prop::collection::vec((1.0f64..1e7, 0.0f64..5.0, 0usize..4), 1..6),
        outputs in prop::collection::vec((1.0f64..1e7, 0.01f64..1.0), 1..4),
    ) {
        let (edges, backend) = scenario(&inputs, &outputs);
        let mut engine = ImpactEngine::new(backend);
        let first = engine.compute(&edges, &categories()).unwrap();
        let second = engine.compute(&edges, &categories()).unwrap();
        prop_assert_eq!(first, second);
        prop_assert_eq!(engine.requests(), 1);
    }

    #[test]
    fn both_bases_conserve_exergy_split(share in 0.0f64..=1.0, power_w in 1.0f64..1e6) {
        let edges = EdgeSet::new()
            .with(FlowEdge::input(
                "fuel",
                Endpoint::Dataset(DatasetRef::new("ei", "gas").with_unit("MJ")),
                EdgeAmount::quantity(2.0e6, "W"),
            ))
            .with(
                FlowEdge::output("heat", Endpoint::Unlinked, EdgeAmount::quantity(1.0e6, "W"))
                    .with_dataset_unit("MJ")
                    .functional(1.0),
            )
            .with(FlowEdge::output(
                "power",
                Endpoint::Dataset(DatasetRef::new("ei", "grid").with_unit("kWh")),
                EdgeAmount::quantity(power_w, "W"),
            ));
        let backend = StaticScoreBackend::new()
            .with_score("gwp", "ei::gas", 0.07)
            .with_score("gwp", "ei::grid", 0.1);
        let gwp = ImpactCategory::new("gwp");
        let products = CoProducts::new("heat", "power", share);
        let mut engine = ImpactEngine::new(backend);

        let by_exergy = AllocationBasis::ByExergy.apply(&edges, &products).unwrap();
        let report = engine.compute(&by_exergy, &[gwp.clone()]).unwrap();
        let total = report.total(&gwp).unwrap();
        prop_assert!((total - 0.07 * 2.0).abs() < 1e-12);
        let heat = report.allocated(&gwp, "heat").unwrap() * report.resolved["heat"];
        prop_assert!((heat - share * total).abs() < 1e-9);

        let credit = AllocationBasis::Credit.apply(&edges, &products).unwrap();
        let credited = engine.compute(&credit, &[gwp.clone()]).unwrap();
        prop_assert!(credited.total(&gwp).unwrap() < total);
    }
}

#[test]
fn by_exergy_without_power_export_allocates_everything_to_heat() {
    let edges = EdgeSet::new()
        .with(FlowEdge::input(
            "fuel",
            Endpoint::Dataset(DatasetRef::new("ei", "gas").with_unit("MJ")),
            EdgeAmount::quantity(2.0e6, "W"),
        ))
        .with(
            FlowEdge::output("heat", Endpoint::Unlinked, EdgeAmount::quantity(1.0e6, "W"))
                .with_dataset_unit("MJ")
                .functional(1.0),
        )
        .with(FlowEdge::output(
            "power",
            Endpoint::Dataset(DatasetRef::new("ei", "grid").with_unit("kWh")),
            EdgeAmount::quantity(0.0, "W"),
        ));
    let backend = StaticScoreBackend::new()
        .with_score("gwp", "ei::gas", 0.07)
        .with_score("gwp", "ei::grid", 0.1);
    let gwp = ImpactCategory::new("gwp");

    let by_exergy = AllocationBasis::ByExergy
        .apply(&edges, &CoProducts::new("heat", "power", 1.0))
        .unwrap();
    let report = ImpactEngine::new(backend)
        .compute(&by_exergy, &[gwp.clone()])
        .unwrap();
    assert_eq!(by_exergy.functional().count(), 1);
    assert!((report.allocated(&gwp, "heat").unwrap() - 0.07 * 2.0).abs() < 1e-12);
    assert!(report.allocated(&gwp, "power").is_none());
}
