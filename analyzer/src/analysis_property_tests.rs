//! Property tests for analyzing arbitrary, possibly cyclic, wirings.

#[cfg(test)]
mod property_tests {
    use lad2scl_dsl::{
        kind::{CompareOp, PartKind},
        options::ConversionOptions,
        signature::SignatureRegistry,
    };
    use lad2scl_problems::Problem;
    use proptest::prelude::*;

    use crate::stages::analyze_network;
    use crate::test_helpers::NetworkBuilder;

    const PINS: [&str; 6] = ["in", "in1", "in2", "operand", "en", "pre"];

    fn kind_strategy() -> impl Strategy<Value = PartKind> {
        prop_oneof![
            Just(PartKind::Contact),
            Just(PartKind::NegatedContact),
            Just(PartKind::OrBlock),
            Just(PartKind::AndBlock),
            Just(PartKind::NotBlock),
            Just(PartKind::Coil),
            Just(PartKind::Move),
            Just(PartKind::Comparator { op: CompareOp::Ge }),
        ]
    }

    /// Parts and links `(from, to, pin)` between them.
    fn wiring_strategy() -> impl Strategy<Value = (Vec<PartKind>, Vec<(usize, usize, usize)>)> {
        prop::collection::vec(kind_strategy(), 1..12).prop_flat_map(|kinds| {
            let n = kinds.len();
            let links = prop::collection::vec((0..n, 0..n, 0..PINS.len()), 0..(n * 3));
            (Just(kinds), links)
        })
    }

    fn build(kinds: &[PartKind], links: &[(usize, usize, usize)]) -> NetworkBuilder {
        let mut builder = NetworkBuilder::new();
        for (idx, kind) in kinds.iter().enumerate() {
            let id = format!("p{}", idx);
            builder = builder
                .part(&id, kind.clone())
                .variable(&id, "operand", &format!("v{}", idx))
                .output(&id, "out1", &format!("o{}", idx));
        }
        for (from, to, pin) in links {
            builder = builder.link(
                &format!("p{}", from),
                "out",
                &format!("p{}", to),
                PINS[*pin],
            );
        }
        builder
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn analyze_network_when_any_wiring_then_terminates((kinds, links) in wiring_strategy()) {
            let network = build(&kinds, &links).network(1);

            let logic = analyze_network(
                &network,
                &SignatureRegistry::builtin(),
                &ConversionOptions::default(),
            );

            prop_assert_eq!(logic.id.0, 1);
        }

        #[test]
        fn analyze_network_when_links_only_forward_then_no_cycle((kinds, links) in wiring_strategy()) {
            let forward: Vec<_> = links.into_iter().filter(|(from, to, _)| from < to).collect();
            let network = build(&kinds, &forward).network(1);

            let logic = analyze_network(
                &network,
                &SignatureRegistry::builtin(),
                &ConversionOptions::default(),
            );

            prop_assert!(!logic.diagnostics.iter().any(|d| d.is(Problem::CycleDetected)));
        }
    }
}
