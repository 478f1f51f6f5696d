mod common;

use approx::assert_relative_eq;
use cassandra::inference::{Inference, Range};
use cassandra::models::{Domain, Node};
use cassandra::types::{Error, Map, Set};

fn evidence(pairs: &[(&str, f64)]) -> Map<f64> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

#[test]
fn uniform_root_pass_through() {
    let a = Node::root(
        "A",
        Domain::Continuous { lo: 0.0, hi: 1.0 },
        [],
        |x: f64, _: &Map<f64>, _: &Map<f64>| if (0.0..=1.0).contains(&x) { 1.0 } else { 0.0 },
        Map::default(),
    )
    .unwrap();
    let b = Node::child_continuous(
        "B",
        Domain::Continuous { lo: -20.0, hi: 21.0 },
        ["A".to_string()],
        [],
        |parents: &Map<f64>, _: &Map<f64>| parents["A"],
        None,
    )
    .unwrap();
    let network = cassandra::models::Network::new([a, b]).unwrap();

    let p = network
        .infer(
            "B",
            Range::Continuous(0.0, 1.0),
            &evidence(&[("A", 0.5)]),
            &Map::default(),
        )
        .unwrap();
    assert_relative_eq!(p, 0.3829, epsilon = 1e-3);
}

#[test]
fn discrete_conditional_queries_match_the_worked_chain() {
    let network = common::discrete_chain_network();

    let p_b1_given_a0 = network
        .infer(
            "B",
            Range::Discrete(Set::from_iter([1])),
            &evidence(&[("A", 0.0)]),
            &Map::default(),
        )
        .unwrap();
    assert_relative_eq!(p_b1_given_a0, 0.3, epsilon = 1e-9);

    let p_a1_given_b0 = network
        .infer(
            "A",
            Range::Discrete(Set::from_iter([1])),
            &evidence(&[("B", 0.0)]),
            &Map::default(),
        )
        .unwrap();
    assert_relative_eq!(p_a1_given_b0, 0.16, epsilon = 1e-9);

    let p_c1_given_a0_b1 = network
        .infer(
            "C",
            Range::Discrete(Set::from_iter([1])),
            &evidence(&[("A", 0.0), ("B", 1.0)]),
            &Map::default(),
        )
        .unwrap();
    assert_relative_eq!(p_c1_given_a0_b1, 0.5, epsilon = 1e-9);
}

#[test]
fn standard_normal_root_normalises_to_nearly_one() {
    let a = Node::root(
        "A",
        Domain::Continuous { lo: -100.0, hi: 100.0 },
        [],
        |x: f64, _: &Map<f64>, _: &Map<f64>| {
            use statrs::distribution::{Continuous, Normal};
            Normal::new(0.0, 1.0).unwrap().pdf(x)
        },
        Map::default(),
    )
    .unwrap();
    let network = cassandra::models::Network::new([a]).unwrap();

    let p = network
        .infer(
            "A",
            Range::Continuous(-5.0, 5.0),
            &Map::default(),
            &Map::default(),
        )
        .unwrap();
    assert_relative_eq!(p, 0.9999994, epsilon = 1e-4);
}

#[test]
fn turbine_network_multi_layer_continuous_inference() {
    let network = common::turbine_network();
    let theta = common::theta(&[("k", 0.5), ("c", 0.5)]);

    let p = network
        .infer(
            "torque",
            Range::Continuous(10.0, 12.0),
            &evidence(&[("temperature", 25.0), ("wind_speed", 25.0)]),
            &theta,
        )
        .unwrap();
    assert_relative_eq!(p, 0.3023, epsilon = 1e-3);
}

#[test]
fn query_over_its_own_full_domain_is_idempotent() {
    let network = common::discrete_chain_network();
    let p = network
        .infer(
            "A",
            Range::Discrete(Set::from_iter([0, 1])),
            &Map::default(),
            &Map::default(),
        )
        .unwrap();
    assert_relative_eq!(p, 1.0, epsilon = 1e-4);
}

#[test]
fn every_query_result_lies_in_unit_interval() {
    let network = common::discrete_chain_network();
    for state in [0, 1] {
        let p = network
            .infer(
                "C",
                Range::Discrete(Set::from_iter([state])),
                &evidence(&[("A", 0.0), ("B", 1.0)]),
                &Map::default(),
            )
            .unwrap();
        assert!((0.0..=1.0).contains(&p));
    }
}

#[test]
fn evidence_with_zero_prior_probability_is_unsupported() {
    // A root that is only ever in state 0 makes evidence `A = 1` impossible.
    let a = Node::root(
        "A",
        Domain::Discrete { cardinality: 2 },
        [],
        |x: f64, _: &Map<f64>, _: &Map<f64>| if x as usize == 0 { 1.0 } else { 0.0 },
        Map::default(),
    )
    .unwrap();
    let b = Node::child_discrete(
        "B",
        2,
        [("A".to_string(), 2)],
        ndarray::array![[0.5, 0.5], [0.5, 0.5]].into_dyn(),
    )
    .unwrap();
    let network = cassandra::models::Network::new([a, b]).unwrap();

    let err = network
        .infer(
            "B",
            Range::Discrete(Set::from_iter([0])),
            &evidence(&[("A", 1.0)]),
            &Map::default(),
        )
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedEvidence));
}

#[test]
fn range_type_must_match_query_domain() {
    let network = common::discrete_chain_network();
    let err = network
        .infer("A", Range::Continuous(0.0, 1.0), &Map::default(), &Map::default())
        .unwrap_err();
    assert!(matches!(err, Error::RangeMismatch(ref v) if v == "A"));
}

#[test]
fn infer_rejects_unknown_query_and_evidence_names() {
    let network = common::discrete_chain_network();

    let err = network
        .infer(
            "Z",
            Range::Discrete(Set::from_iter([0])),
            &Map::default(),
            &Map::default(),
        )
        .unwrap_err();
    assert!(matches!(err, Error::UnknownVariable(ref v) if v == "Z"));

    let err = network
        .infer(
            "A",
            Range::Discrete(Set::from_iter([0])),
            &evidence(&[("Z", 0.0)]),
            &Map::default(),
        )
        .unwrap_err();
    assert!(matches!(err, Error::UnknownVariable(ref v) if v == "Z"));
}
