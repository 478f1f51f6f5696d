mod common;

use approx::assert_relative_eq;
use cassandra::models::{Domain, Node, Network};
use cassandra::types::{Error, Map};

fn assignment(pairs: &[(&str, f64)]) -> Map<f64> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

#[test]
fn rejects_duplicate_node_names() {
    let a1 = Node::root(
        "A",
        Domain::Continuous { lo: 0.0, hi: 1.0 },
        [],
        |_: f64, _: &Map<f64>, _: &Map<f64>| 1.0,
        Map::default(),
    )
    .unwrap();
    let a2 = Node::root(
        "A",
        Domain::Continuous { lo: 0.0, hi: 1.0 },
        [],
        |_: f64, _: &Map<f64>, _: &Map<f64>| 1.0,
        Map::default(),
    )
    .unwrap();

    let err = Network::new([a1, a2]).unwrap_err();
    assert!(matches!(err, Error::DuplicateNode(ref v) if v == "A"));
}

#[test]
fn rejects_unknown_parent() {
    let b = Node::child_continuous(
        "B",
        Domain::Continuous { lo: -20.0, hi: 21.0 },
        ["A".to_string()],
        [],
        |parents: &Map<f64>, _: &Map<f64>| parents["A"],
        None,
    )
    .unwrap();

    let err = Network::new([b]).unwrap_err();
    assert!(matches!(err, Error::UnknownParent(ref p, ref c) if p == "A" && c == "B"));
}

#[test]
fn rejects_cycles() {
    let a = Node::child_continuous(
        "A",
        Domain::Continuous { lo: -20.0, hi: 20.0 },
        ["B".to_string()],
        [],
        |parents: &Map<f64>, _: &Map<f64>| parents["B"],
        None,
    )
    .unwrap();
    let b = Node::child_continuous(
        "B",
        Domain::Continuous { lo: -20.0, hi: 20.0 },
        ["A".to_string()],
        [],
        |parents: &Map<f64>, _: &Map<f64>| parents["A"],
        None,
    )
    .unwrap();

    let err = Network::new([a, b]).unwrap_err();
    assert!(matches!(err, Error::NotDAG));
}

#[test]
fn joint_pdf_matches_discrete_chain_scenario() {
    let network = common::discrete_chain_network();

    let p1 = network
        .joint_pdf(
            &assignment(&[("A", 0.0), ("B", 0.0), ("C", 0.0)]),
            &Map::default(),
        )
        .unwrap();
    assert_relative_eq!(p1, 0.378, epsilon = 1e-9);

    let p2 = network
        .joint_pdf(
            &assignment(&[("A", 1.0), ("B", 0.0), ("C", 1.0)]),
            &Map::default(),
        )
        .unwrap();
    assert_relative_eq!(p2, 0.056, epsilon = 1e-9);
}

#[test]
fn joint_pdf_is_nonnegative_over_every_cell() {
    let network = common::discrete_chain_network();
    for a in 0..2 {
        for b in 0..2 {
            for c in 0..2 {
                let p = network
                    .joint_pdf(
                        &assignment(&[("A", a as f64), ("B", b as f64), ("C", c as f64)]),
                        &Map::default(),
                    )
                    .unwrap();
                assert!(p >= 0.0);
            }
        }
    }
}

#[test]
fn joint_pdf_rejects_missing_variable() {
    let network = common::discrete_chain_network();
    let err = network
        .joint_pdf(&assignment(&[("A", 0.0), ("B", 0.0)]), &Map::default())
        .unwrap_err();
    assert!(matches!(err, Error::UnknownVariable(ref v) if v == "C"));
}

#[test]
fn joint_pdf_rejects_missing_system_parameter() {
    let network = common::turbine_network();
    let assignment = assignment(&[
        ("temperature", 25.0),
        ("wind_speed", 25.0),
        ("torque", 12.0),
        ("power", 6.0),
    ]);
    let err = network.joint_pdf(&assignment, &Map::default()).unwrap_err();
    assert!(matches!(err, Error::UnknownParameter(_)));
}

#[test]
fn joint_pdf_rejects_out_of_domain_value() {
    let network = common::discrete_chain_network();
    let err = network
        .joint_pdf(
            &assignment(&[("A", 0.0), ("B", 0.0), ("C", 5.0)]),
            &Map::default(),
        )
        .unwrap_err();
    assert!(matches!(err, Error::DomainViolation(5.0, ref v) if v == "C"));
}

#[test]
fn factorise_emits_one_factor_per_node() {
    let network = common::discrete_chain_network();
    assert_eq!(network.factorise().len(), network.order());
}
