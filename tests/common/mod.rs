use cassandra::models::{Domain, Node, Network};
use cassandra::types::Map;

/// The discrete three-node chain used throughout the spec's worked examples:
/// `A -> B -> C` and `A -> C`, with the CPTs given verbatim.
pub fn discrete_chain_network() -> Network {
    let a = Node::root(
        "A",
        Domain::Discrete { cardinality: 2 },
        [],
        |x: f64, _: &Map<f64>, _: &Map<f64>| if x as usize == 0 { 0.6 } else { 0.4 },
        Map::default(),
    )
    .unwrap();

    let b = Node::child_discrete(
        "B",
        2,
        [("A".to_string(), 2)],
        ndarray::array![[0.7, 0.3], [0.2, 0.8]].into_dyn(),
    )
    .unwrap();

    let c = Node::child_discrete(
        "C",
        2,
        [("A".to_string(), 2), ("B".to_string(), 2)],
        ndarray::array![
            [[0.9, 0.1], [0.5, 0.5]],
            [[0.3, 0.7], [0.1, 0.9]],
        ]
        .into_dyn(),
    )
    .unwrap();

    Network::new([a, b, c]).unwrap()
}

/// The "turbine" network from the spec's multi-layer continuous scenario.
pub fn turbine_network() -> Network {
    use statrs::distribution::{Continuous, Normal};

    let temperature = Node::root(
        "temperature",
        Domain::Continuous { lo: -100.0, hi: 100.0 },
        [],
        |x: f64, _: &Map<f64>, _: &Map<f64>| Normal::new(25.0, 10.0).unwrap().pdf(x),
        Map::default(),
    )
    .unwrap();

    let wind_speed = Node::root(
        "wind_speed",
        Domain::Continuous { lo: 0.0, hi: 100.0 },
        [],
        |x: f64, _: &Map<f64>, _: &Map<f64>| Normal::new(25.0, 5.0).unwrap().pdf(x),
        Map::default(),
    )
    .unwrap();

    let torque = Node::child_continuous(
        "torque",
        Domain::Continuous { lo: -100.0, hi: 100.0 },
        ["temperature".to_string(), "wind_speed".to_string()],
        ["k".to_string()],
        |parents: &Map<f64>, theta: &Map<f64>| {
            theta["k"] * parents["wind_speed"].powi(2) / parents["temperature"]
        },
        None,
    )
    .unwrap();

    let power = Node::child_continuous(
        "power",
        Domain::Continuous { lo: 0.0, hi: 100.0 },
        ["torque".to_string()],
        ["c".to_string()],
        |parents: &Map<f64>, theta: &Map<f64>| theta["c"] * parents["torque"],
        None,
    )
    .unwrap();

    Network::new([temperature, wind_speed, torque, power]).unwrap()
}

pub fn theta(pairs: &[(&str, f64)]) -> Map<f64> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

/// Compares a factor/node scope (`&[String]`) against a literal list of
/// names without relying on cross-type slice/array `PartialEq` impls.
pub fn scope_is(scope: &[String], expected: &[&str]) -> bool {
    scope.len() == expected.len() && scope.iter().zip(expected).all(|(a, b)| a == b)
}
