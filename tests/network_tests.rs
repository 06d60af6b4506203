#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use neuroevo::{Chromosome, EvoError, Gene, Network, NetworkParams, NodeRole};
use rand::SeedableRng;
use rand::rngs::StdRng;

const INPUTS: [&str; 3] = ["input1", "input2", "input3"];
const HIDDEN: [&str; 5] = ["hidden1", "hidden2", "hidden3", "hidden4", "hidden5"];
const OUTPUTS: [&str; 1] = ["output"];

fn create_test_network(seed: u64) -> Network {
    let mut rng = StdRng::seed_from_u64(seed);
    Network::layered(NetworkParams::default(), &INPUTS, &HIDDEN, &OUTPUTS, &mut rng)
        .expect("Failed to build network")
}

fn feed(network: &mut Network) {
    network.reset();
    network.set_value("input1", 1.0).unwrap();
    network.set_value("input2", 0.0).unwrap();
    network.set_value("input3", 0.5).unwrap();
    network.evaluate();
}

#[test]
fn test_layered_topology() {
    let network = create_test_network(1);

    assert_eq!(network.input_count(), 3);
    assert_eq!(network.output_count(), 1);
    assert_eq!(network.nodes().len(), 9);
    assert_eq!(network.connection_count(), 3 * 5 + 5);

    // Connections are swept input-major, then hidden -> output
    let chromosome = network.gen_chromosome();
    assert_eq!(chromosome.genes()[0].from, "input1");
    assert_eq!(chromosome.genes()[0].to, "hidden1");
    assert_eq!(chromosome.genes()[5].from, "input2");
    assert_eq!(chromosome.genes()[15].from, "hidden1");
    assert_eq!(chromosome.genes()[15].to, "output");

    for connection in network.connections() {
        assert!((-1.5..=1.5).contains(&connection.weight));
    }
}

#[test]
fn test_output_within_activation_range() {
    let mut network = create_test_network(2);
    feed(&mut network);

    let output = network.get_output("output").unwrap();
    assert!(output > 0.0 && output < 1.0, "output {output} out of range");
}

#[test]
fn test_evaluation_is_deterministic() {
    let mut network = create_test_network(3);

    feed(&mut network);
    let first = network.get_output("output").unwrap();
    for _ in 0..10 {
        feed(&mut network);
        assert_eq!(network.get_output("output").unwrap(), first);
    }
}

#[test]
fn test_hand_computed_forward_pass() {
    let params = NetworkParams {
        threshold: 0.0,
        steepness: 1.0,
        ..NetworkParams::default()
    };
    let mut network = Network::new(params).unwrap();
    network.create_input_node("a").unwrap();
    network.create_input_node("b").unwrap();
    network.create_node("h").unwrap();
    network.create_output_node("out").unwrap();
    network.create_connection_with_weight("a", "h", 2.0).unwrap();
    network.create_connection_with_weight("b", "h", -1.0).unwrap();
    network.create_connection_with_weight("h", "out", 0.5).unwrap();

    network.set_inputs(&[1.0, 1.0]).unwrap();
    network.evaluate();

    let sigmoid = |x: f32| 1.0 / (1.0 + (-x).exp());
    let hidden = sigmoid(2.0 - 1.0);
    let expected = sigmoid(hidden * 0.5);
    let output = network.get_output("out").unwrap();
    assert!((output - expected).abs() < 1e-6);
    assert_eq!(network.outputs(), vec![output]);
}

#[test]
fn test_reset_zeroes_values() {
    let mut network = create_test_network(4);
    feed(&mut network);
    assert!(network.get_output("output").unwrap() > 0.0);

    network.reset();
    assert!(network.nodes().iter().all(|node| node.value() == 0.0));
}

#[test]
fn test_duplicate_node_rejected() {
    let mut network = Network::new(NetworkParams::default()).unwrap();
    network.create_input_node("input1").unwrap();

    let result = network.create_output_node("input1");
    assert!(matches!(result, Err(EvoError::DuplicateNode { name }) if name == "input1"));
}

#[test]
fn test_invalid_node_names_rejected() {
    let mut network = Network::new(NetworkParams::default()).unwrap();
    for name in ["", "a,b", "has space", "line\nbreak"] {
        assert!(matches!(
            network.create_node(name),
            Err(EvoError::InvalidNodeName { .. })
        ));
    }
}

#[test]
fn test_unknown_node_in_connection() {
    let mut network = Network::new(NetworkParams::default()).unwrap();
    network.create_input_node("input1").unwrap();

    let result = network.create_connection_with_weight("input1", "ghost", 1.0);
    assert!(matches!(result, Err(EvoError::UnknownNode { name }) if name == "ghost"));
    assert_eq!(network.connection_count(), 0);
}

#[test]
fn test_wrong_node_kind() {
    let mut network = create_test_network(5);

    assert!(matches!(
        network.set_value("hidden1", 1.0),
        Err(EvoError::WrongNodeKind {
            expected: NodeRole::Input,
            found: NodeRole::Hidden,
            ..
        })
    ));
    assert!(matches!(
        network.get_output("input1"),
        Err(EvoError::WrongNodeKind {
            expected: NodeRole::Output,
            found: NodeRole::Input,
            ..
        })
    ));
    // Inputs never receive connections
    assert!(matches!(
        network.create_connection_with_weight("hidden1", "input2", 1.0),
        Err(EvoError::WrongNodeKind { .. })
    ));
}

#[test]
fn test_cycles_rejected() {
    let mut network = Network::new(NetworkParams::default()).unwrap();
    network.create_node("a").unwrap();
    network.create_node("b").unwrap();
    network.create_node("c").unwrap();
    network.create_connection_with_weight("a", "b", 1.0).unwrap();
    network.create_connection_with_weight("b", "c", 1.0).unwrap();

    assert!(matches!(
        network.create_connection_with_weight("c", "a", 1.0),
        Err(EvoError::Cycle { .. })
    ));
    assert!(matches!(
        network.create_connection_with_weight("b", "b", 1.0),
        Err(EvoError::Cycle { .. })
    ));
    // Parallel forward edges are fine
    assert!(network.create_connection_with_weight("a", "c", 1.0).is_ok());
}

#[test]
fn test_set_inputs_arity() {
    let mut network = create_test_network(6);
    assert!(matches!(
        network.set_inputs(&[1.0, 2.0]),
        Err(EvoError::InputArity {
            expected: 3,
            found: 2
        })
    ));
}

#[test]
fn test_chromosome_round_trip_keeps_weights() {
    let mut network = create_test_network(7);
    let before: Vec<f32> = network.connections().iter().map(|c| c.weight).collect();

    let chromosome = network.gen_chromosome();
    network.apply_chromosome(&chromosome).unwrap();

    let after: Vec<f32> = network.connections().iter().map(|c| c.weight).collect();
    assert_eq!(before, after);
}

#[test]
fn test_apply_chromosome_from_other_network() {
    let mut network = create_test_network(8);
    let donor = create_test_network(9);

    network.apply_chromosome(&donor.gen_chromosome()).unwrap();

    for (mine, theirs) in network.connections().iter().zip(donor.connections()) {
        assert_eq!(mine.weight, theirs.weight);
    }

    let mut a = network.clone();
    let mut b = donor.clone();
    feed(&mut a);
    feed(&mut b);
    assert_eq!(
        a.get_output("output").unwrap(),
        b.get_output("output").unwrap()
    );
}

#[test]
fn test_topology_mismatch() {
    let mut network = create_test_network(10);
    let before = network.gen_chromosome();

    let mut short = network.gen_chromosome();
    let mut truncated = Chromosome::new();
    for gene in short.genes_mut().iter_mut().take(3) {
        gene.weight = 9.0;
        truncated.add_gene(gene.clone());
    }

    let result = network.apply_chromosome(&truncated);
    assert!(matches!(
        result,
        Err(EvoError::TopologyMismatch {
            genes: 3,
            connections: 20
        })
    ));
    // Nothing was applied
    assert_eq!(network.gen_chromosome(), before);

    let mut padded = network.gen_chromosome();
    padded.add_gene(Gene::new("input1", "output", 1.0));
    assert!(matches!(
        network.apply_chromosome(&padded),
        Err(EvoError::TopologyMismatch { .. })
    ));
}

#[test]
fn test_edge_mismatch() {
    let mut network = create_test_network(11);
    let before = network.gen_chromosome();

    let mut swapped = network.gen_chromosome();
    swapped.genes_mut().swap(0, 19);
    for gene in swapped.genes_mut() {
        gene.weight = 0.0;
    }

    assert!(matches!(
        network.apply_chromosome(&swapped),
        Err(EvoError::EdgeMismatch { index: 0, .. })
    ));
    assert_eq!(network.gen_chromosome(), before);
}

#[test]
fn test_invalid_params_rejected() {
    let params = NetworkParams {
        weight_min: 2.0,
        weight_max: 1.0,
        ..NetworkParams::default()
    };
    assert!(matches!(
        Network::new(params),
        Err(EvoError::InvalidConfig(_))
    ));
}

#[test]
fn test_seeded_construction_is_reproducible() {
    let a = create_test_network(42);
    let b = create_test_network(42);
    assert_eq!(a.gen_chromosome(), b.gen_chromosome());
}
