//! XOR phenome walkthrough.
//!
//! Builds the classic hand-wired XOR network (bias plus two inputs, an AND
//! detector, an OR detector, and an output computing OR-and-not-AND), then
//! drives it through both activation engines and scores it with the
//! truth-table evaluator.
//!
//! Run with: `cargo run --example xor`

use symbios_phenome::{
    AcyclicDirectedGraph, Activation, BlackBox, CyclicNetwork, DirectedGraph, FeedForwardNetwork,
    PhenomeEvaluator, TruthTableEvaluator, WeightedConnection,
};

fn xor_connections() -> Vec<WeightedConnection> {
    const AND_NODE: i32 = 10;
    const OR_NODE: i32 = 17;
    vec![
        WeightedConnection::new(0, AND_NODE, -5.0),
        WeightedConnection::new(1, AND_NODE, 5.0),
        WeightedConnection::new(2, AND_NODE, 5.0),
        WeightedConnection::new(0, OR_NODE, 5.0),
        WeightedConnection::new(1, OR_NODE, 5.0),
        WeightedConnection::new(2, OR_NODE, 5.0),
        WeightedConnection::new(0, 3, -5.0),
        WeightedConnection::new(AND_NODE, 3, -5.0),
        WeightedConnection::new(OR_NODE, 3, 5.0),
    ]
}

fn main() {
    println!("XOR Phenome Demo");
    println!("================\n");

    let connections = xor_connections();

    // The same genome compiles into both runtime forms.
    let cyclic_graph = DirectedGraph::compile(&connections, 3, 1).expect("valid genome");
    let acyclic_graph = AcyclicDirectedGraph::compile(&cyclic_graph).expect("acyclic genome");

    println!(
        "Compiled: {} nodes, {} connections, {} layers",
        acyclic_graph.total_node_count(),
        acyclic_graph.connection_count(),
        acyclic_graph.graph_depth()
    );

    let mut feedforward = FeedForwardNetwork::new(acyclic_graph, Activation::Tanh);
    let mut cyclic = CyclicNetwork::new(cyclic_graph, Activation::Tanh, 2);

    println!("\n a  b | feedforward |   cyclic   | expected");
    println!("------+-------------+------------+---------");
    let cases = [
        ([1.0, -1.0, -1.0], -1.0),
        ([1.0, -1.0, 1.0], 1.0),
        ([1.0, 1.0, -1.0], 1.0),
        ([1.0, 1.0, 1.0], -1.0),
    ];
    for (inputs, expected) in cases {
        feedforward.set_inputs(&inputs);
        feedforward.activate();

        cyclic.reset_state();
        cyclic.set_inputs(&inputs);
        cyclic.activate();

        let ff = feedforward.output(0);
        let cy = cyclic.output(0);
        let status = if (ff > 0.0) == (expected > 0.0) {
            "✓"
        } else {
            "✗"
        };
        println!(
            "{:+2.0} {:+2.0} |   {:+.4}   |  {:+.4}   |   {:+.0}  {}",
            inputs[1], inputs[2], ff, cy, expected, status
        );
    }

    let fitness = TruthTableEvaluator::xor().evaluate(&mut feedforward);
    println!("\nTruth-table fitness: {:.4} (bonus included)", fitness);
}
