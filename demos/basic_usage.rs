//! Build a small DAG, inspect it, cluster it and lay it out.

use std::collections::HashSet;

use dagkit::*;

fn main() -> DagResult<()> {
    // A build pipeline: sources feed objects, objects feed two binaries
    let mut builder = DagBuilder::with_options(DagOptions::safe());
    builder
        .edge("lexer.rs", "lexer.o")
        .edge("parser.rs", "parser.o")
        .edge("lexer.o", "compiler")
        .edge("parser.o", "compiler")
        .edge("lexer.o", "formatter")
        .edge("parser.o", "formatter");
    let mut dag: Dag<&str> = builder.build()?;

    let size = dag.size();
    println!(
        "Graph has {} nodes, {} edges, depth {} and width {}",
        size.nodes, size.edges, size.depth, size.width
    );
    println!("Build order: {:?}", dag.sorted());

    // The safe strategy refuses edges that would close a cycle
    if let Err(err) = dag.connect("compiler", "lexer.rs") {
        println!("Rejected: {}", err);
    }

    // Everything within two hops of a source file
    let options = BreadthFirstOptions {
        depth: Some(2),
        ..Default::default()
    };
    for (node, distance) in BreadthFirst::new(&dag, "lexer.rs", options) {
        println!("  {} at distance {}", node, distance);
    }

    // Objects and binaries with identical neighbourhoods
    let subset: HashSet<&str> = dag.nodes().into_iter().collect();
    let classes = equivalent_nodes(&dag, &subset);
    for class in classes.classes() {
        println!("Equivalent: {:?}", class);
    }

    // Community detection with a fixed seed
    let groups = leiden(
        &dag,
        &UnitWeight,
        LeidenOptions {
            seed: Some(7),
            ..Default::default()
        },
    )?;
    println!("Leiden found {} communities", groups.len());

    // Lay the graph out in depth layers and reduce crossings
    let mut layers: OrderedMultipartite<&str> = OrderedMultipartite::new();
    for node in dag.sorted() {
        let order = dag
            .parents_of(&node)
            .iter()
            .filter_map(|p| layers.order_of(p))
            .map(|o| o + 1)
            .max()
            .unwrap_or(0);
        layers.set(node, order);
    }
    let before = count_crossings(&layers, &dag);
    let planarization = planarize_directed_multipartite(&layers, &dag, &PlanarizationParams::default());
    planarization.apply(&mut layers);
    println!(
        "Crossings: {} before, {} after {} rounds",
        before,
        count_crossings(&layers, &dag),
        planarization.rounds
    );

    Ok(())
}
