//! The static graph of lossless type widenings.
//!
//! An edge `a -> b` means every value stored as `a` can be stored as `b`
//! without loss. The reconciler only ever applies transitions listed here.

use once_cell::sync::Lazy;
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;

use super::{ColumnType, TypeGroup};

/// Directed widening graph over canonical types.
pub type SafeTypeChanges = DiGraphMap<ColumnType, ()>;

static SAFE_TYPE_CHANGES: Lazy<SafeTypeChanges> = Lazy::new(build_graph);

fn build_graph() -> SafeTypeChanges {
    let mut graph = SafeTypeChanges::new();
    for ty in ColumnType::ALL {
        graph.add_node(ty);
    }

    let text = TypeGroup::Text.members();

    for (from, to) in widen_within(TypeGroup::Int) {
        graph.add_edge(from, to, ());
    }
    for from in TypeGroup::Int.members() {
        for to in TypeGroup::SpecialInt.members().iter().chain(text) {
            graph.add_edge(*from, *to, ());
        }
    }

    for (from, to) in widen_within(TypeGroup::SpecialInt) {
        graph.add_edge(from, to, ());
    }
    for from in TypeGroup::SpecialInt.members() {
        for to in text {
            graph.add_edge(*from, *to, ());
        }
    }

    for (from, to) in widen_within(TypeGroup::Text) {
        graph.add_edge(from, to, ());
    }

    for to in &text[1..] {
        graph.add_edge(ColumnType::Json, *to, ());
    }

    // date and time both widen into the full timestamp types; neither widens
    // into the other.
    for from in [ColumnType::Date, ColumnType::Time] {
        graph.add_edge(from, ColumnType::Datetime, ());
        graph.add_edge(from, ColumnType::Datetimetz, ());
    }
    graph.add_edge(ColumnType::Datetime, ColumnType::Datetimetz, ());
    for from in TypeGroup::Date.members() {
        for to in text {
            graph.add_edge(*from, *to, ());
        }
    }

    graph
}

/// Every (narrower, wider) pair within a group.
fn widen_within(group: TypeGroup) -> Vec<(ColumnType, ColumnType)> {
    let members = group.members();
    let mut pairs = Vec::new();
    for (i, from) in members.iter().enumerate() {
        for to in &members[i + 1..] {
            pairs.push((*from, *to));
        }
    }
    pairs
}

/// The process-wide widening graph.
pub fn safe_type_changes() -> &'static SafeTypeChanges {
    &SAFE_TYPE_CHANGES
}

/// Whether `from -> to` is a listed lossless widening.
pub fn is_safe_change(from: ColumnType, to: ColumnType) -> bool {
    SAFE_TYPE_CHANGES.contains_edge(from, to)
}

/// Types `from` may safely widen into.
pub fn safe_targets(from: ColumnType) -> Vec<ColumnType> {
    let mut targets: Vec<ColumnType> = SAFE_TYPE_CHANGES
        .neighbors_directed(from, Direction::Outgoing)
        .collect();
    targets.sort();
    targets
}
