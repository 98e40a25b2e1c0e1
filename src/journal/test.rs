use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::config::HistoryConfig;
use crate::graph::{
    Compartment, CompartmentId, Graph, Node, NodeId, SlotDefinition, SlotDirection, SlotRef,
};

fn make_graph() -> (Graph, CompartmentId) {
    let mut graph = Graph::new();
    let compartment = graph.add_compartment(Compartment::new("Analysis")).unwrap();
    (graph, compartment)
}

fn make_node(name: &str, compartment: CompartmentId) -> Node {
    Node::new(name, "filter", compartment)
        .with_input("in", "image")
        .with_output("out", "image")
}

fn add(graph: &mut Graph, name: &str, compartment: CompartmentId) -> NodeId {
    graph.insert_node(make_node(name, compartment), compartment).unwrap()
}

fn ids(entries: &[std::sync::Arc<Snapshot>]) -> Vec<SnapshotId> {
    entries.iter().map(|s| s.id()).collect()
}

fn record(journal: &mut GraphHistoryJournal) -> Rc<RefCell<Vec<JournalChange>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    journal.subscribe(Box::new(move |change: &JournalChange| {
        sink.borrow_mut().push(change.clone())
    }));
    log
}

// === Snapshot tests ===

#[test]
fn test_snapshot_pushes_and_clears_redo() {
    let (mut graph, compartment) = make_graph();
    let mut journal = GraphHistoryJournal::new(10);

    journal.snapshot(&graph, "Add node", "Added node 'A'", Some(compartment), None);
    add(&mut graph, "A", compartment);
    assert!(journal.undo(&mut graph, Some(compartment)));
    assert!(!journal.redo_stack().is_empty());

    journal.snapshot(&graph, "Add node", "Added node 'B'", Some(compartment), None);
    assert!(journal.redo_stack().is_empty());
    let top = journal.undo_stack().last().unwrap();
    assert_eq!(top.description(), "Added node 'B'");
    assert_eq!(top.compartment(), Some(compartment));
}

#[test]
fn test_snapshot_stores_independent_copy() {
    let (mut graph, compartment) = make_graph();
    let mut journal = GraphHistoryJournal::new(10);
    journal.snapshot(&graph, "Add node", "", None, Some("actions/list-add"));
    let before = graph.snapshot_copy();

    add(&mut graph, "A", compartment);
    let entry = journal.undo_stack()[0].clone();
    assert_eq!(**entry.graph(), before);
    assert_eq!(entry.icon(), Some("actions/list-add"));
    assert!(entry.created() <= chrono::Local::now());
}

#[test]
fn test_zero_size_disables_snapshots() {
    let (graph, _) = make_graph();
    let mut journal = GraphHistoryJournal::new(0);
    let log = record(&mut journal);

    journal.snapshot(&graph, "Add node", "", None, None);
    assert!(journal.snapshots().is_empty());
    assert!(log.borrow().is_empty());
}

#[test]
fn test_eviction_keeps_most_recent() {
    let (graph, _) = make_graph();
    let mut journal = GraphHistoryJournal::new(3);
    let mut pushed = Vec::new();

    for i in 0..5 {
        journal.snapshot(&graph, &format!("Edit {}", i), "", None, None);
        pushed.push(journal.undo_stack().last().unwrap().id());
        assert!(journal.undo_stack().len() <= 3);
    }

    assert_eq!(journal.undo_stack().len(), 3);
    assert_eq!(ids(journal.undo_stack()), pushed[2..].to_vec());
}

#[test]
fn test_eviction_resets_current() {
    let (mut graph, _) = make_graph();
    let mut journal = GraphHistoryJournal::new(2);
    let log = record(&mut journal);

    journal.snapshot(&graph, "First", "", None, None);
    let first = journal.undo_stack()[0].id();
    assert!(journal.go_to_snapshot(&mut graph, first, None));
    let before_undo = journal.redo_snapshot().unwrap().id();
    assert!(journal.go_to_snapshot(&mut graph, before_undo, None));
    assert_eq!(ids(journal.undo_stack()), vec![first, before_undo]);
    assert_eq!(journal.current_snapshot().map(|s| s.id()), Some(before_undo));

    journal.snapshot(&graph, "Second", "", None, None);
    assert_eq!(journal.current_snapshot().map(|s| s.id()), Some(before_undo));

    journal.snapshot(&graph, "Third", "", None, None);
    assert!(journal.current_snapshot().is_none());

    let last = log.borrow().last().cloned();
    assert!(matches!(
        last,
        Some(JournalChange::SnapshotAdded { evicted, .. }) if evicted == vec![before_undo]
    ));
}

#[test]
fn test_set_max_size_evicts_oldest() {
    let (graph, _) = make_graph();
    let mut journal = GraphHistoryJournal::new(5);
    for i in 0..4 {
        journal.snapshot(&graph, &format!("Edit {}", i), "", None, None);
    }
    let kept = ids(&journal.undo_stack()[3..]);
    let log = record(&mut journal);

    journal.set_max_size(1);
    assert_eq!(ids(journal.undo_stack()), kept);
    assert!(matches!(
        log.borrow().last(),
        Some(JournalChange::Evicted { snapshots }) if snapshots.len() == 3
    ));
}

// === Navigation tests ===

#[test]
fn test_go_to_fresh_snapshot_creates_before_undo() {
    let (mut graph, compartment) = make_graph();
    let mut journal = GraphHistoryJournal::new(10);
    journal.snapshot(&graph, "Add node", "", None, None);
    let s = journal.undo_stack()[0].id();
    add(&mut graph, "A", compartment);
    let edited = graph.snapshot_copy();

    assert!(journal.go_to_snapshot(&mut graph, s, Some(compartment)));
    assert_eq!(journal.current_snapshot().map(|c| c.id()), Some(s));
    assert!(journal.undo_stack().is_empty());
    assert_eq!(journal.redo_stack().len(), 2);

    // The captured live state is the next redo target
    let before_undo = journal.redo_snapshot().unwrap();
    assert_eq!(before_undo.name(), "Before undo");
    assert_eq!(**before_undo.graph(), edited);
    assert_eq!(ids(&journal.snapshots()), vec![s, before_undo.id()]);
    assert_eq!(graph.node_count(), 0);
}

#[test]
fn test_go_to_current_is_noop() {
    let (mut graph, compartment) = make_graph();
    let mut journal = GraphHistoryJournal::new(10);
    journal.snapshot(&graph, "Add node", "", None, None);
    add(&mut graph, "A", compartment);
    assert!(journal.undo(&mut graph, None));

    let current = journal.current_snapshot().unwrap().id();
    let undo_before = ids(journal.undo_stack());
    let redo_before = ids(journal.redo_stack());
    let graph_before = graph.snapshot_copy();

    assert!(journal.go_to_snapshot(&mut graph, current, None));
    assert_eq!(ids(journal.undo_stack()), undo_before);
    assert_eq!(ids(journal.redo_stack()), redo_before);
    assert_eq!(graph, graph_before);
    assert_eq!(journal.current_snapshot().map(|c| c.id()), Some(current));
}

#[test]
fn test_go_to_unknown_snapshot_fails() {
    let (mut graph, _) = make_graph();
    let mut journal = GraphHistoryJournal::new(10);
    journal.snapshot(&graph, "Add node", "", None, None);

    let mut other = GraphHistoryJournal::new(10);
    other.snapshot(&graph, "Elsewhere", "", None, None);
    let foreign = other.undo_stack()[0].id();

    let log = record(&mut journal);
    assert!(!journal.go_to_snapshot(&mut graph, foreign, None));
    assert_eq!(journal.undo_stack().len(), 1);
    assert!(journal.redo_stack().is_empty());
    assert!(journal.current_snapshot().is_none());
    assert!(log.borrow().is_empty());
}

#[test]
fn test_new_snapshot_drops_current_from_redo() {
    let (mut graph, compartment) = make_graph();
    let mut journal = GraphHistoryJournal::new(10);
    journal.snapshot(&graph, "Add node", "A", None, None);
    add(&mut graph, "A", compartment);
    journal.snapshot(&graph, "Add node", "B", None, None);
    let second = journal.undo_stack()[1].id();
    add(&mut graph, "B", compartment);

    assert!(journal.undo(&mut graph, None));
    assert_eq!(journal.current_snapshot().map(|s| s.id()), Some(second));
    assert_eq!(graph.node_count(), 1);

    add(&mut graph, "C", compartment);
    journal.snapshot(&graph, "Add node", "D", None, None);
    assert!(journal.current_snapshot().is_none());
    assert!(!journal.snapshots().iter().any(|s| s.id() == second));

    let log = record(&mut journal);
    assert!(!journal.go_to_snapshot(&mut graph, second, None));
    assert_eq!(graph.node_count(), 2);
    assert!(log.borrow().is_empty());
}

#[test]
fn test_jump_forward_respects_max_size() {
    let (mut graph, compartment) = make_graph();
    let mut journal = GraphHistoryJournal::new(2);
    journal.snapshot(&graph, "First", "", None, None);
    add(&mut graph, "A", compartment);
    journal.snapshot(&graph, "Second", "", None, None);
    add(&mut graph, "B", compartment);
    let latest = graph.snapshot_copy();
    let first = journal.undo_stack()[0].id();
    let second = journal.undo_stack()[1].id();

    assert!(journal.go_to_snapshot(&mut graph, first, None));
    let before_undo = journal.snapshots().last().unwrap().id();
    let log = record(&mut journal);

    assert!(journal.go_to_snapshot(&mut graph, before_undo, None));
    assert_eq!(ids(journal.undo_stack()), vec![second, before_undo]);
    assert!(journal.redo_stack().is_empty());
    assert_eq!(journal.current_snapshot().map(|s| s.id()), Some(before_undo));
    assert_eq!(graph, latest);
    assert_eq!(
        *log.borrow(),
        vec![
            JournalChange::Evicted { snapshots: vec![first] },
            JournalChange::Navigated { snapshot: before_undo, compartment: None },
        ]
    );
}

#[test]
fn test_linear_undo_redo() {
    let (mut graph, compartment) = make_graph();
    let mut journal = GraphHistoryJournal::new(10);
    add(&mut graph, "A", compartment);
    let g0 = graph.snapshot_copy();

    let b = make_node("B", compartment);
    journal.snapshot_before_add_nodes(&graph, std::slice::from_ref(&b), Some(compartment));
    graph.insert_node(b, compartment).unwrap();
    let g1 = graph.snapshot_copy();

    assert!(journal.undo(&mut graph, Some(compartment)));
    assert_eq!(graph, g0);
    assert!(journal.redo(&mut graph, Some(compartment)));
    assert_eq!(graph, g1);
    assert!(journal.undo(&mut graph, Some(compartment)));
    assert_eq!(graph, g0);
    assert!(journal.redo(&mut graph, Some(compartment)));
    assert_eq!(graph, g1);
}

#[test]
fn test_undo_redo_on_empty_journal() {
    let (mut graph, _) = make_graph();
    let mut journal = GraphHistoryJournal::new(10);
    assert!(!journal.undo(&mut graph, None));
    assert!(!journal.redo(&mut graph, None));
    assert!(journal.undo_snapshot().is_none());
    assert!(journal.redo_snapshot().is_none());
}

#[test]
fn test_random_access_jump_back_and_forward() {
    let (mut graph, compartment) = make_graph();
    let mut journal = GraphHistoryJournal::new(10);
    let mut states = Vec::new();

    for name in ["A", "B", "C"] {
        journal.snapshot(&graph, "Add node", name, None, None);
        states.push(graph.snapshot_copy());
        add(&mut graph, name, compartment);
    }
    let latest = graph.snapshot_copy();
    let entries = ids(journal.undo_stack());

    // Jump two steps back at once
    assert!(journal.go_to_snapshot(&mut graph, entries[1], None));
    assert_eq!(graph, states[1]);
    assert_eq!(ids(journal.undo_stack()), vec![entries[0]]);
    assert_eq!(journal.undo_snapshot().map(|s| s.id()), Some(entries[0]));
    assert_eq!(journal.redo_snapshot().map(|s| s.id()), Some(entries[2]));

    // Timeline order does not change while navigating
    let timeline = ids(&journal.snapshots());
    assert_eq!(&timeline[..3], &entries[..]);
    assert_eq!(timeline.len(), 4);

    // Jump to the state before the first undo
    let before_undo = timeline[3];
    assert!(journal.go_to_snapshot(&mut graph, before_undo, None));
    assert_eq!(graph, latest);
    assert!(journal.redo_stack().is_empty());
    assert_eq!(ids(&journal.snapshots()), timeline);
}

#[test]
fn test_clear() {
    let (mut graph, compartment) = make_graph();
    let mut journal = GraphHistoryJournal::new(10);
    journal.snapshot(&graph, "Add node", "", None, None);
    add(&mut graph, "A", compartment);
    journal.undo(&mut graph, None);
    let log = record(&mut journal);

    journal.clear();
    assert!(journal.snapshots().is_empty());
    assert!(journal.current_snapshot().is_none());
    assert_eq!(*log.borrow(), vec![JournalChange::Cleared]);
}

// === Observer tests ===

#[test]
fn test_observers_notified_after_mutations() {
    let (mut graph, compartment) = make_graph();
    let mut journal = GraphHistoryJournal::new(10);
    let log = record(&mut journal);

    journal.snapshot(&graph, "Add node", "", None, None);
    let s = journal.undo_stack()[0].id();
    add(&mut graph, "A", compartment);
    journal.undo(&mut graph, Some(compartment));

    assert_eq!(
        *log.borrow(),
        vec![
            JournalChange::SnapshotAdded { snapshot: s, evicted: Vec::new() },
            JournalChange::Navigated { snapshot: s, compartment: Some(compartment) },
        ]
    );
}

#[test]
fn test_unsubscribe() {
    let (graph, _) = make_graph();
    let mut journal = GraphHistoryJournal::new(10);
    let log = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&log);
    let id = journal.subscribe(Box::new(move |_: &JournalChange| *sink.borrow_mut() += 1));

    journal.snapshot(&graph, "One", "", None, None);
    assert!(journal.unsubscribe(id));
    assert!(!journal.unsubscribe(id));
    journal.snapshot(&graph, "Two", "", None, None);
    assert_eq!(*log.borrow(), 1);
}

// === Dummy journal tests ===

#[test]
fn test_dummy_journal_is_noop() {
    let (mut graph, compartment) = make_graph();
    let mut journal = DummyHistoryJournal::new();
    let mut real = GraphHistoryJournal::new(10);
    real.snapshot(&graph, "Elsewhere", "", None, None);
    let foreign = real.undo_stack()[0].id();

    journal.snapshot(&graph, "Add node", "", None, None);
    add(&mut graph, "A", compartment);
    assert!(journal.snapshots().is_empty());
    assert!(!journal.undo(&mut graph, None));
    assert!(!journal.redo(&mut graph, None));
    assert!(!journal.go_to_snapshot(&mut graph, foreign, None));
    assert!(journal.current_snapshot().is_none());
    assert_eq!(journal.subscribe(Box::new(|_: &JournalChange| {})), SubscriptionId::NONE);
    assert_eq!(graph.node_count(), 1);
}

#[test]
fn test_from_config() {
    let (mut graph, compartment) = make_graph();
    let disabled = HistoryConfig { max_history_size: 0, ..HistoryConfig::default() };
    let mut journal = from_config(&disabled);
    journal.snapshot(&graph, "Add node", "", None, None);
    assert!(journal.snapshots().is_empty());

    let enabled = HistoryConfig { max_history_size: 2, ..HistoryConfig::default() };
    let mut journal = from_config(&enabled);
    for _ in 0..3 {
        journal.snapshot(&graph, "Add node", "", None, None);
    }
    assert_eq!(journal.snapshots().len(), 2);
    add(&mut graph, "A", compartment);
    assert!(journal.undo(&mut graph, None));
    assert_eq!(graph.node_count(), 0);
}

// === Helper tests ===

#[test]
fn test_snapshot_helpers_describe_edit() {
    let (mut graph, compartment) = make_graph();
    let a = add(&mut graph, "A", compartment);
    let b = add(&mut graph, "B", compartment);
    let mut journal = GraphHistoryJournal::new(20);

    journal.snapshot_before_add_nodes(&graph, &[make_node("C", compartment)], Some(compartment));
    let pasted = [make_node("C", compartment), make_node("D", compartment)];
    journal.snapshot_before_paste_nodes(&graph, &pasted, None);
    journal.snapshot_before_remove_nodes(&graph, &[a, b], Some(compartment));
    journal.snapshot_before_move_nodes(&graph, &[a], Some(compartment));
    let mask = SlotDefinition::new("mask", "image");
    journal.snapshot_before_add_slot(&graph, a, SlotDirection::Input, &mask, None);
    journal.snapshot_before_remove_slot(&graph, &SlotRef::input(a, "in"), None);
    journal.snapshot_before_label_slot(&graph, &SlotRef::output(a, "out"), None);
    journal.snapshot_before_move_slot(&graph, &SlotRef::output(a, "out"), None);
    journal.snapshot_before_edit_slot(&graph, &SlotRef::output(a, "out"), None);
    let (out, input) = (SlotRef::output(a, "out"), SlotRef::input(b, "in"));
    journal.snapshot_before_connect(&graph, &out, &input, None);
    journal.snapshot_before_disconnect(&graph, &out, &input, None);
    journal.snapshot_before_disconnect_all(&graph, &SlotRef::output(a, "out"), None);
    journal.snapshot_before_add_compartment(&graph, "Import");
    journal.snapshot_before_remove_compartment(&graph, compartment);

    let described: Vec<(String, String)> = journal
        .snapshots()
        .iter()
        .map(|s| (s.name().to_string(), s.description().to_string()))
        .collect();
    let expected = vec![
        ("Add node", "Added node 'C'"),
        ("Paste nodes", "Pasted nodes 'C', 'D'"),
        ("Remove nodes", "Removed nodes 'A', 'B'"),
        ("Move nodes", "Moved nodes 'A'"),
        ("Add slot", "Added input slot 'mask' to 'A'"),
        ("Remove slot", "Removed input slot 'in' from 'A'"),
        ("Label slot", "Changed the label of 'A/out'"),
        ("Move slot", "Moved 'A/out'"),
        ("Edit slot", "Edited 'A/out'"),
        ("Connect slots", "Connected 'A/out' to 'B/in'"),
        ("Disconnect slots", "Disconnected 'A/out' from 'B/in'"),
        ("Disconnect all", "Disconnected all edges of 'A/out'"),
        ("Add compartment", "Added compartment 'Import'"),
        ("Remove compartment", "Removed compartment 'Analysis'"),
    ];
    let expected: Vec<(String, String)> = expected
        .into_iter()
        .map(|(n, d)| (n.to_string(), d.to_string()))
        .collect();
    assert_eq!(described, expected);
}
