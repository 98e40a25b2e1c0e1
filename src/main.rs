use std::path::PathBuf;
use std::process::ExitCode;

use tracing::{error, info};

use pipeline_history::config::HistoryConfig;
use pipeline_history::graph::{Compartment, Graph, GraphError, Node, Point};
use pipeline_history::journal::{self, HistoryJournal, JournalChange};
use pipeline_history::transaction::{CommandHistory, Transaction};

struct Args {
    config: Option<PathBuf>,
    max_history: Option<usize>,
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args { config: None, max_history: None };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-c" | "--config" => {
                if i + 1 < args.len() {
                    parsed.config = Some(PathBuf::from(&args[i + 1]));
                    i += 2;
                } else {
                    eprintln!("Error: --config requires an argument");
                    std::process::exit(1);
                }
            }
            "-m" | "--max-history" => match args.get(i + 1).map(|v| v.parse::<usize>()) {
                Some(Ok(n)) => {
                    parsed.max_history = Some(n);
                    i += 2;
                }
                _ => {
                    eprintln!("Error: --max-history requires a non-negative number");
                    std::process::exit(1);
                }
            },
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            arg => {
                eprintln!("Unknown option: {}", arg);
                std::process::exit(1);
            }
        }
    }

    parsed
}

fn print_help() {
    eprintln!("pipeline-history - Replay a scripted editing session against the history journal");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    pipeline-history [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("    -c, --config <FILE>      Read history settings from a TOML file");
    eprintln!("    -m, --max-history <N>    Override the snapshot limit (0 disables the journal)");
    eprintln!("    -h, --help               Print this help message");
}

fn print_timeline(journal: &dyn HistoryJournal) {
    let current = journal.current_snapshot().map(|s| s.id());
    for entry in journal.snapshots() {
        let marker = if Some(entry.id()) == current { ">" } else { " " };
        println!(
            "{} {:>4} {} {:<20} {}",
            marker,
            entry.id(),
            entry.created().format("%H:%M:%S"),
            entry.name(),
            entry.description()
        );
    }
}

fn run(config: &HistoryConfig) -> Result<(), GraphError> {
    let mut graph = Graph::new();
    let mut journal = journal::from_config(config);
    let mut commands = CommandHistory::new(config.max_command_history);
    journal.subscribe(Box::new(|change: &JournalChange| info!(?change, "journal changed")));

    journal.snapshot_before_add_compartment(&graph, "Analysis");
    let analysis = graph.add_compartment(Compartment::new("Analysis"))?;

    let nodes = vec![
        Node::new("Read images", "io", analysis).with_output("images", "image"),
        Node::new("Threshold", "filter", analysis)
            .with_input("input", "image")
            .with_output("mask", "mask"),
    ];
    journal.snapshot_before_add_nodes(&graph, &nodes, Some(analysis));
    let mut ids = Vec::new();
    for node in nodes.iter() {
        ids.push(graph.insert_node(node.clone(), analysis)?);
    }
    commands.record(Transaction::add_nodes(nodes));

    let source = graph.node(ids[0]).map(|n| n.output("images"));
    let target = graph.node(ids[1]).map(|n| n.input("input"));
    if let (Some(source), Some(target)) = (source, target) {
        journal.snapshot_before_connect(&graph, &source, &target, Some(analysis));
        graph.connect(source.clone(), target.clone(), true)?;
        commands.record(Transaction::connect(source, target));
    }

    journal.snapshot_before_move_nodes(&graph, &ids, Some(analysis));
    let layout = Transaction::move_nodes(&graph, "Align nodes");
    for (i, id) in ids.iter().enumerate() {
        graph.set_placement(*id, analysis, "default", Point::new(0, 100 * i as i32))?;
    }
    commands.record(layout);

    println!("Timeline after editing:");
    print_timeline(&*journal);

    journal.undo(&mut graph, Some(analysis));
    journal.undo(&mut graph, Some(analysis));
    println!();
    println!(
        "Timeline after two undo steps ({} nodes, {} edges):",
        graph.node_count(),
        graph.edge_count()
    );
    print_timeline(&*journal);

    journal.redo(&mut graph, Some(analysis));
    println!();
    println!("Timeline after redo ({} nodes, {} edges):", graph.node_count(), graph.edge_count());
    print_timeline(&*journal);

    // Unwind the command history on a copy of the restored graph
    let mut scratch = graph.snapshot_copy();
    while let Some(txn) = commands.peek_undo() {
        let label = txn.label();
        if !commands.undo(&mut scratch)? {
            break;
        }
        println!("undid '{}', {} nodes left", label, scratch.node_count());
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let args = parse_args();
    let mut config = HistoryConfig::load_or_default(args.config.as_deref());
    if let Some(max) = args.max_history {
        config.max_history_size = max;
    }
    info!(
        max_history_size = config.max_history_size,
        max_command_history = config.max_command_history,
        "pipeline-history started"
    );

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "session failed");
            ExitCode::FAILURE
        }
    }
}
