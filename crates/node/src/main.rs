//! Demo driver: spin up a small ring in-process, store a few values,
//! look them up from another node, then kill a member and look again.
use std::time::Duration;

use chordal_core::dht::Did;
use chordal_core::message::Message;
use chordal_node::actor;
use chordal_node::config::NodeConfig;
use chordal_node::hub::Signal;
use chordal_node::hub::Switchboard;
use chordal_node::logging::init_logging;
use chordal_node::logging::LogLevel;
use chordal_node::NodeHandle;
use clap::Parser;
use tokio::time::sleep;
use tokio::time::timeout;

#[derive(Parser, Debug)]
#[command(name = "chordal", about = "Run a small chordal ring in-process and exercise it")]
struct Args {
    /// Log verbosity; RUST_LOG overrides.
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,

    /// Stabilization period per node, in milliseconds.
    #[arg(long, default_value_t = 500)]
    stabilize_ms: u64,
}

#[tokio::main]
async fn main() -> chordal_core::Result<()> {
    let args = Args::parse();
    init_logging(args.log_level);

    let settle = Duration::from_millis(args.stabilize_ms * 5);
    let cfg = NodeConfig::default().with_interval(Duration::from_millis(args.stabilize_ms));
    let hub = Switchboard::new();

    let bootstrap = actor::spawn(&hub, "bootstrap", &cfg)?;
    let node42 = actor::spawn(&hub, "node42", &cfg)?;
    let node100 = actor::spawn(&hub, "node100", &cfg)?;
    let node200 = actor::spawn(&hub, "node200", &cfg)?;

    node42.join(bootstrap.addr())?;
    node100.join(bootstrap.addr())?;
    node200.join(bootstrap.addr())?;

    println!("ring is stabilizing...");
    sleep(settle).await;

    bootstrap.store(Did::digest("key1"), "value1")?;
    node42.store(Did::digest("key2"), "value2")?;
    node100.store(Did::digest("key3"), "value3")?;
    sleep(Duration::from_millis(args.stabilize_ms)).await;

    let (client, reports) = hub.client()?;
    let keys = ["key1", "key2", "key3", "key4"];

    println!("looking up {} keys at node42", keys.len());
    for key in keys {
        node42.lookup(Did::digest(key), client)?;
    }
    print_reports(&reports, keys.len()).await;

    println!("stopping node100");
    node100.stop();
    sleep(settle).await;

    println!("looking up again after the failure");
    for key in keys {
        node42.lookup(Did::digest(key), client)?;
    }
    print_reports(&reports, keys.len()).await;

    for node in [&bootstrap, &node42, &node200] {
        print_topology(node).await?;
    }
    Ok(())
}

async fn print_reports(reports: &async_channel::Receiver<Signal>, expected: usize) {
    for _ in 0..expected {
        match timeout(Duration::from_secs(2), reports.recv()).await {
            Ok(Ok(Signal::Packet(pkt))) => {
                if let Message::FetchValueReport(report) = pkt.data {
                    match report.value {
                        Some(value) => println!("  key {:?} -> {}", report.key, value),
                        None => println!("  key {:?} -> not found", report.key),
                    }
                }
            }
            Ok(Ok(other)) => println!("  unexpected signal: {:?}", other),
            Ok(Err(_)) => break,
            Err(_) => {
                println!("  a lookup went unanswered (routed through a dead node?)");
                break;
            }
        }
    }
}

async fn print_topology(node: &NodeHandle) -> chordal_core::Result<()> {
    let view = node.inspect().await?;
    println!("{}", view.me);
    println!("  predecessor: {:?}", view.predecessor);
    println!("  successors:  {:?}", view.successors);
    println!("  stored keys: {}", view.storage.len());
    for (entry, first, last) in view.finger_table {
        if let Some(did) = entry {
            println!("  finger[{:3}..={:3}] -> {:?}", first, last, did);
        }
    }
    Ok(())
}
