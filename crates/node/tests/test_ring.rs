//! Ring scenarios over the real actor runtime: joins, convergence,
//! routed reads and writes, and failover, paced by manual ticks.
use std::time::Duration;

use chordal_core::dht::between;
use chordal_core::dht::Did;
use chordal_core::message::FetchValueReport;
use chordal_core::message::Message;
use chordal_node::actor;
use chordal_node::config::NodeConfig;
use chordal_node::hub::Signal;
use chordal_node::hub::Switchboard;
use chordal_node::NodeHandle;
use tokio::time::sleep;
use tokio::time::timeout;

async fn stabilize(nodes: &[&NodeHandle], rounds: usize) {
    for _ in 0..rounds {
        for node in nodes {
            node.tick().unwrap();
        }
        sleep(Duration::from_millis(30)).await;
    }
    sleep(Duration::from_millis(100)).await;
}

async fn lookup(hub: &Switchboard, at: &NodeHandle, key: Did) -> FetchValueReport {
    let (client, reports) = hub.client().unwrap();
    at.lookup(key, client).unwrap();
    let signal = timeout(Duration::from_secs(2), reports.recv())
        .await
        .expect("lookup timed out")
        .expect("client mailbox closed");
    match signal {
        Signal::Packet(pkt) => match pkt.data {
            Message::FetchValueReport(report) => report,
            other => panic!("expected FetchValueReport, got {:?}", other),
        },
        other => panic!("expected a packet, got {:?}", other),
    }
}

#[tokio::test]
async fn test_singleton_store_and_lookup() {
    let hub = Switchboard::new();
    let bootstrap = actor::spawn(&hub, "bootstrap", &NodeConfig::manual()).unwrap();

    let key = Did::digest("key1");
    bootstrap.store(key, "value1").unwrap();
    sleep(Duration::from_millis(50)).await;

    let report = lookup(&hub, &bootstrap, key).await;
    assert_eq!(report.key, key);
    assert_eq!(report.value.as_deref(), Some("value1"));
    assert!(report.found());

    let missing = lookup(&hub, &bootstrap, Did::digest("key4")).await;
    assert!(!missing.found());
}

#[tokio::test]
async fn test_two_node_ring_becomes_mutual() {
    let hub = Switchboard::new();
    let cfg = NodeConfig::manual();
    let bootstrap = actor::spawn(&hub, "bootstrap", &cfg).unwrap();
    let node42 = actor::spawn(&hub, "node42", &cfg).unwrap();

    node42.join(bootstrap.addr()).unwrap();
    sleep(Duration::from_millis(50)).await;
    stabilize(&[&bootstrap, &node42], 3).await;

    let b = bootstrap.inspect().await.unwrap();
    let j = node42.inspect().await.unwrap();
    assert_eq!(b.successor().did, j.me.did);
    assert_eq!(j.successor().did, b.me.did);
    assert_eq!(b.predecessor.map(|p| p.did), Some(j.me.did));
    assert_eq!(j.predecessor.map(|p| p.did), Some(b.me.did));
}

#[tokio::test]
async fn test_four_node_ring_serves_all_keys() {
    let hub = Switchboard::new();
    let cfg = NodeConfig::manual();
    let bootstrap = actor::spawn(&hub, "bootstrap", &cfg).unwrap();
    let node42 = actor::spawn(&hub, "node42", &cfg).unwrap();
    let node100 = actor::spawn(&hub, "node100", &cfg).unwrap();
    let node200 = actor::spawn(&hub, "node200", &cfg).unwrap();
    let nodes = [&bootstrap, &node42, &node100, &node200];

    for node in &nodes[1..] {
        node.join(bootstrap.addr()).unwrap();
        sleep(Duration::from_millis(30)).await;
    }
    stabilize(&nodes, 10).await;

    // every node's successor owns it as predecessor
    for node in &nodes {
        let view = node.inspect().await.unwrap();
        let succ = nodes
            .iter()
            .find(|n| n.me().did == view.successor().did)
            .expect("successor must be a ring member");
        let succ_view = succ.inspect().await.unwrap();
        assert_eq!(succ_view.predecessor.map(|p| p.did), Some(view.me.did));
    }

    bootstrap.store(Did::digest("key1"), "v1").unwrap();
    node42.store(Did::digest("key2"), "v2").unwrap();
    node100.store(Did::digest("key3"), "v3").unwrap();
    sleep(Duration::from_millis(100)).await;

    for (name, value) in [("key1", "v1"), ("key2", "v2"), ("key3", "v3")] {
        let report = lookup(&hub, &node42, Did::digest(name)).await;
        assert_eq!(report.value.as_deref(), Some(value), "lookup of {}", name);
    }
    assert!(!lookup(&hub, &node42, Did::digest("key4")).await.found());

    // each value lives at exactly one node, the one whose arc covers it
    for name in ["key1", "key2", "key3"] {
        let key = Did::digest(name);
        let mut holders = vec![];
        for node in &nodes {
            let view = node.inspect().await.unwrap();
            if view.storage.iter().any(|(k, _)| *k == key) {
                holders.push(view);
            }
        }
        assert_eq!(holders.len(), 1, "{} must live at exactly one node", name);
        let owner = &holders[0];
        let pred = owner.predecessor.expect("converged node has a predecessor");
        assert!(between(pred.did, key, owner.me.did));
    }
}

#[tokio::test]
async fn test_successor_failure_failover() {
    let hub = Switchboard::new();
    let cfg = NodeConfig::manual();
    let bootstrap = actor::spawn(&hub, "bootstrap", &cfg).unwrap();
    let node42 = actor::spawn(&hub, "node42", &cfg).unwrap();
    let node100 = actor::spawn(&hub, "node100", &cfg).unwrap();
    let node200 = actor::spawn(&hub, "node200", &cfg).unwrap();
    let nodes = [&bootstrap, &node42, &node100, &node200];

    for node in &nodes[1..] {
        node.join(bootstrap.addr()).unwrap();
        sleep(Duration::from_millis(30)).await;
    }
    stabilize(&nodes, 10).await;

    let view = node42.inspect().await.unwrap();
    let victim = view.successor();
    let backup = view.successors[1];
    let victim_handle = nodes
        .iter()
        .find(|n| n.me().did == victim.did)
        .expect("successor must be a ring member");

    // a key owned by the backup outlives the victim
    let key = backup.did;
    node42.store(key, "survivor").unwrap();
    sleep(Duration::from_millis(100)).await;

    victim_handle.stop();
    node42.tick().unwrap();
    sleep(Duration::from_millis(100)).await;

    let after = node42.inspect().await.unwrap();
    assert_eq!(after.successor().did, backup.did);
    assert!(!after.successors.iter().any(|n| n.did == victim.did));

    let report = lookup(&hub, &node42, key).await;
    assert_eq!(report.value.as_deref(), Some("survivor"));
}
