//! Snapshots of a node's ring state, for drivers and tests.
use chordal_core::dht::Did;
use chordal_core::dht::NodeRef;
use chordal_core::dht::NodeRing;

/// A point-in-time copy of everything a node knows about the ring and
/// its local store. Taken inside the actor, so it is always consistent.
#[derive(Debug, Clone)]
pub struct NodeInspect {
    /// The inspected node.
    pub me: NodeRef,
    /// Its predecessor, if known.
    pub predecessor: Option<NodeRef>,
    /// Its successor list, nearest first.
    pub successors: Vec<NodeRef>,
    /// Finger table compressed into (entry, first slot, last slot) runs.
    pub finger_table: Vec<(Option<Did>, usize, usize)>,
    /// The locally stored key-value pairs.
    pub storage: Vec<(Did, String)>,
}

impl NodeInspect {
    /// Snapshot `ring`.
    pub fn of(ring: &NodeRing) -> Self {
        let finger = ring.finger().list().iter().map(|slot| slot.map(|n| n.did));
        Self {
            me: ring.me(),
            predecessor: ring.predecessor(),
            successors: ring.successor_list().to_vec(),
            finger_table: compress_iter(finger),
            storage: ring.store().entries(),
        }
    }

    /// The node's successor; itself when alone.
    pub fn successor(&self) -> NodeRef {
        *self.successors.first().unwrap_or(&self.me)
    }
}

/// Collapse an iterator into runs of equal values with their index
/// ranges. 160 finger slots usually hold a handful of distinct nodes,
/// so this is what you want to print.
fn compress_iter<T>(iter: impl Iterator<Item = T>) -> Vec<(T, usize, usize)>
where T: PartialEq {
    let mut result = vec![];
    let mut start = 0;
    let mut count = 0;
    let mut prev: Option<T> = None;

    for (i, x) in iter.enumerate() {
        match prev {
            Some(p) if p == x => {
                count += 1;
            }
            _ => {
                if let Some(p) = prev {
                    result.push((p, start, start + count - 1));
                }
                start = i;
                count = 1;
            }
        }
        prev = Some(x);
    }

    if let Some(p) = prev {
        result.push((p, start, start + count - 1));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compress_iter() {
        let v = vec!['a', 'a', 'f', 'a', 'b', 'b', 'c', 'c', 'c', 'd', 'e'];
        assert_eq!(
            vec![
                ('a', 0, 1),
                ('f', 2, 2),
                ('a', 3, 3),
                ('b', 4, 5),
                ('c', 6, 8),
                ('d', 9, 9),
                ('e', 10, 10),
            ],
            compress_iter(v.into_iter())
        );
    }
}
