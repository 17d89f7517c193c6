//! Search execution: run a filter over every segment and feed the survivors to
//! a collector or a distance-ranked top-K selection.

pub mod collector;
pub mod comparator;

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::filter::Filter;
use crate::reader::IndexReader;

pub use self::collector::{Collector, DistanceCollector};
pub use self::comparator::DistanceComparator;

/// A matching document and its distance to the query center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceHit {
    /// Index-wide document ID.
    pub doc_id: u64,
    /// Great-circle distance in kilometers.
    pub distance_km: f64,
}

/// Drives filters, collectors and comparators over an index.
#[derive(Debug, Clone, Copy)]
pub struct Searcher<'a> {
    reader: &'a dyn IndexReader,
}

impl<'a> Searcher<'a> {
    /// Create a searcher over an index.
    pub fn new(reader: &'a dyn IndexReader) -> Self {
        Searcher { reader }
    }

    /// Feed every document accepted by `filter` to `collector`, segment by segment
    /// in increasing id order. Returns the number of documents collected.
    pub fn search(&self, filter: &dyn Filter, collector: &mut dyn Collector) -> Result<u64> {
        let mut total_hits = 0;
        for ctx in self.reader.segments() {
            let docs = filter.doc_set(ctx.reader)?;
            if docs.is_empty() {
                continue;
            }

            collector.set_next_segment(&ctx)?;
            for local_doc in docs.iter() {
                collector.collect(local_doc)?;
                total_hits += 1;
            }
        }
        Ok(total_hits)
    }

    /// Index-wide ids of every document accepted by `filter`.
    pub fn matching_docs(&self, filter: &dyn Filter) -> Result<Vec<u64>> {
        let mut docs = Vec::new();
        for ctx in self.reader.segments() {
            docs.extend(filter.doc_set(ctx.reader)?.iter().map(|doc| ctx.global_doc(doc)));
        }
        Ok(docs)
    }

    /// The `k` documents accepted by `filter` closest to the comparator's center,
    /// nearest first. Ties keep the document seen first.
    pub fn top_by_distance(
        &self,
        filter: &dyn Filter,
        comparator: &mut DistanceComparator,
        k: usize,
    ) -> Result<Vec<DistanceHit>> {
        let k = k.min(comparator.num_slots());
        // Max-heap: the root is the slot to evict next.
        let mut queue: BinaryHeap<SlotEntry> = BinaryHeap::with_capacity(k);

        if k > 0 {
            for ctx in self.reader.segments() {
                let docs = filter.doc_set(ctx.reader)?;
                if docs.is_empty() {
                    continue;
                }

                comparator.set_next_segment(&ctx)?;
                for local_doc in docs.iter() {
                    let doc_id = ctx.global_doc(local_doc);
                    let slot = if queue.len() < k {
                        queue.len()
                    } else if comparator.compare_bottom(local_doc) == Ordering::Greater {
                        match queue.pop() {
                            Some(worst) => worst.slot,
                            None => continue,
                        }
                    } else {
                        continue;
                    };

                    comparator.copy(slot, local_doc);
                    queue.push(SlotEntry {
                        distance_km: comparator.value(slot),
                        doc_id,
                        slot,
                    });
                    if queue.len() == k {
                        if let Some(worst) = queue.peek() {
                            comparator.set_bottom(worst.slot);
                        }
                    }
                }
            }
        }

        Ok(queue
            .into_sorted_vec()
            .into_iter()
            .map(|entry| DistanceHit {
                doc_id: entry.doc_id,
                distance_km: entry.distance_km,
            })
            .collect())
    }
}

/// A filled comparator slot, ordered farthest-last with later documents after
/// earlier ones at equal distance.
#[derive(Debug, Clone, Copy)]
struct SlotEntry {
    distance_km: f64,
    doc_id: u64,
    slot: usize,
}

impl Ord for SlotEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance_km
            .total_cmp(&other.distance_km)
            .then_with(|| self.doc_id.cmp(&other.doc_id))
    }
}

impl PartialOrd for SlotEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SlotEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SlotEntry {}
