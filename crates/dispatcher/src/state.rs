use crate::aggregator::ResultAggregator;
use crate::pending::PendingRequests;
use crate::stats::RunStats;
use crate::transport::Rank;
use wordfreq_chunker::ChunkProducer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    Active,

    /// Sent the no-work signal; never addressed again
    Retired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerSlot {
    pub rank: Rank,
    pub status: SlotStatus,
}

/// Everything the control loop mutates, owned by the loop
#[derive(Debug)]
pub struct DispatcherState {
    pub producer: ChunkProducer,
    pub aggregator: ResultAggregator,
    pub pending: PendingRequests,
    pub slots: Vec<WorkerSlot>,
    pub stats: RunStats,
}

impl DispatcherState {
    pub fn new(producer: ChunkProducer, workers: usize) -> Self {
        let aggregator = ResultAggregator::new(producer.files().len());
        let slots = (1..=workers)
            .map(|rank| WorkerSlot {
                rank,
                status: SlotStatus::Active,
            })
            .collect();

        Self {
            producer,
            aggregator,
            pending: PendingRequests::new(),
            slots,
            stats: RunStats::new(workers),
        }
    }

    /// Ranks still taking work, in slot order
    pub fn active_ranks(&self) -> Vec<Rank> {
        self.slots
            .iter()
            .filter(|slot| slot.status == SlotStatus::Active)
            .map(|slot| slot.rank)
            .collect()
    }

    pub fn all_retired(&self) -> bool {
        self.slots
            .iter()
            .all(|slot| slot.status == SlotStatus::Retired)
    }

    pub fn retire(&mut self, rank: Rank) {
        if let Some(slot) = self.slot_mut(rank) {
            slot.status = SlotStatus::Retired;
        }
    }

    pub fn record_chunk(&mut self, rank: Rank, bytes: usize) {
        let slot = rank.checked_sub(1);
        if let Some(count) = slot.and_then(|i| self.stats.chunks_per_slot.get_mut(i)) {
            *count += 1;
        }
        self.stats.chunks_dispatched += 1;
        self.stats.bytes_dispatched += bytes as u64;
    }

    fn slot_mut(&mut self, rank: Rank) -> Option<&mut WorkerSlot> {
        self.slots.iter_mut().find(|slot| slot.rank == rank)
    }
}
