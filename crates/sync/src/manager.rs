//! The block request manager.

use crate::config::SyncConfig;
use crate::pending::{PendingBlock, RequestState};
use crate::pool::PendingPool;
use crate::traits::{Consensus, Dispatcher};
use lattice_chain::ChainStore;
use lattice_messages::{DataRequest, InventoryRequest};
use lattice_types::{compute_tx_root, Block, BlockHeader, ChannelId, Hash, PeerId};
use parking_lot::{Mutex, RwLock};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::{BinaryHeap, VecDeque};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Everything the manager's lock guards: the pending indexes and the
/// inventory rate-limit timestamp.
struct SyncState {
    pool: PendingPool,
    last_inventory_request: Option<Instant>,
}

/// A point-in-time snapshot of the manager's workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncStatus {
    /// Blocks currently tracked for download.
    pub pending_blocks: usize,
    /// Distinct missing parents with bodies parked under them.
    pub orphan_parents: usize,
    /// Bodies waiting for a missing parent.
    pub orphan_blocks: usize,
    /// Blocks with a known header awaiting their body.
    pub tracked_headers: usize,
}

/// Drives catch-up of missing blocks from peers.
///
/// Ingest handlers ([`add_hash`], [`add_header`], [`add_block`]) are called
/// by the peer dispatcher from any thread; a 1 Hz worker runs the scheduling
/// pass. [`tick`] is public so simulations and tests can drive the scheduler
/// deterministically with synthetic instants.
///
/// [`add_hash`]: RequestManager::add_hash
/// [`add_header`]: RequestManager::add_header
/// [`add_block`]: RequestManager::add_block
/// [`tick`]: RequestManager::tick
pub struct RequestManager {
    config: SyncConfig,
    store: Arc<dyn ChainStore>,
    consensus: Arc<dyn Consensus>,
    dispatcher: Arc<dyn Dispatcher>,
    state: RwLock<SyncState>,
    rng: Mutex<ChaCha8Rng>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    worker: Mutex<Option<JoinHandle<()>>>,
    span: tracing::Span,
}

impl RequestManager {
    /// Create a new request manager around its collaborators.
    pub fn new(
        config: SyncConfig,
        store: Arc<dyn ChainStore>,
        consensus: Arc<dyn Consensus>,
        dispatcher: Arc<dyn Dispatcher>,
    ) -> Self {
        let span = if config.log_self_id {
            tracing::info_span!("request_manager", id = %consensus.id())
        } else {
            tracing::info_span!("request_manager")
        };
        let rng = match config.rng_seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Self {
            config,
            store,
            consensus,
            dispatcher,
            state: RwLock::new(SyncState {
                pool: PendingPool::new(),
                last_inventory_request: None,
            }),
            rng: Mutex::new(rng),
            shutdown_tx,
            shutdown_rx,
            worker: Mutex::new(None),
            span,
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Lifecycle
    // ═══════════════════════════════════════════════════════════════════

    /// Resume interrupted work from the chain store, then spawn the
    /// scheduler worker. Requires a tokio runtime.
    pub fn start(self: Arc<Self>) {
        self.resume_pending_blocks();

        let manager = Arc::clone(&self);
        let shutdown = self.shutdown_rx.clone();
        let handle = tokio::spawn(async move { manager.main_loop(shutdown).await });
        *self.worker.lock() = Some(handle);
    }

    /// Signal the worker to stop after its current pass.
    pub fn stop(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Wait for the worker to observe the stop signal and exit.
    pub async fn wait(&self) {
        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    async fn main_loop(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.config.tick_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        let _enter = self.span.enter();
                        debug!("scheduler stopped");
                        return;
                    }
                }
                _ = ticker.tick() => self.tick(Instant::now()),
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Scheduler
    // ═══════════════════════════════════════════════════════════════════

    /// Run one scheduling pass at `now`: maybe broadcast an inventory
    /// request, then spend the tick's request quota on body fetches (known
    /// headers first, lowest height first) and hash fetches (first-seen
    /// order).
    pub fn tick(&self, now: Instant) {
        let _enter = self.span.enter();
        let mut state = self.state.write();

        self.maybe_request_inventory(&mut state, now);
        let quota = self.config.request_quota_per_second;
        let quota = self.download_from_header(&mut state, quota, now);
        self.download_from_hash(&mut state, quota, now);
    }

    fn maybe_request_inventory(&self, state: &mut SyncState, now: Instant) {
        let has_pending = !state.pool.is_empty() || state.pool.orphan_parent_count() > 0;
        let (min_passed, max_passed) = match state.last_inventory_request {
            Some(last) => {
                let elapsed = now.saturating_duration_since(last);
                (
                    elapsed >= self.config.min_inventory_interval,
                    elapsed >= self.config.max_inventory_interval,
                )
            }
            None => (true, true),
        };
        if !(max_passed || (has_pending && min_passed)) {
            return;
        }

        if has_pending && state.pool.len() > 1 {
            info!(
                pending_hashes = state.pool.len(),
                orphan_blocks = state.pool.orphan_block_count(),
                tip = %self.consensus.tip(true).hash(),
                "sync progress"
            );
        }

        state.last_inventory_request = Some(now);
        let request = self.build_inventory_request();
        debug!(
            channel = ?request.channel_id,
            locator_len = request.locator_len(),
            "sending inventory request"
        );
        self.dispatcher.get_inventory(&[], request);
    }

    /// Build the exponentially spaced locator from the consensus tip down to
    /// the last finalized block, most recent first.
    fn build_inventory_request(&self) -> InventoryRequest {
        let tip = self.consensus.tip(true);
        let lfb = self.consensus.last_finalized_block();
        let tip_height = tip.height();

        let mut starts = Vec::new();
        let mut step: u64 = 1;
        let mut height = tip_height;
        while height > lfb.height() {
            for block in self.store.find_blocks_by_height(height) {
                starts.push(block.hash().hex());
            }
            if tip_height - height >= 10 {
                step = step.saturating_mul(2);
            }
            match height.checked_sub(step) {
                Some(next) => height = next,
                None => break,
            }
        }
        starts.push(lfb.hash().hex());

        InventoryRequest::new(ChannelId::Block, starts)
    }

    /// Body fetches for blocks with a known header, lowest height first.
    ///
    /// The heap is drained through a scratch heap that is swapped in at the
    /// end of the pass. Expired entries lose their header and fall back to
    /// hash-driven fetching; peer-less entries stay scheduled. Quota
    /// exhaustion stops sends, not the drain.
    fn download_from_header(&self, state: &mut SyncState, mut quota: usize, now: Instant) -> usize {
        let mut scratch = BinaryHeap::new();
        while let Some(entry) = state.pool.pop_header_entry() {
            let Some(pb) = state.pool.get_mut(&entry.hash) else {
                continue;
            };
            if pb.has_expired(now, self.config.expiration) {
                debug!(block = %entry.hash, "header fetch expired, reverting to hash fetch");
                pb.clear_header();
                continue;
            }
            if !pb.peers.is_empty()
                && quota > 0
                && (pb.status == RequestState::WantBody
                    || (pb.status == RequestState::AwaitingBody
                        && pb.has_timed_out(now, self.config.request_timeout)))
            {
                self.send_data_request(pb, now);
                pb.status = RequestState::AwaitingBody;
                quota -= 1;
            }
            scratch.push(entry);
        }
        state.pool.replace_header_heap(scratch);
        quota
    }

    /// Full-block fetches in first-seen order, for blocks without a header.
    fn download_from_hash(&self, state: &mut SyncState, mut quota: usize, now: Instant) {
        let mut expired = Vec::new();
        for hash in state.pool.insertion_order() {
            let Some(pb) = state.pool.get_mut(&hash) else {
                continue;
            };
            if pb.has_expired(now, self.config.expiration) {
                expired.push(hash);
                continue;
            }
            if pb.header.is_some() || pb.body.is_some() {
                continue;
            }
            if pb.peers.is_empty() || quota == 0 {
                continue;
            }
            if pb.status == RequestState::WantData
                || (pb.status == RequestState::AwaitingData
                    && pb.has_timed_out(now, self.config.request_timeout))
            {
                self.send_data_request(pb, now);
                pb.status = RequestState::AwaitingData;
                quota -= 1;
            }
        }

        for hash in expired {
            debug!(block = %hash, "removing expired block");
            state.pool.remove(&hash);
        }
    }

    /// Send a single-entry data request to a uniformly random peer from the
    /// block's peer set.
    fn send_data_request(&self, pb: &mut PendingBlock, now: Instant) {
        let peer = {
            let mut rng = self.rng.lock();
            pb.peers.choose(&mut *rng).cloned()
        };
        let Some(peer) = peer else { return };

        let request = DataRequest::single(ChannelId::Block, &pb.hash());
        debug!(block = %pb.hash(), peer = %peer, "sending data request");
        self.dispatcher.get_data(&[peer], request);
        pb.touch(now);
    }

    // ═══════════════════════════════════════════════════════════════════
    // Ingest
    // ═══════════════════════════════════════════════════════════════════

    /// Record that `peer_ids` advertise `hash`. A no-op for blocks already
    /// in the chain store; otherwise the hash is tracked and the peer set
    /// unioned.
    pub fn add_hash(&self, hash: Hash, peer_ids: &[PeerId]) {
        let _enter = self.span.enter();
        let mut state = self.state.write();
        self.add_hash_locked(&mut state, hash, peer_ids, Instant::now());
    }

    fn add_hash_locked(
        &self,
        state: &mut SyncState,
        hash: Hash,
        peer_ids: &[PeerId],
        now: Instant,
    ) {
        if self.store.find_block(&hash).is_ok() {
            return;
        }
        let pb = state.pool.get_or_insert(hash, now);
        if pb.body.is_some() {
            return;
        }
        pb.add_peers(peer_ids);
    }

    /// Attach a received header, scheduling the block for a height-ordered
    /// body fetch.
    pub fn add_header(&self, header: BlockHeader) {
        let _enter = self.span.enter();
        let mut state = self.state.write();
        let hash = header.hash();

        if self.store.find_block(&hash).is_ok() {
            debug!(block = %hash, "header for an already admitted block");
            return;
        }
        self.add_hash_locked(&mut state, hash, &[], Instant::now());

        let mut schedule_height = None;
        if let Some(pb) = state.pool.get_mut(&hash) {
            if pb.body.is_none() && pb.header.is_none() {
                schedule_height = Some(header.height);
            }
            pb.status = RequestState::WantBody;
            pb.header = Some(header);
        }
        // A duplicate header leaves the existing heap entry in place.
        if let Some(height) = schedule_height {
            state.pool.push_header_entry(height, hash);
        }
    }

    /// Attach a received body. If an attached header disagrees with the
    /// body's transaction root the body is discarded. A body whose parent is
    /// admitted and executed triggers promotion of the whole ready subtree;
    /// otherwise the body is parked under its missing parent.
    pub fn add_block(&self, block: Block) {
        let _enter = self.span.enter();
        let mut state = self.state.write();
        let now = Instant::now();
        let hash = block.hash();

        let pb = state.pool.get_or_insert(hash, now);
        if let Some(header) = &pb.header {
            if compute_tx_root(&block.transactions) != header.tx_root {
                info!(block = %hash, "body transaction root does not match header, discarding");
                return;
            }
        }
        pb.set_body(block.clone());
        state.pool.purge_header_entry(&hash);

        let parent = block.parent();
        match self.store.find_block(&parent) {
            Ok(parent_block) if !parent_block.status.is_pending() => {
                self.promote_subtree(&mut state, block);
            }
            _ => {
                state.pool.park_orphan(parent, block);
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Promotion
    // ═══════════════════════════════════════════════════════════════════

    /// Admit `start` and every buffered descendant, BFS level by level,
    /// passing each admitted block down to consensus.
    fn promote_subtree(&self, state: &mut SyncState, start: Block) {
        let mut queue = VecDeque::from([start]);
        while let Some(block) = queue.pop_front() {
            let hash = block.hash();

            if let Some(children) = state.pool.take_orphans(&hash) {
                queue.extend(children);
            }
            state.pool.remove(&hash);

            debug!(block = %hash, height = block.height(), "admitting block");
            if let Err(err) = self.store.add_block(&block) {
                warn!(block = %hash, error = %err, "chain store rejected block");
                continue;
            }
            self.dispatcher.passdown_block(&block);
        }
    }

    /// Sweep every buffered body whose parent is admitted and executed, and
    /// promote it. The embedding node calls this after consensus finishes
    /// executing a block, releasing bodies parked behind it.
    pub fn promote_ready_blocks(&self) {
        let _enter = self.span.enter();
        let mut state = self.state.write();

        for block in state.pool.blocks_with_body() {
            if !state.pool.contains(&block.hash()) {
                continue; // drained by an earlier subtree
            }
            if let Ok(parent) = self.store.find_block(&block.parent()) {
                if !parent.status.is_pending() {
                    self.promote_subtree(&mut state, block);
                }
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Resume
    // ═══════════════════════════════════════════════════════════════════

    /// Walk the chain store from the last finalized block and re-submit
    /// every still-pending body, so sync interrupted by a restart drives
    /// itself back to admission.
    fn resume_pending_blocks(&self) {
        let lfb = self.consensus.last_finalized_block();
        let mut queue = VecDeque::from([lfb]);
        while let Some(entry) = queue.pop_front() {
            if entry.status.is_pending() {
                self.add_block(entry.block.clone());
            }
            for child_hash in &entry.children {
                let child = self
                    .store
                    .find_block(child_hash)
                    .expect("chain store lost a linked child block");
                queue.push_back(child);
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Introspection
    // ═══════════════════════════════════════════════════════════════════

    /// Snapshot of the current workload.
    pub fn status(&self) -> SyncStatus {
        let state = self.state.read();
        SyncStatus {
            pending_blocks: state.pool.len(),
            orphan_parents: state.pool.orphan_parent_count(),
            orphan_blocks: state.pool.orphan_block_count(),
            tracked_headers: state.pool.header_len(),
        }
    }

    /// Whether `hash` is currently tracked for download.
    pub fn is_tracking(&self, hash: &Hash) -> bool {
        self.state.read().pool.contains(hash)
    }

    /// The request state of a tracked block.
    pub fn request_state(&self, hash: &Hash) -> Option<RequestState> {
        self.state.read().pool.get(hash).map(PendingBlock::status)
    }

    /// Peers known to advertise a tracked block.
    pub fn peers_for(&self, hash: &Hash) -> Vec<PeerId> {
        self.state
            .read()
            .pool
            .get(hash)
            .map(|pb| pb.peers().to_vec())
            .unwrap_or_default()
    }
}
