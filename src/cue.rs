use std::collections::{BTreeMap, VecDeque};
use std::time::{Duration, Instant};

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::feedback::FeedbackPlayer;

/// Coins dropped per threshold crossing
pub const COINS_PER_BATCH: usize = 50;

/// How long a batch stays in the active set
pub const CUE_LIFETIME: Duration = Duration::from_secs(10);

/// Length of the visible drop-and-bounce, after which a coin has faded out
pub const DROP_DURATION: Duration = Duration::from_millis(1200);

const HORIZONTAL_MARGIN: u16 = 3;

/// Spawn rows above the visible area
const SPAWN_ROWS: std::ops::Range<f64> = -8.0..-1.0;

/// (progress, fraction of the way to the floor, opacity)
const DROP_KEYFRAMES: [(f64, f64, f64); 8] = [
    (0.00, 0.000, 1.0),
    (0.30, 1.000, 1.0),
    (0.50, 0.706, 1.0),
    (0.65, 0.926, 1.0),
    (0.75, 0.824, 0.8),
    (0.85, 0.882, 0.6),
    (0.95, 0.853, 0.3),
    (1.00, 0.868, 0.0),
];

/// A single falling coin
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    pub id: u64,
    pub batch: u64,
    /// Column the coin falls down
    pub x: f64,
    /// Starting row, negative (above the screen)
    pub y: f64,
    pub spawned_at: Instant,
}

/// Where a coin is drawn at a given instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CueFrame {
    pub x: f64,
    pub y: f64,
    pub opacity: f64,
}

impl Cue {
    /// Interpolates the drop curve for `now`. `floor` is the row the coin
    /// lands on. Returns None once the coin has faded.
    pub fn frame(&self, now: Instant, floor: f64) -> Option<CueFrame> {
        let age = now.saturating_duration_since(self.spawned_at);
        if age >= DROP_DURATION {
            return None;
        }
        let progress = age.as_secs_f64() / DROP_DURATION.as_secs_f64();

        let (fraction, opacity) = DROP_KEYFRAMES
            .windows(2)
            .find(|w| progress <= w[1].0)
            .map(|w| {
                let (p0, f0, o0) = w[0];
                let (p1, f1, o1) = w[1];
                let t = (progress - p0) / (p1 - p0);
                (f0 + (f1 - f0) * t, o0 + (o1 - o0) * t)
            })
            .unwrap_or((DROP_KEYFRAMES[7].1, 0.0));

        Some(CueFrame {
            x: self.x,
            y: self.y + (floor - self.y) * fraction,
            opacity,
        })
    }
}

#[derive(Debug)]
struct Expiry {
    due: Instant,
    ids: Vec<u64>,
}

/// Spawns coin batches on threshold crossings and retires them after their
/// lifetime.
///
/// Active coins live in an id-keyed arena. Expiries remember ids only, so a
/// reset that clears the arena early turns pending expiries into no-ops.
#[derive(Debug)]
pub struct CueController {
    enabled: bool,
    next_id: u64,
    next_batch: u64,
    active: BTreeMap<u64, Cue>,
    expiries: VecDeque<Expiry>,
    rng: StdRng,
}

impl CueController {
    pub fn new(enabled: bool) -> Self {
        Self::with_rng(enabled, StdRng::from_entropy())
    }

    pub fn with_seed(enabled: bool, seed: u64) -> Self {
        Self::with_rng(enabled, StdRng::seed_from_u64(seed))
    }

    fn with_rng(enabled: bool, rng: StdRng) -> Self {
        Self {
            enabled,
            next_id: 0,
            next_batch: 0,
            active: BTreeMap::new(),
            expiries: VecDeque::new(),
            rng,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Disabling drops every active coin right away; enabling only affects
    /// future crossings.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.clear();
        }
    }

    /// Spawns a batch, plays the audio cue and schedules the batch's expiry.
    /// Returns the number of coins spawned (zero while disabled).
    pub fn on_threshold_crossed(
        &mut self,
        now: Instant,
        viewport_width: u16,
        player: &mut dyn FeedbackPlayer,
    ) -> usize {
        if !self.enabled {
            return 0;
        }

        let batch = self.next_batch;
        self.next_batch += 1;

        let margin = HORIZONTAL_MARGIN.min(viewport_width / 4) as f64;
        let lo = margin;
        let hi = (viewport_width as f64 - margin).max(lo + 1.0);

        let mut ids = Vec::with_capacity(COINS_PER_BATCH);
        for _ in 0..COINS_PER_BATCH {
            let id = self.next_id;
            self.next_id += 1;
            let cue = Cue {
                id,
                batch,
                x: self.rng.gen_range(lo..hi),
                y: self.rng.gen_range(SPAWN_ROWS),
                spawned_at: now,
            };
            self.active.insert(id, cue);
            ids.push(id);
        }

        if let Err(err) = player.play() {
            tracing::debug!(%err, "audio cue unavailable");
        }

        self.expiries.push_back(Expiry {
            due: now + CUE_LIFETIME,
            ids,
        });
        tracing::debug!(batch, active = self.active.len(), "coin batch dropped");

        COINS_PER_BATCH
    }

    /// Fires every expiry due at `now`. Returns how many coins were removed.
    pub fn poll_expiries(&mut self, now: Instant) -> usize {
        let mut removed = 0;
        while let Some(expiry) = self.expiries.front() {
            if expiry.due > now {
                break;
            }
            if let Some(expiry) = self.expiries.pop_front() {
                removed += expiry
                    .ids
                    .iter()
                    .filter(|id| self.active.remove(*id).is_some())
                    .count();
            }
        }
        removed
    }

    pub fn clear(&mut self) {
        self.active.clear();
    }

    pub fn active(&self) -> impl Iterator<Item = &Cue> {
        self.active.values()
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.active.contains_key(&id)
    }

    pub fn pending_expiries(&self) -> usize {
        self.expiries.len()
    }
}
