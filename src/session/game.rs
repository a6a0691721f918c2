//! The session orchestrator.

use std::future::Future;

use tracing::{debug, info, warn};

use super::report::DropReport;
use crate::arrangement::{
    ArrangementEngine, ArrangementError, ArrangementObserver, DropResult, EngineState, SubscriptionId,
};
use crate::combat::{CombatObserver, CombatResolver, EnemyCatalog, EnemyState, WinOutcome};
use crate::core::{Card, CardId, GameConfig, GameRng, Progress, SessionState};
use crate::drag::{DragController, DragError, DragGesture, DragUpdate};
use crate::error::Result;
use crate::store::SessionStore;
use crate::zones::{Point, SlotGrid};

/// One player's game, backed by a `SessionStore`.
///
/// All mutation goes through `&mut self`, so drops are applied one at a
/// time and a win's settle delay holds off further input until the new
/// cards are dealt.
pub struct GameSession<S: SessionStore> {
    config: GameConfig,
    engine: ArrangementEngine,
    drag: DragController,
    combat: CombatResolver,
    progress: Progress,
    card_count: usize,
    number_range: i64,
    rng: GameRng,
    store: S,
}

impl<S: SessionStore> GameSession<S> {
    /// Load the stored session, or start a new one if there is none.
    ///
    /// A stored arrangement that breaks the occupancy invariant, or whose
    /// difficulty is outside the configured limits, is replaced by a fresh
    /// deal; progression is kept. A missing enemy is initialized for the
    /// stored level. Load and save failures are logged, never fatal.
    pub async fn open(config: GameConfig, catalog: EnemyCatalog, store: S) -> Result<Self> {
        config.validate()?;

        let mut rng = GameRng::from_seed_or_entropy(config.seed).for_context("deal");
        let mut combat = CombatResolver::new(catalog);

        let stored = match store.load().await {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "could not load saved session, starting a new one");
                None
            }
        };
        let is_new = stored.is_none();

        let (card_count, number_range, mut progress, cards) = match stored {
            Some(state) => match config.limits.check(state.card_count, state.number_range) {
                Ok(()) => (
                    state.card_count,
                    state.number_range,
                    state.progress(),
                    Some(state.cards.into_iter().collect::<Vec<_>>()),
                ),
                Err(e) => {
                    warn!(error = %e, "saved difficulty out of range, dealing with defaults");
                    (config.card_count, config.number_range, state.progress(), None)
                }
            },
            None => (config.card_count, config.number_range, Progress::default(), None),
        };

        let restored = cards.and_then(|cards| match build_engine(&config, cards, card_count) {
            Ok(engine) => Some(engine),
            Err(e) => {
                warn!(error = %e, "saved arrangement is corrupt, dealing new cards");
                None
            }
        });
        let dealt = restored.is_none();
        let engine = match restored {
            Some(engine) => engine,
            None => build_engine(&config, deal(&mut rng, card_count, number_range), card_count)?,
        };

        let spawned = combat.initialize_enemy(&mut progress);

        let drag = DragController::new(SlotGrid::new(card_count, &config.geometry), config.snap_threshold);
        let session = Self {
            config,
            engine,
            drag,
            combat,
            progress,
            card_count,
            number_range,
            rng,
            store,
        };

        if is_new {
            info!(card_count, number_range, "starting new session");
        } else {
            info!(level = session.progress.level, coins = session.progress.coins, "session restored");
        }
        if is_new || dealt || spawned {
            persist(&session.store, &session.snapshot()).await;
        }

        Ok(session)
    }

    // === Queries ===

    /// Session configuration.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The arrangement engine.
    #[must_use]
    pub fn engine(&self) -> &ArrangementEngine {
        &self.engine
    }

    /// The drag controller.
    #[must_use]
    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    /// The combat resolver.
    #[must_use]
    pub fn combat(&self) -> &CombatResolver {
        &self.combat
    }

    /// Coins, level and enemy.
    #[must_use]
    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    #[must_use]
    pub fn coins(&self) -> u64 {
        self.progress.coins
    }

    #[must_use]
    pub fn level(&self) -> u32 {
        self.progress.level
    }

    #[must_use]
    pub fn enemy(&self) -> Option<&EnemyState> {
        self.progress.enemy.as_ref()
    }

    /// Cards per arrangement.
    #[must_use]
    pub fn card_count(&self) -> usize {
        self.card_count
    }

    /// Values are drawn from `[0, number_range]`.
    #[must_use]
    pub fn number_range(&self) -> i64 {
        self.number_range
    }

    /// The backing store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The aggregate as it would be saved now (without a timestamp).
    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        SessionState::from_parts(
            self.engine.cards().iter().cloned(),
            self.card_count,
            self.number_range,
            self.progress.clone(),
        )
    }

    // === Observers ===

    /// Observe swaps, moves and wins.
    pub fn subscribe_arrangement(&mut self, observer: impl ArrangementObserver + 'static) -> SubscriptionId {
        self.engine.subscribe(observer)
    }

    pub fn unsubscribe_arrangement(&mut self, id: SubscriptionId) -> bool {
        self.engine.unsubscribe(id)
    }

    /// Observe enemy damage, defeats and spawns.
    pub fn subscribe_combat(&mut self, observer: impl CombatObserver + 'static) -> SubscriptionId {
        self.combat.subscribe(observer)
    }

    pub fn unsubscribe_combat(&mut self, id: SubscriptionId) -> bool {
        self.combat.unsubscribe(id)
    }

    // === Drag input ===

    /// Pointer down on a card.
    pub fn begin_drag(&mut self, card_id: &CardId, pointer: Point) -> std::result::Result<&DragGesture, DragError> {
        self.drag.begin_drag(&self.engine, card_id, pointer)
    }

    /// Pointer moved while dragging.
    pub fn update_drag(&mut self, card_id: &CardId, pointer: Point) -> std::result::Result<DragUpdate, DragError> {
        self.drag.update_drag(&self.engine, card_id, pointer)
    }

    /// Pointer released: resolve the drop, then settle a win if there was one.
    pub async fn end_drag(&mut self, card_id: &CardId, pointer: Point) -> Result<DropReport> {
        let drop = self.drag.end_drag(&mut self.engine, card_id, pointer)?;
        self.after_drop(drop).await
    }

    /// Gesture interrupted: release at the last known pointer position.
    pub async fn cancel_drag(&mut self, card_id: &CardId) -> Result<DropReport> {
        let drop = self.drag.cancel_drag(&mut self.engine, card_id)?;
        self.after_drop(drop).await
    }

    /// Drop a card onto a slot directly, without a pointer gesture.
    pub async fn resolve_drop(&mut self, card_id: &CardId, target_slot: usize) -> Result<DropReport> {
        let drop = self.engine.resolve_drop(card_id, target_slot);
        self.after_drop(drop).await
    }

    /// Re-run the win check outside a drop (e.g. for a deal that came out
    /// sorted). Settles the win if this call is the one that entered `Won`.
    pub async fn check_win(&mut self) -> Result<Option<WinOutcome>> {
        let was_won = self.engine.state() == EngineState::Won;
        if !self.engine.check_winning_condition() || was_won {
            return Ok(None);
        }
        let values = self.engine.values_in_slot_order();
        let (outcome, _) = self.settle_win(&values).await?;
        Ok(Some(outcome))
    }

    async fn after_drop(&mut self, drop: DropResult) -> Result<DropReport> {
        let mut saved = true;
        if drop.changed_arrangement() {
            saved = persist(&self.store, &self.snapshot()).await;
        }

        let won = drop.won().map(|values| values.to_vec());
        let win = match won {
            Some(values) => {
                let (outcome, settled) = self.settle_win(&values).await?;
                saved &= settled;
                Some(outcome)
            }
            None => None,
        };

        Ok(DropReport { drop, win, saved })
    }

    /// Apply combat, save, wait out the settle delay, then deal new cards.
    async fn settle_win(&mut self, values: &[i64]) -> Result<(WinOutcome, bool)> {
        let outcome = self.combat.apply_win(&mut self.progress, values);
        let mut saved = persist(&self.store, &self.snapshot()).await;

        if !self.config.settle_delay.is_zero() {
            tokio::time::sleep(self.config.settle_delay).await;
        }

        self.regenerate()?;
        saved &= persist(&self.store, &self.snapshot()).await;
        Ok((outcome, saved))
    }

    // === Difficulty and lifecycle ===

    /// Deal a new card set with a different difficulty. Progression and the
    /// current enemy are untouched; no damage is dealt.
    ///
    /// Returns whether the new state was saved.
    pub async fn update_difficulty(&mut self, card_count: usize, number_range: i64) -> Result<bool> {
        self.config.limits.check(card_count, number_range)?;

        info!(
            from_count = self.card_count,
            from_range = self.number_range,
            card_count,
            number_range,
            "difficulty changed"
        );
        self.set_difficulty(card_count, number_range)?;
        Ok(persist(&self.store, &self.snapshot()).await)
    }

    /// Start over: forget the stored session, reset progression to level 1
    /// with no coins, and deal. Omitted arguments keep the current difficulty.
    ///
    /// Returns whether the new state was saved.
    pub async fn new_game(&mut self, card_count: Option<usize>, number_range: Option<i64>) -> Result<bool> {
        let card_count = card_count.unwrap_or(self.card_count);
        let number_range = number_range.unwrap_or(self.number_range);
        self.config.limits.check(card_count, number_range)?;

        info!(card_count, number_range, "starting new game");

        let cleared = match self.store.clear().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "could not clear saved session");
                false
            }
        };

        self.progress = Progress::default();
        self.combat.initialize_enemy(&mut self.progress);
        self.set_difficulty(card_count, number_range)?;

        Ok(persist(&self.store, &self.snapshot()).await && cleared)
    }

    /// Add coins. Returns whether the change was saved.
    pub async fn add_coins(&mut self, amount: u64) -> bool {
        self.progress.coins = self.progress.coins.saturating_add(amount);
        debug!(amount, coins = self.progress.coins, "coins added");
        persist(&self.store, &self.snapshot()).await
    }

    /// Set the player level (minimum 1). The current enemy stays on the
    /// field. Returns whether the change was saved.
    pub async fn set_level(&mut self, level: u32) -> bool {
        self.progress.level = level.max(1);
        debug!(level = self.progress.level, "level set");
        persist(&self.store, &self.snapshot()).await
    }

    /// Save now, surfacing any store error.
    ///
    /// The returned future owns its snapshot and only borrows the store, so
    /// it can be sent to another task.
    pub fn save(&self) -> impl Future<Output = Result<()>> + Send + '_ {
        let state = self.snapshot();
        let store = &self.store;
        async move {
            store.save(&state).await?;
            Ok(())
        }
    }

    fn set_difficulty(&mut self, card_count: usize, number_range: i64) -> Result<()> {
        if card_count != self.card_count {
            self.drag
                .set_grid(SlotGrid::new(card_count, &self.config.geometry));
        }
        self.card_count = card_count;
        self.number_range = number_range;
        self.regenerate()
    }

    /// Replace the card set with a fresh deal. Gestures on the old cards are
    /// discarded.
    fn regenerate(&mut self) -> Result<()> {
        let cards = deal(&mut self.rng, self.card_count, self.number_range);
        self.engine.replace_cards(cards, self.card_count)?;
        self.drag.reset();
        info!(
            card_count = self.card_count,
            values = ?self.engine.values_in_slot_order().as_slice(),
            "cards dealt"
        );
        Ok(())
    }

}

impl<S: SessionStore> std::fmt::Debug for GameSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("card_count", &self.card_count)
            .field("number_range", &self.number_range)
            .field("progress", &self.progress)
            .field("engine", &self.engine.state())
            .finish_non_exhaustive()
    }
}

/// Best-effort save. Failures are logged; in-memory state stays put.
///
/// Takes the store and a snapshot rather than the session, so session
/// futures never hold `&GameSession` across the write.
async fn persist<S: SessionStore>(store: &S, state: &SessionState) -> bool {
    match store.save(state).await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "failed to save session, keeping in-memory state");
            false
        }
    }
}

/// Draw `card_count` values and deal them into slots `0..card_count`.
fn deal(rng: &mut GameRng, card_count: usize, number_range: i64) -> Vec<Card> {
    Card::deal(&rng.draw_values(card_count, number_range))
}

fn build_engine(
    config: &GameConfig,
    cards: Vec<Card>,
    card_count: usize,
) -> std::result::Result<ArrangementEngine, ArrangementError> {
    if cards.len() != card_count {
        return Err(ArrangementError::CardCountMismatch {
            expected: card_count,
            found: cards.len(),
        });
    }
    Ok(ArrangementEngine::new(cards, config.sort_order)?.with_descending_rule(config.descending_rule))
}
