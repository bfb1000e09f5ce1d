//! Turns user actions into charts.
//!
//! One [`Trainer`] is shared by every request. It owns the history fetcher,
//! the sampler and the session; the page only ever sees [`View`]s.

use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;
use market_data_ingestor::{
    history::HistoryFetcher,
    models::{pair::TradingPair, timeframe::TimeFrame},
    providers::DataProvider,
};
use rand::{RngCore, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    error::TrainerError,
    scorer::{self, Direction},
    segment::SegmentSampler,
    session::{ActiveSegment, SessionState},
    view::{MODE_TRAINING, View},
};

/// Everything the page can ask for.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum UserAction {
    ChangePair { pair: TradingPair },
    ChangeTimeframe { timeframe: TimeFrame },
    Reset,
    Guess { direction: Direction },
}

/// Pair and timeframe the next refresh will load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub pair: TradingPair,
    pub timeframe: TimeFrame,
}

/// What the dropdowns offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalog {
    pub pairs: Vec<TradingPair>,
    pub timeframes: Vec<TimeFrame>,
    pub default_pair: TradingPair,
    pub default_timeframe: TimeFrame,
}

impl Catalog {
    fn default_selection(&self) -> Selection {
        Selection {
            pair: self.default_pair.clone(),
            timeframe: self.default_timeframe,
        }
    }
}

pub struct Trainer<P> {
    fetcher: HistoryFetcher<P>,
    sampler: SegmentSampler,
    catalog: Catalog,
    history_limit: usize,
    session: SessionState,
    selection: ArcSwap<Selection>,
    rng: Mutex<StdRng>,
}

impl<P: DataProvider> Trainer<P> {
    pub fn new(
        fetcher: HistoryFetcher<P>,
        sampler: SegmentSampler,
        catalog: Catalog,
        history_limit: usize,
        rng: StdRng,
    ) -> Self {
        let selection = ArcSwap::from_pointee(catalog.default_selection());
        Self {
            fetcher,
            sampler,
            catalog,
            history_limit,
            session: SessionState::new(),
            selection,
            rng: Mutex::new(rng),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn sampler(&self) -> &SegmentSampler {
        &self.sampler
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn selection(&self) -> Arc<Selection> {
        self.selection.load_full()
    }

    /// Applies `action` and always produces something to draw. Failures are
    /// logged and rendered as an empty chart with an error line.
    pub async fn handle(&self, action: UserAction) -> View {
        match self.apply(action).await {
            Ok(view) => view,
            Err(err) => {
                warn!(error = %err, "action failed");
                self.error_view(&err)
            }
        }
    }

    pub async fn apply(&self, action: UserAction) -> Result<View, TrainerError> {
        match action {
            UserAction::ChangePair { pair } => {
                if !self.catalog.pairs.contains(&pair) {
                    return Err(TrainerError::UnsupportedPair { pair });
                }
                let selection = self.update_selection(|current| Selection {
                    pair: pair.clone(),
                    timeframe: current.timeframe,
                });
                self.refresh(&selection).await
            }
            UserAction::ChangeTimeframe { timeframe } => {
                if !self.catalog.timeframes.contains(&timeframe) {
                    return Err(TrainerError::UnsupportedTimeframe { timeframe });
                }
                let selection = self.update_selection(|current| Selection {
                    pair: current.pair.clone(),
                    timeframe,
                });
                self.refresh(&selection).await
            }
            UserAction::Reset => {
                let selection = self.selection();
                self.refresh(&selection).await
            }
            UserAction::Guess { direction } => self.guess(direction),
        }
    }

    /// Loads fresh history for `selection` and replaces the active segment.
    /// When the history is too short the session is cleared.
    pub async fn refresh(&self, selection: &Selection) -> Result<View, TrainerError> {
        let mut rng = self.fork_rng();
        let series = self
            .fetcher
            .fetch(
                &selection.pair,
                selection.timeframe,
                self.history_limit,
                &mut rng,
            )
            .await;

        let segment = match self.sampler.sample(&series.bars, &mut rng) {
            Ok(segment) => segment,
            Err(err) => {
                self.session.clear();
                return Err(err.into());
            }
        };

        info!(
            pair = %series.pair,
            timeframe = %series.timeframe,
            source = ?series.source,
            start = segment.start,
            "new chart"
        );

        let active = ActiveSegment {
            pair: series.pair,
            timeframe: series.timeframe,
            source: series.source,
            segment,
        };
        let view = View::training(&active, View::refreshed_mode(self.sampler.training_size()));
        self.session.replace(active);
        Ok(view)
    }

    /// Scores `direction` against the held-back future of the active segment.
    pub fn guess(&self, direction: Direction) -> Result<View, TrainerError> {
        let active = self
            .session
            .current()
            .ok_or(TrainerError::NoActiveSegment)?;
        let verdict = scorer::score(&active.segment.future, direction)?;

        info!(
            pair = %active.pair,
            guessed = %verdict.guessed,
            actual = %verdict.actual,
            correct = verdict.correct,
            "guess scored"
        );
        Ok(View::revealed(&active, verdict))
    }

    /// The training half of the active chart, without touching anything.
    pub fn current_view(&self) -> View {
        match self.session.current() {
            Some(active) => View::training(&active, MODE_TRAINING),
            None => self.error_view(&TrainerError::NoActiveSegment),
        }
    }

    fn error_view(&self, err: &TrainerError) -> View {
        let selection = self.selection();
        View::error(selection.pair.clone(), selection.timeframe, err)
    }

    fn update_selection(&self, f: impl Fn(&Selection) -> Selection) -> Selection {
        let previous = self.selection.rcu(|current| f(&**current));
        f(&*previous)
    }

    /// Seeds a request-local generator from the shared one so no lock is held
    /// across an await.
    fn fork_rng(&self) -> StdRng {
        let mut master = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        StdRng::seed_from_u64(master.next_u64())
    }
}
