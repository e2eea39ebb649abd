use crate::charts::{sentiment_chart, sources_chart, timeline_chart};
use crate::errors::UpstreamError;
use crate::labels::LabelLocale;
use crate::models::{BarChart, ChartKind, ChartWidget, DashboardSnapshot, DateRange, Phase};
use crate::normalize::{RawPayload, normalize_with};
use crate::sentiment::SentimentBreakdown;
use crate::sources::SourceBreakdown;
use crate::upstream::{PayloadSource, RawPayloads};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info};

#[derive(Debug)]
pub enum RefreshOutcome {
    Updated(DashboardSnapshot),
    /// Another refresh was already running; nothing changed.
    Skipped(DashboardSnapshot),
}

#[derive(Debug, Default)]
struct DashboardState {
    phase: Phase,
    range: Option<DateRange>,
    refreshed_at: Option<DateTime<Utc>>,
    charts: BTreeMap<ChartKind, ChartWidget>,
}

impl DashboardState {
    fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            phase: self.phase,
            range: self.range,
            refreshed_at: self.refreshed_at,
            charts: self.charts.clone(),
        }
    }

    fn apply(&mut self, range: DateRange, charts: Vec<(ChartKind, BarChart)>) {
        for (kind, chart) in charts {
            match kind {
                // Sources are rebuilt from scratch each time.
                ChartKind::Sources => {
                    self.charts.insert(kind, ChartWidget { revision: 1, chart });
                }
                ChartKind::Timeline | ChartKind::Sentiment => {
                    let widget = self.charts.entry(kind).or_insert_with(|| ChartWidget {
                        revision: 0,
                        chart: chart.clone(),
                    });
                    widget.revision += 1;
                    widget.chart = chart;
                }
            }
        }
        self.range = Some(range);
        self.refreshed_at = Some(Utc::now());
    }
}

fn lock(state: &Mutex<DashboardState>) -> MutexGuard<'_, DashboardState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Puts the dashboard back to idle if a refresh is dropped mid-fetch.
struct LoadingGuard<'a> {
    state: &'a Mutex<DashboardState>,
    armed: bool,
}

impl LoadingGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            debug!("refresh dropped before completion");
            lock(self.state).phase = Phase::Idle;
        }
    }
}

pub struct Dashboard {
    locale: LabelLocale,
    state: Mutex<DashboardState>,
}

impl Dashboard {
    pub fn new(locale: LabelLocale) -> Self {
        Self {
            locale,
            state: Mutex::new(DashboardState::default()),
        }
    }

    pub fn locale(&self) -> LabelLocale {
        self.locale
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        lock(&self.state).snapshot()
    }

    pub async fn refresh<S>(
        &self,
        source: &S,
        range: DateRange,
    ) -> Result<RefreshOutcome, UpstreamError>
    where
        S: PayloadSource + Sync,
    {
        {
            let mut state = lock(&self.state);
            if state.phase == Phase::Loading {
                debug!("refresh already in flight, skipping");
                return Ok(RefreshOutcome::Skipped(state.snapshot()));
            }
            state.phase = Phase::Loading;
        }
        let loading = LoadingGuard {
            state: &self.state,
            armed: true,
        };

        let built = match source.fetch(&range).await {
            Ok(payloads) => build_charts(&payloads, self.locale),
            Err(err) => Err(err),
        };

        let mut state = lock(&self.state);
        state.phase = Phase::Idle;
        loading.disarm();
        match built {
            Ok(charts) => {
                state.apply(range, charts);
                info!(from = %range.from, to = %range.to, "dashboard refreshed");
                Ok(RefreshOutcome::Updated(state.snapshot()))
            }
            Err(err) => {
                error!("dashboard refresh failed: {err}");
                Err(err)
            }
        }
    }
}

pub fn build_charts(
    payloads: &RawPayloads,
    locale: LabelLocale,
) -> Result<Vec<(ChartKind, BarChart)>, UpstreamError> {
    let sources = parse_json_body("sources", &payloads.sources)?;
    let sentiment = parse_json_body("sentiment", &payloads.sentiment)?;

    let series = normalize_with(RawPayload::Text(&payloads.timeline), locale);

    Ok(vec![
        (ChartKind::Timeline, timeline_chart(&series, locale)),
        (
            ChartKind::Sources,
            sources_chart(&SourceBreakdown::from_payload(&sources), locale),
        ),
        (
            ChartKind::Sentiment,
            sentiment_chart(&SentimentBreakdown::from_payload(&sentiment), locale),
        ),
    ])
}

/// Empty bodies read as `null`.
fn parse_json_body(endpoint: &'static str, body: &str) -> Result<Value, UpstreamError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|source| UpstreamError::Payload { endpoint, source })
}
