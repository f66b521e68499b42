//! Conversion funnel analysis.
//!
//! Step counts are distinct sessions, not raw events. A session "reaches" a
//! step if it has any event of that type in-window, regardless of causal
//! order; direct-buy flows can therefore push a step's conversion rate above
//! 100%, which is reported as-is as a tracking-quality signal.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use engine_core::{Event, EventType};

use crate::metrics::round2;

/// Canonical storefront funnel.
pub const DEFAULT_STEPS: [EventType; 4] = [
    EventType::ProductView,
    EventType::AddToCart,
    EventType::BeginCheckout,
    EventType::Purchase,
];

/// One funnel step's results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelStep {
    pub step: EventType,
    /// Distinct sessions that reached this step in-window.
    pub count: u64,
    /// Relative to the step before it; omitted for the first step. Not
    /// clamped: values above 100 indicate sessions entering mid-funnel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversion_rate: Option<f64>,
    /// Mean seconds between a session's entry into this step and the next,
    /// over sessions that reached both. Zero for the last step.
    pub average_time_seconds: f64,
    /// Loss rate into the next step: `100 - conversionRate[next]`. Zero for
    /// the last step.
    pub drop_off_rate: f64,
}

/// Loss between one consecutive step pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropOffPoint {
    pub from_step: EventType,
    pub to_step: EventType,
    /// `count[i] - count[i+1]`; negative when sessions enter mid-funnel.
    pub drop_off_count: i64,
    pub drop_off_rate: f64,
}

/// Full funnel analysis output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelAnalysis {
    pub steps: Vec<FunnelStep>,
    pub drop_off_points: Vec<DropOffPoint>,
    pub total_conversion_rate: f64,
}

/// Funnel analyzer over a configurable, totally ordered step sequence.
#[derive(Debug, Clone)]
pub struct FunnelAnalyzer {
    steps: Vec<EventType>,
}

impl Default for FunnelAnalyzer {
    fn default() -> Self {
        Self {
            steps: DEFAULT_STEPS.to_vec(),
        }
    }
}

impl FunnelAnalyzer {
    /// Builds an analyzer over a custom step order. The order must be total
    /// for the rate math to be meaningful; steps must be distinct and at
    /// least two.
    pub fn new(steps: Vec<EventType>) -> engine_core::Result<Self> {
        if steps.len() < 2 {
            return Err(engine_core::Error::validation(
                "a funnel needs at least two steps",
            ));
        }
        let distinct: HashSet<_> = steps.iter().collect();
        if distinct.len() != steps.len() {
            return Err(engine_core::Error::validation("funnel steps must be distinct"));
        }
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[EventType] {
        &self.steps
    }

    /// Computes the funnel over an event window.
    pub fn analyze(&self, events: &[Event]) -> FunnelAnalysis {
        // Per step: the set of sessions that reached it, and each session's
        // entry (earliest) timestamp.
        let mut entries: Vec<HashMap<i64, i64>> = vec![HashMap::new(); self.steps.len()];
        for e in events {
            if let Some(i) = self.steps.iter().position(|s| *s == e.event_type) {
                entries[i]
                    .entry(e.session_hash)
                    .and_modify(|first| *first = (*first).min(e.timestamp))
                    .or_insert(e.timestamp);
            }
        }

        let counts: Vec<u64> = entries.iter().map(|m| m.len() as u64).collect();

        // conversionRate[i] = count[i] / count[i-1] * 100, unclamped.
        let conversion: Vec<Option<f64>> = (0..counts.len())
            .map(|i| {
                if i == 0 {
                    None
                } else if counts[i - 1] == 0 {
                    Some(0.0)
                } else {
                    Some(round2(counts[i] as f64 / counts[i - 1] as f64 * 100.0))
                }
            })
            .collect();

        let steps: Vec<FunnelStep> = self
            .steps
            .iter()
            .enumerate()
            .map(|(i, &step)| {
                let next_conversion = conversion.get(i + 1).copied().flatten();
                FunnelStep {
                    step,
                    count: counts[i],
                    conversion_rate: conversion[i],
                    average_time_seconds: self.mean_step_time(&entries, i),
                    drop_off_rate: next_conversion.map(|c| round2(100.0 - c)).unwrap_or(0.0),
                }
            })
            .collect();

        let drop_off_points: Vec<DropOffPoint> = (0..self.steps.len() - 1)
            .map(|i| DropOffPoint {
                from_step: self.steps[i],
                to_step: self.steps[i + 1],
                drop_off_count: counts[i] as i64 - counts[i + 1] as i64,
                drop_off_rate: conversion[i + 1].map(|c| round2(100.0 - c)).unwrap_or(0.0),
            })
            .collect();

        let total_conversion_rate = if counts[0] == 0 {
            0.0
        } else {
            round2(counts[counts.len() - 1] as f64 / counts[0] as f64 * 100.0)
        };

        FunnelAnalysis {
            steps,
            drop_off_points,
            total_conversion_rate,
        }
    }

    /// Mean elapsed seconds between entry into step `i` and step `i + 1`,
    /// over sessions present in both.
    fn mean_step_time(&self, entries: &[HashMap<i64, i64>], i: usize) -> f64 {
        let Some(next) = entries.get(i + 1) else {
            return 0.0;
        };

        let mut total = 0i64;
        let mut sessions = 0u64;
        for (session, first) in &entries[i] {
            if let Some(next_first) = next.get(session) {
                total += next_first - first;
                sessions += 1;
            }
        }

        if sessions == 0 {
            0.0
        } else {
            round2(total as f64 / sessions as f64)
        }
    }
}
