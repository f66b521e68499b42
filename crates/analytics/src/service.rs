//! Query orchestration: cache lookup, event fetch, computation.
//!
//! Each method is one stateless request unit: select a tier from the date
//! span, build the deterministic key, and read through the cache. On a miss
//! the events are pulled from the store and the pure calculators run; a
//! failed fetch aborts the request and is never written to the cache.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use engine_core::{DateRange, DeviceType, EventFilter, Result};
use event_store::EventStore;
use metrics_cache::{generate_key, QueryKind, Tier, TieredCache};

use crate::advanced::{
    calculate_advanced, BehaviorAnalysis, CategoryAnalysis, DeviceAnalysis, RetentionAnalysis,
};
use crate::comparison::{self, Comparison};
use crate::elements::{self, ElementReport};
use crate::funnel::{FunnelAnalysis, FunnelAnalyzer};
use crate::journey::{self, IdentifierType, Journey};
use crate::metrics::{calculate, AnalyticsMetrics, EcommerceMetrics, EngagementMetrics, TrendsData};

/// Metrics bundle with the advanced groups present when requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub ecommerce: EcommerceMetrics,
    pub engagement: EngagementMetrics,
    pub trends: TrendsData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub devices: Option<DeviceAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<CategoryAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub behavior: Option<BehaviorAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention: Option<RetentionAnalysis>,
}

impl MetricsReport {
    fn standard(&self) -> AnalyticsMetrics {
        AnalyticsMetrics {
            ecommerce: self.ecommerce.clone(),
            engagement: self.engagement.clone(),
            trends: self.trends.clone(),
        }
    }
}

/// A metrics query resolved by the API layer.
#[derive(Debug, Clone)]
pub struct MetricsRequest {
    pub range: DateRange,
    pub user_id: Option<String>,
    pub advanced: bool,
    pub compare: bool,
}

/// Metrics result plus the context the API layer reports back.
#[derive(Debug, Clone)]
pub struct MetricsOutcome {
    pub tier: Tier,
    pub report: MetricsReport,
    pub comparison: Option<Comparison>,
    pub cached: bool,
}

/// The engine's query façade over the event store and result cache.
pub struct AnalyticsService {
    store: Arc<dyn EventStore>,
    cache: Arc<TieredCache>,
    funnel: FunnelAnalyzer,
}

impl AnalyticsService {
    pub fn new(store: Arc<dyn EventStore>, cache: Arc<TieredCache>) -> Self {
        Self {
            store,
            cache,
            funnel: FunnelAnalyzer::default(),
        }
    }

    /// Overrides the funnel step order.
    pub fn with_funnel(mut self, funnel: FunnelAnalyzer) -> Self {
        self.funnel = funnel;
        self
    }

    /// Time-bucketed metric groups for a date range, optionally with the
    /// advanced groups and a previous-period comparison.
    pub async fn metrics(&self, request: MetricsRequest) -> Result<MetricsOutcome> {
        let tier = Tier::for_span_days(request.range.span_days());
        let filter = EventFilter::for_range(&request.range).with_user(request.user_id.clone());

        let kind = if request.advanced {
            QueryKind::AdvancedMetrics
        } else {
            QueryKind::Metrics
        };
        let key = generate_key(kind, &filter, tier, &[]);
        debug!(%key, %tier, "metrics query");

        let advanced = request.advanced;
        let (report, cached) = self
            .cache
            .read_through(&key, tier.ttl(), || async {
                let events = self.store.fetch_events(&filter).await?;
                Ok(build_report(&events, tier.bucket_seconds(), advanced))
            })
            .await?;

        let comparison = if request.compare {
            Some(self.compare_against_previous(&request, tier, &report).await?)
        } else {
            None
        };

        Ok(MetricsOutcome {
            tier,
            report,
            comparison,
            cached,
        })
    }

    /// Runs the calculator for the preceding period (cached under its own
    /// key) and derives the change percentages.
    async fn compare_against_previous(
        &self,
        request: &MetricsRequest,
        tier: Tier,
        current: &MetricsReport,
    ) -> Result<Comparison> {
        let previous_range = request.range.previous_period();
        let filter =
            EventFilter::for_range(&previous_range).with_user(request.user_id.clone());
        let key = generate_key(QueryKind::Metrics, &filter, tier, &[]);

        let (previous, _) = self
            .cache
            .read_through(&key, tier.ttl(), || async {
                let events = self.store.fetch_events(&filter).await?;
                Ok(calculate(&events, tier.bucket_seconds()))
            })
            .await?;

        Ok(comparison::compare(&previous_range, &current.standard(), previous))
    }

    /// Ordered step counts, conversion rates, and drop-off points.
    pub async fn funnel(&self, range: DateRange) -> Result<(FunnelAnalysis, bool)> {
        let tier = Tier::for_span_days(range.span_days());
        let filter = EventFilter::for_range(&range);
        let key = generate_key(QueryKind::Funnel, &filter, tier, &[]);

        self.cache
            .read_through(&key, tier.ttl(), || async {
                let events = self.store.fetch_events(&filter).await?;
                Ok(self.funnel.analyze(&events))
            })
            .await
    }

    /// Reconstructs one identifier's journey. Journeys always use the
    /// realtime tier: the window is still accumulating events.
    pub async fn journey(
        &self,
        identifier: &str,
        identifier_type: IdentifierType,
        range: Option<DateRange>,
    ) -> Result<(Journey, bool)> {
        let mut filter = match range {
            Some(ref range) => EventFilter::for_range(range),
            None => EventFilter {
                start: 0,
                end: i64::MAX,
                ..EventFilter::default()
            },
        };

        match identifier_type {
            IdentifierType::Session => {
                let hash: i64 = identifier.parse().map_err(|_| {
                    engine_core::Error::validation(format!(
                        "session identifier must be numeric: {identifier}"
                    ))
                })?;
                filter.session_hash = Some(hash);
            }
            IdentifierType::Visitor => filter.visitor_hash = Some(identifier.to_string()),
            IdentifierType::User => filter.user_id = Some(identifier.to_string()),
        }

        let tier = Tier::Realtime;
        let key = generate_key(
            QueryKind::Journey,
            &filter,
            tier,
            &[identifier_type.as_str()],
        );

        self.cache
            .read_through(&key, tier.ttl(), || async {
                let events = self.store.fetch_events(&filter).await?;
                Ok(journey::reconstruct(identifier, identifier_type, &events))
            })
            .await
    }

    /// Ranked element interactions for one route.
    pub async fn elements(
        &self,
        route: &str,
        device: Option<DeviceType>,
        range: DateRange,
    ) -> Result<(ElementReport, bool)> {
        let tier = Tier::for_span_days(range.span_days());
        let filter = EventFilter::for_range(&range).with_page(Some(route.to_string()));
        let device_tag = device.map(|d| d.as_str()).unwrap_or("all");
        let key = generate_key(QueryKind::Elements, &filter, tier, &[device_tag]);

        self.cache
            .read_through(&key, tier.ttl(), || async {
                let events = self.store.fetch_events(&filter).await?;
                Ok(elements::aggregate(&events, route, device))
            })
            .await
    }
}

fn build_report(events: &[engine_core::Event], bucket_seconds: i64, advanced: bool) -> MetricsReport {
    if advanced {
        let full = calculate_advanced(events, bucket_seconds);
        MetricsReport {
            ecommerce: full.ecommerce,
            engagement: full.engagement,
            trends: full.trends,
            devices: Some(full.devices),
            categories: Some(full.categories),
            behavior: Some(full.behavior),
            retention: Some(full.retention),
        }
    } else {
        let standard = calculate(events, bucket_seconds);
        MetricsReport {
            ecommerce: standard.ecommerce,
            engagement: standard.engagement,
            trends: standard.trends,
            devices: None,
            categories: None,
            behavior: None,
            retention: None,
        }
    }
}
