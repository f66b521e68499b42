//! Element interaction aggregation.
//!
//! Groups DOM interaction events by selector for one route to rank the most
//! engaged on-page elements. Shares the calculator's grouping approach;
//! secondary to the metric groups.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use engine_core::{DeviceType, Event, EventType};

const TOP_ELEMENTS: usize = 20;

/// Aggregated interactions for one selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementStats {
    pub selector: String,
    pub interactions: u64,
    pub clicks: u64,
    pub hovers: u64,
    pub scrolls: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSummary {
    pub total_interactions: u64,
    pub unique_elements: u64,
    pub top_selector: Option<String>,
}

/// Ranked element report for one route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementReport {
    pub route: String,
    pub device: Option<DeviceType>,
    pub elements: Vec<ElementStats>,
    pub summary: ElementSummary,
}

/// Aggregates interaction events on `route` (optionally narrowed to one
/// device class), ranked by interaction count with first-seen tie-break.
pub fn aggregate(events: &[Event], route: &str, device: Option<DeviceType>) -> ElementReport {
    let mut stats: HashMap<String, ElementStats> = HashMap::new();
    let mut first_seen: Vec<String> = Vec::new();

    for e in events {
        if e.page != route || !e.event_type.is_interaction() {
            continue;
        }
        if device.is_some() && e.device_type != device {
            continue;
        }
        let Some(ref element) = e.element else {
            continue;
        };

        let entry = stats
            .entry(element.selector.clone())
            .or_insert_with(|| {
                first_seen.push(element.selector.clone());
                ElementStats {
                    selector: element.selector.clone(),
                    interactions: 0,
                    clicks: 0,
                    hovers: 0,
                    scrolls: 0,
                }
            });

        entry.interactions += 1;
        match e.event_type {
            EventType::Click => entry.clicks += 1,
            EventType::Hover => entry.hovers += 1,
            EventType::Scroll => entry.scrolls += 1,
            _ => {}
        }
    }

    let order: HashMap<&str, usize> = first_seen
        .iter()
        .enumerate()
        .map(|(i, s)| (s.as_str(), i))
        .collect();

    let mut elements: Vec<ElementStats> = stats.into_values().collect();
    elements.sort_by(|a, b| {
        b.interactions
            .cmp(&a.interactions)
            .then_with(|| order[a.selector.as_str()].cmp(&order[b.selector.as_str()]))
    });
    elements.truncate(TOP_ELEMENTS);

    let summary = ElementSummary {
        total_interactions: elements.iter().map(|e| e.interactions).sum(),
        unique_elements: elements.len() as u64,
        top_selector: elements.first().map(|e| e.selector.clone()),
    };

    ElementReport {
        route: route.to_string(),
        device,
        elements,
        summary,
    }
}
