//! Range-filtered event queries against the ClickHouse event log.

use std::str::FromStr;

use clickhouse::Row;
use serde::Deserialize;
use uuid::Uuid;

use engine_core::{
    CommerceData, DeviceType, ElementData, ElementDimensions, ElementPosition, Error, Event,
    EventFilter, EventType, Result,
};

use crate::client::StoreClient;

/// Raw event row as stored in the event log.
#[derive(Debug, Clone, Row, Deserialize)]
pub struct EventRow {
    pub event_id: String,
    pub timestamp: i64,
    pub event_type: String,
    pub category: String,
    pub action: String,
    pub label: Option<String>,
    pub value: Option<f64>,
    pub session_hash: i64,
    pub visitor_hash: String,
    pub user_id: Option<String>,
    pub page: String,
    pub device_type: Option<String>,
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub category_name: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<u32>,
    pub element_selector: Option<String>,
    pub element_x: Option<f64>,
    pub element_y: Option<f64>,
    pub element_width: Option<f64>,
    pub element_height: Option<f64>,
}

const SELECT_COLUMNS: &str = "event_id, timestamp, event_type, category, action, label, value, \
     session_hash, visitor_hash, user_id, page, device_type, \
     product_id, product_name, category_name, price, quantity, \
     element_selector, element_x, element_y, element_width, element_height";

impl EventRow {
    /// Converts a stored row into the typed event model.
    pub fn into_event(self) -> Result<Event> {
        let id = Uuid::from_str(&self.event_id)
            .map_err(|e| Error::upstream(format!("bad event id {}: {e}", self.event_id)))?;
        let event_type = EventType::from_str(&self.event_type)?;
        // Device class is advisory; rows with unrecognized values keep
        // flowing with no device rather than failing the whole query.
        let device_type = self
            .device_type
            .as_deref()
            .and_then(|d| DeviceType::from_str(d).ok());

        let commerce = if self.product_id.is_some()
            || self.product_name.is_some()
            || self.price.is_some()
            || self.quantity.is_some()
        {
            Some(CommerceData {
                product_id: self.product_id,
                product_name: self.product_name,
                category_name: self.category_name,
                price: self.price,
                quantity: self.quantity,
            })
        } else {
            None
        };

        let element = self.element_selector.map(|selector| ElementData {
            selector,
            position: match (self.element_x, self.element_y) {
                (Some(x), Some(y)) => Some(ElementPosition { x, y }),
                _ => None,
            },
            dimensions: match (self.element_width, self.element_height) {
                (Some(width), Some(height)) => Some(ElementDimensions { width, height }),
                _ => None,
            },
        });

        Ok(Event {
            id,
            timestamp: self.timestamp,
            event_type,
            category: self.category,
            action: self.action,
            label: self.label,
            value: self.value,
            session_hash: self.session_hash,
            visitor_hash: self.visitor_hash,
            user_id: self.user_id,
            page: self.page,
            device_type,
            commerce,
            element,
        })
    }
}

/// Fetches events matching the filter, ordered by timestamp ascending.
pub async fn fetch_events(client: &StoreClient, filter: &EventFilter) -> Result<Vec<Event>> {
    let table = format!(
        "{}.{}",
        client.config().database,
        client.config().table
    );

    let mut sql = format!(
        "SELECT {SELECT_COLUMNS} FROM {table} WHERE timestamp >= ? AND timestamp <= ?"
    );
    if filter.session_hash.is_some() {
        sql.push_str(" AND session_hash = ?");
    }
    if filter.visitor_hash.is_some() {
        sql.push_str(" AND visitor_hash = ?");
    }
    if filter.user_id.is_some() {
        sql.push_str(" AND user_id = ?");
    }
    if filter.event_type.is_some() {
        sql.push_str(" AND event_type = ?");
    }
    if filter.page.is_some() {
        sql.push_str(" AND page = ?");
    }
    sql.push_str(" ORDER BY timestamp ASC");

    let mut query = client.inner().query(&sql).bind(filter.start).bind(filter.end);
    if let Some(session_hash) = filter.session_hash {
        query = query.bind(session_hash);
    }
    if let Some(ref visitor_hash) = filter.visitor_hash {
        query = query.bind(visitor_hash.as_str());
    }
    if let Some(ref user_id) = filter.user_id {
        query = query.bind(user_id.as_str());
    }
    if let Some(event_type) = filter.event_type {
        query = query.bind(event_type.as_str());
    }
    if let Some(ref page) = filter.page {
        query = query.bind(page.as_str());
    }

    let rows: Vec<EventRow> = query
        .fetch_all()
        .await
        .map_err(|e| Error::upstream(format!("event query failed: {e}")))?;

    rows.into_iter().map(EventRow::into_event).collect()
}
