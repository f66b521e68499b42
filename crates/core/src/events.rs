//! Event type definitions for the analytics engine.
//!
//! Events arrive already typed and timestamped from the upstream collector;
//! this core never mutates or deletes them. All analytics outputs are views
//! derived from immutable event ranges.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Interaction event types tracked by the storefront collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    PageView,
    ProductView,
    AddToCart,
    RemoveFromCart,
    BeginCheckout,
    Purchase,
    Click,
    Hover,
    Scroll,
    Search,
}

impl EventType {
    /// Returns the wire name of the event type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PageView => "page_view",
            Self::ProductView => "product_view",
            Self::AddToCart => "add_to_cart",
            Self::RemoveFromCart => "remove_from_cart",
            Self::BeginCheckout => "begin_checkout",
            Self::Purchase => "purchase",
            Self::Click => "click",
            Self::Hover => "hover",
            Self::Scroll => "scroll",
            Self::Search => "search",
        }
    }

    /// True for DOM-level interaction events that may carry element payloads.
    pub fn is_interaction(&self) -> bool {
        matches!(self, Self::Click | Self::Hover | Self::Scroll)
    }
}

impl std::str::FromStr for EventType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "page_view" | "pageview" => Ok(Self::PageView),
            "product_view" | "view_item" => Ok(Self::ProductView),
            "add_to_cart" | "add" => Ok(Self::AddToCart),
            "remove_from_cart" | "remove" => Ok(Self::RemoveFromCart),
            "begin_checkout" => Ok(Self::BeginCheckout),
            "purchase" => Ok(Self::Purchase),
            "click" => Ok(Self::Click),
            "hover" => Ok(Self::Hover),
            "scroll" => Ok(Self::Scroll),
            "search" | "search_query" => Ok(Self::Search),
            other => Err(crate::Error::invalid_event_type(other)),
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Device class reported by the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Mobile,
    Desktop,
    Tablet,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::Desktop => "desktop",
            Self::Tablet => "tablet",
        }
    }
}

impl std::str::FromStr for DeviceType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mobile" => Ok(Self::Mobile),
            "desktop" => Ok(Self::Desktop),
            "tablet" => Ok(Self::Tablet),
            other => Err(crate::Error::validation(format!(
                "unknown device type: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Commerce payload attached to product and checkout events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommerceData {
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub category_name: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<u32>,
}

/// On-page position of a tracked element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementPosition {
    pub x: f64,
    pub y: f64,
}

/// Rendered dimensions of a tracked element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementDimensions {
    pub width: f64,
    pub height: f64,
}

/// Element payload attached to DOM interaction events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementData {
    pub selector: String,
    pub position: Option<ElementPosition>,
    pub dimensions: Option<ElementDimensions>,
}

/// A single interaction event from the append-only stream.
///
/// `session_hash` totally orders events within one browsing session (ties
/// broken by insertion order, which the store keeps stable). At least one of
/// `session_hash` / `visitor_hash` / `user_id` resolves for journey queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Unique event ID
    pub id: Uuid,
    /// Event timestamp (unix seconds)
    pub timestamp: i64,
    /// Typed event discriminant
    pub event_type: EventType,
    /// Collector category (e.g. "shop", "search", "engagement")
    pub category: String,
    /// Collector action (usually mirrors the event type name)
    pub action: String,
    pub label: Option<String>,
    pub value: Option<f64>,
    /// Session identity (numeric hash)
    pub session_hash: i64,
    /// Persistent anonymous identity
    pub visitor_hash: String,
    /// Authenticated identity, when known
    pub user_id: Option<String>,
    /// Page path the event occurred on
    pub page: String,
    pub device_type: Option<DeviceType>,
    /// Commerce sub-payload, present on product/cart/checkout events
    pub commerce: Option<CommerceData>,
    /// Element sub-payload, present on DOM interaction events
    pub element: Option<ElementData>,
}

impl Event {
    /// Revenue contributed by this event: explicit `value`, falling back to
    /// `price * quantity` from the commerce payload.
    pub fn revenue(&self) -> f64 {
        if let Some(value) = self.value {
            return value;
        }
        if let Some(ref c) = self.commerce {
            if let Some(price) = c.price {
                return price * f64::from(c.quantity.unwrap_or(1));
            }
        }
        0.0
    }

    /// The user-facing identity for retention and unique-user counts:
    /// `user_id` for authenticated traffic, `visitor_hash` otherwise.
    pub fn user_identity(&self) -> Option<&str> {
        match self.user_id.as_deref() {
            Some(id) if !id.is_empty() => Some(id),
            _ => {
                if self.visitor_hash.is_empty() {
                    None
                } else {
                    Some(&self.visitor_hash)
                }
            }
        }
    }

    /// True for actions that put items into the cart.
    pub fn is_add_action(&self) -> bool {
        matches!(self.action.as_str(), "add_to_cart" | "add")
    }

    /// True for cart-related actions considered when detecting abandonment.
    pub fn is_cart_action(&self) -> bool {
        self.is_add_action() || self.action == "begin_checkout"
    }
}
