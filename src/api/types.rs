use serde::{Deserialize, Serialize};
use std::fmt;

pub use crate::workflows::order_status::OrderStatus;

/// Every backend response wraps its payload as `{ "data": ..., "error": ... }`.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default)]
    pub id: Option<u64>,
    pub bean_name: String,
    pub form_name: String,
    pub roasted: String,
    pub price: f64,
    pub order_quantity: u32,
    #[serde(default)]
    pub image: Option<String>,
}

impl OrderItem {
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.order_quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub customer_email: String,
    pub customer_name: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub alternative_phone_number: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    pub total_price: f64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub status: OrderStatus,
}

impl Order {
    pub fn address(&self) -> String {
        match (self.street.is_empty(), self.city.is_empty()) {
            (false, false) => format!("{}, {}", self.street, self.city),
            (false, true) => self.street.clone(),
            (true, false) => self.city.clone(),
            (true, true) => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bean {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Form {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub bean: String,
    pub roasted: String,
    pub form: String,
    pub price: f64,
    pub quantity: u32,
    #[serde(default)]
    pub image: Option<String>,
}

/// Product fields sent as the `metadata` part of a multipart create/edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductMetadata {
    pub bean: String,
    pub roasted: String,
    pub form: String,
    pub price: f64,
    pub quantity: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("sort must be 'asc' or 'desc', got '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
    pub sort: SortOrder,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

impl OrderQuery {
    /// Query pairs in the order the backend documents them; unset filters
    /// and a zero offset are left out.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(status) = self.status {
            pairs.push(("status", status.to_string()));
        }
        pairs.push(("sort", self.sort.to_string()));
        if let Some(offset) = self.offset.filter(|offset| *offset > 0) {
            pairs.push(("offset", offset.to_string()));
        }
        if let Some(limit) = self.limit.filter(|limit| *limit > 0) {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }

    /// Stable cache key segment for this query.
    pub fn cache_segment(&self) -> String {
        encode_pairs(&self.to_pairs())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductQuery {
    pub bean: Option<String>,
    pub form: Option<String>,
    pub roast: Option<String>,
    pub sort: Option<SortOrder>,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

impl ProductQuery {
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(bean) = self.bean.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("bean", bean.to_string()));
        }
        if let Some(form) = self.form.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("form", form.to_string()));
        }
        if let Some(roast) = self.roast.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("roast", roast.to_string()));
        }
        if let Some(sort) = self.sort {
            pairs.push(("sort", sort.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }

    pub fn cache_segment(&self) -> String {
        encode_pairs(&self.to_pairs())
    }
}

/// Order ids arrive as numbers from some backends and strings from others.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!("invalid order id: {other}"))),
    }
}

fn encode_pairs(pairs: &[(&'static str, String)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedInUser {
    pub id: u64,
    pub email: String,
    pub role_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignIn {
    pub token: String,
    pub user: SignedInUser,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}
