//! A small product catalog: one aggregate and two projections over its events.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{Aggregate, Apply, CommandHandler};
use event_store::{DomainEvent, PersistedEvent};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: u64,
    pub listed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ProductCommand {
    AddProduct { id: String, name: String },
    AddListedProduct { id: String, name: String },
    ChangeProductPrice { id: String, price: u64 },
    /// Lists the product; a no-op when it is already listed.
    ListProduct { id: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ProductEvent {
    ProductCreated { id: String, name: String },
    ProductPriceChanged { price: u64 },
    ProductIsPubliclyAvailable,
}

impl DomainEvent for ProductEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProductEvent::ProductCreated { .. } => "productCreated",
            ProductEvent::ProductPriceChanged { .. } => "productPriceChanged",
            ProductEvent::ProductIsPubliclyAvailable => "productIsPubliclyAvailable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductError {
    #[error("product already exists")]
    AlreadyExists,
}

impl Apply<ProductEvent> for Product {
    fn apply(self, event: &PersistedEvent<ProductEvent>) -> Self {
        match &event.event {
            ProductEvent::ProductCreated { id, name } => Product {
                id: id.clone(),
                name: name.clone(),
                ..self
            },
            ProductEvent::ProductPriceChanged { price } => Product {
                price: *price,
                ..self
            },
            ProductEvent::ProductIsPubliclyAvailable => Product {
                listed: true,
                ..self
            },
        }
    }
}

impl Aggregate for Product {
    type Command = ProductCommand;
    type Event = ProductEvent;
    type Error = ProductError;

    fn aggregate_type() -> &'static str {
        "Product"
    }
}

/// Command handler for [`Product`]. Creating a product twice is rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductCommandHandler;

#[async_trait]
impl CommandHandler<Product> for ProductCommandHandler {
    async fn handle(
        &self,
        state: &Product,
        command: ProductCommand,
    ) -> Result<Vec<ProductEvent>, ProductError> {
        match command {
            ProductCommand::AddProduct { id, name } => {
                if !state.name.is_empty() {
                    return Err(ProductError::AlreadyExists);
                }
                Ok(vec![ProductEvent::ProductCreated { id, name }])
            }
            ProductCommand::AddListedProduct { id, name } => {
                if !state.name.is_empty() {
                    return Err(ProductError::AlreadyExists);
                }
                Ok(vec![
                    ProductEvent::ProductCreated { id, name },
                    ProductEvent::ProductIsPubliclyAvailable,
                ])
            }
            ProductCommand::ChangeProductPrice { price, .. } => {
                Ok(vec![ProductEvent::ProductPriceChanged { price }])
            }
            ProductCommand::ListProduct { .. } if state.listed => Ok(vec![]),
            ProductCommand::ListProduct { .. } => {
                Ok(vec![ProductEvent::ProductIsPubliclyAvailable])
            }
        }
    }
}

/// Named projection: every event of one product, in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductHistory {
    pub list: Vec<ProductEvent>,
    pub last_changed_at: Option<DateTime<Utc>>,
}

impl Apply<ProductEvent> for ProductHistory {
    fn apply(mut self, event: &PersistedEvent<ProductEvent>) -> Self {
        self.list.push(event.event.clone());
        self.last_changed_at = Some(event.time);
        self
    }
}

/// Global projection: how many product events were recorded in total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductActivity {
    pub count: u64,
}

impl Apply<ProductEvent> for ProductActivity {
    fn apply(self, _event: &PersistedEvent<ProductEvent>) -> Self {
        ProductActivity {
            count: self.count + 1,
        }
    }
}
