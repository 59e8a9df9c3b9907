use reqwest::Client;
use serde::{Deserialize, Serialize};
use anyhow::{Result, anyhow};

pub const DEFAULT_API_URL: &str = "https://fakestoreapi.com/products";

/// Entries kept from a list response; the rest of the collection is ignored.
pub const LIST_LIMIT: usize = 10;

/// A named record mirrored from the remote catalog. The local list is a
/// cache of the last known server state, not authoritative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: u64,
    pub name: String,
}

#[derive(Deserialize)]
struct Product {
    id: u64,
    title: String,
}

impl From<Product> for Item {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.title,
        }
    }
}

#[derive(Serialize)]
struct NewProduct<'a> {
    title: &'a str,
    body: &'a str,
    #[serde(rename = "userId")]
    user_id: u32,
}

#[derive(Serialize)]
struct ProductUpdate<'a> {
    id: u64,
    title: &'a str,
    body: &'a str,
    #[serde(rename = "userId")]
    user_id: u32,
}

/// Completion of a finished request, delivered back to the event loop and
/// applied by `App::apply_net` in arrival order.
#[derive(Debug)]
pub enum NetEvent {
    Listed(Result<Vec<Item>>),
    Created(Result<Item>),
    Updated(Result<Item>),
    Deleted { id: u64, outcome: Result<()> },
}

#[derive(Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: String,
}

impl CatalogClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the collection, keep the first `LIST_LIMIT` entries, and map
    /// them into items.
    pub async fn list(&self) -> Result<Vec<Item>> {
        let response = self.client.get(&self.base_url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!("list request failed with status: {}", response.status()));
        }

        let products: Vec<Product> = response.json().await?;
        Ok(products.into_iter().take(LIST_LIMIT).map(Item::from).collect())
    }

    pub async fn create(&self, name: &str) -> Result<Item> {
        let request = NewProduct {
            title: name,
            body: "Default content",
            user_id: 1,
        };

        let response = self
            .client
            .post(&self.base_url)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("create request failed with status: {}", response.status()));
        }

        let product: Product = response.json().await?;
        Ok(product.into())
    }

    pub async fn update(&self, id: u64, name: &str) -> Result<Item> {
        let url = format!("{}/{}", self.base_url, id);

        let request = ProductUpdate {
            id,
            title: name,
            body: "Updated content",
            user_id: 1,
        };

        let response = self.client.put(&url).json(&request).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!("update request failed with status: {}", response.status()));
        }

        let product: Product = response.json().await?;
        Ok(product.into())
    }

    pub async fn delete(&self, id: u64) -> Result<()> {
        let url = format!("{}/{}", self.base_url, id);

        let response = self.client.delete(&url).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!("delete request failed with status: {}", response.status()));
        }

        Ok(())
    }
}
