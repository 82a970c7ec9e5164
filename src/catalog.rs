use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;

use crate::{config::ShopifyConfig, models::ProductRef};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Network(String),

    #[error("catalog returned an unreadable payload: {0}")]
    Decode(String),
}

/// Product catalog the assistant cross-references. Failures in the chat
/// pipeline degrade to a plain reply instead of surfacing to the user.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<ProductRef>, CatalogError>;

    async fn product_by_handle(&self, handle: &str) -> Result<Option<ProductRef>, CatalogError>;
}

pub struct ShopifyCatalog {
    client: Client,
    config: ShopifyConfig,
}

const SEARCH_QUERY: &str = r#"
query SearchProducts($query: String!, $first: Int!) {
  products(first: $first, query: $query) {
    edges {
      node {
        id
        handle
        title
        description
        featuredImage { url }
        priceRange { minVariantPrice { amount currencyCode } }
      }
    }
  }
}
"#;

const HANDLE_QUERY: &str = r#"
query ProductByHandle($handle: String!) {
  productByHandle(handle: $handle) {
    id
    handle
    title
    description
    featuredImage { url }
    priceRange { minVariantPrice { amount currencyCode } }
  }
}
"#;

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    products: ProductConnection,
}

#[derive(Debug, Deserialize)]
struct ProductConnection {
    edges: Vec<ProductEdge>,
}

#[derive(Debug, Deserialize)]
struct ProductEdge {
    node: ProductNode,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HandleData {
    product_by_handle: Option<ProductNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductNode {
    id: String,
    handle: String,
    title: String,
    description: Option<String>,
    featured_image: Option<FeaturedImage>,
    price_range: PriceRange,
}

#[derive(Debug, Deserialize)]
struct FeaturedImage {
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceRange {
    min_variant_price: MoneyV2,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MoneyV2 {
    amount: String,
    currency_code: String,
}

impl ShopifyCatalog {
    pub fn new(config: ShopifyConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<T, CatalogError> {
        let url = format!(
            "https://{}/api/{}/graphql.json",
            self.config.store_domain, self.config.api_version
        );

        let response = self
            .client
            .post(&url)
            .header("X-Shopify-Storefront-Access-Token", &self.config.storefront_token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Network(format!(
                "storefront returned {status}"
            )));
        }

        let body: GraphQlResponse<T> = response
            .json()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))?;

        if let Some(first) = body.errors.as_ref().and_then(|errors| errors.first()) {
            return Err(CatalogError::Decode(first.message.clone()));
        }

        body.data
            .ok_or_else(|| CatalogError::Decode("response had no data".into()))
    }
}

#[async_trait]
impl Catalog for ShopifyCatalog {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<ProductRef>, CatalogError> {
        let data: SearchData = self
            .execute(
                SEARCH_QUERY,
                json!({ "query": query, "first": limit as i64 }),
            )
            .await?;

        Ok(data
            .products
            .edges
            .into_iter()
            .map(|edge| product_from_node(edge.node))
            .collect())
    }

    async fn product_by_handle(&self, handle: &str) -> Result<Option<ProductRef>, CatalogError> {
        let data: HandleData = self
            .execute(HANDLE_QUERY, json!({ "handle": handle }))
            .await?;

        Ok(data.product_by_handle.map(product_from_node))
    }
}

/// Validation and defaulting happen here, once; nothing downstream
/// re-checks catalog payloads.
fn product_from_node(node: ProductNode) -> ProductRef {
    let money = node.price_range.min_variant_price;
    let price = money.amount.parse::<Decimal>().unwrap_or_else(|_| {
        tracing::warn!(product = %node.id, amount = %money.amount, "unparsable product price");
        Decimal::ZERO
    });

    ProductRef {
        id: node.id,
        handle: node.handle,
        title: node.title,
        description: node.description.unwrap_or_default(),
        price,
        currency: money.currency_code,
        image_url: node.featured_image.map(|img| img.url),
    }
}
