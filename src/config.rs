use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub replica: ReplicaConfig,
    pub shopify: ShopifyConfig,
}

/// Connection settings for the AI persona service.
#[derive(Debug, Clone)]
pub struct ReplicaConfig {
    pub base_url: String,
    pub api_key: String,
    pub replica_id: String,
    pub timeout_secs: u64,
}

/// Connection settings for the Shopify Storefront API.
#[derive(Debug, Clone)]
pub struct ShopifyConfig {
    pub store_domain: String,
    pub storefront_token: String,
    pub api_version: String,
}

impl ShopifyConfig {
    pub fn product_url(&self, handle: &str) -> String {
        format!("https://{}/products/{}", self.store_domain, handle)
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);

        let replica = ReplicaConfig {
            base_url: env::var("REPLICA_API_BASE_URL")
                .unwrap_or_else(|_| "https://api.sensay.io".to_string()),
            api_key: env::var("REPLICA_API_KEY")?,
            replica_id: env::var("REPLICA_UUID")?,
            timeout_secs: env::var("REPLICA_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(30),
        };

        let shopify = ShopifyConfig {
            store_domain: env::var("SHOPIFY_STORE_DOMAIN")?,
            storefront_token: env::var("SHOPIFY_STOREFRONT_TOKEN")?,
            api_version: env::var("SHOPIFY_API_VERSION")
                .unwrap_or_else(|_| "2024-01".to_string()),
        };

        Ok(Self {
            database_url,
            host,
            port,
            replica,
            shopify,
        })
    }
}
