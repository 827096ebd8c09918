use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Base URL of the storefront frontend; payment redirect targets are built from it.
    pub frontend_base_url: String,
    pub flutterwave_api_base: String,
    pub flutterwave_secret_key: String,
    pub paypal_api_base: String,
    pub paypal_client_id: String,
    pub paypal_secret: String,
    /// Base URL of the image CDN used to resolve stored media references.
    pub media_base_url: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let frontend_base_url = env::var("FRONTEND_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());
        let flutterwave_api_base = env::var("FLUTTERWAVE_API_BASE")
            .unwrap_or_else(|_| "https://api.flutterwave.com/v3".to_string());
        let flutterwave_secret_key = env::var("FLUTTERWAVE_SECRET_KEY").unwrap_or_default();
        let paypal_api_base = env::var("PAYPAL_API_BASE")
            .unwrap_or_else(|_| "https://api.sandbox.paypal.com".to_string());
        let paypal_client_id = env::var("PAYPAL_CLIENT_ID").unwrap_or_default();
        let paypal_secret = env::var("PAYPAL_SECRET_KEY").unwrap_or_default();
        let media_base_url = env::var("MEDIA_BASE_URL")
            .unwrap_or_else(|_| "https://res.cloudinary.com/shopnow/image/upload".to_string());

        Ok(Self {
            database_url,
            host,
            port,
            frontend_base_url,
            flutterwave_api_base,
            flutterwave_secret_key,
            paypal_api_base,
            paypal_client_id,
            paypal_secret,
            media_base_url,
        })
    }
}
