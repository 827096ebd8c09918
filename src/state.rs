use crate::{
    config::AppConfig,
    db::{DbPool, OrmConn},
    media::MediaResolver,
    payments::{flutterwave::FlutterwaveClient, paypal::PaypalClient},
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub media: MediaResolver,
    pub flutterwave: FlutterwaveClient,
    pub paypal: PaypalClient,
}

impl AppState {
    pub fn new(pool: DbPool, orm: OrmConn, config: &AppConfig) -> anyhow::Result<Self> {
        let flutterwave = FlutterwaveClient::new(
            &config.flutterwave_api_base,
            &config.flutterwave_secret_key,
            &config.frontend_base_url,
        )?;
        let paypal = PaypalClient::new(
            &config.paypal_api_base,
            &config.paypal_client_id,
            &config.paypal_secret,
            &config.frontend_base_url,
        )?;
        Ok(Self {
            pool,
            orm,
            media: MediaResolver::new(&config.media_base_url),
            flutterwave,
            paypal,
        })
    }
}
