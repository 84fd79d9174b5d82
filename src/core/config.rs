use std::env;

/// Outbound mail settings used by the SMTP notifier and the account
/// confirmation flow.
#[derive(Clone, Debug)]
pub struct MailConfig {
    // An empty host switches the app to the dry-run notifier
    pub smtp_host: String,
    pub smtp_port: u16,
    pub sender_address: String,
    pub credential: String,
    pub otp_expiry_minutes: i64,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub db_path: String,
    pub base_url: String,
    pub mail: MailConfig,
}

impl Default for MailConfig {
    fn default() -> Self {
        let smtp_host = env::var("PLANNER_SMTP_HOST").unwrap_or_default();
        let smtp_port = env::var("PLANNER_SMTP_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(465);
        let sender_address = env::var("PLANNER_SMTP_SENDER")
            .unwrap_or_else(|_| "planner@localhost".to_string());
        let credential = env::var("PLANNER_SMTP_CREDENTIAL").unwrap_or_default();
        let otp_expiry_minutes = env::var("PLANNER_OTP_EXPIRY_MINUTES")
            .ok()
            .and_then(|m| m.parse().ok())
            .unwrap_or(10);

        Self {
            smtp_host,
            smtp_port,
            sender_address,
            credential,
            otp_expiry_minutes,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let host = "127.0.0.1";
        let port = "5000";
        let storage_path = env::var("PLANNER_STORAGE_PATH").unwrap_or("./".to_string());
        let db_path = format!("{}/planner.db", storage_path.trim_end_matches('/'));
        let base_url =
            env::var("PLANNER_BASE_URL").unwrap_or(format!("http://{}:{}", host, port));

        Self {
            db_path,
            base_url: base_url.trim_end_matches('/').to_string(),
            mail: MailConfig::default(),
        }
    }
}
