// config.rs
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub app_url: String,
    pub port: u16,
    // Email service configuration
    pub mail_api_url: String,
    pub mail_api_key: String,
    pub mail_from: String,
    // Push provider configuration (dev/prod pairs)
    pub push_app_id: String,
    pub push_api_key: String,
    pub push_app_id_dev: String,
    pub push_api_key_dev: String,
    pub app_env: String,
    // SMS gateway configuration
    pub sms_gateway_url: String,
    pub sms_sender_number: String,
    // Outbound call timeout, seconds
    pub notify_timeout_secs: u64,
    pub admin_email: String,
}

impl Config {
    pub fn init() -> Config {
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let app_url = std::env::var("APP_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());

        let mail_api_url = std::env::var("MAIL_API_URL")
            .unwrap_or_else(|_| "https://api.resend.com/emails".to_string());
        let mail_api_key = std::env::var("MAIL_API_KEY").unwrap_or_else(|_| "".to_string());
        let mail_from = std::env::var("MAIL_FROM")
            .unwrap_or_else(|_| "Lingobook <noreply@lingobook.app>".to_string());

        let push_app_id = std::env::var("PUSH_APP_ID").unwrap_or_else(|_| "".to_string());
        let push_api_key = std::env::var("PUSH_API_KEY").unwrap_or_else(|_| "".to_string());
        let push_app_id_dev = std::env::var("PUSH_APP_ID_DEV").unwrap_or_else(|_| "".to_string());
        let push_api_key_dev = std::env::var("PUSH_API_KEY_DEV").unwrap_or_else(|_| "".to_string());
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        let sms_gateway_url = std::env::var("SMS_GATEWAY_URL").unwrap_or_else(|_| "".to_string());
        let sms_sender_number = std::env::var("SMS_SENDER_NUMBER").unwrap_or_else(|_| "".to_string());

        let notify_timeout_secs = std::env::var("NOTIFY_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(10);

        let admin_email = std::env::var("ADMIN_EMAIL")
            .unwrap_or_else(|_| "bookings@lingobook.app".to_string());

        Config {
            database_url,
            app_url,
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(8000),
            mail_api_url,
            mail_api_key,
            mail_from,
            push_app_id,
            push_api_key,
            push_app_id_dev,
            push_api_key_dev,
            app_env,
            sms_gateway_url,
            sms_sender_number,
            notify_timeout_secs,
            admin_email,
        }
    }

    pub fn active_push_credentials(&self) -> (&str, &str) {
        if self.app_env == "prod" {
            (&self.push_app_id, &self.push_api_key)
        } else {
            (&self.push_app_id_dev, &self.push_api_key_dev)
        }
    }
}
