use chrono::Weekday;
use chrono_tz::Tz;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub report_source: ReportSourceConfig,
    pub analytics: AnalyticsConfig,
    pub swagger: SwaggerConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

/// Upstream REST backend that owns the report collection
#[derive(Debug, Clone)]
pub struct ReportSourceConfig {
    /// Base URL; reports are read from `{base_url}/reports`
    pub base_url: String,
    pub fetch_timeout: Duration,
    /// Background refresh period, `None` when disabled
    pub refresh_interval: Option<Duration>,
}

/// Calendar settings used for date bucketing
#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    /// Zone whose wall clock defines days, weeks, months and time-of-day
    pub timezone: Tz,
    pub week_start: Weekday,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            report_source: ReportSourceConfig::from_env()?,
            analytics: AnalyticsConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
        })
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl ReportSourceConfig {
    const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
    const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 0;

    pub fn from_env() -> Result<Self, String> {
        let base_url = env::var("REPORTS_API_URL")
            .map_err(|_| "REPORTS_API_URL environment variable is required".to_string())?;

        let fetch_timeout_secs = env::var("REPORTS_FETCH_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_FETCH_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "REPORTS_FETCH_TIMEOUT_SECS must be a valid number".to_string())?;

        let refresh_interval_secs = env::var("REPORTS_REFRESH_INTERVAL_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_REFRESH_INTERVAL_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "REPORTS_REFRESH_INTERVAL_SECS must be a valid number".to_string())?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            fetch_timeout: Duration::from_secs(fetch_timeout_secs),
            refresh_interval: (refresh_interval_secs > 0)
                .then(|| Duration::from_secs(refresh_interval_secs)),
        })
    }
}

impl AnalyticsConfig {
    pub fn from_env() -> Result<Self, String> {
        let timezone = env::var("ANALYTICS_TIMEZONE")
            .unwrap_or_else(|_| "UTC".to_string())
            .parse::<Tz>()
            .map_err(|e| format!("Invalid ANALYTICS_TIMEZONE: {}", e))?;

        let week_start = parse_week_start(
            &env::var("ANALYTICS_WEEK_START").unwrap_or_else(|_| "sunday".to_string()),
        )?;

        Ok(Self {
            timezone,
            week_start,
        })
    }
}

/// Only Sunday and Monday starts are meaningful for the weekly series
fn parse_week_start(raw: &str) -> Result<Weekday, String> {
    match raw.trim().to_lowercase().as_str() {
        "sunday" | "sun" => Ok(Weekday::Sun),
        "monday" | "mon" => Ok(Weekday::Mon),
        other => Err(format!(
            "ANALYTICS_WEEK_START must be 'sunday' or 'monday', got '{}'",
            other
        )),
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title =
            env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Incident Analytics API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "Filtering and aggregation over incident reports".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_week_start() {
        assert_eq!(parse_week_start("sunday"), Ok(Weekday::Sun));
        assert_eq!(parse_week_start(" Monday "), Ok(Weekday::Mon));
        assert_eq!(parse_week_start("mon"), Ok(Weekday::Mon));
        assert!(parse_week_start("friday").is_err());
    }

    #[test]
    fn test_swagger_credentials_require_both_parts() {
        let mut swagger = SwaggerConfig {
            username: Some("admin".to_string()),
            password: None,
            title: String::new(),
            version: String::new(),
            description: String::new(),
        };
        assert_eq!(swagger.credentials(), None);

        swagger.password = Some("secret".to_string());
        assert_eq!(swagger.credentials(), Some("admin:secret".to_string()));
    }
}
