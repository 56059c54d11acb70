use chrono::FixedOffset;
use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    /// Department names tried, in order, when an employee's own department
    /// has no active NIK configuration.
    pub nik_default_departments: Vec<String>,
    /// Office timezone. Leave-date checks ("start must not be in the
    /// past") are evaluated against today in this zone.
    pub office_tz: FixedOffset,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("SERVER_PORT must be a valid port number"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            jwt_expiry_hours: env::var("JWT_EXPIRY_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .expect("JWT_EXPIRY_HOURS must be a number"),
            nik_default_departments: env::var("NIK_DEFAULT_DEPARTMENTS")
                .unwrap_or_else(|_| "General,Operational".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            office_tz: {
                let hours: i32 = env::var("OFFICE_TZ_OFFSET_HOURS")
                    .unwrap_or_else(|_| "7".to_string())
                    .parse()
                    .expect("OFFICE_TZ_OFFSET_HOURS must be a number");
                FixedOffset::east_opt(hours * 3600).expect("OFFICE_TZ_OFFSET_HOURS out of range")
            },
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
