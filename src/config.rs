use anyhow::Context;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub max_connections: u32,
}

impl Config {
    /// Reads `DATABASE_URL` and `ACADEMIC_RECORDS_MAX_CONNECTIONS`. A `.env`
    /// file is loaded first when present.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let database_url = std::env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());
        let max_connections = match std::env::var("ACADEMIC_RECORDS_MAX_CONNECTIONS") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("invalid ACADEMIC_RECORDS_MAX_CONNECTIONS {raw:?}"))?,
            Err(_) => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            database_url,
            max_connections,
        })
    }

    pub fn require_database_url(&self) -> anyhow::Result<&str> {
        self.database_url
            .as_deref()
            .context("DATABASE_URL must be set to a Postgres instance")
    }
}
