use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub listen_addr: String,
    pub data_dir: String,
    pub embedder_api_key: String,
    pub embedder_model: String,
    pub embedder_base_url: String,
}

impl AppConfig {
    /// Reads configuration from the environment. `EMBEDDER_API_KEY` is the
    /// one fatal variable — there is no sane default for a credential.
    /// `DATA_DIR`, unlike a remote database connection string, can always
    /// fall back to a local directory, so it is defaulted instead.
    pub fn from_env() -> anyhow::Result<Self> {
        let embedder_api_key = std::env::var("EMBEDDER_API_KEY")
            .map_err(|_| anyhow::anyhow!("EMBEDDER_API_KEY must be set"))?;

        let port = std::env::var("PORT").unwrap_or_else(|_| "9721".to_string());

        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| {
            dirs::data_local_dir()
                .map(|d| d.join("vectorlib").to_string_lossy().to_string())
                .unwrap_or_else(|| ".vectorlib-data".to_string())
        });

        let embedder_model =
            std::env::var("EMBEDDER_MODEL").unwrap_or_else(|_| "embed-english-v3.0".to_string());

        let embedder_base_url =
            std::env::var("EMBEDDER_BASE_URL").unwrap_or_else(|_| "https://api.cohere.ai".to_string());

        Ok(Self {
            listen_addr: format!("127.0.0.1:{}", port),
            data_dir,
            embedder_api_key,
            embedder_model,
            embedder_base_url,
        })
    }
}
