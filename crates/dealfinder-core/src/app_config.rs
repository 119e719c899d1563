use std::net::SocketAddr;
use std::path::PathBuf;

/// Fully resolved process configuration. Built once at startup and passed
/// by reference into every client constructor; nothing reads the
/// environment after this point.
#[derive(Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub serpapi_api_key: String,
    pub serpapi_base_url: String,
    /// `None` when no judge credential is configured. Exact-match searches
    /// then degrade to provider results.
    pub judge: Option<JudgeSettings>,
    /// `None` unless both the vision key and a full Cloudinary credential
    /// set are present.
    pub scan: Option<ScanSettings>,
    pub upload_dir: PathBuf,
    pub regions_path: Option<PathBuf>,
}

#[derive(Clone)]
pub struct JudgeSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
}

#[derive(Clone)]
pub struct ScanSettings {
    pub vision: VisionSettings,
    pub storage: CloudinarySettings,
}

#[derive(Clone)]
pub struct VisionSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

#[derive(Clone)]
pub struct CloudinarySettings {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub base_url: String,
    pub folder: String,
}

const REDACTED: &str = "[redacted]";

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("serpapi_api_key", &REDACTED)
            .field("serpapi_base_url", &self.serpapi_base_url)
            .field("judge", &self.judge)
            .field("scan", &self.scan)
            .field("upload_dir", &self.upload_dir)
            .field("regions_path", &self.regions_path)
            .finish()
    }
}

impl std::fmt::Debug for JudgeSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JudgeSettings")
            .field("api_key", &REDACTED)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl std::fmt::Debug for ScanSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanSettings")
            .field("vision", &self.vision)
            .field("storage", &self.storage)
            .finish()
    }
}

impl std::fmt::Debug for VisionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisionSettings")
            .field("api_key", &REDACTED)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl std::fmt::Debug for CloudinarySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinarySettings")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &REDACTED)
            .field("api_secret", &REDACTED)
            .field("base_url", &self.base_url)
            .field("folder", &self.folder)
            .finish()
    }
}
