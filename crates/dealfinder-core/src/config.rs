use crate::app_config::{
    AppConfig, CloudinarySettings, JudgeSettings, ScanSettings, VisionSettings,
};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a plain
/// `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    // Blank values count as unset so an empty line in `.env` does not
    // silently enable a half-configured integration.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let require = |var: &str| -> Result<String, ConfigError> {
        optional(var).ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        optional(var).unwrap_or_else(|| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let serpapi_api_key = require("SERP_API_KEY")?;

    let bind_addr = parse_addr("DEALFINDER_BIND_ADDR", "0.0.0.0:5000")?;
    let log_level = or_default("DEALFINDER_LOG_LEVEL", "info");
    let request_timeout_secs = parse_u64("DEALFINDER_REQUEST_TIMEOUT_SECS", "30")?;
    if request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "DEALFINDER_REQUEST_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    let user_agent = or_default("DEALFINDER_USER_AGENT", "dealfinder/0.1 (product-search)");
    let serpapi_base_url = or_default("DEALFINDER_SERPAPI_BASE_URL", "https://serpapi.com");

    let judge = match optional("PERPLEXITY_API_KEY") {
        Some(api_key) => Some(JudgeSettings {
            api_key,
            base_url: or_default("DEALFINDER_JUDGE_BASE_URL", "https://api.perplexity.ai"),
            model: or_default("DEALFINDER_JUDGE_MODEL", "sonar"),
            temperature: parse_temperature(&or_default("DEALFINDER_JUDGE_TEMPERATURE", "0.2"))?,
        }),
        None => None,
    };

    let storage = build_cloudinary_settings(
        optional("CLOUDINARY_CLOUD_NAME"),
        optional("CLOUDINARY_API_KEY"),
        optional("CLOUDINARY_API_SECRET"),
        or_default("DEALFINDER_CLOUDINARY_BASE_URL", "https://api.cloudinary.com"),
        or_default("DEALFINDER_CLOUDINARY_FOLDER", "dealfinder"),
    )?;

    let vision = optional("GOOGLE_API_KEY").map(|api_key| VisionSettings {
        api_key,
        base_url: or_default(
            "DEALFINDER_VISION_BASE_URL",
            "https://generativelanguage.googleapis.com",
        ),
        model: or_default("DEALFINDER_VISION_MODEL", "gemini-1.5-pro"),
    });

    let scan = match (vision, storage) {
        (Some(vision), Some(storage)) => Some(ScanSettings { vision, storage }),
        _ => None,
    };

    let upload_dir = optional("DEALFINDER_UPLOAD_DIR").map_or_else(std::env::temp_dir, PathBuf::from);
    let regions_path = optional("DEALFINDER_REGIONS_PATH").map(PathBuf::from);

    Ok(AppConfig {
        bind_addr,
        log_level,
        request_timeout_secs,
        user_agent,
        serpapi_api_key,
        serpapi_base_url,
        judge,
        scan,
        upload_dir,
        regions_path,
    })
}

/// Cloudinary credentials are all-or-none: a partial set is almost always a
/// deployment mistake and should fail loudly at startup.
fn build_cloudinary_settings(
    cloud_name: Option<String>,
    api_key: Option<String>,
    api_secret: Option<String>,
    base_url: String,
    folder: String,
) -> Result<Option<CloudinarySettings>, ConfigError> {
    match (cloud_name, api_key, api_secret) {
        (Some(cloud_name), Some(api_key), Some(api_secret)) => Ok(Some(CloudinarySettings {
            cloud_name,
            api_key,
            api_secret,
            base_url,
            folder,
        })),
        (None, None, None) => Ok(None),
        (cloud_name, api_key, api_secret) => {
            let missing: Vec<&str> = [
                ("CLOUDINARY_CLOUD_NAME", cloud_name.is_none()),
                ("CLOUDINARY_API_KEY", api_key.is_none()),
                ("CLOUDINARY_API_SECRET", api_secret.is_none()),
            ]
            .into_iter()
            .filter_map(|(var, is_missing)| is_missing.then_some(var))
            .collect();
            Err(ConfigError::Validation(format!(
                "incomplete Cloudinary credentials; missing {}",
                missing.join(", ")
            )))
        }
    }
}

fn parse_temperature(raw: &str) -> Result<f32, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar {
        var: "DEALFINDER_JUDGE_TEMPERATURE".to_string(),
        reason,
    };
    let value = raw.parse::<f32>().map_err(|e| invalid(e.to_string()))?;
    if !value.is_finite() || !(0.0..=2.0).contains(&value) {
        return Err(invalid(format!("{value} is outside 0.0..=2.0")));
    }
    Ok(value)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
