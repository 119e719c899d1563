//! Command handlers. Each builds only the clients it needs from the shared
//! config and prints its result as pretty JSON on stdout.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use dealfinder_core::{load_region_table, AppConfig, RegionCode, RegionTable, SearchRequest};
use dealfinder_search::SearchService;
use dealfinder_vision::{mime_type_for_path, ImageBlob, ImageScanner};

pub const MAX_IMAGES: usize = 3;

fn build_search(config: &AppConfig) -> anyhow::Result<Arc<SearchService>> {
    let regions = Arc::new(load_region_table(config.regions_path.as_deref())?);
    Ok(Arc::new(SearchService::from_config(config, regions)?))
}

pub(crate) async fn run_search(
    config: &AppConfig,
    query: &str,
    exact: bool,
    region: Option<&str>,
) -> anyhow::Result<()> {
    let service = build_search(config)?;
    let request = SearchRequest::new(query, exact, RegionCode::from_param(region));
    let response = service.search(&request).await?;
    tracing::info!(
        region = %response.region,
        count = response.products.len(),
        data_source = response.data_source.as_str(),
        "search complete"
    );
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

pub(crate) async fn run_scan(
    config: &AppConfig,
    files: &[PathBuf],
    region: Option<&str>,
) -> anyhow::Result<()> {
    let search = build_search(config)?;
    let scanner = ImageScanner::from_config(config, search)?.context(
        "image scanning is not configured; set GOOGLE_API_KEY and the CLOUDINARY_* variables",
    )?;

    let images = read_images(files)?;
    tracing::info!(images = images.len(), "scanning images");
    let result = scanner.scan(&images, RegionCode::from_param(region)).await?;
    tracing::info!(
        keyword = %result.detected_keyword,
        count = result.search.products.len(),
        "scan complete"
    );
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

pub(crate) fn run_regions(config: &AppConfig) -> anyhow::Result<()> {
    let table = load_region_table(config.regions_path.as_deref())?;
    println!("{}", serde_json::to_string_pretty(&region_listing(&table))?);
    Ok(())
}

fn region_listing(table: &RegionTable) -> serde_json::Value {
    table
        .iter()
        .map(|(code, descriptor)| {
            (
                code.to_string(),
                serde_json::json!({
                    "search_domain": descriptor.search_domain,
                    "locale": descriptor.locale,
                }),
            )
        })
        .collect::<serde_json::Map<_, _>>()
        .into()
}

fn read_images(files: &[PathBuf]) -> anyhow::Result<Vec<ImageBlob>> {
    files.iter().map(PathBuf::as_path).map(read_image).collect()
}

fn read_image(path: &Path) -> anyhow::Result<ImageBlob> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_owned);
    Ok(ImageBlob::new(bytes, Some(mime_type_for_path(path)), file_name))
}
