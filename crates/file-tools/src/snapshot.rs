//! Web page snapshots as PDF
//!
//! A snapshot launches a headless browser for the single call, prints the
//! page to PDF and closes the browser again, whether or not rendering
//! succeeded.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use chrono::NaiveDate;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::error::{Result, ToolError};

/// Request to snapshot a web page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotRequest {
    /// Fully qualified URL, scheme included
    pub url: String,
    /// Output file name; derived from the URL host and today's date when absent
    #[serde(default)]
    pub file_name: Option<String>,
    /// Directory under the home root; a leading `/` is ignored
    #[serde(default = "default_dir_name")]
    pub dir_name: String,
}

fn default_dir_name() -> String {
    "/Downloads".to_string()
}

/// Renders a URL to a PDF file
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    async fn render_to_file(&self, url: &str, output: &Path) -> Result<()>;
}

/// Snapshot `request.url` into the home root.
///
/// Returns a confirmation naming the URL, directory and file name. The
/// output directory must already exist.
pub async fn snapshot<R>(home: &Path, renderer: &R, request: &SnapshotRequest) -> Result<String>
where
    R: PdfRenderer + ?Sized,
{
    let file_name = match &request.file_name {
        Some(name) => name.clone(),
        None => derive_file_name(&request.url, chrono::Local::now().date_naive())?,
    };

    let dir = home.join(request.dir_name.trim_start_matches('/'));
    let output = dir.join(&file_name);

    info!("Snapshotting {} to {}", request.url, output.display());
    renderer.render_to_file(&request.url, &output).await?;

    Ok(format!(
        "{} has been saved successfully to {} as {}",
        request.url,
        dir.display(),
        file_name
    ))
}

/// Build `{label}_snapshot_{MMDDYYYY}.pdf` from the URL host.
///
/// `label` is the second-to-last dot-separated label of the host, so
/// `www.example.com` gives `example`. Hosts with a single label fail.
pub fn derive_file_name(url: &str, date: NaiveDate) -> Result<String> {
    let parsed =
        url::Url::parse(url).map_err(|e| ToolError::InvalidUrl(url.to_string(), e.to_string()))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| ToolError::InvalidUrl(url.to_string(), "URL has no host".to_string()))?;

    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 {
        return Err(ToolError::InvalidUrl(
            url.to_string(),
            format!("host '{}' has no second-level domain", host),
        ));
    }
    let label = labels[labels.len() - 2];

    Ok(format!("{}_snapshot_{}.pdf", label, date.format("%m%d%Y")))
}

/// Headless Chrome renderer driven over the DevTools protocol
#[derive(Debug, Clone, Default)]
pub struct ChromeRenderer {
    chrome_executable: Option<PathBuf>,
    profile_root: Option<PathBuf>,
}

impl ChromeRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific Chrome/Chromium binary instead of auto-detection
    pub fn with_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_executable = Some(path.into());
        self
    }

    /// Create per-launch browser profiles under `dir` instead of the system temp dir
    pub fn with_profile_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.profile_root = Some(dir.into());
        self
    }

    /// Fresh profile directory for one launch, removed when dropped
    fn profile_dir(&self) -> Result<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("file-tools-chrome-");
        let dir = match &self.profile_root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        Ok(dir)
    }

    fn browser_config(&self, user_data_dir: &Path) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder().user_data_dir(user_data_dir);
        if let Some(path) = &self.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        builder.build().map_err(ToolError::Render)
    }
}

#[async_trait]
impl PdfRenderer for ChromeRenderer {
    async fn render_to_file(&self, url: &str, output: &Path) -> Result<()> {
        // Dropping the profile removes it, including when this future is
        // cancelled mid-render.
        let profile = self.profile_dir()?;
        let config = self.browser_config(profile.path())?;

        let (mut browser, mut handler) = Browser::launch(config).await?;
        let handle = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let result = print_page(&browser, url, output).await;

        if let Err(e) = browser.close().await {
            warn!("Failed to close browser: {}", e);
        }
        if let Err(e) = browser.wait().await {
            warn!("Failed to wait for browser exit: {}", e);
        }
        handle.abort();
        if let Err(e) = profile.close() {
            debug!("Could not remove browser profile: {}", e);
        }

        result
    }
}

async fn print_page(browser: &Browser, url: &str, output: &Path) -> Result<()> {
    let page = browser.new_page(url).await?;
    page.wait_for_navigation().await?;

    let pdf = page.pdf(PrintToPdfParams::default()).await?;
    debug!("Rendered {} bytes of PDF", pdf.len());

    tokio::fs::write(output, pdf).await?;
    Ok(())
}
