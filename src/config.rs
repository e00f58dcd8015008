use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use chrono::NaiveDate;

use crate::assets::template::resolve_template;
use crate::delivery::whatsapp::{DEFAULT_GRAPH_BASE_URL, WhatsAppConfig};
use crate::foundation::error::{CardError, CardResult};
use crate::layout::plan::StyleConfig;
use crate::people::directory::{DEFAULT_DIRECTORY_BASE_URL, DirectoryConfig};

/// Timeout for directory reads and message sends.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Timeout for media uploads.
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(60);
/// Planning Center list holding anniversary candidates.
pub const DEFAULT_ANNIVERSARY_LIST_ID: &str = "4700166";

/// Raw credential values, as read from flags or the environment.
#[derive(Clone, Debug, Default)]
pub struct Credentials {
    /// `PC_APP_ID`.
    pub pc_app_id: Option<String>,
    /// `PC_SECRET`.
    pub pc_secret: Option<String>,
    /// `WHATSAPP_API_TOKEN`.
    pub whatsapp_api_token: Option<String>,
    /// `WHATSAPP_PHONE_NUMBER_ID`.
    pub whatsapp_phone_number_id: Option<String>,
    /// `TARGET_PHONE_NUMBER`.
    pub target_phone_number: Option<String>,
}

impl Credentials {
    /// Variables that are unset or blank, in a fixed order.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("PC_APP_ID", &self.pc_app_id),
            ("PC_SECRET", &self.pc_secret),
            ("WHATSAPP_API_TOKEN", &self.whatsapp_api_token),
            ("WHATSAPP_PHONE_NUMBER_ID", &self.whatsapp_phone_number_id),
            ("TARGET_PHONE_NUMBER", &self.target_phone_number),
        ]
        .into_iter()
        .filter(|(_, v)| v.as_deref().is_none_or(|s| s.trim().is_empty()))
        .map(|(name, _)| name)
        .collect()
    }
}

/// Remote endpoints; overridable so tests can point at a local server.
#[derive(Clone, Debug)]
pub struct Endpoints {
    /// Planning Center People API root.
    pub directory_base_url: String,
    /// Graph API root.
    pub graph_base_url: String,
    /// List holding anniversary candidates.
    pub anniversary_list_id: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            directory_base_url: DEFAULT_DIRECTORY_BASE_URL.to_owned(),
            graph_base_url: DEFAULT_GRAPH_BASE_URL.to_owned(),
            anniversary_list_id: DEFAULT_ANNIVERSARY_LIST_ID.to_owned(),
        }
    }
}

/// File locations used by a run.
#[derive(Clone, Debug)]
pub struct PathsConfig {
    /// Directory holding template images.
    pub template_dir: PathBuf,
    /// Template file name inside `template_dir`.
    pub template_name: String,
    /// Face for names and the date.
    pub font_regular: PathBuf,
    /// Face for section headers.
    pub font_bold: PathBuf,
    /// Output image; the extension selects JPEG or PNG.
    pub out: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            template_dir: PathBuf::from("postcard"),
            template_name: "felicidades.png".to_owned(),
            font_regular: PathBuf::from("fonts/Lora-Regular.ttf"),
            font_bold: PathBuf::from("fonts/Lora-Bold.ttf"),
            out: PathBuf::from("combined_celebrations.jpg"),
        }
    }
}

impl PathsConfig {
    /// Full path of the template image.
    pub fn template_path(&self) -> CardResult<PathBuf> {
        resolve_template(&self.template_dir, &self.template_name)
    }
}

/// Everything a run needs, built once at startup and passed by reference.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Directory client settings.
    pub directory: DirectoryConfig,
    /// Messaging client settings.
    pub messaging: WhatsAppConfig,
    /// File locations.
    pub paths: PathsConfig,
    /// Postcard layout parameters.
    pub style: StyleConfig,
}

impl AppConfig {
    /// Validate credentials and assemble client settings.
    ///
    /// Fails with [`CardError::Config`] naming every missing variable at once.
    pub fn build(
        credentials: Credentials,
        endpoints: Endpoints,
        paths: PathsConfig,
        style: StyleConfig,
    ) -> CardResult<Self> {
        let missing = credentials.missing();
        if !missing.is_empty() {
            return Err(CardError::config(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        }
        style.validate()?;

        let Credentials {
            pc_app_id,
            pc_secret,
            whatsapp_api_token,
            whatsapp_phone_number_id,
            target_phone_number,
        } = credentials;

        Ok(Self {
            directory: DirectoryConfig {
                base_url: endpoints.directory_base_url,
                app_id: pc_app_id.unwrap_or_default(),
                secret: pc_secret.unwrap_or_default(),
                anniversary_list_id: endpoints.anniversary_list_id,
                timeout: REQUEST_TIMEOUT,
            },
            messaging: WhatsAppConfig {
                base_url: endpoints.graph_base_url,
                api_token: whatsapp_api_token.unwrap_or_default(),
                phone_number_id: whatsapp_phone_number_id.unwrap_or_default(),
                recipient: target_phone_number.unwrap_or_default(),
                send_timeout: REQUEST_TIMEOUT,
                upload_timeout: UPLOAD_TIMEOUT,
            },
            paths,
            style,
        })
    }
}

/// Read a [`StyleConfig`] from JSON; absent fields keep their defaults.
pub fn load_style(path: &Path) -> CardResult<StyleConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read style file '{}'", path.display()))?;
    let style: StyleConfig = serde_json::from_str(&text)
        .map_err(|e| CardError::config(format!("invalid style file '{}': {e}", path.display())))?;
    style.validate()?;
    Ok(style)
}

/// Parse an explicit `YYYY-MM-DD` run date, or use the local date.
pub fn run_date(explicit: Option<&str>) -> CardResult<NaiveDate> {
    match explicit {
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map_err(|e| CardError::config(format!("invalid --date {s:?}: {e}"))),
        None => Ok(chrono::Local::now().date_naive()),
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
