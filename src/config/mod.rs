//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{net::SocketAddr, path::PathBuf, str::FromStr};

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "vetrina";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PUBLIC_PORT: u16 = 3000;
const DEFAULT_PAGES_LOCATION: &str = "content/pages.json";
const DEFAULT_PRODUCTS_LOCATION: &str = "content/products.json";
const DEFAULT_PAGE_KEY: &str = "home";
const DEFAULT_PUBLIC_URL: &str = "http://127.0.0.1:3000";
const DEFAULT_SITE_TITLE: &str = "Vetrina";
const DEFAULT_MAIL_FROM: &str = "vetrina@localhost";

/// Command-line arguments for the Vetrina binary.
#[derive(Debug, Parser)]
#[command(name = "vetrina", version, about = "Vetrina brochure-site server")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "VETRINA_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the Vetrina HTTP service.
    Serve(Box<ServeArgs>),
    /// Load and validate the content documents, then exit.
    Check(CheckArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ContentOverrides {
    /// Override the pages document location (URL or file path).
    #[arg(long = "content-pages", value_name = "LOCATION")]
    pub pages: Option<String>,

    /// Override the product catalog location (URL or file path).
    #[arg(long = "content-products", value_name = "LOCATION")]
    pub products: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub content: ContentOverrides,

    /// Override the public listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the public listener port.
    #[arg(long = "server-public-port", value_name = "PORT")]
    pub public_port: Option<u16>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the public site URL used for canonical links and origin checks.
    #[arg(long = "site-public-url", value_name = "URL")]
    pub site_public_url: Option<String>,

    /// Override the mail delivery endpoint URL.
    #[arg(long = "mail-endpoint", value_name = "URL")]
    pub mail_endpoint: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct CheckArgs {
    #[command(flatten)]
    pub content: ContentOverrides,
}

/// Fully-resolved deployment settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub content: ContentSettings,
    pub site: SiteSettings,
    pub mail: MailSettings,
    pub relay: RelaySettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub public_addr: SocketAddr,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

/// Where a content document lives: an HTTP(S) URL or a filesystem path.
#[derive(Debug, Clone)]
pub enum ContentLocation {
    Url(Url),
    Path(PathBuf),
}

impl ContentLocation {
    fn parse(value: &str, key: &'static str) -> Result<Self, LoadError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(LoadError::invalid(key, "location must not be empty"));
        }
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            let url = Url::parse(trimmed)
                .map_err(|err| LoadError::invalid(key, format!("invalid URL: {err}")))?;
            Ok(Self::Url(url))
        } else {
            Ok(Self::Path(PathBuf::from(trimmed)))
        }
    }
}

impl std::fmt::Display for ContentLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Url(url) => write!(f, "{url}"),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContentSettings {
    pub pages: ContentLocation,
    pub products: ContentLocation,
    pub default_page: String,
}

#[derive(Debug, Clone)]
pub struct SiteSettings {
    pub public_url: Url,
    pub title: String,
    pub contact_email: Option<String>,
    pub display_email: Option<String>,
}

impl SiteSettings {
    /// The ASCII origin of the public URL, compared against `Origin` headers.
    pub fn public_origin(&self) -> String {
        self.public_url.origin().ascii_serialization()
    }
}

#[derive(Debug, Clone)]
pub struct MailSettings {
    pub endpoint: Option<Url>,
    pub from: String,
    pub to: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RelaySettings {
    /// Page keys the relay endpoint accepts submissions for.
    pub pages: Vec<String>,
}

impl RelaySettings {
    pub fn allows(&self, page_key: &str) -> bool {
        self.pages.iter().any(|key| key == page_key)
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("VETRINA").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::Serve(args)) => raw.apply_serve_overrides(&args.overrides),
        Some(Command::Check(args)) => raw.apply_content_overrides(&args.content),
        None => raw.apply_serve_overrides(&ServeOverrides::default()),
    }

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    server: RawServerSettings,
    logging: RawLoggingSettings,
    content: RawContentSettings,
    site: RawSiteSettings,
    mail: RawMailSettings,
    relay: RawRelaySettings,
}

impl RawSettings {
    fn apply_serve_overrides(&mut self, overrides: &ServeOverrides) {
        if let Some(host) = overrides.server_host.as_ref() {
            self.server.host = Some(host.clone());
        }
        if let Some(port) = overrides.public_port {
            self.server.public_port = Some(port);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(url) = overrides.site_public_url.as_ref() {
            self.site.public_url = Some(url.clone());
        }
        if let Some(url) = overrides.mail_endpoint.as_ref() {
            self.mail.endpoint = Some(url.clone());
        }

        self.apply_content_overrides(&overrides.content);
    }

    fn apply_content_overrides(&mut self, overrides: &ContentOverrides) {
        if let Some(pages) = overrides.pages.as_ref() {
            self.content.pages = Some(pages.clone());
        }
        if let Some(products) = overrides.products.as_ref() {
            self.content.products = Some(products.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            server,
            logging,
            content,
            site,
            mail,
            relay,
        } = raw;

        let server = build_server_settings(server)?;
        let logging = build_logging_settings(logging)?;
        let content = build_content_settings(content)?;
        let site = build_site_settings(site)?;
        let mail = build_mail_settings(mail)?;
        let relay = build_relay_settings(relay)?;

        Ok(Self {
            server,
            logging,
            content,
            site,
            mail,
            relay,
        })
    }
}

fn build_server_settings(server: RawServerSettings) -> Result<ServerSettings, LoadError> {
    let host = server.host.unwrap_or_else(|| DEFAULT_HOST.to_string());

    let public_port = server.public_port.unwrap_or(DEFAULT_PUBLIC_PORT);
    if public_port == 0 {
        return Err(LoadError::invalid(
            "server.public_port",
            "port must be greater than zero",
        ));
    }

    let public_addr = parse_socket_addr(&host, public_port)
        .map_err(|reason| LoadError::invalid("server.public_addr", reason))?;

    Ok(ServerSettings { public_addr })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_content_settings(content: RawContentSettings) -> Result<ContentSettings, LoadError> {
    let pages = content
        .pages
        .unwrap_or_else(|| DEFAULT_PAGES_LOCATION.to_string());
    let products = content
        .products
        .unwrap_or_else(|| DEFAULT_PRODUCTS_LOCATION.to_string());

    let default_page = content
        .default_page
        .unwrap_or_else(|| DEFAULT_PAGE_KEY.to_string());
    if default_page.trim().is_empty() {
        return Err(LoadError::invalid(
            "content.default_page",
            "page key must not be empty",
        ));
    }

    Ok(ContentSettings {
        pages: ContentLocation::parse(&pages, "content.pages")?,
        products: ContentLocation::parse(&products, "content.products")?,
        default_page,
    })
}

fn build_site_settings(site: RawSiteSettings) -> Result<SiteSettings, LoadError> {
    let public_url = site
        .public_url
        .unwrap_or_else(|| DEFAULT_PUBLIC_URL.to_string());
    let public_url = Url::parse(public_url.trim())
        .map_err(|err| LoadError::invalid("site.public_url", format!("invalid URL: {err}")))?;
    if !matches!(public_url.scheme(), "http" | "https") {
        return Err(LoadError::invalid(
            "site.public_url",
            "URL must use the http or https scheme",
        ));
    }

    let title = site.title.unwrap_or_else(|| DEFAULT_SITE_TITLE.to_string());

    let contact_email = non_empty(site.contact_email);
    let display_email = non_empty(site.display_email).or_else(|| contact_email.clone());

    Ok(SiteSettings {
        public_url,
        title,
        contact_email,
        display_email,
    })
}

fn build_mail_settings(mail: RawMailSettings) -> Result<MailSettings, LoadError> {
    let endpoint = match non_empty(mail.endpoint) {
        Some(value) => Some(Url::parse(&value).map_err(|err| {
            LoadError::invalid("mail.endpoint", format!("invalid URL: {err}"))
        })?),
        None => None,
    };

    let from = mail.from.unwrap_or_else(|| DEFAULT_MAIL_FROM.to_string());
    if from.trim().is_empty() {
        return Err(LoadError::invalid(
            "mail.from",
            "sender address must not be empty",
        ));
    }

    Ok(MailSettings {
        endpoint,
        from,
        to: non_empty(mail.to),
    })
}

fn build_relay_settings(relay: RawRelaySettings) -> Result<RelaySettings, LoadError> {
    let mut pages = Vec::new();
    for key in relay.pages.unwrap_or_default() {
        let trimmed = key.trim().to_string();
        if trimmed.is_empty() {
            return Err(LoadError::invalid(
                "relay.pages",
                "page keys must not be empty",
            ));
        }
        pages.push(trimmed);
    }

    Ok(RelaySettings { pages })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawServerSettings {
    host: Option<String>,
    public_port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawContentSettings {
    pages: Option<String>,
    products: Option<String>,
    default_page: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSiteSettings {
    public_url: Option<String>,
    title: Option<String>,
    contact_email: Option<String>,
    display_email: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawMailSettings {
    endpoint: Option<String>,
    from: Option<String>,
    to: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRelaySettings {
    pages: Option<Vec<String>>,
}

fn parse_socket_addr(host: &str, port: u16) -> Result<SocketAddr, String> {
    let candidate = format!("{host}:{port}");
    candidate
        .parse()
        .map_err(|err| format!("invalid address `{candidate}`: {err}"))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}
