use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub storage: StorageConfig,
    pub mail: Option<MailConfig>,
    pub ocr: OcrConfig,
}

const DEFAULT_DATA_FILE: &str = "admission_data_v2.json";
const DEFAULT_BACKUP_FILE: &str = "admission_data_backup.json";
const DEFAULT_SMTP_PORT: u16 = 465;
const DEFAULT_OCR_DPI: u32 = 300;

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let storage = StorageConfig {
            data_file: env::var("ADMISSION_DATA_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_FILE)),
            backup_file: env::var("ADMISSION_BACKUP_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_BACKUP_FILE)),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            storage,
            mail: MailConfig::from_env()?,
            ocr: OcrConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Location of the persisted admission dataset and its mirror.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_file: PathBuf,
    pub backup_file: PathBuf,
}

/// Authenticated relay used for applicant notifications.
#[derive(Clone)]
pub struct MailConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub sender: String,
}

impl fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("sender", &self.sender)
            .finish()
    }
}

impl MailConfig {
    /// Mail stays disabled unless a relay host and credentials are all present.
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let (Ok(host), Ok(username), Ok(password)) = (
            env::var("SMTP_HOST"),
            env::var("SMTP_USERNAME"),
            env::var("SMTP_PASSWORD"),
        ) else {
            return Ok(None);
        };

        let port = match env::var("SMTP_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidSmtpPort)?,
            Err(_) => DEFAULT_SMTP_PORT,
        };
        let sender = env::var("SMTP_SENDER").unwrap_or_else(|_| username.clone());

        Ok(Some(Self {
            host,
            port,
            username,
            password,
            sender,
        }))
    }
}

/// External binaries driving the scanned-document fallback.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub pdftoppm_bin: PathBuf,
    pub tesseract_bin: PathBuf,
    pub dpi: u32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            pdftoppm_bin: PathBuf::from("pdftoppm"),
            tesseract_bin: PathBuf::from("tesseract"),
            dpi: DEFAULT_OCR_DPI,
        }
    }
}

impl OcrConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let dpi = match env::var("OCR_DPI") {
            Ok(raw) => match raw.parse::<u32>() {
                Ok(dpi) if dpi > 0 => dpi,
                _ => return Err(ConfigError::InvalidOcrDpi),
            },
            Err(_) => defaults.dpi,
        };

        Ok(Self {
            pdftoppm_bin: env::var("OCR_PDFTOPPM_BIN")
                .map(PathBuf::from)
                .unwrap_or(defaults.pdftoppm_bin),
            tesseract_bin: env::var("OCR_TESSERACT_BIN")
                .map(PathBuf::from)
                .unwrap_or(defaults.tesseract_bin),
            dpi,
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidSmtpPort,
    InvalidOcrDpi,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidSmtpPort => write!(f, "SMTP_PORT must be a valid u16"),
            ConfigError::InvalidOcrDpi => write!(f, "OCR_DPI must be a positive integer"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidSmtpPort
            | ConfigError::InvalidOcrDpi => None,
        }
    }
}
