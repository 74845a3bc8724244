use std::path::{Path, PathBuf};

use anyhow::Context;
use prudent_fetch::{AllowFlags, ClientConfig, ResolverOptions};
use serde::Deserialize;

/// Contents of the optional configuration file.
///
/// ```toml
/// [client]
/// connect_timeout_ms = 5000
/// user_agent = "validator/1.0"
///
/// [resolver]
/// size_limit = 2097152
/// request_limit = 20
///
/// [resolver.allow]
/// rnc = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub client: ClientConfig,
    pub resolver: ResolverOptions,
}

impl Settings {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("invalid configuration in {}", path.display()))
    }
}

#[derive(Debug, clap::Parser)]
#[command(version, about = "Fetch external document references with size and request limits")]
pub struct Args {
    /// TOML file with [client] and [resolver] tables.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Largest accepted body in bytes, before and after decompression.
    #[arg(long, value_name = "BYTES")]
    pub size_limit: Option<u64>,

    /// Number of requests this run may attempt.
    #[arg(long, value_name = "N")]
    pub max_requests: Option<u32>,

    /// Accept unexpected content types with a warning.
    #[arg(long)]
    pub lax: bool,

    #[arg(long)]
    pub allow_html: bool,

    #[arg(long)]
    pub allow_xhtml: bool,

    #[arg(long)]
    pub allow_rnc: bool,

    /// Accept every `+xml` media type.
    #[arg(long)]
    pub allow_known_xml: bool,

    /// Reject application/xml and text/xml.
    #[arg(long)]
    pub no_generic_xml: bool,

    /// Connect timeout in milliseconds; 0 disables it.
    #[arg(long, value_name = "MS")]
    pub connect_timeout: Option<u64>,

    /// Request timeout in milliseconds; 0 disables it.
    #[arg(long, value_name = "MS")]
    pub socket_timeout: Option<u64>,

    /// Public identifier passed along with every system identifier.
    #[arg(long, value_name = "ID")]
    pub public_id: Option<String>,

    /// Absolute http or https URIs to fetch, in order.
    #[arg(required = true, value_name = "SYSTEM_ID")]
    pub system_ids: Vec<String>,
}

impl Args {
    /// Flags win over the file, the file wins over defaults.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        let mut settings = match self.config {
            Some(ref path) => Settings::load(path)?,
            None => Settings::default(),
        };

        let client = &mut settings.client;
        if let Some(ms) = self.connect_timeout {
            client.connect_timeout_ms = ms;
        }
        if let Some(ms) = self.socket_timeout {
            client.socket_timeout_ms = ms;
        }

        let resolver = &mut settings.resolver;
        if self.size_limit.is_some() {
            resolver.size_limit = self.size_limit;
        }
        if self.max_requests.is_some() {
            resolver.request_limit = self.max_requests;
        }
        resolver.lax_content_type |= self.lax;
        resolver.allow = self.overlay(resolver.allow);

        Ok(settings)
    }

    fn overlay(&self, mut allow: AllowFlags) -> AllowFlags {
        allow.html |= self.allow_html;
        allow.xhtml |= self.allow_xhtml;
        allow.rnc |= self.allow_rnc;
        allow.accept_all_known_xml_types |= self.allow_known_xml;
        if self.no_generic_xml {
            allow.generic_xml = false;
        }
        allow
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::Parser;
    use tempfile::NamedTempFile;

    use super::*;

    fn config_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_without_config() {
        let args = Args::parse_from(["prudent", "http://example.org/a.dtd"]);
        let settings = args.settings().unwrap();

        assert_eq!(settings, Settings::default());
        assert_eq!(args.system_ids, vec!["http://example.org/a.dtd"]);
    }

    #[test]
    fn test_loads_config_file() {
        let file = config_file(
            r#"
            [client]
            connect_timeout_ms = 2500
            user_agent = "checker/2"

            [resolver]
            size_limit = 4096
            request_limit = 3

            [resolver.allow]
            rnc = true
            "#,
        );
        let path = file.path().to_str().unwrap();
        let args = Args::parse_from(["prudent", "--config", path, "http://example.org/a.rnc"]);
        let settings = args.settings().unwrap();

        assert_eq!(settings.client.connect_timeout_ms, 2500);
        assert_eq!(settings.client.user_agent.as_deref(), Some("checker/2"));
        assert_eq!(settings.client.max_redirects, 20);
        assert_eq!(settings.resolver.size_limit, Some(4096));
        assert_eq!(settings.resolver.request_limit, Some(3));
        assert!(settings.resolver.allow.rnc);
        assert!(settings.resolver.allow.generic_xml);
    }

    #[test]
    fn test_flags_override_config_file() {
        let file = config_file("[resolver]\nsize_limit = 4096\nrequest_limit = 3\n");
        let path = file.path().to_str().unwrap();
        let args = Args::parse_from([
            "prudent",
            "--config",
            path,
            "--size-limit",
            "100",
            "--allow-html",
            "--no-generic-xml",
            "--lax",
            "http://example.org/a.html",
        ]);
        let settings = args.settings().unwrap();

        assert_eq!(settings.resolver.size_limit, Some(100));
        assert_eq!(settings.resolver.request_limit, Some(3));
        assert!(settings.resolver.lax_content_type);
        assert!(settings.resolver.allow.is_only_html_allowed());
    }

    #[test]
    fn test_bad_config_names_the_file() {
        let file = config_file("[resolver]\nsize_limit = \"big\"\n");
        let err = Settings::load(file.path()).unwrap_err();

        assert!(format!("{err:#}").contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_requires_a_system_id() {
        assert!(Args::try_parse_from(["prudent"]).is_err());
    }
}
