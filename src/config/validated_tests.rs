//! Tests for validated configuration.

use std::time::Duration;

use super::ConfigError;
use super::cli::Cli;
use super::defaults;
use super::toml::TomlConfig;
use super::validated::{ValidatedConfig, init_output_path, write_default_config};

/// Helper to create CLI args from a slice; `health` is appended as the subcommand.
fn cli(args: &[&str]) -> Cli {
    let mut full_args = vec!["iv-ingestion"];
    full_args.extend(args);
    full_args.push("health");
    Cli::parse_from_iter(full_args)
}

/// Helper to parse TOML config
fn toml(content: &str) -> TomlConfig {
    TomlConfig::parse(content).unwrap()
}

mod defaults_applied {
    use super::*;

    #[test]
    fn no_sources_yields_defaults() {
        let config = ValidatedConfig::from_raw(&cli(&[]), None).unwrap();

        assert_eq!(config.client.base_url, defaults::BASE_URL);
        assert_eq!(config.client.timeout, Duration::from_secs(30));
        assert_eq!(config.client.retry.max_retries, 3);
        assert_eq!(config.client.retry.base_delay, Duration::from_secs(1));
        assert!(config.client.api_key.is_none());
        assert!(config.client.token.is_none());
        assert!(!config.client.debug);
        assert!(config.client.headers.is_empty());
        assert!(config.source.is_none());
    }
}

mod precedence {
    use super::*;

    #[test]
    fn toml_overrides_defaults() {
        let toml = toml(
            r#"
            [api]
            base_url = "https://toml.example.com/v1"
            api_key = "toml-key"
            timeout = 60

            [retry]
            max_retries = 1
            base_delay = 0.5
            "#,
        );

        let config = ValidatedConfig::from_raw(&cli(&[]), Some(&toml)).unwrap();

        assert_eq!(config.client.base_url, "https://toml.example.com/v1");
        assert_eq!(config.client.api_key.as_deref(), Some("toml-key"));
        assert_eq!(config.client.timeout, Duration::from_secs(60));
        assert_eq!(config.client.retry.max_retries, 1);
        assert_eq!(config.client.retry.base_delay, Duration::from_millis(500));
    }

    #[test]
    fn cli_overrides_toml() {
        let toml = toml(
            r#"
            [api]
            base_url = "https://toml.example.com/v1"
            api_key = "toml-key"
            token = "toml-token"
            timeout = 60

            [retry]
            max_retries = 1
            "#,
        );
        let cli = cli(&[
            "--base-url",
            "https://cli.example.com/v1",
            "--api-key",
            "cli-key",
            "--token",
            "cli-token",
            "--timeout",
            "5",
            "--retry-max",
            "0",
        ]);

        let config = ValidatedConfig::from_raw(&cli, Some(&toml)).unwrap();

        assert_eq!(config.client.base_url, "https://cli.example.com/v1");
        assert_eq!(config.client.api_key.as_deref(), Some("cli-key"));
        assert_eq!(config.client.token.as_deref(), Some("cli-token"));
        assert_eq!(config.client.timeout, Duration::from_secs(5));
        assert_eq!(config.client.retry.max_retries, 0);
    }

    #[test]
    fn debug_is_or_of_sources() {
        let on = toml("[api]\ndebug = true");
        let off = toml("[api]\ndebug = false");

        assert!(ValidatedConfig::from_raw(&cli(&[]), Some(&on)).unwrap().client.debug);
        assert!(
            ValidatedConfig::from_raw(&cli(&["--debug"]), Some(&off))
                .unwrap()
                .client
                .debug
        );
        assert!(!ValidatedConfig::from_raw(&cli(&[]), Some(&off)).unwrap().client.debug);
    }

    #[test]
    fn headers_merge_with_cli_winning() {
        let toml = toml(
            r#"
            [api.headers]
            X-Tenant = "toml"
            X-Region = "eu"
            "#,
        );
        let cli = cli(&["--header", "X-Tenant=cli", "--header", "X-Trace: 1"]);

        let config = ValidatedConfig::from_raw(&cli, Some(&toml)).unwrap();
        let headers = &config.client.headers;

        assert_eq!(headers.len(), 3);
        assert_eq!(headers["x-tenant"], "cli");
        assert_eq!(headers["x-region"], "eu");
        assert_eq!(headers["x-trace"], "1");
    }

    #[test]
    fn verbose_comes_from_cli() {
        let config = ValidatedConfig::from_raw(&cli(&["--verbose"]), None).unwrap();
        assert!(config.verbose);
    }
}

mod validation {
    use super::*;

    #[test]
    fn malformed_url_rejected() {
        let result = ValidatedConfig::from_raw(&cli(&["--base-url", "not a url"]), None);
        assert!(matches!(result, Err(ConfigError::InvalidUrl { .. })));
    }

    #[test]
    fn non_http_scheme_rejected() {
        let result = ValidatedConfig::from_raw(&cli(&["--base-url", "ftp://example.com"]), None);

        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
        assert!(err.to_string().contains("ftp"));
    }

    #[test]
    fn zero_timeout_rejected() {
        let result = ValidatedConfig::from_raw(&cli(&["--timeout", "0"]), None);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidDuration {
                field: "timeout",
                ..
            })
        ));
    }

    #[test]
    fn negative_retry_delay_rejected() {
        let toml = toml("[retry]\nbase_delay = -1.0");
        let result = ValidatedConfig::from_raw(&cli(&[]), Some(&toml));

        assert!(matches!(
            result,
            Err(ConfigError::InvalidDuration {
                field: "retry_delay",
                ..
            })
        ));
    }

    #[test]
    fn zero_retry_delay_allowed() {
        let config = ValidatedConfig::from_raw(&cli(&["--retry-delay", "0"]), None).unwrap();
        assert_eq!(config.client.retry.base_delay, Duration::ZERO);
    }

    #[test]
    fn header_without_separator_rejected() {
        let result = ValidatedConfig::from_raw(&cli(&["--header", "NoSeparator"]), None);
        assert!(matches!(result, Err(ConfigError::InvalidHeader { .. })));
    }

    #[test]
    fn invalid_header_name_rejected() {
        let result = ValidatedConfig::from_raw(&cli(&["--header", "Bad Name=value"]), None);
        assert!(matches!(result, Err(ConfigError::InvalidHeaderName { .. })));
    }

    #[test]
    fn invalid_header_value_rejected() {
        let toml = toml("[api.headers]\nX-Bad = \"line\\nbreak\"");
        let result = ValidatedConfig::from_raw(&cli(&[]), Some(&toml));

        assert!(matches!(result, Err(ConfigError::InvalidHeaderValue { .. })));
    }
}

mod loading {
    use super::*;

    #[test]
    fn load_reads_explicit_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("iv.toml");
        std::fs::write(&path, "[api]\napi_key = \"file-key\"\n").unwrap();
        let path_str = path.to_str().unwrap();

        let config = ValidatedConfig::load(&cli(&["--config", path_str])).unwrap();

        assert_eq!(config.client.api_key.as_deref(), Some("file-key"));
        assert_eq!(config.source.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn load_fails_for_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        let result = ValidatedConfig::load(&cli(&["--config", path.to_str().unwrap()]));
        assert!(matches!(result, Err(ConfigError::FileRead { .. })));
    }

    #[test]
    fn write_default_config_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        write_default_config(&path).unwrap();

        let written = TomlConfig::load(&path).unwrap();
        assert_eq!(written.api.timeout, Some(30));
    }

    #[test]
    fn init_output_prefers_explicit_path() {
        let explicit = std::path::Path::new("custom.toml");
        assert_eq!(init_output_path(Some(explicit)).unwrap(), explicit);
    }
}

mod display {
    use super::*;

    #[test]
    fn display_hides_secrets() {
        let cli = cli(&["--api-key", "super-secret-key", "--token", "super-secret-token"]);
        let config = ValidatedConfig::from_raw(&cli, None).unwrap();

        let shown = config.to_string();

        assert!(shown.contains("auth: token"));
        assert!(!shown.contains("super-secret"));
        assert!(shown.contains(defaults::BASE_URL));
    }
}
