//! Init command implementation
//!
//! Scaffolds a new Sift project: `sift.toml`, `.env.example` and a dataset
//! directory holding one sample entry.

use super::output::Output;
use crate::sources::{DatasetEntry, DatasetSource, DirectoryDataset};
use std::fs;
use std::path::{Path, PathBuf};

/// Result of the init operation
#[derive(Debug, PartialEq)]
pub enum InitResult {
    /// Initialization completed successfully
    Success,
    /// Project already exists (sift.toml found)
    AlreadyExists,
    /// An error occurred during initialization
    Error(String),
}

/// Configuration for the init command
pub struct InitConfig {
    /// Directory to initialize
    pub path: PathBuf,
    /// Overwrite existing files
    pub force: bool,
    /// Host address for the server
    pub host: String,
    /// Port for the server
    pub port: u16,
}

/// Query of the bundled sample dataset entry
pub const SAMPLE_QUERY: &str = "Ukraine Krieg";

/// Run the init command
pub fn run(config: InitConfig, output: &Output) -> InitResult {
    output.banner();
    output.header("Initializing Sift Project");

    let base_path = &config.path;

    let config_path = base_path.join("sift.toml");
    if config_path.exists() && !config.force {
        output.warning("sift.toml already exists!");
        output.hint("Use --force to overwrite existing files");
        return InitResult::AlreadyExists;
    }

    output.step(1, 3, "Creating dataset directory");
    let dataset_dir = base_path.join("data").join("research");
    if let Err(e) = fs::create_dir_all(&dataset_dir) {
        output.error(&format!("Failed to create data/research: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.created("directory", "data/research");

    output.step(2, 3, "Writing configuration");
    if let Err(e) = write_file(&config_path, &generate_sift_toml(&config), config.force) {
        output.error(&format!("Failed to create sift.toml: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.created("config", "sift.toml");

    let env_example_path = base_path.join(".env.example");
    if let Err(e) = write_file(&env_example_path, ENV_EXAMPLE, config.force) {
        output.error(&format!("Failed to create .env.example: {}", e));
        return InitResult::Error(e.to_string());
    }
    output.created("env", ".env.example");

    output.step(3, 3, "Writing sample dataset entry");
    let dataset = DirectoryDataset::new(&dataset_dir);
    let sample_path = dataset.path_for(SAMPLE_QUERY);
    if sample_path.exists() && !config.force {
        output.skipped(&sample_path.display().to_string(), "already exists");
    } else {
        let written = serde_json::to_string_pretty(&sample_entry())
            .map_err(|e| e.to_string())
            .and_then(|json| fs::write(&sample_path, json).map_err(|e| e.to_string()));
        if let Err(e) = written {
            output.error(&format!("Failed to write sample entry: {}", e));
            return InitResult::Error(e);
        }
        output.created("dataset", &sample_path.display().to_string());
    }

    output.complete("Sift project initialized successfully!");

    output.header("Next Steps");
    output.info("1. Start the server:");
    output.command("sift-server");
    output.info("2. Start a research request:");
    output.command(&format!(
        "curl -X POST http://{}:{}/api/research/start -H 'Content-Type: application/json' -d '{{\"query\": \"{}\"}}'",
        config.host, config.port, SAMPLE_QUERY
    ));
    output.info("3. Or run one directly in the terminal:");
    output.command(&format!("sift-server research \"{}\"", SAMPLE_QUERY));

    output.hint("API docs available at /swagger-ui/ (requires 'swagger-ui' feature)");

    InitResult::Success
}

fn write_file(path: &Path, content: &str, force: bool) -> std::io::Result<()> {
    if path.exists() && !force {
        return Ok(());
    }
    fs::write(path, content)
}

fn generate_sift_toml(config: &InitConfig) -> String {
    format!(
        r#"# Sift configuration

[server]
host = "{host}"
port = {port}
log_level = "info"
# "pretty" or "json"
log_format = "pretty"

# Read for every new request; changes apply without restart when running with --watch
[research]
max_parallel = 5
default_max_results = 20
max_results_cap = 50
fetch_timeout_secs = 10
# fetches_per_second = 2
summary_max_words = 200
max_content_chars = 10000
default_language = "de"

[resolver]
fallback_keywords = ["ukraine", "klimawandel", "pharmaindustrie", "künstliche intelligenz"]

[dataset]
directory = "./data/research"

[search]
# "none", "duckduckgo" or "remote"
backend = "none"
# endpoint = "https://search.example.com/api/search"
# api_key_env = "SIFT_SEARCH_API_KEY"

[fetcher]
# "direct" or "remote"
backend = "direct"
# endpoint = "https://crawler.example.com/api/crawl"
# api_key_env = "SIFT_CRAWLER_API_KEY"

[summarizer]
enabled = false
# endpoint = "https://summarizer.example.com/api/summarize"
# api_key_env = "SIFT_SUMMARIZER_API_KEY"
"#,
        host = config.host,
        port = config.port
    )
}

const ENV_EXAMPLE: &str = r#"# Log filter, overrides server.log_level
RUST_LOG=info

# Credentials referenced by api_key_env in sift.toml
# SIFT_SEARCH_API_KEY=
# SIFT_CRAWLER_API_KEY=
# SIFT_SUMMARIZER_API_KEY=
"#;

fn sample_entry() -> DatasetEntry {
    let source = |title: &str, url: &str, site: &str, content: &str, published_at: &str| {
        DatasetSource {
            title: title.to_string(),
            url: url.to_string(),
            source: Some(site.to_string()),
            kind: Some("news".to_string()),
            snippet: None,
            content: Some(content.to_string()),
            author: Some(format!("{} Redaktion", site)),
            published_at: Some(published_at.to_string()),
            length: Some(content.chars().count()),
        }
    };

    DatasetEntry {
        query: SAMPLE_QUERY.to_string(),
        timestamp: Some("2026-01-03T14:15:00Z".to_string()),
        sources: vec![
            source(
                "Ukraine-News: Kiew kündigt Wechsel im Verteidigungsministerium an",
                "https://www.mdr.de/nachrichten/welt/osteuropa/politik/ukraine-krieg-100.html",
                "mdr.de",
                "Im Bemühen um ein Ende des Krieges kommen in Kiew internationale Sicherheitsberater zusammen.",
                "2026-01-03T06:00:00Z",
            ),
            source(
                "Ukraine - aktuelle Nachrichten | tagesschau.de",
                "https://www.tagesschau.de/thema/ukraine",
                "tagesschau.de",
                "Wegen der angespannten Sicherheitslage ordnet die Ukraine Evakuierungen im Osten an.",
                "2026-01-02T23:25:00Z",
            ),
            source(
                "Ukraine-Krieg im Liveticker",
                "https://www.zdfheute.de/politik/ausland/ukraine-russland-konflikt-blog-102.html",
                "zdf.de",
                "Der Verteidigungsminister soll neuer Energieminister werden.",
                "2026-01-03T15:01:00Z",
            ),
        ],
        summary: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::toml_config::SiftConfig;
    use tempfile::TempDir;

    fn init_config(path: &Path, force: bool) -> InitConfig {
        InitConfig {
            path: path.to_path_buf(),
            force,
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }

    #[test]
    fn test_generated_toml_is_valid_config() {
        let dir = TempDir::new().unwrap();
        let toml = generate_sift_toml(&init_config(dir.path(), false));

        let config: SiftConfig = toml::from_str(&toml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.research.max_parallel, 5);
    }

    #[test]
    fn test_init_scaffolds_project() {
        let dir = TempDir::new().unwrap();
        let result = run(init_config(dir.path(), false), &Output::no_color());

        assert_eq!(result, InitResult::Success);
        assert!(dir.path().join("sift.toml").exists());
        assert!(dir.path().join(".env.example").exists());
        assert!(dir.path().join("data/research/ukraine_krieg.json").exists());
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("sift.toml"), "# mine").unwrap();

        let result = run(init_config(dir.path(), false), &Output::no_color());
        assert_eq!(result, InitResult::AlreadyExists);
        assert_eq!(
            fs::read_to_string(dir.path().join("sift.toml")).unwrap(),
            "# mine"
        );
    }

    #[test]
    fn test_sample_entry_has_three_inline_sources() {
        let entry = sample_entry();
        assert_eq!(entry.sources.len(), 3);
        assert!(entry.sources.iter().all(|s| s.content.is_some()));
    }
}
