//! vocalis CLI — voice-assistant skill webhook backed by Gemini.
//!
//! ```text
//! vocalis serve [--port 3000] [--host 0.0.0.0] [--format ssml] [--keepalive-url ...]
//! vocalis ask "what is the capital of France" [--server http://localhost:3000]
//! vocalis health [--server ...]
//! ```
//!
//! Every `serve` flag falls back to an environment variable; a `.env` file in
//! the working directory is loaded first.

use std::net::IpAddr;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use vocalis_lib::assembler::Assembler;
use vocalis_lib::config::{KeepaliveConfig, SkillConfig};
use vocalis_lib::keepalive::run_keepalive;
use vocalis_lib::provider::GeminiClient;
use vocalis_lib::server::router;
use vocalis_lib::vocalis_core::types::{OutputFormat, OutputSpeech, SkillResponse, skill_request};

/// vocalis — voice-assistant skill webhook
#[derive(Parser)]
#[command(name = "vocalis", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the skill webhook
    Serve {
        /// Gemini API key
        #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
        api_key: String,
        /// Listen port
        #[arg(long, env = "PORT", default_value = "3000")]
        port: u16,
        /// Listen host
        #[arg(long, env = "VOCALIS_HOST", default_value = "0.0.0.0")]
        host: IpAddr,
        /// Gemini model name
        #[arg(long, env = "GEMINI_MODEL", default_value = "gemini-2.0-flash")]
        model: String,
        /// Speech output format: plain or ssml
        #[arg(long, env = "SPEECH_FORMAT", default_value = "ssml")]
        format: OutputFormat,
        /// Route skill requests are POSTed to
        #[arg(long, env = "SKILL_PATH", default_value = "/alexa")]
        path: String,
        /// Seconds to wait for the model before apologizing
        #[arg(long, env = "PROVIDER_TIMEOUT_SECS", default_value = "15")]
        timeout_secs: u64,
        /// URL to ping periodically (usually this server's /health)
        #[arg(long, env = "KEEPALIVE_URL")]
        keepalive_url: Option<String>,
        /// Seconds between keep-alive pings
        #[arg(long, env = "KEEPALIVE_INTERVAL_SECS", default_value = "840")]
        keepalive_secs: u64,
    },
    /// Send a query to a running webhook and print what would be spoken
    Ask {
        /// Query text
        query: String,
        /// Server URL
        #[arg(long, default_value = "http://localhost:3000")]
        server: String,
        /// Skill route on the server
        #[arg(long, default_value = "/alexa")]
        path: String,
    },
    /// Check that a webhook is up
    Health {
        #[arg(long, default_value = "http://localhost:3000")]
        server: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vocalis=info,vocalis_lib=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Serve {
            api_key,
            port,
            host,
            model,
            format,
            path,
            timeout_secs,
            keepalive_url,
            keepalive_secs,
        } => {
            let config = SkillConfig {
                api_key,
                host,
                port,
                model,
                format,
                path,
                provider_timeout: Duration::from_secs(timeout_secs),
                keepalive: KeepaliveConfig {
                    url: keepalive_url,
                    interval: Duration::from_secs(keepalive_secs),
                },
            };
            serve(config).await
        }

        Command::Ask {
            query,
            server,
            path,
        } => ask(&server, &path, &query).await,

        Command::Health { server } => health(&server).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn serve(config: SkillConfig) -> Result<(), String> {
    config.validate().map_err(|e| e.to_string())?;

    let client = GeminiClient::new(&config.api_key, config.provider_timeout)
        .map_err(|e| format!("failed to build Gemini client: {e}"))?;
    let assembler = Arc::new(Assembler::from_config(client, &config));
    let app = router(assembler, &config.path);

    tokio::spawn(run_keepalive(config.keepalive.clone()));

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| format!("failed to bind {addr}: {e}"))?;

    info!(
        "vocalis listening on {addr} (POST {}, format {}, model {})",
        config.path, config.format, config.model
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await
        .map_err(|e| format!("server error: {e}"))
}

async fn ask(server: &str, path: &str, query: &str) -> Result<(), String> {
    let resp = reqwest::Client::new()
        .post(format!("{}{path}", server.trim_end_matches('/')))
        .json(&skill_request(query))
        .send()
        .await
        .map_err(|e| format!("request failed: {e}"))?;

    let body: SkillResponse = resp
        .json()
        .await
        .map_err(|e| format!("unexpected response: {e}"))?;

    match body.response.output_speech {
        OutputSpeech::PlainText { text } => println!("{text}"),
        OutputSpeech::Ssml { ssml } => println!("{ssml}"),
    }
    if !body.response.should_end_session {
        println!("(session left open)");
    }
    Ok(())
}

async fn health(server: &str) -> Result<(), String> {
    let resp = reqwest::Client::new()
        .get(format!("{}/health", server.trim_end_matches('/')))
        .send()
        .await
        .map_err(|e| format!("request failed: {e}"))?;
    let status = resp.status();
    println!("{status} {}", resp.text().await.unwrap_or_default());
    if status.is_success() {
        Ok(())
    } else {
        Err(format!("health check failed with {status}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_flags_parse() {
        let cli = Cli::try_parse_from([
            "vocalis",
            "serve",
            "--api-key",
            "k",
            "--port",
            "8080",
            "--format",
            "plain",
            "--keepalive-url",
            "https://example.com/health",
        ])
        .unwrap();
        match cli.command {
            Command::Serve {
                api_key,
                port,
                format,
                keepalive_url,
                ..
            } => {
                assert_eq!(api_key, "k");
                assert_eq!(port, 8080);
                assert_eq!(format, OutputFormat::Plain);
                assert_eq!(keepalive_url.as_deref(), Some("https://example.com/health"));
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn unknown_format_rejected() {
        let r = Cli::try_parse_from(["vocalis", "serve", "--api-key", "k", "--format", "html"]);
        assert!(r.is_err());
    }

    #[test]
    fn ask_defaults() {
        let cli = Cli::try_parse_from(["vocalis", "ask", "hello there"]).unwrap();
        match cli.command {
            Command::Ask { query, server, path } => {
                assert_eq!(query, "hello there");
                assert_eq!(server, "http://localhost:3000");
                assert_eq!(path, "/alexa");
            }
            _ => panic!("expected ask"),
        }
    }
}
