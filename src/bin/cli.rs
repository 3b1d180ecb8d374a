//! Command-line client for the calidad-agua API.
//!
//! Usage:
//!   calidad-agua-cli list
//!   calidad-agua-cli get 1234
//!   calidad-agua-cli location Antioquia --municipio Medellin
//!   calidad-agua-cli period 2019
//!   calidad-agua-cli chat "que significa riesgo alto"

use anyhow::{Context, Result, anyhow};
use calidad_agua::chatbot::ChatbotReply;
use clap::{Parser, Subcommand};
use reqwest::{Url, blocking::Client};
use serde_json::Value;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "calidad-agua-cli")]
#[command(about = "Query the Colombian water-quality API", long_about = None)]
struct Cli {
    /// Base URL of the running API
    #[arg(long, env = "AGUA_API_URL", default_value = "http://127.0.0.1:9000")]
    base_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List measurements (capped by the server)
    List {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show one measurement by id
    Get { id: String },
    /// Filter by department and optionally municipality
    Location {
        departamento: String,
        #[arg(long)]
        municipio: Option<String>,
    },
    /// Filter by period/year
    Period { query: String },
    /// Ask the chatbot
    Chat {
        #[arg(required = true, num_args = 1..)]
        words: Vec<String>,
    },
}

fn main() -> Result<()> {
    calidad_agua::load_env();
    let cli = Cli::parse();
    let client = Client::builder()
        .timeout(Duration::from_secs(15))
        .build()
        .context("Failed to build HTTP client")?;
    let base = cli.base_url.as_str();

    match cli.command {
        Commands::List { limit } => {
            let mut req = client.get(endpoint(base, &["water"])?);
            if let Some(l) = limit {
                req = req.query(&[("limit", l.to_string())]);
            }
            print_json(req.send()?)
        }
        Commands::Get { id } => print_json(client.get(endpoint(base, &["water", id.as_str()])?).send()?),
        Commands::Location {
            departamento,
            municipio,
        } => {
            let mut params = vec![("Departamento", departamento)];
            if let Some(m) = municipio {
                params.push(("Municipio", m));
            }
            print_json(
                client
                    .get(endpoint(base, &["water", "departamento"])?)
                    .query(&params)
                    .send()?,
            )
        }
        Commands::Period { query } => print_json(
            client
                .get(endpoint(base, &["water", "periodo"])?)
                .query(&[("query", query)])
                .send()?,
        ),
        Commands::Chat { words } => {
            let reply: ChatbotReply = client
                .get(endpoint(base, &["chatbot"])?)
                .query(&[("query", words.join(" "))])
                .send()?
                .error_for_status()?
                .json()
                .context("Failed to parse chatbot reply")?;
            println!("{}", reply.intro);
            println!("Respuesta: {}", reply.respuesta.unwrap_or_default());
            Ok(())
        }
    }
}

/// Append percent-encoded path segments to the base URL
fn endpoint(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base).with_context(|| format!("Invalid base URL {}", base))?;
    url.path_segments_mut()
        .map_err(|_| anyhow!("Base URL {} cannot carry a path", base))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn print_json(resp: reqwest::blocking::Response) -> Result<()> {
    let status = resp.status();
    let body: Value = resp.json().context("Response was not JSON")?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    if !status.is_success() {
        eprintln!("HTTP {}", status);
    }
    Ok(())
}
