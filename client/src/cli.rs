use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use common::{results, wordcount, WordCount};
use reqwest::Client;
use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};

#[derive(Parser)]
#[command(name = "client")]
#[command(about = "CLI simple para hablar con el coordinador")]
struct Cli {
    /// URL base del coordinador
    /// - En Docker: COORDINATOR_URL=http://coordinator:80
    /// - Local: default http://localhost:80
    #[arg(long, env = "COORDINATOR_URL", default_value = "http://localhost:80")]
    coordinator: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cuenta las palabras de un archivo ("-" para stdin)
    Count {
        #[arg(value_name = "ARCHIVO")]
        input: PathBuf,

        /// Muestra sólo las N palabras más frecuentes
        #[arg(long)]
        top: Option<usize>,

        /// Además escribe "palabra,conteo" en este CSV
        #[arg(long, value_name = "SALIDA")]
        csv: Option<PathBuf>,

        /// Cuenta en este proceso, sin hablar con el coordinador
        #[arg(long)]
        local: bool,
    },
    /// Consulta si el coordinador está vivo
    Health,
}

fn read_input(input: &Path) -> Result<String> {
    if input == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("no se pudo leer stdin")?;
        return Ok(buf);
    }
    fs::read_to_string(input).with_context(|| format!("no se pudo leer {}", input.display()))
}

async fn count_remote(client: &Client, base_url: &str, text: String) -> Result<WordCount> {
    let url = format!("{}/", base_url.trim_end_matches('/'));
    let resp = client
        .post(&url)
        .header(reqwest::header::CONTENT_TYPE, "text/plain")
        .body(text)
        .send()
        .await
        .with_context(|| format!("no se pudo contactar al coordinador en {url}"))?;

    if !resp.status().is_success() {
        bail!("el coordinador respondió {}", resp.status());
    }

    Ok(resp.json().await?)
}

fn render_counts(counts: &WordCount, top: Option<usize>) -> String {
    if counts.is_empty() {
        return "(sin palabras)\n".to_string();
    }

    let ranked = results::ranked(counts, top);
    let width = ranked.iter().map(|(w, _)| w.chars().count()).max().unwrap_or(0);

    let mut out = String::new();
    for (word, count) in ranked {
        out.push_str(&format!("{:<width$}  {}\n", word, count, width = width));
    }
    out.push_str(&format!(
        "total: {} palabras, {} distintas\n",
        counts.values().fold(0u64, |acc, v| acc.saturating_add(*v)),
        counts.len()
    ));
    out
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let client = Client::new();

    match cli.command {
        Commands::Count {
            input,
            top,
            csv,
            local,
        } => {
            let text = read_input(&input)?;

            let counts = if local {
                wordcount::count_words_local(&text)
            } else {
                count_remote(&client, &cli.coordinator, text).await?
            };

            print!("{}", render_counts(&counts, top));

            if let Some(path) = csv {
                results::write_word_count_file(&counts, &path)?;
                println!("CSV escrito en {}", path.display());
            }
        }

        Commands::Health => {
            let url = format!("{}/health", cli.coordinator.trim_end_matches('/'));
            let resp = client.get(&url).send().await?;
            if resp.status().is_success() {
                println!("coordinador OK ({})", cli.coordinator);
            } else {
                println!("coordinador respondió status {}", resp.status());
            }
        }
    }

    Ok(())
}
