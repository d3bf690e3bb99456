//! jsonld-quads: convert JSON-LD to RDF quads from the command line
//!
//! Reads a document from a file or stdin and streams the quads out as they
//! are resolved.

use anyhow::{bail, Context};
use clap::Parser;
use comfy_table::{ContentArrangement, Table};
use jsonld_streaming::rdf::{GraphName, NamespaceManager, Quad, RdfObject};
use jsonld_streaming::{quad_stream, ParserOptions};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::AsyncRead;
use tokio_stream::StreamExt;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "jsonld-quads", version, about = "Stream JSON-LD documents as RDF quads")]
struct Cli {
    /// Input file, or "-" for stdin
    #[arg(default_value = "-")]
    input: String,

    /// YAML file with parser options
    #[arg(long)]
    config: Option<PathBuf>,

    /// Extra prefix, as PREFIX=IRI (repeatable)
    #[arg(long = "prefix", value_name = "PREFIX=IRI")]
    prefixes: Vec<String>,

    /// Reject trailing commas
    #[arg(long)]
    strict: bool,

    /// Output format
    #[arg(long, default_value = "nquads")]
    format: OutputFormat,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Nquads,
    Json,
    Table,
}

/// JSON-lines view of a quad
#[derive(Serialize)]
struct QuadRecord {
    subject: String,
    predicate: String,
    object: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    graph: Option<String>,
}

impl From<&Quad> for QuadRecord {
    fn from(quad: &Quad) -> Self {
        Self {
            subject: quad.subject.to_string(),
            predicate: quad.predicate.to_string(),
            object: quad.object.to_string(),
            graph: match &quad.graph {
                GraphName::DefaultGraph => None,
                graph => Some(graph.to_string()),
            },
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let options = load_options(&cli)?;
    let namespaces = table_namespaces(&options);

    let reader: Box<dyn AsyncRead + Unpin + Send> = if cli.input == "-" {
        Box::new(tokio::io::stdin())
    } else {
        let file = tokio::fs::File::open(&cli.input)
            .await
            .with_context(|| format!("cannot open {}", cli.input))?;
        Box::new(file)
    };

    let mut quads = quad_stream(reader, options);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["subject", "predicate", "object", "graph"]);
    let mut count = 0usize;

    while let Some(quad) = quads.next().await {
        let quad = quad?;
        count += 1;
        match cli.format {
            OutputFormat::Nquads => writeln!(out, "{}", quad)?,
            OutputFormat::Json => {
                writeln!(out, "{}", serde_json::to_string(&QuadRecord::from(&quad))?)?
            }
            OutputFormat::Table => {
                table.add_row(vec![
                    compact(&namespaces, &quad.subject.to_string()),
                    compact(&namespaces, &quad.predicate.to_string()),
                    match &quad.object {
                        RdfObject::Literal(literal) => literal.to_string(),
                        other => compact(&namespaces, &other.to_string()),
                    },
                    match &quad.graph {
                        GraphName::DefaultGraph => String::new(),
                        graph => compact(&namespaces, &graph.to_string()),
                    },
                ]);
            }
        }
    }

    if let OutputFormat::Table = cli.format {
        writeln!(out, "{}", table)?;
        writeln!(out, "{} quad(s)", count)?;
    }
    out.flush()?;
    debug!(quads = count, "done");
    Ok(())
}

fn load_options(cli: &Cli) -> anyhow::Result<ParserOptions> {
    let mut options = match &cli.config {
        Some(path) => ParserOptions::from_yaml_file(path)?,
        None => ParserOptions::default(),
    };
    for entry in &cli.prefixes {
        let Some((prefix, iri)) = entry.split_once('=') else {
            bail!("invalid --prefix {:?}, expected PREFIX=IRI", entry);
        };
        options = options.with_prefix(prefix, iri);
    }
    if cli.strict {
        options = options.strict();
    }
    Ok(options)
}

fn table_namespaces(options: &ParserOptions) -> NamespaceManager {
    let mut namespaces = NamespaceManager::new();
    for (prefix, iri) in &options.prefixes {
        namespaces.add_prefix(prefix.clone(), iri.clone());
    }
    namespaces
}

/// Shorten `<iri>` to `prefix:local` when a prefix matches
fn compact(namespaces: &NamespaceManager, term: &str) -> String {
    term.strip_prefix('<')
        .and_then(|t| t.strip_suffix('>'))
        .and_then(|iri| namespaces.compact(iri))
        .unwrap_or_else(|| term.to_string())
}
