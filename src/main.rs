//! papyrus CLI: ingest PDFs and ask questions against them.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use papyrus_rag::config::Settings;
use papyrus_rag::service::RagService;

#[derive(Parser)]
#[command(name = "papyrus", version, about = "PDF question answering via RAG")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ensure the vector index exists and is ready to accept traffic.
    Setup,

    /// Ingest a PDF and print its document id.
    Ingest {
        /// Path to the PDF file.
        #[arg(long)]
        file: PathBuf,
    },

    /// Ask a question against an ingested document.
    Ask {
        /// Document id returned by `ingest`.
        #[arg(long)]
        doc_id: String,

        /// The question to answer.
        #[arg(long)]
        question: String,

        /// Number of matches to retrieve (defaults to RETRIEVAL_TOP_K).
        #[arg(long)]
        top_k: Option<usize>,

        /// Sampling temperature in [0, 1] (default 0.2).
        #[arg(long)]
        temperature: Option<f32>,
    },

    /// Print the effective non-secret configuration.
    Config,
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    match cli.command {
        Commands::Setup => {
            let service = RagService::connect(settings)?;
            println!(
                "Index '{}' is ready.",
                service.settings().pinecone_index_name
            );
        }

        Commands::Ingest { file } => {
            let bytes = std::fs::read(&file).into_diagnostic()?;
            let filename = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.display().to_string());

            let service = RagService::connect(settings)?;
            let receipt = service.ingest(&bytes, &filename)?;

            println!("doc_id:          {}", receipt.doc_id);
            println!("chunks_indexed:  {}", receipt.chunks_indexed);
            println!("source:          {}", receipt.source);
        }

        Commands::Ask {
            doc_id,
            question,
            top_k,
            temperature,
        } => {
            let service = RagService::connect(settings)?;
            let outcome = service.answer(&doc_id, &question, top_k, temperature)?;

            println!("{}\n", outcome.answer);
            if outcome.references.is_empty() {
                println!("(no references)");
            } else {
                println!("References:");
                for r in &outcome.references {
                    println!(
                        "  {}. page {} (score {:.3}): {}",
                        r.rank, r.page, r.score, r.text_preview
                    );
                }
            }
        }

        Commands::Config => {
            println!("index:            {}", settings.pinecone_index_name);
            println!("cloud/region:     {}/{}", settings.pinecone_cloud, settings.pinecone_region);
            println!("chat model:       {}", settings.openai_chat_model);
            println!("embedding model:  {}", settings.openai_embedding_model);
            println!("dimensions:       {}", settings.embedding_dimensions);
            println!("chunk size:       {}", settings.chunk_size);
            println!("chunk overlap:    {}", settings.chunk_overlap);
            println!("batch size:       {}", settings.embedding_batch_size);
            println!("top_k default:    {}", settings.retrieval_top_k);
        }
    }

    Ok(())
}
