//! # papyrus-rag
//!
//! PDF question answering via chunked retrieval-augmented generation.
//!
//! The pipeline ingests PDF documents, splits each page into overlapping
//! character windows, embeds the windows, and stores the vectors in a
//! namespaced vector index (one namespace per document). Questions are
//! answered by embedding the question, retrieving the closest windows from
//! the document's namespace, and conditioning a chat completion on them.
//!
//! ## Architecture
//!
//! - **Extraction** (`extract`): PDF bytes -> whitespace-normalized pages
//! - **Chunking** (`chunk`): pages -> overlapping fixed-size windows
//! - **Capabilities** (`embed`, `index`, `generate`): trait contracts for the
//!   embedding provider, vector index, and completion provider
//! - **Adapters** (`openai`, `index`): `ureq`-backed REST clients, normalized
//!   at the boundary
//! - **Orchestration** (`service`): the ingest and answer workflows
//!
//! ## Library usage
//!
//! ```no_run
//! use papyrus_rag::config::Settings;
//! use papyrus_rag::service::RagService;
//!
//! let settings = Settings::from_env().unwrap();
//! let service = RagService::connect(settings).unwrap();
//!
//! let bytes = std::fs::read("manual.pdf").unwrap();
//! let receipt = service.ingest(&bytes, "manual.pdf").unwrap();
//! let outcome = service
//!     .answer(&receipt.doc_id, "What does chapter 2 cover?", None, None)
//!     .unwrap();
//! println!("{}", outcome.answer);
//! ```

pub mod chunk;
pub mod config;
pub mod embed;
pub mod error;
pub mod extract;
pub mod generate;
pub mod index;
pub mod openai;
pub mod service;

pub use config::Settings;
pub use error::{PapyrusError, PapyrusResult};
pub use service::{AnswerOutcome, IngestReceipt, RagService, Reference};
