//! # MediStruct
//!
//! A small HTTP service that keeps a graph of uploaded documents and answers
//! questions about them with a locally hosted language model.
//!
//! ## Architecture
//!
//! ```text
//!   POST /upload/                      POST /ask/
//!        │                                 │
//!        ▼                                 ▼
//! ┌─────────────┐                  ┌──────────────┐     ┌──────────┐
//! │   intake    │                  │     ask      │────▶│   llm    │
//! │ file → disk │                  │ list → prompt│     │ (Ollama) │
//! └──────┬──────┘                  └──────┬───────┘     └──────────┘
//!        │        ┌──────────────────┐    │
//!        └───────▶│ store (Neo4j or  │◀───┘
//!                 │   in-memory)     │
//!                 └──────────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration with built-in defaults |
//! | [`models`] | `DocumentRecord` |
//! | [`store`] | `DocumentStore` trait, Neo4j and in-memory backends |
//! | [`llm`] | `ChatModel` trait and the Ollama chat client |
//! | [`intake`] | Filename validation and upload persistence |
//! | [`ask`] | Prompt construction and question answering |
//! | [`server`] | Axum HTTP server with permissive CORS |

pub mod ask;
pub mod config;
pub mod intake;
pub mod llm;
pub mod models;
pub mod server;
pub mod store;

pub use ask::{answer_question, Answer};
pub use llm::{ChatModel, OllamaChat};
pub use models::DocumentRecord;
pub use store::{DocumentStore, GraphStore, InMemoryStore};
