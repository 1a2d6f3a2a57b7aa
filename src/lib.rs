//! Extracts `{{IPA}}` pronunciations from Wiktionary XML dumps.
//!
//! The dump is streamed through [`tokenizer`] into the
//! [`assembler::RecordAssembler`], whose work items are parsed by a worker
//! pool and written out as JSON lines by [`pipeline::process`].

pub mod assembler;
pub mod config;
pub mod error;
pub mod input;
pub mod ipa;
pub mod pipeline;
pub mod tokenizer;

pub use config::Config;
pub use error::{ExtractError, Result};
pub use ipa::{find_ipa, find_templates, parse_template, IpaTemplate, Pronunciation};
pub use pipeline::{process, Stats};
