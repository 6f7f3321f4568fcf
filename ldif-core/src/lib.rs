//! LDIF Core Parser
//!
//! Incremental, error-tolerant parser for LDIF (LDAP Data Interchange
//! Format). Malformed input never aborts a parse: unrecognized text is kept
//! as invalid parts, so every byte of the input can be reconstructed from
//! the result and located by its offset.
//!
//! # Architecture
//!
//! - **token.rs** - Token and TokenKind
//! - **scanner.rs** - Cursor-driven tokenizer over any reader
//! - **part.rs**, **line.rs**, **record.rs**, **container.rs** - Document model
//! - **parser.rs** - Record assembler
//! - **enumeration.rs** - Pull iterator with Header/Body/Footer phases
//! - **document.rs** - Fully parsed document
//!
//! # Example
//!
//! ```
//! let input = "dn: cn=a,dc=x\nchangetype: delete\n\n";
//!
//! for container in ldif_core::parse_incremental(input.as_bytes()) {
//!     let container = container.unwrap();
//!     println!("{} at {}", container.name(), container.offset());
//! }
//!
//! let doc = ldif_core::parse_document(input);
//! assert!(doc.is_valid());
//! ```

pub mod container;
pub mod document;
pub mod enumeration;
pub mod error;
pub mod line;
pub mod options;
pub mod parser;
pub mod part;
pub mod record;
pub mod scanner;
pub mod token;

use std::io::Read;

pub use container::{ContainerKind, LdifContainer};
pub use document::LdifDocument;
pub use enumeration::{LdifEnumeration, Phase};
pub use error::{LdifError, Result};
pub use line::{ChangeKind, ControlLine, LdifLine, LineKind, ModType, ValueKind, ValueLine};
pub use options::ScannerOptions;
pub use parser::LdifParser;
pub use part::{EofPart, InvalidPart, LdifPart};
pub use record::{LdifRecord, ModSpec, RecordKind, Terminator};
pub use scanner::LdifScanner;
pub use token::{Token, TokenKind};

/// Parse a complete document from text.
pub fn parse_document(text: &str) -> LdifDocument {
    LdifDocument::parse(text)
}

/// Start an incremental parse over a reader.
pub fn parse_incremental<R: Read>(reader: R) -> LdifEnumeration<R> {
    LdifEnumeration::new(reader)
}
