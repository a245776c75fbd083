//! README and `README.metadata.json` consistency rules for sample directories.
//!
//! A sample directory lives at `<category>/<sample>/` and holds a `README.md` plus a
//! `README.metadata.json`. The metadata file is derived data: title, description, relevant APIs,
//! keywords and image come from the README ([`readme`]), category and source snippets come from
//! the directory itself ([`paths`]), and only `redirect_from` is authored by hand.
//! [`reconcile::check_sample`] recomputes the record and compares it with the file on disk.
//!
//! The crate performs blocking reads only and keeps no state between calls.

#![warn(rustdoc::broken_intra_doc_links)]

pub mod error;
pub mod paths;
pub mod readme;
pub mod reconcile;
pub mod record;
pub mod vocabulary;

pub use error::{MetadataError, MetadataErrorKind, MetadataResult, ParseError};
pub use reconcile::{check_sample, regenerate, PersistedMetadata};
pub use record::{MetadataRecord, MetadataRecordBuilder};
pub use vocabulary::Category;
