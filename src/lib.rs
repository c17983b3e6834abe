//! Edit the author, title and BibTeX reference stored in a PDF's metadata.
//!
//! The metadata of a document is held in a [`MetadataModel`] of observable
//! [`Property`] values. Presentation code subscribes to the properties and
//! commits edits through a [`Controller`]; the [`bibtex`] module fills in
//! authors and title from a pasted BibTeX entry.

pub mod bibtex;
pub mod clipboard;
pub mod controller;
pub mod dialog;
pub mod document;
pub mod error;
pub mod model;
pub mod property;

pub use controller::Controller;
pub use document::{MetadataFields, build_model, fields_from_model, read_fields, write_fields, write_fields_to};
pub use error::{Error, Result};
pub use model::{AUTHOR_PROPERTY_NAME, BIBTEX_PROPERTY_NAME, MetadataModel, TITLE_PROPERTY_NAME};
pub use property::{Property, PropertyListener};
