//! Shared helpers for building small PDFs in integration tests.

#![allow(dead_code)]

use lopdf::{Document, Object, dictionary};
use std::path::Path;

/// Writes a PDF with an empty page tree and no Info dictionary.
pub fn write_minimal_pdf(path: &Path) {
    let mut doc = empty_document();
    doc.save(path).expect("save minimal PDF");
}

/// Writes a PDF whose Info dictionary holds the given author and title.
pub fn write_pdf_with_info(path: &Path, author: &str, title: &str) {
    let mut doc = empty_document();
    let info_id = doc.add_object(dictionary! {
        "Author" => Object::string_literal(author),
        "Title" => Object::string_literal(title),
        "Producer" => Object::string_literal("pdfmeta tests"),
    });
    doc.trailer.set("Info", Object::Reference(info_id));
    doc.save(path).expect("save PDF with Info");
}

fn empty_document() -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => Vec::<Object>::new(),
        "Count" => Object::Integer(0),
    });
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc
}
