//! Reading and writing the metadata fields of a PDF Info dictionary.

use chrono::Local;
use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};
use std::fs;
use std::path::Path;
use std::time::SystemTime;

use crate::error::{Error, Result};
use crate::model::{AUTHOR_PROPERTY_NAME, BIBTEX_PROPERTY_NAME, MetadataModel, TITLE_PROPERTY_NAME};
use crate::property::Property;

const AUTHOR_KEY: &[u8] = b"Author";
const TITLE_KEY: &[u8] = b"Title";
/// Custom Info entry holding the BibTeX reference.
const BIBTEX_KEY: &[u8] = b"bibtex";

/// The editable metadata of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataFields {
    pub author: String,
    pub title: String,
    pub bibtex: String,
}

/// Builds a model holding the `author`, `title` and `bibtex` properties.
pub fn build_model(fields: &MetadataFields) -> MetadataModel<String> {
    let mut model = MetadataModel::new();
    for (name, value) in [
        (AUTHOR_PROPERTY_NAME, &fields.author),
        (TITLE_PROPERTY_NAME, &fields.title),
        (BIBTEX_PROPERTY_NAME, &fields.bibtex),
    ] {
        model.set_property(name, Property::new(name, value.clone()));
    }
    model
}

/// Reads the current field values back out of a model built by [`build_model`].
pub fn fields_from_model(model: &MetadataModel<String>) -> Result<MetadataFields> {
    Ok(MetadataFields {
        author: model.get_property(AUTHOR_PROPERTY_NAME)?.get_value(),
        title: model.get_property(TITLE_PROPERTY_NAME)?.get_value(),
        bibtex: model.get_property(BIBTEX_PROPERTY_NAME)?.get_value(),
    })
}

/// Reads author, title and BibTeX from the PDF at `path`.
/// Entries that are missing, along with a missing Info dictionary, read as
/// empty strings.
pub fn read_fields(path: impl AsRef<Path>) -> Result<MetadataFields> {
    let doc = Document::load(path.as_ref())?;

    let Some(info) = info_dictionary(&doc) else {
        log::debug!("{} has no Info dictionary", path.as_ref().display());
        return Ok(MetadataFields::default());
    };

    let field = |key: &[u8]| {
        info.get(key)
            .map(|value| info_value_to_string(&doc, value))
            .unwrap_or_default()
    };

    Ok(MetadataFields {
        author: field(AUTHOR_KEY),
        title: field(TITLE_KEY),
        bibtex: field(BIBTEX_KEY),
    })
}

/// Writes `fields` into the PDF at `input` and saves the result to `output`.
pub fn write_fields_to(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    fields: &MetadataFields,
) -> Result<()> {
    let mut doc = Document::load(input.as_ref())?;
    apply_fields(&mut doc, fields)?;
    doc.save(output.as_ref())?;
    log::info!("metadata written to {}", output.as_ref().display());
    Ok(())
}

/// Writes `fields` into the PDF at `path`, replacing the file.
///
/// The document is saved to a temporary file next to the original and then
/// renamed over it, so a failed save leaves the original untouched.
pub fn write_fields(path: impl AsRef<Path>, fields: &MetadataFields) -> Result<()> {
    let original_path = path.as_ref();
    let mut doc = Document::load(original_path)?;
    apply_fields(&mut doc, fields)?;

    let parent_dir = match original_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let stem = original_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document");
    let timestamp = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_micros())
        .unwrap_or_default();
    let temp_file_path = parent_dir.join(format!("{}_{}.pdf.tmp", stem, timestamp));

    if let Err(save_err) = doc.save(&temp_file_path) {
        remove_temp_file(&temp_file_path);
        return Err(save_err.into());
    }
    if let Err(rename_err) = fs::rename(&temp_file_path, original_path) {
        remove_temp_file(&temp_file_path);
        return Err(rename_err.into());
    }

    log::info!("metadata written to {}", original_path.display());
    Ok(())
}

fn remove_temp_file(path: &Path) {
    if path.exists() {
        if let Err(e) = fs::remove_file(path) {
            log::warn!("could not remove temporary file {}: {}", path.display(), e);
        }
    }
}

/// Sets the three fields and `ModDate`. An Info dictionary stored inline in
/// the trailer is moved into an indirect object with its entries intact; one
/// is created when the trailer has none.
fn apply_fields(doc: &mut Document, fields: &MetadataFields) -> Result<()> {
    let existing = match doc.trailer.get(b"Info") {
        Ok(Object::Reference(id)) => Ok(*id),
        Ok(Object::Dictionary(dict)) => Err(dict.clone()),
        _ => Err(Dictionary::new()),
    };

    let info_dict_id: ObjectId = match existing {
        Ok(id) => id,
        Err(dict) => {
            let id = doc.add_object(dict);
            doc.trailer.set("Info", Object::Reference(id));
            id
        }
    };

    let info_dict = doc
        .get_object_mut(info_dict_id)?
        .as_dict_mut()
        .map_err(|_| Error::MissingInfo)?;

    info_dict.set(AUTHOR_KEY.to_vec(), text_string(&fields.author));
    info_dict.set(TITLE_KEY.to_vec(), text_string(&fields.title));
    info_dict.set(BIBTEX_KEY.to_vec(), text_string(&fields.bibtex));
    info_dict.set("ModDate", Object::string_literal(pdf_date_now()));
    Ok(())
}

fn info_dictionary(doc: &Document) -> Option<&Dictionary> {
    match doc.trailer.get(b"Info").ok()? {
        Object::Reference(id) => doc.get_object(*id).ok()?.as_dict().ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

/// Converts an Info value to a `String`, following an indirect reference
/// first. Non-text values become their textual representation.
fn info_value_to_string(doc: &Document, object: &Object) -> String {
    let object = match object {
        Object::Reference(id) => match doc.get_object(*id) {
            Ok(target) => target,
            Err(e) => {
                log::warn!("dangling Info reference {:?}: {}", id, e);
                return String::new();
            }
        },
        other => other,
    };
    match object {
        Object::String(bytes, _) => decode_text_string(bytes),
        Object::Name(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        Object::Integer(i) => i.to_string(),
        Object::Real(f) => f.to_string(),
        Object::Boolean(b) => b.to_string(),
        Object::Null => String::new(),
        other => {
            log::warn!("ignoring non-text Info value: {:?}", other);
            String::new()
        }
    }
}

/// Decodes a PDF text string: UTF-16BE when it carries a byte order mark,
/// otherwise UTF-8, falling back to PDFDocEncoding read as Latin-1.
fn decode_text_string(bytes: &[u8]) -> String {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        _ => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => bytes.iter().map(|&b| b as char).collect(),
        },
    }
}

/// Encodes a value as a PDF text string. ASCII stays a literal string;
/// anything else is written as UTF-16BE with a byte order mark.
fn text_string(value: &str) -> Object {
    if value.is_ascii() {
        return Object::string_literal(value);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in value.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Current local time as a PDF date, e.g. `D:20240131120000+01'00'`.
fn pdf_date_now() -> String {
    let now = Local::now();
    let offset = now.offset().local_minus_utc();
    let offset_sign = if offset >= 0 { '+' } else { '-' };
    format!(
        "D:{}{}{:02}'{:02}'",
        now.format("%Y%m%d%H%M%S"),
        offset_sign,
        offset.abs() / 3600,
        (offset.abs() % 3600) / 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn create_minimal_test_pdf(path: &Path) -> std::result::Result<(), Box<dyn Error>> {
        let mut doc = Document::with_version("1.7");
        let mut pages_dict = Dictionary::new();
        pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
        pages_dict.set("Count", Object::Integer(0));
        pages_dict.set("Kids", Object::Array(vec![]));
        let pages_id = doc.add_object(pages_dict);
        let mut catalog_dict = Dictionary::new();
        catalog_dict.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog_dict.set("Pages", Object::Reference(pages_id));
        let catalog_id = doc.add_object(catalog_dict);
        doc.trailer.set("Root", Object::Reference(catalog_id));
        doc.save(path)?;
        Ok(())
    }

    fn test_pdf(dir: &TempDir, name: &str) -> std::result::Result<PathBuf, Box<dyn Error>> {
        let path = dir.path().join(name);
        create_minimal_test_pdf(&path)?;
        Ok(path)
    }

    fn sample_fields() -> MetadataFields {
        MetadataFields {
            author: "Donald E. Knuth".to_string(),
            title: "The Art of Computer Programming".to_string(),
            bibtex: "@book{knuth, title = {The Art of Computer Programming}}".to_string(),
        }
    }

    #[test]
    fn test_read_fields_without_info_is_empty() -> std::result::Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let pdf = test_pdf(&dir, "no_info.pdf")?;

        assert_eq!(read_fields(&pdf)?, MetadataFields::default());
        Ok(())
    }

    #[test]
    fn test_write_fields_in_place_round_trip() -> std::result::Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let pdf = test_pdf(&dir, "in_place.pdf")?;

        write_fields(&pdf, &sample_fields())?;

        assert_eq!(read_fields(&pdf)?, sample_fields());
        let leftovers: Vec<_> = fs::read_dir(dir.path())?
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty(), "temporary file should be renamed away");
        Ok(())
    }

    #[test]
    fn test_write_fields_to_sets_mod_date() -> std::result::Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let input = test_pdf(&dir, "input.pdf")?;
        let output = dir.path().join("output.pdf");

        write_fields_to(&input, &output, &sample_fields())?;

        let doc = Document::load(&output)?;
        let info = info_dictionary(&doc).ok_or("missing Info")?;
        let mod_date = info_value_to_string(&doc, info.get(b"ModDate")?);
        assert!(mod_date.starts_with("D:"), "unexpected ModDate {mod_date}");
        assert_eq!(read_fields(&input)?, MetadataFields::default());
        Ok(())
    }

    #[test]
    fn test_non_ascii_values_round_trip() -> std::result::Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let pdf = test_pdf(&dir, "accents.pdf")?;
        let fields = MetadataFields {
            author: "Manuel Montenegro Āččęñtš".to_string(),
            title: "Análisis de programas".to_string(),
            bibtex: String::new(),
        };

        write_fields(&pdf, &fields)?;

        assert_eq!(read_fields(&pdf)?, fields);
        Ok(())
    }

    #[test]
    fn test_overwrite_existing_values() -> std::result::Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let pdf = test_pdf(&dir, "overwrite.pdf")?;

        write_fields(&pdf, &sample_fields())?;
        let mut changed = sample_fields();
        changed.title = "Concrete Mathematics".to_string();
        write_fields(&pdf, &changed)?;

        assert_eq!(read_fields(&pdf)?.title, "Concrete Mathematics");
        Ok(())
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(read_fields("non_existent_read.pdf").is_err());
        assert!(write_fields("non_existent_write.pdf", &sample_fields()).is_err());
    }

    #[test]
    fn test_model_round_trip_without_mutation() -> std::result::Result<(), Box<dyn Error>> {
        let model = build_model(&sample_fields());
        assert_eq!(model.len(), 3);
        assert_eq!(fields_from_model(&model)?, sample_fields());
        Ok(())
    }

    #[test]
    fn test_decode_text_string_variants() {
        assert_eq!(decode_text_string(b"plain"), "plain");
        assert_eq!(decode_text_string(&[0xFE, 0xFF, 0x00, 0x41, 0x00, 0xE9]), "Aé");
        assert_eq!(decode_text_string(b"Jos\xE9"), "José");
        let doc = Document::with_version("1.7");
        assert_eq!(info_value_to_string(&doc, &Object::Integer(42)), "42");
        assert_eq!(info_value_to_string(&doc, &Object::Name(b"Name".to_vec())), "Name");
    }

    #[test]
    fn test_pdf_date_format() {
        let date = pdf_date_now();
        assert!(date.starts_with("D:"));
        assert_eq!(date.len(), "D:20240131120000+01'00'".len());
    }

    fn save_with_info(
        dir: &TempDir,
        name: &str,
        build: impl FnOnce(&mut Document) -> Object,
    ) -> std::result::Result<PathBuf, Box<dyn Error>> {
        let path = test_pdf(dir, name)?;
        let mut doc = Document::load(&path)?;
        let info = build(&mut doc);
        doc.trailer.set("Info", info);
        doc.save(&path)?;
        Ok(path)
    }

    #[test]
    fn test_latin1_author_survives_title_edit() -> std::result::Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let pdf = save_with_info(&dir, "latin1.pdf", |doc| {
            let mut info = Dictionary::new();
            info.set("Author", Object::String(b"Jos\xE9".to_vec(), StringFormat::Literal));
            Object::Reference(doc.add_object(info))
        })?;

        let mut fields = read_fields(&pdf)?;
        assert_eq!(fields.author, "José");
        fields.title = "Edited".to_string();
        write_fields(&pdf, &fields)?;

        let saved = read_fields(&pdf)?;
        assert_eq!(saved.author, "José");
        assert_eq!(saved.title, "Edited");
        Ok(())
    }

    #[test]
    fn test_indirect_info_values_are_resolved() -> std::result::Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let pdf = save_with_info(&dir, "indirect.pdf", |doc| {
            let author_id = doc.add_object(Object::string_literal("Indirect Author"));
            let mut info = Dictionary::new();
            info.set("Author", Object::Reference(author_id));
            info.set("Title", Object::string_literal("Direct Title"));
            Object::Reference(doc.add_object(info))
        })?;

        let fields = read_fields(&pdf)?;
        assert_eq!(fields.author, "Indirect Author");
        assert_eq!(fields.title, "Direct Title");

        write_fields(&pdf, &fields)?;
        assert_eq!(read_fields(&pdf)?.author, "Indirect Author");
        Ok(())
    }

    #[test]
    fn test_inline_info_keeps_other_entries() -> std::result::Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let pdf = save_with_info(&dir, "inline.pdf", |_| {
            let mut info = Dictionary::new();
            info.set("Producer", Object::string_literal("Prod"));
            info.set("Author", Object::string_literal("A"));
            Object::Dictionary(info)
        })?;

        let mut fields = read_fields(&pdf)?;
        assert_eq!(fields.author, "A");
        fields.title = "New Title".to_string();
        write_fields(&pdf, &fields)?;

        let doc = Document::load(&pdf)?;
        assert!(matches!(doc.trailer.get(b"Info")?, Object::Reference(_)));
        let info = info_dictionary(&doc).ok_or("missing Info")?;
        assert_eq!(info_value_to_string(&doc, info.get(b"Producer")?), "Prod");
        assert_eq!(read_fields(&pdf)?.title, "New Title");
        assert_eq!(read_fields(&pdf)?.author, "A");
        Ok(())
    }
}
