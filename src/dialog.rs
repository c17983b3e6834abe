//! Terminal dialog for editing a document's metadata.
//!
//! The dialog keeps its own copy of the three fields, kept in sync with the
//! model through property listeners. Edits only touch that copy until the
//! user saves, at which point every field is committed through the
//! [`Controller`].

use dialoguer::{Editor, Input, Select};
use std::cell::RefCell;
use std::rc::Rc;

use crate::bibtex;
use crate::clipboard::ClipboardSource;
use crate::controller::Controller;
use crate::error::{Error, Result};
use crate::model::{AUTHOR_PROPERTY_NAME, BIBTEX_PROPERTY_NAME, TITLE_PROPERTY_NAME};
use crate::property::PropertyListener;

/// Result of filling in metadata from a BibTeX entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillOutcome {
    /// The text does not start with `@`; nothing was changed.
    NotBibtex,
    /// The entry was stored; the flags say which of authors and title were
    /// found and committed as well.
    Filled { authors: bool, title: bool },
}

/// Commits the authors and title found in `data`, plus the trimmed entry
/// itself as the `bibtex` property.
pub fn fill_in_from_bibtex(controller: &Controller<'_, String>, data: &str) -> Result<FillOutcome> {
    let data = data.trim();
    if !bibtex::is_likely_bibtex(data) {
        return Ok(FillOutcome::NotBibtex);
    }

    let found = bibtex::extract(data);
    let authors = found.authors.is_some();
    let title = found.title.is_some();
    if let Some(authors) = found.authors {
        controller.change_property(AUTHOR_PROPERTY_NAME, authors)?;
    }
    if let Some(title) = found.title {
        controller.change_property(TITLE_PROPERTY_NAME, title)?;
    }
    controller.change_property(BIBTEX_PROPERTY_NAME, data.to_string())?;

    Ok(FillOutcome::Filled { authors, title })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Author,
    Title,
    Bibtex,
}

impl Field {
    const ALL: [Field; 3] = [Field::Author, Field::Title, Field::Bibtex];

    pub fn property_name(self) -> &'static str {
        match self {
            Field::Author => AUTHOR_PROPERTY_NAME,
            Field::Title => TITLE_PROPERTY_NAME,
            Field::Bibtex => BIBTEX_PROPERTY_NAME,
        }
    }

    fn slot(self, fields: &mut FieldBuffer) -> &mut String {
        match self {
            Field::Author => &mut fields.author,
            Field::Title => &mut fields.title,
            Field::Bibtex => &mut fields.bibtex,
        }
    }
}

/// The dialog's editable copy of the fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldBuffer {
    pub author: String,
    pub title: String,
    pub bibtex: String,
}

#[derive(Debug, Clone, Copy)]
enum DialogAction {
    EditTitle,
    EditAuthors,
    EditBibtex,
    FillIn,
    Save,
    Close,
}

impl DialogAction {
    const ALL: [DialogAction; 6] = [
        DialogAction::EditTitle,
        DialogAction::EditAuthors,
        DialogAction::EditBibtex,
        DialogAction::FillIn,
        DialogAction::Save,
        DialogAction::Close,
    ];

    fn label(self) -> &'static str {
        match self {
            DialogAction::EditTitle => "✏️  Edit title",
            DialogAction::EditAuthors => "✏️  Edit authors",
            DialogAction::EditBibtex => "📝 Edit BibTeX reference",
            DialogAction::FillIn => "📋 Fill in from clipboard",
            DialogAction::Save => "💾 Save changes",
            DialogAction::Close => "🚪 Close",
        }
    }
}

pub struct MetadataDialog<'a> {
    file_name: String,
    controller: Controller<'a, String>,
    buffer: Rc<RefCell<FieldBuffer>>,
    listeners: Vec<(Field, Rc<dyn PropertyListener<String>>)>,
    clipboard: Box<dyn ClipboardSource + 'a>,
}

impl<'a> MetadataDialog<'a> {
    /// Creates the dialog and subscribes it to the `author`, `title` and
    /// `bibtex` properties of the controller's model.
    pub fn new(
        file_name: impl Into<String>,
        controller: Controller<'a, String>,
        clipboard: Box<dyn ClipboardSource + 'a>,
    ) -> Result<Self> {
        let model = controller.model();
        let properties = [
            model.get_property(AUTHOR_PROPERTY_NAME)?,
            model.get_property(TITLE_PROPERTY_NAME)?,
            model.get_property(BIBTEX_PROPERTY_NAME)?,
        ];
        let buffer = Rc::new(RefCell::new(FieldBuffer::default()));
        let mut listeners = Vec::with_capacity(Field::ALL.len());

        for (field, property) in Field::ALL.into_iter().zip(properties) {
            *field.slot(&mut buffer.borrow_mut()) = property.get_value();

            let mirror = Rc::clone(&buffer);
            let listener: Rc<dyn PropertyListener<String>> =
                Rc::new(move |_: &str, _: &String, new_value: &String| {
                    *field.slot(&mut mirror.borrow_mut()) = new_value.clone();
                });
            property.add_property_listener(Rc::clone(&listener));
            listeners.push((field, listener));
        }

        Ok(Self {
            file_name: file_name.into(),
            controller,
            buffer,
            listeners,
            clipboard,
        })
    }

    pub fn fields(&self) -> FieldBuffer {
        self.buffer.borrow().clone()
    }

    /// Changes the dialog's copy of `field`. The model is not touched.
    pub fn edit(&self, field: Field, value: impl Into<String>) {
        *field.slot(&mut self.buffer.borrow_mut()) = value.into();
    }

    /// Commits all three fields through the controller.
    pub fn save(&self) -> Result<()> {
        let fields = self.fields();
        self.controller.change_property(AUTHOR_PROPERTY_NAME, fields.author)?;
        self.controller.change_property(TITLE_PROPERTY_NAME, fields.title)?;
        self.controller.change_property(BIBTEX_PROPERTY_NAME, fields.bibtex)?;
        Ok(())
    }

    pub fn fill_in_from_clipboard(&mut self) -> Result<FillOutcome> {
        let data = self.clipboard.text()?;
        fill_in_from_bibtex(&self.controller, &data)
    }

    /// Runs the interactive menu. Returns `true` if the user saved.
    pub fn run(&mut self) -> Result<bool> {
        println!("\n📄 Set metadata: {}", self.file_name);
        println!("{}", "═".repeat(60));

        let labels: Vec<&str> = DialogAction::ALL.iter().map(|a| a.label()).collect();
        loop {
            self.print_fields();

            let selection = Select::new()
                .with_prompt("\nSelect an option")
                .items(&labels)
                .default(0)
                .interact()?;

            match DialogAction::ALL[selection] {
                DialogAction::EditTitle => self.prompt_line(Field::Title, "Title")?,
                DialogAction::EditAuthors => self.prompt_line(Field::Author, "Authors")?,
                DialogAction::EditBibtex => {
                    let current = self.fields().bibtex;
                    if let Some(edited) = Editor::new().edit(&current)? {
                        self.edit(Field::Bibtex, edited.trim_end());
                    }
                }
                DialogAction::FillIn => self.report_fill_in(),
                DialogAction::Save => {
                    self.save()?;
                    println!("✅ Changes saved.");
                    return Ok(true);
                }
                DialogAction::Close => return Ok(false),
            }
        }
    }

    fn prompt_line(&self, field: Field, prompt: &str) -> Result<()> {
        let current = field.slot(&mut self.buffer.borrow_mut()).clone();
        let value = Input::<String>::new()
            .with_prompt(prompt)
            .with_initial_text(current)
            .allow_empty(true)
            .interact_text()?;
        self.edit(field, value);
        Ok(())
    }

    fn report_fill_in(&mut self) {
        match self.fill_in_from_clipboard() {
            Ok(FillOutcome::NotBibtex) => {
                println!("⚠️  Clipboard does not contain a bibtex entry.");
            }
            Ok(FillOutcome::Filled { authors, title }) => {
                if !authors {
                    println!("ℹ️  No author field found in the entry.");
                }
                if !title {
                    println!("ℹ️  No title field found in the entry.");
                }
            }
            Err(Error::Clipboard(reason)) => {
                log::debug!("clipboard unavailable: {}", reason);
                println!("⚠️  Clipboard contents cannot be converted into a string.");
            }
            Err(e) => println!("❌ Error: {}", e),
        }
    }

    fn print_fields(&self) {
        let fields = self.fields();
        println!("\n{:<8}: {}", "Title", fields.title);
        println!("{:<8}: {}", "Authors", fields.author);
        println!("{:<8}:", "BibTeX");
        for line in fields.bibtex.lines() {
            println!("    {}", line);
        }
    }
}

impl Drop for MetadataDialog<'_> {
    fn drop(&mut self) {
        let model = self.controller.model();
        for (field, listener) in &self.listeners {
            if let Ok(property) = model.get_property(field.property_name()) {
                property.remove_property_listener(listener);
            }
        }
    }
}
