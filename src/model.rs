use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::property::Property;

pub const AUTHOR_PROPERTY_NAME: &str = "author";
pub const TITLE_PROPERTY_NAME: &str = "title";
pub const BIBTEX_PROPERTY_NAME: &str = "bibtex";

/// Store of named properties for one document.
///
/// The model owns its properties; callers get shared references and observe
/// them through listeners. Names stay registered for the lifetime of the
/// model, and asking for one that was never registered is an
/// [`Error::NotFound`].
#[derive(Debug, Default)]
pub struct MetadataModel<T> {
    properties: HashMap<String, Property<T>>,
}

impl<T: Clone> MetadataModel<T> {
    pub fn new() -> Self {
        Self {
            properties: HashMap::new(),
        }
    }

    /// Binds `property` to `name`, replacing any previous binding.
    /// Does not notify anyone.
    pub fn set_property(&mut self, name: impl Into<String>, property: Property<T>) {
        self.properties.insert(name.into(), property);
    }

    pub fn get_property(&self, name: &str) -> Result<&Property<T>> {
        self.properties
            .get(name)
            .ok_or_else(|| Error::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_get_registered_property() {
        let mut model = MetadataModel::new();
        model.set_property(TITLE_PROPERTY_NAME, Property::new(TITLE_PROPERTY_NAME, "T".to_string()));

        let title = model.get_property(TITLE_PROPERTY_NAME).unwrap();
        assert_eq!(title.get_value(), "T");
        assert!(model.contains(TITLE_PROPERTY_NAME));
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn test_get_unknown_property_is_not_found() {
        let model: MetadataModel<String> = MetadataModel::new();
        assert!(model.is_empty());
        let err = model.get_property("subject").unwrap_err();
        assert!(matches!(err, Error::NotFound(ref name) if name == "subject"));
    }

    #[test]
    fn test_set_property_replaces_binding_without_notifying() {
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let first = Property::new("author", "A".to_string());
        first.add_property_listener(Rc::new(move |_: &str, _: &String, _: &String| {
            counter.set(counter.get() + 1)
        }));

        let mut model = MetadataModel::new();
        model.set_property("author", first);
        model.set_property("author", Property::new("author", "B".to_string()));

        assert_eq!(hits.get(), 0);
        assert_eq!(model.len(), 1);
        assert_eq!(model.get_property("author").unwrap().get_value(), "B");
    }

    #[test]
    fn test_arbitrary_names_and_value_types() {
        let mut model = MetadataModel::new();
        model.set_property("pages", Property::new("pages", 12u32));
        model.set_property("year", Property::new("year", 1968u32));

        model.get_property("pages").unwrap().set_value(13);

        assert_eq!(model.get_property("pages").unwrap().get_value(), 13);
        let mut names: Vec<_> = model.names().collect();
        names.sort();
        assert_eq!(names, vec!["pages", "year"]);
    }

    #[test]
    fn test_returned_property_is_the_owned_instance() {
        let mut model = MetadataModel::new();
        model.set_property("title", Property::new("title", String::new()));

        model.get_property("title").unwrap().set_value("changed".to_string());

        assert_eq!(model.get_property("title").unwrap().get_value(), "changed");
    }
}
