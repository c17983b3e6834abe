use std::fmt;

use crate::error::Result;
use crate::model::MetadataModel;

/// Single write path into a [`MetadataModel`].
///
/// Presentation code commits every edit through [`Controller::change_property`]
/// instead of setting properties directly.
pub struct Controller<'a, T> {
    model: &'a MetadataModel<T>,
}

impl<'a, T: Clone + fmt::Debug> Controller<'a, T> {
    pub fn new(model: &'a MetadataModel<T>) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &'a MetadataModel<T> {
        self.model
    }

    /// Sets `name` to `new_value`, notifying its listeners.
    ///
    /// Fails with [`crate::Error::NotFound`] if `name` is not registered.
    pub fn change_property(&self, name: &str, new_value: T) -> Result<()> {
        let property = self.model.get_property(name)?;
        log::debug!("changing property '{}' to {:?}", name, new_value);
        property.set_value(new_value);
        Ok(())
    }
}
