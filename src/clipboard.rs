use crate::error::Result;

/// Somewhere to fetch text from when filling in metadata.
pub trait ClipboardSource {
    fn text(&mut self) -> Result<String>;
}

/// The desktop clipboard.
#[cfg(feature = "clipboard")]
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

#[cfg(feature = "clipboard")]
impl SystemClipboard {
    pub fn new() -> Result<Self> {
        let inner = arboard::Clipboard::new()
            .map_err(|e| crate::Error::Clipboard(e.to_string()))?;
        Ok(Self { inner })
    }
}

#[cfg(feature = "clipboard")]
impl ClipboardSource for SystemClipboard {
    fn text(&mut self) -> Result<String> {
        self.inner
            .get_text()
            .map_err(|e| crate::Error::Clipboard(e.to_string()))
    }
}

/// Fixed text, used in place of the clipboard when none is available.
#[derive(Debug, Clone, Default)]
pub struct StaticClipboard(pub Option<String>);

impl ClipboardSource for StaticClipboard {
    fn text(&mut self) -> Result<String> {
        self.0
            .clone()
            .ok_or_else(|| crate::Error::Clipboard("clipboard is empty".to_string()))
    }
}
