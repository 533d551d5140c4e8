//! Holder for the iframe's current document.
//!
//! The preview iframe reloads whenever the host swaps its HTML; each load
//! hands a fresh document to the bridge and bumps its generation, so stale
//! node handles can be told apart from live ones.

#[derive(Debug)]
pub struct IframeBridge<D> {
    document: Option<D>,
    generation: u64,
}

impl<D> Default for IframeBridge<D> {
    fn default() -> Self {
        Self {
            document: None,
            generation: 0,
        }
    }
}

impl<D> IframeBridge<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self) -> Option<&D> {
        self.document.as_ref()
    }

    pub fn document_mut(&mut self) -> Option<&mut D> {
        self.document.as_mut()
    }

    pub fn is_loaded(&self) -> bool {
        self.document.is_some()
    }

    /// Number of documents loaded so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Install a freshly loaded document, returning the previous one.
    pub fn load(&mut self, document: D) -> Option<D> {
        self.generation += 1;
        log::debug!("iframe document loaded (generation {})", self.generation);
        self.document.replace(document)
    }

    /// The iframe unloaded.
    pub fn unload(&mut self) -> Option<D> {
        self.document.take()
    }
}
