/// What the adapter needs from the bundler driving it.
pub trait PluginContext {
    /// Whether the bundler is running in watch mode.
    fn watch_mode(&self) -> bool;

    fn emit_chunk(&mut self, chunk: EmittedChunk);

    fn emit_asset(&mut self, asset: EmittedAsset);
}

/// An additional entry point for the bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedChunk {
    pub id: String,
    /// Keep the module's exports even when nothing imports them.
    pub preserve_signature: bool,
}

/// A file copied verbatim into the bundle output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedAsset {
    /// Output path relative to the bundle directory.
    pub file_name: String,
    pub source: String,
}

/// Compiled module text handed back to the bundler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadResult {
    pub code: String,
    pub map: Option<String>,
}
