//! Assembling the composite source map from a traced chain

use mapchain_codec::{RawSourceMap, SOURCE_MAP_VERSION, encode};
use mapchain_runtime::{ChainHost, paths};

use crate::chain::Chain;
use crate::error::Result;
use crate::node::NodeId;
use crate::options::{ResolveOptions, source_root_dir};

impl Chain {
    /// Build the composite map from the root back to the original sources.
    ///
    /// Returns `Ok(None)` for a degenerate chain, where the input map (if
    /// any) already says everything there is to say.
    pub async fn apply_async(
        &self,
        options: &ResolveOptions,
        host: &dyn ChainHost,
    ) -> Result<Option<RawSourceMap>> {
        options.validate()?;

        if self.is_degenerate() {
            tracing::debug!("Chain has nothing to merge; no composite map produced");
            return Ok(None);
        }
        let Some(traced) = self.trace(self.root()) else {
            return Ok(None);
        };

        let origins: Vec<NodeId> = traced.origins().collect();
        let source_root = if origins.len() > 1
            || origins
                .first()
                .is_some_and(|&id| self.node(id).file.is_some())
        {
            options.source_root_slashed()
        } else {
            String::new()
        };

        let base_dir = options.resolve_base_dir(host)?;
        let relative_to = source_root_dir(&base_dir, &source_root);
        let sources = origins
            .iter()
            .map(|&id| {
                self.node(id)
                    .file
                    .as_deref()
                    .map(|path| paths::display_slash(&paths::relative(&relative_to, path)))
            })
            .collect();

        let sources_content = if options.include_content {
            let mut contents = Vec::with_capacity(origins.len());
            for &id in &origins {
                contents.push(self.source_content(id, host).await?);
            }
            contents
        } else {
            vec![None; origins.len()]
        };

        tracing::debug!(
            sources = origins.len(),
            segments = traced.table().segment_count(),
            "Assembled composite map"
        );

        Ok(Some(RawSourceMap {
            version: SOURCE_MAP_VERSION,
            file: Some(options.generated_file_slashed()),
            source_root: Some(source_root),
            sources,
            sources_content: Some(sources_content),
            names: traced.names().map(str::to_string).collect(),
            mappings: encode(traced.table()),
        }))
    }

    /// Blocking form of [`Chain::apply_async`]
    pub fn apply(
        &self,
        options: &ResolveOptions,
        host: &dyn ChainHost,
    ) -> Result<Option<RawSourceMap>> {
        pollster::block_on(self.apply_async(options, host))
    }

    /// Text of an origin: loaded content first, then the host
    async fn source_content(&self, id: NodeId, host: &dyn ChainHost) -> Result<Option<String>> {
        let node = self.node(id);
        if let Some(content) = &node.content {
            return Ok(Some(content.clone()));
        }
        let Some(path) = node.file.as_deref() else {
            return Ok(None);
        };
        if let Some(cached) = self.files.get(path) {
            return Ok(cached.clone());
        }
        Ok(host.read_file_async(path).await?)
    }
}
