//! Chain loading: turning link descriptions into a node arena
//!
//! Caller links are built last-to-first so each node can point at its
//! already-built successor. The last link's ancestry is then discovered
//! breadth-first through the host, one awaited call at a time.

use mapchain_codec::RawSourceMap;
use mapchain_runtime::{ChainHost, paths};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

use crate::chain::{Chain, FileCache, Visit, find_back_edges};
use crate::error::{ChainError, Result};
use crate::link::ChainLink;
use crate::node::{Node, NodeId, NodeMap, check_document};

/// Load a chain, resolving relative paths against `base_dir`.
pub(crate) async fn load_chain(
    links: Vec<ChainLink>,
    base_dir: &Path,
    host: &dyn ChainHost,
) -> Result<Chain> {
    if links.is_empty() {
        return Err(ChainError::EmptyChain);
    }

    let mut loader = Loader {
        host,
        base_dir: base_dir.to_path_buf(),
        nodes: Vec::new(),
        by_path: HashMap::new(),
        files: FileCache::default(),
        pending: VecDeque::new(),
    };

    let count = links.len();
    let mut last_is_original = false;
    let mut next: Option<NodeId> = None;

    for (index, link) in links.into_iter().enumerate().rev() {
        let (file, content, map) = link.into_parts();
        let file = file.map(|f| paths::resolve(&loader.base_dir, &f));
        let content = match (content, &file) {
            (Some(content), _) => Some(content),
            (None, Some(path)) => loader.read(path).await?,
            (None, None) => None,
        };
        let map = match map {
            Some(map) => Some(map),
            None => {
                host.get_map_async(file.as_deref(), content.as_deref())
                    .await?
            }
        };

        let id = loader.push(Node::original(file.clone(), content));
        if let Some(path) = file {
            loader.by_path.entry(path).or_insert(id);
        }

        match (map, next) {
            (None, Some(_)) => return Err(ChainError::ChainIntegrity { index }),
            (None, None) => last_is_original = true,
            (Some(raw), Some(successor)) => {
                let upstream = vec![successor; raw.sources.len().max(1)];
                loader.attach(id, &raw, upstream)?;
            }
            (Some(raw), None) => {
                check_document(&raw).map_err(|reason| loader.invalid(id, reason))?;
                loader.pending.push_back((id, raw));
            }
        }
        next = Some(id);
    }

    loader.load_ancestry().await?;

    // `next` is the node of the first link once the loop has run
    let root = next.ok_or(ChainError::EmptyChain)?;
    loader.break_cycles(root);

    let degenerate = count <= 2 && last_is_original;
    tracing::debug!(
        links = count,
        nodes = loader.nodes.len(),
        degenerate,
        "Loaded chain"
    );
    Ok(Chain::new(loader.nodes, root, degenerate, loader.files))
}

struct Loader<'h> {
    host: &'h dyn ChainHost,
    base_dir: PathBuf,
    nodes: Vec<Node>,
    by_path: HashMap<PathBuf, NodeId>,
    files: FileCache,
    /// Nodes whose map is known but whose sources are not loaded yet
    pending: VecDeque<(NodeId, RawSourceMap)>,
}

impl Loader<'_> {
    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    async fn read(&mut self, path: &Path) -> Result<Option<String>> {
        if let Some(cached) = self.files.get(path) {
            return Ok(cached.clone());
        }
        let content = self.host.read_file_async(path).await?;
        if content.is_none() {
            tracing::debug!(file = %path.display(), "Host has no content for file");
        }
        self.files.insert(path.to_path_buf(), content.clone());
        Ok(content)
    }

    fn invalid(&self, id: NodeId, reason: crate::error::MapError) -> ChainError {
        let file = match &self.nodes[id.0].file {
            Some(path) => paths::display_slash(path),
            None => "<anonymous>".to_string(),
        };
        ChainError::InvalidMap { file, reason }
    }

    /// Decode `raw` and make it the map of node `id`
    fn attach(&mut self, id: NodeId, raw: &RawSourceMap, upstream: Vec<NodeId>) -> Result<()> {
        check_document(raw).map_err(|reason| self.invalid(id, reason))?;
        let table = raw
            .decode_mappings()
            .map_err(|err| self.invalid(id, err.into()))?;
        let map = NodeMap::new(table, raw.names.clone(), upstream)
            .map_err(|reason| self.invalid(id, reason))?;
        self.nodes[id.0].map = Some(map);
        Ok(())
    }

    /// Load the sources of every pending map until only termini remain
    async fn load_ancestry(&mut self) -> Result<()> {
        while let Some((id, raw)) = self.pending.pop_front() {
            let dir = self.nodes[id.0]
                .file
                .as_deref()
                .and_then(Path::parent)
                .map(Path::to_path_buf)
                .unwrap_or_else(|| self.base_dir.clone());
            let source_dir = match raw.source_root.as_deref() {
                Some(root) if !root.is_empty() => paths::resolve(&dir, Path::new(root)),
                _ => dir,
            };

            let mut upstream = Vec::with_capacity(raw.sources.len());
            for (index, source) in raw.sources.iter().enumerate() {
                let inline = raw.source_content(index).map(str::to_string);
                let up = match source {
                    Some(source) => {
                        let path = paths::resolve(&source_dir, Path::new(source));
                        self.load_source(path, inline).await?
                    }
                    None => self.push(Node::original(None, inline)),
                };
                upstream.push(up);
            }

            self.attach(id, &raw, upstream)?;
        }
        Ok(())
    }

    /// The node for an ancestor file, loading it on first sight
    async fn load_source(&mut self, path: PathBuf, inline: Option<String>) -> Result<NodeId> {
        if let Some(&existing) = self.by_path.get(&path) {
            return Ok(existing);
        }

        let content = match inline {
            Some(content) => Some(content),
            None => self.read(&path).await?,
        };
        let map = self
            .host
            .get_map_async(Some(&path), content.as_deref())
            .await?;
        tracing::trace!(file = %path.display(), mapped = map.is_some(), "Loaded ancestor");

        let id = self.push(Node::original(Some(path.clone()), content));
        self.by_path.insert(path, id);
        if let Some(raw) = map {
            check_document(&raw).map_err(|reason| self.invalid(id, reason))?;
            self.pending.push_back((id, raw));
        }
        Ok(id)
    }

    /// Replace every edge that closes a cycle with a fresh terminus
    fn break_cycles(&mut self, root: NodeId) {
        let mut state = vec![Visit::New; self.nodes.len()];
        let mut back_edges = Vec::new();
        find_back_edges(&self.nodes, root, &mut state, &mut back_edges);

        for (from, slot) in back_edges {
            let Some(target) = self.nodes[from.0]
                .map
                .as_ref()
                .map(|map| map.upstream()[slot])
            else {
                continue;
            };
            let target_node = &self.nodes[target.0];
            let copy = Node::original(target_node.file.clone(), target_node.content.clone());
            tracing::warn!(
                file = %target_node
                    .file
                    .as_deref()
                    .map(paths::display_slash)
                    .unwrap_or_default(),
                "Source map chain refers back to itself; treating the file as original"
            );
            let copy = self.push(copy);
            if let Some(map) = self.nodes[from.0].map.as_mut() {
                map.redirect(slot, copy);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapchain_runtime::{MemoryHost, NoopHost};

    fn load(links: Vec<ChainLink>, host: &dyn ChainHost) -> Result<Chain> {
        let base_dir = host.cwd()?;
        pollster::block_on(load_chain(links, &base_dir, host))
    }

    fn map_json(sources: &str, mappings: &str) -> String {
        format!(r#"{{"version":3,"sources":{sources},"names":[],"mappings":"{mappings}"}}"#)
    }

    #[test]
    fn test_empty_chain() {
        assert!(matches!(
            load(vec![], &NoopHost),
            Err(ChainError::EmptyChain)
        ));
    }

    #[test]
    fn test_unmapped_intermediate_link() {
        let err = load(vec!["a()".into(), "b()".into()], &NoopHost).unwrap_err();
        assert!(matches!(err, ChainError::ChainIntegrity { index: 0 }));
    }

    #[test]
    fn test_single_original_is_degenerate() {
        let chain = load(vec!["function f(){}".into()], &NoopHost).unwrap();
        assert!(chain.is_degenerate());
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn test_caller_links_are_wired_in_order() {
        let map = RawSourceMap::from_json(&map_json(r#"["b.js"]"#, "AAAA")).unwrap();
        let links = vec![
            ChainLink::file("a.js").with_content("a").with_map(map),
            ChainLink::file("b.js").with_content("b"),
        ];
        let chain = load(links, &MemoryHost::with_cwd("/work")).unwrap();

        let root = chain.node(chain.root());
        assert_eq!(root.file.as_deref(), Some(Path::new("/work/a.js")));
        let upstream = root.map.as_ref().unwrap().upstream()[0];
        assert_eq!(chain.node(upstream).content.as_deref(), Some("b"));
        assert!(chain.is_degenerate());
    }

    #[test]
    fn test_discovers_ancestry_of_last_link() {
        let host = MemoryHost::with_cwd("/work")
            .with_file("dist/out.js", "a();\n//# sourceMappingURL=out.js.map")
            .with_file(
                "dist/out.js.map",
                r#"{"version":3,"sourceRoot":"../src","sources":["a.ts"],"names":[],"mappings":"AAAA"}"#,
            )
            .with_file("src/a.ts", "a();");

        let chain = load(vec![ChainLink::file("dist/out.js")], &host).unwrap();
        assert_eq!(chain.len(), 2);
        assert!(!chain.is_degenerate());

        let root = chain.node(chain.root()).map.as_ref().unwrap();
        let origin = chain.node(root.upstream()[0]);
        assert_eq!(origin.file.as_deref(), Some(Path::new("/work/src/a.ts")));
        assert_eq!(origin.content.as_deref(), Some("a();"));
        assert!(origin.is_original());
    }

    #[test]
    fn test_shared_ancestor_loads_once() {
        let map = RawSourceMap::from_json(&map_json(r#"["a.js","./lib/../a.js"]"#, "AAAA,EACA"))
            .unwrap();
        let chain = load(
            vec![ChainLink::content("x").with_map(map)],
            &MemoryHost::new().with_file("a.js", "a"),
        )
        .unwrap();

        let root = chain.node(chain.root()).map.as_ref().unwrap();
        assert_eq!(root.upstream()[0], root.upstream()[1]);
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_null_source_is_anonymous_terminus() {
        let map = RawSourceMap::from_json(
            r#"{"version":3,"sources":[null],"sourcesContent":["inline"],"names":[],"mappings":"AAAA"}"#,
        )
        .unwrap();
        let chain = load(vec![ChainLink::content("x").with_map(map)], &NoopHost).unwrap();

        let root = chain.node(chain.root()).map.as_ref().unwrap();
        let origin = chain.node(root.upstream()[0]);
        assert!(origin.file.is_none());
        assert_eq!(origin.content.as_deref(), Some("inline"));
    }

    #[test]
    fn test_self_reference_is_broken() {
        let host = MemoryHost::new()
            .with_file("a.js", "a();\n//# sourceMappingURL=a.js.map")
            .with_file("a.js.map", map_json(r#"["a.js"]"#, "AAAA"));

        let chain = load(vec![ChainLink::file("a.js")], &host).unwrap();
        let root = chain.node(chain.root());
        let upstream = root.map.as_ref().unwrap().upstream()[0];
        assert_ne!(upstream, chain.root());

        let copy = chain.node(upstream);
        assert!(copy.is_original());
        assert_eq!(copy.file, root.file);
    }

    #[test]
    fn test_invalid_map_names_the_file() {
        let map = RawSourceMap::from_json(&map_json(r#"["b.js"]"#, "AACA")).unwrap();
        let err = load(
            vec![ChainLink::file("/a.js").with_content("a").with_map(map)],
            &NoopHost,
        )
        .unwrap_err();
        match err {
            ChainError::InvalidMap { file, .. } => assert_eq!(file, "/a.js"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_content_is_read_once() {
        let map = RawSourceMap::from_json(&map_json(r#"["a.js"]"#, "AAAA")).unwrap();
        let host = MemoryHost::new().with_file("a.js", "a");
        let chain = load(
            vec![
                ChainLink::content("x").with_map(map),
                ChainLink::file("a.js"),
            ],
            &host,
        )
        .unwrap();
        assert_eq!(chain.files.get(Path::new("/a.js")), Some(&Some("a".to_string())));
    }
}
