//! Entry points
//!
//! Every entry point validates its options before touching the host, so a
//! configuration error never costs any I/O.

use mapchain_codec::RawSourceMap;
use mapchain_runtime::ChainHost;

use crate::chain::Chain;
use crate::error::Result;
use crate::link::ChainLink;
use crate::loader::load_chain;
use crate::options::ResolveOptions;
use crate::portal::Portal;

/// Load a chain without tracing it.
///
/// Links are given outermost first. Only the last link may lack a map; its
/// ancestry is discovered through `host`.
pub async fn load_async<I>(
    links: I,
    options: &ResolveOptions,
    host: &dyn ChainHost,
) -> Result<Chain>
where
    I: IntoIterator<Item = ChainLink>,
{
    options.validate()?;
    let base_dir = options.resolve_base_dir(host)?;
    load_chain(links.into_iter().collect(), &base_dir, host).await
}

pub fn load<I>(links: I, options: &ResolveOptions, host: &dyn ChainHost) -> Result<Chain>
where
    I: IntoIterator<Item = ChainLink>,
{
    pollster::block_on(load_async(links, options, host))
}

/// Collapse a chain into one source map from the first link back to the
/// original sources.
///
/// Returns `Ok(None)` when the chain is degenerate and there is nothing to
/// merge.
pub async fn resolve_async<I>(
    links: I,
    options: &ResolveOptions,
    host: &dyn ChainHost,
) -> Result<Option<RawSourceMap>>
where
    I: IntoIterator<Item = ChainLink>,
{
    let chain = load_async(links, options, host).await?;
    chain.apply_async(options, host).await
}

/// Blocking form of [`resolve_async`]
///
/// # Example
///
/// ```
/// use mapchain::{ChainLink, ResolveOptions, resolve};
/// use mapchain_runtime::NoopHost;
///
/// let map = resolve([ChainLink::content("function f(){}")], &ResolveOptions::default(), &NoopHost)
///     .unwrap();
/// assert!(map.is_none());
/// ```
pub fn resolve<I>(
    links: I,
    options: &ResolveOptions,
    host: &dyn ChainHost,
) -> Result<Option<RawSourceMap>>
where
    I: IntoIterator<Item = ChainLink>,
{
    pollster::block_on(resolve_async(links, options, host))
}

/// Load a chain and open a point-query [`Portal`] on it
pub async fn open_portal_async<I>(
    links: I,
    options: &ResolveOptions,
    host: &dyn ChainHost,
) -> Result<Portal>
where
    I: IntoIterator<Item = ChainLink>,
{
    Ok(Portal::new(load_async(links, options, host).await?))
}

pub fn open_portal<I>(links: I, options: &ResolveOptions, host: &dyn ChainHost) -> Result<Portal>
where
    I: IntoIterator<Item = ChainLink>,
{
    pollster::block_on(open_portal_async(links, options, host))
}
