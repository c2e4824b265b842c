//! Chat command handlers.
//!
//! Thin glue: validate arguments, call the shared daemon or search adapter,
//! format one reply. No retries and no state live here; the progress tracker
//! owns everything stateful.

pub mod add_torrent;
pub mod list_torrents;
pub mod movie_search;
pub mod purge;
pub mod start;
pub mod status;
pub mod torrent_status;
