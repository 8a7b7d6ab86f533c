//! AUR RPC response mapping.
//!
//! - **events**: flat JSON event stream produced from `serde_json`
//! - **mapper**: search and info state machines over that stream
//! - **record**: the typed records they produce
//! - **filter**: anchored (`^foo$`) search queries

pub mod events;
pub mod filter;
pub mod mapper;
pub mod record;

pub use events::{Container, EventSink, JsonEvent, Scalar, collect_events, feed_json};
pub use filter::SearchQuery;
pub use mapper::{InfoMapper, SearchMapper, map_info_response, map_search_response};
pub use record::{RpcRecord, RpcResultSet, RpcValue, rename_key};
