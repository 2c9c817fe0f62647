//! View state kept in the page URL: the query codec, where the query lives,
//! and the synchronizer that writes map changes back into it.

pub mod query;
pub mod store;
pub mod sync;
pub mod view;

pub use query::{parse_number, to_fixed, QueryParams};
pub use store::{MemoryStore, ParamStore};
pub use sync::ViewStateSync;
pub use view::ViewState;
