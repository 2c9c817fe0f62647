use crate::{state::query::QueryParams, Result};

/// Where the viewer's query string lives.
///
/// `replace` swaps the whole snapshot without creating a history entry, the
/// way `history.replaceState` does in a browser.
pub trait ParamStore {
    fn read(&self) -> Result<QueryParams>;

    fn replace(&mut self, params: &QueryParams) -> Result<()>;
}

/// In-process store that records every replacement
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    current: QueryParams,
    history: Vec<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with a query string such as `"?x=10&z=3"`
    pub fn from_query(query: &str) -> Self {
        Self {
            current: QueryParams::parse(query),
            history: Vec::new(),
        }
    }

    pub fn current(&self) -> &QueryParams {
        &self.current
    }

    /// Current query string, without the leading `?`
    pub fn query_string(&self) -> String {
        self.current.to_string()
    }

    /// Serialized snapshot of every replacement, oldest first
    pub fn history(&self) -> &[String] {
        &self.history
    }
}

impl ParamStore for MemoryStore {
    fn read(&self) -> Result<QueryParams> {
        Ok(self.current.clone())
    }

    fn replace(&mut self, params: &QueryParams) -> Result<()> {
        self.current = params.clone();
        self.history.push(params.to_string());
        Ok(())
    }
}
