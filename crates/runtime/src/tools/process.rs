//! Executor-backed tool host.

use super::ToolHost;
use crate::model::{ToolCall, ToolSpec};
use bridge::{Executor, ToolOutcome};
use catalog::Catalog;
use tracing::debug;

/// Tool host that validates calls against the catalog and runs each one in
/// a fresh executor process.
pub struct ProcessToolHost {
    catalog: Catalog,
    executor: Executor,
    specs: Vec<ToolSpec>,
}

impl ProcessToolHost {
    pub fn new(catalog: Catalog, executor: Executor) -> Self {
        let specs = catalog.tools().iter().map(ToolSpec::from).collect();
        Self {
            catalog,
            executor,
            specs,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

impl ToolHost for ProcessToolHost {
    fn specs(&self) -> &[ToolSpec] {
        &self.specs
    }

    fn upload_argument(&self, tool: &str) -> Option<&str> {
        self.catalog.upload_argument(tool)
    }

    async fn execute(&self, call: &ToolCall) -> ToolOutcome {
        if let Err(e) = self.catalog.validate(&call.name, &call.input) {
            debug!(tool = %call.name, error = %e, "rejected tool arguments");
            return ToolOutcome::Failure(format!("invalid arguments: {e}"));
        }
        self.executor.invoke(&call.name, &call.input).await
    }
}
