use anyhow::{Result, anyhow};
use tracing::trace;

use super::stage::Stage;

pub struct ObjectLister {
    base: Stage,
}

impl ObjectLister {
    pub fn new(base: Stage) -> Self {
        Self { base }
    }

    /// Feed every object under the configured bucket and prefix into the stage sender.
    /// The channel closes when the lister is dropped.
    pub async fn list_source(&self, max_keys: i32) -> Result<()> {
        trace!("list source objects has started.");

        let source = self
            .base
            .source
            .as_ref()
            .ok_or_else(|| anyhow!("source storage is not set."))?;
        let sender = self
            .base
            .sender
            .as_ref()
            .ok_or_else(|| anyhow!("sender is not set."))?;

        source
            .list_objects(
                &self.base.config.bucket,
                &self.base.config.prefix,
                sender,
                max_keys,
            )
            .await?;

        trace!("list source objects has been completed.");
        Ok(())
    }
}
