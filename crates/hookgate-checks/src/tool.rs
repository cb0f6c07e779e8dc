//! [`ToolCheck`]: a check backed by one external tool

use async_trait::async_trait;
use hookgate_core::{Check, CheckContext, CheckError, CheckMetadata, ToolSpec, execute};
use hookgate_exec::Deadline;

#[derive(Debug, Clone)]
pub struct ToolCheck {
    metadata: CheckMetadata,
    spec: ToolSpec,
}

impl ToolCheck {
    pub fn new(metadata: CheckMetadata, spec: ToolSpec) -> Self {
        Self { metadata, spec }
    }

    pub fn spec(&self) -> &ToolSpec {
        &self.spec
    }
}

#[async_trait]
impl Check for ToolCheck {
    fn metadata(&self) -> &CheckMetadata {
        &self.metadata
    }

    async fn run(
        &self,
        ctx: &CheckContext,
        deadline: &Deadline,
        files: &[String],
    ) -> Result<(), CheckError> {
        if files.is_empty() && self.metadata.requires_files {
            return Ok(());
        }
        let strategy = execute(ctx, deadline, &self.spec, files).await?;
        tracing::debug!(check = %self.metadata.name, ?strategy, "Check succeeded");
        Ok(())
    }
}
