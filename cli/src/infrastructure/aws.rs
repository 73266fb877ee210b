//! AWS CLI availability check

use tracing::{debug, info};

use crate::error::PreconditionError;
use crate::tools::tools;

use super::process::{CommandSpec, ProcessRunner};

/// Verify the AWS CLI is installed and configured
///
/// Runs `aws configure list`; any failure to start it or a nonzero exit
/// means the deployment tooling cannot work.
pub async fn check_cloud_cli<R: ProcessRunner + ?Sized>(
    runner: &R,
) -> Result<(), PreconditionError> {
    let spec = CommandSpec::new(tools::AWS, &["configure", "list"]).quiet();

    match runner.run(&spec).await {
        Ok(output) => {
            debug!("aws configure list:\n{}", output.stdout.trim_end());
            if !output.stderr.trim().is_empty() {
                debug!("aws configure list stderr:\n{}", output.stderr.trim_end());
            }
            info!("AWS CLI found");
            Ok(())
        }
        Err(e) => Err(PreconditionError::CloudCliUnavailable {
            detail: e.to_string(),
        }),
    }
}
