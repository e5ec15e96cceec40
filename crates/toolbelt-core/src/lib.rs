//! toolbelt-core: the provisioning orchestrator.
//!
//! Discovers self-contained tool directories, ensures each one has a
//! healthy isolated environment, synchronizes its declared dependencies,
//! and atomically publishes a command shim into a shared bin directory.
//! The tools' own business logic is out of scope; they are consumed purely
//! through the entry-point + manifest contract.

pub mod config;
pub mod discovery;
pub mod envs;
pub mod error;
pub mod orchestrator;
pub mod process;
pub mod publish;
pub mod sync;
pub mod wrapper;

#[cfg(test)]
pub(crate) mod testing;

pub use config::ProvisionConfig;
pub use discovery::{discover_tools, ToolDescriptor};
pub use envs::EnvironmentHandle;
pub use error::{DiscoveryError, EnvironmentError, InstallError, ToolError, WrapperError};
pub use orchestrator::{
    provision_all, provision_tool, InstallationOutcome, NullReporter, OutcomeStatus, Reporter,
    RunSummary,
};
pub use process::{CommandRunner, Invocation, ProcessOutput, SystemRunner};
pub use wrapper::{generate_wrapper, WrapperArtifact};
