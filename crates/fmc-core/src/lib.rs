// fmc-core: Controller orchestration between fmc-api and consumers (CLI).

pub mod config;
pub mod controller;
pub mod error;
pub mod model;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ControllerConfig, TlsVerification};
pub use controller::ManagedFmc;
pub use error::CoreError;
pub use model::{
    ConfigurationReport, ConfigurationStatus, DeploymentStatus, DesiredConfiguration,
    FtdvRegistration, InterfaceAssessment, InterfaceStatus, Reachability, RegistrationStatus,
    Resolved, ResolvedConfiguration,
};

// Wire types callers need to build requests.
pub use fmc_api::models::{InterfaceAddressing, InterfaceConfig, NamedObject, ObjectRef};
pub use fmc_api::{Credentials, Error as ApiError, ObjectKind, ProbePolicy, TokenGrant};
