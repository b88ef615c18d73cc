//! Parameter source implementations

mod env_source;
mod factory;
mod ssm_source;

pub use env_source::EnvParameterSource;
pub use factory::{DeploymentContext, SourceConfig, SourceFactory};
pub use ssm_source::{
    MAX_NAMES_PER_REQUEST, ParameterBatch, RealSsmClient, SsmClientTrait, SsmParameterSource,
};
