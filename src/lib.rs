#[macro_use]
extern crate tracing;

pub mod config;
pub mod errors;
pub mod gate;
pub mod macros;
pub mod outcome;
pub mod probe;
pub mod setup;

pub use errors::ProbeError;
pub use gate::{AvailabilityGate, Invocation, TestDescriptor};
pub use outcome::{Failure, Outcome};
pub use probe::{Probe, ProbeResource, ProbeTarget, RedisProbe, DEFAULT_HOST, REDIS_PORT};
