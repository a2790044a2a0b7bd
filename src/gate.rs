use std::panic::{self, AssertUnwindSafe};

use crate::config::GateConfig;
use crate::outcome::{Failure, Outcome};
use crate::probe::{Probe, ProbeResource, ProbeTarget, RedisProbe};

/// Registration metadata for one test.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestDescriptor {
    pub name: String,
    pub requires_redis: bool,
}

impl TestDescriptor {
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requires_redis: false,
        }
    }

    pub fn requires_redis(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requires_redis: true,
        }
    }
}

/// State scoped to a single run of a single test.
///
/// The body may borrow the probe connection but never owns it; the gate
/// releases it after the body returns or unwinds.
pub struct Invocation<'a, P: Probe> {
    descriptor: &'a TestDescriptor,
    resource: Option<ProbeResource<'a, P>>,
}

impl<'a, P: Probe> Invocation<'a, P> {
    pub fn descriptor(&self) -> &TestDescriptor {
        self.descriptor
    }

    pub fn resource(&self) -> Option<&ProbeResource<'a, P>> {
        self.resource.as_ref()
    }

    pub fn connection(&mut self) -> Option<&mut P::Handle> {
        self.resource.as_mut().and_then(ProbeResource::handle_mut)
    }
}

/// Runs a test body only when the dependency it is marked with answers a probe.
#[derive(Clone, Debug)]
pub struct AvailabilityGate<P> {
    probe: P,
}

impl AvailabilityGate<RedisProbe> {
    /// Gate probing Redis on `localhost:6379`.
    pub fn redis() -> Self {
        Self::new(RedisProbe::default())
    }

    pub fn from_config(config: &GateConfig) -> Self {
        Self::new(RedisProbe::new(config.target()))
    }
}

impl<P: Probe> AvailabilityGate<P> {
    pub fn new(probe: P) -> Self {
        Self { probe }
    }

    pub fn target(&self) -> &ProbeTarget {
        self.probe.target()
    }

    pub fn skip_reason(&self) -> String {
        format!(
            "Skipping test due to Redis not being available on port: {}",
            self.target().port
        )
    }

    pub fn run<F>(&self, descriptor: &TestDescriptor, body: F) -> Outcome
    where
        F: FnOnce(&mut Invocation<'_, P>) -> anyhow::Result<()>,
    {
        if !descriptor.requires_redis {
            let mut invocation = Invocation {
                descriptor,
                resource: None,
            };
            return Self::evaluate(body, &mut invocation);
        }

        let handle = match self.probe.open() {
            Ok(handle) => handle,
            Err(err) => {
                info!(
                    "{} not run, probe of {} failed: {err:#}",
                    descriptor.name,
                    self.target()
                );
                return Outcome::Skip(self.skip_reason());
            }
        };

        let mut invocation = Invocation {
            descriptor,
            resource: Some(ProbeResource::new(&self.probe, handle)),
        };
        let outcome = Self::evaluate(body, &mut invocation);

        if let Some(mut resource) = invocation.resource.take() {
            if let Err(err) = resource.release() {
                warn!(
                    "Failed to release probe connection to {} after {}: {err:#}",
                    resource.target(),
                    descriptor.name
                );
            }
        }
        outcome
    }

    fn evaluate<F>(body: F, invocation: &mut Invocation<'_, P>) -> Outcome
    where
        F: FnOnce(&mut Invocation<'_, P>) -> anyhow::Result<()>,
    {
        match panic::catch_unwind(AssertUnwindSafe(|| body(invocation))) {
            Ok(Ok(())) => Outcome::Pass,
            Ok(Err(err)) => Outcome::Fail(Failure::Error(err)),
            Err(payload) => Outcome::Fail(Failure::Panic(payload)),
        }
    }
}
