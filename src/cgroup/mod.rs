//! Mapping a systemd service to the set of processes in its control group.
//!
//! Resolution happens once per run and is fatal when it fails; discovery
//! happens on every tick and never fails.
//!
//! # Key Components
//!
//! - [`ControlGroupSource`]: Produces the control-group identifier, e.g. by
//!   asking systemd ([`SystemdControlGroup`]) or taking it verbatim
//!   ([`LiteralControlGroup`]).
//! - [`CgroupPathResolver`]: Maps the identifier onto the cgroup v2 filesystem.
//! - [`ProcessSetDiscoverer`]: Lists the PIDs currently in the group and all
//!   nested sub-groups.
//!
//! # Platform Requirements
//!
//! - Linux with cgroup v2 (unified hierarchy).
//! - Read access to `cgroup.procs` files below the service's group.
mod discovery;
mod error;
mod resolver;
mod source;

pub use discovery::{CgroupDiscoverer, ProcessSetDiscoverer};
pub use error::{ResolutionError, Result};
pub use resolver::CgroupPathResolver;
pub use source::{ControlGroupSource, LiteralControlGroup, SystemdControlGroup};
