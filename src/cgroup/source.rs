use std::process::Command;

use super::{ResolutionError, Result};

/// Produces the control-group identifier of the monitored service.
pub trait ControlGroupSource {
    /// Returns an identifier relative to the cgroup root, e.g.
    /// `/system.slice/nginx.service`.
    fn control_group(&self) -> Result<String>;
}

/// An identifier supplied verbatim by the user.
#[derive(Debug, Clone)]
pub struct LiteralControlGroup(pub String);

impl ControlGroupSource for LiteralControlGroup {
    fn control_group(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// Asks systemd for the `ControlGroup` property of a unit.
#[derive(Debug, Clone)]
pub struct SystemdControlGroup {
    service: String,
    program: String,
}

impl SystemdControlGroup {
    /// Queries `systemctl` found on `PATH`.
    pub fn new(service: impl Into<String>) -> Self {
        Self::with_program(service, "systemctl")
    }

    /// Queries a specific `systemctl` compatible binary.
    pub fn with_program(service: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            program: program.into(),
        }
    }
}

impl ControlGroupSource for SystemdControlGroup {
    /// Runs `systemctl show --property ControlGroup --value <service>`.
    ///
    /// # Errors
    ///
    /// - [`ResolutionError::ServiceManagerUnavailable`] if the program cannot be spawned.
    /// - [`ResolutionError::ServiceManager`] if it exits unsuccessfully.
    /// - [`ResolutionError::NoControlGroup`] if the unit has no control group,
    ///   which systemd reports as an empty value for units that are not running.
    fn control_group(&self) -> Result<String> {
        let output = Command::new(&self.program)
            .args(["show", "--property", "ControlGroup", "--value"])
            .arg(&self.service)
            .output()
            .map_err(|source| ResolutionError::ServiceManagerUnavailable {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ResolutionError::ServiceManager {
                program: self.program.clone(),
                service: self.service.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        let value = String::from_utf8_lossy(&output.stdout).trim().to_owned();
        if value.is_empty() || value == "/" {
            return Err(ResolutionError::NoControlGroup {
                service: self.service.clone(),
            });
        }

        log::debug!("Service `{}` runs in control group `{value}`", self.service);
        Ok(value)
    }
}
