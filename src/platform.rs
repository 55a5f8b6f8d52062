//! Host platform detection and the environment snapshot recorded in reports.
use std::fmt;

use serde::Serialize;

use crate::config::settings::RuntimeProbe;
use crate::exec::Executor;

/// Detected operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    /// Apple macOS.
    MacOs,
    /// Linux.
    Linux,
    /// Anything else.
    Other,
}

impl Os {
    /// The OS this binary was built for.
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else {
            Self::Other
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MacOs => write!(f, "macos"),
            Self::Linux => write!(f, "linux"),
            Self::Other => write!(f, "{}", std::env::consts::OS),
        }
    }
}

/// A runtime's reported version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuntimeVersion {
    /// Probe name (e.g. `"node"`).
    pub name: String,
    /// First non-empty output line, or `None` when the probe failed.
    pub version: Option<String>,
}

/// Versions of the host and its tooling at run time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentSnapshot {
    /// Operating system.
    pub os: Os,
    /// OS version string, when it could be determined.
    pub os_version: Option<String>,
    /// Login shell from `$SHELL`.
    pub shell: Option<String>,
    /// One entry per configured probe, in probe order.
    pub runtimes: Vec<RuntimeVersion>,
}

impl EnvironmentSnapshot {
    /// Collect a snapshot for the current host using `$SHELL`.
    #[must_use]
    pub fn detect(executor: &dyn Executor, probes: &[RuntimeProbe]) -> Self {
        Self::collect(
            executor,
            Os::current(),
            std::env::var("SHELL").ok(),
            probes,
        )
    }

    /// Collect a snapshot for `os` with an explicit shell.
    ///
    /// Probes that cannot be spawned or exit non-zero record `None`.
    #[must_use]
    pub fn collect(
        executor: &dyn Executor,
        os: Os,
        shell: Option<String>,
        probes: &[RuntimeProbe],
    ) -> Self {
        let os_version = match os {
            Os::MacOs => first_line(executor, "sw_vers", &["-productVersion"]),
            Os::Linux | Os::Other => first_line(executor, "uname", &["-sr"]),
        };
        let runtimes = probes
            .iter()
            .map(|probe| RuntimeVersion {
                name: probe.name.clone(),
                version: probe.command.split_first().and_then(|(program, args)| {
                    let args: Vec<&str> = args.iter().map(String::as_str).collect();
                    first_line(executor, program, &args)
                }),
            })
            .collect();
        Self {
            os,
            os_version,
            shell: shell.filter(|s| !s.is_empty()),
            runtimes,
        }
    }
}

/// First non-empty line of a successful command's stdout, falling back to
/// stderr (some tools print versions there).
fn first_line(executor: &dyn Executor, program: &str, args: &[&str]) -> Option<String> {
    let result = executor.run_unchecked(program, args).ok()?;
    if !result.success {
        return None;
    }
    [result.stdout.as_str(), result.stderr.as_str()]
        .into_iter()
        .flat_map(str::lines)
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(String::from)
}
