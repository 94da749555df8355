//! Cumulative CPU time sources.
//!
//! The tracker's accounting model expects kernel time to include idle time;
//! every source here normalizes its counters to that model.

use std::fs;
use std::path::PathBuf;

use crate::core::monitor::{CpuTimeSnapshot, SystemTimeSource};
use crate::error::{Result, TelemonError};

/// Pick the cumulative time source for the current platform.
///
/// On platforms without one the monitor still works; CPU usage degrades
/// to 0.0.
pub fn default_time_source() -> Box<dyn SystemTimeSource> {
    #[cfg(target_os = "linux")]
    {
        Box::new(ProcStatTimeSource::new())
    }
    #[cfg(windows)]
    {
        Box::new(WindowsTimeSource)
    }
    #[cfg(not(any(target_os = "linux", windows)))]
    {
        Box::new(UnsupportedTimeSource)
    }
}

/// Cumulative CPU times parsed from the aggregate `cpu` line of
/// `/proc/stat`.
///
/// Mapping into the kernel-includes-idle model:
/// user = user + nice, idle = idle + iowait,
/// kernel = system + irq + softirq + idle.
pub struct ProcStatTimeSource {
    path: PathBuf,
}

impl ProcStatTimeSource {
    pub fn new() -> Self {
        Self::with_path("/proc/stat")
    }

    /// Read from an arbitrary stat-format file (used by tests).
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn parse(content: &str) -> Result<CpuTimeSnapshot> {
        let line = content
            .lines()
            .find(|line| line.starts_with("cpu "))
            .ok_or_else(|| TelemonError::metric_collection("no aggregate cpu line in stat file"))?;

        let fields: Vec<u64> = line
            .split_whitespace()
            .skip(1)
            .map(|field| field.parse().unwrap_or(0))
            .collect();
        if fields.len() < 4 {
            return Err(TelemonError::metric_collection(
                "aggregate cpu line has too few fields",
            ));
        }

        let field = |i: usize| fields.get(i).copied().unwrap_or(0);
        let user = field(0).saturating_add(field(1));
        let system = field(2);
        let idle = field(3).saturating_add(field(4));
        let irq = field(5).saturating_add(field(6));

        Ok(CpuTimeSnapshot {
            idle,
            kernel: system.saturating_add(irq).saturating_add(idle),
            user,
        })
    }
}

impl Default for ProcStatTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemTimeSource for ProcStatTimeSource {
    fn query_cumulative_times(&mut self) -> Result<CpuTimeSnapshot> {
        let content = fs::read_to_string(&self.path)?;
        Self::parse(&content)
    }
}

/// Cumulative CPU times from `GetSystemTimes`; the native source of the
/// kernel-includes-idle accounting model.
#[cfg(windows)]
pub struct WindowsTimeSource;

#[cfg(windows)]
impl SystemTimeSource for WindowsTimeSource {
    fn query_cumulative_times(&mut self) -> Result<CpuTimeSnapshot> {
        use windows_sys::Win32::Foundation::FILETIME;
        use windows_sys::Win32::System::SystemInformation::GetSystemTimes;

        fn filetime_u64(ft: FILETIME) -> u64 {
            ((ft.dwHighDateTime as u64) << 32) | ft.dwLowDateTime as u64
        }

        let mut idle = FILETIME {
            dwLowDateTime: 0,
            dwHighDateTime: 0,
        };
        let mut kernel = idle;
        let mut user = idle;

        let ok = unsafe { GetSystemTimes(&mut idle, &mut kernel, &mut user) };
        if ok == 0 {
            return Err(TelemonError::metric_collection("GetSystemTimes failed"));
        }

        Ok(CpuTimeSnapshot {
            idle: filetime_u64(idle),
            kernel: filetime_u64(kernel),
            user: filetime_u64(user),
        })
    }
}

/// Fallback for platforms without a cumulative counter source.
#[cfg(not(any(target_os = "linux", windows)))]
pub struct UnsupportedTimeSource;

#[cfg(not(any(target_os = "linux", windows)))]
impl SystemTimeSource for UnsupportedTimeSource {
    fn query_cumulative_times(&mut self) -> Result<CpuTimeSnapshot> {
        Err(TelemonError::system_monitor(
            "cumulative CPU times not available on this platform",
        ))
    }
}
