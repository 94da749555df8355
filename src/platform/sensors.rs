//! Hardware temperature sensors backed by `sysinfo::Components`.
//!
//! `sysinfo` exposes a flat list of labeled components; this provider groups
//! them into synthetic CPU/GPU devices by the label conventions real sensor
//! drivers use (coretemp "Package id 0", k10temp "Tctl", amdgpu "edge", ...).

use sysinfo::Components;

use crate::core::monitor::{
    DeviceClass, DeviceHandle, HardwareSensorProvider, SensorKind, SensorReading,
};
use crate::error::{Result, TelemonError};

/// Sensor provider over the host's hardware monitoring components.
pub struct SysinfoSensorProvider {
    components: Option<Components>,
    groups: Vec<(DeviceClass, Vec<usize>)>,
}

impl SysinfoSensorProvider {
    pub fn new() -> Self {
        Self {
            components: None,
            groups: Vec::new(),
        }
    }

    fn rebuild_groups(&mut self) {
        self.groups.clear();
        let Some(components) = self.components.as_ref() else {
            return;
        };

        for (index, component) in components.iter().enumerate() {
            let Some(class) = classify_label(component.label()) else {
                continue;
            };
            match self.groups.iter_mut().find(|(c, _)| *c == class) {
                Some((_, indices)) => indices.push(index),
                None => self.groups.push((class, vec![index])),
            }
        }
    }
}

impl Default for SysinfoSensorProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl HardwareSensorProvider for SysinfoSensorProvider {
    fn open(&mut self) -> Result<()> {
        if self.components.is_none() {
            self.components = Some(Components::new_with_refreshed_list());
        }
        Ok(())
    }

    fn close(&mut self) {
        self.components = None;
        self.groups.clear();
    }

    fn list_devices(&mut self) -> Result<Vec<DeviceHandle>> {
        if self.components.is_none() {
            return Err(TelemonError::sensor("sensor provider is not open"));
        }
        self.rebuild_groups();

        Ok(self
            .groups
            .iter()
            .enumerate()
            .map(|(id, (class, _))| DeviceHandle { id, class: *class })
            .collect())
    }

    fn refresh(&mut self, device: &DeviceHandle) -> Result<()> {
        let Some(components) = self.components.as_mut() else {
            return Err(TelemonError::sensor("sensor provider is not open"));
        };

        components.refresh(true);
        self.rebuild_groups();

        // The refresh can drop components; make sure the device survived it.
        match self.groups.get(device.id) {
            Some((class, _)) if *class == device.class => Ok(()),
            _ => Err(TelemonError::sensor("device disappeared during refresh")),
        }
    }

    fn sensors(&self, device: &DeviceHandle) -> Vec<SensorReading> {
        let Some(components) = self.components.as_ref() else {
            return Vec::new();
        };
        let Some((_, indices)) = self.groups.get(device.id) else {
            return Vec::new();
        };

        indices
            .iter()
            .filter_map(|&index| components.get(index))
            .map(|component| SensorReading {
                kind: SensorKind::Temperature,
                label: component.label().to_string(),
                value: component.temperature().map(f64::from),
            })
            .collect()
    }
}

/// Map a component label onto a device class. GPU hints are checked first so
/// labels like "amdgpu" never land in the CPU bucket.
fn classify_label(label: &str) -> Option<DeviceClass> {
    let label = label.to_ascii_lowercase();

    if label.contains("nvidia") {
        return Some(DeviceClass::GpuNvidia);
    }
    if ["amdgpu", "radeon", "junction", "edge"]
        .iter()
        .any(|hint| label.contains(hint))
    {
        return Some(DeviceClass::GpuAmd);
    }
    if label.contains("i915") || label.contains("intel gpu") {
        return Some(DeviceClass::GpuIntel);
    }
    if [
        "coretemp",
        "package",
        "x86_pkg_temp",
        "tctl",
        "tdie",
        "k10temp",
        "cpu",
    ]
    .iter()
    .any(|hint| label.contains(hint))
    {
        return Some(DeviceClass::Cpu);
    }

    None
}
