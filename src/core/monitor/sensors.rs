use crate::error::Result;

/// Hardware device classes exposed by a sensor provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Cpu,
    GpuNvidia,
    GpuAmd,
    GpuIntel,
}

impl DeviceClass {
    /// Whether this class is any GPU vendor variant.
    pub fn is_gpu(&self) -> bool {
        !matches!(self, DeviceClass::Cpu)
    }
}

/// Kinds of sensors a device can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorKind {
    Temperature,
    Utilization,
}

/// One sensor reading. `value` is `None` when the sensor exists but could
/// not be read (e.g. restricted privileges).
#[derive(Debug, Clone)]
pub struct SensorReading {
    pub kind: SensorKind,
    pub label: String,
    pub value: Option<f64>,
}

/// Cheap descriptor identifying a device within its provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceHandle {
    pub id: usize,
    pub class: DeviceClass,
}

/// Trait for hardware sensor providers
///
/// Exposes a refreshable list of devices, each with named sensors.
/// Implementations are provided in the platform layer.
pub trait HardwareSensorProvider: Send {
    /// Open the provider session.
    ///
    /// Failure (e.g. insufficient privileges) is non-fatal: the provider
    /// remains usable in a degraded state where queries consistently return
    /// nothing.
    fn open(&mut self) -> Result<()>;

    /// Close the provider session. Idempotent.
    fn close(&mut self);

    fn list_devices(&mut self) -> Result<Vec<DeviceHandle>>;

    /// Force a refresh of the device's sensor readings.
    fn refresh(&mut self, device: &DeviceHandle) -> Result<()>;

    fn sensors(&self, device: &DeviceHandle) -> Vec<SensorReading>;
}

/// Queries a [`HardwareSensorProvider`] for best-match temperature sensors
/// per device class.
///
/// Sensor absence is a normal, expected condition; every failure path
/// degrades to `None`.
pub struct SensorAggregator {
    provider: Box<dyn HardwareSensorProvider>,
}

impl SensorAggregator {
    /// Wrap a provider, opening its session.
    ///
    /// An `open` failure leaves the aggregator functional but degraded:
    /// every temperature query returns `None`.
    pub fn new(mut provider: Box<dyn HardwareSensorProvider>) -> Self {
        if let Err(e) = provider.open() {
            log::warn!(
                "hardware sensor provider open failed, temperatures degrade to None: {}",
                e
            );
        }
        Self { provider }
    }

    /// Temperature of the first CPU device, preferring a sensor whose label
    /// contains "Package" over the first temperature sensor found.
    pub fn cpu_temperature(&mut self) -> Option<f64> {
        self.temperature_where(|class| *class == DeviceClass::Cpu, true)
    }

    /// Temperature of the first GPU device of any vendor.
    ///
    /// Only the first matching device is queried; multi-GPU temperatures are
    /// not aggregated.
    pub fn gpu_temperature(&mut self) -> Option<f64> {
        self.temperature_where(DeviceClass::is_gpu, false)
    }

    fn temperature_where(
        &mut self,
        matches: impl Fn(&DeviceClass) -> bool,
        prefer_package: bool,
    ) -> Option<f64> {
        let devices = match self.provider.list_devices() {
            Ok(devices) => devices,
            Err(e) => {
                log::debug!("sensor device listing failed: {}", e);
                return None;
            }
        };

        let device = devices.into_iter().find(|d| matches(&d.class))?;

        if let Err(e) = self.provider.refresh(&device) {
            log::debug!("sensor refresh failed for {:?}: {}", device.class, e);
            return None;
        }

        let sensors = self.provider.sensors(&device);
        let temperatures: Vec<&SensorReading> = sensors
            .iter()
            .filter(|s| s.kind == SensorKind::Temperature)
            .collect();

        let chosen = if prefer_package {
            temperatures
                .iter()
                .find(|s| s.label.to_ascii_lowercase().contains("package"))
                .copied()
                .or_else(|| temperatures.first().copied())
        } else {
            temperatures.first().copied()
        };

        chosen.and_then(|s| s.value)
    }
}

impl Drop for SensorAggregator {
    fn drop(&mut self) {
        self.provider.close();
    }
}
