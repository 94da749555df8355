use telemon::{DeviceClass, SensorAggregator, SensorKind, SensorReading};

use super::support::{FakeDevice, FakeSensorProvider, temperature};

#[test]
fn test_open_failure_degrades_all_queries_to_none() {
    let mut provider = FakeSensorProvider::new(vec![FakeDevice {
        class: DeviceClass::Cpu,
        sensors: vec![temperature("Package id 0", Some(42.0))],
    }]);
    provider.open_fails = true;

    let mut aggregator = SensorAggregator::new(Box::new(provider));

    // The provider never opened; it stays usable in a degraded state.
    assert_eq!(aggregator.cpu_temperature(), None);
    assert_eq!(aggregator.gpu_temperature(), None);
}

#[test]
fn test_package_preference_is_case_insensitive() {
    let provider = FakeSensorProvider::new(vec![FakeDevice {
        class: DeviceClass::Cpu,
        sensors: vec![
            temperature("Core 0", Some(61.0)),
            temperature("CPU PACKAGE", Some(47.5)),
        ],
    }]);
    let mut aggregator = SensorAggregator::new(Box::new(provider));

    assert_eq!(aggregator.cpu_temperature(), Some(47.5));
}

#[test]
fn test_gpu_ignores_non_temperature_sensors() {
    let provider = FakeSensorProvider::new(vec![FakeDevice {
        class: DeviceClass::GpuNvidia,
        sensors: vec![
            SensorReading {
                kind: SensorKind::Utilization,
                label: "GPU Core".to_string(),
                value: Some(93.0),
            },
            temperature("GPU Hot Spot", Some(71.0)),
        ],
    }]);
    let mut aggregator = SensorAggregator::new(Box::new(provider));

    assert_eq!(aggregator.gpu_temperature(), Some(71.0));
}

#[test]
fn test_empty_provider_is_normal_not_an_error() {
    let mut aggregator = SensorAggregator::new(Box::new(FakeSensorProvider::empty()));

    assert_eq!(aggregator.cpu_temperature(), None);
    assert_eq!(aggregator.gpu_temperature(), None);
}
