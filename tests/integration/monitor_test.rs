use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::sleep;
use std::time::Duration;

use telemon::{DeviceClass, MonitorBuilder, PerformanceMonitor, PerformanceSample};

use super::support::{
    FailingMemorySource, FailingTimeSource, FakeDevice, FakeGpuProvider, FakeMemorySource,
    FakeSensorProvider, FakeTimeSource, PanickingMemorySource, snap, temperature,
};

fn full_fake_monitor() -> PerformanceMonitor {
    let time = FakeTimeSource::new(vec![snap(1000, 2000, 500), snap(1100, 2300, 600)]);
    let sensors = FakeSensorProvider::new(vec![
        FakeDevice {
            class: DeviceClass::Cpu,
            sensors: vec![temperature("Package id 0", Some(42.0))],
        },
        FakeDevice {
            class: DeviceClass::GpuNvidia,
            sensors: vec![temperature("GPU Core", Some(58.0))],
        },
    ]);

    MonitorBuilder::new()
        .time_source(Box::new(time))
        .memory_source(Box::new(FakeMemorySource { percent: 63.0 }))
        .gpu_provider(Box::new(FakeGpuProvider { usage: Some(41.0) }))
        .sensor_provider(Box::new(sensors))
        .build()
        .unwrap()
}

#[test]
fn test_sample_once_assembles_all_fields() {
    let monitor = full_fake_monitor();
    let sample = monitor.sample_once();

    assert_eq!(sample.cpu_usage_percent, 75.0);
    assert_eq!(sample.memory_usage_percent, 63.0);
    assert_eq!(sample.gpu_usage_percent, Some(41.0));
    assert_eq!(sample.cpu_temperature_celsius, Some(42.0));
    assert_eq!(sample.gpu_temperature_celsius, Some(58.0));
}

#[test]
fn test_sample_once_never_fails_when_every_provider_fails() {
    let mut sensors = FakeSensorProvider::empty();
    sensors.open_fails = true;

    let monitor = MonitorBuilder::new()
        .time_source(Box::new(FailingTimeSource))
        .memory_source(Box::new(FailingMemorySource))
        .without_gpu()
        .sensor_provider(Box::new(sensors))
        .build()
        .unwrap();

    for _ in 0..3 {
        let sample = monitor.sample_once();
        assert_eq!(sample.cpu_usage_percent, 0.0);
        assert_eq!(sample.memory_usage_percent, 0.0);
        assert_eq!(sample.gpu_usage_percent, None);
        assert_eq!(sample.cpu_temperature_celsius, None);
        assert_eq!(sample.gpu_temperature_celsius, None);
    }
}

#[test]
fn test_out_of_range_provider_values_are_clamped() {
    let monitor = MonitorBuilder::new()
        .time_source(Box::new(FailingTimeSource))
        .memory_source(Box::new(FakeMemorySource { percent: 250.0 }))
        .gpu_provider(Box::new(FakeGpuProvider { usage: Some(-5.0) }))
        .sensor_provider(Box::new(FakeSensorProvider::empty()))
        .build()
        .unwrap();

    let sample = monitor.sample_once();
    assert_eq!(sample.memory_usage_percent, 100.0);
    assert_eq!(sample.gpu_usage_percent, Some(0.0));
}

#[test]
fn test_missing_gpu_degrades_fields_but_monitor_runs() {
    let monitor = MonitorBuilder::new()
        .time_source(Box::new(FakeTimeSource::new(vec![snap(0, 0, 0)])))
        .memory_source(Box::new(FakeMemorySource { percent: 40.0 }))
        .without_gpu()
        .sensor_provider(Box::new(FakeSensorProvider::new(vec![FakeDevice {
            class: DeviceClass::Cpu,
            sensors: vec![temperature("Package id 0", Some(42.0))],
        }])))
        .build()
        .unwrap();

    let published: Arc<Mutex<Vec<PerformanceSample>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&published);
    let _handle = monitor.on_sample(move |sample| sink.lock().unwrap().push(sample.clone()));

    monitor.start();
    sleep(Duration::from_millis(400));
    monitor.stop();

    let samples = published.lock().unwrap();
    assert!(!samples.is_empty());
    for sample in samples.iter() {
        assert_eq!(sample.gpu_usage_percent, None);
        assert_eq!(sample.gpu_temperature_celsius, None);
        assert_eq!(sample.memory_usage_percent, 40.0);
    }
}

#[test]
fn test_start_is_idempotent_with_exactly_one_timer() {
    let monitor = full_fake_monitor();

    let count = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&count);
    let _handle = monitor.on_sample(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    monitor.start();
    monitor.start();
    assert!(monitor.is_running());

    // One armed timer fires exactly once immediately; the next tick is a
    // full second away.
    sleep(Duration::from_millis(400));
    assert_eq!(count.load(Ordering::SeqCst), 1);

    monitor.stop();
    monitor.stop();
    assert!(!monitor.is_running());

    // No stray timer keeps publishing after stop.
    sleep(Duration::from_millis(1300));
    assert_eq!(count.load(Ordering::SeqCst), 1);

    // The cycle can begin again.
    monitor.start();
    sleep(Duration::from_millis(400));
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[test]
fn test_stop_before_start_is_a_noop() {
    let monitor = full_fake_monitor();
    monitor.stop();
    assert!(!monitor.is_running());
}

#[test]
fn test_second_start_does_not_reset_baseline_again() {
    // Construction consumes the first snapshot, the single baseline reset
    // consumes the second, the first tick diffs the third against it. A
    // second reset would shift the diff and read 100% instead.
    let time = FakeTimeSource::new(vec![
        snap(0, 0, 0),
        snap(1000, 2000, 500),
        snap(1100, 2300, 600),
        snap(1100, 2400, 600),
    ]);

    let monitor = MonitorBuilder::new()
        .time_source(Box::new(time))
        .memory_source(Box::new(FakeMemorySource { percent: 10.0 }))
        .without_gpu()
        .sensor_provider(Box::new(FakeSensorProvider::empty()))
        .build()
        .unwrap();

    let first_cpu: Arc<Mutex<Option<f64>>> = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&first_cpu);
    let _handle = monitor.on_sample(move |sample| {
        sink.lock().unwrap().get_or_insert(sample.cpu_usage_percent);
    });

    monitor.start();
    monitor.start();
    sleep(Duration::from_millis(400));
    monitor.stop();

    assert_eq!(*first_cpu.lock().unwrap(), Some(75.0));
}

#[test]
fn test_unsubscribe_stops_callbacks() {
    let monitor = full_fake_monitor();

    let count = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&count);
    let handle = monitor.on_sample(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    monitor.start();
    sleep(Duration::from_millis(400));
    assert_eq!(count.load(Ordering::SeqCst), 1);

    monitor.unsubscribe(handle);
    sleep(Duration::from_millis(1000));
    monitor.stop();

    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_multiple_subscribers_each_receive_samples() {
    let monitor = full_fake_monitor();

    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));
    let a = Arc::clone(&first);
    let b = Arc::clone(&second);
    let _h1 = monitor.on_sample(move |_| {
        a.fetch_add(1, Ordering::SeqCst);
    });
    let _h2 = monitor.on_sample(move |_| {
        b.fetch_add(1, Ordering::SeqCst);
    });

    monitor.start();
    sleep(Duration::from_millis(400));
    monitor.stop();

    assert_eq!(first.load(Ordering::SeqCst), 1);
    assert_eq!(second.load(Ordering::SeqCst), 1);
}

#[test]
fn test_panicking_subscriber_does_not_stop_monitoring() {
    let monitor = full_fake_monitor();

    // The panicking subscriber registers first, so a later subscriber also
    // proves the publish loop survives within a single tick.
    let _bad = monitor.on_sample(|_| panic!("subscriber blew up"));

    let count = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&count);
    let _good = monitor.on_sample(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    monitor.start();
    // Ticks fire immediately and at one second.
    sleep(Duration::from_millis(1400));
    assert!(monitor.is_running());
    monitor.stop();

    assert!(
        count.load(Ordering::SeqCst) >= 2,
        "publishing stopped after a subscriber panic"
    );
}

#[test]
fn test_panicking_provider_skips_tick_but_monitor_survives() {
    let monitor = MonitorBuilder::new()
        .time_source(Box::new(FakeTimeSource::new(vec![snap(0, 0, 0)])))
        .memory_source(Box::new(PanickingMemorySource))
        .without_gpu()
        .sensor_provider(Box::new(FakeSensorProvider::empty()))
        .build()
        .unwrap();

    let count = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&count);
    let _handle = monitor.on_sample(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    monitor.start();
    sleep(Duration::from_millis(400));

    // Every gather panics, so nothing is published, but the monitor is
    // still armed and stops cleanly.
    assert!(monitor.is_running());
    assert_eq!(count.load(Ordering::SeqCst), 0);

    monitor.stop();
    assert!(!monitor.is_running());
}

#[test]
fn test_sample_once_works_while_running() {
    let monitor = full_fake_monitor();
    monitor.start();
    let sample = monitor.sample_once();
    monitor.stop();

    assert_eq!(sample.memory_usage_percent, 63.0);
}
