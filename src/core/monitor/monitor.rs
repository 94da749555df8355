//! The sampling orchestrator.
//!
//! [`PerformanceMonitor`] owns the providers, drives a recurring tokio timer,
//! assembles one [`PerformanceSample`] per tick and publishes it
//! synchronously to subscribers on the tick task's context.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::time::{interval, MissedTickBehavior};

use crate::error::Result;
use crate::platform::gpu::detect_gpu_usage_provider;
use crate::platform::memory::SysinfoMemorySource;
use crate::platform::sensors::SysinfoSensorProvider;
use crate::platform::times::default_time_source;

use super::cpu::{CpuUsageTracker, SystemTimeSource};
use super::gpu::GpuUsageProvider;
use super::memory::MemoryStatusSource;
use super::sample::{clamp_percent, PerformanceSample};
use super::sensors::{HardwareSensorProvider, SensorAggregator};

/// Fixed sampling interval.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

type SampleCallback = dyn Fn(&PerformanceSample) + Send + Sync;

/// Handle returned by [`PerformanceMonitor::on_sample`], used to remove the
/// subscription again.
#[derive(Debug)]
pub struct SubscriptionHandle {
    id: u64,
}

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    entries: Vec<(u64, Arc<SampleCallback>)>,
}

/// Gathers one sample from the owned providers.
///
/// Mutates the CPU tracker's internal snapshot, so calls must be serialized;
/// the monitor guards it with a mutex shared between `sample_once` and the
/// tick task.
struct Sampler {
    cpu: CpuUsageTracker,
    memory: Box<dyn MemoryStatusSource>,
    gpu: Option<Box<dyn GpuUsageProvider>>,
    sensors: SensorAggregator,
}

impl Sampler {
    fn sample(&mut self) -> PerformanceSample {
        let cpu_usage_percent = self.cpu.compute_usage();

        let memory_usage_percent = match self.memory.query_memory_load_percent() {
            Ok(percent) => clamp_percent(percent),
            Err(e) => {
                log::warn!("memory load query failed: {}", e);
                0.0
            }
        };

        let gpu_usage_percent = self
            .gpu
            .as_mut()
            .and_then(|provider| provider.query_usage_percent())
            .map(clamp_percent);

        let cpu_temperature_celsius = self.sensors.cpu_temperature();
        let gpu_temperature_celsius = self.sensors.gpu_temperature();

        PerformanceSample {
            cpu_usage_percent,
            cpu_temperature_celsius,
            memory_usage_percent,
            gpu_usage_percent,
            gpu_temperature_celsius,
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

struct Session {
    shutdown: Option<broadcast::Sender<()>>,
}

/// Periodic host-telemetry collector.
///
/// Samples CPU utilization, memory pressure, GPU utilization and CPU/GPU
/// temperatures once per second while running, publishing each sample to
/// subscribers. Every metric degrades independently; a sensor hiccup never
/// stops the monitor.
pub struct PerformanceMonitor {
    sampler: Arc<Mutex<Sampler>>,
    subscribers: Arc<Mutex<Subscribers>>,
    session: Mutex<Session>,
    running: Arc<AtomicBool>,
    runtime: tokio::runtime::Runtime,
}

impl PerformanceMonitor {
    /// Create a monitor with the default platform providers.
    pub fn new() -> Result<Self> {
        MonitorBuilder::new().build()
    }

    /// Arm the recurring sample timer.
    ///
    /// Resets the CPU usage baseline, then fires immediately and every
    /// [`DEFAULT_SAMPLE_INTERVAL`] thereafter. No-op when already running.
    pub fn start(&self) {
        let mut session = self.session.lock();
        if self.running.load(Ordering::SeqCst) {
            return;
        }

        self.sampler.lock().cpu.reset();

        let (shutdown_tx, mut shutdown_rx) = broadcast::channel::<()>(1);
        let sampler = Arc::clone(&self.sampler);
        let subscribers = Arc::clone(&self.subscribers);
        let running = Arc::clone(&self.running);

        self.runtime.spawn(async move {
            let mut ticker = interval(DEFAULT_SAMPLE_INTERVAL);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        // A tick may already be in flight when stop() runs.
                        if !running.load(Ordering::SeqCst) {
                            continue;
                        }

                        // A panicking provider or subscriber must not kill
                        // the tick task; one bad tick never stops monitoring.
                        let sample =
                            match catch_unwind(AssertUnwindSafe(|| sampler.lock().sample())) {
                                Ok(sample) => sample,
                                Err(panic) => {
                                    log::error!(
                                        "sample gathering panicked, skipping tick: {}",
                                        panic_message(&panic)
                                    );
                                    continue;
                                }
                            };

                        let callbacks: Vec<Arc<SampleCallback>> = subscribers
                            .lock()
                            .entries
                            .iter()
                            .map(|(_, callback)| Arc::clone(callback))
                            .collect();
                        for callback in callbacks {
                            if let Err(panic) =
                                catch_unwind(AssertUnwindSafe(|| callback(&sample)))
                            {
                                log::error!(
                                    "subscriber callback panicked: {}",
                                    panic_message(&panic)
                                );
                            }
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }
            }
        });

        self.running.store(true, Ordering::SeqCst);
        session.shutdown = Some(shutdown_tx);
        log::debug!("performance monitor started");
    }

    /// Disarm the timer. No-op when already stopped; in-flight callback
    /// invocations are not interrupted.
    pub fn stop(&self) {
        let mut session = self.session.lock();
        if !self.running.load(Ordering::SeqCst) {
            return;
        }

        self.running.store(false, Ordering::SeqCst);
        if let Some(shutdown) = session.shutdown.take() {
            let _ = shutdown.send(());
        }
        log::debug!("performance monitor stopped");
    }

    /// Whether the recurring timer is currently armed.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Gather a single sample synchronously, regardless of running state.
    ///
    /// Never fails: each field independently degrades to `0.0`/`None` on
    /// provider failure.
    pub fn sample_once(&self) -> PerformanceSample {
        self.sampler.lock().sample()
    }

    /// Subscribe to published samples.
    ///
    /// Callbacks are invoked synchronously on the timer's execution context
    /// and must not block significantly, or they delay subsequent ticks.
    pub fn on_sample<F>(&self, callback: F) -> SubscriptionHandle
    where
        F: Fn(&PerformanceSample) + Send + Sync + 'static,
    {
        let callback: Arc<SampleCallback> = Arc::new(callback);
        let mut subscribers = self.subscribers.lock();
        let id = subscribers.next_id;
        subscribers.next_id += 1;
        subscribers.entries.push((id, callback));
        SubscriptionHandle { id }
    }

    /// Remove a subscription.
    pub fn unsubscribe(&self, handle: SubscriptionHandle) {
        self.subscribers
            .lock()
            .entries
            .retain(|(id, _)| *id != handle.id);
    }
}

impl Drop for PerformanceMonitor {
    fn drop(&mut self) {
        // Providers (sensor session included) are released when the sampler
        // drops; the runtime field drops last and reaps the tick task.
        self.stop();
    }
}

/// Builder wiring providers into a [`PerformanceMonitor`].
///
/// Providers not supplied explicitly fall back to the platform defaults;
/// GPU detection failure downgrades to a monitor whose GPU fields are
/// always `None`.
#[derive(Default)]
pub struct MonitorBuilder {
    time_source: Option<Box<dyn SystemTimeSource>>,
    memory_source: Option<Box<dyn MemoryStatusSource>>,
    gpu_provider: Option<Box<dyn GpuUsageProvider>>,
    sensor_provider: Option<Box<dyn HardwareSensorProvider>>,
    skip_gpu_detection: bool,
}

impl MonitorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn time_source(mut self, source: Box<dyn SystemTimeSource>) -> Self {
        self.time_source = Some(source);
        self
    }

    pub fn memory_source(mut self, source: Box<dyn MemoryStatusSource>) -> Self {
        self.memory_source = Some(source);
        self
    }

    pub fn gpu_provider(mut self, provider: Box<dyn GpuUsageProvider>) -> Self {
        self.gpu_provider = Some(provider);
        self
    }

    /// Skip GPU provider auto-detection; GPU fields will always be `None`.
    pub fn without_gpu(mut self) -> Self {
        self.skip_gpu_detection = true;
        self
    }

    pub fn sensor_provider(mut self, provider: Box<dyn HardwareSensorProvider>) -> Self {
        self.sensor_provider = Some(provider);
        self
    }

    /// Build the monitor. The only fatal failure is constructing the internal
    /// runtime; provider acquisition failures downgrade to degraded fields.
    pub fn build(self) -> Result<PerformanceMonitor> {
        let time_source = self.time_source.unwrap_or_else(default_time_source);
        let memory = self
            .memory_source
            .unwrap_or_else(|| Box::new(SysinfoMemorySource::new()));

        let gpu = match self.gpu_provider {
            Some(provider) => Some(provider),
            None if !self.skip_gpu_detection => match detect_gpu_usage_provider() {
                Ok(provider) => Some(provider),
                Err(e) => {
                    log::warn!("no GPU usage provider, GPU fields degrade to None: {}", e);
                    None
                }
            },
            None => None,
        };

        let sensor_provider = self
            .sensor_provider
            .unwrap_or_else(|| Box::new(SysinfoSensorProvider::new()));
        let sensors = SensorAggregator::new(sensor_provider);

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_time()
            .thread_name("telemon-sampler")
            .build()?;

        Ok(PerformanceMonitor {
            sampler: Arc::new(Mutex::new(Sampler {
                cpu: CpuUsageTracker::new(time_source),
                memory,
                gpu,
                sensors,
            })),
            subscribers: Arc::new(Mutex::new(Subscribers::default())),
            session: Mutex::new(Session { shutdown: None }),
            running: Arc::new(AtomicBool::new(false)),
            runtime,
        })
    }
}
