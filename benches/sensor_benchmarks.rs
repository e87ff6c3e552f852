use async_trait::async_trait;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use iot_sensor_sim::{
    bus::BusEvent, Bus, GpsSensor, HumiditySensor, LoopSettings, MemoryLog, PublishLoop, QosLevel,
    ReadingRecord, Result, Sensor, TemperatureSensor,
};
use rand::{rngs::StdRng, SeedableRng};
use std::time::Duration;
use tokio::sync::broadcast;

/// Bus that accepts everything and goes nowhere.
struct NullBus;

#[async_trait]
impl Bus for NullBus {
    async fn connect(&mut self) -> Result<()> {
        Ok(())
    }

    async fn publish(&mut self, _: &str, _: &str, _: QosLevel, _: bool) -> Result<()> {
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        Ok(())
    }

    fn events(&self) -> broadcast::Receiver<BusEvent> {
        broadcast::channel(1).1
    }
}

fn seeded_suite() -> Vec<Box<dyn Sensor>> {
    vec![
        Box::new(TemperatureSensor::with_rng(22.0, 0.5, StdRng::seed_from_u64(1)).expect("valid")),
        Box::new(
            HumiditySensor::with_rng(20.0, 80.0, 0.5, 50.0, StdRng::seed_from_u64(2))
                .expect("valid"),
        ),
        Box::new(
            GpsSensor::with_rng(36.8065, 10.1815, 2.0, 6.0, StdRng::seed_from_u64(3))
                .expect("valid"),
        ),
    ]
}

/// Benchmark a single read of each sensor
fn bench_sensor_reads(c: &mut Criterion) {
    for mut sensor in seeded_suite() {
        c.bench_function(&format!("{}_read", sensor.name()), |b| b.iter(|| sensor.read()));
    }
}

/// Benchmark JSON serialization of records
fn bench_json_serialization(c: &mut Criterion) {
    let records: Vec<ReadingRecord> = seeded_suite().iter_mut().map(|s| s.read()).collect();

    for record in &records {
        c.bench_with_input(
            BenchmarkId::new("json_serialization", &record.sensor),
            record,
            |b, record| b.iter(|| record.to_json().expect("Should serialize")),
        );
    }
}

/// Benchmark JSON deserialization of records
fn bench_json_deserialization(c: &mut Criterion) {
    let lines: Vec<String> = seeded_suite()
        .iter_mut()
        .map(|s| s.read().to_json().expect("Should serialize"))
        .collect();

    for line in &lines {
        let record = ReadingRecord::from_json(line).expect("Should deserialize");
        c.bench_with_input(
            BenchmarkId::new("json_deserialization", &record.sensor),
            line,
            |b, line| b.iter(|| ReadingRecord::from_json(line).expect("Should deserialize")),
        );
    }
}

/// Benchmark one full read/log/publish cycle
fn bench_publish_cycle(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("Should create tokio runtime");
    let settings = LoopSettings::new(Duration::from_secs(1), QosLevel::AtMostOnce);
    let mut publisher = PublishLoop::new(seeded_suite(), MemoryLog::new(), NullBus, settings);

    c.bench_function("publish_cycle", |b| {
        b.iter(|| rt.block_on(publisher.run_cycle()).expect("Cycle should succeed"))
    });
}

criterion_group!(
    benches,
    bench_sensor_reads,
    bench_json_serialization,
    bench_json_deserialization,
    bench_publish_cycle
);
criterion_main!(benches);
