use linfa::ParamGuard;
use linfa_svm_bench::benchmarks::alloc::{allocated_bytes, AllocSnapshot, CountingAllocator};
use linfa_svm_bench::prelude::*;
use ndarray::Array2;

#[global_allocator]
static GLOBAL: CountingAllocator = CountingAllocator;

#[test]
fn counts_allocated_bytes() {
    let before = AllocSnapshot::now();
    let buffer = vec![0u8; 4096];
    let grown = before.since();

    assert_eq!(buffer.len(), 4096);
    assert!(grown.bytes >= 4096);
    assert!(grown.allocations >= 1);
    assert!(allocated_bytes() >= 4096);
}

#[test]
fn benchmark_reports_allocations_and_median() {
    let result = BenchmarkParams::new()
        .repetitions(5)
        .check()
        .unwrap()
        .run(|| Ok::<_, BenchError>(Array2::<f64>::zeros((64, 64)).sum()))
        .unwrap();

    assert_eq!(result.repetitions(), 5);
    assert!(result.allocated.iter().all(|&bytes| bytes >= 64 * 64 * 8));
    assert!(result.allocated_bytes() >= 64 * 64 * 8);

    let mut sorted = result.elapsed.clone();
    sorted.sort();
    assert_eq!(result.median(), sorted[2]);
}

#[test]
fn experiment_records_training_memory() {
    let record = ExperimentParams::new(DatasetSource::Iris, ModelFamily::Lssvm)
        .seed(3)
        .benchmark(BenchmarkParams::new().repetitions(3))
        .check()
        .unwrap()
        .run()
        .unwrap();

    // the kernel matrix alone needs 90 x 90 floats per binary model
    assert!(record.train_memory_bytes >= 90 * 90 * 8);
}
