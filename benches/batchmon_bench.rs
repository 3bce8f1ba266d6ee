use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};

use batchmon::models::{ArrayProperties, Job, JobStatus};
use batchmon::tui::app::{FilterSettings, JobList, JobSortColumn};
use batchmon::utils::{natural_cmp, natural_sort_by_key};

const STATUSES: [JobStatus; 4] = [
    JobStatus::Running,
    JobStatus::Runnable,
    JobStatus::Succeeded,
    JobStatus::Failed,
];

fn synthetic_jobs(count: usize) -> Vec<Job> {
    (0..count)
        .map(|i| Job {
            job_id: format!("{:08x}-{}", i * 7919, i),
            job_arn: format!("arn:aws:batch:us-east-1:123456789012:job/{}", i),
            job_name: format!("train-model-{}", count - i),
            status: STATUSES[i % STATUSES.len()],
            created_at: 1_700_000_000_000 + (i as i64) * 1_000,
            array_properties: (i % 10 == 0).then(|| ArrayProperties {
                size: Some(16),
                index: None,
            }),
            log_stream_name: None,
            status_reason: None,
            started_at: None,
            stopped_at: None,
        })
        .collect()
}

fn loaded_list(jobs: &[Job]) -> JobList {
    let mut list = JobList::new();
    list.begin_refresh();
    for job in jobs {
        list.push_job(job.clone());
    }
    list.finish_refresh();
    list
}

fn benchmark_natural_sort(c: &mut Criterion) {
    let names: Vec<String> = (0..5_000).rev().map(|i| format!("task-{}:{}", i % 37, i)).collect();

    c.bench_function("natural_cmp", |b| {
        b.iter(|| natural_cmp(black_box("sweep-run-12:104"), black_box("sweep-run-12:1040")))
    });

    c.bench_function("natural_sort 5k", |b| {
        b.iter(|| {
            let mut names = names.clone();
            natural_sort_by_key(&mut names, |s| s.as_str());
            names
        })
    });
}

fn benchmark_job_list(c: &mut Criterion) {
    let jobs = synthetic_jobs(10_000);

    c.bench_function("job list load 10k", |b| b.iter(|| loaded_list(black_box(&jobs))));

    let mut list = loaded_list(&jobs);
    c.bench_function("job list sort by name 10k", |b| {
        b.iter(|| list.sort_by(JobSortColumn::Name))
    });

    let list = loaded_list(&jobs);
    let filter = FilterSettings::new("train-model-1", [JobStatus::Running, JobStatus::Failed]);
    c.bench_function("job list filter 10k", |b| {
        b.iter(|| list.visible_indices(black_box(&filter)))
    });
}

criterion_group!(benches, benchmark_natural_sort, benchmark_job_list);
criterion_main!(benches);
