use chrono::{Duration, Utc, Weekday};
use criterion::{Criterion, criterion_group, criterion_main};
use fitclub_client::RawVisit;
use fitclub_tracker::aggregate;

fn bench_aggregate(c: &mut Criterion) {
    let now = Utc::now();
    // A heavy year of check-ins: two per day.
    let visits: Vec<RawVisit> = (0..730)
        .map(|i| RawVisit {
            timestamp: now - Duration::hours(12 * i),
        })
        .collect();

    c.bench_function("aggregate_year_of_visits", |b| {
        b.iter(|| aggregate(std::hint::black_box(&visits), now, Weekday::Mon))
    });
}

criterion_group!(benches, bench_aggregate);
criterion_main!(benches);
