use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use slp_rs::{normal_form, reduce, MatchingTable, Vertex};

/// Fibonacci word over {1, 2} after `steps` doublings of the recurrence
fn fibonacci(steps: usize) -> Vertex {
    let mut previous = Vertex::terminal(1);
    let mut current = Vertex::concat(Vertex::terminal(1), Vertex::terminal(2));
    for _ in 0..steps {
        let next = Vertex::concat(current.clone(), previous);
        previous = current;
        current = next;
    }
    current
}

/// (ab)^(2^exponent) built by squaring
fn power_of_pair(exponent: usize) -> Vertex {
    let mut power = Vertex::concat(Vertex::terminal(1), Vertex::terminal(2));
    for _ in 0..exponent {
        power = Vertex::concat(power.clone(), power);
    }
    power
}

/// Pseudo-random word over a signed alphabet of size 4, left-deep
fn random_word(size: usize) -> Vertex {
    let mut seed = 12345u64;
    let mut word = Vertex::Null;
    for _ in 0..size {
        // Simple LCG random
        seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
        let letter = (seed >> 16) % 8;
        let symbol = if letter < 4 {
            letter as i32 + 1
        } else {
            -(letter as i32 - 3)
        };
        word = Vertex::concat(word, Vertex::terminal(symbol));
    }
    word
}

fn bench_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("matching");

    for steps in [20, 40, 80].iter() {
        let text = fibonacci(*steps);
        let pattern = fibonacci(steps / 2);
        group.bench_with_input(
            BenchmarkId::new("fibonacci", steps),
            &(pattern, text),
            |b, (pattern, text)| {
                b.iter(|| {
                    let mut table = MatchingTable::new();
                    black_box(table.find_all(black_box(pattern), black_box(text)))
                });
            },
        );
    }

    for exponent in [16, 64, 256].iter() {
        let text = power_of_pair(*exponent);
        let pattern = Vertex::concat(power_of_pair(3), Vertex::terminal(1));
        group.bench_with_input(
            BenchmarkId::new("power", exponent),
            &(pattern, text),
            |b, (pattern, text)| {
                b.iter(|| {
                    let mut table = MatchingTable::new();
                    black_box(table.find_all(black_box(pattern), black_box(text)))
                });
            },
        );
    }

    group.finish();
}

fn bench_reduce(c: &mut Criterion) {
    let mut group = c.benchmark_group("reduce");

    for steps in [10, 20, 40].iter() {
        let word = fibonacci(*steps);
        let cancelling = Vertex::concat(word.clone(), word.negate());
        group.bench_with_input(
            BenchmarkId::new("inverse_pair", steps),
            &cancelling,
            |b, cancelling| {
                b.iter(|| black_box(reduce(black_box(cancelling))));
            },
        );
    }

    for size in [100, 1_000].iter() {
        let word = random_word(*size);
        group.bench_with_input(BenchmarkId::new("random", size), &word, |b, word| {
            b.iter(|| black_box(reduce(black_box(word))));
        });
    }

    group.finish();
}

fn bench_normal_form(c: &mut Criterion) {
    let mut group = c.benchmark_group("normal_form");
    group.sample_size(20);

    for steps in [10, 20, 30].iter() {
        let word = fibonacci(*steps);
        group.bench_with_input(BenchmarkId::new("fibonacci", steps), &word, |b, word| {
            b.iter(|| black_box(normal_form(black_box(word))));
        });
    }

    for size in [100, 1_000].iter() {
        let word = random_word(*size);
        group.bench_with_input(BenchmarkId::new("random", size), &word, |b, word| {
            b.iter(|| black_box(normal_form(black_box(word))));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_matching, bench_reduce, bench_normal_form);
criterion_main!(benches);
