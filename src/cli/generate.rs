use std::time::Instant;

use parking_lot::Mutex;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::{IntoParallelIterator, ParallelIterator};

use shapecount::{
    generator::{generate_with, GeneratedShape, GeneratorConfig},
    shapefile::ShapeFile,
    Board,
};

use crate::{make_bar, GenerateOpts};

pub fn generate(opts: &GenerateOpts) {
    let config = GeneratorConfig {
        board: Board::new(opts.size_x, opts.size_y, opts.size_z),
        block_count_min: opts.min_blocks,
        block_count_max: opts.max_blocks,
        views: opts.views.iter().map(|&v| v.into()).collect(),
        initial_view: opts.initial_view.into(),
        fill_occluded: !opts.no_fill,
        max_tries: opts.max_tries,
    };

    let seed: u64 = opts.seed.unwrap_or_else(rand::random);

    let bar = make_bar(opts.count as u64);
    bar.set_message("shapes generated");

    let fallbacks = Mutex::new(0usize);

    // One rng per shape, derived from the batch seed and the shape's
    // index, keeps a batch reproducible for a given --seed under any
    // thread count.
    let run_one = |index: u64| -> GeneratedShape {
        let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(index));
        let result = generate_with(&config, &mut rng);

        if result.fallback {
            *fallbacks.lock() += 1;
        }

        bar.inc(1);
        result
    };

    let start = Instant::now();

    let results: Vec<GeneratedShape> = if opts.no_parallelism {
        (0..opts.count as u64).map(run_one).collect()
    } else {
        let threads = if opts.threads == 0 {
            num_cpus::get()
        } else {
            opts.threads
        };

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .unwrap();

        pool.install(|| (0..opts.count as u64).into_par_iter().map(run_one).collect())
    };

    let duration = start.elapsed();
    let fallbacks = *fallbacks.lock();

    let time = duration.as_micros();
    let secs = time / 1_000_000;
    let micros = time % 1_000_000;

    bar.finish_with_message(format!(
        "Done! Generated {} shapes in {secs}.{micros} s ({fallbacks} via fallback)",
        results.len()
    ));

    println!("Seed: {seed}");

    if let Some(path) = &opts.output {
        let all_valid = fallbacks == 0;

        match ShapeFile::write_file(
            all_valid,
            opts.compression.into(),
            results.iter().map(|r| &r.shape),
            path,
        ) {
            Ok(count) => println!("Wrote {count} shapes to {path}"),
            Err(e) => {
                println!("Failed to write {path}. Error: {e}");
                std::process::exit(1);
            }
        }
    } else if !opts.quiet {
        for (i, result) in results.iter().enumerate() {
            println!();
            println!("Shape {} of {}:", i + 1, results.len());
            println!("{}", result.shape);
            println!("Answer: {}", result.answer);
        }
    }
}
