
use log::{debug, info};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use simple_error::bail;
use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use threadpool::ThreadPool;

use crate::contact_graph::{ContactGraph, GraphError};

/// Search-budget knobs for the Monte-Carlo phase search.
#[derive(Clone, Debug)]
pub struct OptimizerSettings {
    /// Outer perturb/maximize steps per shallow convergence; the final round
    /// runs three times as many
    pub core_iterations: usize,
    /// Shallow convergences sampled per round; also the maximum usable
    /// concurrency for this stage
    pub sample_size: usize,
    /// How many rounds to sample and merge
    pub n_rounds: usize,
    /// Maximum number of worker threads
    pub threads: usize,
}

impl Default for OptimizerSettings {
    fn default() -> OptimizerSettings {
        OptimizerSettings {
            core_iterations: 200,
            sample_size: 30,
            n_rounds: 2,
            threads: 1,
        }
    }
}

/// Highest-scoring assignment observed so far. The score and the labels it
/// belongs to are only ever read or written together under one lock, so no
/// reader can observe a torn pair.
#[derive(Clone, Debug, Default)]
struct PhaseBest {
    score: f64,
    partitions: Vec<(i32, i8)>,
}

/// Draws a random legal label: bubble nodes from {-1, 1}, unconstrained nodes
/// from {-1, 0, 1}.
fn random_partition<R: Rng>(rng: &mut R, has_alt: bool) -> i8 {
    if has_alt {
        if rng.gen::<bool>() {
            1
        } else {
            -1
        }
    } else {
        rng.gen_range(-1i8..=1)
    }
}

/// One search worker. Claims shallow-convergence jobs off the shared counter
/// until the round's sample queue drains. The worker owns its copy of the
/// graph; the best tuple and the job counter are the only shared state.
///
/// Every label mutation goes through `set_partition`, so the bipartite alt
/// invariant holds at every step of the walk.
/// # Arguments
/// * `contact_graph` - the worker's private copy of the graph
/// * `ids` - all node ids, for uniform sampling
/// * `best` - the shared best score/assignment pair
/// * `job_index` - shared sample counter, claimed by fetch-add
/// * `sample_count` - the round's sample budget
/// * `iterations` - outer perturb/maximize steps per sample
fn random_phase_search(
    mut contact_graph: ContactGraph,
    ids: &[i32],
    best: &Mutex<PhaseBest>,
    job_index: &AtomicUsize,
    sample_count: usize,
    iterations: usize,
) -> Result<(), GraphError> {
    let mut rng = SmallRng::from_entropy();
    let mut sample = job_index.fetch_add(1, Ordering::SeqCst);

    while sample < sample_count {
        for _ in 0..iterations {
            // Randomly perturb a sliver of the graph to jump out of the
            // current local optimum
            let n_perturbed = (contact_graph.size() + 29) / 30;
            for _ in 0..n_perturbed {
                let id = ids[rng.gen_range(0..ids.len())];
                let partition = random_partition(&mut rng, contact_graph.has_alt(id)?);
                contact_graph.set_partition(id, partition)?;
            }

            // Greedy pass: one best-label trial per node on average
            for _ in 0..contact_graph.size() {
                let id = ids[rng.gen_range(0..ids.len())];
                if contact_graph.node_edge_count(id)? == 0 {
                    continue;
                }
                let has_alt = contact_graph.has_alt(id)?;

                let mut max_score = f64::MIN;
                let mut best_partition: i8 = 0;
                for partition in [-1i8, 0, 1] {
                    // Bubble nodes can't be made neutral
                    if has_alt && partition == 0 {
                        continue;
                    }
                    contact_graph.set_partition(id, partition)?;
                    let score = contact_graph.compute_consistency_score(id)?;
                    if score > max_score {
                        max_score = score;
                        best_partition = partition;
                    }
                }
                contact_graph.set_partition(id, best_partition)?;
            }

            // Publish an improvement, or fall back to the shared best
            let total_score = contact_graph.compute_total_consistency_score();
            {
                let mut best = best.lock().expect("phase mutex poisoned by another worker");
                if total_score > best.score {
                    best.score = total_score;
                    best.partitions = contact_graph.get_partitions();
                } else {
                    contact_graph.set_partitions(&best.partitions)?;
                }
                debug!("sample {}: score {} (best {})", sample, total_score, best.score);
            }
        }
        sample = job_index.fetch_add(1, Ordering::SeqCst);
    }
    Ok(())
}

/// Runs the full sampling schedule: `n_rounds` rounds, each draining a shared
/// queue of `sample_size` shallow convergences across up to `threads` workers,
/// with the final round tripling the per-sample iteration budget. Each round
/// resumes from the previous round's best assignment.
///
/// On success the best assignment is written back into `contact_graph` and the
/// best consistency score is returned.
/// # Arguments
/// * `contact_graph` - the graph to phase; mutated in place
/// * `settings` - the search budget
/// # Errors
/// * if a worker hits a graph error or panics
pub fn monte_carlo_phase_contacts(
    contact_graph: &mut ContactGraph,
    settings: &OptimizerSettings,
) -> Result<f64, Box<dyn Error>> {
    let ids: Arc<Vec<i32>> = Arc::new(contact_graph.node_ids().collect());
    if ids.is_empty() {
        return Ok(0.0);
    }

    let best = Arc::new(Mutex::new(PhaseBest {
        score: contact_graph.compute_total_consistency_score(),
        partitions: contact_graph.get_partitions(),
    }));

    let n_workers = settings.threads.max(1).min(settings.sample_size.max(1));
    let pool = ThreadPool::new(n_workers);

    for round in 0..settings.n_rounds.max(1) {
        let final_round = round + 1 == settings.n_rounds.max(1);
        let iterations = if final_round {
            settings.core_iterations * 3
        } else {
            settings.core_iterations
        };

        let job_index = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = mpsc::channel();

        for _ in 0..n_workers {
            let tx = tx.clone();
            let ids = Arc::clone(&ids);
            let best = Arc::clone(&best);
            let job_index = Arc::clone(&job_index);
            let worker_graph = contact_graph.clone();
            let sample_count = settings.sample_size;

            pool.execute(move || {
                let result = random_phase_search(
                    worker_graph,
                    &ids,
                    &best,
                    &job_index,
                    sample_count,
                    iterations,
                );
                tx.send(result).expect("result channel outlives the pool");
            });
        }
        drop(tx);

        for result in rx {
            result?;
        }
        pool.join();
        if pool.panic_count() > 0 {
            bail!("panic detected in a phasing worker, check above for details");
        }

        // Seed the next round from this round's winner
        let round_best = best
            .lock()
            .expect("phase mutex poisoned by another worker")
            .clone();
        contact_graph.set_partitions(&round_best.partitions)?;
        info!(
            "Phase sampling round {} / {}: best consistency score {}",
            round + 1,
            settings.n_rounds.max(1),
            round_best.score
        );
    }

    let final_best = best
        .lock()
        .expect("phase mutex poisoned by another worker")
        .clone();
    contact_graph.set_partitions(&final_best.partitions)?;
    Ok(final_best.score)
}
