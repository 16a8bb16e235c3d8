use std::{collections::BTreeMap, env, fs};

use fishing_engine::{sampler, CatchOutcome, FishingConfig};
use rand::{rngs::StdRng, thread_rng, SeedableRng};

const ROUNDS: usize = 100_000;

fn main() {
    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| "fishing_game_config.json".to_string());
    let json = fs::read_to_string(&path).unwrap();
    let settings = FishingConfig::from_json(&json).unwrap().validate().unwrap();
    let mut rng = StdRng::from_rng(thread_rng()).unwrap();

    let mut by_rarity: BTreeMap<usize, (String, usize)> = BTreeMap::new();
    let mut nothing = 0;
    let mut total_points = 0u64;

    for _ in 0..ROUNDS {
        let outcome = sampler::resolve(&settings, None, 0, &[], false, &mut rng);
        total_points += u64::from(outcome.points());

        match outcome {
            CatchOutcome::Item(catch) => {
                let rank = settings.catalog.rarities().rank(&catch.rarity).unwrap();
                by_rarity.entry(rank).or_insert((catch.rarity, 0)).1 += 1;
            }
            CatchOutcome::Member(_) => unreachable!("no members to catch"),
            CatchOutcome::Nothing => nothing += 1,
        }
    }

    println!("Cast {ROUNDS} times into {path}");
    println!("{:>16}: {:6.2}%", "nothing", nothing as f64 / ROUNDS as f64 * 100.0);
    for (rarity, count) in by_rarity.values() {
        println!("{rarity:>16}: {:6.2}%", *count as f64 / ROUNDS as f64 * 100.0);
    }
    println!("Average points per cast: {:.2}", total_points as f64 / ROUNDS as f64);
}
