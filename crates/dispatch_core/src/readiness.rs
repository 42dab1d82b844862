//! Readiness Estimator (S5). spec.md §4.5 is the sole authoritative
//! source for this stage — the retrieved Python snapshot's
//! `orders_optimizer.py` contains only a `# TODO: complete optimization
//! process` marker where this model would live, so there is nothing
//! further to cross-check against the original here.

use chrono::{DateTime, Duration, Utc};

use crate::config::{ChefExperience, KitchenConfig};

const PREP_CYCLE_SECS: i64 = 120;

/// `estimate_ready_time(...)`, per spec.md §4.5. Models the kitchen as two
/// serial stages: prep (chef throughput, 120s cycles, a nonlinear
/// two-chef boost) then bake (oven batch throughput).
pub fn estimate_ready_time(total_pizzas: u32, kitchen: &KitchenConfig, now: DateTime<Utc>) -> DateTime<Utc> {
    if total_pizzas == 0 {
        return now;
    }

    let prep_finish_times = simulate_prep(total_pizzas, kitchen);
    let bake_finish_offset = simulate_bake(&prep_finish_times, kitchen);

    now + Duration::seconds(bake_finish_offset)
}

/// Returns, in prep-finish order, the cycle-offset (seconds) at which each
/// pizza finished prep.
fn simulate_prep(total_pizzas: u32, kitchen: &KitchenConfig) -> Vec<i64> {
    let experience_key = match kitchen.chef_experience {
        ChefExperience::Junior => "junior",
        ChefExperience::Middle => "middle",
        ChefExperience::Senior => "senior",
    };
    let base_capacity = *kitchen.chef_capacity.get(experience_key).unwrap_or(&1) as i64;

    // Explicit nonlinear boost: one chef scales ×1, two chefs ×3 (shared
    // mise-en-place), three or more chefs ×chefs.
    let multiplier = match kitchen.chefs {
        0 | 1 => 1,
        2 => 3,
        n => n as i64,
    };
    let prep_capacity_per_cycle = (base_capacity * multiplier).max(1);

    let mut finish_times = Vec::with_capacity(total_pizzas as usize);
    let mut remaining = total_pizzas as i64;
    let mut cycle_end = PREP_CYCLE_SECS;
    while remaining > 0 {
        let completed_this_cycle = prep_capacity_per_cycle.min(remaining);
        for _ in 0..completed_this_cycle {
            finish_times.push(cycle_end);
        }
        remaining -= completed_this_cycle;
        cycle_end += PREP_CYCLE_SECS;
    }
    finish_times
}

/// Consumes prep-finish times in batches of oven throughput, returning the
/// offset (seconds) of the last batch's finish time.
fn simulate_bake(prep_finish_times: &[i64], kitchen: &KitchenConfig) -> i64 {
    let pizza_type_key = match kitchen.pizza_type {
        crate::config::PizzaType::RuotaDiCarroNapoletana => "ruota_di_carro_napoletana",
        crate::config::PizzaType::Napoletana => "napoletana",
        crate::config::PizzaType::Contemporanea => "contemporanea",
        crate::config::PizzaType::Classica => "classica",
    };
    let bake_time_secs = *kitchen.bake_times.get(pizza_type_key).unwrap_or(&90);
    let oven_throughput = ((kitchen.num_ovens * kitchen.single_oven_capacity) as usize).max(1);

    let mut oven_next_free = 0i64;
    let mut last_finish = 0i64;
    for batch in prep_finish_times.chunks(oven_throughput) {
        let last_prep_in_batch = batch.iter().copied().max().unwrap_or(0);
        let batch_start = last_prep_in_batch.max(oven_next_free);
        let batch_finish = batch_start + bake_time_secs;
        oven_next_free = batch_finish;
        last_finish = last_finish.max(batch_finish);
    }
    last_finish
}
