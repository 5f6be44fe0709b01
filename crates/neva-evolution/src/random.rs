// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Random number helpers for NEVA evolution.

Thin wrappers over the `rand` crate so the mutation engine reads in terms
of the distributions it actually draws from.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use rand::seq::SliceRandom;
use rand::Rng;
use std::f64::consts::FRAC_PI_2;

/// Generate random f64 in range [0.0, 1.0)
pub fn random_f64() -> f64 {
    rand::thread_rng().gen()
}

/// Generate a random synaptic weight, uniform in [-pi/2, pi/2]
pub fn random_weight() -> f64 {
    rand::thread_rng().gen_range(-FRAC_PI_2..=FRAC_PI_2)
}

/// Generate random integer in range [min, max] inclusive
pub fn random_range_inclusive(min: i32, max: i32) -> i32 {
    if min >= max {
        return min;
    }
    rand::thread_rng().gen_range(min..=max)
}

/// Pick a random element of a slice
pub fn choose<T>(items: &[T]) -> Option<&T> {
    items.choose(&mut rand::thread_rng())
}

/// Bernoulli draw with the given probability
pub fn random_bool(probability: f64) -> bool {
    rand::thread_rng().gen_bool(probability.clamp(0.0, 1.0))
}
