// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Program identity allocation.
//!
//! The program id is the handle the engine keys a live instance by. It is allocated
//! once, when the program is built, by an [`IdGenerator`] handed to the builder.

use crate::config::consts::DEFAULT_PROGRAM_ID_LENGTH;
use rand::Rng;

/// Allocates program ids.
pub trait IdGenerator {
    fn next_id(&self) -> String;
}

/// Short random lowercase hexadecimal ids.
#[derive(Debug, Clone, Copy)]
pub struct RandomIdGenerator {
    length: usize,
}

impl RandomIdGenerator {
    pub fn new(length: usize) -> Self {
        Self {
            length: length.max(1),
        }
    }
}

impl Default for RandomIdGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM_ID_LENGTH)
    }
}

impl IdGenerator for RandomIdGenerator {
    fn next_id(&self) -> String {
        const HEX: &[u8] = b"0123456789abcdef";
        let mut rng = rand::rng();
        (0..self.length)
            .map(|_| HEX[rng.random_range(0..HEX.len())] as char)
            .collect()
    }
}

/// Always hands out the same caller-supplied id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedId(pub String);

impl FixedId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl IdGenerator for FixedId {
    fn next_id(&self) -> String {
        self.0.clone()
    }
}
