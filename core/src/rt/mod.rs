//! Runtime pieces that hand frames to live mappings.

mod generator;

pub use generator::{Generator, GeneratorStep, generator_locals};

#[cfg(test)]
mod generator_test;
