//! Differentiable operations

mod activations;
mod basic;
mod matmul;

pub use activations::{dropout, relu, sigmoid, softmax_rows};
pub use basic::{add, add_bias, concat};
pub use matmul::{matmul, transpose};
