//! Tape-free autograd engine
//!
//! Automatic differentiation over flat `f32` tensors. Every differentiable
//! operation installs a [`BackwardOp`] on its output; [`backward`] seeds the
//! output gradient and walks the graph in reverse. Each op *consumes* the
//! gradient accumulated on its output before propagating, so a tensor feeding
//! several consumers (e.g. a shared hidden layer under two heads) is handled
//! correctly: every traversal forwards exactly the contribution that has
//! arrived since the last one, and the sums land intact on the leaves.
//!
//! Gradients on leaf tensors (parameters) accumulate across backward calls
//! and are only cleared by an explicit `zero_grad`.

mod backward;
mod ops;
mod tensor;

#[cfg(test)]
pub(crate) mod tests;

pub use backward::BackwardOp;
pub use ops::{add, add_bias, concat, dropout, matmul, relu, sigmoid, softmax_rows, transpose};
pub use tensor::Tensor;

/// Perform a backward pass starting from `tensor`.
///
/// With `grad_output = None` the gradient is seeded with ones, which is the
/// conventional seed for a scalar loss.
pub fn backward(tensor: &mut Tensor, grad_output: Option<ndarray::Array1<f32>>) {
    match grad_output {
        Some(grad) => tensor.set_grad(grad),
        None => tensor.set_grad(ndarray::Array1::ones(tensor.len())),
    }

    if let Some(op) = tensor.backward_op() {
        op.backward();
    }
}
