//! Ordered stage lists
//!
//! Both networks are plain sequences of affine maps and pointwise
//! nonlinearities. Keeping the stages visible (instead of an opaque
//! `nn::Sequential`) lets each one be inspected and shape-checked.

use tch::{nn, nn::Module, Tensor};
use tracing::trace;

/// A single transformation in a [`Stack`]
#[derive(Debug)]
pub enum Stage {
    /// Affine map `x W^T + b`
    Linear(nn::Linear),
    Relu,
    /// Leaky ReLU with the given negative slope
    LeakyRelu(f64),
    Tanh,
    Sigmoid,
    /// Flatten every dimension after the batch dimension
    Flatten,
    /// Reshape to the given shape (`-1` allowed once)
    Reshape(Vec<i64>),
}

impl Stage {
    /// Apply this stage to `xs`
    pub fn apply(&self, xs: &Tensor) -> Tensor {
        match self {
            Stage::Linear(linear) => linear.forward(xs),
            Stage::Relu => xs.relu(),
            Stage::LeakyRelu(slope) => xs.maximum(&(xs * *slope)),
            Stage::Tanh => xs.tanh(),
            Stage::Sigmoid => xs.sigmoid(),
            Stage::Flatten => xs.flatten(1, -1),
            Stage::Reshape(shape) => xs.reshape(shape.as_slice()),
        }
    }

    /// Short name used in trace logs
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Linear(_) => "linear",
            Stage::Relu => "relu",
            Stage::LeakyRelu(_) => "leaky_relu",
            Stage::Tanh => "tanh",
            Stage::Sigmoid => "sigmoid",
            Stage::Flatten => "flatten",
            Stage::Reshape(_) => "reshape",
        }
    }
}

/// Ordered list of stages applied first to last
#[derive(Debug, Default)]
pub struct Stack {
    stages: Vec<Stage>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage (builder style)
    pub fn push(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Apply only the first `k` stages
    pub fn forward_through(&self, k: usize, xs: &Tensor) -> Tensor {
        self.stages
            .iter()
            .take(k)
            .enumerate()
            .fold(xs.shallow_clone(), |x, (i, stage)| {
                let ys = stage.apply(&x);
                trace!("stage {} ({}): {:?} -> {:?}", i, stage.name(), x.size(), ys.size());
                ys
            })
    }
}

impl Module for Stack {
    fn forward(&self, xs: &Tensor) -> Tensor {
        self.forward_through(self.stages.len(), xs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tch::{nn::VarStore, Device, Kind};

    #[test]
    fn test_leaky_relu_slope() {
        let xs = Tensor::from_slice(&[-1.0f32, 0.0, 2.0]);
        let ys = Stage::LeakyRelu(0.2).apply(&xs);
        let ys: Vec<f32> = Vec::try_from(ys).unwrap();
        assert!((ys[0] + 0.2).abs() < 1e-6);
        assert_eq!(ys[1], 0.0);
        assert_eq!(ys[2], 2.0);
    }

    #[test]
    fn test_forward_through_prefix() {
        let vs = VarStore::new(Device::Cpu);
        let stack = Stack::new()
            .push(Stage::Flatten)
            .push(Stage::Linear(nn::linear(&vs.root() / "fc", 12, 5, Default::default())))
            .push(Stage::Sigmoid);

        let xs = Tensor::randn([2, 3, 4], (Kind::Float, Device::Cpu));
        assert_eq!(stack.forward_through(0, &xs).size(), vec![2, 3, 4]);
        assert_eq!(stack.forward_through(1, &xs).size(), vec![2, 12]);
        assert_eq!(stack.forward_through(2, &xs).size(), vec![2, 5]);
        assert_eq!(stack.forward(&xs).size(), vec![2, 5]);
        assert_eq!(stack.len(), 3);
    }

    #[test]
    fn test_stage_names() {
        let names: Vec<&str> = [Stage::Flatten, Stage::LeakyRelu(0.2), Stage::Sigmoid]
            .iter()
            .map(Stage::name)
            .collect();
        assert_eq!(names, vec!["flatten", "leaky_relu", "sigmoid"]);
    }

    #[test]
    fn test_reshape_stage() {
        let xs = Tensor::zeros([3, 784], (Kind::Float, Device::Cpu));
        let ys = Stage::Reshape(vec![-1, 1, 28, 28]).apply(&xs);
        assert_eq!(ys.size(), vec![3, 1, 28, 28]);
    }
}
