use anyhow::Result;
use burn::config::Config;
use burn::tensor::{Distribution, Tensor, TensorData};
use burn_ndarray::{NdArray, NdArrayDevice};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};
use trilin_core::{HostKernel, StridedTensor, TensorOpsKernel, Trilinear, TrilinearConfig, TrilinearKernel};
use trilin_ext::ExtensionModule;

type Backend = NdArray<f64>;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Developer tasks for the trilin workspace")]
struct Cli {
    /// Operator configuration (JSON); defaults admit host tensors
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the registered entry points
    ListOps,

    /// Compare the backward pass against finite differences of the forward pass
    Gradcheck {
        /// Number of query points
        #[arg(short, long, default_value_t = 4)]
        points: usize,

        /// Feature channels per corner
        #[arg(short, long, default_value_t = 3)]
        features: usize,

        /// Finite difference step
        #[arg(long, default_value_t = 1e-6)]
        eps: f64,

        /// Maximum allowed absolute error
        #[arg(long, default_value_t = 1e-6)]
        tol: f64,

        /// Kernel executor
        #[arg(short, long, value_enum, default_value_t = KernelChoice::TensorOps)]
        kernel: KernelChoice,
    },

    /// Time forward and backward passes
    Bench {
        /// Number of query points
        #[arg(short, long, default_value_t = 65536)]
        points: usize,

        /// Feature channels per corner
        #[arg(short, long, default_value_t = 16)]
        features: usize,

        /// Timed iterations
        #[arg(short, long, default_value_t = 10)]
        iters: usize,

        /// Kernel executor
        #[arg(short, long, value_enum, default_value_t = KernelChoice::TensorOps)]
        kernel: KernelChoice,
    },

    /// Write a configuration file with default values
    WriteConfig {
        /// Output path
        #[arg(default_value = "trilin.json")]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KernelChoice {
    TensorOps,
    Host,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::ListOps => {
            list_ops(config);
        }
        Commands::Gradcheck { points, features, eps, tol, kernel } => match kernel {
            KernelChoice::TensorOps => gradcheck(&config.init(TensorOpsKernel::new()), points, features, eps, tol)?,
            KernelChoice::Host => gradcheck(&config.init(HostKernel::new()), points, features, eps, tol)?,
        },
        Commands::Bench { points, features, iters, kernel } => match kernel {
            KernelChoice::TensorOps => bench(&config.init(TensorOpsKernel::new()), points, features, iters)?,
            KernelChoice::Host => bench(&config.init(HostKernel::new()), points, features, iters)?,
        },
        Commands::WriteConfig { output } => {
            config.save(&output)?;
            info!("Configuration written to: {}", output.display());
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<TrilinearConfig> {
    match path {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            TrilinearConfig::load(path)
                .map_err(|e| anyhow::anyhow!("Failed to load config {}: {:?}", path.display(), e))
        }
        None => Ok(TrilinearConfig::new().with_require_accelerator(false)),
    }
}

fn list_ops(config: TrilinearConfig) {
    let module = ExtensionModule::<Backend, _>::new(config.init(TensorOpsKernel::new()));

    println!("{} - {}", module.name(), module.doc());
    println!();
    for entry in module.entries() {
        println!("  {}", entry.signature());
        println!("      {}", entry.doc());
    }
}

fn to_vec<const D: usize>(tensor: Tensor<Backend, D>) -> Result<Vec<f64>> {
    tensor
        .into_data()
        .to_vec::<f64>()
        .map_err(|e| anyhow::anyhow!("Failed to read tensor: {:?}", e))
}

fn random<const D: usize>(shape: [usize; D]) -> Tensor<Backend, D> {
    Tensor::random(shape, Distribution::Uniform(-1.0, 1.0), &Default::default())
}

fn gradcheck<K: TrilinearKernel<Backend>>(
    op: &Trilinear<Backend, K>,
    n: usize,
    f: usize,
    eps: f64,
    tol: f64,
) -> Result<()> {
    info!("Gradient check with {} kernel: {} points, {} features", op.kernel().name(), n, f);

    let errors = gradient_errors(op, n, f, eps)?;
    let mut max_err = 0.0f64;
    for (i, err) in errors.iter().enumerate() {
        if *err > tol {
            warn!("Element {}: absolute error {:.3e}", i, err);
        }
        max_err = max_err.max(*err);
    }

    info!("Max absolute error: {:.3e} over {} elements", max_err, errors.len());
    if max_err > tol {
        anyhow::bail!("Gradient check failed: max error {:.3e} exceeds tolerance {:.3e}", max_err, tol);
    }
    info!("Gradient check passed!");
    Ok(())
}

/// Absolute difference between the analytic feature gradient and central
/// differences of `sum(forward(feats, points) * upstream)`, per element of
/// `feats`.
fn gradient_errors<K: TrilinearKernel<Backend>>(
    op: &Trilinear<Backend, K>,
    n: usize,
    f: usize,
    eps: f64,
) -> Result<Vec<f64>> {
    let device = NdArrayDevice::default();
    let feats = random([n, 8, f]);
    let points = StridedTensor::new(random([n, 3]));
    let upstream = random([n, f]);

    let analytic = op.backward(
        &StridedTensor::new(upstream.clone()),
        &StridedTensor::new(feats.clone()),
        &points,
    )?;
    let analytic = to_vec(analytic.into_tensor())?;
    let base = to_vec(feats)?;
    let upstream = to_vec(upstream)?;

    let loss = |values: &[f64]| -> Result<f64> {
        let feats = Tensor::<Backend, 3>::from_data(TensorData::new(values.to_vec(), [n, 8, f]), &device);
        let out = op.forward(&StridedTensor::new(feats), &points)?;
        Ok(to_vec(out.into_tensor())?.iter().zip(&upstream).map(|(o, g)| o * g).sum())
    };

    let mut errors = Vec::with_capacity(base.len());
    for i in 0..base.len() {
        let mut plus = base.clone();
        let mut minus = base.clone();
        plus[i] += eps;
        minus[i] -= eps;
        let numeric = (loss(&plus)? - loss(&minus)?) / (2.0 * eps);
        errors.push((numeric - analytic[i]).abs());
    }
    Ok(errors)
}

fn bench<K: TrilinearKernel<Backend>>(op: &Trilinear<Backend, K>, n: usize, f: usize, iters: usize) -> Result<()> {
    info!("Benchmarking {} kernel: {} points, {} features, {} iterations", op.kernel().name(), n, f, iters);

    let feats = StridedTensor::new(random([n, 8, f]));
    let points = StridedTensor::new(random([n, 3]));
    let grad = StridedTensor::new(random([n, f]));

    // Warm-up
    op.forward(&feats, &points)?;

    let start = Instant::now();
    for _ in 0..iters {
        op.forward(&feats, &points)?;
    }
    let forward = start.elapsed() / iters.max(1) as u32;

    let start = Instant::now();
    for _ in 0..iters {
        op.backward(&grad, &feats, &points)?;
    }
    let backward = start.elapsed() / iters.max(1) as u32;

    println!("kernel    {}", op.kernel().name());
    println!("forward   {:?} / call", forward);
    println!("backward  {:?} / call", backward);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host_config() -> TrilinearConfig {
        TrilinearConfig::new().with_require_accelerator(false)
    }

    #[test]
    fn test_gradcheck_defaults_pass_with_tensor_ops_kernel() {
        let op = host_config().init(TensorOpsKernel::new());
        let errors = gradient_errors(&op, 4, 3, 1e-6).unwrap();
        assert_eq!(errors.len(), 4 * 8 * 3);
        let max_err = errors.iter().cloned().fold(0.0, f64::max);
        assert!(max_err < 1e-6, "max error {:.3e}", max_err);
        gradcheck(&op, 4, 3, 1e-6, 1e-6).unwrap();
    }

    #[test]
    fn test_gradcheck_defaults_pass_with_host_kernel() {
        let op = host_config().init(HostKernel::new());
        gradcheck(&op, 4, 3, 1e-6, 1e-6).unwrap();
    }

    #[test]
    fn test_gradcheck_rejects_host_tensors_by_default() {
        let op = TrilinearConfig::new().init::<Backend, _>(TensorOpsKernel::new());
        assert!(gradcheck(&op, 2, 2, 1e-6, 1e-6).is_err());
    }
}
