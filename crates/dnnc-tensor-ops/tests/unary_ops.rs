use dnnc_tensor::{CpuAllocator, CpuTensor1, Tensor1};
use dnnc_tensor_ops::{
    ops::{allclose, DEFAULT_ATOL, DEFAULT_RTOL},
    unary, ExecutionStrategy, TensorOps, TensorOpsError,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

const LEN: usize = 24;

fn random_values(seed: u64) -> Vec<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..LEN).map(|_| rng.random_range(-3.0f32..3.0)).collect()
}

fn random_tensor(seed: u64) -> Result<(Vec<f32>, CpuTensor1), TensorOpsError> {
    let values = random_values(seed);
    let t = Tensor1::from_vec(values.clone(), CpuAllocator)?;
    Ok((values, t))
}

// reference computed in double precision, then rounded
fn reference_hardsigmoid(values: &[f32], alpha: f32, beta: f32) -> Vec<f32> {
    values
        .iter()
        .map(|&x| (alpha as f64 * x as f64 + beta as f64).clamp(0.0, 1.0) as f32)
        .collect()
}

fn reference_sign(values: &[f32]) -> Vec<f32> {
    values
        .iter()
        .map(|&x| if x == 0.0 { 0.0 } else { x.signum() })
        .collect()
}

fn check_hardsigmoid<const N: usize>(
    shape: [usize; N],
    alpha: f32,
    beta: f32,
    seed: u64,
) -> Result<(), TensorOpsError> {
    let (values, t) = random_tensor(seed)?;
    let reshaped = t.reshape(shape)?;
    let out = unary::hardsigmoid(&reshaped, alpha, beta)?;

    assert_eq!(out.shape, shape);
    assert!(out.iter().all(|&v| (0.0..=1.0).contains(&v)));
    assert!(allclose(
        &out.data(),
        &reference_hardsigmoid(&values, alpha, beta),
        DEFAULT_RTOL,
        DEFAULT_ATOL
    ));
    Ok(())
}

fn check_sign<const N: usize>(shape: [usize; N], seed: u64) -> Result<(), TensorOpsError> {
    let (values, t) = random_tensor(seed)?;
    let out = t.reshape(shape)?.sign()?;

    assert_eq!(out.shape, shape);
    assert!(allclose(
        &out.data(),
        &reference_sign(&values),
        DEFAULT_RTOL,
        DEFAULT_ATOL
    ));
    Ok(())
}

#[test]
fn hardsigmoid_1d() -> Result<(), TensorOpsError> {
    let _ = env_logger::builder().is_test(true).try_init();
    check_hardsigmoid([24], 0.2, 0.4, 1)
}

#[test]
fn hardsigmoid_2d() -> Result<(), TensorOpsError> {
    check_hardsigmoid([6, 4], 0.2, 0.4, 2)?;
    check_hardsigmoid([3, 8], 0.2, 0.4, 3)?;
    check_hardsigmoid([6, 4], 0.8, 1.6, 4)
}

#[test]
fn hardsigmoid_3d() -> Result<(), TensorOpsError> {
    check_hardsigmoid([2, 4, 3], 0.2, 0.4, 5)?;
    check_hardsigmoid([2, 2, 6], 0.0002, 0.5, 6)?;
    check_hardsigmoid([4, 2, 3], 0.11, 0.22, 7)
}

#[test]
fn hardsigmoid_4d() -> Result<(), TensorOpsError> {
    check_hardsigmoid([2, 2, 2, 3], 0.2, 0.4, 8)?;
    check_hardsigmoid([2, 2, 1, 6], 0.0002, 0.5532, 9)
}

#[test]
fn sign_1d() -> Result<(), TensorOpsError> {
    check_sign([24], 10)
}

#[test]
fn sign_2d() -> Result<(), TensorOpsError> {
    check_sign([6, 4], 11)
}

#[test]
fn sign_3d() -> Result<(), TensorOpsError> {
    check_sign([2, 4, 3], 12)
}

#[test]
fn sign_4d() -> Result<(), TensorOpsError> {
    check_sign([2, 2, 2, 3], 13)
}

#[test]
fn sign_exact_values() -> Result<(), TensorOpsError> {
    let t = Tensor1::from_vec(vec![-2.0f32, 0.0, 3.5], CpuAllocator)?;
    assert_eq!(unary::sign(&t)?.data(), vec![-1.0, 0.0, 1.0]);

    let mut values = random_values(14);
    values[0] = 0.0;
    values[7] = -0.0;
    values[23] = 0.0;
    let t = Tensor1::from_vec(values.clone(), CpuAllocator)?.reshape([2, 3, 4])?;
    let out = t.sign()?.data();
    assert_eq!(out, reference_sign(&values));
    assert_eq!(out[0], 0.0);
    assert_eq!(out[7], 0.0);
    assert_eq!(out[23], 0.0);
    Ok(())
}

#[test]
fn results_do_not_depend_on_layout() -> Result<(), TensorOpsError> {
    let (_, t) = random_tensor(15)?;
    let flat_sign = t.sign()?.data();
    let flat_hs = t.hardsigmoid(0.2, 0.4)?.data();

    assert_eq!(t.reshape([6, 4])?.sign()?.data(), flat_sign);
    assert_eq!(t.reshape([3, 8])?.sign()?.data(), flat_sign);
    assert_eq!(t.reshape([2, 4, 3])?.sign()?.data(), flat_sign);
    assert_eq!(t.reshape([2, 2, 2, 3])?.sign()?.data(), flat_sign);

    assert_eq!(t.reshape([6, 4])?.hardsigmoid(0.2, 0.4)?.data(), flat_hs);
    assert_eq!(t.reshape([3, 8])?.hardsigmoid(0.2, 0.4)?.data(), flat_hs);
    assert_eq!(t.reshape([2, 4, 3])?.hardsigmoid(0.2, 0.4)?.data(), flat_hs);
    assert_eq!(
        t.reshape([2, 2, 2, 3])?.hardsigmoid(0.2, 0.4)?.data(),
        flat_hs
    );
    Ok(())
}

#[test]
fn reshape_roundtrip_after_op() -> Result<(), TensorOpsError> {
    let (values, t) = random_tensor(16)?;
    let out = t.reshape([2, 2, 6])?.hardsigmoid(0.8, 1.6)?;
    let back = out.reshape([24])?;
    assert_eq!(back.data(), out.data());
    assert_eq!(back.numel(), values.len());
    assert_eq!(t.data(), values);
    Ok(())
}

#[test]
fn strategies_match_reference() -> Result<(), TensorOpsError> {
    let (values, t) = random_tensor(17)?;
    let t = t.reshape([4, 2, 3])?;
    let expected = reference_hardsigmoid(&values, 0.11, 0.22);
    for strategy in [
        ExecutionStrategy::Serial,
        ExecutionStrategy::ParallelElements,
        ExecutionStrategy::ParallelChunks(5),
        ExecutionStrategy::Fixed(2),
    ] {
        let out = unary::hardsigmoid_with(&t, 0.11, 0.22, strategy)?;
        assert!(allclose(&out.data(), &expected, DEFAULT_RTOL, DEFAULT_ATOL));
    }
    Ok(())
}

#[test]
fn invalid_reshape_is_reported() -> Result<(), TensorOpsError> {
    let (values, t) = random_tensor(18)?;
    let res = t.reshape([5, 5]);
    assert!(res.is_err_and(|e| matches!(e, dnnc_tensor::TensorError::ShapeError { numel: 24, .. })));
    assert_eq!(t.data(), values);
    assert_eq!(t.shape, [24]);
    Ok(())
}
