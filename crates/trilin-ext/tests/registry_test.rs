use burn::tensor::{Tensor, TensorData};
use burn_ndarray::NdArray;
use trilin_core::{HostKernel, StridedTensor, TensorProperty, TrilinearConfig, TrilinearError};
use trilin_ext::{BindingError, ExtensionModule, Operand, BACKWARD, FORWARD};

type B = NdArray<f32>;

fn module() -> ExtensionModule<B, HostKernel> {
    let op = TrilinearConfig::new()
        .with_require_accelerator(false)
        .init(HostKernel::new());
    ExtensionModule::new(op)
}

fn feats() -> Operand<B> {
    let device = Default::default();
    let data_vec: Vec<f32> = (0..2 * 8 * 3).map(|i| i as f32).collect();
    StridedTensor::new(Tensor::<B, 3>::from_data(TensorData::new(data_vec, [2, 8, 3]), &device)).into()
}

fn points() -> Operand<B> {
    let device = Default::default();
    StridedTensor::new(Tensor::<B, 2>::from_floats([[0.0, 0.0, 0.0], [-1.0, -1.0, -1.0]], &device)).into()
}

fn grad() -> Operand<B> {
    let device = Default::default();
    StridedTensor::new(Tensor::<B, 2>::ones([2, 3], &device)).into()
}

fn values(op: Operand<B>) -> Vec<f32> {
    match op {
        Operand::Rank2(t) => t.into_tensor().into_data().to_vec::<f32>().unwrap(),
        Operand::Rank3(t) => t.into_tensor().into_data().to_vec::<f32>().unwrap(),
    }
}

#[test]
fn test_positional_and_keyword_calls_agree() {
    let module = module();

    let positional = module.call(FORWARD, vec![feats(), points()]).unwrap();
    let keyword = module
        .call_kw(FORWARD, vec![("points", points()), ("feats", feats())])
        .unwrap();
    let mixed = module.call_with(FORWARD, vec![feats()], vec![("points", points())]).unwrap();

    assert_eq!(positional.dims(), vec![2, 3]);
    let expected = values(positional);
    assert_eq!(values(keyword), expected);
    assert_eq!(values(mixed), expected);

    // Second point sits on corner 0 of its features
    assert_eq!(&expected[3..], &[24.0, 25.0, 26.0]);
}

#[test]
fn test_backward_entry_point() {
    let module = module();
    let out = module
        .call_kw(
            BACKWARD,
            vec![("dL_dfeat_interp", grad()), ("feats", feats()), ("points", points())],
        )
        .unwrap();
    assert_eq!(out.rank(), 3);
    assert_eq!(out.dims(), vec![2, 8, 3]);

    let grads = values(out);
    // First point is the cell centre: every corner receives 1/8
    for g in &grads[..24] {
        assert!((g - 0.125).abs() < 1e-6);
    }
}

#[test]
fn test_binding_errors() {
    let module = module();

    let err = module.call(FORWARD, vec![feats(), points(), points()]).unwrap_err();
    assert!(matches!(err, BindingError::Arity { expected: 2, actual: 3, .. }));

    let err = module.call_kw(FORWARD, vec![("feats", feats()), ("pts", points())]).unwrap_err();
    assert!(matches!(err, BindingError::UnexpectedKeyword { ref keyword, .. } if keyword == "pts"));

    let err = module
        .call_with(FORWARD, vec![feats(), points()], vec![("feats", feats())])
        .unwrap_err();
    assert!(matches!(err, BindingError::DuplicateArgument { ref argument, .. } if argument == "feats"));

    let err = module.call_kw(BACKWARD, vec![("feats", feats()), ("points", points())]).unwrap_err();
    assert!(matches!(err, BindingError::MissingArgument { ref argument, .. } if argument == "dL_dfeat_interp"));
}

#[test]
fn test_rank_mismatch_surfaces_as_operator_error() {
    let module = module();
    let err = module.call(FORWARD, vec![points(), feats()]).unwrap_err();
    assert!(matches!(
        err.operator_error(),
        Some(TrilinearError::RankMismatch { argument: "feats", expected: 3, actual: 2 })
    ));
}

#[test]
fn test_validation_errors_pass_through() {
    let module = module();
    let device = Default::default();
    let strided_points: Operand<B> =
        StridedTensor::new(Tensor::<B, 2>::zeros([3, 2], &device)).swap_dims(0, 1).into();

    let err = module.call(FORWARD, vec![feats(), strided_points]).unwrap_err();
    let inner = err.operator_error().expect("operator error");
    assert_eq!(inner.property(), Some(TensorProperty::NotContiguous));
}

#[test]
fn test_default_module_rejects_host_tensors() {
    let op = TrilinearConfig::new().init::<B, _>(HostKernel::new());
    let module = ExtensionModule::new(op);

    let err = module.call(FORWARD, vec![feats(), points()]).unwrap_err();
    assert!(matches!(
        err,
        BindingError::Operator(TrilinearError::InvalidTensorProperty {
            argument: "feats",
            property: TensorProperty::NotOnAccelerator
        })
    ));
}
