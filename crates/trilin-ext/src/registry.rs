//! Registration table for the exported entry points.
//!
//! The table is an explicit name → entry map built once at startup. Calls
//! bind positional arguments first and keyword arguments second, following
//! the registered argument order.

use std::collections::BTreeMap;
use std::fmt;

use burn::tensor::backend::Backend;
use trilin_core::{ResidencyProbe, Trilinear, TrilinearKernel};

use crate::error::{BindingError, Result};
use crate::operand::Operand;

/// Name the module is published under.
pub const MODULE_NAME: &str = "trilin";

/// Module documentation string.
pub const MODULE_DOC: &str = "Trilinear interpolation extension";

/// Forward entry point name.
pub const FORWARD: &str = "trilinear_interpolation_fw";

/// Backward entry point name.
pub const BACKWARD: &str = "trilinear_interpolation_bw";

/// Function behind a registered entry point. Receives exactly one operand
/// per declared argument, in declaration order.
pub type EntryFn<B, K> = fn(&Trilinear<B, K>, Vec<Operand<B>>) -> Result<Operand<B>>;

/// Registered entry point.
pub struct Entry<B: Backend, K> {
    name: &'static str,
    doc: &'static str,
    args: &'static [&'static str],
    func: EntryFn<B, K>,
}

impl<B: Backend, K> Entry<B, K> {
    /// Entry point name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Documentation string.
    pub fn doc(&self) -> &'static str {
        self.doc
    }

    /// Argument names in positional order.
    pub fn args(&self) -> &'static [&'static str] {
        self.args
    }

    /// Call signature, e.g. `trilinear_interpolation_fw(feats, points)`.
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, self.args.join(", "))
    }
}

impl<B: Backend, K> fmt::Debug for Entry<B, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("name", &self.name)
            .field("args", &self.args)
            .finish()
    }
}

/// Extension module: the operator pair plus its published entry points.
///
/// # Examples
/// ```rust
/// use trilin_core::{StridedTensor, TensorOpsKernel, TrilinearConfig};
/// use trilin_ext::ExtensionModule;
/// use burn::tensor::Tensor;
/// use burn_ndarray::NdArray;
///
/// type Backend = NdArray<f32>;
///
/// let device = Default::default();
/// let op = TrilinearConfig::new()
///     .with_require_accelerator(false)
///     .init::<Backend, _>(TensorOpsKernel::new());
/// let module = ExtensionModule::new(op);
///
/// let feats = StridedTensor::new(Tensor::<Backend, 3>::ones([2, 8, 4], &device));
/// let points = StridedTensor::new(Tensor::<Backend, 2>::zeros([2, 3], &device));
/// let out = module
///     .call_kw("trilinear_interpolation_fw", vec![("points", points.into()), ("feats", feats.into())])
///     .unwrap();
/// assert_eq!(out.dims(), vec![2, 4]);
/// ```
pub struct ExtensionModule<B: Backend, K> {
    name: &'static str,
    doc: &'static str,
    operator: Trilinear<B, K>,
    entries: BTreeMap<&'static str, Entry<B, K>>,
}

impl<B, K> ExtensionModule<B, K>
where
    B: ResidencyProbe,
    K: TrilinearKernel<B>,
{
    /// Build the module with both trilinear entry points registered.
    pub fn new(operator: Trilinear<B, K>) -> Self {
        let mut module = Self::empty(MODULE_NAME, MODULE_DOC, operator);
        module
            .def(
                FORWARD,
                "Trilinear interpolation forward pass",
                &["feats", "points"],
                forward_entry::<B, K>,
            )
            .def(
                BACKWARD,
                "Trilinear interpolation backward pass",
                &["dL_dfeat_interp", "feats", "points"],
                backward_entry::<B, K>,
            );
        module
    }

    /// Module with no entry points.
    pub fn empty(name: &'static str, doc: &'static str, operator: Trilinear<B, K>) -> Self {
        Self {
            name,
            doc,
            operator,
            entries: BTreeMap::new(),
        }
    }

    /// Register an entry point, replacing any previous one of the same name.
    pub fn def(
        &mut self,
        name: &'static str,
        doc: &'static str,
        args: &'static [&'static str],
        func: EntryFn<B, K>,
    ) -> &mut Self {
        let entry = Entry { name, doc, args, func };
        if self.entries.insert(name, entry).is_some() {
            tracing::warn!(module = self.name, entry = name, "entry point redefined");
        } else {
            tracing::debug!(module = self.name, entry = name, "entry point registered");
        }
        self
    }

    /// Module name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Module documentation string.
    pub fn doc(&self) -> &'static str {
        self.doc
    }

    /// Operator the entry points dispatch to.
    pub fn operator(&self) -> &Trilinear<B, K> {
        &self.operator
    }

    /// Registered entry points, sorted by name.
    pub fn entries(&self) -> impl Iterator<Item = &Entry<B, K>> {
        self.entries.values()
    }

    /// Look up an entry point.
    pub fn entry(&self, name: &str) -> Option<&Entry<B, K>> {
        self.entries.get(name)
    }

    /// Call signature of an entry point.
    pub fn signature(&self, name: &str) -> Option<String> {
        self.entry(name).map(Entry::signature)
    }

    /// Call with positional arguments.
    pub fn call(&self, name: &str, args: Vec<Operand<B>>) -> Result<Operand<B>> {
        self.call_with(name, args, Vec::new())
    }

    /// Call with keyword arguments.
    pub fn call_kw(&self, name: &str, kwargs: Vec<(&str, Operand<B>)>) -> Result<Operand<B>> {
        self.call_with(name, Vec::new(), kwargs)
    }

    /// Call with positional arguments followed by keyword arguments.
    pub fn call_with(
        &self,
        name: &str,
        args: Vec<Operand<B>>,
        kwargs: Vec<(&str, Operand<B>)>,
    ) -> Result<Operand<B>> {
        let entry = self
            .entry(name)
            .ok_or_else(|| BindingError::UnknownOperator(name.to_string()))?;
        let bound = bind(entry, args, kwargs)?;

        tracing::debug!(module = self.name, entry = entry.name, "calling entry point");
        (entry.func)(&self.operator, bound)
    }
}

/// Resolve positional and keyword arguments into declaration order.
fn bind<B: Backend, K>(
    entry: &Entry<B, K>,
    args: Vec<Operand<B>>,
    kwargs: Vec<(&str, Operand<B>)>,
) -> Result<Vec<Operand<B>>> {
    let params = entry.args;
    if args.len() > params.len() {
        return Err(BindingError::Arity {
            operator: entry.name.to_string(),
            expected: params.len(),
            actual: args.len(),
        });
    }

    let mut slots: Vec<Option<Operand<B>>> = args.into_iter().map(Some).collect();
    slots.resize_with(params.len(), || None);

    for (keyword, operand) in kwargs {
        let position = params
            .iter()
            .position(|p| *p == keyword)
            .ok_or_else(|| BindingError::UnexpectedKeyword {
                operator: entry.name.to_string(),
                keyword: keyword.to_string(),
            })?;
        if slots[position].is_some() {
            return Err(BindingError::DuplicateArgument {
                operator: entry.name.to_string(),
                argument: keyword.to_string(),
            });
        }
        slots[position] = Some(operand);
    }

    slots
        .into_iter()
        .zip(params)
        .map(|(slot, param)| {
            slot.ok_or_else(|| BindingError::MissingArgument {
                operator: entry.name.to_string(),
                argument: param.to_string(),
            })
        })
        .collect()
}

fn forward_entry<B, K>(op: &Trilinear<B, K>, args: Vec<Operand<B>>) -> Result<Operand<B>>
where
    B: ResidencyProbe,
    K: TrilinearKernel<B>,
{
    let [feats, points]: [Operand<B>; 2] = args
        .try_into()
        .map_err(|args: Vec<Operand<B>>| arity(FORWARD, 2, args.len()))?;
    let feats = feats.into_rank3("feats")?;
    let points = points.into_rank2("points")?;
    Ok(op.forward(&feats, &points)?.into())
}

fn backward_entry<B, K>(op: &Trilinear<B, K>, args: Vec<Operand<B>>) -> Result<Operand<B>>
where
    B: ResidencyProbe,
    K: TrilinearKernel<B>,
{
    let [grad, feats, points]: [Operand<B>; 3] = args
        .try_into()
        .map_err(|args: Vec<Operand<B>>| arity(BACKWARD, 3, args.len()))?;
    let grad = grad.into_rank2("dL_dfeat_interp")?;
    let feats = feats.into_rank3("feats")?;
    let points = points.into_rank2("points")?;
    Ok(op.backward(&grad, &feats, &points)?.into())
}

fn arity(operator: &str, expected: usize, actual: usize) -> BindingError {
    BindingError::Arity {
        operator: operator.to_string(),
        expected,
        actual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;
    use trilin_core::{TensorOpsKernel, TrilinearConfig};

    type TestBackend = NdArray<f32>;

    fn module() -> ExtensionModule<TestBackend, TensorOpsKernel> {
        let op = TrilinearConfig::new()
            .with_require_accelerator(false)
            .init(TensorOpsKernel::new());
        ExtensionModule::new(op)
    }

    #[test]
    fn test_registered_signatures() {
        let module = module();
        assert_eq!(module.name(), MODULE_NAME);
        assert_eq!(module.doc(), MODULE_DOC);
        assert_eq!(
            module.signature(FORWARD).as_deref(),
            Some("trilinear_interpolation_fw(feats, points)")
        );
        assert_eq!(
            module.signature(BACKWARD).as_deref(),
            Some("trilinear_interpolation_bw(dL_dfeat_interp, feats, points)")
        );
        let names: Vec<_> = module.entries().map(Entry::name).collect();
        assert_eq!(names, vec![BACKWARD, FORWARD]);
    }

    #[test]
    fn test_unknown_operator() {
        let err = module().call("trilinear_fw_cu", Vec::new()).unwrap_err();
        assert!(matches!(err, BindingError::UnknownOperator(name) if name == "trilinear_fw_cu"));
    }

    #[test]
    fn test_missing_argument_named() {
        let err = module().call(FORWARD, Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            BindingError::MissingArgument { argument, .. } if argument == "feats"
        ));
    }
}
