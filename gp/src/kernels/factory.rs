use super::parser::{parse_kernel_expression, KernelExpr};
use super::{Kernel, KernelFamily};
use crate::errors::{GpError, Result};
use linfa::Float;
use std::collections::HashMap;

/// Name of the sum combinator
pub const SUM_NAME: &str = "kSum";
/// Name of the product combinator
pub const PRODUCT_NAME: &str = "kProd";

#[derive(Clone, Copy, Debug)]
enum Entry {
    Primitive(KernelFamily),
    Sum,
    Product,
}

/// Registry resolving kernel names and building kernel trees from expressions.
///
/// The registry is filled once at construction and is immutable afterwards.
#[derive(Clone, Debug)]
pub struct KernelFactory {
    registry: HashMap<String, Entry>,
}

impl Default for KernelFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl KernelFactory {
    /// Factory knowing every primitive family plus the `kSum` and `kProd` combinators
    pub fn new() -> Self {
        let mut families = vec![
            KernelFamily::Constant,
            KernelFamily::Linear,
            KernelFamily::LinearArd,
            KernelFamily::MaternIso1,
            KernelFamily::MaternIso3,
            KernelFamily::MaternIso5,
            KernelFamily::MaternArd1,
            KernelFamily::MaternArd3,
            KernelFamily::MaternArd5,
            KernelFamily::SquaredExponentialIso,
            KernelFamily::SquaredExponentialArd,
            KernelFamily::RationalQuadraticIso,
            KernelFamily::RationalQuadraticArd,
            KernelFamily::Hamming,
        ];
        families.extend((1..=6).map(KernelFamily::Polynomial));

        let mut registry: HashMap<String, Entry> = families
            .into_iter()
            .map(|family| (family.to_string(), Entry::Primitive(family)))
            .collect();
        registry.insert(SUM_NAME.to_string(), Entry::Sum);
        registry.insert(PRODUCT_NAME.to_string(), Entry::Product);
        KernelFactory { registry }
    }

    /// Registered names, combinators included
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.registry.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Builds the kernel described by `expression` for inputs of dimension `dim`.
    ///
    /// Fails with [GpError::StructureError] on malformed expressions, including
    /// combinators not given exactly two arguments or primitives given arguments,
    /// and with [GpError::ParseError] on unknown names.
    pub fn create<F: Float>(&self, expression: &str, dim: usize) -> Result<Kernel<F>> {
        let expr = parse_kernel_expression(expression)?;
        self.build(&expr, dim)
    }

    fn lookup(&self, name: &str) -> Result<Entry> {
        self.registry
            .get(name)
            .copied()
            .ok_or_else(|| GpError::ParseError(format!("unknown kernel '{}'", name)))
    }

    fn build<F: Float>(&self, expr: &KernelExpr, dim: usize) -> Result<Kernel<F>> {
        match expr {
            KernelExpr::Name(name) => match self.lookup(name)? {
                Entry::Primitive(family) => Ok(Kernel::primitive(family, dim)),
                Entry::Sum | Entry::Product => Err(GpError::StructureError(format!(
                    "combinator '{}' expects two kernel arguments",
                    name
                ))),
            },
            KernelExpr::Call(name, args) => {
                let entry = self.lookup(name)?;
                if let Entry::Primitive(_) = entry {
                    return Err(GpError::StructureError(format!(
                        "primitive kernel '{}' takes no argument",
                        name
                    )));
                }
                let [left, right] = args.as_slice() else {
                    return Err(GpError::StructureError(format!(
                        "combinator '{}' expects two kernel arguments, got {}",
                        name,
                        args.len()
                    )));
                };
                let left = self.build(left, dim)?;
                let right = self.build(right, dim)?;
                Ok(match entry {
                    Entry::Product => Kernel::product(left, right),
                    _ => Kernel::sum(left, right),
                })
            }
        }
    }
}
