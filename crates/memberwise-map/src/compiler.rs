//! Compilation of member-mapping lists into transformations.
//!
//! [`CompiledMapping`] holds an immutable mapping array and compiles it into
//! one [`Transform`] on first use. Every coercion branch is chosen while
//! compiling; the transform itself only reads, converts and writes.
//!
//! The transform runs in two phases. All values are read and coerced first,
//! then all are written. A value that fails to convert therefore never leaves
//! the target half-populated.

use std::fmt;
use std::sync::{Arc, OnceLock};

use memberwise_model::{Member, ModelError, short_type_name};

use crate::error::{MapError, Result};
use crate::expr::SourceFn;
use crate::mapping::MemberMapping;

/// A compiled transformation from a source into an existing target.
pub type Transform<S, T> = Arc<dyn Fn(&S, &mut T) -> Result<()> + Send + Sync>;

/// An ordered mapping array and its lazily built transformation.
pub struct CompiledMapping<S, T> {
    mappings: Arc<[MemberMapping<S, T>]>,
    transform: OnceLock<Transform<S, T>>,
}

impl<S: 'static, T: 'static> CompiledMapping<S, T> {
    /// Wraps `mappings`; nothing is compiled until first use.
    pub fn new(mappings: impl Into<Arc<[MemberMapping<S, T>]>>) -> Self {
        Self {
            mappings: mappings.into(),
            transform: OnceLock::new(),
        }
    }

    pub fn mappings(&self) -> &[MemberMapping<S, T>] {
        &self.mappings
    }

    /// Whether the transformation has been built yet.
    pub fn is_compiled(&self) -> bool {
        self.transform.get().is_some()
    }

    /// The transformation, compiling it on first call.
    pub fn transform(&self) -> &Transform<S, T> {
        self.transform.get_or_init(|| compile(&self.mappings))
    }

    /// Applies every mapping from `source` into `target`.
    ///
    /// # Errors
    ///
    /// [`MapError::Transform`] naming the target member whose value could not
    /// be read, converted or written.
    pub fn apply(&self, source: &S, target: &mut T) -> Result<()> {
        (self.transform())(source, target)
    }
}

impl<S, T> fmt::Debug for CompiledMapping<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledMapping")
            .field("mappings", &self.mappings)
            .field("compiled", &self.transform.get().is_some())
            .finish()
    }
}

struct Step<S, T> {
    read: SourceFn<S>,
    target: Member<T>,
}

impl<S, T: 'static> Step<S, T> {
    fn fail(&self, cause: ModelError) -> MapError {
        MapError::Transform {
            owner: short_type_name(self.target.owner()).to_string(),
            member: self.target.name().to_string(),
            cause,
        }
    }
}

/// Compiles `mappings` into a single transformation.
pub fn compile<S: 'static, T: 'static>(mappings: &[MemberMapping<S, T>]) -> Transform<S, T> {
    let steps: Vec<Step<S, T>> = mappings
        .iter()
        .map(|mapping| Step {
            read: mapping.compile_read(),
            target: mapping.target().clone(),
        })
        .collect();

    tracing::debug!(
        source_type = short_type_name(std::any::type_name::<S>()),
        target_type = short_type_name(std::any::type_name::<T>()),
        steps = steps.len(),
        "Compiled member mapping"
    );

    Arc::new(move |source: &S, target: &mut T| {
        let mut values = Vec::with_capacity(steps.len());
        for step in &steps {
            values.push((step.read)(source).map_err(|cause| step.fail(cause))?);
        }
        for (step, value) in steps.iter().zip(values) {
            step.target
                .write(target, value)
                .map_err(|cause| step.fail(cause))?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use memberwise_model::{Reflect, reflect};

    use super::*;
    use crate::config::MappingConfiguration;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Input {
        count: String,
        label: String,
    }

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Output {
        count: i32,
        label: String,
    }

    reflect!(Input { "Count" => count, "Label" => label });
    reflect!(Output { "Count" => count, "Label" => label });

    fn compiled() -> CompiledMapping<Input, Output> {
        let mappings = MappingConfiguration::<Input, Output>::reflect()
            .validate()
            .unwrap();
        CompiledMapping::new(mappings)
    }

    #[test]
    fn test_compiles_lazily_once() {
        let compiled = compiled();
        assert!(!compiled.is_compiled());
        let first = Arc::clone(compiled.transform());
        let second = Arc::clone(compiled.transform());
        assert!(compiled.is_compiled());
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_applies_all_mappings() {
        let mut output = Output::default();
        compiled()
            .apply(
                &Input {
                    count: "12".to_string(),
                    label: "dozen".to_string(),
                },
                &mut output,
            )
            .unwrap();
        assert_eq!(
            output,
            Output {
                count: 12,
                label: "dozen".to_string()
            }
        );
    }

    #[test]
    fn test_failed_conversion_leaves_target_untouched() {
        let mut output = Output {
            count: 1,
            label: "before".to_string(),
        };
        let err = compiled()
            .apply(
                &Input {
                    count: "twelve".to_string(),
                    label: "after".to_string(),
                },
                &mut output,
            )
            .unwrap_err();
        assert!(matches!(err, MapError::Transform { ref member, .. } if member == "Count"));
        assert_eq!(output.label, "before");
        assert_eq!(output.count, 1);
    }
}
