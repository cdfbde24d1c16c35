//! Parallel synthesis of independent inputs.

use rayon::prelude::*;

use crate::{
    model::ClassHierarchy,
    synth::{DriverCoordinator, SynthesisConfig, SynthesisInput, SynthesisOutput},
    Result,
};

/// Synthesizes every input on its own coordinator, in parallel.
///
/// Results come back in input order. A failing input does not affect the others.
///
/// # Example
///
/// ```rust
/// use rootsynth::{
///     model::{CallbackRegistry, ClassTable, ComponentKind, ComponentRegistry},
///     synth::{synthesize_batch, SynthesisConfig, SynthesisInput},
/// };
///
/// let table = ClassTable::builder()
///     .framework()
///     .class("a.Main", |c| c.extends("android.app.Activity").constructor(&[]))
///     .class("b.Main", |c| c.extends("android.app.Activity").constructor(&[]))
///     .build()?;
/// let inputs = vec![
///     SynthesisInput::new(
///         ComponentRegistry::new().with("a.Main", ComponentKind::Activity),
///         CallbackRegistry::new(),
///     ),
///     SynthesisInput::new(
///         ComponentRegistry::new().with("b.Main", ComponentKind::Activity),
///         CallbackRegistry::new(),
///     ),
/// ];
///
/// let outputs = synthesize_batch(&table, &SynthesisConfig::default(), &inputs);
/// assert_eq!(outputs.len(), 2);
/// assert!(outputs.iter().all(Result::is_ok));
/// # Ok::<(), rootsynth::Error>(())
/// ```
pub fn synthesize_batch(
    hierarchy: &dyn ClassHierarchy,
    config: &SynthesisConfig,
    inputs: &[SynthesisInput],
) -> Vec<Result<SynthesisOutput>> {
    log::debug!("synthesizing {} inputs in parallel", inputs.len());
    inputs
        .par_iter()
        .map(|input| {
            let mut coordinator = DriverCoordinator::with_config(hierarchy, config.clone());
            coordinator.synthesize(input)?;
            coordinator.into_output()
        })
        .collect()
}
