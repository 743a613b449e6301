use crate::calculators::{builtin_calculators, MetricCalculator};
use crate::error::AnalyticsError;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

static GLOBAL: OnceLock<CalculatorRegistry> = OnceLock::new();

/// Maps metric names to calculator instances.
///
/// A registry is mutated only while it is owned (`&mut self`); once it is
/// shared behind a reference it is read-only, so any number of threads may
/// `resolve` concurrently.
#[derive(Default)]
pub struct CalculatorRegistry {
    calculators: HashMap<String, Arc<dyn MetricCalculator>>,
}

impl std::fmt::Debug for CalculatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalculatorRegistry")
            .field("metrics", &self.names())
            .finish()
    }
}

impl CalculatorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with every metric that ships with the crate.
    pub fn with_builtins() -> Self {
        let calculators = builtin_calculators()
            .into_iter()
            .map(|calculator| (calculator.name().to_string(), Arc::from(calculator)))
            .collect();
        Self { calculators }
    }

    /// The process-wide registry of built-in metrics, built on first use.
    pub fn global() -> &'static CalculatorRegistry {
        GLOBAL.get_or_init(Self::with_builtins)
    }

    /// Registers the calculator produced by `factory` under `name`.
    ///
    /// The calculator must declare the same name it is registered under.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> Result<(), AnalyticsError>
    where
        F: FnOnce() -> Box<dyn MetricCalculator>,
    {
        let name = name.into();
        if self.calculators.contains_key(&name) {
            return Err(AnalyticsError::DuplicateMetric(name));
        }

        let calculator = factory();
        if calculator.name() != name {
            return Err(AnalyticsError::NameMismatch {
                registered: name,
                declared: calculator.name().to_string(),
            });
        }

        tracing::debug!(metric = %name, "Registered metric calculator.");
        self.calculators.insert(name, Arc::from(calculator));
        Ok(())
    }

    /// Registers an already-built calculator under its declared name.
    pub fn register_calculator<C>(&mut self, calculator: C) -> Result<(), AnalyticsError>
    where
        C: MetricCalculator + 'static,
    {
        let name = calculator.name().to_string();
        self.register(name, move || Box::new(calculator))
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<dyn MetricCalculator>, AnalyticsError> {
        self.calculators
            .get(name)
            .cloned()
            .ok_or_else(|| AnalyticsError::UnknownMetric(name.to_string()))
    }

    /// Registered metric names in ascending order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.calculators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.calculators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calculators.is_empty()
    }
}
