use perch_core::{Bindable, BindingTable};
use std::sync::Arc;

/// Owns the state a view displays, as named bindings.
///
/// View models are shared between their view and any background workers, so all methods take
/// `&self`.
pub trait ViewModel: Send + Sync {
    /// Called when the owning view is initialized, before its document is built.
    fn initialize(&self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called when the owning view is destroyed.
    fn destroy(&self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Looks up a binding by name.
    fn binding(&self, name: &str) -> Option<Arc<dyn Bindable>>;
}

/// A plain table of bindings is a view model without lifecycle hooks.
impl ViewModel for BindingTable {
    fn binding(&self, name: &str) -> Option<Arc<dyn Bindable>> {
        self.get(name)
    }
}
