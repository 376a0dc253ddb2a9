use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

static INSTANCES: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);
static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// Interned widget instance id (`speedometer_3`, `clock`).
///
/// Copies are free and comparisons never touch the string; it serializes as
/// the plain instance name.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub struct WidgetId(Spur);

impl WidgetId {
    pub fn intern(name: &str) -> Self {
        Self(INSTANCES.get_or_intern(name))
    }

    /// A fresh id for another instance of widget type `kind`.
    pub fn with_prefix(kind: &str) -> Self {
        let n = NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed);
        Self::intern(&format!("{kind}_{n}"))
    }

    pub fn as_str(&self) -> &'static str {
        INSTANCES.resolve(&self.0)
    }
}

impl From<String> for WidgetId {
    fn from(name: String) -> Self {
        Self::intern(&name)
    }
}

impl From<WidgetId> for String {
    fn from(id: WidgetId) -> Self {
        id.as_str().to_owned()
    }
}

impl fmt::Debug for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
