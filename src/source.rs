use std::collections::HashMap;
use std::future::Future;

use crate::models::ClassSnapshot;

/// Where score records come from. The engine only ever sees the snapshot a
/// source returns; a new fetch reflects any entries recorded since.
pub trait GradeSource {
    fn fetch_class(
        &self,
        class_code: &str,
    ) -> impl Future<Output = anyhow::Result<ClassSnapshot>> + Send;
}

/// Snapshots held in memory, keyed by class code.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    classes: HashMap<String, ClassSnapshot>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, snapshot: ClassSnapshot) {
        self.classes.insert(snapshot.class_code.clone(), snapshot);
    }
}

impl GradeSource for MemorySource {
    async fn fetch_class(&self, class_code: &str) -> anyhow::Result<ClassSnapshot> {
        Ok(self
            .classes
            .get(class_code)
            .cloned()
            .unwrap_or_else(|| ClassSnapshot {
                class_code: class_code.to_string(),
                ..ClassSnapshot::default()
            }))
    }
}
