use std::path::Path;

use crate::settings::StoreSettings;
use crate::store::{PartitionStore, StoreOpenError};

/// Factory for opening `PartitionStore` instances from a shared settings
/// template.
pub struct StoreFactory {
    settings: StoreSettings,
}

impl StoreFactory {
    pub fn new(settings: StoreSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    /// Open the store for one partition. The database directory comes from
    /// the configured path template; the returned store is owned by the
    /// caller, which is expected to be the partition's command processor.
    pub fn open_partition(&self, partition_id: u32) -> Result<PartitionStore, StoreOpenError> {
        let id = partition_id.to_string();
        let path = self.settings.path_template.replace("%partition%", &id);
        PartitionStore::open(&self.settings, Path::new(&path), partition_id)
    }
}
