// ABOUTME: The image registry: authoritative in-memory list of image records.
// ABOUTME: Fans every mutation out to both storage adapters on a best-effort basis.

use std::collections::HashSet;
use std::sync::Arc;

use crate::diagnostics::{Diagnostics, Warning};
use crate::remote::RemoteListing;
use crate::storage::{KeyValueStore, StorageError, StructuredStore};
use crate::types::{ImageId, ImageRecord};
use crate::upload::{SubmitError, UploadClient, UploadFile};

/// Owns the ordered list of image records, newest first.
///
/// Mutations update memory first, then write to the backup store and the
/// catalog concurrently. The two writes are independent: a failure in one is
/// recorded in [`Diagnostics`] and affects neither the other write nor the
/// in-memory list. Persistence is best-effort, never atomic across stores.
pub struct Registry {
    records: Vec<ImageRecord>,
    backup: Arc<dyn KeyValueStore>,
    catalog: Arc<dyn StructuredStore>,
    listing: Arc<dyn RemoteListing>,
    uploader: UploadClient,
    diagnostics: Diagnostics,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("records", &self.records.len())
            .field("diagnostics", &self.diagnostics)
            .finish_non_exhaustive()
    }
}

impl Registry {
    /// Create an empty registry. Call [`Registry::load`] to restore persisted state.
    pub fn new(
        backup: Arc<dyn KeyValueStore>,
        catalog: Arc<dyn StructuredStore>,
        listing: Arc<dyn RemoteListing>,
        uploader: UploadClient,
    ) -> Self {
        Self {
            records: Vec::new(),
            backup,
            catalog,
            listing,
            uploader,
            diagnostics: Diagnostics::default(),
        }
    }

    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    pub fn get(&self, id: &ImageId) -> Option<&ImageRecord> {
        self.records.iter().find(|r| &r.id == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    /// Restore the list from storage, replacing whatever is in memory.
    ///
    /// The catalog is read first; the backup is only consulted when the
    /// catalog yields nothing (empty, unavailable, or failing).
    pub async fn load(&mut self) -> usize {
        let from_catalog = match self.catalog.get_all_sorted().await {
            Ok(records) => records,
            Err(e) => {
                self.diagnostics
                    .warn(Warning::catalog_store(format!("catalog read failed: {e}")));
                Vec::new()
            }
        };

        let records = if from_catalog.is_empty() {
            match self.backup.load().await {
                Ok(records) => records,
                Err(e) => {
                    self.diagnostics
                        .warn(Warning::backup_store(format!("backup read failed: {e}")));
                    Vec::new()
                }
            }
        } else {
            from_catalog
        };

        self.records = unique_ids(records);
        tracing::debug!(count = self.records.len(), "registry loaded");
        self.records.len()
    }

    /// Prepend `record`, replacing any record with the same id.
    pub async fn add(&mut self, record: ImageRecord) {
        self.records.retain(|r| r.id != record.id);
        self.records.insert(0, record);

        let (backup, catalog) = futures::join!(
            self.backup.save(&self.records),
            self.catalog.put(&self.records[0]),
        );
        self.report("save", backup, catalog);
    }

    /// Remove the record with `id`. Unknown ids are a no-op.
    pub async fn remove(&mut self, id: &ImageId) -> bool {
        let before = self.records.len();
        self.records.retain(|r| &r.id != id);
        if self.records.len() == before {
            tracing::debug!(%id, "remove: no such record");
            return false;
        }

        let (backup, catalog) = futures::join!(
            self.backup.save(&self.records),
            self.catalog.delete(id),
        );
        self.report("delete", backup, catalog);
        true
    }

    /// Remove every record whose id is in `ids` as one mutation.
    /// Returns how many records were removed.
    pub async fn remove_many(&mut self, ids: &[ImageId]) -> usize {
        let wanted: HashSet<&ImageId> = ids.iter().collect();
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.records)
            .into_iter()
            .partition(|r| wanted.contains(&r.id));
        self.records = kept;

        if removed.is_empty() {
            return 0;
        }

        let catalog = self.catalog.clone();
        let delete_all = async {
            let mut result = Ok(());
            for record in &removed {
                if let Err(e) = catalog.delete(&record.id).await {
                    result = Err(e);
                }
            }
            result
        };

        let (backup, catalog) = futures::join!(self.backup.save(&self.records), delete_all);
        self.report("delete", backup, catalog);
        removed.len()
    }

    /// Drop every record from memory and both stores.
    pub async fn clear(&mut self) {
        self.records.clear();
        let (backup, catalog) = futures::join!(self.backup.clear(), self.catalog.clear());
        self.report("clear", backup, catalog);
    }

    /// Append server records whose URL is not yet known, after all local records.
    ///
    /// Server order is preserved. Merging the same list again adds nothing.
    /// Merged records are not written to storage. Returns how many were added.
    pub fn merge_remote(&mut self, server_records: Vec<ImageRecord>) -> usize {
        let mut urls: HashSet<String> = self.records.iter().map(|r| r.url.clone()).collect();
        let mut ids: HashSet<ImageId> = self.records.iter().map(|r| r.id.clone()).collect();

        let before = self.records.len();
        for record in server_records {
            if urls.contains(&record.url) || ids.contains(&record.id) {
                continue;
            }
            urls.insert(record.url.clone());
            ids.insert(record.id.clone());
            self.records.push(record);
        }

        let added = self.records.len() - before;
        if added > 0 {
            tracing::debug!(added, "merged remote records");
        }
        added
    }

    /// Fetch the remote listing and merge it. Listing failures merge nothing.
    pub async fn refresh_remote(&mut self) -> usize {
        let server_records = self.listing.fetch_records().await;
        self.merge_remote(server_records)
    }

    /// Validate and upload `file`, then prepend the resulting record.
    ///
    /// On error the registry is left untouched.
    pub async fn upload(&mut self, file: &UploadFile) -> Result<ImageRecord, SubmitError> {
        let record = self.uploader.upload(file).await?;
        self.add(record.clone()).await;
        Ok(record)
    }

    fn report(
        &mut self,
        action: &str,
        backup: Result<(), StorageError>,
        catalog: Result<(), StorageError>,
    ) {
        if let Err(e) = backup {
            self.diagnostics
                .warn(Warning::backup_store(format!("backup {action} failed: {e}")));
        }
        if let Err(e) = catalog {
            self.diagnostics
                .warn(Warning::catalog_store(format!("catalog {action} failed: {e}")));
        }
    }
}

/// Keep the first record for each id.
fn unique_ids(records: Vec<ImageRecord>) -> Vec<ImageRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert(r.id.clone()))
        .collect()
}
