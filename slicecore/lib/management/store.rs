use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    builder::FinalizedSlice,
    models::{Slice, SliceAction, SliceStatus, VmStatus},
    SliceError, SliceResult, ValidationError,
};

use super::{allocator, FileRepository, Principal, SliceRepository, StoreSnapshot};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The canonical collection of stored slices.
///
/// A single `RwLock` guards the snapshot. Every mutation runs on a copy that is saved through the
/// repository before it replaces the in-memory state, so a failed save leaves the store as it was.
///
/// Cloning the store is cheap and every clone shares the same state.
#[derive(Clone)]
pub struct SliceStore {
    snapshot: Arc<RwLock<StoreSnapshot>>,
    repository: Arc<dyn SliceRepository>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl SliceStore {
    /// Loads the store from a repository.
    pub async fn load(repository: impl SliceRepository + 'static) -> SliceResult<Self> {
        let snapshot = repository.load().await?;
        tracing::debug!(
            "slice store ready with {} slices (vnc counter {})",
            snapshot.slices.len(),
            snapshot.vnc_counter
        );

        Ok(Self {
            snapshot: Arc::new(RwLock::new(snapshot)),
            repository: Arc::new(repository),
        })
    }

    /// Loads the store from a JSON or YAML file, depending on its extension.
    pub async fn open(path: impl Into<std::path::PathBuf>) -> SliceResult<Self> {
        Self::load(FileRepository::new(path)).await
    }

    /// Allocates network resources for a finalized draft and stores it as an active slice owned
    /// by `principal`.
    pub async fn create(
        &self,
        principal: &dyn Principal,
        draft: FinalizedSlice,
    ) -> SliceResult<Slice> {
        ensure_permission(principal, SliceAction::CreateSlice)?;

        let mut snapshot = self.snapshot.write().await;
        let mut slice = allocator::allocate(&snapshot, draft, principal.identity())?;
        let vm_count = slice.vms.len() as u32;

        slice.status = SliceStatus::Active;
        for vm in slice.vms.iter_mut() {
            vm.status = VmStatus::Active;
        }

        let mut next = snapshot.clone();
        next.vnc_counter = next.vnc_counter.saturating_add(vm_count);
        next.slices.push(slice.clone());
        self.commit(&mut snapshot, next).await?;

        tracing::info!(
            "created slice {} '{}' for {} on vlan {} ({})",
            slice.id,
            slice.name,
            slice.owner,
            slice.vlan,
            slice.topology
        );

        Ok(slice)
    }

    /// Lists slices in creation order, optionally only those of `owner`.
    ///
    /// Owners compare case-insensitively.
    pub async fn list(&self, owner: Option<&str>) -> Vec<Slice> {
        let snapshot = self.snapshot.read().await;
        snapshot
            .slices
            .iter()
            .filter(|slice| owner.map_or(true, |owner| slice.is_owned_by(owner)))
            .cloned()
            .collect()
    }

    /// Lists the slices `principal` may see: all of them with [`SliceAction::ViewAllSlices`],
    /// its own otherwise.
    pub async fn list_for(&self, principal: &dyn Principal) -> Vec<Slice> {
        if principal.has_permission(SliceAction::ViewAllSlices) {
            self.list(None).await
        } else {
            self.list(Some(principal.identity())).await
        }
    }

    /// Returns a slice by id.
    pub async fn get(&self, id: &str) -> Option<Slice> {
        let snapshot = self.snapshot.read().await;
        snapshot
            .position(id)
            .map(|index| snapshot.slices[index].clone())
    }

    /// Sets the status of a slice. Returns false if there is no such slice.
    ///
    /// Only `Active` and `Inactive` can be set. Setting the current status again changes nothing
    /// and writes nothing.
    pub async fn update_status(&self, id: &str, status: SliceStatus) -> SliceResult<bool> {
        if status == SliceStatus::Creating {
            return Err(ValidationError::InvalidStatusTarget(status).into());
        }

        let mut snapshot = self.snapshot.write().await;
        let Some(index) = snapshot.position(id) else {
            return Ok(false);
        };

        let current = snapshot.slices[index].status;
        if current == status {
            tracing::debug!("slice {} is already {}", id, status);
            return Ok(true);
        }

        let mut next = snapshot.clone();
        next.slices[index].status = status;
        self.commit(&mut snapshot, next).await?;

        tracing::info!("slice {} is now {} (was {})", id, status, current);
        Ok(true)
    }

    /// Deletes a slice and its VMs. Returns false if there is no such slice.
    pub async fn delete(&self, id: &str) -> SliceResult<bool> {
        self.delete_checked(id, |_| Ok(())).await
    }

    /// Deletes a slice on behalf of `principal`.
    ///
    /// Needs [`SliceAction::DeleteAnySlice`], or [`SliceAction::DeleteOwnSlice`] for a slice the
    /// principal owns. Returns false if there is no such slice.
    pub async fn delete_as(&self, principal: &dyn Principal, id: &str) -> SliceResult<bool> {
        self.delete_checked(id, |slice| {
            if principal.has_permission(SliceAction::DeleteAnySlice) {
                return Ok(());
            }

            ensure_permission(principal, SliceAction::DeleteOwnSlice)?;
            if !slice.is_owned_by(principal.identity()) {
                return Err(SliceError::PermissionDenied {
                    identity: principal.identity().to_string(),
                    action: SliceAction::DeleteAnySlice,
                });
            }

            Ok(())
        })
        .await
    }

    /// Returns the number of stored slices.
    pub async fn count(&self) -> usize {
        self.snapshot.read().await.slices.len()
    }

    /// Returns a copy of the whole snapshot.
    pub async fn snapshot(&self) -> StoreSnapshot {
        self.snapshot.read().await.clone()
    }

    /// Removes a slice after `check` accepts it, all under one write lock.
    async fn delete_checked(
        &self,
        id: &str,
        check: impl FnOnce(&Slice) -> SliceResult<()>,
    ) -> SliceResult<bool> {
        let mut snapshot = self.snapshot.write().await;
        let Some(index) = snapshot.position(id) else {
            return Ok(false);
        };

        check(&snapshot.slices[index])?;

        let mut next = snapshot.clone();
        let removed = next.slices.remove(index);
        self.commit(&mut snapshot, next).await?;

        tracing::info!(
            "deleted slice {} '{}' with {} VMs",
            removed.id,
            removed.name,
            removed.vms.len()
        );

        Ok(true)
    }

    async fn commit(&self, current: &mut StoreSnapshot, next: StoreSnapshot) -> SliceResult<()> {
        self.repository.save(&next).await?;
        *current = next;
        Ok(())
    }
}

//--------------------------------------------------------------------------------------------------
// Functions: Helpers
//--------------------------------------------------------------------------------------------------

fn ensure_permission(principal: &dyn Principal, action: SliceAction) -> SliceResult<()> {
    if principal.has_permission(action) {
        return Ok(());
    }

    tracing::warn!("{} is not allowed to {}", principal.identity(), action);
    Err(SliceError::PermissionDenied {
        identity: principal.identity().to_string(),
        action,
    })
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
