//! Scene validation: restore the surfacing invariants after arbitrary edits.
//!
//! The three passes always run in this order, since each relies on the
//! previous one:
//!
//! 1. prune members of the wrong type from root, projects and objects,
//! 2. rebuild the partition over the surviving objects,
//! 3. write current names back into project, object and mesh markers.

use lookdev_host::{Host, NodeId};
use tracing::{debug, info};

use crate::error::SurfacingResult;
use crate::model::{
    OBJECT_MARKER, PARTITION_MARKER, PARTITION_NAME, PROJECT_MARKER, Surfacing,
};

/// What a validation pass changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Members removed because they had the wrong type.
    pub removed: usize,
    /// Objects connected to the rebuilt partition.
    pub objects: usize,
    /// Mesh transforms whose markers were refreshed.
    pub mesh_transforms: usize,
}

impl<H: Host + ?Sized> Surfacing<'_, H> {
    /// Reconcile the scene with the surfacing invariants.
    ///
    /// Idempotent: a second call changes nothing except the partition handle.
    pub fn validate(&mut self) -> SurfacingResult<ValidationReport> {
        let removed = self.prune_invalid_members()?;
        self.rebuild_partition()?;
        let objects = self.partitioned_object_count()?;
        let mesh_transforms = self.refresh_markers()?;

        let report = ValidationReport {
            removed,
            objects,
            mesh_transforms,
        };
        info!(
            "validated surfacing: {} invalid member(s) removed, {} object(s), {} mesh transform(s)",
            report.removed, report.objects, report.mesh_transforms
        );
        Ok(report)
    }

    /// Delete every surfacing partition and connect a fresh one to all
    /// current objects. Returns the new partition.
    pub fn rebuild_partition(&mut self) -> SurfacingResult<NodeId> {
        for stale in self.host.find_partitions_with_marker(PARTITION_MARKER)? {
            self.host.disconnect_partition(stale)?;
            self.host.delete(stale)?;
            debug!("deleted stale partition {}", stale);
        }

        let partition = self.host.create_partition(PARTITION_NAME)?;
        self.host.set_marker(partition, PARTITION_MARKER, "")?;
        for project in self.projects()? {
            for object in self.objects(project)? {
                self.host.connect_object_to_partition(partition, object.0)?;
            }
        }
        Ok(partition)
    }

    /// The surfacing partition, if one exists.
    pub fn partition(&self) -> SurfacingResult<Option<NodeId>> {
        Ok(self
            .host
            .find_partitions_with_marker(PARTITION_MARKER)?
            .into_iter()
            .next())
    }

    fn partitioned_object_count(&self) -> SurfacingResult<usize> {
        match self.partition()? {
            Some(partition) => Ok(self.host.partition_sets(partition)?.len()),
            None => Ok(0),
        }
    }

    fn prune_invalid_members(&mut self) -> SurfacingResult<usize> {
        let root = self.ensure_root()?;
        let mut removed = 0;

        let mut invalid = Vec::new();
        for member in self.host.members(root.0)? {
            if !self.is_project(member)? {
                invalid.push(member);
            }
        }
        removed += self.remove_invalid(root.0, &invalid)?;

        // An object keeps its first project only.
        let mut claimed: Vec<NodeId> = Vec::new();
        for project in self.projects()? {
            let mut invalid = Vec::new();
            for member in self.host.members(project.0)? {
                if !self.is_object(member)? || claimed.contains(&member) {
                    invalid.push(member);
                } else {
                    claimed.push(member);
                }
            }
            removed += self.remove_invalid(project.0, &invalid)?;

            for object in self.objects(project)? {
                let mut invalid = Vec::new();
                for member in self.host.members(object.0)? {
                    if !self.host.has_mesh_child(member)? {
                        invalid.push(member);
                    }
                }
                removed += self.remove_invalid(object.0, &invalid)?;
            }
        }
        Ok(removed)
    }

    fn remove_invalid(&mut self, set: NodeId, invalid: &[NodeId]) -> SurfacingResult<usize> {
        if invalid.is_empty() {
            return Ok(0);
        }
        let set_name = self.host.name(set)?;
        for member in invalid {
            info!("removing invalid member {} from {}", self.label(*member), set_name);
        }
        self.host.remove_members(set, invalid)?;
        Ok(invalid.len())
    }

    fn refresh_markers(&mut self) -> SurfacingResult<usize> {
        let mut refreshed = 0;
        for project in self.projects()? {
            let project_name = self.host.name(project.0)?;
            self.host
                .set_marker(project.0, PROJECT_MARKER, &project_name)?;
            for object in self.objects(project)? {
                let object_name = self.host.name(object.0)?;
                self.host.set_marker(object.0, OBJECT_MARKER, &object_name)?;
                for member in self.host.members(object.0)? {
                    self.host.set_marker(member, PROJECT_MARKER, &project_name)?;
                    self.host.set_marker(member, OBJECT_MARKER, &object_name)?;
                    refreshed += 1;
                }
                debug!("refreshed markers for {}/{}", project_name, object_name);
            }
        }
        Ok(refreshed)
    }
}
