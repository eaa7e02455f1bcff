//! `containers` table.

use rusqlite::{OptionalExtension, Row, params};
use stockroom_core::container::{Container, ContainerRepository};
use stockroom_core::{ContainerId, LocationId, WorkspaceId};

use crate::database::Database;
use crate::row_helpers::{count, get_id};

const COLUMNS: &str =
    "id, workspace_id, name, location_id, description, capacity, short_code, created_at, updated_at";

/// `SQLite` implementation of [`ContainerRepository`].
#[derive(Clone)]
pub struct SqliteContainerRepository {
    db: Database,
}

impl SqliteContainerRepository {
    /// Wrap a database handle.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<Container> {
        Ok(Container {
            id: get_id(row, 0)?,
            workspace_id: get_id(row, 1)?,
            name: row.get(2)?,
            location_id: get_id(row, 3)?,
            description: row.get(4)?,
            capacity: row.get(5)?,
            short_code: row.get(6)?,
            created_at: row.get(7)?,
            updated_at: row.get(8)?,
        })
    }

    fn select(
        &self,
        filter: &str,
        workspace_id: &WorkspaceId,
        value: &str,
    ) -> stockroom_core::Result<Vec<Container>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM containers WHERE workspace_id = ?1 AND {filter} ORDER BY name"
            ))?;
            let rows = stmt
                .query_map(params![workspace_id.as_str(), value], Self::map_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }
}

impl ContainerRepository for SqliteContainerRepository {
    fn save(&self, container: &Container) -> stockroom_core::Result<()> {
        self.db.with_conn(|conn| {
            let _ = conn.execute(
                "INSERT INTO containers (id, workspace_id, name, location_id, description,
                                         capacity, short_code, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT(id) DO UPDATE SET
                     name = excluded.name,
                     location_id = excluded.location_id,
                     description = excluded.description,
                     capacity = excluded.capacity,
                     short_code = excluded.short_code,
                     updated_at = excluded.updated_at
                 WHERE containers.workspace_id = excluded.workspace_id",
                params![
                    container.id.as_str(),
                    container.workspace_id.as_str(),
                    container.name,
                    container.location_id.as_str(),
                    container.description,
                    container.capacity,
                    container.short_code,
                    container.created_at,
                    container.updated_at,
                ],
            )?;
            Ok(())
        })
    }

    fn find_by_id(
        &self,
        workspace_id: &WorkspaceId,
        id: &ContainerId,
    ) -> stockroom_core::Result<Option<Container>> {
        Ok(self.select("id = ?2", workspace_id, id.as_str())?.into_iter().next())
    }

    fn find_by_short_code(
        &self,
        workspace_id: &WorkspaceId,
        short_code: &str,
    ) -> stockroom_core::Result<Option<Container>> {
        Ok(self
            .select("short_code = ?2", workspace_id, short_code)?
            .into_iter()
            .next())
    }

    fn find_by_workspace(&self, workspace_id: &WorkspaceId) -> stockroom_core::Result<Vec<Container>> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM containers WHERE workspace_id = ?1 ORDER BY name"
            ))?;
            let rows = stmt
                .query_map(params![workspace_id.as_str()], Self::map_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
    }

    fn find_by_location(
        &self,
        workspace_id: &WorkspaceId,
        location_id: &LocationId,
    ) -> stockroom_core::Result<Vec<Container>> {
        self.select("location_id = ?2", workspace_id, location_id.as_str())
    }

    fn inventory_count(&self, workspace_id: &WorkspaceId, id: &ContainerId) -> stockroom_core::Result<u64> {
        self.db.with_conn(|conn| {
            let n: i64 = conn.query_row(
                "SELECT COUNT(*) FROM inventory WHERE workspace_id = ?1 AND container_id = ?2",
                params![workspace_id.as_str(), id.as_str()],
                |row| row.get(0),
            )?;
            Ok(count(n))
        })
    }

    fn delete(&self, workspace_id: &WorkspaceId, id: &ContainerId) -> stockroom_core::Result<bool> {
        self.db.with_conn(|conn| {
            let changed = conn.execute(
                "DELETE FROM containers WHERE workspace_id = ?1 AND id = ?2",
                params![workspace_id.as_str(), id.as_str()],
            )?;
            Ok(changed > 0)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{container, fixture, location, other_workspace};
    use assert_matches::assert_matches;
    use stockroom_core::DomainError;

    #[test]
    fn find_by_location_and_scope() {
        let (db, ws) = fixture();
        let repo = SqliteContainerRepository::new(db.clone());
        let garage = location(&db, &ws, "Garage");
        let attic = location(&db, &ws, "Attic");
        let tote = container(&db, &ws, &garage.id);

        let here = repo.find_by_location(&ws, &garage.id).unwrap();
        assert_eq!(here, vec![tote.clone()]);
        assert!(repo.find_by_location(&ws, &attic.id).unwrap().is_empty());
        assert_eq!(repo.inventory_count(&ws, &tote.id).unwrap(), 0);

        let other = other_workspace(&db);
        assert!(repo.find_by_id(&other, &tote.id).unwrap().is_none());
    }

    #[test]
    fn unknown_location_is_rejected() {
        let (db, ws) = fixture();
        let repo = SqliteContainerRepository::new(db.clone());
        let garage = location(&db, &ws, "Garage");
        let mut tote = container(&db, &ws, &garage.id);
        tote.location_id = LocationId::from("loc-missing");
        assert_matches!(repo.save(&tote), Err(DomainError::Validation { .. }));
    }
}
