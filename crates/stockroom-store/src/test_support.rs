//! Fixtures shared by the repository unit tests.

use stockroom_core::container::{Container, ContainerRepository, CreateContainer};
use stockroom_core::item::{CreateItem, Item, ItemRepository};
use stockroom_core::location::{CreateLocation, Location, LocationRepository};
use stockroom_core::workspace::{CreateWorkspace, Workspace, WorkspaceRepository};
use stockroom_core::{LocationId, WorkspaceId};

use crate::database::Database;
use crate::repositories::{
    SqliteContainerRepository, SqliteItemRepository, SqliteLocationRepository,
    SqliteWorkspaceRepository,
};

fn workspace(db: &Database, slug: &str) -> WorkspaceId {
    let ws = Workspace::new(&CreateWorkspace {
        name: slug.into(),
        slug: slug.into(),
        description: None,
    })
    .unwrap();
    SqliteWorkspaceRepository::new(db.clone()).save(&ws).unwrap();
    ws.id
}

/// Fresh database with one workspace.
pub fn fixture() -> (Database, WorkspaceId) {
    let db = Database::in_memory().unwrap();
    let ws = workspace(&db, "home");
    (db, ws)
}

/// A second workspace in the same database.
pub fn other_workspace(db: &Database) -> WorkspaceId {
    workspace(db, "other")
}

/// Persist a root location.
pub fn location(db: &Database, ws: &WorkspaceId, name: &str) -> Location {
    let location = Location::new(
        ws.clone(),
        &CreateLocation {
            name: name.into(),
            ..Default::default()
        },
    )
    .unwrap();
    SqliteLocationRepository::new(db.clone()).save(&location).unwrap();
    location
}

/// Persist a container at `location_id`.
pub fn container(db: &Database, ws: &WorkspaceId, location_id: &LocationId) -> Container {
    let container = Container::new(
        ws.clone(),
        &CreateContainer {
            name: "Tote".into(),
            location_id: location_id.clone(),
            ..Default::default()
        },
    )
    .unwrap();
    SqliteContainerRepository::new(db.clone()).save(&container).unwrap();
    container
}

/// Persist an item.
pub fn item(db: &Database, ws: &WorkspaceId, sku: &str, min_stock_level: i64) -> Item {
    let item = Item::new(
        ws.clone(),
        &CreateItem {
            name: format!("Item {sku}"),
            sku: sku.into(),
            min_stock_level,
            ..Default::default()
        },
    )
    .unwrap();
    SqliteItemRepository::new(db.clone()).save(&item).unwrap();
    item
}
