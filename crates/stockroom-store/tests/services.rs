//! Domain services running against the real `SQLite` repositories.

use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use stockroom_core::attachment::{AttachmentService, CreateAttachment, FileStorage, UploadFile};
use stockroom_core::borrower::{BorrowerService, CreateBorrower};
use stockroom_core::container::{ContainerService, CreateContainer, UpdateContainer};
use stockroom_core::inventory::{
    CreateInventory, InventoryFilter, InventoryService, InventoryStatus, MoveInventory,
};
use stockroom_core::item::{CreateItem, ItemFilter, ItemRepository, ItemService};
use stockroom_core::label::{CreateLabel, LabelRepository, LabelService};
use stockroom_core::loan::{CreateLoan, LoanFilter, LoanService};
use stockroom_core::location::{CreateLocation, LocationService};
use stockroom_core::movement::{MovementService, RecordMovement};
use stockroom_core::workspace::{CreateWorkspace, WorkspaceService};
use stockroom_core::{DomainError, PageRequest, WorkspaceId};
use stockroom_store::{Database, FilesystemStorage, Repositories};

struct Harness {
    _dir: tempfile::TempDir,
    repos: Repositories,
    storage: Arc<FilesystemStorage>,
    workspaces: WorkspaceService,
    locations: LocationService,
    containers: ContainerService,
    items: ItemService,
    inventory: InventoryService,
    movements: MovementService,
    labels: LabelService,
    attachments: AttachmentService,
    borrowers: BorrowerService,
    loans: LoanService,
}

impl Harness {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::in_memory().unwrap();
        let repos = Repositories::new(&db);
        let storage = Arc::new(FilesystemStorage::new(dir.path()).unwrap());
        Self {
            workspaces: WorkspaceService::new(repos.workspaces.clone()),
            locations: LocationService::new(repos.locations.clone()),
            containers: ContainerService::new(repos.containers.clone(), repos.locations.clone()),
            items: ItemService::new(repos.items.clone(), repos.categories.clone()),
            inventory: InventoryService::new(
                repos.inventory.clone(),
                repos.items.clone(),
                repos.locations.clone(),
                repos.containers.clone(),
            ),
            movements: MovementService::new(
                repos.movements.clone(),
                repos.inventory.clone(),
                repos.locations.clone(),
                repos.containers.clone(),
            ),
            labels: LabelService::new(repos.labels.clone(), repos.items.clone()),
            attachments: AttachmentService::new(
                repos.attachments.clone(),
                repos.files.clone(),
                storage.clone(),
                repos.items.clone(),
            ),
            borrowers: BorrowerService::new(repos.borrowers.clone()),
            loans: LoanService::new(
                repos.loans.clone(),
                repos.inventory.clone(),
                repos.borrowers.clone(),
            ),
            repos,
            storage,
            _dir: dir,
        }
    }

    fn workspace(&self, slug: &str) -> WorkspaceId {
        self.workspaces
            .create(&CreateWorkspace {
                name: slug.into(),
                slug: slug.into(),
                description: None,
            })
            .unwrap()
            .id
    }

    fn location(&self, ws: &WorkspaceId, name: &str) -> stockroom_core::location::Location {
        self.locations
            .create(
                ws,
                &CreateLocation {
                    name: name.into(),
                    ..Default::default()
                },
            )
            .unwrap()
    }

    fn item(&self, ws: &WorkspaceId, sku: &str) -> stockroom_core::item::Item {
        self.items
            .create(
                ws,
                &CreateItem {
                    name: format!("Item {sku}"),
                    sku: sku.into(),
                    min_stock_level: 5,
                    ..Default::default()
                },
            )
            .unwrap()
    }
}

#[test]
fn move_records_movement_and_updates_place() {
    let h = Harness::new();
    let ws = h.workspace("home");
    let garage = h.location(&ws, "Garage");
    let attic = h.location(&ws, "Attic");
    let tote = h
        .containers
        .create(
            &ws,
            &CreateContainer {
                name: "Tote".into(),
                location_id: attic.id.clone(),
                ..Default::default()
            },
        )
        .unwrap();
    let drill = h.item(&ws, "DRL");
    let stock = h
        .inventory
        .create(
            &ws,
            &CreateInventory {
                item_id: drill.id.clone(),
                location_id: garage.id.clone(),
                quantity: 3,
                ..Default::default()
            },
        )
        .unwrap();

    let (moved, movement) = h
        .inventory
        .move_to(
            &ws,
            &stock.id,
            &MoveInventory {
                location_id: attic.id.clone(),
                container_id: Some(tote.id.clone()),
                moved_by: Some("sam".into()),
                reason: None,
            },
        )
        .unwrap();

    assert_eq!(moved.container_id.as_ref(), Some(&tote.id));
    assert_eq!(movement.quantity, 3);
    assert_eq!(movement.from_location_id.as_ref(), Some(&garage.id));
    assert_eq!(h.movements.list_by_inventory(&ws, &stock.id).unwrap(), vec![movement]);
    assert_eq!(h.movements.list(&ws, PageRequest::default()).unwrap().total, 1);

    // Same place again is rejected.
    let again = h.inventory.move_to(
        &ws,
        &stock.id,
        &MoveInventory {
            location_id: attic.id.clone(),
            container_id: Some(tote.id.clone()),
            ..Default::default()
        },
    );
    assert_matches!(again, Err(DomainError::Validation { .. }));

    // The tote now holds stock and cannot be deleted.
    assert_matches!(h.containers.delete(&ws, &tote.id), Err(DomainError::Conflict(_)));
    assert_matches!(h.locations.delete(&ws, &attic.id), Err(DomainError::Conflict(_)));
}

#[test]
fn loan_lifecycle_drives_inventory_status() {
    let h = Harness::new();
    let ws = h.workspace("home");
    let shelf = h.location(&ws, "Shelf");
    let ladder = h.item(&ws, "LAD");
    let stock = h
        .inventory
        .create(
            &ws,
            &CreateInventory {
                item_id: ladder.id.clone(),
                location_id: shelf.id.clone(),
                quantity: 1,
                ..Default::default()
            },
        )
        .unwrap();
    let neighbour = h
        .borrowers
        .create(
            &ws,
            &CreateBorrower {
                name: "Neighbour".into(),
                ..Default::default()
            },
        )
        .unwrap();

    let loan = h
        .loans
        .create(
            &ws,
            &CreateLoan {
                inventory_id: stock.id.clone(),
                borrower_id: neighbour.id.clone(),
                quantity: 1,
                loaned_at: None,
                due_date: Some(Utc::now() + Duration::days(7)),
                notes: None,
            },
        )
        .unwrap();
    assert_eq!(h.inventory.get(&ws, &stock.id).unwrap().status, InventoryStatus::OnLoan);
    let second = CreateLoan {
        inventory_id: stock.id.clone(),
        borrower_id: neighbour.id.clone(),
        quantity: 1,
        loaned_at: None,
        due_date: None,
        notes: None,
    };
    assert_matches!(h.loans.create(&ws, &second), Err(DomainError::Conflict(_)));
    assert_matches!(h.borrowers.delete(&ws, &neighbour.id), Err(DomainError::Conflict(_)));
    assert_matches!(h.inventory.delete(&ws, &stock.id), Err(DomainError::Conflict(_)));

    let active = h
        .loans
        .list(
            &ws,
            &LoanFilter {
                active: true,
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(active.len(), 1);

    let returned = h.loans.return_loan(&ws, &loan.id).unwrap();
    assert!(returned.returned_at.is_some());
    assert_eq!(h.inventory.get(&ws, &stock.id).unwrap().status, InventoryStatus::Available);
    assert_matches!(h.loans.return_loan(&ws, &loan.id), Err(DomainError::Conflict(_)));

    h.borrowers.delete(&ws, &neighbour.id).unwrap();
}

#[test]
fn attachments_keep_one_primary_and_clean_up_blobs() {
    let h = Harness::new();
    let ws = h.workspace("home");
    let drill = h.item(&ws, "DRL");

    let file = h
        .attachments
        .upload(
            &ws,
            &UploadFile {
                original_name: "drill.jpg".into(),
                mime_type: Some("image/jpeg".into()),
            },
            b"\xff\xd8jpeg",
        )
        .unwrap();
    assert!(h.storage.exists(&file.storage_key).unwrap());

    let photo = h
        .attachments
        .create(
            &ws,
            &drill.id,
            &CreateAttachment {
                file_id: Some(file.id.clone()),
                is_primary: true,
                ..Default::default()
            },
        )
        .unwrap();
    let manual = h
        .attachments
        .create(
            &ws,
            &drill.id,
            &CreateAttachment {
                external_ref: Some("paperless:42".into()),
                is_primary: true,
                ..Default::default()
            },
        )
        .unwrap();

    let listed = h.attachments.list_for_item(&ws, &drill.id).unwrap();
    let primaries: Vec<_> = listed.iter().filter(|a| a.is_primary).map(|a| &a.id).collect();
    assert_eq!(primaries, vec![&manual.id]);

    let _ = h.attachments.set_primary(&ws, &photo.id).unwrap();
    let listed = h.attachments.list_for_item(&ws, &drill.id).unwrap();
    assert_eq!(listed[0].id, photo.id);
    assert!(!listed[1].is_primary);

    let (_, bytes) = h.attachments.download(&ws, &file.id).unwrap();
    assert_eq!(bytes, b"\xff\xd8jpeg");

    let _ = h.attachments.delete(&ws, &photo.id).unwrap();
    assert!(!h.storage.exists(&file.storage_key).unwrap());
    assert_matches!(h.attachments.get_file(&ws, &file.id), Err(DomainError::NotFound { .. }));
}

#[test]
fn workspaces_are_isolated_and_cascade() {
    let h = Harness::new();
    let home = h.workspace("home");
    let office = h.workspace("office");
    let drill = h.item(&home, "DRL");
    let _ = h.item(&office, "DRL");
    let label = h
        .labels
        .create(
            &home,
            &CreateLabel {
                name: "Power".into(),
                ..Default::default()
            },
        )
        .unwrap();
    let _ = h.labels.attach(&home, &drill.id, &label.id).unwrap();

    assert_matches!(h.items.get(&office, &drill.id), Err(DomainError::NotFound { .. }));
    assert_matches!(
        h.labels.attach(&office, &drill.id, &label.id),
        Err(DomainError::NotFound { .. })
    );

    let low = h.items.low_stock(&home).unwrap();
    assert_eq!(low.len(), 1);

    h.workspaces.delete(&home).unwrap();
    let remaining = h
        .repos
        .items
        .list(&office, &ItemFilter::default(), PageRequest::default())
        .unwrap();
    assert_eq!(remaining.total, 1);
    assert!(h.repos.labels.find_by_id(&home, &label.id).unwrap().is_none());
    assert!(h
        .inventory
        .list(&home, &InventoryFilter::default())
        .unwrap()
        .is_empty());
}

#[test]
fn container_with_stock_keeps_its_location() {
    let h = Harness::new();
    let ws = h.workspace("home");
    let garage = h.location(&ws, "Garage");
    let attic = h.location(&ws, "Attic");
    let tote = h
        .containers
        .create(
            &ws,
            &CreateContainer {
                name: "Tote".into(),
                location_id: garage.id.clone(),
                ..Default::default()
            },
        )
        .unwrap();
    let drill = h.item(&ws, "DRL");
    let stock = h
        .inventory
        .create(
            &ws,
            &CreateInventory {
                item_id: drill.id.clone(),
                location_id: garage.id.clone(),
                container_id: Some(tote.id.clone()),
                quantity: 3,
                ..Default::default()
            },
        )
        .unwrap();

    let relocate = UpdateContainer {
        location_id: Some(attic.id.clone()),
        ..Default::default()
    };
    assert_matches!(
        h.containers.update(&ws, &tote.id, &relocate),
        Err(DomainError::Conflict(_))
    );
    assert_eq!(h.containers.get(&ws, &tote.id).unwrap().location_id, garage.id);
    let inside = h.inventory.get(&ws, &stock.id).unwrap();
    assert_eq!(inside.location_id, garage.id);

    // Renaming without moving is still allowed.
    let renamed = h
        .containers
        .update(
            &ws,
            &tote.id,
            &UpdateContainer {
                name: Some("Red tote".into()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(renamed.name, "Red tote");

    // Once emptied, the container can follow.
    let _ = h
        .inventory
        .move_to(
            &ws,
            &stock.id,
            &MoveInventory {
                location_id: attic.id.clone(),
                ..Default::default()
            },
        )
        .unwrap();
    let moved = h.containers.update(&ws, &tote.id, &relocate).unwrap();
    assert_eq!(moved.location_id, attic.id);
}

#[test]
fn movements_only_reference_places_in_their_workspace() {
    let h = Harness::new();
    let home = h.workspace("home");
    let office = h.workspace("office");
    let shelf = h.location(&home, "Shelf");
    let garage = h.location(&home, "Garage");
    let desk = h.location(&office, "Desk");
    let drill = h.item(&home, "DRL");
    let stock = h
        .inventory
        .create(
            &home,
            &CreateInventory {
                item_id: drill.id.clone(),
                location_id: shelf.id.clone(),
                quantity: 2,
                ..Default::default()
            },
        )
        .unwrap();

    let foreign = h.movements.record(
        &home,
        &RecordMovement {
            inventory_id: stock.id.clone(),
            from_location_id: Some(shelf.id.clone()),
            to_location_id: Some(desk.id.clone()),
            quantity: 1,
            ..Default::default()
        },
    );
    assert_matches!(foreign, Err(DomainError::NotFound { entity: "location", .. }));
    assert!(h.movements.list_by_inventory(&home, &stock.id).unwrap().is_empty());

    let local = h
        .movements
        .record(
            &home,
            &RecordMovement {
                inventory_id: stock.id.clone(),
                from_location_id: Some(shelf.id.clone()),
                to_location_id: Some(garage.id.clone()),
                quantity: 1,
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(local.to_location_id.as_ref(), Some(&garage.id));
}

#[test]
fn item_attachments_are_removed_with_their_files() {
    let h = Harness::new();
    let ws = h.workspace("home");
    let drill = h.item(&ws, "DRL");
    let upload = |name: &str| {
        h.attachments
            .upload(
                &ws,
                &UploadFile {
                    original_name: name.into(),
                    mime_type: None,
                },
                b"bytes",
            )
            .unwrap()
    };
    let photo = upload("drill.jpg");
    let loose = upload("loose.pdf");
    let _ = h
        .attachments
        .create(
            &ws,
            &drill.id,
            &CreateAttachment {
                file_id: Some(photo.id.clone()),
                ..Default::default()
            },
        )
        .unwrap();
    let _ = h
        .attachments
        .create(
            &ws,
            &drill.id,
            &CreateAttachment {
                external_ref: Some("dms:7".into()),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(h.attachments.delete_for_item(&ws, &drill.id).unwrap(), 2);
    h.items.delete(&ws, &drill.id).unwrap();
    assert!(!h.storage.exists(&photo.storage_key).unwrap());
    assert_matches!(h.attachments.get_file(&ws, &photo.id), Err(DomainError::NotFound { .. }));

    // Unattached uploads go when the workspace does.
    let files = h.attachments.workspace_files(&ws).unwrap();
    assert_eq!(files, vec![loose.clone()]);
    h.workspaces.delete(&ws).unwrap();
    h.attachments.remove_blobs(&files);
    assert!(!h.storage.exists(&loose.storage_key).unwrap());
}
