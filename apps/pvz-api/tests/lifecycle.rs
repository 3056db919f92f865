//! Full-stack scenarios against real SQLite databases.

use std::path::PathBuf;
use std::time::Duration;

use pvz_api::{ErrorCode, PvzService, RequestContext};
use pvz_core::{AllowedCities, ReceptionStatus, Role};
use pvz_db::{Database, DbConfig};
use uuid::Uuid;

/// On-disk database removed on drop, with its WAL side files.
struct TempDb {
    path: PathBuf,
}

impl TempDb {
    fn new() -> Self {
        TempDb {
            path: std::env::temp_dir().join(format!("pvz-test-{}.db", Uuid::new_v4())),
        }
    }
}

impl Drop for TempDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

async fn in_memory_service() -> PvzService {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    PvzService::new(db, AllowedCities::default(), Duration::from_secs(5))
}

async fn on_disk_service(tmp: &TempDb, connections: u32) -> PvzService {
    let config = DbConfig::new(&tmp.path)
        .max_connections(connections)
        .busy_timeout(Duration::from_secs(10));
    let db = Database::new(config).await.unwrap();
    PvzService::new(db, AllowedCities::default(), Duration::from_secs(30))
}

#[tokio::test]
async fn moderator_registers_employee_receives_fifty_products() {
    let svc = in_memory_service().await;
    let moderator = RequestContext::for_role(Role::Moderator);
    let employee = RequestContext::for_role(Role::Employee);

    let pvz = svc.create_pickup_point(&moderator, "Moscow").await.unwrap();
    let pvz_id = pvz.id.to_string();

    let reception = svc.open_reception(&employee, &pvz_id).await.unwrap();
    assert_eq!(reception.status, ReceptionStatus::InProgress);

    let mut added = Vec::with_capacity(50);
    for _ in 0..50 {
        added.push(svc.add_product(&employee, &pvz_id, "electronics").await.unwrap());
    }

    let closed = svc.close_last_reception(&employee, &pvz_id).await.unwrap();
    assert_eq!(closed.id, reception.id);
    assert_eq!(closed.status, ReceptionStatus::Close);

    let report = svc
        .list_report(&employee, None, None, None, None)
        .await
        .unwrap();
    assert_eq!(report.len(), 1);
    assert_eq!(report[0].pvz, pvz);
    assert_eq!(report[0].receptions.len(), 1);

    let entry = &report[0].receptions[0];
    assert_eq!(entry.reception.status, ReceptionStatus::Close);
    assert_eq!(entry.products, added);
    assert!(entry.products.iter().all(|p| p.product_type == "electronics"));
    assert!(entry.products.iter().all(|p| p.reception_id == reception.id));
}

#[tokio::test]
async fn report_json_matches_wire_contract() {
    let svc = in_memory_service().await;
    let moderator = RequestContext::for_role(Role::Moderator);
    let employee = RequestContext::for_role(Role::Employee);

    let pvz = svc.create_pickup_point(&moderator, "Kazan").await.unwrap();
    let pvz_id = pvz.id.to_string();
    svc.open_reception(&employee, &pvz_id).await.unwrap();
    svc.add_product(&employee, &pvz_id, "shoes").await.unwrap();

    let report = svc
        .list_report(&employee, None, None, None, None)
        .await
        .unwrap();
    let json = serde_json::to_value(&report).unwrap();

    let entry = &json[0];
    assert_eq!(entry["pvz"]["city"], "Kazan");
    assert!(entry["pvz"]["registrationDate"].is_string());

    let reception = &entry["receptions"][0]["reception"];
    assert_eq!(reception["status"], "in_progress");
    assert_eq!(reception["pvzId"], pvz_id.as_str());

    let product = &entry["receptions"][0]["products"][0];
    assert_eq!(product["type"], "shoes");
    assert_eq!(product["receptionId"], reception["id"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_opens_admit_exactly_one() {
    const ATTEMPTS: usize = 16;

    let tmp = TempDb::new();
    let svc = on_disk_service(&tmp, 8).await;
    let moderator = RequestContext::for_role(Role::Moderator);

    let pvz = svc.create_pickup_point(&moderator, "Saint Petersburg").await.unwrap();
    let pvz_id = pvz.id.to_string();

    let mut handles = Vec::with_capacity(ATTEMPTS);
    for _ in 0..ATTEMPTS {
        let svc = svc.clone();
        let pvz_id = pvz_id.clone();
        handles.push(tokio::spawn(async move {
            let employee = RequestContext::for_role(Role::Employee);
            svc.open_reception(&employee, &pvz_id).await
        }));
    }

    let mut opened = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => opened += 1,
            Err(err) if err.code == ErrorCode::Conflict => conflicts += 1,
            Err(err) => panic!("unexpected error: {err}"),
        }
    }

    assert_eq!(opened, 1);
    assert_eq!(conflicts, ATTEMPTS - 1);
    assert_eq!(
        svc.database()
            .receptions()
            .count_by_pickup_point(pvz.id)
            .await
            .unwrap(),
        1
    );

    svc.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_adds_and_deletes_keep_the_count() {
    const ADDS: usize = 12;
    const DELETES: usize = 5;

    let tmp = TempDb::new();
    let svc = on_disk_service(&tmp, 8).await;
    let moderator = RequestContext::for_role(Role::Moderator);
    let employee = RequestContext::for_role(Role::Employee);

    let pvz = svc.create_pickup_point(&moderator, "Moscow").await.unwrap();
    let pvz_id = pvz.id.to_string();
    let reception = svc.open_reception(&employee, &pvz_id).await.unwrap();

    let mut adds = Vec::new();
    for _ in 0..ADDS {
        let svc = svc.clone();
        let pvz_id = pvz_id.clone();
        adds.push(tokio::spawn(async move {
            svc.add_product(&employee, &pvz_id, "clothes").await
        }));
    }
    for handle in adds {
        handle.await.unwrap().unwrap();
    }

    let mut deletes = Vec::new();
    for _ in 0..DELETES {
        let svc = svc.clone();
        let pvz_id = pvz_id.clone();
        deletes.push(tokio::spawn(async move {
            svc.delete_last_product(&employee, &pvz_id).await
        }));
    }
    for handle in deletes {
        handle.await.unwrap().unwrap();
    }

    let remaining = svc
        .database()
        .products()
        .count_by_reception(reception.id)
        .await
        .unwrap();
    assert_eq!(remaining as usize, ADDS - DELETES);

    svc.close().await;
}

#[tokio::test]
async fn data_survives_reopening_the_database() {
    let tmp = TempDb::new();
    let employee = RequestContext::for_role(Role::Employee);

    let pvz_id = {
        let svc = on_disk_service(&tmp, 2).await;
        let pvz = svc
            .create_pickup_point(&RequestContext::for_role(Role::Moderator), "Kazan")
            .await
            .unwrap();
        svc.open_reception(&employee, &pvz.id.to_string()).await.unwrap();
        svc.close().await;
        pvz.id.to_string()
    };

    let svc = on_disk_service(&tmp, 2).await;
    let err = svc.open_reception(&employee, &pvz_id).await.unwrap_err();
    assert_eq!(err.code, ErrorCode::Conflict);

    svc.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn expired_deadline_rolls_back_open_reception() {
    let tmp = TempDb::new();
    let svc = on_disk_service(&tmp, 4).await;
    let employee = RequestContext::for_role(Role::Employee);

    let pvz = svc
        .create_pickup_point(&RequestContext::for_role(Role::Moderator), "Moscow")
        .await
        .unwrap();
    let pvz_id = pvz.id.to_string();

    // A second connection holds the write lock, so the ledger write stalls in
    // lock_pickup_point until the deadline drops it.
    let mut locker = svc.database().pool().acquire().await.unwrap();
    sqlx::query("BEGIN").execute(&mut *locker).await.unwrap();
    sqlx::query("UPDATE pickup_points SET city = city")
        .execute(&mut *locker)
        .await
        .unwrap();

    let err = svc
        .open_reception(&employee.clone().with_timeout(Duration::from_millis(200)), &pvz_id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::StoreError);
    assert_eq!(err.message, "Operation timed out");

    sqlx::query("ROLLBACK").execute(&mut *locker).await.unwrap();
    drop(locker);

    // The abandoned attempt left nothing behind: no reception, no lock.
    let reception = svc.open_reception(&employee, &pvz_id).await.unwrap();
    assert_eq!(reception.status, ReceptionStatus::InProgress);

    let receptions = svc.database().receptions();
    assert_eq!(receptions.count_by_pickup_point(pvz.id).await.unwrap(), 1);
    assert_eq!(receptions.find_open(pvz.id).await.unwrap(), Some(reception));

    svc.close().await;
}
