
use autocrm_core::{
    errors::CrmError,
    models::booking::{
        BookingStatus, CancelBookingResponse, CreateBookingRequest, CreateBookingResponse,
    },
    models::customer::{CustomerIdentity, UNKNOWN_CUSTOMER},
    models::slot::{effective_quota, parse_slot_date, parse_slot_time},
};
use autocrm_db::models::{DbBooking, DbBranch, DbServiceType, DbSlotDefinition, DbVehicle};
use autocrm_db::repositories::booking::AdmissionOutcome;
use chrono::{NaiveDateTime, Utc};
use mockall::predicate;
use uuid::Uuid;

use autocrm_api::middleware::error_handling::AppError;
use test_utils::TestContext;

// Wrapper replicating the admission steps, in order, against mock
// repositories. The admit call stands in for the transactional re-check.
async fn test_create_booking_wrapper(
    ctx: &mut TestContext,
    identity: &CustomerIdentity,
    payload: CreateBookingRequest,
) -> Result<CreateBookingResponse, AppError> {
    let vehicle_id = payload
        .vehicle_id
        .ok_or_else(|| AppError(CrmError::Validation("Missing required field: vehicle_id".into())))?;
    let service_type_id = payload.service_type_id.ok_or_else(|| {
        AppError(CrmError::Validation("Missing required field: service_type_id".into()))
    })?;
    let branch_id = payload
        .branch_id
        .ok_or_else(|| AppError(CrmError::Validation("Missing required field: branch_id".into())))?;
    let date_raw = payload
        .date
        .ok_or_else(|| AppError(CrmError::Validation("Missing required field: date".into())))?;
    let time_raw = payload
        .time
        .ok_or_else(|| AppError(CrmError::Validation("Missing required field: time".into())))?;

    let date = parse_slot_date(&date_raw)
        .ok_or_else(|| AppError(CrmError::Validation("Invalid date format".into())))?;
    let time = parse_slot_time(&time_raw)
        .ok_or_else(|| AppError(CrmError::Validation("Invalid time format".into())))?;
    let appointment_at = date.and_time(time);

    // Quota by exact slot-time match, then the capacity pre-check
    let slot = ctx.slot_catalog_repo.get_slot_definition_by_time(time).await?;
    let quota = effective_quota(slot.and_then(|slot| slot.quota));

    let booked = ctx.booking_repo.count_scheduled_at(appointment_at).await?;
    if booked >= i64::from(quota) {
        return Err(AppError(CrmError::Conflict("Slot is fully booked".into())));
    }

    // Vehicle existence and ownership, before any insert
    let vehicle = ctx
        .vehicle_repo
        .get_vehicle_by_id(vehicle_id)
        .await?
        .ok_or_else(|| AppError(CrmError::NotFound("Vehicle not found".into())))?;

    if vehicle.owner_email != identity.email {
        return Err(AppError(CrmError::Authorization(
            "Vehicle does not belong to the requesting customer".into(),
        )));
    }

    ctx.reference_repo
        .get_service_type_by_id(service_type_id)
        .await?
        .ok_or_else(|| AppError(CrmError::Validation("Unknown service type".into())))?;
    ctx.reference_repo
        .get_branch_by_id(branch_id)
        .await?
        .ok_or_else(|| AppError(CrmError::Validation("Unknown branch".into())))?;

    // Static references for mockall
    let email_static: &'static str = Box::leak(identity.email.clone().into_boxed_str());
    let name_static: &'static str = Box::leak(identity.display_name().into_boxed_str());

    match ctx
        .booking_repo
        .admit_booking(
            email_static,
            name_static,
            service_type_id,
            vehicle_id,
            branch_id,
            appointment_at,
            quota,
        )
        .await?
    {
        AdmissionOutcome::Admitted(booking) => Ok(CreateBookingResponse {
            booking_id: booking.id,
        }),
        AdmissionOutcome::CapacityExhausted { .. } => {
            Err(AppError(CrmError::Conflict("Slot is fully booked".into())))
        }
    }
}

async fn test_cancel_booking_wrapper(
    ctx: &mut TestContext,
    identity: &CustomerIdentity,
    booking_id: Uuid,
) -> Result<CancelBookingResponse, AppError> {
    let email_static: &'static str = Box::leak(identity.email.clone().into_boxed_str());

    let cancelled = ctx.booking_repo.cancel_booking(booking_id, email_static).await?;
    if !cancelled {
        return Err(AppError(CrmError::NotFound(format!(
            "Booking with ID {} not found",
            booking_id
        ))));
    }

    Ok(CancelBookingResponse { success: true })
}

fn identity(email: &str, first_name: Option<&str>, last_name: Option<&str>) -> CustomerIdentity {
    CustomerIdentity {
        email: email.to_string(),
        first_name: first_name.map(ToString::to_string),
        last_name: last_name.map(ToString::to_string),
    }
}

fn request(vehicle_id: Uuid, service_type_id: Uuid, branch_id: Uuid) -> CreateBookingRequest {
    CreateBookingRequest {
        vehicle_id: Some(vehicle_id),
        service_type_id: Some(service_type_id),
        branch_id: Some(branch_id),
        date: Some("2024-06-10".to_string()),
        time: Some("09:00".to_string()),
    }
}

fn vehicle(id: Uuid, owner_email: &str) -> DbVehicle {
    DbVehicle {
        id,
        owner_email: owner_email.to_string(),
        make: "Volvo".to_string(),
        model: "V60".to_string(),
        license_plate: "AB-123-CD".to_string(),
        created_at: Utc::now(),
    }
}

fn service_type(id: Uuid) -> DbServiceType {
    DbServiceType {
        id,
        name: "Inspection".to_string(),
        created_at: Utc::now(),
    }
}

fn branch(id: Uuid) -> DbBranch {
    DbBranch {
        id,
        name: "Downtown".to_string(),
        created_at: Utc::now(),
    }
}

fn admitted_booking(
    id: Uuid,
    email: &str,
    name: &str,
    service_type_id: Uuid,
    vehicle_id: Uuid,
    branch_id: Uuid,
    appointment_at: NaiveDateTime,
) -> DbBooking {
    DbBooking {
        id,
        customer_email: email.to_string(),
        customer_name: name.to_string(),
        service_type_id,
        vehicle_id,
        branch_id,
        appointment_at,
        status: BookingStatus::Scheduled,
        created_at: Utc::now(),
    }
}

fn slot_definition(quota: Option<i32>) -> DbSlotDefinition {
    DbSlotDefinition {
        id: Uuid::new_v4(),
        start_time: parse_slot_time("09:00").unwrap(),
        quota,
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_create_booking_success() {
    let mut ctx = TestContext::new();
    let caller = identity("jane@example.com", Some("Jane"), Some("Doe"));
    let booking_id = Uuid::new_v4();
    let vehicle_id = Uuid::new_v4();
    let service_type_id = Uuid::new_v4();
    let branch_id = Uuid::new_v4();
    let appointment_at = parse_slot_date("2024-06-10")
        .unwrap()
        .and_time(parse_slot_time("09:00").unwrap());

    ctx.slot_catalog_repo
        .expect_get_slot_definition_by_time()
        .returning(|_| Ok(Some(slot_definition(Some(20)))));

    ctx.booking_repo
        .expect_count_scheduled_at()
        .with(predicate::eq(appointment_at))
        .returning(|_| Ok(0));

    ctx.vehicle_repo
        .expect_get_vehicle_by_id()
        .with(predicate::eq(vehicle_id))
        .returning(move |id| Ok(Some(vehicle(id, "jane@example.com"))));

    ctx.reference_repo
        .expect_get_service_type_by_id()
        .returning(|id| Ok(Some(service_type(id))));
    ctx.reference_repo
        .expect_get_branch_by_id()
        .returning(|id| Ok(Some(branch(id))));

    // The composed display name flows into the admitted row
    ctx.booking_repo
        .expect_admit_booking()
        .with(
            predicate::eq("jane@example.com"),
            predicate::eq("Jane Doe"),
            predicate::eq(service_type_id),
            predicate::eq(vehicle_id),
            predicate::eq(branch_id),
            predicate::eq(appointment_at),
            predicate::eq(20),
        )
        .times(1)
        .returning(move |email, name, service_type_id, vehicle_id, branch_id, appointment_at, _| {
            Ok(AdmissionOutcome::Admitted(admitted_booking(
                booking_id,
                email,
                name,
                service_type_id,
                vehicle_id,
                branch_id,
                appointment_at,
            )))
        });

    let result = test_create_booking_wrapper(
        &mut ctx,
        &caller,
        request(vehicle_id, service_type_id, branch_id),
    )
    .await;

    assert!(result.is_ok());
    assert_eq!(result.unwrap().booking_id, booking_id);
}

#[tokio::test]
async fn test_create_booking_missing_field() {
    let mut ctx = TestContext::new();
    let caller = identity("jane@example.com", Some("Jane"), Some("Doe"));

    let payload = CreateBookingRequest {
        vehicle_id: Some(Uuid::new_v4()),
        service_type_id: Some(Uuid::new_v4()),
        branch_id: Some(Uuid::new_v4()),
        date: None,
        time: Some("09:00".to_string()),
    };

    let result = test_create_booking_wrapper(&mut ctx, &caller, payload).await;

    assert!(result.is_err());
    match result.unwrap_err().0 {
        CrmError::Validation(_) => {} // Expected
        e => panic!("Expected Validation error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_create_booking_capacity_conflict() {
    let mut ctx = TestContext::new();
    let caller = identity("jane@example.com", Some("Jane"), Some("Doe"));

    ctx.slot_catalog_repo
        .expect_get_slot_definition_by_time()
        .returning(|_| Ok(None)); // No catalog entry: default quota of 20 applies

    ctx.booking_repo
        .expect_count_scheduled_at()
        .returning(|_| Ok(20));

    // Capacity rejection happens before any ownership lookup or insert
    ctx.vehicle_repo
        .expect_get_vehicle_by_id()
        .times(0)
        .returning(|_| panic!("Should not be called"));
    ctx.booking_repo
        .expect_admit_booking()
        .times(0)
        .returning(|_, _, _, _, _, _, _| panic!("Should not be called"));

    let result = test_create_booking_wrapper(
        &mut ctx,
        &caller,
        request(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()),
    )
    .await;

    assert!(result.is_err());
    match result.unwrap_err().0 {
        CrmError::Conflict(_) => {} // Expected
        e => panic!("Expected Conflict error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_create_booking_write_time_conflict() {
    // Both concurrent callers passed the pre-check for the last unit; the
    // admission transaction re-verifies under the slot lock and the loser is
    // rejected with a conflict.
    let mut ctx = TestContext::new();
    let caller = identity("jane@example.com", Some("Jane"), Some("Doe"));
    let vehicle_id = Uuid::new_v4();

    ctx.slot_catalog_repo
        .expect_get_slot_definition_by_time()
        .returning(|_| Ok(Some(slot_definition(Some(1)))));

    ctx.booking_repo
        .expect_count_scheduled_at()
        .returning(|_| Ok(0));

    ctx.vehicle_repo
        .expect_get_vehicle_by_id()
        .returning(move |id| Ok(Some(vehicle(id, "jane@example.com"))));

    ctx.reference_repo
        .expect_get_service_type_by_id()
        .returning(|id| Ok(Some(service_type(id))));
    ctx.reference_repo
        .expect_get_branch_by_id()
        .returning(|id| Ok(Some(branch(id))));

    ctx.booking_repo
        .expect_admit_booking()
        .times(1)
        .returning(|_, _, _, _, _, _, quota| {
            Ok(AdmissionOutcome::CapacityExhausted { booked: 1, quota })
        });

    let result = test_create_booking_wrapper(
        &mut ctx,
        &caller,
        request(vehicle_id, Uuid::new_v4(), Uuid::new_v4()),
    )
    .await;

    assert!(result.is_err());
    match result.unwrap_err().0 {
        CrmError::Conflict(_) => {} // Expected
        e => panic!("Expected Conflict error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_create_booking_foreign_vehicle_is_rejected() {
    let mut ctx = TestContext::new();
    let caller = identity("jane@example.com", Some("Jane"), Some("Doe"));
    let vehicle_id = Uuid::new_v4();

    ctx.slot_catalog_repo
        .expect_get_slot_definition_by_time()
        .returning(|_| Ok(Some(slot_definition(Some(20)))));

    ctx.booking_repo
        .expect_count_scheduled_at()
        .returning(|_| Ok(0));

    // The vehicle exists but belongs to another customer
    ctx.vehicle_repo
        .expect_get_vehicle_by_id()
        .returning(move |id| Ok(Some(vehicle(id, "other@example.com"))));

    // Rejected even though capacity is available, and before any insert
    ctx.booking_repo
        .expect_admit_booking()
        .times(0)
        .returning(|_, _, _, _, _, _, _| panic!("Should not be called"));

    let result = test_create_booking_wrapper(
        &mut ctx,
        &caller,
        request(vehicle_id, Uuid::new_v4(), Uuid::new_v4()),
    )
    .await;

    assert!(result.is_err());
    match result.unwrap_err().0 {
        CrmError::Authorization(_) => {} // Expected
        e => panic!("Expected Authorization error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_create_booking_unknown_vehicle() {
    let mut ctx = TestContext::new();
    let caller = identity("jane@example.com", Some("Jane"), Some("Doe"));

    ctx.slot_catalog_repo
        .expect_get_slot_definition_by_time()
        .returning(|_| Ok(Some(slot_definition(Some(20)))));

    ctx.booking_repo
        .expect_count_scheduled_at()
        .returning(|_| Ok(0));

    ctx.vehicle_repo
        .expect_get_vehicle_by_id()
        .returning(|_| Ok(None));

    let result = test_create_booking_wrapper(
        &mut ctx,
        &caller,
        request(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()),
    )
    .await;

    assert!(result.is_err());
    match result.unwrap_err().0 {
        CrmError::NotFound(_) => {} // Expected
        e => panic!("Expected NotFound error, got: {:?}", e),
    }
}

#[tokio::test]
async fn test_create_booking_unknown_customer_placeholder() {
    let mut ctx = TestContext::new();
    // The verified identity carries no structured name fields
    let caller = identity("anon@example.com", None, None);
    let vehicle_id = Uuid::new_v4();

    ctx.slot_catalog_repo
        .expect_get_slot_definition_by_time()
        .returning(|_| Ok(Some(slot_definition(Some(20)))));

    ctx.booking_repo
        .expect_count_scheduled_at()
        .returning(|_| Ok(0));

    ctx.vehicle_repo
        .expect_get_vehicle_by_id()
        .returning(move |id| Ok(Some(vehicle(id, "anon@example.com"))));

    ctx.reference_repo
        .expect_get_service_type_by_id()
        .returning(|id| Ok(Some(service_type(id))));
    ctx.reference_repo
        .expect_get_branch_by_id()
        .returning(|id| Ok(Some(branch(id))));

    ctx.booking_repo
        .expect_admit_booking()
        .with(
            predicate::eq("anon@example.com"),
            predicate::eq(UNKNOWN_CUSTOMER),
            predicate::always(),
            predicate::always(),
            predicate::always(),
            predicate::always(),
            predicate::always(),
        )
        .times(1)
        .returning(|email, name, service_type_id, vehicle_id, branch_id, appointment_at, _| {
            Ok(AdmissionOutcome::Admitted(admitted_booking(
                Uuid::new_v4(),
                email,
                name,
                service_type_id,
                vehicle_id,
                branch_id,
                appointment_at,
            )))
        });

    let result = test_create_booking_wrapper(
        &mut ctx,
        &caller,
        request(vehicle_id, Uuid::new_v4(), Uuid::new_v4()),
    )
    .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_cancel_booking_success() {
    let mut ctx = TestContext::new();
    let caller = identity("jane@example.com", Some("Jane"), Some("Doe"));
    let booking_id = Uuid::new_v4();

    ctx.booking_repo
        .expect_cancel_booking()
        .with(predicate::eq(booking_id), predicate::eq("jane@example.com"))
        .times(1)
        .returning(|_, _| Ok(true));

    let result = test_cancel_booking_wrapper(&mut ctx, &caller, booking_id).await;

    assert!(result.is_ok());
    assert!(result.unwrap().success);
}

#[tokio::test]
async fn test_cancel_booking_not_found_collapse() {
    // A missing booking, another customer's booking, and an already-cancelled
    // booking all produce the same not-found response.
    let mut ctx = TestContext::new();
    let caller = identity("jane@example.com", Some("Jane"), Some("Doe"));
    let booking_id = Uuid::new_v4();

    ctx.booking_repo
        .expect_cancel_booking()
        .returning(|_, _| Ok(false));

    let result = test_cancel_booking_wrapper(&mut ctx, &caller, booking_id).await;

    assert!(result.is_err());
    match result.unwrap_err().0 {
        CrmError::NotFound(_) => {} // Expected
        e => panic!("Expected NotFound error, got: {:?}", e),
    }
}
