use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use mockall::mock;
use uuid::Uuid;

use crate::models::{
    DbBookingDetails, DbBranch, DbServiceType, DbSlotBookedCount, DbSlotDefinition, DbVehicle,
};
use crate::repositories::booking::AdmissionOutcome;

// Mock repositories for testing
mock! {
    pub SlotCatalogRepo {
        pub async fn list_slot_definitions(&self) -> eyre::Result<Vec<DbSlotDefinition>>;

        pub async fn get_slot_definition_by_time(
            &self,
            start_time: NaiveTime,
        ) -> eyre::Result<Option<DbSlotDefinition>>;
    }
}

mock! {
    pub BookingRepo {
        pub async fn booked_counts_for_date(
            &self,
            date: NaiveDate,
        ) -> eyre::Result<Vec<DbSlotBookedCount>>;

        pub async fn count_scheduled_at(
            &self,
            appointment_at: NaiveDateTime,
        ) -> eyre::Result<i64>;

        pub async fn admit_booking(
            &self,
            customer_email: &'static str,
            customer_name: &'static str,
            service_type_id: Uuid,
            vehicle_id: Uuid,
            branch_id: Uuid,
            appointment_at: NaiveDateTime,
            quota: i32,
        ) -> eyre::Result<AdmissionOutcome>;

        pub async fn cancel_booking(
            &self,
            id: Uuid,
            customer_email: &'static str,
        ) -> eyre::Result<bool>;

        pub async fn list_bookings_by_customer(
            &self,
            customer_email: &'static str,
        ) -> eyre::Result<Vec<DbBookingDetails>>;
    }
}

mock! {
    pub VehicleRepo {
        pub async fn get_vehicle_by_id(
            &self,
            id: Uuid,
        ) -> eyre::Result<Option<DbVehicle>>;
    }
}

mock! {
    pub ReferenceRepo {
        pub async fn get_service_type_by_id(
            &self,
            id: Uuid,
        ) -> eyre::Result<Option<DbServiceType>>;

        pub async fn get_branch_by_id(
            &self,
            id: Uuid,
        ) -> eyre::Result<Option<DbBranch>>;
    }
}
