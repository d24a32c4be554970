//! In-memory record store with switchable faults
//!
//! One `MemoryStore` implements every repository trait so a test can hand the
//! same `Arc` to each service and then inspect all tables.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;
use zingcab_auth::{JwtService, PasswordService, TokenLifetimes};
use zingcab_core::config::RateLimitConfig;
use zingcab_core::models::*;
use zingcab_core::traits::*;
use zingcab_core::{AppError, AppResult};
use zingcab_services::*;

#[derive(Default)]
pub struct Faults {
    pub detail_insert: AtomicBool,
    pub payment_insert: AtomicBool,
    pub set_payment: AtomicBool,
    pub booking_reads: AtomicBool,
    pub booking_delete: AtomicBool,
    pub booking_status: AtomicBool,
    pub assignment_lookup: AtomicBool,
    pub assignment_cascade: AtomicBool,
    /// Assignment lookups miss, as if a racing assign had not committed yet
    pub stale_lookup: AtomicBool,
}

impl Faults {
    pub fn arm(flag: &AtomicBool) {
        flag.store(true, Ordering::SeqCst);
    }

    pub fn disarm(flag: &AtomicBool) {
        flag.store(false, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool, what: &str) -> AppResult<()> {
        if flag.load(Ordering::SeqCst) {
            Err(AppError::Database(format!("injected failure: {}", what)))
        } else {
            Ok(())
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    pub faults: Faults,
    pub bookings: Mutex<HashMap<Uuid, Booking>>,
    pub details: Mutex<HashMap<Uuid, RideDetail>>,
    pub payments: Mutex<HashMap<Uuid, Payment>>,
    pub assignments: Mutex<HashMap<Uuid, DriverAssignment>>,
    pub coupons: Mutex<HashMap<Uuid, Coupon>>,
    pub users: Mutex<Vec<User>>,
    pub drivers: Mutex<Vec<Driver>>,
    pub admins: Mutex<Vec<Admin>>,
    pub cars: Mutex<Vec<Car>>,
    pub contacts: Mutex<Vec<ContactQuery>>,
}

impl MemoryStore {
    pub fn booking(&self, id: Uuid) -> Option<Booking> {
        self.bookings.lock().get(&id).cloned()
    }

    pub fn assignments_for(&self, booking_id: Uuid) -> Vec<DriverAssignment> {
        self.assignments
            .lock()
            .values()
            .filter(|a| a.booking_id == booking_id)
            .cloned()
            .collect()
    }

    pub fn add_coupon(&self, discount: Decimal, expires_in: chrono::Duration) -> Uuid {
        let coupon = Coupon {
            id: Uuid::new_v4(),
            code: None,
            discount_amount: discount,
            expiry_date: Utc::now() + expires_in,
        };
        let id = coupon.id;
        self.coupons.lock().insert(id, coupon);
        id
    }

    pub fn add_driver(&self, id: i32, phone: &str) -> Driver {
        let driver = Driver {
            id,
            name: format!("Driver {}", id),
            phone_number: phone.to_string(),
            driving_license: format!("DL-{}", id),
            created_at: Utc::now(),
        };
        self.drivers.lock().push(driver.clone());
        driver
    }

    pub fn add_user(&self, id: i32, phone: &str) -> User {
        let user = User {
            id,
            name: format!("Rider {}", id),
            phone_number: phone.to_string(),
            gender: None,
            email: None,
            dob: None,
            display_name: None,
            created_at: Utc::now(),
        };
        self.users.lock().push(user.clone());
        user
    }

    pub fn add_admin(&self, email: &str, password: &str) {
        let hash = PasswordService::new().hash_password(password).unwrap();
        self.admins.lock().push(Admin {
            id: 1,
            email: email.to_string(),
            password_hash: hash,
            name: None,
            created_at: Utc::now(),
        });
    }

    /// Force a booking into a status, bypassing every service
    pub fn set_booking_status(&self, id: Uuid, status: BookingStatus) {
        if let Some(b) = self.bookings.lock().get_mut(&id) {
            b.status = status;
        }
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn insert(&self, booking: &Booking) -> AppResult<Booking> {
        self.bookings.lock().insert(booking.id, booking.clone());
        Ok(booking.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>> {
        Faults::check(&self.faults.booking_reads, "booking read")?;
        Ok(self.booking(id))
    }

    async fn update_status(&self, id: Uuid, status: BookingStatus) -> AppResult<bool> {
        Faults::check(&self.faults.booking_status, "booking status")?;
        let mut bookings = self.bookings.lock();
        match bookings.get_mut(&id) {
            Some(b) => {
                b.status = status;
                b.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_payment(&self, id: Uuid, payment_id: Uuid) -> AppResult<()> {
        Faults::check(&self.faults.set_payment, "payment link")?;
        if let Some(b) = self.bookings.lock().get_mut(&id) {
            b.payment_id = Some(payment_id);
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Faults::check(&self.faults.booking_delete, "booking delete")?;
        Ok(self.bookings.lock().remove(&id).is_some())
    }

    async fn list_by_user(&self, user_id: i32) -> AppResult<Vec<Booking>> {
        let mut list: Vec<Booking> = self
            .bookings
            .lock()
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    async fn list_filtered(
        &self,
        status: Option<BookingStatus>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Booking>, i64)> {
        let mut list: Vec<Booking> = self
            .bookings
            .lock()
            .values()
            .filter(|b| status.map_or(true, |s| b.status == s))
            .cloned()
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = list.len() as i64;
        let page = list
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok((page, total))
    }
}

#[async_trait]
impl RideDetailRepository for MemoryStore {
    async fn insert(&self, booking_id: Uuid, detail: &RideDetail) -> AppResult<()> {
        Faults::check(&self.faults.detail_insert, "ride detail insert")?;
        self.details.lock().insert(booking_id, detail.clone());
        Ok(())
    }

    async fn find_by_booking(
        &self,
        booking_id: Uuid,
        ride_type: RideType,
    ) -> AppResult<Option<RideDetail>> {
        Ok(self
            .details
            .lock()
            .get(&booking_id)
            .filter(|d| d.ride_type() == ride_type)
            .cloned())
    }

    async fn find_for_bookings(&self, booking_ids: &[Uuid]) -> AppResult<Vec<(Uuid, RideDetail)>> {
        let details = self.details.lock();
        Ok(booking_ids
            .iter()
            .filter_map(|id| details.get(id).map(|d| (*id, d.clone())))
            .collect())
    }
}

#[async_trait]
impl PaymentRepository for MemoryStore {
    async fn insert(&self, payment: &Payment) -> AppResult<Payment> {
        Faults::check(&self.faults.payment_insert, "payment insert")?;
        self.payments.lock().insert(payment.id, payment.clone());
        Ok(payment.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Payment>> {
        Ok(self.payments.lock().get(&id).cloned())
    }
}

#[async_trait]
impl AssignmentRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<DriverAssignment>> {
        Ok(self.assignments.lock().get(&id).cloned())
    }

    async fn find_by_booking(&self, booking_id: Uuid) -> AppResult<Option<DriverAssignment>> {
        Faults::check(&self.faults.assignment_lookup, "assignment lookup")?;
        if self.faults.stale_lookup.load(Ordering::SeqCst) {
            return Ok(None);
        }
        Ok(self.assignments_for(booking_id).into_iter().next())
    }

    async fn upsert(&self, assignment: &DriverAssignment) -> AppResult<(DriverAssignment, bool)> {
        let mut assignments = self.assignments.lock();
        if let Some(existing) = assignments
            .values_mut()
            .find(|a| a.booking_id == assignment.booking_id)
        {
            existing.driver_id = assignment.driver_id;
            existing.status = AssignmentStatus::Assigned;
            existing.updated_at = Utc::now();
            return Ok((existing.clone(), false));
        }
        assignments.insert(assignment.id, assignment.clone());
        Ok((assignment.clone(), true))
    }

    async fn reassign(&self, id: Uuid, driver_id: i32) -> AppResult<DriverAssignment> {
        let mut assignments = self.assignments.lock();
        let a = assignments
            .get_mut(&id)
            .ok_or_else(|| AppError::AssignmentNotFound(id.to_string()))?;
        a.driver_id = driver_id;
        a.status = AssignmentStatus::Assigned;
        a.updated_at = Utc::now();
        Ok(a.clone())
    }

    async fn update_status(&self, id: Uuid, status: AssignmentStatus) -> AppResult<DriverAssignment> {
        let mut assignments = self.assignments.lock();
        let a = assignments
            .get_mut(&id)
            .ok_or_else(|| AppError::AssignmentNotFound(id.to_string()))?;
        a.status = status;
        a.updated_at = Utc::now();
        Ok(a.clone())
    }

    async fn update_status_by_booking(
        &self,
        booking_id: Uuid,
        status: AssignmentStatus,
    ) -> AppResult<u64> {
        Faults::check(&self.faults.assignment_cascade, "assignment cascade")?;
        let mut touched = 0;
        for a in self.assignments.lock().values_mut() {
            if a.booking_id == booking_id {
                a.status = status;
                a.updated_at = Utc::now();
                touched += 1;
            }
        }
        Ok(touched)
    }

    async fn list_by_driver(
        &self,
        driver_id: i32,
        status: Option<AssignmentStatus>,
    ) -> AppResult<Vec<DriverAssignment>> {
        let mut list: Vec<DriverAssignment> = self
            .assignments
            .lock()
            .values()
            .filter(|a| a.driver_id == driver_id && status.map_or(true, |s| a.status == s))
            .cloned()
            .collect();
        list.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(list)
    }

    async fn find_for_bookings(&self, booking_ids: &[Uuid]) -> AppResult<Vec<DriverAssignment>> {
        Ok(self
            .assignments
            .lock()
            .values()
            .filter(|a| booking_ids.contains(&a.booking_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CouponRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Coupon>> {
        Ok(self.coupons.lock().get(&id).cloned())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
        Ok(self.users.lock().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_phone(&self, phone: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .iter()
            .find(|u| u.phone_number == phone)
            .cloned())
    }

    async fn create(&self, user: &NewUser) -> AppResult<User> {
        let mut users = self.users.lock();
        if users.iter().any(|u| u.phone_number == user.phone_number) {
            return Err(AppError::Conflict("User already exists".to_string()));
        }
        let created = User {
            id: users.len() as i32 + 100,
            name: user.name.clone(),
            phone_number: user.phone_number.clone(),
            gender: user.gender.clone(),
            email: user.email.clone(),
            dob: user.dob,
            display_name: user.display_name.clone(),
            created_at: Utc::now(),
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: i32, update: &UserUpdate) -> AppResult<Option<User>> {
        let mut users = self.users.lock();
        Ok(users.iter_mut().find(|u| u.id == id).map(|user| {
            update.apply(user);
            user.clone()
        }))
    }

    async fn delete(&self, id: i32) -> AppResult<bool> {
        let mut users = self.users.lock();
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            return Ok(false);
        }

        let mut bookings = self.bookings.lock();
        let gone: Vec<Uuid> = bookings
            .values()
            .filter(|b| b.user_id == id)
            .map(|b| b.id)
            .collect();
        for booking_id in &gone {
            bookings.remove(booking_id);
            self.details.lock().remove(booking_id);
        }
        self.assignments
            .lock()
            .retain(|_, a| !gone.contains(&a.booking_id));
        self.payments.lock().retain(|_, p| p.user_id != id);
        Ok(true)
    }
}

#[async_trait]
impl DriverRepository for MemoryStore {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Driver>> {
        Ok(self.drivers.lock().iter().find(|d| d.id == id).cloned())
    }

    async fn find_by_phone(&self, phone: &str) -> AppResult<Option<Driver>> {
        Ok(self
            .drivers
            .lock()
            .iter()
            .find(|d| d.phone_number == phone)
            .cloned())
    }

    async fn create(&self, driver: &NewDriver) -> AppResult<Driver> {
        let mut drivers = self.drivers.lock();
        if drivers.iter().any(|d| d.phone_number == driver.phone_number) {
            return Err(AppError::Conflict(
                "Driver with this phone number already exists".to_string(),
            ));
        }
        let created = Driver {
            id: drivers.len() as i32 + 100,
            name: driver.name.clone(),
            phone_number: driver.phone_number.clone(),
            driving_license: driver.driving_license.clone(),
            created_at: Utc::now(),
        };
        drivers.push(created.clone());
        Ok(created)
    }

    async fn list_all(&self) -> AppResult<Vec<Driver>> {
        Ok(self.drivers.lock().clone())
    }
}

#[async_trait]
impl AdminRepository for MemoryStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Admin>> {
        Ok(self
            .admins
            .lock()
            .iter()
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .cloned())
    }
}

#[async_trait]
impl CarRepository for MemoryStore {
    async fn create(&self, car: &NewCar) -> AppResult<Car> {
        let mut cars = self.cars.lock();
        if cars
            .iter()
            .any(|c| c.registration_number == car.registration_number)
        {
            return Err(AppError::Conflict(
                "Car with this registration number already exists".to_string(),
            ));
        }
        let created = Car {
            id: cars.len() as i32 + 1,
            registration_number: car.registration_number.clone(),
            model: car.model.clone(),
            cab_type: car.cab_type.clone(),
            assigned_driver_id: None,
            created_at: Utc::now(),
        };
        cars.push(created.clone());
        Ok(created)
    }

    async fn list_all(&self) -> AppResult<Vec<FleetCar>> {
        let drivers = self.drivers.lock();
        Ok(self
            .cars
            .lock()
            .iter()
            .rev()
            .map(|car| FleetCar {
                car: car.clone(),
                driver: car
                    .assigned_driver_id
                    .and_then(|id| drivers.iter().find(|d| d.id == id))
                    .map(|d| DriverContact {
                        name: d.name.clone(),
                        phone_number: d.phone_number.clone(),
                    }),
            })
            .collect())
    }

    async fn assign_driver(&self, car_id: i32, driver_id: i32) -> AppResult<Option<Car>> {
        let mut cars = self.cars.lock();
        Ok(cars.iter_mut().find(|c| c.id == car_id).map(|car| {
            car.assigned_driver_id = Some(driver_id);
            car.clone()
        }))
    }
}

#[async_trait]
impl ContactRepository for MemoryStore {
    async fn create(&self, query: &NewContactQuery) -> AppResult<ContactQuery> {
        let mut contacts = self.contacts.lock();
        let saved = ContactQuery {
            id: contacts.len() as i32 + 1,
            name: query.name.clone(),
            phone_number: query.phone_number.clone(),
            email: query.email.clone(),
            message: query.message.clone(),
            created_at: Utc::now(),
        };
        contacts.push(saved.clone());
        Ok(saved)
    }

    async fn list_all(&self) -> AppResult<Vec<ContactQuery>> {
        Ok(self.contacts.lock().iter().rev().cloned().collect())
    }
}

/// Fully wired engine over one `MemoryStore`
pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub codes: Arc<InMemoryCredentialStore>,
    pub jwt: Arc<JwtService>,
    pub otp: Arc<OtpService>,
    pub limiter: Arc<InMemoryRateLimiter>,
    pub orchestrator: BookingOrchestrator,
    pub dispatch: DispatchManager,
    pub sync: StatusSynchronizer,
    pub accounts: AccountService,
    pub backoffice: BackOfficeService,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_strict(true)
    }

    pub fn with_strict(strict: bool) -> Self {
        let store = Arc::new(MemoryStore::default());
        let codes = Arc::new(InMemoryCredentialStore::new());
        let jwt = Arc::new(JwtService::new("test-secret", TokenLifetimes::default()));
        let otp = Arc::new(OtpService::new(
            codes.clone(),
            Arc::new(LogSmsGateway),
            chrono::Duration::minutes(10),
            "+91",
        ));

        let limiter = Arc::new(InMemoryRateLimiter::new());
        let throttle = AuthThrottle::from_config(limiter.clone(), &RateLimitConfig::default());

        let pricing = Arc::new(PricingEngine::new(
            store.clone(),
            Arc::new(FixedDistance(120)),
            Arc::new(FixedPackagePrice(Decimal::from(1800))),
        ));
        let writer = Arc::new(CompensatingBookingWriter::new(
            store.clone(),
            store.clone(),
            store.clone(),
        ));

        Self {
            orchestrator: BookingOrchestrator::new(
                store.clone(),
                store.clone(),
                store.clone(),
                writer,
                pricing,
            ),
            dispatch: DispatchManager::new(
                store.clone(),
                store.clone(),
                store.clone(),
                store.clone(),
            ),
            sync: StatusSynchronizer::new(store.clone(), store.clone(), strict),
            accounts: AccountService::new(
                store.clone(),
                store.clone(),
                store.clone(),
                store.clone(),
                otp.clone(),
                jwt.clone(),
                throttle,
            ),
            backoffice: BackOfficeService::new(store.clone(), store.clone(), store.clone()),
            store,
            codes,
            jwt,
            otp,
            limiter,
        }
    }

    /// Code currently stored for a phone number
    pub fn code_for(&self, phone: &str) -> String {
        self.codes.peek(phone).expect("no code issued").code
    }
}

pub fn pickup_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 11, 2).unwrap()
}

pub fn airport_ride(pickup: &str, drop: &str, cab: &str) -> RideRequest {
    RideRequest {
        ride_type: "airport".to_string(),
        pickup_location: pickup.to_string(),
        drop_location: Some(drop.to_string()),
        rental_package: None,
        pickup_date: pickup_date(),
        pickup_time: "09:30".to_string(),
        drop_off_date: None,
        cab_type: cab.to_string(),
        coupon_id: None,
    }
}

pub fn rental_ride(package: &str) -> RideRequest {
    RideRequest {
        ride_type: "rental".to_string(),
        pickup_location: "MG Road".to_string(),
        drop_location: None,
        rental_package: Some(package.to_string()),
        pickup_date: pickup_date(),
        pickup_time: "14:00".to_string(),
        drop_off_date: None,
        cab_type: "Hatchback".to_string(),
        coupon_id: None,
    }
}

pub fn draft(ride: RideRequest, distance: i32, price: Decimal) -> BookingDraft {
    BookingDraft {
        ride,
        distance,
        final_price: price,
    }
}
