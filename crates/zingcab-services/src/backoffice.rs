//! Fleet and contact-us handling for the back office

use std::sync::Arc;
use tracing::{info, instrument};
use zingcab_core::{
    models::{Car, CabType, ContactQuery, FleetCar, NewCar, NewContactQuery},
    traits::{CarRepository, ContactRepository, DriverRepository},
    AppError, AppResult,
};

pub struct BackOfficeService {
    cars: Arc<dyn CarRepository>,
    contacts: Arc<dyn ContactRepository>,
    drivers: Arc<dyn DriverRepository>,
}

impl BackOfficeService {
    pub fn new(
        cars: Arc<dyn CarRepository>,
        contacts: Arc<dyn ContactRepository>,
        drivers: Arc<dyn DriverRepository>,
    ) -> Self {
        Self {
            cars,
            contacts,
            drivers,
        }
    }

    /// Add a car to the fleet; its cab type must be one the rate table knows
    #[instrument(skip(self, car), fields(registration = %car.registration_number))]
    pub async fn register_car(&self, car: NewCar) -> AppResult<Car> {
        if CabType::from_str(&car.cab_type).is_none() {
            return Err(AppError::InvalidInput(format!(
                "Unknown cab type: {}",
                car.cab_type
            )));
        }

        let car = self.cars.create(&car).await?;
        info!("Car {} registered", car.id);
        Ok(car)
    }

    pub async fn list_cars(&self) -> AppResult<Vec<FleetCar>> {
        self.cars.list_all().await
    }

    /// Hand a car to a driver, replacing any previous driver
    #[instrument(skip(self))]
    pub async fn assign_car(&self, car_id: i32, driver_id: i32) -> AppResult<Car> {
        if self.drivers.find_by_id(driver_id).await?.is_none() {
            return Err(AppError::DriverNotFound(driver_id.to_string()));
        }

        let car = self
            .cars
            .assign_driver(car_id, driver_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Car not found".to_string()))?;

        info!("Car {} assigned to driver {}", car_id, driver_id);
        Ok(car)
    }

    #[instrument(skip(self, query), fields(email = %query.email))]
    pub async fn submit_contact(&self, query: NewContactQuery) -> AppResult<ContactQuery> {
        let saved = self.contacts.create(&query).await?;
        info!("Contact query {} received", saved.id);
        Ok(saved)
    }

    pub async fn list_contact_queries(&self) -> AppResult<Vec<ContactQuery>> {
        self.contacts.list_all().await
    }
}
