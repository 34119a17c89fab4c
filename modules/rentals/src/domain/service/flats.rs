use chrono::{NaiveDate, NaiveTime};
use listing_query::{ListPage, ListQuery};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::{db_err, Principal, Service};
use crate::contract::model::{Flat, FlatPatch, FlatWithOwner, NewFlat};
use crate::domain::error::DomainError;
use crate::domain::fields::{id_tiebreaker, FLAT_SCHEMA};
use crate::domain::validation;

fn midnight_utc(d: NaiveDate) -> chrono::DateTime<chrono::Utc> {
    d.and_time(NaiveTime::MIN).and_utc()
}

impl Service {
    #[instrument(name = "rentals.service.list_flats", skip(self, params))]
    pub async fn list_flats<'a, I>(&self, params: I) -> Result<ListPage<FlatWithOwner>, DomainError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let query = ListQuery::from_pairs(params, &FLAT_SCHEMA, self.config.limits)?
            .with_tiebreaker(id_tiebreaker());
        let page = self.repos.flats.list_page(&query).await.map_err(db_err)?;
        debug!(total = page.total_count, returned = page.count(), "Listed flats");
        Ok(page)
    }

    #[instrument(name = "rentals.service.get_flat", skip(self), fields(flat_id = %id))]
    pub async fn get_flat(&self, id: Uuid) -> Result<FlatWithOwner, DomainError> {
        self.repos
            .flats
            .find_with_owner(id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::flat_not_found(id))
    }

    #[instrument(name = "rentals.service.my_flats", skip(self, caller), fields(user_id = %caller.id))]
    pub async fn my_flats(&self, caller: &Principal) -> Result<Vec<Flat>, DomainError> {
        self.repos
            .flats
            .list_by_owner(caller.id)
            .await
            .map_err(db_err)
    }

    #[instrument(
        name = "rentals.service.create_flat",
        skip(self, caller, new_flat),
        fields(owner_id = %caller.id, city = %new_flat.city)
    )]
    pub async fn create_flat(&self, caller: &Principal, new_flat: NewFlat) -> Result<Flat, DomainError> {
        info!("Creating flat");
        let now = Self::now();
        let today = now.date_naive();

        validation::required("title", &new_flat.title)?;
        validation::required("city", &new_flat.city)?;
        validation::required("streetName", &new_flat.street_name)?;
        validation::positive_int("streetNumber", new_flat.street_number)?;
        validation::positive_number("areaSize", new_flat.area_size)?;
        validation::year_built(new_flat.year_built, today)?;
        validation::positive_number("rentPrice", new_flat.rent_price)?;
        validation::required("imageUrl", &new_flat.image_url)?;

        let flat = Flat {
            id: Uuid::now_v7(),
            owner_id: caller.id,
            title: new_flat.title.trim().to_string(),
            city: new_flat.city.trim().to_string(),
            street_name: new_flat.street_name.trim().to_string(),
            street_number: new_flat.street_number,
            area_size: new_flat.area_size,
            has_ac: new_flat.has_ac,
            year_built: new_flat.year_built,
            rent_price: new_flat.rent_price,
            date_available: midnight_utc(new_flat.date_available),
            image_url: new_flat.image_url.trim().to_string(),
            image_handle: new_flat.image_handle.filter(|h| !h.trim().is_empty()),
            created_at: now,
            updated_at: now,
        };
        self.repos
            .flats
            .insert(flat.clone())
            .await
            .map_err(db_err)?;
        info!(flat_id = %flat.id, "Flat created");
        Ok(flat)
    }

    /// Owner only. A new image URL replaces the handle and releases the old one.
    #[instrument(name = "rentals.service.update_flat", skip(self, caller, patch), fields(flat_id = %id))]
    pub async fn update_flat(
        &self,
        caller: &Principal,
        id: Uuid,
        patch: FlatPatch,
    ) -> Result<Flat, DomainError> {
        info!("Updating flat");
        let mut flat = self
            .repos
            .flats
            .find_by_id(id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::flat_not_found(id))?;
        if flat.owner_id != caller.id {
            return Err(DomainError::forbidden("only the owner can edit this flat"));
        }
        let now = Self::now();

        if let Some(title) = patch.title {
            validation::required("title", &title)?;
            flat.title = title.trim().to_string();
        }
        if let Some(city) = patch.city {
            validation::required("city", &city)?;
            flat.city = city.trim().to_string();
        }
        if let Some(street) = patch.street_name {
            validation::required("streetName", &street)?;
            flat.street_name = street.trim().to_string();
        }
        if let Some(n) = patch.street_number {
            validation::positive_int("streetNumber", n)?;
            flat.street_number = n;
        }
        if let Some(area) = patch.area_size {
            validation::positive_number("areaSize", area)?;
            flat.area_size = area;
        }
        if let Some(has_ac) = patch.has_ac {
            flat.has_ac = has_ac;
        }
        if let Some(year) = patch.year_built {
            validation::year_built(year, now.date_naive())?;
            flat.year_built = year;
        }
        if let Some(price) = patch.rent_price {
            validation::positive_number("rentPrice", price)?;
            flat.rent_price = price;
        }
        if let Some(day) = patch.date_available {
            flat.date_available = midnight_utc(day);
        }

        let mut replaced_image = None;
        if let Some(url) = patch.image_url {
            validation::required("imageUrl", &url)?;
            let url = url.trim().to_string();
            if url != flat.image_url {
                replaced_image = flat.image_handle.take();
                flat.image_url = url;
                flat.image_handle = patch.image_handle.filter(|h| !h.trim().is_empty());
            }
        }
        flat.updated_at = now;

        self.repos
            .flats
            .update(flat.clone())
            .await
            .map_err(db_err)?;
        self.release_images(replaced_image).await;
        info!("Flat updated");
        Ok(flat)
    }

    /// Owner or admin. Messages and favorites go with the flat.
    #[instrument(name = "rentals.service.delete_flat", skip(self, caller), fields(flat_id = %id))]
    pub async fn delete_flat(&self, caller: &Principal, id: Uuid) -> Result<(), DomainError> {
        info!("Deleting flat");
        let flat = self
            .repos
            .flats
            .find_by_id(id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::flat_not_found(id))?;
        if !caller.can_manage(flat.owner_id) {
            return Err(DomainError::forbidden("only the owner can delete this flat"));
        }
        let image = self
            .repos
            .flats
            .delete_cascade(id)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::flat_not_found(id))?;
        self.release_images(image).await;
        info!("Flat deleted");
        Ok(())
    }
}
