use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info};

use crate::dates::format_naive_date;
use crate::error::{Result, StoreError};
use crate::models::{
    FertilizerLogEntry, GalleryImage, NewFertilizerEntry, NewPlant, Plant, PlantUpdate,
    SettingsRecord, DEFAULT_FERTILIZER_STATUS,
};
use crate::storage::{load_json, save_json, KeyValueStore};

pub const PLANTS_KEY: &str = "hydroponic_plants";

pub fn fertilizer_log_key(plant_id: &str) -> String {
    format!("fertilizer_logs_{plant_id}")
}

pub fn gallery_key(plant_id: &str) -> String {
    format!("plant_gallery_{plant_id}")
}

/// Plant records plus the per-plant logs and settings kept next to them.
///
/// Every mutation reads the whole slot, changes it and writes it back. Writes
/// that touch two slots (a fertilizer entry and the plant's status) are
/// independent; nothing rolls back the first if the second fails.
pub struct PlantStore<S> {
    storage: S,
    clock: fn() -> DateTime<Utc>,
}

impl<S: KeyValueStore> PlantStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            clock: Utc::now,
        }
    }

    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    /// Millisecond timestamp, bumped past anything already in `taken`.
    fn next_id<'a>(&self, taken: impl Iterator<Item = &'a str> + Clone) -> String {
        let mut candidate = self.now().timestamp_millis();
        while taken.clone().any(|id| id == candidate.to_string()) {
            candidate += 1;
        }
        candidate.to_string()
    }

    pub fn list_plants(&self) -> Vec<Plant> {
        let plants: Vec<Plant> = load_json(&self.storage, PLANTS_KEY).unwrap_or_default();
        debug!(count = plants.len(), "loaded plants");
        plants
    }

    fn save_plants(&mut self, plants: &[Plant]) -> Result<()> {
        save_json(&mut self.storage, PLANTS_KEY, &plants)?;
        Ok(())
    }

    pub fn find_plant(&self, id: &str) -> Result<Plant> {
        self.list_plants()
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("plant {id}")))
    }

    pub fn add_plant(&mut self, input: NewPlant) -> Result<Plant> {
        let (name, plant_type, planting_date) =
            match (input.name.filter(|n| !n.trim().is_empty()), input.plant_type, input.planting_date) {
                (Some(name), Some(plant_type), Some(planting_date)) => (name, plant_type, planting_date),
                _ => {
                    return Err(StoreError::Validation(
                        "plant name, planting date and type are required".into(),
                    ))
                }
            };

        let mut plants = self.list_plants();
        if name_taken(&plants, &name, None) {
            return Err(StoreError::DuplicateName(name));
        }

        let plant = Plant {
            id: self.next_id(plants.iter().map(|p| p.id.as_str())),
            name,
            plant_type,
            planting_date,
            transplant_date: input.transplant_date,
            photo: input.photo.filter(|p| !p.is_blank()),
            last_irrigated: None,
            fertilizer_status: DEFAULT_FERTILIZER_STATUS.to_string(),
        };
        plants.push(plant.clone());
        self.save_plants(&plants)?;
        info!(id = %plant.id, name = %plant.name, "plant added");
        Ok(plant)
    }

    pub fn update_plant(&mut self, id: &str, update: PlantUpdate) -> Result<Plant> {
        let mut plants = self.list_plants();
        let index = position(&plants, id)?;

        if let Some(name) = &update.name {
            if name.trim().is_empty() {
                return Err(StoreError::Validation("plant name cannot be empty".into()));
            }
            if name_taken(&plants, name, Some(id)) {
                return Err(StoreError::DuplicateName(name.clone()));
            }
        }

        let plant = &mut plants[index];
        if let Some(name) = update.name {
            plant.name = name;
        }
        if let Some(plant_type) = update.plant_type {
            plant.plant_type = plant_type;
        }
        if let Some(planting_date) = update.planting_date {
            plant.planting_date = planting_date;
        }
        if let Some(transplant_date) = update.transplant_date {
            plant.transplant_date = transplant_date;
        }
        if let Some(photo) = update.photo.filter(|p| !p.is_blank()) {
            plant.photo = Some(photo);
        }

        let updated = plant.clone();
        self.save_plants(&plants)?;
        info!(id, name = %updated.name, "plant updated");
        Ok(updated)
    }

    /// Remove the plant record only. Its fertilizer log and gallery stay
    /// behind under their own keys; see [`PlantStore::purge_plant`].
    pub fn delete_plant(&mut self, id: &str) -> Result<()> {
        let mut plants = self.list_plants();
        let index = position(&plants, id)?;
        let removed = plants.remove(index);
        self.save_plants(&plants)?;
        info!(id, name = %removed.name, "plant deleted");
        Ok(())
    }

    /// Delete the plant together with its fertilizer log and gallery.
    pub fn purge_plant(&mut self, id: &str) -> Result<()> {
        self.delete_plant(id)?;
        self.storage.remove(&fertilizer_log_key(id))?;
        self.storage.remove(&gallery_key(id))?;
        info!(id, "plant logs and gallery purged");
        Ok(())
    }

    pub fn record_irrigation(&mut self, id: &str) -> Result<Plant> {
        let now = self.now();
        let mut plants = self.list_plants();
        let index = position(&plants, id)?;
        plants[index].last_irrigated = Some(now);
        let plant = plants[index].clone();
        self.save_plants(&plants)?;
        info!(id, at = %now, "irrigation recorded");
        Ok(plant)
    }

    /// Append to the plant's fertilizer log, then point its status at the
    /// newest application.
    pub fn record_fertilizer_application(
        &mut self,
        id: &str,
        entry: NewFertilizerEntry,
    ) -> Result<Plant> {
        let application_date = match entry.application_date {
            Some(date)
                if !entry.fertilizer_name.trim().is_empty() && !entry.quantity.trim().is_empty() =>
            {
                date
            }
            _ => {
                return Err(StoreError::Validation(
                    "fertilizer name, quantity and application date are required".into(),
                ))
            }
        };

        let mut plants = self.list_plants();
        let index = position(&plants, id)?;

        let mut log = self.fertilizer_log(id);
        let logged = FertilizerLogEntry {
            id: self.next_id(log.iter().map(|e| e.id.as_str())),
            fertilizer_name: entry.fertilizer_name,
            quantity: entry.quantity,
            application_date,
        };
        log.push(logged.clone());
        self.set_fertilizer_log(id, &log)?;

        plants[index].fertilizer_status = format!(
            "Applied {} on {}",
            logged.fertilizer_name,
            format_naive_date(logged.application_date)
        );
        let plant = plants[index].clone();
        self.save_plants(&plants)?;
        info!(id, fertilizer = %logged.fertilizer_name, "fertilizer application recorded");
        Ok(plant)
    }

    /// Fertilizer entries in the order they were logged.
    pub fn fertilizer_log(&self, plant_id: &str) -> Vec<FertilizerLogEntry> {
        load_json(&self.storage, &fertilizer_log_key(plant_id)).unwrap_or_default()
    }

    /// Fertilizer entries of an existing plant, most recent application first.
    pub fn fertilizer_history(&self, plant_id: &str) -> Result<Vec<FertilizerLogEntry>> {
        self.find_plant(plant_id)?;
        let mut log = self.fertilizer_log(plant_id);
        log.sort_by(|a, b| b.application_date.cmp(&a.application_date));
        Ok(log)
    }

    pub fn set_fertilizer_log(&mut self, plant_id: &str, log: &[FertilizerLogEntry]) -> Result<()> {
        save_json(&mut self.storage, &fertilizer_log_key(plant_id), &log)?;
        Ok(())
    }

    /// Drop one log entry. The plant's status line is left as it was.
    pub fn remove_fertilizer_entry(&mut self, plant_id: &str, entry_id: &str) -> Result<()> {
        let mut log = self.fertilizer_log(plant_id);
        let before = log.len();
        log.retain(|e| e.id != entry_id);
        if log.len() == before {
            return Err(StoreError::NotFound(format!("fertilizer entry {entry_id}")));
        }
        self.set_fertilizer_log(plant_id, &log)?;
        info!(plant_id, entry_id, "fertilizer entry removed");
        Ok(())
    }

    pub fn gallery(&self, plant_id: &str) -> Vec<GalleryImage> {
        load_json(&self.storage, &gallery_key(plant_id)).unwrap_or_default()
    }

    /// Gallery images of an existing plant, newest first.
    pub fn gallery_timeline(&self, plant_id: &str) -> Result<Vec<GalleryImage>> {
        self.find_plant(plant_id)?;
        let mut images = self.gallery(plant_id);
        images.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(images)
    }

    pub fn set_gallery(&mut self, plant_id: &str, images: &[GalleryImage]) -> Result<()> {
        save_json(&mut self.storage, &gallery_key(plant_id), &images)?;
        Ok(())
    }

    pub fn add_gallery_image(
        &mut self,
        plant_id: &str,
        url: String,
        date: NaiveDate,
    ) -> Result<GalleryImage> {
        if url.trim().is_empty() {
            return Err(StoreError::Validation("an image URL or upload is required".into()));
        }
        self.find_plant(plant_id)?;

        let mut images = self.gallery(plant_id);
        let image = GalleryImage {
            id: self.next_id(images.iter().map(|i| i.id.as_str())),
            url,
            date,
        };
        images.push(image.clone());
        self.set_gallery(plant_id, &images)?;
        info!(plant_id, image_id = %image.id, "gallery image added");
        Ok(image)
    }

    pub fn remove_gallery_image(&mut self, plant_id: &str, image_id: &str) -> Result<()> {
        let mut images = self.gallery(plant_id);
        let before = images.len();
        images.retain(|i| i.id != image_id);
        if images.len() == before {
            return Err(StoreError::NotFound(format!("gallery image {image_id}")));
        }
        self.set_gallery(plant_id, &images)?;
        info!(plant_id, image_id, "gallery image removed");
        Ok(())
    }

    /// Stored settings, or the defaults when nothing usable is stored.
    pub fn settings<T: SettingsRecord>(&self) -> T {
        load_json(&self.storage, T::KEY).unwrap_or_default()
    }

    pub fn set_settings<T: SettingsRecord>(&mut self, settings: &T) -> Result<()> {
        save_json(&mut self.storage, T::KEY, settings)?;
        info!(key = T::KEY, "settings saved");
        Ok(())
    }

    /// Wipe every key, plants, logs and settings alike.
    pub fn clear_all(&mut self) -> Result<()> {
        self.storage.clear()?;
        info!("all data cleared");
        Ok(())
    }
}

fn position(plants: &[Plant], id: &str) -> Result<usize> {
    plants
        .iter()
        .position(|p| p.id == id)
        .ok_or_else(|| StoreError::NotFound(format!("plant {id}")))
}

fn name_taken(plants: &[Plant], name: &str, except_id: Option<&str>) -> bool {
    let wanted = name.to_lowercase();
    plants
        .iter()
        .any(|p| p.name.to_lowercase() == wanted && Some(p.id.as_str()) != except_id)
}
