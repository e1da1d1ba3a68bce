use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
mod cli;

use cli::{Cli, Commands, PhotoArgs};
use hydroponic_manager::care::care_info;
use hydroponic_manager::dates::{format_date, format_naive_date, TransplantCountdown};
use hydroponic_manager::models::{
    AppSettings, IrrigationSettings, NewFertilizerEntry, NewPlant, NotificationSettings, Photo,
    Plant, PlantUpdate,
};
use hydroponic_manager::storage::JsonFileStorage;
use hydroponic_manager::PlantStore;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let path = match cli.data {
        Some(path) => path,
        None => std::env::var("HYDROPONIC_DATA")
            .unwrap_or_else(|_| "hydroponic_data.json".to_string())
            .into(),
    };
    let storage = match JsonFileStorage::open(&path) {
        Ok(storage) => storage,
        Err(e) => {
            eprintln!("Error al abrir el archivo de datos {}: {}", path.display(), e);
            return Err(e.into());
        }
    };
    let mut store = PlantStore::new(storage);
    let today = store.now().date_naive();

    match cli.command {
        Commands::View { id, ids } => {
            let plants = match id {
                Some(id) => vec![store.find_plant(&id)?],
                None => store.list_plants(),
            };
            if plants.is_empty() {
                println!("No se encontraron plantas");
            }
            for plant in plants {
                if ids {
                    println!("{}, '{}'", plant.id, plant.name);
                } else {
                    print_plant(&store, &plant);
                }
            }
        }
        Commands::Add(args) => {
            let photo = load_photo(&args.photo)?;
            let plant = store.add_plant(NewPlant {
                name: Some(args.name),
                plant_type: Some(args.plant_type),
                planting_date: Some(args.planting_date.unwrap_or(today)),
                transplant_date: args.transplant_date,
                photo,
            })?;
            println!("Planta agregada, ID: {}", plant.id);
        }
        Commands::Update(args) => {
            let photo = load_photo(&args.photo)?;
            let transplant_date = if args.clear_transplant {
                Some(None)
            } else {
                args.transplant_date.map(Some)
            };
            let plant = store.update_plant(
                &args.id,
                PlantUpdate {
                    name: args.name,
                    plant_type: args.plant_type,
                    planting_date: args.planting_date,
                    transplant_date,
                    photo,
                },
            )?;
            println!("Planta ID {} actualizada", plant.id);
        }
        Commands::Remove { id, purge } => {
            if purge {
                store.purge_plant(&id)?;
            } else {
                store.delete_plant(&id)?;
            }
            println!("Planta con ID: {} removida.", id);
        }
        Commands::Irrigate { id } => {
            let plant = store.record_irrigation(&id)?;
            println!("Regando '{}' 💧", plant.name);
        }
        Commands::Fertilize(args) => {
            let plant = store.record_fertilizer_application(
                &args.id,
                NewFertilizerEntry {
                    fertilizer_name: args.fertilizer_name,
                    quantity: args.quantity,
                    application_date: Some(args.date.unwrap_or(today)),
                },
            )?;
            println!("'{}': {}", plant.name, plant.fertilizer_status);
        }
        Commands::Logs { id, remove } => {
            let mut history = store.fertilizer_history(&id)?;
            if let Some(entry_id) = remove {
                store.remove_fertilizer_entry(&id, &entry_id)?;
                println!("Entrada {} borrada", entry_id);
                history = store.fertilizer_history(&id)?;
            }
            if history.is_empty() {
                println!("Sin registros de fertilizante");
            }
            for entry in history {
                println!(
                    "{}  {}  {}  (ID: {})",
                    format_naive_date(entry.application_date),
                    entry.fertilizer_name,
                    entry.quantity,
                    entry.id
                );
            }
        }
        Commands::Gallery(args) => {
            store.find_plant(&args.id)?;
            if let Some(image_id) = &args.remove {
                store.remove_gallery_image(&args.id, image_id)?;
                println!("Imagen {} borrada", image_id);
            }
            let url = match (args.add_url, args.add_file) {
                (Some(url), _) => Some(url),
                (None, Some(file)) => Some(
                    Photo::from_image_file(&file)
                        .with_context(|| format!("no se pudo leer {}", file.display()))?
                        .into(),
                ),
                (None, None) => None,
            };
            if let Some(url) = url {
                let image = store.add_gallery_image(&args.id, url, args.date.unwrap_or(today))?;
                println!("Imagen agregada, ID: {}", image.id);
            }
            let images = store.gallery_timeline(&args.id)?;
            if images.is_empty() {
                println!("Galería vacía");
            }
            for image in images {
                println!("{}  {}  (ID: {})", format_naive_date(image.date), preview(&image.url), image.id);
            }
        }
        Commands::Care { id } => {
            let plant = store.find_plant(&id)?;
            let care = care_info(&plant);
            println!(
                "Cuidados para '{}':\n  Luz: {}\n  pH: {}\n  Temperatura: {}\n  EC: {}\n  Fertilizante: {}",
                plant.name, care.sunlight, care.ph, care.temperature, care.ec, care.fertilizer
            );
        }
        Commands::Irrigation { auto, times } => {
            let mut settings: IrrigationSettings = store.settings();
            if auto.is_some() || times.is_some() {
                if let Some(auto) = auto {
                    settings.auto_irrigation_enabled = auto;
                }
                if let Some(times) = times {
                    settings.irrigation_times = times;
                }
                store.set_settings(&settings)?;
            }
            println!(
                "Riego automático: {}\nHorarios: {}",
                on_off(settings.auto_irrigation_enabled),
                settings.irrigation_times.join(", ")
            );
        }
        Commands::Notifications { set } => {
            let mut settings: NotificationSettings = store.settings();
            if !set.is_empty() {
                for (category, enabled) in set {
                    settings.set(category, enabled);
                }
                store.set_settings(&settings)?;
            }
            for (category, enabled) in &settings.0 {
                println!("{}: {}", category, on_off(*enabled));
            }
        }
        Commands::Settings {
            dark_mode,
            sync_interval,
        } => {
            let mut settings: AppSettings = store.settings();
            if dark_mode.is_some() || sync_interval.is_some() {
                if let Some(dark_mode) = dark_mode {
                    settings.dark_mode = dark_mode;
                }
                if let Some(interval) = sync_interval {
                    settings.data_sync_interval = interval;
                }
                store.set_settings(&settings)?;
            }
            println!(
                "Usuario: {}\nEmail: {}\nModo oscuro: {}\nSincronización: {:?}",
                settings.username,
                settings.email,
                on_off(settings.dark_mode),
                settings.data_sync_interval
            );
        }
        Commands::Clear { yes } => {
            if !yes {
                eprintln!("Esto borra todos los datos. Repite con --yes para confirmar.");
                return Err(anyhow::anyhow!("borrado no confirmado"));
            }
            store.clear_all()?;
            println!("Datos borrados");
        }
    }

    Ok(())
}

fn load_photo(args: &PhotoArgs) -> Result<Option<Photo>> {
    if let Some(url) = &args.photo_url {
        return Ok(Some(Photo::from(url.clone())));
    }
    match &args.photo_file {
        Some(file) => {
            let photo = Photo::from_image_file(file)
                .with_context(|| format!("no se pudo leer {}", file.display()))?;
            Ok(Some(photo))
        }
        None => Ok(None),
    }
}

fn print_plant(store: &PlantStore<JsonFileStorage>, plant: &Plant) {
    let irrigated = plant.last_irrigated.map(|ts| ts.to_rfc3339());
    println!(
        "Name: '{}'\nTipo: {}\nSembrada: {}\nÚltimo riego: {}\nFertilizante: {}\nID: '{}'",
        plant.name,
        plant.plant_type,
        format_naive_date(plant.planting_date),
        format_date(irrigated.as_deref()),
        plant.fertilizer_status,
        plant.id,
    );
    if let Some(countdown) = TransplantCountdown::for_date(plant.transplant_date, store.now()) {
        println!("{}", countdown);
    }
    match &plant.photo {
        Some(photo) => println!("Foto: {}", preview(photo.as_str())),
        None => println!("Foto: Ninguna"),
    }
    println!();
}

// Embedded payloads are far too long to print.
fn preview(url: &str) -> String {
    if url.starts_with("data:") {
        let head: String = url.chars().take(32).collect();
        format!("{head}… ({} bytes)", url.len())
    } else {
        url.to_string()
    }
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}
