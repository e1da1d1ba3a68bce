use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use hydroponic_manager::models::{PlantType, SyncInterval};

#[derive(Parser)]
#[command(name = "hydroponic-manager")]
#[command(about = "Una CLI para gestionar mis plantas hidropónicas")]
pub struct Cli {
    /// Archivo de datos (por defecto $HYDROPONIC_DATA o ./hydroponic_data.json)
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ver plantas (todas o una por ID)
    View {
        /// ID de la planta
        #[arg(long = "id")]
        id: Option<String>,

        /// Mostrar solo ID y nombre
        #[arg(long = "ids")]
        ids: bool,
    },
    /// Agregar nueva planta
    Add(AddArgs),
    /// Actualizar planta existente
    Update(UpdateArgs),
    /// Remover planta
    Remove {
        /// ID de la planta a remover
        #[arg(long)]
        id: String,
        /// Borrar también su bitácora de fertilizante y galería
        #[arg(long)]
        purge: bool,
    },
    /// Registrar un riego
    Irrigate {
        #[arg(long)]
        id: String,
    },
    /// Registrar una aplicación de fertilizante
    Fertilize(FertilizeArgs),
    /// Ver (o editar) la bitácora de fertilizante de una planta
    Logs {
        #[arg(long)]
        id: String,
        /// ID de la entrada a borrar
        #[arg(long)]
        remove: Option<String>,
    },
    /// Galería de crecimiento de una planta
    Gallery(GalleryArgs),
    /// Información de cuidado de una planta
    Care {
        #[arg(long)]
        id: String,
    },
    /// Ver o cambiar la configuración de riego
    Irrigation {
        /// Riego automático: on/off
        #[arg(long, value_parser = parse_switch)]
        auto: Option<bool>,
        /// Horarios separados por comas (HH:MM)
        #[arg(long, value_delimiter = ',', value_parser = parse_time)]
        times: Option<Vec<String>>,
    },
    /// Ver o cambiar las notificaciones
    Notifications {
        /// Categoría=on/off, por ejemplo phAlert=on
        #[arg(long = "set", value_parser = parse_toggle)]
        set: Vec<(String, bool)>,
    },
    /// Ver o cambiar la configuración de la aplicación
    Settings {
        /// Modo oscuro: on/off
        #[arg(long, value_parser = parse_switch)]
        dark_mode: Option<bool>,
        /// hourly, daily, weekly o manual
        #[arg(long)]
        sync_interval: Option<SyncInterval>,
    },
    /// Borrar todos los datos
    Clear {
        /// Confirmar el borrado
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Nombre de la planta
    #[arg(short = 'n', long = "name")]
    pub name: String,
    /// Tipo: Leafy Green, Fruiting, Herb, Root Vegetable o Flower
    #[arg(short = 't', long = "type")]
    pub plant_type: PlantType,
    /// Fecha de siembra (YYYY-MM-DD, por defecto hoy)
    #[arg(long = "planted", value_parser = parse_date)]
    pub planting_date: Option<NaiveDate>,
    /// Fecha estimada de trasplante (YYYY-MM-DD)
    #[arg(long = "transplant", value_parser = parse_date)]
    pub transplant_date: Option<NaiveDate>,
    #[command(flatten)]
    pub photo: PhotoArgs,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// ID de la planta a actualizar
    #[arg(long)]
    pub id: String,
    /// Nuevo nombre (opcional)
    #[arg(short, long)]
    pub name: Option<String>,
    /// Nuevo tipo (opcional)
    #[arg(short = 't', long = "type")]
    pub plant_type: Option<PlantType>,
    /// Nueva fecha de siembra (opcional)
    #[arg(long = "planted", value_parser = parse_date)]
    pub planting_date: Option<NaiveDate>,
    /// Nueva fecha de trasplante (opcional)
    #[arg(long = "transplant", value_parser = parse_date)]
    pub transplant_date: Option<NaiveDate>,
    /// Quitar la fecha de trasplante
    #[arg(long, conflicts_with = "transplant_date")]
    pub clear_transplant: bool,
    #[command(flatten)]
    pub photo: PhotoArgs,
}

#[derive(Args, Debug)]
pub struct PhotoArgs {
    /// URL de la foto
    #[arg(long = "photo-url")]
    pub photo_url: Option<String>,
    /// Archivo de imagen local, se guarda embebido
    #[arg(long = "photo-file", conflicts_with = "photo_url")]
    pub photo_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct FertilizeArgs {
    /// ID de la planta
    #[arg(long)]
    pub id: String,
    /// Nombre del fertilizante
    #[arg(short = 'f', long = "fertilizer")]
    pub fertilizer_name: String,
    /// Cantidad, por ejemplo 5ml/L
    #[arg(short = 'q', long)]
    pub quantity: String,
    /// Fecha de aplicación (YYYY-MM-DD, por defecto hoy)
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct GalleryArgs {
    /// ID de la planta
    #[arg(long)]
    pub id: String,
    /// URL de la imagen a agregar
    #[arg(long = "add")]
    pub add_url: Option<String>,
    /// Archivo de imagen local a agregar
    #[arg(long = "add-file", conflicts_with = "add_url")]
    pub add_file: Option<PathBuf>,
    /// Fecha de la imagen (YYYY-MM-DD, por defecto hoy)
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,
    /// ID de la imagen a borrar
    #[arg(long)]
    pub remove: Option<String>,
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("fecha inválida '{s}': {e}"))
}

fn parse_time(s: &str) -> Result<String, String> {
    chrono::NaiveTime::parse_from_str(s, "%H:%M")
        .map(|t| t.format("%H:%M").to_string())
        .map_err(|_| format!("horario inválido '{s}', se espera HH:MM"))
}

fn parse_switch(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(format!("valor inválido '{s}', usa on/off")),
    }
}

fn parse_toggle(s: &str) -> Result<(String, bool), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("se espera categoría=on/off, no '{s}'"))?;
    Ok((key.trim().to_string(), parse_switch(value.trim())?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_add_command() {
        let cli = Cli::try_parse_from([
            "hydroponic-manager",
            "add",
            "--name",
            "Tomato",
            "--type",
            "fruiting",
            "--planted",
            "2024-03-01",
        ])
        .unwrap();
        match cli.command {
            Commands::Add(args) => {
                assert_eq!(args.plant_type, PlantType::Fruiting);
                assert_eq!(args.planting_date, NaiveDate::from_ymd_opt(2024, 3, 1));
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn rejects_bad_irrigation_time() {
        let parsed = Cli::try_parse_from(["hydroponic-manager", "irrigation", "--times", "08:00,25:99"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn parses_notification_toggles() {
        assert_eq!(parse_toggle("phAlert=on"), Ok(("phAlert".to_string(), true)));
        assert!(parse_toggle("phAlert").is_err());
    }
}
